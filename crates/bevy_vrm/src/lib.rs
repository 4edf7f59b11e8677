use bevy::app::{App, Plugin, Update};
use bevy::asset::AssetApp;
use bevy::prelude::{IntoSystemConfigs, IntoSystemSetConfigs, SystemSet};

pub use humanoid::{AvatarPose, Humanoid, HumanoidError, VrmAvatar};
pub use loader::{Vrm, VrmLoader};
pub use meta::{MorphBind, VrmError, VrmMeta, REQUIRED_BONES};

mod extensions;
mod humanoid;
mod loader;
mod meta;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum VrmSystems {
    /// Matches newly spawned avatars against their VRM humanoid.
    Resolve,
    /// Writes [`AvatarPose`] to the scene. Pose changes belong before this.
    ApplyPose,
}

pub struct VrmPlugin;

impl Plugin for VrmPlugin {
    fn name(&self) -> &str {
        "VRM"
    }

    fn build(&self, app: &mut App) {
        app
            .init_asset::<Vrm>()
            .configure_sets(Update, VrmSystems::Resolve.before(VrmSystems::ApplyPose))
            .add_systems(Update, (
                humanoid::resolve_humanoids.in_set(VrmSystems::Resolve),
                humanoid::apply_pose.in_set(VrmSystems::ApplyPose),
            ));
    }

    fn finish(&self, app: &mut App) {
        // The render device is only around once the renderer has finished.
        app.init_asset_loader::<VrmLoader>();
    }
}
