use std::f32::consts::PI;

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_vrm::{AvatarPose, Humanoid, HumanoidError, Vrm, VrmAvatar};
use idol_motion::{AvatarRig, Axis, HumanoidBone};

/// Asset path of the avatar to show.
#[derive(Resource, Debug, Clone)]
pub struct AvatarSource(pub String);

#[derive(Resource, Debug, Clone)]
pub struct AvatarAsset(pub Handle<Vrm>);

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub enum AvatarStatus {
    #[default]
    Loading,
    Spawned,
    Ready,
    Failed(String),
}

pub fn load_avatar(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    source: Res<AvatarSource>,
) {
    tracing::info!("loading avatar {}", source.0);
    let handle = asset_server.load::<Vrm>(source.0.clone());
    commands.insert_resource(AvatarAsset(handle));
}

fn fail(status: &mut AvatarStatus, window: Option<Mut<Window>>, reason: String) {
    tracing::error!("avatar failed to load: {}", reason);
    if let Some(mut window) = window {
        window.title = format!("avatar failed to load: {}", reason);
    }
    *status = AvatarStatus::Failed(reason);
}

pub fn track_avatar_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    vrms: Res<Assets<Vrm>>,
    asset: Option<Res<AvatarAsset>>,
    mut status: ResMut<AvatarStatus>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut progress: Local<Option<RecursiveDependencyLoadState>>,
) {
    if *status != AvatarStatus::Loading {
        return;
    }
    let Some(asset) = asset else {
        return;
    };

    match asset_server.get_load_state(&asset.0) {
        Some(LoadState::Loaded) => {
            let Some(scene) = vrms.get(&asset.0).and_then(|vrm| vrm.scenes.first()) else {
                fail(&mut status, windows.get_single_mut().ok(), "avatar has no scene".to_string());
                return;
            };

            commands.spawn((
                SceneBundle {
                    scene: scene.clone(),
                    ..default()
                },
                VrmAvatar {
                    vrm: asset.0.clone(),
                },
            ));
            tracing::info!("avatar loaded, spawning scene");
            *status = AvatarStatus::Spawned;
        }
        Some(LoadState::Failed(err)) => {
            fail(&mut status, windows.get_single_mut().ok(), err.to_string());
        }
        state => {
            // Meshes and textures arrive as dependencies of the avatar.
            let dependencies = asset_server.get_recursive_dependency_load_state(&asset.0);
            if *progress != dependencies {
                tracing::info!("loading avatar: {:?}, dependencies {:?}", state, dependencies);
                *progress = dependencies;
            }
        }
    }
}

/// Turn newly resolved avatars to face the camera.
pub fn on_avatar_ready(
    mut avatars: Query<&mut AvatarPose, Added<Humanoid>>,
    errors: Query<&HumanoidError, Added<HumanoidError>>,
    mut status: ResMut<AvatarStatus>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    for mut pose in &mut avatars {
        pose.set_bone_rotation(HumanoidBone::Hips, Axis::Y, PI);
        *status = AvatarStatus::Ready;
    }

    for error in &errors {
        fail(&mut status, windows.get_single_mut().ok(), error.0.clone());
    }
}
