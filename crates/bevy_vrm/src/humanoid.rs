use std::collections::{HashMap, HashSet};

use bevy::hierarchy::HierarchyQueryExt;
use bevy::math::{EulerRot, Quat};
use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use idol_motion::{BlendShapePreset, HumanoidBone, PoseRig};

use crate::loader::Vrm;

/// Root of a spawned VRM scene that still needs its humanoid resolved.
#[derive(Component, Debug, Clone)]
pub struct VrmAvatar {
    pub vrm: Handle<Vrm>,
}

/// Bone and blend shape lookup for a spawned avatar.
#[derive(Component, Debug, Clone)]
pub struct Humanoid {
    pub bones: HashMap<HumanoidBone, Entity>,
    pub blend_shapes: HashMap<BlendShapePreset, Vec<(Entity, usize, f32)>>,
    pub binary_presets: HashSet<BlendShapePreset>,
}

impl Humanoid {
    /// The weight a preset is shown at. Binary presets snap at one half.
    pub fn preset_weight(&self, preset: BlendShapePreset, weight: f32) -> f32 {
        if !self.binary_presets.contains(&preset) {
            weight
        } else if weight < 0.5 {
            0.0
        } else {
            1.0
        }
    }
}

/// Pose targets for an avatar, written to its bones once per frame.
#[derive(Component, Debug, Default, Deref, DerefMut)]
pub struct AvatarPose(pub PoseRig);

/// The avatar's humanoid could not be matched against its scene.
#[derive(Component, Debug, Clone)]
pub struct HumanoidError(pub String);

pub fn resolve_humanoids(
    mut commands: Commands,
    vrms: Res<Assets<Vrm>>,
    avatars: Query<(Entity, &VrmAvatar), (Without<Humanoid>, Without<HumanoidError>)>,
    children: Query<&Children>,
    names: Query<&Name>,
    transforms: Query<&Transform>,
) {
    for (root, avatar) in &avatars {
        let Some(vrm) = vrms.get(&avatar.vrm) else {
            continue;
        };

        let nodes: HashMap<&str, Entity> = children.iter_descendants(root)
            .filter_map(|entity| names.get(entity).ok().map(|name| (name.as_str(), entity)))
            .collect();
        if nodes.is_empty() {
            // Scene hasn't been spawned yet.
            continue;
        }

        let resolved = match vrm.meta.resolve(|name| nodes.get(name).copied()) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!("failed to resolve avatar humanoid: {}", err);
                commands.entity(root).insert(HumanoidError(err.to_string()));
                continue;
            }
        };

        let rest_pose = resolved.bones.iter()
            .filter_map(|(bone, entity)| {
                let (x, y, z) = transforms.get(*entity).ok()?.rotation.to_euler(EulerRot::XYZ);
                Some((*bone, Vec3::new(x, y, z)))
            });
        let pose = AvatarPose(PoseRig::with_rest_pose(rest_pose));

        tracing::info!(
            "avatar ready: {} bones, {} blend shape presets",
            resolved.bones.len(),
            resolved.blend_shapes.len(),
        );
        commands.entity(root).insert((
            Humanoid {
                bones: resolved.bones,
                blend_shapes: resolved.blend_shapes,
                binary_presets: resolved.binary_presets,
            },
            pose,
        ));
    }
}

/// Copy each avatar's pose targets onto its bone transforms and morph weights.
pub fn apply_pose(
    avatars: Query<(&Humanoid, &AvatarPose), Changed<AvatarPose>>,
    mut transforms: Query<&mut Transform>,
    mut morph_weights: Query<&mut MorphWeights>,
) {
    for (humanoid, pose) in &avatars {
        for (bone, euler) in pose.rotations() {
            let Some(entity) = humanoid.bones.get(&bone) else {
                continue;
            };
            if let Ok(mut transform) = transforms.get_mut(*entity) {
                transform.rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
            }
        }

        // Several presets may share a morph target, so sum their contributions.
        let mut targets: HashMap<(Entity, usize), f32> = HashMap::new();
        for (preset, binds) in &humanoid.blend_shapes {
            let weight = humanoid.preset_weight(*preset, pose.blend_shape(*preset));
            for (entity, target, bind_weight) in binds {
                *targets.entry((*entity, *target)).or_default() += weight * bind_weight;
            }
        }

        for ((entity, target), value) in targets {
            let Ok(mut weights) = morph_weights.get_mut(entity) else {
                continue;
            };
            if let Some(slot) = weights.weights_mut().get_mut(target) {
                *slot = value.min(1.0);
            }
        }
    }
}
