use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use gltf::Glb;
use idol_motion::{BlendShapePreset, HumanoidBone};
use thiserror::Error;

use crate::extensions::ExtendedRoot;

pub static REQUIRED_BONES: &[HumanoidBone] = &[
    HumanoidBone::Hips,
    HumanoidBone::Spine,
    HumanoidBone::Head,
    HumanoidBone::LeftUpperLeg,
    HumanoidBone::LeftLowerLeg,
    HumanoidBone::LeftFoot,
    HumanoidBone::RightUpperLeg,
    HumanoidBone::RightLowerLeg,
    HumanoidBone::RightFoot,
    HumanoidBone::LeftUpperArm,
    HumanoidBone::LeftLowerArm,
    HumanoidBone::LeftHand,
    HumanoidBone::RightUpperArm,
    HumanoidBone::RightLowerArm,
    HumanoidBone::RightHand,
];

#[derive(Error, Debug)]
pub enum VrmError {
    #[error("invalid glTF file: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("invalid VRM extension: {0}")]
    Extension(#[from] serde_json::Error),
    #[error("humanoid bone {0:?} refers to missing node {1}")]
    DanglingBone(HumanoidBone, u32),
    #[error("required humanoid bone {0:?} is missing")]
    MissingBone(HumanoidBone),
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load glTF scene: {0}")]
    Scene(#[from] bevy::gltf::GltfError),
}

/// One blend shape channel's contribution to a mesh morph target.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphBind {
    /// Name of a node carrying the bound mesh.
    pub node: String,
    pub target: usize,
    /// Normalised to `[0, 1]`.
    pub weight: f32,
}

/// Humanoid and blend shape layout from a VRM 0.x file, keyed by scene node
/// name so it can be matched against a spawned scene.
#[derive(Debug, Clone, Default)]
pub struct VrmMeta {
    pub bones: HashMap<HumanoidBone, String>,
    pub blend_shapes: HashMap<BlendShapePreset, Vec<MorphBind>>,
    /// Presets that are either fully on or off.
    pub binary_presets: HashSet<BlendShapePreset>,
}

/// Humanoid bones and blend shape binds resolved to scene handles.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub bones: HashMap<HumanoidBone, T>,
    pub blend_shapes: HashMap<BlendShapePreset, Vec<(T, usize, f32)>>,
    pub binary_presets: HashSet<BlendShapePreset>,
}

fn json_chunk(src: &[u8]) -> Result<Cow<'_, [u8]>, gltf::Error> {
    if src.starts_with(b"glTF") {
        Ok(Glb::from_slice(src)?.json)
    } else {
        Ok(Cow::Borrowed(src))
    }
}

/// Scene node name the glTF loader gives node `index`.
fn node_name(root: &ExtendedRoot, index: usize) -> String {
    root.nodes
        .get(index)
        .and_then(|n| n.name.clone())
        .unwrap_or_else(|| format!("GltfNode{}", index))
}

impl VrmMeta {
    /// Parse from either a `.vrm`/`.glb` binary or bare glTF JSON.
    pub fn from_slice(src: &[u8]) -> Result<Self, VrmError> {
        let json = json_chunk(src)?;
        let root: ExtendedRoot = serde_json::from_slice(&json)?;
        let vrm = &root.extensions.vrm;

        let mut bones = HashMap::new();
        for human_bone in &vrm.humanoid.human_bones {
            let Some(bone) = HumanoidBone::from_name(&human_bone.bone) else {
                tracing::debug!("skipping unknown humanoid bone {}", human_bone.bone);
                continue;
            };
            if human_bone.node as usize >= root.nodes.len() {
                return Err(VrmError::DanglingBone(bone, human_bone.node));
            }
            bones.insert(bone, node_name(&root, human_bone.node as usize));
        }

        if let Some(missing) = REQUIRED_BONES.iter().find(|b| !bones.contains_key(*b)) {
            return Err(VrmError::MissingBone(*missing));
        }

        let mut blend_shapes: HashMap<BlendShapePreset, Vec<MorphBind>> = HashMap::new();
        let mut binary_presets = HashSet::new();
        for group in &vrm.blend_shape_master.blend_shape_groups {
            let Some(preset) = BlendShapePreset::from_name(&group.preset_name) else {
                continue;
            };
            if group.is_binary {
                binary_presets.insert(preset);
            }

            let binds = blend_shapes.entry(preset).or_default();
            for bind in &group.binds {
                let carriers = root.nodes.iter()
                    .enumerate()
                    .filter(|(_, node)| node.mesh == Some(bind.mesh));
                for (index, _) in carriers {
                    binds.push(MorphBind {
                        node: node_name(&root, index),
                        target: bind.index as usize,
                        weight: bind.weight / 100.0,
                    });
                }
            }
        }

        Ok(Self {
            bones,
            blend_shapes,
            binary_presets,
        })
    }

    /// Look up every node by name. Missing bones fail, missing blend shape
    /// carriers are dropped.
    pub fn resolve<T: Copy>(&self, lookup: impl Fn(&str) -> Option<T>) -> Result<Resolved<T>, VrmError> {
        let mut bones = HashMap::new();
        for (bone, name) in &self.bones {
            match lookup(name) {
                Some(handle) => {
                    bones.insert(*bone, handle);
                }
                None if REQUIRED_BONES.contains(bone) => return Err(VrmError::MissingBone(*bone)),
                None => tracing::warn!("humanoid bone {:?} node {} not in scene", bone, name),
            }
        }

        let blend_shapes = self.blend_shapes.iter()
            .map(|(preset, binds)| {
                let resolved = binds.iter()
                    .filter_map(|bind| match lookup(&bind.node) {
                        Some(handle) => Some((handle, bind.target, bind.weight)),
                        None => {
                            tracing::warn!("blend shape {:?} node {} not in scene", preset, bind.node);
                            None
                        }
                    })
                    .collect();
                (*preset, resolved)
            })
            .collect();

        Ok(Resolved {
            bones,
            blend_shapes,
            binary_presets: self.binary_presets.clone(),
        })
    }
}
