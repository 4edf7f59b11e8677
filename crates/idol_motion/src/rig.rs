use std::collections::HashMap;

use glam::Vec3;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum HumanoidBone {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    LeftEye,
    RightEye,
    Jaw,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    LeftToes,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    RightToes,
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
}

static BONE_NAMES: &[(HumanoidBone, &str)] = &[
    (HumanoidBone::Hips, "hips"),
    (HumanoidBone::Spine, "spine"),
    (HumanoidBone::Chest, "chest"),
    (HumanoidBone::UpperChest, "upperChest"),
    (HumanoidBone::Neck, "neck"),
    (HumanoidBone::Head, "head"),
    (HumanoidBone::LeftEye, "leftEye"),
    (HumanoidBone::RightEye, "rightEye"),
    (HumanoidBone::Jaw, "jaw"),
    (HumanoidBone::LeftUpperLeg, "leftUpperLeg"),
    (HumanoidBone::LeftLowerLeg, "leftLowerLeg"),
    (HumanoidBone::LeftFoot, "leftFoot"),
    (HumanoidBone::LeftToes, "leftToes"),
    (HumanoidBone::RightUpperLeg, "rightUpperLeg"),
    (HumanoidBone::RightLowerLeg, "rightLowerLeg"),
    (HumanoidBone::RightFoot, "rightFoot"),
    (HumanoidBone::RightToes, "rightToes"),
    (HumanoidBone::LeftShoulder, "leftShoulder"),
    (HumanoidBone::LeftUpperArm, "leftUpperArm"),
    (HumanoidBone::LeftLowerArm, "leftLowerArm"),
    (HumanoidBone::LeftHand, "leftHand"),
    (HumanoidBone::RightShoulder, "rightShoulder"),
    (HumanoidBone::RightUpperArm, "rightUpperArm"),
    (HumanoidBone::RightLowerArm, "rightLowerArm"),
    (HumanoidBone::RightHand, "rightHand"),
    (HumanoidBone::LeftThumbProximal, "leftThumbProximal"),
    (HumanoidBone::LeftThumbIntermediate, "leftThumbIntermediate"),
    (HumanoidBone::LeftThumbDistal, "leftThumbDistal"),
    (HumanoidBone::LeftIndexProximal, "leftIndexProximal"),
    (HumanoidBone::LeftIndexIntermediate, "leftIndexIntermediate"),
    (HumanoidBone::LeftIndexDistal, "leftIndexDistal"),
    (HumanoidBone::LeftMiddleProximal, "leftMiddleProximal"),
    (HumanoidBone::LeftMiddleIntermediate, "leftMiddleIntermediate"),
    (HumanoidBone::LeftMiddleDistal, "leftMiddleDistal"),
    (HumanoidBone::LeftRingProximal, "leftRingProximal"),
    (HumanoidBone::LeftRingIntermediate, "leftRingIntermediate"),
    (HumanoidBone::LeftRingDistal, "leftRingDistal"),
    (HumanoidBone::LeftLittleProximal, "leftLittleProximal"),
    (HumanoidBone::LeftLittleIntermediate, "leftLittleIntermediate"),
    (HumanoidBone::LeftLittleDistal, "leftLittleDistal"),
    (HumanoidBone::RightThumbProximal, "rightThumbProximal"),
    (HumanoidBone::RightThumbIntermediate, "rightThumbIntermediate"),
    (HumanoidBone::RightThumbDistal, "rightThumbDistal"),
    (HumanoidBone::RightIndexProximal, "rightIndexProximal"),
    (HumanoidBone::RightIndexIntermediate, "rightIndexIntermediate"),
    (HumanoidBone::RightIndexDistal, "rightIndexDistal"),
    (HumanoidBone::RightMiddleProximal, "rightMiddleProximal"),
    (HumanoidBone::RightMiddleIntermediate, "rightMiddleIntermediate"),
    (HumanoidBone::RightMiddleDistal, "rightMiddleDistal"),
    (HumanoidBone::RightRingProximal, "rightRingProximal"),
    (HumanoidBone::RightRingIntermediate, "rightRingIntermediate"),
    (HumanoidBone::RightRingDistal, "rightRingDistal"),
    (HumanoidBone::RightLittleProximal, "rightLittleProximal"),
    (HumanoidBone::RightLittleIntermediate, "rightLittleIntermediate"),
    (HumanoidBone::RightLittleDistal, "rightLittleDistal"),
];

impl HumanoidBone {
    /// Bone name as written in the VRM humanoid extension.
    pub fn name(self) -> &'static str {
        BONE_NAMES
            .iter()
            .find(|(bone, _)| *bone == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BONE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(bone, _)| *bone)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BlendShapePreset {
    Neutral,
    A,
    I,
    U,
    E,
    O,
    Blink,
    Joy,
    Angry,
    Sorrow,
    Fun,
    LookUp,
    LookDown,
    LookLeft,
    LookRight,
    BlinkL,
    BlinkR,
}

impl BlendShapePreset {
    pub fn from_name(name: &str) -> Option<Self> {
        let preset = match name.to_ascii_lowercase().as_str() {
            "neutral" => Self::Neutral,
            "a" => Self::A,
            "i" => Self::I,
            "u" => Self::U,
            "e" => Self::E,
            "o" => Self::O,
            "blink" => Self::Blink,
            "joy" => Self::Joy,
            "angry" => Self::Angry,
            "sorrow" => Self::Sorrow,
            "fun" => Self::Fun,
            "lookup" => Self::LookUp,
            "lookdown" => Self::LookDown,
            "lookleft" => Self::LookLeft,
            "lookright" => Self::LookRight,
            "blink_l" => Self::BlinkL,
            "blink_r" => Self::BlinkR,
            _ => return None,
        };
        Some(preset)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A humanoid avatar whose pose can be driven one frame at a time.
///
/// Rotations are single euler components (XYZ order) relative to the bone's
/// parent, leaving the other two components as they were.
pub trait AvatarRig {
    fn set_bone_rotation(&mut self, bone: HumanoidBone, axis: Axis, angle: f32);

    fn set_blend_shape(&mut self, preset: BlendShapePreset, weight: f32);

    /// Advance the rig once all of this frame's targets are written.
    fn update(&mut self, dt: f32);
}

/// Pose targets for one avatar, applied to the scene by whoever owns it.
#[derive(Debug, Clone, Default)]
pub struct PoseRig {
    rotations: HashMap<HumanoidBone, Vec3>,
    blend_shapes: HashMap<BlendShapePreset, f32>,
    revision: u64,
    last_dt: f32,
}

impl PoseRig {
    /// Start from the bones' rest rotations, as XYZ euler angles.
    pub fn with_rest_pose(rest: impl IntoIterator<Item = (HumanoidBone, Vec3)>) -> Self {
        Self {
            rotations: rest.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn bone_rotation(&self, bone: HumanoidBone) -> Option<Vec3> {
        self.rotations.get(&bone).copied()
    }

    pub fn rotations(&self) -> impl Iterator<Item = (HumanoidBone, Vec3)> + '_ {
        self.rotations.iter().map(|(bone, euler)| (*bone, *euler))
    }

    /// Current weight of a preset, zero until something sets it.
    pub fn blend_shape(&self, preset: BlendShapePreset) -> f32 {
        self.blend_shapes.get(&preset).copied().unwrap_or(0.0)
    }

    pub fn blend_shapes(&self) -> impl Iterator<Item = (BlendShapePreset, f32)> + '_ {
        self.blend_shapes.iter().map(|(preset, weight)| (*preset, *weight))
    }

    /// Number of times the rig has been advanced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }
}

impl AvatarRig for PoseRig {
    fn set_bone_rotation(&mut self, bone: HumanoidBone, axis: Axis, angle: f32) {
        let euler = self.rotations.entry(bone).or_insert(Vec3::ZERO);
        match axis {
            Axis::X => euler.x = angle,
            Axis::Y => euler.y = angle,
            Axis::Z => euler.z = angle,
        }
    }

    fn set_blend_shape(&mut self, preset: BlendShapePreset, weight: f32) {
        // Blend shape weights are [0, 1]; the smile oscillator can swing negative.
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        self.blend_shapes.insert(preset, weight);
    }

    fn update(&mut self, dt: f32) {
        self.last_dt = dt;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_names_round_trip_for_vrm_names() {
        assert_eq!(HumanoidBone::from_name("hips"), Some(HumanoidBone::Hips));
        assert_eq!(HumanoidBone::from_name("leftUpperArm"), Some(HumanoidBone::LeftUpperArm));
        assert_eq!(HumanoidBone::from_name("rightThumbIntermediate"), Some(HumanoidBone::RightThumbIntermediate));
        assert_eq!(HumanoidBone::Head.name(), "head");
        assert_eq!(HumanoidBone::from_name("tail"), None);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(BlendShapePreset::from_name("a"), Some(BlendShapePreset::A));
        assert_eq!(BlendShapePreset::from_name("Joy"), Some(BlendShapePreset::Joy));
        assert_eq!(BlendShapePreset::from_name("blink_l"), Some(BlendShapePreset::BlinkL));
        assert_eq!(BlendShapePreset::from_name("unknown"), None);
    }

    #[test]
    fn test_rotation_keeps_other_axes() {
        let mut rig = PoseRig::with_rest_pose([(HumanoidBone::Head, Vec3::new(0.1, 0.2, 0.3))]);
        rig.set_bone_rotation(HumanoidBone::Head, Axis::Y, 1.0);
        assert_eq!(rig.bone_rotation(HumanoidBone::Head), Some(Vec3::new(0.1, 1.0, 0.3)));

        rig.set_bone_rotation(HumanoidBone::Neck, Axis::Z, -0.5);
        assert_eq!(rig.bone_rotation(HumanoidBone::Neck), Some(Vec3::new(0.0, 0.0, -0.5)));
    }

    #[test]
    fn test_blend_shape_weights_are_clamped() {
        let mut rig = PoseRig::default();
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);

        rig.set_blend_shape(BlendShapePreset::Joy, -0.4);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);
        rig.set_blend_shape(BlendShapePreset::Joy, 1.7);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 1.0);
        rig.set_blend_shape(BlendShapePreset::A, f32::NAN);
        assert_eq!(rig.blend_shape(BlendShapePreset::A), 0.0);
    }

    #[test]
    fn test_update_advances_revision() {
        let mut rig = PoseRig::default();
        rig.update(0.016);
        rig.update(0.02);
        assert_eq!(rig.revision(), 2);
        assert_eq!(rig.last_dt(), 0.02);
    }
}
