use std::f32::consts::PI;

use crate::rig::{AvatarRig, Axis, BlendShapePreset, HumanoidBone};
use crate::signal::AnimationSignal;
use crate::tuning::*;

/// Mouth open weight for an inner lip gap, clamped to `[0, 1]`.
pub fn lip_ratio(lip_dist: f32) -> f32 {
    ((lip_dist - LIP_CLOSED_DIST) / LIP_OPEN_SPAN).clamp(0.0, 1.0)
}

/// Period of `sin(π·t)`.
const OSCILLATOR_PERIOD: f32 = 2.0;

/// Drives an avatar's pose from the latest [`AnimationSignal`], once per frame.
#[derive(Debug, Clone, Default)]
pub struct AnimationMapper {
    /// Kept within one oscillator period so it never loses precision.
    elapsed: f32,
}

impl AnimationMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation time in seconds, wrapped to the oscillator period. It only
    /// runs while an avatar is mapped.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn apply<R: AvatarRig + ?Sized>(
        &mut self,
        signal: &mut AnimationSignal,
        rig: &mut R,
        dt: f32,
    ) {
        self.elapsed = (self.elapsed + dt).rem_euclid(OSCILLATOR_PERIOD);
        let mut s = (PI * self.elapsed).sin();

        // The smile rides the oscillator and ends on its first pass near zero,
        // whatever the face is doing by then.
        if signal.smiling {
            s *= SMILE_AMPLITUDE;
            rig.set_blend_shape(BlendShapePreset::A, 0.0);
            rig.set_blend_shape(BlendShapePreset::Joy, s);
            if s.abs() < SMILE_RELEASE {
                signal.smiling = false;
                rig.set_blend_shape(BlendShapePreset::Joy, 0.0);
            }
        }

        match signal.lip_dist {
            Some(lip_dist) if !signal.smiling => {
                rig.set_blend_shape(BlendShapePreset::A, lip_ratio(lip_dist));
            }
            _ => {}
        }

        if let Some(yaw) = head_yaw_target(signal) {
            rig.set_bone_rotation(HumanoidBone::Head, Axis::Y, yaw);
        }

        rig.set_bone_rotation(HumanoidBone::LeftUpperArm, Axis::Z, UPPER_ARM_ABDUCTION);
        rig.set_bone_rotation(HumanoidBone::RightUpperArm, Axis::Z, -UPPER_ARM_ABDUCTION);

        rig.update(dt);
    }
}

/// Head bone yaw for this frame, if the tracked yaw moved past the dead-band
/// and the amplified value is plausible. Always moves the baseline to the
/// latest yaw.
fn head_yaw_target(signal: &mut AnimationSignal) -> Option<f32> {
    let yaw = signal.head_yaw_angle?;
    let moved = signal
        .prev_head_yaw_angle
        .is_some_and(|prev| (yaw - prev).abs() > HEAD_YAW_DEAD_BAND);
    signal.prev_head_yaw_angle = Some(yaw);

    let amplified = yaw * HEAD_YAW_GAIN;
    (moved && amplified.abs() < HEAD_YAW_LIMIT).then_some(amplified)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use super::*;
    use crate::extract::{extract, tests::face};
    use crate::rig::PoseRig;

    #[test]
    fn test_lip_ratio_bounds() {
        assert_eq!(lip_ratio(0.0), 0.0);
        assert_eq!(lip_ratio(30.0), 0.0);
        assert_eq!(lip_ratio(32.5), 0.5);
        assert_eq!(lip_ratio(35.0), 1.0);
        assert_eq!(lip_ratio(1000.0), 1.0);
        assert_eq!(lip_ratio(-1000.0), 0.0);
        for d in (-100..200).map(|d| d as f32 * 0.37) {
            let r = lip_ratio(d);
            assert!((0.0..=1.0).contains(&r), "lip_ratio({d}) = {r}");
        }
    }

    #[test]
    fn test_mouth_follows_lips_when_not_smiling() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            lip_dist: Some(34.0),
            ..Default::default()
        };
        mapper.apply(&mut signal, &mut rig, 0.016);
        assert!((rig.blend_shape(BlendShapePreset::A) - 0.8).abs() < 1e-6);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);
    }

    #[test]
    fn test_smile_decays_then_snaps_once() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            smiling: true,
            ..Default::default()
        };

        // sin(π·t) stays above the release level until t reaches 1.
        for step in 1..10 {
            mapper.apply(&mut signal, &mut rig, 0.1);
            assert!(signal.smiling, "smile ended early at step {step}");
            assert!(rig.blend_shape(BlendShapePreset::Joy) > 0.0);
            assert_eq!(rig.blend_shape(BlendShapePreset::A), 0.0);
        }

        mapper.apply(&mut signal, &mut rig, 0.1);
        assert!(!signal.smiling);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);

        // Nothing re-arms it without the detector.
        mapper.apply(&mut signal, &mut rig, 0.1);
        assert!(!signal.smiling);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);
    }

    #[test]
    fn test_smile_peak_is_scaled() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            smiling: true,
            ..Default::default()
        };
        mapper.apply(&mut signal, &mut rig, 0.5);
        assert!((rig.blend_shape(BlendShapePreset::Joy) - SMILE_AMPLITUDE).abs() < 1e-6);
    }

    #[test]
    fn test_smile_in_negative_phase_never_reads_negative() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal::default();
        mapper.apply(&mut signal, &mut rig, 1.2);

        signal.smiling = true;
        mapper.apply(&mut signal, &mut rig, 0.05);
        assert!(signal.smiling);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);
    }

    #[test]
    fn test_mouth_released_on_the_frame_the_smile_ends() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            smiling: true,
            lip_dist: Some(40.0),
            ..Default::default()
        };
        // t = 1: the oscillator is at zero.
        mapper.apply(&mut signal, &mut rig, 1.0);
        assert!(!signal.smiling);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);
        assert_eq!(rig.blend_shape(BlendShapePreset::A), 1.0);
    }

    #[test]
    fn test_smile_still_releases_after_long_uptime() {
        let mut mapper = AnimationMapper {
            elapsed: 600_000.5,
        };
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            smiling: true,
            ..Default::default()
        };

        for _ in 0..600 {
            mapper.apply(&mut signal, &mut rig, 1.0 / 60.0);
            assert!(mapper.elapsed() < OSCILLATOR_PERIOD);
        }
        assert!(!signal.smiling);
        assert_eq!(rig.blend_shape(BlendShapePreset::Joy), 0.0);
    }

    #[test]
    fn test_clock_wraps_without_changing_phase() {
        let mut wrapped = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            smiling: true,
            ..Default::default()
        };
        wrapped.apply(&mut signal, &mut rig, 2.25);
        assert!((wrapped.elapsed() - 0.25).abs() < 1e-6);

        let expected = (PI * 0.25).sin() * SMILE_AMPLITUDE;
        assert!((rig.blend_shape(BlendShapePreset::Joy) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_head_yaw_dead_band_sequence() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal::default();

        signal.head_yaw_angle = Some(0.0);
        mapper.apply(&mut signal, &mut rig, 0.016);
        assert_eq!(rig.bone_rotation(HumanoidBone::Head), None);
        assert_eq!(signal.prev_head_yaw_angle, Some(0.0));

        signal.head_yaw_angle = Some(0.01);
        mapper.apply(&mut signal, &mut rig, 0.016);
        assert_eq!(rig.bone_rotation(HumanoidBone::Head), None);
        assert_eq!(signal.prev_head_yaw_angle, Some(0.01));

        signal.head_yaw_angle = Some(0.5);
        mapper.apply(&mut signal, &mut rig, 0.016);
        let head = rig.bone_rotation(HumanoidBone::Head).unwrap();
        assert_eq!(head.y, 1.25);
        assert_eq!(signal.prev_head_yaw_angle, Some(0.5));
    }

    #[test]
    fn test_head_yaw_outlier_is_dropped_not_clamped() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            head_yaw_angle: Some(0.7),
            prev_head_yaw_angle: Some(0.0),
            ..Default::default()
        };
        mapper.apply(&mut signal, &mut rig, 0.016);
        assert_eq!(rig.bone_rotation(HumanoidBone::Head), None);
        assert_eq!(signal.prev_head_yaw_angle, Some(0.7));
    }

    #[test]
    fn test_unchanged_yaw_holds_head() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal {
            head_yaw_angle: Some(0.2),
            prev_head_yaw_angle: Some(0.0),
            ..Default::default()
        };
        mapper.apply(&mut signal, &mut rig, 0.016);
        mapper.apply(&mut signal, &mut rig, 0.016);
        mapper.apply(&mut signal, &mut rig, 0.016);
        let head = rig.bone_rotation(HumanoidBone::Head).unwrap();
        assert!((head.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_idle_arms_and_rig_update_every_frame() {
        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        let mut signal = AnimationSignal::default();
        mapper.apply(&mut signal, &mut rig, 0.016);
        mapper.apply(&mut signal, &mut rig, 0.032);

        assert_eq!(rig.bone_rotation(HumanoidBone::LeftUpperArm).unwrap().z, FRAC_PI_3);
        assert_eq!(rig.bone_rotation(HumanoidBone::RightUpperArm).unwrap().z, -FRAC_PI_3);
        assert_eq!(rig.revision(), 2);
        assert_eq!(rig.last_dt(), 0.032);
        assert!((mapper.elapsed() - 0.048).abs() < 1e-6);
    }

    #[test]
    fn test_happy_face_end_to_end() {
        let mut signal = AnimationSignal::default();
        extract(&mut signal, Some(&face(0.2, 0.0, 30.0))).unwrap();
        assert!(signal.smiling);
        assert!(signal.head_yaw_angle.unwrap().abs() < 1e-6);
        assert_eq!(signal.lip_dist, Some(30.0));

        let mut mapper = AnimationMapper::new();
        let mut rig = PoseRig::default();
        mapper.apply(&mut signal, &mut rig, 0.25);

        assert!(signal.smiling);
        assert_eq!(rig.blend_shape(BlendShapePreset::A), 0.0);
        let expected = (PI * 0.25).sin() * SMILE_AMPLITUDE;
        assert!((rig.blend_shape(BlendShapePreset::Joy) - expected).abs() < 1e-6);
        // First yaw only sets the baseline.
        assert_eq!(rig.bone_rotation(HumanoidBone::Head), None);
    }
}
