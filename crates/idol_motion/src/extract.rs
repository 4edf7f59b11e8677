//! Turns a detected face into animation signals.

use std::f32::consts::FRAC_PI_2;

use idol_api::{landmarks, FaceResult};
use thiserror::Error;

use crate::geometry;
use crate::signal::AnimationSignal;
use crate::tuning::SMILE_THRESHOLD;

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("face result is missing landmark {index} (got {count} points)")]
    MissingLandmark { index: usize, count: usize },
}

/// What one face contributes to the animation signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceSignals {
    pub smile_trigger: bool,
    /// Radians about the vertical axis, approximated from the nose bridge tilt.
    pub head_yaw_angle: f32,
    /// Vertical inner lip gap in detector pixels, not normalised for face size.
    pub lip_dist: f32,
}

impl FaceSignals {
    pub fn from_face(face: &FaceResult) -> Result<Self, ExtractError> {
        let point = |index| {
            face.landmark(index).ok_or(ExtractError::MissingLandmark {
                index,
                count: face.landmarks.len(),
            })
        };
        let upper_nose = point(landmarks::UPPER_NOSE)?;
        let lower_nose = point(landmarks::LOWER_NOSE)?;
        let upper_lip = point(landmarks::UPPER_LIP)?;
        let lower_lip = point(landmarks::LOWER_LIP)?;

        // Image y points down, so an upright nose sits at π/2.
        let nose = geometry::sub(lower_nose, upper_nose);
        let head_yaw_angle = -(geometry::angle(nose) - FRAC_PI_2);

        Ok(Self {
            smile_trigger: face.expression("happy") > SMILE_THRESHOLD,
            head_yaw_angle,
            lip_dist: lower_lip.y - upper_lip.y,
        })
    }

    /// Write into the signal. The smile only ever latches on here.
    pub fn apply(&self, signal: &mut AnimationSignal) {
        if self.smile_trigger {
            signal.smiling = true;
        }
        signal.head_yaw_angle = Some(self.head_yaw_angle);
        signal.lip_dist = Some(self.lip_dist);
    }
}

/// Update `signal` from a detection attempt. Without a face the previous
/// values are held. A malformed face leaves the signal untouched.
pub fn extract(
    signal: &mut AnimationSignal,
    face: Option<&FaceResult>,
) -> Result<Option<FaceSignals>, ExtractError> {
    let Some(face) = face else {
        return Ok(None);
    };
    let signals = FaceSignals::from_face(face)?;
    signals.apply(signal);
    Ok(Some(signals))
}
