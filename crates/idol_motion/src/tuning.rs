//! Fixed tuning constants. These were picked by eye against a webcam and are
//! in detector pixel units where they touch landmarks.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

/// `happy` expression score that starts a smile.
pub const SMILE_THRESHOLD: f32 = 0.1;
/// Scale applied to the oscillator while smiling.
pub const SMILE_AMPLITUDE: f32 = 0.8;
/// A smile ends the first frame the scaled oscillator drops below this.
pub const SMILE_RELEASE: f32 = 0.1;

/// Inner lip gap of a closed mouth.
pub const LIP_CLOSED_DIST: f32 = 30.0;
/// Extra gap on top of [`LIP_CLOSED_DIST`] that counts as fully open.
pub const LIP_OPEN_SPAN: f32 = 5.0;

pub const HEAD_YAW_DEAD_BAND: f32 = 0.02;
pub const HEAD_YAW_GAIN: f32 = 2.5;
pub const HEAD_YAW_LIMIT: f32 = FRAC_PI_2;

pub const UPPER_ARM_ABDUCTION: f32 = FRAC_PI_3;

/// Every n-th render frame is skipped.
pub const RENDER_SKIP_INTERVAL: u64 = 3;

pub const DEBUG_JOY_WEIGHT: f32 = 0.5;
