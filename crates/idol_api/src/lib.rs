use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use bytes::Bytes;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Indices into the 68 point iBUG landmark layout.
pub mod landmarks {
    pub const COUNT: usize = 68;
    pub const UPPER_NOSE: usize = 27;
    pub const LOWER_NOSE: usize = 30;
    pub const UPPER_LIP: usize = 51;
    pub const LOWER_LIP: usize = 57;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubModel {
    TinyFaceDetector,
    FaceLandmark68,
    FaceExpression,
}

impl SubModel {
    pub const ALL: [SubModel; 3] = [
        SubModel::TinyFaceDetector,
        SubModel::FaceLandmark68,
        SubModel::FaceExpression,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectOptions {
    pub input_size: u32,
    pub score_threshold: f32,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            input_size: 224,
            score_threshold: 0.5,
        }
    }
}

/// A single face found in a frame, in detector pixel space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceResult {
    pub landmarks: Vec<Vec2>,
    pub expressions: HashMap<String, f32>,
    #[serde(default = "full_score")]
    pub score: f32,
}

fn full_score() -> f32 {
    1.0
}

impl FaceResult {
    /// Score for a named expression, zero when the detector didn't report it.
    pub fn expression(&self, name: &str) -> f32 {
        self.expressions.get(name).copied().unwrap_or(0.0)
    }

    pub fn landmark(&self, index: usize) -> Option<Vec2> {
        self.landmarks.get(index).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub payload: Bytes,
}

impl Frame {
    pub fn blank() -> Self {
        Self {
            width: 0,
            height: 0,
            payload: Bytes::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector is not ready")]
    NotReady,
    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera format not supported: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The face landmark and expression model.
pub trait FaceDetector: Send + 'static {
    fn load(&mut self, model: SubModel, weights: &Path) -> Result<(), DetectorError>;

    /// True once the face detection weights are in place.
    fn is_ready(&self) -> bool;

    fn detect(
        &mut self,
        frame: &Frame,
        options: DetectOptions,
    ) -> impl Future<Output = Result<Option<FaceResult>, DetectorError>> + Send;
}

/// Somewhere to get the most recent camera frame from.
pub trait CaptureSource: Send + Sync + 'static {
    fn latest_frame(&self) -> Option<Frame>;
}
