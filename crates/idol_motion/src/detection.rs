use std::path::Path;

use idol_api::{CaptureSource, DetectOptions, DetectorError, FaceDetector, SubModel};

use crate::extract::extract;
use crate::signal::{SharedLandmarks, SharedSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStep {
    /// Detector weights aren't in place yet.
    NotReady,
    NoFrame,
    NoFace,
    Face,
    /// The detector failed or returned something unusable.
    Rejected,
}

/// Polls the camera, runs the detector and feeds the shared signal.
///
/// Runs as fast as inference allows; there is no frame cap and no way to stop
/// it short of dropping the runtime.
pub struct DetectionLoop<D> {
    detector: D,
    capture: Box<dyn CaptureSource>,
    signal: SharedSignal,
    landmarks: Option<SharedLandmarks>,
}

impl<D: FaceDetector> DetectionLoop<D> {
    pub fn new(detector: D, capture: Box<dyn CaptureSource>, signal: SharedSignal) -> Self {
        Self {
            detector,
            capture,
            signal,
            landmarks: None,
        }
    }

    /// Also publish the landmarks of every accepted face.
    pub fn with_landmarks(mut self, landmarks: SharedLandmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Load every sub-model from `weights`, in order.
    pub fn load_models(&mut self, weights: &Path) -> Result<(), DetectorError> {
        for model in SubModel::ALL {
            self.detector.load(model, weights)?;
            tracing::info!("loaded {:?} from {}", model, weights.display());
        }
        Ok(())
    }

    pub async fn step(&mut self) -> DetectionStep {
        if !self.detector.is_ready() {
            return DetectionStep::NotReady;
        }
        let Some(frame) = self.capture.latest_frame() else {
            return DetectionStep::NoFrame;
        };

        let face = match self.detector.detect(&frame, DetectOptions::default()).await {
            Ok(face) => face,
            Err(err) => {
                tracing::warn!("face detection failed: {}", err);
                return DetectionStep::Rejected;
            }
        };

        match self.signal.update(|signal| extract(signal, face.as_ref())) {
            Ok(Some(_)) => {
                if let (Some(landmarks), Some(face)) = (&self.landmarks, &face) {
                    landmarks.replace(&face.landmarks);
                }
                DetectionStep::Face
            }
            Ok(None) => DetectionStep::NoFace,
            Err(err) => {
                tracing::warn!("ignoring face: {}", err);
                DetectionStep::Rejected
            }
        }
    }

    pub async fn run(mut self) {
        loop {
            self.step().await;
            tokio::task::yield_now().await;
        }
    }
}
