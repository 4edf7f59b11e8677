use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use idol_api::{DetectOptions, DetectorError, FaceDetector, FaceResult, Frame, SubModel};

/// Roughly what one inference pass costs on a laptop.
const DEFAULT_INFERENCE_TIME: Duration = Duration::from_millis(33);

/// Stands in for the face models by replaying a recorded session.
///
/// The recording is JSON lines: one [`FaceResult`] per line, or `null` for a
/// frame where no face was found. Playback loops forever, one record per
/// captured frame.
pub struct ReplayDetector {
    faces: Vec<Option<FaceResult>>,
    cursor: usize,
    loaded: HashSet<SubModel>,
    inference_time: Duration,
}

impl ReplayDetector {
    pub fn from_reader(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut faces = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let face = serde_json::from_str::<Option<FaceResult>>(&line)
                .with_context(|| format!("invalid face on line {}", number + 1))?;
            faces.push(face);
        }

        Ok(Self {
            faces,
            cursor: 0,
            loaded: HashSet::new(),
            inference_time: DEFAULT_INFERENCE_TIME,
        })
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open face recording {}", path.display()))?;
        let detector = Self::from_reader(BufReader::new(file))?;
        tracing::info!("replaying {} recorded frames from {}", detector.len(), path.display());
        Ok(detector)
    }

    pub fn with_inference_time(mut self, inference_time: Duration) -> Self {
        self.inference_time = inference_time;
        self
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }
}

impl FaceDetector for ReplayDetector {
    fn load(&mut self, model: SubModel, weights: &Path) -> Result<(), DetectorError> {
        tracing::debug!("replay needs no {:?} weights (asked for {})", model, weights.display());
        self.loaded.insert(model);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.loaded.contains(&SubModel::TinyFaceDetector)
    }

    async fn detect(
        &mut self,
        _frame: &Frame,
        options: DetectOptions,
    ) -> Result<Option<FaceResult>, DetectorError> {
        if !self.is_ready() {
            return Err(DetectorError::NotReady);
        }
        tokio::time::sleep(self.inference_time).await;

        if self.faces.is_empty() {
            return Ok(None);
        }
        let face = self.faces[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.faces.len();

        Ok(face.filter(|face| face.score >= options.score_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"
{"landmarks": [[0.0, 0.0]], "expressions": {"happy": 0.4}, "score": 0.9}
null

{"landmarks": [[1.0, 1.0]], "expressions": {}, "score": 0.2}
"#;

    fn detector() -> ReplayDetector {
        ReplayDetector::from_reader(RECORDING.as_bytes())
            .unwrap()
            .with_inference_time(Duration::ZERO)
    }

    #[test]
    fn test_parses_recording() {
        assert_eq!(detector().len(), 3);
    }

    #[test]
    fn test_bad_line_is_reported() {
        let err = ReplayDetector::from_reader("null\n{oops}\n".as_bytes()).err().unwrap();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_replays_in_a_loop() {
        let mut detector = detector();
        let frame = Frame::blank();
        let options = DetectOptions::default();

        assert!(matches!(detector.detect(&frame, options).await, Err(DetectorError::NotReady)));

        detector.load(SubModel::TinyFaceDetector, Path::new("./weights")).unwrap();
        assert!(detector.is_ready());

        let first = detector.detect(&frame, options).await.unwrap().unwrap();
        assert_eq!(first.expression("happy"), 0.4);
        assert!(detector.detect(&frame, options).await.unwrap().is_none());
        // Below the score threshold.
        assert!(detector.detect(&frame, options).await.unwrap().is_none());
        // Wrapped around.
        assert!(detector.detect(&frame, options).await.unwrap().is_some());
    }
}
