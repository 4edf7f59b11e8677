use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

/// Latest animation inputs derived from face tracking. No history is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationSignal {
    /// Set by the detection side, cleared by the mapper once the smile decays.
    pub smiling: bool,
    pub lip_dist: Option<f32>,
    pub head_yaw_angle: Option<f32>,
    /// Baseline for the head yaw dead-band.
    pub prev_head_yaw_angle: Option<f32>,
}

/// Handle to the signal shared by the detection and render loops.
///
/// Each access is a short critical section. There is deliberately no
/// coordination beyond that: the loops run at their own pace and whatever
/// was written last is what the other side sees.
#[derive(Debug, Clone, Default)]
pub struct SharedSignal(Arc<Mutex<AnimationSignal>>);

impl SharedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AnimationSignal {
        *self.0.lock()
    }

    pub fn update<T>(&self, f: impl FnOnce(&mut AnimationSignal) -> T) -> T {
        let mut signal = self.0.lock();
        f(&mut signal)
    }
}

/// Landmarks of the last face found, for drawing. They stay put when a
/// detection pass finds nothing.
#[derive(Debug, Clone, Default)]
pub struct SharedLandmarks(Arc<Mutex<Vec<Vec2>>>);

impl SharedLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, landmarks: &[Vec2]) {
        let mut current = self.0.lock();
        current.clear();
        current.extend_from_slice(landmarks);
    }

    pub fn snapshot(&self) -> Vec<Vec2> {
        self.0.lock().clone()
    }
}
