use bevy::prelude::*;
use idol_motion::SharedLandmarks;

use crate::{WINDOW_HEIGHT, WINDOW_WIDTH};

/// Landmarks of the last tracked face.
#[derive(Resource, Clone)]
pub struct Landmarks(pub SharedLandmarks);

/// Gizmos drawn over the avatar view rather than into the scene.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct LandmarkGizmos;

/// Capture size, which is the detector's pixel space.
const SOURCE_SIZE: Vec2 = Vec2::new(640., 480.);
const OVERLAY_SCALE: f32 = 0.5;
const POINT_RADIUS: f32 = 1.5;

/// Place a detector pixel in the bottom left corner of the window, in 2D
/// camera coordinates.
pub fn overlay_position(point: Vec2) -> Vec2 {
    let corner = -Vec2::new(WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32) / 2.;
    corner + Vec2::new(point.x, SOURCE_SIZE.y - point.y) * OVERLAY_SCALE
}

pub fn draw_landmarks(landmarks: Res<Landmarks>, mut gizmos: Gizmos<LandmarkGizmos>) {
    let color = Color::srgb(0.2, 0.4, 1.0);
    for point in landmarks.0.snapshot() {
        gizmos.circle_2d(overlay_position(point), POINT_RADIUS, color);
    }
}
