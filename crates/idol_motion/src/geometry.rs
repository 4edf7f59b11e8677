use std::f32::consts::PI;

use glam::Vec2;

pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x - b.x, a.y - b.y)
}

/// Angle of `v` from the positive x axis, in `[0, 2π)`.
pub fn angle(v: Vec2) -> f32 {
    (-v.y).atan2(-v.x) + PI
}
