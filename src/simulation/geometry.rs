//! Geometry helpers shared by every tick updater.

use bevy::math::Vec2;

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector from `from` towards `to`, zero when the points coincide.
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    normalize_or_zero(to - from)
}

pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len = v.length();
    if len <= f32::EPSILON {
        Vec2::ZERO
    } else {
        v / len
    }
}

pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    within_radius(a, b, radius_a + radius_b)
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Facing rotation in radians for a direction; zero for a zero vector.
pub fn facing_angle(dir: Vec2) -> f32 {
    if dir == Vec2::ZERO {
        0.0
    } else {
        dir.y.atan2(dir.x)
    }
}

pub fn point_on_ring(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Clamp a position inside the square arena.
pub fn clamp_to_arena(pos: Vec2, half_extent: f32) -> Vec2 {
    pos.clamp(Vec2::splat(-half_extent), Vec2::splat(half_extent))
}
