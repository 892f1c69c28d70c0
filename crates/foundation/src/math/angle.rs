//! Spherical viewing conventions.
//!
//! Right-handed, +Y up. Yaw 0 / pitch 0 looks down -Z; positive yaw turns
//! right (toward +X), positive pitch looks up. All angles are in degrees.

use super::Vec3;

/// Wrap a yaw angle into `(-180, 180]`.
pub fn wrap_yaw(yaw_deg: f64) -> f64 {
    let mut y = (yaw_deg + 180.0).rem_euclid(360.0) - 180.0;
    if y == -180.0 {
        y = 180.0;
    }
    y
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`.
pub fn shortest_yaw_delta(from_deg: f64, to_deg: f64) -> f64 {
    wrap_yaw(to_deg - from_deg)
}

/// Unit view direction for a yaw/pitch pair.
pub fn direction_from_yaw_pitch(yaw_deg: f64, pitch_deg: f64) -> Vec3 {
    let (sy, cy) = yaw_deg.to_radians().sin_cos();
    let (sp, cp) = pitch_deg.to_radians().sin_cos();
    Vec3::new(sy * cp, sp, -cy * cp)
}

/// Inverse of [`direction_from_yaw_pitch`]. Returns `(yaw, pitch)`.
pub fn yaw_pitch_from_direction(dir: Vec3) -> Option<(f64, f64)> {
    let d = dir.normalized()?;
    let pitch = d.y.clamp(-1.0, 1.0).asin().to_degrees();
    let yaw = d.x.atan2(-d.z).to_degrees();
    Some((wrap_yaw(yaw), pitch))
}

/// Angle between two directions in degrees.
pub fn angle_between(a: Vec3, b: Vec3) -> f64 {
    let (Some(a), Some(b)) = (a.normalized(), b.normalized()) else {
        return 180.0;
    };
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Horizontal field of view for a vertical fov and aspect ratio.
pub fn horizontal_fov(vertical_fov_deg: f64, aspect: f64) -> f64 {
    let half = (vertical_fov_deg.to_radians() * 0.5).tan() * aspect.max(0.0);
    (2.0 * half.atan()).to_degrees()
}
