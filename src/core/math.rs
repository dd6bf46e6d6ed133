// Vector helpers shared by the movement solver and the motor

use glam::{Mat3, Quat, Vec3};

/// Squared length below which a vector is treated as zero
pub const DEGENERATE_SQ: f32 = 1e-6;

/// Remove the component of `v` along `normal`
///
/// `normal` does not need to be unit length. A degenerate normal leaves `v`
/// untouched.
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let n_sq = normal.length_squared();
    if n_sq < f32::EPSILON {
        return v;
    }
    v - normal * (v.dot(normal) / n_sq)
}

/// Shorten `v` to at most `max` length, keeping its direction
pub fn clamp_magnitude(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Re-project a direction onto a surface so that it follows the surface
/// while keeping its heading relative to `up`
///
/// Returns a unit vector, or zero when `direction` is zero or parallel to `up`.
pub fn direction_tangent_to_surface(direction: Vec3, surface_normal: Vec3, up: Vec3) -> Vec3 {
    let right = direction.cross(up);
    surface_normal.cross(right).normalize_or_zero()
}

/// Angle in radians between two vectors, zero if either is degenerate
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < DEGENERATE_SQ || b.length_squared() < DEGENERATE_SQ {
        return 0.0;
    }
    a.angle_between(b)
}

/// Frame-rate independent blend factor for exponential smoothing
pub fn damp(response: f32, dt: f32) -> f32 {
    1.0 - (-response * dt).exp()
}

/// Spherically interpolate between two unit directions
///
/// `t` is clamped to `[0, 1]`. Antiparallel inputs rotate around an arbitrary
/// perpendicular axis.
pub fn slerp_direction(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let arc = Quat::from_rotation_arc(from, to);
    (Quat::IDENTITY.slerp(arc, t) * from).normalize_or_zero()
}

/// Rotation whose +Z axis faces `forward` and whose +Y axis is as close to
/// `up` as possible
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize();
    let right = up.cross(forward).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// The part of `rotation` that turns about `up`
///
/// A rotation looking straight along `up` falls back to its own up axis for
/// the heading.
pub fn yaw_only(rotation: Quat, up: Vec3) -> Quat {
    let mut forward = project_on_plane(rotation * Vec3::Z, up);
    if forward.length_squared() < DEGENERATE_SQ {
        forward = project_on_plane(rotation * Vec3::Y, up);
    }
    if forward.length_squared() < DEGENERATE_SQ {
        return Quat::IDENTITY;
    }
    look_rotation(forward, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_yaw_only_drops_pitch() {
        let rotation = Quat::from_rotation_y(0.3) * Quat::from_rotation_x(0.8);
        let yaw = yaw_only(rotation, Vec3::Y);
        let forward = yaw * Vec3::Z;
        assert_abs_diff_eq!(forward.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forward.length(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forward.x, 0.3f32.sin(), epsilon = 1e-5);
        assert_abs_diff_eq!(forward.z, 0.3f32.cos(), epsilon = 1e-5);

        // Looking straight down still keeps the heading
        let down = Quat::from_rotation_y(0.3) * Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        let forward = yaw_only(down, Vec3::Y) * Vec3::Z;
        assert_abs_diff_eq!(forward.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(forward.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_project_on_plane() {
        let v = project_on_plane(Vec3::new(3.0, 4.0, 5.0), Vec3::Y);
        assert_eq!(v, Vec3::new(3.0, 0.0, 5.0));

        // Unnormalized normal gives the same answer
        let v = project_on_plane(Vec3::new(3.0, 4.0, 5.0), Vec3::Y * 10.0);
        assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clamp_magnitude() {
        let v = clamp_magnitude(Vec3::new(3.0, 0.0, 4.0), 1.0);
        assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-6);
        assert_eq!(clamp_magnitude(Vec3::X * 0.5, 1.0), Vec3::X * 0.5);
        assert_eq!(clamp_magnitude(Vec3::ZERO, 0.0), Vec3::ZERO);
    }

    #[test]
    fn test_tangent_on_flat_ground_keeps_heading() {
        let dir = direction_tangent_to_surface(Vec3::Z, Vec3::Y, Vec3::Y);
        assert_abs_diff_eq!(dir.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dir.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dir.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tangent_on_slope_follows_surface() {
        // 45 degree ramp rising toward +Z
        let normal = Vec3::new(0.0, 1.0, -1.0).normalize();
        let dir = direction_tangent_to_surface(Vec3::Z, normal, Vec3::Y);
        assert_abs_diff_eq!(dir.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dir.dot(normal), 0.0, epsilon = 1e-5);
        assert!(dir.y > 0.0, "moving into the ramp should climb it");
    }

    #[test]
    fn test_tangent_of_zero_is_zero() {
        assert_eq!(
            direction_tangent_to_surface(Vec3::ZERO, Vec3::Y, Vec3::Y),
            Vec3::ZERO
        );
    }

    #[test]
    fn test_damp_range() {
        assert_eq!(damp(25.0, 0.0), 0.0);
        let f = damp(25.0, 1.0 / 60.0);
        assert!(f > 0.0 && f < 1.0);
        assert_abs_diff_eq!(damp(1000.0, 1.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_slerp_direction() {
        let half = slerp_direction(Vec3::X, Vec3::Z, 0.5);
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert_abs_diff_eq!(half.x, expected.x, epsilon = 1e-5);
        assert_abs_diff_eq!(half.z, expected.z, epsilon = 1e-5);

        // Overshooting t is clamped to the target
        let end = slerp_direction(Vec3::X, Vec3::Z, 3.0);
        assert_abs_diff_eq!(end.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_rotation_maps_forward() {
        let forward = Vec3::new(1.0, 0.0, 1.0).normalize();
        let rot = look_rotation(forward, Vec3::Y);
        let mapped = rot * Vec3::Z;
        assert_abs_diff_eq!(mapped.x, forward.x, epsilon = 1e-5);
        assert_abs_diff_eq!(mapped.z, forward.z, epsilon = 1e-5);
        let mapped_up = rot * Vec3::Y;
        assert_abs_diff_eq!(mapped_up.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_angle_between_degenerate() {
        assert_eq!(angle_between(Vec3::ZERO, Vec3::Y), 0.0);
        assert_abs_diff_eq!(
            angle_between(Vec3::Y, Vec3::X),
            std::f32::consts::FRAC_PI_2,
            epsilon = 1e-6
        );
    }
}
