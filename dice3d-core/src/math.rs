/// Vector helpers layered over nalgebra
use nalgebra::{Point2, Rotation3, Vector2, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Vec2 = Vector2<f32>;
pub type ScreenPoint = Point2<f32>;

/// Per-axis rotation and zero-safe normalization for `Vec3`.
pub trait VectorExt {
    /// Rotate about the X axis (right-handed, radians)
    fn rotate_x(&self, angle: f32) -> Self;
    /// Rotate about the Y axis (right-handed, radians)
    fn rotate_y(&self, angle: f32) -> Self;
    /// Unit vector in the same direction; a zero vector comes back unchanged.
    fn normalized_or_self(&self) -> Self;
}

impl VectorExt for Vec3 {
    fn rotate_x(&self, angle: f32) -> Self {
        Rotation3::from_axis_angle(&Vector3::x_axis(), angle) * self
    }

    fn rotate_y(&self, angle: f32) -> Self {
        Rotation3::from_axis_angle(&Vector3::y_axis(), angle) * self
    }

    fn normalized_or_self(&self) -> Self {
        let len = self.norm();
        if len > 0.0 {
            self / len
        } else {
            *self
        }
    }
}

/// Normalize a 2D offset, mapping the zero offset to zero.
pub fn normalize_or_zero_2d(v: Vec2) -> Vec2 {
    let len = v.norm();
    if len > 0.0 {
        v / len
    } else {
        Vec2::zeros()
    }
}

/// Average depth of a set of points.
pub fn average_z(points: &[Vec3]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.z).sum::<f32>() / points.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(120.0, -7.5, 33.0),
        ] {
            assert!((v.normalized_or_self().norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normalize_zero_is_unchanged() {
        let zero = Vec3::zeros();
        assert_eq!(zero.normalized_or_self(), zero);
        assert_eq!(normalize_or_zero_2d(Vec2::zeros()), Vec2::zeros());
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Vec3::new(1.0, -2.0, 0.5);
        let mut angle = -3.0 * PI;
        while angle < 3.0 * PI {
            assert!((v.rotate_x(angle).norm() - v.norm()).abs() < 1e-5);
            assert!((v.rotate_y(angle).norm() - v.norm()).abs() < 1e-5);
            angle += 0.37;
        }
    }

    #[test]
    fn test_rotation_direction() {
        // rotate_x: y' = y cos - z sin, z' = y sin + z cos
        let r = Vec3::new(0.0, 1.0, 0.0).rotate_x(PI / 2.0);
        assert!((r - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        // rotate_y: x' = x cos + z sin, z' = -x sin + z cos
        let r = Vec3::new(1.0, 0.0, 0.0).rotate_y(PI / 2.0);
        assert!((r - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_average_z() {
        let pts = [Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 3.0)];
        assert!((average_z(&pts) - 2.0).abs() < 1e-6);
        assert_eq!(average_z(&[]), 0.0);
    }
}
