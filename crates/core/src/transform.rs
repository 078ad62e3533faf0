//! Rigid transforms between shape frames.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rigid 3D transform (rotation followed by translation) mapping a local
/// frame into its parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform3D {
    isometry: Isometry3<f64>,
}

impl Transform3D {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Creates a transform from a translation and Euler angles (radians).
    pub fn new(translation: Vector3<f64>, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::from_parts(
            translation,
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }

    /// Creates a transform from a translation and a rotation.
    pub fn from_parts(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::from_parts(translation, UnitQuaternion::identity())
    }

    /// A pure rotation.
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self::from_parts(Vector3::zeros(), rotation)
    }

    /// Returns the underlying isometry.
    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.isometry
    }

    /// Returns the translation part.
    pub fn translation(&self) -> Vector3<f64> {
        self.isometry.translation.vector
    }

    /// Returns the rotation part.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.isometry.rotation
    }

    /// Maps a local point into the parent frame.
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.isometry.transform_point(p)
    }

    /// Maps a local direction into the parent frame (rotation only).
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.isometry.transform_vector(v)
    }

    /// Maps a parent-frame point back into the local frame.
    pub fn inverse_transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.isometry.inverse_transform_point(p)
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }

    /// Composes `self` after `inner`: points go through `inner` first.
    pub fn then_after(&self, inner: &Transform3D) -> Self {
        Self {
            isometry: self.isometry * inner.isometry,
        }
    }

    /// Returns the transform taking points of this frame into `other`'s
    /// local frame, when both are expressed in the same parent frame.
    ///
    /// Equivalent to `inverse(other) ∘ self`.
    pub fn relative_to(&self, other: &Transform3D) -> Self {
        other.inverse().then_after(self)
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Isometry3<f64>> for Transform3D {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self { isometry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_round_trip() {
        let t = Transform3D::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(&p), p);
        assert_eq!(t.inverse_transform_point(&p), p);
    }

    #[test]
    fn test_translation() {
        let t = Transform3D::from_translation(Vector3::new(1.0, 0.0, -1.0));
        let p = t.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(t.inverse_transform_point(&p), Point3::origin());
    }

    #[test]
    fn test_rotation_about_z() {
        let t = Transform3D::new(Vector3::zeros(), 0.0, 0.0, FRAC_PI_2);
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_relative_to() {
        let a = Transform3D::from_translation(Vector3::new(5.0, 0.0, 0.0));
        let b = Transform3D::from_translation(Vector3::new(2.0, 0.0, 0.0));
        let rel = a.relative_to(&b);
        let p = rel.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_then_after_order() {
        let rot = Transform3D::new(Vector3::zeros(), 0.0, 0.0, FRAC_PI_2);
        let shift = Transform3D::from_translation(Vector3::new(1.0, 0.0, 0.0));
        // shift first, then rotate
        let t = rot.then_after(&shift);
        let p = t.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
