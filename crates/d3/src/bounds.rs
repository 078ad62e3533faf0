//! Axis-aligned bounding boxes.
//!
//! Bounds are stored as center plus half-extents, the form the metric and
//! fit tests work with. Min/max corners are derived on demand.

use nalgebra::{Point3, Vector3};
use stowage_core::Transform3D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for inclusive containment tests.
pub const CONTAINS_EPSILON: f64 = 1e-6;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    /// Center of the box.
    pub center: Point3<f64>,
    /// Half of the size along each axis.
    pub extents: Vector3<f64>,
}

impl Bounds {
    /// Creates bounds from a center and a full size.
    pub fn new(center: Point3<f64>, size: Vector3<f64>) -> Self {
        Self {
            center,
            extents: size.abs() / 2.0,
        }
    }

    /// Creates bounds from min and max corners.
    pub fn from_min_max(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            center: nalgebra::center(&min, &max),
            extents: (max - min).abs() / 2.0,
        }
    }

    /// Creates the smallest bounds enclosing all points.
    ///
    /// Returns `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Self::new(*first, Vector3::zeros());
        for p in iter {
            b.encapsulate(p);
        }
        Some(b)
    }

    /// Minimum corner.
    pub fn min(&self) -> Point3<f64> {
        self.center - self.extents
    }

    /// Maximum corner.
    pub fn max(&self) -> Point3<f64> {
        self.center + self.extents
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.extents * 2.0
    }

    /// Grows the box to include `p`.
    pub fn encapsulate(&mut self, p: &Point3<f64>) {
        let min = self.min().inf(p);
        let max = self.max().sup(p);
        *self = Self::from_min_max(min, max);
    }

    /// Grows the box to include another box.
    pub fn encapsulate_bounds(&mut self, other: &Bounds) {
        self.encapsulate(&other.min());
        self.encapsulate(&other.max());
    }

    /// The 8 corners of the box.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let min = self.min();
        let max = self.max();
        [
            Point3::new(min.x, min.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, max.y, max.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(max.x, max.y, max.z),
        ]
    }

    /// Corners mapped through a transform.
    pub fn transformed_corners(&self, transform: &Transform3D) -> [Point3<f64>; 8] {
        self.corners().map(|c| transform.transform_point(&c))
    }

    /// Checks if this box contains a point (inclusive, within
    /// [`CONTAINS_EPSILON`]).
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.extents.x + CONTAINS_EPSILON
            && d.y <= self.extents.y + CONTAINS_EPSILON
            && d.z <= self.extents.z + CONTAINS_EPSILON
    }

    /// Checks if this box intersects another box (touching faces do not
    /// count).
    pub fn intersects(&self, other: &Bounds) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x
            && a_max.x > b_min.x
            && a_min.y < b_max.y
            && a_max.y > b_min.y
            && a_min.z < b_max.z
            && a_max.z > b_min.z
    }

    /// Checks if this box lies within another box.
    pub fn is_within(&self, other: &Bounds) -> bool {
        other.contains_point(&self.min()) && other.contains_point(&self.max())
    }

    /// Expands this box by a margin on all sides.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            center: self.center,
            extents: self.extents.add_scalar(margin),
        }
    }

    /// Scales the box about its center.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            center: self.center,
            extents: self.extents * factor.abs(),
        }
    }

    /// Returns the volume of the box.
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Returns the surface area of the box.
    pub fn area(&self) -> f64 {
        let s = self.size();
        2.0 * (s.x * s.y + s.y * s.z + s.x * s.z)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            extents: Vector3::zeros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, -1.0, 4.0),
            Point3::new(1.0, 3.0, 1.0),
        ];
        let b = Bounds::from_points(&points).unwrap();
        assert_relative_eq!(b.min(), Point3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(b.max(), Point3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(b.size(), Vector3::new(2.0, 4.0, 4.0));
        let none: [Point3<f64>; 0] = [];
        assert!(Bounds::from_points(&none).is_none());
    }

    #[test]
    fn test_volume_and_area() {
        let b = Bounds::new(Point3::origin(), Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(b.volume(), 6.0);
        assert_relative_eq!(b.area(), 22.0);
    }

    #[test]
    fn test_corners_are_contained() {
        let b = Bounds::new(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 4.0, 6.0));
        for c in b.corners() {
            assert!(b.contains_point(&c));
        }
        assert!(!b.contains_point(&Point3::new(2.1, 1.0, 1.0)));
    }

    #[test]
    fn test_intersects() {
        let a = Bounds::from_min_max(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let b = Bounds::from_min_max(Point3::new(5.0, 5.0, 5.0), Point3::new(15.0, 15.0, 15.0));
        let c = Bounds::from_min_max(Point3::new(10.0, 0.0, 0.0), Point3::new(20.0, 10.0, 10.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        // touching faces only
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_is_within() {
        let outer = Bounds::from_min_max(Point3::origin(), Point3::new(100.0, 100.0, 100.0));
        let inner =
            Bounds::from_min_max(Point3::new(10.0, 10.0, 10.0), Point3::new(20.0, 20.0, 20.0));
        let partial =
            Bounds::from_min_max(Point3::new(90.0, 90.0, 90.0), Point3::new(110.0, 110.0, 110.0));

        assert!(inner.is_within(&outer));
        assert!(!partial.is_within(&outer));
        assert!(!outer.is_within(&inner));
    }

    #[test]
    fn test_expand_and_scale() {
        let b = Bounds::new(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(b.expand(1.0).size(), Vector3::new(4.0, 4.0, 4.0));
        assert_relative_eq!(b.scale(3.0).volume(), 216.0);
    }
}
