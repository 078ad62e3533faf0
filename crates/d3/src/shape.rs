//! Sub-shapes combined into a shape metric.

use crate::bounds::Bounds;
use nalgebra::Point3;
use stowage_core::Transform3D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rigid part of a larger object.
///
/// Vertices are given in the part's local frame; `transform` maps them into
/// the frame shared by all parts of the object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubShape {
    /// Local-to-common frame transform.
    pub transform: Transform3D,
    /// Vertices in the local frame.
    pub vertices: Vec<Point3<f64>>,
    /// Mass of the part.
    pub mass: f64,
    /// Cost of the part.
    pub cost: f64,
    /// Storage capacity the part provides.
    pub capacity: u32,
}

impl SubShape {
    /// Creates a massless part at the identity transform.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        Self {
            transform: Transform3D::identity(),
            vertices,
            mass: 0.0,
            cost: 0.0,
            capacity: 0,
        }
    }

    /// Sets the local-to-common transform.
    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the mass.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Bounding box in the local frame, `None` without vertices.
    pub fn local_bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }

    /// Vertices mapped into the common frame.
    pub fn transformed_vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices
            .iter()
            .map(move |v| self.transform.transform_point(v))
    }
}
