//! # Stowage 3D
//!
//! Convex hulls, shape metrics and bin packing for the stowage engine.
//!
//! This crate decides whether objects fit into containers:
//!
//! - [`ConvexHull`]: incremental hull of a point cloud with containment tests
//! - [`ShapeMetric`]: bounds, optional hull, volume, area, mass and cost of an
//!   object, plus box, hull and mesh fit tests
//! - [`Packer`]: keeps a set of boxes in one container and accepts a new one
//!   only if the whole set still packs
//!
//! ## Example
//!
//! ```rust
//! use nalgebra::{Point3, Vector3};
//! use stowage_d3::{PackedObject, Packer, ShapeMetric};
//!
//! let container = ShapeMetric::from_box(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
//! let mut packer = Packer::new(container);
//!
//! assert!(packer.try_add(PackedObject::new("a", Vector3::new(2.0, 2.0, 1.0))).is_ok());
//! assert!(packer.try_add(PackedObject::new("b", Vector3::new(2.0, 2.0, 1.0))).is_ok());
//! assert!(!packer.can_add(&PackedObject::new("c", Vector3::new(1.0, 1.0, 1.0))));
//! ```

pub mod bounds;
pub mod hull;
pub mod mesh;
pub mod metric;
pub mod packer;
pub mod shape;
pub mod tree;

// Re-exports
pub use bounds::Bounds;
pub use hull::ConvexHull;
pub use mesh::ContainerMesh;
pub use metric::ShapeMetric;
pub use packer::{PackedObject, Packer};
pub use shape::SubShape;
pub use stowage_core::{Config, Error, Result, Transform3D};
pub use tree::Placement;
