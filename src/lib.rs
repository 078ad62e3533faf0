//! # Stowage
//!
//! Fitting and packing engine for 3D objects and containers.
//!
//! This crate bundles:
//! - **Core**: capability traits, transforms, configuration and errors
//! - **3D**: convex hulls, shape metrics and the container packer
//!
//! ## Quick Start
//!
//! ```rust
//! use stowage::d3::{PackedObject, Packer, ShapeMetric};
//! use nalgebra::{Point3, Vector3};
//!
//! let container = ShapeMetric::from_box(Point3::origin(), Vector3::new(10.0, 10.0, 10.0));
//! let mut packer = Packer::new(container);
//! packer
//!     .try_add(PackedObject::new(1u32, Vector3::new(6.0, 6.0, 6.0)))
//!     .expect("fits into an empty container");
//!
//! // plenty of volume left, but no room for a second cube
//! assert!(packer.free_volume() > 216.0);
//! assert!(!packer.can_add(&PackedObject::new(2u32, Vector3::new(6.0, 6.0, 6.0))));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialization support

/// Core traits and abstractions.
pub use stowage_core as core;

/// Hulls, metrics and packing in 3D.
pub use stowage_d3 as d3;

// Re-export commonly used types at root level
pub use stowage_core::{Config, Error, Packable, Result, Transform3D};
pub use stowage_d3::{ConvexHull, PackedObject, Packer, ShapeMetric};
