//! # Stowage Core
//!
//! Shared types for the stowage fitting and packing engine.
//!
//! This crate provides what the 3D crate builds on:
//!
//! - **Capability traits**: [`Identified`], [`HasExtent`], [`HasMass`],
//!   [`HasCost`] and the blanket [`Packable`] bound used by packers
//! - **Transforms**: [`Transform3D`], a rigid transform between shape frames
//! - **Configuration**: [`Config`] for metric construction and packing
//! - **Errors**: [`Error`] and the [`Result`] alias
//!
//! ## Configuration
//!
//! ```rust
//! use stowage_core::Config;
//!
//! let config = Config::new()
//!     .with_packing(true)
//!     .with_precise_metrics(true)
//!     .with_full_vertex_ratio(0.05);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod geometry;
pub mod transform;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use geometry::{fits_somehow, sorted_extents, HasCost, HasExtent, HasMass, Identified, Packable};
pub use transform::Transform3D;
