//! Error types shared by the stowage crates.

use thiserror::Error;

/// Errors produced by hull construction and mesh validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A convex hull needs at least four points.
    #[error("convex hull needs at least 4 points, {0} given")]
    DegenerateInput(usize),

    /// Geometry that cannot be measured (non-finite coordinates, negative sizes).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A container mesh with malformed triangles.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::DegenerateInput(3).to_string(),
            "convex hull needs at least 4 points, 3 given"
        );
        assert_eq!(
            Error::InvalidMesh("index 9 out of range".into()).to_string(),
            "invalid mesh: index 9 out of range"
        );
    }
}
