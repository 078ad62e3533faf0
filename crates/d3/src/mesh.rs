//! Triangle meshes used as container interiors.

use crate::bounds::Bounds;
use crate::hull::Plane;
use nalgebra::Point3;
use stowage_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed convex triangle mesh describing a container's usable interior.
///
/// Triangles are expected to wind counter-clockwise seen from outside, so
/// every plane normal points out of the container. Use
/// [`ContainerMesh::orient_outward`] to repair meshes of unknown winding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
}

impl ContainerMesh {
    /// Creates a mesh from a vertex list and triangle indices.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMesh`] if a triangle refers to a vertex that
    /// does not exist and [`Error::InvalidGeometry`] for non-finite vertices.
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        if let Some(i) = vertices
            .iter()
            .position(|v| !v.coords.iter().all(|c| c.is_finite()))
        {
            return Err(Error::InvalidGeometry(format!("mesh vertex {} is not finite", i)));
        }
        for (i, tri) in triangles.iter().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&v| v >= vertices.len()) {
                return Err(Error::InvalidMesh(format!(
                    "triangle {} refers to vertex {} of {}",
                    i,
                    bad,
                    vertices.len()
                )));
            }
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Mesh vertices.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Triangle vertex indices.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box of the vertices.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.vertices).unwrap_or_default()
    }

    pub(crate) fn planes(&self) -> Vec<Plane> {
        self.triangles
            .iter()
            .map(|[a, b, c]| {
                Plane::from_triangle(&self.vertices[*a], &self.vertices[*b], &self.vertices[*c])
            })
            .collect()
    }

    /// Vertex centroid; inside the mesh when the mesh is convex.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let n = self.vertices.len() as f64;
        self.vertices
            .iter()
            .fold(Point3::origin(), |acc, v| acc + v.coords / n)
    }

    /// Flips every triangle whose normal points towards the centroid.
    /// Returns `true` if any triangle was flipped.
    pub fn orient_outward(&mut self) -> bool {
        let center = self.centroid();
        let mut flipped = 0;
        for tri in &mut self.triangles {
            let plane = Plane::from_triangle(
                &self.vertices[tri[0]],
                &self.vertices[tri[1]],
                &self.vertices[tri[2]],
            );
            if plane.distance(&center) > 0.0 {
                tri.swap(0, 1);
                flipped += 1;
            }
        }
        if flipped > 0 {
            log::info!(
                "flipped {} of {} container mesh triangles to face outward",
                flipped,
                self.triangles.len()
            );
        }
        flipped > 0
    }
}
