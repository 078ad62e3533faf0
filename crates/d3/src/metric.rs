//! Shape metrics: bounds, optional hull and physical aggregates of an object.

use crate::bounds::Bounds;
use crate::hull::{ConvexHull, EPSILON};
use crate::mesh::ContainerMesh;
use crate::shape::SubShape;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use std::ops::{Div, Mul};
use stowage_core::{fits_somehow, Config, HasCost, HasExtent, HasMass, Transform3D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Measurement record describing an object for fitting and display.
///
/// A metric never fails to build. Empty input gives the zero metric and a
/// hull that cannot be built leaves the metric box-only.
#[derive(Debug, Clone, Default)]
pub struct ShapeMetric {
    bounds: Bounds,
    hull: Option<ConvexHull>,
    volume: f64,
    area: f64,
    mass: f64,
    cost: f64,
    capacity: u32,
}

impl ShapeMetric {
    /// The zero metric.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Box-only metric.
    pub fn from_box(center: Point3<f64>, size: Vector3<f64>) -> Self {
        Self::from_bounds(Bounds::new(center, size))
    }

    /// Box-only metric from existing bounds.
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self {
            bounds,
            hull: None,
            volume: bounds.volume(),
            area: bounds.area(),
            ..Self::default()
        }
    }

    /// Metric enclosing a point cloud. With `precise` a convex hull is built
    /// as well.
    pub fn from_points(points: &[Point3<f64>], precise: bool) -> Self {
        let Some(bounds) = Bounds::from_points(points) else {
            return Self::empty();
        };
        let mut metric = Self::from_bounds(bounds);
        if precise {
            metric.hull = build_hull(points);
        }
        metric
    }

    /// Metric of an object made of several rigid parts.
    ///
    /// Geometry is sampled from every part. A part contributes all of its
    /// vertices when its box is at least `config.full_vertex_ratio` of the
    /// box accumulated so far, otherwise only its 8 box corners. Mass, cost
    /// and capacity are summed over the parts accepted by `significant`.
    pub fn from_shapes<F>(shapes: &[SubShape], config: &Config, significant: F) -> Self
    where
        F: Fn(&SubShape) -> bool,
    {
        let mut samples: Vec<Point3<f64>> = Vec::new();
        let mut running: Option<Bounds> = None;
        let (mut mass, mut cost, mut capacity) = (0.0, 0.0, 0u32);

        for shape in shapes {
            if significant(shape) {
                mass += shape.mass;
                cost += shape.cost;
                capacity = capacity.saturating_add(shape.capacity);
            }

            let Some(local) = shape.local_bounds() else {
                continue;
            };
            let corners = local.transformed_corners(&shape.transform);
            let part = Bounds::from_points(&corners).unwrap_or_default();

            match running.as_mut() {
                None => {
                    samples.extend(shape.transformed_vertices());
                    running = Some(part);
                }
                Some(total) => {
                    if part.volume() >= config.full_vertex_ratio * total.volume() {
                        samples.extend(shape.transformed_vertices());
                    } else {
                        samples.extend_from_slice(&corners);
                    }
                    total.encapsulate_bounds(&part);
                }
            }
        }

        log::debug!(
            "metric from {} sub-shapes sampled {} points",
            shapes.len(),
            samples.len()
        );
        let mut metric = Self::from_points(&samples, config.precise_metrics);
        metric.mass = mass;
        metric.cost = cost;
        metric.capacity = capacity;
        metric
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

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn hull(&self) -> Option<&ConvexHull> {
        self.hull.as_ref()
    }

    /// Box volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Box surface area.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn center(&self) -> Point3<f64> {
        self.bounds.center
    }

    pub fn size(&self) -> Vector3<f64> {
        self.bounds.size()
    }

    /// Half-size along each axis.
    pub fn extents(&self) -> Vector3<f64> {
        self.bounds.extents
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Checks for a zero-volume metric.
    pub fn is_empty(&self) -> bool {
        self.volume <= 0.0
    }

    /// Points tested by the aligned fit tests: hull vertices when there is a
    /// hull, box corners otherwise.
    fn samples(&self) -> Vec<Point3<f64>> {
        match &self.hull {
            Some(hull) => hull.vertices().to_vec(),
            None => self.bounds.corners().to_vec(),
        }
    }

    /// Checks if this box fits into `other`'s box under some axis
    /// permutation. Rotation-blind and cheap.
    pub fn fits_somehow(&self, other: &ShapeMetric) -> bool {
        fits_somehow(&self.size(), &other.size())
    }

    /// Checks if this object, placed at `t_self`, lies inside `other`
    /// placed at `t_other`.
    ///
    /// Only sample points are tested, so an object with a vertex-free
    /// protrusion through a concave-looking gap can pass; for convex
    /// containers this is exact.
    pub fn fits_aligned(
        &self,
        t_self: &Transform3D,
        t_other: &Transform3D,
        other: &ShapeMetric,
    ) -> bool {
        let relative = t_self.relative_to(t_other);
        let mut moved = self
            .samples()
            .into_iter()
            .map(|p| relative.transform_point(&p));
        match &other.hull {
            Some(hull) => moved.all(|p| hull.contains(&p)),
            None => moved.all(|p| other.bounds.contains_point(&p)),
        }
    }

    /// Checks if this object, placed at `t_self`, lies inside a container
    /// mesh placed at `t_mesh`.
    ///
    /// Whichever side has fewer items is transformed: the mesh planes into
    /// the object frame, or the samples into the mesh frame.
    pub fn fits_aligned_mesh(
        &self,
        t_self: &Transform3D,
        t_mesh: &Transform3D,
        mesh: &ContainerMesh,
    ) -> bool {
        let samples = self.samples();
        let to_mesh = t_self.relative_to(t_mesh);
        let planes = mesh.planes();

        if planes.len() < samples.len() {
            let to_object = to_mesh.inverse();
            let planes: Vec<_> = planes.iter().map(|pl| pl.transformed(&to_object)).collect();
            samples
                .iter()
                .all(|p| planes.iter().all(|pl| pl.distance(p) <= EPSILON))
        } else {
            samples.iter().all(|p| {
                let p = to_mesh.transform_point(p);
                planes.iter().all(|pl| pl.distance(&p) <= EPSILON)
            })
        }
    }

    /// Axis-permutation rotation aligning this object's extents with the
    /// container's in sorted order (smallest to smallest, largest to
    /// largest).
    pub fn optimal_rotation(&self, container: &ShapeMetric) -> Rotation3<f64> {
        fn axis_order(v: &Vector3<f64>) -> [usize; 3] {
            let mut order = [0, 1, 2];
            order.sort_by(|&a, &b| v[a].total_cmp(&v[b]));
            order
        }

        let from = axis_order(&self.size());
        let to = axis_order(&container.size());
        let mut m = Matrix3::zeros();
        for k in 0..3 {
            m[(to[k], from[k])] = 1.0;
        }
        if m.determinant() < 0.0 {
            // a mirrored axis leaves a box unchanged
            let mut column = m.column_mut(from[0]);
            column.neg_mut();
        }
        Rotation3::from_matrix_unchecked(m)
    }

    /// Scales the geometry about the box center. Mass, cost and capacity
    /// are kept.
    ///
    /// A factor that collapses the geometry (zero or non-finite) leaves a
    /// box-only metric.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.abs();
        let bounds = self.bounds.scale(factor);
        let center = self.bounds.center;
        let collapsed = !(factor.is_finite() && factor > 0.0);
        if collapsed && self.hull.is_some() {
            log::warn!("dropping hull scaled by {}", factor);
        }
        let hull = self.hull.as_ref().filter(|_| !collapsed).and_then(|hull| {
            let points: Vec<Point3<f64>> = hull
                .vertices()
                .iter()
                .map(|p| center + (p - center) * factor)
                .collect();
            build_hull(&points)
        });
        Self {
            bounds,
            hull,
            volume: bounds.volume(),
            area: bounds.area(),
            mass: self.mass,
            cost: self.cost,
            capacity: self.capacity,
        }
    }
}

fn build_hull(points: &[Point3<f64>]) -> Option<ConvexHull> {
    match ConvexHull::build(points) {
        Ok(hull) => Some(hull),
        Err(e) => {
            log::warn!("keeping box-only metric: {}", e);
            None
        }
    }
}

impl Mul<f64> for ShapeMetric {
    type Output = ShapeMetric;

    fn mul(self, factor: f64) -> ShapeMetric {
        self.scaled(factor)
    }
}

impl Div<f64> for ShapeMetric {
    type Output = ShapeMetric;

    fn div(self, divisor: f64) -> ShapeMetric {
        self.scaled(1.0 / divisor)
    }
}

impl HasExtent for ShapeMetric {
    fn size(&self) -> Vector3<f64> {
        self.bounds.size()
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

impl HasMass for ShapeMetric {
    fn mass(&self) -> f64 {
        self.mass
    }
}

impl HasCost for ShapeMetric {
    fn cost(&self) -> f64 {
        self.cost
    }
}

/// Persisted form of a [`ShapeMetric`]; volume and area are derived.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct MetricRecord {
    center: Point3<f64>,
    size: Vector3<f64>,
    #[serde(default)]
    mass: f64,
    #[serde(default)]
    cost: f64,
    #[serde(default)]
    capacity: u32,
    #[serde(default)]
    hull: Option<ConvexHull>,
}

#[cfg(feature = "serde")]
impl Serialize for ShapeMetric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        MetricRecord {
            center: self.bounds.center,
            size: self.bounds.size(),
            mass: self.mass,
            cost: self.cost,
            capacity: self.capacity,
            hull: self.hull.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ShapeMetric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = MetricRecord::deserialize(deserializer)?;
        let mut metric = ShapeMetric::from_box(record.center, record.size);
        metric.mass = record.mass;
        metric.cost = record.cost;
        metric.capacity = record.capacity;
        metric.hull = record.hull;
        Ok(metric)
    }
}
