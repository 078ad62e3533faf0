//! Incremental 3D convex hull.
//!
//! The hull is grown from a seed tetrahedron. Every remaining point is
//! assigned to the first face it lies in front of; the furthest point of a
//! face is then added by dropping every face visible from it and closing
//! the hole with a fan of new faces over the horizon loop.
//!
//! Faces live in an arena and refer to each other through [`EdgeRef`]
//! index pairs, so the cyclic neighbour graph never owns anything.
//!
//! # Limitations
//!
//! Coplanar or collinear input is not detected. The seed simplex of such a
//! cloud is flat and the result is unspecified (but construction never
//! panics and always terminates).

use crate::bounds::Bounds;
use nalgebra::{Point3, Vector3};
use std::collections::{HashSet, VecDeque};
use stowage_core::{Error, Result, Transform3D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum signed distance for a point to count as "in front of" a face.
pub const EPSILON: f64 = 1e-6;

/// Reference to edge `edge` (0..3) of face `face` in the face arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EdgeRef {
    face: usize,
    /// Local edge index; edge `i` runs from vertex `i` to vertex `i + 1`.
    edge: usize,
}

impl EdgeRef {
    fn new(face: usize, edge: usize) -> Self {
        Self { face, edge }
    }
}

/// Oriented plane `normal · p + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Plane {
    pub(crate) normal: Vector3<f64>,
    pub(crate) offset: f64,
}

impl Plane {
    /// Plane through a triangle; the normal follows the winding `a → b → c`.
    ///
    /// A degenerate triangle yields a zero normal, in front of which no
    /// point ever lies.
    pub(crate) fn from_triangle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Self {
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        Self {
            normal,
            offset: -normal.dot(&a.coords),
        }
    }

    /// Signed distance; positive in front of the plane.
    pub(crate) fn distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) + self.offset
    }

    /// The same plane expressed in the frame `transform` maps into.
    pub(crate) fn transformed(&self, transform: &Transform3D) -> Self {
        let normal = transform.transform_vector(&self.normal);
        let anchor = transform.transform_point(&Point3::from(self.normal * -self.offset));
        Self {
            normal,
            offset: -normal.dot(&anchor.coords),
        }
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }
}

/// Triangular hull face.
#[derive(Debug, Clone)]
pub(crate) struct Face {
    vertices: [Point3<f64>; 3],
    plane: Plane,
    neighbours: [Option<EdgeRef>; 3],
}

impl Face {
    fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            plane: Plane::from_triangle(&a, &b, &c),
            vertices: [a, b, c],
            neighbours: [None; 3],
        }
    }

    pub(crate) fn vertices(&self) -> &[Point3<f64>; 3] {
        &self.vertices
    }

    pub(crate) fn plane(&self) -> &Plane {
        &self.plane
    }

    pub(crate) fn neighbour(&self, edge: usize) -> Option<EdgeRef> {
        self.neighbours[edge % 3]
    }

    /// Endpoints of edge `edge`.
    pub(crate) fn edge(&self, edge: usize) -> (Point3<f64>, Point3<f64>) {
        (self.vertices[edge % 3], self.vertices[(edge + 1) % 3])
    }

    fn is_visible(&self, p: &Point3<f64>) -> bool {
        self.plane.distance(p) > EPSILON
    }

    fn flip(&mut self) {
        self.plane.flip();
        self.vertices.swap(0, 1);
    }
}

/// Face plus the state that only matters while the hull is being built.
#[derive(Debug)]
struct BuildFace {
    face: Face,
    outside: Vec<Point3<f64>>,
    furthest: Option<Point3<f64>>,
    furthest_distance: f64,
    visited: bool,
    dropped: bool,
}

impl BuildFace {
    fn new(face: Face) -> Self {
        Self {
            face,
            outside: Vec::new(),
            furthest: None,
            furthest_distance: f64::NEG_INFINITY,
            visited: false,
            dropped: false,
        }
    }
}

/// Working arena for one hull construction.
#[derive(Debug, Default)]
struct HullBuilder {
    faces: Vec<BuildFace>,
}

/// Index of the first point maximizing `metric`.
fn index_of_max<F>(points: &[Point3<f64>], metric: F) -> usize
where
    F: Fn(&Point3<f64>) -> f64,
{
    let mut best = (0, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        let m = metric(p);
        if m > best.1 {
            best = (i, m);
        }
    }
    best.0
}

impl HullBuilder {
    fn push_face(&mut self, face: Face) -> usize {
        self.faces.push(BuildFace::new(face));
        self.faces.len() - 1
    }

    fn face(&self, index: usize) -> &Face {
        &self.faces[index].face
    }

    fn join(&mut self, a: EdgeRef, b: EdgeRef) {
        self.faces[a.face].face.neighbours[a.edge] = Some(b);
        self.faces[b.face].face.neighbours[b.edge] = Some(a);
    }

    /// Builds a fan of faces from `apex` over an ordered horizon loop and
    /// links them to the horizon and to each other.
    ///
    /// Consecutive horizon edges must chain as `horizon[i].v1 == horizon[i-1].v0`.
    fn make_pyramid(&mut self, apex: Point3<f64>, horizon: &[EdgeRef]) -> Vec<usize> {
        let mut created: Vec<usize> = Vec::with_capacity(horizon.len());
        for (i, &e) in horizon.iter().enumerate() {
            let (v0, v1) = self.face(e.face).edge(e.edge);
            let nf = self.push_face(Face::new(apex, v1, v0));
            self.join(EdgeRef::new(nf, 1), e);
            if i > 0 {
                self.join(EdgeRef::new(nf, 0), EdgeRef::new(created[i - 1], 2));
            }
            created.push(nf);
        }
        if let (Some(&first), Some(&last)) = (created.first(), created.last()) {
            self.join(EdgeRef::new(last, 2), EdgeRef::new(first, 0));
        }
        created
    }

    /// Builds the seed tetrahedron and returns the points it did not use.
    fn seed(&mut self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        let mut min_i = [0usize; 3];
        let mut max_i = [0usize; 3];
        for (i, p) in points.iter().enumerate() {
            for axis in 0..3 {
                if p[axis] < points[min_i[axis]][axis] {
                    min_i[axis] = i;
                }
                if p[axis] > points[max_i[axis]][axis] {
                    max_i[axis] = i;
                }
            }
        }
        let span = |axis: usize| (points[max_i[axis]] - points[min_i[axis]]).norm();
        let mut axis = 0;
        for candidate in 1..3 {
            if span(candidate) > span(axis) {
                axis = candidate;
            }
        }

        let (ia, ib) = (min_i[axis], max_i[axis]);
        let (a, b) = (points[ia], points[ib]);
        let dir = (b - a).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        let ic = index_of_max(points, |p| {
            let ap = p - a;
            (ap - dir * ap.dot(&dir)).norm()
        });
        let c = points[ic];

        let mut base = Face::new(a, b, c);
        let id = index_of_max(points, |p| base.plane.distance(p).abs());
        let apex = points[id];
        if base.plane.distance(&apex) > 0.0 {
            base.flip();
        }

        let f0 = self.push_face(base);
        let rim = [EdgeRef::new(f0, 2), EdgeRef::new(f0, 1), EdgeRef::new(f0, 0)];
        self.make_pyramid(apex, &rim);

        let used: HashSet<usize> = [ia, ib, ic, id].into_iter().collect();
        points
            .iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(_, p)| *p)
            .collect()
    }

    /// Assigns each point to the first candidate face it lies in front of.
    /// Points in front of none of them are discarded.
    fn assign(&mut self, points: Vec<Point3<f64>>, candidates: &[usize]) {
        for p in points {
            for &fi in candidates {
                let bf = &mut self.faces[fi];
                let d = bf.face.plane.distance(&p);
                if d > EPSILON {
                    if d > bf.furthest_distance {
                        bf.furthest_distance = d;
                        bf.furthest = Some(p);
                    }
                    bf.outside.push(p);
                    break;
                }
            }
        }
    }

    /// Marks every face visible from `apex` reachable from `start` as
    /// dropped and collects the horizon loop in winding order.
    ///
    /// The walk is a depth-first search over neighbour links driven by an
    /// explicit stack of `(face, entry edge, edges walked)` frames.
    fn collect_horizon(
        &mut self,
        apex: &Point3<f64>,
        start: usize,
        visible: &mut Vec<usize>,
        horizon: &mut Vec<EdgeRef>,
    ) {
        self.faces[start].visited = true;
        self.faces[start].dropped = true;
        visible.push(start);

        let mut stack: Vec<(usize, usize, usize)> = vec![(start, 0, 0)];
        while let Some(top) = stack.last_mut() {
            let (face, entry, walked) = *top;
            if walked == 3 {
                stack.pop();
                continue;
            }
            top.2 += 1;

            let Some(nb) = self.face(face).neighbour(entry + walked) else {
                continue;
            };
            if self.faces[nb.face].visited {
                continue;
            }
            if self.face(nb.face).is_visible(apex) {
                let next = &mut self.faces[nb.face];
                next.visited = true;
                next.dropped = true;
                visible.push(nb.face);
                stack.push((nb.face, nb.edge, 0));
            } else {
                horizon.push(nb);
            }
        }

        for &f in visible.iter() {
            self.faces[f].visited = false;
        }
    }

    /// Adds outside points until no face has any left.
    fn refine(&mut self, points: Vec<Point3<f64>>) {
        let initial: Vec<usize> = (0..self.faces.len()).collect();
        self.assign(points, &initial);

        let mut queue: VecDeque<usize> = initial.into();
        let mut visible = Vec::new();
        let mut horizon = Vec::new();
        while let Some(f) = queue.pop_back() {
            if self.faces[f].dropped {
                continue;
            }
            let Some(apex) = self.faces[f].furthest else {
                continue;
            };

            visible.clear();
            horizon.clear();
            self.collect_horizon(&apex, f, &mut visible, &mut horizon);

            let created = self.make_pyramid(apex, &horizon);
            for &vf in &visible {
                let orphans = std::mem::take(&mut self.faces[vf].outside);
                self.assign(orphans, &created);
            }
            for &nf in &created {
                queue.push_front(nf);
            }
        }
    }

    /// Compacts the surviving faces and remaps their neighbour links.
    fn finish(self) -> Vec<Face> {
        let mut remap = vec![None; self.faces.len()];
        let mut next = 0;
        for (i, bf) in self.faces.iter().enumerate() {
            if !bf.dropped {
                remap[i] = Some(next);
                next += 1;
            }
        }

        let mut faces: Vec<Face> = self
            .faces
            .into_iter()
            .filter(|bf| !bf.dropped)
            .map(|bf| bf.face)
            .collect();
        for face in &mut faces {
            for link in face.neighbours.iter_mut() {
                *link = link.and_then(|e| remap[e.face].map(|f| EdgeRef::new(f, e.edge)));
            }
        }
        faces
    }
}

/// Unique points in first-seen order.
fn unique_points<'a, I>(points: I) -> Vec<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut seen = HashSet::new();
    points
        .into_iter()
        .filter(|p| seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]))
        .copied()
        .collect()
}

/// Convex polyhedron enclosing a point cloud.
///
/// Serialized as its vertex list; deserialization rebuilds the faces.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "Vec<Point3<f64>>", try_from = "Vec<Point3<f64>>")
)]
pub struct ConvexHull {
    faces: Vec<Face>,
    vertices: Vec<Point3<f64>>,
}

impl ConvexHull {
    /// Builds the hull of a point cloud.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateInput`] for fewer than 4 points and
    /// [`Error::InvalidGeometry`] for non-finite coordinates.
    pub fn build(points: &[Point3<f64>]) -> Result<Self> {
        if points.len() < 4 {
            return Err(Error::DegenerateInput(points.len()));
        }
        if let Some(p) = points.iter().find(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(Error::InvalidGeometry(format!("non-finite hull point {}", p)));
        }

        let mut builder = HullBuilder::default();
        let rest = builder.seed(points);
        builder.refine(rest);
        let faces = builder.finish();
        let vertices = unique_points(faces.iter().flat_map(|f| f.vertices.iter()));

        log::trace!(
            "convex hull of {} points: {} faces, {} vertices",
            points.len(),
            faces.len(),
            vertices.len()
        );
        Ok(Self { faces, vertices })
    }

    /// Unique hull vertices.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Number of triangular faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Face triangles, wound counter-clockwise seen from outside.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.faces.iter().map(|f| *f.vertices())
    }

    pub(crate) fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Checks if a point lies inside the hull or within [`EPSILON`] of it.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        self.faces().iter().all(|f| f.plane().distance(p) <= EPSILON)
    }

    /// Checks if every point lies inside the hull.
    pub fn contains_all<'a, I>(&self, points: I) -> bool
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        points.into_iter().all(|p| self.contains(p))
    }

    /// Rebuilds the hull from its vertices scaled about the origin.
    ///
    /// # Errors
    /// Returns [`Error::InvalidGeometry`] unless `factor` is finite and
    /// positive.
    pub fn scale(&self, factor: f64) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "hull scale factor must be finite and positive, got {}",
                factor
            )));
        }
        let scaled: Vec<Point3<f64>> = self.vertices.iter().map(|p| p * factor).collect();
        Self::build(&scaled)
    }

    /// Bounding box of the hull vertices.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.vertices).unwrap_or_default()
    }
}

impl From<ConvexHull> for Vec<Point3<f64>> {
    fn from(hull: ConvexHull) -> Self {
        hull.vertices
    }
}

impl TryFrom<Vec<Point3<f64>>> for ConvexHull {
    type Error = Error;

    fn try_from(points: Vec<Point3<f64>>) -> Result<Self> {
        Self::build(&points)
    }
}
