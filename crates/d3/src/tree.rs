//! Guillotine packing tree.
//!
//! Every node is an axis-aligned cell of the container. A leaf is either
//! free or holds exactly one object filling it; an internal node is split
//! in two along one axis. Objects are inserted depth-first, first child
//! before second.

use crate::bounds::Bounds;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slack allowed when comparing an object's size to a cell.
pub const FIT_EPSILON: f64 = 1e-6;

/// The 6 axis permutations an object may be placed in.
const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Where an object ended up inside the container.
///
/// `origin` is the minimum corner relative to the container's minimum
/// corner; `size` is the object's size in the orientation it was placed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement<Id> {
    pub id: Id,
    pub origin: Point3<f64>,
    pub size: Vector3<f64>,
}

impl<Id> Placement<Id> {
    /// Cell occupied by the object.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_min_max(self.origin, self.origin + self.size)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PackingNode<Id> {
    origin: Point3<f64>,
    size: Vector3<f64>,
    occupant: Option<Id>,
    children: Option<Box<[PackingNode<Id>; 2]>>,
}

impl<Id: Clone> PackingNode<Id> {
    pub(crate) fn new(origin: Point3<f64>, size: Vector3<f64>) -> Self {
        Self {
            origin,
            size,
            occupant: None,
            children: None,
        }
    }

    /// Places an object of `size` somewhere below this node, in any of the
    /// 6 axis orientations. Returns `false` if there is no room.
    pub(crate) fn insert(&mut self, id: &Id, size: &Vector3<f64>) -> bool {
        if let Some(children) = self.children.as_mut() {
            let [first, second] = &mut **children;
            return first.insert(id, size) || second.insert(id, size);
        }
        if self.occupant.is_some() {
            return false;
        }
        match self.orientation_for(size) {
            Some(oriented) => self.place(id, &oriented),
            None => false,
        }
    }

    /// Picks the orientation of `size` for this free leaf: an exact fit if
    /// there is one, otherwise the one leaving the largest single leftover.
    fn orientation_for(&self, size: &Vector3<f64>) -> Option<Vector3<f64>> {
        let mut best: Option<(Vector3<f64>, f64)> = None;
        for perm in PERMUTATIONS {
            let s = Vector3::new(size[perm[0]], size[perm[1]], size[perm[2]]);
            let leftover = self.size - s;
            if leftover.iter().any(|d| *d < -FIT_EPSILON) {
                continue;
            }
            if leftover.iter().all(|d| d.abs() <= FIT_EPSILON) {
                return Some(s);
            }
            let largest = leftover.max();
            if best.map_or(true, |(_, score)| largest > score) {
                best = Some((s, largest));
            }
        }
        best.map(|(s, _)| s)
    }

    /// Places an object of fixed orientation into this free leaf, splitting
    /// it until a cell matches the object exactly.
    fn place(&mut self, id: &Id, size: &Vector3<f64>) -> bool {
        let leftover = self.size - size;
        let mut axis = 0;
        for candidate in 1..3 {
            if leftover[candidate] > leftover[axis] {
                axis = candidate;
            }
        }
        if leftover[axis] <= FIT_EPSILON {
            self.occupant = Some(id.clone());
            return true;
        }

        let mut first_size = self.size;
        first_size[axis] = size[axis];
        let mut second_origin = self.origin;
        second_origin[axis] += size[axis];
        let mut second_size = self.size;
        second_size[axis] -= size[axis];

        let mut children = Box::new([
            PackingNode::new(self.origin, first_size),
            PackingNode::new(second_origin, second_size),
        ]);
        let placed = children[0].place(id, size);
        self.children = Some(children);
        placed
    }

    /// Occupied cells in depth-first order.
    pub(crate) fn placements(&self) -> Vec<Placement<Id>> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(id) = &node.occupant {
                out.push(Placement {
                    id: id.clone(),
                    origin: node.origin,
                    size: node.size,
                });
            }
            if let Some(children) = &node.children {
                stack.push(&children[1]);
                stack.push(&children[0]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn root(x: f64, y: f64, z: f64) -> PackingNode<u32> {
        PackingNode::new(Point3::origin(), Vector3::new(x, y, z))
    }

    #[test]
    fn test_exact_fit_occupies_root() {
        let mut node = root(2.0, 3.0, 4.0);
        assert!(node.insert(&1, &Vector3::new(4.0, 2.0, 3.0)));
        assert!(!node.insert(&2, &Vector3::new(0.1, 0.1, 0.1)));

        let placed = node.placements();
        assert_eq!(placed.len(), 1);
        assert_relative_eq!(placed[0].size, Vector3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_too_large() {
        let mut node = root(10.0, 10.0, 10.0);
        assert!(!node.insert(&1, &Vector3::new(11.0, 1.0, 1.0)));
        assert!(node.placements().is_empty());
    }

    #[test]
    fn test_slabs_stack() {
        let mut node = root(2.0, 2.0, 2.0);
        assert!(node.insert(&1, &Vector3::new(2.0, 2.0, 1.0)));
        assert!(node.insert(&2, &Vector3::new(2.0, 1.0, 2.0)));
        assert!(!node.insert(&3, &Vector3::new(1.0, 1.0, 1.0)));

        let placed = node.placements();
        assert_eq!(placed.len(), 2);
        assert!(!placed[0].bounds().intersects(&placed[1].bounds()));
    }

    #[test]
    fn test_cubes_in_row() {
        let mut node = root(18.0, 6.0, 10.0);
        for id in 0..3 {
            assert!(node.insert(&id, &Vector3::new(6.0, 6.0, 6.0)));
        }
        assert!(!node.insert(&3, &Vector3::new(6.0, 6.0, 6.0)));

        let origins: Vec<f64> = node.placements().iter().map(|p| p.origin.x).collect();
        assert_eq!(origins, vec![0.0, 6.0, 12.0]);
    }

    #[test]
    fn test_within_epsilon_is_exact() {
        let mut node = root(1.0, 1.0, 1.0);
        assert!(node.insert(&1, &Vector3::new(1.0 + 1e-9, 1.0, 1.0)));
        assert!(node.children.is_none());
    }
}
