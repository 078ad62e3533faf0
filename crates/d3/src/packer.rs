//! 3D bin packer.
//!
//! A [`Packer`] owns the objects stored in one container. Feasibility is
//! decided by repacking the whole collection into a fresh
//! [`tree`](crate::tree) each time an object is offered, largest volume
//! first, so an accepted set always has a complete, non-overlapping
//! placement.

use crate::metric::ShapeMetric;
use crate::tree::{PackingNode, Placement};
use indexmap::IndexMap;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;
use std::hash::Hash;
use stowage_core::{fits_somehow, Config, HasCost, HasExtent, HasMass, Identified, Packable};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize, Serializer};

/// A plain box to pack.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackedObject<Id> {
    pub id: Id,
    pub size: Vector3<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mass: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: f64,
}

impl<Id> PackedObject<Id> {
    /// Creates a massless, free box.
    pub fn new(id: Id, size: Vector3<f64>) -> Self {
        Self {
            id,
            size,
            mass: 0.0,
            cost: 0.0,
        }
    }

    /// Takes size, mass and cost from a shape metric.
    pub fn from_metric(id: Id, metric: &ShapeMetric) -> Self {
        Self {
            id,
            size: metric.size(),
            mass: metric.mass(),
            cost: metric.cost(),
        }
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
}

impl<Id: Clone + Eq + Hash + Debug> Identified for PackedObject<Id> {
    type Id = Id;

    fn id(&self) -> &Id {
        &self.id
    }
}

impl<Id> HasExtent for PackedObject<Id> {
    fn size(&self) -> Vector3<f64> {
        self.size
    }
}

impl<Id> HasMass for PackedObject<Id> {
    fn mass(&self) -> f64 {
        self.mass
    }
}

impl<Id> HasCost for PackedObject<Id> {
    fn cost(&self) -> f64 {
        self.cost
    }
}

/// Outcome of offering an object to a packer.
enum Admission<Id> {
    Rejected,
    /// Accepted on free volume alone (packing disabled).
    ByVolume,
    /// Accepted with the tree holding the whole new collection.
    Packed(PackingNode<Id>),
}

/// Bin packer for one container.
///
/// Objects are kept in insertion order. Totals are maintained on add and
/// recomputed from the ordered list on removal, so removing the object
/// just added restores the previous totals exactly.
#[derive(Debug, Clone)]
pub struct Packer<V: Packable> {
    container: ShapeMetric,
    config: Config,
    objects: IndexMap<V::Id, V>,
    root: Option<PackingNode<V::Id>>,
    total_volume: f64,
    total_mass: f64,
    total_cost: f64,
}

impl<V: Packable> Packer<V> {
    /// Creates an empty packer with default configuration.
    pub fn new(container: ShapeMetric) -> Self {
        Self::with_config(container, Config::default())
    }

    /// Creates an empty packer with the given configuration.
    pub fn with_config(container: ShapeMetric, config: Config) -> Self {
        Self {
            container,
            config,
            objects: IndexMap::new(),
            root: None,
            total_volume: 0.0,
            total_mass: 0.0,
            total_cost: 0.0,
        }
    }

    /// Rebuilds a packer from previously validated contents.
    ///
    /// Objects are force-added in order, then the collection is repacked
    /// once. A collection that no longer packs is kept as is and reported.
    pub fn restore<I>(container: ShapeMetric, config: Config, objects: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut packer = Self::with_config(container, config);
        for obj in objects {
            packer.force_add(obj);
        }
        if !packer.repack() {
            log::warn!(
                "restored {} objects that no longer pack into the container",
                packer.len()
            );
        }
        packer
    }

    pub fn container(&self) -> &ShapeMetric {
        &self.container
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Places `extra` and every stored object into a fresh tree, largest
    /// volume first. Returns `None` if any of them does not fit.
    fn pack_all(&self, extra: Option<&V>) -> Option<PackingNode<V::Id>> {
        let mut order: Vec<&V> = self.objects.values().chain(extra).collect();
        order.sort_by(|a, b| b.volume().total_cmp(&a.volume()));

        let mut root = PackingNode::new(Point3::origin(), self.container.size());
        for obj in order {
            if !root.insert(obj.id(), &obj.size()) {
                log::debug!("no room for {:?} of size {:?}", obj.id(), obj.size());
                return None;
            }
        }
        Some(root)
    }

    fn admit(&self, obj: &V) -> Admission<V::Id> {
        if self.objects.contains_key(obj.id()) {
            log::debug!("rejecting duplicate id {:?}", obj.id());
            return Admission::Rejected;
        }
        let size = obj.size();
        if !size.iter().all(|c| c.is_finite() && *c >= 0.0) {
            log::debug!("rejecting {:?} with invalid size {:?}", obj.id(), size);
            return Admission::Rejected;
        }
        if !fits_somehow(&size, &self.container.size()) {
            log::debug!("{:?} is larger than the container", obj.id());
            return Admission::Rejected;
        }
        if !self.config.packing_enabled {
            return if self.free_volume() >= obj.volume() {
                Admission::ByVolume
            } else {
                Admission::Rejected
            };
        }
        match self.pack_all(Some(obj)) {
            Some(root) => Admission::Packed(root),
            None => Admission::Rejected,
        }
    }

    /// Checks whether `obj` could be added without changing anything.
    pub fn can_add(&self, obj: &V) -> bool {
        !matches!(self.admit(obj), Admission::Rejected)
    }

    /// Adds `obj` if the collection still packs with it.
    ///
    /// # Errors
    /// Hands the object back untouched if it does not fit or its id is
    /// already stored.
    pub fn try_add(&mut self, obj: V) -> Result<(), V> {
        match self.admit(&obj) {
            Admission::Rejected => Err(obj),
            Admission::ByVolume => {
                self.root = None;
                self.record(obj);
                Ok(())
            }
            Admission::Packed(root) => {
                self.root = Some(root);
                self.record(obj);
                Ok(())
            }
        }
    }

    /// Adds `obj` without any feasibility check, replacing a stored object
    /// with the same id. Returns the replaced object.
    ///
    /// Meant for replaying a state that was validated before; it can leave
    /// the packer over capacity.
    pub fn force_add(&mut self, obj: V) -> Option<V> {
        self.root = None;
        if self.objects.contains_key(obj.id()) {
            let previous = self.objects.insert(obj.id().clone(), obj);
            self.update_all();
            previous
        } else {
            self.record(obj);
            None
        }
    }

    fn record(&mut self, obj: V) {
        self.total_volume += obj.volume();
        self.total_mass += obj.mass();
        self.total_cost += obj.cost();
        self.objects.insert(obj.id().clone(), obj);
    }

    /// Removes the object with the given id, keeping the order of the rest.
    pub fn remove(&mut self, id: &V::Id) -> Option<V> {
        let removed = self.objects.shift_remove(id)?;
        self.root = None;
        self.update_all();
        Some(removed)
    }

    /// Removes every object.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.root = None;
        self.update_all();
    }

    /// Recomputes the totals from the stored objects in insertion order.
    pub fn update_all(&mut self) {
        let (mut volume, mut mass, mut cost) = (0.0, 0.0, 0.0);
        for obj in self.objects.values() {
            volume += obj.volume();
            mass += obj.mass();
            cost += obj.cost();
        }
        self.total_volume = volume;
        self.total_mass = mass;
        self.total_cost = cost;
    }

    /// Validates the stored collection by packing it again.
    ///
    /// With packing disabled only the total volume is checked.
    pub fn repack(&mut self) -> bool {
        if !self.config.packing_enabled {
            return self.total_volume <= self.container.volume();
        }
        self.root = self.pack_all(None);
        self.root.is_some()
    }

    /// Current placement of every stored object.
    ///
    /// Returns `None` with packing disabled or if the collection does not
    /// pack (possible after [`Packer::force_add`]).
    pub fn placements(&mut self) -> Option<Vec<Placement<V::Id>>> {
        if !self.config.packing_enabled {
            return None;
        }
        if self.root.is_none() {
            self.root = self.pack_all(None);
        }
        self.root.as_ref().map(PackingNode::placements)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: &V::Id) -> Option<&V> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &V::Id) -> bool {
        self.objects.contains_key(id)
    }

    /// Stored objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &V> + '_ {
        self.objects.values()
    }

    /// Stored ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &V::Id> + '_ {
        self.objects.keys()
    }

    /// Sum of the stored objects' box volumes.
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Container volume not taken by stored objects.
    pub fn free_volume(&self) -> f64 {
        self.container.volume() - self.total_volume
    }

    /// Share of the container volume in use, `None` for an empty container.
    pub fn utilization(&self) -> Option<f64> {
        let capacity = self.container.volume();
        (capacity > 0.0).then(|| self.total_volume / capacity)
    }
}

/// Serializes as the ordered list of stored objects; see
/// [`Packer::restore`] for the way back.
#[cfg(feature = "serde")]
impl<V: Packable + Serialize> Serialize for Packer<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.objects.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn container(x: f64, y: f64, z: f64) -> ShapeMetric {
        ShapeMetric::from_box(Point3::origin(), Vector3::new(x, y, z))
    }

    fn cube(id: &'static str, side: f64) -> PackedObject<&'static str> {
        PackedObject::new(id, Vector3::new(side, side, side))
    }

    #[test]
    fn test_add_and_totals() {
        let mut packer = Packer::new(container(10.0, 10.0, 10.0));
        assert!(packer.try_add(cube("a", 2.0).with_mass(3.0).with_cost(1.5)).is_ok());
        assert!(packer.try_add(cube("b", 3.0).with_mass(1.0)).is_ok());

        assert_eq!(packer.len(), 2);
        assert_relative_eq!(packer.total_volume(), 35.0);
        assert_relative_eq!(packer.total_mass(), 4.0);
        assert_relative_eq!(packer.total_cost(), 1.5);
        assert_relative_eq!(packer.free_volume(), 965.0);
        assert_relative_eq!(packer.utilization().unwrap(), 0.035);
        assert_eq!(packer.ids().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_size_rejected() {
        let mut packer = Packer::new(container(2.0, 2.0, 2.0));
        let sizes = [
            Vector3::new(-1.0, 1.0, 1.0),
            Vector3::new(-3.0, -3.0, 1.0),
            Vector3::new(f64::NAN, 1.0, 1.0),
            Vector3::new(1.0, f64::INFINITY, 1.0),
        ];
        for size in sizes {
            let obj = PackedObject::new("bad", size);
            assert!(!packer.can_add(&obj));
            assert!(packer.try_add(obj).is_err());
        }

        assert!(packer.is_empty());
        assert_eq!(packer.total_volume(), 0.0);
        assert_eq!(packer.placements().map(|p| p.len()), Some(0));
        // the container is still usable
        assert!(packer.try_add(cube("ok", 2.0)).is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut packer = Packer::new(container(10.0, 10.0, 10.0));
        assert!(packer.try_add(cube("a", 1.0)).is_ok());
        let back = packer.try_add(cube("a", 2.0)).unwrap_err();
        assert_relative_eq!(back.size.x, 2.0);
        assert_eq!(packer.len(), 1);
    }

    #[test]
    fn test_oversized_rejected() {
        let packer: Packer<PackedObject<&str>> = Packer::new(container(10.0, 10.0, 10.0));
        assert!(!packer.can_add(&PackedObject::new("rod", Vector3::new(11.0, 1.0, 1.0))));
        assert!(packer.can_add(&PackedObject::new("rod", Vector3::new(1.0, 10.0, 1.0))));
    }

    #[test]
    fn test_volume_only_mode() {
        let config = Config::new().with_packing(false);
        let mut packer = Packer::with_config(container(10.0, 10.0, 10.0), config);
        // two 6-cubes never pack, but their volumes fit
        assert!(packer.try_add(cube("a", 6.0)).is_ok());
        assert!(packer.try_add(cube("b", 6.0)).is_ok());
        assert!(packer.try_add(cube("c", 9.0)).is_err());
        assert!(packer.placements().is_none());
    }

    #[test]
    fn test_force_add_replaces() {
        let mut packer = Packer::new(container(10.0, 10.0, 10.0));
        packer.force_add(cube("a", 1.0));
        packer.force_add(cube("b", 1.0));
        let previous = packer.force_add(cube("a", 2.0));

        assert_relative_eq!(previous.unwrap().size.x, 1.0);
        assert_relative_eq!(packer.total_volume(), 9.0);
        assert_eq!(packer.ids().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_force_add_over_capacity() {
        let mut packer = Packer::new(container(2.0, 2.0, 2.0));
        packer.force_add(cube("a", 2.0));
        packer.force_add(cube("b", 2.0));
        assert!(!packer.repack());
        assert!(packer.placements().is_none());
    }

    #[test]
    fn test_remove_unknown() {
        let mut packer = Packer::new(container(4.0, 4.0, 4.0));
        packer.try_add(cube("a", 1.0)).unwrap();
        assert!(packer.remove(&"zzz").is_none());
        assert_eq!(packer.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut packer = Packer::new(container(4.0, 4.0, 4.0));
        packer.try_add(cube("a", 1.0)).unwrap();
        packer.clear();
        assert!(packer.is_empty());
        assert_eq!(packer.total_volume(), 0.0);
        assert_eq!(packer.placements(), Some(Vec::new()));
    }

    #[test]
    fn test_empty_container_utilization() {
        let packer: Packer<PackedObject<u8>> = Packer::new(ShapeMetric::empty());
        assert!(packer.utilization().is_none());
    }

    #[test]
    fn test_restore() {
        let objects = vec![cube("a", 2.0), cube("b", 1.0)];
        let mut packer = Packer::restore(container(3.0, 3.0, 3.0), Config::default(), objects);
        assert_eq!(packer.len(), 2);
        assert_eq!(packer.placements().map(|p| p.len()), Some(2));
    }
}
