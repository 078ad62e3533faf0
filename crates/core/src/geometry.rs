//! Capability traits for objects that can be packed.
//!
//! A packer does not care what it stores, only that each object has an
//! identifier, extents, a mass and a cost. Any type implementing the four
//! traits below is [`Packable`] through a blanket impl.

use nalgebra::Vector3;
use std::fmt::Debug;
use std::hash::Hash;

/// Objects with a stable identifier.
pub trait Identified {
    /// Identifier type.
    type Id: Clone + Eq + Hash + Debug;

    /// Returns the identifier of this object.
    fn id(&self) -> &Self::Id;
}

/// Objects with box extents.
pub trait HasExtent {
    /// Full size of the bounding box along x, y and z.
    fn size(&self) -> Vector3<f64>;

    /// Bounding box volume.
    fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }
}

/// Objects with a mass.
pub trait HasMass {
    /// Returns the mass.
    fn mass(&self) -> f64;
}

/// Objects with a cost.
pub trait HasCost {
    /// Returns the cost.
    fn cost(&self) -> f64;
}

/// Everything a packer needs from a stored object.
pub trait Packable: Identified + HasExtent + HasMass + HasCost {}

impl<T: Identified + HasExtent + HasMass + HasCost> Packable for T {}

/// Returns the 3 components of `v` in ascending order.
pub fn sorted_extents(v: &Vector3<f64>) -> [f64; 3] {
    let mut e = [v.x, v.y, v.z];
    e.sort_by(|a, b| a.total_cmp(b));
    e
}

/// Checks whether a box of size `inner` fits into a box of size `outer`
/// under some axis assignment.
///
/// Each extent of `inner` (ascending) is matched with the smallest unused
/// extent of `outer` that is not smaller than it.
pub fn fits_somehow(inner: &Vector3<f64>, outer: &Vector3<f64>) -> bool {
    let mut free = sorted_extents(outer).map(Some);
    for d in sorted_extents(inner) {
        match free.iter_mut().find(|o| matches!(o, Some(od) if d <= *od)) {
            Some(slot) => *slot = None,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Crate {
        id: u32,
        size: Vector3<f64>,
    }

    impl Identified for Crate {
        type Id = u32;
        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl HasExtent for Crate {
        fn size(&self) -> Vector3<f64> {
            self.size
        }
    }

    impl HasMass for Crate {
        fn mass(&self) -> f64 {
            1.0
        }
    }

    impl HasCost for Crate {
        fn cost(&self) -> f64 {
            2.0
        }
    }

    fn assert_packable<T: Packable>(_: &T) {}

    #[test]
    fn test_blanket_packable() {
        let c = Crate {
            id: 7,
            size: Vector3::new(1.0, 2.0, 3.0),
        };
        assert_packable(&c);
        assert_eq!(*c.id(), 7);
        assert_eq!(c.volume(), 6.0);
    }

    #[test]
    fn test_sorted_extents() {
        assert_eq!(sorted_extents(&Vector3::new(3.0, 1.0, 2.0)), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_fits_somehow_permuted() {
        let inner = Vector3::new(5.0, 1.0, 2.0);
        let outer = Vector3::new(2.0, 5.0, 1.0);
        assert!(fits_somehow(&inner, &outer));
        assert!(fits_somehow(&inner, &inner));
    }

    #[test]
    fn test_fits_somehow_rejects() {
        let inner = Vector3::new(3.0, 3.0, 1.0);
        let outer = Vector3::new(10.0, 2.0, 2.0);
        assert!(!fits_somehow(&inner, &outer));
    }
}
