//! # Component System
//!
//! Components are pure data containers with no behavior. Each distinct
//! component type gets a small integer id from [`ComponentTypes`], which is
//! the bit position used in every [`Signature`](super::Signature).

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use super::signature::SIGNATURE_BITS;
use crate::error::{EcsError, EcsResult};

/// Marker trait for ECS components.
///
/// Components must be:
/// - `'static`: stored behind type-erased pools
/// - `Default`: the filler value for pool slots no entity has written yet
///
/// # Example
///
/// ```rust
/// use ember_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Health {
///     hit_points: i32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: Default + 'static {}

/// Small integer identifying a registered component type.
///
/// Ids start at 0, increase by one per new type, and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentId(u16);

impl ComponentId {
    /// Ids are only minted by [`ComponentTypes`], which keeps them below
    /// [`SIGNATURE_BITS`].
    #[inline]
    #[must_use]
    pub(crate) const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the id as an index into pool and signature arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

/// Registry of component types for one [`Registry`](crate::Registry).
///
/// Maps each Rust type to a stable [`ComponentId`]. Types may be registered
/// up front, in a deterministic order, or lazily on first use.
///
/// ## Invariants
/// - Every entry in `by_type` has a matching `names[id]`.
/// - `names.len()` never exceeds `capacity`.
/// - `capacity` never exceeds [`SIGNATURE_BITS`].
#[derive(Clone, Debug)]
pub struct ComponentTypes {
    by_type: HashMap<TypeId, ComponentId>,
    names: Vec<&'static str>,
    capacity: usize,
}

impl ComponentTypes {
    /// Creates an empty type registry accepting at most `capacity` types.
    ///
    /// `capacity` is clamped to [`SIGNATURE_BITS`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            by_type: HashMap::new(),
            names: Vec::new(),
            capacity: capacity.min(SIGNATURE_BITS),
        }
    }

    /// Registers `T` and returns its id.
    ///
    /// Registering an already known type returns the existing id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`] if `T` is new and the
    /// registry already holds `capacity` types.
    pub fn register<T: Component>(&mut self) -> EcsResult<ComponentId> {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return Ok(existing);
        }

        let name = type_name::<T>();
        if self.names.len() >= self.capacity {
            warn!(component = name, capacity = self.capacity, "component capacity exceeded");
            return Err(EcsError::ComponentCapacityExceeded {
                name,
                capacity: self.capacity,
            });
        }

        // capacity is clamped to SIGNATURE_BITS, which fits in u16
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentId::new(self.names.len() as u16);
        self.by_type.insert(type_id, id);
        self.names.push(name);

        debug!(component = name, id = id.index(), "component type registered");
        Ok(id)
    }

    /// Returns the id of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the type name registered under `id`.
    #[must_use]
    pub fn name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no type has been registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Maximum number of types this registry accepts.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Position;
    impl Component for Position {}

    #[derive(Default)]
    struct Velocity;
    impl Component for Velocity {}

    #[derive(Default)]
    struct Health;
    impl Component for Health {}

    #[test]
    fn test_ids_are_stable_and_sequential() {
        let mut types = ComponentTypes::new(8);
        let pos = types.register::<Position>().unwrap();
        let vel = types.register::<Velocity>().unwrap();

        assert_eq!(pos.index(), 0);
        assert_eq!(vel.index(), 1);
        assert_eq!(types.register::<Position>().unwrap(), pos);
        assert_eq!(types.id_of::<Velocity>(), Some(vel));
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_unregistered_type() {
        let types = ComponentTypes::new(8);
        assert!(types.is_empty());
        assert_eq!(types.id_of::<Health>(), None);
    }

    #[test]
    fn test_names() {
        let mut types = ComponentTypes::new(8);
        let id = types.register::<Health>().unwrap();
        assert!(types.name_of(id).unwrap().ends_with("Health"));
        assert_eq!(types.name_of(ComponentId::new(5)), None);
    }

    #[test]
    fn test_capacity_clamped_to_signature_width() {
        let types = ComponentTypes::new(1_000);
        assert_eq!(types.capacity(), SIGNATURE_BITS);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut types = ComponentTypes::new(2);
        types.register::<Position>().unwrap();
        types.register::<Velocity>().unwrap();

        let err = types.register::<Health>().unwrap_err();
        assert!(matches!(err, EcsError::ComponentCapacityExceeded { capacity: 2, .. }));
        assert_eq!(types.len(), 2);

        // Known types still resolve at capacity
        assert!(types.register::<Position>().is_ok());
    }
}
