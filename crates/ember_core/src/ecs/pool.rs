//! # Component Pools
//!
//! Dense, entity-indexed storage for a single component type.
//!
//! The pool uses a sparse-array strategy:
//! - The entity id is the slot index, no indirection table
//! - Access is O(1) via entity id
//! - Removing a component never compacts; the slot keeps its stale value
//!
//! The entity's [`Signature`](super::Signature) is authoritative about
//! presence. A slot whose signature bit is clear holds meaningless data.

use std::any::{type_name, Any};

use super::component::Component;

/// Entity-indexed storage for one component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Pool};
///
/// #[derive(Clone, Copy, Debug, Default, PartialEq)]
/// struct Health(i32);
/// impl Component for Health {}
///
/// let mut pool: Pool<Health> = Pool::with_capacity(16);
/// pool.resize(4);
/// pool.set(3, Health(10));
/// assert_eq!(pool.get(3), Some(&Health(10)));
/// ```
#[derive(Debug)]
pub struct Pool<C: Component> {
    data: Vec<C>,
}

impl<C: Component> Pool<C> {
    /// Creates an empty pool with room for `capacity` slots.
    ///
    /// No slot is live until [`resize`](Self::resize) grows the pool.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of addressable slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the pool has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocated slot capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Grows or shrinks the pool to exactly `len` slots.
    ///
    /// New slots hold `C::default()`. Shrinking below a live entity's index
    /// is a caller error; the registry only ever grows pools.
    pub fn resize(&mut self, len: usize) {
        self.data.resize_with(len, C::default);
    }

    /// Overwrites the slot at `index`.
    ///
    /// # Arguments
    ///
    /// * `index` - The entity id (must be less than `len()`)
    /// * `component` - The component value to store
    ///
    /// # Returns
    ///
    /// `true` if the component was stored, `false` if `index` was out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> bool {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = component;
            true
        } else {
            false
        }
    }

    /// Gets the slot at `index`.
    ///
    /// No presence check: the value may be stale if the entity's signature
    /// bit is clear.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)
    }

    /// Gets the slot at `index` mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)
    }

    /// Returns a slice of all slots.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// Drops every slot.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Type-erased handle to a [`Pool`].
///
/// The registry stores pools as `Box<dyn ErasedPool>` indexed by component
/// id and recovers the concrete type through [`Any`].
pub trait ErasedPool {
    /// Upcasts to [`Any`] for downcasting to `Pool<C>`.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for mutable downcasting to `Pool<C>`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Type name of the stored component, reported on a failed downcast.
    fn component_name(&self) -> &'static str;
}

impl<C: Component> ErasedPool for Pool<C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }
}

impl dyn ErasedPool {
    /// Downcasts to the concrete pool type.
    #[must_use]
    pub fn downcast_ref<C: Component>(&self) -> Option<&Pool<C>> {
        self.as_any().downcast_ref::<Pool<C>>()
    }

    /// Downcasts mutably to the concrete pool type.
    pub fn downcast_mut<C: Component>(&mut self) -> Option<&mut Pool<C>> {
        self.as_any_mut().downcast_mut::<Pool<C>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    #[test]
    fn test_pool_starts_empty() {
        let pool: Pool<Position> = Pool::with_capacity(100);
        assert!(pool.is_empty());
        assert!(pool.capacity() >= 100);
        assert!(pool.get(0).is_none());
    }

    #[test]
    fn test_pool_get_set() {
        let mut pool: Pool<Position> = Pool::with_capacity(0);
        pool.resize(10);

        assert!(pool.set(4, Position { x: 1.0, y: 2.0 }));
        assert_eq!(pool.get(4), Some(&Position { x: 1.0, y: 2.0 }));
        assert_eq!(pool.get(3), Some(&Position::default()));

        pool.get_mut(4).unwrap().x = 5.0;
        assert_eq!(pool.get(4).unwrap().x, 5.0);
    }

    #[test]
    fn test_pool_bounds() {
        let mut pool: Pool<Position> = Pool::with_capacity(0);
        pool.resize(2);
        assert!(!pool.set(2, Position::default()));
        assert!(pool.get(2).is_none());
    }

    #[test]
    fn test_resize_keeps_data() {
        let mut pool: Pool<Position> = Pool::with_capacity(0);
        pool.resize(2);
        pool.set(1, Position { x: 3.0, y: 3.0 });
        pool.resize(8);
        assert_eq!(pool.len(), 8);
        assert_eq!(pool.get(1), Some(&Position { x: 3.0, y: 3.0 }));
    }

    #[test]
    fn test_clear() {
        let mut pool: Pool<Position> = Pool::with_capacity(0);
        pool.resize(5);
        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_erased_downcast() {
        let mut erased: Box<dyn ErasedPool> = Box::new(Pool::<Position>::with_capacity(4));
        assert!(erased.component_name().ends_with("Position"));
        erased.downcast_mut::<Position>().unwrap().resize(3);

        assert!(erased.downcast_ref::<Position>().is_some());
        assert!(erased.downcast_ref::<Velocity>().is_none());

        erased
            .downcast_mut::<Position>()
            .unwrap()
            .set(2, Position { x: 9.0, y: 0.0 });
        assert_eq!(erased.downcast_ref::<Position>().unwrap().get(2).unwrap().x, 9.0);
    }
}
