//! # Entity Management
//!
//! Entities are plain integer identities with no payload. Ids are dense,
//! start at 0, and are never reused within one registry.
//!
//! [`EntityMut`] borrows the owning [`Registry`] so component operations can
//! be chained on the entity itself without outliving the registry.

use std::fmt;

use super::component::Component;
use super::registry::Registry;
use crate::error::EcsResult;

/// Raw entity identifier. Doubles as the slot index in every component pool.
pub type EntityId = u32;

/// Lightweight entity handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(EntityId);

impl Entity {
    /// Creates an entity handle from a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.0
    }

    /// Returns the id as a pool index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl From<Entity> for EntityId {
    fn from(entity: Entity) -> Self {
        entity.0
    }
}

/// Entity bound to a mutable borrow of its registry.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Registry};
///
/// #[derive(Default)]
/// struct Tag;
/// impl Component for Tag {}
///
/// let mut registry = Registry::new();
/// let entity = registry.create_entity();
/// registry.entity_mut(entity)?.add_component(Tag)?;
/// assert!(registry.has_component::<Tag>(entity));
/// # Ok::<(), ember_core::EcsError>(())
/// ```
pub struct EntityMut<'r> {
    entity: Entity,
    registry: &'r mut Registry,
}

impl<'r> EntityMut<'r> {
    pub(crate) fn new(entity: Entity, registry: &'r mut Registry) -> Self {
        Self { entity, registry }
    }

    /// The bound entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Attaches a component. See [`Registry::add_component`].
    ///
    /// # Errors
    ///
    /// Propagates registry errors (capacity exceeded).
    pub fn add_component<C: Component>(&mut self, component: C) -> EcsResult<&mut Self> {
        self.registry.add_component(self.entity, component)?;
        Ok(self)
    }

    /// Detaches a component. See [`Registry::remove_component`].
    ///
    /// # Errors
    ///
    /// Propagates registry errors.
    pub fn remove_component<C: Component>(&mut self) -> EcsResult<&mut Self> {
        self.registry.remove_component::<C>(self.entity)?;
        Ok(self)
    }

    /// Returns `true` if the entity carries `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self) -> bool {
        self.registry.has_component::<C>(self.entity)
    }

    /// Reads a component. See [`Registry::get_component`].
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not carry `C`.
    pub fn get_component<C: Component>(&self) -> EcsResult<&C> {
        self.registry.get_component::<C>(self.entity)
    }

    /// Mutably accesses a component. See [`Registry::get_component_mut`].
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not carry `C`.
    pub fn get_component_mut<C: Component>(&mut self) -> EcsResult<&mut C> {
        self.registry.get_component_mut::<C>(self.entity)
    }
}
