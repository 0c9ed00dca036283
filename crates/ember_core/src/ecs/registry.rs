//! # Registry
//!
//! The coordinator. Owns every component pool, every entity signature, and
//! every system instance, and mediates all create/attach/detach/match calls.
//!
//! ## Entity lifecycle
//!
//! ```text
//! create_entity()          update()
//!  ───────────────> PENDING ─────────> ACTIVE
//!                   (signature          (matched against every
//!                    mutable,            system at least once)
//!                    invisible)
//! ```
//!
//! Membership only changes inside [`Registry::update`]. Call it once per
//! tick, after all entity creation and component attachment for that tick
//! and before any system reads its members.

use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::mem;

use tracing::{debug, info, trace};

use super::component::{Component, ComponentId, ComponentTypes};
use super::entity::{Entity, EntityId, EntityMut};
use super::pool::{ErasedPool, Pool};
use super::signature::Signature;
use super::system::System;
use crate::config::{MembershipPolicy, RegistryConfig};
use crate::error::{EcsError, EcsResult};

/// Entity, component, and system coordinator for one game session.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Registry};
///
/// #[derive(Clone, Copy, Default)]
/// struct Position { x: f32, y: f32 }
/// impl Component for Position {}
///
/// let mut registry = Registry::new();
/// let entity = registry.create_entity();
/// registry.add_component(entity, Position { x: 1.0, y: 2.0 })?;
///
/// assert!(registry.has_component::<Position>(entity));
/// assert_eq!(registry.get_component::<Position>(entity)?.x, 1.0);
/// # Ok::<(), ember_core::EcsError>(())
/// ```
pub struct Registry {
    config: RegistryConfig,
    types: ComponentTypes,

    /// [index = component id], each pool indexed by entity id.
    pools: Vec<Option<Box<dyn ErasedPool>>>,
    /// [index = entity id]
    signatures: Vec<Signature>,

    /// Created but not yet matched against systems.
    pending: BTreeSet<Entity>,
    /// Active entities whose signature changed since the last update.
    /// Only tracked under `MembershipPolicy::Rematch`.
    changed: BTreeSet<Entity>,

    systems: HashMap<TypeId, Box<dyn System>>,
    /// Insertion order of `systems`, used for matching and execution.
    system_order: Vec<(TypeId, &'static str)>,
    /// Systems added since the last update that still need a full pass over
    /// active entities. Only tracked under `MembershipPolicy::Rematch`.
    unseeded_systems: Vec<TypeId>,
}

impl Registry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(RegistryConfig::default())
    }

    /// Creates a registry with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidCapacity`] if the configuration is invalid.
    pub fn with_config(config: RegistryConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        Self {
            types: ComponentTypes::new(config.max_components),
            config,
            pools: Vec::new(),
            signatures: Vec::new(),
            pending: BTreeSet::new(),
            changed: BTreeSet::new(),
            systems: HashMap::new(),
            system_order: Vec::new(),
            unseeded_systems: Vec::new(),
        }
    }

    /// The active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The component type registry.
    #[inline]
    #[must_use]
    pub fn component_types(&self) -> &ComponentTypes {
        &self.types
    }

    // =========================================================================
    // Entity management
    // =========================================================================

    /// Creates a new entity.
    ///
    /// The entity starts with an empty signature and stays invisible to
    /// every system until the next [`update`](Self::update).
    pub fn create_entity(&mut self) -> Entity {
        #[allow(clippy::cast_possible_truncation)]
        let entity = Entity::new(self.signatures.len() as EntityId);

        self.signatures.push(Signature::EMPTY);
        self.pending.insert(entity);

        debug!(entity = entity.id(), "entity created");
        entity
    }

    /// Binds `entity` to this registry for chained component calls.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity was never created here.
    pub fn entity_mut(&mut self, entity: Entity) -> EcsResult<EntityMut<'_>> {
        self.check_entity(entity)?;
        Ok(EntityMut::new(entity, self))
    }

    /// Number of entities ever created.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.signatures.len()
    }

    /// Number of entities waiting for the next update.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `entity` exists and has been through an update.
    #[must_use]
    pub fn is_active(&self, entity: Entity) -> bool {
        entity.index() < self.signatures.len() && !self.pending.contains(&entity)
    }

    /// Returns the entity's current signature.
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Option<&Signature> {
        self.signatures.get(entity.index())
    }

    #[inline]
    fn check_entity(&self, entity: Entity) -> EcsResult<()> {
        if entity.index() < self.signatures.len() {
            Ok(())
        } else {
            Err(EcsError::EntityNotFound(entity.id()))
        }
    }

    // =========================================================================
    // Component management
    // =========================================================================

    /// Registers component type `C` ahead of first use.
    ///
    /// Registering every component type at startup, in a fixed order, gives
    /// deterministic ids regardless of which code path touches a type first.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`] if the registry is full.
    pub fn register_component<C: Component>(&mut self) -> EcsResult<ComponentId> {
        self.types.register::<C>()
    }

    /// Returns the id assigned to `C`, if registered.
    #[must_use]
    pub fn component_id<C: Component>(&self) -> Option<ComponentId> {
        self.types.id_of::<C>()
    }

    /// Attaches `component` to `entity`, overwriting any previous value.
    ///
    /// Creates the pool for `C` on first use and grows it to cover every
    /// entity created so far. System membership is not touched until the
    /// next [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotFound`] if the entity does not exist
    /// - [`EcsError::ComponentCapacityExceeded`] if `C` is new and the
    ///   registry is full
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        self.check_entity(entity)?;
        let id = self.types.register::<C>()?;
        let entity_count = self.signatures.len();

        let pool = self.pool_or_insert::<C>(id)?;
        if entity.index() >= pool.len() {
            pool.resize(entity_count);
        }
        pool.set(entity.index(), component);

        self.signatures[entity.index()].set(id);
        self.mark_changed(entity);
        Ok(())
    }

    /// Detaches `C` from `entity` by clearing its signature bit.
    ///
    /// The pool slot keeps its stale value. Removing a component the entity
    /// does not carry is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity does not exist.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        self.check_entity(entity)?;
        let Some(id) = self.types.id_of::<C>() else {
            return Ok(());
        };

        let signature = &mut self.signatures[entity.index()];
        if signature.test(id) {
            signature.clear(id);
            self.mark_changed(entity);
        }
        Ok(())
    }

    /// Returns `true` if `entity` currently carries `C`. O(1).
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        match (self.types.id_of::<C>(), self.signatures.get(entity.index())) {
            (Some(id), Some(signature)) => signature.test(id),
            _ => false,
        }
    }

    /// Reads the `C` component of `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotFound`] if the entity does not exist
    /// - [`EcsError::MissingComponent`] if the entity's signature lacks `C`
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        let id = self.present_component_id::<C>(entity)?;
        self.pools
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| missing::<C>(entity))
            .and_then(|pool| typed_ref::<C>(&**pool))?
            .get(entity.index())
            .ok_or_else(|| missing::<C>(entity))
    }

    /// Mutably accesses the `C` component of `entity`.
    ///
    /// # Errors
    ///
    /// Same as [`get_component`](Self::get_component).
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let id = self.present_component_id::<C>(entity)?;
        self.pools
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| missing::<C>(entity))
            .and_then(|pool| typed_mut::<C>(&mut **pool))?
            .get_mut(entity.index())
            .ok_or_else(|| missing::<C>(entity))
    }

    /// Returns the typed pool for `C`, if one has been created.
    #[must_use]
    pub fn pool<C: Component>(&self) -> Option<&Pool<C>> {
        let id = self.types.id_of::<C>()?;
        self.pools.get(id.index())?.as_ref()?.downcast_ref::<C>()
    }

    fn present_component_id<C: Component>(&self, entity: Entity) -> EcsResult<ComponentId> {
        self.check_entity(entity)?;
        match self.types.id_of::<C>() {
            Some(id) if self.signatures[entity.index()].test(id) => Ok(id),
            _ => Err(missing::<C>(entity)),
        }
    }

    fn pool_or_insert<C: Component>(&mut self, id: ComponentId) -> EcsResult<&mut Pool<C>> {
        if id.index() >= self.pools.len() {
            self.pools.resize_with(id.index() + 1, || None);
        }

        let capacity = self.config.initial_pool_capacity;
        let pool = self.pools[id.index()].get_or_insert_with(|| -> Box<dyn ErasedPool> {
            debug!(component = type_name::<C>(), id = id.index(), "component pool created");
            Box::new(Pool::<C>::with_capacity(capacity))
        });
        typed_mut::<C>(&mut **pool)
    }

    fn mark_changed(&mut self, entity: Entity) {
        if self.config.membership == MembershipPolicy::Rematch && !self.pending.contains(&entity) {
            self.changed.insert(entity);
        }
    }

    // =========================================================================
    // System management
    // =========================================================================

    /// Constructs and adds a system.
    ///
    /// `build` is the system's constructor: it receives the component type
    /// registry so it can declare requirements with
    /// [`SystemMembers::require_component`](super::SystemMembers::require_component).
    /// If a system of type `S` is already present, `build` is not called and
    /// the existing instance keeps its members.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `build`. Component types the builder
    /// registered before failing are rolled back, so a failed add consumes
    /// no component ids.
    pub fn add_system<S, F>(&mut self, build: F) -> EcsResult<()>
    where
        S: System,
        F: FnOnce(&mut ComponentTypes) -> EcsResult<S>,
    {
        let key = TypeId::of::<S>();
        let name = type_name::<S>();
        if self.systems.contains_key(&key) {
            debug!(system = name, "system already present");
            return Ok(());
        }

        let snapshot = self.types.clone();
        let system = match build(&mut self.types) {
            Ok(system) => system,
            Err(err) => {
                self.types = snapshot;
                return Err(err);
            }
        };

        self.systems.insert(key, Box::new(system));
        self.system_order.push((key, name));
        if self.config.membership == MembershipPolicy::Rematch {
            self.unseeded_systems.push(key);
        }

        info!(system = name, "system added");
        Ok(())
    }

    /// Removes the system of type `S`. No-op if absent.
    pub fn remove_system<S: System>(&mut self) {
        let key = TypeId::of::<S>();
        if self.systems.remove(&key).is_some() {
            self.system_order.retain(|(k, _)| *k != key);
            self.unseeded_systems.retain(|k| *k != key);
            info!(system = type_name::<S>(), "system removed");
        }
    }

    /// Returns `true` if a system of type `S` is present.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<S>())
    }

    /// Returns the system of type `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if it was never added.
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        self.systems
            .get(&TypeId::of::<S>())
            .and_then(|system| system.as_any().downcast_ref::<S>())
            .ok_or(EcsError::SystemNotFound(type_name::<S>()))
    }

    /// Returns the system of type `S` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if it was never added.
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        self.systems
            .get_mut(&TypeId::of::<S>())
            .and_then(|system| system.as_any_mut().downcast_mut::<S>())
            .ok_or(EcsError::SystemNotFound(type_name::<S>()))
    }

    /// Members of the system of type `S`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if it was never added.
    pub fn system_entities<S: System>(&self) -> EcsResult<&[Entity]> {
        Ok(self.get_system::<S>()?.members().entities())
    }

    /// Number of systems present.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Appends `entity` to every system whose signature it satisfies.
    ///
    /// One bitwise containment test per system. Already-member entities are
    /// not appended twice.
    pub fn add_entity_to_systems(&mut self, entity: Entity) {
        let Some(signature) = self.signatures.get(entity.index()).copied() else {
            return;
        };

        for (key, _) in &self.system_order {
            if let Some(system) = self.systems.get_mut(key) {
                if system.members().matches(&signature) {
                    system.members_mut().add_entity(entity);
                }
            }
        }
    }

    /// Re-evaluates `entity` against every system, adding or removing it.
    fn rematch_entity(&mut self, entity: Entity) {
        let signature = self.signatures[entity.index()];
        for system in self.systems.values_mut() {
            let members = system.members_mut();
            if members.matches(&signature) {
                members.add_entity(entity);
            } else {
                members.remove_entity(entity);
            }
        }
    }

    /// Matches every active entity against one newly added system.
    fn seed_system(&mut self, key: TypeId) {
        let Some(system) = self.systems.get_mut(&key) else {
            return;
        };

        for (index, signature) in self.signatures.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let entity = Entity::new(index as EntityId);
            if !self.pending.contains(&entity) && system.members().matches(signature) {
                system.members_mut().add_entity(entity);
            }
        }
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// The per-tick synchronization point.
    ///
    /// Promotes every pending entity to active, in ascending id order, by
    /// matching it against all systems. Under
    /// [`MembershipPolicy::Rematch`] it also matches new systems against
    /// existing entities and re-evaluates active entities whose signature
    /// changed. A no-op when nothing is pending or changed.
    pub fn update(&mut self) {
        if self.config.membership == MembershipPolicy::Rematch {
            for key in mem::take(&mut self.unseeded_systems) {
                self.seed_system(key);
            }
        }

        let pending = mem::take(&mut self.pending);
        let activated = pending.len();
        for entity in pending {
            self.add_entity_to_systems(entity);
        }

        let changed = mem::take(&mut self.changed);
        let rematched = changed.len();
        for entity in changed {
            self.rematch_entity(entity);
        }

        if activated > 0 || rematched > 0 {
            debug!(activated, rematched, "registry synchronized");
        }
    }

    // =========================================================================
    // System execution
    // =========================================================================

    /// Runs the `update` of the system of type `S`.
    ///
    /// The system is taken out of the registry for the call, then put back.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if absent, or the system's own error.
    pub fn run_system<S: System>(&mut self, delta_time: f64) -> EcsResult<()> {
        self.run_system_by_key(TypeId::of::<S>(), type_name::<S>(), delta_time)
    }

    /// Runs every system's `update` in the order they were added.
    ///
    /// The order is captured when the call starts. A system removed by an
    /// earlier system's update is skipped; one added during the pass first
    /// runs on the next call. Stops at the first error; the failing system
    /// is still put back.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a system.
    pub fn run_systems(&mut self, delta_time: f64) -> EcsResult<()> {
        for (key, name) in self.system_order.clone() {
            if !self.systems.contains_key(&key) {
                continue;
            }
            self.run_system_by_key(key, name, delta_time)?;
        }
        Ok(())
    }

    fn run_system_by_key(&mut self, key: TypeId, name: &'static str, delta_time: f64) -> EcsResult<()> {
        let mut system = self.systems.remove(&key).ok_or(EcsError::SystemNotFound(name))?;
        let result = system.update(self, delta_time);
        trace!(system = system.name(), members = system.members().len(), ok = result.is_ok(), "system ran");
        self.systems.insert(key, system);
        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn typed_ref<'a, C: Component>(pool: &'a (dyn ErasedPool + 'static)) -> EcsResult<&'a Pool<C>> {
    let stored = pool.component_name();
    pool.downcast_ref::<C>().ok_or(EcsError::PoolTypeMismatch {
        component: type_name::<C>(),
        stored,
    })
}

fn typed_mut<'a, C: Component>(pool: &'a mut (dyn ErasedPool + 'static)) -> EcsResult<&'a mut Pool<C>> {
    let stored = pool.component_name();
    pool.downcast_mut::<C>().ok_or(EcsError::PoolTypeMismatch {
        component: type_name::<C>(),
        stored,
    })
}

fn missing<C: Component>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity: entity.id(),
        component: type_name::<C>(),
    }
}
