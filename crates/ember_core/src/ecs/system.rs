//! # Systems
//!
//! A system declares the components it requires once, at construction, and
//! the registry keeps its member list in sync at each synchronization point.
//! The per-tick behavior lives in gameplay code implementing [`System`].

use std::any::{type_name, Any};

use super::component::{Component, ComponentTypes};
use super::entity::Entity;
use super::registry::Registry;
use super::signature::Signature;
use crate::error::EcsResult;

/// Required signature plus the live member list of one system.
///
/// Members keep insertion order and never contain duplicates. A bitset
/// indexed by entity id makes the duplicate check O(1).
#[derive(Clone, Debug, Default)]
pub struct SystemMembers {
    signature: Signature,
    entities: Vec<Entity>,
    /// 1 = member. 64 entities per word.
    present: Vec<u64>,
}

impl SystemMembers {
    /// Creates an empty member list with no requirements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that members must carry component `C`.
    ///
    /// Registers `C` with `types` if it is not known yet.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`](crate::EcsError) if
    /// `C` is new and the type registry is full.
    pub fn require_component<C: Component>(&mut self, types: &mut ComponentTypes) -> EcsResult<&mut Self> {
        let id = types.register::<C>()?;
        self.signature.set(id);
        Ok(self)
    }

    /// Appends `entity` unless it is already a member.
    pub fn add_entity(&mut self, entity: Entity) {
        let (word, mask) = Self::locate(entity);
        if word >= self.present.len() {
            self.present.resize(word + 1, 0);
        }
        if self.present[word] & mask == 0 {
            self.present[word] |= mask;
            self.entities.push(entity);
        }
    }

    /// Removes `entity`, keeping the order of the others.
    pub fn remove_entity(&mut self, entity: Entity) {
        if !self.contains(entity) {
            return;
        }
        let (word, mask) = Self::locate(entity);
        self.present[word] &= !mask;
        self.entities.retain(|e| *e != entity);
    }

    /// Returns `true` if `entity` is a member.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        let (word, mask) = Self::locate(entity);
        self.present.get(word).is_some_and(|bits| bits & mask != 0)
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the system has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    fn locate(entity: Entity) -> (usize, u64) {
        let index = entity.index();
        (index / 64, 1u64 << (index % 64))
    }

    /// Current members in insertion order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The required component signature.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns `true` if an entity with `entity_signature` qualifies.
    #[inline]
    #[must_use]
    pub fn matches(&self, entity_signature: &Signature) -> bool {
        entity_signature.contains_all(&self.signature)
    }
}

/// Trait for gameplay systems managed by a [`Registry`].
///
/// Implementors hold a [`SystemMembers`] built in their constructor and
/// expose it through `members`/`members_mut`.
///
/// # Example
///
/// ```rust
/// use std::any::Any;
/// use ember_core::{Component, ComponentTypes, EcsResult, System, SystemMembers};
///
/// #[derive(Default)]
/// struct Health(i32);
/// impl Component for Health {}
///
/// struct RegenSystem {
///     members: SystemMembers,
/// }
///
/// impl RegenSystem {
///     fn new(types: &mut ComponentTypes) -> EcsResult<Self> {
///         let mut members = SystemMembers::new();
///         members.require_component::<Health>(types)?;
///         Ok(Self { members })
///     }
/// }
///
/// impl System for RegenSystem {
///     fn members(&self) -> &SystemMembers { &self.members }
///     fn members_mut(&mut self) -> &mut SystemMembers { &mut self.members }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
/// ```
pub trait System: 'static {
    /// The system's requirements and members.
    fn members(&self) -> &SystemMembers;

    /// Mutable access to the system's requirements and members.
    fn members_mut(&mut self) -> &mut SystemMembers;

    /// Upcasts to [`Any`] for typed lookup.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for typed mutable lookup.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Runs one tick over the current members.
    ///
    /// The system is detached from `registry` for the duration of the call,
    /// so it may read and write components freely.
    ///
    /// # Errors
    ///
    /// Implementations propagate component access errors.
    fn update(&mut self, registry: &mut Registry, delta_time: f64) -> EcsResult<()> {
        let _ = (registry, delta_time);
        Ok(())
    }
}
