//! # EMBER Core Engine
//!
//! Entity Component System runtime for a 2D game engine:
//! - Entities are dense integer ids with no payload
//! - Components are plain typed values kept in entity-indexed pools
//! - Systems declare required components and receive matching entities
//!
//! ## Architecture Rules
//!
//! 1. **Signatures are authoritative** - a pool slot means nothing unless
//!    the entity's signature bit is set
//! 2. **Deferred activation** - new entities join systems at `update()`
//! 3. **Loud failures** - exceeding the component capacity is an error,
//!    never a silent overflow
//!
//! ## Example
//!
//! ```rust
//! use ember_core::{Component, Registry};
//!
//! #[derive(Clone, Copy, Default)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {}
//!
//! let mut registry = Registry::new();
//! let tank = registry.create_entity();
//! registry.add_component(tank, Position { x: 10.0, y: 30.0 })?;
//! registry.update();
//! # Ok::<(), ember_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::{MembershipPolicy, RegistryConfig, DEFAULT_POOL_CAPACITY, MAX_COMPONENTS};
pub use ecs::signature::{SIGNATURE_BITS, SIGNATURE_WORDS};
pub use ecs::{
    Component, ComponentId, ComponentTypes, Entity, EntityId, EntityMut, ErasedPool, Pool,
    Registry, Signature, System, SystemMembers,
};
pub use error::{EcsError, EcsResult};
