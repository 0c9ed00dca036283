//! # Entity Component System
//!
//! A signature-indexed ECS for a 2D game engine.
//!
//! ## Design Philosophy
//!
//! - Entity ids are dense indices, never reused
//! - One pool per component type, indexed directly by entity id
//! - Signatures are bitsets; system membership is a containment test
//! - New entities become visible to systems only at the next `update`

mod component;
mod entity;
mod pool;
mod registry;
pub mod signature;
mod system;

pub use component::{Component, ComponentId, ComponentTypes};
pub use entity::{Entity, EntityId, EntityMut};
pub use pool::{ErasedPool, Pool};
pub use registry::Registry;
pub use signature::Signature;
pub use system::{System, SystemMembers};
