//! # ECS Error Types
//!
//! All errors that can occur in the ECS core.
//!
//! Capacity errors are architectural: the registry cannot recover from them
//! without a larger `max_components`. Everything else is local to one call.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// More distinct component types were registered than the registry allows.
    #[error("component capacity exceeded: cannot register `{name}`, limit is {capacity} types")]
    ComponentCapacityExceeded {
        /// Type name of the component that did not fit.
        name: &'static str,
        /// The configured component limit.
        capacity: usize,
    },

    /// Requested component capacity is outside the supported signature width.
    #[error("invalid component capacity {requested}: must be between 1 and {max}")]
    InvalidCapacity {
        /// The requested capacity.
        requested: usize,
        /// The widest signature supported.
        max: usize,
    },

    /// The entity was never created by this registry.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity's signature does not contain the requested component.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        /// The entity that was queried.
        entity: EntityId,
        /// Type name of the requested component.
        component: &'static str,
    },

    /// No system of the requested type has been added.
    #[error("system not found: `{0}`")]
    SystemNotFound(&'static str),

    /// The pool stored under a component id holds a different element type.
    #[error("pool type mismatch: requested `{component}`, pool stores `{stored}`")]
    PoolTypeMismatch {
        /// Type name of the requested component.
        component: &'static str,
        /// Type name of the component the pool actually stores.
        stored: &'static str,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EcsError {
    /// Returns `true` for errors that cannot be fixed without changing the
    /// registry's configuration.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ComponentCapacityExceeded { .. })
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
