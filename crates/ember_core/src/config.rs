//! # Registry Configuration
//!
//! Loaded once at startup, usually from the `[registry]` table of a game's
//! TOML config file. Every field has a default, so an empty table is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::signature::SIGNATURE_BITS;
use crate::error::{EcsError, EcsResult};

/// Default number of distinct component types a registry accepts.
pub const MAX_COMPONENTS: usize = 32;

/// Default number of slots reserved when a component pool is first created.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// When system membership is computed for an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPolicy {
    /// Match an entity against systems once, when it leaves the pending set.
    ///
    /// Components attached or removed afterwards never change membership.
    #[default]
    OnActivation,
    /// Also re-match active entities whose signature changed since the
    /// previous synchronization point.
    Rematch,
}

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of distinct component types (1 to 256).
    pub max_components: usize,
    /// Slots reserved when a component pool is first created.
    pub initial_pool_capacity: usize,
    /// Membership recomputation policy.
    pub membership: MembershipPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_components: MAX_COMPONENTS,
            initial_pool_capacity: DEFAULT_POOL_CAPACITY,
            membership: MembershipPolicy::OnActivation,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Config`] if the text is not valid TOML for this
    /// struct, or [`EcsError::InvalidCapacity`] if validation fails.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EcsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Config`] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks that the component capacity fits in a [`Signature`](crate::Signature).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidCapacity`] if `max_components` is zero or
    /// wider than the signature.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_components == 0 || self.max_components > SIGNATURE_BITS {
            return Err(EcsError::InvalidCapacity {
                requested: self.max_components,
                max: SIGNATURE_BITS,
            });
        }
        Ok(())
    }
}
