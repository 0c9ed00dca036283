//! Euler integration of [`Transform`] by [`RigidBody`] velocity.

use std::any::Any;

use ember_core::{ComponentTypes, EcsResult, Registry, System, SystemMembers};

use crate::components::{RigidBody, Transform};

/// Moves every entity with a [`Transform`] and a [`RigidBody`].
///
/// `position += velocity * delta_time` once per update.
pub struct MovementSystem {
    members: SystemMembers,
}

impl MovementSystem {
    /// Creates the system and registers its required components.
    ///
    /// # Errors
    ///
    /// Fails if the registry has no room left for the component types.
    pub fn new(types: &mut ComponentTypes) -> EcsResult<Self> {
        let mut members = SystemMembers::new();
        members
            .require_component::<Transform>(types)?
            .require_component::<RigidBody>(types)?;
        Ok(Self { members })
    }
}

impl System for MovementSystem {
    fn members(&self) -> &SystemMembers {
        &self.members
    }

    fn members_mut(&mut self) -> &mut SystemMembers {
        &mut self.members
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn update(&mut self, registry: &mut Registry, delta_time: f64) -> EcsResult<()> {
        #[allow(clippy::cast_possible_truncation)]
        let dt = delta_time as f32;

        for &entity in self.members.entities() {
            let velocity = registry.get_component::<RigidBody>(entity)?.velocity;
            registry.get_component_mut::<Transform>(entity)?.position += velocity * dt;
        }
        Ok(())
    }
}
