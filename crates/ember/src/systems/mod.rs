//! # Gameplay Systems
//!
//! Each system declares its required components in its constructor, which
//! has the shape [`Registry::add_system`](ember_core::Registry::add_system)
//! expects:
//!
//! ```rust
//! use ember::systems::{MovementSystem, RenderSystem};
//! use ember_core::Registry;
//!
//! let mut registry = Registry::new();
//! registry.add_system(MovementSystem::new)?;
//! registry.add_system(RenderSystem::new)?;
//! # Ok::<(), ember_core::EcsError>(())
//! ```

mod movement;
mod render;

pub use movement::MovementSystem;
pub use render::{RenderSystem, SpriteInstance, TextureTable};
