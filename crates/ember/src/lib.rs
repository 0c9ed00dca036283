//! # EMBER
//!
//! 2D gameplay on top of [`ember_core`]: components, systems, and the
//! fixed-rate frame driver.
//!
//! ## Example
//!
//! ```rust
//! use ember::{GameConfig, GameLoop};
//! use ember::components::{RigidBody, Sprite, Transform, Vec2};
//! use ember::systems::{MovementSystem, RenderSystem};
//!
//! let config = GameConfig { sleep: false, ..GameConfig::default() };
//! let mut game = GameLoop::new(config)?;
//!
//! game.setup(|registry| {
//!     registry.add_system(MovementSystem::new)?;
//!     registry.add_system(RenderSystem::new)?;
//!
//!     let tank = registry.create_entity();
//!     registry.add_component(tank, Transform::at(Vec2::new(10.0, 30.0)))?;
//!     registry.add_component(tank, RigidBody::new(Vec2::new(40.0, 0.0)))?;
//!     registry.add_component(tank, Sprite::new("tank.png", 32, 32))?;
//!     Ok(())
//! })?;
//!
//! game.tick(0.5)?;
//! # Ok::<(), ember::GameError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod systems;

pub use config::{GameConfig, DEFAULT_FPS, DEFAULT_MAX_DELTA};
pub use error::{GameError, GameResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop};

/// Re-export of the ECS runtime.
pub use ember_core as core;
