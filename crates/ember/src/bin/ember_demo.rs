//! # EMBER Demo
//!
//! Headless session: spawns a few vehicles, runs a fixed number of frames,
//! and logs where everything ended up.
//!
//! ```bash
//! # Default config, 300 frames
//! ember_demo
//!
//! # Custom config and frame count
//! RUST_LOG=debug ember_demo ember.toml 120
//! ```

use ember::components::{BoxCollider, RigidBody, Sprite, Transform, Vec2};
use ember::core::{Entity, Registry};
use ember::systems::{MovementSystem, RenderSystem};
use ember::{GameConfig, GameError, GameLoop, GameResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FRAMES: u64 = 300;

fn main() -> GameResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n
            .parse()
            .map_err(|e| GameError::Config(format!("frame count `{n}`: {e}")))?,
        None => DEFAULT_FRAMES,
    };

    let mut game = GameLoop::new(config)?;
    game.setup(spawn_scene)?;

    game.run_frames(frames)?.log_summary();

    report(game.registry())
}

fn spawn_scene(registry: &mut Registry) -> ember::core::EcsResult<()> {
    registry.add_system(MovementSystem::new)?;
    registry.add_system(RenderSystem::new)?;

    let tank = registry.create_entity();
    registry
        .entity_mut(tank)?
        .add_component(Transform::at(Vec2::new(10.0, 30.0)))?
        .add_component(RigidBody::new(Vec2::new(40.0, 0.0)))?
        .add_component(Sprite::new("tank.png", 32, 32).on_layer(2))?
        .add_component(BoxCollider::new(32.0, 32.0))?;

    let truck = registry.create_entity();
    registry
        .entity_mut(truck)?
        .add_component(Transform::at(Vec2::new(50.0, 100.0)).with_rotation(90.0))?
        .add_component(RigidBody::new(Vec2::new(0.0, 50.0)))?
        .add_component(Sprite::new("truck.png", 32, 32).on_layer(2))?
        .add_component(BoxCollider::new(32.0, 32.0))?;

    let ground = registry.create_entity();
    registry
        .entity_mut(ground)?
        .add_component(Transform::at(Vec2::ZERO).with_scale(Vec2::new(4.0, 4.0)))?
        .add_component(Sprite::new("tilemap.png", 256, 256))?;

    Ok(())
}

fn report(registry: &Registry) -> GameResult<()> {
    for id in 0..registry.entity_count() {
        #[allow(clippy::cast_possible_truncation)]
        let entity = Entity::new(id as u32);
        if let Ok(transform) = registry.get_component::<Transform>(entity) {
            info!(
                %entity,
                x = transform.position.x,
                y = transform.position.y,
                "final position"
            );
        }
    }

    let render = registry.get_system::<RenderSystem>()?;
    info!(
        sprites = render.queue().len(),
        textures = render.textures().len(),
        bytes = render.as_bytes().len(),
        "render queue"
    );
    Ok(())
}
