//! # Game Loop Integration Tests
//!
//! Drives the gameplay systems through [`GameLoop`] with fixed deltas.
//!
//! Run with: cargo test --package ember --test game_loop_integration

use ember::components::{BoxCollider, RigidBody, Sprite, Transform, Vec2};
use ember::core::{Entity, MembershipPolicy, Registry, RegistryConfig};
use ember::systems::{MovementSystem, RenderSystem};
use ember::{GameConfig, GameError, GameLoop};

fn headless() -> GameConfig {
    GameConfig {
        sleep: false,
        ..GameConfig::default()
    }
}

fn spawn_vehicle(registry: &mut Registry, position: Vec2, velocity: Vec2, z: i32) -> Entity {
    let entity = registry.create_entity();
    registry.add_component(entity, Transform::at(position)).unwrap();
    registry.add_component(entity, RigidBody::new(velocity)).unwrap();
    registry
        .add_component(entity, Sprite::new("vehicle.png", 32, 32).on_layer(z))
        .unwrap();
    entity
}

fn position(game: &GameLoop, entity: Entity) -> Vec2 {
    game.registry().get_component::<Transform>(entity).unwrap().position
}

#[test]
fn tick_moves_entities_created_in_setup() {
    let mut game = GameLoop::new(headless()).unwrap();
    let mut tank = Entity::new(u32::MAX);

    game.setup(|registry| {
        registry.add_system(MovementSystem::new)?;
        tank = registry.create_entity();
        registry.add_component(tank, Transform::at(Vec2::new(10.0, 30.0)))?;
        registry.add_component(tank, RigidBody::new(Vec2::new(40.0, 0.0)))?;
        Ok(())
    })
    .unwrap();

    game.tick(0.25).unwrap();
    game.tick(0.25).unwrap();

    assert_eq!(position(&game, tank), Vec2::new(30.0, 30.0));
}

#[test]
fn entities_spawned_mid_game_join_next_tick() {
    let mut game = GameLoop::new(headless()).unwrap();
    game.setup(|registry| registry.add_system(MovementSystem::new)).unwrap();
    game.tick(0.1).unwrap();

    let truck = spawn_vehicle(game.registry_mut(), Vec2::new(50.0, 100.0), Vec2::new(0.0, 50.0), 0);
    assert!(game
        .registry()
        .system_entities::<MovementSystem>()
        .unwrap()
        .is_empty());

    // The tick that activates the entity also moves it
    game.tick(1.0).unwrap();
    assert_eq!(position(&game, truck), Vec2::new(50.0, 150.0));
}

#[test]
fn render_queue_tracks_movement() {
    let mut game = GameLoop::new(headless()).unwrap();
    let mut entities = Vec::new();

    game.setup(|registry| {
        registry.add_system(MovementSystem::new)?;
        registry.add_system(RenderSystem::new)?;
        entities.push(spawn_vehicle(registry, Vec2::ZERO, Vec2::new(10.0, 0.0), 3));
        entities.push(spawn_vehicle(registry, Vec2::ZERO, Vec2::new(0.0, 10.0), 1));
        Ok(())
    })
    .unwrap();

    game.tick(1.0).unwrap();

    let render = game.registry().get_system::<RenderSystem>().unwrap();
    let queue = render.queue();
    assert_eq!(queue.len(), 2);
    // Lower layer first; movement ran before rendering
    assert_eq!(queue[0].entity, entities[1].id());
    assert_eq!(queue[0].position, [0.0, 10.0]);
    assert_eq!(queue[1].entity, entities[0].id());
    assert_eq!(queue[1].position, [10.0, 0.0]);
}

#[test]
fn colliders_are_opaque_to_movement() {
    let mut game = GameLoop::new(headless()).unwrap();
    let mut crate_box = Entity::new(u32::MAX);

    game.setup(|registry| {
        registry.add_system(MovementSystem::new)?;
        crate_box = registry.create_entity();
        registry.add_component(crate_box, Transform::at(Vec2::new(5.0, 5.0)))?;
        registry.add_component(crate_box, BoxCollider::new(8.0, 8.0))?;
        Ok(())
    })
    .unwrap();

    game.run_frames(3).unwrap();
    assert_eq!(position(&game, crate_box), Vec2::new(5.0, 5.0));
    assert_eq!(game.frame_count(), 3);
    assert_eq!(game.stats().frames_recorded, 3);
}

#[test]
fn setup_errors_propagate() {
    let config = GameConfig {
        registry: RegistryConfig {
            max_components: 1,
            ..RegistryConfig::default()
        },
        ..headless()
    };
    let mut game = GameLoop::new(config).unwrap();

    let err = game.setup(|registry| registry.add_system(MovementSystem::new)).unwrap_err();
    assert!(matches!(err, GameError::Ecs(_)));
}

#[test]
fn run_frames_clamps_every_delta() {
    let config = GameConfig {
        max_delta: 0.002,
        ..headless()
    };
    let mut game = GameLoop::new(config).unwrap();
    game.setup(|registry| registry.add_system(MovementSystem::new)).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    let stats = game.run_frames(5).unwrap();
    assert_eq!(stats.frames_recorded, 5);
    assert!(stats.simulated_seconds <= 5.0 * 0.002 + 1e-12);
}

#[test]
fn rematch_policy_from_config() {
    let config = GameConfig::from_toml_str(
        r#"
        sleep = false
        [registry]
        membership = "rematch"
        "#,
    )
    .unwrap();
    assert_eq!(config.registry.membership, MembershipPolicy::Rematch);

    let mut game = GameLoop::new(config).unwrap();
    let mut rock = Entity::new(u32::MAX);
    game.setup(|registry| {
        registry.add_system(MovementSystem::new)?;
        rock = registry.create_entity();
        registry.add_component(rock, Transform::default())?;
        Ok(())
    })
    .unwrap();
    game.tick(1.0).unwrap();

    // A static entity starts moving once it gains a rigid body
    game.registry_mut()
        .add_component(rock, RigidBody::new(Vec2::new(2.0, 0.0)))
        .unwrap();
    game.tick(1.0).unwrap();
    assert_eq!(position(&game, rock), Vec2::new(2.0, 0.0));
}
