use snake_rooms_core::{
    config::Span, AppleKind, AppleRewards, Direction, GameConfig, RoomId, SeededRng, Tile,
    Vector2,
};
use snake_rooms_system_apples::{AppleBehavior, AppleService};
use snake_rooms_world::{query, World};

fn open_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.world.obstacle_count = Span::new(0, 0);
    config.world.ladder_chance = 0.0;
    config.treasure.chance = 0.0;
    config
}

fn only_kind(config: &mut GameConfig, behavior: &str, move_chance: f64) {
    config.apples.retain(|entry| entry.behavior == behavior);
    for entry in &mut config.apples {
        entry.spawn.score_threshold = 0;
        entry.move_chance = move_chance;
    }
}

#[test]
fn ensure_apple_is_idempotent_and_avoids_the_snake() {
    let config = open_config();
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("ensure");
    let body = config.snake.initial_body.clone();

    let first = apples
        .ensure_apple(RoomId::ORIGIN, &mut world, &body, 0, &mut rng)
        .expect("open room has space");
    assert!(!body.contains(&first.position));

    let second = apples
        .ensure_apple(RoomId::ORIGIN, &mut world, &body, 0, &mut rng)
        .expect("apple already present");
    assert_eq!(first, second);
    assert_eq!(
        query::room(&world, RoomId::ORIGIN).and_then(|room| room.apple),
        Some(first.position)
    );
}

#[test]
fn spawning_fails_silently_without_free_tiles() {
    let mut config = open_config();
    config.grid.columns = 2;
    config.grid.rows = 1;
    config.snake.initial_body = vec![Vector2::new(1, 0), Vector2::new(0, 0)];
    config.snake.spawn_buffer.clear();
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("full");
    let body = config.snake.initial_body.clone();

    assert!(apples
        .spawn_apple(RoomId::ORIGIN, &mut world, &body, 0, &mut rng)
        .is_none());
    assert!(apples.apple(RoomId::ORIGIN).is_none());
}

#[test]
fn fatal_shielded_approach_leaves_apple_in_place() {
    let mut config = open_config();
    only_kind(&mut config, "shielded", 0.0);
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("shield");

    let spawned = apples
        .spawn_apple(RoomId::ORIGIN, &mut world, &[], 0, &mut rng)
        .expect("apple spawned");
    assert_eq!(spawned.kind, AppleKind::Shielded);
    let approach = spawned.protected_directions[0];

    let consumption = apples.handle_consumption(RoomId::ORIGIN, approach, &mut world);
    assert!(consumption.fatal);
    assert_eq!(consumption.rewards, AppleRewards::NONE);
    assert_eq!(apples.apple(RoomId::ORIGIN), Some(spawned));
}

#[test]
fn consuming_removes_apple_and_reports_rewards() {
    let mut config = open_config();
    only_kind(&mut config, "gold", 0.0);
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("gold");
    let spawned = apples
        .spawn_apple(RoomId::ORIGIN, &mut world, &[], 0, &mut rng)
        .expect("apple spawned");

    let consumption = apples.handle_consumption(RoomId::ORIGIN, Direction::Up, &mut world);
    assert!(!consumption.fatal);
    assert_eq!(consumption.rewards, AppleRewards { growth: 4, bonus: 4 });
    assert_eq!(consumption.apple, Some(spawned.clone()));
    let expected = config.grid.pixel_center(RoomId::ORIGIN, spawned.position);
    assert_eq!(consumption.world_position, Some(expected));
    assert!(apples.apple(RoomId::ORIGIN).is_none());
    assert!(query::room(&world, RoomId::ORIGIN).is_some_and(|room| room.apple.is_none()));
}

#[test]
fn consuming_nothing_grants_default_reward() {
    let config = open_config();
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let consumption = apples.handle_consumption(RoomId::new(4, 4, 0), Direction::Left, &mut world);
    assert!(!consumption.fatal);
    assert_eq!(consumption.rewards, AppleRewards::DEFAULT);
    assert!(consumption.apple.is_none());
}

#[test]
fn skittish_apples_move_one_tile_and_keep_overlays_in_sync() {
    let mut config = open_config();
    only_kind(&mut config, "skittish", 1.0);
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("skittish");
    let body = config.snake.initial_body.clone();

    let spawned = apples
        .spawn_apple(RoomId::ORIGIN, &mut world, &body, 0, &mut rng)
        .expect("apple spawned");
    assert!(matches!(
        apples.instance(RoomId::ORIGIN).map(|apple| &apple.behavior),
        Some(AppleBehavior::Skittish { .. })
    ));

    let affected = apples.move_apples(&mut world, &body, RoomId::ORIGIN, &mut rng);
    assert!(!affected.is_empty());
    assert!(affected.len() <= 2);

    let moved: Vec<_> = apples.iter().collect();
    assert_eq!(moved.len(), 1);
    let apple = moved[0];
    let before = config.grid.to_global(RoomId::ORIGIN, spawned.position);
    let after = config.grid.to_global(apple.room_id, apple.position);
    assert_eq!(before.manhattan_distance(after), 1);
    assert_eq!(
        query::tile(&world, apple.room_id, apple.position),
        Some(Tile::Floor)
    );
    for room in query::room_ids(&world) {
        let overlay = query::room(&world, room).and_then(|snapshot| snapshot.apple);
        let expected = apples.instance(room).map(|instance| instance.position);
        assert_eq!(overlay, expected, "overlay out of sync in {room}");
    }
}

#[test]
fn static_apples_never_move() {
    let config = open_config();
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("static");
    let body = config.snake.initial_body.clone();
    let _ = apples.spawn_apple(RoomId::ORIGIN, &mut world, &body, 0, &mut rng);
    for _ in 0..20 {
        assert!(apples
            .move_apples(&mut world, &body, RoomId::ORIGIN, &mut rng)
            .is_empty());
    }
}

#[test]
fn clear_apple_drops_instance_and_overlay() {
    let config = open_config();
    let mut world = World::new(&config);
    let mut apples = AppleService::new(&config).expect("valid config");
    let mut rng = SeededRng::from_seed("clear");
    let spawned = apples.spawn_apple(RoomId::ORIGIN, &mut world, &[], 0, &mut rng);
    assert_eq!(apples.clear_apple(RoomId::ORIGIN, &mut world), spawned);
    assert!(apples.apple(RoomId::ORIGIN).is_none());
    assert!(query::room(&world, RoomId::ORIGIN).is_some_and(|room| room.apple.is_none()));
}
