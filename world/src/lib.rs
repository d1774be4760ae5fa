#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative room state for snake-rooms.
//!
//! The world lazily generates rooms the first time they are read and caches
//! them forever; a cached room's layout and palette never regenerate. Systems
//! never mutate a cached room directly: they submit [`Command`]s to [`apply`],
//! which reports every actual change as an [`Event`]. [`World::clear`] drops
//! the whole cache so the next read produces fresh layouts.

use std::collections::{BTreeMap, BTreeSet};

use snake_rooms_core::{
    config::{TreasureConfig, WorldConfig},
    Command, Event, GameConfig, GridConfig, RoomId, RoomSnapshot, SeededRng, Vector2,
};

mod generation;

use generation::Blueprint;

/// Cache of generated rooms plus their per-room overlays.
#[derive(Debug)]
pub struct World {
    grid: GridConfig,
    generation: WorldConfig,
    treasure: TreasureConfig,
    spawn_guard: BTreeSet<Vector2>,
    rooms: BTreeMap<RoomId, RoomSnapshot>,
}

impl World {
    /// Creates an empty world for the provided configuration.
    ///
    /// The initial snake body and the spawn buffer form the origin room's
    /// spawn guard: those cells are always generated as floor.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let spawn_guard = config
            .snake
            .initial_body
            .iter()
            .chain(config.snake.spawn_buffer.iter())
            .copied()
            .collect();
        Self {
            grid: config.grid,
            generation: config.world.clone(),
            treasure: config.treasure,
            spawn_guard,
            rooms: BTreeMap::new(),
        }
    }

    /// Returns the room, generating and caching it on first access.
    pub fn room(&mut self, id: RoomId, rng: &mut SeededRng) -> &RoomSnapshot {
        let Self {
            grid,
            generation,
            treasure,
            spawn_guard,
            rooms,
        } = self;
        rooms.entry(id).or_insert_with(|| {
            Blueprint {
                grid: &*grid,
                world: &*generation,
                treasure: &*treasure,
                guard: &*spawn_guard,
            }
            .generate(id, rng)
        })
    }

    /// Drops every cached room.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}

/// Applies the provided command to the world, reporting what changed.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetTile { room, local, tile } => {
            let changed = world
                .rooms
                .get_mut(&room)
                .is_some_and(|snapshot| snapshot.set_tile(local, tile));
            if changed {
                out_events.push(Event::TileChanged { room, local, tile });
            }
        }
        Command::SetApple { room, position } => {
            let Some(snapshot) = world.rooms.get_mut(&room) else {
                return;
            };
            if snapshot.apple != position {
                snapshot.apple = position;
                out_events.push(Event::AppleChanged { room, position });
            }
        }
        Command::SetTreasure { room, position } => {
            let Some(snapshot) = world.rooms.get_mut(&room) else {
                return;
            };
            if snapshot.treasure != position {
                snapshot.treasure = position;
                out_events.push(Event::TreasureChanged { room, position });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use snake_rooms_core::{GridConfig, RoomId, RoomSnapshot, Tile, Vector2};

    use super::World;

    /// Returns a cached room without generating it.
    #[must_use]
    pub fn room(world: &World, id: RoomId) -> Option<&RoomSnapshot> {
        world.rooms.get(&id)
    }

    /// Returns the tile of a cached room.
    #[must_use]
    pub fn tile(world: &World, id: RoomId, local: Vector2) -> Option<Tile> {
        room(world, id).and_then(|room| room.tile(local))
    }

    /// Reports whether a cached room holds its treasure at `local`.
    #[must_use]
    pub fn has_treasure_at(world: &World, id: RoomId, local: Vector2) -> bool {
        room(world, id).is_some_and(|room| room.treasure == Some(local))
    }

    /// Provides the grid dimensions shared by every room.
    #[must_use]
    pub fn grid(world: &World) -> &GridConfig {
        &world.grid
    }

    /// Identifiers of every cached room in deterministic order.
    pub fn room_ids(world: &World) -> impl Iterator<Item = RoomId> + '_ {
        world.rooms.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use snake_rooms_core::Tile;

    use super::*;

    fn world() -> World {
        World::new(&GameConfig::default())
    }

    #[test]
    fn rooms_are_generated_once_and_cached() {
        let mut world = world();
        let mut rng = SeededRng::from_seed("cache");
        let first = world.room(RoomId::new(1, 0, 0), &mut rng).clone();
        let second = world.room(RoomId::new(1, 0, 0), &mut rng).clone();
        assert_eq!(first, second);
        assert_eq!(query::room_ids(&world).count(), 1);
    }

    #[test]
    fn clear_regenerates_rooms_with_fresh_randomness() {
        let mut world = world();
        let mut rng = SeededRng::from_seed("regen");
        let ids: Vec<RoomId> = (0..6).map(|x| RoomId::new(x, 0, 0)).collect();
        let before: Vec<RoomSnapshot> = ids
            .iter()
            .map(|id| world.room(*id, &mut rng).clone())
            .collect();
        world.clear();
        assert!(query::room(&world, ids[0]).is_none());
        let after: Vec<RoomSnapshot> = ids
            .iter()
            .map(|id| world.room(*id, &mut rng).clone())
            .collect();
        assert_ne!(before, after);
    }

    #[test]
    fn overlays_only_touch_cached_rooms() {
        let mut world = world();
        let mut rng = SeededRng::from_seed("overlay");
        let id = RoomId::ORIGIN;
        let apple = Command::SetApple {
            room: id,
            position: Some(Vector2::new(1, 1)),
        };
        let mut events = Vec::new();
        apply(&mut world, apple, &mut events);
        assert!(events.is_empty());

        let _ = world.room(id, &mut rng);
        apply(&mut world, apple, &mut events);
        apply(
            &mut world,
            Command::SetTreasure {
                room: id,
                position: Some(Vector2::new(2, 2)),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::AppleChanged {
                    room: id,
                    position: Some(Vector2::new(1, 1)),
                },
                Event::TreasureChanged {
                    room: id,
                    position: Some(Vector2::new(2, 2)),
                },
            ]
        );
        assert!(query::has_treasure_at(&world, id, Vector2::new(2, 2)));
        assert!(!query::has_treasure_at(&world, id, Vector2::new(1, 1)));
        assert_eq!(
            query::room(&world, id).and_then(|room| room.apple),
            Some(Vector2::new(1, 1))
        );
    }

    #[test]
    fn unchanged_commands_emit_no_events() {
        let mut world = world();
        let mut rng = SeededRng::from_seed("quiet");
        let id = RoomId::new(0, 0, 1);
        let local = Vector2::new(4, 4);
        let _ = world.room(id, &mut rng);
        let wall = Command::SetTile {
            room: id,
            local,
            tile: Tile::Wall,
        };

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetTile {
                room: id,
                local,
                tile: Tile::Floor,
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, wall, &mut events);
        assert_eq!(
            events,
            vec![Event::TileChanged {
                room: id,
                local,
                tile: Tile::Wall,
            }]
        );
        apply(&mut world, wall, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(query::tile(&world, id, local), Some(Tile::Wall));
    }

    #[test]
    fn origin_room_keeps_initial_body_walkable() {
        let config = GameConfig::default();
        for seed in ["one", "two", "three", "four"] {
            let mut world = World::new(&config);
            let mut rng = SeededRng::from_seed(seed);
            let room = world.room(RoomId::ORIGIN, &mut rng);
            for cell in config.snake.initial_body.iter().chain(&config.snake.spawn_buffer) {
                assert_eq!(room.tile(*cell), Some(Tile::Floor));
            }
        }
    }
}
