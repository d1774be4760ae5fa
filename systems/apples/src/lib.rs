#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Apple spawning, movement and consumption for snake-rooms.
//!
//! The [`AppleService`] owns every apple instance, keyed by room, and keeps the
//! world's apple overlay in sync with it through [`Command::SetApple`]. At most
//! one apple exists per room.

use std::collections::{BTreeMap, BTreeSet};

use snake_rooms_core::{
    AppleKind, AppleRewards, AppleSnapshot, Command, ConfigError, Direction, Event, GameConfig,
    GridConfig, PixelPosition, RoomId, SeededRng, Tile, Vector2,
};
use snake_rooms_world::{apply, query, World};

pub mod behavior;

pub use behavior::AppleBehavior;

/// Resolved apple type from the spawn table.
#[derive(Clone, Debug)]
struct AppleType {
    id: String,
    kind: AppleKind,
    color: String,
    base: f64,
    score_threshold: u64,
    move_chance: f64,
}

/// A live apple.
#[derive(Clone, Debug, PartialEq)]
pub struct AppleInstance {
    /// Room holding the apple.
    pub room_id: RoomId,
    /// Room-local tile of the apple.
    pub position: Vector2,
    /// Configured type identifier.
    pub type_id: String,
    /// Display colour.
    pub color: String,
    /// Behaviour state.
    pub behavior: AppleBehavior,
}

impl AppleInstance {
    /// Captures a read-only snapshot of the apple.
    #[must_use]
    pub fn snapshot(&self) -> AppleSnapshot {
        AppleSnapshot {
            room_id: self.room_id,
            position: self.position,
            type_id: self.type_id.clone(),
            kind: self.behavior.kind(),
            color: self.color.clone(),
            protected_directions: self.behavior.protected_directions().to_vec(),
        }
    }
}

/// Result of the snake reaching an apple tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Consumption {
    /// The approach direction was protected; the apple is left in place.
    pub fatal: bool,
    /// Growth and bonus granted.
    pub rewards: AppleRewards,
    /// Pixel centre of the eaten apple.
    pub world_position: Option<PixelPosition>,
    /// The apple that was reached, if one existed.
    pub apple: Option<AppleSnapshot>,
}

/// Owner of every apple instance.
#[derive(Debug)]
pub struct AppleService {
    grid: GridConfig,
    types: Vec<AppleType>,
    fallback: usize,
    apples: BTreeMap<RoomId, AppleInstance>,
}

impl AppleService {
    /// Resolves the configured spawn table.
    ///
    /// # Errors
    ///
    /// Fails when no apple types are configured or a type names an unknown
    /// behaviour.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        if config.apples.is_empty() {
            return Err(ConfigError::NoAppleTypes);
        }

        let types = config
            .apples
            .iter()
            .map(|entry| {
                let kind = AppleKind::from_behavior_id(&entry.behavior).ok_or_else(|| {
                    ConfigError::UnknownAppleBehavior {
                        type_id: entry.id.clone(),
                        behavior: entry.behavior.clone(),
                    }
                })?;
                Ok(AppleType {
                    id: entry.id.clone(),
                    kind,
                    color: entry.color.clone(),
                    base: entry.spawn.base,
                    score_threshold: entry.spawn.score_threshold,
                    move_chance: entry.move_chance,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let fallback = types
            .iter()
            .position(|entry| entry.kind == AppleKind::Normal)
            .unwrap_or(0);

        Ok(Self {
            grid: config.grid,
            types,
            fallback,
            apples: BTreeMap::new(),
        })
    }

    /// Snapshot of the apple in `room`.
    #[must_use]
    pub fn apple(&self, room: RoomId) -> Option<AppleSnapshot> {
        self.apples.get(&room).map(AppleInstance::snapshot)
    }

    /// Live apple instance in `room`.
    #[must_use]
    pub fn instance(&self, room: RoomId) -> Option<&AppleInstance> {
        self.apples.get(&room)
    }

    /// Iterates every live apple in room order.
    pub fn iter(&self) -> impl Iterator<Item = &AppleInstance> {
        self.apples.values()
    }

    /// Returns the room's apple, spawning one if the room has none.
    pub fn ensure_apple(
        &mut self,
        room: RoomId,
        world: &mut World,
        snake_body: &[Vector2],
        score: u64,
        rng: &mut SeededRng,
    ) -> Option<AppleSnapshot> {
        if let Some(apple) = self.apple(room) {
            return Some(apple);
        }
        self.spawn_apple(room, world, snake_body, score, rng)
    }

    /// Places a new apple in `room`, replacing any current one.
    ///
    /// Candidate tiles are floor tiles not holding the treasure, the current
    /// apple, or a snake segment. Returns `None` when no tile is available.
    pub fn spawn_apple(
        &mut self,
        room: RoomId,
        world: &mut World,
        snake_body: &[Vector2],
        score: u64,
        rng: &mut SeededRng,
    ) -> Option<AppleSnapshot> {
        let occupied: BTreeSet<Vector2> = snake_body
            .iter()
            .filter(|segment| {
                let owner = self.grid.room_of(**segment, room.z);
                owner.x == room.x && owner.y == room.y
            })
            .map(|segment| self.grid.to_local(*segment))
            .collect();

        let snapshot = world.room(room, rng);
        let candidates: Vec<Vector2> = snapshot
            .cells_of(Tile::Floor)
            .filter(|cell| {
                snapshot.treasure != Some(*cell)
                    && snapshot.apple != Some(*cell)
                    && !occupied.contains(cell)
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let chosen = self.choose_type(score, rng);
        let position = rng.pick(&candidates).copied()?;
        let template = self.types.get(chosen)?;
        let instance = AppleInstance {
            room_id: room,
            position,
            type_id: template.id.clone(),
            color: template.color.clone(),
            behavior: AppleBehavior::initialize(template.kind, template.move_chance, rng),
        };
        let snapshot = instance.snapshot();
        let _ = self.apples.insert(room, instance);
        set_overlay(world, room, Some(position), &mut Vec::new());
        tracing::debug!(room = %room, kind = ?snapshot.kind, x = position.x, y = position.y, "apple_spawned");
        Some(snapshot)
    }

    fn choose_type(&self, score: u64, rng: &mut SeededRng) -> usize {
        let eligible: Vec<usize> = self
            .types
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.score_threshold <= score)
            .map(|(index, _)| index)
            .collect();
        let Some(first) = eligible.first().copied() else {
            return self.fallback;
        };

        let total: f64 = eligible.iter().map(|index| self.types[*index].base).sum();
        if total <= 0.0 {
            return first;
        }

        let mut roll = rng.next_f64() * total;
        for index in &eligible {
            roll -= self.types[*index].base;
            if roll < 0.0 {
                return *index;
            }
        }
        eligible.last().copied().unwrap_or(first)
    }

    /// Lets every apple that wants to move take one step.
    ///
    /// Apples may step across a room edge into an already generated
    /// neighbouring room. Returns the rooms whose apple overlay changed.
    pub fn move_apples(
        &mut self,
        world: &mut World,
        snake_body: &[Vector2],
        snake_room: RoomId,
        rng: &mut SeededRng,
    ) -> BTreeSet<RoomId> {
        let mut events = Vec::new();
        let Some(head) = snake_body.first().copied() else {
            return BTreeSet::new();
        };

        let rooms: Vec<RoomId> = self.apples.keys().copied().collect();
        for room in rooms {
            let Some(apple) = self.apples.get(&room) else {
                continue;
            };

            let origin = apple.position;
            let targets: Vec<(RoomId, Vector2)> = match apple.behavior.move_target() {
                Some(target) => vec![(room, target)],
                None => {
                    if !apple.behavior.should_attempt_move(rng) {
                        continue;
                    }
                    let checker = MoveCheck {
                        grid: &self.grid,
                        apples: &self.apples,
                        world: &*world,
                        snake_body,
                        snake_room,
                        from: room,
                    };
                    let global = self.grid.to_global(room, origin);
                    apple
                        .behavior
                        .move_directions(
                            global,
                            head,
                            |direction| {
                                let (target_room, target) = checker.step(origin, direction);
                                !checker.is_free(target_room, target)
                            },
                            rng,
                        )
                        .into_iter()
                        .map(|direction| checker.step(origin, direction))
                        .collect()
                }
            };

            let checker = MoveCheck {
                grid: &self.grid,
                apples: &self.apples,
                world: &*world,
                snake_body,
                snake_room,
                from: room,
            };
            let Some((target_room, target)) = targets
                .into_iter()
                .find(|(target_room, target)| checker.is_free(*target_room, *target))
            else {
                continue;
            };

            self.relocate(room, target_room, target, world, &mut events);
        }
        events.iter().map(Event::room).collect()
    }

    fn relocate(
        &mut self,
        from: RoomId,
        to: RoomId,
        position: Vector2,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) {
        let Some(mut apple) = self.apples.remove(&from) else {
            return;
        };
        set_overlay(world, from, None, out_events);
        apple.room_id = to;
        apple.position = position;
        set_overlay(world, to, Some(position), out_events);
        let _ = self.apples.insert(to, apple);
    }

    /// Resolves the snake reaching the apple tile of `room`.
    ///
    /// A room without an apple yields the default reward. A protected approach
    /// reports `fatal` and leaves the apple in place; otherwise the apple is
    /// removed and its rewards returned.
    pub fn handle_consumption(
        &mut self,
        room: RoomId,
        approach: Direction,
        world: &mut World,
    ) -> Consumption {
        let Some(apple) = self.apples.get(&room) else {
            return Consumption {
                fatal: false,
                rewards: AppleRewards::DEFAULT,
                world_position: None,
                apple: None,
            };
        };

        if apple.behavior.is_fatal_approach(approach) {
            return Consumption {
                fatal: true,
                rewards: AppleRewards::NONE,
                world_position: None,
                apple: Some(apple.snapshot()),
            };
        }

        let rewards = apple.behavior.on_consume();
        let world_position = self.grid.pixel_center(room, apple.position);
        let snapshot = apple.snapshot();
        let _ = self.apples.remove(&room);
        set_overlay(world, room, None, &mut Vec::new());
        Consumption {
            fatal: false,
            rewards,
            world_position: Some(world_position),
            apple: Some(snapshot),
        }
    }

    /// Removes the apple in `room`, returning it.
    pub fn clear_apple(&mut self, room: RoomId, world: &mut World) -> Option<AppleSnapshot> {
        let apple = self.apples.remove(&room)?;
        set_overlay(world, room, None, &mut Vec::new());
        Some(apple.snapshot())
    }

    /// Removes every apple. The world overlays are expected to be cleared with it.
    pub fn clear_all(&mut self) {
        self.apples.clear();
    }
}

fn set_overlay(
    world: &mut World,
    room: RoomId,
    position: Option<Vector2>,
    out_events: &mut Vec<Event>,
) {
    apply(world, Command::SetApple { room, position }, out_events);
}

struct MoveCheck<'a> {
    grid: &'a GridConfig,
    apples: &'a BTreeMap<RoomId, AppleInstance>,
    world: &'a World,
    snake_body: &'a [Vector2],
    snake_room: RoomId,
    from: RoomId,
}

impl MoveCheck<'_> {
    fn step(&self, origin: Vector2, direction: Direction) -> (RoomId, Vector2) {
        let global = self.grid.to_global(self.from, origin).step(direction);
        (
            self.grid.room_of(global, self.from.z),
            self.grid.to_local(global),
        )
    }

    fn is_free(&self, room: RoomId, local: Vector2) -> bool {
        let Some(snapshot) = query::room(self.world, room) else {
            return false;
        };
        if snapshot.tile(local) != Some(Tile::Floor) || snapshot.treasure == Some(local) {
            return false;
        }
        if room != self.from && self.apples.contains_key(&room) {
            return false;
        }
        if room.z == self.snake_room.z {
            let global = self.grid.to_global(room, local);
            if self.snake_body.contains(&global) {
                return false;
            }
        }
        true
    }
}
