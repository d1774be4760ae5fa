#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Snake body, heading and per-tick movement state machine.
//!
//! The snake lives in global grid coordinates; rooms are derived from the head
//! position. Everything the step needs from the rest of the game (room layouts,
//! apple spawning, tile rewrites) is reached through [`SnakeEnvironment`], so
//! the state machine can be driven by the game or by a test stub.

use serde::Serialize;
use snake_rooms_core::{
    ConfigError, Direction, GameConfig, GeometrySettings, GridConfig, RoomId, RoomSnapshot, Tile,
    Vector2,
};

/// Services the snake consumes while stepping.
pub trait SnakeEnvironment {
    /// Returns the room, generating it if needed.
    fn room(&mut self, id: RoomId) -> &RoomSnapshot;

    /// Makes sure the room holds an apple, avoiding the provided body.
    fn ensure_apple(&mut self, id: RoomId, body: &[Vector2], score: u64);

    /// Makes the tile a ladder lands on walkable.
    fn clear_landing(&mut self, id: RoomId, local: Vector2);

    /// Rewrites a tile, returning `true` when it changed.
    fn set_tile(&mut self, id: RoomId, local: Vector2, tile: Tile) -> bool;
}

/// Cause of a snake death.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DeathReason {
    /// The head entered a wall tile.
    #[serde(rename = "wall")]
    Wall,
    /// The head entered the snake's own body.
    #[serde(rename = "self")]
    SelfCollision,
    /// The snake ate a shielded apple from a protected direction.
    #[serde(rename = "shielded-apple")]
    ShieldedApple,
}

/// Outcome of a single snake step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnakeStep {
    /// The snake survived and its body was committed.
    Moved {
        /// The head landed on the room's apple; the tail was retained.
        apple_eaten: bool,
        /// The snake now occupies a different room.
        room_changed: bool,
        /// The snake travelled through a ladder.
        climbed: bool,
    },
    /// The snake died; body, score and room are unchanged.
    Dead(DeathReason),
}

/// Mutable snake state.
///
/// The body is never empty: it is validated on construction and neither
/// growth nor tail retraction can remove the head.
#[derive(Clone, Debug)]
pub struct SnakeState {
    grid: GridConfig,
    initial_body: Vec<Vector2>,
    initial_direction: Direction,
    body: Vec<Vector2>,
    /// Floor of each body segment, parallel to `body`.
    floors: Vec<i32>,
    direction: Direction,
    next_direction: Direction,
    score: u64,
    room_id: RoomId,
    settings: GeometrySettings,
    teleport_enabled: bool,
    last_popped_tail: Option<(RoomId, Vector2)>,
}

impl SnakeState {
    /// Creates the snake at its configured spawn in the origin room.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the grid or initial body is unusable.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: config.grid,
            initial_body: config.snake.initial_body.clone(),
            initial_direction: config.snake.initial_direction,
            body: config.snake.initial_body.clone(),
            floors: vec![RoomId::ORIGIN.z; config.snake.initial_body.len()],
            direction: config.snake.initial_direction,
            next_direction: config.snake.initial_direction,
            score: 0,
            room_id: RoomId::ORIGIN,
            settings: GeometrySettings::default(),
            teleport_enabled: false,
            last_popped_tail: None,
        })
    }

    /// Returns the snake to its spawn with zero score and default settings.
    pub fn reset(&mut self) {
        self.body = self.initial_body.clone();
        self.floors = vec![RoomId::ORIGIN.z; self.body.len()];
        self.direction = self.initial_direction;
        self.next_direction = self.initial_direction;
        self.score = 0;
        self.room_id = RoomId::ORIGIN;
        self.settings = GeometrySettings::default();
        self.last_popped_tail = None;
    }

    /// Body segments, head first.
    #[must_use]
    pub fn body(&self) -> &[Vector2] {
        &self.body
    }

    /// Global position of the head.
    #[must_use]
    pub fn head(&self) -> Vector2 {
        self.body[0]
    }

    /// Number of body segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always `false`; present for API symmetry with [`SnakeState::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Direction committed on the last step.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Direction that will be committed on the next step.
    #[must_use]
    pub fn next_direction(&self) -> Direction {
        self.next_direction
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Overwrites the score.
    pub fn set_score(&mut self, score: u64) {
        self.score = score;
    }

    /// Adds to the score, saturating.
    pub fn add_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    /// Room holding the head.
    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Head position in room-local coordinates.
    #[must_use]
    pub fn local_head(&self) -> Vector2 {
        self.grid.to_local(self.head())
    }

    /// Perk-granted geometry settings.
    #[must_use]
    pub fn settings(&self) -> &GeometrySettings {
        &self.settings
    }

    /// Mutable access to the geometry settings.
    pub fn settings_mut(&mut self) -> &mut GeometrySettings {
        &mut self.settings
    }

    /// Reports whether wrap walls are enabled.
    #[must_use]
    pub fn teleport_enabled(&self) -> bool {
        self.teleport_enabled
    }

    /// Toggles wrap walls. Rooms tile infinitely, so this is cosmetic.
    pub fn set_teleport_enabled(&mut self, enabled: bool) {
        self.teleport_enabled = enabled;
    }

    /// Room and global cell vacated by the tail on the last step, if the tail
    /// moved. The room is on the floor the tail was on, not the head's.
    #[must_use]
    pub fn last_popped_tail(&self) -> Option<(RoomId, Vector2)> {
        self.last_popped_tail
    }

    /// Requests a heading for the next step.
    ///
    /// Reversing the committed direction is ignored and returns `false`.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if direction == self.direction.opposite() {
            return false;
        }
        self.next_direction = direction;
        true
    }

    /// Appends `segments` copies of the tail; they unfold as the snake moves.
    pub fn grow(&mut self, segments: u32) {
        let tail = self.body[self.body.len() - 1];
        let floor = self.floors[self.floors.len() - 1];
        for _ in 0..segments {
            self.body.push(tail);
            self.floors.push(floor);
        }
    }

    /// Drops the last segment unless it is the head.
    pub fn retract_tail(&mut self) -> Option<Vector2> {
        if self.body.len() <= 1 {
            return None;
        }
        let _ = self.floors.pop();
        self.body.pop()
    }

    /// Advances the snake one tile.
    ///
    /// Ladders teleport the snake to the same tile of another floor while the
    /// global head position is kept. Crossing a room edge moves the snake into
    /// the neighbouring room. Entering a room makes sure it holds an apple
    /// before collisions are checked. A wall is fatal unless a terra shield
    /// charge is available, in which case the wall is eaten. Death leaves the
    /// body untouched.
    pub fn step<E: SnakeEnvironment>(&mut self, env: &mut E) -> SnakeStep {
        self.direction = self.next_direction;
        let head = self.head().step(self.direction);
        let local = self.grid.to_local(head);

        let mut room = self.room_id;
        let mut climbed = false;
        if let Some(portal) = env.room(room).portal_at(local) {
            room = portal.destination;
            climbed = true;
        }
        let by_position = self.grid.room_of(head, room.z);
        if by_position != room {
            room = by_position;
        }

        let room_changed = room != self.room_id;
        if climbed {
            env.clear_landing(room, local);
        }
        if room_changed {
            env.ensure_apple(room, &self.body, self.score);
        }

        if env.room(room).tile(local) == Some(Tile::Wall) && !self.try_eat_wall(env, room, local) {
            tracing::debug!(room = %room, x = head.x, y = head.y, "snake_hit_wall");
            return SnakeStep::Dead(DeathReason::Wall);
        }
        if self.body.contains(&head) {
            tracing::debug!(room = %room, x = head.x, y = head.y, "snake_hit_self");
            return SnakeStep::Dead(DeathReason::SelfCollision);
        }

        self.room_id = room;
        self.body.insert(0, head);
        self.floors.insert(0, room.z);
        let apple_eaten = env.room(room).apple == Some(local);
        self.last_popped_tail = if apple_eaten {
            None
        } else {
            let tail = self.body.pop();
            let floor = self.floors.pop();
            tail.zip(floor)
                .map(|(tail, floor)| (self.grid.room_of(tail, floor), tail))
        };

        SnakeStep::Moved {
            apple_eaten,
            room_changed,
            climbed,
        }
    }

    fn try_eat_wall<E: SnakeEnvironment>(&mut self, env: &mut E, room: RoomId, local: Vector2) -> bool {
        let Some(shield) = self.settings.terra_shield.as_mut() else {
            return false;
        };
        if !shield.try_spend() {
            return false;
        }
        let _ = env.set_tile(room, local, Tile::Floor);
        self.settings.wall_eaten = true;
        true
    }
}
