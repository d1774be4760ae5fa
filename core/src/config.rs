//! Startup configuration for a snake-rooms run.
//!
//! Configuration is loaded once and never re-validated during play. Every
//! structure implements [`Default`] and deserializes with `#[serde(default)]`,
//! so adapters may supply partial documents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Direction, PixelPosition, RoomId, Vector2};

/// Fatal configuration problems detected while constructing the simulation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no columns or no rows.
    #[error("grid must have at least one column and one row")]
    EmptyGrid,
    /// The initial snake body is empty.
    #[error("initial snake body must contain at least one segment")]
    EmptyInitialBody,
    /// Two consecutive initial segments are not orthogonal neighbours.
    #[error("initial snake body is not contiguous at segment {index}")]
    NonContiguousBody {
        /// Index of the first segment that breaks contiguity.
        index: usize,
    },
    /// An initial segment lies outside the origin room.
    #[error("initial snake segment ({x}, {y}) lies outside the grid")]
    BodyOutOfBounds {
        /// Column of the offending segment.
        x: i32,
        /// Row of the offending segment.
        y: i32,
    },
    /// No apple types are configured.
    #[error("at least one apple type must be configured")]
    NoAppleTypes,
    /// An apple type names a behaviour that does not exist.
    #[error("apple type `{type_id}` uses unknown behavior `{behavior}`")]
    UnknownAppleBehavior {
        /// Identifier of the apple type.
        type_id: String,
        /// Unrecognised behaviour identifier.
        behavior: String,
    },
    /// A perk declares a different number of costs and effect lists.
    #[error("perk `{perk}` declares {costs} costs but {effects} effect ranks")]
    MismatchedRankData {
        /// Identifier of the perk.
        perk: String,
        /// Number of rank costs.
        costs: usize,
        /// Number of rank effect lists.
        effects: usize,
    },
    /// A perk has no ranks.
    #[error("perk `{0}` declares no ranks")]
    EmptyPerk(String),
    /// Two perks share an identifier.
    #[error("perk `{0}` is defined more than once")]
    DuplicatePerk(String),
    /// A perk requires a perk that does not exist.
    #[error("perk `{perk}` requires unknown perk `{requirement}`")]
    UnknownPrerequisite {
        /// Identifier of the perk.
        perk: String,
        /// Unknown prerequisite identifier.
        requirement: String,
    },
    /// An enabled feature identifier is not registered.
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
}

/// Dimensions of every room and the pixel size of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tile columns per room.
    pub columns: u32,
    /// Tile rows per room.
    pub rows: u32,
    /// Edge length of a tile in pixels.
    pub cell_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 24,
            rows: 24,
            cell_size: 24,
        }
    }
}

impl GridConfig {
    fn width(&self) -> i32 {
        i32::try_from(self.columns).unwrap_or(i32::MAX)
    }

    fn height(&self) -> i32 {
        i32::try_from(self.rows).unwrap_or(i32::MAX)
    }

    /// Room on floor `z` whose area contains the global coordinate.
    #[must_use]
    pub fn room_of(&self, global: Vector2, z: i32) -> RoomId {
        RoomId::new(
            global.x.div_euclid(self.width()),
            global.y.div_euclid(self.height()),
            z,
        )
    }

    /// Converts a global coordinate into room-local tile coordinates.
    #[must_use]
    pub fn to_local(&self, global: Vector2) -> Vector2 {
        Vector2::new(
            global.x.rem_euclid(self.width()),
            global.y.rem_euclid(self.height()),
        )
    }

    /// Global coordinate of the room's top-left tile.
    #[must_use]
    pub fn room_origin(&self, room: RoomId) -> Vector2 {
        Vector2::new(room.x * self.width(), room.y * self.height())
    }

    /// Converts a room-local tile back into a global coordinate.
    #[must_use]
    pub fn to_global(&self, room: RoomId, local: Vector2) -> Vector2 {
        self.room_origin(room) + local
    }

    /// Reports whether a room-local coordinate lies inside the grid.
    #[must_use]
    pub fn contains_local(&self, local: Vector2) -> bool {
        local.x >= 0 && local.y >= 0 && local.x < self.width() && local.y < self.height()
    }

    /// Pixel centre of a room-local tile in world space.
    #[must_use]
    pub fn pixel_center(&self, room: RoomId, local: Vector2) -> PixelPosition {
        let global = self.to_global(room, local);
        let size = self.cell_size as f32;
        PixelPosition {
            x: (global.x as f32 + 0.5) * size,
            y: (global.y as f32 + 0.5) * size,
        }
    }
}

/// Initial snake placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Initial body, head first, in origin-room coordinates.
    pub initial_body: Vec<Vector2>,
    /// Initial travel direction.
    pub initial_direction: Direction,
    /// Extra origin-room cells that must stay walkable.
    pub spawn_buffer: Vec<Vector2>,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            initial_body: vec![Vector2::new(5, 12), Vector2::new(4, 12), Vector2::new(3, 12)],
            initial_direction: Direction::Right,
            spawn_buffer: (6..=9).map(|x| Vector2::new(x, 12)).collect(),
        }
    }
}

/// Inclusive integer range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Smallest value.
    pub min: i32,
    /// Largest value.
    pub max: i32,
}

impl Span {
    /// Creates a new inclusive range.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Procedural room generation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of rectangular obstacles per room.
    pub obstacle_count: Span,
    /// Obstacle width in tiles.
    pub obstacle_width: Span,
    /// Obstacle height in tiles.
    pub obstacle_height: Span,
    /// Tiles kept free of obstacles along every room edge.
    pub margin: i32,
    /// Probability that a room receives a ladder.
    pub ladder_chance: f64,
    /// Floors a ladder travels up or down.
    pub ladder_offset: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            obstacle_count: Span::new(3, 7),
            obstacle_width: Span::new(2, 5),
            obstacle_height: Span::new(2, 5),
            margin: 1,
            ladder_chance: 0.35,
            ladder_offset: 1,
        }
    }
}

/// Treasure placement and reward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasureConfig {
    /// Probability that a freshly generated room holds a treasure.
    pub chance: f64,
    /// Random placement attempts before scanning every tile.
    pub attempts: u32,
    /// Score awarded when the snake collects a treasure.
    pub reward: u64,
}

impl Default for TreasureConfig {
    fn default() -> Self {
        Self {
            chance: 0.1,
            attempts: 50,
            reward: 10,
        }
    }
}

/// Weighted spawn rule of an apple type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnWeight {
    /// Relative selection weight.
    pub base: f64,
    /// Minimum score before the type may spawn.
    pub score_threshold: u64,
}

/// Configured apple type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppleTypeConfig {
    /// Unique type identifier.
    pub id: String,
    /// Behaviour identifier, one of `normal`, `shielded`, `gold`, `skittish`.
    pub behavior: String,
    /// Display colour.
    pub color: String,
    /// Spawn weighting.
    pub spawn: SpawnWeight,
    /// Per-tick probability that a moving apple attempts to move.
    #[serde(default)]
    pub move_chance: f64,
}

impl AppleTypeConfig {
    fn new(id: &str, color: &str, base: f64, score_threshold: u64, move_chance: f64) -> Self {
        Self {
            id: id.to_owned(),
            behavior: id.to_owned(),
            color: color.to_owned(),
            spawn: SpawnWeight {
                base,
                score_threshold,
            },
            move_chance,
        }
    }
}

/// Quest system tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    /// Quests assigned when a run starts.
    pub initial_count: usize,
    /// Maximum simultaneously active quests.
    pub max_active: usize,
    /// Per-tick probability of offering a new quest.
    pub offer_chance: f64,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            initial_count: 2,
            max_active: 3,
            offer_chance: 0.01,
        }
    }
}

/// Boss tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Probability that entering a new room, or resetting, spawns a boss.
    pub spawn_chance: f64,
    /// Per-tick probability that a boss picks a new direction.
    pub turn_chance: f64,
    /// Manhattan radius of the boss pull.
    pub pull_radius: u32,
    /// Probability that the pull applies on a given tick.
    pub pull_strength: f64,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            spawn_chance: 0.05,
            turn_chance: 0.2,
            pull_radius: 6,
            pull_strength: 0.25,
        }
    }
}

/// Tick cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Unscaled delay between ticks in milliseconds.
    pub base_delay_ms: u64,
    /// Lower bound of the scaled delay in milliseconds.
    pub min_delay_ms: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 120,
            min_delay_ms: 45,
        }
    }
}

/// Complete configuration surface of the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Room dimensions.
    pub grid: GridConfig,
    /// Initial snake placement.
    pub snake: SnakeConfig,
    /// Seed string; a random seed is drawn when absent.
    pub seed: Option<String>,
    /// Room generation.
    pub world: WorldConfig,
    /// Treasure placement.
    pub treasure: TreasureConfig,
    /// Apple types, in spawn-table order.
    pub apples: Vec<AppleTypeConfig>,
    /// Quest tunables.
    pub quests: QuestConfig,
    /// Boss tunables.
    pub bosses: BossConfig,
    /// Tick cadence.
    pub tick: TickConfig,
    /// Enabled optional gameplay features.
    pub features: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            snake: SnakeConfig::default(),
            seed: None,
            world: WorldConfig::default(),
            treasure: TreasureConfig::default(),
            apples: vec![
                AppleTypeConfig::new("normal", "#e5484d", 6.0, 0, 0.0),
                AppleTypeConfig::new("shielded", "#8e9aaf", 2.0, 10, 0.0),
                AppleTypeConfig::new("gold", "#f5c542", 1.0, 25, 0.0),
                AppleTypeConfig::new("skittish", "#46c37b", 3.0, 5, 0.35),
            ],
            quests: QuestConfig::default(),
            bosses: BossConfig::default(),
            tick: TickConfig::default(),
            features: vec!["bosses".to_owned(), "quests".to_owned(), "skill-tree".to_owned()],
        }
    }
}

impl GameConfig {
    /// Checks the grid and initial snake placement.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] describing an unusable grid or body.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let body = &self.snake.initial_body;
        if body.is_empty() {
            return Err(ConfigError::EmptyInitialBody);
        }
        if let Some(segment) = body.iter().find(|segment| !self.grid.contains_local(**segment)) {
            return Err(ConfigError::BodyOutOfBounds {
                x: segment.x,
                y: segment.y,
            });
        }
        if let Some(index) = body
            .windows(2)
            .position(|pair| pair[0].manhattan_distance(pair[1]) != 1)
        {
            return Err(ConfigError::NonContiguousBody { index: index + 1 });
        }
        Ok(())
    }
}
