#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake-rooms simulation.
//!
//! This crate defines the value types that connect the authoritative world,
//! the pure gameplay systems, and the adapters that render or drive the game.
//! Rooms are addressed by [`RoomId`] and described by [`RoomSnapshot`] values,
//! snake and entity positions are global [`Vector2`] grid coordinates, and all
//! randomness flows through a single [`SeededRng`] so that a run is a pure
//! function of its seed and its input directions.

use std::{fmt, ops::Add, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
mod rng;

pub use config::{ConfigError, GameConfig, GridConfig};
pub use rng::SeededRng;

/// Integer grid coordinate. Used both for global positions and room-local tiles.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Vector2 {
    /// Column component.
    pub x: i32,
    /// Row component.
    pub y: i32,
}

impl Vector2 {
    /// The origin coordinate.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Chebyshev (king-move) distance between two coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Returns the neighbouring coordinate one step in `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        self + direction.vector()
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Cardinal movement directions. Rows grow downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every cardinal direction in canonical order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector for the direction.
    #[must_use]
    pub const fn vector(self) -> Vector2 {
        match self {
            Self::Up => Vector2::new(0, -1),
            Self::Down => Vector2::new(0, 1),
            Self::Left => Vector2::new(-1, 0),
            Self::Right => Vector2::new(1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Converts a unit vector back into a direction.
    #[must_use]
    pub fn from_vector(vector: Vector2) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.vector() == vector)
    }
}

/// Identifier of a room in the infinite, ladder-connected room lattice.
///
/// Rooms tile infinitely along `x` and `y`; `z` selects the vertical floor.
/// The canonical textual form is `"x,y,z"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RoomId {
    /// Horizontal room index.
    pub x: i32,
    /// Vertical room index within a floor.
    pub y: i32,
    /// Floor index.
    pub z: i32,
}

impl RoomId {
    /// Room in which every run begins.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Creates a new room identifier.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Room adjacent on the same floor, offset by whole rooms.
    #[must_use]
    pub const fn neighbor(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z)
    }

    /// Room at the same lattice position on another floor.
    #[must_use]
    pub const fn with_z(self, z: i32) -> Self {
        Self::new(self.x, self.y, z)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Error produced when a room identifier string is malformed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid room id `{0}`, expected `x,y,z`")]
pub struct ParseRoomIdError(String);

impl FromStr for RoomId {
    type Err = ParseRoomIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseRoomIdError(value.to_owned());
        let mut parts = value.split(',').map(|part| part.trim().parse::<i32>());
        let x = parts.next().and_then(Result::ok).ok_or_else(invalid)?;
        let y = parts.next().and_then(Result::ok).ok_or_else(invalid)?;
        let z = parts.next().and_then(Result::ok).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(x, y, z))
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RoomId {
    type Error = ParseRoomIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Single cell of a room layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tile {
    /// Walkable floor, rendered as `.`.
    Floor,
    /// Solid wall, rendered as `#`.
    Wall,
    /// Ladder leading to another floor, rendered as `H`.
    Ladder,
}

impl Tile {
    /// Character used by the textual layout representation.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Ladder => 'H',
        }
    }

    /// Parses a layout character.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Self::Floor),
            '#' => Some(Self::Wall),
            'H' => Some(Self::Ladder),
            _ => None,
        }
    }
}

/// One-way teleport embedded in a room tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    /// Room-local tile carrying the portal.
    pub position: Vector2,
    /// Room the portal leads to.
    pub destination: RoomId,
    /// Room-local tile the portal lands on.
    pub destination_position: Vector2,
}

/// Colour expressed as hue, saturation and lightness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HslColor {
    /// Hue in degrees, `0..360`.
    pub hue: u16,
    /// Saturation percentage.
    pub saturation: u8,
    /// Lightness percentage.
    pub lightness: u8,
}

impl HslColor {
    /// Creates a new colour.
    #[must_use]
    pub const fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Cached description of a single room.
///
/// Owned by the world; gameplay systems mutate the overlays and tiles in place.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoomSnapshot {
    /// Identifier of the room.
    pub id: RoomId,
    /// Tile rows, top to bottom.
    pub layout: Vec<Vec<Tile>>,
    /// Portals embedded in the layout.
    pub portals: Vec<Portal>,
    /// Room-local tile holding the room's apple, if any.
    pub apple: Option<Vector2>,
    /// Room-local tile holding the room's treasure, if any.
    pub treasure: Option<Vector2>,
    /// Floor colour.
    pub background_color: HslColor,
    /// Wall fill colour.
    pub wall_color: HslColor,
    /// Wall outline colour.
    pub wall_outline_color: HslColor,
}

impl RoomSnapshot {
    /// Number of tile columns in the layout.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.layout.first().map_or(0, Vec::len)
    }

    /// Number of tile rows in the layout.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.layout.len()
    }

    /// Returns the tile at the provided room-local coordinate.
    #[must_use]
    pub fn tile(&self, local: Vector2) -> Option<Tile> {
        let (column, row) = layout_index(local)?;
        self.layout.get(row)?.get(column).copied()
    }

    /// Reports whether the coordinate lies inside the layout.
    #[must_use]
    pub fn contains(&self, local: Vector2) -> bool {
        self.tile(local).is_some()
    }

    /// Overwrites a tile, returning `true` when the layout changed.
    pub fn set_tile(&mut self, local: Vector2, tile: Tile) -> bool {
        let Some((column, row)) = layout_index(local) else {
            return false;
        };
        match self.layout.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            Some(cell) if *cell != tile => {
                *cell = tile;
                true
            }
            _ => false,
        }
    }

    /// Returns the portal embedded at the provided tile, if any.
    #[must_use]
    pub fn portal_at(&self, local: Vector2) -> Option<&Portal> {
        self.portals.iter().find(|portal| portal.position == local)
    }

    /// Iterates the coordinates of every tile of the requested kind, row-major.
    pub fn cells_of(&self, kind: Tile) -> impl Iterator<Item = Vector2> + '_ {
        self.layout.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(move |(_, tile)| **tile == kind)
                .map(move |(column, _)| Vector2::new(column as i32, row as i32))
        })
    }

    /// Renders the layout as rows of tile symbols.
    #[must_use]
    pub fn layout_rows(&self) -> Vec<String> {
        self.layout
            .iter()
            .map(|cells| cells.iter().map(|tile| tile.symbol()).collect())
            .collect()
    }
}

fn layout_index(local: Vector2) -> Option<(usize, usize)> {
    let column = usize::try_from(local.x).ok()?;
    let row = usize::try_from(local.y).ok()?;
    Some((column, row))
}

/// Closed set of apple behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppleKind {
    /// Plain apple with the default reward.
    Normal,
    /// Apple that is fatal when approached from a protected direction.
    Shielded,
    /// Static apple with a large reward.
    Gold,
    /// Apple that tries to flee from the snake head.
    Skittish,
}

impl AppleKind {
    /// Resolves a configured behaviour identifier.
    #[must_use]
    pub fn from_behavior_id(id: &str) -> Option<Self> {
        match id {
            "normal" => Some(Self::Normal),
            "shielded" => Some(Self::Shielded),
            "gold" => Some(Self::Gold),
            "skittish" => Some(Self::Skittish),
            _ => None,
        }
    }

    /// Behaviour identifier used by configuration files.
    #[must_use]
    pub const fn behavior_id(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Shielded => "shielded",
            Self::Gold => "gold",
            Self::Skittish => "skittish",
        }
    }
}

/// Growth and bonus score granted by consuming an apple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleRewards {
    /// Segments the snake grows by, including the retained tail.
    pub growth: u32,
    /// Bonus score on top of the base point.
    pub bonus: u32,
}

impl AppleRewards {
    /// Reward of a plain apple.
    pub const DEFAULT: Self = Self {
        growth: 1,
        bonus: 0,
    };

    /// No reward at all.
    pub const NONE: Self = Self {
        growth: 0,
        bonus: 0,
    };
}

/// Read-only view of an apple instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppleSnapshot {
    /// Room holding the apple.
    pub room_id: RoomId,
    /// Room-local tile of the apple.
    pub position: Vector2,
    /// Configured apple type identifier.
    pub type_id: String,
    /// Behaviour of the apple.
    pub kind: AppleKind,
    /// Display colour.
    pub color: String,
    /// Travel directions from which consuming the apple is fatal.
    pub protected_directions: Vec<Direction>,
}

/// Position in world pixels, used for feedback effects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelPosition {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
}

/// Terra shield charges that let the snake eat through a wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraShield {
    /// Charges ready to be spent.
    pub charges: u32,
    /// Maximum number of banked charges.
    pub max_charges: u32,
    /// Ticks required to regenerate one charge.
    pub recharge_ticks: u32,
    /// Ticks accumulated toward the next charge.
    pub progress: u32,
}

impl TerraShield {
    /// Advances recharge by one tick, returning `true` when a charge was gained.
    pub fn recharge(&mut self) -> bool {
        if self.charges >= self.max_charges {
            self.progress = 0;
            return false;
        }
        self.progress += 1;
        if self.progress < self.recharge_ticks.max(1) {
            return false;
        }
        self.progress = 0;
        self.charges += 1;
        true
    }

    /// Spends a charge if one is available.
    pub fn try_spend(&mut self) -> bool {
        if self.charges == 0 {
            return false;
        }
        self.charges -= 1;
        true
    }
}

/// Perk-granted settings that change how the orchestrator mutates geometry.
///
/// Every field's reset value is its [`Default`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometrySettings {
    /// Radius within which walls are highlighted for the player.
    pub wall_sense_radius: Option<u32>,
    /// Turns the most recently vacated tail cell into a wall.
    pub masonry_enabled: bool,
    /// Chebyshev radius of walls cleared around the head on every meal.
    pub seismic_pulse_radius: Option<u32>,
    /// Clears every wall in the head's row every tick.
    pub fault_line_enabled: bool,
    /// Raises walls beside the head on every meal.
    pub collapse_control_enabled: bool,
    /// Charges that let the snake eat through walls.
    pub terra_shield: Option<TerraShield>,
    /// Score awarded whenever a wall is eaten.
    pub world_eater_reward: Option<u64>,
    /// Latched when a wall was eaten this tick.
    pub wall_eaten: bool,
}

/// Mutations that systems request from the authoritative world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rewrites a single tile of a cached room.
    SetTile {
        /// Room holding the tile.
        room: RoomId,
        /// Room-local tile coordinate.
        local: Vector2,
        /// Tile written at the coordinate.
        tile: Tile,
    },
    /// Moves or removes the apple overlay of a cached room.
    SetApple {
        /// Room whose overlay changes.
        room: RoomId,
        /// New apple tile, `None` to remove it.
        position: Option<Vector2>,
    },
    /// Moves or removes the treasure overlay of a cached room.
    SetTreasure {
        /// Room whose overlay changes.
        room: RoomId,
        /// New treasure tile, `None` to remove it.
        position: Option<Vector2>,
    },
}

/// Changes the world reports after applying a [`Command`].
///
/// Commands that leave the world unchanged, or target a room that was never
/// generated, emit nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A tile was rewritten.
    TileChanged {
        /// Room holding the tile.
        room: RoomId,
        /// Room-local tile coordinate.
        local: Vector2,
        /// Tile now stored at the coordinate.
        tile: Tile,
    },
    /// The apple overlay of a room changed.
    AppleChanged {
        /// Room whose overlay changed.
        room: RoomId,
        /// Apple tile after the change.
        position: Option<Vector2>,
    },
    /// The treasure overlay of a room changed.
    TreasureChanged {
        /// Room whose overlay changed.
        room: RoomId,
        /// Treasure tile after the change.
        position: Option<Vector2>,
    },
}

impl Event {
    /// Room affected by the change.
    #[must_use]
    pub fn room(&self) -> RoomId {
        match self {
            Self::TileChanged { room, .. }
            | Self::AppleChanged { room, .. }
            | Self::TreasureChanged { room, .. } => *room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Vector2::new(1, 1);
        let destination = Vector2::new(4, -1);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(origin.chebyshev_distance(destination), 3);
    }

    #[test]
    fn room_id_parses_canonical_form() {
        let id: RoomId = "3,-2,1".parse().expect("valid room id");
        assert_eq!(id, RoomId::new(3, -2, 1));
        assert_eq!(id.to_string(), "3,-2,1");
        assert!("1,2".parse::<RoomId>().is_err());
        assert!("1,2,3,4".parse::<RoomId>().is_err());
        assert!("a,b,c".parse::<RoomId>().is_err());
    }

    #[test]
    fn direction_opposites_cancel() {
        for direction in Direction::ALL {
            let sum = direction.vector() + direction.opposite().vector();
            assert_eq!(sum, Vector2::ZERO);
            assert_eq!(Direction::from_vector(direction.vector()), Some(direction));
        }
    }

    #[test]
    fn set_tile_reports_changes_and_bounds() {
        let mut room = RoomSnapshot {
            id: RoomId::ORIGIN,
            layout: vec![vec![Tile::Floor; 3]; 2],
            portals: Vec::new(),
            apple: None,
            treasure: None,
            background_color: HslColor::new(0, 0, 0),
            wall_color: HslColor::new(0, 0, 0),
            wall_outline_color: HslColor::new(0, 0, 0),
        };
        assert!(room.set_tile(Vector2::new(2, 1), Tile::Wall));
        assert!(!room.set_tile(Vector2::new(2, 1), Tile::Wall));
        assert!(!room.set_tile(Vector2::new(3, 0), Tile::Wall));
        assert!(!room.set_tile(Vector2::new(-1, 0), Tile::Wall));
        assert_eq!(room.layout_rows(), vec!["...".to_owned(), "..#".to_owned()]);
        assert_eq!(room.cells_of(Tile::Wall).collect::<Vec<_>>(), vec![Vector2::new(2, 1)]);
    }

    #[test]
    fn terra_shield_recharges_up_to_maximum() {
        let mut shield = TerraShield {
            charges: 0,
            max_charges: 1,
            recharge_ticks: 2,
            progress: 0,
        };
        assert!(!shield.recharge());
        assert!(shield.recharge());
        assert!(!shield.recharge());
        assert_eq!(shield.charges, 1);
        assert!(shield.try_spend());
        assert!(!shield.try_spend());
    }
}
