#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Multi-segment bosses that patrol rooms and tug at the snake.
//!
//! Boss bodies live in global grid coordinates like the snake. Bosses only read
//! the world through [`query`], so a boss never causes a room to be generated:
//! stepping toward a room nobody has visited turns it around.

use serde::Serialize;
use snake_rooms_core::{
    config::BossConfig, Direction, GameConfig, GridConfig, RoomId, SeededRng, Tile, Vector2,
};
use snake_rooms_world::{query, World};

/// Offsets of the spawn cluster around the room centre, lead segment first.
const CLUSTER: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const INITIAL_HEALTH: u32 = 100;

/// Unique identifier assigned to bosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BossId(u32);

impl BossId {
    /// Creates a new boss identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Boss archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BossKind {
    /// Slow ring-shaped guardian that pulls nearby snakes toward it.
    Warden,
}

impl BossKind {
    /// Display name of the archetype.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Warden => "Warden",
        }
    }
}

/// Pull a boss exerts on a nearby snake head.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BossPull {
    /// Manhattan distance within which the pull applies.
    pub radius: u32,
    /// Probability that the pull applies on a given tick.
    pub strength: f64,
}

/// A live boss.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Boss {
    /// Identifier of the boss.
    pub id: BossId,
    /// Archetype of the boss.
    pub kind: BossKind,
    /// Display name.
    pub name: String,
    /// Segments in global coordinates, lead segment first.
    pub body: Vec<Vector2>,
    /// Remaining health.
    pub health: u32,
    /// Health at spawn.
    pub max_health: u32,
    /// Room holding the lead segment.
    pub room_id: RoomId,
    /// Current travel direction.
    pub direction: Direction,
    /// Optional pull on the snake head.
    pub pull: Option<BossPull>,
}

impl Boss {
    /// Lead segment of the boss.
    #[must_use]
    pub fn lead(&self) -> Option<Vector2> {
        self.body.first().copied()
    }

    fn occupies(&self, grid: &GridConfig, room: RoomId) -> bool {
        room.z == self.room_id.z
            && self.body.iter().any(|segment| {
                let owner = grid.room_of(*segment, room.z);
                owner.x == room.x && owner.y == room.y
            })
    }
}

/// Owner of every live boss.
#[derive(Debug)]
pub struct Bosses {
    grid: GridConfig,
    config: BossConfig,
    next_id: u32,
    bosses: Vec<Boss>,
}

impl Bosses {
    /// Creates an empty boss roster.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid: config.grid,
            config: config.bosses,
            next_id: 0,
            bosses: Vec::new(),
        }
    }

    /// Every live boss in spawn order.
    #[must_use]
    pub fn all(&self) -> &[Boss] {
        &self.bosses
    }

    /// Bosses with at least one segment inside `room`.
    pub fn in_room(&self, room: RoomId) -> impl Iterator<Item = &Boss> + '_ {
        self.bosses
            .iter()
            .filter(move |boss| boss.occupies(&self.grid, room))
    }

    /// Removes every boss.
    pub fn clear(&mut self) {
        self.bosses.clear();
    }

    /// Rolls the configured spawn chance and spawns a boss in `room` on success.
    pub fn maybe_spawn(&mut self, room: RoomId, rng: &mut SeededRng) -> Option<BossId> {
        if !rng.chance(self.config.spawn_chance) {
            return None;
        }
        Some(self.spawn_boss(room, BossKind::Warden))
    }

    /// Spawns a boss as a ring of segments around the centre of `room`.
    pub fn spawn_boss(&mut self, room: RoomId, kind: BossKind) -> BossId {
        let id = BossId::new(self.next_id);
        self.next_id += 1;

        let half = Vector2::new(
            i32::try_from(self.grid.columns / 2).unwrap_or(0),
            i32::try_from(self.grid.rows / 2).unwrap_or(0),
        );
        let center = self.grid.to_global(room, half);
        let body = CLUSTER
            .iter()
            .map(|(dx, dy)| center + Vector2::new(*dx, *dy))
            .collect();
        let pull = match kind {
            BossKind::Warden => Some(BossPull {
                radius: self.config.pull_radius,
                strength: self.config.pull_strength,
            }),
        };

        self.bosses.push(Boss {
            id,
            kind,
            name: kind.name().to_owned(),
            body,
            health: INITIAL_HEALTH,
            max_health: INITIAL_HEALTH,
            room_id: room,
            direction: Direction::Right,
            pull,
        });
        tracing::debug!(boss = id.get(), room = %room, kind = kind.name(), "boss_spawned");
        id
    }

    /// Advances every boss by one tick.
    ///
    /// A boss may turn to any direction except its reverse, then advances its
    /// lead segment. If the target room has not been generated or the target
    /// tile is a wall, the boss reverses instead of moving.
    pub fn step(&mut self, world: &World, rng: &mut SeededRng) {
        for boss in &mut self.bosses {
            if rng.chance(self.config.turn_chance) {
                let reverse = boss.direction.opposite();
                let options: Vec<Direction> = Direction::ALL
                    .into_iter()
                    .filter(|direction| *direction != reverse)
                    .collect();
                if let Some(direction) = rng.pick(&options) {
                    boss.direction = *direction;
                }
            }

            let Some(lead) = boss.lead() else {
                continue;
            };
            let target = lead.step(boss.direction);
            let target_room = self.grid.room_of(target, boss.room_id.z);
            match query::tile(world, target_room, self.grid.to_local(target)) {
                Some(Tile::Floor | Tile::Ladder) => {
                    boss.body.insert(0, target);
                    let _ = boss.body.pop();
                    boss.room_id = target_room;
                }
                Some(Tile::Wall) | None => boss.direction = boss.direction.opposite(),
            }
        }
    }

    /// Direction the snake head is pulled toward this tick, if any.
    ///
    /// Only bosses sharing `room` pull. A boss pulls when the head lies within
    /// its radius of the lead segment and a roll succeeds; the pull follows the
    /// axis with the larger offset.
    pub fn pull_for(&self, head: Vector2, room: RoomId, rng: &mut SeededRng) -> Option<Direction> {
        for boss in self.in_room(room) {
            let (Some(pull), Some(lead)) = (boss.pull, boss.lead()) else {
                continue;
            };
            if head.manhattan_distance(lead) > pull.radius {
                continue;
            }
            if rng.next_f64() > pull.strength {
                continue;
            }
            if let Some(direction) = axis_toward(head, lead) {
                return Some(direction);
            }
        }
        None
    }
}

fn axis_toward(from: Vector2, to: Vector2) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let vector = if dx.abs() >= dy.abs() {
        Vector2::new(dx.signum(), 0)
    } else {
        Vector2::new(0, dy.signum())
    };
    Direction::from_vector(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_cluster_is_contiguous_ring() {
        let config = GameConfig::default();
        let mut bosses = Bosses::new(&config);
        let id = bosses.spawn_boss(RoomId::new(1, 0, 0), BossKind::Warden);
        let boss = &bosses.all()[0];
        assert_eq!(boss.id, id);
        assert_eq!(boss.body.len(), 8);
        assert_eq!(boss.health, boss.max_health);
        for pair in boss.body.windows(2) {
            assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
        }
        let center = Vector2::new(36, 12);
        assert!(!boss.body.contains(&center));
        assert!(boss.body.iter().all(|segment| segment.chebyshev_distance(center) == 1));
    }

    #[test]
    fn axis_toward_prefers_dominant_offset() {
        let head = Vector2::new(0, 0);
        assert_eq!(axis_toward(head, Vector2::new(3, 1)), Some(Direction::Right));
        assert_eq!(axis_toward(head, Vector2::new(-1, -4)), Some(Direction::Up));
        assert_eq!(axis_toward(head, head), None);
    }

    #[test]
    fn identifiers_increase() {
        let config = GameConfig::default();
        let mut bosses = Bosses::new(&config);
        let first = bosses.spawn_boss(RoomId::ORIGIN, BossKind::Warden);
        let second = bosses.spawn_boss(RoomId::ORIGIN, BossKind::Warden);
        assert!(first < second);
        bosses.clear();
        assert!(bosses.all().is_empty());
    }
}
