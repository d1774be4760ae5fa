//! Capability adapters handed to the pure systems.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use snake_rooms_core::{
    AppleKind, Command, GeometrySettings, RoomId, RoomSnapshot, SeededRng, Tile, Vector2,
};
use snake_rooms_system_apples::AppleService;
use snake_rooms_system_quests::QuestRuntime;
use snake_rooms_system_skill_tree::{SkillRuntime, SkillTree};
use snake_rooms_system_snake::{SnakeEnvironment, SnakeState};
use snake_rooms_world::{apply, query, World};

/// Counters accumulated over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Ticks stepped since the last reset.
    pub ticks: u64,
    /// Apples eaten, per kind.
    pub apples_eaten: BTreeMap<AppleKind, u32>,
    /// Ladders travelled.
    pub ladders_climbed: u32,
    /// Rooms the snake has entered, the starting room included.
    pub rooms_visited: BTreeSet<RoomId>,
}

impl RunStats {
    /// Total apples eaten, optionally restricted to one kind.
    #[must_use]
    pub fn apples(&self, kind: Option<AppleKind>) -> u32 {
        match kind {
            Some(kind) => self.apples_eaten.get(&kind).copied().unwrap_or(0),
            None => self.apples_eaten.values().sum(),
        }
    }
}

pub(crate) struct GameEnvironment<'a> {
    pub(crate) world: &'a mut World,
    pub(crate) apples: &'a mut AppleService,
    pub(crate) rng: &'a mut SeededRng,
}

impl SnakeEnvironment for GameEnvironment<'_> {
    fn room(&mut self, id: RoomId) -> &RoomSnapshot {
        self.world.room(id, self.rng)
    }

    fn ensure_apple(&mut self, id: RoomId, body: &[Vector2], score: u64) {
        let _ = self
            .apples
            .ensure_apple(id, self.world, body, score, self.rng);
    }

    fn clear_landing(&mut self, id: RoomId, local: Vector2) {
        let _ = self.world.room(id, self.rng);
        if query::tile(self.world, id, local) != Some(Tile::Wall) {
            return;
        }
        if self.set_tile(id, local, Tile::Floor) {
            tracing::debug!(room = %id, x = local.x, y = local.y, "ladder_landing_cleared");
        }
    }

    fn set_tile(&mut self, id: RoomId, local: Vector2, tile: Tile) -> bool {
        let mut events = Vec::new();
        apply(
            self.world,
            Command::SetTile {
                room: id,
                local,
                tile,
            },
            &mut events,
        );
        !events.is_empty()
    }
}

pub(crate) struct SnakeSkills<'a> {
    pub(crate) snake: &'a mut SnakeState,
}

impl SkillRuntime for SnakeSkills<'_> {
    fn score(&self) -> u64 {
        self.snake.score()
    }

    fn set_score(&mut self, score: u64) {
        self.snake.set_score(score);
    }

    fn grow(&mut self, segments: u32) {
        self.snake.grow(segments);
    }

    fn settings_mut(&mut self) -> &mut GeometrySettings {
        self.snake.settings_mut()
    }
}

pub(crate) struct QuestProgress<'a> {
    pub(crate) snake: &'a mut SnakeState,
    pub(crate) skills: &'a mut SkillTree,
    pub(crate) stats: &'a RunStats,
}

impl QuestRuntime for QuestProgress<'_> {
    fn score(&self) -> u64 {
        self.snake.score()
    }

    fn snake_length(&self) -> usize {
        self.snake.len()
    }

    fn apples_eaten(&self, kind: Option<AppleKind>) -> u32 {
        self.stats.apples(kind)
    }

    fn rooms_visited(&self) -> usize {
        self.stats.rooms_visited.len()
    }

    fn ladders_climbed(&self) -> u32 {
        self.stats.ladders_climbed
    }

    fn add_score(&mut self, amount: u64) {
        self.snake.add_score(amount);
    }

    fn grant_extra_life(&mut self) {
        self.skills.add_extra_life();
    }
}
