//! Perk-driven rewrites of room layouts.

use std::collections::BTreeSet;

use snake_rooms_core::{Command, Direction, Event, RoomId, Tile, Vector2};
use snake_rooms_world::{apply, query};

use crate::{Feature, Game};

/// Chebyshev radius of walls cleared by an arcane pulse.
pub const ARCANE_PULSE_RADIUS: u32 = 2;

impl Game {
    /// Casts the arcane pulse, clearing walls around the head.
    ///
    /// Returns the rooms that changed, or `None` when the pulse is locked or
    /// unaffordable.
    pub fn cast_arcane_pulse(&mut self) -> Option<BTreeSet<RoomId>> {
        if !self.features.is_enabled(Feature::SkillTree) || !self.skills.try_cast_arcane_pulse() {
            return None;
        }
        let mut changed = BTreeSet::new();
        let room = self.snake.room_id();
        self.clear_walls_around(room, self.snake.local_head(), ARCANE_PULSE_RADIUS, &mut changed);
        tracing::debug!(room = %room, cleared = !changed.is_empty(), "arcane_pulse_cast");
        Some(changed)
    }

    /// Hardens the vacated tail cell into a wall.
    pub(crate) fn apply_masonry(&mut self, changed: &mut BTreeSet<RoomId>) {
        if !self.snake.settings().masonry_enabled {
            return;
        }
        let Some((room, tail)) = self.snake.last_popped_tail() else {
            return;
        };
        if self.snake.body().contains(&tail) {
            return;
        }
        let local = self.config.grid.to_local(tail);
        self.raise_wall(room, local, changed);
    }

    /// Converts a latched wall meal into score.
    pub(crate) fn apply_wall_eaten(&mut self, changed: &mut BTreeSet<RoomId>) {
        let settings = self.snake.settings_mut();
        if !settings.wall_eaten {
            return;
        }
        settings.wall_eaten = false;
        let reward = settings.world_eater_reward;

        let _ = changed.insert(self.snake.room_id());
        if let Some(reward) = reward {
            let gain = self.skills.modify_score_gain(reward);
            self.snake.add_score(gain);
            tracing::debug!(gain, "wall_eaten");
        }
    }

    /// Clears every wall in the head's row.
    pub(crate) fn apply_fault_line(&mut self, changed: &mut BTreeSet<RoomId>) {
        if !self.snake.settings().fault_line_enabled {
            return;
        }
        let room = self.snake.room_id();
        let row = self.snake.local_head().y;
        let columns = i32::try_from(self.config.grid.columns).unwrap_or(0);
        for x in 0..columns {
            self.clear_wall(room, Vector2::new(x, row), changed);
        }
    }

    /// Clears walls in a square around the head after a meal.
    pub(crate) fn apply_seismic_pulse(&mut self, changed: &mut BTreeSet<RoomId>) {
        let Some(radius) = self.snake.settings().seismic_pulse_radius else {
            return;
        };
        let room = self.snake.room_id();
        self.clear_walls_around(room, self.snake.local_head(), radius, changed);
    }

    /// Raises walls on the free sides of the head after a meal.
    ///
    /// Every neighbour is considered, the cell ahead included. Cells outside
    /// the room, ladders and cells the snake occupies are left alone. An apple
    /// in the way is removed.
    pub(crate) fn apply_collapse_control(&mut self, changed: &mut BTreeSet<RoomId>) {
        if !self.snake.settings().collapse_control_enabled {
            return;
        }
        let grid = self.config.grid;
        let room = self.snake.room_id();
        let head = self.snake.local_head();

        for direction in Direction::ALL {
            let cell = head.step(direction);
            if !grid.contains_local(cell) {
                continue;
            }
            if self.snake.body().contains(&grid.to_global(room, cell)) {
                continue;
            }
            if query::tile(&self.world, room, cell) != Some(Tile::Floor) {
                continue;
            }
            self.raise_wall(room, cell, changed);
        }
    }

    /// Advances terra shield recharge by one tick.
    pub(crate) fn recharge_terra_shield(&mut self) {
        if let Some(shield) = self.snake.settings_mut().terra_shield.as_mut() {
            if shield.recharge() {
                tracing::debug!(charges = shield.charges, "terra_shield_recharged");
            }
        }
    }

    fn clear_walls_around(
        &mut self,
        room: RoomId,
        center: Vector2,
        radius: u32,
        changed: &mut BTreeSet<RoomId>,
    ) {
        let reach = i32::try_from(radius).unwrap_or(i32::MAX);
        for y in center.y.saturating_sub(reach)..=center.y.saturating_add(reach) {
            for x in center.x.saturating_sub(reach)..=center.x.saturating_add(reach) {
                self.clear_wall(room, Vector2::new(x, y), changed);
            }
        }
    }

    fn clear_wall(&mut self, room: RoomId, local: Vector2, changed: &mut BTreeSet<RoomId>) {
        if query::tile(&self.world, room, local) == Some(Tile::Wall) {
            let tile = Tile::Floor;
            self.submit(Command::SetTile { room, local, tile }, changed);
        }
    }

    /// Turns a cell into a wall, dropping any apple or treasure on it.
    fn raise_wall(&mut self, room: RoomId, local: Vector2, changed: &mut BTreeSet<RoomId>) {
        if self.apples.instance(room).is_some_and(|apple| apple.position == local) {
            let _ = self.apples.clear_apple(room, &mut self.world);
        }
        if query::has_treasure_at(&self.world, room, local) {
            self.submit(Command::SetTreasure { room, position: None }, changed);
        }
        let tile = Tile::Wall;
        self.submit(Command::SetTile { room, local, tile }, changed);
    }

    /// Applies a world command, recording the rooms it touched.
    pub(crate) fn submit(&mut self, command: Command, changed: &mut BTreeSet<RoomId>) {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events);
        changed.extend(events.iter().map(Event::room));
    }
}
