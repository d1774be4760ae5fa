use std::collections::BTreeSet;

use snake_rooms_core::{
    config::{TreasureConfig, WorldConfig},
    GridConfig, HslColor, Portal, RoomId, RoomSnapshot, SeededRng, Tile, Vector2,
};

/// Hue bands a room background may be drawn from.
const HUE_RANGES: [(i32, i32); 6] = [
    (195, 225),
    (255, 285),
    (140, 170),
    (20, 40),
    (320, 345),
    (45, 60),
];

/// Inputs shared by every room generated for one world.
pub(crate) struct Blueprint<'a> {
    pub(crate) grid: &'a GridConfig,
    pub(crate) world: &'a WorldConfig,
    pub(crate) treasure: &'a TreasureConfig,
    pub(crate) guard: &'a BTreeSet<Vector2>,
}

impl Blueprint<'_> {
    /// Generates the layout, portals, palette and treasure of a fresh room.
    pub(crate) fn generate(&self, id: RoomId, rng: &mut SeededRng) -> RoomSnapshot {
        let guard = if id == RoomId::ORIGIN {
            Some(self.guard)
        } else {
            None
        };
        let is_guarded = |cell: Vector2| guard.is_some_and(|cells| cells.contains(&cell));

        let columns = usize::try_from(self.grid.columns).unwrap_or(0);
        let rows = usize::try_from(self.grid.rows).unwrap_or(0);
        let mut room = RoomSnapshot {
            id,
            layout: vec![vec![Tile::Floor; columns]; rows],
            portals: Vec::new(),
            apple: None,
            treasure: None,
            background_color: HslColor::new(0, 0, 0),
            wall_color: HslColor::new(0, 0, 0),
            wall_outline_color: HslColor::new(0, 0, 0),
        };

        let obstacles = self.place_obstacles(&mut room, &is_guarded, rng);
        self.place_ladder(&mut room, &is_guarded, rng);

        if let Some(cells) = guard {
            for cell in cells {
                let _ = room.set_tile(*cell, Tile::Floor);
            }
        }

        let (background, wall, outline) = pick_palette(rng);
        room.background_color = background;
        room.wall_color = wall;
        room.wall_outline_color = outline;

        if rng.chance(self.treasure.chance) {
            room.treasure = self.place_treasure(&room, &is_guarded, rng);
        }

        tracing::debug!(
            room = %id,
            obstacles,
            ladder = !room.portals.is_empty(),
            treasure = room.treasure.is_some(),
            "room_generated"
        );
        room
    }

    fn place_obstacles(
        &self,
        room: &mut RoomSnapshot,
        is_guarded: &impl Fn(Vector2) -> bool,
        rng: &mut SeededRng,
    ) -> u32 {
        let columns = i32::try_from(self.grid.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.grid.rows).unwrap_or(i32::MAX);
        let margin = self.world.margin;
        let count = rng.int_between(self.world.obstacle_count.min, self.world.obstacle_count.max);

        let mut placed = 0;
        for _ in 0..count {
            let width = rng.int_between(self.world.obstacle_width.min, self.world.obstacle_width.max);
            let height =
                rng.int_between(self.world.obstacle_height.min, self.world.obstacle_height.max);
            let max_x = columns - margin - width;
            let max_y = rows - margin - height;
            if width <= 0 || height <= 0 || max_x < margin || max_y < margin {
                continue;
            }

            let origin_x = rng.int_between(margin, max_x);
            let origin_y = rng.int_between(margin, max_y);
            for y in origin_y..origin_y + height {
                for x in origin_x..origin_x + width {
                    let cell = Vector2::new(x, y);
                    if is_guarded(cell) {
                        continue;
                    }
                    let _ = room.set_tile(cell, Tile::Wall);
                }
            }
            placed += 1;
        }
        placed
    }

    fn place_ladder(
        &self,
        room: &mut RoomSnapshot,
        is_guarded: &impl Fn(Vector2) -> bool,
        rng: &mut SeededRng,
    ) {
        if !rng.chance(self.world.ladder_chance) {
            return;
        }

        let candidates: Vec<Vector2> = room
            .cells_of(Tile::Floor)
            .filter(|cell| !is_guarded(*cell))
            .collect();
        let Some(cell) = rng.pick(&candidates).copied() else {
            return;
        };

        let offset = self.world.ladder_offset.max(1);
        let sign = if rng.chance(0.5) { 1 } else { -1 };
        let _ = room.set_tile(cell, Tile::Ladder);
        room.portals.push(Portal {
            position: cell,
            destination: room.id.with_z(room.id.z + sign * offset),
            destination_position: cell,
        });
    }

    fn place_treasure(
        &self,
        room: &RoomSnapshot,
        is_guarded: &impl Fn(Vector2) -> bool,
        rng: &mut SeededRng,
    ) -> Option<Vector2> {
        let columns = i32::try_from(self.grid.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.grid.rows).unwrap_or(i32::MAX);
        let usable = |cell: Vector2| room.tile(cell) == Some(Tile::Floor) && !is_guarded(cell);

        for _ in 0..self.treasure.attempts {
            let cell = Vector2::new(rng.int_between(0, columns - 1), rng.int_between(0, rows - 1));
            if usable(cell) {
                return Some(cell);
            }
        }

        let fallback: Vec<Vector2> = room.cells_of(Tile::Floor).filter(|cell| usable(*cell)).collect();
        rng.pick(&fallback).copied()
    }
}

fn pick_palette(rng: &mut SeededRng) -> (HslColor, HslColor, HslColor) {
    let (low, high) = rng.pick(&HUE_RANGES).copied().unwrap_or(HUE_RANGES[0]);
    let hue = u16::try_from(rng.int_between(low, high).rem_euclid(360)).unwrap_or(0);
    (
        HslColor::new(hue, 32, 12),
        HslColor::new(hue, 42, 36),
        HslColor::new((hue + 12) % 360, 55, 58),
    )
}
