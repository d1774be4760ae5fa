//! Per-tick results handed to renderers and drivers.

use std::collections::BTreeSet;

use serde::Serialize;
use snake_rooms_core::{AppleRewards, AppleSnapshot, PixelPosition, RoomId};
use snake_rooms_system_quests::Quest;
use snake_rooms_system_skill_tree::ReviveSource;
use snake_rooms_system_snake::DeathReason;

/// Whether the snake survived the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The snake is alive.
    Alive,
    /// The snake died and no revive was available.
    Dead,
}

/// Apple-related part of a tick result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppleOutcome {
    /// An apple was eaten this tick.
    pub eaten: bool,
    /// Rewards of the eaten apple.
    pub rewards: Option<AppleRewards>,
    /// Pixel centre of the eaten apple.
    pub world_position: Option<PixelPosition>,
    /// Apple of the room the snake occupies after the tick.
    pub current: Option<AppleSnapshot>,
    /// The visible apple differs from the one before the tick.
    pub state_changed: bool,
}

/// Immutable description of one tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepResult {
    /// Tick number, starting at one after a reset.
    pub tick: u64,
    /// Survival status.
    pub status: StepStatus,
    /// Cause of death, also set when a revive saved the snake.
    pub death_reason: Option<DeathReason>,
    /// Resource spent to survive a fatal tick.
    pub revived: Option<ReviveSource>,
    /// Apple outcome.
    pub apple: AppleOutcome,
    /// Rooms whose rendering must be refreshed.
    pub rooms_changed: BTreeSet<RoomId>,
    /// The snake moved into another room.
    pub room_changed: bool,
    /// Quest offered this tick.
    pub quest_offer: Option<Quest>,
    /// Quests completed this tick.
    pub quests_completed: Vec<Quest>,
    /// Score after the tick.
    pub score: u64,
    /// Snake length after the tick.
    pub length: usize,
}

impl StepResult {
    /// Reports whether the snake is alive after the tick.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == StepStatus::Alive
    }
}
