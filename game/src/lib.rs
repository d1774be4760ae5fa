#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for snake-rooms.
//!
//! [`Game`] owns the world, every system and the single seeded random stream.
//! [`Game::step`] advances the simulation by one tick and reports what changed
//! as a [`StepResult`]; [`Game::reset`] starts a new run on the same stream.
//! A run is a pure function of its seed and the directions fed to it.

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use snake_rooms_core::{
    AppleKind, AppleSnapshot, Command, ConfigError, Direction, Event, GameConfig,
    GeometrySettings, RoomId, RoomSnapshot, SeededRng, Vector2,
};
use snake_rooms_system_apples::AppleService;
use snake_rooms_system_bosses::{Boss, Bosses};
use snake_rooms_system_quests::{Quest, QuestController, QuestRegistry};
use snake_rooms_system_skill_tree::{PurchaseReceipt, PurchaseState, SkillTree};
use snake_rooms_system_snake::{DeathReason, SnakeState, SnakeStep};
use snake_rooms_world::{apply, query, World};

mod features;
mod geometry;
mod result;
mod runtime;

pub use features::{Feature, FeatureRegistry, FeatureSet};
pub use geometry::ARCANE_PULSE_RADIUS;
pub use result::{AppleOutcome, StepResult, StepStatus};
pub use runtime::RunStats;

use runtime::{GameEnvironment, QuestProgress, SnakeSkills};

/// Authoritative simulation state for one player.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    rng: SeededRng,
    world: World,
    apples: AppleService,
    bosses: Bosses,
    snake: SnakeState,
    quests: QuestController,
    skills: SkillTree,
    features: FeatureSet,
    stats: RunStats,
}

impl Game {
    /// Builds a game with the built-in quest, perk and feature catalogs and
    /// starts the first run.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for any unusable configuration value.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_catalogs(
            config,
            Arc::new(QuestRegistry::with_defaults()),
            &FeatureRegistry::with_defaults(),
        )
    }

    /// Builds a game drawing quests from `quests` and resolving enabled
    /// features against `features`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for any unusable configuration value.
    pub fn with_catalogs(
        config: GameConfig,
        quests: Arc<QuestRegistry>,
        features: &FeatureRegistry,
    ) -> Result<Self, ConfigError> {
        let snake = SnakeState::new(&config)?;
        let apples = AppleService::new(&config)?;
        let skills = SkillTree::with_defaults(&config.tick)?;
        let features = FeatureSet::resolve(features, &config.features)?;

        let mut game = Self {
            rng: SeededRng::from_optional_seed(config.seed.as_deref()),
            world: World::new(&config),
            apples,
            bosses: Bosses::new(&config),
            snake,
            quests: QuestController::new(quests, config.quests),
            skills,
            features,
            stats: RunStats::default(),
            config,
        };
        game.reset();
        Ok(game)
    }

    /// Starts a new run.
    ///
    /// Every cached room is dropped, so revisited rooms get fresh layouts. The
    /// random stream continues rather than restarting.
    pub fn reset(&mut self) {
        self.world.clear();
        self.apples.clear_all();
        self.bosses.clear();
        self.skills.reset(&mut SnakeSkills {
            snake: &mut self.snake,
        });
        self.snake.reset();
        self.snake
            .set_teleport_enabled(self.features.is_enabled(Feature::WrapWalls));

        self.stats = RunStats::default();
        let _ = self.stats.rooms_visited.insert(RoomId::ORIGIN);
        let _ = self.apples.ensure_apple(
            RoomId::ORIGIN,
            &mut self.world,
            self.snake.body(),
            0,
            &mut self.rng,
        );

        if self.features.is_enabled(Feature::Quests) {
            self.quests.reset(&mut self.rng);
        }
        if self.features.is_enabled(Feature::Bosses) {
            let _ = self.bosses.maybe_spawn(RoomId::ORIGIN, &mut self.rng);
        }
        tracing::debug!(features = ?self.features.iter().collect::<Vec<_>>(), "run_started");
    }

    /// Advances the simulation by one tick.
    ///
    /// `paused` only suppresses new quest offers. A revived death leaves the
    /// body and the committed heading as they were, so a snake revived at a
    /// wall dies again next tick unless the driver turns it first.
    pub fn step(&mut self, paused: bool) -> StepResult {
        self.stats.ticks += 1;
        self.skills.tick();

        let mut rooms_changed = self.apples.move_apples(
            &mut self.world,
            self.snake.body(),
            self.snake.room_id(),
            &mut self.rng,
        );

        if self.features.is_enabled(Feature::Bosses) {
            self.bosses.step(&self.world, &mut self.rng);
            if let Some(direction) =
                self.bosses
                    .pull_for(self.snake.head(), self.snake.room_id(), &mut self.rng)
            {
                let _ = self.snake.set_direction(direction);
            }
        }

        let apple_before = self.apples.apple(self.snake.room_id());
        let outcome = self.snake.step(&mut GameEnvironment {
            world: &mut self.world,
            apples: &mut self.apples,
            rng: &mut self.rng,
        });

        let (apple_eaten, room_changed) = match outcome {
            SnakeStep::Dead(reason) => return self.resolve_death(reason, apple_before, rooms_changed),
            SnakeStep::Moved {
                apple_eaten,
                room_changed,
                climbed,
            } => {
                if climbed {
                    self.stats.ladders_climbed += 1;
                }
                (apple_eaten, room_changed)
            }
        };

        let room = self.snake.room_id();
        if room_changed {
            let _ = rooms_changed.insert(room);
            if self.stats.rooms_visited.insert(room) && self.features.is_enabled(Feature::Bosses) {
                let _ = self.bosses.maybe_spawn(room, &mut self.rng);
            }
        }

        self.apply_masonry(&mut rooms_changed);
        self.apply_wall_eaten(&mut rooms_changed);
        self.apply_fault_line(&mut rooms_changed);
        if apple_eaten {
            self.apply_seismic_pulse(&mut rooms_changed);
            self.apply_collapse_control(&mut rooms_changed);
        }
        self.recharge_terra_shield();

        let mut revived = None;
        let mut death_reason = None;
        let mut rewards = None;
        let mut world_position = None;
        if apple_eaten {
            let consumption =
                self.apples
                    .handle_consumption(room, self.snake.direction(), &mut self.world);
            if consumption.fatal {
                let _ = self.snake.retract_tail();
                let Some(source) = self.skills.consume_extra_life() else {
                    return self.dead(DeathReason::ShieldedApple, apple_before, rooms_changed);
                };
                let _ = self.apples.clear_apple(room, &mut self.world);
                self.respawn_apple(room);
                tracing::debug!(source = ?source, reason = ?DeathReason::ShieldedApple, "snake_revived");
                revived = Some(source);
                death_reason = Some(DeathReason::ShieldedApple);
            } else {
                let kind = consumption
                    .apple
                    .as_ref()
                    .map_or(AppleKind::Normal, |apple| apple.kind);
                *self.stats.apples_eaten.entry(kind).or_insert(0) += 1;
                let gain = self
                    .skills
                    .modify_score_gain(1 + u64::from(consumption.rewards.bonus));
                self.snake.add_score(gain);
                self.snake
                    .grow(consumption.rewards.growth.saturating_sub(1));
                self.respawn_apple(room);
                rewards = Some(consumption.rewards);
                world_position = consumption.world_position;
            }
            let _ = rooms_changed.insert(room);
        }

        self.collect_treasure(&mut rooms_changed);

        let current = self.apples.apple(room);
        let state_changed = current != apple_before;

        let (quests_completed, quest_offer) = self.advance_quests(paused);

        StepResult {
            tick: self.stats.ticks,
            status: StepStatus::Alive,
            death_reason,
            revived,
            apple: AppleOutcome {
                eaten: apple_eaten,
                rewards,
                world_position,
                current,
                state_changed,
            },
            rooms_changed,
            room_changed,
            quest_offer,
            quests_completed,
            score: self.snake.score(),
            length: self.snake.len(),
        }
    }

    fn resolve_death(
        &mut self,
        reason: DeathReason,
        apple_before: Option<AppleSnapshot>,
        rooms_changed: BTreeSet<RoomId>,
    ) -> StepResult {
        let Some(source) = self.skills.consume_extra_life() else {
            return self.dead(reason, apple_before, rooms_changed);
        };
        tracing::debug!(source = ?source, reason = ?reason, "snake_revived");
        let current = self.apples.apple(self.snake.room_id());
        StepResult {
            tick: self.stats.ticks,
            status: StepStatus::Alive,
            death_reason: Some(reason),
            revived: Some(source),
            apple: AppleOutcome {
                eaten: false,
                rewards: None,
                world_position: None,
                state_changed: current != apple_before,
                current,
            },
            rooms_changed,
            room_changed: false,
            quest_offer: None,
            quests_completed: Vec::new(),
            score: self.snake.score(),
            length: self.snake.len(),
        }
    }

    fn dead(
        &self,
        reason: DeathReason,
        apple_before: Option<AppleSnapshot>,
        rooms_changed: BTreeSet<RoomId>,
    ) -> StepResult {
        tracing::debug!(reason = ?reason, score = self.snake.score(), tick = self.stats.ticks, "snake_died");
        let current = self.apples.apple(self.snake.room_id());
        StepResult {
            tick: self.stats.ticks,
            status: StepStatus::Dead,
            death_reason: Some(reason),
            revived: None,
            apple: AppleOutcome {
                eaten: false,
                rewards: None,
                world_position: None,
                state_changed: current != apple_before,
                current,
            },
            rooms_changed,
            room_changed: false,
            quest_offer: None,
            quests_completed: Vec::new(),
            score: self.snake.score(),
            length: self.snake.len(),
        }
    }

    fn respawn_apple(&mut self, room: RoomId) {
        let _ = self.apples.spawn_apple(
            room,
            &mut self.world,
            self.snake.body(),
            self.snake.score(),
            &mut self.rng,
        );
    }

    fn collect_treasure(&mut self, rooms_changed: &mut BTreeSet<RoomId>) {
        let room = self.snake.room_id();
        let local = self.snake.local_head();
        if !query::has_treasure_at(&self.world, room, local) {
            return;
        }
        self.submit(Command::SetTreasure { room, position: None }, rooms_changed);
        let gain = self.skills.modify_score_gain(self.config.treasure.reward);
        self.snake.add_score(gain);
        tracing::debug!(room = %room, gain, "treasure_collected");
    }

    fn advance_quests(&mut self, paused: bool) -> (Vec<Quest>, Option<Quest>) {
        if !self.features.is_enabled(Feature::Quests) {
            return (Vec::new(), None);
        }
        let completed = self.quests.handle_completions(
            &mut QuestProgress {
                snake: &mut self.snake,
                skills: &mut self.skills,
                stats: &self.stats,
            },
            &mut self.rng,
        );
        let offer = self.quests.maybe_create_offer(paused, &mut self.rng);
        (completed, offer)
    }

    /// Applies an external edit, such as a level editor change, to a cached
    /// room and returns the changes the world reported.
    ///
    /// Apple overlays belong to the apple service, so `SetApple` edits are
    /// ignored.
    pub fn edit_world(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        if matches!(command, Command::SetApple { .. }) {
            return events;
        }
        apply(&mut self.world, command, &mut events);
        tracing::debug!(?command, changes = events.len(), "world_edited");
        events
    }

    /// Requests a heading for the next tick. Reversals are ignored.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.snake.set_direction(direction)
    }

    /// Buys the next rank of a perk when the skill tree is enabled.
    pub fn purchase(&mut self, perk: &str) -> Option<PurchaseReceipt> {
        if !self.features.is_enabled(Feature::SkillTree) {
            return None;
        }
        self.skills.purchase(
            perk,
            &mut SnakeSkills {
                snake: &mut self.snake,
            },
        )
    }

    /// Purchase state of a perk, `None` for unknown perks.
    #[must_use]
    pub fn purchase_state(&self, perk: &str) -> Option<PurchaseState> {
        self.skills.purchase_state(perk, self.snake.score())
    }

    /// Accepts the pending quest offer.
    pub fn accept_quest(&mut self) -> bool {
        self.quests.accept_offered()
    }

    /// Rejects the pending quest offer.
    pub fn reject_quest(&mut self) -> Option<Quest> {
        self.quests.reject_offered()
    }

    /// Current delay between ticks.
    #[must_use]
    pub fn tick_delay(&self) -> Duration {
        self.skills.tick_delay()
    }

    /// Draws from the simulation's random stream.
    pub fn random(&mut self) -> f64 {
        self.rng.next_f64()
    }

    /// Configuration the game was built from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Snake state.
    #[must_use]
    pub fn snake(&self) -> &SnakeState {
        &self.snake
    }

    /// Body segments, head first.
    #[must_use]
    pub fn body(&self) -> &[Vector2] {
        self.snake.body()
    }

    /// Committed heading.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.snake.direction()
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.snake.score()
    }

    /// Current snake length.
    #[must_use]
    pub fn snake_length(&self) -> usize {
        self.snake.len()
    }

    /// Room the snake occupies.
    #[must_use]
    pub fn current_room_id(&self) -> RoomId {
        self.snake.room_id()
    }

    /// Snapshot of the room the snake occupies.
    #[must_use]
    pub fn current_room(&self) -> Option<&RoomSnapshot> {
        query::room(&self.world, self.snake.room_id())
    }

    /// Apple of the room the snake occupies.
    #[must_use]
    pub fn current_apple(&self) -> Option<AppleSnapshot> {
        self.apples.apple(self.snake.room_id())
    }

    /// World state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Apple service.
    #[must_use]
    pub fn apples(&self) -> &AppleService {
        &self.apples
    }

    /// Bosses with a segment in `room`.
    pub fn bosses_in(&self, room: RoomId) -> impl Iterator<Item = &Boss> + '_ {
        self.bosses.in_room(room)
    }

    /// Quest controller.
    #[must_use]
    pub fn quests(&self) -> &QuestController {
        &self.quests
    }

    /// Skill tree.
    #[must_use]
    pub fn skills(&self) -> &SkillTree {
        &self.skills
    }

    /// Geometry settings.
    #[must_use]
    pub fn settings(&self) -> &GeometrySettings {
        self.snake.settings()
    }

    /// Mutable geometry settings.
    pub fn settings_mut(&mut self) -> &mut GeometrySettings {
        self.snake.settings_mut()
    }

    /// Enabled features.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Counters of the current run.
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
