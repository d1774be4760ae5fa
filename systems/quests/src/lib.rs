#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Quest catalog and the controller that tracks a run's quests.
//!
//! Active, completed and offered quests are kept pairwise disjoint by
//! identifier. Completed identifiers are append-only until the next reset.

use std::sync::Arc;

use snake_rooms_core::{config::QuestConfig, AppleKind, SeededRng};

mod registry;

pub use registry::{Quest, QuestObjective, QuestRegistry, QuestReward};

/// Game state that quests are evaluated against and reward into.
pub trait QuestRuntime {
    /// Current score.
    fn score(&self) -> u64;

    /// Current snake length.
    fn snake_length(&self) -> usize;

    /// Apples eaten this run, restricted to `kind` when provided.
    fn apples_eaten(&self, kind: Option<AppleKind>) -> u32;

    /// Distinct rooms visited this run.
    fn rooms_visited(&self) -> usize;

    /// Ladders travelled this run.
    fn ladders_climbed(&self) -> u32;

    /// Adds score directly.
    fn add_score(&mut self, amount: u64);

    /// Banks one extra life.
    fn grant_extra_life(&mut self);
}

/// Runtime bookkeeping of active, completed and offered quests.
#[derive(Debug)]
pub struct QuestController {
    registry: Arc<QuestRegistry>,
    config: QuestConfig,
    active: Vec<Quest>,
    completed: Vec<String>,
    offered: Option<Quest>,
}

impl QuestController {
    /// Creates a controller drawing from `registry`. No quests are assigned
    /// until [`QuestController::reset`] runs.
    #[must_use]
    pub fn new(registry: Arc<QuestRegistry>, config: QuestConfig) -> Self {
        Self {
            registry,
            config,
            active: Vec::new(),
            completed: Vec::new(),
            offered: None,
        }
    }

    /// Catalog the controller draws from.
    #[must_use]
    pub fn registry(&self) -> &QuestRegistry {
        &self.registry
    }

    /// Active quests in assignment order.
    #[must_use]
    pub fn active(&self) -> &[Quest] {
        &self.active
    }

    /// Identifiers of completed quests in completion order.
    #[must_use]
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Quest currently on offer.
    #[must_use]
    pub fn offered(&self) -> Option<&Quest> {
        self.offered.as_ref()
    }

    /// Clears every list and assigns the initial batch of quests.
    pub fn reset(&mut self, rng: &mut SeededRng) {
        self.active.clear();
        self.completed.clear();
        self.offered = None;
        let count = self.config.initial_count.min(self.config.max_active);
        self.active = self.sample(count, rng);
    }

    /// Rolls for a new offer.
    ///
    /// Nothing happens while paused, while an offer is pending, or while the
    /// active list is full. Returns the new offer.
    pub fn maybe_create_offer(&mut self, paused: bool, rng: &mut SeededRng) -> Option<Quest> {
        if paused || self.offered.is_some() || self.active.len() >= self.config.max_active {
            return None;
        }
        if !rng.chance(self.config.offer_chance) {
            return None;
        }
        let quest = self.sample(1, rng).pop()?;
        tracing::debug!(quest = %quest.id, "quest_offered");
        self.offered = Some(quest.clone());
        Some(quest)
    }

    /// Moves the offer into the active list if there is room; a full list
    /// drops it. Returns `true` when the quest became active.
    pub fn accept_offered(&mut self) -> bool {
        let Some(quest) = self.offered.take() else {
            return false;
        };
        if self.active.len() >= self.config.max_active {
            return false;
        }
        self.active.push(quest);
        true
    }

    /// Discards the pending offer.
    pub fn reject_offered(&mut self) -> Option<Quest> {
        self.offered.take()
    }

    /// Completes every satisfied active quest, grants its reward and backfills
    /// the freed slots. Returns the quests completed by this call.
    pub fn handle_completions<R: QuestRuntime + ?Sized>(
        &mut self,
        runtime: &mut R,
        rng: &mut SeededRng,
    ) -> Vec<Quest> {
        let (finished, still_active): (Vec<Quest>, Vec<Quest>) = self
            .active
            .drain(..)
            .partition(|quest| !self.completed.contains(&quest.id) && quest.is_completed(runtime));
        self.active = still_active;
        if finished.is_empty() {
            return finished;
        }

        for quest in &finished {
            self.completed.push(quest.id.clone());
            quest.grant_reward(runtime);
            tracing::debug!(quest = %quest.id, "quest_completed");
        }

        let slots = self.config.max_active.saturating_sub(self.active.len());
        let backfill = self.sample(finished.len().min(slots), rng);
        self.active.extend(backfill);
        finished
    }

    fn is_tracked(&self, id: &str) -> bool {
        self.active.iter().any(|quest| quest.id == id)
            || self.completed.iter().any(|completed| completed == id)
            || self.offered.as_ref().is_some_and(|quest| quest.id == id)
    }

    fn sample(&self, count: usize, rng: &mut SeededRng) -> Vec<Quest> {
        let mut pool: Vec<&Quest> = self
            .registry
            .iter()
            .filter(|quest| !self.is_tracked(&quest.id))
            .collect();
        let mut picked = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(index) = rng.index(pool.len()) else {
                break;
            };
            picked.push(pool.swap_remove(index).clone());
        }
        picked
    }
}
