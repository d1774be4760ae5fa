#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Perk tree, rank economy and effect engine.
//!
//! Perks form a prerequisite graph: a perk is purchasable once every perk it
//! requires holds at least one rank. Purchasing spends score through the
//! [`SkillRuntime`] capability and applies the new rank's effects. Ranks only
//! grow until [`SkillTree::reset`].

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use serde::Serialize;
use snake_rooms_core::{config::TickConfig, ConfigError, GeometrySettings};

mod effects;
mod perks;

pub use effects::{FlagSetting, ManaPool, SkillEffect};
pub use perks::{default_perks, PerkRank, PerkSpec, SkillPerkDefinition};

/// Mana spent by one arcane pulse.
pub const ARCANE_PULSE_COST: f64 = 30.0;
/// Mana spent when the arcane veil prevents a death.
pub const ARCANE_VEIL_COST: f64 = 50.0;

/// Game state the skill tree reads and mutates.
pub trait SkillRuntime {
    /// Current score.
    fn score(&self) -> u64;

    /// Overwrites the score.
    fn set_score(&mut self, score: u64);

    /// Grows the snake.
    fn grow(&mut self, segments: u32);

    /// Geometry settings written by flag effects.
    fn settings_mut(&mut self) -> &mut GeometrySettings;
}

/// Whether a perk's next rank can be bought.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PurchaseState {
    /// The next rank can be bought for `cost`.
    Available {
        /// Cost of the next rank.
        cost: u64,
    },
    /// A prerequisite perk has no ranks.
    Locked,
    /// The score does not cover `cost`.
    Unaffordable {
        /// Cost of the next rank.
        cost: u64,
    },
    /// Every rank has been bought.
    Maxed,
}

/// Record of a successful purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// Perk that was bought.
    pub perk: String,
    /// Rank reached.
    pub rank: u32,
    /// Score spent.
    pub cost: u64,
}

/// Resource that prevented a death.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviveSource {
    /// A banked extra life.
    ExtraLife,
    /// Mana spent through the arcane veil.
    ArcaneVeil,
}

/// Perk catalog plus everything purchased this run.
#[derive(Clone, Debug)]
pub struct SkillTree {
    perks: Vec<SkillPerkDefinition>,
    ranks: BTreeMap<String, u32>,
    base_tick_delay: Duration,
    min_tick_delay: Duration,
    tick_scalars: BTreeMap<String, f64>,
    extra_lives: u32,
    score_multiplier: f64,
    score_bonus: f64,
    mana: Option<ManaPool>,
    arcane_pulse_unlocked: bool,
    arcane_veil_unlocked: bool,
    tracked_flags: Vec<FlagSetting>,
}

impl SkillTree {
    /// Creates a tree over `perks`.
    ///
    /// # Errors
    ///
    /// Fails when two perks share an identifier or a perk requires an
    /// unknown perk.
    pub fn new(perks: Vec<SkillPerkDefinition>, tick: &TickConfig) -> Result<Self, ConfigError> {
        let mut ids = BTreeSet::new();
        for perk in &perks {
            if !ids.insert(perk.id.as_str()) {
                return Err(ConfigError::DuplicatePerk(perk.id.clone()));
            }
        }
        for perk in &perks {
            if let Some(requirement) = perk
                .requires
                .iter()
                .find(|requirement| !ids.contains(requirement.as_str()))
            {
                return Err(ConfigError::UnknownPrerequisite {
                    perk: perk.id.clone(),
                    requirement: requirement.clone(),
                });
            }
        }

        Ok(Self {
            perks,
            ranks: BTreeMap::new(),
            base_tick_delay: Duration::from_millis(tick.base_delay_ms),
            min_tick_delay: Duration::from_millis(tick.min_delay_ms),
            tick_scalars: BTreeMap::new(),
            extra_lives: 0,
            score_multiplier: 1.0,
            score_bonus: 1.0,
            mana: None,
            arcane_pulse_unlocked: false,
            arcane_veil_unlocked: false,
            tracked_flags: Vec::new(),
        })
    }

    /// Creates a tree over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Propagates catalog validation failures.
    pub fn with_defaults(tick: &TickConfig) -> Result<Self, ConfigError> {
        let perks = default_perks()
            .into_iter()
            .map(SkillPerkDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(perks, tick)
    }

    /// Catalog in declaration order.
    #[must_use]
    pub fn perks(&self) -> &[SkillPerkDefinition] {
        &self.perks
    }

    /// Looks up a perk definition.
    #[must_use]
    pub fn perk(&self, id: &str) -> Option<&SkillPerkDefinition> {
        self.perks.iter().find(|perk| perk.id == id)
    }

    /// Current rank of a perk, zero when never bought.
    #[must_use]
    pub fn rank(&self, id: &str) -> u32 {
        self.ranks.get(id).copied().unwrap_or(0)
    }

    /// Purchase state of a perk at the given score, `None` for unknown perks.
    #[must_use]
    pub fn purchase_state(&self, id: &str, score: u64) -> Option<PurchaseState> {
        let perk = self.perk(id)?;
        let Some(next) = perk.next_rank(self.rank(id)) else {
            return Some(PurchaseState::Maxed);
        };
        if perk.requires.iter().any(|requirement| self.rank(requirement) == 0) {
            return Some(PurchaseState::Locked);
        }
        if score < next.cost {
            return Some(PurchaseState::Unaffordable { cost: next.cost });
        }
        Some(PurchaseState::Available { cost: next.cost })
    }

    /// Buys the next rank of a perk when it is available.
    ///
    /// Spends the cost, raises the rank and applies the rank's effects.
    /// Returns `None` and changes nothing otherwise.
    pub fn purchase<R: SkillRuntime + ?Sized>(
        &mut self,
        id: &str,
        runtime: &mut R,
    ) -> Option<PurchaseReceipt> {
        let Some(PurchaseState::Available { cost }) = self.purchase_state(id, runtime.score()) else {
            return None;
        };
        let rank = self.rank(id);
        let effects = self.perk(id)?.next_rank(rank)?.effects.clone();

        let remaining = runtime.score() - cost;
        runtime.set_score(remaining);
        let rank = rank + 1;
        let _ = self.ranks.insert(id.to_owned(), rank);
        for effect in effects {
            self.apply_effect(effect, runtime);
        }
        tracing::debug!(perk = id, rank, cost, "perk_purchased");

        Some(PurchaseReceipt {
            perk: id.to_owned(),
            rank,
            cost,
        })
    }

    fn apply_effect<R: SkillRuntime + ?Sized>(&mut self, effect: SkillEffect, runtime: &mut R) {
        match effect {
            SkillEffect::TickDelayScalar { source, scalar } => {
                let _ = self.tick_scalars.insert(source, scalar);
            }
            SkillEffect::ExtraLifeCharge { amount } => {
                self.extra_lives = self.extra_lives.saturating_add(amount);
            }
            SkillEffect::ScoreMultiplier { value } => self.score_multiplier = value,
            SkillEffect::ScoreMultiplierBonus { factor } => self.score_bonus *= factor,
            SkillEffect::SetFlag(setting) => {
                setting.apply(runtime.settings_mut());
                self.tracked_flags.push(setting);
            }
            SkillEffect::InstantGrow { segments } => runtime.grow(segments),
            SkillEffect::ManaEnable { max, regen } => match self.mana.as_mut() {
                Some(pool) => {
                    pool.max = pool.max.max(max);
                    pool.regen = pool.regen.max(regen);
                }
                None => {
                    self.mana = Some(ManaPool {
                        current: max,
                        max,
                        regen,
                    });
                }
            },
            SkillEffect::ManaUpgrade { max, regen } => {
                let pool = self.mana.get_or_insert(ManaPool {
                    current: 0.0,
                    max: 0.0,
                    regen: 0.0,
                });
                pool.max += max;
                pool.regen += regen;
                pool.current = pool.current.min(pool.max);
            }
            SkillEffect::UnlockArcanePulse => self.arcane_pulse_unlocked = true,
            SkillEffect::UnlockArcaneVeil => self.arcane_veil_unlocked = true,
        }
    }

    /// Product of every tick-delay source.
    #[must_use]
    pub fn tick_multiplier(&self) -> f64 {
        self.tick_scalars.values().product()
    }

    /// Delay between ticks: the scaled base, never below the floor.
    #[must_use]
    pub fn tick_delay(&self) -> Duration {
        self.base_tick_delay
            .mul_f64(self.tick_multiplier().max(0.0))
            .max(self.min_tick_delay)
    }

    /// Combined score multiplier, never below one.
    #[must_use]
    pub fn score_multiplier(&self) -> f64 {
        (self.score_multiplier * self.score_bonus).max(1.0)
    }

    /// Scales a positive score gain by the combined multiplier, rounding up.
    /// Zero passes through unchanged.
    #[must_use]
    pub fn modify_score_gain(&self, amount: u64) -> u64 {
        if amount == 0 {
            return 0;
        }
        let scaled = (amount as f64 * self.score_multiplier()).ceil() as u64;
        scaled.max(1)
    }

    /// Banked extra lives.
    #[must_use]
    pub fn extra_lives(&self) -> u32 {
        self.extra_lives
    }

    /// Banks one extra life.
    pub fn add_extra_life(&mut self) {
        self.extra_lives = self.extra_lives.saturating_add(1);
    }

    /// Spends a banked life, or veil mana when no life is banked.
    pub fn consume_extra_life(&mut self) -> Option<ReviveSource> {
        if self.extra_lives > 0 {
            self.extra_lives -= 1;
            return Some(ReviveSource::ExtraLife);
        }
        if !self.arcane_veil_unlocked {
            return None;
        }
        let pool = self.mana.as_mut()?;
        pool.try_spend(ARCANE_VEIL_COST)
            .then_some(ReviveSource::ArcaneVeil)
    }

    /// Mana pool, once enabled.
    #[must_use]
    pub fn mana(&self) -> Option<&ManaPool> {
        self.mana.as_ref()
    }

    /// Reports whether the arcane pulse is unlocked.
    #[must_use]
    pub fn arcane_pulse_unlocked(&self) -> bool {
        self.arcane_pulse_unlocked
    }

    /// Reports whether the arcane veil is unlocked.
    #[must_use]
    pub fn arcane_veil_unlocked(&self) -> bool {
        self.arcane_veil_unlocked
    }

    /// Spends pulse mana if the pulse is unlocked and affordable.
    pub fn try_cast_arcane_pulse(&mut self) -> bool {
        if !self.arcane_pulse_unlocked {
            return false;
        }
        self.mana
            .as_mut()
            .is_some_and(|pool| pool.try_spend(ARCANE_PULSE_COST))
    }

    /// Regenerates mana by one tick.
    pub fn tick(&mut self) {
        if let Some(pool) = self.mana.as_mut() {
            pool.regenerate();
        }
    }

    /// Restores flags to their reset values and clears every rank, charge,
    /// multiplier and the mana pool.
    pub fn reset<R: SkillRuntime + ?Sized>(&mut self, runtime: &mut R) {
        for setting in self.tracked_flags.drain(..) {
            setting.reset_value().apply(runtime.settings_mut());
        }
        self.ranks.clear();
        self.tick_scalars.clear();
        self.extra_lives = 0;
        self.score_multiplier = 1.0;
        self.score_bonus = 1.0;
        self.mana = None;
        self.arcane_pulse_unlocked = false;
        self.arcane_veil_unlocked = false;
    }
}
