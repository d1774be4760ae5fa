//! Typed perk effects.

use snake_rooms_core::{GeometrySettings, TerraShield};

/// A geometry setting written by a perk.
///
/// Each variant carries the value to write; its reset value is the
/// [`GeometrySettings`] default for the same field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlagSetting {
    /// Wall highlight radius.
    WallSense(Option<u32>),
    /// Tail cells harden into walls.
    Masonry(bool),
    /// Walls around the head crumble on every meal.
    SeismicPulse(Option<u32>),
    /// The head's row is cleared of walls every tick.
    FaultLine(bool),
    /// Walls rise beside the head on every meal.
    CollapseControl(bool),
    /// Wall-eating charges.
    TerraShield(Option<TerraShield>),
    /// Score per eaten wall.
    WorldEater(Option<u64>),
}

impl FlagSetting {
    /// Writes the value into `settings`.
    pub fn apply(self, settings: &mut GeometrySettings) {
        match self {
            Self::WallSense(radius) => settings.wall_sense_radius = radius,
            Self::Masonry(enabled) => settings.masonry_enabled = enabled,
            Self::SeismicPulse(radius) => settings.seismic_pulse_radius = radius,
            Self::FaultLine(enabled) => settings.fault_line_enabled = enabled,
            Self::CollapseControl(enabled) => settings.collapse_control_enabled = enabled,
            Self::TerraShield(shield) => settings.terra_shield = shield,
            Self::WorldEater(reward) => settings.world_eater_reward = reward,
        }
    }

    /// The same setting carrying its reset value.
    #[must_use]
    pub fn reset_value(self) -> Self {
        let defaults = GeometrySettings::default();
        match self {
            Self::WallSense(_) => Self::WallSense(defaults.wall_sense_radius),
            Self::Masonry(_) => Self::Masonry(defaults.masonry_enabled),
            Self::SeismicPulse(_) => Self::SeismicPulse(defaults.seismic_pulse_radius),
            Self::FaultLine(_) => Self::FaultLine(defaults.fault_line_enabled),
            Self::CollapseControl(_) => Self::CollapseControl(defaults.collapse_control_enabled),
            Self::TerraShield(_) => Self::TerraShield(defaults.terra_shield),
            Self::WorldEater(_) => Self::WorldEater(defaults.world_eater_reward),
        }
    }
}

/// Effect applied when a perk rank is reached.
#[derive(Clone, Debug, PartialEq)]
pub enum SkillEffect {
    /// Sets the scalar of a named tick-delay source; sources multiply together.
    TickDelayScalar {
        /// Source name, usually the perk id.
        source: String,
        /// Multiplier applied to the base tick delay.
        scalar: f64,
    },
    /// Banks extra lives.
    ExtraLifeCharge {
        /// Lives added.
        amount: u32,
    },
    /// Replaces the base score multiplier.
    ScoreMultiplier {
        /// New base multiplier.
        value: f64,
    },
    /// Compounds the bonus score factor.
    ScoreMultiplierBonus {
        /// Factor multiplied into the bonus.
        factor: f64,
    },
    /// Writes a geometry setting.
    SetFlag(FlagSetting),
    /// Grows the snake immediately.
    InstantGrow {
        /// Segments added.
        segments: u32,
    },
    /// Creates the mana pool, or raises it to at least these values.
    ManaEnable {
        /// Pool capacity.
        max: f64,
        /// Regeneration per tick.
        regen: f64,
    },
    /// Extends the mana pool.
    ManaUpgrade {
        /// Capacity added.
        max: f64,
        /// Regeneration added per tick.
        regen: f64,
    },
    /// Unlocks the arcane pulse ability.
    UnlockArcanePulse,
    /// Unlocks the arcane veil, which spends mana to cheat death.
    UnlockArcaneVeil,
}

/// Mana reserve used by arcane abilities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManaPool {
    /// Available mana.
    pub current: f64,
    /// Capacity.
    pub max: f64,
    /// Mana regenerated per tick.
    pub regen: f64,
}

impl ManaPool {
    pub(crate) fn regenerate(&mut self) {
        self.current = (self.current + self.regen).min(self.max);
    }

    pub(crate) fn try_spend(&mut self, amount: f64) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }
}
