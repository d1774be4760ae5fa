//! Perk definitions and the built-in catalog.

use snake_rooms_core::{ConfigError, TerraShield};

use crate::effects::{FlagSetting, SkillEffect};

/// Perk as authored: costs and effect lists are parallel per rank.
#[derive(Clone, Debug, PartialEq)]
pub struct PerkSpec {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Player-facing description.
    pub description: String,
    /// Cost of each rank.
    pub costs: Vec<u64>,
    /// Effects of each rank.
    pub rank_effects: Vec<Vec<SkillEffect>>,
    /// Perks that need at least one rank first.
    pub requires: Vec<String>,
}

/// One purchasable rank.
#[derive(Clone, Debug, PartialEq)]
pub struct PerkRank {
    /// Score spent on purchase.
    pub cost: u64,
    /// Effects applied when the rank is reached.
    pub effects: Vec<SkillEffect>,
}

/// Validated perk definition.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillPerkDefinition {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Player-facing description.
    pub description: String,
    /// Ranks in purchase order.
    pub ranks: Vec<PerkRank>,
    /// Perks that need at least one rank first.
    pub requires: Vec<String>,
}

impl SkillPerkDefinition {
    /// Number of ranks.
    #[must_use]
    pub fn max_rank(&self) -> u32 {
        u32::try_from(self.ranks.len()).unwrap_or(u32::MAX)
    }

    /// Rank reached by purchasing after `current`.
    #[must_use]
    pub fn next_rank(&self, current: u32) -> Option<&PerkRank> {
        self.ranks.get(usize::try_from(current).ok()?)
    }
}

impl TryFrom<PerkSpec> for SkillPerkDefinition {
    type Error = ConfigError;

    fn try_from(spec: PerkSpec) -> Result<Self, Self::Error> {
        if spec.costs.len() != spec.rank_effects.len() {
            return Err(ConfigError::MismatchedRankData {
                perk: spec.id,
                costs: spec.costs.len(),
                effects: spec.rank_effects.len(),
            });
        }
        if spec.costs.is_empty() {
            return Err(ConfigError::EmptyPerk(spec.id));
        }

        let ranks = spec
            .costs
            .into_iter()
            .zip(spec.rank_effects)
            .map(|(cost, effects)| PerkRank { cost, effects })
            .collect();
        Ok(Self {
            id: spec.id,
            name: spec.name,
            description: spec.description,
            ranks,
            requires: spec.requires,
        })
    }
}

fn perk(
    id: &str,
    name: &str,
    description: &str,
    requires: &[&str],
    ranks: Vec<(u64, Vec<SkillEffect>)>,
) -> PerkSpec {
    let (costs, rank_effects): (Vec<u64>, Vec<Vec<SkillEffect>>) = ranks.into_iter().unzip();
    PerkSpec {
        id: id.to_owned(),
        name: name.to_owned(),
        description: description.to_owned(),
        costs,
        rank_effects,
        requires: requires.iter().map(|id| (*id).to_owned()).collect(),
    }
}

fn tick_scalar(source: &str, scalar: f64) -> Vec<SkillEffect> {
    vec![SkillEffect::TickDelayScalar {
        source: source.to_owned(),
        scalar,
    }]
}

fn flag(setting: FlagSetting) -> Vec<SkillEffect> {
    vec![SkillEffect::SetFlag(setting)]
}

fn shield(charges: u32, recharge_ticks: u32) -> FlagSetting {
    FlagSetting::TerraShield(Some(TerraShield {
        charges,
        max_charges: charges,
        recharge_ticks,
        progress: 0,
    }))
}

/// Built-in perk catalog.
#[must_use]
pub fn default_perks() -> Vec<PerkSpec> {
    vec![
        perk(
            "swift-scales",
            "Swift Scales",
            "Shortens the delay between ticks.",
            &[],
            vec![
                (5, tick_scalar("swift-scales", 0.92)),
                (10, tick_scalar("swift-scales", 0.85)),
                (20, tick_scalar("swift-scales", 0.78)),
            ],
        ),
        perk(
            "momentum",
            "Momentum",
            "Speeds the snake up further.",
            &["swift-scales"],
            vec![
                (15, tick_scalar("momentum", 0.9)),
                (30, tick_scalar("momentum", 0.8)),
            ],
        ),
        perk(
            "second-skin",
            "Second Skin",
            "Banks an extra life.",
            &[],
            vec![
                (20, vec![SkillEffect::ExtraLifeCharge { amount: 1 }]),
                (40, vec![SkillEffect::ExtraLifeCharge { amount: 1 }]),
            ],
        ),
        perk(
            "golden-tongue",
            "Golden Tongue",
            "Raises the score multiplier.",
            &[],
            vec![
                (10, vec![SkillEffect::ScoreMultiplier { value: 1.25 }]),
                (20, vec![SkillEffect::ScoreMultiplier { value: 1.5 }]),
                (35, vec![SkillEffect::ScoreMultiplier { value: 2.0 }]),
            ],
        ),
        perk(
            "hoarder",
            "Hoarder",
            "Compounds a bonus on top of the score multiplier.",
            &["golden-tongue"],
            vec![
                (25, vec![SkillEffect::ScoreMultiplierBonus { factor: 1.2 }]),
                (50, vec![SkillEffect::ScoreMultiplierBonus { factor: 1.25 }]),
            ],
        ),
        perk(
            "feast",
            "Feast",
            "Grows the snake on the spot.",
            &[],
            vec![(8, vec![SkillEffect::InstantGrow { segments: 3 }])],
        ),
        perk(
            "wall-sense",
            "Wall Sense",
            "Highlights nearby walls.",
            &[],
            vec![
                (6, flag(FlagSetting::WallSense(Some(3)))),
                (12, flag(FlagSetting::WallSense(Some(5)))),
            ],
        ),
        perk(
            "masonry",
            "Masonry",
            "The tail leaves walls behind.",
            &["wall-sense"],
            vec![(15, flag(FlagSetting::Masonry(true)))],
        ),
        perk(
            "fault-line",
            "Fault Line",
            "Walls in the head's row crumble.",
            &["masonry"],
            vec![(30, flag(FlagSetting::FaultLine(true)))],
        ),
        perk(
            "seismic-pulse",
            "Seismic Pulse",
            "Meals shake loose the surrounding walls.",
            &["wall-sense"],
            vec![
                (20, flag(FlagSetting::SeismicPulse(Some(1)))),
                (35, flag(FlagSetting::SeismicPulse(Some(2)))),
            ],
        ),
        perk(
            "collapse-control",
            "Collapse Control",
            "Meals raise walls beside the head.",
            &["seismic-pulse"],
            vec![(25, flag(FlagSetting::CollapseControl(true)))],
        ),
        perk(
            "terra-shield",
            "Terra Shield",
            "Stores charges that let the snake eat through walls.",
            &["seismic-pulse"],
            vec![(30, flag(shield(1, 40))), (45, flag(shield(2, 30)))],
        ),
        perk(
            "world-eater",
            "World Eater",
            "Eaten walls are worth points.",
            &["terra-shield"],
            vec![(40, flag(FlagSetting::WorldEater(Some(5))))],
        ),
        perk(
            "arcane-affinity",
            "Arcane Affinity",
            "Opens and deepens a mana pool.",
            &[],
            vec![
                (
                    15,
                    vec![SkillEffect::ManaEnable {
                        max: 60.0,
                        regen: 0.5,
                    }],
                ),
                (
                    30,
                    vec![SkillEffect::ManaUpgrade {
                        max: 40.0,
                        regen: 0.25,
                    }],
                ),
            ],
        ),
        perk(
            "arcane-pulse",
            "Arcane Pulse",
            "Spend mana to blast nearby walls.",
            &["arcane-affinity"],
            vec![(25, vec![SkillEffect::UnlockArcanePulse])],
        ),
        perk(
            "arcane-veil",
            "Arcane Veil",
            "Spend mana to survive a fatal blow.",
            &["arcane-affinity"],
            vec![(40, vec![SkillEffect::UnlockArcaneVeil])],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_rank_data_is_rejected() {
        let mut spec = perk("broken", "Broken", "", &[], vec![(1, Vec::new())]);
        spec.costs.push(2);
        assert_eq!(
            SkillPerkDefinition::try_from(spec),
            Err(ConfigError::MismatchedRankData {
                perk: "broken".to_owned(),
                costs: 2,
                effects: 1,
            })
        );
    }

    #[test]
    fn rankless_perks_are_rejected() {
        let spec = perk("empty", "Empty", "", &[], Vec::new());
        assert_eq!(
            SkillPerkDefinition::try_from(spec),
            Err(ConfigError::EmptyPerk("empty".to_owned()))
        );
    }

    #[test]
    fn default_catalog_converts() {
        let perks: Result<Vec<SkillPerkDefinition>, _> = default_perks()
            .into_iter()
            .map(SkillPerkDefinition::try_from)
            .collect();
        let perks = perks.expect("built-in perks are valid");
        assert_eq!(perks.len(), 16);
        let swift = &perks[0];
        assert_eq!(swift.max_rank(), 3);
        assert_eq!(swift.next_rank(0).map(|rank| rank.cost), Some(5));
        assert!(swift.next_rank(3).is_none());
    }
}
