//! Quest definitions and the catalog they are drawn from.

use serde::Serialize;
use snake_rooms_core::AppleKind;

use crate::QuestRuntime;

/// Condition that completes a quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestObjective {
    /// Score at least this many points.
    ReachScore {
        /// Score target.
        score: u64,
    },
    /// Grow the snake to at least this many segments.
    ReachLength {
        /// Length target.
        length: usize,
    },
    /// Eat apples, optionally of a single kind.
    EatApples {
        /// Kind that counts; every kind counts when absent.
        kind: Option<AppleKind>,
        /// Number of apples.
        count: u32,
    },
    /// Visit distinct rooms, the starting room included.
    VisitRooms {
        /// Room target.
        rooms: usize,
    },
    /// Travel through ladders.
    ClimbLadders {
        /// Ladder target.
        count: u32,
    },
}

impl QuestObjective {
    fn is_met<R: QuestRuntime + ?Sized>(&self, runtime: &R) -> bool {
        match self {
            Self::ReachScore { score } => runtime.score() >= *score,
            Self::ReachLength { length } => runtime.snake_length() >= *length,
            Self::EatApples { kind, count } => runtime.apples_eaten(*kind) >= *count,
            Self::VisitRooms { rooms } => runtime.rooms_visited() >= *rooms,
            Self::ClimbLadders { count } => runtime.ladders_climbed() >= *count,
        }
    }
}

/// Reward granted when a quest completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "amount", rename_all = "kebab-case")]
pub enum QuestReward {
    /// Flat score, added without score multipliers.
    Score(u64),
    /// One banked extra life.
    ExtraLife,
}

/// Immutable quest definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quest {
    /// Unique identifier.
    pub id: String,
    /// Short title.
    pub label: String,
    /// Player-facing description.
    pub description: String,
    /// Completion condition.
    pub objective: QuestObjective,
    /// Reward on completion.
    pub reward: QuestReward,
}

impl Quest {
    /// Creates a quest definition.
    #[must_use]
    pub fn new(
        id: &str,
        label: &str,
        description: &str,
        objective: QuestObjective,
        reward: QuestReward,
    ) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            description: description.to_owned(),
            objective,
            reward,
        }
    }

    /// Evaluates the completion condition against the runtime.
    #[must_use]
    pub fn is_completed<R: QuestRuntime + ?Sized>(&self, runtime: &R) -> bool {
        self.objective.is_met(runtime)
    }

    /// Applies the reward to the runtime.
    pub fn grant_reward<R: QuestRuntime + ?Sized>(&self, runtime: &mut R) {
        match self.reward {
            QuestReward::Score(amount) => runtime.add_score(amount),
            QuestReward::ExtraLife => runtime.grant_extra_life(),
        }
    }
}

/// Catalog of quests, keyed by identifier in registration order.
#[derive(Clone, Debug, Default)]
pub struct QuestRegistry {
    quests: Vec<Quest>,
}

impl QuestRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in catalog.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for quest in default_quests() {
            let _ = registry.register(quest);
        }
        registry
    }

    /// Adds a quest. A duplicate identifier is ignored with a warning.
    pub fn register(&mut self, quest: Quest) -> bool {
        if self.get(&quest.id).is_some() {
            tracing::warn!(quest = %quest.id, "duplicate_quest_registration");
            return false;
        }
        self.quests.push(quest);
        true
    }

    /// Looks up a quest by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.id == id)
    }

    /// Iterates the catalog in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter()
    }

    /// Number of registered quests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Reports whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Removes every quest.
    pub fn clear(&mut self) {
        self.quests.clear();
    }
}

fn default_quests() -> Vec<Quest> {
    vec![
        Quest::new(
            "first-bite",
            "First Bite",
            "Eat an apple.",
            QuestObjective::EatApples {
                kind: None,
                count: 1,
            },
            QuestReward::Score(5),
        ),
        Quest::new(
            "orchard",
            "Orchard",
            "Eat ten apples.",
            QuestObjective::EatApples {
                kind: None,
                count: 10,
            },
            QuestReward::Score(15),
        ),
        Quest::new(
            "golden-touch",
            "Golden Touch",
            "Eat a gold apple.",
            QuestObjective::EatApples {
                kind: Some(AppleKind::Gold),
                count: 1,
            },
            QuestReward::Score(20),
        ),
        Quest::new(
            "shield-breaker",
            "Shield Breaker",
            "Eat three shielded apples.",
            QuestObjective::EatApples {
                kind: Some(AppleKind::Shielded),
                count: 3,
            },
            QuestReward::ExtraLife,
        ),
        Quest::new(
            "quick-hands",
            "Quick Hands",
            "Catch three skittish apples.",
            QuestObjective::EatApples {
                kind: Some(AppleKind::Skittish),
                count: 3,
            },
            QuestReward::Score(15),
        ),
        Quest::new(
            "long-tail",
            "Long Tail",
            "Grow to fifteen segments.",
            QuestObjective::ReachLength { length: 15 },
            QuestReward::Score(20),
        ),
        Quest::new(
            "high-roller",
            "High Roller",
            "Reach fifty points.",
            QuestObjective::ReachScore { score: 50 },
            QuestReward::ExtraLife,
        ),
        Quest::new(
            "explorer",
            "Explorer",
            "Visit five rooms.",
            QuestObjective::VisitRooms { rooms: 5 },
            QuestReward::Score(10),
        ),
        Quest::new(
            "climber",
            "Climber",
            "Climb two ladders.",
            QuestObjective::ClimbLadders { count: 2 },
            QuestReward::Score(15),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_unique_ids() {
        let registry = QuestRegistry::with_defaults();
        assert_eq!(registry.len(), default_quests().len());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = QuestRegistry::with_defaults();
        let before = registry.len();
        let duplicate = Quest::new(
            "explorer",
            "Explorer Again",
            "Visit rooms.",
            QuestObjective::VisitRooms { rooms: 2 },
            QuestReward::Score(1),
        );
        assert!(!registry.register(duplicate));
        assert_eq!(registry.len(), before);
        assert_eq!(
            registry.get("explorer").map(|quest| quest.label.as_str()),
            Some("Explorer")
        );
        registry.clear();
        assert!(registry.is_empty());
    }
}
