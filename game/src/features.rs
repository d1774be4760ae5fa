//! Optional gameplay features enabled by identifier.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use snake_rooms_core::ConfigError;

/// Optional gameplay feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// Bosses spawn and pull the snake.
    Bosses,
    /// Quests are assigned, offered and completed.
    Quests,
    /// Perks can be purchased.
    SkillTree,
    /// Marks the snake as wrapping at room edges; cosmetic only.
    WrapWalls,
}

impl Feature {
    /// Canonical identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Bosses => "bosses",
            Self::Quests => "quests",
            Self::SkillTree => "skill-tree",
            Self::WrapWalls => "wrap-walls",
        }
    }
}

/// Identifier to feature table.
#[derive(Clone, Debug, Default)]
pub struct FeatureRegistry {
    features: BTreeMap<String, Feature>,
}

impl FeatureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that knows every built-in feature.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for feature in [
            Feature::Bosses,
            Feature::Quests,
            Feature::SkillTree,
            Feature::WrapWalls,
        ] {
            let _ = registry.register(feature.id(), feature);
        }
        registry
    }

    /// Registers `feature` under `id`. A duplicate identifier is ignored with a warning.
    pub fn register(&mut self, id: &str, feature: Feature) -> bool {
        if self.features.contains_key(id) {
            tracing::warn!(feature = id, "duplicate_feature_registration");
            return false;
        }
        let _ = self.features.insert(id.to_owned(), feature);
        true
    }

    /// Looks up a feature by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Feature> {
        self.features.get(id).copied()
    }

    /// Removes every registration.
    pub fn clear(&mut self) {
        self.features.clear();
    }
}

/// Features enabled for a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: BTreeSet<Feature>,
}

impl FeatureSet {
    /// Resolves enabled identifiers against the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFeature`] for an unregistered identifier.
    pub fn resolve<S: AsRef<str>>(registry: &FeatureRegistry, ids: &[S]) -> Result<Self, ConfigError> {
        let enabled = ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                registry
                    .get(id)
                    .ok_or_else(|| ConfigError::UnknownFeature(id.to_owned()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { enabled })
    }

    /// Reports whether `feature` is enabled.
    #[must_use]
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }

    /// Enabled features in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.enabled.iter().copied()
    }
}
