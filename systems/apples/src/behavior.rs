//! Per-kind apple rules.
//!
//! Every rule is a `match` over [`AppleBehavior`], so adding a kind forces each
//! rule to decide what the new kind does.

use std::cmp::Ordering;

use snake_rooms_core::{AppleKind, AppleRewards, Direction, SeededRng, Vector2};

/// Behaviour-specific state carried by an apple instance.
#[derive(Clone, Debug, PartialEq)]
pub enum AppleBehavior {
    /// Plain apple.
    Normal,
    /// Apple that kills a snake travelling in one of the protected directions.
    Shielded {
        /// Fatal travel directions, one to three entries.
        protected: Vec<Direction>,
    },
    /// Static high-value apple.
    Gold,
    /// Apple that flees from the snake head.
    Skittish {
        /// Per-tick probability of attempting a move.
        move_chance: f64,
    },
}

impl AppleBehavior {
    /// Builds the behaviour state for a freshly spawned apple.
    pub fn initialize(kind: AppleKind, move_chance: f64, rng: &mut SeededRng) -> Self {
        match kind {
            AppleKind::Normal => Self::Normal,
            AppleKind::Shielded => {
                let count = usize::try_from(rng.int_between(1, 3)).unwrap_or(1);
                let mut directions = Direction::ALL;
                rng.shuffle(&mut directions);
                Self::Shielded {
                    protected: directions.iter().take(count).copied().collect(),
                }
            }
            AppleKind::Gold => Self::Gold,
            AppleKind::Skittish => Self::Skittish { move_chance },
        }
    }

    /// Kind tag of the behaviour.
    #[must_use]
    pub fn kind(&self) -> AppleKind {
        match self {
            Self::Normal => AppleKind::Normal,
            Self::Shielded { .. } => AppleKind::Shielded,
            Self::Gold => AppleKind::Gold,
            Self::Skittish { .. } => AppleKind::Skittish,
        }
    }

    /// Growth and bonus granted when the apple is eaten.
    #[must_use]
    pub fn on_consume(&self) -> AppleRewards {
        match self {
            Self::Normal => AppleRewards::DEFAULT,
            Self::Shielded { .. } => AppleRewards {
                growth: 1,
                bonus: 1,
            },
            Self::Gold => AppleRewards {
                growth: 4,
                bonus: 4,
            },
            Self::Skittish { .. } => AppleRewards {
                growth: 2,
                bonus: 1,
            },
        }
    }

    /// Reports whether eating the apple while travelling in `approach` is fatal.
    #[must_use]
    pub fn is_fatal_approach(&self, approach: Direction) -> bool {
        match self {
            Self::Shielded { protected } => protected.contains(&approach),
            Self::Normal | Self::Gold | Self::Skittish { .. } => false,
        }
    }

    /// Travel directions the apple protects, empty for unshielded kinds.
    #[must_use]
    pub fn protected_directions(&self) -> &[Direction] {
        match self {
            Self::Shielded { protected } => protected,
            Self::Normal | Self::Gold | Self::Skittish { .. } => &[],
        }
    }

    /// Room-local tile the apple wants to jump to this tick.
    #[must_use]
    pub fn move_target(&self) -> Option<Vector2> {
        match self {
            Self::Normal | Self::Shielded { .. } | Self::Gold | Self::Skittish { .. } => None,
        }
    }

    /// Rolls whether the apple tries a directional move this tick.
    pub fn should_attempt_move(&self, rng: &mut SeededRng) -> bool {
        match self {
            Self::Skittish { move_chance } => rng.chance(*move_chance),
            Self::Normal | Self::Shielded { .. } | Self::Gold => false,
        }
    }

    /// Candidate move directions in priority order.
    ///
    /// Skittish apples rank open directions by how far they land from the
    /// head, farthest first, breaking ties randomly. When every direction is
    /// blocked the full set is returned in random order.
    pub fn move_directions(
        &self,
        apple: Vector2,
        head: Vector2,
        is_blocked: impl Fn(Direction) -> bool,
        rng: &mut SeededRng,
    ) -> Vec<Direction> {
        match self {
            Self::Skittish { .. } => flee_order(apple, head, is_blocked, rng),
            Self::Normal | Self::Shielded { .. } | Self::Gold => Vec::new(),
        }
    }
}

fn flee_order(
    apple: Vector2,
    head: Vector2,
    is_blocked: impl Fn(Direction) -> bool,
    rng: &mut SeededRng,
) -> Vec<Direction> {
    let mut ranked: Vec<(u32, f64, Direction)> = Direction::ALL
        .into_iter()
        .filter(|direction| !is_blocked(*direction))
        .map(|direction| {
            let distance = apple.step(direction).manhattan_distance(head);
            (distance, rng.next_f64(), direction)
        })
        .collect();

    if ranked.is_empty() {
        let mut directions = Direction::ALL;
        rng.shuffle(&mut directions);
        return directions.to_vec();
    }

    ranked.sort_by(|left, right| match right.0.cmp(&left.0) {
        Ordering::Equal => left.1.total_cmp(&right.1),
        ordering => ordering,
    });
    ranked.into_iter().map(|(_, _, direction)| direction).collect()
}
