use std::time::Duration;

use snake_rooms_core::{config::TickConfig, GeometrySettings};
use snake_rooms_system_skill_tree::{
    PurchaseState, ReviveSource, SkillRuntime, SkillTree, ARCANE_PULSE_COST,
};

#[derive(Default)]
struct Runtime {
    score: u64,
    grown: u32,
    settings: GeometrySettings,
}

impl Runtime {
    fn with_score(score: u64) -> Self {
        Self {
            score,
            ..Self::default()
        }
    }
}

impl SkillRuntime for Runtime {
    fn score(&self) -> u64 {
        self.score
    }

    fn set_score(&mut self, score: u64) {
        self.score = score;
    }

    fn grow(&mut self, segments: u32) {
        self.grown += segments;
    }

    fn settings_mut(&mut self) -> &mut GeometrySettings {
        &mut self.settings
    }
}

fn tree() -> SkillTree {
    SkillTree::with_defaults(&TickConfig::default()).expect("built-in catalog is valid")
}

#[test]
fn unaffordable_purchase_changes_nothing() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(4);
    assert_eq!(
        tree.purchase_state("swift-scales", runtime.score),
        Some(PurchaseState::Unaffordable { cost: 5 })
    );
    assert!(tree.purchase("swift-scales", &mut runtime).is_none());
    assert_eq!(runtime.score, 4);
    assert_eq!(tree.rank("swift-scales"), 0);
}

#[test]
fn prerequisites_gate_purchases() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(500);
    assert_eq!(
        tree.purchase_state("momentum", runtime.score),
        Some(PurchaseState::Locked)
    );
    assert!(tree.purchase("momentum", &mut runtime).is_none());

    let receipt = tree
        .purchase("swift-scales", &mut runtime)
        .expect("affordable root perk");
    assert_eq!(receipt.rank, 1);
    assert_eq!(receipt.cost, 5);
    assert_eq!(runtime.score, 495);
    assert_eq!(
        tree.purchase_state("momentum", runtime.score),
        Some(PurchaseState::Available { cost: 15 })
    );
    assert!(tree.purchase("momentum", &mut runtime).is_some());
    assert_eq!(tree.purchase_state("unknown", runtime.score), None);
}

#[test]
fn ranks_are_monotonic_until_reset() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(10_000);
    let mut previous = 0;
    for _ in 0..5 {
        let _ = tree.purchase("golden-tongue", &mut runtime);
        let rank = tree.rank("golden-tongue");
        assert!(rank >= previous);
        previous = rank;
    }
    assert_eq!(previous, 3);
    assert_eq!(
        tree.purchase_state("golden-tongue", runtime.score),
        Some(PurchaseState::Maxed)
    );

    tree.reset(&mut runtime);
    assert_eq!(tree.rank("golden-tongue"), 0);
}

#[test]
fn tick_delay_sources_stack_multiplicatively() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(10_000);
    let _ = tree.purchase("swift-scales", &mut runtime);
    let _ = tree.purchase("swift-scales", &mut runtime);
    let _ = tree.purchase("momentum", &mut runtime);
    assert!((tree.tick_multiplier() - 0.85 * 0.9).abs() < 1e-9);
    let expected = Duration::from_millis(120).mul_f64(0.85 * 0.9);
    assert_eq!(tree.tick_delay(), expected);

    for _ in 0..3 {
        let _ = tree.purchase("swift-scales", &mut runtime);
        let _ = tree.purchase("momentum", &mut runtime);
    }
    assert!(tree.tick_delay() >= Duration::from_millis(45));

    tree.reset(&mut runtime);
    assert_eq!(tree.tick_delay(), Duration::from_millis(120));
}

#[test]
fn score_multipliers_compose() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(10_000);
    let _ = tree.purchase("golden-tongue", &mut runtime);
    let _ = tree.purchase("golden-tongue", &mut runtime);
    let _ = tree.purchase("hoarder", &mut runtime);

    let base = 1.5_f64;
    let bonus = 1.2_f64;
    let expected = (10.0 * (base * bonus).max(1.0)).ceil() as u64;
    assert_eq!(tree.modify_score_gain(10), expected.max(1));
    assert_eq!(tree.modify_score_gain(0), 0);
    assert!(tree.modify_score_gain(1) >= 1);
}

#[test]
fn flags_apply_and_reset() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(10_000);
    for perk in ["wall-sense", "masonry", "seismic-pulse", "terra-shield", "world-eater"] {
        assert!(tree.purchase(perk, &mut runtime).is_some(), "could not buy {perk}");
    }
    assert_eq!(runtime.settings.wall_sense_radius, Some(3));
    assert!(runtime.settings.masonry_enabled);
    assert_eq!(runtime.settings.seismic_pulse_radius, Some(1));
    assert_eq!(
        runtime.settings.terra_shield.map(|shield| shield.charges),
        Some(1)
    );
    assert_eq!(runtime.settings.world_eater_reward, Some(5));

    tree.reset(&mut runtime);
    assert_eq!(runtime.settings, GeometrySettings::default());
}

#[test]
fn instant_growth_reaches_the_runtime() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(8);
    assert!(tree.purchase("feast", &mut runtime).is_some());
    assert_eq!(runtime.grown, 3);
    assert_eq!(runtime.score, 0);
}

#[test]
fn extra_lives_are_preferred_over_veil_mana() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(10_000);
    assert_eq!(tree.consume_extra_life(), None);

    let _ = tree.purchase("second-skin", &mut runtime);
    let _ = tree.purchase("arcane-affinity", &mut runtime);
    let _ = tree.purchase("arcane-veil", &mut runtime);
    assert_eq!(tree.extra_lives(), 1);

    assert_eq!(tree.consume_extra_life(), Some(ReviveSource::ExtraLife));
    assert_eq!(tree.consume_extra_life(), Some(ReviveSource::ArcaneVeil));
    assert_eq!(tree.consume_extra_life(), None);
}

#[test]
fn mana_regenerates_and_funds_the_pulse() {
    let mut tree = tree();
    let mut runtime = Runtime::with_score(10_000);
    assert!(!tree.try_cast_arcane_pulse());
    let _ = tree.purchase("arcane-affinity", &mut runtime);
    assert!(!tree.try_cast_arcane_pulse());
    let _ = tree.purchase("arcane-pulse", &mut runtime);

    assert!(tree.try_cast_arcane_pulse());
    assert!(tree.try_cast_arcane_pulse());
    assert!(!tree.try_cast_arcane_pulse());

    let before = tree.mana().map_or(0.0, |pool| pool.current);
    tree.tick();
    let after = tree.mana().map_or(0.0, |pool| pool.current);
    assert!(after > before);
    assert!(after < ARCANE_PULSE_COST);

    let _ = tree.purchase("arcane-affinity", &mut runtime);
    let pool = tree.mana().copied().expect("mana enabled");
    assert!((pool.max - 100.0).abs() < 1e-9);
    assert!(pool.current <= pool.max);
}
