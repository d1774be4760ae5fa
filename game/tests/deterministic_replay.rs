use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use snake_rooms_core::{Direction, GameConfig, Vector2};
use snake_rooms_game::{Game, StepResult};

const SCRIPT: [Direction; 6] = [
    Direction::Right,
    Direction::Down,
    Direction::Right,
    Direction::Up,
    Direction::Left,
    Direction::Up,
];

struct Replay {
    results: Vec<StepResult>,
    bodies: Vec<Vec<Vector2>>,
    layouts: Vec<Vec<String>>,
}

impl Replay {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.bodies.hash(&mut hasher);
        self.layouts.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay(seed: &str, ticks: usize) -> Replay {
    let config = GameConfig {
        seed: Some(seed.to_owned()),
        ..GameConfig::default()
    };
    let mut game = Game::new(config).expect("default config is valid");
    let mut replay = Replay {
        results: Vec::with_capacity(ticks),
        bodies: Vec::with_capacity(ticks),
        layouts: Vec::new(),
    };

    for tick in 0..ticks {
        if tick % 4 == 0 {
            let _ = game.set_direction(SCRIPT[(tick / 4) % SCRIPT.len()]);
        }
        let result = game.step(false);
        if result.quest_offer.is_some() && tick % 2 == 0 {
            let _ = game.accept_quest();
        }
        let alive = result.is_alive();
        if result.room_changed {
            if let Some(room) = game.current_room() {
                replay.layouts.push(room.layout_rows());
            }
        }
        replay.results.push(result);
        replay.bodies.push(game.body().to_vec());
        if !alive {
            game.reset();
        }
    }
    replay
}

#[test]
fn same_seed_and_inputs_replay_identically() {
    let first = replay("replay", 500);
    let second = replay("replay", 500);
    assert_eq!(first.results, second.results);
    assert_eq!(first.bodies, second.bodies);
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn different_seeds_build_different_worlds() {
    let layout = |seed: &str| {
        let game = Game::new(GameConfig {
            seed: Some(seed.to_owned()),
            ..GameConfig::default()
        })
        .expect("default config is valid");
        game.current_room()
            .map(|room| room.layout_rows())
            .expect("origin room is generated on reset")
    };
    assert_ne!(layout("alpha"), layout("omega"));
}
