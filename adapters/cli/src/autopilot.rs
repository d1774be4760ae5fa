//! Greedy steering used when no player drives the snake.

use snake_rooms_core::{Direction, Tile, Vector2};
use snake_rooms_game::Game;

/// Picks the safe heading that brings the head closest to the room's apple.
///
/// Turning is only preferred over going straight when it gets closer.
/// Returns `None` when every heading runs into a wall or the body.
pub(crate) fn choose_direction(game: &Game) -> Option<Direction> {
    let head = game.snake().local_head();
    let heading = game.direction();
    let apple = game.current_apple();

    Direction::ALL
        .into_iter()
        .filter(|direction| *direction != heading.opposite())
        .filter(|direction| is_safe(game, head.step(*direction)))
        .filter(|direction| {
            apple.as_ref().map_or(true, |apple| {
                apple.position != head.step(*direction)
                    || !apple.protected_directions.contains(direction)
            })
        })
        .min_by_key(|direction| {
            let next = head.step(*direction);
            let distance = apple
                .as_ref()
                .map_or(0, |apple| apple.position.manhattan_distance(next));
            (distance, u8::from(*direction != heading))
        })
}

fn is_safe(game: &Game, local: Vector2) -> bool {
    let grid = game.config().grid;
    let global = grid.to_global(game.current_room_id(), local);
    let body = game.body();
    // The tail moves out of the way unless the snake is eating.
    if body[..body.len().saturating_sub(1)].contains(&global) {
        return false;
    }
    if !grid.contains_local(local) {
        return true;
    }
    game.current_room()
        .and_then(|room| room.tile(local))
        .map_or(true, |tile| tile != Tile::Wall)
}
