pub mod api;
pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod render;
pub mod scoreboard;
pub mod snake;
pub mod toast;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::api::LeaderboardEntry;
    use crate::game::{GameRules, SnakeGame};
    use crate::grid::Cell;
    use crate::snake::{Direction, Snake};

    /// Seeded game on the default grid with an explicit body (head first),
    /// heading and food cell. Left Idle.
    pub fn make_game(segments: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> SnakeGame {
        let mut game = SnakeGame::new(GameRules::default(), Some(0));
        let state = game.state_mut();
        state.snake = Snake::from_segments(segments.iter().map(|&(x, y)| Cell::new(x, y)))
            .expect("segments must not be empty");
        state.direction = direction;
        state.food = Some(Cell::new(food.0, food.1));
        game
    }

    /// A running game one tick away from hitting the left wall with `score`.
    pub fn make_doomed_game(score: u32) -> SnakeGame {
        let mut game = make_game(&[(0, 10)], Direction::Left, (15, 15));
        game.state_mut().score = score;
        game.start();
        game
    }

    /// `n` leaderboard rows with descending scores.
    pub fn make_entries(n: u32) -> Vec<LeaderboardEntry> {
        (1..=n)
            .map(|rank| LeaderboardEntry {
                rank,
                username: format!("player{rank}"),
                score: (n - rank + 1) * 10,
            })
            .collect()
    }
}
