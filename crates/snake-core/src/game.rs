use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::food::spawn_food;
use crate::grid::{Cell, Grid};
use crate::snake::{Direction, Snake};

/// Points awarded per food item eaten.
pub const FOOD_REWARD: u32 = 10;

/// Run mode of a game. The tick timer exists only while Running or Paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    #[default]
    Idle,
    Running,
    Paused,
    Ended,
}

impl RunMode {
    /// Whether a tick timer should be alive in this mode.
    pub fn has_timer(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

/// Events emitted by a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    FoodEaten { score: u32 },
    GameOver { reason: DeathReason, final_score: u32 },
}

/// Fixed parameters of a game: playfield, spawn point and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub grid: Grid,
    pub start: Cell,
    pub start_direction: Direction,
    pub food_reward: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            start: Cell::new(10, 10),
            start_direction: Direction::Right,
            food_reward: FOOD_REWARD,
        }
    }
}

/// Complete state of one game. Mutated only through the methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub rules: GameRules,
    pub snake: Snake,
    pub direction: Direction,
    /// `None` only when the snake fills the grid.
    pub food: Option<Cell>,
    pub score: u32,
    pub mode: RunMode,
    pub death_reason: Option<DeathReason>,
}

impl GameState {
    /// Fresh Idle state with food placed on a free cell.
    pub fn new<R: Rng + ?Sized>(rules: GameRules, rng: &mut R) -> Self {
        let snake = Snake::new(rules.start);
        let food = spawn_food(&rules.grid, &snake, rng);
        Self {
            rules,
            snake,
            direction: rules.start_direction,
            food,
            score: 0,
            mode: RunMode::Idle,
            death_reason: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.rules.grid
    }

    /// Reinitialize snake, heading, food and score; back to Idle.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::new(self.rules, rng);
        tracing::info!("Game reset");
    }

    /// Begin a run. Refused while a run is already in progress (Running or
    /// Paused). Starting from Ended resets first.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match self.mode {
            RunMode::Running | RunMode::Paused => false,
            RunMode::Ended => {
                self.reset(rng);
                self.mode = RunMode::Running;
                tracing::info!("Game restarted");
                true
            },
            RunMode::Idle => {
                self.mode = RunMode::Running;
                tracing::info!("Game started");
                true
            },
        }
    }

    /// Flip Running <-> Paused. No effect in Idle or Ended.
    pub fn toggle_pause(&mut self) -> bool {
        self.mode = match self.mode {
            RunMode::Running => RunMode::Paused,
            RunMode::Paused => RunMode::Running,
            RunMode::Idle | RunMode::Ended => return false,
        };
        tracing::info!(mode = ?self.mode, "Pause toggled");
        true
    }

    /// Request a new heading. Dropped while Paused or Ended, and whenever the
    /// request stays on the current axis. The last accepted request before a
    /// tick wins.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if matches!(self.mode, RunMode::Paused | RunMode::Ended) {
            return false;
        }
        if !self.direction.can_turn_to(direction) {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Advance the simulation one step. No-op unless Running.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        if self.mode != RunMode::Running {
            return Vec::new();
        }

        let next = self.snake.next_head(self.direction);

        if !self.rules.grid.contains(next) {
            return vec![self.end(DeathReason::WallCollision)];
        }
        // Checked against the pre-move body, tail included.
        if self.snake.contains(next) {
            return vec![self.end(DeathReason::SelfCollision)];
        }

        let ate = self.food == Some(next);
        self.snake.advance(next, ate);

        if !ate {
            return Vec::new();
        }

        self.score += self.rules.food_reward;
        self.food = spawn_food(&self.rules.grid, &self.snake, rng);
        tracing::debug!(score = self.score, length = self.snake.len(), "Food eaten");
        if self.food.is_none() {
            tracing::info!("Snake fills the grid, no room for food");
        }
        vec![GameEvent::FoodEaten { score: self.score }]
    }

    fn end(&mut self, reason: DeathReason) -> GameEvent {
        self.mode = RunMode::Ended;
        self.death_reason = Some(reason);
        tracing::info!(?reason, score = self.score, "Game over");
        GameEvent::GameOver {
            reason,
            final_score: self.score,
        }
    }
}

/// A [`GameState`] bundled with the random source its food spawner draws from.
pub struct SnakeGame {
    state: GameState,
    rng: StdRng,
}

impl SnakeGame {
    /// Deterministic when `seed` is set; otherwise seeded from the OS.
    pub fn new(rules: GameRules, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = GameState::new(rules, &mut rng);
        Self { state, rng }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for setting up scenarios.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn mode(&self) -> RunMode {
        self.state.mode
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn start(&mut self) -> bool {
        self.state.start(&mut self.rng)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state.toggle_pause()
    }

    pub fn reset(&mut self) {
        self.state.reset(&mut self.rng);
    }

    pub fn turn(&mut self, direction: Direction) -> bool {
        self.state.turn(direction)
    }

    pub fn tick(&mut self) -> Vec<GameEvent> {
        self.state.tick(&mut self.rng)
    }
}
