use serde::{Deserialize, Serialize};

use crate::game::RunMode;
use crate::snake::Direction;

/// A player command delivered to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Start,
    Reset,
}

/// Result of routing one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub command: Option<Command>,
    /// The host should suppress the key's default action (page scroll).
    pub prevent_default: bool,
}

/// Map a DOM-style key name onto a game command. Only the arrow keys and
/// space are bound; everything else is ignored.
pub fn map_key(key: &str) -> Option<Command> {
    match key {
        "ArrowUp" => Some(Command::Turn(Direction::Up)),
        "ArrowDown" => Some(Command::Turn(Direction::Down)),
        "ArrowLeft" => Some(Command::Turn(Direction::Left)),
        "ArrowRight" => Some(Command::Turn(Direction::Right)),
        " " | "Space" | "Spacebar" => Some(Command::TogglePause),
        _ => None,
    }
}

/// Route a key press given the current run mode.
///
/// Bound keys always yield their command; the game itself drops the ones
/// that do not apply. The default action is suppressed only while a run is
/// in progress.
pub fn handle_key(key: &str, mode: RunMode) -> KeyOutcome {
    let Some(command) = map_key(key) else {
        return KeyOutcome {
            command: None,
            prevent_default: false,
        };
    };
    let active = matches!(mode, RunMode::Running | RunMode::Paused);
    KeyOutcome {
        command: Some(command),
        prevent_default: active,
    }
}
