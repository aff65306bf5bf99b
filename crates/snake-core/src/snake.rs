use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// Axis a heading moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Cardinal heading on the grid. Screen coordinates: y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step `(dx, dy)` for this heading.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// A turn is allowed only onto the other axis. Same-axis requests
    /// (repeat or 180° reversal) are rejected.
    pub fn can_turn_to(self, next: Direction) -> bool {
        self.axis() != next.axis()
    }
}

/// The snake's body, head first. Cells are unique while the snake is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// A one-segment snake at `start`.
    pub fn new(start: Cell) -> Self {
        Self {
            body: VecDeque::from([start]),
        }
    }

    /// Build a snake from explicit segments, head first.
    /// Returns `None` for an empty body.
    pub fn from_segments(segments: impl IntoIterator<Item = Cell>) -> Option<Self> {
        let body: VecDeque<Cell> = segments.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        Some(Self { body })
    }

    pub fn head(&self) -> Cell {
        // Body is never empty: constructors guarantee one segment and
        // `advance` pushes before it pops.
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    /// Cell the head would move into along `direction`.
    pub fn next_head(&self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        self.head().offset(dx, dy)
    }

    /// Prepend `new_head`; drop the tail unless `grow` is set.
    pub fn advance(&mut self, new_head: Cell, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }
}
