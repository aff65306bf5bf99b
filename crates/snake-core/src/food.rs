use rand::Rng;

use crate::grid::{Cell, Grid};
use crate::snake::Snake;

/// Pick a uniformly random free cell for the next food item.
///
/// Draws over the whole grid and redraws whenever the cell is occupied by the
/// snake. Returns `None` when the snake covers every cell, since rejection
/// sampling would never terminate.
pub fn spawn_food<R: Rng + ?Sized>(grid: &Grid, snake: &Snake, rng: &mut R) -> Option<Cell> {
    if snake.len() >= grid.cell_count() {
        return None;
    }
    let n = grid.tile_count();
    loop {
        let cell = Cell::new(rng.random_range(0..n), rng.random_range(0..n));
        if !snake.contains(cell) {
            return Some(cell);
        }
    }
}
