use std::io::Write;

use snake_core::api::User;
use snake_core::game::{GameState, RunMode};
use snake_core::grid::{Grid, PixelRect};
use snake_core::render::{Color, DrawSurface, Theme, render};
use snake_core::toast::MessageKind;

use crate::session::{Display, Frontend};

const EMPTY: char = ' ';

/// Character-cell drawing surface: one glyph per grid cell.
///
/// Circles land on the cell under their center and take the glyph mapped to
/// their color. Text is written centered on the row under its anchor.
/// Lines and translucent fills have no character form and are skipped.
pub struct TextCanvas {
    grid: Grid,
    cells: Vec<char>,
    palette: Vec<(Color, char)>,
}

impl TextCanvas {
    pub fn new(grid: Grid, theme: &Theme) -> Self {
        let n = grid.tile_count() as usize;
        Self {
            grid,
            cells: vec![EMPTY; n * n],
            palette: vec![
                (theme.background, '.'),
                (theme.food, '*'),
                (theme.snake_head, '@'),
                (theme.snake_body, 'o'),
            ],
        }
    }

    fn tiles(&self) -> usize {
        self.grid.tile_count() as usize
    }

    fn glyph(&self, color: Color) -> Option<char> {
        self.palette
            .iter()
            .find(|(c, _)| c.same_rgb(&color))
            .map(|&(_, g)| g)
    }

    fn cell_index(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let size = self.grid.cell_size() as f32;
        let (col, row) = ((x / size) as usize, (y / size) as usize);
        let n = self.tiles();
        (col < n && row < n).then_some(row * n + col)
    }

    /// Glyph at a grid position.
    pub fn glyph_at(&self, col: usize, row: usize) -> char {
        self.cells[row * self.tiles() + col]
    }

    /// Rows of glyphs, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.tiles())
            .map(|row| row.iter().collect())
            .collect()
    }
}

impl DrawSurface for TextCanvas {
    fn clear(&mut self, color: Color) {
        let glyph = self.glyph(color).unwrap_or(EMPTY);
        self.cells.fill(glyph);
    }

    fn fill_rect(&mut self, _rect: PixelRect, _color: Color) {}

    fn fill_circle(&mut self, cx: f32, cy: f32, _radius: f32, color: Color) {
        if let Some(glyph) = self.glyph(color)
            && let Some(i) = self.cell_index(cx, cy)
        {
            self.cells[i] = glyph;
        }
    }

    fn stroke_line(&mut self, _from: (f32, f32), _to: (f32, f32), _color: Color) {}

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _size: f32, _color: Color) {
        let Some(anchor) = self.cell_index(x.max(0.0), y.max(0.0)) else {
            return;
        };
        let n = self.tiles();
        let row = anchor / n;
        let chars: Vec<char> = text.chars().take(n).collect();
        let start = (anchor % n).saturating_sub(chars.len() / 2).min(n - chars.len());
        for (offset, ch) in chars.into_iter().enumerate() {
            self.cells[row * n + start + offset] = ch;
        }
    }
}

/// Draws frames and the side panel to stdout.
pub struct TerminalFrontend {
    theme: Theme,
}

impl TerminalFrontend {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Full screen text for one frame.
    pub fn compose(&self, state: &GameState, user: Option<&User>, display: &Display) -> String {
        let mut canvas = TextCanvas::new(*state.grid(), &self.theme);
        render(state, &self.theme, &mut canvas);

        let width = canvas.tiles();
        let mut out = String::new();
        out.push_str(&format!("+{}+\n", "-".repeat(width)));
        for line in canvas.lines() {
            out.push_str(&format!("|{line}|\n"));
        }
        out.push_str(&format!("+{}+\n", "-".repeat(width)));

        let mode = match state.mode {
            RunMode::Idle => "pronto",
            RunMode::Running => "jogando",
            RunMode::Paused => "pausado",
            RunMode::Ended => "fim de jogo",
        };
        out.push_str(&format!("Pontuação: {}  [{mode}]\n", state.score));

        if let Some(user) = user {
            out.push_str(&format!(
                "Jogador: {}  Melhor: {}\n",
                user.username,
                display.scoreboard.best_score_text()
            ));
        } else {
            out.push_str("Não conectado (login <usuário> <senha>)\n");
        }

        let board = display.scoreboard.leaderboard_lines();
        if !board.is_empty() {
            out.push_str("Leaderboard:\n");
            for line in board {
                out.push_str(&format!("  {line}\n"));
            }
        }

        for message in display.messages.visible() {
            let marker = match message.kind {
                MessageKind::Success => '+',
                MessageKind::Error => '!',
            };
            out.push_str(&format!("{marker} {}\n", message.text));
        }
        out
    }
}

impl Frontend for TerminalFrontend {
    fn draw(&mut self, state: &GameState, user: Option<&User>, display: &Display) {
        let frame = self.compose(state, user, display);
        let mut stdout = std::io::stdout().lock();
        // Clear screen and home the cursor
        if let Err(e) = write!(stdout, "\x1b[2J\x1b[H{frame}").and_then(|()| stdout.flush()) {
            tracing::debug!(error = %e, "Failed to write frame");
        }
    }
}
