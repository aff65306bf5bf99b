use serde::{Deserialize, Serialize};

use crate::game::{GameState, RunMode};
use crate::grid::PixelRect;

/// Overlay caption shown while paused.
pub const PAUSED_TEXT: &str = "PAUSADO";
/// Overlay caption shown after a collision.
pub const GAME_OVER_TEXT: &str = "GAME OVER";

/// RGBA color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Same channels, ignoring alpha.
    pub fn same_rgb(&self, other: &Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Palette used by the render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    /// `None` disables grid lines.
    pub grid_lines: Option<Color>,
    pub food: Color,
    pub food_glow: Color,
    pub snake_head: Color,
    pub snake_body: Color,
    pub pause_overlay: Color,
    pub game_over_overlay: Color,
    pub overlay_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb(152, 216, 200),
            grid_lines: Some(Color::rgba(255, 255, 255, 0.15)),
            food: Color::rgb(255, 82, 82),
            food_glow: Color::rgba(255, 100, 100, 0.6),
            snake_head: Color::rgb(68, 160, 141),
            snake_body: Color::rgb(78, 205, 196),
            pause_overlay: Color::rgba(0, 0, 0, 0.6),
            game_over_overlay: Color::rgba(0, 0, 0, 0.75),
            overlay_text: Color::rgb(255, 255, 255),
        }
    }
}

/// Drawing capability the render pass targets: a canvas, a terminal or a
/// recorder in tests.
pub trait DrawSurface {
    /// Fill the whole surface.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: PixelRect, color: Color);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color);

    /// Draw `text` centered on `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    FillRect {
        rect: PixelRect,
        color: Color,
    },
    FillCircle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    StrokeLine {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    },
}

/// Surface that records every call, for tests and deferred replay.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// All text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Re-issue the recorded commands onto another surface.
    pub fn replay(&self, target: &mut dyn DrawSurface) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear { color } => target.clear(*color),
                DrawCommand::FillRect { rect, color } => target.fill_rect(*rect, *color),
                DrawCommand::FillCircle {
                    cx,
                    cy,
                    radius,
                    color,
                } => target.fill_circle(*cx, *cy, *radius, *color),
                DrawCommand::StrokeLine { from, to, color } => {
                    target.stroke_line(*from, *to, *color)
                },
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    size,
                    color,
                } => target.draw_text(text, *x, *y, *size, *color),
            }
        }
    }
}

impl DrawSurface for CommandRecorder {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            cx,
            cy,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color) {
        self.commands
            .push(DrawCommand::StrokeLine { from, to, color });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }
}

/// Caption for the final score on the game-over screen.
pub fn final_score_text(score: u32) -> String {
    format!("Pontuação: {score}")
}

/// Draw one frame of `state`: background, grid lines, food, snake (head
/// first) and the pause/game-over overlay.
pub fn render(state: &GameState, theme: &Theme, surface: &mut dyn DrawSurface) {
    let grid = state.grid();
    let canvas = grid.canvas_size() as f32;
    let cell = grid.cell_size() as f32;

    surface.clear(theme.background);

    if let Some(line_color) = theme.grid_lines {
        for i in 1..grid.tile_count() {
            let p = i as f32 * cell;
            surface.stroke_line((p, 0.0), (p, canvas), line_color);
            surface.stroke_line((0.0, p), (canvas, p), line_color);
        }
    }

    if let Some(food) = state.food {
        let (fx, fy) = grid.cell_rect(food).center();
        let radius = cell / 2.0 - 2.0;
        surface.fill_circle(fx, fy, radius * 1.5, theme.food_glow);
        surface.fill_circle(fx, fy, radius, theme.food);
    }

    let len = state.snake.len() as f32;
    let body_radius = cell / 2.0 - 1.0;
    for (index, segment) in state.snake.segments().enumerate() {
        let (sx, sy) = grid.cell_rect(segment).center();
        if index == 0 {
            surface.fill_circle(sx, sy, body_radius + 1.0, theme.snake_head);
        } else {
            // Fade toward the tail, never below 0.6
            let alpha = (1.0 - (index as f32 / len) * 0.3).max(0.6);
            surface.fill_circle(sx, sy, body_radius, theme.snake_body.with_alpha(alpha));
        }
    }

    let full = PixelRect {
        x: 0.0,
        y: 0.0,
        width: canvas,
        height: canvas,
    };
    let mid = canvas / 2.0;
    match state.mode {
        RunMode::Paused => {
            surface.fill_rect(full, theme.pause_overlay);
            surface.draw_text(PAUSED_TEXT, mid, mid, 48.0, theme.overlay_text);
        },
        RunMode::Ended => {
            surface.fill_rect(full, theme.game_over_overlay);
            surface.draw_text(GAME_OVER_TEXT, mid, mid - 40.0, 52.0, theme.overlay_text);
            surface.draw_text(
                &final_score_text(state.score),
                mid,
                mid + 20.0,
                28.0,
                theme.overlay_text,
            );
        },
        RunMode::Idle | RunMode::Running => {},
    }
}
