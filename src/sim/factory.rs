//! Initial layout and token construction.
//!
//! Computes an evenly spaced grid of home positions that fits the canvas,
//! keeps that list for the lifetime of the simulation, and builds fresh
//! tokens for both the initial population and every respawn.

use tracing::{debug, warn};

use crate::config::{ConfigError, Facing, SimConfig};
use crate::sim::token::Token;
use crate::util::vec2::Vec2;

#[derive(Debug)]
pub struct TokenFactory {
    token_size: Vec2,
    facing: Facing,
    homes: Vec<Vec2>,
}

impl TokenFactory {
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let token_size = Vec2::new(config.init_token.width, config.init_token.height);
        if token_size.x <= 0.0 || token_size.y <= 0.0 {
            return Err(ConfigError::InvalidTokenSize {
                width: token_size.x,
                height: token_size.y,
            });
        }
        let canvas = Vec2::new(config.init_canvas.width, config.init_canvas.height);
        if canvas.x <= 0.0 || canvas.y <= 0.0 {
            return Err(ConfigError::InvalidCanvas {
                width: canvas.x,
                height: canvas.y,
            });
        }

        let homes = grid_layout(canvas, token_size, config.init_canvas.min_padding);
        debug!(
            tokens = homes.len(),
            canvas_w = canvas.x,
            canvas_h = canvas.y,
            "computed initial token layout"
        );

        Ok(TokenFactory {
            token_size,
            facing: config.tokens.facing,
            homes,
        })
    }

    /// Number of home positions, which is the population size.
    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }

    /// Home position for a slot, if the slot is within the layout.
    pub fn home(&self, slot: usize) -> Option<Vec2> {
        self.homes.get(slot).copied()
    }

    /// Build a fresh token anchored at `home`.
    pub fn create_at(&self, home: Vec2) -> Token {
        Token::new(home, self.token_size, self.facing)
    }

    /// One token per home position, all alive and fully opaque.
    pub fn create_initial(&self) -> Vec<Option<Token>> {
        self.homes
            .iter()
            .map(|&home| Some(self.create_at(home)))
            .collect()
    }
}

/// Largest cols x rows arrangement of `token`-sized cells that fits `canvas`
/// with at least `min_padding` between cells and to every edge, spacing
/// distributed evenly. Shrinks by one column/row when even spacing would
/// drop below the padding floor.
fn grid_layout(canvas: Vec2, token: Vec2, min_padding: f32) -> Vec<Vec2> {
    let padding = min_padding.max(0.0);

    let max_cols = ((canvas.x - 2.0 * padding) / (token.x + padding)).floor() as i32;
    let max_rows = ((canvas.y - 2.0 * padding) / (token.y + padding)).floor() as i32;
    let mut cols = max_cols.max(0);
    let mut rows = max_rows.max(0);

    if cols == 0 || rows == 0 {
        warn!(
            canvas_w = canvas.x,
            canvas_h = canvas.y,
            "canvas too small for any token, layout is empty"
        );
        return Vec::new();
    }

    if even_spacing(canvas.x, token.x, cols) < padding {
        cols = (cols - 1).max(1);
    }
    if even_spacing(canvas.y, token.y, rows) < padding {
        rows = (rows - 1).max(1);
    }

    let spacing_x = even_spacing(canvas.x, token.x, cols);
    let spacing_y = even_spacing(canvas.y, token.y, rows);

    let mut homes = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let x = spacing_x + col as f32 * (token.x + spacing_x) + token.x / 2.0;
            let y = spacing_y + row as f32 * (token.y + spacing_y) + token.y / 2.0;
            homes.push(Vec2::new(x, y));
        }
    }
    homes
}

/// Gap between `count` cells (and the edges) when the leftover span is
/// shared across `count + 1` gaps.
fn even_spacing(span: f32, cell: f32, count: i32) -> f32 {
    (span - count as f32 * cell) / (count + 1) as f32
}
