//! Per-token integration: bounce envelope, movement, size, and boundaries.

use tracing::debug;

use crate::config::SimConfig;
use crate::sim::token::Token;
use crate::util::vec2::Vec2;

/// Fixed per-step velocity damping. Applied once per frame regardless of
/// `dt`, matching the reference behavior the force tuning was calibrated
/// against.
pub const VELOCITY_DAMPING: f32 = 0.9;

/// Advance one token through a frame, in order: bounce timer and size
/// envelope, position integration and damping, rotated bounding box, then
/// boundary handling (wall bounce or off-canvas death).
pub fn integrate(token: &mut Token, dt: f32, canvas: Vec2, config: &SimConfig) {
    advance_bounce(token, dt, config);

    token.position += token.velocity;
    token.velocity *= VELOCITY_DAMPING;
    token.time_since_force += dt;
    token.time_since_respawn += dt;

    token.current_size = bounding_box(token);

    if config.tokens.enable_wall_bounce {
        bounce_off_walls(token, canvas, config.physics.bounce_factor);
    } else if fully_outside(token, canvas) {
        debug!(x = token.position.x, y = token.position.y, "token left the canvas");
        token.alive = false;
    }
}

/// Triangular size envelope: 1.0 at the start, `bounce_scale` at the
/// midpoint, back to 1.0 at the end, then the collision state resets.
fn advance_bounce(token: &mut Token, dt: f32, config: &SimConfig) {
    if !token.is_colliding {
        return;
    }
    token.collision_time += dt;

    let duration = config.animation.bounce_duration_sec();
    if duration <= 0.0 || token.collision_time >= duration {
        token.is_colliding = false;
        token.collision_partner = None;
        token.collision_time = 0.0;
        token.bounce_scale = 1.0;
        return;
    }

    let peak = config.animation.bounce_scale;
    let progress = token.collision_time / duration;
    token.bounce_scale = if progress < 0.5 {
        1.0 + (peak - 1.0) * progress * 2.0
    } else {
        peak - (peak - 1.0) * (progress - 0.5) * 2.0
    };
}

/// Axis-aligned bounding box of the rotated sprite, scaled by the bounce
/// envelope.
fn bounding_box(token: &Token) -> Vec2 {
    let base = if token.rotation != 0.0 {
        let radians = token.rotation.to_radians();
        let cos = radians.cos().abs();
        let sin = radians.sin().abs();
        Vec2::new(
            token.original_size.x * cos + token.original_size.y * sin,
            token.original_size.x * sin + token.original_size.y * cos,
        )
    } else {
        token.original_size
    };
    base * token.bounce_scale
}

/// Clamp to the canvas and reflect the outward velocity component, keeping
/// `bounce_factor` of it. Components already moving inward are untouched.
fn bounce_off_walls(token: &mut Token, canvas: Vec2, bounce_factor: f32) {
    let half = token.half_extents();

    if token.position.x - half.x < 0.0 {
        token.position.x = half.x;
        if token.velocity.x < 0.0 {
            token.velocity.x = -token.velocity.x * bounce_factor;
        }
    } else if token.position.x + half.x > canvas.x {
        token.position.x = canvas.x - half.x;
        if token.velocity.x > 0.0 {
            token.velocity.x = -token.velocity.x * bounce_factor;
        }
    }

    if token.position.y - half.y < 0.0 {
        token.position.y = half.y;
        if token.velocity.y < 0.0 {
            token.velocity.y = -token.velocity.y * bounce_factor;
        }
    } else if token.position.y + half.y > canvas.y {
        token.position.y = canvas.y - half.y;
        if token.velocity.y > 0.0 {
            token.velocity.y = -token.velocity.y * bounce_factor;
        }
    }
}

/// True once the bounding box has entirely left the canvas on any side.
fn fully_outside(token: &Token, canvas: Vec2) -> bool {
    let half = token.half_extents();
    token.position.x + half.x < 0.0
        || token.position.x - half.x > canvas.x
        || token.position.y + half.y < 0.0
        || token.position.y - half.y > canvas.y
}

/// Fade-in pass: opacity ramps linearly to 255 over the configured
/// duration. Fully opaque tokens are left alone.
pub fn advance_fade(token: &mut Token, dt: f32, fade_duration_sec: f32) {
    if !token.alive || token.opacity >= 255 {
        return;
    }
    token.fade_timer += dt;
    let progress = if fade_duration_sec <= 0.0 {
        1.0
    } else {
        (token.fade_timer / fade_duration_sec).min(1.0)
    };
    token.opacity = (255.0 * progress) as u8;
}
