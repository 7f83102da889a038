//! Token entity data.

use crate::config::Facing;
use crate::util::vec2::Vec2;

/// Lifecycle state derived from token flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Normal,
    Colliding,
    Dead,
}

/// A single simulated entity. Plain data; all behavior lives in the
/// per-frame systems. Tokens are referenced exclusively by their slot index
/// in the host's array — never by long-lived references — so a slot can die
/// and be reborn without invalidating anything.
#[derive(Debug, Clone)]
pub struct Token {
    // Hot per-frame state.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Orientation in degrees.
    pub rotation: f32,
    /// Axis-aligned bounding box of the rotated, bounce-scaled sprite.
    pub current_size: Vec2,
    /// Size multiplier driven by the bounce envelope.
    pub bounce_scale: f32,
    pub alive: bool,

    // Collision state machine.
    pub is_colliding: bool,
    /// Slot index of the bounce partner. Informational only; re-validated
    /// at every use since the partner may die or respawn first.
    pub collision_partner: Option<usize>,
    /// Seconds since the current bounce started.
    pub collision_time: f32,

    // Timers.
    pub time_since_force: f32,
    pub time_since_respawn: f32,
    pub fade_timer: f32,
    pub opacity: u8,

    // Cold, fixed at creation.
    pub home: Vec2,
    pub original_size: Vec2,
    pub facing: Facing,

    /// Sum of all velocity deltas applied this frame, for diagnostics.
    pub accumulated_force: Vec2,
}

impl Token {
    pub fn new(home: Vec2, size: Vec2, facing: Facing) -> Self {
        Token {
            position: home,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            current_size: size,
            bounce_scale: 1.0,
            alive: true,
            is_colliding: false,
            collision_partner: None,
            collision_time: 0.0,
            time_since_force: 0.0,
            time_since_respawn: 0.0,
            fade_timer: 0.0,
            opacity: 255,
            home,
            original_size: size,
            facing,
            accumulated_force: Vec2::ZERO,
        }
    }

    pub fn state(&self) -> TokenState {
        if !self.alive {
            TokenState::Dead
        } else if self.is_colliding {
            TokenState::Colliding
        } else {
            TokenState::Normal
        }
    }

    /// Collision circle radius: half the smaller current dimension, scaled.
    pub fn collision_radius(&self, bounds_scale: f32) -> f32 {
        self.current_size.x.min(self.current_size.y) / 2.0 * bounds_scale
    }

    pub fn half_extents(&self) -> Vec2 {
        self.current_size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_normal() {
        let token = Token::new(Vec2::new(10.0, 20.0), Vec2::new(64.0, 64.0), Facing::Top);
        assert_eq!(token.state(), TokenState::Normal);
        assert_eq!(token.position, token.home);
        assert_eq!(token.opacity, 255);
        assert_eq!(token.bounce_scale, 1.0);
        assert!(token.collision_partner.is_none());
    }

    #[test]
    fn test_state_transitions_follow_flags() {
        let mut token = Token::new(Vec2::ZERO, Vec2::new(64.0, 64.0), Facing::Top);
        token.is_colliding = true;
        assert_eq!(token.state(), TokenState::Colliding);
        token.alive = false;
        assert_eq!(token.state(), TokenState::Dead);
    }

    #[test]
    fn test_collision_radius_uses_smaller_dimension() {
        let mut token = Token::new(Vec2::ZERO, Vec2::new(64.0, 32.0), Facing::Top);
        token.current_size = Vec2::new(64.0, 32.0);
        assert_eq!(token.collision_radius(1.0), 16.0);
        assert_eq!(token.collision_radius(0.5), 8.0);
    }
}
