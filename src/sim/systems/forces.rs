//! Velocity-affecting forces: pointer repulsion, flocking, home-seeking.
//!
//! Each force adds its delta to both `velocity` and `accumulated_force`.
//! Flocking reads neighbor snapshots from the spatial grid, so every token
//! in a step sees the same frame-start neighborhood.

use crate::config::{FlockingConfig, HomeConfig, PointerForceConfig, TokenConfig};
use crate::sim::spatial::GridEntry;
use crate::sim::token::Token;
use crate::util::vec2::Vec2;

/// Push the token away from the pointer. Magnitude scales with the falloff
/// curve and the pointer's speed, so a resting pointer exerts nothing.
pub fn apply_pointer_force(
    token: &mut Token,
    pointer_position: Vec2,
    pointer_velocity: Vec2,
    config: &PointerForceConfig,
) {
    if !config.enabled {
        return;
    }
    let offset = token.position - pointer_position;
    let distance = offset.length();
    if distance <= 0.0 || distance >= config.max_distance {
        return;
    }

    let falloff = config.falloff.evaluate(distance, config.max_distance);
    let magnitude = config.force_strength * falloff * pointer_velocity.length();
    if magnitude <= 0.0 {
        return;
    }

    let delta = offset.normalized() * magnitude;
    token.velocity += delta;
    token.accumulated_force += delta;
    token.time_since_force = 0.0;
}

/// Turn the token toward the pointer. Direct assignment, independent of
/// whether the pointer force itself is enabled.
pub fn apply_orientation(token: &mut Token, pointer_position: Vec2, config: &TokenConfig) {
    if !config.look_at_pointer {
        return;
    }
    let dx = pointer_position.x - token.position.x;
    let dy = pointer_position.y - token.position.y;
    token.rotation =
        dy.atan2(dx).to_degrees() + token.facing.offset_degrees() + config.rotation_offset_degrees;
}

/// Classic cohesion / alignment / separation over grid-snapshot neighbors.
/// Neighbors at distance zero or beyond the radius contribute nothing.
pub fn apply_flocking(token: &mut Token, neighbors: &[GridEntry], config: &FlockingConfig) {
    if !config.enabled || config.radius <= 0.0 {
        return;
    }

    let mut center_sum = Vec2::ZERO;
    let mut velocity_sum = Vec2::ZERO;
    let mut separation_sum = Vec2::ZERO;
    let mut count = 0u32;

    for entry in neighbors {
        let offset = entry.position - token.position;
        let distance = offset.length();
        if distance <= 0.0 || distance >= config.radius {
            continue;
        }
        center_sum += entry.position;
        velocity_sum += entry.velocity;
        // Push away harder from closer neighbors.
        separation_sum += -(offset / distance) * (1.0 - distance / config.radius);
        count += 1;
    }

    if count == 0 {
        return;
    }

    let centroid = center_sum / count as f32;
    let average_velocity = velocity_sum / count as f32;
    let delta = (centroid - token.position) * config.cohesion
        + (average_velocity - token.velocity) * config.alignment
        + separation_sum * config.separation;

    token.velocity += delta;
    token.accumulated_force += delta;
}

/// Pull toward the home position once the token has been undisturbed for
/// the configured delay. Scaled by `dt` so the pull is frame-rate stable.
pub fn apply_homing(token: &mut Token, dt: f32, config: &HomeConfig) {
    if !config.enabled || token.time_since_force <= config.delay_sec {
        return;
    }
    let to_home = token.home - token.position;
    if to_home.length_squared() <= f32::EPSILON {
        return;
    }
    let delta = to_home.normalized() * config.strength * dt;
    token.velocity += delta;
    token.accumulated_force += delta;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Facing, Falloff};

    fn test_token(x: f32, y: f32) -> Token {
        Token::new(Vec2::new(x, y), Vec2::new(64.0, 64.0), Facing::Top)
    }

    fn entry(slot: usize, x: f32, y: f32, vx: f32, vy: f32) -> GridEntry {
        GridEntry {
            slot,
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            size: Vec2::new(64.0, 64.0),
        }
    }

    fn pointer_config(enabled: bool) -> PointerForceConfig {
        PointerForceConfig {
            enabled,
            max_distance: 200.0,
            force_strength: 1.0,
            falloff: Falloff::Linear,
        }
    }

    #[test]
    fn test_pointer_force_pushes_away_and_resets_timer() {
        let mut token = test_token(100.0, 0.0);
        token.time_since_force = 5.0;
        apply_pointer_force(
            &mut token,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            &pointer_config(true),
        );
        // 100 away out of 200: linear falloff 0.5, pointer speed 10.
        assert!((token.velocity.x - 5.0).abs() < 1e-4);
        assert_eq!(token.velocity.y, 0.0);
        assert_eq!(token.time_since_force, 0.0);
        assert_eq!(token.accumulated_force, token.velocity);
    }

    #[test]
    fn test_pointer_force_disabled_or_out_of_range() {
        let mut token = test_token(100.0, 0.0);
        apply_pointer_force(
            &mut token,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            &pointer_config(false),
        );
        assert_eq!(token.velocity, Vec2::ZERO);

        let mut far = test_token(500.0, 0.0);
        apply_pointer_force(
            &mut far,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            &pointer_config(true),
        );
        assert_eq!(far.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_resting_pointer_exerts_nothing() {
        let mut token = test_token(100.0, 0.0);
        token.time_since_force = 5.0;
        apply_pointer_force(&mut token, Vec2::ZERO, Vec2::ZERO, &pointer_config(true));
        assert_eq!(token.velocity, Vec2::ZERO);
        // Timer only resets when a force actually lands.
        assert_eq!(token.time_since_force, 5.0);
    }

    #[test]
    fn test_pointer_at_token_center_is_degenerate_noop() {
        let mut token = test_token(50.0, 50.0);
        apply_pointer_force(
            &mut token,
            Vec2::new(50.0, 50.0),
            Vec2::new(10.0, 0.0),
            &pointer_config(true),
        );
        assert_eq!(token.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_orientation_faces_pointer() {
        let mut token = test_token(0.0, 0.0);
        let mut config = TokenConfig::default();
        config.look_at_pointer = true;

        // Pointer straight right: atan2 = 0, top-facing offset adds 90.
        apply_orientation(&mut token, Vec2::new(10.0, 0.0), &config);
        assert!((token.rotation - 90.0).abs() < 1e-4);

        config.rotation_offset_degrees = 15.0;
        apply_orientation(&mut token, Vec2::new(10.0, 0.0), &config);
        assert!((token.rotation - 105.0).abs() < 1e-4);

        config.look_at_pointer = false;
        token.rotation = 0.0;
        apply_orientation(&mut token, Vec2::new(10.0, 0.0), &config);
        assert_eq!(token.rotation, 0.0);
    }

    #[test]
    fn test_flocking_cohesion_pulls_toward_centroid() {
        let mut token = test_token(0.0, 0.0);
        let config = FlockingConfig {
            enabled: true,
            radius: 100.0,
            cohesion: 1.0,
            alignment: 0.0,
            separation: 0.0,
        };
        let neighbors = vec![entry(1, 30.0, 0.0, 0.0, 0.0), entry(2, 50.0, 0.0, 0.0, 0.0)];
        apply_flocking(&mut token, &neighbors, &config);
        // Centroid at x = 40.
        assert!((token.velocity.x - 40.0).abs() < 1e-4);
        assert_eq!(token.velocity.y, 0.0);
    }

    #[test]
    fn test_flocking_alignment_matches_average_velocity() {
        let mut token = test_token(0.0, 0.0);
        let config = FlockingConfig {
            enabled: true,
            radius: 100.0,
            cohesion: 0.0,
            alignment: 1.0,
            separation: 0.0,
        };
        let neighbors = vec![entry(1, 10.0, 0.0, 4.0, 2.0), entry(2, 20.0, 0.0, 0.0, 2.0)];
        apply_flocking(&mut token, &neighbors, &config);
        assert!((token.velocity.x - 2.0).abs() < 1e-4);
        assert!((token.velocity.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_flocking_separation_pushes_from_close_neighbor() {
        let mut token = test_token(0.0, 0.0);
        let config = FlockingConfig {
            enabled: true,
            radius: 100.0,
            cohesion: 0.0,
            alignment: 0.0,
            separation: 1.0,
        };
        let neighbors = vec![entry(1, 10.0, 0.0, 0.0, 0.0)];
        apply_flocking(&mut token, &neighbors, &config);
        // Away from the neighbor, weighted by 1 - 10/100.
        assert!((token.velocity.x + 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_flocking_ignores_out_of_radius_and_coincident() {
        let mut token = test_token(0.0, 0.0);
        let config = FlockingConfig {
            enabled: true,
            radius: 100.0,
            cohesion: 1.0,
            alignment: 1.0,
            separation: 1.0,
        };
        let neighbors = vec![entry(1, 150.0, 0.0, 5.0, 0.0), entry(2, 0.0, 0.0, 5.0, 0.0)];
        apply_flocking(&mut token, &neighbors, &config);
        assert_eq!(token.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_homing_waits_for_delay() {
        let config = HomeConfig {
            enabled: true,
            delay_sec: 2.0,
            strength: 0.5,
        };
        let mut token = test_token(100.0, 100.0);
        token.position = Vec2::new(200.0, 100.0);

        token.time_since_force = 1.0;
        apply_homing(&mut token, 0.016, &config);
        assert_eq!(token.velocity, Vec2::ZERO);

        token.time_since_force = 3.0;
        apply_homing(&mut token, 0.016, &config);
        // Toward home (negative x), scaled by strength and dt.
        assert!((token.velocity.x + 0.5 * 0.016).abs() < 1e-6);
        assert_eq!(token.velocity.y, 0.0);
    }

    #[test]
    fn test_homing_noop_when_already_home() {
        let config = HomeConfig {
            enabled: true,
            delay_sec: 0.0,
            strength: 0.5,
        };
        let mut token = test_token(100.0, 100.0);
        token.time_since_force = 10.0;
        apply_homing(&mut token, 0.016, &config);
        assert_eq!(token.velocity, Vec2::ZERO);
    }
}
