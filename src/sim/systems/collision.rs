//! Pairwise collision intensity, separation, and the bounce trigger.

use tracing::trace;

use crate::config::{CollisionConfig, CollisionKind};
use crate::sim::spatial::GridEntry;
use crate::sim::token::Token;
use crate::util::vec2::Vec2;

/// Guards the rectangle area ratio against zero-area degenerate bodies.
const MIN_AREA: f32 = 1e-6;

/// Overlap intensity in [0, 1] between two bodies. Zero means no contact,
/// 1.0 means fully coincident.
pub fn intensity(
    a_position: Vec2,
    a_size: Vec2,
    b_position: Vec2,
    b_size: Vec2,
    kind: CollisionKind,
    bounds_scale: f32,
) -> f32 {
    match kind {
        CollisionKind::Circle => {
            let radius_a = a_size.x.min(a_size.y) / 2.0 * bounds_scale;
            let radius_b = b_size.x.min(b_size.y) / 2.0 * bounds_scale;
            let combined = radius_a + radius_b;
            if combined <= 0.0 {
                return 0.0;
            }
            let distance = a_position.distance_to(b_position);
            if distance >= combined {
                return 0.0;
            }
            // Coincident centers yield exactly 1.0 with no division hazard.
            1.0 - distance / combined
        }
        CollisionKind::Rect => {
            let half_a = a_size * (bounds_scale * 0.5);
            let half_b = b_size * (bounds_scale * 0.5);
            let delta = (a_position - b_position).abs();
            let overlap_x = half_a.x + half_b.x - delta.x;
            let overlap_y = half_a.y + half_b.y - delta.y;
            if overlap_x <= 0.0 || overlap_y <= 0.0 {
                return 0.0;
            }
            let overlap_area = overlap_x * overlap_y;
            let area_a = half_a.x * half_a.y * 4.0;
            let area_b = half_b.x * half_b.y * 4.0;
            let min_area = area_a.min(area_b).max(MIN_AREA);
            (overlap_area / min_area).clamp(0.0, 1.0)
        }
    }
}

/// Separate two overlapping tokens symmetrically, half the penetration each.
/// Circles move along the connecting normal (skipped when centers coincide);
/// rectangles move along the axis of smaller overlap. Returns the intensity
/// that was resolved, zero when the bodies were not in contact.
pub fn resolve(a: &mut Token, b: &mut Token, kind: CollisionKind, bounds_scale: f32) -> f32 {
    let overlap = intensity(
        a.position,
        a.current_size,
        b.position,
        b.current_size,
        kind,
        bounds_scale,
    );
    if overlap <= 0.0 {
        return 0.0;
    }

    match kind {
        CollisionKind::Circle => {
            let combined = a.collision_radius(bounds_scale) + b.collision_radius(bounds_scale);
            let offset = a.position - b.position;
            let distance = offset.length();
            if distance > 0.0 {
                let normal = offset / distance;
                let push = normal * ((combined - distance) * 0.5);
                a.position += push;
                b.position -= push;
            }
        }
        CollisionKind::Rect => {
            let half_a = a.half_extents() * bounds_scale;
            let half_b = b.half_extents() * bounds_scale;
            let delta = a.position - b.position;
            let overlap_x = half_a.x + half_b.x - delta.x.abs();
            let overlap_y = half_a.y + half_b.y - delta.y.abs();
            if overlap_x < overlap_y {
                let push = overlap_x * 0.5 * delta.x.signum();
                a.position.x += push;
                b.position.x -= push;
            } else {
                let push = overlap_y * 0.5 * delta.y.signum();
                a.position.y += push;
                b.position.y -= push;
            }
        }
    }
    overlap
}

/// Per-frame bounce check against one neighbor snapshot. Starts the bounce
/// animation when the overlap crosses the threshold; applies no positional
/// correction. Tokens inside their post-respawn grace period never bounce.
pub fn check_bounce(
    token: &mut Token,
    other: &GridEntry,
    config: &CollisionConfig,
    respawn_grace_sec: f32,
) -> bool {
    if !config.enabled || token.is_colliding {
        return false;
    }
    if token.time_since_respawn < respawn_grace_sec {
        return false;
    }

    let overlap = intensity(
        token.position,
        token.current_size,
        other.position,
        other.size,
        config.kind,
        config.bounds_scale,
    );
    if overlap < config.threshold {
        return false;
    }

    trace!(partner = other.slot, overlap, "bounce triggered");
    token.is_colliding = true;
    token.collision_partner = Some(other.slot);
    token.collision_time = 0.0;
    token.bounce_scale = 1.0;
    true
}
