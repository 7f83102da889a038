//! Simulation configuration.
//!
//! Hosts hand over a JSON document; every key is optional and falls back to a
//! documented default, so a sparse or empty document is always valid. Only
//! structurally impossible values (non-positive canvas or token dimensions)
//! are rejected, and only at construction time — a running simulation never
//! fails on configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("canvas dimensions must be positive, got {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("token dimensions must be positive, got {width}x{height}")]
    InvalidTokenSize { width: f32, height: f32 },

    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Spawn-time orientation of a token, used as a rotation baseline when the
/// token turns to face the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Top,
    Right,
    Bottom,
    Left,
}

impl Facing {
    /// Degrees to add to an atan2-derived angle so the token's artwork faces
    /// the target.
    pub fn offset_degrees(self) -> f32 {
        match self {
            Facing::Top => 90.0,
            Facing::Right => 0.0,
            Facing::Bottom => -90.0,
            Facing::Left => 180.0,
        }
    }
}

/// Distance falloff curve for the pointer force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Falloff {
    #[default]
    Linear,
    Inverse,
    Quadratic,
    Smoothstep,
    /// Full strength at any distance inside the radius.
    Constant,
}

impl Falloff {
    /// Evaluate the curve for a distance `d` inside `max_distance`.
    /// Callers guarantee `0 < d < max_distance`.
    pub fn evaluate(self, d: f32, max_distance: f32) -> f32 {
        let t = (1.0 - d / max_distance).clamp(0.0, 1.0);
        match self {
            Falloff::Linear => t,
            Falloff::Inverse => 1.0 / (d + 1.0),
            Falloff::Quadratic => t * t,
            Falloff::Smoothstep => t * t * (3.0 - 2.0 * t),
            Falloff::Constant => 1.0,
        }
    }
}

/// Collision geometry used for intensity and separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionKind {
    #[default]
    Circle,
    Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerForceConfig {
    pub enabled: bool,
    /// Influence radius in canvas units.
    pub max_distance: f32,
    pub force_strength: f32,
    pub falloff: Falloff,
}

impl Default for PointerForceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_distance: 200.0,
            force_strength: 1.0,
            falloff: Falloff::Linear,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockingConfig {
    pub enabled: bool,
    /// Neighbor search radius in canvas units.
    pub radius: f32,
    pub cohesion: f32,
    pub alignment: f32,
    pub separation: f32,
}

impl Default for FlockingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 100.0,
            cohesion: 0.5,
            alignment: 0.5,
            separation: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub enabled: bool,
    /// Seconds without any applied force before the pull toward home starts.
    pub delay_sec: f32,
    pub strength: f32,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_sec: 2.0,
            strength: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: CollisionKind,
    /// Shrinks (or grows) the collision body relative to the sprite.
    pub bounds_scale: f32,
    /// Minimum overlap intensity that triggers a bounce.
    pub threshold: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: CollisionKind::Circle,
            bounds_scale: 0.8,
            threshold: 0.3,
        }
    }
}

/// How a freshly (re)spawned token becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnBehavior {
    #[default]
    FadeIn,
    InstantIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub facing: Facing,
    pub look_at_pointer: bool,
    pub rotation_offset_degrees: f32,
    pub enable_wall_bounce: bool,
    pub spawn_behavior: SpawnBehavior,
    pub flocking: FlockingConfig,
    pub finds_home: HomeConfig,
    pub collision: CollisionConfig,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Top,
            look_at_pointer: false,
            rotation_offset_degrees: 0.0,
            enable_wall_bounce: false,
            spawn_behavior: SpawnBehavior::FadeIn,
            flocking: FlockingConfig::default(),
            finds_home: HomeConfig::default(),
            collision: CollisionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub bounce_duration_ms: f32,
    /// Peak size multiplier at the midpoint of a bounce.
    pub bounce_scale: f32,
    pub fade_in_duration_ms: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            bounce_duration_ms: 150.0,
            bounce_scale: 1.2,
            fade_in_duration_ms: 300.0,
        }
    }
}

impl AnimationConfig {
    pub fn bounce_duration_sec(&self) -> f32 {
        self.bounce_duration_ms / 1000.0
    }

    pub fn fade_in_duration_sec(&self) -> f32 {
        self.fade_in_duration_ms / 1000.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Velocity retained along the reflected axis after a wall bounce.
    pub bounce_factor: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { bounce_factor: 0.8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds between a death and the slot's respawn.
    pub respawn_delay_sec: f32,
    /// Post-respawn grace period during which a token cannot bounce.
    pub respawn_collision_delay_sec: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            respawn_delay_sec: 1.5,
            respawn_collision_delay_sec: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    /// Minimum gap between tokens (and to the edges) in the initial layout.
    pub min_padding: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            min_padding: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSizeConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for TokenSizeConfig {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 64.0,
        }
    }
}

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    #[serde(alias = "mouse_force")]
    pub pointer_force: PointerForceConfig,
    pub tokens: TokenConfig,
    pub animation: AnimationConfig,
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub init_canvas: CanvasConfig,
    pub init_token: TokenSizeConfig,
}

impl SimConfig {
    /// Parse a JSON document and validate it. Unknown keys are ignored,
    /// missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural requirements and clamp soft values in place of
    /// rejecting them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.init_canvas.width <= 0.0 || self.init_canvas.height <= 0.0 {
            return Err(ConfigError::InvalidCanvas {
                width: self.init_canvas.width,
                height: self.init_canvas.height,
            });
        }
        if self.init_token.width <= 0.0 || self.init_token.height <= 0.0 {
            return Err(ConfigError::InvalidTokenSize {
                width: self.init_token.width,
                height: self.init_token.height,
            });
        }

        if self.pointer_force.max_distance <= 0.0 && self.pointer_force.enabled {
            warn!(
                max_distance = self.pointer_force.max_distance,
                "pointer force enabled with non-positive max_distance, force will never apply"
            );
        }
        if self.tokens.flocking.radius <= 0.0 && self.tokens.flocking.enabled {
            warn!(
                radius = self.tokens.flocking.radius,
                "flocking enabled with non-positive radius, no neighbors will qualify"
            );
        }
        if !(0.0..=1.0).contains(&self.tokens.collision.threshold) {
            warn!(
                threshold = self.tokens.collision.threshold,
                "collision threshold outside [0, 1]"
            );
        }

        Ok(())
    }
}
