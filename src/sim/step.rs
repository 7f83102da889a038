//! Frame orchestration.
//!
//! [`Simulation::step`] is the single entry point: the host owns the frame
//! clock and the slot array, the engine owns everything else (grid, respawn
//! queue, factory, counters). Single-threaded by design; determinism comes
//! from fixed iteration order and the frame-start grid snapshot.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::config::{ConfigError, SimConfig, SpawnBehavior};
use crate::sim::factory::TokenFactory;
use crate::sim::performance::StepMonitor;
use crate::sim::respawn::RespawnScheduler;
use crate::sim::spatial::{GridEntry, SpatialGrid};
use crate::sim::systems::{collision, forces, lifecycle};
use crate::sim::token::Token;
use crate::util::vec2::Vec2;

const DEFAULT_TARGET_FPS: u32 = 60;

/// Pointer input for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Per-frame counters, reset at the start of every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Neighbor entries returned by the collision candidate queries.
    pub collision_candidates: usize,
    /// Exact intensity evaluations performed.
    pub collision_checks: usize,
    pub bounces: usize,
    pub deaths: usize,
    pub respawns: usize,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    canvas: Vec2,
    grid: SpatialGrid,
    respawner: RespawnScheduler,
    factory: TokenFactory,
    monitor: StepMonitor,
    /// Simulation seconds accumulated from `dt`; the respawn clock.
    clock: f64,
    stats: FrameStats,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let factory = TokenFactory::new(&config)?;
        let canvas = Vec2::new(config.init_canvas.width, config.init_canvas.height);

        // Cell size covers the largest collision body with room to spare,
        // so the 3x3 neighbor window always contains every possible contact.
        let cell_size = config.init_token.width.max(config.init_token.height)
            * config.tokens.collision.bounds_scale
            * 2.0;

        Ok(Simulation {
            respawner: RespawnScheduler::new(config.timing.respawn_delay_sec),
            grid: SpatialGrid::new(cell_size),
            monitor: StepMonitor::new(DEFAULT_TARGET_FPS),
            factory,
            canvas,
            config,
            clock: 0.0,
            stats: FrameStats::default(),
        })
    }

    /// The initial population, one token per home position in the layout.
    pub fn spawn_initial(&self) -> Vec<Option<Token>> {
        self.factory.create_initial()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    /// Accumulated simulation time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Counters from the most recent step.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn monitor(&self) -> &StepMonitor {
        &self.monitor
    }

    /// Advance the simulation by `dt` seconds, mutating `slots` in place.
    /// All neighbor-sensitive reads go through the frame-start grid
    /// snapshot, so iteration order never changes the outcome.
    pub fn step(&mut self, dt: f32, pointer: PointerState, slots: &mut [Option<Token>]) -> FrameStats {
        self.monitor.begin();
        self.clock += f64::from(dt);
        self.stats = FrameStats::default();

        self.grid.rebuild(slots);

        for slot in 0..slots.len() {
            let Some(token) = slots[slot].as_mut() else {
                continue;
            };
            token.accumulated_force = Vec2::ZERO;

            if self.config.tokens.flocking.enabled {
                let neighbors: SmallVec<[GridEntry; 16]> = self
                    .grid
                    .query_radius(token.position, self.config.tokens.flocking.radius)
                    .filter(|entry| entry.slot != slot)
                    .copied()
                    .collect();
                forces::apply_flocking(token, &neighbors, &self.config.tokens.flocking);
            }

            forces::apply_pointer_force(
                token,
                pointer.position,
                pointer.velocity,
                &self.config.pointer_force,
            );
            forces::apply_orientation(token, pointer.position, &self.config.tokens);
            forces::apply_homing(token, dt, &self.config.tokens.finds_home);

            if self.config.tokens.collision.enabled {
                for entry in self.grid.query_neighbors(slot, token.position) {
                    self.stats.collision_candidates += 1;
                    self.stats.collision_checks += 1;
                    if collision::check_bounce(
                        token,
                        entry,
                        &self.config.tokens.collision,
                        self.config.timing.respawn_collision_delay_sec,
                    ) {
                        self.stats.bounces += 1;
                        break;
                    }
                }
            }

            lifecycle::integrate(token, dt, self.canvas, &self.config);

            if !token.alive {
                debug!(slot, "token died, scheduling respawn");
                self.stats.deaths += 1;
                self.respawner.schedule(slot, self.clock);
                slots[slot] = None;
            }
        }

        for slot in self.respawner.drain_due(self.clock) {
            if slot >= slots.len() {
                warn!(slot, "respawn slot out of range, dropping");
                continue;
            }
            let home = self.factory.home(slot).unwrap_or_else(|| {
                warn!(slot, "no home position for slot, using canvas center");
                self.canvas * 0.5
            });
            let mut token = self.factory.create_at(home);
            match self.config.tokens.spawn_behavior {
                SpawnBehavior::InstantIn => token.opacity = 255,
                SpawnBehavior::FadeIn => {
                    token.opacity = 0;
                    token.fade_timer = 0.0;
                }
            }
            slots[slot] = Some(token);
            self.stats.respawns += 1;
        }

        if self.config.tokens.spawn_behavior == SpawnBehavior::FadeIn {
            let fade_duration = self.config.animation.fade_in_duration_sec();
            for token in slots.iter_mut().flatten() {
                lifecycle::advance_fade(token, dt, fade_duration);
            }
        }

        self.monitor.end();
        self.stats
    }
}
