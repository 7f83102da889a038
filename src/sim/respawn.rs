//! Death-to-respawn scheduling.

use hashbrown::HashMap;
use tracing::debug;

/// Tracks dead slots and the simulation time they died. At most one pending
/// respawn per slot; rescheduling overwrites the old death time.
///
/// Time is an explicit `f64` seconds argument (the orchestrator's
/// accumulated sim clock), never the wall clock, so draining is
/// deterministic and testable.
#[derive(Debug)]
pub struct RespawnScheduler {
    delay_sec: f64,
    pending: HashMap<usize, f64>,
}

impl RespawnScheduler {
    pub fn new(delay_sec: f32) -> Self {
        RespawnScheduler {
            delay_sec: f64::from(delay_sec.max(0.0)),
            pending: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, slot: usize, now: f64) {
        debug!(slot, now, "respawn scheduled");
        self.pending.insert(slot, now);
    }

    /// Remove and return every slot whose delay has elapsed, in ascending
    /// slot order so respawn processing is deterministic.
    pub fn drain_due(&mut self, now: f64) -> Vec<usize> {
        let mut due: Vec<usize> = self
            .pending
            .iter()
            .filter(|(_, &death_time)| now - death_time >= self.delay_sec)
            .map(|(&slot, _)| slot)
            .collect();
        due.sort_unstable();
        for slot in &due {
            self.pending.remove(slot);
        }
        due
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_scheduled(&self, slot: usize) -> bool {
        self.pending.contains_key(&slot)
    }
}
