//! Step timing instrumentation.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const SAMPLE_WINDOW: usize = 120;

/// Records step wall-times in a rolling window and reports aggregate timing
/// against a target frame budget. Purely observational.
#[derive(Debug)]
pub struct StepMonitor {
    samples: VecDeque<Duration>,
    budget: Duration,
    in_progress: Option<Instant>,
}

impl StepMonitor {
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        StepMonitor {
            samples: VecDeque::with_capacity(SAMPLE_WINDOW),
            budget: Duration::from_secs(1) / target_fps,
            in_progress: None,
        }
    }

    pub fn begin(&mut self) {
        self.in_progress = Some(Instant::now());
    }

    pub fn end(&mut self) {
        if let Some(start) = self.in_progress.take() {
            if self.samples.len() == SAMPLE_WINDOW {
                self.samples.pop_front();
            }
            self.samples.push_back(start.elapsed());
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// 95th percentile step time over the window.
    pub fn p95(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<Duration> = self.samples.iter().copied().collect();
        sorted.sort_unstable();
        let index = ((sorted.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);
        sorted[index]
    }

    /// Average step time as a percentage of the frame budget.
    pub fn budget_usage_percent(&self) -> f64 {
        if self.budget.is_zero() {
            return 0.0;
        }
        self.average().as_secs_f64() / self.budget.as_secs_f64() * 100.0
    }
}
