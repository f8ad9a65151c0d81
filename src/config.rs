//! Configuration for Tempoline

use crate::easing::Easing;
use std::time::Duration;

/// Session-wide defaults for the tween driver and crossfade scheduling.
#[derive(Debug, Clone)]
pub struct TempolineConfig {
    /// Tick granularity of the background tween driver. Smaller intervals
    /// give smoother interpolation at the cost of CPU.
    pub step_interval: Duration,
    /// Default crossfade duration used when a selection change carries no
    /// per-request override.
    pub transition_time: Duration,
    /// Default easing curve for crossfade ramps.
    pub easing: Easing,
}

impl Default for TempolineConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(1),
            transition_time: Duration::from_secs(1),
            easing: Easing::Linear,
        }
    }
}

impl TempolineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_interval(mut self, interval: Duration) -> Self {
        self.step_interval = interval;
        self
    }

    pub fn transition_time(mut self, time: Duration) -> Self {
        self.transition_time = time;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}
