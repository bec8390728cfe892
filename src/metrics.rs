//! Dispatch statistics.
//!
//! Each machine counts what happened to the events it was fed and how long
//! committed transitions took. The counters are plain data; callers read
//! them through [`crate::Machine::stats`] and may export them as JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters and timings accumulated by [`crate::Machine::process_event`].
///
/// Times are in microseconds. A transition's time covers its action, the
/// state commit, and the entry handler.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Events fed to the machine, including rejected ones
    pub events: u64,
    /// Transitions committed
    pub transitions: u64,
    /// Candidate transitions whose guard returned false
    pub guard_rejections: u64,
    /// Events with no candidate for the current state
    pub unmatched_events: u64,
    /// Events outside the configured range
    pub invalid_events: u64,
    /// Dispatches aborted or followed by a callback failure
    pub failures: u64,
    pub total_time_us: f64,
    pub avg_transition_time_us: f64,
    pub max_transition_time_us: f64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Account for one committed transition.
    pub fn record_transition(&mut self, elapsed: Duration) {
        let micros = elapsed.as_secs_f64() * 1_000_000.0;
        self.transitions += 1;
        self.total_time_us += micros;
        if micros > self.max_transition_time_us {
            self.max_transition_time_us = micros;
        }
        self.avg_transition_time_us = self.total_time_us / self.transitions as f64;
    }

    /// Render the counters as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
