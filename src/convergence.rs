//! Drift monotonicity tracking.
//!
//! After every step the total drift of the new generation is compared with the
//! previous step's. The monitor counts how often it dropped (or held) versus
//! increased and reports the dropped share as a percentage. It is advisory
//! only and never feeds back into the simulation.

use std::fmt;

/// Running classification of whether total drift is trending down.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceMonitor {
    previous_total_drift: f64,
    dropped: u64,
    increased: u64,
}

impl ConvergenceMonitor {
    /// A fresh monitor. The baseline is `f64::MAX`, so the first finite
    /// observation always counts as dropped.
    pub fn new() -> Self {
        Self {
            previous_total_drift: f64::MAX,
            dropped: 0,
            increased: 0,
        }
    }

    /// Record the total drift of the step just completed.
    pub fn observe(&mut self, total_drift: f64) -> DriftReport {
        if total_drift <= self.previous_total_drift {
            self.dropped += 1;
        } else {
            self.increased += 1;
        }
        self.previous_total_drift = total_drift;
        self.report()
    }

    /// Current counts without recording anything.
    pub fn report(&self) -> DriftReport {
        DriftReport {
            total_drift: self.previous_total_drift,
            dropped: self.dropped,
            increased: self.increased,
        }
    }

    pub fn previous_total_drift(&self) -> f64 {
        self.previous_total_drift
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn increased(&self) -> u64 {
        self.increased
    }
}

impl Default for ConvergenceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the monitor after an observation.
///
/// Displays as the dropped percentage with two decimals, e.g. `66.67`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftReport {
    /// The total drift most recently observed.
    pub total_drift: f64,
    pub dropped: u64,
    pub increased: u64,
}

impl DriftReport {
    pub fn observations(&self) -> u64 {
        self.dropped + self.increased
    }

    /// Share of observations where drift dropped or held, in `[0, 100]`.
    /// Zero before any observation.
    pub fn dropped_percent(&self) -> f64 {
        match self.observations() {
            0 => 0.0,
            n => 100.0 * self.dropped as f64 / n as f64,
        }
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.dropped_percent())
    }
}
