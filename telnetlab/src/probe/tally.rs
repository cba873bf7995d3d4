//! Probe counters.

/// Attempted and successful probe counts.
///
/// Counts only grow, and `succeeded` never exceeds `attempted`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityTally {
    attempted: u32,
    succeeded: u32,
}

impl ConnectivityTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one probe.
    pub fn record(&mut self, success: bool) {
        self.attempted += 1;
        if success {
            self.succeeded += 1;
        }
    }

    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    pub fn succeeded(&self) -> u32 {
        self.succeeded
    }

    /// `succeeded / attempted * 100`, or `None` when nothing was attempted.
    pub fn percentage(&self) -> Option<f64> {
        if self.attempted == 0 {
            return None;
        }
        Some(f64::from(self.succeeded) / f64::from(self.attempted) * 100.0)
    }
}
