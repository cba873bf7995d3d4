//! Connectivity results.

use std::fmt;
use std::net::Ipv4Addr;

use super::tally::ConnectivityTally;

/// A router interface probed from every PC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub router: String,
    pub interface: String,
    pub address: Ipv4Addr,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.router, self.interface, self.address)
    }
}

/// Outcome of one ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub target: Target,
    pub reachable: bool,
}

/// Everything that happened on one PC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcReport {
    pub pc: String,

    /// Whether the lease confirmation was seen.
    pub lease_acquired: bool,

    pub probes: Vec<ProbeOutcome>,

    /// Why probing stopped early, if it did.
    pub error: Option<String>,
}

impl PcReport {
    pub fn new(pc: impl Into<String>) -> Self {
        Self {
            pc: pc.into(),
            ..Default::default()
        }
    }

    pub fn reachable(&self) -> usize {
        self.probes.iter().filter(|p| p.reachable).count()
    }
}

/// Results of a whole connectivity run.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityReport {
    pub pcs: Vec<PcReport>,
    pub tally: ConnectivityTally,
}

impl ConnectivityReport {
    /// Share of successful probes, `None` when nothing was attempted.
    pub fn percentage(&self) -> Option<f64> {
        self.tally.percentage()
    }
}

impl fmt::Display for ConnectivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pc in &self.pcs {
            let lease = if pc.lease_acquired { "lease ok" } else { "no lease" };
            writeln!(
                f,
                "{}: {}/{} reachable, {}",
                pc.pc,
                pc.reachable(),
                pc.probes.len(),
                lease
            )?;
            for probe in pc.probes.iter().filter(|p| !p.reachable) {
                writeln!(f, "  unreachable: {}", probe.target)?;
            }
            if let Some(error) = &pc.error {
                writeln!(f, "  error: {error}")?;
            }
        }
        match self.percentage() {
            Some(percentage) => write!(f, "Connectivity is at {percentage:.2} percent!"),
            None => write!(f, "No probes attempted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(reachable: bool) -> ProbeOutcome {
        ProbeOutcome {
            target: Target {
                router: "R1".into(),
                interface: "Gi0/0".into(),
                address: Ipv4Addr::new(10, 0, 0, 1),
            },
            reachable,
        }
    }

    #[test]
    fn test_display_summary() {
        let mut tally = ConnectivityTally::new();
        tally.record(true);
        tally.record(false);

        let mut pc = PcReport::new("PC1");
        pc.lease_acquired = true;
        pc.probes = vec![outcome(true), outcome(false)];

        let report = ConnectivityReport {
            pcs: vec![pc],
            tally,
        };
        let text = report.to_string();
        assert!(text.contains("PC1: 1/2 reachable, lease ok"));
        assert!(text.contains("unreachable: R1 Gi0/0 (10.0.0.1)"));
        assert!(text.ends_with("Connectivity is at 50.00 percent!"));
    }

    #[test]
    fn test_display_without_probes() {
        let report = ConnectivityReport::default();
        assert_eq!(report.percentage(), None);
        assert_eq!(report.to_string(), "No probes attempted");
    }
}
