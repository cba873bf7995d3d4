//! Run settings and timing knobs.

use std::path::PathBuf;
use std::time::Duration;

/// Named waits used across configuration and probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// TCP connect timeout.
    pub connect: Duration,

    /// Default wait for a prompt after a command.
    pub prompt: Duration,

    /// Wait for the prompt after RSA key generation.
    pub key_generation: Duration,

    /// Upper bound for a ping to finish before the output is classified.
    pub probe_settle: Duration,

    /// Wait for the DHCP lease confirmation on a PC.
    pub lease: Duration,

    /// Wait for the prompt after interrupting a failed ping.
    pub interrupt: Duration,

    /// Upper bound for `show running-config` to finish.
    pub capture: Duration,

    /// Pause between two devices of a batch.
    pub device_pause: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            prompt: Duration::from_secs(10),
            key_generation: Duration::from_secs(60),
            probe_settle: Duration::from_secs(6),
            lease: Duration::from_secs(10),
            interrupt: Duration::from_secs(5),
            capture: Duration::from_secs(6),
            device_pause: Duration::from_secs(3),
        }
    }
}

/// Everything a run needs besides the testbed itself.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timings: Timings,

    /// Testbed YAML file.
    pub testbed: PathBuf,

    /// Directory receiving `<hostname>_config.txt` dumps.
    pub output_dir: PathBuf,

    /// Substring marking a successful ping (case-insensitive).
    pub success_marker: String,

    /// Substring confirming a DHCP lease on a PC.
    pub lease_marker: String,

    /// Command requesting a DHCP lease on a PC.
    pub lease_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            testbed: PathBuf::from("testbed.yaml"),
            output_dir: PathBuf::from("configs"),
            success_marker: "bytes from".to_string(),
            lease_marker: "DORA IP".to_string(),
            lease_command: "dhcp".to_string(),
        }
    }
}
