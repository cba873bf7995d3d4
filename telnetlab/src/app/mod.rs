//! Run context and batch operations behind the operator menu.

mod menu;

use std::fmt;

use log::{info, warn};

pub use menu::{MENU, MenuChoice, PROMPT, run_menu};

use crate::config::Settings;
use crate::configure::{DeviceOutcome, configure_device, configurer_for};
use crate::error::Error;
use crate::probe::{ConnectivityReport, Prober};
use crate::topology::Testbed;

/// What happened to one device of a configuration batch.
#[derive(Debug)]
pub enum DeviceStatus {
    Configured(Box<DeviceOutcome>),
    Failed(Error),
    /// Reachable over Telnet but of a kind with no configurer.
    Unsupported,
}

#[derive(Debug)]
pub struct DeviceResult {
    pub device: String,
    pub status: DeviceStatus,
}

/// Per-device results of [`App::configure_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<DeviceResult>,
}

impl BatchReport {
    pub fn configured(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, DeviceStatus::Configured(_)))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeviceResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, DeviceStatus::Failed(_)))
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            match &result.status {
                DeviceStatus::Configured(outcome) => writeln!(
                    f,
                    "Device {} configured successfully ({})",
                    result.device,
                    outcome.dump.path.display()
                )?,
                DeviceStatus::Failed(e) => writeln!(f, "Device {} failed: {}", result.device, e)?,
                DeviceStatus::Unsupported => writeln!(f, "Device {} not supported", result.device)?,
            }
        }
        write!(
            f,
            "{} of {} devices configured",
            self.configured(),
            self.results.len()
        )
    }
}

/// One run: the loaded testbed and the settings it runs with.
#[derive(Debug)]
pub struct App {
    testbed: Testbed,
    settings: Settings,
}

impl App {
    pub fn new(testbed: Testbed, settings: Settings) -> Self {
        Self { testbed, settings }
    }

    pub fn testbed(&self) -> &Testbed {
        &self.testbed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Configure every device reachable over Telnet, one at a time.
    ///
    /// A failing device is recorded and the batch moves on.
    pub async fn configure_all(&self) -> BatchReport {
        let mut report = BatchReport::default();
        let devices: Vec<_> = self
            .testbed
            .devices()
            .filter(|d| d.telnet.is_some())
            .collect();

        for (position, device) in devices.iter().enumerate() {
            if position > 0 && !self.settings.timings.device_pause.is_zero() {
                tokio::time::sleep(self.settings.timings.device_pause).await;
            }

            let status = if configurer_for(device.kind).is_none() {
                warn!("Device {} ({}) not supported", device.name, device.kind);
                DeviceStatus::Unsupported
            } else {
                match configure_device(device, &self.settings).await {
                    Ok(outcome) => {
                        info!("Device {} configured successfully", device.name);
                        DeviceStatus::Configured(Box::new(outcome))
                    }
                    Err(e) => {
                        warn!("Device {} failed: {}", device.name, e);
                        DeviceStatus::Failed(e)
                    }
                }
            };

            report.results.push(DeviceResult {
                device: device.name.clone(),
                status,
            });
        }

        report
    }

    /// DHCP on every PC, then ping every router interface.
    pub async fn verify_connectivity(&self) -> ConnectivityReport {
        Prober::new(&self.testbed, &self.settings).run().await
    }
}
