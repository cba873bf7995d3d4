//! Device configuration.
//!
//! Each configurable device kind has a [`DeviceConfigurer`] that turns the
//! read-only [`Device`] description into a [`Script`]. Generating a script
//! never touches the network; [`configure_device`] plays it and captures the
//! resulting running configuration.

pub mod common;
mod extract;
mod router;
mod switch;

use std::path::Path;

use log::info;
use tokio::io::{AsyncRead, AsyncWrite};

pub use extract::{ConfigDump, dump_file_name, extract_configuration};
pub use router::{EIGRP_AS, RouterConfigurer};
pub use switch::{SwitchConfigurer, vlan_set};

use crate::config::{Settings, Timings};
use crate::driver::{Script, ScriptBuilder, ScriptReport, Session, SessionBuilder};
use crate::error::{DriverError, Result, TopologyError};
use crate::topology::{Credentials, Device, DeviceKind};

/// Script generation for one kind of device.
pub trait DeviceConfigurer: Send + Sync {
    /// Kind name for logs.
    fn kind(&self) -> &'static str;

    /// Device-specific steps, run in global configuration mode between the
    /// common preamble and trailer.
    fn body(&self, device: &Device, credentials: &Credentials) -> Script;

    /// The complete script: preamble, body, trailer.
    fn script(&self, device: &Device, credentials: &Credentials, timings: &Timings) -> Script {
        ScriptBuilder::new()
            .extend(common::preamble(&device.hostname, credentials))
            .extend(self.body(device, credentials))
            .extend(common::trailer(credentials, timings))
            .build()
    }
}

/// The configurer for a device kind, if that kind is configurable.
pub fn configurer_for(kind: DeviceKind) -> Option<&'static dyn DeviceConfigurer> {
    match kind {
        DeviceKind::Router => Some(&RouterConfigurer),
        DeviceKind::Switch => Some(&SwitchConfigurer),
        DeviceKind::Pc | DeviceKind::Other => None,
    }
}

/// Result of configuring one device.
#[derive(Debug, Clone)]
pub struct DeviceOutcome {
    pub report: ScriptReport,
    pub dump: ConfigDump,
}

/// Build the complete script for a device.
pub fn script_for(device: &Device, timings: &Timings) -> Result<Script> {
    let configurer = configurer_for(device.kind).ok_or_else(|| DriverError::UnsupportedDevice {
        device: device.name.clone(),
        kind: device.kind.to_string(),
    })?;
    let credentials = device
        .credentials
        .as_ref()
        .ok_or_else(|| TopologyError::MissingField {
            device: device.name.clone(),
            field: "credentials",
        })?;
    Ok(configurer.script(device, credentials, timings))
}

/// Connect to a device, configure it and save its running configuration.
///
/// The session is closed on success and released by ownership on failure.
pub async fn configure_device(device: &Device, settings: &Settings) -> Result<DeviceOutcome> {
    let script = script_for(device, &settings.timings)?;

    let mut session = SessionBuilder::for_device(device, &settings.timings)?.build()?;
    session.open().await?;
    info!("Configuring {} {}", device.kind, device.name);

    let outcome = run_configuration(
        &mut session,
        &script,
        &settings.output_dir,
        settings.timings.capture,
    )
    .await?;
    session.close().await?;
    Ok(outcome)
}

/// Play a configuration script over an open session, then extract.
pub async fn run_configuration<S>(
    session: &mut Session<S>,
    script: &Script,
    output_dir: &Path,
    capture: std::time::Duration,
) -> Result<DeviceOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let report = session.run_script(script).await?;
    info!(
        "[{}] {} steps applied ({} warnings)",
        session.device(),
        report.steps.len(),
        report.warnings().count()
    );
    let dump = extract_configuration(session, output_dir, capture).await?;
    Ok(DeviceOutcome { report, dump })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_dispatch_by_kind() {
        assert_eq!(configurer_for(DeviceKind::Router).unwrap().kind(), "router");
        assert_eq!(configurer_for(DeviceKind::Switch).unwrap().kind(), "switch");
        assert!(configurer_for(DeviceKind::Pc).is_none());
        assert!(configurer_for(DeviceKind::Other).is_none());
    }

    #[test]
    fn test_script_for_pc_is_unsupported() {
        let device = Device::new("PC1", DeviceKind::Pc);
        let err = script_for(&device, &Timings::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Driver(DriverError::UnsupportedDevice { .. })
        ));
    }

    #[test]
    fn test_script_for_router_without_credentials() {
        let device = Device::new("R1", DeviceKind::Router);
        let err = script_for(&device, &Timings::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Topology(TopologyError::MissingField { field: "credentials", .. })
        ));
    }

    #[test]
    fn test_script_wraps_body() {
        let mut device = Device::new("SW1", DeviceKind::Switch);
        device.credentials = Some(common::tests::credentials());

        let script = script_for(&device, &Timings::default()).unwrap();
        let commands = script.commands();
        assert_eq!(commands[..4], ["", "enable", "configure terminal", "hostname SW1"]);
        let stp = script.position("spanning-tree mode rapid-pvst").unwrap();
        let banner = script.position("banner motd #Authorized Access Only#").unwrap();
        assert!(stp < banner);
        assert_eq!(commands.last(), Some(&"exit"));
    }
}
