//! # telnetlab
//!
//! Telnet provisioning and connectivity checks for emulated Cisco-style labs.
//!
//! A lab is described by a YAML testbed. Routers and switches are configured
//! from that description by playing command scripts over their console
//! Telnet ports, and virtual PCs are then used to ping every router
//! interface.
//!
//! ## Features
//!
//! - Async Telnet sessions with option refusal and ANSI-stripped prompt matching
//! - Declarative command scripts with interactive question handling
//! - Router (subinterfaces, HSRP, DHCP pools, EIGRP) and switch (VLANs,
//!   port security, trunks, SVIs) configurers
//! - Running-configuration capture to per-device files
//! - PC-to-router reachability checks with an overall percentage
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use telnetlab::{App, Settings, Testbed};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), telnetlab::Error> {
//!     let settings = Settings::default();
//!     let testbed = Testbed::load(&settings.testbed)?;
//!     let app = App::new(testbed, settings);
//!
//!     println!("{}", app.configure_all().await);
//!     println!("{}", app.verify_connectivity().await);
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod channel;
pub mod config;
pub mod configure;
pub mod driver;
pub mod error;
pub mod platform;
pub mod probe;
pub mod topology;
pub mod transport;

// Re-export main types for convenience
pub use app::{App, BatchReport, DeviceStatus, MenuChoice, run_menu};
pub use config::{Settings, Timings};
pub use configure::{DeviceConfigurer, configure_device, configurer_for};
pub use driver::{Response, Script, ScriptBuilder, Session, SessionBuilder};
pub use error::{Error, Result};
pub use platform::{CliMode, PlatformDefinition};
pub use probe::{ConnectivityReport, ConnectivityTally, Prober};
pub use topology::{Device, DeviceKind, Testbed};
pub use transport::TelnetConfig;
