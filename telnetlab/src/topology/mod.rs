//! Testbed loading.
//!
//! A [`Testbed`] is loaded once per run and never mutated afterwards:
//!
//! ```rust,no_run
//! use telnetlab::topology::Testbed;
//!
//! # fn example() -> Result<(), telnetlab::Error> {
//! let testbed = Testbed::load("testbed.yaml")?;
//! for router in testbed.routers() {
//!     println!("{} has {} interfaces", router.hostname, router.interfaces.len());
//! }
//! # Ok(())
//! # }
//! ```

mod model;
mod testbed;

use std::path::Path;

use indexmap::IndexMap;
use log::debug;

pub use model::{
    Credentials, Device, DeviceKind, DhcpPool, Endpoint, Hsrp, Interface, InterfaceKind,
    SwitchportMode,
};

use crate::error::{Result, TopologyError};
use testbed::TestbedFile;

/// Ordered, read-only collection of lab devices.
#[derive(Debug, Default)]
pub struct Testbed {
    devices: IndexMap<String, Device>,
}

impl Testbed {
    /// Read and validate a testbed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TopologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let testbed = Self::from_yaml_str(&text)?;
        debug!(
            "Loaded testbed {} with {} devices",
            path.display(),
            testbed.len()
        );
        Ok(testbed)
    }

    /// Parse and validate a testbed from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let file: TestbedFile = serde_yaml::from_str(text).map_err(TopologyError::Parse)?;
        Ok(Self {
            devices: file.into_devices()?,
        })
    }

    /// Build a testbed from already constructed devices.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: devices
                .into_iter()
                .map(|device| (device.name.clone(), device))
                .collect(),
        }
    }

    /// Look up a device by name.
    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }

    /// All devices, in file order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Devices of one kind, in file order.
    pub fn of_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &Device> {
        self.devices.values().filter(move |d| d.kind == kind)
    }

    pub fn routers(&self) -> impl Iterator<Item = &Device> {
        self.of_kind(DeviceKind::Router)
    }

    pub fn pcs(&self) -> impl Iterator<Item = &Device> {
        self.of_kind(DeviceKind::Pc)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
