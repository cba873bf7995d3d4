//! Testbed file schema and conversion into the validated model.
//!
//! The file layout mirrors pyATS testbeds: a `devices` block carrying
//! connection and credential data, and a `topology` block carrying the
//! interfaces of each device. Unknown keys are ignored.

use std::net::Ipv4Addr;

use indexmap::IndexMap;
use ipnetwork::Ipv4Network;
use secrecy::SecretString;
use serde::Deserialize;

use super::model::{
    Credentials, Device, DeviceKind, DhcpPool, Endpoint, Hsrp, Interface, InterfaceKind,
    SwitchportMode,
};
use crate::error::TopologyError;

#[derive(Debug, Deserialize)]
pub(crate) struct TestbedFile {
    #[serde(default)]
    devices: IndexMap<String, DeviceEntry>,
    #[serde(default)]
    topology: IndexMap<String, TopologyEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    #[serde(rename = "type")]
    kind: DeviceKind,
    #[serde(default)]
    credentials: CredentialsEntry,
    #[serde(default)]
    connections: ConnectionsEntry,
    #[serde(default)]
    custom: CustomEntry,
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsEntry {
    enable: Option<PasswordEntry>,
}

#[derive(Debug, Deserialize)]
struct PasswordEntry {
    password: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectionsEntry {
    telnet: Option<TelnetEntry>,
    ssh: Option<SshEntry>,
}

#[derive(Debug, Deserialize)]
struct TelnetEntry {
    ip: String,
    port: u16,
}

#[derive(Debug, Deserialize)]
struct SshEntry {
    #[serde(default)]
    credentials: SshCredentialsEntry,
}

#[derive(Debug, Default, Deserialize)]
struct SshCredentialsEntry {
    login: Option<LoginEntry>,
}

#[derive(Debug, Deserialize)]
struct LoginEntry {
    username: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
struct CustomEntry {
    hostname: Option<String>,
    #[serde(default)]
    dhcp: Vec<DhcpPool>,
}

#[derive(Debug, Default, Deserialize)]
struct TopologyEntry {
    #[serde(default)]
    interfaces: IndexMap<String, InterfaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct InterfaceEntry {
    #[serde(rename = "type", default)]
    kind: InterfaceKind,
    ipv4: Option<String>,
    vlan: Option<u16>,
    hsrp: Option<Hsrp>,
    helper: Option<Ipv4Addr>,
    mode: Option<String>,
    access: Option<u16>,
    allowed_vlans: Option<Vec<u16>>,
}

impl TestbedFile {
    /// Validate the file and build the ordered device map.
    pub(crate) fn into_devices(self) -> Result<IndexMap<String, Device>, TopologyError> {
        let TestbedFile {
            devices: entries,
            mut topology,
        } = self;

        if let Some(owner) = topology.keys().find(|name| !entries.contains_key(*name)) {
            return Err(TopologyError::UnknownInterfaceOwner {
                device: owner.clone(),
            });
        }

        let mut devices = IndexMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let interfaces = topology.shift_remove(&name).unwrap_or_default().interfaces;
            let device = entry.into_device(&name, interfaces)?;
            devices.insert(name, device);
        }
        Ok(devices)
    }
}

impl DeviceEntry {
    fn into_device(
        self,
        name: &str,
        interfaces: IndexMap<String, InterfaceEntry>,
    ) -> Result<Device, TopologyError> {
        let telnet = self.connections.telnet.map(|t| Endpoint {
            host: t.ip,
            port: t.port,
        });

        let needs_credentials =
            telnet.is_some() && matches!(self.kind, DeviceKind::Router | DeviceKind::Switch);

        let login = self
            .connections
            .ssh
            .and_then(|ssh| ssh.credentials.login);

        let credentials = match (login, self.credentials.enable) {
            (Some(login), Some(enable)) => Some(Credentials {
                username: login.username,
                password: SecretString::from(login.password),
                enable: SecretString::from(enable.password),
            }),
            (None, _) if needs_credentials => {
                return Err(TopologyError::MissingField {
                    device: name.to_string(),
                    field: "connections.ssh.credentials.login",
                });
            }
            (_, None) if needs_credentials => {
                return Err(TopologyError::MissingField {
                    device: name.to_string(),
                    field: "credentials.enable.password",
                });
            }
            _ => None,
        };

        let mut device = Device::new(name, self.kind);
        if let Some(hostname) = self.custom.hostname {
            device.hostname = hostname;
        }
        device.telnet = telnet;
        device.credentials = credentials;
        device.dhcp_pools = self.custom.dhcp;

        for (if_name, entry) in interfaces {
            let interface = entry.into_interface(name, &if_name)?;
            device.interfaces.insert(if_name, interface);
        }

        Ok(device)
    }
}

impl InterfaceEntry {
    fn into_interface(self, device: &str, name: &str) -> Result<Interface, TopologyError> {
        let ipv4 = self
            .ipv4
            .as_deref()
            .map(|value| parse_prefix(device, name, value))
            .transpose()?;

        let switchport = self.switchport(device, name)?;

        let mut interface = Interface::new(name);
        interface.kind = self.kind;
        interface.ipv4 = ipv4;
        interface.hsrp = self.hsrp;
        interface.helper = self.helper;
        interface.switchport = switchport;
        interface.vlan = self.vlan;

        // Sub-interfaces fall back to the tag in their name (Gi0/0.10)
        if interface.is_subinterface() && interface.vlan.is_none() {
            interface.vlan = name.rsplit('.').next().and_then(|tag| tag.parse().ok());
            if interface.vlan.is_none() {
                return Err(TopologyError::MissingField {
                    device: device.to_string(),
                    field: "vlan",
                });
            }
        }

        Ok(interface)
    }

    fn switchport(&self, device: &str, name: &str) -> Result<Option<SwitchportMode>, TopologyError> {
        if self.access.is_some() && self.allowed_vlans.is_some() {
            return Err(TopologyError::ConflictingSwitchport {
                device: device.to_string(),
                interface: name.to_string(),
            });
        }

        let incomplete = |mode| TopologyError::IncompleteSwitchport {
            device: device.to_string(),
            interface: name.to_string(),
            mode,
        };

        match self.mode.as_deref() {
            Some("access") => self
                .access
                .map(|vlan| Some(SwitchportMode::Access(vlan)))
                .ok_or_else(|| incomplete("access")),
            Some("trunk") => match &self.allowed_vlans {
                Some(vlans) if !vlans.is_empty() => Ok(Some(SwitchportMode::Trunk(vlans.clone()))),
                _ => Err(incomplete("trunk")),
            },
            Some(_) => Err(incomplete("unknown")),
            None => match (&self.access, &self.allowed_vlans) {
                (Some(vlan), None) => Ok(Some(SwitchportMode::Access(*vlan))),
                (None, Some(vlans)) if vlans.is_empty() => Err(incomplete("trunk")),
                (None, Some(vlans)) => Ok(Some(SwitchportMode::Trunk(vlans.clone()))),
                _ => Ok(None),
            },
        }
    }
}

fn parse_prefix(device: &str, interface: &str, value: &str) -> Result<Ipv4Network, TopologyError> {
    value
        .parse::<Ipv4Network>()
        .map_err(|e| TopologyError::InvalidAddress {
            context: format!("{device} {interface}"),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
