//! Typed, validated view of the lab devices.

use std::fmt;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use ipnetwork::Ipv4Network;
use secrecy::SecretString;
use serde::Deserialize;

/// Kind of a testbed device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Router,
    Switch,
    #[serde(rename = "PC", alias = "pc")]
    Pc,
    /// Anything else the testbed declares (firewalls, servers, ...).
    #[serde(other)]
    Other,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Router => "router",
            DeviceKind::Switch => "switch",
            DeviceKind::Pc => "PC",
            DeviceKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Telnet endpoint of a device console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Credentials applied to routers and switches.
#[derive(Debug)]
pub struct Credentials {
    /// Local SSH username created on the device.
    pub username: String,
    /// Secret for the local SSH user.
    pub password: SecretString,
    /// Enable secret, also used as the console line password.
    pub enable: SecretString,
}

/// HSRP group parameters of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Hsrp {
    pub group: u16,
    pub virtual_ip: Ipv4Addr,
    pub priority: u8,
}

/// Physical/logical kind of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    #[default]
    Ethernet,
    /// Switched virtual interface (`interface VlanN`).
    Svi,
}

/// Switchport mode of a switch interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchportMode {
    /// Port bound to exactly one VLAN.
    Access(u16),
    /// Port carrying the listed tagged VLANs.
    Trunk(Vec<u16>),
}

/// A device interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub kind: InterfaceKind,
    /// Address with its prefix, as declared (`10.0.0.1/24`).
    pub ipv4: Option<Ipv4Network>,
    /// 802.1Q tag of a sub-interface.
    pub vlan: Option<u16>,
    pub hsrp: Option<Hsrp>,
    /// DHCP relay target.
    pub helper: Option<Ipv4Addr>,
    pub switchport: Option<SwitchportMode>,
}

impl Interface {
    /// Create a bare ethernet interface.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InterfaceKind::Ethernet,
            ipv4: None,
            vlan: None,
            hsrp: None,
            helper: None,
            switchport: None,
        }
    }

    /// Dotted names (`Gi0/0.10`) are sub-interfaces.
    pub fn is_subinterface(&self) -> bool {
        self.name.contains('.')
    }

    /// The host address without its prefix.
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.ipv4.map(|net| net.ip())
    }

    /// VLANs this interface puts on the switch: one for access ports, the
    /// allowed list for trunks, none otherwise.
    pub fn referenced_vlans(&self) -> &[u16] {
        match &self.switchport {
            Some(SwitchportMode::Access(vlan)) => std::slice::from_ref(vlan),
            Some(SwitchportMode::Trunk(vlans)) => vlans,
            None => &[],
        }
    }
}

/// A DHCP pool served by a router.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DhcpPool {
    /// First and last address kept out of the pool.
    pub excluded: (Ipv4Addr, Ipv4Addr),
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub default_router: Ipv4Addr,
    pub dns_server: Ipv4Addr,
}

impl DhcpPool {
    /// Pool name derived from the third octet of the network.
    pub fn name(&self) -> String {
        format!("VLAN_{}", self.network.octets()[2])
    }
}

/// A testbed device. Read-only once loaded.
#[derive(Debug)]
pub struct Device {
    pub name: String,
    pub kind: DeviceKind,
    /// Hostname configured on the device and embedded in its prompts.
    pub hostname: String,
    pub telnet: Option<Endpoint>,
    /// Present for every router and switch reachable over Telnet.
    pub credentials: Option<Credentials>,
    pub interfaces: IndexMap<String, Interface>,
    pub dhcp_pools: Vec<DhcpPool>,
}

impl Device {
    /// Create a device with no interfaces, endpoint or credentials.
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        let name = name.into();
        Self {
            hostname: name.clone(),
            name,
            kind,
            telnet: None,
            credentials: None,
            interfaces: IndexMap::new(),
            dhcp_pools: Vec::new(),
        }
    }

    /// Add an interface, keyed by its name.
    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interfaces.insert(interface.name.clone(), interface);
        self
    }

    /// Interfaces carrying an address, in declaration order.
    pub fn addressed_interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values().filter(|i| i.ipv4.is_some())
    }
}
