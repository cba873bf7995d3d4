//! Switch configuration.

use std::collections::BTreeSet;

use secrecy::ExposeSecret;

use super::DeviceConfigurer;
use super::common::address_command;
use crate::driver::{Script, ScriptBuilder};
use crate::platform::CliMode;
use crate::topology::{Credentials, Device, Interface, InterfaceKind, SwitchportMode};

/// Access and trunk ports with port security, SVI addressing, VLAN
/// creation and rapid PVST.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwitchConfigurer;

impl DeviceConfigurer for SwitchConfigurer {
    fn kind(&self) -> &'static str {
        "switch"
    }

    fn body(&self, device: &Device, credentials: &Credentials) -> Script {
        let mut builder = ScriptBuilder::new();
        for interface in device.interfaces.values() {
            builder = builder.extend(interface_steps(interface));
        }

        for vlan in vlan_set(device) {
            builder = builder
                .send(format!("vlan {vlan}"))
                .expect_mode(CliMode::VlanConfig)
                .send(format!("name VLAN{vlan}"))
                .expect_mode(CliMode::VlanConfig)
                .send("exit")
                .expect_mode(CliMode::GlobalConfig);
        }

        builder
            .send("spanning-tree mode rapid-pvst")
            .expect_mode(CliMode::GlobalConfig)
            .send_hidden(format!(
                "enable secret {}",
                credentials.enable.expose_secret()
            ))
            .expect_mode(CliMode::GlobalConfig)
            .build()
    }
}

/// Every VLAN referenced by an access or trunk port, ascending.
pub fn vlan_set(device: &Device) -> BTreeSet<u16> {
    device
        .interfaces
        .values()
        .flat_map(|i| i.referenced_vlans().iter().copied())
        .collect()
}

fn interface_steps(interface: &Interface) -> Script {
    let mode = CliMode::InterfaceConfig;
    let mut builder = ScriptBuilder::new()
        .send(format!("interface {}", interface.name))
        .expect_mode(mode);

    match (interface.kind, &interface.switchport) {
        (InterfaceKind::Ethernet, Some(SwitchportMode::Access(vlan))) => {
            let commands = [
                "switchport mode access".to_string(),
                format!("switchport access vlan {vlan}"),
                "switchport port-security".to_string(),
                "switchport port-security maximum 1".to_string(),
                "switchport port-security violation restrict".to_string(),
                "switchport port-security mac-address sticky".to_string(),
            ];
            for command in commands {
                builder = builder.send(command).expect_mode(mode);
            }
        }
        (InterfaceKind::Ethernet, Some(SwitchportMode::Trunk(vlans))) => {
            let allowed = vlans
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",");
            builder = builder
                .send("switchport trunk encapsulation dot1q")
                .expect_mode(mode)
                .send("switchport mode trunk")
                .expect_mode(mode)
                .send(format!("switchport trunk allowed vlan {allowed}"))
                .expect_mode(mode);
        }
        (InterfaceKind::Svi, _) => {
            if let Some(ipv4) = &interface.ipv4 {
                builder = builder.send(address_command(ipv4)).expect_mode(mode);
            }
        }
        (InterfaceKind::Ethernet, None) => {}
    }

    builder
        .send("exit")
        .expect_mode(CliMode::GlobalConfig)
        .build()
}
