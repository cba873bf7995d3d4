//! Router configuration.

use std::net::Ipv4Addr;

use super::DeviceConfigurer;
use super::common::{address_command, class_c_network};
use crate::driver::{Script, ScriptBuilder};
use crate::platform::CliMode;
use crate::topology::{Credentials, Device, DhcpPool, Interface};

/// EIGRP autonomous system used on every router.
pub const EIGRP_AS: u16 = 10;

/// Addresses interfaces and sub-interfaces, HSRP, DHCP relay and pools,
/// and EIGRP.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouterConfigurer;

impl DeviceConfigurer for RouterConfigurer {
    fn kind(&self) -> &'static str {
        "router"
    }

    fn body(&self, device: &Device, _credentials: &Credentials) -> Script {
        let mut builder = ScriptBuilder::new();
        for interface in device.interfaces.values() {
            builder = builder.extend(interface_steps(interface));
        }
        for pool in &device.dhcp_pools {
            builder = builder.extend(pool_steps(pool));
        }
        builder.extend(eigrp_steps(device)).build()
    }
}

fn interface_steps(interface: &Interface) -> Script {
    let mode = if interface.is_subinterface() {
        CliMode::SubinterfaceConfig
    } else {
        CliMode::InterfaceConfig
    };

    let mut builder = ScriptBuilder::new()
        .send(format!("interface {}", interface.name))
        .expect_mode(mode);

    if let (CliMode::SubinterfaceConfig, Some(vlan)) = (mode, interface.vlan) {
        builder = builder
            .send(format!("encapsulation dot1Q {vlan}"))
            .expect_mode(mode);
    }

    if let Some(ipv4) = &interface.ipv4 {
        builder = builder.send(address_command(ipv4)).expect_mode(mode);
    }
    builder = builder.send("no shutdown").expect_mode(mode);

    if let Some(helper) = interface.helper {
        builder = builder
            .send(format!("ip helper-address {helper}"))
            .expect_mode(mode);
    }

    if let Some(hsrp) = interface.hsrp {
        let group = hsrp.group;
        builder = builder
            .send(format!("standby {group} ip {}", hsrp.virtual_ip))
            .expect_mode(mode)
            .send(format!("standby {group} priority {}", hsrp.priority))
            .expect_mode(mode)
            .send(format!("standby {group} preempt"))
            .expect_mode(mode);
    }

    builder
        .send("exit")
        .expect_mode(CliMode::GlobalConfig)
        .build()
}

fn pool_steps(pool: &DhcpPool) -> Script {
    let (first, last) = pool.excluded;
    ScriptBuilder::new()
        .send(format!("ip dhcp excluded-address {first} {last}"))
        .expect_mode(CliMode::GlobalConfig)
        .send(format!("ip dhcp pool {}", pool.name()))
        .expect_mode(CliMode::DhcpConfig)
        .send(format!("network {} {}", pool.network, pool.mask))
        .expect_mode(CliMode::DhcpConfig)
        .send(format!("default-router {}", pool.default_router))
        .expect_mode(CliMode::DhcpConfig)
        .send(format!("dns-server {}", pool.dns_server))
        .expect_mode(CliMode::DhcpConfig)
        .send("exit")
        .expect_mode(CliMode::GlobalConfig)
        .build()
}

/// /24 networks of the addressed interfaces, first occurrence order.
pub(crate) fn eigrp_networks(device: &Device) -> Vec<Ipv4Addr> {
    let mut networks = Vec::new();
    for address in device.addressed_interfaces().filter_map(Interface::address) {
        let network = class_c_network(address);
        if !networks.contains(&network) {
            networks.push(network);
        }
    }
    networks
}

fn eigrp_steps(device: &Device) -> Script {
    let mut builder = ScriptBuilder::new()
        .send(format!("router eigrp {EIGRP_AS}"))
        .expect_mode(CliMode::RouterConfig)
        .send("no auto-summary")
        .expect_mode(CliMode::RouterConfig);

    for network in eigrp_networks(device) {
        builder = builder
            .send(format!("network {network}"))
            .expect_mode(CliMode::RouterConfig);
    }

    builder
        .send("exit")
        .expect_mode(CliMode::GlobalConfig)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configure::common::tests::credentials;
    use crate::driver::Expect;
    use crate::topology::{DeviceKind, Hsrp};

    fn interface(name: &str, ipv4: &str) -> Interface {
        let mut interface = Interface::new(name);
        interface.ipv4 = Some(ipv4.parse().unwrap());
        interface
    }

    fn router() -> Device {
        let mut sub = interface("Gi0/0.10", "10.0.10.1/24");
        sub.vlan = Some(10);
        Device::new("R1", DeviceKind::Router)
            .with_interface(interface("Gi0/0", "10.0.0.1/24"))
            .with_interface(sub)
    }

    #[test]
    fn test_subinterface_gets_encapsulation_before_address() {
        let script = RouterConfigurer.body(&router(), &credentials());
        let commands = script.commands();

        let expected = [
            "interface Gi0/0",
            "ip address 10.0.0.1 255.255.255.0",
            "no shutdown",
            "exit",
            "interface Gi0/0.10",
            "encapsulation dot1Q 10",
            "ip address 10.0.10.1 255.255.255.0",
        ];
        assert_eq!(&commands[..expected.len()], expected);

        let sub = script.position("interface Gi0/0.10").unwrap();
        assert_eq!(
            script.steps()[sub].expect,
            Expect::Mode(CliMode::SubinterfaceConfig)
        );
        let physical = script.position("interface Gi0/0").unwrap();
        assert_eq!(
            script.steps()[physical].expect,
            Expect::Mode(CliMode::InterfaceConfig)
        );
    }

    #[test]
    fn test_full_script_order() {
        let script = RouterConfigurer.script(&router(), &credentials(), &Default::default());
        let commands = script.commands();

        let hostname = script.position("hostname R1").unwrap();
        assert_eq!(commands[hostname + 1], "interface Gi0/0");
        assert_eq!(commands[hostname + 2], "ip address 10.0.0.1 255.255.255.0");
        let sub = script.position("interface Gi0/0.10").unwrap();
        assert!(sub > hostname);
        assert_eq!(commands[sub + 1], "encapsulation dot1Q 10");
        assert_eq!(commands[sub + 2], "ip address 10.0.10.1 255.255.255.0");
        assert_eq!(commands.last(), Some(&"exit"));
    }

    #[test]
    fn test_helper_and_hsrp() {
        let mut gi = interface("Gi0/1", "10.0.20.2/24");
        gi.helper = Some(Ipv4Addr::new(10, 0, 0, 2));
        gi.hsrp = Some(Hsrp {
            group: 20,
            virtual_ip: Ipv4Addr::new(10, 0, 20, 254),
            priority: 110,
        });
        let device = Device::new("R2", DeviceKind::Router).with_interface(gi);

        let script = RouterConfigurer.body(&device, &credentials());
        let commands = script.commands();
        assert_eq!(
            &commands[..8],
            [
                "interface Gi0/1",
                "ip address 10.0.20.2 255.255.255.0",
                "no shutdown",
                "ip helper-address 10.0.0.2",
                "standby 20 ip 10.0.20.254",
                "standby 20 priority 110",
                "standby 20 preempt",
                "exit",
            ]
        );
    }

    #[test]
    fn test_dhcp_pool_steps() {
        let mut device = Device::new("R1", DeviceKind::Router);
        device.dhcp_pools.push(DhcpPool {
            excluded: (Ipv4Addr::new(10, 0, 30, 1), Ipv4Addr::new(10, 0, 30, 10)),
            network: Ipv4Addr::new(10, 0, 30, 0),
            mask: Ipv4Addr::new(255, 255, 255, 0),
            default_router: Ipv4Addr::new(10, 0, 30, 1),
            dns_server: Ipv4Addr::new(8, 8, 8, 8),
        });

        let script = RouterConfigurer.body(&device, &credentials());
        let pool = script.position("ip dhcp pool VLAN_30").unwrap();
        assert_eq!(script.steps()[pool].expect, Expect::Mode(CliMode::DhcpConfig));
        assert_eq!(
            &script.commands()[pool - 1..pool + 5],
            [
                "ip dhcp excluded-address 10.0.30.1 10.0.30.10",
                "ip dhcp pool VLAN_30",
                "network 10.0.30.0 255.255.255.0",
                "default-router 10.0.30.1",
                "dns-server 8.8.8.8",
                "exit",
            ]
        );
    }

    #[test]
    fn test_eigrp_networks_deduplicated() {
        let device = Device::new("R1", DeviceKind::Router)
            .with_interface(interface("Gi0/0", "10.0.0.1/24"))
            .with_interface(interface("Gi0/1", "10.0.0.2/24"))
            .with_interface(interface("Gi0/2", "192.168.5.1/24"))
            .with_interface(Interface::new("Gi0/3"));

        assert_eq!(
            eigrp_networks(&device),
            [Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(192, 168, 5, 0)]
        );

        let script = RouterConfigurer.body(&device, &credentials());
        let eigrp = script.position("router eigrp 10").unwrap();
        assert_eq!(
            &script.commands()[eigrp..],
            [
                "router eigrp 10",
                "no auto-summary",
                "network 10.0.0.0",
                "network 192.168.5.0",
                "exit",
            ]
        );
    }
}
