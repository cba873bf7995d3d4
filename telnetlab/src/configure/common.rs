//! Steps shared by every configurable device.

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use secrecy::ExposeSecret;

use crate::config::Timings;
use crate::driver::{Script, ScriptBuilder};
use crate::platform::CliMode;
use crate::topology::Credentials;

/// Mask applied to every interface address.
pub const INTERFACE_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Message of the day set on every device.
pub const BANNER: &str = "#Authorized Access Only#";

/// RSA modulus for the SSH host key.
pub const RSA_MODULUS_BITS: u32 = 1024;

/// Reach global configuration and set the hostname.
///
/// Works from a fresh console as well as from one left with a console and
/// enable password by an earlier run.
pub fn preamble(hostname: &str, credentials: &Credentials) -> Script {
    let enable = credentials.enable.expose_secret();

    ScriptBuilder::new()
        .send("")
        .reply_hidden("Password:", enable)
        .expect_any_prompt(">#")
        .send("enable")
        .reply_hidden("Password:", enable)
        .expect_any_prompt("#")
        .send("configure terminal")
        .expect_any_host(CliMode::GlobalConfig)
        .send(format!("hostname {hostname}"))
        .expect_mode(CliMode::GlobalConfig)
        .build()
}

/// Banner, console login and the SSH bootstrap.
pub fn trailer(credentials: &Credentials, timings: &Timings) -> Script {
    let enable = credentials.enable.expose_secret();
    let password = credentials.password.expose_secret();

    ScriptBuilder::new()
        .send(format!("banner motd {BANNER}"))
        .expect_mode(CliMode::GlobalConfig)
        .send("line console 0")
        .expect_mode(CliMode::LineConfig)
        .send_hidden(format!("password {enable}"))
        .expect_mode(CliMode::LineConfig)
        .send("login")
        .expect_mode(CliMode::LineConfig)
        .send("exit")
        .expect_mode(CliMode::GlobalConfig)
        .send("ip domain name local")
        .expect_mode(CliMode::GlobalConfig)
        .send_hidden(format!(
            "username {} secret {}",
            credentials.username, password
        ))
        .expect_mode(CliMode::GlobalConfig)
        .send("crypto key generate rsa")
        .reply("[yes/no]", "yes")
        .expect_literal("How many bits in the modulus")
        .send(RSA_MODULUS_BITS.to_string())
        .with_timeout(timings.key_generation)
        .expect_mode(CliMode::GlobalConfig)
        .send("ip ssh version 2")
        .expect_mode(CliMode::GlobalConfig)
        .send("line vty 0 4")
        .expect_mode(CliMode::LineConfig)
        .send("login local")
        .expect_mode(CliMode::LineConfig)
        .send("transport input ssh")
        .expect_mode(CliMode::LineConfig)
        .send("exit")
        .expect_mode(CliMode::GlobalConfig)
        .build()
}

/// `ip address` line for an interface prefix, with the fixed /24 mask.
pub fn address_command(ipv4: &Ipv4Network) -> String {
    format!("ip address {} {}", ipv4.ip(), INTERFACE_MASK)
}

/// The /24 network containing `address`.
pub fn class_c_network(address: Ipv4Addr) -> Ipv4Addr {
    let [a, b, c, _] = address.octets();
    Ipv4Addr::new(a, b, c, 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::driver::Expect;
    use secrecy::SecretString;

    pub(crate) fn credentials() -> Credentials {
        Credentials {
            username: "admin".into(),
            password: SecretString::from("admin123"),
            enable: SecretString::from("cisco"),
        }
    }

    #[test]
    fn test_preamble_reaches_global_config() {
        let script = preamble("R1", &credentials());
        assert_eq!(
            script.commands(),
            ["", "enable", "configure terminal", "hostname R1"]
        );
        assert_eq!(
            script.steps()[2].expect,
            Expect::AnyHost(CliMode::GlobalConfig)
        );
        assert_eq!(script.steps()[3].expect, Expect::Mode(CliMode::GlobalConfig));
        assert_eq!(script.steps()[1].replies[0].answer, "cisco");
    }

    #[test]
    fn test_trailer_hides_secrets() {
        let script = trailer(&credentials(), &Timings::default());

        let hidden: Vec<&str> = script
            .steps()
            .iter()
            .filter(|s| s.hidden)
            .map(|s| s.input.as_str())
            .collect();
        assert_eq!(hidden, ["password cisco", "username admin secret admin123"]);
    }

    #[test]
    fn test_key_generation_uses_long_timeout() {
        let timings = Timings::default();
        let script = trailer(&credentials(), &timings);

        let crypto = script.position("crypto key generate rsa").unwrap();
        let modulus = &script.steps()[crypto + 1];
        assert_eq!(modulus.input, "1024");
        assert_eq!(modulus.timeout, Some(timings.key_generation));
        assert_eq!(
            script.steps()[crypto].expect,
            Expect::Literal("How many bits in the modulus".into())
        );
    }

    #[test]
    fn test_address_command_uses_fixed_mask() {
        let net: Ipv4Network = "10.0.10.1/16".parse().unwrap();
        assert_eq!(address_command(&net), "ip address 10.0.10.1 255.255.255.0");
        assert_eq!(
            class_c_network(Ipv4Addr::new(10, 0, 10, 1)),
            Ipv4Addr::new(10, 0, 10, 0)
        );
    }
}
