//! CLI modes and their prompt markers.

use std::fmt;

use regex::bytes::Regex;

use crate::channel::{any_host_source, compile_literal};

/// A command mode of the device CLI.
///
/// Modes form a tree rooted at user exec: `enable` escalates to privileged
/// exec, `configure terminal` enters global configuration, and sub-mode
/// commands (`interface`, `vlan`, `router`, `line`, `ip dhcp pool`) descend
/// one more level. `exit` climbs back one level.
///
/// ```text
/// Router>                  user exec
/// Router#                  privileged exec
/// Router(config)#          global configuration
/// Router(config-if)#       interface
/// Router(config-subif)#    sub-interface
/// Router(config-vlan)#     vlan
/// Router(config-router)#   routing process
/// Router(config-line)#     console / vty lines
/// Router(dhcp-config)#     DHCP pool
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CliMode {
    UserExec,
    PrivilegedExec,
    GlobalConfig,
    InterfaceConfig,
    SubinterfaceConfig,
    VlanConfig,
    RouterConfig,
    LineConfig,
    DhcpConfig,
}

impl CliMode {
    /// Every mode, most specific markers first.
    pub const ALL: [CliMode; 9] = [
        CliMode::SubinterfaceConfig,
        CliMode::InterfaceConfig,
        CliMode::VlanConfig,
        CliMode::RouterConfig,
        CliMode::LineConfig,
        CliMode::DhcpConfig,
        CliMode::GlobalConfig,
        CliMode::PrivilegedExec,
        CliMode::UserExec,
    ];

    /// The text following the hostname in this mode's prompt.
    pub fn marker(self) -> &'static str {
        match self {
            CliMode::UserExec => ">",
            CliMode::PrivilegedExec => "#",
            CliMode::GlobalConfig => "(config)#",
            CliMode::InterfaceConfig => "(config-if)#",
            CliMode::SubinterfaceConfig => "(config-subif)#",
            CliMode::VlanConfig => "(config-vlan)#",
            CliMode::RouterConfig => "(config-router)#",
            CliMode::LineConfig => "(config-line)#",
            CliMode::DhcpConfig => "(dhcp-config)#",
        }
    }

    /// The mode `exit` returns to.
    pub fn parent(self) -> Option<CliMode> {
        match self {
            CliMode::UserExec => None,
            CliMode::PrivilegedExec => Some(CliMode::UserExec),
            CliMode::GlobalConfig => Some(CliMode::PrivilegedExec),
            _ => Some(CliMode::GlobalConfig),
        }
    }

    /// Whether this is global configuration or one of its sub-modes.
    pub fn is_config(self) -> bool {
        !matches!(self, CliMode::UserExec | CliMode::PrivilegedExec)
    }

    /// The exact prompt for `hostname` in this mode.
    pub fn prompt(self, hostname: &str) -> String {
        format!("{}{}", hostname, self.marker())
    }

    /// Pattern matching this mode's prompt for `hostname`.
    pub fn pattern(self, hostname: &str) -> Result<Regex, regex::Error> {
        compile_literal(&self.prompt(hostname), false)
    }

    /// Pattern matching this mode's prompt for any hostname.
    ///
    /// Used before the hostname has been set on the device.
    pub fn any_host_pattern(self) -> Result<Regex, regex::Error> {
        Regex::new(&any_host_source(self.marker()))
    }

    /// Determine the mode from a prompt string such as `R1(config-if)#`.
    pub fn from_prompt(prompt: &str) -> Option<CliMode> {
        let prompt = prompt.trim_end();
        CliMode::ALL.into_iter().find(|mode| {
            let Some(rest) = prompt.strip_suffix(mode.marker()) else {
                return false;
            };
            // Bare `#` / `>` must not swallow a parenthesised mode
            !rest.is_empty() && !rest.ends_with(')')
        })
    }
}

impl fmt::Display for CliMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CliMode::UserExec => "user-exec",
            CliMode::PrivilegedExec => "privileged",
            CliMode::GlobalConfig => "global-config",
            CliMode::InterfaceConfig => "interface-config",
            CliMode::SubinterfaceConfig => "subinterface-config",
            CliMode::VlanConfig => "vlan-config",
            CliMode::RouterConfig => "router-config",
            CliMode::LineConfig => "line-config",
            CliMode::DhcpConfig => "dhcp-config",
        };
        f.write_str(name)
    }
}
