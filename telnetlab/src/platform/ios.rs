//! Cisco IOS platform definition.
//!
//! Routers and switches in the lab run IOS (or an emulated image of it).
//! Prompts follow the `hostname<marker>` convention described in
//! [`CliMode`](super::CliMode); PCs are VPCS instances with a `name>` prompt
//! and do not use this platform's mode tree.

use super::PlatformDefinition;

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new("cisco_ios")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Unknown command")
        .with_interrupt(0x03)
        .with_dump_commands("terminal length 0", "show running-config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_ios");
        assert_eq!(platform.interrupt, 0x03);
        assert_eq!(platform.disable_paging, "terminal length 0");
        assert_eq!(platform.show_config, "show running-config");
    }

    #[test]
    fn test_detect_failure() {
        let platform = platform();
        let output = "ip add 10.0.0.1\r\n% Incomplete command.\r\n";
        assert_eq!(platform.detect_failure(output), Some("% Incomplete command"));
        assert_eq!(platform.detect_failure("R1(config-if)#"), None);
    }
}
