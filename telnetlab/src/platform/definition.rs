//! Platform definition for the device CLI dialect.

/// Platform definition containing the dialect-specific constants.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios").
    pub name: String,

    /// Patterns that indicate a command was rejected.
    pub failed_when_contains: Vec<String>,

    /// Byte that interrupts a running command (Ctrl-C).
    pub interrupt: u8,

    /// Command that disables output paging.
    pub disable_paging: String,

    /// Command that prints the running configuration.
    pub show_config: String,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failed_when_contains: vec![],
            interrupt: 0x03,
            disable_paging: "terminal length 0".to_string(),
            show_config: "show running-config".to_string(),
        }
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Set the interrupt byte.
    pub fn with_interrupt(mut self, byte: u8) -> Self {
        self.interrupt = byte;
        self
    }

    /// Set the paging and configuration dump commands.
    pub fn with_dump_commands(
        mut self,
        disable_paging: impl Into<String>,
        show_config: impl Into<String>,
    ) -> Self {
        self.disable_paging = disable_paging.into();
        self.show_config = show_config.into();
        self
    }

    /// Return the first failure pattern found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}

impl Default for PlatformDefinition {
    fn default() -> Self {
        super::ios::platform()
    }
}
