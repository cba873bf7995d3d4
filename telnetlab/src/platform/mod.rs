//! Platform definitions for the device CLI dialect.
//!
//! This module defines the CLI modes, their prompt markers and the
//! dialect constants (failure markers, interrupt byte, dump commands).

mod definition;
pub mod ios;
mod mode;

pub use definition::PlatformDefinition;
pub use mode::CliMode;
