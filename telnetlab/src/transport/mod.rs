//! Telnet transport layer over TCP.
//!
//! This module provides the low-level connection management: opening the
//! TCP stream, answering Telnet option negotiation, and moving raw bytes.

pub mod config;
pub(crate) mod negotiation;
mod telnet;

pub use config::TelnetConfig;
pub use negotiation::{TelnetDecoder, escape_iac};
pub use telnet::TelnetTransport;
