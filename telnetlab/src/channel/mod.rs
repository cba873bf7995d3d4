//! Channel layer for pattern matching on device output.
//!
//! This module handles output accumulation, ANSI stripping and
//! pattern-based prompt detection.

mod buffer;
mod patterns;

pub use buffer::{BufferMatch, PatternBuffer};
pub use patterns::{ExpectMatch, any_prompt, compile_literal, compile_patterns, line_tail};
pub(crate) use patterns::any_host_source;
