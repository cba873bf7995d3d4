//! Ping output classification.

use crate::channel::line_tail;

/// Number of trailing lines searched for the success marker.
pub const TAIL_LINES: usize = 5;

/// Whether any of the last [`TAIL_LINES`] lines of `output` contains
/// `marker`, ignoring case.
pub fn is_reachable(output: &str, marker: &str) -> bool {
    let marker = marker.to_lowercase();
    line_tail(output, TAIL_LINES)
        .iter()
        .any(|line| line.to_lowercase().contains(&marker))
}
