//! Pattern helpers for prompt and marker detection.

use std::time::Duration;

use regex::bytes::{Regex, RegexBuilder};

/// Hostname characters accepted in a prompt.
const HOSTNAME_CLASS: &str = r"[A-Za-z0-9_.\-]+";

/// Result of a successful `expect`.
#[derive(Debug, Clone)]
pub struct ExpectMatch {
    /// Index of the pattern that matched.
    pub index: usize,

    /// The matched text.
    pub matched: String,

    /// Output received before the match.
    pub before: String,

    /// Time spent waiting.
    pub elapsed: Duration,
}

/// Compile a literal string (escaped) into a pattern.
///
/// With `case_insensitive`, ASCII case is ignored, as used for markers such
/// as "bytes from".
pub fn compile_literal(text: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(text))
        .case_insensitive(case_insensitive)
        .build()
}

/// Compile a list of regex sources.
pub fn compile_patterns<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Regex>, regex::Error> {
    sources.iter().map(|s| Regex::new(s.as_ref())).collect()
}

/// Pattern matching any exec or configuration prompt of any hostname,
/// anchored at a line start: `Router>`, `R1#`, `SW1(config-if)#`.
pub fn any_prompt(terminators: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?m)^{HOSTNAME_CLASS}(?:\({HOSTNAME_CLASS}\))?[{}]",
        regex::escape(terminators)
    ))
}

/// Pattern source matching any hostname followed by `marker`.
pub(crate) fn any_host_source(marker: &str) -> String {
    format!(r"(?m)^{HOSTNAME_CLASS}{}", regex::escape(marker))
}

/// The last `count` lines of `text`, after trimming surrounding whitespace
/// from the whole text.
pub fn line_tail(text: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = text
        .trim()
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].to_vec()
}
