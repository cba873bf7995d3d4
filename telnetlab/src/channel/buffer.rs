//! Pattern buffer with tail-search and consume-through-match semantics.
//!
//! Prompt detection only searches the last N bytes of the buffer; device
//! output such as a full running configuration can be large, while the prompt
//! we are waiting for is always at the end.

use std::fmt;

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// A pattern match located in the buffer, with absolute byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMatch {
    /// Index of the matching pattern in the slice given to `find_earliest`.
    pub index: usize,
    /// Start offset in the buffer.
    pub start: usize,
    /// End offset in the buffer.
    pub end: usize,
}

/// Collects printable output and line controls, dropping escape sequences.
struct AnsiStripper<'a> {
    out: &'a mut Vec<u8>,
}

impl Perform for AnsiStripper<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out
            .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}

/// Buffer for accumulating output and searching it for patterns.
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Escape-sequence parser; keeps state across chunks.
    parser: Parser,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut stripper = AnsiStripper {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut stripper, data);
    }

    /// Offset where the searchable tail begins.
    fn tail_start(&self) -> usize {
        self.buffer.len().saturating_sub(self.search_depth)
    }

    /// Search the tail for each pattern and return the match that ends
    /// first. Ties go to the pattern listed first.
    pub fn find_earliest(&self, patterns: &[Regex]) -> Option<BufferMatch> {
        let offset = self.tail_start();
        let tail = &self.buffer[offset..];

        patterns
            .iter()
            .enumerate()
            .filter_map(|(index, pattern)| {
                pattern.find(tail).map(|m| BufferMatch {
                    index,
                    start: offset + m.start(),
                    end: offset + m.end(),
                })
            })
            .min_by_key(|m| (m.end, m.index))
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.buffer[self.tail_start()..])
    }

    /// Remove and return everything up to `end`.
    pub fn consume_through(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.buffer.len());
        self.buffer.drain(..end).collect()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// The last `max` bytes as a string, for error messages.
    pub fn tail_lossy(&self, max: usize) -> String {
        let start = self.buffer.len().saturating_sub(max);
        String::from_utf8_lossy(&self.buffer[start..]).into_owned()
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the search depth setting.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}
