//! Pattern buffer with tail-search prompt detection.
//!
//! Only the last `search_depth` bytes are searched for the prompt, so long
//! outputs (full running-configs, large MAC tables) do not make every read
//! quadratic.

use regex::bytes::Regex;

/// Buffer for accumulating shell output and finding the trailing prompt.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated output, ANSI escape sequences removed.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Find a pattern match that ends the buffer.
    ///
    /// Trailing whitespace after the match is allowed (switches print
    /// `sw0# ` with a space). Returns the absolute offset where the match
    /// starts, so everything before it is command output.
    pub fn find_trailing(&self, pattern: &Regex) -> Option<usize> {
        let start = self.tail_start();
        let tail = &self.buffer[start..];
        let content_end = tail
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);

        pattern
            .find_iter(tail)
            .filter(|m| m.end() >= content_end)
            .last()
            .map(|m| start + m.start())
    }

    /// Split off everything before `offset` and clear the buffer.
    ///
    /// Returns `(output, matched)` where `matched` is the text from `offset`
    /// to the end (normally the prompt).
    pub fn take_split(&mut self, offset: usize) -> (Vec<u8>, Vec<u8>) {
        let mut output = std::mem::take(&mut self.buffer);
        let matched = output.split_off(offset.min(output.len()));
        (output, matched)
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
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

    fn tail_start(&self) -> usize {
        self.buffer.len().saturating_sub(self.search_depth)
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
