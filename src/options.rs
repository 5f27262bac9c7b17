//! Parse Configuration

/// What to do with a table, column or reference that lacks a required field
///
/// Tables need a `Code`, columns a `Name`, references both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncompletePolicy {
    /// Omit the entity from the graph and log a warning
    #[default]
    Drop,
    /// Abort the parse with `Error::MissingField`
    Reject,
}

/// Options shared by every parse entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub incomplete: IncompletePolicy,
    /// Read size used when pulling from a file or reader
    pub chunk_size: usize,
}

impl ParseOptions {
    pub const DEFAULT_CHUNK_SIZE: usize = 8192;

    /// Lenient options: incomplete entities are dropped
    pub fn new() -> Self {
        ParseOptions {
            incomplete: IncompletePolicy::Drop,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Strict options: incomplete entities abort the parse
    pub fn strict() -> Self {
        ParseOptions {
            incomplete: IncompletePolicy::Reject,
            ..Self::new()
        }
    }

    /// Set how incomplete tables, columns and references are handled
    pub fn with_incomplete(mut self, policy: IncompletePolicy) -> Self {
        self.incomplete = policy;
        self
    }

    /// Set the read size for reader and file input (minimum 1 byte)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
