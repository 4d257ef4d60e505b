//! Serializer configuration

use crate::error::{Error, Result};

/// Default ceiling on nested composites (arrays, objects, XML)
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default initial output buffer size
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Serializer configuration options
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Maximum nesting of composite values
    ///
    /// A value nested deeper than this fails the whole call with
    /// `DepthExceeded`.
    pub max_depth: usize,

    /// Maximum output size in bytes (None = unlimited)
    pub max_output_len: Option<usize>,

    /// Initial output buffer capacity
    pub initial_capacity: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_output_len: None,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl SerializerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Limit the output size
    pub fn max_output_len(mut self, len: usize) -> Self {
        self.max_output_len = Some(len);
        self
    }

    /// Set the initial output buffer capacity
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Check the options for values that make every call fail
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::constraint("max_depth must be at least 1"));
        }
        if self.max_output_len == Some(0) {
            return Err(Error::constraint("max_output_len must be at least 1"));
        }
        Ok(())
    }
}
