//! Decoder configuration types
//!
//! The decoder needs very little configuration: the byte order of the
//! storage header (written by the capturing host) and two sizing hints.

use crate::arena::MIN_EXPANSION_FACTOR;
use crate::types::Endianness;
use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Byte order of the storage header `seconds`/`microseconds` fields
    #[serde(default)]
    pub storage_byte_order: Endianness,

    /// Expected bytes per record, used to pre-size the output columns
    #[serde(default = "default_average_record_size")]
    pub average_record_size: usize,

    /// Text arena capacity as a multiple of the source size (minimum 3)
    #[serde(default = "default_arena_expansion_factor")]
    pub arena_expansion_factor: usize,
}

fn default_average_record_size() -> usize {
    32
}

fn default_arena_expansion_factor() -> usize {
    MIN_EXPANSION_FACTOR
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            storage_byte_order: Endianness::Little,
            average_record_size: default_average_record_size(),
            arena_expansion_factor: default_arena_expansion_factor(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the storage header byte order
    pub fn with_storage_byte_order(mut self, order: Endianness) -> Self {
        self.storage_byte_order = order;
        self
    }

    /// Builder method: set the expected average record size
    pub fn with_average_record_size(mut self, size: usize) -> Self {
        self.average_record_size = size;
        self
    }

    /// Builder method: set the arena expansion factor
    pub fn with_arena_expansion_factor(mut self, factor: usize) -> Self {
        self.arena_expansion_factor = factor;
        self
    }

    /// Number of rows to reserve for a source of `source_len` bytes
    pub fn estimated_records(&self, source_len: usize) -> usize {
        source_len / self.average_record_size.max(1)
    }
}
