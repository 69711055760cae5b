//! Core types for the DLT decoder library
//!
//! This module defines the error type returned by every fallible decoder
//! operation and a few small value types shared across modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Byte order of a multi-byte field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little"),
            Endianness::Big => write!(f, "big"),
        }
    }
}

/// Errors that can occur during decoding
///
/// Every structural error aborts the whole decode. `offset` is the absolute
/// position in the source at which the decoder gave up.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid storage header pattern {found:02x?} at offset {offset}")]
    InvalidMagic { offset: usize, found: [u8; 4] },

    #[error("Truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unsupported encoding at offset {offset} (type info 0x{type_info:08x}): {what}")]
    UnsupportedEncoding {
        offset: usize,
        type_info: u32,
        what: &'static str,
    },

    #[error("Unknown type info 0x{type_info:08x} at offset {offset}")]
    UnknownTypeInfo { offset: usize, type_info: u32 },

    #[error("Declared length {declared} at offset {offset} is smaller than the {headers} header bytes")]
    PayloadSizeMismatch {
        offset: usize,
        declared: u16,
        headers: usize,
    },

    #[error("Text arena exhausted: {requested} bytes requested, {remaining} of {capacity} left")]
    ArenaExhausted {
        requested: usize,
        remaining: usize,
        capacity: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of a [`DecodeError`], without the positional details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidMagic,
    Truncated,
    UnsupportedEncoding,
    UnknownTypeInfo,
    PayloadSizeMismatch,
    ArenaExhausted,
    Io,
}

impl DecodeError {
    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidMagic { .. } => ErrorKind::InvalidMagic,
            DecodeError::Truncated { .. } => ErrorKind::Truncated,
            DecodeError::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            DecodeError::UnknownTypeInfo { .. } => ErrorKind::UnknownTypeInfo,
            DecodeError::PayloadSizeMismatch { .. } => ErrorKind::PayloadSizeMismatch,
            DecodeError::ArenaExhausted { .. } => ErrorKind::ArenaExhausted,
            DecodeError::Io(_) => ErrorKind::Io,
        }
    }

    /// Byte offset at which decoding stopped, if the error is positional
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::InvalidMagic { offset, .. }
            | DecodeError::Truncated { offset, .. }
            | DecodeError::UnsupportedEncoding { offset, .. }
            | DecodeError::UnknownTypeInfo { offset, .. }
            | DecodeError::PayloadSizeMismatch { offset, .. } => Some(*offset),
            DecodeError::ArenaExhausted { .. } | DecodeError::Io(_) => None,
        }
    }
}
