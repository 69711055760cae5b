//! DLT Decoder Library
//!
//! Decodes AUTOSAR DLT (Diagnostic Log and Trace) storage files into
//! column-wise records: timestamps, identifiers, header flags and one
//! normalized text payload per record.
//!
//! # Architecture
//!
//! - The input is one immutable byte slice covering the whole file (usually a
//!   memory mapping, see [`MappedFile`]). It is sliced, never copied.
//! - [`Decoder`] walks the slice once and fills a [`RecordSet`].
//! - Text that has to be computed (numbers, hex dumps, joined arguments) is
//!   written to a fixed-capacity [`TextArena`]; text that exists verbatim in
//!   the file is borrowed from it.
//!
//! The library does NOT:
//! - Write or re-encode DLT files
//! - Receive DLT over the network
//! - Filter records
//! - Recover from corrupt input (the first structural error aborts the decode)
//!
//! # Example Usage
//!
//! ```no_run
//! use dlt_decoder::{Decoder, MappedFile};
//! use std::path::Path;
//!
//! let file = MappedFile::open(Path::new("trace.dlt")).unwrap();
//! let decoder = Decoder::new();
//! let mut arena = decoder.arena_for(file.as_bytes());
//! let records = decoder.decode(file.as_bytes(), &mut arena).unwrap();
//!
//! for record in records.iter() {
//!     println!("{} {} {}", record.app_id, record.ctx_id, record.payload);
//! }
//! ```

// Public modules
pub mod arena;
pub mod config;
pub mod decoder;
pub mod protocol;
pub mod record_set;
pub mod source;
pub mod tables;
pub mod types;

// Re-export main types for convenience
pub use arena::{ArenaError, TextArena, TextSpan};
pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use record_set::{RecordSet, RecordView};
pub use source::{DltFile, MappedFile};
pub use types::{DecodeError, Endianness, ErrorKind, Result, Timestamp};

// Internal modules (not exposed in public API)
mod cursor;
mod payload;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
