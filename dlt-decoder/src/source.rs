//! Memory-mapped byte source
//!
//! Exposes a whole file as one immutable byte slice without copying it, and
//! bundles it with a text arena so a decoded [`RecordSet`] can borrow both.

use crate::arena::TextArena;
use crate::config::DecoderConfig;
use crate::decoder::Decoder;
use crate::record_set::RecordSet;
use crate::types::Result;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only mapping of an entire file
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    // Zero-length files cannot be mapped
    map: Option<Mmap>,
}

impl MappedFile {
    /// Open and map `path` read-only
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("Mapping {:?}", path);
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let map = if len == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only and lives as long as `self`;
            // the file must not be truncated by another process meanwhile.
            Some(unsafe { Mmap::map(&file)? })
        };
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A mapped DLT file together with the arena its records will use
///
/// # Example
/// ```no_run
/// use dlt_decoder::{DecoderConfig, DltFile};
/// use std::path::Path;
///
/// let mut file = DltFile::open(Path::new("trace.dlt"), DecoderConfig::new()).unwrap();
/// let records = file.decode().unwrap();
/// for payload in records.payloads() {
///     println!("{}", payload);
/// }
/// ```
#[derive(Debug)]
pub struct DltFile {
    source: MappedFile,
    arena: TextArena,
    decoder: Decoder,
}

impl DltFile {
    pub fn open(path: &Path, config: DecoderConfig) -> Result<Self> {
        let source = MappedFile::open(path)?;
        let decoder = Decoder::with_config(config);
        let arena = decoder.arena_for(source.as_bytes());
        Ok(Self {
            source,
            arena,
            decoder,
        })
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    pub fn source(&self) -> &MappedFile {
        &self.source
    }

    /// Decode the whole file
    ///
    /// The arena is reset first, so decoding again is allowed once the
    /// previous record set has been dropped.
    pub fn decode(&mut self) -> Result<RecordSet<'_>> {
        self.arena.clear();
        self.decoder.decode(self.source.as_bytes(), &mut self.arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_not_found() {
        let result = MappedFile::open(Path::new("nonexistent.dlt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_file_maps_to_empty_slice() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn test_mapped_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"DLT\x01abc").unwrap();
        file.flush().unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();
        assert_eq!(mapped.as_bytes(), b"DLT\x01abc");
        assert_eq!(mapped.path(), file.path());
    }
}
