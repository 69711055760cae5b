//! Main decoder API
//!
//! [`Decoder::decode`] walks a complete DLT storage file in a single forward
//! pass and returns the [`RecordSet`] of all records, or the first structural
//! error. There is no partial result: a failure anywhere discards every
//! record decoded so far.
//!
//! Per record the layout is:
//!
//! ```text
//! storage header   pattern[4] seconds:u32 microseconds:i32 ecu[4]
//! standard header  htyp:u8 mcnt:u8 len:u16 (always big-endian)
//! extras           [ecu[4]] [session_id:u32] [timestamp:u32]   (per htyp)
//! extended header  [msin:u8 noar:u8 apid[4] ctid[4]]            (if UEH)
//! payload          len + 16 - header bytes
//! ```

use crate::arena::{ArenaError, TextArena};
use crate::config::DecoderConfig;
use crate::cursor::ByteCursor;
use crate::payload::{decode_nonverbose, decode_verbose, Argument, ControlNames};
use crate::protocol::*;
use crate::record_set::{RecordSet, RecordSetBuilder, Row, TextRef};
use crate::types::{DecodeError, Endianness, Result};

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Create a text arena sized for `source`
    pub fn arena_for(&self, source: &[u8]) -> TextArena {
        TextArena::for_source(source.len(), self.config.arena_expansion_factor)
    }

    /// Decode a complete DLT storage file
    ///
    /// # Arguments
    /// * `source` - The whole file; text columns borrow from it
    /// * `arena` - Store for synthesized text; see [`Decoder::arena_for`]
    ///
    /// # Returns
    /// * `Result<RecordSet>` - All records, or the first structural error
    ///
    /// # Example
    /// ```
    /// use dlt_decoder::Decoder;
    ///
    /// let source: &[u8] = &[];
    /// let decoder = Decoder::new();
    /// let mut arena = decoder.arena_for(source);
    /// let records = decoder.decode(source, &mut arena).unwrap();
    /// assert!(records.is_empty());
    /// ```
    pub fn decode<'a>(&self, source: &'a [u8], arena: &'a mut TextArena) -> Result<RecordSet<'a>> {
        log::info!("Decoding {} bytes of DLT data", source.len());

        let mut pass = DecodePass {
            cursor: ByteCursor::new(source),
            arena,
            storage_order: self.config.storage_byte_order,
            args: Vec::new(),
        };
        let mut records = RecordSetBuilder::with_capacity(self.config.estimated_records(source.len()));

        while !pass.cursor.is_empty() {
            let start = pass.cursor.offset();
            let row = pass.next_record().map_err(|e| {
                log::debug!("Decode aborted in record {} starting at offset {}: {}", records.len(), start, e);
                e
            })?;
            log::trace!(
                "Record {} at offset {}: htyp 0x{:02x}, len {}",
                records.len(),
                start,
                row.header_type,
                row.length
            );
            records.push(row);
        }

        let DecodePass { arena, .. } = pass;
        let arena: &'a TextArena = arena;
        log::info!(
            "Decoded {} records, {} of {} text arena bytes used",
            records.len(),
            arena.len(),
            arena.capacity()
        );
        Ok(records.finish(arena))
    }
}

/// State of one decode: the input position, the arena being filled and a
/// reusable argument buffer
struct DecodePass<'a> {
    cursor: ByteCursor<'a>,
    arena: &'a mut TextArena,
    storage_order: Endianness,
    args: Vec<Argument<'a>>,
}

impl<'a> DecodePass<'a> {
    fn next_record(&mut self) -> Result<Row<'a>> {
        // Storage header
        let record_offset = self.cursor.offset();
        let pattern = self.cursor.take(DLT_ID_SIZE)?;
        if pattern != DLT_PATTERN {
            let mut found = [0u8; 4];
            found.copy_from_slice(pattern);
            return Err(DecodeError::InvalidMagic {
                offset: record_offset,
                found,
            });
        }
        let seconds = self.cursor.read_u32(self.storage_order)?;
        let microseconds = self.cursor.read_i32(self.storage_order)?;
        let mut ecu_id = self.cursor.take(DLT_ID_SIZE)?;

        // Standard header
        let header_type = self.cursor.read_u8()?;
        let message_counter = self.cursor.read_u8()?;
        let length = self.cursor.read_u16(Endianness::Big)?;
        if htyp_version(header_type) != DLT_HTYP_PROTOCOL_VERSION {
            log::warn!(
                "Record at offset {} has protocol version {}",
                record_offset,
                htyp_version(header_type)
            );
        }

        // Standard header extras
        let order = htyp_endianness(header_type);
        if is_htyp_weid(header_type) {
            ecu_id = self.cursor.take(DLT_ID_SIZE)?;
        }
        let session_id = if is_htyp_wsid(header_type) {
            self.cursor.read_u32(order)?
        } else {
            0
        };
        let timestamp = if is_htyp_wtms(header_type) {
            self.cursor.read_u32(order)?
        } else {
            0
        };

        // Extended header
        let mut message_info = 0;
        let mut argument_count = 0;
        let mut app_id = TextRef::Borrowed("");
        let mut ctx_id = TextRef::Borrowed("");
        if is_htyp_ueh(header_type) {
            message_info = self.cursor.read_u8()?;
            argument_count = self.cursor.read_u8()?;
            let apid = self.cursor.take(DLT_ID_SIZE)?;
            let ctid = self.cursor.take(DLT_ID_SIZE)?;
            app_id = self.id_text(apid)?;
            ctx_id = self.id_text(ctid)?;
        }

        // Payload
        let headers = header_size(header_type);
        let payload_len = (usize::from(length) + STORAGE_HEADER_SIZE)
            .checked_sub(headers)
            .ok_or(DecodeError::PayloadSizeMismatch {
                offset: record_offset,
                declared: length,
                headers: headers - STORAGE_HEADER_SIZE,
            })?;
        let payload_offset = self.cursor.offset();
        let payload = self.cursor.take(payload_len)?;

        let (names, payload) = self.payload_text(payload, payload_offset, header_type, message_info, argument_count)?;

        Ok(Row {
            pattern: self.id_text(pattern)?,
            seconds,
            microseconds,
            ecu_id: self.id_text(ecu_id)?,
            header_type,
            message_counter,
            length,
            session_id,
            timestamp,
            message_info,
            argument_count,
            app_id,
            ctx_id,
            service_id_name: names.service_id_name,
            return_type_name: names.return_type_name,
            payload,
        })
    }

    fn payload_text(
        &mut self,
        payload: &'a [u8],
        offset: usize,
        htyp: u8,
        msin: u8,
        argument_count: u8,
    ) -> Result<(ControlNames, TextRef<'a>)> {
        let mut cursor = ByteCursor::with_base(payload, offset);
        self.args.clear();

        let names = if is_nonverbose(htyp, msin) {
            decode_nonverbose(&mut cursor, htyp, msin, &mut self.args)?
        } else {
            decode_verbose(&mut cursor, htyp, argument_count, &mut self.args)?;
            ControlNames::default()
        };

        let text = match self.args.as_slice() {
            [] => TextRef::Borrowed(""),
            [single] => match single.as_source_str() {
                Some(text) => TextRef::Borrowed(text),
                None => TextRef::Arena(self.arena.store(single).map_err(exhausted)?),
            },
            many => TextRef::Arena(self.arena.store_joined(many).map_err(exhausted)?),
        };
        Ok((names, text))
    }

    /// Identifier fields are views into the source unless they are not valid
    /// UTF-8, in which case a lossy copy goes to the arena
    fn id_text(&mut self, bytes: &'a [u8]) -> Result<TextRef<'a>> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(TextRef::Borrowed(text)),
            Err(_) => {
                let lossy = String::from_utf8_lossy(bytes);
                let span = self.arena.store(&*lossy).map_err(exhausted)?;
                Ok(TextRef::Arena(span))
            }
        }
    }
}

/// The arena is sized so that this cannot happen for any input; reaching it
/// means the caller handed in an undersized arena.
fn exhausted(err: ArenaError) -> DecodeError {
    debug_assert!(false, "text arena undersized: {}", err);
    err.into()
}

impl From<ArenaError> for DecodeError {
    fn from(err: ArenaError) -> Self {
        match err {
            ArenaError::Exhausted {
                requested,
                remaining,
                capacity,
                ..
            } => DecodeError::ArenaExhausted {
                requested,
                remaining,
                capacity,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    /// Minimal record: storage header + standard header (no extras) + payload
    fn record(htyp: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"DLT\x01");
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.extend_from_slice(&20i32.to_le_bytes());
        bytes.extend_from_slice(b"ECU1");
        bytes.push(htyp);
        bytes.push(0);
        bytes.extend_from_slice(&((4 + payload.len()) as u16).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_decoder_creation() {
        let decoder = Decoder::new();
        assert_eq!(decoder.config(), &DecoderConfig::default());
        let arena = decoder.arena_for(&[0u8; 10]);
        assert_eq!(arena.capacity(), 30 + 64);
    }

    #[test]
    fn test_empty_source() {
        let decoder = Decoder::new();
        let mut arena = decoder.arena_for(&[]);
        let records = decoder.decode(&[], &mut arena).unwrap();
        assert_eq!(records.len(), 0);
    }

    #[test]
    fn test_nonverbose_without_extended_header() {
        let source = record(0x20, &[0x65, 0x00, 0x00, 0x00]);
        let decoder = Decoder::new();
        let mut arena = decoder.arena_for(&source);
        let records = decoder.decode(&source, &mut arena).unwrap();
        assert_eq!(records.payloads(), &["101"]);
        assert_eq!(records.ecu_ids(), &["ECU1"]);
        assert_eq!(records.app_ids(), &[""]);
        assert_eq!(records.seconds(), &[10]);
        assert_eq!(records.microseconds(), &[20]);
        assert_eq!(records.lengths(), &[8]);
    }

    #[test]
    fn test_length_smaller_than_headers() {
        let mut source = record(0x20, &[]);
        // declared length 2 < standard header size
        source[18] = 0;
        source[19] = 2;
        let decoder = Decoder::new();
        let mut arena = decoder.arena_for(&source);
        let err = decoder.decode(&source, &mut arena).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadSizeMismatch);
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn test_storage_header_big_endian_config() {
        let mut source = record(0x20, &[0x65, 0x00, 0x00, 0x00]);
        source[4..8].copy_from_slice(&10u32.to_be_bytes());
        source[8..12].copy_from_slice(&20i32.to_be_bytes());
        let decoder = Decoder::with_config(DecoderConfig::new().with_storage_byte_order(Endianness::Big));
        let mut arena = decoder.arena_for(&source);
        let records = decoder.decode(&source, &mut arena).unwrap();
        assert_eq!(records.seconds(), &[10]);
        assert_eq!(records.microseconds(), &[20]);
    }

    #[test]
    fn test_invalid_utf8_ecu_goes_through_arena() {
        let mut source = record(0x20, &[0x01, 0x00, 0x00, 0x00]);
        source[12..16].copy_from_slice(&[0xff, b'C', b'U', 0x00]);
        let decoder = Decoder::new();
        let mut arena = decoder.arena_for(&source);
        let records = decoder.decode(&source, &mut arena).unwrap();
        assert_eq!(records.ecu_ids(), &["\u{fffd}CU\0"]);
    }
}
