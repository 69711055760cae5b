//! Column-wise storage of decoded records
//!
//! A [`RecordSet`] holds one vector per record field. Text columns are `&str`
//! views either into the source bytes or into the [`TextArena`] used during
//! decoding; the `'a` lifetime ties the set to both, so neither backing
//! store can be dropped or mutated while the set is alive.

use crate::arena::{TextArena, TextSpan};
use crate::protocol::{htyp_version, is_nonverbose, msin_mstp};
use crate::tables;
use crate::types::Timestamp;
use chrono::DateTime;
use serde::Serialize;

/// Text produced while decoding, before the arena is frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextRef<'a> {
    /// Verbatim source bytes or a static table entry
    Borrowed(&'a str),
    /// Synthesized text in the arena
    Arena(TextSpan),
}

impl<'a> TextRef<'a> {
    fn resolve(self, arena: &'a TextArena) -> &'a str {
        match self {
            TextRef::Borrowed(text) => text,
            TextRef::Arena(span) => arena.get(span),
        }
    }
}

/// All fields of one record, committed to the columns together
#[derive(Debug, Clone, Copy)]
pub(crate) struct Row<'a> {
    pub pattern: TextRef<'a>,
    pub seconds: u32,
    pub microseconds: i32,
    pub ecu_id: TextRef<'a>,
    pub header_type: u8,
    pub message_counter: u8,
    pub length: u16,
    pub session_id: u32,
    pub timestamp: u32,
    pub message_info: u8,
    pub argument_count: u8,
    pub app_id: TextRef<'a>,
    pub ctx_id: TextRef<'a>,
    pub service_id_name: &'static str,
    pub return_type_name: &'static str,
    pub payload: TextRef<'a>,
}

/// Columns under construction
#[derive(Debug, Default)]
pub(crate) struct RecordSetBuilder<'a> {
    patterns: Vec<TextRef<'a>>,
    seconds: Vec<u32>,
    microseconds: Vec<i32>,
    ecu_ids: Vec<TextRef<'a>>,
    header_types: Vec<u8>,
    message_counters: Vec<u8>,
    lengths: Vec<u16>,
    session_ids: Vec<u32>,
    timestamps: Vec<u32>,
    message_infos: Vec<u8>,
    argument_counts: Vec<u8>,
    app_ids: Vec<TextRef<'a>>,
    ctx_ids: Vec<TextRef<'a>>,
    service_id_names: Vec<&'static str>,
    return_type_names: Vec<&'static str>,
    payloads: Vec<TextRef<'a>>,
    size: usize,
}

impl<'a> RecordSetBuilder<'a> {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            patterns: Vec::with_capacity(rows),
            seconds: Vec::with_capacity(rows),
            microseconds: Vec::with_capacity(rows),
            ecu_ids: Vec::with_capacity(rows),
            header_types: Vec::with_capacity(rows),
            message_counters: Vec::with_capacity(rows),
            lengths: Vec::with_capacity(rows),
            session_ids: Vec::with_capacity(rows),
            timestamps: Vec::with_capacity(rows),
            message_infos: Vec::with_capacity(rows),
            argument_counts: Vec::with_capacity(rows),
            app_ids: Vec::with_capacity(rows),
            ctx_ids: Vec::with_capacity(rows),
            service_id_names: Vec::with_capacity(rows),
            return_type_names: Vec::with_capacity(rows),
            payloads: Vec::with_capacity(rows),
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn push(&mut self, row: Row<'a>) {
        self.patterns.push(row.pattern);
        self.seconds.push(row.seconds);
        self.microseconds.push(row.microseconds);
        self.ecu_ids.push(row.ecu_id);
        self.header_types.push(row.header_type);
        self.message_counters.push(row.message_counter);
        self.lengths.push(row.length);
        self.session_ids.push(row.session_id);
        self.timestamps.push(row.timestamp);
        self.message_infos.push(row.message_info);
        self.argument_counts.push(row.argument_count);
        self.app_ids.push(row.app_id);
        self.ctx_ids.push(row.ctx_id);
        self.service_id_names.push(row.service_id_name);
        self.return_type_names.push(row.return_type_name);
        self.payloads.push(row.payload);
        self.size += 1;
    }

    /// Resolve all text columns against the now read-only arena
    pub fn finish(self, arena: &'a TextArena) -> RecordSet<'a> {
        let resolve = |column: Vec<TextRef<'a>>| -> Vec<&'a str> {
            column.into_iter().map(|text| text.resolve(arena)).collect()
        };

        let set = RecordSet {
            patterns: resolve(self.patterns),
            seconds: self.seconds,
            microseconds: self.microseconds,
            ecu_ids: resolve(self.ecu_ids),
            header_types: self.header_types,
            message_counters: self.message_counters,
            lengths: self.lengths,
            session_ids: self.session_ids,
            timestamps: self.timestamps,
            message_infos: self.message_infos,
            argument_counts: self.argument_counts,
            app_ids: resolve(self.app_ids),
            ctx_ids: resolve(self.ctx_ids),
            service_id_names: self.service_id_names,
            return_type_names: self.return_type_names,
            payloads: resolve(self.payloads),
            size: self.size,
        };
        debug_assert!(set.columns_consistent());
        set
    }
}

/// Decoded records of one source, stored column-wise
///
/// Immutable once built. Every column has exactly [`RecordSet::len`] entries.
#[derive(Debug, Clone)]
pub struct RecordSet<'a> {
    patterns: Vec<&'a str>,
    seconds: Vec<u32>,
    microseconds: Vec<i32>,
    ecu_ids: Vec<&'a str>,
    header_types: Vec<u8>,
    message_counters: Vec<u8>,
    lengths: Vec<u16>,
    session_ids: Vec<u32>,
    timestamps: Vec<u32>,
    message_infos: Vec<u8>,
    argument_counts: Vec<u8>,
    app_ids: Vec<&'a str>,
    ctx_ids: Vec<&'a str>,
    service_id_names: Vec<&'static str>,
    return_type_names: Vec<&'static str>,
    payloads: Vec<&'a str>,
    size: usize,
}

impl<'a> RecordSet<'a> {
    /// Number of records
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Same as [`len`](Self::len); every column has this many entries
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn patterns(&self) -> &[&'a str] {
        &self.patterns
    }

    pub fn seconds(&self) -> &[u32] {
        &self.seconds
    }

    pub fn microseconds(&self) -> &[i32] {
        &self.microseconds
    }

    pub fn ecu_ids(&self) -> &[&'a str] {
        &self.ecu_ids
    }

    pub fn header_types(&self) -> &[u8] {
        &self.header_types
    }

    pub fn message_counters(&self) -> &[u8] {
        &self.message_counters
    }

    /// Declared record lengths, already converted from big-endian
    pub fn lengths(&self) -> &[u16] {
        &self.lengths
    }

    pub fn session_ids(&self) -> &[u32] {
        &self.session_ids
    }

    pub fn timestamps(&self) -> &[u32] {
        &self.timestamps
    }

    pub fn message_infos(&self) -> &[u8] {
        &self.message_infos
    }

    pub fn argument_counts(&self) -> &[u8] {
        &self.argument_counts
    }

    pub fn app_ids(&self) -> &[&'a str] {
        &self.app_ids
    }

    pub fn ctx_ids(&self) -> &[&'a str] {
        &self.ctx_ids
    }

    pub fn service_id_names(&self) -> &[&'static str] {
        &self.service_id_names
    }

    pub fn return_type_names(&self) -> &[&'static str] {
        &self.return_type_names
    }

    pub fn payloads(&self) -> &[&'a str] {
        &self.payloads
    }

    /// Capture time of record `index` (storage header seconds + microseconds)
    pub fn time(&self, index: usize) -> Option<Timestamp> {
        let seconds = i64::from(*self.seconds.get(index)?);
        let micros = i64::from(*self.microseconds.get(index)?);
        DateTime::from_timestamp_micros(seconds * 1_000_000 + micros)
    }

    pub fn is_verbose(&self, index: usize) -> Option<bool> {
        let htyp = *self.header_types.get(index)?;
        let msin = *self.message_infos.get(index)?;
        Some(!is_nonverbose(htyp, msin))
    }

    /// Protocol version bits of the header type
    pub fn version(&self, index: usize) -> Option<u8> {
        self.header_types.get(index).map(|htyp| htyp_version(*htyp))
    }

    /// Message type name (`log`, `app_trace`, `nw_trace`, `control`)
    pub fn message_type(&self, index: usize) -> Option<&'static str> {
        self.message_infos
            .get(index)
            .map(|msin| tables::message_type_name(msin_mstp(*msin)))
    }

    /// Message type info name: log level, trace type, network trace type or
    /// control type depending on the message type
    pub fn message_type_info(&self, index: usize) -> Option<&'static str> {
        self.message_infos
            .get(index)
            .map(|msin| tables::message_type_info_name(*msin))
    }

    /// Borrowed view of record `index`
    pub fn row(&self, index: usize) -> Option<RecordView<'a>> {
        if index >= self.size {
            return None;
        }
        Some(RecordView {
            index,
            time: self.time(index).map(|time| time.to_rfc3339()),
            seconds: self.seconds[index],
            microseconds: self.microseconds[index],
            timestamp: self.timestamps[index],
            message_counter: self.message_counters[index],
            ecu_id: self.ecu_ids[index],
            session_id: self.session_ids[index],
            app_id: self.app_ids[index],
            ctx_id: self.ctx_ids[index],
            message_type: tables::message_type_name(msin_mstp(self.message_infos[index])),
            message_type_info: tables::message_type_info_name(self.message_infos[index]),
            verbose: !is_nonverbose(self.header_types[index], self.message_infos[index]),
            argument_count: self.argument_counts[index],
            service_id_name: self.service_id_names[index],
            return_type_name: self.return_type_names[index],
            payload: self.payloads[index],
        })
    }

    /// All records in file order
    pub fn iter(&self) -> impl Iterator<Item = RecordView<'a>> + '_ {
        (0..self.size).filter_map(move |index| self.row(index))
    }

    fn columns_consistent(&self) -> bool {
        let n = self.size;
        self.patterns.len() == n
            && self.seconds.len() == n
            && self.microseconds.len() == n
            && self.ecu_ids.len() == n
            && self.header_types.len() == n
            && self.message_counters.len() == n
            && self.lengths.len() == n
            && self.session_ids.len() == n
            && self.timestamps.len() == n
            && self.message_infos.len() == n
            && self.argument_counts.len() == n
            && self.app_ids.len() == n
            && self.ctx_ids.len() == n
            && self.service_id_names.len() == n
            && self.return_type_names.len() == n
            && self.payloads.len() == n
    }
}

/// One record with its derived names, ready for display or serialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView<'a> {
    pub index: usize,
    pub time: Option<String>,
    pub seconds: u32,
    pub microseconds: i32,
    pub timestamp: u32,
    pub message_counter: u8,
    pub ecu_id: &'a str,
    pub session_id: u32,
    pub app_id: &'a str,
    pub ctx_id: &'a str,
    pub message_type: &'static str,
    pub message_type_info: &'static str,
    pub verbose: bool,
    pub argument_count: u8,
    pub service_id_name: &'static str,
    pub return_type_name: &'static str,
    pub payload: &'a str,
}
