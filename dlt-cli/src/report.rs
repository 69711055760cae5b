//! Report generation
//!
//! Renders a decoded record set as `|`-separated text lines or as one JSON
//! object per line.

use crate::config::OutputFormat;
use chrono::{DateTime, Utc};
use dlt_decoder::RecordSet;
use std::io::{self, Write};
use std::path::Path;

const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Render `records` in the requested format
pub fn render(records: &RecordSet<'_>, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Txt => render_txt(records, out),
        OutputFormat::Json => render_json(records, out),
    }
}

/// Section header written before each file's records
pub fn render_header(path: &Path, count: usize, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "=== {} ({} records) ===", path.display(), count)
}

/// One line per record:
/// `time|timestamp|counter|ecu|apid|ctid|type|type info|V/N+args|payload`
pub fn render_txt(records: &RecordSet<'_>, out: &mut dyn Write) -> io::Result<()> {
    for (index, record) in records.iter().enumerate() {
        let time = format_time(records.time(index));
        // timestamp counts 0.1 ms ticks
        writeln!(
            out,
            "{}|{}.{:04}|{:03}|{}|{}|{}|{}|{}|{}{}|{}",
            time,
            record.timestamp / 10_000,
            record.timestamp % 10_000,
            record.message_counter,
            id(record.ecu_id),
            id(record.app_id),
            id(record.ctx_id),
            record.message_type,
            record.message_type_info,
            if record.verbose { 'V' } else { 'N' },
            record.argument_count,
            record.payload.trim_end_matches('\0'),
        )?;
    }
    Ok(())
}

/// One JSON object per line
pub fn render_json(records: &RecordSet<'_>, out: &mut dyn Write) -> io::Result<()> {
    for record in records.iter() {
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Capture time as `2020/09/13 12:26:40.000250`, `-` when out of range
fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

// Identifiers are NUL padded to four bytes
fn id(text: &str) -> &str {
    text.trim_end_matches('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlt_decoder::{Decoder, TextArena};

    // Two records: a verbose "Hello" log and a control request
    fn sample() -> Vec<u8> {
        let mut bytes = Vec::new();

        let mut body = vec![0x41, 0x01];
        body.extend_from_slice(b"LOG\0TES1");
        body.extend_from_slice(&0x200u32.to_le_bytes());
        body.extend_from_slice(&6u16.to_le_bytes());
        body.extend_from_slice(b"Hello\0");
        push_record(&mut bytes, 0x31, 7, 12_345, &body);

        let mut body = vec![0x16, 0x00];
        body.extend_from_slice(b"APP\0CON\0");
        body.extend_from_slice(&9u32.to_le_bytes());
        body.push(0x01);
        push_record(&mut bytes, 0x31, 8, 20_000, &body);
        bytes
    }

    // htyp includes UEH and WTMS
    fn push_record(bytes: &mut Vec<u8>, htyp: u8, counter: u8, timestamp: u32, body: &[u8]) {
        bytes.extend_from_slice(b"DLT\x01");
        bytes.extend_from_slice(&1_600_000_000u32.to_le_bytes());
        bytes.extend_from_slice(&250i32.to_le_bytes());
        bytes.extend_from_slice(b"ECU1");
        bytes.push(htyp);
        bytes.push(counter);
        bytes.extend_from_slice(&((8 + body.len()) as u16).to_be_bytes());
        bytes.extend_from_slice(&timestamp.to_le_bytes());
        bytes.extend_from_slice(body);
    }

    #[test]
    fn test_render_txt() {
        let source = sample();
        let mut arena = TextArena::for_source(source.len(), 3);
        let records = Decoder::new().decode(&source, &mut arena).unwrap();

        let mut out = Vec::new();
        render_txt(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "2020/09/13 12:26:40.000250|1.2345|007|ECU1|LOG|TES1|log|info|V1|Hello",
                "2020/09/13 12:26:40.000250|2.0000|008|ECU1|APP|CON|control|request|N0|set_verbose_mode 01",
            ]
        );
    }

    #[test]
    fn test_render_json() {
        let source = sample();
        let mut arena = TextArena::for_source(source.len(), 3);
        let records = Decoder::new().decode(&source, &mut arena).unwrap();

        let mut out = Vec::new();
        render(&records, OutputFormat::Json, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let values: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["payload"], "Hello\u{0}");
        assert_eq!(values[0]["verbose"], true);
        assert_eq!(values[1]["service_id_name"], "set_verbose_mode");
        assert_eq!(values[1]["message_counter"], 8);
    }

    #[test]
    fn test_format_time() {
        let time = DateTime::from_timestamp(86_400, 7_000).unwrap();
        assert_eq!(format_time(Some(time)), "1970/01/02 00:00:00.000007");
        assert_eq!(format_time(None), "-");
    }

    #[test]
    fn test_render_header() {
        let mut out = Vec::new();
        render_header(Path::new("trace.dlt"), 2, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "=== trace.dlt (2 records) ===\n");
    }
}
