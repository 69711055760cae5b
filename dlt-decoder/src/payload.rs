//! Payload walking for verbose and non-verbose messages
//!
//! Arguments are decoded into the transient [`Argument`] union and turned
//! into text right away; the union never leaves the decoder.

use crate::arena::{write_hex, ArenaText, ArenaWriter};
use crate::cursor::ByteCursor;
use crate::protocol::*;
use crate::tables;
use crate::types::{DecodeError, Endianness, Result};
use std::fmt::{self, Write};

/// One decoded payload value
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Argument<'a> {
    /// String bytes exactly as stored in the source
    Text(&'a [u8]),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Raw(&'a [u8]),
}

impl ArenaText for Argument<'_> {
    fn write_text(&self, out: &mut ArenaWriter<'_>) -> fmt::Result {
        match self {
            Argument::Text(bytes) => out.write_str(&String::from_utf8_lossy(bytes)),
            Argument::Bool(v) => v.write_text(out),
            Argument::I8(v) => v.write_text(out),
            Argument::I16(v) => v.write_text(out),
            Argument::I32(v) => v.write_text(out),
            Argument::I64(v) => v.write_text(out),
            Argument::U8(v) => v.write_text(out),
            Argument::U16(v) => v.write_text(out),
            Argument::U32(v) => v.write_text(out),
            Argument::U64(v) => v.write_text(out),
            Argument::F32(v) => v.write_text(out),
            Argument::F64(v) => v.write_text(out),
            Argument::Raw(bytes) => write_hex(out, bytes),
        }
    }
}

impl<'a> Argument<'a> {
    /// The argument as a verbatim view into the source, if it is valid text
    pub(crate) fn as_source_str(&self) -> Option<&'a str> {
        match self {
            Argument::Text(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}

/// Control-message names resolved from a non-verbose payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ControlNames {
    pub service_id_name: &'static str,
    pub return_type_name: &'static str,
}

/// Decode a non-verbose payload
///
/// Layout: `| message id (u32) | [return code (u8)] | bytes... |`. The message
/// id renders as the service name for control messages with a known id and
/// as a number otherwise; the return code is consumed for control responses;
/// the remaining bytes render as a hex dump.
pub(crate) fn decode_nonverbose<'a>(
    payload: &mut ByteCursor<'a>,
    htyp: u8,
    msin: u8,
    args: &mut Vec<Argument<'a>>,
) -> Result<ControlNames> {
    let order = htyp_endianness(htyp);
    let id = payload.read_u32(order)?;

    let mut names = ControlNames::default();
    if is_control(htyp, msin) {
        names.service_id_name = tables::service_id_name(id);
    }
    if names.service_id_name.is_empty() {
        args.push(Argument::U32(id));
    } else {
        args.push(Argument::Text(names.service_id_name.as_bytes()));
    }

    if is_control_response(htyp, msin) {
        let code = payload.read_u8()?;
        names.return_type_name = tables::return_type_name(code);
    }

    let rest = payload.take(payload.remaining())?;
    if !rest.is_empty() {
        args.push(Argument::Raw(rest));
    }
    Ok(names)
}

/// Decode `count` verbose arguments, each prefixed by a type info word
pub(crate) fn decode_verbose<'a>(
    payload: &mut ByteCursor<'a>,
    htyp: u8,
    count: u8,
    args: &mut Vec<Argument<'a>>,
) -> Result<()> {
    let order = htyp_endianness(htyp);
    for _ in 0..count {
        let offset = payload.offset();
        let type_info = payload.read_u32(order)?;
        args.push(decode_argument(payload, order, type_info, offset)?);
    }
    Ok(())
}

fn decode_argument<'a>(
    payload: &mut ByteCursor<'a>,
    order: Endianness,
    type_info: u32,
    offset: usize,
) -> Result<Argument<'a>> {
    let unsupported = |what| DecodeError::UnsupportedEncoding {
        offset,
        type_info,
        what,
    };
    let unknown = || DecodeError::UnknownTypeInfo { offset, type_info };

    if type_info & DLT_TYPE_INFO_VARI != 0 {
        return Err(unsupported("variable info"));
    }
    if type_info & DLT_TYPE_INFO_ARAY != 0 {
        return Err(unsupported("array"));
    }
    if type_info & DLT_TYPE_INFO_STRU != 0 {
        return Err(unsupported("struct"));
    }

    let scod = type_info & DLT_TYPE_INFO_SCOD;
    let tyle = type_info & DLT_TYPE_INFO_TYLE;

    if type_info & DLT_TYPE_INFO_STRG != 0 && (scod == DLT_SCOD_ASCII || scod == DLT_SCOD_UTF8) {
        let length = payload.read_u16(order)?;
        Ok(Argument::Text(payload.take(length as usize)?))
    } else if type_info & DLT_TYPE_INFO_BOOL != 0 {
        Ok(Argument::Bool(payload.read_u8()? != 0))
    } else if type_info & DLT_TYPE_INFO_SINT != 0 {
        if type_info & DLT_TYPE_INFO_FIXP != 0 {
            return Err(unsupported("fixed point"));
        }
        match tyle {
            DLT_TYLE_8BIT => Ok(Argument::I8(payload.read_i8()?)),
            DLT_TYLE_16BIT => Ok(Argument::I16(payload.read_i16(order)?)),
            DLT_TYLE_32BIT => Ok(Argument::I32(payload.read_i32(order)?)),
            DLT_TYLE_64BIT => Ok(Argument::I64(payload.read_i64(order)?)),
            DLT_TYLE_128BIT => Err(unsupported("128-bit integer")),
            _ => Err(unknown()),
        }
    } else if type_info & DLT_TYPE_INFO_UINT != 0 {
        if type_info & DLT_TYPE_INFO_FIXP != 0 {
            return Err(unsupported("fixed point"));
        }
        match tyle {
            DLT_TYLE_8BIT => Ok(Argument::U8(payload.read_u8()?)),
            DLT_TYLE_16BIT => Ok(Argument::U16(payload.read_u16(order)?)),
            DLT_TYLE_32BIT => Ok(Argument::U32(payload.read_u32(order)?)),
            DLT_TYLE_64BIT => Ok(Argument::U64(payload.read_u64(order)?)),
            DLT_TYLE_128BIT => Err(unsupported("128-bit integer")),
            _ => Err(unknown()),
        }
    } else if type_info & DLT_TYPE_INFO_FLOA != 0 {
        match tyle {
            DLT_TYLE_8BIT => Err(unsupported("8-bit float")),
            DLT_TYLE_16BIT => Err(unsupported("16-bit float")),
            DLT_TYLE_32BIT => Ok(Argument::F32(payload.read_f32(order)?)),
            DLT_TYLE_64BIT => Ok(Argument::F64(payload.read_f64(order)?)),
            DLT_TYLE_128BIT => Err(unsupported("128-bit float")),
            _ => Err(unknown()),
        }
    } else if type_info & DLT_TYPE_INFO_RAWD != 0 {
        let length = payload.read_u16(order)?;
        Ok(Argument::Raw(payload.take(length as usize)?))
    } else {
        Err(unknown())
    }
}
