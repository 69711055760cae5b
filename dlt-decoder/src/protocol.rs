//! DLT wire-format constants and bit-field helpers
//!
//! Names follow the AUTOSAR DLT protocol so that the values can be checked
//! against the protocol document field by field.

use crate::types::Endianness;

/// Storage header pattern: `"DLT"` followed by `0x01`
pub const DLT_PATTERN: [u8; 4] = *b"DLT\x01";

/// Size of an ECU / application / context identifier
pub const DLT_ID_SIZE: usize = 4;

/// pattern + seconds + microseconds + ecu
pub const STORAGE_HEADER_SIZE: usize = 16;
/// htyp + mcnt + len
pub const STANDARD_HEADER_SIZE: usize = 4;
/// msin + noar + apid + ctid
pub const EXTENDED_HEADER_SIZE: usize = 10;

pub const DLT_SIZE_WEID: usize = DLT_ID_SIZE;
pub const DLT_SIZE_WSID: usize = 4;
pub const DLT_SIZE_WTMS: usize = 4;

// htyp parameter in the standard header
pub const DLT_HTYP_UEH: u8 = 0x01; // use extended header
pub const DLT_HTYP_MSBF: u8 = 0x02; // MSB first
pub const DLT_HTYP_WEID: u8 = 0x04; // with ECU ID
pub const DLT_HTYP_WSID: u8 = 0x08; // with session ID
pub const DLT_HTYP_WTMS: u8 = 0x10; // with timestamp
pub const DLT_HTYP_VERS: u8 = 0xe0; // version number
pub const DLT_HTYP_VERS_SHIFT: u8 = 5;
pub const DLT_HTYP_PROTOCOL_VERSION: u8 = 1;

// msin parameter in the extended header
pub const DLT_MSIN_VERB: u8 = 0x01;
pub const DLT_MSIN_MSTP: u8 = 0x0e;
pub const DLT_MSIN_MTIN: u8 = 0xf0;
pub const DLT_MSIN_MSTP_SHIFT: u8 = 1;
pub const DLT_MSIN_MTIN_SHIFT: u8 = 4;

// mstp values
pub const DLT_TYPE_LOG: u8 = 0x00;
pub const DLT_TYPE_APP_TRACE: u8 = 0x01;
pub const DLT_TYPE_NW_TRACE: u8 = 0x02;
pub const DLT_TYPE_CONTROL: u8 = 0x03;

// mtin values for control messages
pub const DLT_CONTROL_REQUEST: u8 = 0x01;
pub const DLT_CONTROL_RESPONSE: u8 = 0x02;

// Type info word of a verbose argument
pub const DLT_TYPE_INFO_TYLE: u32 = 0x0000_000f; // 1 = 8bit .. 5 = 128bit
pub const DLT_TYPE_INFO_BOOL: u32 = 0x0000_0010;
pub const DLT_TYPE_INFO_SINT: u32 = 0x0000_0020;
pub const DLT_TYPE_INFO_UINT: u32 = 0x0000_0040;
pub const DLT_TYPE_INFO_FLOA: u32 = 0x0000_0080;
pub const DLT_TYPE_INFO_ARAY: u32 = 0x0000_0100;
pub const DLT_TYPE_INFO_STRG: u32 = 0x0000_0200;
pub const DLT_TYPE_INFO_RAWD: u32 = 0x0000_0400;
pub const DLT_TYPE_INFO_VARI: u32 = 0x0000_0800;
pub const DLT_TYPE_INFO_FIXP: u32 = 0x0000_1000;
pub const DLT_TYPE_INFO_STRU: u32 = 0x0000_4000;
pub const DLT_TYPE_INFO_SCOD: u32 = 0x0003_8000;

pub const DLT_TYLE_8BIT: u32 = 0x0000_0001;
pub const DLT_TYLE_16BIT: u32 = 0x0000_0002;
pub const DLT_TYLE_32BIT: u32 = 0x0000_0003;
pub const DLT_TYLE_64BIT: u32 = 0x0000_0004;
pub const DLT_TYLE_128BIT: u32 = 0x0000_0005;

pub const DLT_SCOD_ASCII: u32 = 0x0000_0000;
pub const DLT_SCOD_UTF8: u32 = 0x0000_8000;

pub fn is_htyp_ueh(htyp: u8) -> bool {
    htyp & DLT_HTYP_UEH != 0
}

pub fn is_htyp_msbf(htyp: u8) -> bool {
    htyp & DLT_HTYP_MSBF != 0
}

pub fn is_htyp_weid(htyp: u8) -> bool {
    htyp & DLT_HTYP_WEID != 0
}

pub fn is_htyp_wsid(htyp: u8) -> bool {
    htyp & DLT_HTYP_WSID != 0
}

pub fn is_htyp_wtms(htyp: u8) -> bool {
    htyp & DLT_HTYP_WTMS != 0
}

pub fn htyp_version(htyp: u8) -> u8 {
    (htyp & DLT_HTYP_VERS) >> DLT_HTYP_VERS_SHIFT
}

/// Byte order of the payload and of the standard header extras
pub fn htyp_endianness(htyp: u8) -> Endianness {
    if is_htyp_msbf(htyp) {
        Endianness::Big
    } else {
        Endianness::Little
    }
}

/// Size of the standard header extra fields announced by `htyp`
pub fn standard_header_extra_size(htyp: u8) -> usize {
    let mut size = 0;
    if is_htyp_weid(htyp) {
        size += DLT_SIZE_WEID;
    }
    if is_htyp_wsid(htyp) {
        size += DLT_SIZE_WSID;
    }
    if is_htyp_wtms(htyp) {
        size += DLT_SIZE_WTMS;
    }
    size
}

/// Size of every header of a record, storage header included
pub fn header_size(htyp: u8) -> usize {
    let extended = if is_htyp_ueh(htyp) {
        EXTENDED_HEADER_SIZE
    } else {
        0
    };
    STORAGE_HEADER_SIZE + STANDARD_HEADER_SIZE + standard_header_extra_size(htyp) + extended
}

pub fn is_msin_verbose(msin: u8) -> bool {
    msin & DLT_MSIN_VERB != 0
}

pub fn msin_mstp(msin: u8) -> u8 {
    (msin & DLT_MSIN_MSTP) >> DLT_MSIN_MSTP_SHIFT
}

pub fn msin_mtin(msin: u8) -> u8 {
    (msin & DLT_MSIN_MTIN) >> DLT_MSIN_MTIN_SHIFT
}

pub fn is_nonverbose(htyp: u8, msin: u8) -> bool {
    !is_htyp_ueh(htyp) || !is_msin_verbose(msin)
}

pub fn is_control(htyp: u8, msin: u8) -> bool {
    is_htyp_ueh(htyp) && msin_mstp(msin) == DLT_TYPE_CONTROL
}

pub fn is_control_response(htyp: u8, msin: u8) -> bool {
    is_control(htyp, msin) && msin_mtin(msin) == DLT_CONTROL_RESPONSE
}
