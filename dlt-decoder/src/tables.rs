//! Name tables for message classification and control services
//!
//! Indices come straight from the input file and are not guaranteed to be in
//! range, so every accessor degrades to `""` instead of failing.

use crate::protocol::{
    msin_mstp, msin_mtin, DLT_TYPE_APP_TRACE, DLT_TYPE_CONTROL, DLT_TYPE_LOG, DLT_TYPE_NW_TRACE,
};

pub const MESSAGE_TYPE: [&str; 8] = ["log", "app_trace", "nw_trace", "control", "", "", "", ""];

pub const LOG_LEVEL: [&str; 16] = [
    "", "fatal", "error", "warn", "info", "debug", "verbose", "", "", "", "", "", "", "", "", "",
];

pub const TRACE_TYPE: [&str; 16] = [
    "", "variable", "func_in", "func_out", "state", "vfb", "", "", "", "", "", "", "", "", "", "",
];

pub const NW_TRACE_TYPE: [&str; 16] = [
    "", "ipc", "can", "flexray", "most", "vfb", "", "", "", "", "", "", "", "", "", "",
];

pub const CONTROL_TYPE: [&str; 16] = [
    "", "request", "response", "time", "", "", "", "", "", "", "", "", "", "", "", "",
];

/// Control service names; index 0 is reserved
pub const SERVICE_ID_NAME: [&str; 21] = [
    "",
    "set_log_level",
    "set_trace_status",
    "get_log_info",
    "get_default_log_level",
    "store_config",
    "reset_to_factory_default",
    "set_com_interface_status",
    "set_com_interface_max_bandwidth",
    "set_verbose_mode",
    "set_message_filtering",
    "set_timing_packets",
    "get_local_time",
    "use_ecu_id",
    "use_session_id",
    "use_timestamp",
    "use_extended_header",
    "set_default_log_level",
    "set_default_trace_status",
    "get_software_version",
    "message_buffer_overflow",
];

pub const RETURN_TYPE: [&str; 9] = [
    "ok",
    "not_supported",
    "error",
    "perm_denied",
    "warning",
    "",
    "",
    "",
    "no_matching_context_id",
];

/// Bounds-checked table access
pub fn lookup(table: &[&'static str], index: usize) -> &'static str {
    table.get(index).copied().unwrap_or("")
}

pub fn message_type_name(mstp: u8) -> &'static str {
    lookup(&MESSAGE_TYPE, mstp as usize)
}

pub fn log_level_name(mtin: u8) -> &'static str {
    lookup(&LOG_LEVEL, mtin as usize)
}

pub fn trace_type_name(mtin: u8) -> &'static str {
    lookup(&TRACE_TYPE, mtin as usize)
}

pub fn nw_trace_type_name(mtin: u8) -> &'static str {
    lookup(&NW_TRACE_TYPE, mtin as usize)
}

pub fn control_type_name(mtin: u8) -> &'static str {
    lookup(&CONTROL_TYPE, mtin as usize)
}

pub fn service_id_name(id: u32) -> &'static str {
    usize::try_from(id)
        .map(|index| lookup(&SERVICE_ID_NAME, index))
        .unwrap_or("")
}

pub fn return_type_name(code: u8) -> &'static str {
    lookup(&RETURN_TYPE, code as usize)
}

/// Name of the message type info, interpreted according to the message type
pub fn message_type_info_name(msin: u8) -> &'static str {
    let mtin = msin_mtin(msin);
    match msin_mstp(msin) {
        DLT_TYPE_LOG => log_level_name(mtin),
        DLT_TYPE_APP_TRACE => trace_type_name(mtin),
        DLT_TYPE_NW_TRACE => nw_trace_type_name(mtin),
        DLT_TYPE_CONTROL => control_type_name(mtin),
        _ => "",
    }
}
