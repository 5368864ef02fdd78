// In: src/ffi/layout.rs

//! `#[repr(C)]` mirrors of the engine's Direct-boundary structs, plus the codec
//! for their fixed-size character buffers.
//!
//! Field order, buffer capacities and pointer fields are part of the ABI and
//! must match `tdtp_structs.h` exactly. The byte offsets for 64-bit targets are
//! asserted in the tests at the bottom of this file.

use bytemuck::Zeroable;
use std::ffi::{c_char, c_int, c_longlong, CStr};

//==================================================================================
// 0. Buffer Capacities (bytes, including the NUL terminator)
//==================================================================================
pub const FIELD_NAME_CAP: usize = 256;
pub const FIELD_TYPE_CAP: usize = 64;
pub const MSG_TYPE_CAP: usize = 32;
pub const TABLE_NAME_CAP: usize = 256;
pub const MESSAGE_ID_CAP: usize = 64;
pub const COMPRESSION_CAP: usize = 16;
pub const ERROR_CAP: usize = 1024;
pub const FILTER_FIELD_CAP: usize = 256;
pub const FILTER_OP_CAP: usize = 32;
pub const FILTER_VALUE_CAP: usize = 1024;
pub const MASK_CHAR_CAP: usize = 4;

//==================================================================================
// I. Struct Mirrors
//==================================================================================

/// `D_Field`: one column definition.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct RawField {
    pub name: [c_char; FIELD_NAME_CAP],
    pub type_name: [c_char; FIELD_TYPE_CAP],
    pub length: c_int,
    pub precision: c_int,
    pub scale: c_int,
    pub is_key: c_int,
    pub is_readonly: c_int,
}

/// `D_Schema`: engine-allocated array of fields.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct RawSchema {
    pub fields: *mut RawField,
    pub field_count: c_int,
}

/// `D_Row`: engine-allocated array of C strings.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct RawRow {
    pub values: *mut *mut c_char,
    pub value_count: c_int,
}

/// `D_Packet`: a whole message. Never `Copy`; exactly one owner may free it.
#[repr(C)]
#[derive(Zeroable)]
pub struct RawPacket {
    pub rows: *mut RawRow,
    pub row_count: c_int,
    pub schema: RawSchema,
    pub msg_type: [c_char; MSG_TYPE_CAP],
    pub table_name: [c_char; TABLE_NAME_CAP],
    pub message_id: [c_char; MESSAGE_ID_CAP],
    pub timestamp_unix: c_longlong,
    pub compression: [c_char; COMPRESSION_CAP],
    pub error: [c_char; ERROR_CAP],
}

/// `D_FilterSpec`: one comparison, built by the caller.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct RawFilterSpec {
    pub field: [c_char; FILTER_FIELD_CAP],
    pub op: [c_char; FILTER_OP_CAP],
    pub value: [c_char; FILTER_VALUE_CAP],
    pub value2: [c_char; FILTER_VALUE_CAP],
}

/// `D_MaskConfig`: field list plus masking parameters, built by the caller.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct RawMaskConfig {
    pub fields: *mut *mut c_char,
    pub field_count: c_int,
    pub mask_char: [c_char; MASK_CHAR_CAP],
    pub visible_chars: c_int,
}

impl RawPacket {
    /// A zeroed packet, boxed so its address stays fixed across the engine call.
    pub fn boxed_zeroed() -> Box<RawPacket> {
        Box::new(RawPacket::zeroed())
    }

    pub fn has_error(&self) -> bool {
        self.error[0] != 0
    }

    pub fn error_text(&self) -> String {
        read_fixed(&self.error)
    }

    pub fn clear_error(&mut self) {
        self.error.fill(0);
    }
}

//==================================================================================
// II. Fixed-Buffer String Codec
//==================================================================================

/// Records that a string did not fit its fixed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub original_len: usize,
    pub stored_len: usize,
}

/// Writes `value` into `buf` as a NUL-terminated string.
///
/// At most `buf.len() - 1` bytes are stored, cut back to the nearest UTF-8
/// character boundary. The rest of the buffer is zeroed.
#[must_use = "a truncated value changes what the engine sees"]
pub fn write_fixed(buf: &mut [c_char], value: &str) -> Option<Truncation> {
    let Some(max) = buf.len().checked_sub(1) else {
        return (!value.is_empty()).then_some(Truncation {
            original_len: value.len(),
            stored_len: 0,
        });
    };

    let mut end = value.len().min(max);
    while !value.is_char_boundary(end) {
        end -= 1;
    }

    for (dst, &b) in buf.iter_mut().zip(&value.as_bytes()[..end]) {
        *dst = b as c_char;
    }
    buf[end..].fill(0);

    (end < value.len()).then_some(Truncation {
        original_len: value.len(),
        stored_len: end,
    })
}

/// Reads a fixed buffer up to its first NUL, or its full length if none.
pub fn read_fixed(buf: &[c_char]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    let bytes: Vec<u8> = buf[..len].iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Reads an engine-owned C string. Returns `None` for a null pointer.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}
