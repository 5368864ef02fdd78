// In: src/ffi/symbols.rs

//! Exact foreign signatures for every entry point the engine exports.
//!
//! Strings returned by `J_*` functions are bound as raw `*mut c_char`, never as
//! an owned string type: the same pointer must later be handed back to
//! `J_FreeString`. All Direct functions report success with a `0` status.

use super::layout::{RawFilterSpec, RawMaskConfig, RawPacket};
use crate::error::{Result, TdtpError};
use libloading::Library;
use std::ffi::{c_char, c_int};

//==================================================================================
// I. JSON Boundary Signatures
//==================================================================================
pub type JGetVersionFn = unsafe extern "C" fn() -> *mut c_char;
pub type JFreeStringFn = unsafe extern "C" fn(*mut c_char);
pub type JReadFileFn = unsafe extern "C" fn(path: *const c_char) -> *mut c_char;
pub type JWriteFileFn =
    unsafe extern "C" fn(data: *const c_char, path: *const c_char) -> *mut c_char;
pub type JFilterRowsFn = unsafe extern "C" fn(
    data: *const c_char,
    where_clause: *const c_char,
    limit: c_int,
) -> *mut c_char;
pub type JFilterRowsPageFn = unsafe extern "C" fn(
    data: *const c_char,
    where_clause: *const c_char,
    limit: c_int,
    offset: c_int,
) -> *mut c_char;
pub type JApplyProcessorFn = unsafe extern "C" fn(
    data: *const c_char,
    proc_type: *const c_char,
    config: *const c_char,
) -> *mut c_char;
pub type JApplyChainFn =
    unsafe extern "C" fn(data: *const c_char, chain: *const c_char) -> *mut c_char;
pub type JExportAllFn = unsafe extern "C" fn(
    data: *const c_char,
    base_path: *const c_char,
    options: *const c_char,
) -> *mut c_char;
pub type JDiffFn = unsafe extern "C" fn(old: *const c_char, new: *const c_char) -> *mut c_char;
pub type JSerializeValueFn =
    unsafe extern "C" fn(type_name: *const c_char, value: *const c_char) -> *mut c_char;

//==================================================================================
// II. Direct Boundary Signatures
//==================================================================================
pub type DReadFileFn = unsafe extern "C" fn(path: *const c_char, out: *mut RawPacket) -> c_int;
/// The engine writes a failure message into the *input* packet's `error` buffer.
pub type DWriteFileFn = unsafe extern "C" fn(pkt: *mut RawPacket, path: *const c_char) -> c_int;
pub type DFreePacketFn = unsafe extern "C" fn(pkt: *mut RawPacket);
pub type DFilterRowsFn = unsafe extern "C" fn(
    pkt: *const RawPacket,
    specs: *const RawFilterSpec,
    spec_count: c_int,
    limit: c_int,
    out: *mut RawPacket,
) -> c_int;
pub type DApplyMaskFn = unsafe extern "C" fn(
    pkt: *const RawPacket,
    cfg: *const RawMaskConfig,
    out: *mut RawPacket,
) -> c_int;
pub type DApplyCompressFn =
    unsafe extern "C" fn(pkt: *const RawPacket, level: c_int, out: *mut RawPacket) -> c_int;
pub type DApplyDecompressFn =
    unsafe extern "C" fn(pkt: *const RawPacket, out: *mut RawPacket) -> c_int;
pub type DFreeMaskConfigFn = unsafe extern "C" fn(cfg: *mut RawMaskConfig);

//==================================================================================
// III. The Symbol Table
//==================================================================================

/// Every resolved entry point. Only valid while the library it came from is loaded.
#[derive(Clone, Copy)]
pub struct Symbols {
    pub j_get_version: JGetVersionFn,
    pub j_free_string: JFreeStringFn,
    pub j_read_file: JReadFileFn,
    pub j_write_file: JWriteFileFn,
    pub j_filter_rows: JFilterRowsFn,
    pub j_filter_rows_page: JFilterRowsPageFn,
    pub j_apply_processor: JApplyProcessorFn,
    pub j_apply_chain: JApplyChainFn,
    pub j_export_all: JExportAllFn,
    pub j_diff: JDiffFn,
    /// Missing from older engine builds.
    pub j_serialize_value: Option<JSerializeValueFn>,

    pub d_read_file: DReadFileFn,
    pub d_write_file: DWriteFileFn,
    pub d_free_packet: DFreePacketFn,
    pub d_filter_rows: DFilterRowsFn,
    pub d_apply_mask: DApplyMaskFn,
    pub d_apply_compress: DApplyCompressFn,
    pub d_apply_decompress: DApplyDecompressFn,
    pub d_free_mask_config: DFreeMaskConfigFn,
}

impl Symbols {
    /// Resolves the full table from a loaded library.
    ///
    /// # Safety
    /// The library must be a TDTP engine build whose exports have the
    /// signatures declared in this module.
    pub unsafe fn resolve(lib: &Library) -> Result<Self> {
        Ok(Self {
            j_get_version: required(lib, "J_GetVersion")?,
            j_free_string: required(lib, "J_FreeString")?,
            j_read_file: required(lib, "J_ReadFile")?,
            j_write_file: required(lib, "J_WriteFile")?,
            j_filter_rows: required(lib, "J_FilterRows")?,
            j_filter_rows_page: required(lib, "J_FilterRowsPage")?,
            j_apply_processor: required(lib, "J_ApplyProcessor")?,
            j_apply_chain: required(lib, "J_ApplyChain")?,
            j_export_all: required(lib, "J_ExportAll")?,
            j_diff: required(lib, "J_Diff")?,
            j_serialize_value: optional(lib, "J_SerializeValue"),
            d_read_file: required(lib, "D_ReadFile")?,
            d_write_file: required(lib, "D_WriteFile")?,
            d_free_packet: required(lib, "D_FreePacket")?,
            d_filter_rows: required(lib, "D_FilterRows")?,
            d_apply_mask: required(lib, "D_ApplyMask")?,
            d_apply_compress: required(lib, "D_ApplyCompress")?,
            d_apply_decompress: required(lib, "D_ApplyDecompress")?,
            d_free_mask_config: required(lib, "D_FreeMaskConfig")?,
        })
    }
}

unsafe fn required<T: Copy>(lib: &Library, name: &'static str) -> Result<T> {
    match lib.get::<T>(name.as_bytes()) {
        Ok(sym) => Ok(*sym),
        Err(source) => Err(TdtpError::MissingSymbol {
            symbol: name,
            source: Some(source),
        }),
    }
}

unsafe fn optional<T: Copy>(lib: &Library, name: &'static str) -> Option<T> {
    match lib.get::<T>(name.as_bytes()) {
        Ok(sym) => Some(*sym),
        Err(_) => {
            log::debug!("optional symbol {} not exported by this engine build", name);
            None
        }
    }
}
