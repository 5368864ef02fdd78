// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API of the client. It offers two
// interchangeable views of the same engine operations (read, write, filter,
// mask, compress, decompress) on top of the raw `ffi` layer.
//
// Data Flow (JSON boundary):
//
//   1. [JsonClient]     -> serde-encodes arguments into CStrings
//         |
//         `-> BoundLibrary::serialized { J_* call -> copy text -> J_FreeString }
//         |
//   2. [format]         -> decodes the text into PacketData / DiffResult / ...
//         |
//   3. [classify]       -> a non-empty "error" key becomes a typed TdtpError
//
//
// Data Flow (Direct boundary):
//
//   1. [DirectClient]   -> builds RawFilterSpec / RawMaskConfig, zeroed out packet
//         |
//         `-> BoundLibrary::serialized { D_* call -> status }
//         |
//   2. [classify]       -> nonzero status: error kind chosen by operation
//         |
//   3. [PacketHandle]   -> status 0: owns the packet until release / drop
//
// ====================================================================================
pub mod classify;
pub mod direct_client;
pub mod format;
pub mod handle;
pub mod json_client;

pub use classify::{classify, DirectOp};
pub use direct_client::DirectClient;
pub use format::{
    ChainStep, DiffResult, DiffStats, ExportOptions, ExportResult, FieldChange, FieldJson, Header,
    ModifiedRow, PacketData, QueryContext, SchemaJson,
};
pub use handle::PacketHandle;
pub use json_client::JsonClient;

use crate::error::{Result, TdtpError};
use std::ffi::{c_int, CString};
use std::path::Path;

pub(crate) fn path_arg(path: &Path) -> Result<CString> {
    let text = path
        .to_str()
        .ok_or_else(|| TdtpError::InvalidArgument(format!("path {:?} is not valid UTF-8", path)))?;
    Ok(CString::new(text)?)
}

pub(crate) fn int_arg(name: &str, value: usize) -> Result<c_int> {
    c_int::try_from(value).map_err(|_| {
        TdtpError::InvalidArgument(format!("{} {} exceeds the engine's int range", name, value))
    })
}
