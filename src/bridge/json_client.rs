// In: src/bridge/json_client.rs

//! The JSON boundary client.
//!
//! Every call follows the same protocol: encode the arguments as NUL-terminated
//! UTF-8, call the `J_*` symbol, copy the returned text and hand the pointer
//! back to `J_FreeString` (both under the engine lock), then decode. A non-empty
//! top-level `"error"` key is classified into a typed error.

use super::classify::classify_error;
use super::format::{
    ChainStep, DiffResult, ExportOptions, ExportResult, PacketData, SerializedValue, WriteAck,
};
use super::{int_arg, path_arg};
use crate::config::ClientConfig;
use crate::error::{Result, TdtpError};
use crate::ffi::{BoundLibrary, Symbols};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::sync::Arc;

/// Stateless client for the `J_*` exports. Cheap to clone and share.
#[derive(Debug, Clone)]
pub struct JsonClient {
    lib: Arc<BoundLibrary>,
}

impl JsonClient {
    /// A client on the process-wide binding.
    pub fn new() -> Result<Self> {
        Ok(Self::with_library(BoundLibrary::global()?))
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_library(BoundLibrary::global_with(config)?))
    }

    pub fn with_library(lib: Arc<BoundLibrary>) -> Self {
        Self { lib }
    }

    pub fn library(&self) -> &Arc<BoundLibrary> {
        &self.lib
    }

    //==============================================================================
    // I. Operations
    //==============================================================================

    /// The engine's version string, e.g. `1.6.0`.
    pub fn get_version(&self) -> Result<String> {
        let text = self.call_raw("J_GetVersion", |s| unsafe { (s.j_get_version)() })?;
        parse_version(&text)
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Result<PacketData> {
        let path = path_arg(path.as_ref())?;
        self.call("J_ReadFile", |s| unsafe { (s.j_read_file)(path.as_ptr()) })
    }

    pub fn write(&self, data: &PacketData, path: impl AsRef<Path>) -> Result<()> {
        let json = json_arg(data)?;
        let path = path_arg(path.as_ref())?;
        let ack: WriteAck = self.call("J_WriteFile", |s| unsafe {
            (s.j_write_file)(json.as_ptr(), path.as_ptr())
        })?;
        if !ack.ok {
            return Err(TdtpError::ContractViolation(
                "J_WriteFile returned neither an error nor {\"ok\":true}".to_string(),
            ));
        }
        Ok(())
    }

    /// Filters with a TDTQL WHERE clause, one page at a time.
    ///
    /// `limit == 0` means unlimited. When the engine reports more rows, the
    /// returned `query_context.next_offset` is the `offset` for the next page.
    pub fn filter(
        &self,
        data: &PacketData,
        where_clause: &str,
        limit: usize,
        offset: usize,
    ) -> Result<PacketData> {
        let json = json_arg(data)?;
        let clause = CString::new(where_clause)?;
        let limit = int_arg("limit", limit)?;
        let offset = int_arg("offset", offset)?;
        let out: PacketData = self.call("J_FilterRowsPage", |s| unsafe {
            (s.j_filter_rows_page)(json.as_ptr(), clause.as_ptr(), limit, offset)
        })?;
        check_pagination(&out)?;
        Ok(out)
    }

    /// Filters without pagination metadata.
    pub fn filter_rows(
        &self,
        data: &PacketData,
        where_clause: &str,
        limit: usize,
    ) -> Result<PacketData> {
        let json = json_arg(data)?;
        let clause = CString::new(where_clause)?;
        let limit = int_arg("limit", limit)?;
        self.call("J_FilterRows", |s| unsafe {
            (s.j_filter_rows)(json.as_ptr(), clause.as_ptr(), limit)
        })
    }

    /// Runs one processor (`field_masker`, `field_normalizer`, `field_validator`,
    /// `compress`, `decompress`) with its JSON config.
    pub fn apply_processor(
        &self,
        data: &PacketData,
        proc_type: &str,
        config: &Value,
    ) -> Result<PacketData> {
        let json = json_arg(data)?;
        let proc_type = CString::new(proc_type)?;
        let config = json_arg(config)?;
        self.call("J_ApplyProcessor", |s| unsafe {
            (s.j_apply_processor)(json.as_ptr(), proc_type.as_ptr(), config.as_ptr())
        })
    }

    pub fn apply_chain(&self, data: &PacketData, chain: &[ChainStep]) -> Result<PacketData> {
        let json = json_arg(data)?;
        let chain = json_arg(&chain)?;
        self.call("J_ApplyChain", |s| unsafe {
            (s.j_apply_chain)(json.as_ptr(), chain.as_ptr())
        })
    }

    /// Writes `data` as one or more part files named after `base_path`.
    pub fn export_all(
        &self,
        data: &PacketData,
        base_path: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let json = json_arg(data)?;
        let base = path_arg(base_path.as_ref())?;
        let options = json_arg(options)?;
        self.call("J_ExportAll", |s| unsafe {
            (s.j_export_all)(json.as_ptr(), base.as_ptr(), options.as_ptr())
        })
    }

    pub fn diff(&self, old: &PacketData, new: &PacketData) -> Result<DiffResult> {
        let old = json_arg(old)?;
        let new = json_arg(new)?;
        self.call("J_Diff", |s| unsafe {
            (s.j_diff)(old.as_ptr(), new.as_ptr())
        })
    }

    /// Converts one raw value to the engine's canonical wire string for `type_name`.
    pub fn serialize_value(&self, type_name: &str, value: &str) -> Result<String> {
        let Some(serialize) = self.lib.symbols().j_serialize_value else {
            return Err(TdtpError::MissingSymbol {
                symbol: "J_SerializeValue",
                source: None,
            });
        };
        let type_name = CString::new(type_name)?;
        let value = CString::new(value)?;
        let out: SerializedValue = self.call("J_SerializeValue", |_| unsafe {
            serialize(type_name.as_ptr(), value.as_ptr())
        })?;
        Ok(out.value)
    }

    //==============================================================================
    // II. Call Protocol
    //==============================================================================

    fn call<T: DeserializeOwned>(
        &self,
        symbol: &'static str,
        invoke: impl FnOnce(&Symbols) -> *mut c_char,
    ) -> Result<T> {
        let text = self.call_raw(symbol, invoke)?;
        decode_response(symbol, &text)
    }

    /// Calls, copies and frees as one step under the engine lock.
    fn call_raw(
        &self,
        symbol: &'static str,
        invoke: impl FnOnce(&Symbols) -> *mut c_char,
    ) -> Result<String> {
        self.lib.serialized(symbol, |syms| {
            let ptr = invoke(syms);
            if ptr.is_null() {
                return Err(TdtpError::NullResponse { symbol });
            }
            // SAFETY: the engine returns a NUL-terminated string it allocated;
            // it stays valid until `J_FreeString`.
            let text = unsafe { CStr::from_ptr(ptr) }
                .to_string_lossy()
                .into_owned();
            unsafe { (syms.j_free_string)(ptr) };
            Ok(text)
        })
    }
}

//==================================================================================
// III. Helpers
//==================================================================================

fn decode_response<T: DeserializeOwned>(symbol: &'static str, text: &str) -> Result<T> {
    let invalid = |source| TdtpError::InvalidResponse { symbol, source };
    let value: Value = serde_json::from_str(text).map_err(invalid)?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        if !message.is_empty() {
            return Err(classify_error(message));
        }
    }
    serde_json::from_value(value).map_err(invalid)
}

/// Accepts plain text, a JSON string, or `{"version": ...}`.
fn parse_version(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        let value: Value = decode_response("J_GetVersion", trimmed)?;
        return value
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                TdtpError::ContractViolation("J_GetVersion object has no \"version\"".into())
            });
    }
    if trimmed.starts_with('"') {
        return serde_json::from_str(trimmed).map_err(|source| TdtpError::InvalidResponse {
            symbol: "J_GetVersion",
            source,
        });
    }
    Ok(trimmed.to_string())
}

fn check_pagination(out: &PacketData) -> Result<()> {
    let Some(ctx) = &out.query_context else {
        return Ok(());
    };
    if let Some(expected) = ctx.expected_next_offset() {
        // A zero next_offset is omitted on the wire.
        let actual = ctx.next_offset.unwrap_or(0);
        if actual != expected {
            return Err(TdtpError::ContractViolation(format!(
                "next_offset {} != offset {} + returned_records {}",
                actual, ctx.offset, ctx.returned_records
            )));
        }
    }
    Ok(())
}

fn json_arg<T: serde::Serialize + ?Sized>(value: &T) -> Result<CString> {
    Ok(CString::new(serde_json::to_vec(value)?)?)
}
