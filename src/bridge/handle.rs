// In: src/bridge/handle.rs

//! The ownership handle around one engine-produced packet.
//!
//! A handle is either **Live** or **Released**. `release` (or dropping the
//! handle) moves it to Released and calls `D_FreePacket` exactly once; every
//! later release is a no-op and every read returns `UseAfterRelease`.
//!
//! The packet struct itself is a Rust allocation whose address was handed to
//! the engine as an out-parameter; `D_FreePacket` frees what the engine hung
//! off it (rows, values, schema fields) and the box is dropped afterwards.
//!
//! Handles are neither `Send` nor `Sync`:
//!
//! ```compile_fail
//! fn assert_send<T: Send>() {}
//! assert_send::<tdtp_native::PacketHandle>();
//! ```

use super::classify::{direct_error, DirectOp};
use super::format::PacketData;
use crate::error::{Result, TdtpError};
use crate::ffi::layout::RawPacket;
use crate::ffi::BoundLibrary;
use crate::types::packet::rows_from_raw;
use crate::types::{Compression, PacketMeta, Row, Schema};
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

pub struct PacketHandle {
    /// `None` once released.
    raw: Option<NonNull<RawPacket>>,
    lib: Arc<BoundLibrary>,
    origin: DirectOp,
}

impl PacketHandle {
    pub(crate) fn new(lib: Arc<BoundLibrary>, raw: Box<RawPacket>, origin: DirectOp) -> Self {
        Self {
            raw: Some(NonNull::from(Box::leak(raw))),
            lib,
            origin,
        }
    }

    pub fn is_live(&self) -> bool {
        self.raw.is_some()
    }

    /// The Direct operation that produced this packet.
    pub fn origin(&self) -> DirectOp {
        self.origin
    }

    /// Frees the engine allocations behind this packet. Idempotent.
    pub fn release(&mut self) {
        let Some(ptr) = self.raw.take() else {
            return;
        };
        self.lib.serialized("D_FreePacket", |s| unsafe {
            (s.d_free_packet)(ptr.as_ptr());
        });
        // SAFETY: `ptr` came from `Box::leak` in `new` and was taken out of
        // `self.raw`, so this is the only reclaim.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }

    //==============================================================================
    // I. Accessors (all copy out; none borrow engine memory)
    //==============================================================================

    /// The engine's error text, if the packet carries one.
    pub fn error_info(&self) -> Result<Option<String>> {
        let pkt = self.packet("error_info")?;
        Ok(pkt.has_error().then(|| pkt.error_text()))
    }

    pub fn meta(&self) -> Result<PacketMeta> {
        Ok(PacketMeta::from_raw(self.packet("meta")?))
    }

    pub fn compression(&self) -> Result<Compression> {
        Ok(self.meta()?.compression)
    }

    pub fn row_count(&self) -> Result<usize> {
        let pkt = self.readable("row_count")?;
        usize::try_from(pkt.row_count).map_err(|_| {
            TdtpError::MalformedPacket(format!("packet.row_count is negative ({})", pkt.row_count))
        })
    }

    pub fn schema(&self) -> Result<Schema> {
        let pkt = self.readable("schema")?;
        // SAFETY: a Live packet without an error has engine-initialized arrays.
        unsafe { Schema::from_raw(&pkt.schema) }
    }

    pub fn rows(&self) -> Result<Vec<Row>> {
        let pkt = self.readable("rows")?;
        unsafe { rows_from_raw(pkt) }
    }

    /// A JSON-boundary view of the same packet.
    pub fn to_packet_data(&self) -> Result<PacketData> {
        let meta = self.meta()?;
        let schema = self.schema()?;
        let rows = self.rows()?;
        let mut data = PacketData::from_parts(&schema, &rows, &meta);
        if meta.compression.is_compressed() {
            data.extra.insert(
                "compression".to_string(),
                serde_json::Value::String(meta.compression.as_tag().to_string()),
            );
        }
        Ok(data)
    }

    //==============================================================================
    // II. Crate-Internal Access
    //==============================================================================

    pub(crate) fn as_ptr(&self, operation: &'static str) -> Result<*const RawPacket> {
        self.raw
            .map(|p| p.as_ptr() as *const RawPacket)
            .ok_or(TdtpError::UseAfterRelease { operation })
    }

    pub(crate) fn as_mut_ptr(&self, operation: &'static str) -> Result<*mut RawPacket> {
        self.raw
            .map(NonNull::as_ptr)
            .ok_or(TdtpError::UseAfterRelease { operation })
    }

    fn packet(&self, operation: &'static str) -> Result<&RawPacket> {
        let ptr = self.raw.ok_or(TdtpError::UseAfterRelease { operation })?;
        // SAFETY: Live means the box is still allocated, and nothing else
        // holds a mutable reference to it outside an engine call.
        Ok(unsafe { ptr.as_ref() })
    }

    /// A Live packet whose error buffer is empty.
    fn readable(&self, operation: &'static str) -> Result<&RawPacket> {
        let pkt = self.packet(operation)?;
        if pkt.has_error() {
            return Err(direct_error(self.origin, 0, &pkt.error_text()));
        }
        Ok(pkt)
    }
}

impl Drop for PacketHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for PacketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketHandle")
            .field("state", &if self.is_live() { "live" } else { "released" })
            .field("origin", &self.origin)
            .finish()
    }
}
