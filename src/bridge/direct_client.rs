// In: src/bridge/direct_client.rs

//! The Direct boundary client.
//!
//! Each operation allocates a zeroed output packet, passes its address to the
//! `D_*` symbol, and on a `0` status wraps the result in a `PacketHandle`. On a
//! nonzero status the output's `error` buffer is read and classified by
//! operation, and the output is dropped without `D_FreePacket` (a failed call
//! leaves nothing attached to it).
//!
//! Input handles are only borrowed; the caller still owns and releases them.

use super::classify::{direct_error, DirectOp};
use super::handle::PacketHandle;
use super::{int_arg, path_arg};
use crate::config::{ClientConfig, COMPRESSION_LEVELS};
use crate::error::{Result, TdtpError};
use crate::ffi::layout::{RawFilterSpec, RawPacket};
use crate::ffi::{BoundLibrary, Symbols};
use crate::types::{FilterSpec, MaskConfig};
use std::ffi::c_int;
use std::path::Path;
use std::sync::Arc;

/// Client for the `D_*` exports. Cheap to clone and share.
#[derive(Debug, Clone)]
pub struct DirectClient {
    lib: Arc<BoundLibrary>,
    config: ClientConfig,
}

impl DirectClient {
    /// A client on the process-wide binding, configured from the environment.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let lib = BoundLibrary::global_with(&config)?;
        Ok(Self { lib, config })
    }

    pub fn with_library(lib: Arc<BoundLibrary>, config: ClientConfig) -> Self {
        Self { lib, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    //==============================================================================
    // I. I/O
    //==============================================================================

    pub fn read(&self, path: impl AsRef<Path>) -> Result<PacketHandle> {
        let path = path_arg(path.as_ref())?;
        self.run(DirectOp::Read, |s, out| unsafe {
            (s.d_read_file)(path.as_ptr(), out)
        })
    }

    /// Reads `path`, runs `f` on the packet, and releases it whatever `f` returns.
    pub fn read_scoped<T>(
        &self,
        path: impl AsRef<Path>,
        f: impl FnOnce(&PacketHandle) -> Result<T>,
    ) -> Result<T> {
        let mut handle = self.read(path)?;
        let out = f(&handle);
        handle.release();
        out
    }

    /// Writes a packet. On failure the engine's message is returned and the
    /// packet's error buffer is cleared so the handle stays readable.
    pub fn write(&self, handle: &PacketHandle, path: impl AsRef<Path>) -> Result<()> {
        let pkt = handle.as_mut_ptr("write")?;
        let path = path_arg(path.as_ref())?;
        let status = self.lib.serialized(DirectOp::Write.symbol(), |s| unsafe {
            (s.d_write_file)(pkt, path.as_ptr())
        });
        if status == 0 {
            return Ok(());
        }
        // SAFETY: `pkt` is Live and no reference into it is held across this block.
        let message = unsafe {
            let pkt = &mut *pkt;
            let message = pkt.error_text();
            pkt.clear_error();
            message
        };
        Err(direct_error(DirectOp::Write, status, &message))
    }

    //==============================================================================
    // II. Filtering & Processors
    //==============================================================================

    /// Keeps rows matching every spec. An empty spec list with `limit == 0`
    /// returns every row unchanged.
    pub fn filter(
        &self,
        handle: &PacketHandle,
        specs: &[FilterSpec],
        limit: usize,
    ) -> Result<PacketHandle> {
        let input = handle.as_ptr("filter")?;
        let limit = int_arg("limit", limit)?;
        let count = int_arg("spec count", specs.len())?;

        let raw_specs: Vec<RawFilterSpec> = specs
            .iter()
            .map(|spec| {
                let (raw, cut) = spec.to_raw();
                for (part, t) in cut {
                    log::warn!(
                        "filter on '{}': {} truncated from {} to {} bytes",
                        spec.field,
                        part,
                        t.original_len,
                        t.stored_len
                    );
                }
                raw
            })
            .collect();
        let specs_ptr = if raw_specs.is_empty() {
            std::ptr::null()
        } else {
            raw_specs.as_ptr()
        };

        self.run(DirectOp::Filter, |s, out| unsafe {
            (s.d_filter_rows)(input, specs_ptr, count, limit, out)
        })
    }

    /// Masks `fields`, leaving `visible_chars` trailing characters readable.
    pub fn apply_mask<I, S>(
        &self,
        handle: &PacketHandle,
        fields: I,
        mask_char: char,
        visible_chars: u32,
    ) -> Result<PacketHandle>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = MaskConfig::new(fields, mask_char, visible_chars)?;
        self.apply_mask_config(handle, &config)
    }

    /// `apply_mask` with this client's configured mask defaults.
    pub fn apply_mask_default<I, S>(&self, handle: &PacketHandle, fields: I) -> Result<PacketHandle>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = MaskConfig::with_defaults(fields, &self.config.mask)?;
        self.apply_mask_config(handle, &config)
    }

    pub fn apply_mask_config(
        &self,
        handle: &PacketHandle,
        config: &MaskConfig,
    ) -> Result<PacketHandle> {
        let input = handle.as_ptr("apply_mask")?;
        let mut guard = config.to_raw()?;
        let cfg_ptr = &guard.raw as *const _;

        let result = self.run(DirectOp::Mask, |s, out| unsafe {
            (s.d_apply_mask)(input, cfg_ptr, out)
        });
        // Caller-owned config: the engine side of this is a no-op, the
        // strings are dropped with `guard`.
        self.lib.serialized("D_FreeMaskConfig", |s| unsafe {
            (s.d_free_mask_config)(&mut guard.raw)
        });
        result
    }

    /// Compresses all rows into a single zstd row. `level` must be in `1..=22`.
    pub fn compress(&self, handle: &PacketHandle, level: i32) -> Result<PacketHandle> {
        let input = handle.as_ptr("compress")?;
        if !COMPRESSION_LEVELS.contains(&level) {
            return Err(TdtpError::Processor(format!(
                "processor error: compression level {} outside {}..={}",
                level,
                COMPRESSION_LEVELS.start(),
                COMPRESSION_LEVELS.end()
            )));
        }

        let mut out = self.run(DirectOp::Compress, |s, out| unsafe {
            (s.d_apply_compress)(input, level, out)
        })?;

        let rows = out.row_count()?;
        let compression = out.compression()?;
        if rows != 1 || !compression.is_compressed() {
            out.release();
            return Err(TdtpError::ContractViolation(format!(
                "D_ApplyCompress returned {} rows with compression '{}'",
                rows, compression
            )));
        }
        Ok(out)
    }

    /// `compress` at this client's configured level.
    pub fn compress_default(&self, handle: &PacketHandle) -> Result<PacketHandle> {
        self.compress(handle, self.config.compression_level)
    }

    /// Restores the schema and rows a `compress` call packed away.
    pub fn decompress(&self, handle: &PacketHandle) -> Result<PacketHandle> {
        let input = handle.as_ptr("decompress")?;
        self.run(DirectOp::Decompress, |s, out| unsafe {
            (s.d_apply_decompress)(input, out)
        })
    }

    //==============================================================================
    // III. Call Protocol
    //==============================================================================

    fn run(
        &self,
        op: DirectOp,
        invoke: impl FnOnce(&Symbols, *mut RawPacket) -> c_int,
    ) -> Result<PacketHandle> {
        let mut out = RawPacket::boxed_zeroed();
        let out_ptr: *mut RawPacket = &mut *out;
        let status = self.lib.serialized(op.symbol(), |s| invoke(s, out_ptr));

        if status != 0 {
            let message = out.error_text();
            log::debug!("{} failed with status {}: {}", op.symbol(), status, message);
            return Err(direct_error(op, status, &message));
        }

        let mut handle = PacketHandle::new(Arc::clone(&self.lib), out, op);
        if let Some(message) = handle.error_info()? {
            log::warn!(
                "{} reported success but set error: {}",
                op.symbol(),
                message
            );
            handle.release();
            return Err(direct_error(op, 0, &message));
        }
        Ok(handle)
    }
}

