// In: src/types/mask.rs

//! Field-masking parameters for `D_ApplyMask`.

use crate::config::MaskDefaults;
use crate::error::{Result, TdtpError};
use crate::ffi::layout::{write_fixed, RawMaskConfig, MASK_CHAR_CAP};
use bytemuck::Zeroable;
use std::ffi::{c_char, c_int, CString};

/// Which fields to obscure, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskConfig {
    fields: Vec<String>,
    mask_char: char,
    visible_chars: u32,
}

impl MaskConfig {
    /// Builds a config. Duplicate field names are dropped, first occurrence wins.
    pub fn new<I, S>(fields: I, mask_char: char, visible_chars: u32) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if mask_char.len_utf8() > MASK_CHAR_CAP - 1 {
            return Err(TdtpError::InvalidArgument(format!(
                "mask_char '{}' does not fit in {} bytes",
                mask_char,
                MASK_CHAR_CAP - 1
            )));
        }
        if c_int::try_from(visible_chars).is_err() {
            return Err(TdtpError::InvalidArgument(format!(
                "visible_chars {} exceeds the engine's int range",
                visible_chars
            )));
        }

        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Ok(Self {
            fields: unique,
            mask_char,
            visible_chars,
        })
    }

    pub fn with_defaults<I, S>(fields: I, defaults: &MaskDefaults) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields, defaults.mask_char, defaults.visible_chars)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn mask_char(&self) -> char {
        self.mask_char
    }

    pub fn visible_chars(&self) -> u32 {
        self.visible_chars
    }

    pub(crate) fn to_raw(&self) -> Result<RawMaskGuard> {
        let names = self
            .fields
            .iter()
            .map(|f| CString::new(f.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut ptrs: Vec<*mut c_char> = names.iter().map(|c| c.as_ptr() as *mut c_char).collect();

        let mut raw = RawMaskConfig::zeroed();
        raw.fields = if ptrs.is_empty() {
            std::ptr::null_mut()
        } else {
            ptrs.as_mut_ptr()
        };
        raw.field_count = field_count(ptrs.len())?;
        let mut buf = [0u8; 4];
        // Width was checked in `new`, so this never truncates.
        let _ = write_fixed(&mut raw.mask_char, self.mask_char.encode_utf8(&mut buf));
        raw.visible_chars = c_int::try_from(self.visible_chars).map_err(|_| {
            TdtpError::InvalidArgument(format!(
                "visible_chars {} exceeds the engine's int range",
                self.visible_chars
            ))
        })?;

        Ok(RawMaskGuard {
            raw,
            _ptrs: ptrs,
            _names: names,
        })
    }
}

fn field_count(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| {
        TdtpError::InvalidArgument(format!("{} mask fields exceed the engine's int range", len))
    })
}

/// Keeps the C strings behind a `RawMaskConfig` alive for one engine call.
pub(crate) struct RawMaskGuard {
    pub raw: RawMaskConfig,
    _ptrs: Vec<*mut c_char>,
    _names: Vec<CString>,
}
