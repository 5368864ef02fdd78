// In: src/config.rs

//! The single source of truth for all client configuration.
//!
//! `ClientConfig` is created once at the application boundary (from the
//! environment, a JSON document, or code) and then handed to the binder and
//! the two boundary clients. Every field has a default, so an empty JSON object
//! is a valid configuration.

use crate::error::{Result, TdtpError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

//==================================================================================
// 0. Environment Variables
//==================================================================================
/// Explicit path to the engine shared object. Must exist when set.
pub const ENV_LIB_PATH: &str = "TDTP_LIB_PATH";
/// Extra directories to search, separated like `PATH`.
pub const ENV_LIB_DIRS: &str = "TDTP_LIB_DIRS";

/// Valid `level` range for the engine's zstd compressor.
pub const COMPRESSION_LEVELS: std::ops::RangeInclusive<i32> = 1..=22;

//==================================================================================
// I. Sub-Configurations
//==================================================================================

/// Defaults used by masking calls that do not specify their own parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MaskDefaults {
    #[serde(default = "default_mask_char")]
    pub mask_char: char,

    /// Number of trailing characters left readable.
    #[serde(default = "default_visible_chars")]
    pub visible_chars: u32,
}

impl Default for MaskDefaults {
    fn default() -> Self {
        Self {
            mask_char: default_mask_char(),
            visible_chars: default_visible_chars(),
        }
    }
}

//==================================================================================
// II. The Unified ClientConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Exact library location. When set, no other location is tried.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// Overrides the platform file name (`libtdtp.so`, `libtdtp.dylib`, `libtdtp.dll`).
    #[serde(default)]
    pub library_name: Option<String>,

    /// Probed after the executable's own directory, in order.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,

    /// Level used by `DirectClient::compress_default` and JSON export options.
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,

    #[serde(default)]
    pub mask: MaskDefaults,

    /// If true, binding installs the crate's `env_logger` at `Info`.
    #[serde(default)]
    pub verbose_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            library_name: None,
            search_dirs: Vec::new(),
            compression_level: default_compression_level(),
            mask: MaskDefaults::default(),
            verbose_logging: false,
        }
    }
}

impl ClientConfig {
    /// Reads `TDTP_LIB_PATH` and `TDTP_LIB_DIRS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Same as `from_env`, with the variable source injected.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut config = Self::default();
        config.library_path = non_empty(ENV_LIB_PATH).map(PathBuf::from);
        if let Some(dirs) = non_empty(ENV_LIB_DIRS) {
            config.search_dirs = std::env::split_paths(&dirs).collect();
        }
        config
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !COMPRESSION_LEVELS.contains(&self.compression_level) {
            return Err(TdtpError::InvalidArgument(format!(
                "compression_level {} outside {}..={}",
                self.compression_level,
                COMPRESSION_LEVELS.start(),
                COMPRESSION_LEVELS.end()
            )));
        }
        if self.mask.mask_char.len_utf8() > crate::ffi::layout::MASK_CHAR_CAP - 1 {
            return Err(TdtpError::InvalidArgument(format!(
                "mask_char '{}' needs more than {} bytes",
                self.mask.mask_char,
                crate::ffi::layout::MASK_CHAR_CAP - 1
            )));
        }
        Ok(())
    }
}

/// Helper for `serde` to provide the engine's default zstd level.
fn default_compression_level() -> i32 {
    3
}

fn default_mask_char() -> char {
    '*'
}

fn default_visible_chars() -> u32 {
    4
}
