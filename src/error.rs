// In: src/error.rs

//! This module defines the single, unified error type for the TDTP client.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Engine failures arrive as free-form text. `ErrorKind` is the closed set of
//! categories the rest of the crate (and its callers) branch on; the mapping
//! from engine text to a category lives in `bridge::classify`.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TdtpError>;

#[derive(Error, Debug)]
pub enum TdtpError {
    // =========================================================================
    // === Binding Errors (raised before any engine call is made)
    // =========================================================================
    #[error("native library '{name}' not found: {hint}")]
    LibraryNotFound { name: String, hint: String },

    #[error("failed to load native library at {path:?}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("native library does not export symbol '{symbol}'")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: Option<libloading::Error>,
    },

    /// The process already bound an engine, and a later override names another file.
    #[error("engine binding already initialised with {bound}; requested {requested:?}")]
    AlreadyBound { bound: String, requested: PathBuf },

    // =========================================================================
    // === Classified Engine Errors (payload is the engine's own message)
    // =========================================================================
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Filter(String),

    #[error("{0}")]
    Processor(String),

    #[error("{0}")]
    Write(String),

    /// An engine error whose text matched no known category.
    #[error("{0}")]
    UnclassifiedEngine(String),

    // =========================================================================
    // === Ownership & Protocol Errors
    // =========================================================================
    #[error("packet handle already released (during {operation})")]
    UseAfterRelease { operation: &'static str },

    #[error("engine returned a null response from {symbol}")]
    NullResponse { symbol: &'static str },

    #[error("engine returned an undecodable response from {symbol}: {source}")]
    InvalidResponse {
        symbol: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed engine packet: {0}")]
    MalformedPacket(String),

    #[error("engine broke its contract: {0}")]
    ContractViolation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library while encoding a request.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error originating from the Arrow library.
    #[cfg(feature = "arrow")]
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// The category of a `TdtpError`, used for branching without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LibraryNotFound,
    Parse,
    Filter,
    Processor,
    Write,
    UseAfterRelease,
    UnclassifiedEngine,
    /// Loading or symbol resolution failed after the file was found.
    Binding,
    /// The engine answered, but not in the shape the ABI promises.
    Protocol,
    /// The caller supplied something that cannot cross the boundary.
    Caller,
}

impl TdtpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TdtpError::LibraryNotFound { .. } => ErrorKind::LibraryNotFound,
            TdtpError::LibraryLoad { .. }
            | TdtpError::MissingSymbol { .. }
            | TdtpError::AlreadyBound { .. } => ErrorKind::Binding,
            TdtpError::Parse(_) => ErrorKind::Parse,
            TdtpError::Filter(_) => ErrorKind::Filter,
            TdtpError::Processor(_) => ErrorKind::Processor,
            TdtpError::Write(_) => ErrorKind::Write,
            TdtpError::UnclassifiedEngine(_) => ErrorKind::UnclassifiedEngine,
            TdtpError::UseAfterRelease { .. } => ErrorKind::UseAfterRelease,
            TdtpError::NullResponse { .. }
            | TdtpError::InvalidResponse { .. }
            | TdtpError::MalformedPacket(_)
            | TdtpError::ContractViolation(_) => ErrorKind::Protocol,
            TdtpError::InvalidArgument(_) | TdtpError::SerdeJson(_) => ErrorKind::Caller,
            TdtpError::Io(_) => ErrorKind::Caller,
            #[cfg(feature = "arrow")]
            TdtpError::Arrow(_) => ErrorKind::Caller,
        }
    }

    /// Builds the error for an engine failure already assigned to `kind`.
    ///
    /// Kinds that carry no engine text fall back to `UnclassifiedEngine`.
    pub(crate) fn engine(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Parse => TdtpError::Parse(message),
            ErrorKind::Filter => TdtpError::Filter(message),
            ErrorKind::Processor => TdtpError::Processor(message),
            ErrorKind::Write => TdtpError::Write(message),
            _ => TdtpError::UnclassifiedEngine(message),
        }
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<std::ffi::NulError> for TdtpError {
    fn from(err: std::ffi::NulError) -> Self {
        TdtpError::InvalidArgument(format!(
            "string contains an interior NUL byte at position {}",
            err.nul_position()
        ))
    }
}
