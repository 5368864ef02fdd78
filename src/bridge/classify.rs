// In: src/bridge/classify.rs

//! Maps engine error text to an `ErrorKind`.
//!
//! The JSON boundary only reports failures as free-form strings, so the
//! category is recovered from the message prefix. The table is ordered and
//! matched case-insensitively; the first hit wins.

use crate::error::{ErrorKind, TdtpError};

/// The Direct-boundary operations, each of which implies one error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectOp {
    Read,
    Write,
    Filter,
    Mask,
    Compress,
    Decompress,
}

impl DirectOp {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            DirectOp::Read => ErrorKind::Parse,
            DirectOp::Write => ErrorKind::Write,
            DirectOp::Filter => ErrorKind::Filter,
            DirectOp::Mask | DirectOp::Compress | DirectOp::Decompress => ErrorKind::Processor,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            DirectOp::Read => "D_ReadFile",
            DirectOp::Write => "D_WriteFile",
            DirectOp::Filter => "D_FilterRows",
            DirectOp::Mask => "D_ApplyMask",
            DirectOp::Compress => "D_ApplyCompress",
            DirectOp::Decompress => "D_ApplyDecompress",
        }
    }
}

const PREFIXES: &[(&str, ErrorKind)] = &[
    ("parse error", ErrorKind::Parse),
    ("decompress error", ErrorKind::Parse),
    ("invalid where clause", ErrorKind::Filter),
    ("filter error", ErrorKind::Filter),
    ("processor error", ErrorKind::Processor),
    ("process error", ErrorKind::Processor),
    ("chain", ErrorKind::Processor),
    ("write error", ErrorKind::Write),
];

/// Classifies a JSON-boundary error message.
pub fn classify(message: &str) -> ErrorKind {
    let lowered = message.trim_start().to_lowercase();
    PREFIXES
        .iter()
        .find(|(prefix, _)| lowered.starts_with(prefix))
        .map(|&(_, kind)| kind)
        .unwrap_or(ErrorKind::UnclassifiedEngine)
}

/// Classifies `message` and wraps it in the matching error.
pub fn classify_error(message: &str) -> TdtpError {
    TdtpError::engine(classify(message), message)
}

/// Builds the error for a failed Direct call from its status and error buffer.
pub fn direct_error(op: DirectOp, status: i32, message: &str) -> TdtpError {
    let detail = if message.is_empty() {
        format!("{} failed with status {}", op.symbol(), status)
    } else {
        message.to_string()
    };
    TdtpError::engine(op.error_kind(), detail)
}
