//! This module defines the owned, strongly-typed data representations that the
//! Direct boundary copies engine memory into, and the caller-built request
//! types (`FilterSpec`, `MaskConfig`) it copies out of.

pub mod filter;
pub mod mask;
pub mod packet;

// Re-export the main type(s) for easier access.
pub use filter::{FilterOp, FilterSpec};
pub use mask::MaskConfig;
pub use packet::{Compression, Field, PacketMeta, Row, Schema};
