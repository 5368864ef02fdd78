//! This file is the root of the `tdtp_native` crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules (`ffi`, `bridge`, `types`, etc.) so the
//!     Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types most callers need, so that
//!     `use tdtp_native::{JsonClient, DirectClient}` is enough to get started.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod adapters;
pub mod bridge;
pub mod config;
pub mod error;
pub mod ffi;
pub mod types;


//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{DirectClient, JsonClient, PacketData, PacketHandle};
pub use config::ClientConfig;
pub use error::{ErrorKind, Result, TdtpError};
pub use observability::{enable_verbose_logging, init_from_env, ENV_LOG};
pub use types::{FilterOp, FilterSpec, MaskConfig};
