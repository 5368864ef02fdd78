// In: src/ffi/mod.rs

//! Everything that touches the raw C ABI: finding the shared object, binding
//! its symbols, and mirroring its structs. Nothing above this module sees a
//! raw pointer except through the types re-exported here.

pub mod binder;
pub mod layout;
pub mod locator;
pub mod symbols;

pub use binder::BoundLibrary;
pub use locator::{locate, platform_library_name};
pub use symbols::Symbols;
