//! Shared low-level helpers: magic-byte sniffing, archive extraction,
//! directory flattening and external tool lookup.

pub mod archive;
pub mod fsutil;
pub mod signature;
pub mod tools;
