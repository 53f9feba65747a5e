//! Utility modules: developer log sink and numeric conversions.
pub mod devlog;
pub mod num;
