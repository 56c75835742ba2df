//! Utility functions module
//!
//! Table formatting and credential masking for console output.

pub mod format;

pub use format::*;
