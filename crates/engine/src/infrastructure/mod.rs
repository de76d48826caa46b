//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod ap_cache_file;
pub mod clock;
pub mod config;
pub mod content_files;
pub mod in_memory;
pub mod ports;
