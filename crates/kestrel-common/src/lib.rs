//! Common utilities for the Kestrel HTML parser.
//!
//! This crate provides shared infrastructure used by the parser crates:
//! - **Warning System** - deduplicated `tracing` warnings for unsupported features

pub mod warning;
