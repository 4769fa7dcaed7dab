//! Fuzzing library for scholar-discovery.
//!
//! This crate provides fuzzing targets for the JSON models accepted from
//! the proxy and from MCP clients, and for query expansion over arbitrary
//! text.
//!
//! # Usage
//!
//! ```bash
//! cd crates/discovery-fuzz
//! cargo +nightly fuzz run fuzz_paper_parse -- -max_total_time=60
//! ```

pub use scholar_discovery::models;
