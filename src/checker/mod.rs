// src/checker/mod.rs
// =============================================================================
// This module contains all link health checking logic.
//
// Submodules:
// - probe: the opaque/transparent fetch primitives and the reqwest
//   implementation
// - pool: the bounded worker pool, the status classification, and the
//   report types
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod pool;
mod probe;

// Re-export public items from submodules
// This lets users write `checker::check_links()` instead of
// `checker::pool::check_links()`
pub use pool::{
    check_links, classify, CheckOutcome, CheckReport, CheckTarget, LinkStatus, StatusCounts,
    DEFAULT_CONCURRENCY,
};
pub use probe::{HttpProbe, Probe, ProbeFailure};

// The deterministic fake network, shared by tests across the crate
#[cfg(test)]
pub use probe::testing;
