//! Performance profiling utilities
//!
//! Timing guards are only compiled when the `perf_stats` feature is enabled.

pub use bastion_macros::profile;
