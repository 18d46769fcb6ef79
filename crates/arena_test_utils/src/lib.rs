//! # Arena Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixtures built from the shipped template data
//! - Scripted random source
//! - Matchup statistics for balance sweeps
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
