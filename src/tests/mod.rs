//! Cross-module scenario tests.
//!
//! These exercise build, apply, compare and archive together on a synthetic
//! two-chip observation.

pub(crate) mod fixtures;

mod apply_tests;
mod roundtrip_tests;
