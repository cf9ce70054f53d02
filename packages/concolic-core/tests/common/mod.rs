//! Common test utilities for concolic-core
//!
//! Shared builders, scripted programs and assertions for the integration
//! tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
