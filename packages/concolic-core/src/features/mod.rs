//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains (where it needs them):
//! - domain/     - Pure data model
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Implementations of the ports

pub mod symbolic;

pub mod path_condition;

pub mod reduction;

pub mod solver;

// Shared across workers of one session
pub mod cache;

pub mod concolic;

pub mod divergence;

pub mod statistics;
