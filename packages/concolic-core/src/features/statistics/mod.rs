//! Search Statistics
//!
//! Session-scoped replacement for process-wide counters: one
//! `DseStatistics` per search session, shared by reference.

mod dse_statistics;
mod type_counter;

pub use dse_statistics::{DseStatistics, RunningStat, StatsSnapshot};
pub use type_counter::TypeCounter;
