//! Path Condition
//!
//! Ordered per-branch decisions of one concrete run.
//!
//! ## Architecture
//!
//! ```text
//! path_condition
//! ├── domain/
//! │   ├── branch_condition  # Origin, decision, supporting constraints, kind
//! │   └── path_condition    # Ordered branches, flattening, negation
//! ├── ports/
//! │   └── instruction_observer  # Events emitted by the shadow VM
//! └── infrastructure/
//!     └── collector         # InstructionObserver → PathCondition
//! ```

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{BranchCondition, BranchKind, BranchOrigin, PathCondition};
pub use infrastructure::PathConditionCollector;
pub use ports::InstructionObserver;
