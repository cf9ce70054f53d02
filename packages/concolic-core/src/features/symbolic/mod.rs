//! Symbolic Expression & Constraint Model
//!
//! The leaf of the crate: concolic expression trees and the constraints built
//! over them.
//!
//! ## Architecture
//!
//! ```text
//! symbolic
//! ├── domain/               # Domain models
//! │   ├── value             # Domains, concrete values, bounds
//! │   ├── operator          # Comparators, unary/binary operators (JVM semantics)
//! │   ├── expression        # Concolic expression tree
//! │   └── constraint        # (left, comparator, right, domain)
//! └── infrastructure/
//!     ├── visitor           # Exhaustive post-order dispatch
//!     └── evaluator         # Re-evaluation under immutable bindings
//! ```
//!
//! ## Usage
//!
//! ```text
//! use concolic_core::features::symbolic::{Constraint, Expression};
//!
//! // x == 179, observed with x = 179
//! let c = Constraint::eq(Expression::int_var("x__SYM", 179), Expression::int(179));
//! assert!(c.holds_concretely());
//! assert!(!c.negate().holds_concretely());
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::{Bindings, Evaluator, ExpressionVisitor};
