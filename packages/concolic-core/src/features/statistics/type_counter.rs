//! Constraint type counter
//!
//! Classifies each solved constraint by the domains of its variables.

use crate::features::symbolic::{Bounds, ConcreteValue, Constraint, Domain, VarName};
use serde::{Deserialize, Serialize};

const INTEGER: u8 = 0b001;
const REAL: u8 = 0b010;
const STRING: u8 = 0b100;

/// Counts per domain combination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounter {
    pub integer_only: u64,
    pub real_only: u64,
    pub string_only: u64,
    pub integer_real: u64,
    pub integer_string: u64,
    pub real_string: u64,
    pub integer_real_string: u64,
    /// Constraints over references only
    pub other: u64,
}

impl TypeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_constraints(&mut self, constraints: &[Constraint]) {
        for constraint in constraints {
            self.add(constraint);
        }
    }

    pub fn add(&mut self, constraint: &Constraint) {
        let slot = match domain_mask(constraint) {
            INTEGER => &mut self.integer_only,
            REAL => &mut self.real_only,
            STRING => &mut self.string_only,
            m if m == INTEGER | REAL => &mut self.integer_real,
            m if m == INTEGER | STRING => &mut self.integer_string,
            m if m == REAL | STRING => &mut self.real_string,
            m if m == INTEGER | REAL | STRING => &mut self.integer_real_string,
            _ => &mut self.other,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.integer_only
            + self.real_only
            + self.string_only
            + self.integer_real
            + self.integer_string
            + self.real_string
            + self.integer_real_string
            + self.other
    }
}

fn bit(domain: Domain) -> u8 {
    match domain {
        Domain::Integer => INTEGER,
        Domain::Real => REAL,
        Domain::String => STRING,
        Domain::Reference => 0,
    }
}

fn domain_mask(constraint: &Constraint) -> u8 {
    let mut mask = 0;
    for side in [constraint.left(), constraint.right()] {
        side.for_each_variable(&mut |_: &VarName, value: &ConcreteValue, _: Option<&Bounds>| {
            mask |= bit(value.domain())
        });
    }
    if mask == 0 {
        bit(constraint.domain())
    } else {
        mask
    }
}
