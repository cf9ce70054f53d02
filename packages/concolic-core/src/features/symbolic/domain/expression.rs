//! Concolic Expression Tree
//!
//! A closed tagged union over four node shapes. Every node caches the concrete
//! value observed during the run, so each node is both a formula and a cached
//! evaluation. Nodes are immutable and shared through `Arc`.
//!
//! Numeric nodes also carry their JVM `Width`; computed values are narrowed to
//! it, so `int` arithmetic wraps at 32 bits and `float` rounds to single
//! precision.

use super::operator::{BinaryOp, UnaryOp};
use super::value::{Bounds, ConcreteValue, Domain, Width};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable expression node
pub type ExprRef = Arc<Expression>;

/// Symbolic variable name
pub type VarName = Arc<str>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant {
        value: ConcreteValue,
        width: Option<Width>,
    },
    Variable {
        name: VarName,
        value: ConcreteValue,
        bounds: Option<Bounds>,
        width: Option<Width>,
    },
    Unary {
        op: UnaryOp,
        operand: ExprRef,
        value: ConcreteValue,
        width: Option<Width>,
    },
    Binary {
        op: BinaryOp,
        left: ExprRef,
        right: ExprRef,
        value: ConcreteValue,
        width: Option<Width>,
    },
}

impl Expression {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Constructors
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Constant typed `int` when it fits, else `long`; reals are `double`
    pub fn constant(value: impl Into<ConcreteValue>) -> ExprRef {
        let value = value.into();
        let width = Width::infer(&value);
        Self::constant_with_width(value, width)
    }

    pub fn constant_with_width(value: ConcreteValue, width: Option<Width>) -> ExprRef {
        let value = match width {
            Some(width) => width.fit(value),
            None => value,
        };
        Arc::new(Self::Constant { value, width })
    }

    pub fn int(value: i64) -> ExprRef {
        Self::constant(value)
    }

    pub fn long(value: i64) -> ExprRef {
        Self::constant_with_width(ConcreteValue::Integer(value), Some(Width::Long))
    }

    pub fn real(value: f64) -> ExprRef {
        Self::constant(value)
    }

    pub fn float(value: f32) -> ExprRef {
        Self::constant_with_width(ConcreteValue::Real(value as f64), Some(Width::Float))
    }

    pub fn string(value: &str) -> ExprRef {
        Self::constant(value)
    }

    pub fn null() -> ExprRef {
        Self::constant(ConcreteValue::Reference(None))
    }

    /// Variable typed from its bounds: integers bounded within the `int`
    /// range are `int`, other integers `long`, reals `double`
    pub fn variable(
        name: impl Into<VarName>,
        value: impl Into<ConcreteValue>,
        bounds: Option<Bounds>,
    ) -> ExprRef {
        let value = value.into();
        let width = match (&value, &bounds) {
            (ConcreteValue::Integer(_), Some(b)) if b.within_int() => Some(Width::Int),
            (ConcreteValue::Integer(_), _) => Some(Width::Long),
            (ConcreteValue::Real(_), _) => Some(Width::Double),
            _ => None,
        };
        Self::variable_with_width(name, value, bounds, width)
    }

    pub fn variable_with_width(
        name: impl Into<VarName>,
        value: ConcreteValue,
        bounds: Option<Bounds>,
        width: Option<Width>,
    ) -> ExprRef {
        let value = match width {
            Some(width) => width.fit(value),
            None => value,
        };
        Arc::new(Self::Variable {
            name: name.into(),
            value,
            bounds,
            width,
        })
    }

    /// Integer variable bounded to the JVM `int` range
    pub fn int_var(name: &str, value: i64) -> ExprRef {
        Self::variable(name, value, Some(Bounds::INT))
    }

    /// Unbounded integer variable (`long`)
    pub fn long_var(name: &str, value: i64) -> ExprRef {
        Self::variable(name, value, None)
    }

    pub fn bool_var(name: &str, value: bool) -> ExprRef {
        Self::variable(name, ConcreteValue::bool(value), Some(Bounds::BOOLEAN))
    }

    pub fn real_var(name: &str, value: f64) -> ExprRef {
        Self::variable(name, value, None)
    }

    /// Single-precision variable
    pub fn float_var(name: &str, value: f32) -> ExprRef {
        Self::variable_with_width(
            name,
            ConcreteValue::Real(value as f64),
            None,
            Some(Width::Float),
        )
    }

    pub fn string_var(name: &str, value: &str) -> ExprRef {
        Self::variable(name, value, None)
    }

    /// Unary node with an explicit cached value (as observed by the VM)
    pub fn unary_with_value(op: UnaryOp, operand: ExprRef, value: ConcreteValue) -> ExprRef {
        let width = op.result_width(operand.width());
        Arc::new(Self::Unary {
            op,
            operand,
            value,
            width,
        })
    }

    /// Unary node whose cached value is computed from the operand's.
    ///
    /// Never fails: an undefined result caches the zero value of the result domain.
    pub fn unary(op: UnaryOp, operand: ExprRef) -> ExprRef {
        let value = op
            .apply(operand.concrete_value(), op.result_width(operand.width()))
            .unwrap_or_else(|| ConcreteValue::default_for(op.result_domain(operand.domain())));
        Self::unary_with_value(op, operand, value)
    }

    pub fn binary_with_value(
        op: BinaryOp,
        left: ExprRef,
        right: ExprRef,
        value: ConcreteValue,
    ) -> ExprRef {
        let width = op.result_width(left.width(), right.width());
        Arc::new(Self::Binary {
            op,
            left,
            right,
            value,
            width,
        })
    }

    /// Binary node whose cached value is computed from the operands'
    pub fn binary(op: BinaryOp, left: ExprRef, right: ExprRef) -> ExprRef {
        let width = op.result_width(left.width(), right.width());
        let value = op
            .apply(left.concrete_value(), right.concrete_value(), width)
            .unwrap_or_else(|| {
                ConcreteValue::default_for(op.result_domain(left.domain(), right.domain()))
            });
        Self::binary_with_value(op, left, right, value)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Queries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Concrete value observed in the run
    pub fn concrete_value(&self) -> &ConcreteValue {
        match self {
            Self::Constant { value, .. }
            | Self::Variable { value, .. }
            | Self::Unary { value, .. }
            | Self::Binary { value, .. } => value,
        }
    }

    pub fn domain(&self) -> Domain {
        self.concrete_value().domain()
    }

    /// JVM type of the node; `None` for strings and references
    pub fn width(&self) -> Option<Width> {
        match self {
            Self::Constant { width, .. }
            | Self::Variable { width, .. }
            | Self::Unary { width, .. }
            | Self::Binary { width, .. } => *width,
        }
    }

    /// Node count
    pub fn size(&self) -> usize {
        match self {
            Self::Constant { .. } | Self::Variable { .. } => 1,
            Self::Unary { operand, .. } => 1 + operand.size(),
            Self::Binary { left, right, .. } => 1 + left.size() + right.size(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant { .. })
    }

    pub fn contains_variable(&self) -> bool {
        match self {
            Self::Constant { .. } => false,
            Self::Variable { .. } => true,
            Self::Unary { operand, .. } => operand.contains_variable(),
            Self::Binary { left, right, .. } => {
                left.contains_variable() || right.contains_variable()
            }
        }
    }

    /// Names of the free variables, sorted
    pub fn variables(&self) -> BTreeSet<VarName> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<VarName>) {
        self.for_each_variable(&mut |name, _, _| {
            out.insert(name.clone());
        });
    }

    /// Visit every variable occurrence with its cached value and bounds
    pub fn for_each_variable<F>(&self, f: &mut F)
    where
        F: FnMut(&VarName, &ConcreteValue, Option<&Bounds>),
    {
        match self {
            Self::Constant { .. } => {}
            Self::Variable {
                name,
                value,
                bounds,
                ..
            } => f(name, value, bounds.as_ref()),
            Self::Unary { operand, .. } => operand.for_each_variable(f),
            Self::Binary { left, right, .. } => {
                left.for_each_variable(f);
                right.for_each_variable(f);
            }
        }
    }

    /// Feed the structure (not the cached values of inner nodes) into a hasher.
    ///
    /// Variables hash by name, domain and width; two occurrences of the same variable
    /// in different runs must produce the same fingerprint.
    pub(crate) fn hash_into(&self, hasher: &mut blake3::Hasher) {
        match self {
            Self::Constant { value, width } => {
                hasher.update(b"C");
                hasher.update(&[width.map_or(0, Width::tag)]);
                value.hash_into(hasher);
            }
            Self::Variable {
                name, value, width, ..
            } => {
                hasher.update(b"V");
                hasher.update(&(name.len() as u64).to_le_bytes());
                hasher.update(name.as_bytes());
                hasher.update(value.domain().as_str().as_bytes());
                hasher.update(&[width.map_or(0, Width::tag)]);
            }
            Self::Unary { op, operand, .. } => {
                hasher.update(b"U");
                hasher.update(op.name().as_bytes());
                operand.hash_into(hasher);
            }
            Self::Binary {
                op, left, right, ..
            } => {
                hasher.update(b"B");
                hasher.update(op.name().as_bytes());
                left.hash_into(hasher);
                right.hash_into(hasher);
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { value, .. } => write!(f, "{}", value),
            Self::Variable { name, .. } => write!(f, "{}", name),
            Self::Unary { op, operand, .. } => match op {
                UnaryOp::Neg | UnaryOp::BitNot => write!(f, "{}{}", op.name(), operand),
                _ => write!(f, "{}({})", op.name(), operand),
            },
            Self::Binary {
                op, left, right, ..
            } => {
                if op.is_infix() {
                    write!(f, "({} {} {})", left, op.name(), right)
                } else {
                    write!(f, "{}.{}({})", left, op.name(), right)
                }
            }
        }
    }
}
