//! Operators and Comparators
//!
//! Operator semantics follow the JVM for the concrete companion values:
//! integer arithmetic wraps at the width of the result (`int` at 32 bits,
//! `long` at 64), shift distances are masked to that width, real arithmetic
//! is IEEE-754 rounded to `float` or `double`, and `D2I` truncates toward zero
//! with NaN mapped to 0 and saturation at the `int` range.

use super::value::{ConcreteValue, Domain, Width};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Comparison operators for constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Comparator {
    /// Equal (==)
    #[default]
    Eq,
    /// Not equal (!=)
    Neq,
    /// Less than (<)
    Lt,
    /// Greater than (>)
    Gt,
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
}

impl Comparator {
    /// Logical complement: `==`↔`!=`, `<`↔`>=`, `<=`↔`>`
    pub fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Neq,
            Self::Neq => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Ge => Self::Lt,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Eq => 0,
            Self::Neq => 1,
            Self::Lt => 2,
            Self::Gt => 3,
            Self::Le => 4,
            Self::Ge => 5,
        }
    }

    /// Whether an ordering outcome satisfies the comparator
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Neq => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
            Self::Le => ordering != Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }

    /// Evaluate the comparator on two concrete values.
    ///
    /// Unordered comparisons (a NaN operand, mismatched domains) only satisfy `!=`.
    pub fn holds(self, left: &ConcreteValue, right: &ConcreteValue) -> bool {
        match compare_values(left, right) {
            Some(ordering) => self.accepts(ordering),
            None => self == Self::Neq,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Total-where-defined ordering between two concrete values
pub fn compare_values(left: &ConcreteValue, right: &ConcreteValue) -> Option<Ordering> {
    use ConcreteValue::*;
    match (left, right) {
        (Integer(a), Integer(b)) => Some(a.cmp(b)),
        (Integer(_) | Real(_), Integer(_) | Real(_)) => {
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        (Str(a), Str(b)) => Some(java_compare(a, b).cmp(&0)),
        (Reference(a), Reference(b)) => {
            if a == b {
                Some(Ordering::Equal)
            } else {
                // References are only equal or not
                None
            }
        }
        _ => None,
    }
}

/// `String.compareTo` over UTF-16 code units
fn java_compare(a: &str, b: &str) -> i64 {
    let mut left = a.encode_utf16();
    let mut right = b.encode_utf16();
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x != y => return x as i64 - y as i64,
            (Some(_), Some(_)) => continue,
            _ => break,
        }
    }
    a.encode_utf16().count() as i64 - b.encode_utf16().count() as i64
}

fn utf16_len(s: &str) -> i64 {
    s.encode_utf16().count() as i64
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    BitNot,
    Abs,
    /// int → long (sign extension)
    I2L,
    /// long → int (truncation to the low 32 bits)
    L2I,
    I2B,
    I2C,
    I2S,
    /// integer → double
    I2D,
    /// double → int (truncation toward zero, NaN → 0, saturating)
    D2I,
    /// double → long
    D2L,
    /// double → float rounding
    D2F,
    /// `Math.round(double)`
    Round,
    Floor,
    Ceil,
    Sqrt,
    /// `String.length()`
    Length,
    Trim,
    ToLowerCase,
    ToUpperCase,
    /// `ref == null` as 0/1
    IsNull,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::BitNot => "~",
            Self::Abs => "abs",
            Self::I2L => "i2l",
            Self::L2I => "l2i",
            Self::I2B => "i2b",
            Self::I2C => "i2c",
            Self::I2S => "i2s",
            Self::I2D => "i2d",
            Self::D2I => "d2i",
            Self::D2L => "d2l",
            Self::D2F => "d2f",
            Self::Round => "round",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Sqrt => "sqrt",
            Self::Length => "length",
            Self::Trim => "trim",
            Self::ToLowerCase => "toLowerCase",
            Self::ToUpperCase => "toUpperCase",
            Self::IsNull => "isNull",
        }
    }

    /// Domain of the result given the operand's domain
    pub fn result_domain(self, operand: Domain) -> Domain {
        match self {
            Self::Neg | Self::Abs => operand,
            Self::BitNot
            | Self::I2L
            | Self::L2I
            | Self::I2B
            | Self::I2C
            | Self::I2S
            | Self::D2I
            | Self::D2L
            | Self::Round
            | Self::Length
            | Self::IsNull => Domain::Integer,
            Self::I2D | Self::D2F | Self::Floor | Self::Ceil | Self::Sqrt => Domain::Real,
            Self::Trim | Self::ToLowerCase | Self::ToUpperCase => Domain::String,
        }
    }

    /// JVM type of the result given the operand's
    pub fn result_width(self, operand: Option<Width>) -> Option<Width> {
        match self {
            Self::Neg | Self::Abs | Self::BitNot => operand,
            Self::I2L | Self::D2L => Some(Width::Long),
            // Math.round(float) is int, Math.round(double) is long
            Self::Round => match operand {
                Some(Width::Float | Width::Int) => Some(Width::Int),
                _ => Some(Width::Long),
            },
            Self::L2I
            | Self::I2B
            | Self::I2C
            | Self::I2S
            | Self::D2I
            | Self::Length
            | Self::IsNull => Some(Width::Int),
            Self::D2F => Some(Width::Float),
            Self::I2D | Self::Floor | Self::Ceil | Self::Sqrt => Some(Width::Double),
            Self::Trim | Self::ToLowerCase | Self::ToUpperCase => None,
        }
    }

    /// Apply the operator and narrow the result to `width`; `None` when
    /// undefined for the operand
    pub fn apply(self, operand: &ConcreteValue, width: Option<Width>) -> Option<ConcreteValue> {
        if let (Self::Round, Some(Width::Int), ConcreteValue::Real(v)) = (self, width, operand) {
            // Math.round(float) saturates at the int range
            return Some(ConcreteValue::Integer((v + 0.5).floor() as i32 as i64));
        }
        let value = self.apply_raw(operand)?;
        Some(match width {
            Some(width) => width.fit(value),
            None => value,
        })
    }

    fn apply_raw(self, operand: &ConcreteValue) -> Option<ConcreteValue> {
        use ConcreteValue::*;
        let value = match (self, operand) {
            (Self::Neg, Integer(v)) => Integer(v.wrapping_neg()),
            (Self::Neg, Real(v)) => Real(-v),
            (Self::BitNot, Integer(v)) => Integer(!v),
            (Self::Abs, Integer(v)) => Integer(v.wrapping_abs()),
            (Self::Abs, Real(v)) => Real(v.abs()),
            (Self::I2L, Integer(v)) => Integer(*v),
            (Self::L2I, Integer(v)) => Integer(*v as i32 as i64),
            (Self::I2B, Integer(v)) => Integer(*v as i8 as i64),
            (Self::I2C, Integer(v)) => Integer(*v as u16 as i64),
            (Self::I2S, Integer(v)) => Integer(*v as i16 as i64),
            (Self::I2D, Integer(v)) => Real(*v as f64),
            // `as` casts from f64 saturate and map NaN to 0, like the JVM
            (Self::D2I, Real(v)) => Integer(*v as i32 as i64),
            (Self::D2I, Integer(v)) => Integer(*v as i32 as i64),
            (Self::D2L, Real(v)) => Integer(*v as i64),
            (Self::D2L, Integer(v)) => Integer(*v),
            (Self::D2F, Real(v)) => Real(*v as f32 as f64),
            (Self::Round, Real(v)) => Integer((v + 0.5).floor() as i64),
            (Self::Round, Integer(v)) => Integer(*v),
            (Self::Floor, Real(v)) => Real(v.floor()),
            (Self::Ceil, Real(v)) => Real(v.ceil()),
            (Self::Sqrt, Real(v)) => Real(v.sqrt()),
            (Self::Floor | Self::Ceil, Integer(v)) => Real(*v as f64),
            (Self::Sqrt, Integer(v)) => Real((*v as f64).sqrt()),
            (Self::Length, Str(s)) => Integer(utf16_len(s)),
            (Self::Trim, Str(s)) => Str(Arc::from(s.trim_matches(|c: char| c <= ' '))),
            (Self::ToLowerCase, Str(s)) => Str(Arc::from(s.to_lowercase().as_str())),
            (Self::ToUpperCase, Str(s)) => Str(Arc::from(s.to_uppercase().as_str())),
            (Self::IsNull, Reference(r)) => Integer(r.is_none() as i64),
            _ => return None,
        };
        Some(value)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
    Min,
    Max,
    Pow,
    Concat,
    /// `String.equals` as 0/1
    StrEquals,
    StartsWith,
    EndsWith,
    Contains,
    /// `String.charAt`
    CharAt,
    IndexOf,
    /// `String.compareTo`
    CompareTo,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pow => "pow",
            Self::Concat => "concat",
            Self::StrEquals => "equals",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Contains => "contains",
            Self::CharAt => "charAt",
            Self::IndexOf => "indexOf",
            Self::CompareTo => "compareTo",
        }
    }

    /// Infix operators print as `(l op r)`, the rest as `l.op(r)`
    pub fn is_infix(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Rem
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Shl
                | Self::Shr
                | Self::UShr
        )
    }

    pub fn result_domain(self, left: Domain, right: Domain) -> Domain {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Rem | Self::Min | Self::Max => {
                if left == Domain::Real || right == Domain::Real {
                    Domain::Real
                } else {
                    Domain::Integer
                }
            }
            Self::Pow => Domain::Real,
            Self::Concat => Domain::String,
            _ => Domain::Integer,
        }
    }

    /// JVM type of the result given the operands'.
    ///
    /// Arithmetic uses binary numeric promotion; a shift has the type of its
    /// left operand; string predicates and queries are `int`.
    pub fn result_width(self, left: Option<Width>, right: Option<Width>) -> Option<Width> {
        match self {
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Rem
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Min
            | Self::Max => Width::promote(left, right),
            Self::Shl | Self::Shr | Self::UShr => left,
            Self::Pow => Some(Width::Double),
            Self::Concat => None,
            Self::StrEquals
            | Self::StartsWith
            | Self::EndsWith
            | Self::Contains
            | Self::CharAt
            | Self::IndexOf
            | Self::CompareTo => Some(Width::Int),
        }
    }

    /// Apply the operator with a result of type `width`; `None` when undefined
    /// (e.g. integer division by zero).
    ///
    /// Integer operands are computed as `long` unless `width` is `int`.
    pub fn apply(
        self,
        left: &ConcreteValue,
        right: &ConcreteValue,
        width: Option<Width>,
    ) -> Option<ConcreteValue> {
        use ConcreteValue::*;
        let value = match (left, right) {
            (Integer(a), Integer(b)) if self != Self::Pow => {
                let width = width.unwrap_or(Width::Long);
                Integer(self.apply_integer(*a, *b, width == Width::Int)?)
            }
            (Integer(_) | Real(_), Integer(_) | Real(_)) => {
                Real(self.apply_real(left.as_f64()?, right.as_f64()?)?)
            }
            _ => self.apply_other(left, right)?,
        };
        Some(match width {
            Some(width) => width.fit(value),
            None => value,
        })
    }

    fn apply_other(self, left: &ConcreteValue, right: &ConcreteValue) -> Option<ConcreteValue> {
        use ConcreteValue::*;
        match (left, right) {
            (Str(a), Str(b)) => self.apply_string(a, b),
            (Str(a), Integer(i)) if self == Self::CharAt => {
                let unit = usize::try_from(*i)
                    .ok()
                    .and_then(|idx| a.encode_utf16().nth(idx))?;
                Some(Integer(unit as i64))
            }
            _ => None,
        }
    }

    /// `int` operations shift by `b & 31` and wrap at 32 bits (the wrap is
    /// applied by the caller's `Width::fit`), `long` ones by `b & 63`
    fn apply_integer(self, a: i64, b: i64, int: bool) -> Option<i64> {
        // wrapping_sh* mask the distance to the bit width of the receiver
        let shift = b as u32;
        let value = match self {
            Self::Shl if int => (a as i32).wrapping_shl(shift) as i64,
            Self::Shr if int => (a as i32).wrapping_shr(shift) as i64,
            Self::UShr if int => (a as u32).wrapping_shr(shift) as i32 as i64,
            Self::Add => a.wrapping_add(b),
            Self::Sub => a.wrapping_sub(b),
            Self::Mul => a.wrapping_mul(b),
            Self::Div if b == 0 => return None,
            Self::Div => a.wrapping_div(b),
            Self::Rem if b == 0 => return None,
            Self::Rem => a.wrapping_rem(b),
            Self::And => a & b,
            Self::Or => a | b,
            Self::Xor => a ^ b,
            Self::Shl => a.wrapping_shl(shift),
            Self::Shr => a.wrapping_shr(shift),
            Self::UShr => (a as u64).wrapping_shr(shift) as i64,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            _ => return None,
        };
        Some(value)
    }

    fn apply_real(self, a: f64, b: f64) -> Option<f64> {
        let value = match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Rem => a % b,
            Self::Min if a.is_nan() || b.is_nan() => f64::NAN,
            Self::Min => a.min(b),
            Self::Max if a.is_nan() || b.is_nan() => f64::NAN,
            Self::Max => a.max(b),
            Self::Pow => a.powf(b),
            _ => return None,
        };
        Some(value)
    }

    fn apply_string(self, a: &str, b: &str) -> Option<ConcreteValue> {
        use ConcreteValue::*;
        let value = match self {
            Self::Concat => Str(Arc::from(format!("{}{}", a, b).as_str())),
            Self::StrEquals => Integer((a == b) as i64),
            Self::StartsWith => Integer(a.starts_with(b) as i64),
            Self::EndsWith => Integer(a.ends_with(b) as i64),
            Self::Contains => Integer(a.contains(b) as i64),
            Self::IndexOf => Integer(
                a.find(b)
                    .map(|byte_idx| utf16_len(&a[..byte_idx]))
                    .unwrap_or(-1),
            ),
            Self::CompareTo => Integer(java_compare(a, b)),
            _ => return None,
        };
        Some(value)
    }
}
