//! Concrete Values & Domains
//!
//! Every expression node caches the value observed during the concrete run.
//! Integer values are stored widened to `i64` and reals to `f64`; the JVM
//! type of a numeric node is carried separately as a `Width`, and results are
//! narrowed to it (`int` wraps at 32 bits, `float` rounds to single precision).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Theory a value (and therefore an expression or constraint) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    /// boolean, byte, short, char, int, long
    Integer,
    /// float, double
    Real,
    String,
    /// Object references (only null-ness is observable)
    Reference,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JVM type of a numeric node.
///
/// Ordered so that binary numeric promotion is `max`:
/// `int < long < float < double`. `boolean`, `byte`, `short` and `char` are
/// computed as `int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Width {
    Int,
    Long,
    Float,
    Double,
}

impl Width {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Binary numeric promotion; `None` when either side is not numeric
    pub fn promote(left: Option<Width>, right: Option<Width>) -> Option<Width> {
        Some(left?.max(right?))
    }

    /// Narrowest JVM type an unlabelled value is read as: integers that fit
    /// in 32 bits are `int`, other integers `long`, reals `double`
    pub fn infer(value: &ConcreteValue) -> Option<Width> {
        match value {
            ConcreteValue::Integer(v) if i32::try_from(*v).is_ok() => Some(Self::Int),
            ConcreteValue::Integer(_) => Some(Self::Long),
            ConcreteValue::Real(_) => Some(Self::Double),
            ConcreteValue::Str(_) | ConcreteValue::Reference(_) => None,
        }
    }

    /// Narrow a computed value to this type
    pub fn fit(self, value: ConcreteValue) -> ConcreteValue {
        match (self, value) {
            (Self::Int, ConcreteValue::Integer(v)) => ConcreteValue::Integer(v as i32 as i64),
            (Self::Float, ConcreteValue::Real(v)) => ConcreteValue::Real(v as f32 as f64),
            (_, value) => value,
        }
    }

    /// Hash tag; 0 is left for "no width"
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Int => 1,
            Self::Long => 2,
            Self::Float => 3,
            Self::Double => 4,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete value cached on an expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConcreteValue {
    Integer(i64),
    Real(f64),
    Str(Arc<str>),
    /// `None` is `null`, otherwise an opaque object id
    Reference(Option<u64>),
}

impl ConcreteValue {
    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Self::Str(value.into())
    }

    pub fn bool(value: bool) -> Self {
        Self::Integer(value as i64)
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Integer(_) => Domain::Integer,
            Self::Real(_) => Domain::Real,
            Self::Str(_) => Domain::String,
            Self::Reference(_) => Domain::Reference,
        }
    }

    /// Zero value of a domain, used when an operator has no defined result
    pub fn default_for(domain: Domain) -> Self {
        match domain {
            Domain::Integer => Self::Integer(0),
            Domain::Real => Self::Real(0.0),
            Domain::String => Self::Str(Arc::from("")),
            Domain::Reference => Self::Reference(None),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers are promoted the way the JVM promotes `long` to `double`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Structural equality that treats `NaN == NaN` and `0.0 != -0.0`, matching
    /// bit-level identity. Used when comparing cached bindings.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    /// Feed the value into a structural hasher
    pub(crate) fn hash_into(&self, hasher: &mut blake3::Hasher) {
        match self {
            Self::Integer(v) => {
                hasher.update(&[0]);
                hasher.update(&v.to_le_bytes());
            }
            Self::Real(v) => {
                hasher.update(&[1]);
                hasher.update(&v.to_bits().to_le_bytes());
            }
            Self::Str(s) => {
                hasher.update(&[2]);
                hasher.update(&(s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
            Self::Reference(r) => {
                hasher.update(&[3]);
                hasher.update(&r.map_or(u64::MAX, |id| id).to_le_bytes());
            }
        }
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "\"{}\"", v),
            Self::Reference(None) => write!(f, "null"),
            Self::Reference(Some(id)) => write!(f, "@{}", id),
        }
    }
}

impl From<i64> for ConcreteValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for ConcreteValue {
    fn from(v: i32) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<f64> for ConcreteValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for ConcreteValue {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

/// Optional search bounds attached to a symbolic variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    Integer { min: i64, max: i64 },
    Real { min: f64, max: f64 },
}

impl Bounds {
    /// Range of a JVM `int`
    pub const INT: Bounds = Bounds::Integer {
        min: i32::MIN as i64,
        max: i32::MAX as i64,
    };

    /// Range of a JVM `boolean`
    pub const BOOLEAN: Bounds = Bounds::Integer { min: 0, max: 1 };

    pub fn clamp_i64(&self, v: i64) -> i64 {
        match *self {
            Self::Integer { min, max } => v.clamp(min, max),
            Self::Real { min, max } => (v as f64).clamp(min, max) as i64,
        }
    }

    pub fn clamp_f64(&self, v: f64) -> f64 {
        match *self {
            Self::Integer { min, max } => v.clamp(min as f64, max as f64),
            Self::Real { min, max } => v.clamp(min, max),
        }
    }

    /// Whether every value in the bounds is a JVM `int`
    pub fn within_int(&self) -> bool {
        matches!(*self, Self::Integer { min, max }
            if min >= i32::MIN as i64 && max <= i32::MAX as i64)
    }
}
