//! Concrete test port
//!
//! The driver never builds tests itself. It clones the caller's test and
//! overwrites the primitive statements that declare solved variables.

use crate::features::solver::ModelValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a primitive statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    String,
}

/// Value of a primitive statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    /// UTF-16 code unit
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl PrimitiveValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Byte(_) => PrimitiveKind::Byte,
            Self::Short(_) => PrimitiveKind::Short,
            Self::Char(_) => PrimitiveKind::Char,
            Self::Int(_) => PrimitiveKind::Int,
            Self::Long(_) => PrimitiveKind::Long,
            Self::Float(_) => PrimitiveKind::Float,
            Self::Double(_) => PrimitiveKind::Double,
            Self::String(_) => PrimitiveKind::String,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "(byte) {}", v),
            Self::Short(v) => write!(f, "(short) {}", v),
            Self::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "'{}'", c.escape_default()),
                None => write!(f, "'\\u{:04x}'", v),
            },
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}L", v),
            Self::Float(v) => write!(f, "{}F", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
        }
    }
}

impl PrimitiveKind {
    /// Convert a solver value to this kind with JVM narrowing rules.
    ///
    /// Integers narrow by truncation to the low bits (two's complement);
    /// a boolean is `true` iff the `int` narrowing is positive. A string model
    /// value for a `char` is parsed as its code. `None` when the value cannot
    /// populate a statement of this kind (including `Null`).
    pub fn narrow(self, value: &ModelValue) -> Option<PrimitiveValue> {
        use PrimitiveValue as V;
        match (self, value) {
            (Self::Boolean, ModelValue::Long(v)) => Some(V::Boolean((*v as i32) > 0)),
            (Self::Byte, ModelValue::Long(v)) => Some(V::Byte(*v as i8)),
            (Self::Short, ModelValue::Long(v)) => Some(V::Short(*v as i16)),
            (Self::Char, ModelValue::Long(v)) => Some(V::Char(*v as u16)),
            (Self::Int, ModelValue::Long(v)) => Some(V::Int(*v as i32)),
            (Self::Long, ModelValue::Long(v)) => Some(V::Long(*v)),
            (Self::Char, ModelValue::String(s)) => {
                s.trim().parse::<i32>().ok().map(|code| V::Char(code as u16))
            }
            (Self::String, ModelValue::String(s)) => Some(V::String(s.clone())),
            (Self::Float, ModelValue::Double(v)) => Some(V::Float(*v as f32)),
            (Self::Double, ModelValue::Double(v)) => Some(V::Double(*v)),
            _ => None,
        }
    }
}

/// A statement of the test that declares a primitive-valued variable
pub trait PrimitiveStatement {
    fn variable_name(&self) -> &str;

    fn kind(&self) -> PrimitiveKind;

    fn value(&self) -> PrimitiveValue;

    /// Overwrite the value; `value.kind() == self.kind()`
    fn set_value(&mut self, value: PrimitiveValue);
}

/// A concrete test the search can execute and patch
pub trait TestCase {
    /// Deep copy; patches on the copy must not affect `self`
    fn clone_test(&self) -> Self
    where
        Self: Sized;

    fn find_primitive_statement_by_variable_name(
        &mut self,
        name: &str,
    ) -> Option<&mut dyn PrimitiveStatement>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_integer_narrowing() {
        let v = ModelValue::Long(0x1_0000_0041);
        assert_eq!(PrimitiveKind::Long.narrow(&v), Some(PrimitiveValue::Long(0x1_0000_0041)));
        assert_eq!(PrimitiveKind::Int.narrow(&v), Some(PrimitiveValue::Int(0x41)));
        assert_eq!(PrimitiveKind::Char.narrow(&v), Some(PrimitiveValue::Char(0x41)));
        assert_eq!(PrimitiveKind::Byte.narrow(&ModelValue::Long(200)), Some(PrimitiveValue::Byte(-56)));
        assert_eq!(PrimitiveKind::Short.narrow(&ModelValue::Long(70_000)), Some(PrimitiveValue::Short(4_464)));
    }

    #[test]
    fn test_boolean_narrowing() {
        assert_eq!(PrimitiveKind::Boolean.narrow(&ModelValue::Long(1)), Some(PrimitiveValue::Boolean(true)));
        assert_eq!(PrimitiveKind::Boolean.narrow(&ModelValue::Long(0)), Some(PrimitiveValue::Boolean(false)));
        assert_eq!(PrimitiveKind::Boolean.narrow(&ModelValue::Long(-3)), Some(PrimitiveValue::Boolean(false)));
        // Low 32 bits decide
        assert_eq!(
            PrimitiveKind::Boolean.narrow(&ModelValue::Long(1 << 32)),
            Some(PrimitiveValue::Boolean(false))
        );
    }

    #[test]
    fn test_string_and_real_narrowing() {
        assert_eq!(
            PrimitiveKind::Char.narrow(&ModelValue::String("97".into())),
            Some(PrimitiveValue::Char(97))
        );
        assert_eq!(PrimitiveKind::Char.narrow(&ModelValue::String("a".into())), None);
        assert_eq!(
            PrimitiveKind::String.narrow(&ModelValue::String("hi".into())),
            Some(PrimitiveValue::String("hi".into()))
        );
        assert_eq!(PrimitiveKind::Float.narrow(&ModelValue::Double(0.5)), Some(PrimitiveValue::Float(0.5)));
        assert_eq!(PrimitiveKind::Double.narrow(&ModelValue::Double(2.25)), Some(PrimitiveValue::Double(2.25)));
    }

    #[test]
    fn test_unsupported_combinations() {
        assert_eq!(PrimitiveKind::Int.narrow(&ModelValue::Null), None);
        assert_eq!(PrimitiveKind::Int.narrow(&ModelValue::Double(1.0)), None);
        assert_eq!(PrimitiveKind::Double.narrow(&ModelValue::Long(1)), None);
        assert_eq!(PrimitiveKind::String.narrow(&ModelValue::Long(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PrimitiveValue::Long(3).to_string(), "3L");
        assert_eq!(PrimitiveValue::Char(u16::from(b'x')).to_string(), "'x'");
        assert_eq!(PrimitiveValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
    }

    #[quickcheck]
    fn narrowing_preserves_kind(v: i64) -> bool {
        [
            PrimitiveKind::Boolean,
            PrimitiveKind::Byte,
            PrimitiveKind::Short,
            PrimitiveKind::Char,
            PrimitiveKind::Int,
            PrimitiveKind::Long,
        ]
        .iter()
        .all(|&kind| {
            PrimitiveKind::narrow(kind, &ModelValue::Long(v)).map(|p| p.kind()) == Some(kind)
        })
    }

    #[quickcheck]
    fn int_narrowing_is_low_bits(v: i64) -> bool {
        PrimitiveKind::Int.narrow(&ModelValue::Long(v))
            == Some(PrimitiveValue::Int((v & 0xffff_ffff) as u32 as i32))
    }
}
