//! Branch distance
//!
//! How far the current bindings are from satisfying a constraint. Zero means
//! satisfied. Used as the fitness of the local-search solver.

use crate::features::symbolic::{
    BinaryOp, Bindings, Comparator, ConcreteValue, Constraint, Evaluator, Expression,
};

/// Map `[0, ∞]` into `[0, 1]`
pub fn normalize(distance: f64) -> f64 {
    if distance.is_nan() || distance.is_infinite() {
        1.0
    } else {
        distance / (distance + 1.0)
    }
}

/// Sum of normalised distances of all constraints
pub fn query_distance(constraints: &[Constraint], bindings: &Bindings) -> f64 {
    constraints
        .iter()
        .map(|c| normalize(constraint_distance(c, bindings)))
        .sum()
}

/// Distance of a single constraint; `f64::INFINITY` when undefined
pub fn constraint_distance(constraint: &Constraint, bindings: &Bindings) -> f64 {
    let mut evaluator = Evaluator::new(bindings);

    if let Some(distance) = string_predicate_distance(constraint, &mut evaluator) {
        return distance;
    }

    let (Some(left), Some(right)) = (
        evaluator.evaluate(constraint.left()),
        evaluator.evaluate(constraint.right()),
    ) else {
        return f64::INFINITY;
    };

    match (&left, &right) {
        (ConcreteValue::Integer(l), ConcreteValue::Integer(r)) => {
            integer_distance(constraint.comparator(), *l, *r)
        }
        (ConcreteValue::Str(l), ConcreteValue::Str(r)) => match constraint.comparator() {
            Comparator::Eq => string_equals_distance(l, r),
            cmp if cmp.holds(&left, &right) => 0.0,
            _ => 1.0,
        },
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => real_distance(constraint.comparator(), l, r),
            _ if constraint.comparator().holds(&left, &right) => 0.0,
            _ => f64::INFINITY,
        },
    }
}

fn integer_distance(cmp: Comparator, left: i64, right: i64) -> f64 {
    let d = left as i128 - right as i128;
    let value = match cmp {
        Comparator::Eq => d.abs(),
        Comparator::Neq => (d == 0) as i128,
        Comparator::Lt => if d < 0 { 0 } else { d + 1 },
        Comparator::Le => if d <= 0 { 0 } else { d },
        Comparator::Gt => if d > 0 { 0 } else { d.abs() + 1 },
        Comparator::Ge => if d >= 0 { 0 } else { d.abs() },
    };
    value as f64
}

fn real_distance(cmp: Comparator, left: f64, right: f64) -> f64 {
    if left.is_nan() || right.is_nan() {
        return if cmp == Comparator::Neq { 0.0 } else { f64::INFINITY };
    }
    let d = left - right;
    match cmp {
        Comparator::Eq => d.abs(),
        Comparator::Neq => if d != 0.0 { 0.0 } else { 1.0 },
        Comparator::Lt => if d < 0.0 { 0.0 } else { d + 1.0 },
        Comparator::Le => if d <= 0.0 { 0.0 } else { d },
        Comparator::Gt => if d > 0.0 { 0.0 } else { right - left + 1.0 },
        Comparator::Ge => if d >= 0.0 { 0.0 } else { right - left },
    }
}

/// `pred(a, b) != 0` (want true) or `pred(a, b) == 0` (want false) over a
/// string predicate gets a graded distance instead of the flat 0/1 of its value.
fn string_predicate_distance(constraint: &Constraint, evaluator: &mut Evaluator<'_>) -> Option<f64> {
    let Expression::Binary {
        op, left, right, ..
    } = constraint.left().as_ref()
    else {
        return None;
    };
    if !matches!(
        op,
        BinaryOp::StrEquals | BinaryOp::StartsWith | BinaryOp::EndsWith | BinaryOp::Contains
    ) {
        return None;
    }
    if constraint.right().concrete_value() != &ConcreteValue::Integer(0)
        || !constraint.right().is_constant()
    {
        return None;
    }
    let want_true = match constraint.comparator() {
        Comparator::Neq | Comparator::Gt => true,
        Comparator::Eq | Comparator::Le => false,
        _ => return None,
    };

    let (Some(ConcreteValue::Str(a)), Some(ConcreteValue::Str(b))) =
        (evaluator.evaluate(left), evaluator.evaluate(right))
    else {
        return Some(f64::INFINITY);
    };

    let truth = match op {
        BinaryOp::StrEquals => string_equals_distance(&a, &b),
        BinaryOp::StartsWith => starts_with_distance(&a, &b),
        BinaryOp::EndsWith => ends_with_distance(&a, &b),
        _ => contains_distance(&a, &b),
    };

    Some(if want_true {
        truth
    } else if truth > 0.0 {
        0.0
    } else {
        1.0
    })
}

/// Length difference plus normalised per-character differences
fn avm_distance(s: &[u16], t: &[u16]) -> f64 {
    let mut distance = (s.len() as f64 - t.len() as f64).abs();
    for (a, b) in s.iter().zip(t.iter()) {
        distance += normalize((*a as f64 - *b as f64).abs());
    }
    distance
}

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

pub(crate) fn string_equals_distance(a: &str, b: &str) -> f64 {
    if a == b {
        0.0
    } else {
        avm_distance(&units(a), &units(b))
    }
}

fn starts_with_distance(value: &str, prefix: &str) -> f64 {
    let value = units(value);
    let prefix = units(prefix);
    let len = value.len().min(prefix.len());
    let head = &value[..len];
    if head == prefix.as_slice() {
        0.0
    } else {
        avm_distance(head, &prefix)
    }
}

fn ends_with_distance(value: &str, suffix: &str) -> f64 {
    let value = units(value);
    let suffix = units(suffix);
    let len = value.len().min(suffix.len());
    let tail = &value[value.len() - len..];
    if tail == suffix.as_slice() {
        0.0
    } else {
        avm_distance(tail, &suffix)
    }
}

fn contains_distance(value: &str, needle: &str) -> f64 {
    let value = units(value);
    let needle = units(needle);
    if needle.len() > value.len() {
        return avm_distance(&value, &needle);
    }
    (0..=value.len() - needle.len())
        .map(|i| {
            let window = &value[i..i + needle.len()];
            if window == needle.as_slice() {
                0.0
            } else {
                avm_distance(window, &needle)
            }
        })
        .fold(f64::INFINITY, f64::min)
}
