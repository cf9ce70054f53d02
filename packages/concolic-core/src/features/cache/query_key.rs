//! Order-independent structural key of a solver query

use crate::features::symbolic::Constraint;
use std::fmt;

/// Blake3 digest of the sorted, de-duplicated constraint fingerprints.
///
/// Two queries get the same key iff they contain the same set of constraints,
/// regardless of order or repetition. Concrete values of variables do not
/// contribute (see `Constraint::fingerprint`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey(pub blake3::Hash);

impl QueryKey {
    pub fn of(constraints: &[Constraint]) -> Self {
        let mut fingerprints: Vec<[u8; 32]> = constraints
            .iter()
            .map(|c| *c.fingerprint().as_bytes())
            .collect();
        fingerprints.sort_unstable();
        fingerprints.dedup();

        let mut hasher = blake3::Hasher::new();
        hasher.update(&(fingerprints.len() as u64).to_le_bytes());
        for fp in &fingerprints {
            hasher.update(fp);
        }
        Self(hasher.finalize())
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Debug for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic::Expression;

    fn c(var: &str, bound: i64) -> Constraint {
        Constraint::lt(Expression::int_var(var, 0), Expression::int(bound))
    }

    #[test]
    fn test_order_independent() {
        assert_eq!(
            QueryKey::of(&[c("a", 1), c("b", 2)]),
            QueryKey::of(&[c("b", 2), c("a", 1)])
        );
    }

    #[test]
    fn test_duplicate_insensitive() {
        assert_eq!(
            QueryKey::of(&[c("a", 1), c("a", 1), c("b", 2)]),
            QueryKey::of(&[c("a", 1), c("b", 2)])
        );
    }

    #[test]
    fn test_distinguishes_sets() {
        assert_ne!(QueryKey::of(&[c("a", 1)]), QueryKey::of(&[c("a", 2)]));
        assert_ne!(
            QueryKey::of(&[c("a", 1)]),
            QueryKey::of(&[c("a", 1).negate()])
        );
        assert_ne!(QueryKey::of(&[]), QueryKey::of(&[c("a", 1)]));
    }

    #[test]
    fn test_display_is_short_hex() {
        assert_eq!(QueryKey::of(&[c("a", 1)]).to_string().len(), 16);
    }
}
