//! Test data builders
//!
//! An in-memory concrete test: a list of primitive statements, each
//! declaring one named variable.

use concolic_core::{PrimitiveKind, PrimitiveStatement, PrimitiveValue, TestCase};

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    pub value: PrimitiveValue,
}

impl PrimitiveStatement for Statement {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PrimitiveKind {
        self.value.kind()
    }

    fn value(&self) -> PrimitiveValue {
        self.value.clone()
    }

    fn set_value(&mut self, value: PrimitiveValue) {
        assert_eq!(value.kind(), self.kind(), "statement {} changed kind", self.name);
        self.value = value;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InMemoryTest {
    pub statements: Vec<Statement>,
}

impl InMemoryTest {
    pub fn value(&self, name: &str) -> Option<&PrimitiveValue> {
        self.statements
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.value)
    }

    pub fn int(&self, name: &str) -> i32 {
        match self.value(name) {
            Some(PrimitiveValue::Int(v)) => *v,
            other => panic!("{} is not an int statement: {:?}", name, other),
        }
    }

    pub fn boolean(&self, name: &str) -> bool {
        match self.value(name) {
            Some(PrimitiveValue::Boolean(v)) => *v,
            other => panic!("{} is not a boolean statement: {:?}", name, other),
        }
    }
}

impl TestCase for InMemoryTest {
    fn clone_test(&self) -> Self {
        self.clone()
    }

    fn find_primitive_statement_by_variable_name(
        &mut self,
        name: &str,
    ) -> Option<&mut dyn PrimitiveStatement> {
        self.statements
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| s as &mut dyn PrimitiveStatement)
    }
}

/// Builder for InMemoryTest
#[derive(Debug, Default)]
pub struct TestCaseBuilder {
    statements: Vec<Statement>,
}

impl TestCaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: PrimitiveValue) -> Self {
        self.statements.push(Statement {
            name: name.to_string(),
            value,
        });
        self
    }

    pub fn int(self, name: &str, value: i32) -> Self {
        self.with(name, PrimitiveValue::Int(value))
    }

    pub fn boolean(self, name: &str, value: bool) -> Self {
        self.with(name, PrimitiveValue::Boolean(value))
    }

    /// `var0`, `var1`, ... holding `values`
    pub fn ints(values: &[i32]) -> Self {
        values
            .iter()
            .enumerate()
            .fold(Self::new(), |b, (i, v)| b.int(&format!("var{}", i), *v))
    }

    pub fn build(self) -> InMemoryTest {
        InMemoryTest {
            statements: self.statements,
        }
    }
}
