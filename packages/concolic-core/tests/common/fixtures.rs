//! Scripted programs under test
//!
//! Each program stands in for the shadow VM: it evaluates its guards on the
//! concrete inputs and reports every decision to an `InstructionObserver`,
//! in execution order.

use super::builders::InMemoryTest;
use concolic_core::features::symbolic::{BinaryOp, ExprRef};
use concolic_core::{
    BranchKind, BranchOrigin, ConcolicExecutor, Constraint, Expression, InstructionObserver,
    PathCondition, PathConditionCollector, PrimitiveValue,
};
use std::collections::BTreeMap;

pub const SYMBOLIC_SUFFIX: &str = "__SYM";

/// Loops in the fixtures stop here whatever the inputs
const LOOP_CAP: i64 = 1_000;

/// Symbolic view of a test's inputs
pub struct SymbolicInputs {
    vars: BTreeMap<String, ExprRef>,
}

impl SymbolicInputs {
    pub fn of(test: &InMemoryTest) -> Self {
        let vars = test
            .statements
            .iter()
            .map(|s| {
                let name = format!("{}{}", s.name, SYMBOLIC_SUFFIX);
                let expr = match &s.value {
                    PrimitiveValue::Boolean(b) => Expression::bool_var(&name, *b),
                    PrimitiveValue::Byte(v) => Expression::int_var(&name, i64::from(*v)),
                    PrimitiveValue::Short(v) => Expression::int_var(&name, i64::from(*v)),
                    PrimitiveValue::Char(v) => Expression::int_var(&name, i64::from(*v)),
                    PrimitiveValue::Int(v) => Expression::int_var(&name, i64::from(*v)),
                    PrimitiveValue::Long(v) => Expression::long_var(&name, *v),
                    PrimitiveValue::Float(v) => Expression::float_var(&name, *v),
                    PrimitiveValue::Double(v) => Expression::real_var(&name, *v),
                    PrimitiveValue::String(v) => Expression::string_var(&name, v),
                };
                (s.name.clone(), expr)
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> ExprRef {
        match self.vars.get(name) {
            Some(expr) => expr.clone(),
            None => panic!("program reads undeclared input {}", name),
        }
    }
}

/// A program: reads its inputs and reports decisions
pub type Program = fn(&SymbolicInputs, &mut dyn InstructionObserver);

/// Report an `if` at `index`; returns whether `condition` held
pub fn decide(
    observer: &mut dyn InstructionObserver,
    method: &str,
    index: u32,
    condition: Constraint,
) -> bool {
    let taken = condition.holds_concretely();
    let decision = if taken { condition } else { condition.negate() };
    observer.on_branch(
        BranchOrigin::new("com.example.Target", method, index),
        BranchKind::If {
            is_true_branch: taken,
        },
        decision,
    );
    taken
}

/// `if (var0 == var1)`
pub fn equal_inputs(inputs: &SymbolicInputs, obs: &mut dyn InstructionObserver) {
    decide(
        obs,
        "equals",
        4,
        Constraint::eq(inputs.get("var0"), inputs.get("var1")),
    );
}

/// Three sequential guards over four ints
pub fn three_guards(inputs: &SymbolicInputs, obs: &mut dyn InstructionObserver) {
    let (a, b, c, d) = (
        inputs.get("var0"),
        inputs.get("var1"),
        inputs.get("var2"),
        inputs.get("var3"),
    );
    decide(obs, "guards", 3, Constraint::lt(a, b.clone()));
    decide(obs, "guards", 9, Constraint::lt(b, c));
    decide(obs, "guards", 15, Constraint::eq(d, Expression::int(0)));
}

/// `if (flag)`, compiled as `flag != 0`
pub fn boolean_flag(inputs: &SymbolicInputs, obs: &mut dyn InstructionObserver) {
    decide(
        obs,
        "flag",
        2,
        Constraint::neq(inputs.get("flag"), Expression::int(0)),
    );
}

/// Six guards followed by three counting loops over five ints
pub fn guards_and_loops(inputs: &SymbolicInputs, obs: &mut dyn InstructionObserver) {
    let v: Vec<ExprRef> = (0..5).map(|i| inputs.get(&format!("var{}", i))).collect();
    let m = "loops";

    decide(obs, m, 1, Constraint::lt(v[0].clone(), v[1].clone()));
    decide(obs, m, 5, Constraint::le(v[2].clone(), v[3].clone()));
    decide(obs, m, 9, Constraint::neq(v[4].clone(), Expression::int(0)));
    decide(
        obs,
        m,
        13,
        Constraint::eq(
            Expression::binary(BinaryOp::Rem, v[0].clone(), Expression::int(2)),
            Expression::int(1),
        ),
    );
    decide(obs, m, 19, Constraint::eq(v[1].clone(), v[2].clone()));
    decide(obs, m, 23, Constraint::eq(v[3].clone(), v[4].clone()));

    let mut i = 0;
    while i < LOOP_CAP && decide(obs, m, 30, Constraint::lt(Expression::int(i), v[0].clone())) {
        decide(obs, m, 34, Constraint::gt(v[1].clone(), Expression::int(i)));
        i += 1;
    }
    let mut j = 0;
    while j < LOOP_CAP && decide(obs, m, 41, Constraint::lt(Expression::int(j), v[1].clone())) {
        j += 1;
    }
    let mut k = 0;
    while k < LOOP_CAP && decide(obs, m, 48, Constraint::lt(Expression::int(k), v[3].clone())) {
        k += 1;
    }
}

/// Runs a scripted program through a `PathConditionCollector`
#[derive(Clone, Copy)]
pub struct ScriptedExecutor {
    pub program: Program,
    pub executions: usize,
}

impl ScriptedExecutor {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            executions: 0,
        }
    }
}

impl ConcolicExecutor<InMemoryTest> for ScriptedExecutor {
    fn execute_concolic(&mut self, test: &InMemoryTest) -> PathCondition {
        self.executions += 1;
        run(self.program, test)
    }
}

/// Collect the path condition of `program` on `test`
pub fn run(program: Program, test: &InMemoryTest) -> PathCondition {
    let inputs = SymbolicInputs::of(test);
    let mut collector = PathConditionCollector::new();
    program(&inputs, &mut collector);
    collector.on_execution_finished();
    collector.into_path_condition()
}
