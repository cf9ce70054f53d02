//! Alternating Variable Method (AVM) solver
//!
//! Local search over the query's free variables, minimising the summed
//! normalised branch distance.
//!
//! ## Algorithm
//!
//! 1. Seed every variable with its concrete value from the run
//! 2. For each variable in turn, try ±step; on improvement accelerate in
//!    that direction (pattern move, doubling the step) until it stops helping
//! 3. Reals repeat step 2 at decreasing step sizes down to `10^-precision`
//! 4. Strings try deletions, appends and per-character moves
//! 5. A sweep over all variables without improvement is a local optimum:
//!    restart from another seed, up to `variable_resets` times
//!
//! Local search cannot prove unsatisfiability; a query it fails to solve
//! within its iteration budget is reported as `Unsat`. An exhausted time
//! budget is reported as `Timeout`.

use super::distance::query_distance;
use crate::features::solver::domain::{
    Model, ModelValue, SolverError, SolverOutcome, SolverQuery, SolverResult,
};
use crate::features::solver::ports::Solver;
use crate::features::symbolic::{
    Bindings, Bounds, ConcreteValue, Constraint, Domain, Evaluator, VarName,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Search limits of the AVM solver
#[derive(Debug, Clone)]
pub struct AvmConfig {
    /// Fitness evaluations before giving up
    pub max_iterations: u64,
    /// Restarts from a fresh seed after a local optimum
    pub variable_resets: u32,
    /// Number of decimal digits explored for real variables
    pub real_precision: u32,
}

impl Default for AvmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            variable_resets: 3,
            real_precision: 6,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchVar {
    name: VarName,
    seed: ConcreteValue,
    bounds: Option<Bounds>,
}

impl SearchVar {
    fn domain(&self) -> Domain {
        self.seed.domain()
    }

    /// Seed for restart number `attempt` (0 = concrete value of the run)
    fn seed_for(&self, attempt: u32) -> ConcreteValue {
        let value = match (&self.seed, attempt) {
            (seed, 0) => seed.clone(),
            (ConcreteValue::Integer(v), n) => ConcreteValue::Integer(match n % 3 {
                1 => 0,
                2 => v.wrapping_neg(),
                _ => v.wrapping_mul(2).wrapping_add(n as i64),
            }),
            (ConcreteValue::Real(v), n) => ConcreteValue::Real(match n % 3 {
                1 => 0.0,
                2 => -v,
                _ => v * 2.0 + n as f64,
            }),
            (ConcreteValue::Str(_), _) => ConcreteValue::string(""),
            (other, _) => other.clone(),
        };
        self.clamp(value)
    }

    fn clamp(&self, value: ConcreteValue) -> ConcreteValue {
        match (value, self.bounds) {
            (ConcreteValue::Integer(v), Some(b)) => ConcreteValue::Integer(b.clamp_i64(v)),
            (ConcreteValue::Real(v), Some(b)) if v.is_finite() => ConcreteValue::Real(b.clamp_f64(v)),
            (value, _) => value,
        }
    }
}

/// Why a search stopped early
enum Stop {
    Deadline,
    Budget,
}

/// Mutable state of one solve call
struct Search<'q> {
    constraints: &'q [Constraint],
    bindings: Bindings,
    distance: f64,
    iterations: u64,
    max_iterations: u64,
    deadline: Instant,
}

impl<'q> Search<'q> {
    fn new(
        constraints: &'q [Constraint],
        bindings: Bindings,
        max_iterations: u64,
        deadline: Instant,
    ) -> Self {
        let distance = query_distance(constraints, &bindings);
        Self {
            constraints,
            bindings,
            distance,
            iterations: 0,
            max_iterations,
            deadline,
        }
    }

    fn solved(&self) -> bool {
        self.distance == 0.0
    }

    /// Evaluate a candidate value; keep it if it improves the fitness
    fn try_value(&mut self, var: &SearchVar, value: ConcreteValue) -> Result<bool, Stop> {
        if self.iterations >= self.max_iterations {
            return Err(Stop::Budget);
        }
        // Clock reads are amortised over 64 evaluations
        if self.iterations % 64 == 0 && Instant::now() >= self.deadline {
            return Err(Stop::Deadline);
        }
        self.iterations += 1;

        let previous = self.bindings.set(var.name.clone(), var.clamp(value));
        let distance = query_distance(self.constraints, &self.bindings);
        if distance < self.distance {
            trace!(var = %var.name, distance, "improved");
            self.distance = distance;
            Ok(true)
        } else {
            self.bindings.restore(var.name.clone(), previous);
            Ok(false)
        }
    }

    fn current(&self, var: &SearchVar) -> ConcreteValue {
        self.bindings
            .get(&var.name)
            .cloned()
            .unwrap_or_else(|| var.seed.clone())
    }

    fn optimize(&mut self, var: &SearchVar, precision: u32) -> Result<bool, Stop> {
        match var.domain() {
            Domain::Integer => self.optimize_integer(var),
            Domain::Real => self.optimize_real(var, precision),
            Domain::String => self.optimize_string(var),
            Domain::Reference => Ok(false),
        }
    }

    fn optimize_integer(&mut self, var: &SearchVar) -> Result<bool, Stop> {
        let mut improved_any = false;
        loop {
            if self.solved() {
                return Ok(improved_any);
            }
            let Some(current) = self.current(var).as_i64() else {
                return Ok(improved_any);
            };
            let direction = if self.try_value(var, ConcreteValue::Integer(current.wrapping_add(1)))? {
                1i64
            } else if self.try_value(var, ConcreteValue::Integer(current.wrapping_sub(1)))? {
                -1i64
            } else {
                return Ok(improved_any);
            };
            improved_any = true;

            // Pattern moves
            let mut step = direction.wrapping_mul(2);
            while !self.solved() {
                let Some(base) = self.current(var).as_i64() else {
                    break;
                };
                if !self.try_value(var, ConcreteValue::Integer(base.saturating_add(step)))? {
                    break;
                }
                step = step.saturating_mul(2);
            }
        }
    }

    fn optimize_real(&mut self, var: &SearchVar, precision: u32) -> Result<bool, Stop> {
        let mut improved_any = false;
        if let Some(v) = self.current(var).as_f64() {
            if !v.is_finite() {
                improved_any |= self.try_value(var, ConcreteValue::Real(0.0))?;
            }
        }
        for digits in 0..=precision {
            let unit = 10f64.powi(-(digits as i32));
            loop {
                if self.solved() {
                    return Ok(improved_any);
                }
                let Some(current) = self.current(var).as_f64() else {
                    return Ok(improved_any);
                };
                let direction = if self.try_value(var, ConcreteValue::Real(current + unit))? {
                    1.0
                } else if self.try_value(var, ConcreteValue::Real(current - unit))? {
                    -1.0
                } else {
                    break;
                };
                improved_any = true;

                let mut step = direction * unit * 2.0;
                while !self.solved() {
                    let Some(base) = self.current(var).as_f64() else {
                        break;
                    };
                    if !self.try_value(var, ConcreteValue::Real(base + step))? {
                        break;
                    }
                    step *= 2.0;
                }
            }
        }
        Ok(improved_any)
    }

    fn optimize_string(&mut self, var: &SearchVar) -> Result<bool, Stop> {
        let mut improved_any = false;
        let chars = |search: &Self| -> Vec<char> {
            search
                .current(var)
                .as_str()
                .map(|s| s.chars().collect())
                .unwrap_or_default()
        };
        let to_value = |chars: &[char]| ConcreteValue::string(chars.iter().collect::<String>());

        // Deletions, from the end
        let mut i = chars(&*self).len();
        while i > 0 && !self.solved() {
            i -= 1;
            let mut candidate = chars(&*self);
            if i < candidate.len() {
                candidate.remove(i);
                improved_any |= self.try_value(var, to_value(&candidate))?;
            }
        }

        // Appends
        while !self.solved() {
            let mut candidate = chars(&*self);
            candidate.push('a');
            let before = self.distance;
            // Accept the append only together with a useful value for the new char
            let saved = self.bindings.set(var.name.clone(), to_value(&candidate));
            self.distance = query_distance(self.constraints, &self.bindings);
            let last = candidate.len() - 1;
            self.optimize_char(var, last)?;
            if self.distance < before {
                improved_any = true;
            } else {
                self.bindings.restore(var.name.clone(), saved);
                self.distance = before;
                break;
            }
        }

        // Per-character moves
        for idx in 0..chars(&*self).len() {
            if self.solved() {
                break;
            }
            improved_any |= self.optimize_char(var, idx)?;
        }
        Ok(improved_any)
    }

    fn optimize_char(&mut self, var: &SearchVar, idx: usize) -> Result<bool, Stop> {
        let mut improved_any = false;
        let with_char = |search: &Self, code: i64| -> Option<ConcreteValue> {
            let mut chars: Vec<char> = search.current(var).as_str()?.chars().collect();
            let ch = char::from_u32(u32::try_from(code).ok()?)?;
            *chars.get_mut(idx)? = ch;
            Some(ConcreteValue::string(chars.into_iter().collect::<String>()))
        };
        let code_at = |search: &Self| -> Option<i64> {
            search
                .current(var)
                .as_str()?
                .chars()
                .nth(idx)
                .map(|c| c as i64)
        };

        loop {
            if self.solved() {
                return Ok(improved_any);
            }
            let Some(current) = code_at(&*self) else {
                return Ok(improved_any);
            };
            let mut direction = 0i64;
            for delta in [1i64, -1] {
                if let Some(value) = with_char(&*self, current + delta) {
                    if self.try_value(var, value)? {
                        direction = delta;
                        break;
                    }
                }
            }
            if direction == 0 {
                return Ok(improved_any);
            }
            improved_any = true;

            let mut step = direction * 2;
            while !self.solved() {
                let Some(base) = code_at(&*self) else { break };
                let Some(value) = with_char(&*self, base + step) else {
                    break;
                };
                if !self.try_value(var, value)? {
                    break;
                }
                step *= 2;
            }
        }
    }
}

/// Local-search solver over integer, real and string constraints
#[derive(Debug, Clone, Default)]
pub struct AvmSolver {
    config: AvmConfig,
}

impl AvmSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AvmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AvmConfig {
        &self.config
    }

    /// First occurrence of every free variable, in constraint order
    fn search_vars(query: &SolverQuery) -> Vec<SearchVar> {
        let mut vars: Vec<SearchVar> = Vec::new();
        for constraint in query.constraints() {
            let mut visit = |name: &VarName, value: &ConcreteValue, bounds: Option<&Bounds>| {
                if !vars.iter().any(|v| &v.name == name) {
                    vars.push(SearchVar {
                        name: name.clone(),
                        seed: value.clone(),
                        bounds: bounds.copied(),
                    });
                }
            };
            constraint.left().for_each_variable(&mut visit);
            constraint.right().for_each_variable(&mut visit);
        }
        vars
    }

    fn model_of(vars: &[SearchVar], bindings: &Bindings) -> Model {
        vars.iter()
            .map(|var| {
                let value = match bindings.get(&var.name).unwrap_or(&var.seed) {
                    ConcreteValue::Integer(v) => ModelValue::Long(*v),
                    ConcreteValue::Real(v) => ModelValue::Double(*v),
                    ConcreteValue::Str(s) => ModelValue::String(s.to_string()),
                    ConcreteValue::Reference(_) => ModelValue::Null,
                };
                (var.name.to_string(), value)
            })
            .collect()
    }

    fn seed_bindings(vars: &[SearchVar], attempt: u32) -> Bindings {
        Bindings::from_pairs(
            vars.iter()
                .map(|var| (Arc::clone(&var.name), var.seed_for(attempt))),
        )
    }
}

impl Solver for AvmSolver {
    fn name(&self) -> &'static str {
        "avm"
    }

    fn supported_domains(&self) -> &[Domain] {
        &[Domain::Integer, Domain::Real, Domain::String, Domain::Reference]
    }

    fn solve(&self, query: &SolverQuery, budget: Duration) -> SolverOutcome {
        if query.is_empty() {
            return Err(SolverError::EmptyQuery);
        }
        let started = Instant::now();
        let deadline = started + budget;
        let vars = Self::search_vars(query);

        if vars.is_empty() {
            let bindings = Bindings::new();
            let holds = Evaluator::new(&bindings).satisfies_all(query.constraints());
            return Ok(if holds {
                SolverResult::Sat(Model::new())
            } else {
                SolverResult::Unsat
            });
        }

        let mut iterations_left = self.config.max_iterations;
        for attempt in 0..=self.config.variable_resets {
            let mut search = Search::new(
                query.constraints(),
                Self::seed_bindings(&vars, attempt),
                iterations_left,
                deadline,
            );

            let stop = loop {
                if search.solved() {
                    break None;
                }
                let mut improved = false;
                let mut stopped = None;
                for var in &vars {
                    match search.optimize(var, self.config.real_precision) {
                        Ok(changed) => improved |= changed,
                        Err(stop) => {
                            stopped = Some(stop);
                            break;
                        }
                    }
                    if search.solved() {
                        break;
                    }
                }
                if stopped.is_some() {
                    break stopped;
                }
                if !improved {
                    break None;
                }
            };

            if search.solved() {
                debug!(
                    attempt,
                    iterations = search.iterations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "avm: model found"
                );
                return Ok(SolverResult::Sat(Self::model_of(&vars, &search.bindings)));
            }

            iterations_left = iterations_left.saturating_sub(search.iterations);
            match stop {
                Some(Stop::Deadline) => {
                    debug!(attempt, iterations = search.iterations, "avm: deadline reached");
                    return Ok(SolverResult::Timeout);
                }
                Some(Stop::Budget) => break,
                None => trace!(attempt, distance = search.distance, "avm: local optimum"),
            }
            if Instant::now() >= deadline {
                return Ok(SolverResult::Timeout);
            }
        }

        debug!(variables = vars.len(), "avm: no model found");
        Ok(SolverResult::Unsat)
    }
}
