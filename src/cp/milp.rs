//! Mixed-integer programming oracle backed by `good_lp`.
//!
//! Every construct of a [`CpModel`] has an exact linear form:
//!
//! | Construct | Linear form |
//! |-----------|-------------|
//! | boolean variable | binary variable |
//! | negated literal `¬x` | `1 − x` |
//! | `BoolOr(l₁..lₙ)` | `Σ lᵢ ≥ 1` |
//! | `ExactlyOne(l₁..lₙ)` | `Σ lᵢ = 1` |
//! | `LinearEq(t, e)` | `t = e` |
//! | `MaxEquality(t, e₁..eₙ)` | `t ≥ eᵢ`, `t ≤ eᵢ + Mᵢ(1 − zᵢ)`, `Σ zᵢ = 1` |
//!
//! `Mᵢ` is the smallest constant that keeps the relaxed row inactive: the
//! upper bound of `t` minus the lower bound of `eᵢ`.
//!
//! The backend runs to proven optimality and cannot be interrupted. When a
//! time limit is set, the solve runs on a worker thread; if the limit
//! passes first the call returns `Unknown` and the worker is left to
//! finish in the background.
//!
//! # Reference
//! - Wolsey (1998), "Integer Programming", Ch. 1.5 (formulations)

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use tracing::{debug, warn};

use super::model::{Assignment, BoolVar, Constraint, CpModel, IntVar, LinearExpr, Literal};
use super::oracle::{
    OracleError, SearchStats, SolutionEvent, SolutionObserver, SolveParams, SolveStatus,
    SolverOracle, SolverResponse,
};

/// Solves a [`CpModel`] as a mixed-integer linear program.
///
/// Results are always `Optimal`, `Infeasible`, or `Unknown` when the time
/// limit expires. `node_limit` and `random_seed` are ignored.
///
/// # Example
/// ```
/// use u_roster::cp::{CpModel, LinearExpr, MilpOracle, SolveParams, SolveStatus, SolverOracle};
///
/// let mut model = CpModel::new("pick one");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_exactly_one([a.lit(), b.lit()]);
/// model.minimize(LinearExpr::new().with_bool(a, 3).with_bool(b, 1));
///
/// let response = MilpOracle::new()
///     .optimize(&model, &SolveParams::new(), None)
///     .unwrap();
/// assert_eq!(response.status, SolveStatus::Optimal);
/// assert_eq!(response.objective, Some(1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpOracle;

impl MilpOracle {
    pub fn new() -> Self {
        Self
    }
}

impl SolverOracle for MilpOracle {
    fn optimize(
        &self,
        model: &CpModel,
        params: &SolveParams,
        observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<SolverResponse, OracleError> {
        let start = Instant::now();
        debug!(
            model = model.name(),
            bools = model.bool_var_count(),
            ints = model.int_var_count(),
            constraints = model.constraint_count(),
            "starting milp"
        );

        let outcome = match params.time_limit {
            None => solve_milp(model),
            Some(limit) => {
                let job = model.clone();
                let (sender, receiver) = mpsc::channel();
                thread::Builder::new()
                    .name("u-roster-milp".to_string())
                    .spawn(move || {
                        // The receiver is gone once the limit has passed.
                        let _ = sender.send(solve_milp(&job));
                    })
                    .map_err(|e| OracleError::Backend(e.to_string()))?;
                match receiver.recv_timeout(limit) {
                    Ok(outcome) => outcome,
                    Err(RecvTimeoutError::Timeout) => {
                        warn!(
                            event = "time_limit_reached",
                            limit_ms = limit.as_millis() as u64,
                            "milp backend did not finish in time"
                        );
                        let stats = SearchStats {
                            elapsed: start.elapsed(),
                            ..SearchStats::default()
                        };
                        return Ok(SolverResponse::unsolved(SolveStatus::Unknown, stats));
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(OracleError::Backend(
                            "solver thread stopped without a result".to_string(),
                        ));
                    }
                }
            }
        };

        let mut stats = SearchStats {
            elapsed: start.elapsed(),
            ..SearchStats::default()
        };
        match outcome? {
            Some(assignment) => {
                let objective = model.objective_value(&assignment);
                stats.solutions = 1;
                if let Some(observer) = observer {
                    observer.on_solution(&SolutionEvent {
                        index: 0,
                        objective,
                        elapsed: stats.elapsed,
                    });
                }
                debug!(objective, elapsed_ms = stats.elapsed.as_millis() as u64, "milp solved");
                Ok(SolverResponse::solved(SolveStatus::Optimal, assignment, objective, stats))
            }
            None => Ok(SolverResponse::unsolved(SolveStatus::Infeasible, stats)),
        }
    }

    fn name(&self) -> &str {
        "milp"
    }
}

/// Solves `model`; `Ok(None)` means infeasible.
fn solve_milp(model: &CpModel) -> Result<Option<Assignment>, OracleError> {
    if model.int_domains().any(|d| d.is_empty()) || has_empty_group(model) {
        return Ok(None);
    }
    if model.is_empty() {
        return Ok(Some(Assignment::default()));
    }

    let mut vars = ProblemVariables::new();
    let bools: Vec<Variable> = (0..model.bool_var_count())
        .map(|_| vars.add(variable().binary()))
        .collect();
    let ints: Vec<Variable> = model
        .int_domains()
        .map(|d| vars.add(variable().integer().min(d.min as f64).max(d.max as f64)))
        .collect();
    // One selector per operand of each max equality.
    let selectors: Vec<Vec<Variable>> = model
        .constraints()
        .iter()
        .map(|c| match c {
            Constraint::MaxEquality { exprs, .. } => {
                exprs.iter().map(|_| vars.add(variable().binary())).collect()
            }
            _ => Vec::new(),
        })
        .collect();

    let lin = Linearizer {
        model,
        bools: &bools,
        ints: &ints,
    };
    let objective = lin.expr(model.objective())?;
    let mut problem = vars.minimise(objective).using(default_solver);

    for (constraint, picks) in model.constraints().iter().zip(&selectors) {
        match constraint {
            Constraint::BoolOr(lits) => {
                let sum = lin.literal_sum(lits)?;
                problem = problem.with(constraint!(sum >= 1));
            }
            Constraint::ExactlyOne(lits) => {
                let sum = lin.literal_sum(lits)?;
                problem = problem.with(constraint!(sum == 1));
            }
            Constraint::LinearEq { target, expr } => {
                let t = lin.int(*target)?;
                let e = lin.expr(expr)?;
                problem = problem.with(constraint!(t == e));
            }
            Constraint::MaxEquality { target, exprs } => {
                let t = lin.int(*target)?;
                let t_hi = lin.range_of_int(*target)?.1;
                let mut chosen = Expression::from(0.0);
                for (expr, &pick) in exprs.iter().zip(picks) {
                    let e = lin.expr(expr)?;
                    let big_m = (t_hi - lin.range(expr)?.0).max(0) as f64;
                    let mut relaxed = e.clone() + big_m;
                    relaxed.add_mul(-big_m, pick);
                    problem = problem.with(constraint!(t >= e));
                    problem = problem.with(constraint!(t <= relaxed));
                    chosen.add_mul(1.0, pick);
                }
                problem = problem.with(constraint!(chosen == 1));
            }
        }
    }

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => return Ok(None),
        Err(e) => return Err(OracleError::Backend(e.to_string())),
    };

    let assignment = Assignment::new(
        bools.iter().map(|&v| solution.value(v) > 0.5).collect(),
        ints.iter().map(|&v| solution.value(v).round() as i64).collect(),
    );
    match model.first_violation(&assignment) {
        None => Ok(Some(assignment)),
        Some(violation) => Err(OracleError::Backend(format!(
            "rounded solution violates {violation:?}"
        ))),
    }
}

/// Whether some clause or exactly-one group has no literal at all.
fn has_empty_group(model: &CpModel) -> bool {
    model.constraints().iter().any(|c| match c {
        Constraint::BoolOr(lits) | Constraint::ExactlyOne(lits) => lits.is_empty(),
        _ => false,
    })
}

/// Maps model variables to `good_lp` variables.
struct Linearizer<'a> {
    model: &'a CpModel,
    bools: &'a [Variable],
    ints: &'a [Variable],
}

impl Linearizer<'_> {
    fn bool(&self, var: BoolVar) -> Result<Variable, OracleError> {
        self.bools
            .get(var.index())
            .copied()
            .ok_or_else(|| OracleError::InvalidVariable {
                index: var.index(),
                context: "boolean variables".to_string(),
            })
    }

    fn int(&self, var: IntVar) -> Result<Variable, OracleError> {
        self.ints
            .get(var.index())
            .copied()
            .ok_or_else(|| OracleError::InvalidVariable {
                index: var.index(),
                context: "integer variables".to_string(),
            })
    }

    /// `Σ lᵢ`, with `¬x` written as `1 − x`.
    fn literal_sum(&self, lits: &[Literal]) -> Result<Expression, OracleError> {
        let negated = lits.iter().filter(|l| l.is_negated()).count();
        let mut sum = Expression::from(negated as f64);
        for lit in lits {
            let coef = if lit.is_negated() { -1.0 } else { 1.0 };
            sum.add_mul(coef, self.bool(lit.var())?);
        }
        Ok(sum)
    }

    fn expr(&self, expr: &LinearExpr) -> Result<Expression, OracleError> {
        let mut out = Expression::from(expr.constant as f64);
        for &(var, coef) in &expr.bool_terms {
            out.add_mul(coef as f64, self.bool(var)?);
        }
        for &(var, coef) in &expr.int_terms {
            out.add_mul(coef as f64, self.int(var)?);
        }
        Ok(out)
    }

    fn range_of_int(&self, var: IntVar) -> Result<(i64, i64), OracleError> {
        self.model
            .int_domain(var)
            .map(|d| (d.min, d.max))
            .ok_or_else(|| OracleError::InvalidVariable {
                index: var.index(),
                context: "integer domains".to_string(),
            })
    }

    /// Smallest and largest value `expr` can take over the variable domains.
    fn range(&self, expr: &LinearExpr) -> Result<(i64, i64), OracleError> {
        let (mut lo, mut hi) = (expr.constant, expr.constant);
        for &(_, coef) in &expr.bool_terms {
            if coef < 0 {
                lo += coef;
            } else {
                hi += coef;
            }
        }
        for &(var, coef) in &expr.int_terms {
            let (min, max) = self.range_of_int(var)?;
            if coef < 0 {
                lo += coef * max;
                hi += coef * min;
            } else {
                lo += coef * min;
                hi += coef * max;
            }
        }
        Ok((lo, hi))
    }
}
