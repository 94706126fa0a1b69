//! Reference branch-and-bound oracle.
//!
//! A depth-first search over the boolean variables of a [`CpModel`].
//! Integer variables are never branched on: each one is a function of the
//! booleans, so its interval follows from the current partial assignment.
//!
//! # Algorithm
//!
//! 1. Propagate to a fixpoint: unit propagation on `BoolOr`, exclusion on
//!    `ExactlyOne`, interval evaluation of integer definitions and bound
//!    tightening on purely boolean linear definitions.
//! 2. Bound: the objective's lower bound under the partial assignment;
//!    nodes that cannot beat the incumbent are closed.
//! 3. Branch on the first unassigned variable. Both children are
//!    propagated up front and the one with the lower bound is explored
//!    first; ties go to `false`, or to a seeded coin flip when a random
//!    seed is given.
//!
//! Variables that appear in no constraint and not in the objective are
//! fixed to `false` at the root.
//!
//! # Reference
//! Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::model::{Assignment, Constraint, CpModel, IntDomain, LinearExpr, Literal};
use super::oracle::{
    OracleError, SearchStats, SolutionEvent, SolutionObserver, SolveParams, SolveStatus,
    SolverOracle, SolverResponse,
};

/// Default number of nodes between two clock reads.
const DEFAULT_CHECK_INTERVAL: u64 = 64;

/// Exhaustive depth-first branch-and-bound.
///
/// Suited to small and medium rosters; proves optimality when it runs to
/// completion and otherwise reports the best solution found within the
/// limits.
///
/// # Example
/// ```
/// use u_roster::cp::{
///     BranchAndBoundOracle, CpModel, LinearExpr, SolveParams, SolveStatus, SolverOracle,
/// };
///
/// let mut model = CpModel::new("pick one");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_exactly_one([a.lit(), b.lit()]);
/// model.minimize(LinearExpr::new().with_bool(a, 3).with_bool(b, 1));
///
/// let response = BranchAndBoundOracle::new()
///     .optimize(&model, &SolveParams::new(), None)
///     .unwrap();
/// assert_eq!(response.status, SolveStatus::Optimal);
/// assert_eq!(response.objective, Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct BranchAndBoundOracle {
    check_interval: u64,
}

impl BranchAndBoundOracle {
    /// Creates an oracle with the default clock check interval.
    pub fn new() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Sets how many nodes are explored between two clock reads.
    ///
    /// A higher value reduces overhead but may overshoot the time limit.
    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes.max(1);
        self
    }
}

impl Default for BranchAndBoundOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverOracle for BranchAndBoundOracle {
    fn optimize(
        &self,
        model: &CpModel,
        params: &SolveParams,
        observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<SolverResponse, OracleError> {
        let compiled = Compiled::compile(model)?;
        debug!(
            model = model.name(),
            bools = compiled.bool_count,
            ints = compiled.domains.len(),
            free = compiled.free.iter().filter(|f| **f).count(),
            "starting branch and bound"
        );
        let search = Search::new(&compiled, params, self.check_interval, observer);
        Ok(search.run())
    }

    fn name(&self) -> &str {
        "branch-and-bound"
    }
}

/// Interval of values an integer expression can still take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Bounds {
    lo: i64,
    hi: i64,
}

enum Definition<'m> {
    Linear(&'m LinearExpr),
    Max(&'m [LinearExpr]),
}

enum ClauseState {
    Satisfied,
    Conflict,
    Unit(Literal),
    Open,
}

/// A model checked and indexed for search.
struct Compiled<'m> {
    bool_count: usize,
    clauses: Vec<&'m [Literal]>,
    exactly_one: Vec<&'m [Literal]>,
    definitions: Vec<Definition<'m>>,
    domains: Vec<IntDomain>,
    objective: &'m LinearExpr,
    free: Vec<bool>,
}

impl<'m> Compiled<'m> {
    fn compile(model: &'m CpModel) -> Result<Self, OracleError> {
        let bool_count = model.bool_var_count();
        let domains: Vec<IntDomain> = model.int_domains().collect();
        let mut definitions: Vec<Option<Definition<'m>>> =
            std::iter::repeat_with(|| None).take(domains.len()).collect();
        let mut clauses = Vec::new();
        let mut exactly_one = Vec::new();
        let mut used = vec![false; bool_count];

        for (index, constraint) in model.constraints().iter().enumerate() {
            let context = || format!("constraint {index}");
            match constraint {
                Constraint::BoolOr(lits) => {
                    mark_literals(lits, &mut used, context)?;
                    clauses.push(lits.as_slice());
                }
                Constraint::ExactlyOne(lits) => {
                    mark_literals(lits, &mut used, context)?;
                    exactly_one.push(lits.as_slice());
                }
                Constraint::LinearEq { target, expr } => {
                    let slot = definition_slot(model, &mut definitions, target.index())?;
                    mark_expr(expr, target.index(), &mut used, context)?;
                    *slot = Some(Definition::Linear(expr));
                }
                Constraint::MaxEquality { target, exprs } => {
                    if exprs.is_empty() {
                        return Err(OracleError::UnsupportedModel(format!(
                            "max equality on `{}` has no operands",
                            model.int_name(*target)
                        )));
                    }
                    let slot = definition_slot(model, &mut definitions, target.index())?;
                    for expr in exprs {
                        mark_expr(expr, target.index(), &mut used, context)?;
                    }
                    *slot = Some(Definition::Max(exprs));
                }
            }
        }

        let objective = model.objective();
        mark_expr(objective, domains.len(), &mut used, || "objective".to_string())?;

        let definitions = definitions
            .into_iter()
            .enumerate()
            .map(|(i, def)| {
                def.ok_or_else(|| {
                    let name = model.int_var(i).map_or("", |v| model.int_name(v));
                    OracleError::UnsupportedModel(format!(
                        "integer variable `{name}` has no defining constraint"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bool_count,
            clauses,
            exactly_one,
            definitions,
            domains,
            objective,
            free: used.into_iter().map(|u| !u).collect(),
        })
    }

    /// Runs all propagators to a fixpoint.
    ///
    /// Returns `false` on conflict. On success `bounds` holds the interval
    /// of every integer variable under the propagated assignment.
    fn propagate(&self, values: &mut [Option<bool>], bounds: &mut [Bounds]) -> bool {
        loop {
            let mut changed = false;

            for clause in &self.clauses {
                match clause_state(clause, values) {
                    ClauseState::Satisfied | ClauseState::Open => {}
                    ClauseState::Conflict => return false,
                    ClauseState::Unit(lit) => {
                        assign(values, lit, true);
                        changed = true;
                    }
                }
            }

            for group in &self.exactly_one {
                let mut trues = 0usize;
                let mut unknown = 0usize;
                let mut last_unknown = None;
                for &lit in group.iter() {
                    match literal_value(values, lit) {
                        Some(true) => trues += 1,
                        Some(false) => {}
                        None => {
                            unknown += 1;
                            last_unknown = Some(lit);
                        }
                    }
                }
                if trues > 1 {
                    return false;
                }
                if trues == 1 {
                    if unknown > 0 {
                        for &lit in group.iter() {
                            if literal_value(values, lit).is_none() {
                                assign(values, lit, false);
                            }
                        }
                        changed = true;
                    }
                } else {
                    match (unknown, last_unknown) {
                        (0, _) => return false,
                        (1, Some(lit)) => {
                            assign(values, lit, true);
                            changed = true;
                        }
                        _ => {}
                    }
                }
            }

            for (i, definition) in self.definitions.iter().enumerate() {
                let domain = self.domains[i];
                let raw = match definition {
                    Definition::Linear(expr) => expr_bounds(expr, values, bounds),
                    Definition::Max(exprs) => exprs
                        .iter()
                        .map(|e| expr_bounds(e, values, bounds))
                        .reduce(|a, b| Bounds {
                            lo: a.lo.max(b.lo),
                            hi: a.hi.max(b.hi),
                        })
                        .unwrap_or_default(),
                };
                let lo = raw.lo.max(domain.min);
                let hi = raw.hi.min(domain.max);
                if lo > hi {
                    return false;
                }
                bounds[i] = Bounds { lo, hi };

                if let Definition::Linear(expr) = definition {
                    if expr.is_boolean() {
                        match tighten(expr, raw, domain, values) {
                            None => return false,
                            Some(forced) => changed |= forced,
                        }
                    }
                }
            }

            if !changed {
                return true;
            }
        }
    }

    /// Lower bound of the objective under the partial assignment.
    fn objective_bound(&self, values: &[Option<bool>], bounds: &[Bounds]) -> i64 {
        expr_bounds(self.objective, values, bounds).lo
    }
}

fn definition_slot<'a, 'm>(
    model: &CpModel,
    definitions: &'a mut [Option<Definition<'m>>],
    index: usize,
) -> Result<&'a mut Option<Definition<'m>>, OracleError> {
    let slot = definitions
        .get_mut(index)
        .ok_or_else(|| OracleError::InvalidVariable {
            index,
            context: "integer definition target".to_string(),
        })?;
    if slot.is_some() {
        let name = model.int_var(index).map_or("", |v| model.int_name(v));
        return Err(OracleError::UnsupportedModel(format!(
            "integer variable `{name}` is defined twice"
        )));
    }
    Ok(slot)
}

fn mark_literals(
    lits: &[Literal],
    used: &mut [bool],
    context: impl Fn() -> String,
) -> Result<(), OracleError> {
    for lit in lits {
        let index = lit.var().index();
        let flag = used
            .get_mut(index)
            .ok_or_else(|| OracleError::InvalidVariable {
                index,
                context: context(),
            })?;
        *flag = true;
    }
    Ok(())
}

/// Marks the booleans of `expr` as used and checks that its integer terms
/// only refer to variables created before `limit`.
fn mark_expr(
    expr: &LinearExpr,
    limit: usize,
    used: &mut [bool],
    context: impl Fn() -> String,
) -> Result<(), OracleError> {
    for (var, _) in &expr.bool_terms {
        let index = var.index();
        let flag = used
            .get_mut(index)
            .ok_or_else(|| OracleError::InvalidVariable {
                index,
                context: context(),
            })?;
        *flag = true;
    }
    for (var, _) in &expr.int_terms {
        if var.index() >= limit {
            return Err(OracleError::UnsupportedModel(format!(
                "{} refers to integer variable {} which is not defined before it",
                context(),
                var.index()
            )));
        }
    }
    Ok(())
}

#[inline]
fn literal_value(values: &[Option<bool>], lit: Literal) -> Option<bool> {
    values[lit.var().index()].map(|v| lit.eval(v))
}

/// Makes `lit` evaluate to `truth`.
#[inline]
fn assign(values: &mut [Option<bool>], lit: Literal, truth: bool) {
    values[lit.var().index()] = Some(truth != lit.is_negated());
}

fn clause_state(clause: &[Literal], values: &[Option<bool>]) -> ClauseState {
    let mut unknown = 0usize;
    let mut last = None;
    for &lit in clause {
        match literal_value(values, lit) {
            Some(true) => return ClauseState::Satisfied,
            Some(false) => {}
            None => {
                unknown += 1;
                last = Some(lit);
            }
        }
    }
    match (unknown, last) {
        (0, _) => ClauseState::Conflict,
        (1, Some(lit)) => ClauseState::Unit(lit),
        _ => ClauseState::Open,
    }
}

fn expr_bounds(expr: &LinearExpr, values: &[Option<bool>], bounds: &[Bounds]) -> Bounds {
    let mut lo = expr.constant;
    let mut hi = expr.constant;
    for &(var, coef) in &expr.bool_terms {
        match values[var.index()] {
            Some(true) => {
                lo += coef;
                hi += coef;
            }
            Some(false) => {}
            None => {
                lo += coef.min(0);
                hi += coef.max(0);
            }
        }
    }
    for &(var, coef) in &expr.int_terms {
        let b = bounds[var.index()];
        if coef >= 0 {
            lo += coef * b.lo;
            hi += coef * b.hi;
        } else {
            lo += coef * b.hi;
            hi += coef * b.lo;
        }
    }
    Bounds { lo, hi }
}

/// Fixes unassigned terms of a boolean definition whose other value would
/// push the sum out of `domain`.
///
/// Returns `None` on conflict, otherwise whether anything was fixed.
fn tighten(
    expr: &LinearExpr,
    raw: Bounds,
    domain: IntDomain,
    values: &mut [Option<bool>],
) -> Option<bool> {
    let mut changed = false;
    for &(var, coef) in &expr.bool_terms {
        if coef == 0 || values[var.index()].is_some() {
            continue;
        }
        let false_lo = raw.lo - coef.min(0);
        let false_hi = raw.hi - coef.max(0);
        let true_lo = false_lo + coef;
        let true_hi = false_hi + coef;
        let true_fits = true_lo <= domain.max && true_hi >= domain.min;
        let false_fits = false_lo <= domain.max && false_hi >= domain.min;
        match (true_fits, false_fits) {
            (false, false) => return None,
            (true, false) => {
                values[var.index()] = Some(true);
                changed = true;
            }
            (false, true) => {
                values[var.index()] = Some(false);
                changed = true;
            }
            (true, true) => {}
        }
    }
    Some(changed)
}

/// An open search node: a propagated partial assignment and its bound.
struct Node {
    values: Vec<Option<bool>>,
    bound: i64,
}

struct Search<'c, 'm, 'o> {
    compiled: &'c Compiled<'m>,
    params: &'c SolveParams,
    check_interval: u64,
    observer: Option<&'o mut dyn SolutionObserver>,
    rng: Option<StdRng>,
    bounds: Vec<Bounds>,
    stats: SearchStats,
    start: Instant,
    incumbent: Option<(Assignment, i64)>,
}

impl<'c, 'm, 'o> Search<'c, 'm, 'o> {
    fn new(
        compiled: &'c Compiled<'m>,
        params: &'c SolveParams,
        check_interval: u64,
        observer: Option<&'o mut dyn SolutionObserver>,
    ) -> Self {
        Self {
            compiled,
            params,
            check_interval,
            observer,
            rng: params.random_seed.map(StdRng::seed_from_u64),
            bounds: vec![Bounds::default(); compiled.domains.len()],
            stats: SearchStats::default(),
            start: Instant::now(),
            incumbent: None,
        }
    }

    fn run(mut self) -> SolverResponse {
        let root = self
            .compiled
            .free
            .iter()
            .map(|&free| if free { Some(false) } else { None })
            .collect();

        let mut stack = Vec::new();
        stack.extend(self.admit(root));

        let mut aborted = false;
        while let Some(node) = stack.pop() {
            if self.limit_reached() {
                aborted = true;
                break;
            }
            self.stats.nodes += 1;

            if self.is_dominated(node.bound) {
                self.stats.pruned += 1;
                continue;
            }

            let Some(var) = node.values.iter().position(Option::is_none) else {
                continue;
            };

            let mut with_false = node.values.clone();
            with_false[var] = Some(false);
            let mut with_true = node.values;
            with_true[var] = Some(true);

            let false_child = self.admit(with_false);
            let true_child = self.admit(with_true);

            match (false_child, true_child) {
                (Some(f), Some(t)) => {
                    if self.explore_true_first(f.bound, t.bound) {
                        stack.push(f);
                        stack.push(t);
                    } else {
                        stack.push(t);
                        stack.push(f);
                    }
                }
                (Some(only), None) | (None, Some(only)) => stack.push(only),
                (None, None) => {}
            }

            trace!(
                nodes = self.stats.nodes,
                open = stack.len(),
                conflicts = self.stats.conflicts,
                "node expanded"
            );
        }

        self.stats.elapsed = self.start.elapsed();
        let status = match (self.incumbent.is_some(), aborted) {
            (true, false) => SolveStatus::Optimal,
            (true, true) => SolveStatus::Feasible,
            (false, false) => SolveStatus::Infeasible,
            (false, true) => SolveStatus::Unknown,
        };
        debug!(
            ?status,
            nodes = self.stats.nodes,
            conflicts = self.stats.conflicts,
            pruned = self.stats.pruned,
            solutions = self.stats.solutions,
            "branch and bound finished"
        );

        match self.incumbent {
            Some((assignment, objective)) => {
                SolverResponse::solved(status, assignment, objective, self.stats)
            }
            None => SolverResponse::unsolved(status, self.stats),
        }
    }

    /// Propagates a fresh partial assignment.
    ///
    /// Complete assignments are recorded as solutions; open ones come back
    /// as nodes unless they are infeasible or cannot beat the incumbent.
    fn admit(&mut self, mut values: Vec<Option<bool>>) -> Option<Node> {
        if !self.compiled.propagate(&mut values, &mut self.bounds) {
            self.stats.conflicts += 1;
            return None;
        }
        let bound = self.compiled.objective_bound(&values, &self.bounds);
        if self.is_dominated(bound) {
            self.stats.pruned += 1;
            return None;
        }
        if values.iter().any(Option::is_none) {
            return Some(Node { values, bound });
        }
        self.record_solution(&values, bound);
        None
    }

    fn record_solution(&mut self, values: &[Option<bool>], objective: i64) {
        let bools = values.iter().map(|v| v.unwrap_or(false)).collect();
        let ints = self.bounds.iter().map(|b| b.lo).collect();
        let event = SolutionEvent {
            index: self.stats.solutions,
            objective,
            elapsed: self.start.elapsed(),
        };
        self.stats.solutions += 1;
        debug!(
            index = event.index,
            objective,
            nodes = self.stats.nodes,
            "improving solution"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_solution(&event);
        }
        self.incumbent = Some((Assignment::new(bools, ints), objective));
    }

    #[inline]
    fn is_dominated(&self, bound: i64) -> bool {
        self.incumbent
            .as_ref()
            .is_some_and(|(_, best)| bound >= *best)
    }

    fn explore_true_first(&mut self, false_bound: i64, true_bound: i64) -> bool {
        match true_bound.cmp(&false_bound) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.rng.as_mut().is_some_and(|rng| rng.random_bool(0.5)),
        }
    }

    fn limit_reached(&self) -> bool {
        if let Some(limit) = self.params.node_limit {
            if self.stats.nodes >= limit {
                return true;
            }
        }
        if let Some(limit) = self.params.time_limit {
            if self.stats.nodes % self.check_interval == 0 && self.start.elapsed() >= limit {
                return true;
            }
        }
        false
    }
}
