//! Constraint model vocabulary.
//!
//! A [`CpModel`] owns boolean variables, bounded integer variables, hard
//! constraints and a linear objective to minimize. Integer variables are
//! always *defined*: each is the target of exactly one [`Constraint::LinearEq`]
//! or [`Constraint::MaxEquality`], so every integer value follows from the
//! booleans. Variable names are labels for reporting only.
//!
//! Models are plain owned values. Nothing is registered globally, so two
//! models built concurrently never share state.

use std::ops::Not;

/// Handle to a boolean variable of one [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(usize);

impl BoolVar {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// The positive literal of this variable.
    #[inline]
    pub fn lit(self) -> Literal {
        Literal {
            var: self,
            negated: false,
        }
    }
}

impl Not for BoolVar {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self,
            negated: true,
        }
    }
}

impl From<BoolVar> for Literal {
    fn from(var: BoolVar) -> Self {
        var.lit()
    }
}

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    var: BoolVar,
    negated: bool,
}

impl Literal {
    #[inline]
    pub fn var(self) -> BoolVar {
        self.var
    }

    #[inline]
    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// Truth value of the literal when its variable is `value`.
    #[inline]
    pub fn eval(self, value: bool) -> bool {
        value != self.negated
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// Handle to an integer variable of one [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(usize);

impl IntVar {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inclusive integer domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntDomain {
    pub min: i64,
    pub max: i64,
}

impl IntDomain {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// `constant + Σ coef·bool + Σ coef·int`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    pub bool_terms: Vec<(BoolVar, i64)>,
    pub int_terms: Vec<(IntVar, i64)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: i64) -> Self {
        Self {
            constant: value,
            ..Self::default()
        }
    }

    /// Number of true variables among `vars`.
    pub fn sum_of(vars: impl IntoIterator<Item = BoolVar>) -> Self {
        Self {
            bool_terms: vars.into_iter().map(|v| (v, 1)).collect(),
            ..Self::default()
        }
    }

    /// Adds `coef · var`.
    pub fn with_bool(mut self, var: BoolVar, coef: i64) -> Self {
        self.bool_terms.push((var, coef));
        self
    }

    /// Adds `coef · var`.
    pub fn with_int(mut self, var: IntVar, coef: i64) -> Self {
        self.int_terms.push((var, coef));
        self
    }

    /// Adds a constant offset.
    pub fn plus(mut self, offset: i64) -> Self {
        self.constant += offset;
        self
    }

    /// Whether the expression mentions only boolean variables.
    pub fn is_boolean(&self) -> bool {
        self.int_terms.is_empty()
    }

    /// Value under a full assignment.
    pub fn evaluate(&self, assignment: &Assignment) -> i64 {
        let bools: i64 = self
            .bool_terms
            .iter()
            .filter(|(v, _)| assignment.value(*v))
            .map(|(_, c)| c)
            .sum();
        let ints: i64 = self
            .int_terms
            .iter()
            .map(|(v, c)| c * assignment.int_value(*v))
            .sum();
        self.constant + bools + ints
    }
}

/// A hard constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// At least one literal is true.
    BoolOr(Vec<Literal>),
    /// Exactly one literal is true.
    ExactlyOne(Vec<Literal>),
    /// `target == expr`.
    LinearEq { target: IntVar, expr: LinearExpr },
    /// `target == max(exprs)`.
    MaxEquality { target: IntVar, exprs: Vec<LinearExpr> },
}

impl Constraint {
    /// Whether the constraint holds under a full assignment.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        match self {
            Constraint::BoolOr(lits) => lits.iter().any(|l| assignment.literal(*l)),
            Constraint::ExactlyOne(lits) => {
                lits.iter().filter(|l| assignment.literal(**l)).count() == 1
            }
            Constraint::LinearEq { target, expr } => {
                assignment.int_value(*target) == expr.evaluate(assignment)
            }
            Constraint::MaxEquality { target, exprs } => {
                let max = exprs.iter().map(|e| e.evaluate(assignment)).max();
                max == Some(assignment.int_value(*target))
            }
        }
    }
}

/// A concrete value for every variable of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    bools: Vec<bool>,
    ints: Vec<i64>,
}

impl Assignment {
    pub fn new(bools: Vec<bool>, ints: Vec<i64>) -> Self {
        Self { bools, ints }
    }

    /// Value of a boolean variable; unknown variables read as false.
    #[inline]
    pub fn value(&self, var: BoolVar) -> bool {
        self.bools.get(var.0).copied().unwrap_or(false)
    }

    #[inline]
    pub fn literal(&self, lit: Literal) -> bool {
        lit.eval(self.value(lit.var))
    }

    /// Value of an integer variable; unknown variables read as zero.
    #[inline]
    pub fn int_value(&self, var: IntVar) -> i64 {
        self.ints.get(var.0).copied().unwrap_or(0)
    }

    pub fn bool_values(&self) -> &[bool] {
        &self.bools
    }

    pub fn int_values(&self) -> &[i64] {
        &self.ints
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IntVarInfo {
    name: String,
    domain: IntDomain,
}

/// A boolean/integer linear model with a minimization objective.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    name: String,
    bool_names: Vec<String>,
    int_vars: Vec<IntVarInfo>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.bool_names.push(name.into());
        BoolVar(self.bool_names.len() - 1)
    }

    /// Creates an integer variable with domain `[min, max]`.
    ///
    /// An empty domain is accepted and makes the model infeasible.
    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> IntVar {
        self.int_vars.push(IntVarInfo {
            name: name.into(),
            domain: IntDomain { min, max },
        });
        IntVar(self.int_vars.len() - 1)
    }

    /// Requires at least one of `lits` to be true.
    pub fn add_bool_or(&mut self, lits: impl IntoIterator<Item = Literal>) {
        self.constraints
            .push(Constraint::BoolOr(lits.into_iter().collect()));
    }

    /// Requires exactly one of `lits` to be true.
    pub fn add_exactly_one(&mut self, lits: impl IntoIterator<Item = Literal>) {
        self.constraints
            .push(Constraint::ExactlyOne(lits.into_iter().collect()));
    }

    /// Defines `target` as `expr`.
    pub fn add_linear_eq(&mut self, target: IntVar, expr: LinearExpr) {
        self.constraints.push(Constraint::LinearEq { target, expr });
    }

    /// Defines `target` as the maximum of `exprs`.
    pub fn add_max_equality(&mut self, target: IntVar, exprs: Vec<LinearExpr>) {
        self.constraints
            .push(Constraint::MaxEquality { target, exprs });
    }

    /// Sets the expression to minimize.
    pub fn minimize(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn bool_var_count(&self) -> usize {
        self.bool_names.len()
    }

    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the model has no variables at all.
    pub fn is_empty(&self) -> bool {
        self.bool_names.is_empty() && self.int_vars.is_empty()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Label of a boolean variable.
    pub fn bool_name(&self, var: BoolVar) -> &str {
        self.bool_names.get(var.0).map_or("", String::as_str)
    }

    /// Label of an integer variable.
    pub fn int_name(&self, var: IntVar) -> &str {
        self.int_vars.get(var.0).map_or("", |v| v.name.as_str())
    }

    /// Domains of all integer variables, in creation order.
    pub fn int_domains(&self) -> impl Iterator<Item = IntDomain> + '_ {
        self.int_vars.iter().map(|v| v.domain)
    }

    /// Domain of an integer variable.
    pub fn int_domain(&self, var: IntVar) -> Option<IntDomain> {
        self.int_vars.get(var.0).map(|v| v.domain)
    }

    /// Handle of the integer variable at `index`, if it exists.
    pub fn int_var(&self, index: usize) -> Option<IntVar> {
        (index < self.int_vars.len()).then_some(IntVar(index))
    }

    /// Handle of the boolean variable at `index`, if it exists.
    pub fn bool_var(&self, index: usize) -> Option<BoolVar> {
        (index < self.bool_names.len()).then_some(BoolVar(index))
    }

    /// Objective value under a full assignment.
    pub fn objective_value(&self, assignment: &Assignment) -> i64 {
        self.objective.evaluate(assignment)
    }

    /// Index of the first violated constraint or out-of-domain integer.
    ///
    /// Returns `None` when the assignment satisfies the whole model.
    pub fn first_violation(&self, assignment: &Assignment) -> Option<Violation> {
        for (i, info) in self.int_vars.iter().enumerate() {
            if !info.domain.contains(assignment.int_value(IntVar(i))) {
                return Some(Violation::Domain(IntVar(i)));
            }
        }
        self.constraints
            .iter()
            .position(|c| !c.is_satisfied(assignment))
            .map(Violation::Constraint)
    }
}

/// What a failed [`CpModel::first_violation`] check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// An integer value lies outside its domain.
    Domain(IntVar),
    /// The constraint at this index does not hold.
    Constraint(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_creation() {
        let mut m = CpModel::new("test");
        let a = m.new_bool_var("a");
        let b = m.new_bool_var("b");
        let x = m.new_int_var(0, 3, "x");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(m.bool_var_count(), 2);
        assert_eq!(m.int_var_count(), 1);
        assert_eq!(m.bool_name(b), "b");
        assert_eq!(m.int_name(x), "x");
        assert_eq!(m.int_domain(x), Some(IntDomain { min: 0, max: 3 }));
        assert!(!m.is_empty());
        assert!(CpModel::new("empty").is_empty());
    }

    #[test]
    fn test_literal_negation() {
        let mut m = CpModel::new("test");
        let a = m.new_bool_var("a");
        let neg = !a;
        assert!(neg.is_negated());
        assert_eq!(neg.var(), a);
        assert!(!(!neg).is_negated());
        assert!(neg.eval(false));
        assert!(!neg.eval(true));
        assert_eq!(Literal::from(a), a.lit());
    }

    #[test]
    fn test_expr_evaluate() {
        let mut m = CpModel::new("test");
        let a = m.new_bool_var("a");
        let b = m.new_bool_var("b");
        let x = m.new_int_var(0, 10, "x");
        let expr = LinearExpr::sum_of([a, b]).with_int(x, -2).plus(5);
        let asg = Assignment::new(vec![true, false], vec![3]);
        assert_eq!(expr.evaluate(&asg), 1 + 0 - 6 + 5);
        assert!(!expr.is_boolean());
    }

    #[test]
    fn test_first_violation() {
        let mut m = CpModel::new("test");
        let a = m.new_bool_var("a");
        let b = m.new_bool_var("b");
        let sum = m.new_int_var(1, 2, "sum");
        m.add_exactly_one([a.lit(), b.lit()]);
        m.add_linear_eq(sum, LinearExpr::sum_of([a, b]));
        let over = m.new_int_var(0, 1, "over");
        m.add_max_equality(
            over,
            vec![LinearExpr::new().with_int(sum, 1).plus(-1), LinearExpr::constant(0)],
        );

        let ok = Assignment::new(vec![true, false], vec![1, 0]);
        assert_eq!(m.first_violation(&ok), None);

        let both = Assignment::new(vec![true, true], vec![2, 1]);
        assert_eq!(m.first_violation(&both), Some(Violation::Constraint(0)));

        let none = Assignment::new(vec![false, false], vec![0, 0]);
        assert_eq!(m.first_violation(&none), Some(Violation::Domain(sum)));
    }

    #[test]
    fn test_objective_value() {
        let mut m = CpModel::new("test");
        let a = m.new_bool_var("a");
        let x = m.new_int_var(0, 5, "x");
        m.minimize(LinearExpr::new().with_bool(a, -2).with_int(x, 3));
        let asg = Assignment::new(vec![true], vec![4]);
        assert_eq!(m.objective_value(&asg), 10);
    }
}
