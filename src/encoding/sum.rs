//! Count bounds on a set of booleans.
//!
//! The number of true values must lie in `[hard_min, hard_max]`; counts
//! below `soft_min` or above `soft_max` are charged per unit.

use crate::cp::{BoolVar, CpModel, IntVar, LinearExpr};
use crate::models::SoftBounds;

use super::IntPenalty;

/// Variables created for one count constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumEncoding {
    /// Number of true values.
    pub total: IntVar,
    /// Units missing below the soft minimum, weighted by `min_cost`.
    pub under: Option<IntPenalty>,
    /// Units above the soft maximum, weighted by `max_cost`.
    pub over: Option<IntPenalty>,
}

impl SumEncoding {
    /// The penalty terms, under before over.
    pub fn penalties(&self) -> impl Iterator<Item = IntPenalty> + '_ {
        self.under.iter().chain(self.over.iter()).copied()
    }
}

/// Encodes count bounds for one group of booleans at a time.
#[derive(Debug, Clone, Copy)]
pub struct SumConstraintEncoder {
    bounds: SoftBounds,
}

impl SumConstraintEncoder {
    pub fn new(bounds: SoftBounds) -> Self {
        Self { bounds }
    }

    /// Adds the count constraint over `works` to `model`.
    pub fn encode(&self, model: &mut CpModel, works: &[BoolVar], prefix: &str) -> SumEncoding {
        let b = self.bounds;
        let len = works.len() as i64;

        let total = model.new_int_var(b.hard_min, b.hard_max, format!("{prefix}: sum"));
        model.add_linear_eq(total, LinearExpr::sum_of(works.iter().copied()));

        let under = (b.soft_min > b.hard_min && b.min_cost > 0).then(|| {
            let cap = (b.soft_min - b.hard_min.max(0)).max(0);
            let var = model.new_int_var(0, cap, format!("{prefix}: under_sum"));
            model.add_max_equality(
                var,
                vec![
                    LinearExpr::constant(b.soft_min).with_int(total, -1),
                    LinearExpr::constant(0),
                ],
            );
            IntPenalty::new(var, b.min_cost)
        });

        let over = (b.soft_max < b.hard_max && b.max_cost > 0).then(|| {
            let cap = (b.hard_max.min(len) - b.soft_max).max(0);
            let var = model.new_int_var(0, cap, format!("{prefix}: over_sum"));
            model.add_max_equality(
                var,
                vec![
                    LinearExpr::new().with_int(total, 1).plus(-b.soft_max),
                    LinearExpr::constant(0),
                ],
            );
            IntPenalty::new(var, b.max_cost)
        });

        SumEncoding { total, under, over }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BranchAndBoundOracle, IntDomain, SolveParams, SolveStatus, SolverOracle};

    fn works(model: &mut CpModel, n: usize) -> Vec<BoolVar> {
        (0..n).map(|i| model.new_bool_var(format!("w{i}"))).collect()
    }

    #[test]
    fn test_hard_bounds_only() {
        let mut m = CpModel::new("t");
        let w = works(&mut m, 4);
        let enc = SumConstraintEncoder::new(SoftBounds::hard(1, 3)).encode(&mut m, &w, "e0");
        assert!(enc.under.is_none());
        assert!(enc.over.is_none());
        assert_eq!(m.int_var_count(), 1);
        assert_eq!(m.int_domain(enc.total), Some(IntDomain { min: 1, max: 3 }));
    }

    #[test]
    fn test_zero_costs_skip_penalties() {
        let mut m = CpModel::new("t");
        let w = works(&mut m, 4);
        let enc =
            SumConstraintEncoder::new(SoftBounds::new(0, 2, 0, 2, 4, 0)).encode(&mut m, &w, "e0");
        assert_eq!(enc.penalties().count(), 0);
    }

    #[test]
    fn test_penalty_domains_are_tight() {
        let mut m = CpModel::new("t");
        let w = works(&mut m, 5);
        let enc =
            SumConstraintEncoder::new(SoftBounds::new(1, 3, 2, 3, 9, 4)).encode(&mut m, &w, "e0");
        let under = enc.under.unwrap();
        let over = enc.over.unwrap();
        assert_eq!(under.coefficient, 2);
        assert_eq!(over.coefficient, 4);
        assert_eq!(m.int_domain(under.var), Some(IntDomain { min: 0, max: 2 }));
        assert_eq!(m.int_domain(over.var), Some(IntDomain { min: 0, max: 2 }));
        assert_eq!(m.int_name(over.var), "e0: over_sum");
    }

    #[test]
    fn test_solver_charges_shortfall() {
        let mut m = CpModel::new("t");
        let w = works(&mut m, 4);
        // At most one may be true; soft minimum of 3 costs 5 per missing unit.
        m.add_bool_or([!w[1]]);
        m.add_bool_or([!w[2]]);
        m.add_bool_or([!w[3]]);
        let enc =
            SumConstraintEncoder::new(SoftBounds::new(0, 3, 5, 4, 4, 0)).encode(&mut m, &w, "e0");
        let under = enc.under.unwrap();
        m.minimize(LinearExpr::new().with_int(under.var, under.coefficient));

        let r = BranchAndBoundOracle::new().optimize(&m, &SolveParams::new(), None).unwrap();
        assert_eq!(r.status, SolveStatus::Optimal);
        let asg = r.assignment.unwrap();
        assert!(asg.value(w[0]));
        assert_eq!(asg.int_value(enc.total), 1);
        assert_eq!(asg.int_value(under.var), 2);
        assert_eq!(r.objective, Some(10));
    }

    #[test]
    fn test_infeasible_minimum() {
        let mut m = CpModel::new("t");
        let w = works(&mut m, 3);
        SumConstraintEncoder::new(SoftBounds::hard(4, 5)).encode(&mut m, &w, "e0");
        let r = BranchAndBoundOracle::new().optimize(&m, &SolveParams::new(), None).unwrap();
        assert_eq!(r.status, SolveStatus::Infeasible);
    }
}
