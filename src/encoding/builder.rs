//! Roster model construction.
//!
//! Owns the work grid and drives every encoder over it:
//!
//! 1. one boolean per (participant, shift type, day), slack row last
//! 2. per-day exclusivity for employees (relaxed for double shifts)
//! 3. preference rewards and unavailability costs, both shift types of a day
//! 4. run-length and weekly-count rules per employee
//! 5. total-count bounds for every row, slack included
//! 6. transition rules per employee
//! 7. daily cover floors with surplus penalties
//!
//! # Reference
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

use tracing::{debug, trace};

use crate::cp::CpModel;
use crate::models::{
    Employee, Participant, RosterPolicy, ShiftType, SoftBounds, UnfilledSlack, DAYS_PER_WEEK,
    UNFILLED,
};

use super::{
    BoolPenalty, CoverDemandEncoder, ObjectiveAssembler, PenaltyLedger, SequenceConstraintEncoder,
    SumConstraintEncoder, TransitionPenaltyEncoder, WorkGrid,
};

/// A built roster model ready for an oracle.
#[derive(Debug, Clone, Default)]
pub struct RosterModel {
    pub model: CpModel,
    pub grid: WorkGrid,
    pub penalties: PenaltyLedger,
    /// Display name of each grid row.
    pub labels: Vec<String>,
}

impl RosterModel {
    /// Whether the model has no variables at all.
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Horizon length in days.
    pub fn days(&self) -> usize {
        self.grid.days()
    }
}

/// Builds a [`RosterModel`] from normalized employees and a policy.
///
/// # Example
/// ```
/// use u_roster::encoding::ModelBuilder;
/// use u_roster::models::{Employee, EmployeeRecord};
///
/// let employees = Employee::roster_from_records(&[EmployeeRecord::new("Ana", 0, 30)]);
/// let built = ModelBuilder::new(&employees).build(7);
/// assert_eq!(built.grid.rows(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    employees: &'a [Employee],
    policy: RosterPolicy,
    slack: UnfilledSlack,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(employees: &'a [Employee]) -> Self {
        Self {
            employees,
            policy: RosterPolicy::default(),
            slack: UnfilledSlack::default(),
        }
    }

    /// Sets the rostering policy.
    pub fn with_policy(mut self, policy: RosterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the slack capacity.
    pub fn with_slack(mut self, slack: UnfilledSlack) -> Self {
        self.slack = slack;
        self
    }

    /// Builds the model for a horizon of `num_days`.
    ///
    /// An empty horizon or roster yields a model with no variables.
    pub fn build(&self, num_days: usize) -> RosterModel {
        let mut model = CpModel::new("roster");
        if num_days == 0 || self.employees.is_empty() {
            debug!(event = "model_trivial", num_days, employees = self.employees.len());
            return RosterModel {
                model,
                ..RosterModel::default()
            };
        }

        let participants: Vec<Participant> = (0..self.employees.len())
            .map(Participant::Employee)
            .chain(std::iter::once(Participant::Unfilled))
            .collect();
        let labels: Vec<String> = self
            .employees
            .iter()
            .map(|e| e.name.clone())
            .chain(std::iter::once(UNFILLED.to_string()))
            .collect();
        let grid = WorkGrid::new(&mut model, participants, num_days);
        let mut objective = ObjectiveAssembler::new();

        for (row, employee) in self.employees.iter().enumerate() {
            self.add_exclusivity(&mut model, &grid, row, employee.allows_double);
            objective.extend_bool(self.request_terms(&grid, row, employee));

            for rule in &self.policy.sequence_rules {
                let prefix = format!("{}: {}", employee.name, rule.shift);
                objective.extend_bool(
                    SequenceConstraintEncoder::new(rule.bounds).encode(
                        &mut model,
                        &grid.timeline(row, rule.shift),
                        &prefix,
                    ),
                );
            }

            for rule in &self.policy.weekly_sum_rules {
                for (week, start) in (0..num_days).step_by(DAYS_PER_WEEK).enumerate() {
                    let end = (start + DAYS_PER_WEEK).min(num_days);
                    let works: Vec<_> =
                        (start..end).map(|d| grid.var(row, rule.shift, d)).collect();
                    let prefix = format!("{}: {} week {week}", employee.name, rule.shift);
                    let bounds = clip_to_len(rule.bounds, works.len());
                    let encoding =
                        SumConstraintEncoder::new(bounds).encode(&mut model, &works, &prefix);
                    objective.extend_int(encoding.penalties());
                }
            }
        }

        // Total working shifts, slack row included.
        let costs = self.policy.workload_costs;
        for (row, label) in labels.iter().enumerate() {
            let bounds = match self.employees.get(row) {
                Some(employee) => SoftBounds::new(
                    employee.desired.min,
                    employee.desired.min,
                    costs.under,
                    employee.desired.max,
                    employee.desired.max,
                    costs.over,
                ),
                None => {
                    let range = self.slack.range();
                    SoftBounds::new(
                        range.min,
                        range.min,
                        costs.under,
                        range.min,
                        range.max,
                        costs.over,
                    )
                }
            };
            let works = grid.working(row, 0..num_days);
            let prefix = format!("{label}: total");
            let encoding = SumConstraintEncoder::new(bounds).encode(&mut model, &works, &prefix);
            objective.extend_int(encoding.penalties());
        }

        for rule in &self.policy.transitions {
            let encoder = TransitionPenaltyEncoder::new(*rule);
            for row in grid.employee_rows() {
                objective.extend_bool(encoder.encode(&mut model, &grid, row, &labels[row]));
            }
        }

        for shift in ShiftType::WORKING {
            let rate = self.policy.excess_cover.rate(shift);
            for day in 0..num_days {
                let floor = self.policy.cover_floor(shift, day);
                let encoding =
                    CoverDemandEncoder::new(floor, rate).encode(&mut model, &grid, shift, day);
                objective.extend_int(encoding.excess);
            }
        }

        let penalties = objective.assemble(&mut model);
        debug!(
            event = "model_built",
            num_days,
            employees = self.employees.len(),
            bool_vars = model.bool_var_count(),
            int_vars = model.int_var_count(),
            constraints = model.constraint_count(),
            penalty_terms = penalties.len(),
        );

        RosterModel {
            model,
            grid,
            penalties,
            labels,
        }
    }

    fn add_exclusivity(
        &self,
        model: &mut CpModel,
        grid: &WorkGrid,
        row: usize,
        allows_double: bool,
    ) {
        for day in 0..grid.days() {
            let off = grid.var(row, ShiftType::Off, day);
            let morning = grid.var(row, ShiftType::Morning, day);
            let night = grid.var(row, ShiftType::Night, day);
            if allows_double {
                // Off exactly when neither working shift is held.
                model.add_bool_or([off.lit(), morning.lit(), night.lit()]);
                model.add_bool_or([!off, !morning]);
                model.add_bool_or([!off, !night]);
            } else {
                model.add_exactly_one([off.lit(), morning.lit(), night.lit()]);
            }
        }
    }

    fn request_terms(&self, grid: &WorkGrid, row: usize, employee: &Employee) -> Vec<BoolPenalty> {
        let weighted = [
            (&employee.preferred_days, self.policy.preference_weight),
            (&employee.unavailable_days, self.policy.unavailable_weight),
        ];
        let mut terms = Vec::new();
        for (days, weight) in weighted {
            for &day in days {
                if day >= grid.days() {
                    trace!(event = "request_day_dropped", employee = %employee.name, day);
                    continue;
                }
                terms.extend(
                    ShiftType::WORKING
                        .into_iter()
                        .map(|shift| BoolPenalty::new(grid.var(row, shift, day), weight)),
                );
            }
        }
        terms
    }
}

/// Lowers the minimums of `bounds` so that a set of `len` values can meet them.
fn clip_to_len(bounds: SoftBounds, len: usize) -> SoftBounds {
    let len = len as i64;
    SoftBounds {
        hard_min: bounds.hard_min.min(len),
        soft_min: bounds.soft_min.min(len),
        ..bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeRecord, ShiftRule, TransitionRule};

    fn employees(records: &[EmployeeRecord]) -> Vec<Employee> {
        Employee::roster_from_records(records)
    }

    #[test]
    fn test_trivial_inputs_build_nothing() {
        let staff = employees(&[EmployeeRecord::new("Ana", 0, 30)]);
        assert!(ModelBuilder::new(&staff).build(0).is_empty());
        assert!(ModelBuilder::new(&[]).build(7).is_empty());
    }

    #[test]
    fn test_variable_and_constraint_counts() {
        let staff = employees(&[
            EmployeeRecord::new("Ana", 0, 30),
            EmployeeRecord::new("Ben", 0, 30),
        ]);
        let built = ModelBuilder::new(&staff).build(7);
        let m = &built.model;

        // 3 rows × 3 shifts × 7 days
        assert_eq!(m.bool_var_count(), 63);
        // totals (3) + slack surplus (1) + worked (14) + excess (14)
        assert_eq!(m.int_var_count(), 3 + 1 + 14 + 14);
        // exclusivity 2×7, totals 3 + 1, night→morning 2×6, cover 14 + excess 14
        assert_eq!(m.constraint_count(), 14 + 4 + 12 + 28);
        assert_eq!(built.labels, vec!["Ana", "Ben", "Unfilled"]);
    }

    #[test]
    fn test_slack_total_penalizes_every_slot() {
        let staff = employees(&[EmployeeRecord::new("Ana", 0, 30)]);
        let built = ModelBuilder::new(&staff).with_slack(UnfilledSlack::new(5)).build(3);
        let over = built
            .penalties
            .int_terms
            .iter()
            .find(|t| built.model.int_name(t.var) == "Unfilled: total: over_sum")
            .unwrap();
        assert_eq!(over.coefficient, 2);
        assert_eq!(built.model.int_domain(over.var).map(|d| d.max), Some(5));
        // Real employees get hard bounds only.
        assert!(built
            .penalties
            .int_terms
            .iter()
            .all(|t| !built.model.int_name(t.var).starts_with("Ana: total")));
    }

    #[test]
    fn test_request_terms_and_out_of_range_days() {
        let staff = employees(&[EmployeeRecord::new("Ana", 0, 30)
            .with_preferred(vec![0, 9])
            .with_unavailable(vec![2, 3])]);
        let built = ModelBuilder::new(&staff).build(3);
        let bool_terms = &built.penalties.bool_terms;
        assert_eq!(bool_terms.len(), 4);
        assert_eq!(bool_terms.iter().filter(|t| t.coefficient == -2).count(), 2);
        assert_eq!(bool_terms.iter().filter(|t| t.coefficient == 10).count(), 2);
        assert_eq!(bool_terms[0].var, built.grid.var(0, ShiftType::Morning, 0));
        assert_eq!(bool_terms[1].var, built.grid.var(0, ShiftType::Night, 0));
    }

    #[test]
    fn test_double_shift_uses_clauses() {
        let staff = employees(&[EmployeeRecord::new("Ana", 0, 30).with_double_shifts(true)]);
        let built = ModelBuilder::new(&staff)
            .with_policy(RosterPolicy::default().with_transitions(Vec::new()))
            .build(2);
        let exactly_one = built
            .model
            .constraints()
            .iter()
            .filter(|c| matches!(c, crate::cp::Constraint::ExactlyOne(_)))
            .count();
        assert_eq!(exactly_one, 0);
    }

    #[test]
    fn test_weekly_rules_split_partial_weeks() {
        let staff = employees(&[EmployeeRecord::new("Ana", 0, 30)]);
        let policy = RosterPolicy::default()
            .with_weekly_sum_rule(ShiftRule::new(
                ShiftType::Night,
                SoftBounds::new(2, 3, 1, 4, 5, 1),
            ));
        let built = ModelBuilder::new(&staff).with_policy(policy).build(9);
        let names: Vec<&str> = (0..built.model.int_var_count())
            .filter_map(|i| built.model.int_var(i))
            .map(|v| built.model.int_name(v))
            .filter(|n| n.starts_with("Ana: night week"))
            .collect();
        assert!(names.contains(&"Ana: night week 0: sum"));
        assert!(names.contains(&"Ana: night week 1: sum"));

        let week1 = (0..built.model.int_var_count())
            .filter_map(|i| built.model.int_var(i))
            .find(|v| built.model.int_name(*v) == "Ana: night week 1: sum")
            .unwrap();
        assert_eq!(built.model.int_domain(week1).map(|d| d.min), Some(2));
    }

    #[test]
    fn test_penalized_transition_is_collected() {
        let staff = employees(&[EmployeeRecord::new("Ana", 0, 30)]);
        let policy = RosterPolicy::default()
            .with_transitions(vec![TransitionRule::penalized(
                ShiftType::Morning,
                ShiftType::Night,
                3,
            )]);
        let built = ModelBuilder::new(&staff).with_policy(policy).build(4);
        let transitions = built
            .penalties
            .bool_terms
            .iter()
            .filter(|t| built.model.bool_name(t.var).contains("transition"))
            .count();
        assert_eq!(transitions, 3);
    }
}
