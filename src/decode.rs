//! Solution decoding.
//!
//! Reads a solved assignment back through the work grid. Each working
//! slot goes to the first real employee holding it; a slot held only by
//! the slack row is reported as unfilled.

use crate::cp::{Assignment, SolverResponse};
use crate::encoding::RosterModel;
use crate::models::{Assignee, PenaltyReport, Roster, RosterDay, ShiftType, Timeline};

/// Everything recovered from one solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRoster {
    pub roster: Roster,
    /// One timeline per grid row, slack last.
    pub timelines: Vec<Timeline>,
    /// Active objective terms, in encoding order.
    pub penalties: Vec<PenaltyReport>,
    pub objective: i64,
}

impl DecodedRoster {
    /// Whether nothing was decoded.
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }
}

/// Maps assignments of a [`RosterModel`] to rosters.
#[derive(Debug, Clone, Copy)]
pub struct SolutionDecoder<'a> {
    built: &'a RosterModel,
}

impl<'a> SolutionDecoder<'a> {
    pub fn new(built: &'a RosterModel) -> Self {
        Self { built }
    }

    /// Decodes a response; responses without a solution give an empty roster.
    pub fn decode_response(&self, response: &SolverResponse) -> DecodedRoster {
        match (&response.assignment, response.status.has_solution()) {
            (Some(assignment), true) => self.decode(assignment),
            _ => DecodedRoster::default(),
        }
    }

    /// Decodes a full assignment.
    pub fn decode(&self, assignment: &Assignment) -> DecodedRoster {
        DecodedRoster {
            roster: self.roster(assignment),
            timelines: self.timelines(assignment),
            penalties: self.penalty_report(assignment),
            objective: self.built.penalties.evaluate(assignment),
        }
    }

    /// The day-by-day roster.
    pub fn roster(&self, assignment: &Assignment) -> Roster {
        let mut roster = Roster::new();
        for day in 0..self.built.days() {
            roster.push_day(RosterDay {
                day,
                morning: self.holder(assignment, ShiftType::Morning, day),
                night: self.holder(assignment, ShiftType::Night, day),
            });
        }
        roster
    }

    /// Who the roster reports for a slot.
    ///
    /// When several employees hold the same slot, the one with the lowest
    /// index is reported; the others still appear in their timelines. The
    /// slack row is reported only when no employee holds the slot.
    fn holder(&self, assignment: &Assignment, shift: ShiftType, day: usize) -> Assignee {
        let grid = &self.built.grid;
        grid.employee_rows()
            .find(|&row| assignment.value(grid.var(row, shift, day)))
            .map_or(Assignee::Unfilled, |row| Assignee::Employee {
                index: row,
                name: self.built.labels[row].clone(),
            })
    }

    /// Shift types held by every row on every day.
    pub fn timelines(&self, assignment: &Assignment) -> Vec<Timeline> {
        let grid = &self.built.grid;
        grid.participants()
            .iter()
            .enumerate()
            .map(|(row, &participant)| Timeline {
                participant,
                name: self.built.labels[row].clone(),
                days: (0..grid.days())
                    .map(|day| {
                        ShiftType::ALL
                            .into_iter()
                            .filter(|&shift| assignment.value(grid.var(row, shift, day)))
                            .collect()
                    })
                    .collect(),
            })
            .collect()
    }

    /// Penalty literals that are true and penalty counters above zero.
    pub fn penalty_report(&self, assignment: &Assignment) -> Vec<PenaltyReport> {
        let model = &self.built.model;
        let ledger = &self.built.penalties;
        let literals = ledger
            .bool_terms
            .iter()
            .filter(|t| assignment.value(t.var))
            .map(|t| PenaltyReport {
                name: model.bool_name(t.var).to_string(),
                amount: 1,
                coefficient: t.coefficient,
            });
        let counters = ledger
            .int_terms
            .iter()
            .map(|t| (t, assignment.int_value(t.var)))
            .filter(|(_, amount)| *amount > 0)
            .map(|(t, amount)| PenaltyReport {
                name: model.int_name(t.var).to_string(),
                amount,
                coefficient: t.coefficient,
            });
        literals.chain(counters).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{SearchStats, SolveStatus};
    use crate::encoding::ModelBuilder;
    use crate::models::{Employee, EmployeeRecord, Participant};

    fn built(days: usize) -> RosterModel {
        let staff = Employee::roster_from_records(&[
            EmployeeRecord::new("Ana", 0, 30).with_preferred(vec![0]),
            EmployeeRecord::new("Ben", 0, 30),
        ]);
        ModelBuilder::new(&staff).build(days)
    }

    /// Assignment with the given (row, shift, day) cells true and every
    /// integer definition evaluated.
    fn assignment(built: &RosterModel, cells: &[(usize, ShiftType, usize)]) -> Assignment {
        let mut bools = vec![false; built.model.bool_var_count()];
        for &(row, shift, day) in cells {
            bools[built.grid.var(row, shift, day).index()] = true;
        }
        let mut ints = vec![0; built.model.int_var_count()];
        for constraint in built.model.constraints() {
            let partial = Assignment::new(bools.clone(), ints.clone());
            match constraint {
                crate::cp::Constraint::LinearEq { target, expr } => {
                    ints[target.index()] = expr.evaluate(&partial);
                }
                crate::cp::Constraint::MaxEquality { target, exprs } => {
                    ints[target.index()] =
                        exprs.iter().map(|e| e.evaluate(&partial)).max().unwrap_or(0);
                }
                _ => {}
            }
        }
        Assignment::new(bools, ints)
    }

    #[test]
    fn test_decode_picks_real_employee_over_slack() {
        let b = built(1);
        let asg = assignment(
            &b,
            &[
                (0, ShiftType::Morning, 0),
                (1, ShiftType::Off, 0),
                (2, ShiftType::Morning, 0),
                (2, ShiftType::Night, 0),
            ],
        );
        let decoded = SolutionDecoder::new(&b).decode(&asg);
        let day = decoded.roster.day(0).unwrap();
        assert_eq!(day.morning, Assignee::Employee { index: 0, name: "Ana".into() });
        assert_eq!(day.night, Assignee::Unfilled);
        assert_eq!(decoded.roster.to_pairs(), vec![[Some(0), None]]);
    }

    #[test]
    fn test_timelines_and_penalties() {
        let b = built(2);
        let asg = assignment(
            &b,
            &[
                (0, ShiftType::Morning, 0),
                (0, ShiftType::Morning, 1),
                (1, ShiftType::Night, 0),
                (1, ShiftType::Night, 1),
            ],
        );
        assert_eq!(b.model.first_violation(&asg), None);
        let decoded = SolutionDecoder::new(&b).decode(&asg);

        assert_eq!(decoded.timelines.len(), 3);
        assert_eq!(decoded.timelines[0].render(), "M M");
        assert_eq!(decoded.timelines[2].participant, Participant::Unfilled);
        assert_eq!(decoded.timelines[2].working_count(), 0);

        // Ana's preference on day 0 (morning only) is the sole active term.
        assert_eq!(decoded.penalties.len(), 1);
        assert_eq!(decoded.penalties[0].coefficient, -2);
        assert_eq!(decoded.objective, -2);
    }

    #[test]
    fn test_excess_cover_reported_with_amount() {
        let b = built(1);
        let asg = assignment(
            &b,
            &[
                (0, ShiftType::Morning, 0),
                (1, ShiftType::Morning, 0),
                (2, ShiftType::Night, 0),
            ],
        );
        let decoded = SolutionDecoder::new(&b).decode(&asg);
        let excess = decoded
            .penalties
            .iter()
            .find(|p| p.name == "excess_demand(morning, day 0)")
            .unwrap();
        assert_eq!(excess.amount, 1);
        assert_eq!(excess.cost(), 2);
        // reward 2, surplus 2, one unfilled slot 2
        assert_eq!(decoded.objective, -2 + 2 + 2);
    }

    #[test]
    fn test_shared_slot_reports_lowest_index() {
        let b = built(1);
        let asg = assignment(
            &b,
            &[
                (0, ShiftType::Night, 0),
                (1, ShiftType::Night, 0),
                (1, ShiftType::Morning, 0),
            ],
        );
        let decoded = SolutionDecoder::new(&b).decode(&asg);
        let day = decoded.roster.day(0).unwrap();
        assert_eq!(day.night.index(), Some(0));
        assert_eq!(day.morning.index(), Some(1));
        assert!(decoded.timelines[1].holds(0, ShiftType::Night));
        assert_eq!(decoded.timelines[1].working_count(), 2);
    }

    #[test]
    fn test_no_solution_decodes_empty() {
        let b = built(3);
        let response = SolverResponse::unsolved(SolveStatus::Infeasible, SearchStats::default());
        let decoded = SolutionDecoder::new(&b).decode_response(&response);
        assert!(decoded.is_empty());
        assert!(decoded.timelines.is_empty());
    }
}
