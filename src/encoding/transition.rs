//! Day-to-day shift transitions.

use crate::cp::CpModel;
use crate::models::TransitionRule;

use super::{BoolPenalty, WorkGrid};

/// Forbids or charges a shift on one day followed by another shift the
/// next day.
#[derive(Debug, Clone, Copy)]
pub struct TransitionPenaltyEncoder {
    rule: TransitionRule,
}

impl TransitionPenaltyEncoder {
    pub fn new(rule: TransitionRule) -> Self {
        Self { rule }
    }

    /// Applies the rule to `row` of the grid for every consecutive day pair.
    pub fn encode(
        &self,
        model: &mut CpModel,
        grid: &WorkGrid,
        row: usize,
        prefix: &str,
    ) -> Vec<BoolPenalty> {
        let TransitionRule { from, to, cost } = self.rule;
        let mut penalties = Vec::new();
        for day in 0..grid.days().saturating_sub(1) {
            let mut clause = vec![!grid.var(row, from, day), !grid.var(row, to, day + 1)];
            if self.rule.is_forbidden() {
                model.add_bool_or(clause);
            } else {
                let lit = model.new_bool_var(format!(
                    "{prefix}: transition({from} -> {to}, day {day})"
                ));
                clause.push(lit.lit());
                model.add_bool_or(clause);
                penalties.push(BoolPenalty::new(lit, cost));
            }
        }
        penalties
    }
}
