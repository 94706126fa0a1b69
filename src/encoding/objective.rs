//! Objective assembly.

use crate::cp::{Assignment, CpModel, LinearExpr};

use super::{BoolPenalty, IntPenalty};

/// Every weighted term of a roster objective.
///
/// Negative coefficients are rewards for fulfilled preferences, positive
/// ones are costs for violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PenaltyLedger {
    pub bool_terms: Vec<BoolPenalty>,
    pub int_terms: Vec<IntPenalty>,
}

impl PenaltyLedger {
    pub fn len(&self) -> usize {
        self.bool_terms.len() + self.int_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bool_terms.is_empty() && self.int_terms.is_empty()
    }

    /// `Σ literal × coefficient + Σ variable × coefficient`.
    pub fn to_expr(&self) -> LinearExpr {
        let expr = self
            .bool_terms
            .iter()
            .fold(LinearExpr::new(), |e, t| e.with_bool(t.var, t.coefficient));
        self.int_terms
            .iter()
            .fold(expr, |e, t| e.with_int(t.var, t.coefficient))
    }

    /// Objective value under a full assignment.
    pub fn evaluate(&self, assignment: &Assignment) -> i64 {
        self.to_expr().evaluate(assignment)
    }
}

/// Collects penalty terms from the encoders and installs the objective.
#[derive(Debug, Default)]
pub struct ObjectiveAssembler {
    ledger: PenaltyLedger,
}

impl ObjectiveAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bool(&mut self, term: BoolPenalty) {
        self.ledger.bool_terms.push(term);
    }

    pub fn extend_bool(&mut self, terms: impl IntoIterator<Item = BoolPenalty>) {
        self.ledger.bool_terms.extend(terms);
    }

    pub fn add_int(&mut self, term: IntPenalty) {
        self.ledger.int_terms.push(term);
    }

    pub fn extend_int(&mut self, terms: impl IntoIterator<Item = IntPenalty>) {
        self.ledger.int_terms.extend(terms);
    }

    /// Sets the model objective to the sum of all collected terms and
    /// returns them.
    pub fn assemble(self, model: &mut CpModel) -> PenaltyLedger {
        model.minimize(self.ledger.to_expr());
        self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_sets_objective() {
        let mut m = CpModel::new("t");
        let a = m.new_bool_var("a");
        let b = m.new_bool_var("b");
        let x = m.new_int_var(0, 5, "x");

        let mut assembler = ObjectiveAssembler::new();
        assembler.add_bool(BoolPenalty::new(a, -2));
        assembler.extend_bool([BoolPenalty::new(b, 10)]);
        assembler.add_int(IntPenalty::new(x, 3));
        let ledger = assembler.assemble(&mut m);

        assert_eq!(ledger.len(), 3);
        assert_eq!(m.objective(), &ledger.to_expr());

        let asg = Assignment::new(vec![true, true], vec![2]);
        assert_eq!(ledger.evaluate(&asg), -2 + 10 + 6);
        assert_eq!(m.objective_value(&asg), 14);
    }

    #[test]
    fn test_empty_ledger() {
        let mut m = CpModel::new("t");
        let ledger = ObjectiveAssembler::new().assemble(&mut m);
        assert!(ledger.is_empty());
        assert_eq!(m.objective_value(&Assignment::default()), 0);
    }
}
