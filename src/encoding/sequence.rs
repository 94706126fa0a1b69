//! Run-length bounds on a boolean timeline.
//!
//! Looks at every maximal run of consecutive `true` values. Runs shorter
//! than `hard_min` or longer than `hard_max` are forbidden; runs shorter
//! than `soft_min` or longer than `soft_max` are allowed at a linear cost.
//!
//! # Encoding
//!
//! A run of exactly `length` starting at `start` is excluded by the clause
//! "some day of the span is false, or a neighbour of the span is true".
//! Soft violations add a fresh literal to that clause; the literal is
//! forced true when the run occurs and carries the cost.

use crate::cp::{BoolVar, CpModel, Literal};
use crate::models::SoftBounds;

use super::BoolPenalty;

/// Encodes run-length bounds for one timeline at a time.
#[derive(Debug, Clone, Copy)]
pub struct SequenceConstraintEncoder {
    bounds: SoftBounds,
}

impl SequenceConstraintEncoder {
    pub fn new(bounds: SoftBounds) -> Self {
        Self { bounds }
    }

    /// Adds the run constraints over `works` to `model`.
    ///
    /// Returns the penalty literals with their costs. `prefix` labels the
    /// created literals.
    pub fn encode(&self, model: &mut CpModel, works: &[BoolVar], prefix: &str) -> Vec<BoolPenalty> {
        let b = self.bounds;
        let n = works.len();
        let hard_min = to_len(b.hard_min);
        let soft_min = to_len(b.soft_min);
        let soft_max = to_len(b.soft_max);
        let hard_max = to_len(b.hard_max);
        let mut penalties = Vec::new();

        // Too short: forbidden.
        for length in 1..hard_min.min(n + 1) {
            for start in 0..=(n - length) {
                model.add_bool_or(negated_bounded_span(works, start, length));
            }
        }

        // Short of the soft minimum: penalized by the missing length.
        if b.min_cost > 0 {
            for length in hard_min.max(1)..soft_min.min(n + 1) {
                let cost = b.min_cost * (b.soft_min - length as i64);
                for start in 0..=(n - length) {
                    let lit = model.new_bool_var(format!(
                        "{prefix}: under_span(start={start}, length={length})"
                    ));
                    let mut span = negated_bounded_span(works, start, length);
                    span.push(lit.lit());
                    model.add_bool_or(span);
                    penalties.push(BoolPenalty::new(lit, cost));
                }
            }
        }

        // Over the soft maximum: penalized by the extra length.
        if b.max_cost > 0 {
            for length in soft_max.saturating_add(1).max(1)..=hard_max.min(n) {
                let cost = b.max_cost * (length as i64 - b.soft_max);
                for start in 0..=(n - length) {
                    let lit = model.new_bool_var(format!(
                        "{prefix}: over_span(start={start}, length={length})"
                    ));
                    let mut span = negated_bounded_span(works, start, length);
                    span.push(lit.lit());
                    model.add_bool_or(span);
                    penalties.push(BoolPenalty::new(lit, cost));
                }
            }
        }

        // Too long: any window of hard_max + 1 must contain a false.
        if n > hard_max {
            for start in 0..(n - hard_max) {
                model.add_bool_or(works[start..=start + hard_max].iter().map(|&v| !v));
            }
        }

        penalties
    }
}

#[inline]
fn to_len(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

/// Literals whose disjunction is false exactly when `works[start..start+length]`
/// is an isolated run of `true`: bounded by `false` or the sequence edges.
pub fn negated_bounded_span(works: &[BoolVar], start: usize, length: usize) -> Vec<Literal> {
    let mut span = Vec::with_capacity(length + 2);
    if start > 0 {
        span.push(works[start - 1].lit());
    }
    span.extend(works[start..start + length].iter().map(|&v| !v));
    if start + length < works.len() {
        span.push(works[start + length].lit());
    }
    span
}
