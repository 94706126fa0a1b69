//! Roster encoding.
//!
//! Translates employees and a [`RosterPolicy`](crate::models::RosterPolicy)
//! into a [`CpModel`](crate::cp::CpModel): hard rules become constraints,
//! soft rules become weighted penalty terms of a single minimized objective.

mod builder;
mod cover;
mod grid;
mod objective;
mod sequence;
mod sum;
mod transition;

pub use builder::{ModelBuilder, RosterModel};
pub use cover::{CoverDemandEncoder, CoverEncoding};
pub use grid::WorkGrid;
pub use objective::{ObjectiveAssembler, PenaltyLedger};
pub use sequence::{negated_bounded_span, SequenceConstraintEncoder};
pub use sum::{SumConstraintEncoder, SumEncoding};
pub use transition::TransitionPenaltyEncoder;

use crate::cp::{BoolVar, IntVar};

/// A variable with its signed objective coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyTerm<V> {
    pub var: V,
    pub coefficient: i64,
}

impl<V> PenaltyTerm<V> {
    pub fn new(var: V, coefficient: i64) -> Self {
        Self { var, coefficient }
    }
}

/// Penalty on a literal being true.
pub type BoolPenalty = PenaltyTerm<BoolVar>;

/// Penalty per unit of an integer variable.
pub type IntPenalty = PenaltyTerm<IntVar>;
