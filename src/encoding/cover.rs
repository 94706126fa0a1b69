//! Minimum cover per (shift, day) with a charge on surplus staff.

use crate::cp::{CpModel, IntVar, LinearExpr};
use crate::models::ShiftType;

use super::{IntPenalty, WorkGrid};

/// Variables created for one (shift, day) cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverEncoding {
    /// Headcount including the slack row.
    pub worked: IntVar,
    /// Headcount above the floor.
    pub excess: Option<IntPenalty>,
}

/// Encodes `floor <= headcount` and the surplus penalty for one cell.
#[derive(Debug, Clone, Copy)]
pub struct CoverDemandEncoder {
    floor: i64,
    rate: i64,
}

impl CoverDemandEncoder {
    pub fn new(floor: i64, rate: i64) -> Self {
        Self { floor, rate }
    }

    pub fn encode(
        &self,
        model: &mut CpModel,
        grid: &WorkGrid,
        shift: ShiftType,
        day: usize,
    ) -> CoverEncoding {
        let column = grid.column(shift, day);
        let rows = column.len() as i64;

        let worked = model.new_int_var(self.floor, rows, format!("worked({shift}, day {day})"));
        model.add_linear_eq(worked, LinearExpr::sum_of(column));

        let excess = (self.rate > 0).then(|| {
            let var = model.new_int_var(
                0,
                (rows - self.floor).max(0),
                format!("excess_demand({shift}, day {day})"),
            );
            model.add_linear_eq(var, LinearExpr::new().with_int(worked, 1).plus(-self.floor));
            IntPenalty::new(var, self.rate)
        });

        CoverEncoding { worked, excess }
    }
}
