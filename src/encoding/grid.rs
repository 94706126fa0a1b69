//! Work grid: one boolean per (participant, shift type, day).

use crate::cp::{BoolVar, CpModel};
use crate::models::{Participant, ShiftType};

/// The decision variables of a roster model.
///
/// Rows are participants (employees in roster order, then the slack row),
/// columns are shift types × days. Variables are created row by row, shift
/// by shift, day by day.
#[derive(Debug, Clone, Default)]
pub struct WorkGrid {
    participants: Vec<Participant>,
    days: usize,
    vars: Vec<BoolVar>,
}

impl WorkGrid {
    /// Creates all work variables in `model`.
    pub fn new(model: &mut CpModel, participants: Vec<Participant>, days: usize) -> Self {
        let mut vars = Vec::with_capacity(participants.len() * ShiftType::ALL.len() * days);
        for participant in &participants {
            for shift in ShiftType::ALL {
                for day in 0..days {
                    let name = format!("work({participant}, {shift}, day {day})");
                    vars.push(model.new_bool_var(name));
                }
            }
        }
        Self {
            participants,
            days,
            vars,
        }
    }

    /// Number of rows (participants).
    pub fn rows(&self) -> usize {
        self.participants.len()
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Row holding `participant`.
    pub fn row_of(&self, participant: Participant) -> Option<usize> {
        self.participants.iter().position(|p| *p == participant)
    }

    /// Rows of real employees.
    pub fn employee_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.participants
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_unfilled())
            .map(|(row, _)| row)
    }

    /// Work variable of `row` holding `shift` on `day`.
    ///
    /// # Panics
    /// Panics if any index is outside the grid.
    #[inline]
    pub fn var(&self, row: usize, shift: ShiftType, day: usize) -> BoolVar {
        assert!(row < self.rows() && day < self.days, "work grid index out of range");
        self.vars[(row * ShiftType::ALL.len() + shift.index()) * self.days + day]
    }

    /// One row's variables for `shift`, in day order.
    pub fn timeline(&self, row: usize, shift: ShiftType) -> Vec<BoolVar> {
        (0..self.days).map(|d| self.var(row, shift, d)).collect()
    }

    /// Every row's variable for `shift` on `day`.
    pub fn column(&self, shift: ShiftType, day: usize) -> Vec<BoolVar> {
        (0..self.rows()).map(|r| self.var(r, shift, day)).collect()
    }

    /// One row's working-shift variables for `days`, day by day.
    pub fn working(&self, row: usize, days: std::ops::Range<usize>) -> Vec<BoolVar> {
        days.flat_map(|d| ShiftType::WORKING.into_iter().map(move |s| (d, s)))
            .map(|(d, s)| self.var(row, s, d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(model: &mut CpModel) -> WorkGrid {
        WorkGrid::new(
            model,
            vec![Participant::Employee(0), Participant::Employee(1), Participant::Unfilled],
            4,
        )
    }

    #[test]
    fn test_grid_creates_all_variables() {
        let mut m = CpModel::new("t");
        let g = grid(&mut m);
        assert_eq!(m.bool_var_count(), 3 * 3 * 4);
        assert_eq!(g.rows(), 3);
        assert_eq!(g.days(), 4);
    }

    #[test]
    fn test_var_indexing_and_names() {
        let mut m = CpModel::new("t");
        let g = grid(&mut m);
        assert_eq!(g.var(0, ShiftType::Off, 0).index(), 0);
        assert_eq!(g.var(0, ShiftType::Morning, 0).index(), 4);
        assert_eq!(g.var(1, ShiftType::Off, 0).index(), 12);
        assert_eq!(m.bool_name(g.var(2, ShiftType::Night, 3)), "work(Unfilled, night, day 3)");
    }

    #[test]
    fn test_slices() {
        let mut m = CpModel::new("t");
        let g = grid(&mut m);
        assert_eq!(g.timeline(1, ShiftType::Night).len(), 4);
        assert_eq!(g.column(ShiftType::Morning, 2).len(), 3);
        let w = g.working(0, 1..3);
        assert_eq!(
            w,
            vec![
                g.var(0, ShiftType::Morning, 1),
                g.var(0, ShiftType::Night, 1),
                g.var(0, ShiftType::Morning, 2),
                g.var(0, ShiftType::Night, 2),
            ]
        );
        assert_eq!(g.employee_rows().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(g.row_of(Participant::Unfilled), Some(2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let mut m = CpModel::new("t");
        let g = grid(&mut m);
        g.var(0, ShiftType::Off, 4);
    }
}
