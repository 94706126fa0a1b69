//! Shift types.
//!
//! A day is split into two working shifts plus the implicit rest state.
//! `Off` is a real decision value in the model: choosing it satisfies
//! per-day exclusivity without working.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of shift types an employee can hold on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Not working.
    Off,
    /// Morning shift.
    Morning,
    /// Night shift.
    Night,
}

impl ShiftType {
    /// All shift types in model order.
    pub const ALL: [ShiftType; 3] = [ShiftType::Off, ShiftType::Morning, ShiftType::Night];

    /// Shift types that count as work.
    pub const WORKING: [ShiftType; 2] = [ShiftType::Morning, ShiftType::Night];

    /// Position of this shift type in [`ShiftType::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ShiftType::Off => 0,
            ShiftType::Morning => 1,
            ShiftType::Night => 2,
        }
    }

    /// Whether this shift counts toward workload and cover.
    #[inline]
    pub fn is_working(self) -> bool {
        self != ShiftType::Off
    }

    /// One-letter code used in timelines and variable labels.
    pub fn code(self) -> char {
        match self {
            ShiftType::Off => 'O',
            ShiftType::Morning => 'M',
            ShiftType::Night => 'N',
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftType::Off => "off",
            ShiftType::Morning => "morning",
            ShiftType::Night => "night",
        };
        f.write_str(name)
    }
}
