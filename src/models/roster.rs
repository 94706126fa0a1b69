//! Roster (solution) model.
//!
//! A roster lists, for every day of the horizon, who holds the morning
//! and the night shift. `Off` is implicit. An empty roster means no
//! solution was accepted; it is never the same thing as a roster whose
//! slots are all unfilled.

use serde::{Deserialize, Serialize};

use super::{Participant, ShiftType};

/// Holder of a single shift slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assignee {
    /// A real employee.
    Employee { index: usize, name: String },
    /// Nobody was available; the slot was absorbed by slack.
    Unfilled,
}

impl Assignee {
    /// Employee index, or `None` for an unfilled slot.
    pub fn index(&self) -> Option<usize> {
        match self {
            Assignee::Employee { index, .. } => Some(*index),
            Assignee::Unfilled => None,
        }
    }

    #[inline]
    pub fn is_unfilled(&self) -> bool {
        matches!(self, Assignee::Unfilled)
    }
}

/// Both working shifts of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDay {
    /// Zero-based day index.
    pub day: usize,
    pub morning: Assignee,
    pub night: Assignee,
}

impl RosterDay {
    /// Holder of the given working shift. `Off` has no holder.
    pub fn assignee(&self, shift: ShiftType) -> Option<&Assignee> {
        match shift {
            ShiftType::Morning => Some(&self.morning),
            ShiftType::Night => Some(&self.night),
            ShiftType::Off => None,
        }
    }
}

/// A complete roster over the horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub days: Vec<RosterDay>,
}

impl Roster {
    /// Creates an empty roster (the "no solution" value).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a day.
    pub fn push_day(&mut self, day: RosterDay) {
        self.days.push(day);
    }

    /// Whether the roster carries no days at all.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Day at `index`.
    pub fn day(&self, index: usize) -> Option<&RosterDay> {
        self.days.get(index)
    }

    /// Number of slots left to slack.
    pub fn unfilled_count(&self) -> usize {
        self.days
            .iter()
            .map(|d| usize::from(d.morning.is_unfilled()) + usize::from(d.night.is_unfilled()))
            .sum()
    }

    /// Number of slots held by the employee at `index`.
    pub fn shift_count(&self, index: usize) -> usize {
        self.days
            .iter()
            .map(|d| {
                usize::from(d.morning.index() == Some(index))
                    + usize::from(d.night.index() == Some(index))
            })
            .sum()
    }

    /// Whether the employee at `index` holds any slot on `day`.
    pub fn works_on(&self, index: usize, day: usize) -> bool {
        self.day(day).is_some_and(|d| {
            d.morning.index() == Some(index) || d.night.index() == Some(index)
        })
    }

    /// Exchange form: `[morning, night]` per day, employee index or `null`.
    pub fn to_pairs(&self) -> Vec<[Option<usize>; 2]> {
        self.days
            .iter()
            .map(|d| [d.morning.index(), d.night.index()])
            .collect()
    }
}

/// Every shift a participant holds, day by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub participant: Participant,
    pub name: String,
    /// Shift types held on each day (more than one only for double shifts).
    pub days: Vec<Vec<ShiftType>>,
}

impl Timeline {
    /// Number of working shifts over the horizon.
    pub fn working_count(&self) -> usize {
        self.days
            .iter()
            .flatten()
            .filter(|s| s.is_working())
            .count()
    }

    /// Whether `shift` is held on `day`.
    pub fn holds(&self, day: usize, shift: ShiftType) -> bool {
        self.days.get(day).is_some_and(|d| d.contains(&shift))
    }

    /// Whether any working shift is held on `day`.
    pub fn works_on(&self, day: usize) -> bool {
        self.days
            .get(day)
            .is_some_and(|d| d.iter().any(|s| s.is_working()))
    }

    /// Compact rendering, one code per shift, days separated by spaces.
    pub fn render(&self) -> String {
        self.days
            .iter()
            .map(|d| d.iter().map(|s| s.code()).collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An active objective term in a solved roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyReport {
    /// Label of the penalized variable.
    pub name: String,
    /// Variable value (1 for literals, the violation amount for counters).
    pub amount: i64,
    /// Objective coefficient; negative values are rewards.
    pub coefficient: i64,
}

impl PenaltyReport {
    /// Contribution to the objective.
    #[inline]
    pub fn cost(&self) -> i64 {
        self.amount * self.coefficient
    }

    /// Whether this term is a fulfilled preference rather than a violation.
    #[inline]
    pub fn is_reward(&self) -> bool {
        self.coefficient < 0
    }
}
