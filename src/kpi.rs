//! Roster quality metrics (KPIs).
//!
//! Computes staffing indicators from a decoded roster, its timelines and
//! the employees. Per-employee figures come from the timelines, so a slot
//! shared by two employees counts for both.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Unfilled Slots | Working slots left to slack |
//! | Fill Rate | Filled slots / all slots |
//! | Shifts per Employee | Slots held by each employee |
//! | Preferences Honoured | Preferred days on which the employee works |
//! | Unavailability Violations | Unavailable days on which the employee works |
//! | Workload Violations | Employees outside their desired range |
//!
//! Day-level requests are counted once per day, whatever the shift.
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models"

use std::collections::HashMap;

use crate::models::{Employee, Participant, Roster, Timeline};

/// Roster performance indicators.
#[derive(Debug, Clone)]
pub struct RosterKpi {
    /// Number of working slots (two per day).
    pub total_slots: usize,
    /// Slots absorbed by slack.
    pub unfilled_slots: usize,
    /// Fraction of slots held by real employees (0.0..1.0).
    pub fill_rate: f64,
    /// Slots held per employee name.
    pub shifts_by_employee: HashMap<String, usize>,
    /// Preferred in-horizon days that were worked.
    pub preferences_honoured: usize,
    /// Preferred in-horizon days that were not worked.
    pub preferences_missed: usize,
    /// Unavailable in-horizon days that were worked anyway.
    pub unavailable_violations: usize,
    /// Employees whose slot count lies outside `[min, max]`.
    pub workload_violations: usize,
}

impl RosterKpi {
    /// Computes KPIs from a decoded roster.
    ///
    /// # Arguments
    /// * `roster` - The decoded roster (slot totals and unfilled slots).
    /// * `timelines` - Timelines from the same solve (per-employee counts).
    /// * `employees` - The employees, indexed as in the roster.
    pub fn calculate(roster: &Roster, timelines: &[Timeline], employees: &[Employee]) -> Self {
        let total_slots = roster.len() * 2;
        let unfilled_slots = roster.unfilled_count();

        let mut shifts_by_employee = HashMap::new();
        let mut preferences_honoured = 0;
        let mut preferences_missed = 0;
        let mut unavailable_violations = 0;
        let mut workload_violations = 0;

        for employee in employees {
            let timeline = timelines
                .iter()
                .find(|t| t.participant == Participant::Employee(employee.index));
            let works_on = |day: usize| timeline.is_some_and(|t| t.works_on(day));
            let count = timeline.map_or(0, Timeline::working_count);
            shifts_by_employee.insert(employee.name.clone(), count);
            if !employee.desired.contains(count as i64) {
                workload_violations += 1;
            }

            for &day in employee.preferred_days.iter().filter(|&&d| d < roster.len()) {
                if works_on(day) {
                    preferences_honoured += 1;
                } else {
                    preferences_missed += 1;
                }
            }
            unavailable_violations += employee
                .unavailable_days
                .iter()
                .filter(|&&d| works_on(d))
                .count();
        }

        let fill_rate = if total_slots == 0 {
            1.0
        } else {
            (total_slots - unfilled_slots) as f64 / total_slots as f64
        };

        Self {
            total_slots,
            unfilled_slots,
            fill_rate,
            shifts_by_employee,
            preferences_honoured,
            preferences_missed,
            unavailable_violations,
            workload_violations,
        }
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_unfilled: usize, min_fill_rate: f64) -> bool {
        self.unfilled_slots <= max_unfilled
            && self.fill_rate >= min_fill_rate
            && self.workload_violations == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignee, EmployeeRecord, RosterDay, ShiftType};

    const M: ShiftType = ShiftType::Morning;
    const N: ShiftType = ShiftType::Night;
    const O: ShiftType = ShiftType::Off;

    fn ana() -> Assignee {
        Assignee::Employee {
            index: 0,
            name: "Ana".into(),
        }
    }

    fn ben() -> Assignee {
        Assignee::Employee {
            index: 1,
            name: "Ben".into(),
        }
    }

    fn roster(days: Vec<(Assignee, Assignee)>) -> Roster {
        let mut r = Roster::new();
        for (day, (morning, night)) in days.into_iter().enumerate() {
            r.push_day(RosterDay { day, morning, night });
        }
        r
    }

    fn timeline(index: usize, name: &str, days: &[&[ShiftType]]) -> Timeline {
        Timeline {
            participant: Participant::Employee(index),
            name: name.into(),
            days: days.iter().map(|d| d.to_vec()).collect(),
        }
    }

    #[test]
    fn test_kpi_basic() {
        let employees = Employee::roster_from_records(&[
            EmployeeRecord::new("Ana", 0, 10)
                .with_preferred(vec![0, 2, 30])
                .with_unavailable(vec![1]),
            EmployeeRecord::new("Ben", 2, 10),
        ]);
        let r = roster(vec![
            (ana(), ben()),
            (ana(), Assignee::Unfilled),
            (ben(), Assignee::Unfilled),
        ]);
        let timelines = vec![
            timeline(0, "Ana", &[&[M], &[M], &[O]]),
            timeline(1, "Ben", &[&[N], &[O], &[M]]),
        ];
        let kpi = RosterKpi::calculate(&r, &timelines, &employees);

        assert_eq!(kpi.total_slots, 6);
        assert_eq!(kpi.unfilled_slots, 2);
        assert!((kpi.fill_rate - 4.0 / 6.0).abs() < 1e-10);
        assert_eq!(kpi.shifts_by_employee["Ana"], 2);
        assert_eq!(kpi.shifts_by_employee["Ben"], 2);
        assert_eq!(kpi.preferences_honoured, 1);
        assert_eq!(kpi.preferences_missed, 1);
        assert_eq!(kpi.unavailable_violations, 1);
        assert_eq!(kpi.workload_violations, 0);
    }

    #[test]
    fn test_shared_slot_counts_for_both() {
        let employees = Employee::roster_from_records(&[
            EmployeeRecord::new("Ana", 0, 10),
            EmployeeRecord::new("Ben", 1, 10).with_unavailable(vec![0]),
        ]);
        // Both hold the morning of day 0; the roster reports Ana only.
        let r = roster(vec![(ana(), Assignee::Unfilled)]);
        let timelines = vec![timeline(0, "Ana", &[&[M]]), timeline(1, "Ben", &[&[M]])];
        let kpi = RosterKpi::calculate(&r, &timelines, &employees);

        assert_eq!(kpi.shifts_by_employee["Ana"], 1);
        assert_eq!(kpi.shifts_by_employee["Ben"], 1);
        assert_eq!(kpi.unavailable_violations, 1);
        assert_eq!(kpi.workload_violations, 0);
    }

    #[test]
    fn test_kpi_workload_violation() {
        let employees = Employee::roster_from_records(&[EmployeeRecord::new("Ana", 3, 10)]);
        let r = roster(vec![(ana(), Assignee::Unfilled)]);
        let timelines = vec![timeline(0, "Ana", &[&[M]])];
        let kpi = RosterKpi::calculate(&r, &timelines, &employees);
        assert_eq!(kpi.workload_violations, 1);
        assert!(!kpi.meets_thresholds(5, 0.0));
    }

    #[test]
    fn test_kpi_empty_roster() {
        let kpi = RosterKpi::calculate(&Roster::new(), &[], &[]);
        assert_eq!(kpi.total_slots, 0);
        assert_eq!(kpi.fill_rate, 1.0);
        assert!(kpi.meets_thresholds(0, 1.0));
    }

    #[test]
    fn test_thresholds() {
        let employees = Employee::roster_from_records(&[EmployeeRecord::new("Ana", 0, 10)]);
        let r = roster(vec![(ana(), Assignee::Unfilled), (ana(), ana())]);
        let timelines = vec![timeline(0, "Ana", &[&[M], &[M, N]])];
        let kpi = RosterKpi::calculate(&r, &timelines, &employees);
        assert_eq!(kpi.shifts_by_employee["Ana"], 3);
        assert!(kpi.meets_thresholds(1, 0.75));
        assert!(!kpi.meets_thresholds(0, 0.75));
        assert!(!kpi.meets_thresholds(1, 0.9));
    }
}
