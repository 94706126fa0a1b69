//! Rostering policy.
//!
//! Collects every staffing rule the encoders translate: request weights,
//! run-length and weekly-count rules, shift transitions, the weekly cover
//! table and the excess-cover rates. Defaults reproduce a small clinic
//! roster: one person per shift every day, night-to-morning forbidden.

use serde::{Deserialize, Serialize};

use super::ShiftType;

/// Hard and soft bounds with linear violation costs.
///
/// Values outside `[hard_min, hard_max]` are forbidden. Values below
/// `soft_min` cost `min_cost` per missing unit, values above `soft_max`
/// cost `max_cost` per extra unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftBounds {
    pub hard_min: i64,
    pub soft_min: i64,
    pub min_cost: i64,
    pub soft_max: i64,
    pub hard_max: i64,
    pub max_cost: i64,
}

impl SoftBounds {
    /// Creates bounds from the full six-tuple.
    pub fn new(
        hard_min: i64,
        soft_min: i64,
        min_cost: i64,
        soft_max: i64,
        hard_max: i64,
        max_cost: i64,
    ) -> Self {
        Self {
            hard_min,
            soft_min,
            min_cost,
            soft_max,
            hard_max,
            max_cost,
        }
    }

    /// Purely hard bounds: no soft zone, no costs.
    pub fn hard(min: i64, max: i64) -> Self {
        Self::new(min, min, 0, max, max, 0)
    }

    /// Whether `0 <= hard_min <= soft_min`, `soft_max <= hard_max`,
    /// `hard_min <= hard_max` and both costs are non-negative.
    pub fn is_consistent(&self) -> bool {
        self.hard_min >= 0
            && self.hard_min <= self.soft_min
            && self.soft_max <= self.hard_max
            && self.hard_min <= self.hard_max
            && self.min_cost >= 0
            && self.max_cost >= 0
    }
}

/// A bound rule attached to one shift type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRule {
    pub shift: ShiftType,
    pub bounds: SoftBounds,
}

impl ShiftRule {
    pub fn new(shift: ShiftType, bounds: SoftBounds) -> Self {
        Self { shift, bounds }
    }
}

/// A penalized or forbidden day-to-day shift change.
///
/// A `cost` of zero forbids the transition outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub from: ShiftType,
    pub to: ShiftType,
    pub cost: i64,
}

impl TransitionRule {
    /// Forbids `from` on one day followed by `to` the next day.
    pub fn forbidden(from: ShiftType, to: ShiftType) -> Self {
        Self { from, to, cost: 0 }
    }

    /// Charges `cost` whenever `from` is followed by `to`.
    pub fn penalized(from: ShiftType, to: ShiftType, cost: i64) -> Self {
        Self { from, to, cost }
    }

    #[inline]
    pub fn is_forbidden(&self) -> bool {
        self.cost == 0
    }
}

/// Minimum headcount per working shift for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverDemand {
    pub morning: i64,
    pub night: i64,
}

impl CoverDemand {
    pub fn new(morning: i64, night: i64) -> Self {
        Self { morning, night }
    }

    /// Floor for `shift`; `Off` has none.
    pub fn for_shift(&self, shift: ShiftType) -> i64 {
        match shift {
            ShiftType::Morning => self.morning,
            ShiftType::Night => self.night,
            ShiftType::Off => 0,
        }
    }
}

/// Cost per person above the cover floor, per working shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcessCoverRates {
    pub morning: i64,
    pub night: i64,
}

impl ExcessCoverRates {
    pub fn rate(&self, shift: ShiftType) -> i64 {
        match shift {
            ShiftType::Morning => self.morning,
            ShiftType::Night => self.night,
            ShiftType::Off => 0,
        }
    }
}

impl Default for ExcessCoverRates {
    fn default() -> Self {
        Self {
            morning: 2,
            night: 2,
        }
    }
}

/// Linear costs for missing or extra shifts against the desired range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadCosts {
    pub under: i64,
    pub over: i64,
}

impl Default for WorkloadCosts {
    fn default() -> Self {
        Self { under: 2, over: 2 }
    }
}

/// Number of weekdays in the cover table.
pub const DAYS_PER_WEEK: usize = 7;

/// Full set of rules applied when encoding a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterPolicy {
    /// Objective weight of a preferred (day, shift) being worked.
    pub preference_weight: i64,
    /// Objective weight of an unavailable (day, shift) being worked.
    pub unavailable_weight: i64,
    /// Costs on the total-shift count of each participant.
    pub workload_costs: WorkloadCosts,
    /// Run-length rules per shift type.
    pub sequence_rules: Vec<ShiftRule>,
    /// Per-week count rules per shift type.
    pub weekly_sum_rules: Vec<ShiftRule>,
    /// Day-to-day transition rules.
    pub transitions: Vec<TransitionRule>,
    /// Cover floors, Monday first.
    pub weekly_cover: Vec<CoverDemand>,
    /// Cost per person above the floor.
    pub excess_cover: ExcessCoverRates,
}

impl Default for RosterPolicy {
    fn default() -> Self {
        Self {
            preference_weight: -2,
            unavailable_weight: 10,
            workload_costs: WorkloadCosts::default(),
            sequence_rules: Vec::new(),
            weekly_sum_rules: Vec::new(),
            transitions: vec![TransitionRule::forbidden(ShiftType::Night, ShiftType::Morning)],
            weekly_cover: vec![CoverDemand::new(1, 1); DAYS_PER_WEEK],
            excess_cover: ExcessCoverRates::default(),
        }
    }
}

impl RosterPolicy {
    /// Adds a run-length rule.
    pub fn with_sequence_rule(mut self, rule: ShiftRule) -> Self {
        self.sequence_rules.push(rule);
        self
    }

    /// Adds a weekly count rule.
    pub fn with_weekly_sum_rule(mut self, rule: ShiftRule) -> Self {
        self.weekly_sum_rules.push(rule);
        self
    }

    /// Replaces the transition rules.
    pub fn with_transitions(mut self, transitions: Vec<TransitionRule>) -> Self {
        self.transitions = transitions;
        self
    }

    /// Replaces the weekly cover table.
    pub fn with_weekly_cover(mut self, cover: Vec<CoverDemand>) -> Self {
        self.weekly_cover = cover;
        self
    }

    /// Cover floor for `shift` on horizon day `day` (weekday = `day % 7`).
    pub fn cover_floor(&self, shift: ShiftType, day: usize) -> i64 {
        self.weekly_cover
            .get(day % DAYS_PER_WEEK)
            .map_or(0, |demand| demand.for_shift(shift))
    }

    /// Lists every inconsistency in the policy.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.weekly_cover.len() != DAYS_PER_WEEK {
            problems.push(format!(
                "weekly cover table has {} entries, expected {DAYS_PER_WEEK}",
                self.weekly_cover.len()
            ));
        }
        for (i, demand) in self.weekly_cover.iter().enumerate() {
            if demand.morning < 0 || demand.night < 0 {
                problems.push(format!("negative cover demand on weekday {i}"));
            }
        }
        if self.excess_cover.morning < 0 || self.excess_cover.night < 0 {
            problems.push("negative excess cover rate".to_string());
        }
        if self.workload_costs.under < 0 || self.workload_costs.over < 0 {
            problems.push("negative workload cost".to_string());
        }
        for rule in self.sequence_rules.iter().chain(&self.weekly_sum_rules) {
            if !rule.bounds.is_consistent() {
                problems.push(format!(
                    "inconsistent bounds for {} rule: {:?}",
                    rule.shift, rule.bounds
                ));
            }
        }
        for t in &self.transitions {
            if t.cost < 0 {
                problems.push(format!("negative cost on {} -> {} transition", t.from, t.to));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let p = RosterPolicy::default();
        assert_eq!(p.preference_weight, -2);
        assert_eq!(p.unavailable_weight, 10);
        assert_eq!(p.weekly_cover.len(), 7);
        assert_eq!(p.transitions.len(), 1);
        assert!(p.transitions[0].is_forbidden());
        assert_eq!(p.transitions[0].from, ShiftType::Night);
        assert_eq!(p.transitions[0].to, ShiftType::Morning);
        assert!(p.sequence_rules.is_empty());
        assert!(p.problems().is_empty());
    }

    #[test]
    fn test_cover_floor_repeats_weekly() {
        let mut cover = vec![CoverDemand::new(1, 1); 7];
        cover[0] = CoverDemand::new(3, 2);
        let p = RosterPolicy::default().with_weekly_cover(cover);
        assert_eq!(p.cover_floor(ShiftType::Morning, 0), 3);
        assert_eq!(p.cover_floor(ShiftType::Morning, 7), 3);
        assert_eq!(p.cover_floor(ShiftType::Night, 14), 2);
        assert_eq!(p.cover_floor(ShiftType::Night, 15), 1);
        assert_eq!(p.cover_floor(ShiftType::Off, 0), 0);
    }

    #[test]
    fn test_soft_bounds_consistency() {
        assert!(SoftBounds::new(1, 2, 20, 3, 4, 5).is_consistent());
        assert!(SoftBounds::hard(0, 7).is_consistent());
        assert!(!SoftBounds::new(3, 2, 1, 4, 5, 1).is_consistent());
        assert!(!SoftBounds::new(0, 0, 0, 5, 4, 1).is_consistent());
        assert!(!SoftBounds::new(0, 1, -1, 2, 3, 0).is_consistent());
    }

    #[test]
    fn test_problems_reported() {
        let p = RosterPolicy::default()
            .with_weekly_cover(vec![CoverDemand::new(1, -1); 3])
            .with_sequence_rule(ShiftRule::new(
                ShiftType::Night,
                SoftBounds::new(4, 2, 0, 1, 1, 0),
            ));
        let problems = p.problems();
        assert_eq!(problems.len(), 5);
        assert!(problems[0].contains("3 entries"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p: RosterPolicy = serde_json::from_str(r#"{"unavailable_weight": 50}"#).unwrap();
        assert_eq!(p.unavailable_weight, 50);
        assert_eq!(p.preference_weight, -2);
        assert_eq!(p.weekly_cover.len(), 7);
    }
}
