//! Solver oracle contract.
//!
//! The search engine is an external collaborator: anything that can take
//! a [`CpModel`], respect its hard constraints and minimize its objective
//! implements [`SolverOracle`]. Encoding and decoding never depend on
//! which backend runs.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use super::model::{Assignment, CpModel};

/// Outcome class of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Best possible objective, proven.
    Optimal,
    /// A solution was found but optimality was not proven (limit hit).
    Feasible,
    /// No assignment satisfies the hard constraints.
    Infeasible,
    /// A limit was hit before any solution was found.
    Unknown,
}

impl SolveStatus {
    /// Whether the response carries an assignment.
    #[inline]
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Search limits and reproducibility settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveParams {
    /// Wall-clock budget. `None` searches to completion.
    pub time_limit: Option<Duration>,
    /// Maximum number of explored search nodes.
    pub node_limit: Option<u64>,
    /// Seed for randomized tie-breaking. `None` is fully deterministic.
    pub random_seed: Option<u64>,
}

impl SolveParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
}

/// Counters reported by a solve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes explored.
    pub nodes: u64,
    /// Nodes closed by a propagation conflict.
    pub conflicts: u64,
    /// Nodes closed by the objective bound.
    pub pruned: u64,
    /// Improving solutions found.
    pub solutions: u64,
    /// Wall time spent.
    pub elapsed: Duration,
}

/// What a solve call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResponse {
    pub status: SolveStatus,
    /// Present exactly when `status.has_solution()`.
    pub assignment: Option<Assignment>,
    /// Objective of `assignment`.
    pub objective: Option<i64>,
    pub stats: SearchStats,
}

impl SolverResponse {
    /// A response with a solution.
    pub fn solved(
        status: SolveStatus,
        assignment: Assignment,
        objective: i64,
        stats: SearchStats,
    ) -> Self {
        Self {
            status,
            assignment: Some(assignment),
            objective: Some(objective),
            stats,
        }
    }

    /// A response without a solution.
    pub fn unsolved(status: SolveStatus, stats: SearchStats) -> Self {
        Self {
            status,
            assignment: None,
            objective: None,
            stats,
        }
    }
}

/// Notification about an improving solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionEvent {
    /// Zero-based count of improving solutions so far.
    pub index: u64,
    pub objective: i64,
    pub elapsed: Duration,
}

/// Progress hook invoked on every improving solution.
///
/// Observers only see the event; they cannot touch the model or the
/// search, and omitting them changes nothing about the result.
pub trait SolutionObserver {
    fn on_solution(&mut self, event: &SolutionEvent);
}

impl<F> SolutionObserver for F
where
    F: FnMut(&SolutionEvent),
{
    fn on_solution(&mut self, event: &SolutionEvent) {
        self(event)
    }
}

/// Reports improving solutions through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SolutionObserver for LogObserver {
    fn on_solution(&mut self, event: &SolutionEvent) {
        info!(
            event = "solution",
            index = event.index,
            objective = event.objective,
            elapsed_ms = event.elapsed.as_millis() as u64,
        );
    }
}

/// Errors for models an oracle cannot interpret.
///
/// Infeasibility and timeouts are statuses, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("variable index {index} out of range in {context}")]
    InvalidVariable { index: usize, context: String },

    #[error("solver backend failed: {0}")]
    Backend(String),
}

/// The single entry point to a search backend.
pub trait SolverOracle {
    /// Finds an assignment satisfying every hard constraint of `model`
    /// that minimizes its objective, within `params`.
    fn optimize(
        &self,
        model: &CpModel,
        params: &SolveParams,
        observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<SolverResponse, OracleError>;

    /// Backend name for logs.
    fn name(&self) -> &str {
        "oracle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }

    #[test]
    fn test_params_builder() {
        let p = SolveParams::new()
            .with_time_limit(Duration::from_secs(10))
            .with_node_limit(500)
            .with_random_seed(7);
        assert_eq!(p.time_limit, Some(Duration::from_secs(10)));
        assert_eq!(p.node_limit, Some(500));
        assert_eq!(p.random_seed, Some(7));
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut obs = |e: &SolutionEvent| seen.push(e.objective);
            let event = SolutionEvent {
                index: 0,
                objective: 42,
                elapsed: Duration::ZERO,
            };
            obs.on_solution(&event);
            LogObserver.on_solution(&event);
        }
        assert_eq!(seen, vec![42]);
    }

    #[test]
    fn test_unsolved_response() {
        let r = SolverResponse::unsolved(SolveStatus::Unknown, SearchStats::default());
        assert!(r.assignment.is_none());
        assert!(r.objective.is_none());
    }
}
