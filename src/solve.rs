//! End-to-end roster solving.
//!
//! `validate -> build -> optimize -> apply timeout policy -> decode`.
//! Every call builds a fresh model; the solver holds only its oracle and
//! configuration, so one instance can serve concurrent requests.

use tracing::{info, warn};

use crate::config::{RosterConfig, TimeoutPolicy};
use crate::cp::{MilpOracle, SearchStats, SolutionObserver, SolveStatus, SolverOracle};
use crate::decode::{DecodedRoster, SolutionDecoder};
use crate::encoding::ModelBuilder;
use crate::error::Result;
use crate::models::{Employee, PenaltyReport, Roster, RosterRequest, Timeline};
use crate::validation::validate_request;

/// Result of one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterOutcome {
    /// Oracle status; `None` when there was nothing to solve.
    pub status: Option<SolveStatus>,
    /// The roster, empty when no solution was accepted.
    pub roster: Roster,
    pub timelines: Vec<Timeline>,
    pub penalties: Vec<PenaltyReport>,
    /// Objective of the accepted solution.
    pub objective: Option<i64>,
    pub stats: SearchStats,
}

impl RosterOutcome {
    fn accepted(status: SolveStatus, decoded: DecodedRoster, stats: SearchStats) -> Self {
        Self {
            status: Some(status),
            objective: Some(decoded.objective),
            roster: decoded.roster,
            timelines: decoded.timelines,
            penalties: decoded.penalties,
            stats,
        }
    }

    fn rejected(status: Option<SolveStatus>, stats: SearchStats) -> Self {
        Self {
            status,
            stats,
            ..Self::default()
        }
    }

    /// Whether no roster was produced.
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Exchange form of the roster.
    pub fn to_pairs(&self) -> Vec<[Option<usize>; 2]> {
        self.roster.to_pairs()
    }
}

/// Solves roster requests with a given oracle.
///
/// `RosterSolver::default()` uses [`MilpOracle`] under the default
/// configuration, so every solve is bounded by a 10 second budget.
///
/// # Example
/// ```
/// use u_roster::models::{EmployeeRecord, RosterRequest};
/// use u_roster::solve::RosterSolver;
///
/// let request = RosterRequest::new(
///     vec![EmployeeRecord::new("Ana", 0, 30), EmployeeRecord::new("Ben", 0, 30)],
///     3,
/// );
/// let outcome = RosterSolver::default().solve(&request).unwrap();
/// assert_eq!(outcome.roster.len(), 3);
/// assert_eq!(outcome.roster.unfilled_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct RosterSolver<O> {
    oracle: O,
    config: RosterConfig,
}

impl Default for RosterSolver<MilpOracle> {
    fn default() -> Self {
        Self::new(MilpOracle::new())
    }
}

impl<O: SolverOracle> RosterSolver<O> {
    /// Creates a solver with the default configuration.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            config: RosterConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: RosterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Solves a request.
    pub fn solve(&self, request: &RosterRequest) -> Result<RosterOutcome> {
        self.run(request, None)
    }

    /// Solves a request, reporting each improving solution to `observer`.
    pub fn solve_with_observer(
        &self,
        request: &RosterRequest,
        observer: &mut dyn SolutionObserver,
    ) -> Result<RosterOutcome> {
        self.run(request, Some(observer))
    }

    fn run(
        &self,
        request: &RosterRequest,
        observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<RosterOutcome> {
        self.config.validate()?;
        validate_request(request)?;

        let employees = Employee::roster_from_records(&request.employees);
        let built = ModelBuilder::new(&employees)
            .with_policy(self.config.policy.clone())
            .with_slack(self.config.slack())
            .build(request.num_days);
        if built.is_empty() {
            info!(
                event = "solve_skipped",
                num_days = request.num_days,
                employees = employees.len()
            );
            return Ok(RosterOutcome::rejected(None, SearchStats::default()));
        }

        info!(
            event = "solve_start",
            oracle = self.oracle.name(),
            num_days = request.num_days,
            employees = employees.len(),
            variables = built.model.bool_var_count() + built.model.int_var_count(),
        );
        let response = self
            .oracle
            .optimize(&built.model, &self.config.solve_params(), observer)?;

        let accept = match response.status {
            SolveStatus::Optimal => true,
            SolveStatus::Feasible => {
                self.config.timeout_policy == TimeoutPolicy::AcceptFeasible
            }
            SolveStatus::Infeasible | SolveStatus::Unknown => false,
        };
        if response.status == SolveStatus::Feasible && !accept {
            warn!(event = "solution_rejected", objective = ?response.objective);
        }

        let outcome = if accept {
            let decoded = SolutionDecoder::new(&built).decode_response(&response);
            RosterOutcome::accepted(response.status, decoded, response.stats)
        } else {
            RosterOutcome::rejected(Some(response.status), response.stats)
        };

        info!(
            event = "solve_end",
            status = ?response.status,
            objective = ?outcome.objective,
            unfilled = outcome.roster.unfilled_count(),
            nodes = response.stats.nodes,
            elapsed_ms = response.stats.elapsed.as_millis() as u64,
        );
        Ok(outcome)
    }
}
