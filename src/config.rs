//! Roster configuration.
//!
//! Loads slack capacity, search limits, the timeout policy and the full
//! rostering policy from TOML. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```
//! use u_roster::config::{RosterConfig, TimeoutPolicy};
//! use std::time::Duration;
//!
//! let config = RosterConfig::from_toml_str(r#"
//!     max_unfilled = 4
//!     timeout_policy = "reject"
//!
//!     [solver]
//!     time_limit_secs = 30
//!     random_seed = 42
//!
//!     [policy]
//!     unavailable_weight = 20
//!
//!     [[policy.transitions]]
//!     from = "night"
//!     to = "morning"
//!     cost = 0
//! "#).unwrap();
//!
//! assert_eq!(config.max_unfilled, 4);
//! assert_eq!(config.timeout_policy, TimeoutPolicy::Reject);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.policy.preference_weight, -2);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cp::SolveParams;
use crate::models::{RosterPolicy, UnfilledSlack, DEFAULT_MAX_UNFILLED};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do with a solution the oracle could not prove optimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Decode the best solution found before the limit.
    #[default]
    AcceptFeasible,
    /// Return the empty roster unless the result is optimal.
    Reject,
}

/// Default wall-clock budget for one solve.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 10;

/// Search limits handed to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Wall-clock budget in seconds; `None` lets the oracle run to completion.
    pub time_limit_secs: Option<u64>,
    /// Maximum search nodes.
    pub node_limit: Option<u64>,
    /// Seed for tie-breaking.
    pub random_seed: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
            node_limit: None,
            random_seed: None,
        }
    }
}

/// Complete roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Slots that may be left unfilled over the horizon.
    pub max_unfilled: i64,
    pub solver: SolverSettings,
    pub timeout_policy: TimeoutPolicy,
    pub policy: RosterPolicy,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_unfilled: DEFAULT_MAX_UNFILLED,
            solver: SolverSettings::default(),
            timeout_policy: TimeoutPolicy::default(),
            policy: RosterPolicy::default(),
        }
    }
}

impl RosterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML or
    /// describes an inconsistent policy.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the slack capacity.
    pub fn with_max_unfilled(mut self, max_unfilled: i64) -> Self {
        self.max_unfilled = max_unfilled;
        self
    }

    /// Sets the time limit in seconds.
    pub fn with_time_limit_secs(mut self, seconds: u64) -> Self {
        self.solver.time_limit_secs = Some(seconds);
        self
    }

    /// Removes the time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.solver.time_limit_secs = None;
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.solver.node_limit = Some(nodes);
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.solver.random_seed = Some(seed);
        self
    }

    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    /// Sets the rostering policy.
    pub fn with_policy(mut self, policy: RosterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the time limit as a Duration.
    pub fn time_limit(&self) -> Option<Duration> {
        self.solver.time_limit_secs.map(Duration::from_secs)
    }

    /// Slack participant for this configuration.
    pub fn slack(&self) -> UnfilledSlack {
        UnfilledSlack::new(self.max_unfilled)
    }

    /// Oracle parameters for this configuration.
    pub fn solve_params(&self) -> SolveParams {
        SolveParams {
            time_limit: self.time_limit(),
            node_limit: self.solver.node_limit,
            random_seed: self.solver.random_seed,
        }
    }

    /// Checks the configuration for inconsistencies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.max_unfilled < 0 {
            problems.push(format!("max_unfilled is negative: {}", self.max_unfilled));
        }
        problems.extend(self.policy.problems());

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}
