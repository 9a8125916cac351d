//! Solver interface: configuration, status, and solutions.
//!
//! [`CpSolver`] is the sole boundary to a solving engine. Industrial
//! backends (OR-Tools, CP Optimizer bindings) plug in here; the crate
//! ships [`SimpleCpSolver`](super::SimpleCpSolver) for self-contained use.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::model::{BoolVar, CpModel, IntVar};

/// Solver run limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget per solve call.
    pub time_limit: Duration,
    /// Parallel workers the backend may use. `SimpleCpSolver` ignores it.
    pub worker_count: usize,
    /// Search node budget per solve call.
    pub node_limit: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            worker_count: 1,
            node_limit: 10_000_000,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers.max(1);
        self
    }

    /// Sets the node budget.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = nodes;
        self
    }
}

/// Terminal status of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// Proven optimal (or exhaustively satisfied) solution.
    Optimal,
    /// A solution was found but optimality is unproven.
    Feasible,
    /// Proven to admit no solution.
    Infeasible,
    /// Limits hit before any conclusion.
    Unknown,
}

impl SolverStatus {
    /// Whether a usable solution exists under this status.
    pub fn is_solution(&self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// Result of one solve call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpSolution {
    /// Terminal status.
    pub status: SolverStatus,
    /// Assigned value per variable (empty when no solution was found).
    values: Vec<i64>,
    /// Objective variable value, when an objective was set and solved.
    pub objective_value: Option<i64>,
    /// Wall time spent in the solver.
    pub wall_time: Duration,
    /// Search nodes explored (backend-specific measure of effort).
    pub nodes: u64,
}

impl CpSolution {
    /// Builds a solution-carrying result.
    pub fn found(
        status: SolverStatus,
        values: Vec<i64>,
        objective_value: Option<i64>,
        wall_time: Duration,
        nodes: u64,
    ) -> Self {
        Self {
            status,
            values,
            objective_value,
            wall_time,
            nodes,
        }
    }

    /// Builds an empty result with the given terminal status.
    pub fn empty(status: SolverStatus, wall_time: Duration, nodes: u64) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: None,
            wall_time,
            nodes,
        }
    }

    /// Whether a usable solution exists.
    pub fn is_solution(&self) -> bool {
        self.status.is_solution()
    }

    /// Value of an integer variable, if a solution exists.
    pub fn value(&self, var: IntVar) -> Option<i64> {
        self.values.get(var.0).copied()
    }

    /// Value of a boolean variable, if a solution exists.
    pub fn bool_value(&self, var: BoolVar) -> Option<bool> {
        self.values.get(var.0).map(|&v| v != 0)
    }
}

/// Interface every solving engine implements.
///
/// A solve call blocks until it returns or its limits elapse; timed-out
/// solves are not resumed.
pub trait CpSolver {
    /// Solves the model under the given limits.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
