//! Objective configuration and solution models.
//!
//! Defines the objective catalogue, the multi-objective strategy
//! configuration, per-solve results, and the Pareto frontier with its
//! non-dominance invariant.
//!
//! # Reference
//! Ehrgott (2005), "Multicriteria Optimization"

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::cp::{ObjectiveDirection, SolverStatus};

use super::Schedule;

/// An optimizable schedule metric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ObjectiveKind {
    /// Latest task completion time.
    Makespan,
    /// Sum over jobs of (completion - due date); may be negative.
    TotalLateness,
    /// Largest single job lateness.
    MaxLateness,
    /// Sum over jobs of max(0, completion - due date).
    TotalTardiness,
    /// Total machine busy cost (hourly cost x busy hours).
    TotalCost,
    /// Sum over jobs of weight x completion time.
    WeightedCompletion,
    /// Mean machine busy fraction of the horizon.
    Utilization,
    /// Total incurred sequence-dependent setup time.
    TotalSetupTime,
}

impl ObjectiveKind {
    /// Natural optimization direction of this metric.
    pub fn direction(&self) -> ObjectiveDirection {
        match self {
            ObjectiveKind::Utilization => ObjectiveDirection::Maximize,
            _ => ObjectiveDirection::Minimize,
        }
    }

    /// Whether this metric needs job due dates to be meaningful.
    pub fn needs_due_dates(&self) -> bool {
        matches!(
            self,
            ObjectiveKind::TotalLateness
                | ObjectiveKind::MaxLateness
                | ObjectiveKind::TotalTardiness
        )
    }
}

/// Multi-objective resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationStrategy {
    /// Sequential single-objective phases in strict priority order.
    Lexicographical,
    /// Single solve of a fixed-point weighted sum.
    WeightedSum,
    /// Optimize the primary objective, bound the rest by epsilon.
    EpsilonConstraint,
    /// Sample the Pareto frontier and recommend a balanced solution.
    ParetoOptimal,
}

/// One objective entry in a multi-objective configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeight {
    /// Which metric.
    pub kind: ObjectiveKind,
    /// Relative weight (weighted-sum, preference selection).
    pub weight: f64,
    /// Priority for lexicographic ordering (lower value = earlier phase).
    pub priority: i32,
    /// Bound for epsilon-constraint strategies.
    pub epsilon: Option<f64>,
}

impl ObjectiveWeight {
    /// Creates an entry with weight 1 and priority 0.
    pub fn new(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            weight: 1.0,
            priority: 0,
            epsilon: None,
        }
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the lexicographic priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the epsilon bound.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }
}

/// Configuration of a multi-objective optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiObjectiveConfig {
    /// Resolution strategy.
    pub strategy: OptimizationStrategy,
    /// Requested objectives, in declaration order.
    pub objectives: Vec<ObjectiveWeight>,
    /// Relative tolerance when freezing a lexicographic phase value.
    pub lexicographic_tolerance: f64,
    /// Number of intermediate Pareto samples per objective range.
    pub pareto_sample_count: usize,
}

impl MultiObjectiveConfig {
    /// Creates a configuration for the given strategy.
    pub fn new(strategy: OptimizationStrategy) -> Self {
        Self {
            strategy,
            objectives: Vec::new(),
            lexicographic_tolerance: 0.0,
            pareto_sample_count: 5,
        }
    }

    /// Adds an objective entry.
    pub fn with_objective(mut self, objective: ObjectiveWeight) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Sets the lexicographic tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.lexicographic_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the Pareto sample count.
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.pareto_sample_count = count;
        self
    }

    /// Objectives sorted by ascending priority (stable for ties).
    pub fn by_priority(&self) -> Vec<&ObjectiveWeight> {
        let mut sorted: Vec<&ObjectiveWeight> = self.objectives.iter().collect();
        sorted.sort_by_key(|o| o.priority);
        sorted
    }

    /// Highest-priority objective, if any are configured.
    pub fn primary(&self) -> Option<&ObjectiveWeight> {
        self.objectives.iter().min_by_key(|o| o.priority)
    }

    /// The requested objective kinds, in declaration order.
    pub fn kinds(&self) -> Vec<ObjectiveKind> {
        self.objectives.iter().map(|o| o.kind).collect()
    }
}

/// Result of one optimization strategy (or phase).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveSolution {
    /// Realized value per requested objective, descaled to natural units.
    pub values: BTreeMap<ObjectiveKind, f64>,
    /// Terminal backend status.
    pub status: SolverStatus,
    /// Wall time spent solving.
    pub wall_time: Duration,
    /// The extracted timetable (empty when no solution was found).
    pub schedule: Schedule,
}

impl ObjectiveSolution {
    /// Value of one objective, if it was requested.
    pub fn value(&self, kind: ObjectiveKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }

    /// Whether the backend found a (possibly suboptimal) solution.
    pub fn has_solution(&self) -> bool {
        self.status.is_solution()
    }
}

/// One retained point on the Pareto frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoSolution {
    /// The underlying solve result.
    pub solution: ObjectiveSolution,
}

impl ParetoSolution {
    /// Wraps a solve result.
    pub fn new(solution: ObjectiveSolution) -> Self {
        Self { solution }
    }

    /// Objective values in the order of `kinds`.
    ///
    /// Missing values (never produced by the orchestrator) read as 0.
    pub fn value_vector(&self, kinds: &[ObjectiveKind]) -> Vec<f64> {
        kinds
            .iter()
            .map(|k| self.solution.value(*k).unwrap_or(0.0))
            .collect()
    }
}

/// A dominance-free set of solutions over a fixed objective vector.
///
/// Invariant: no retained solution weakly dominates another — a solution
/// that is at least as good on every objective and strictly better on one
/// evicts the dominated point on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoFrontier {
    /// The objective kinds spanning the frontier, in a fixed order.
    pub kinds: Vec<ObjectiveKind>,
    /// Retained non-dominated solutions.
    pub solutions: Vec<ParetoSolution>,
}

const DOMINANCE_EPS: f64 = 1e-9;

impl ParetoFrontier {
    /// Creates an empty frontier over the given objective kinds.
    pub fn new(kinds: Vec<ObjectiveKind>) -> Self {
        Self {
            kinds,
            solutions: Vec::new(),
        }
    }

    /// Inserts a solution, maintaining the non-dominance invariant.
    ///
    /// Returns `true` if the solution was retained.
    pub fn insert(&mut self, candidate: ParetoSolution) -> bool {
        let cand_values = candidate.value_vector(&self.kinds);

        for existing in &self.solutions {
            let values = existing.value_vector(&self.kinds);
            if self.dominates(&values, &cand_values) {
                return false;
            }
        }

        let kinds = self.kinds.clone();
        let dominates = |a: &[f64], b: &[f64]| Self::dominates_static(&kinds, a, b);
        self.solutions
            .retain(|s| !dominates(&cand_values, &s.value_vector(&kinds)));
        self.solutions.push(candidate);
        true
    }

    /// Whether value vector `a` weakly dominates `b`.
    pub fn dominates(&self, a: &[f64], b: &[f64]) -> bool {
        Self::dominates_static(&self.kinds, a, b)
    }

    fn dominates_static(kinds: &[ObjectiveKind], a: &[f64], b: &[f64]) -> bool {
        let mut strictly_better = false;
        for (i, kind) in kinds.iter().enumerate() {
            let (better, worse) = match kind.direction() {
                ObjectiveDirection::Minimize => (a[i] < b[i] - DOMINANCE_EPS, a[i] > b[i] + DOMINANCE_EPS),
                ObjectiveDirection::Maximize => (a[i] > b[i] + DOMINANCE_EPS, a[i] < b[i] - DOMINANCE_EPS),
            };
            if worse {
                return false;
            }
            if better {
                strictly_better = true;
            }
        }
        strictly_better
    }

    /// Number of retained solutions.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Whether the frontier is empty.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}
