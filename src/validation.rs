//! Input validation for scheduling problems.
//!
//! Checks structural integrity of problems and objective configurations
//! before any backend variables are created. Detects:
//! - Duplicate IDs
//! - Tasks with no modes
//! - Modes referencing unknown machines
//! - Precedences referencing unknown tasks
//! - Circular precedence dependencies (DAG validation)
//! - Epsilon-constraint configurations missing required bounds
//!
//! Issues carry a severity; callers decide whether to proceed with
//! warnings or abort on hard issues.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{MultiObjectiveConfig, OptimizationStrategy, Problem};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Compilation would be wrong or undefined; abort.
    Hard,
    /// Suspicious but compilable; proceed at the caller's discretion.
    Warning,
}

/// Categories of validation issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A task has no modes.
    NoModes,
    /// A mode references a machine that doesn't exist.
    UnknownMachine,
    /// A machine references a work cell that doesn't exist.
    UnknownWorkCell,
    /// A precedence references a task that doesn't exist.
    UnknownTask,
    /// Precedence graph contains a cycle.
    CyclicPrecedence,
    /// Objective configuration is unusable for the chosen strategy.
    BadObjectiveConfig,
    /// A due-date objective was requested but jobs lack due dates.
    MissingDueDates,
    /// A setup-flagged task has no registered setup pairs.
    UnusedSetupFlag,
}

/// A validation issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue category.
    pub kind: IssueKind,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn hard(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Hard,
            message: message.into(),
        }
    }

    fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Whether any issue in the list is hard.
pub fn has_hard_issues(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Hard)
}

/// Validates a problem's structural integrity.
///
/// Returns all detected issues; an empty list means the problem is clean.
pub fn validate_problem(problem: &Problem) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut machine_ids = HashSet::new();
    for m in &problem.machines {
        if !machine_ids.insert(m.id) {
            issues.push(ValidationIssue::hard(
                IssueKind::DuplicateId,
                format!("Duplicate machine ID: {}", m.id),
            ));
        }
    }

    let mut cell_ids = HashSet::new();
    for c in &problem.work_cells {
        if !cell_ids.insert(c.id) {
            issues.push(ValidationIssue::hard(
                IssueKind::DuplicateId,
                format!("Duplicate work cell ID: {}", c.id),
            ));
        }
    }
    for m in &problem.machines {
        if !cell_ids.contains(&m.work_cell_id) {
            issues.push(ValidationIssue::warning(
                IssueKind::UnknownWorkCell,
                format!(
                    "Machine {} references unknown work cell {}",
                    m.id, m.work_cell_id
                ),
            ));
        }
    }

    let mut job_ids = HashSet::new();
    let mut task_ids = HashSet::new();
    for job in &problem.jobs {
        if !job_ids.insert(job.id) {
            issues.push(ValidationIssue::hard(
                IssueKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }
        for task in &job.tasks {
            if !task_ids.insert(task.id) {
                issues.push(ValidationIssue::hard(
                    IssueKind::DuplicateId,
                    format!("Duplicate task ID: {}", task.id),
                ));
            }
            if task.modes.is_empty() {
                issues.push(ValidationIssue::hard(
                    IssueKind::NoModes,
                    format!("Task {} has no modes", task.id),
                ));
            }
            for mode in &task.modes {
                if !machine_ids.contains(&mode.machine_id) {
                    issues.push(ValidationIssue::hard(
                        IssueKind::UnknownMachine,
                        format!(
                            "Task {} references unknown machine {}",
                            task.id, mode.machine_id
                        ),
                    ));
                }
            }
        }
    }

    // Precedence references.
    for task in problem.tasks() {
        for &pred in &task.predecessors {
            if !task_ids.contains(&pred) {
                issues.push(ValidationIssue::hard(
                    IssueKind::UnknownTask,
                    format!("Task {} references unknown predecessor {}", task.id, pred),
                ));
            }
        }
    }
    for p in &problem.precedences {
        for id in [p.predecessor, p.successor] {
            if !task_ids.contains(&id) {
                issues.push(ValidationIssue::hard(
                    IssueKind::UnknownTask,
                    format!("Precedence references unknown task {id}"),
                ));
            }
        }
    }

    if let Some(cycle_issue) = detect_cycles(problem) {
        issues.push(cycle_issue);
    }

    // Setup flags without any registered pairs.
    if problem.setup_times.is_empty() {
        for task in problem.tasks() {
            if task.requires_setup {
                issues.push(ValidationIssue::warning(
                    IssueKind::UnusedSetupFlag,
                    format!("Task {} requires setup but no setup times are registered", task.id),
                ));
            }
        }
    }

    issues
}

/// Validates an objective configuration against a problem.
pub fn validate_config(
    config: &MultiObjectiveConfig,
    problem: &Problem,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if config.objectives.is_empty() {
        issues.push(ValidationIssue::hard(
            IssueKind::BadObjectiveConfig,
            "No objectives configured",
        ));
        return issues;
    }

    let mut seen = HashSet::new();
    for o in &config.objectives {
        if !seen.insert(o.kind) {
            issues.push(ValidationIssue::hard(
                IssueKind::BadObjectiveConfig,
                format!("Objective {:?} configured more than once", o.kind),
            ));
        }
    }

    if config.strategy == OptimizationStrategy::Lexicographical {
        let mut priorities = HashSet::new();
        for o in &config.objectives {
            if !priorities.insert(o.priority) {
                issues.push(ValidationIssue::hard(
                    IssueKind::BadObjectiveConfig,
                    format!(
                        "Lexicographic priorities must form a strict order; {} repeats",
                        o.priority
                    ),
                ));
            }
        }
    }

    if config.strategy == OptimizationStrategy::EpsilonConstraint {
        if let Some(primary) = config.primary() {
            for o in &config.objectives {
                if o.kind != primary.kind && o.epsilon.is_none() {
                    issues.push(ValidationIssue::hard(
                        IssueKind::BadObjectiveConfig,
                        format!(
                            "Epsilon-constraint requires an epsilon bound on {:?}",
                            o.kind
                        ),
                    ));
                }
            }
        }
    }

    let lacks_due_dates = problem.jobs.iter().any(|j| j.due_date.is_none());
    for o in &config.objectives {
        if o.kind.needs_due_dates() && lacks_due_dates {
            issues.push(ValidationIssue::warning(
                IssueKind::MissingDueDates,
                format!(
                    "{:?} requested but some jobs have no due date; the horizon is substituted",
                    o.kind
                ),
            ));
        }
    }

    issues
}

/// Detects cycles in the combined precedence graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. A back-edge (a node in the current
/// recursion stack) means a cycle exists.
fn detect_cycles(problem: &Problem) -> Option<ValidationIssue> {
    let mut adj: HashMap<u64, Vec<u64>> = HashMap::new();
    let mut all_ids: Vec<u64> = Vec::new();

    for task in problem.tasks() {
        all_ids.push(task.id);
        for &pred in &task.predecessors {
            adj.entry(pred).or_default().push(task.id);
        }
    }
    for p in &problem.precedences {
        adj.entry(p.predecessor).or_default().push(p.successor);
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in &all_ids {
        if !visited.contains(&node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationIssue::hard(
                IssueKind::CyclicPrecedence,
                format!("Circular precedence detected involving task {node}"),
            ));
        }
    }

    None
}

fn has_cycle_dfs(
    node: u64,
    adj: &HashMap<u64, Vec<u64>>,
    visited: &mut HashSet<u64>,
    in_stack: &mut HashSet<u64>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(&node) {
        for &next in neighbors {
            if in_stack.contains(&next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(&next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(&node);
    false
}
