//! Job, task, and mode models.
//!
//! A job is an ordered collection of tasks with a due date. Each task
//! offers one or more modes — (machine, duration) alternatives — of which
//! exactly one is realized in a solution. Precedence edges between tasks
//! must form a DAG.
//!
//! # Time Representation
//! All times are discrete time units relative to a scheduling epoch (t=0).
//! [`Problem::time_units_per_hour`](super::Problem::time_units_per_hour)
//! maps units to hours for costing.
//!
//! # Reference
//! Brucker (2007), "Scheduling Algorithms", Ch. 1 (multi-mode problems)

use serde::{Deserialize, Serialize};

/// A processing alternative for a task: run on `machine_id` for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMode {
    /// Eligible machine.
    pub machine_id: u32,
    /// Processing duration in time units (> 0).
    pub duration: i64,
}

impl TaskMode {
    /// Creates a mode.
    pub fn new(machine_id: u32, duration: i64) -> Self {
        Self {
            machine_id,
            duration,
        }
    }
}

/// A task: the smallest schedulable unit of work.
///
/// Exactly one of its modes is realized per solution. A task with zero
/// modes is a hard validation issue, never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier. Expanded template tasks pack
    /// `(instance_id, template_task_id)` into this value.
    pub id: u64,
    /// Parent job identifier.
    pub job_id: u32,
    /// Human-readable name.
    pub name: String,
    /// Whether the task can run without an operator present.
    /// Carried as data; the gap-free time model attaches no semantics.
    pub unattended: bool,
    /// Whether the task participates in sequence-dependent setups.
    pub requires_setup: bool,
    /// Processing alternatives (>= 1 in a valid problem).
    pub modes: Vec<TaskMode>,
    /// Tasks that must complete before this one starts.
    pub predecessors: Vec<u64>,
}

impl Task {
    /// Creates a task with no modes.
    pub fn new(id: u64, job_id: u32) -> Self {
        Self {
            id,
            job_id,
            name: String::new(),
            unattended: false,
            requires_setup: false,
            modes: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a processing mode.
    pub fn with_mode(mut self, machine_id: u32, duration: i64) -> Self {
        self.modes.push(TaskMode::new(machine_id, duration));
        self
    }

    /// Adds a predecessor task id.
    pub fn with_predecessor(mut self, task_id: u64) -> Self {
        self.predecessors.push(task_id);
        self
    }

    /// Marks the task as unattended.
    pub fn unattended(mut self) -> Self {
        self.unattended = true;
        self
    }

    /// Marks the task as setup-relevant.
    pub fn with_setup(mut self) -> Self {
        self.requires_setup = true;
        self
    }

    /// Shortest mode duration, or 0 for a (invalid) mode-less task.
    pub fn min_duration(&self) -> i64 {
        self.modes.iter().map(|m| m.duration).min().unwrap_or(0)
    }

    /// Longest mode duration, or 0 for a (invalid) mode-less task.
    pub fn max_duration(&self) -> i64 {
        self.modes.iter().map(|m| m.duration).max().unwrap_or(0)
    }

    /// Whether any mode runs on the given machine.
    pub fn eligible_on(&self, machine_id: u32) -> bool {
        self.modes.iter().any(|m| m.machine_id == machine_id)
    }
}

/// A declared precedence edge: `successor` starts at or after
/// `predecessor` ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precedence {
    /// Task that must finish first.
    pub predecessor: u64,
    /// Task that must wait.
    pub successor: u64,
}

impl Precedence {
    /// Creates a precedence edge.
    pub fn new(predecessor: u64, successor: u64) -> Self {
        Self {
            predecessor,
            successor,
        }
    }
}

/// A job: an ordered set of tasks with a due date and weight.
///
/// Constructed via builder calls and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: u32,
    /// Human-readable description.
    pub name: String,
    /// Latest desired completion (time units). `None` = no due date.
    pub due_date: Option<i64>,
    /// Weight for weighted-completion objectives (>= 1).
    pub weight: i64,
    /// Tasks composing this job.
    pub tasks: Vec<Task>,
}

impl Job {
    /// Creates an empty job.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            due_date: None,
            weight: 1,
            tasks: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due: i64) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Sets the weight (clamped to >= 1).
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight.max(1);
        self
    }

    /// Adds a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Sum of the longest mode duration over all tasks.
    ///
    /// An upper bound on this job's contribution to the horizon.
    pub fn max_total_duration(&self) -> i64 {
        self.tasks.iter().map(|t| t.max_duration()).sum()
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let task = Task::new(7, 1)
            .with_name("drill")
            .with_mode(1, 5)
            .with_mode(2, 3)
            .with_predecessor(6)
            .unattended()
            .with_setup();

        assert_eq!(task.id, 7);
        assert_eq!(task.job_id, 1);
        assert_eq!(task.modes.len(), 2);
        assert_eq!(task.predecessors, vec![6]);
        assert!(task.unattended);
        assert!(task.requires_setup);
        assert_eq!(task.min_duration(), 3);
        assert_eq!(task.max_duration(), 5);
        assert!(task.eligible_on(1));
        assert!(task.eligible_on(2));
        assert!(!task.eligible_on(3));
    }

    #[test]
    fn test_task_no_modes() {
        let task = Task::new(1, 1);
        assert_eq!(task.min_duration(), 0);
        assert_eq!(task.max_duration(), 0);
        assert!(!task.eligible_on(1));
    }

    #[test]
    fn test_job_builder() {
        let job = Job::new(3)
            .with_name("Order 42")
            .with_due_date(100)
            .with_weight(2)
            .with_task(Task::new(1, 3).with_mode(1, 4))
            .with_task(Task::new(2, 3).with_mode(1, 6).with_mode(2, 8));

        assert_eq!(job.id, 3);
        assert_eq!(job.due_date, Some(100));
        assert_eq!(job.weight, 2);
        assert_eq!(job.task_count(), 2);
        assert_eq!(job.max_total_duration(), 12);
    }

    #[test]
    fn test_job_weight_clamped() {
        let job = Job::new(1).with_weight(0);
        assert_eq!(job.weight, 1);
    }

    #[test]
    fn test_precedence() {
        let p = Precedence::new(1, 2);
        assert_eq!(p.predecessor, 1);
        assert_eq!(p.successor, 2);
    }

    #[test]
    fn test_serde_round_trip() {
        let job = Job::new(1)
            .with_due_date(50)
            .with_task(Task::new(1, 1).with_mode(2, 5).with_predecessor(0));
        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 1);
        assert_eq!(back.tasks[0].modes[0].duration, 5);
    }
}
