//! Problem aggregate and setup-time registry.
//!
//! A [`Problem`] bundles everything the model builder needs: machines,
//! work cells, jobs (hand-authored or template-expanded), extra precedence
//! edges, and sequence-dependent setup times.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Job, Machine, Precedence, Task, WorkCell};

/// Sequence-dependent setup times between task pairs.
///
/// Maps (from_task, to_task) → setup time in time units, with optional
/// per-machine overrides. A pair with no entry has zero setup and incurs
/// no sequencing constraint.
///
/// # Reference
/// Allahverdi et al. (2008), "A survey of scheduling problems with
/// setup times or costs"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupTimes {
    /// Directional setup times applying on any shared machine.
    entries: HashMap<(u64, u64), i64>,
    /// Per-machine overrides: (machine, from_task, to_task) → units.
    overrides: HashMap<(u32, u64, u64), i64>,
}

impl SetupTimes {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a setup time between two tasks on any shared machine.
    pub fn set(&mut self, from: u64, to: u64, units: i64) {
        self.entries.insert((from, to), units);
    }

    /// Builder: registers a setup time and returns self.
    pub fn with(mut self, from: u64, to: u64, units: i64) -> Self {
        self.set(from, to, units);
        self
    }

    /// Registers a machine-specific override.
    pub fn set_for_machine(&mut self, machine_id: u32, from: u64, to: u64, units: i64) {
        self.overrides.insert((machine_id, from, to), units);
    }

    /// Setup time from `from` to `to` on `machine_id` (0 if unregistered).
    pub fn get(&self, machine_id: u32, from: u64, to: u64) -> i64 {
        if let Some(&units) = self.overrides.get(&(machine_id, from, to)) {
            return units;
        }
        *self.entries.get(&(from, to)).unwrap_or(&0)
    }

    /// All task pairs with at least one registered entry.
    pub fn registered_pairs(&self) -> Vec<(u64, u64)> {
        let mut pairs: Vec<(u64, u64)> = self
            .entries
            .keys()
            .copied()
            .chain(self.overrides.keys().map(|&(_, f, t)| (f, t)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Sum of all registered setup times (upper bound for objectives).
    pub fn total_registered(&self) -> i64 {
        self.entries.values().sum::<i64>() + self.overrides.values().sum::<i64>()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.overrides.is_empty()
    }
}

/// A complete scheduling problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Available machines.
    pub machines: Vec<Machine>,
    /// Work cells grouping the machines.
    pub work_cells: Vec<WorkCell>,
    /// Jobs to schedule.
    pub jobs: Vec<Job>,
    /// Extra precedence edges (in addition to `Task::predecessors`).
    pub precedences: Vec<Precedence>,
    /// Sequence-dependent setup times.
    pub setup_times: SetupTimes,
    /// Discrete time units per hour, for cost accounting (>= 1).
    pub time_units_per_hour: i64,
}

impl Problem {
    /// Creates an empty problem with one time unit per hour.
    pub fn new() -> Self {
        Self {
            machines: Vec::new(),
            work_cells: Vec::new(),
            jobs: Vec::new(),
            precedences: Vec::new(),
            setup_times: SetupTimes::new(),
            time_units_per_hour: 1,
        }
    }

    /// Adds a machine.
    pub fn with_machine(mut self, machine: Machine) -> Self {
        self.machines.push(machine);
        self
    }

    /// Adds a work cell.
    pub fn with_work_cell(mut self, cell: WorkCell) -> Self {
        self.work_cells.push(cell);
        self
    }

    /// Adds a job.
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Adds an extra precedence edge.
    pub fn with_precedence(mut self, predecessor: u64, successor: u64) -> Self {
        self.precedences.push(Precedence::new(predecessor, successor));
        self
    }

    /// Sets the setup-time registry.
    pub fn with_setup_times(mut self, setup_times: SetupTimes) -> Self {
        self.setup_times = setup_times;
        self
    }

    /// Sets the time-unit granularity (clamped to >= 1).
    pub fn with_time_units_per_hour(mut self, units: i64) -> Self {
        self.time_units_per_hour = units.max(1);
        self
    }

    /// Iterates all tasks across all jobs.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.jobs.iter().flat_map(|j| j.tasks.iter())
    }

    /// Total number of tasks.
    pub fn task_count(&self) -> usize {
        self.jobs.iter().map(|j| j.tasks.len()).sum()
    }

    /// Looks up a task by id.
    pub fn find_task(&self, task_id: u64) -> Option<&Task> {
        self.tasks().find(|t| t.id == task_id)
    }

    /// Looks up a machine by id.
    pub fn find_machine(&self, machine_id: u32) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == machine_id)
    }

    /// Looks up a work cell by id.
    pub fn find_work_cell(&self, cell_id: u32) -> Option<&WorkCell> {
        self.work_cells.iter().find(|c| c.id == cell_id)
    }

    /// Machines belonging to the given work cell.
    pub fn machines_in_cell(&self, cell_id: u32) -> Vec<&Machine> {
        self.machines
            .iter()
            .filter(|m| m.work_cell_id == cell_id)
            .collect()
    }

    /// Sum over all tasks of the longest mode duration.
    pub fn total_max_duration(&self) -> i64 {
        self.jobs.iter().map(|j| j.max_total_duration()).sum()
    }

    /// Latest due date across jobs, if any job has one.
    pub fn max_due_date(&self) -> Option<i64> {
        self.jobs.iter().filter_map(|j| j.due_date).max()
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}
