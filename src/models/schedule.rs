//! Schedule (timetable) model.
//!
//! A schedule is a complete assignment of tasks to machines and time
//! intervals, extracted from a backend solution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A task-machine-time assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned task id.
    pub task_id: u64,
    /// Parent job id (denormalized for query convenience).
    pub job_id: u32,
    /// Chosen machine.
    pub machine_id: u32,
    /// Start time (units).
    pub start: i64,
    /// End time (units).
    pub end: i64,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(task_id: u64, job_id: u32, machine_id: u32, start: i64, end: i64) -> Self {
        Self {
            task_id,
            job_id,
            machine_id,
            start,
            end,
        }
    }

    /// Realized duration (end - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// A complete timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Task assignments.
    pub assignments: Vec<Assignment>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Makespan: latest end time across all assignments.
    pub fn makespan(&self) -> i64 {
        self.assignments.iter().map(|a| a.end).max().unwrap_or(0)
    }

    /// Finds the assignment for a task.
    pub fn assignment_for_task(&self, task_id: u64) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.task_id == task_id)
    }

    /// All assignments of a job.
    pub fn assignments_for_job(&self, job_id: u32) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.job_id == job_id)
            .collect()
    }

    /// All assignments on a machine.
    pub fn assignments_for_machine(&self, machine_id: u32) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.machine_id == machine_id)
            .collect()
    }

    /// Completion time of a job (latest end of its assignments).
    pub fn job_completion_time(&self, job_id: u32) -> Option<i64> {
        self.assignments_for_job(job_id)
            .iter()
            .map(|a| a.end)
            .max()
    }

    /// Busy time per machine.
    pub fn machine_busy_times(&self) -> HashMap<u32, i64> {
        let mut busy: HashMap<u32, i64> = HashMap::new();
        for a in &self.assignments {
            *busy.entry(a.machine_id).or_insert(0) += a.duration();
        }
        busy
    }

    /// Utilization of a machine over a horizon: busy / horizon.
    ///
    /// Returns `None` if the horizon is not positive.
    pub fn machine_utilization(&self, machine_id: u32, horizon: i64) -> Option<f64> {
        if horizon <= 0 {
            return None;
        }
        let busy: i64 = self
            .assignments_for_machine(machine_id)
            .iter()
            .map(|a| a.duration())
            .sum();
        Some(busy as f64 / horizon as f64)
    }

    /// Maximum number of assignments on a machine active at any integer
    /// time point. Used by capacity checks in tests.
    pub fn peak_concurrency(&self, machine_id: u32) -> i64 {
        let on_machine = self.assignments_for_machine(machine_id);
        let mut peak = 0;
        for a in &on_machine {
            for t in a.start..a.end {
                let active = on_machine
                    .iter()
                    .filter(|b| b.start <= t && t < b.end)
                    .count() as i64;
                peak = peak.max(active);
            }
        }
        peak
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(1, 1, 1, 0, 5));
        s.add_assignment(Assignment::new(2, 1, 2, 5, 8));
        s.add_assignment(Assignment::new(3, 2, 1, 5, 9));
        s
    }

    #[test]
    fn test_makespan() {
        assert_eq!(sample_schedule().makespan(), 9);
        assert_eq!(Schedule::new().makespan(), 0);
    }

    #[test]
    fn test_lookups() {
        let s = sample_schedule();
        assert_eq!(s.assignment_for_task(2).unwrap().machine_id, 2);
        assert!(s.assignment_for_task(99).is_none());
        assert_eq!(s.assignments_for_job(1).len(), 2);
        assert_eq!(s.assignments_for_machine(1).len(), 2);
        assert_eq!(s.job_completion_time(1), Some(8));
        assert_eq!(s.job_completion_time(9), None);
    }

    #[test]
    fn test_busy_times_and_utilization() {
        let s = sample_schedule();
        let busy = s.machine_busy_times();
        assert_eq!(busy[&1], 9); // 5 + 4
        assert_eq!(busy[&2], 3);
        assert!((s.machine_utilization(1, 9).unwrap() - 1.0).abs() < 1e-10);
        assert!(s.machine_utilization(1, 0).is_none());
    }

    #[test]
    fn test_peak_concurrency() {
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(1, 1, 1, 0, 4));
        s.add_assignment(Assignment::new(2, 2, 1, 2, 6));
        s.add_assignment(Assignment::new(3, 3, 1, 5, 7));
        assert_eq!(s.peak_concurrency(1), 2);
        assert_eq!(s.peak_concurrency(2), 0);
    }
}
