//! Machine and work-cell models.
//!
//! Machines are the processing resources tasks are assigned to. Each
//! machine belongs to a work cell and offers `capacity` concurrent task
//! slots. Work cells additionally bound how many tasks may be active
//! across their machines at the same instant.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1.2

use serde::{Deserialize, Serialize};

/// A machine that processes tasks.
///
/// A machine with `capacity == 1` is disjunctive: assigned tasks must not
/// overlap. A machine with `capacity > 1` admits that many tasks
/// concurrently (cumulative resource).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier.
    pub id: u32,
    /// Work cell this machine belongs to.
    pub work_cell_id: u32,
    /// Human-readable name.
    pub name: String,
    /// Concurrent task slots (>= 1).
    pub capacity: i64,
    /// Economic cost per hour of busy time.
    pub cost_per_hour: f64,
}

impl Machine {
    /// Creates a unit-capacity machine in the given work cell.
    pub fn new(id: u32, work_cell_id: u32) -> Self {
        Self {
            id,
            work_cell_id,
            name: String::new(),
            capacity: 1,
            cost_per_hour: 0.0,
        }
    }

    /// Sets the machine name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the concurrent capacity (clamped to >= 1).
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Sets the hourly cost.
    pub fn with_cost(mut self, cost_per_hour: f64) -> Self {
        self.cost_per_hour = cost_per_hour;
        self
    }

    /// Whether this machine requires pairwise non-overlap (capacity 1).
    pub fn is_disjunctive(&self) -> bool {
        self.capacity == 1
    }
}

/// A work cell: a group of machines with an aggregate activity bound.
///
/// The aggregate bound only matters when `capacity` is smaller than the
/// number of member machines; otherwise the per-machine constraints
/// already dominate and the cell adds nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCell {
    /// Unique work cell identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Maximum simultaneously active tasks across member machines.
    pub capacity: i64,
}

impl WorkCell {
    /// Creates a work cell with the given aggregate capacity.
    pub fn new(id: u32, capacity: i64) -> Self {
        Self {
            id,
            name: String::new(),
            capacity: capacity.max(1),
        }
    }

    /// Sets the work cell name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the aggregate bound is binding for `machine_count` members.
    pub fn is_binding(&self, machine_count: usize) -> bool {
        (self.capacity as usize) < machine_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_builder() {
        let m = Machine::new(1, 10)
            .with_name("CNC 1")
            .with_capacity(2)
            .with_cost(75.0);

        assert_eq!(m.id, 1);
        assert_eq!(m.work_cell_id, 10);
        assert_eq!(m.name, "CNC 1");
        assert_eq!(m.capacity, 2);
        assert!((m.cost_per_hour - 75.0).abs() < 1e-10);
        assert!(!m.is_disjunctive());
    }

    #[test]
    fn test_machine_defaults_disjunctive() {
        let m = Machine::new(1, 0);
        assert_eq!(m.capacity, 1);
        assert!(m.is_disjunctive());
    }

    #[test]
    fn test_machine_capacity_clamped() {
        let m = Machine::new(1, 0).with_capacity(0);
        assert_eq!(m.capacity, 1);
    }

    #[test]
    fn test_work_cell_binding() {
        let cell = WorkCell::new(10, 2).with_name("Milling");
        assert!(cell.is_binding(3));
        assert!(!cell.is_binding(2));
        assert!(!cell.is_binding(1));
    }
}
