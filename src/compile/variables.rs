//! Decision variable layout for one compiled problem.
//!
//! Per task: a start, duration, and end variable, one always-present
//! interval tying them together, and one boolean literal per mode.
//! Bounds are derived from the planning horizon and the task's own mode
//! durations, which keeps backend domains as tight as the data allows.

use std::collections::HashMap;

use crate::cp::{BoolVar, CpModel, IntVar, IntervalId};
use crate::models::{Problem, Task};

/// Backend variables owned by one task.
#[derive(Debug, Clone)]
pub(crate) struct TaskVars {
    /// Start time variable.
    pub start: IntVar,
    /// Realized duration variable (bounded by min/max mode duration).
    pub duration: IntVar,
    /// End time variable.
    pub end: IntVar,
    /// Always-present interval over (start, duration, end).
    pub interval: IntervalId,
    /// One selection literal per mode, parallel to `Task::modes`.
    pub mode_literals: Vec<BoolVar>,
}

/// Planning horizon: every task fits before it.
///
/// The serial bound (all tasks back to back at their longest mode, plus
/// every registered changeover) is always sufficient; the latest due
/// date extends it so due dates beyond the serial bound stay
/// representable.
pub(crate) fn horizon(problem: &Problem) -> i64 {
    let serial = problem.total_max_duration() + problem.setup_times.total_registered();
    let due = problem.max_due_date().unwrap_or(0);
    serial.max(due).max(1)
}

/// Creates the per-task variables and intervals for every task.
pub(crate) fn build_task_vars(
    model: &mut CpModel,
    problem: &Problem,
    horizon: i64,
) -> HashMap<u64, TaskVars> {
    let mut vars = HashMap::with_capacity(problem.task_count());
    for task in problem.tasks() {
        vars.insert(task.id, build_one(model, task, horizon));
    }
    vars
}

fn build_one(model: &mut CpModel, task: &Task, horizon: i64) -> TaskVars {
    let min_dur = task.min_duration();
    let max_dur = task.max_duration();

    let start = model.new_int_var(0, (horizon - min_dur).max(0), format!("start_t{}", task.id));
    let duration = model.new_int_var(min_dur, max_dur, format!("dur_t{}", task.id));
    let end = model.new_int_var(min_dur, horizon, format!("end_t{}", task.id));
    let interval = model.new_interval(start, duration, end);

    let mode_literals = task
        .modes
        .iter()
        .enumerate()
        .map(|(i, m)| model.new_bool_var(format!("mode_t{}_{}_m{}", task.id, i, m.machine_id)))
        .collect();

    TaskVars {
        start,
        duration,
        end,
        interval,
        mode_literals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Machine, WorkCell};

    fn two_task_problem() -> Problem {
        Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0))
            .with_machine(Machine::new(2, 0))
            .with_job(
                Job::new(1)
                    .with_task(crate::models::Task::new(1, 1).with_mode(1, 5).with_mode(2, 3))
                    .with_task(crate::models::Task::new(2, 1).with_mode(2, 4)),
            )
    }

    #[test]
    fn test_horizon_serial_bound() {
        let p = two_task_problem();
        // Longest modes: 5 + 4.
        assert_eq!(horizon(&p), 9);
    }

    #[test]
    fn test_horizon_extended_by_due_date() {
        let mut p = two_task_problem();
        p.jobs[0].due_date = Some(50);
        assert_eq!(horizon(&p), 50);
    }

    #[test]
    fn test_horizon_never_zero() {
        assert_eq!(horizon(&Problem::new()), 1);
    }

    #[test]
    fn test_task_var_bounds() {
        let p = two_task_problem();
        let h = horizon(&p);
        let mut model = CpModel::new();
        let vars = build_task_vars(&mut model, &p, h);

        let tv = &vars[&1];
        assert_eq!(model.domain(tv.duration), (3, 5));
        assert_eq!(model.domain(tv.start), (0, h - 3));
        assert_eq!(model.domain(tv.end), (3, h));
        assert_eq!(tv.mode_literals.len(), 2);

        let tv2 = &vars[&2];
        assert_eq!(model.domain(tv2.duration), (4, 4));
        assert_eq!(tv2.mode_literals.len(), 1);
        assert_eq!(model.interval_count(), 2);
    }
}
