//! Objective compilation and schedule-side evaluation.
//!
//! Each requested metric compiles to one backend integer variable the
//! orchestrator can optimize, bound, or freeze. Fractional metrics are
//! carried in fixed point: costs at x100, utilization at x10000; the
//! evaluation side reports natural units computed directly from the
//! extracted schedule, so reported values never depend on which metric
//! was active during the solve.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 2
//! (objective catalogue)

use std::collections::HashMap;

use crate::cp::{CmpOp, CpModel, IntVar};
use crate::models::{Job, Machine, ObjectiveKind, Problem, Schedule};

use super::constraints::SetupTerm;
use super::variables::TaskVars;

/// Fixed-point factor for monetary values.
pub(crate) const COST_SCALE: i64 = 100;
/// Fixed-point factor for the utilization fraction.
pub(crate) const UTILIZATION_SCALE: i64 = 10_000;

/// Fixed-point factor of a metric (1 for inherently integral metrics).
pub(crate) fn scale(kind: ObjectiveKind) -> f64 {
    match kind {
        ObjectiveKind::TotalCost => COST_SCALE as f64,
        ObjectiveKind::Utilization => UTILIZATION_SCALE as f64,
        _ => 1.0,
    }
}

/// Busy cost of one machine time unit, in x100 fixed point.
pub(crate) fn scaled_cost_per_unit(machine: &Machine, time_units_per_hour: i64) -> i64 {
    (machine.cost_per_hour * COST_SCALE as f64 / time_units_per_hour as f64).round() as i64
}

/// Compiles objective variables, sharing job-completion variables across
/// metrics.
pub(crate) struct ObjectiveBuilder<'a> {
    problem: &'a Problem,
    task_vars: &'a HashMap<u64, TaskVars>,
    setup_terms: &'a [SetupTerm],
    horizon: i64,
    completions: HashMap<u32, IntVar>,
}

impl<'a> ObjectiveBuilder<'a> {
    pub fn new(
        problem: &'a Problem,
        task_vars: &'a HashMap<u64, TaskVars>,
        setup_terms: &'a [SetupTerm],
        horizon: i64,
    ) -> Self {
        Self {
            problem,
            task_vars,
            setup_terms,
            horizon,
            completions: HashMap::new(),
        }
    }

    /// Builds the backend variable carrying the given metric.
    pub fn build(&mut self, model: &mut CpModel, kind: ObjectiveKind) -> IntVar {
        match kind {
            ObjectiveKind::Makespan => self.build_makespan(model),
            ObjectiveKind::TotalLateness => self.build_total_lateness(model),
            ObjectiveKind::MaxLateness => self.build_max_lateness(model),
            ObjectiveKind::TotalTardiness => self.build_total_tardiness(model),
            ObjectiveKind::TotalCost => self.build_total_cost(model),
            ObjectiveKind::WeightedCompletion => self.build_weighted_completion(model),
            ObjectiveKind::Utilization => self.build_utilization(model),
            ObjectiveKind::TotalSetupTime => self.build_total_setup_time(model),
        }
    }

    /// Job completion variable: at or above every task end of the job.
    fn completion(&mut self, model: &mut CpModel, job: &Job) -> IntVar {
        if let Some(&var) = self.completions.get(&job.id) {
            return var;
        }
        let var = model.new_int_var(0, self.horizon, format!("completion_j{}", job.id));
        for task in &job.tasks {
            if let Some(tv) = self.task_vars.get(&task.id) {
                model.add_linear(vec![(1, var), (-1, tv.end)], CmpOp::Ge, 0);
            }
        }
        self.completions.insert(job.id, var);
        var
    }

    /// Due date with the horizon substituted for jobs that have none.
    fn due(&self, job: &Job) -> i64 {
        job.due_date.unwrap_or(self.horizon)
    }

    /// Per-machine-unit busy terms: (duration x mode literal) summed over
    /// every mode on the machine. Mode literals are exclusive per task,
    /// so this is linear without any duration-literal product.
    fn busy_terms(&self, machine_id: u32, unit_coeff: i64) -> Vec<(i64, IntVar)> {
        let mut terms = Vec::new();
        for task in self.problem.tasks() {
            let Some(tv) = self.task_vars.get(&task.id) else {
                continue;
            };
            for (mode, &lit) in task.modes.iter().zip(&tv.mode_literals) {
                if mode.machine_id == machine_id {
                    terms.push((unit_coeff * mode.duration, lit.as_int()));
                }
            }
        }
        terms
    }

    fn build_makespan(&mut self, model: &mut CpModel) -> IntVar {
        let var = model.new_int_var(0, self.horizon, "makespan");
        for tv in self.task_vars.values() {
            model.add_linear(vec![(1, var), (-1, tv.end)], CmpOp::Ge, 0);
        }
        var
    }

    fn build_total_lateness(&mut self, model: &mut CpModel) -> IntVar {
        let jobs = self.problem.jobs.clone();
        let due_sum: i64 = jobs.iter().map(|j| self.due(j)).sum();
        let n = jobs.len() as i64;
        let var = model.new_int_var(-due_sum, n * self.horizon - due_sum, "total_lateness");
        let mut terms = vec![(1, var)];
        for job in &jobs {
            let c = self.completion(model, job);
            terms.push((-1, c));
        }
        model.add_linear(terms, CmpOp::Eq, -due_sum);
        var
    }

    fn build_max_lateness(&mut self, model: &mut CpModel) -> IntVar {
        let jobs = self.problem.jobs.clone();
        let max_due = jobs.iter().map(|j| self.due(j)).max().unwrap_or(0);
        let var = model.new_int_var(-max_due, self.horizon, "max_lateness");
        for job in &jobs {
            let c = self.completion(model, job);
            let due = self.due(job);
            model.add_linear(vec![(1, var), (-1, c)], CmpOp::Ge, -due);
        }
        var
    }

    fn build_total_tardiness(&mut self, model: &mut CpModel) -> IntVar {
        let jobs = self.problem.jobs.clone();
        let n = jobs.len() as i64;
        let mut terms = Vec::with_capacity(jobs.len() + 1);
        for job in &jobs {
            let c = self.completion(model, job);
            let due = self.due(job);
            let t = model.new_int_var(0, self.horizon, format!("tardiness_j{}", job.id));
            model.add_linear(vec![(1, t), (-1, c)], CmpOp::Ge, -due);
            terms.push((-1, t));
        }
        let var = model.new_int_var(0, n * self.horizon, "total_tardiness");
        terms.insert(0, (1, var));
        model.add_linear(terms, CmpOp::Eq, 0);
        var
    }

    fn build_total_cost(&mut self, model: &mut CpModel) -> IntVar {
        let tuph = self.problem.time_units_per_hour;
        let mut terms = Vec::new();
        let mut upper = 0i64;
        for machine in &self.problem.machines {
            let unit_cost = scaled_cost_per_unit(machine, tuph);
            if unit_cost == 0 {
                continue;
            }
            for (coeff, lit) in self.busy_terms(machine.id, unit_cost) {
                upper += coeff.max(0);
                terms.push((-coeff, lit));
            }
        }
        let var = model.new_int_var(0, upper, "total_cost_x100");
        terms.insert(0, (1, var));
        model.add_linear(terms, CmpOp::Eq, 0);
        var
    }

    fn build_weighted_completion(&mut self, model: &mut CpModel) -> IntVar {
        let jobs = self.problem.jobs.clone();
        let weight_sum: i64 = jobs.iter().map(|j| j.weight).sum();
        let var = model.new_int_var(0, weight_sum * self.horizon, "weighted_completion");
        let mut terms = vec![(1, var)];
        for job in &jobs {
            let c = self.completion(model, job);
            terms.push((-job.weight, c));
        }
        model.add_linear(terms, CmpOp::Eq, 0);
        var
    }

    /// Mean busy fraction of the horizon across machines, in x10000
    /// fixed point. The two-sided division encoding pins the variable to
    /// `floor(10000 * total_busy / (machines * horizon))`.
    fn build_utilization(&mut self, model: &mut CpModel) -> IntVar {
        let machine_count = self.problem.machines.len() as i64;
        let denom = machine_count * self.horizon;
        if denom == 0 {
            return model.new_int_var(0, 0, "utilization_x10000");
        }
        let var = model.new_int_var(0, UTILIZATION_SCALE, "utilization_x10000");

        let mut busy = Vec::new();
        for machine in &self.problem.machines {
            busy.extend(self.busy_terms(machine.id, UTILIZATION_SCALE));
        }

        // denom * util <= 10000 * busy <= denom * util + denom - 1
        let mut lower = vec![(denom, var)];
        lower.extend(busy.iter().map(|&(c, v)| (-c, v)));
        model.add_linear(lower, CmpOp::Le, 0);

        let mut upper = busy;
        upper.push((-denom, var));
        model.add_linear(upper, CmpOp::Le, denom - 1);
        var
    }

    fn build_total_setup_time(&mut self, model: &mut CpModel) -> IntVar {
        let upper: i64 = self.setup_terms.iter().map(|t| t.units.max(0)).sum();
        let var = model.new_int_var(0, upper, "total_setup_time");
        let mut terms = vec![(1, var)];
        for t in self.setup_terms {
            if t.units != 0 {
                terms.push((-t.units, t.literal.as_int()));
            }
        }
        model.add_linear(terms, CmpOp::Eq, 0);
        var
    }
}

/// Evaluates a metric from an extracted schedule, in natural units.
///
/// Jobs without a due date fall back to the horizon, mirroring
/// compilation. Jobs with no assignments contribute nothing.
pub fn evaluate_objective(
    problem: &Problem,
    schedule: &Schedule,
    kind: ObjectiveKind,
    horizon: i64,
) -> f64 {
    match kind {
        ObjectiveKind::Makespan => schedule.makespan() as f64,
        ObjectiveKind::TotalLateness => job_metric_sum(problem, schedule, horizon, |c, due| {
            (c - due) as f64
        }),
        ObjectiveKind::MaxLateness => problem
            .jobs
            .iter()
            .filter_map(|j| {
                let c = schedule.job_completion_time(j.id)?;
                Some((c - j.due_date.unwrap_or(horizon)) as f64)
            })
            .fold(None, |acc: Option<f64>, l| {
                Some(acc.map_or(l, |a| a.max(l)))
            })
            .unwrap_or(0.0),
        ObjectiveKind::TotalTardiness => job_metric_sum(problem, schedule, horizon, |c, due| {
            (c - due).max(0) as f64
        }),
        ObjectiveKind::TotalCost => {
            let busy = schedule.machine_busy_times();
            problem
                .machines
                .iter()
                .map(|m| {
                    let units = busy.get(&m.id).copied().unwrap_or(0);
                    m.cost_per_hour * units as f64 / problem.time_units_per_hour as f64
                })
                .sum()
        }
        ObjectiveKind::WeightedCompletion => problem
            .jobs
            .iter()
            .filter_map(|j| {
                let c = schedule.job_completion_time(j.id)?;
                Some((j.weight * c) as f64)
            })
            .sum(),
        ObjectiveKind::Utilization => {
            let denom = problem.machines.len() as i64 * horizon;
            if denom == 0 {
                return 0.0;
            }
            let busy: i64 = schedule.machine_busy_times().values().sum();
            busy as f64 / denom as f64
        }
        ObjectiveKind::TotalSetupTime => incurred_setup_time(problem, schedule) as f64,
    }
}

fn job_metric_sum(
    problem: &Problem,
    schedule: &Schedule,
    horizon: i64,
    per_job: impl Fn(i64, i64) -> f64,
) -> f64 {
    problem
        .jobs
        .iter()
        .filter_map(|j| {
            let c = schedule.job_completion_time(j.id)?;
            Some(per_job(c, j.due_date.unwrap_or(horizon)))
        })
        .sum()
}

/// Setup time incurred by a schedule: every registered directional pair
/// realized on a shared machine contributes its separation.
fn incurred_setup_time(problem: &Problem, schedule: &Schedule) -> i64 {
    let mut total = 0;
    for (from, to) in problem.setup_times.registered_pairs() {
        let (Some(a), Some(b)) = (
            schedule.assignment_for_task(from),
            schedule.assignment_for_task(to),
        ) else {
            continue;
        };
        if a.machine_id == b.machine_id && a.end <= b.start {
            total += problem.setup_times.get(a.machine_id, from, to);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::constraints::{
        add_machine_capacity, add_precedences, add_setup_sequencing, build_assignments,
        link_tasks,
    };
    use crate::compile::variables::{build_task_vars, horizon};
    use crate::cp::{CpSolver, SimpleCpSolver, SolverConfig};
    use crate::models::{Assignment, Job, Machine, SetupTimes, Task, WorkCell};

    fn solve_for(problem: &Problem, kind: ObjectiveKind) -> (i64, i64) {
        let h = horizon(problem);
        let mut model = CpModel::new();
        let task_vars = build_task_vars(&mut model, problem, h);
        link_tasks(&mut model, problem, &task_vars);
        add_precedences(&mut model, problem, &task_vars);
        let assignments = build_assignments(&mut model, problem, &task_vars);
        add_machine_capacity(&mut model, problem, &assignments);
        let setup_terms = add_setup_sequencing(&mut model, problem, &task_vars, &assignments);

        let mut builder = ObjectiveBuilder::new(problem, &task_vars, &setup_terms, h);
        let var = builder.build(&mut model, kind);
        model.set_objective(var, kind.direction());

        let sol = SimpleCpSolver::new().solve(&model, &SolverConfig::default());
        assert!(sol.is_solution(), "no solution for {kind:?}");
        (sol.objective_value.unwrap(), h)
    }

    #[test]
    fn test_scaled_cost_per_unit_rounds() {
        let m = Machine::new(1, 0).with_cost(100.0);
        assert_eq!(scaled_cost_per_unit(&m, 4), 2500); // 25.00 per unit
        let m = Machine::new(2, 0).with_cost(75.0);
        assert_eq!(scaled_cost_per_unit(&m, 4), 1875); // 18.75 per unit
        let m = Machine::new(3, 0).with_cost(10.0);
        assert_eq!(scaled_cost_per_unit(&m, 3), 333); // 3.333... rounds down
    }

    #[test]
    fn test_total_cost_prefers_cheap_machine() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(10.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 4).with_mode(2, 4)));
        let (raw, _) = solve_for(&p, ObjectiveKind::TotalCost);
        // 4 units on the 10/hr machine at 1 unit/hr: 40.00 → 4000 in x100.
        assert_eq!(raw, 4000);
    }

    #[test]
    fn test_max_lateness_zero_when_on_time() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0))
            .with_job(Job::new(1).with_due_date(10).with_task(Task::new(1, 1).with_mode(1, 4)));
        let (raw, _) = solve_for(&p, ObjectiveKind::MaxLateness);
        // Completion 4 against due 10.
        assert_eq!(raw, -6);
    }

    #[test]
    fn test_total_tardiness_clamps_early_jobs() {
        // Two jobs on one machine, due 4 each: one must be late by 4.
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0))
            .with_job(Job::new(1).with_due_date(4).with_task(Task::new(1, 1).with_mode(1, 4)))
            .with_job(Job::new(2).with_due_date(4).with_task(Task::new(2, 2).with_mode(1, 4)));
        let (raw, _) = solve_for(&p, ObjectiveKind::TotalTardiness);
        assert_eq!(raw, 4);
    }

    #[test]
    fn test_utilization_maximize_picks_long_mode() {
        // One machine, a single task with a 2-unit and a 6-unit mode on
        // it. Maximizing utilization keeps the machine busy longer.
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2).with_mode(1, 6)));
        let (raw, h) = solve_for(&p, ObjectiveKind::Utilization);
        assert_eq!(h, 6);
        assert_eq!(raw, UTILIZATION_SCALE); // 6 busy units of a 6-unit horizon
    }

    #[test]
    fn test_total_setup_time_minimized_to_zero_with_spare_machine() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0))
            .with_machine(Machine::new(2, 0))
            .with_job(
                Job::new(1)
                    .with_task(Task::new(1, 1).with_mode(1, 3).with_mode(2, 3).with_setup())
                    .with_task(Task::new(2, 1).with_mode(1, 3).with_mode(2, 3).with_setup()),
            )
            .with_setup_times(SetupTimes::new().with(1, 2, 5).with(2, 1, 5));
        let (raw, _) = solve_for(&p, ObjectiveKind::TotalSetupTime);
        assert_eq!(raw, 0);
    }

    #[test]
    fn test_weighted_completion_orders_heavy_job_first() {
        // One machine, two 4-unit jobs with weights 5 and 1. Serving the
        // heavy job first gives 5*4 + 1*8 = 28 (vs 5*8 + 1*4 = 44).
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0))
            .with_job(
                Job::new(1).with_weight(5).with_task(Task::new(1, 1).with_mode(1, 4)),
            )
            .with_job(Job::new(2).with_task(Task::new(2, 2).with_mode(1, 4)));
        let (raw, _) = solve_for(&p, ObjectiveKind::WeightedCompletion);
        assert_eq!(raw, 28);
    }

    #[test]
    fn test_evaluate_matches_hand_schedule() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(50.0))
            .with_time_units_per_hour(4)
            .with_job(Job::new(1).with_due_date(6).with_task(Task::new(1, 1).with_mode(1, 4)))
            .with_job(Job::new(2).with_weight(2).with_task(Task::new(2, 2).with_mode(2, 8)));

        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(1, 1, 1, 0, 4));
        s.add_assignment(Assignment::new(2, 2, 2, 0, 8));

        let h = 12;
        assert!((evaluate_objective(&p, &s, ObjectiveKind::Makespan, h) - 8.0).abs() < 1e-9);
        // Job 2 has no due date → horizon 12 substitutes: lateness -4.
        assert!(
            (evaluate_objective(&p, &s, ObjectiveKind::TotalLateness, h) - (-2.0 + -4.0)).abs()
                < 1e-9
        );
        assert!((evaluate_objective(&p, &s, ObjectiveKind::MaxLateness, h) - (-2.0)).abs() < 1e-9);
        assert!((evaluate_objective(&p, &s, ObjectiveKind::TotalTardiness, h) - 0.0).abs() < 1e-9);
        // 4 units at 100/hr + 8 units at 50/hr, 4 units per hour.
        assert!((evaluate_objective(&p, &s, ObjectiveKind::TotalCost, h) - 200.0).abs() < 1e-9);
        assert!(
            (evaluate_objective(&p, &s, ObjectiveKind::WeightedCompletion, h) - (4.0 + 16.0))
                .abs()
                < 1e-9
        );
        // 12 busy units over 2 machines x 12 horizon.
        assert!((evaluate_objective(&p, &s, ObjectiveKind::Utilization, h) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_setup_time_counts_realized_direction() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0))
            .with_job(
                Job::new(1)
                    .with_task(Task::new(1, 1).with_mode(1, 3).with_setup())
                    .with_task(Task::new(2, 1).with_mode(1, 3).with_setup()),
            )
            .with_setup_times(SetupTimes::new().with(1, 2, 4).with(2, 1, 7));

        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(1, 1, 1, 0, 3));
        s.add_assignment(Assignment::new(2, 1, 1, 7, 10));
        assert!(
            (evaluate_objective(&p, &s, ObjectiveKind::TotalSetupTime, 20) - 4.0).abs() < 1e-9
        );

        let mut rev = Schedule::new();
        rev.add_assignment(Assignment::new(2, 1, 1, 0, 3));
        rev.add_assignment(Assignment::new(1, 1, 1, 10, 13));
        assert!(
            (evaluate_objective(&p, &rev, ObjectiveKind::TotalSetupTime, 20) - 7.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_evaluate_empty_schedule() {
        let p = Problem::new();
        let s = Schedule::new();
        for kind in [
            ObjectiveKind::Makespan,
            ObjectiveKind::TotalLateness,
            ObjectiveKind::MaxLateness,
            ObjectiveKind::TotalTardiness,
            ObjectiveKind::TotalCost,
            ObjectiveKind::WeightedCompletion,
            ObjectiveKind::Utilization,
            ObjectiveKind::TotalSetupTime,
        ] {
            assert_eq!(evaluate_objective(&p, &s, kind, 10), 0.0);
        }
    }
}
