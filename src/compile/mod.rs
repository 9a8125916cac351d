//! Problem-to-model compilation.
//!
//! [`ModelBuilder`] lowers a declarative [`Problem`] into a backend
//! [`CpModel`]: per-task variables and intervals, structural constraints
//! (mode selection, precedence, machine and work-cell capacity, setup
//! separation), and one integer variable per requested objective. The
//! resulting [`CompiledModel`] maps backend solutions back to
//! [`Schedule`]s and supports objective switching, bounding, and
//! freezing for the multi-objective orchestrator.

mod constraints;
mod objectives;
mod variables;

pub use objectives::evaluate_objective;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::cp::{CmpOp, CpModel, CpSolution, IntVar, ModelCheckpoint};
use crate::models::{Assignment, ObjectiveKind, Problem, Schedule};

use constraints::SetupTerm;
use objectives::ObjectiveBuilder;
use variables::TaskVars;

/// Size counters of a compiled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    /// Integer and boolean variables.
    pub variables: usize,
    /// Interval variables.
    pub intervals: usize,
    /// Constraints.
    pub constraints: usize,
}

/// A backend model plus the mappings to read solutions back out.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    model: CpModel,
    horizon: i64,
    task_vars: HashMap<u64, TaskVars>,
    objective_vars: BTreeMap<ObjectiveKind, IntVar>,
}

/// Compiles problems into backend models.
pub struct ModelBuilder;

impl ModelBuilder {
    /// Compiles a validated problem with variables for the given
    /// objectives.
    ///
    /// Compilation is total on validated input: references validation
    /// would reject are skipped rather than compiled wrong.
    pub fn compile(problem: &Problem, objectives: &[ObjectiveKind]) -> CompiledModel {
        let horizon = variables::horizon(problem);
        let mut model = CpModel::new();

        let task_vars = variables::build_task_vars(&mut model, problem, horizon);
        constraints::link_tasks(&mut model, problem, &task_vars);
        constraints::add_precedences(&mut model, problem, &task_vars);
        let assignments = constraints::build_assignments(&mut model, problem, &task_vars);
        constraints::add_machine_capacity(&mut model, problem, &assignments);
        constraints::add_work_cell_capacity(&mut model, problem, &assignments);
        let setup_terms: Vec<SetupTerm> = if problem.setup_times.is_empty() {
            Vec::new()
        } else {
            constraints::add_setup_sequencing(&mut model, problem, &task_vars, &assignments)
        };

        let mut objective_vars = BTreeMap::new();
        let mut builder = ObjectiveBuilder::new(problem, &task_vars, &setup_terms, horizon);
        for &kind in objectives {
            objective_vars
                .entry(kind)
                .or_insert_with(|| builder.build(&mut model, kind));
        }

        debug!(
            horizon,
            variables = model.var_count(),
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            objectives = objective_vars.len(),
            "problem compiled"
        );

        CompiledModel {
            model,
            horizon,
            task_vars,
            objective_vars,
        }
    }
}

impl CompiledModel {
    /// The backend model.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Mutable backend model, for strategy-owned auxiliary structure
    /// (aggregate objectives, probe bounds).
    pub(crate) fn model_mut(&mut self) -> &mut CpModel {
        &mut self.model
    }

    /// Planning horizon the model was compiled against.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Backend variable of a compiled objective.
    pub fn objective_var(&self, kind: ObjectiveKind) -> Option<IntVar> {
        self.objective_vars.get(&kind).copied()
    }

    /// Makes one compiled objective the active optimization target.
    pub fn activate_objective(&mut self, kind: ObjectiveKind) -> bool {
        match self.objective_var(kind) {
            Some(var) => {
                self.model.set_objective(var, kind.direction());
                true
            }
            None => false,
        }
    }

    /// Constrains a compiled objective variable to `[lb, ub]`.
    ///
    /// Used for lexicographic freezing and epsilon bounds; the band is in
    /// the objective's raw (fixed-point) units.
    pub fn bound_objective(&mut self, kind: ObjectiveKind, lb: Option<i64>, ub: Option<i64>) {
        let Some(var) = self.objective_var(kind) else {
            return;
        };
        if let Some(lb) = lb {
            self.model.add_linear(vec![(1, var)], CmpOp::Ge, lb);
        }
        if let Some(ub) = ub {
            self.model.add_linear(vec![(1, var)], CmpOp::Le, ub);
        }
    }

    /// Converts a natural-units bound to the objective's raw fixed-point
    /// units.
    pub fn raw_bound(&self, kind: ObjectiveKind, value: f64) -> i64 {
        (value * objectives::scale(kind)).round() as i64
    }

    /// Captures a restore point before temporary probe constraints.
    pub fn checkpoint(&self) -> ModelCheckpoint {
        self.model.checkpoint()
    }

    /// Drops everything added since the checkpoint.
    pub fn rollback(&mut self, checkpoint: ModelCheckpoint) {
        self.model.rollback(checkpoint);
    }

    /// Size counters.
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            variables: self.model.var_count(),
            intervals: self.model.interval_count(),
            constraints: self.model.constraint_count(),
        }
    }

    /// Reads a backend solution back into a timetable.
    ///
    /// Each task's machine is the one whose mode literal the solution set
    /// true; tasks the solution does not cover are skipped.
    pub fn extract_schedule(&self, problem: &Problem, solution: &CpSolution) -> Schedule {
        let mut schedule = Schedule::new();
        if !solution.is_solution() {
            return schedule;
        }
        for task in problem.tasks() {
            let Some(tv) = self.task_vars.get(&task.id) else {
                continue;
            };
            let (Some(start), Some(end)) =
                (solution.value(tv.start), solution.value(tv.end))
            else {
                continue;
            };
            let machine_id = task
                .modes
                .iter()
                .zip(&tv.mode_literals)
                .find(|(_, &lit)| solution.bool_value(lit) == Some(true))
                .map(|(mode, _)| mode.machine_id);
            if let Some(machine_id) = machine_id {
                schedule.add_assignment(Assignment::new(
                    task.id,
                    task.job_id,
                    machine_id,
                    start,
                    end,
                ));
            }
        }
        schedule
    }
}
