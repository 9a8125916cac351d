//! Scheduling façade: validate, compile, orchestrate, extract.
//!
//! [`Scheduler`] is the one-stop entry point. It validates the problem
//! and objective configuration, hands the work to the orchestrator, and
//! returns either a single solution or a Pareto frontier. Hard
//! validation issues abort with an error; warnings are logged and the
//! run proceeds.

use thiserror::Error;
use tracing::warn;

use crate::cp::{CpSolver, SimpleCpSolver, SolverConfig, SolverStatus};
use crate::models::{
    MultiObjectiveConfig, ObjectiveSolution, ParetoFrontier, Problem, Schedule,
};
use crate::orchestrator::{OrchestrationResult, Orchestrator, PhaseLog};
use crate::validation::{self, Severity, ValidationIssue};

/// Errors a scheduling run can surface.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The problem failed structural validation.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),
    /// The objective configuration is unusable for its strategy.
    #[error("invalid objective configuration: {0}")]
    InvalidConfig(String),
    /// No strategy solve produced a usable schedule.
    #[error("no feasible schedule (backend status: {status:?})")]
    NoSolution {
        /// Status of the decisive failed solve.
        status: SolverStatus,
        /// Per-solve log up to and including the failure.
        phases: Vec<PhaseLog>,
    },
}

/// Result of a successful scheduling run.
#[derive(Debug, Clone)]
pub enum SchedulingOutcome {
    /// One schedule, produced by a single-solution strategy.
    Single {
        /// The solution with all requested metric values.
        solution: ObjectiveSolution,
        /// Per-solve log.
        phases: Vec<PhaseLog>,
    },
    /// A sampled frontier, produced by Pareto sampling.
    Pareto {
        /// The dominance-free frontier.
        frontier: ParetoFrontier,
        /// Balanced pick from the frontier.
        recommended: Option<ObjectiveSolution>,
        /// Per-solve log.
        phases: Vec<PhaseLog>,
    },
}

impl SchedulingOutcome {
    /// The headline solution: the single result, or the recommended
    /// frontier point.
    pub fn solution(&self) -> Option<&ObjectiveSolution> {
        match self {
            SchedulingOutcome::Single { solution, .. } => Some(solution),
            SchedulingOutcome::Pareto { recommended, .. } => recommended.as_ref(),
        }
    }

    /// The headline timetable, when a solution exists.
    pub fn schedule(&self) -> Option<&Schedule> {
        self.solution().map(|s| &s.schedule)
    }

    /// Per-solve log of the run.
    pub fn phases(&self) -> &[PhaseLog] {
        match self {
            SchedulingOutcome::Single { phases, .. } => phases,
            SchedulingOutcome::Pareto { phases, .. } => phases,
        }
    }
}

/// End-to-end scheduler over a pluggable solving backend.
pub struct Scheduler<S = SimpleCpSolver> {
    orchestrator: Orchestrator<S>,
}

impl Scheduler<SimpleCpSolver> {
    /// Creates a scheduler over the built-in exact backend.
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::new(SimpleCpSolver::new()),
        }
    }
}

impl Default for Scheduler<SimpleCpSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CpSolver> Scheduler<S> {
    /// Creates a scheduler over a custom backend.
    pub fn with_solver(solver: S) -> Self {
        Self {
            orchestrator: Orchestrator::new(solver),
        }
    }

    /// Sets the per-solve limits.
    pub fn with_solver_config(self, config: SolverConfig) -> Self {
        Self {
            orchestrator: self.orchestrator.with_solver_config(config),
        }
    }

    /// Validates and solves a problem under an objective configuration.
    pub fn schedule(
        &self,
        problem: &Problem,
        config: &MultiObjectiveConfig,
    ) -> Result<SchedulingOutcome, ScheduleError> {
        let issues = validation::validate_problem(problem);
        if let Some(message) = hard_summary(&issues) {
            return Err(ScheduleError::InvalidProblem(message));
        }
        log_warnings(&issues);

        let issues = validation::validate_config(config, problem);
        if let Some(message) = hard_summary(&issues) {
            return Err(ScheduleError::InvalidConfig(message));
        }
        log_warnings(&issues);

        match self.orchestrator.optimize(problem, config) {
            OrchestrationResult::Single { solution, phases } => {
                Ok(SchedulingOutcome::Single { solution, phases })
            }
            OrchestrationResult::Pareto {
                frontier,
                recommended,
                phases,
            } => Ok(SchedulingOutcome::Pareto {
                frontier,
                recommended,
                phases,
            }),
            OrchestrationResult::NoSolution { status, phases } => {
                Err(ScheduleError::NoSolution { status, phases })
            }
        }
    }
}

fn hard_summary(issues: &[ValidationIssue]) -> Option<String> {
    let hard: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity == Severity::Hard)
        .map(|i| i.message.as_str())
        .collect();
    if hard.is_empty() {
        None
    } else {
        Some(hard.join("; "))
    }
}

fn log_warnings(issues: &[ValidationIssue]) {
    for issue in issues {
        if issue.severity == Severity::Warning {
            warn!(kind = ?issue.kind, "{}", issue.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::expand;
    use crate::models::{
        Job, JobInstance, JobTemplate, Machine, ObjectiveKind, ObjectiveWeight,
        OptimizationStrategy, Task, TemplateTask, WorkCell,
    };

    fn small_problem() -> Problem {
        Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(60.0))
            .with_machine(Machine::new(2, 0).with_cost(30.0))
            .with_job(
                Job::new(1)
                    .with_due_date(10)
                    .with_task(Task::new(1, 1).with_mode(1, 4))
                    .with_task(Task::new(2, 1).with_mode(2, 3).with_predecessor(1)),
            )
    }

    fn lexicographic_makespan() -> MultiObjectiveConfig {
        MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
    }

    #[test]
    fn test_end_to_end_single() {
        let outcome = Scheduler::new()
            .schedule(&small_problem(), &lexicographic_makespan())
            .unwrap();
        let solution = outcome.solution().unwrap();
        assert!((solution.value(ObjectiveKind::Makespan).unwrap() - 7.0).abs() < 1e-9);
        assert_eq!(outcome.schedule().unwrap().assignment_count(), 2);
        assert_eq!(outcome.phases().len(), 1);
    }

    #[test]
    fn test_invalid_problem_is_rejected() {
        let p = small_problem().with_job(Job::new(2).with_task(Task::new(9, 2)));
        let err = Scheduler::new()
            .schedule(&p, &lexicographic_makespan())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid problem:"));
        assert!(message.contains("Task 9"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = MultiObjectiveConfig::new(OptimizationStrategy::WeightedSum);
        let err = Scheduler::new()
            .schedule(&small_problem(), &config)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConfig(_)));
    }

    #[test]
    fn test_no_solution_surfaces_status() {
        let config = MultiObjectiveConfig::new(OptimizationStrategy::EpsilonConstraint)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(
                ObjectiveWeight::new(ObjectiveKind::TotalCost)
                    .with_priority(2)
                    .with_epsilon(0.5),
            );
        let err = Scheduler::new()
            .schedule(&small_problem(), &config)
            .unwrap_err();
        match err {
            ScheduleError::NoSolution { status, phases } => {
                assert_eq!(status, SolverStatus::Infeasible);
                // The failed epsilon solve is still logged.
                assert_eq!(phases.len(), 1);
                assert_eq!(phases[0].status, SolverStatus::Infeasible);
            }
            other => panic!("expected NoSolution, got {other}"),
        }
    }

    #[test]
    fn test_pareto_outcome_shape() {
        let config = MultiObjectiveConfig::new(OptimizationStrategy::ParetoOptimal)
            .with_sample_count(2)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_priority(2));
        let outcome = Scheduler::new()
            .schedule(&small_problem(), &config)
            .unwrap();
        let SchedulingOutcome::Pareto {
            frontier,
            recommended,
            ..
        } = &outcome
        else {
            panic!("expected a pareto outcome");
        };
        assert!(!frontier.is_empty());
        assert!(recommended.is_some());
    }

    #[test]
    fn test_template_expansion_end_to_end() {
        let template = JobTemplate::new(1)
            .with_task(TemplateTask::new(0).with_mode(1, 2))
            .with_task(TemplateTask::new(1).with_mode(2, 2))
            .with_precedence(0, 1);
        let jobs = expand(
            &template,
            &[
                JobInstance::new(1, 1).with_due_date(10),
                JobInstance::new(2, 1).with_due_date(12),
            ],
        );

        let mut p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0))
            .with_machine(Machine::new(2, 0));
        for job in jobs {
            p = p.with_job(job);
        }

        let outcome = Scheduler::new()
            .schedule(&p, &lexicographic_makespan())
            .unwrap();
        let schedule = outcome.schedule().unwrap();
        assert_eq!(schedule.assignment_count(), 4);
        // Machine 1 serializes the two first-stage tasks; the pipeline
        // finishes in 6.
        assert!((outcome.solution().unwrap().value(ObjectiveKind::Makespan).unwrap() - 6.0).abs() < 1e-9);
    }
}
