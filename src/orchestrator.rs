//! Multi-objective optimization strategies.
//!
//! Runs one of four strategies over a compiled model:
//!
//! - **Lexicographic**: one solve per objective in priority order, each
//!   phase freezing its optimum (within a relative tolerance band)
//!   before the next begins.
//! - **Weighted sum**: a single solve of a fixed-point weighted
//!   aggregate, maximization terms entering negated.
//! - **Epsilon constraint**: bound every secondary objective by its
//!   epsilon, then optimize the primary alone.
//! - **Pareto sampling**: per-objective extremes plus deterministic
//!   evenly spaced probes between them, collected into a dominance-free
//!   frontier with a balanced recommendation.
//!
//! Probes and phases are isolated: a failed solve is logged and skipped,
//! never aborting the surviving results.
//!
//! # Reference
//! Ehrgott (2005), "Multicriteria Optimization", Ch. 3-4 (scalarization)

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::analysis::TradeOffAnalyzer;
use crate::compile::{evaluate_objective, CompiledModel, ModelBuilder};
use crate::cp::{CmpOp, CpSolution, CpSolver, ObjectiveDirection, SolverConfig, SolverStatus};
use crate::models::{
    MultiObjectiveConfig, ObjectiveKind, ObjectiveSolution, OptimizationStrategy,
    ParetoFrontier, ParetoSolution, Problem,
};

/// Fixed-point factor for weighted-sum coefficients.
const WEIGHT_SCALE: f64 = 1000.0;

/// Range below which a Pareto probe axis is not worth sampling.
const PROBE_RANGE_EPS: f64 = 1e-9;

/// One logged backend solve within a strategy run.
#[derive(Debug, Clone)]
pub struct PhaseLog {
    /// What this solve was for (phase, probe, extreme).
    pub label: String,
    /// Terminal backend status.
    pub status: SolverStatus,
    /// Raw objective value in fixed-point units, when solved.
    pub raw_objective: Option<i64>,
    /// Wall time of this solve.
    pub wall_time: Duration,
    /// Search nodes of this solve.
    pub nodes: u64,
}

/// Outcome of one strategy run.
#[derive(Debug, Clone)]
pub enum OrchestrationResult {
    /// Strategies that produce a single schedule.
    Single {
        /// The solution with all requested metric values.
        solution: ObjectiveSolution,
        /// Per-solve log.
        phases: Vec<PhaseLog>,
    },
    /// Pareto sampling: a frontier plus a balanced recommendation.
    Pareto {
        /// The dominance-free frontier.
        frontier: ParetoFrontier,
        /// Balanced pick from the frontier, if it is non-empty.
        recommended: Option<ObjectiveSolution>,
        /// Per-solve log.
        phases: Vec<PhaseLog>,
    },
    /// No strategy solve produced a usable schedule.
    NoSolution {
        /// Status of the decisive failed solve.
        status: SolverStatus,
        /// Per-solve log.
        phases: Vec<PhaseLog>,
    },
}

/// Drives multi-objective strategies over a solving backend.
pub struct Orchestrator<S> {
    solver: S,
    solver_config: SolverConfig,
}

impl<S: CpSolver> Orchestrator<S> {
    /// Creates an orchestrator over a backend with default limits.
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            solver_config: SolverConfig::default(),
        }
    }

    /// Sets the per-solve limits.
    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    /// Runs the configured strategy on a validated problem.
    pub fn optimize(
        &self,
        problem: &Problem,
        config: &MultiObjectiveConfig,
    ) -> OrchestrationResult {
        info!(
            strategy = ?config.strategy,
            objectives = config.objectives.len(),
            "starting multi-objective run"
        );
        match config.strategy {
            OptimizationStrategy::Lexicographical => self.lexicographic(problem, config),
            OptimizationStrategy::WeightedSum => self.weighted_sum(problem, config),
            OptimizationStrategy::EpsilonConstraint => self.epsilon_constraint(problem, config),
            OptimizationStrategy::ParetoOptimal => self.pareto(problem, config),
        }
    }

    fn lexicographic(
        &self,
        problem: &Problem,
        config: &MultiObjectiveConfig,
    ) -> OrchestrationResult {
        let kinds = config.kinds();
        let mut compiled = ModelBuilder::compile(problem, &kinds);
        let mut phases = Vec::new();
        let mut last: Option<CpSolution> = None;

        for objective in config.by_priority() {
            compiled.activate_objective(objective.kind);
            let sol = self.solver.solve(compiled.model(), &self.solver_config);
            phases.push(phase_log(format!("phase_{:?}", objective.kind), &sol));

            if !sol.is_solution() {
                warn!(kind = ?objective.kind, status = ?sol.status, "lexicographic phase failed");
                return OrchestrationResult::NoSolution {
                    status: sol.status,
                    phases,
                };
            }

            let value = sol.objective_value.unwrap_or(0);
            let band =
                (value.abs() as f64 * config.lexicographic_tolerance).ceil() as i64;
            compiled.bound_objective(objective.kind, Some(value - band), Some(value + band));
            debug!(kind = ?objective.kind, value, band, "phase value frozen");
            last = Some(sol);
        }

        match last {
            Some(sol) => OrchestrationResult::Single {
                solution: build_solution(problem, &compiled, &sol, &kinds),
                phases,
            },
            None => OrchestrationResult::NoSolution {
                status: SolverStatus::Unknown,
                phases,
            },
        }
    }

    fn weighted_sum(
        &self,
        problem: &Problem,
        config: &MultiObjectiveConfig,
    ) -> OrchestrationResult {
        let kinds = config.kinds();
        let mut compiled = ModelBuilder::compile(problem, &kinds);

        let mut terms = Vec::new();
        for objective in &config.objectives {
            let Some(var) = compiled.objective_var(objective.kind) else {
                continue;
            };
            let weight = (objective.weight * WEIGHT_SCALE).round() as i64;
            if weight == 0 {
                continue;
            }
            let coeff = match objective.kind.direction() {
                ObjectiveDirection::Minimize => weight,
                ObjectiveDirection::Maximize => -weight,
            };
            terms.push((coeff, var));
        }

        // Aggregate domain from the term domains.
        let (mut lb, mut ub) = (0i64, 0i64);
        for &(coeff, var) in &terms {
            let (lo, hi) = compiled.model().domain(var);
            if coeff >= 0 {
                lb += coeff * lo;
                ub += coeff * hi;
            } else {
                lb += coeff * hi;
                ub += coeff * lo;
            }
        }
        let model = compiled.model_mut();
        let aggregate = model.new_int_var(lb, ub, "weighted_objective");
        let mut eq_terms = vec![(1, aggregate)];
        eq_terms.extend(terms.iter().map(|&(c, v)| (-c, v)));
        model.add_linear(eq_terms, CmpOp::Eq, 0);
        model.set_objective(aggregate, ObjectiveDirection::Minimize);

        let sol = self.solver.solve(compiled.model(), &self.solver_config);
        let phases = vec![phase_log("weighted_sum".to_string(), &sol)];
        if sol.is_solution() {
            OrchestrationResult::Single {
                solution: build_solution(problem, &compiled, &sol, &kinds),
                phases,
            }
        } else {
            OrchestrationResult::NoSolution {
                status: sol.status,
                phases,
            }
        }
    }

    fn epsilon_constraint(
        &self,
        problem: &Problem,
        config: &MultiObjectiveConfig,
    ) -> OrchestrationResult {
        let kinds = config.kinds();
        let mut compiled = ModelBuilder::compile(problem, &kinds);
        let Some(primary) = config.primary() else {
            return OrchestrationResult::NoSolution {
                status: SolverStatus::Unknown,
                phases: Vec::new(),
            };
        };
        let primary_kind = primary.kind;

        for objective in &config.objectives {
            if objective.kind == primary_kind {
                continue;
            }
            if let Some(epsilon) = objective.epsilon {
                let raw = compiled.raw_bound(objective.kind, epsilon);
                match objective.kind.direction() {
                    ObjectiveDirection::Minimize => {
                        compiled.bound_objective(objective.kind, None, Some(raw));
                    }
                    ObjectiveDirection::Maximize => {
                        compiled.bound_objective(objective.kind, Some(raw), None);
                    }
                }
                debug!(kind = ?objective.kind, raw, "epsilon bound applied");
            }
        }

        compiled.activate_objective(primary_kind);
        let sol = self.solver.solve(compiled.model(), &self.solver_config);
        let phases = vec![phase_log(format!("epsilon_{primary_kind:?}"), &sol)];
        if sol.is_solution() {
            OrchestrationResult::Single {
                solution: build_solution(problem, &compiled, &sol, &kinds),
                phases,
            }
        } else {
            OrchestrationResult::NoSolution {
                status: sol.status,
                phases,
            }
        }
    }

    fn pareto(&self, problem: &Problem, config: &MultiObjectiveConfig) -> OrchestrationResult {
        let kinds = config.kinds();
        let mut compiled = ModelBuilder::compile(problem, &kinds);
        let mut frontier = ParetoFrontier::new(kinds.clone());
        let mut phases = Vec::new();
        let mut ranges: BTreeMap<ObjectiveKind, (f64, f64)> = BTreeMap::new();
        let mut last_status = SolverStatus::Unknown;

        // Per-objective extremes anchor the frontier and the probe ranges.
        for &kind in &kinds {
            let checkpoint = compiled.checkpoint();
            compiled.activate_objective(kind);
            let sol = self.solver.solve(compiled.model(), &self.solver_config);
            phases.push(phase_log(format!("pareto_extreme_{kind:?}"), &sol));
            last_status = sol.status;

            if sol.is_solution() {
                let solution = build_solution(problem, &compiled, &sol, &kinds);
                for (&k, &v) in &solution.values {
                    ranges
                        .entry(k)
                        .and_modify(|(lo, hi)| {
                            *lo = lo.min(v);
                            *hi = hi.max(v);
                        })
                        .or_insert((v, v));
                }
                frontier.insert(ParetoSolution::new(solution));
            } else {
                warn!(kind = ?kind, status = ?sol.status, "extreme solve failed");
            }
            compiled.rollback(checkpoint);
        }

        if frontier.is_empty() {
            return OrchestrationResult::NoSolution {
                status: last_status,
                phases,
            };
        }

        // Evenly spaced probes between each secondary objective's
        // extremes, re-optimizing the primary under the probe bound.
        let primary_kind = config.primary().map(|o| o.kind).unwrap_or(kinds[0]);
        let samples = config.pareto_sample_count;
        for &kind in &kinds {
            if kind == primary_kind {
                continue;
            }
            let Some(&(lo, hi)) = ranges.get(&kind) else {
                continue;
            };
            if hi - lo <= PROBE_RANGE_EPS {
                continue;
            }
            for step in 1..=samples {
                let fraction = step as f64 / (samples + 1) as f64;
                let (bound_lb, bound_ub, target) = match kind.direction() {
                    ObjectiveDirection::Minimize => {
                        let t = lo + (hi - lo) * fraction;
                        (None, Some(compiled.raw_bound(kind, t)), t)
                    }
                    ObjectiveDirection::Maximize => {
                        let t = hi - (hi - lo) * fraction;
                        (Some(compiled.raw_bound(kind, t)), None, t)
                    }
                };

                let checkpoint = compiled.checkpoint();
                compiled.bound_objective(kind, bound_lb, bound_ub);
                compiled.activate_objective(primary_kind);
                let sol = self.solver.solve(compiled.model(), &self.solver_config);
                phases.push(phase_log(
                    format!("pareto_probe_{kind:?}_{step}"),
                    &sol,
                ));

                if sol.is_solution() {
                    let solution = build_solution(problem, &compiled, &sol, &kinds);
                    frontier.insert(ParetoSolution::new(solution));
                } else {
                    debug!(kind = ?kind, target, status = ?sol.status, "probe skipped");
                }
                compiled.rollback(checkpoint);
            }
        }

        let recommended = TradeOffAnalyzer::new(&frontier)
            .balanced()
            .map(|p| p.solution.clone());
        info!(
            frontier = frontier.len(),
            solves = phases.len(),
            "pareto sampling finished"
        );
        OrchestrationResult::Pareto {
            frontier,
            recommended,
            phases,
        }
    }
}

fn phase_log(label: String, sol: &CpSolution) -> PhaseLog {
    PhaseLog {
        label,
        status: sol.status,
        raw_objective: sol.objective_value,
        wall_time: sol.wall_time,
        nodes: sol.nodes,
    }
}

/// Materializes a backend solution: extracts the schedule and evaluates
/// every requested metric from it in natural units.
fn build_solution(
    problem: &Problem,
    compiled: &CompiledModel,
    sol: &CpSolution,
    kinds: &[ObjectiveKind],
) -> ObjectiveSolution {
    let schedule = compiled.extract_schedule(problem, sol);
    let values = kinds
        .iter()
        .map(|&kind| {
            (
                kind,
                evaluate_objective(problem, &schedule, kind, compiled.horizon()),
            )
        })
        .collect();
    ObjectiveSolution {
        values,
        status: sol.status,
        wall_time: sol.wall_time,
        schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::SimpleCpSolver;
    use crate::models::{Job, Machine, ObjectiveWeight, Task, WorkCell};

    fn orchestrator() -> Orchestrator<SimpleCpSolver> {
        Orchestrator::new(SimpleCpSolver::new())
    }

    /// Three jobs in 15-minute units: a due-critical chain on two
    /// machines plus fill work.
    fn shop_fixture() -> Problem {
        Problem::new()
            .with_time_units_per_hour(4)
            .with_work_cell(WorkCell::new(0, 3))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(50.0))
            .with_machine(Machine::new(3, 0).with_cost(75.0))
            .with_job(
                Job::new(1)
                    .with_due_date(20)
                    .with_task(Task::new(11, 1).with_mode(1, 5))
                    .with_task(Task::new(12, 1).with_mode(3, 3).with_predecessor(11)),
            )
            .with_job(
                Job::new(2)
                    .with_due_date(18)
                    .with_task(Task::new(21, 2).with_mode(2, 6))
                    .with_task(Task::new(22, 2).with_mode(3, 6).with_predecessor(21))
                    .with_task(Task::new(23, 2).with_mode(2, 6).with_predecessor(22)),
            )
            .with_job(
                Job::new(3)
                    .with_due_date(30)
                    .with_task(Task::new(31, 3).with_mode(1, 4)),
            )
    }

    #[test]
    fn test_lexicographic_phased_values() {
        let config = MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::MaxLateness).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(2))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_priority(3));

        let result = orchestrator().optimize(&shop_fixture(), &config);
        let OrchestrationResult::Single { solution, phases } = result else {
            panic!("expected a single solution");
        };

        assert_eq!(phases.len(), 3);
        assert!(phases.iter().all(|p| p.status.is_solution()));
        // Job 2's chain needs 18 units ending on machine 2; with due
        // date 18 the best max lateness is exactly on time.
        assert!((solution.value(ObjectiveKind::MaxLateness).unwrap() - 0.0).abs() < 1e-9);
        assert!((solution.value(ObjectiveKind::Makespan).unwrap() - 18.0).abs() < 1e-9);
        // Busy: 9 units at 100/hr + 12 at 50/hr + 9 at 75/hr, 4 units/hr.
        assert!((solution.value(ObjectiveKind::TotalCost).unwrap() - 543.75).abs() < 1e-9);

        // The schedule itself honors the chain.
        let s = &solution.schedule;
        assert_eq!(s.assignment_count(), 6);
        let a21 = s.assignment_for_task(21).unwrap();
        let a22 = s.assignment_for_task(22).unwrap();
        let a23 = s.assignment_for_task(23).unwrap();
        assert!(a22.start >= a21.end);
        assert!(a23.start >= a22.end);
    }

    #[test]
    fn test_lexicographic_priority_order_matters() {
        // Makespan first on a single machine with a slow cheap mode and a
        // fast expensive one.
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(10.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2).with_mode(2, 8)));

        let makespan_first = MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_priority(2));
        let OrchestrationResult::Single { solution, .. } =
            orchestrator().optimize(&p, &makespan_first)
        else {
            panic!("expected a single solution");
        };
        assert!((solution.value(ObjectiveKind::Makespan).unwrap() - 2.0).abs() < 1e-9);

        let cost_first = MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(2));
        let OrchestrationResult::Single { solution, .. } =
            orchestrator().optimize(&p, &cost_first)
        else {
            panic!("expected a single solution");
        };
        // 8 units at 10/hr beats 2 units at 100/hr.
        assert!((solution.value(ObjectiveKind::TotalCost).unwrap() - 80.0).abs() < 1e-9);
        assert!((solution.value(ObjectiveKind::Makespan).unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_lexicographic_tolerance_relaxes_later_phases() {
        // Same trade-off; 100% tolerance on makespan admits the cheap
        // mode in the cost phase.
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(10.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2).with_mode(2, 4)));

        let config = MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
            .with_tolerance(1.0)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_priority(2));
        let OrchestrationResult::Single { solution, .. } = orchestrator().optimize(&p, &config)
        else {
            panic!("expected a single solution");
        };
        // Makespan may double from 2 to 4, buying cost 40 instead of 200.
        assert!((solution.value(ObjectiveKind::TotalCost).unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_sum_balances() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(10.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2).with_mode(2, 8)));

        // Cost dominates the aggregate.
        let config = MultiObjectiveConfig::new(OptimizationStrategy::WeightedSum)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_weight(0.001))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_weight(1.0));
        let OrchestrationResult::Single { solution, phases } =
            orchestrator().optimize(&p, &config)
        else {
            panic!("expected a single solution");
        };
        assert_eq!(phases.len(), 1);
        assert!((solution.value(ObjectiveKind::TotalCost).unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_epsilon_constraint_bounds_secondary() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(10.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2).with_mode(2, 8)));

        // Cost must stay at or below 100: the fast 200-cost mode is out.
        let config = MultiObjectiveConfig::new(OptimizationStrategy::EpsilonConstraint)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(
                ObjectiveWeight::new(ObjectiveKind::TotalCost)
                    .with_priority(2)
                    .with_epsilon(100.0),
            );
        let OrchestrationResult::Single { solution, .. } = orchestrator().optimize(&p, &config)
        else {
            panic!("expected a single solution");
        };
        assert!(solution.value(ObjectiveKind::TotalCost).unwrap() <= 100.0 + 1e-9);
        assert!((solution.value(ObjectiveKind::Makespan).unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_epsilon_constraint_infeasible_bound() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2)));

        // Any schedule costs 200; epsilon 100 admits nothing.
        let config = MultiObjectiveConfig::new(OptimizationStrategy::EpsilonConstraint)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(
                ObjectiveWeight::new(ObjectiveKind::TotalCost)
                    .with_priority(2)
                    .with_epsilon(100.0),
            );
        let result = orchestrator().optimize(&p, &config);
        let OrchestrationResult::NoSolution { status, .. } = result else {
            panic!("expected no solution");
        };
        assert_eq!(status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_pareto_frontier_spans_trade_off() {
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 2))
            .with_machine(Machine::new(1, 0).with_cost(100.0))
            .with_machine(Machine::new(2, 0).with_cost(10.0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 2).with_mode(2, 8)))
            .with_job(Job::new(2).with_task(Task::new(2, 2).with_mode(1, 2).with_mode(2, 8)));

        let config = MultiObjectiveConfig::new(OptimizationStrategy::ParetoOptimal)
            .with_sample_count(3)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::TotalCost).with_priority(2));
        let OrchestrationResult::Pareto {
            frontier,
            recommended,
            phases,
        } = orchestrator().optimize(&p, &config)
        else {
            panic!("expected a frontier");
        };

        assert!(!frontier.is_empty());
        assert!(recommended.is_some());
        // Two extremes plus up to three probes.
        assert!(phases.len() >= 2 && phases.len() <= 5);

        // No retained point weakly dominates another.
        for a in &frontier.solutions {
            for b in &frontier.solutions {
                let va = a.value_vector(&frontier.kinds);
                let vb = b.value_vector(&frontier.kinds);
                assert!(!frontier.dominates(&va, &vb) || va == vb);
            }
        }

        // The makespan extreme survives: both tasks fast on machine 1.
        let makespans: Vec<f64> = frontier
            .solutions
            .iter()
            .filter_map(|s| s.solution.value(ObjectiveKind::Makespan))
            .collect();
        assert!(makespans.iter().any(|&m| (m - 4.0).abs() < 1e-9));
    }

    #[test]
    fn test_pareto_reports_no_solution_when_every_extreme_fails() {
        // Node limit 0 aborts every extreme solve before a leaf.
        let p = Problem::new()
            .with_work_cell(WorkCell::new(0, 1))
            .with_machine(Machine::new(1, 0))
            .with_job(Job::new(1).with_task(Task::new(1, 1).with_mode(1, 4)));
        let config = MultiObjectiveConfig::new(OptimizationStrategy::ParetoOptimal)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1));

        let orch = Orchestrator::new(SimpleCpSolver::new())
            .with_solver_config(SolverConfig::default().with_node_limit(0));
        let result = orch.optimize(&p, &config);
        assert!(matches!(result, OrchestrationResult::NoSolution { .. }));
    }

    #[test]
    fn test_frozen_phases_admit_resolve() {
        // Solving the fixture twice lexicographically is deterministic.
        let config = MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
            .with_objective(ObjectiveWeight::new(ObjectiveKind::MaxLateness).with_priority(1))
            .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(2));
        let p = shop_fixture();

        let first = orchestrator().optimize(&p, &config);
        let second = orchestrator().optimize(&p, &config);
        let (OrchestrationResult::Single { solution: a, .. }, OrchestrationResult::Single { solution: b, .. }) =
            (first, second)
        else {
            panic!("expected single solutions");
        };
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_capacity_sweep_makespan() {
        // Five 2-unit tasks on one machine of capacity c: optimal
        // makespan is ceil(5 / c) * 2.
        for (capacity, expected) in [(1, 10.0), (2, 6.0), (5, 2.0), (100, 2.0)] {
            let mut job = Job::new(1);
            for id in 1..=5 {
                job = job.with_task(Task::new(id, 1).with_mode(1, 2));
            }
            let p = Problem::new()
                .with_work_cell(WorkCell::new(0, 100))
                .with_machine(Machine::new(1, 0).with_capacity(capacity))
                .with_job(job);
            let config = MultiObjectiveConfig::new(OptimizationStrategy::Lexicographical)
                .with_objective(ObjectiveWeight::new(ObjectiveKind::Makespan).with_priority(1));

            let OrchestrationResult::Single { solution, .. } =
                orchestrator().optimize(&p, &config)
            else {
                panic!("expected a single solution at capacity {capacity}");
            };
            assert!(
                (solution.value(ObjectiveKind::Makespan).unwrap() - expected).abs() < 1e-9,
                "capacity {capacity}"
            );
            assert!(solution.schedule.peak_concurrency(1) <= capacity);
        }
    }
}
