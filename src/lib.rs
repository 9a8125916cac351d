//! Multi-objective scheduling for flexible job shops.
//!
//! Compiles declarative multi-mode job-shop problems — jobs, tasks with
//! machine/duration alternatives, precedence DAGs, machine and work-cell
//! capacity, sequence-dependent setups — into constraint models, and
//! resolves competing objectives (makespan, lateness, cost, utilization,
//! setup time) with lexicographic, weighted-sum, epsilon-constraint, or
//! Pareto-sampling strategies.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Problem`, `Machine`, `WorkCell`,
//!   `Job`, `Task`, `JobTemplate`, `Schedule`, objective configuration
//! - **`validation`**: Input integrity checks (duplicate IDs, DAG
//!   cycles, machine refs, objective configuration)
//! - **`expand`**: Template-to-job expansion
//! - **`cp`**: Backend-neutral constraint model and the built-in exact
//!   solver
//! - **`compile`**: Problem-to-model lowering and objective evaluation
//! - **`orchestrator`**: Multi-objective strategies
//! - **`analysis`**: Trade-off selection over Pareto frontiers
//! - **`scheduler`**: The end-to-end façade
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Ehrgott (2005), "Multicriteria Optimization"

pub mod analysis;
pub mod compile;
pub mod cp;
pub mod expand;
pub mod models;
pub mod orchestrator;
pub mod scheduler;
pub mod validation;

pub use expand::expand;
pub use scheduler::{ScheduleError, Scheduler, SchedulingOutcome};
