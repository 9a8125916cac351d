//! Constraint programming primitives.
//!
//! The modelling layer between the scheduling compiler and a solving
//! engine: bounded integer, boolean, and interval variables; weighted
//! linear (in)equalities with optional enforcement literals; exactly-one,
//! no-overlap, and cumulative constraints; a single-variable objective.
//!
//! # Design
//!
//! [`CpModel`] is inert data — the [`CpSolver`] trait is the sole
//! boundary to a solving engine, so external backends (OR-Tools, CPLEX)
//! can be plugged in. [`SimpleCpSolver`] is the built-in exact reference
//! backend for self-contained use and tests.
//!
//! Domain-specific objectives (makespan, tardiness) belong to the
//! compiler layer; this module knows only `Minimize`/`Maximize` over one
//! variable.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod simple;
mod solver;

pub use model::{
    BoolVar, CmpOp, CpConstraint, CpModel, IntVar, Interval, IntervalId, LinearConstraint,
    ModelCheckpoint, ObjectiveDirection,
};
pub use simple::SimpleCpSolver;
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
