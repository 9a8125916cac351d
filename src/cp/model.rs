//! CP model: decision variables and constraints.
//!
//! The model is a plain container: variables with integer bounds,
//! intervals over (start, size, end) triples, and a constraint list.
//! Solvers interpret it; nothing here propagates.

use serde::{Deserialize, Serialize};

/// A bounded integer decision variable (index into the model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntVar(pub(crate) usize);

/// A 0/1 decision variable (an [`IntVar`] with domain `[0, 1]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolVar(pub(crate) usize);

impl BoolVar {
    /// Views this boolean as an integer variable for linear terms.
    #[inline]
    pub fn as_int(self) -> IntVar {
        IntVar(self.0)
    }
}

/// An interval variable (index into the model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalId(pub(crate) usize);

/// Optimization direction over a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveDirection {
    /// Drive the objective variable down.
    Minimize,
    /// Drive the objective variable up.
    Maximize,
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Left side equals the constant.
    Eq,
    /// Left side is at most the constant.
    Le,
    /// Left side is at least the constant.
    Ge,
}

/// A weighted linear (in)equality `sum(coeff * var) op rhs`.
///
/// When `enforce` is set, the constraint only holds while the literal is
/// true; an unsatisfiable enforced constraint instead forces the literal
/// false (half-reified).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// (coefficient, variable) terms.
    pub terms: Vec<(i64, IntVar)>,
    /// Comparison operator.
    pub op: CmpOp,
    /// Right-hand constant.
    pub rhs: i64,
    /// Optional enforcement literal.
    pub enforce: Option<BoolVar>,
}

/// An interval over three integer variables, optionally guarded by a
/// presence literal (absent intervals impose nothing).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Interval {
    /// Start variable.
    pub start: IntVar,
    /// Size (duration) variable.
    pub size: IntVar,
    /// End variable.
    pub end: IntVar,
    /// Presence literal; `None` means always present.
    pub presence: Option<BoolVar>,
}

/// A constraint in the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CpConstraint {
    /// Weighted linear (in)equality.
    Linear(LinearConstraint),
    /// Exactly one of the literals is true.
    ExactlyOne(Vec<BoolVar>),
    /// Present intervals are pairwise non-overlapping.
    NoOverlap(Vec<IntervalId>),
    /// Concurrent demand of present intervals stays within capacity.
    Cumulative {
        /// Participating intervals.
        intervals: Vec<IntervalId>,
        /// Demand per interval (parallel to `intervals`).
        demands: Vec<i64>,
        /// Resource capacity.
        capacity: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VarDomain {
    pub lb: i64,
    pub ub: i64,
    pub name: String,
}

/// Restore point for [`CpModel::rollback`].
///
/// Captures the monotone growth counters plus the objective, so a probe
/// that added variables, constraints, and an objective can be undone.
#[derive(Debug, Clone, Copy)]
pub struct ModelCheckpoint {
    vars: usize,
    intervals: usize,
    constraints: usize,
    objective: Option<(IntVar, ObjectiveDirection)>,
}

/// Container for variables, constraints, and the objective.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpModel {
    pub(crate) vars: Vec<VarDomain>,
    pub(crate) intervals: Vec<Interval>,
    pub(crate) constraints: Vec<CpConstraint>,
    objective: Option<(IntVar, ObjectiveDirection)>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bounded integer variable.
    ///
    /// `lb > ub` yields an empty domain the solver reports infeasible.
    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: impl Into<String>) -> IntVar {
        self.vars.push(VarDomain {
            lb,
            ub,
            name: name.into(),
        });
        IntVar(self.vars.len() - 1)
    }

    /// Creates a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        let var = self.new_int_var(0, 1, name);
        BoolVar(var.0)
    }

    /// Creates an always-present interval from (start, size, end).
    pub fn new_interval(&mut self, start: IntVar, size: IntVar, end: IntVar) -> IntervalId {
        self.intervals.push(Interval {
            start,
            size,
            end,
            presence: None,
        });
        IntervalId(self.intervals.len() - 1)
    }

    /// Creates an interval that only imposes constraints while `presence`
    /// is true.
    pub fn new_optional_interval(
        &mut self,
        start: IntVar,
        size: IntVar,
        end: IntVar,
        presence: BoolVar,
    ) -> IntervalId {
        self.intervals.push(Interval {
            start,
            size,
            end,
            presence: Some(presence),
        });
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds `sum(coeff * var) op rhs`.
    pub fn add_linear(&mut self, terms: Vec<(i64, IntVar)>, op: CmpOp, rhs: i64) {
        self.constraints.push(CpConstraint::Linear(LinearConstraint {
            terms,
            op,
            rhs,
            enforce: None,
        }));
    }

    /// Adds `sum(coeff * var) op rhs`, enforced only while `lit` is true.
    pub fn add_linear_if(
        &mut self,
        lit: BoolVar,
        terms: Vec<(i64, IntVar)>,
        op: CmpOp,
        rhs: i64,
    ) {
        self.constraints.push(CpConstraint::Linear(LinearConstraint {
            terms,
            op,
            rhs,
            enforce: Some(lit),
        }));
    }

    /// Adds an exactly-one constraint over the literals.
    pub fn add_exactly_one(&mut self, literals: Vec<BoolVar>) {
        self.constraints.push(CpConstraint::ExactlyOne(literals));
    }

    /// Adds a pairwise no-overlap constraint over the intervals.
    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.constraints.push(CpConstraint::NoOverlap(intervals));
    }

    /// Adds a cumulative constraint: at every instant, the summed demand
    /// of present, active intervals is at most `capacity`.
    ///
    /// # Panics
    /// Panics when `demands` is not parallel to `intervals`.
    pub fn add_cumulative(
        &mut self,
        intervals: Vec<IntervalId>,
        demands: Vec<i64>,
        capacity: i64,
    ) {
        assert_eq!(
            intervals.len(),
            demands.len(),
            "one demand per interval required"
        );
        self.constraints.push(CpConstraint::Cumulative {
            intervals,
            demands,
            capacity,
        });
    }

    /// Sets the optimization direction over one variable.
    pub fn set_objective(&mut self, var: IntVar, direction: ObjectiveDirection) {
        self.objective = Some((var, direction));
    }

    /// Removes the objective (pure satisfaction).
    pub fn clear_objective(&mut self) {
        self.objective = None;
    }

    /// Current objective, if any.
    pub fn objective(&self) -> Option<(IntVar, ObjectiveDirection)> {
        self.objective
    }

    /// Domain bounds of a variable.
    pub fn domain(&self, var: IntVar) -> (i64, i64) {
        let d = &self.vars[var.0];
        (d.lb, d.ub)
    }

    /// Debug name of a variable.
    pub fn var_name(&self, var: IntVar) -> &str {
        &self.vars[var.0].name
    }

    /// Interval data by id.
    pub fn interval(&self, id: IntervalId) -> &Interval {
        &self.intervals[id.0]
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of intervals.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Captures a restore point before a temporary probe.
    pub fn checkpoint(&self) -> ModelCheckpoint {
        ModelCheckpoint {
            vars: self.vars.len(),
            intervals: self.intervals.len(),
            constraints: self.constraints.len(),
            objective: self.objective,
        }
    }

    /// Rolls the model back to a checkpoint, dropping everything added
    /// since. Checkpoints must be rolled back newest-first.
    pub fn rollback(&mut self, checkpoint: ModelCheckpoint) {
        self.vars.truncate(checkpoint.vars);
        self.intervals.truncate(checkpoint.intervals);
        self.constraints.truncate(checkpoint.constraints);
        self.objective = checkpoint.objective;
    }
}
