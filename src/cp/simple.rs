//! Built-in reference solver.
//!
//! `SimpleCpSolver` is an exact depth-first branch-and-bound over the
//! variable bounds, with fixpoint bounds propagation for linear
//! constraints, exactly-one clauses, disjunctive interval pairs, and
//! mandatory-part cumulative checks. It is complete: on models it can
//! exhaust within its limits it proves optimality or infeasibility.
//!
//! It exists so the crate is usable and testable without an industrial
//! engine. Anything performance-critical should plug a real backend into
//! [`CpSolver`] instead.
//!
//! # Reference
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming",
//! Ch. 3 (propagation), Ch. 22 (scheduling constraints)

use std::time::{Duration, Instant};

use super::model::{
    CmpOp, CpConstraint, CpModel, Interval, LinearConstraint, ObjectiveDirection,
};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};

/// Exact depth-first branch-and-bound solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCpSolver;

impl SimpleCpSolver {
    /// Creates a solver.
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for SimpleCpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        let mut search = Search {
            model,
            deadline: started + config.time_limit,
            node_limit: config.node_limit,
            nodes: 0,
            aborted: false,
            satisfied: false,
            best_values: None,
            best_objective: None,
        };

        let domains: Domains = model.vars.iter().map(|d| (d.lb, d.ub)).collect();
        search.dfs(domains);

        let wall_time = started.elapsed();
        let status = match (search.aborted, &search.best_values) {
            (true, Some(_)) => SolverStatus::Feasible,
            (true, None) => SolverStatus::Unknown,
            (false, Some(_)) => {
                if model.objective().is_some() {
                    SolverStatus::Optimal
                } else {
                    SolverStatus::Feasible
                }
            }
            (false, None) => SolverStatus::Infeasible,
        };

        match search.best_values {
            Some(values) => {
                let objective_value = model.objective().map(|(var, _)| values[var.0]);
                CpSolution::found(status, values, objective_value, wall_time, search.nodes)
            }
            None => CpSolution::empty(status, wall_time, search.nodes),
        }
    }
}

/// (lb, ub) per variable, indexed like `CpModel::vars`.
type Domains = Vec<(i64, i64)>;

struct Search<'a> {
    model: &'a CpModel,
    deadline: Instant,
    node_limit: u64,
    nodes: u64,
    aborted: bool,
    satisfied: bool,
    best_values: Option<Vec<i64>>,
    best_objective: Option<i64>,
}

impl Search<'_> {
    fn dfs(&mut self, mut domains: Domains) {
        if self.aborted || self.satisfied {
            return;
        }
        self.nodes += 1;
        if self.nodes > self.node_limit || Instant::now() >= self.deadline {
            self.aborted = true;
            return;
        }
        if !self.propagate(&mut domains) {
            return;
        }
        if self.bound_pruned(&domains) {
            return;
        }

        let Some(var) = self.select_var(&domains) else {
            self.on_leaf(&domains);
            return;
        };

        let (lb, ub) = domains[var];
        let descending = matches!(
            self.model.objective(),
            Some((obj, ObjectiveDirection::Maximize)) if obj.0 == var
        );

        let mut v = if descending { ub } else { lb };
        loop {
            let mut child = domains.clone();
            child[var] = (v, v);
            self.dfs(child);
            if self.aborted || self.satisfied {
                return;
            }
            if descending {
                if v == lb {
                    break;
                }
                v -= 1;
            } else {
                if v == ub {
                    break;
                }
                v += 1;
            }
        }
    }

    /// Incumbent-based pruning: only strictly improving subtrees survive.
    fn bound_pruned(&self, domains: &Domains) -> bool {
        let (Some((obj, dir)), Some(best)) = (self.model.objective(), self.best_objective) else {
            return false;
        };
        match dir {
            ObjectiveDirection::Minimize => domains[obj.0].0 >= best,
            ObjectiveDirection::Maximize => domains[obj.0].1 <= best,
        }
    }

    /// Smallest-domain-first selection over unfixed variables.
    fn select_var(&self, domains: &Domains) -> Option<usize> {
        let mut choice: Option<(usize, i64)> = None;
        for (i, &(lb, ub)) in domains.iter().enumerate() {
            if lb < ub {
                let width = ub - lb;
                if choice.map_or(true, |(_, w)| width < w) {
                    choice = Some((i, width));
                }
            }
        }
        choice.map(|(i, _)| i)
    }

    fn on_leaf(&mut self, domains: &Domains) {
        let values: Vec<i64> = domains.iter().map(|&(lb, _)| lb).collect();
        if !self.verify(&values) {
            return;
        }
        match self.model.objective() {
            Some((obj, _)) => {
                // bound_pruned already guaranteed strict improvement.
                self.best_objective = Some(values[obj.0]);
                self.best_values = Some(values);
            }
            None => {
                self.best_values = Some(values);
                self.satisfied = true;
            }
        }
    }

    // ---- propagation ----------------------------------------------------

    fn propagate(&self, domains: &mut Domains) -> bool {
        if domains.iter().any(|&(lb, ub)| lb > ub) {
            return false;
        }
        loop {
            let mut changed = false;
            for constraint in &self.model.constraints {
                let ok = match constraint {
                    CpConstraint::Linear(lc) => self.prop_linear(lc, domains, &mut changed),
                    CpConstraint::ExactlyOne(lits) => {
                        self.prop_exactly_one(lits, domains, &mut changed)
                    }
                    CpConstraint::NoOverlap(ivs) => {
                        self.prop_no_overlap(ivs, domains, &mut changed)
                    }
                    CpConstraint::Cumulative {
                        intervals,
                        demands,
                        capacity,
                    } => self.check_cumulative_mandatory(intervals, demands, *capacity, domains),
                };
                if !ok {
                    return false;
                }
            }
            if !changed {
                return true;
            }
        }
    }

    fn prop_linear(
        &self,
        lc: &LinearConstraint,
        domains: &mut Domains,
        changed: &mut bool,
    ) -> bool {
        if let Some(lit) = lc.enforce {
            let (lb, ub) = domains[lit.0];
            if ub == 0 {
                return true; // disabled
            }
            if lb == 0 {
                // Unknown literal: an unsatisfiable body forces it false.
                if !self.linear_satisfiable(lc, domains) {
                    domains[lit.0].1 = 0;
                    if domains[lit.0].0 > 0 {
                        return false;
                    }
                    *changed = true;
                }
                return true;
            }
        }
        match lc.op {
            CmpOp::Le => self.prop_le(&lc.terms, lc.rhs, domains, changed),
            CmpOp::Ge => self.prop_ge(&lc.terms, lc.rhs, domains, changed),
            CmpOp::Eq => {
                self.prop_le(&lc.terms, lc.rhs, domains, changed)
                    && self.prop_ge(&lc.terms, lc.rhs, domains, changed)
            }
        }
    }

    fn prop_ge(
        &self,
        terms: &[(i64, super::model::IntVar)],
        rhs: i64,
        domains: &mut Domains,
        changed: &mut bool,
    ) -> bool {
        let negated: Vec<(i64, super::model::IntVar)> =
            terms.iter().map(|&(c, v)| (-c, v)).collect();
        self.prop_le(&negated, -rhs, domains, changed)
    }

    /// Bounds propagation for `sum(c * x) <= rhs`.
    fn prop_le(
        &self,
        terms: &[(i64, super::model::IntVar)],
        rhs: i64,
        domains: &mut Domains,
        changed: &mut bool,
    ) -> bool {
        let rhs = rhs as i128;
        let min_term = |c: i64, lb: i64, ub: i64| -> i128 {
            if c >= 0 {
                c as i128 * lb as i128
            } else {
                c as i128 * ub as i128
            }
        };
        let sum_min: i128 = terms
            .iter()
            .map(|&(c, v)| min_term(c, domains[v.0].0, domains[v.0].1))
            .sum();
        if sum_min > rhs {
            return false;
        }
        for &(c, v) in terms {
            if c == 0 {
                continue;
            }
            let (lb, ub) = domains[v.0];
            let slack = rhs - (sum_min - min_term(c, lb, ub));
            if c > 0 {
                let new_ub = clamp_i128(floor_div(slack, c as i128));
                if new_ub < ub {
                    domains[v.0].1 = new_ub;
                    *changed = true;
                    if new_ub < lb {
                        return false;
                    }
                }
            } else {
                let new_lb = clamp_i128(ceil_div(slack, c as i128));
                if new_lb > lb {
                    domains[v.0].0 = new_lb;
                    *changed = true;
                    if new_lb > ub {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Whether the constraint body can still hold under current bounds.
    fn linear_satisfiable(&self, lc: &LinearConstraint, domains: &Domains) -> bool {
        let mut sum_min: i128 = 0;
        let mut sum_max: i128 = 0;
        for &(c, v) in &lc.terms {
            let (lb, ub) = domains[v.0];
            let (a, b) = (c as i128 * lb as i128, c as i128 * ub as i128);
            sum_min += a.min(b);
            sum_max += a.max(b);
        }
        let rhs = lc.rhs as i128;
        match lc.op {
            CmpOp::Le => sum_min <= rhs,
            CmpOp::Ge => sum_max >= rhs,
            CmpOp::Eq => sum_min <= rhs && rhs <= sum_max,
        }
    }

    fn prop_exactly_one(
        &self,
        lits: &[super::model::BoolVar],
        domains: &mut Domains,
        changed: &mut bool,
    ) -> bool {
        let mut fixed_true = 0usize;
        let mut unknown = Vec::new();
        for lit in lits {
            match domains[lit.0] {
                (1, _) => fixed_true += 1,
                (_, 0) => {}
                _ => unknown.push(lit.0),
            }
        }
        if fixed_true > 1 {
            return false;
        }
        if fixed_true == 1 {
            for i in unknown {
                domains[i].1 = 0;
                *changed = true;
            }
            return true;
        }
        match unknown.len() {
            0 => false,
            1 => {
                domains[unknown[0]].0 = 1;
                *changed = true;
                true
            }
            _ => true,
        }
    }

    fn prop_no_overlap(
        &self,
        ivs: &[super::model::IntervalId],
        domains: &mut Domains,
        changed: &mut bool,
    ) -> bool {
        for (idx, &a) in ivs.iter().enumerate() {
            let ia = self.model.interval(a);
            if !self.certainly_present(ia, domains) || domains[ia.size.0].0 <= 0 {
                continue;
            }
            for &b in &ivs[idx + 1..] {
                let ib = self.model.interval(b);
                if !self.certainly_present(ib, domains) || domains[ib.size.0].0 <= 0 {
                    continue;
                }
                let a_first = domains[ia.end.0].0 <= domains[ib.start.0].1;
                let b_first = domains[ib.end.0].0 <= domains[ia.start.0].1;
                match (a_first, b_first) {
                    (false, false) => return false,
                    (true, false) => {
                        // a must precede b.
                        if domains[ib.start.0].0 < domains[ia.end.0].0 {
                            domains[ib.start.0].0 = domains[ia.end.0].0;
                            *changed = true;
                        }
                        if domains[ia.end.0].1 > domains[ib.start.0].1 {
                            domains[ia.end.0].1 = domains[ib.start.0].1;
                            *changed = true;
                        }
                        if domains[ib.start.0].0 > domains[ib.start.0].1
                            || domains[ia.end.0].0 > domains[ia.end.0].1
                        {
                            return false;
                        }
                    }
                    (false, true) => {
                        if domains[ia.start.0].0 < domains[ib.end.0].0 {
                            domains[ia.start.0].0 = domains[ib.end.0].0;
                            *changed = true;
                        }
                        if domains[ib.end.0].1 > domains[ia.start.0].1 {
                            domains[ib.end.0].1 = domains[ia.start.0].1;
                            *changed = true;
                        }
                        if domains[ia.start.0].0 > domains[ia.start.0].1
                            || domains[ib.end.0].0 > domains[ib.end.0].1
                        {
                            return false;
                        }
                    }
                    (true, true) => {}
                }
            }
        }
        true
    }

    /// Timetable check over mandatory parts of certainly-present intervals.
    fn check_cumulative_mandatory(
        &self,
        ivs: &[super::model::IntervalId],
        demands: &[i64],
        capacity: i64,
        domains: &Domains,
    ) -> bool {
        let mut events: Vec<(i64, i64)> = Vec::new();
        for (&id, &demand) in ivs.iter().zip(demands) {
            if demand <= 0 {
                continue;
            }
            let iv = self.model.interval(id);
            if !self.certainly_present(iv, domains) {
                continue;
            }
            let mandatory_start = domains[iv.start.0].1;
            let mandatory_end = domains[iv.end.0].0;
            if mandatory_start < mandatory_end {
                events.push((mandatory_start, demand));
                events.push((mandatory_end, -demand));
            }
        }
        sweep_within_capacity(events, capacity)
    }

    fn certainly_present(&self, iv: &Interval, domains: &Domains) -> bool {
        match iv.presence {
            None => true,
            Some(lit) => domains[lit.0].0 == 1,
        }
    }

    // ---- leaf verification ----------------------------------------------

    fn verify(&self, values: &[i64]) -> bool {
        self.model.constraints.iter().all(|c| match c {
            CpConstraint::Linear(lc) => {
                if let Some(lit) = lc.enforce {
                    if values[lit.0] == 0 {
                        return true;
                    }
                }
                let sum: i128 = lc
                    .terms
                    .iter()
                    .map(|&(c, v)| c as i128 * values[v.0] as i128)
                    .sum();
                let rhs = lc.rhs as i128;
                match lc.op {
                    CmpOp::Le => sum <= rhs,
                    CmpOp::Ge => sum >= rhs,
                    CmpOp::Eq => sum == rhs,
                }
            }
            CpConstraint::ExactlyOne(lits) => {
                lits.iter().filter(|l| values[l.0] == 1).count() == 1
            }
            CpConstraint::NoOverlap(ivs) => {
                let active: Vec<(i64, i64)> = ivs
                    .iter()
                    .map(|&id| self.model.interval(id))
                    .filter(|iv| iv.presence.map_or(true, |l| values[l.0] == 1))
                    .filter(|iv| values[iv.size.0] > 0)
                    .map(|iv| (values[iv.start.0], values[iv.end.0]))
                    .collect();
                for (i, &(sa, ea)) in active.iter().enumerate() {
                    for &(sb, eb) in &active[i + 1..] {
                        if sa < eb && sb < ea {
                            return false;
                        }
                    }
                }
                true
            }
            CpConstraint::Cumulative {
                intervals,
                demands,
                capacity,
            } => {
                let events: Vec<(i64, i64)> = intervals
                    .iter()
                    .zip(demands)
                    .filter(|(_, &d)| d > 0)
                    .map(|(&id, &d)| (self.model.interval(id), d))
                    .filter(|(iv, _)| iv.presence.map_or(true, |l| values[l.0] == 1))
                    .filter(|(iv, _)| values[iv.size.0] > 0)
                    .flat_map(|(iv, d)| {
                        [(values[iv.start.0], d), (values[iv.end.0], -d)]
                    })
                    .collect();
                sweep_within_capacity(events, *capacity)
            }
        })
    }
}

/// Sorts +/- demand events and checks the running load stays within
/// capacity. Releases sort before claims at equal times ([start, end)
/// semantics).
fn sweep_within_capacity(mut events: Vec<(i64, i64)>, capacity: i64) -> bool {
    events.sort_unstable_by_key(|&(t, d)| (t, d));
    let mut load = 0;
    for (_, delta) in events {
        load += delta;
        if load > capacity {
            return false;
        }
    }
    true
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && (a < 0) == (b < 0) {
        q + 1
    } else {
        q
    }
}

fn clamp_i128(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
