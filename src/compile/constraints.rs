//! Structural constraint builders.
//!
//! Translates the declarative problem into backend constraints: duration
//! linking and mode selection, precedence edges, machine and work-cell
//! capacity, and sequence-dependent setup separation.
//!
//! Machine capacity uses no-overlap on unit-capacity machines and a
//! unit-demand cumulative otherwise. Work-cell bounds compile only when
//! binding (cell capacity below member machine count); non-binding cells
//! are already dominated by the per-machine constraints.

use std::collections::{HashMap, HashSet};

use crate::cp::{BoolVar, CmpOp, CpModel, IntervalId};

use super::variables::TaskVars;
use crate::models::Problem;

/// One task's optional presence on one machine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MachineTask {
    /// Task id.
    pub task_id: u64,
    /// Optional interval present iff the task runs on this machine.
    pub interval: IntervalId,
    /// Assignment literal: true iff the task runs on this machine.
    pub literal: BoolVar,
}

/// Assignment structure per machine, built once and shared by capacity
/// and setup builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct AssignmentVars {
    /// Machine id → tasks that may run there.
    pub machine_tasks: HashMap<u32, Vec<MachineTask>>,
}

impl AssignmentVars {
    /// Assignment literal of (task, machine), if the task is eligible.
    pub fn literal(&self, machine_id: u32, task_id: u64) -> Option<BoolVar> {
        self.machine_tasks
            .get(&machine_id)?
            .iter()
            .find(|mt| mt.task_id == task_id)
            .map(|mt| mt.literal)
    }
}

/// A setup ordering literal with its separation, for the setup objective.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SetupTerm {
    /// True iff this ordered pair is realized on the machine.
    pub literal: BoolVar,
    /// Separation incurred when realized (time units).
    pub units: i64,
}

/// Links each task's interval arithmetic and mode selection:
/// `end = start + duration`, exactly one mode literal true, and the
/// selected mode pins the duration.
pub(crate) fn link_tasks(
    model: &mut CpModel,
    problem: &Problem,
    task_vars: &HashMap<u64, TaskVars>,
) {
    for task in problem.tasks() {
        let Some(tv) = task_vars.get(&task.id) else {
            continue;
        };
        model.add_linear(
            vec![(1, tv.end), (-1, tv.start), (-1, tv.duration)],
            CmpOp::Eq,
            0,
        );
        model.add_exactly_one(tv.mode_literals.clone());
        for (mode, &lit) in task.modes.iter().zip(&tv.mode_literals) {
            model.add_linear_if(lit, vec![(1, tv.duration)], CmpOp::Eq, mode.duration);
        }
    }
}

/// Adds every precedence edge: successor starts at or after the
/// predecessor ends. Task-level predecessor lists and problem-level
/// edges compile identically.
pub(crate) fn add_precedences(
    model: &mut CpModel,
    problem: &Problem,
    task_vars: &HashMap<u64, TaskVars>,
) {
    let add_edge = |model: &mut CpModel, pred: u64, succ: u64| {
        if let (Some(p), Some(s)) = (task_vars.get(&pred), task_vars.get(&succ)) {
            model.add_linear(vec![(1, s.start), (-1, p.end)], CmpOp::Ge, 0);
        }
    };

    let edges: Vec<(u64, u64)> = problem
        .tasks()
        .flat_map(|t| t.predecessors.iter().map(move |&p| (p, t.id)))
        .chain(
            problem
                .precedences
                .iter()
                .map(|p| (p.predecessor, p.successor)),
        )
        .collect();
    for (pred, succ) in edges {
        add_edge(model, pred, succ);
    }
}

/// Builds per-machine assignment literals and optional intervals.
///
/// A task with exactly one mode on a machine reuses that mode's literal;
/// a task with several modes on the same machine gets an aggregate
/// literal equal to their sum (the mode literals are mutually exclusive,
/// so the sum is 0 or 1).
pub(crate) fn build_assignments(
    model: &mut CpModel,
    problem: &Problem,
    task_vars: &HashMap<u64, TaskVars>,
) -> AssignmentVars {
    let mut assignments = AssignmentVars::default();

    for task in problem.tasks() {
        let Some(tv) = task_vars.get(&task.id) else {
            continue;
        };
        let mut per_machine: HashMap<u32, Vec<BoolVar>> = HashMap::new();
        for (mode, &lit) in task.modes.iter().zip(&tv.mode_literals) {
            per_machine.entry(mode.machine_id).or_default().push(lit);
        }

        let mut machine_ids: Vec<u32> = per_machine.keys().copied().collect();
        machine_ids.sort_unstable();
        for machine_id in machine_ids {
            let lits = &per_machine[&machine_id];
            let literal = if lits.len() == 1 {
                lits[0]
            } else {
                let agg =
                    model.new_bool_var(format!("assign_t{}_m{}", task.id, machine_id));
                let mut terms = vec![(1, agg.as_int())];
                terms.extend(lits.iter().map(|l| (-1, l.as_int())));
                model.add_linear(terms, CmpOp::Eq, 0);
                agg
            };
            let interval =
                model.new_optional_interval(tv.start, tv.duration, tv.end, literal);
            assignments
                .machine_tasks
                .entry(machine_id)
                .or_default()
                .push(MachineTask {
                    task_id: task.id,
                    interval,
                    literal,
                });
        }
    }

    assignments
}

/// Adds per-machine capacity: no-overlap for disjunctive machines, a
/// unit-demand cumulative otherwise. Each task consumes one slot.
pub(crate) fn add_machine_capacity(
    model: &mut CpModel,
    problem: &Problem,
    assignments: &AssignmentVars,
) {
    for machine in &problem.machines {
        let Some(tasks) = assignments.machine_tasks.get(&machine.id) else {
            continue;
        };
        if tasks.len() < 2 {
            continue;
        }
        let intervals: Vec<IntervalId> = tasks.iter().map(|mt| mt.interval).collect();
        if machine.is_disjunctive() {
            model.add_no_overlap(intervals);
        } else {
            let demands = vec![1; tasks.len()];
            model.add_cumulative(intervals, demands, machine.capacity);
        }
    }
}

/// Adds the aggregate activity bound of each binding work cell: at any
/// instant, at most `capacity` tasks run across the cell's machines.
pub(crate) fn add_work_cell_capacity(
    model: &mut CpModel,
    problem: &Problem,
    assignments: &AssignmentVars,
) {
    for cell in &problem.work_cells {
        let members = problem.machines_in_cell(cell.id);
        if !cell.is_binding(members.len()) {
            continue;
        }
        let intervals: Vec<IntervalId> = members
            .iter()
            .filter_map(|m| assignments.machine_tasks.get(&m.id))
            .flatten()
            .map(|mt| mt.interval)
            .collect();
        if intervals.len() as i64 > cell.capacity {
            let demands = vec![1; intervals.len()];
            model.add_cumulative(intervals, demands, cell.capacity);
        }
    }
}

/// Adds sequence-dependent setup separation for every registered task
/// pair on every machine both tasks are eligible for and at least one
/// direction carries a nonzero changeover.
///
/// Per (pair, machine): two ordering literals, at most one true, exactly
/// one true when both tasks are assigned there, each enforcing the
/// directional separation. Returns the weighted ordering literals for
/// the setup-time objective.
pub(crate) fn add_setup_sequencing(
    model: &mut CpModel,
    problem: &Problem,
    task_vars: &HashMap<u64, TaskVars>,
    assignments: &AssignmentVars,
) -> Vec<SetupTerm> {
    let mut terms = Vec::new();

    // Registered pairs are directional; the disjunction is per unordered
    // pair, so dedup on the canonical orientation.
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    for (from, to) in problem.setup_times.registered_pairs() {
        let (a, b) = if from <= to { (from, to) } else { (to, from) };
        if a == b || !seen.insert((a, b)) {
            continue;
        }
        let (Some(va), Some(vb)) = (task_vars.get(&a), task_vars.get(&b)) else {
            continue;
        };

        let mut machine_ids: Vec<u32> = assignments.machine_tasks.keys().copied().collect();
        machine_ids.sort_unstable();
        for machine_id in machine_ids {
            let (Some(la), Some(lb)) = (
                assignments.literal(machine_id, a),
                assignments.literal(machine_id, b),
            ) else {
                continue;
            };

            let fwd = problem.setup_times.get(machine_id, a, b);
            let rev = problem.setup_times.get(machine_id, b, a);
            // No changeover in either direction on this machine: the pair
            // may overlap freely where capacity allows, so no disjunction.
            if fwd == 0 && rev == 0 {
                continue;
            }

            let l_ab = model.new_bool_var(format!("setup_t{a}_t{b}_m{machine_id}"));
            let l_ba = model.new_bool_var(format!("setup_t{b}_t{a}_m{machine_id}"));

            // Ordering literals only fire when both tasks are assigned here.
            for l in [l_ab, l_ba] {
                model.add_linear(vec![(1, l.as_int()), (-1, la.as_int())], CmpOp::Le, 0);
                model.add_linear(vec![(1, l.as_int()), (-1, lb.as_int())], CmpOp::Le, 0);
            }
            model.add_linear(
                vec![(1, l_ab.as_int()), (1, l_ba.as_int())],
                CmpOp::Le,
                1,
            );
            // Both assigned → one order must be realized.
            model.add_linear(
                vec![
                    (1, l_ab.as_int()),
                    (1, l_ba.as_int()),
                    (-1, la.as_int()),
                    (-1, lb.as_int()),
                ],
                CmpOp::Ge,
                -1,
            );
            model.add_linear_if(l_ab, vec![(1, vb.start), (-1, va.end)], CmpOp::Ge, fwd);
            model.add_linear_if(l_ba, vec![(1, va.start), (-1, vb.end)], CmpOp::Ge, rev);

            terms.push(SetupTerm {
                literal: l_ab,
                units: fwd,
            });
            terms.push(SetupTerm {
                literal: l_ba,
                units: rev,
            });
        }
    }

    terms
}
