//! Scheduling domain models.
//!
//! Pure data types for declaring a multi-mode job-shop problem and its
//! solutions. Ids are integers in an arena style: `u32` for machines,
//! cells, jobs, templates, and instances; `u64` for tasks so expanded
//! template tasks can pack `(instance_id, template_task_id)`.
//!
//! # Domain Mappings
//!
//! | flexshop | Manufacturing | Healthcare |
//! |----------|---------------|------------|
//! | Job | Order | Patient case |
//! | Task | Operation | Procedure |
//! | TaskMode | Routing alternative | Room/staff option |
//! | Machine | Machine | Room |
//! | WorkCell | Cell/line | Ward |

mod job;
mod machine;
mod objective;
mod problem;
mod schedule;
mod template;

pub use job::{Job, Precedence, Task, TaskMode};
pub use machine::{Machine, WorkCell};
pub use objective::{
    MultiObjectiveConfig, ObjectiveKind, ObjectiveSolution, ObjectiveWeight,
    OptimizationStrategy, ParetoFrontier, ParetoSolution,
};
pub use problem::{Problem, SetupTimes};
pub use schedule::{Assignment, Schedule};
pub use template::{
    expanded_task_id, JobInstance, JobTemplate, TemplatePrecedence, TemplateTask,
};
