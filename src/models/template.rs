//! Job templates and instances.
//!
//! A template is a reusable task/precedence blueprint defined once and
//! expanded across many instances without recompiling each. Expanded task
//! identity is a deterministic function of (instance id, template task id)
//! so downstream compilation treats expanded and hand-authored tasks
//! identically.

use serde::{Deserialize, Serialize};

use super::TaskMode;

/// Packs an expanded task identity from its instance and template task ids.
///
/// The instance id occupies the high 32 bits, the template task id the low
/// 32 bits, so identities are unique across instances and stable across
/// expansions.
#[inline]
pub fn expanded_task_id(instance_id: u32, template_task_id: u32) -> u64 {
    ((instance_id as u64) << 32) | template_task_id as u64
}

/// A task blueprint inside a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateTask {
    /// Template-scoped task identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Whether expanded tasks run unattended.
    pub unattended: bool,
    /// Whether expanded tasks participate in setup sequencing.
    pub requires_setup: bool,
    /// Processing alternatives, copied verbatim into every expansion.
    pub modes: Vec<TaskMode>,
}

impl TemplateTask {
    /// Creates a template task with no modes.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            unattended: false,
            requires_setup: false,
            modes: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a processing mode.
    pub fn with_mode(mut self, machine_id: u32, duration: i64) -> Self {
        self.modes.push(TaskMode::new(machine_id, duration));
        self
    }

    /// Marks expanded tasks as unattended.
    pub fn unattended(mut self) -> Self {
        self.unattended = true;
        self
    }

    /// Marks expanded tasks as setup-relevant.
    pub fn with_setup(mut self) -> Self {
        self.requires_setup = true;
        self
    }
}

/// A template-scoped precedence edge, replicated per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePrecedence {
    /// Template task that must finish first.
    pub predecessor: u32,
    /// Template task that must wait.
    pub successor: u32,
}

impl TemplatePrecedence {
    /// Creates a template precedence edge.
    pub fn new(predecessor: u32, successor: u32) -> Self {
        Self {
            predecessor,
            successor,
        }
    }
}

/// A reusable job blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTemplate {
    /// Unique template identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Task blueprints.
    pub tasks: Vec<TemplateTask>,
    /// Precedence edges between template tasks.
    pub precedences: Vec<TemplatePrecedence>,
}

impl JobTemplate {
    /// Creates an empty template.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            tasks: Vec::new(),
            precedences: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a task blueprint.
    pub fn with_task(mut self, task: TemplateTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Adds a precedence edge between template tasks.
    pub fn with_precedence(mut self, predecessor: u32, successor: u32) -> Self {
        self.precedences
            .push(TemplatePrecedence::new(predecessor, successor));
        self
    }
}

/// One concrete instantiation of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInstance {
    /// Unique instance identifier; becomes the expanded job's id.
    pub id: u32,
    /// Template this instance expands.
    pub template_id: u32,
    /// Due date of the expanded job (time units).
    pub due_date: Option<i64>,
    /// Weight of the expanded job (>= 1).
    pub weight: i64,
}

impl JobInstance {
    /// Creates an instance of a template.
    pub fn new(id: u32, template_id: u32) -> Self {
        Self {
            id,
            template_id,
            due_date: None,
            weight: 1,
        }
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due: i64) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Sets the weight (clamped to >= 1).
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_task_id_packing() {
        assert_eq!(expanded_task_id(0, 0), 0);
        assert_eq!(expanded_task_id(0, 7), 7);
        assert_eq!(expanded_task_id(1, 0), 1 << 32);
        assert_eq!(expanded_task_id(3, 5), (3 << 32) | 5);
    }

    #[test]
    fn test_expanded_task_id_unique_across_instances() {
        let a = expanded_task_id(1, 2);
        let b = expanded_task_id(2, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_template_builder() {
        let tpl = JobTemplate::new(1)
            .with_name("gear housing")
            .with_task(TemplateTask::new(0).with_mode(1, 4).with_mode(2, 6))
            .with_task(TemplateTask::new(1).with_mode(3, 2).with_setup())
            .with_precedence(0, 1);

        assert_eq!(tpl.tasks.len(), 2);
        assert_eq!(tpl.precedences.len(), 1);
        assert!(tpl.tasks[1].requires_setup);
    }

    #[test]
    fn test_instance_builder() {
        let inst = JobInstance::new(5, 1).with_due_date(120).with_weight(3);
        assert_eq!(inst.id, 5);
        assert_eq!(inst.template_id, 1);
        assert_eq!(inst.due_date, Some(120));
        assert_eq!(inst.weight, 3);
    }
}
