//! Template expansion.
//!
//! Turns a [`JobTemplate`] plus a batch of [`JobInstance`]s into concrete
//! [`Job`]s. Each instance gets a full copy of the template's tasks and
//! precedences with identities remapped through
//! [`expanded_task_id`], so two instances of the same template never share
//! tasks or edges. Runs in O(template size × instance count).

use tracing::debug;

use crate::models::{expanded_task_id, Job, JobInstance, JobTemplate, Task};

/// Expands a template once per instance, producing one job per instance.
///
/// Instances whose `template_id` does not match the template are skipped.
/// Expansion is deterministic: the same inputs always yield the same jobs
/// in the same order.
pub fn expand(template: &JobTemplate, instances: &[JobInstance]) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(instances.len());

    for instance in instances {
        if instance.template_id != template.id {
            debug!(
                instance_id = instance.id,
                template_id = instance.template_id,
                "skipping instance of a different template"
            );
            continue;
        }
        jobs.push(expand_one(template, instance));
    }

    debug!(
        template_id = template.id,
        instance_count = instances.len(),
        job_count = jobs.len(),
        "template expanded"
    );
    jobs
}

fn expand_one(template: &JobTemplate, instance: &JobInstance) -> Job {
    let mut job = Job::new(instance.id).with_weight(instance.weight);
    if let Some(due) = instance.due_date {
        job = job.with_due_date(due);
    }
    if !template.name.is_empty() {
        job = job.with_name(format!("{} #{}", template.name, instance.id));
    }

    for tpl_task in &template.tasks {
        let mut task = Task::new(expanded_task_id(instance.id, tpl_task.id), instance.id)
            .with_name(tpl_task.name.clone());
        task.unattended = tpl_task.unattended;
        task.requires_setup = tpl_task.requires_setup;
        task.modes = tpl_task.modes.clone();
        for p in &template.precedences {
            if p.successor == tpl_task.id {
                task.predecessors
                    .push(expanded_task_id(instance.id, p.predecessor));
            }
        }
        job = job.with_task(task);
    }

    job
}
