use std::sync::Arc;

use tracing::info;

use super::{fetch, Stores};
use crate::clock::Clock;
use crate::error::{require_text, DeskError, Result};
use crate::models::{CreateStaffTask, RecordId, StaffTask, TaskFilter, TaskStatus};
use crate::store::Store;

pub struct TaskTracker {
    tasks: Arc<dyn Store<StaffTask>>,
    clock: Arc<dyn Clock>,
}

impl TaskTracker {
    pub fn new(stores: &Stores, clock: Arc<dyn Clock>) -> Self {
        TaskTracker {
            tasks: Arc::clone(&stores.tasks),
            clock,
        }
    }

    pub fn get(&self, id: RecordId) -> Result<StaffTask> {
        fetch(self.tasks.as_ref(), id)
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<StaffTask>> {
        Ok(self
            .tasks
            .list()?
            .into_iter()
            .filter(|t| filter.assignee.as_deref().map_or(true, |a| t.assignee == a))
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .collect())
    }

    pub fn create(&self, task: CreateStaffTask) -> Result<StaffTask> {
        require_text(&task.title, "title")?;
        require_text(&task.assignee, "assignee")?;

        let task = self.tasks.insert(StaffTask {
            id: 0,
            title: task.title.trim().to_string(),
            assignee: task.assignee.trim().to_string(),
            due_date: task.due_date,
            priority: task.priority,
            status: TaskStatus::Todo,
            description: task.description.filter(|d| !d.trim().is_empty()),
            created_at: self.clock.now(),
        })?;
        info!(task_id = task.id, assignee = %task.assignee, priority = %task.priority, "task created");

        Ok(task)
    }

    pub fn transition(&self, task_id: RecordId, status: TaskStatus) -> Result<StaffTask> {
        let mut task = self.get(task_id)?;

        if !task.status.can_transition_to(status) {
            return Err(DeskError::invalid_transition("task", task.status, status));
        }

        let from = task.status;
        task.status = status;
        self.tasks.update(&task)?;
        info!(task_id, from = %from, to = %status, "task status changed");

        Ok(task)
    }

    pub fn assign(&self, task_id: RecordId, assignee: &str) -> Result<StaffTask> {
        require_text(assignee, "assignee")?;
        let mut task = self.get(task_id)?;

        if task.status.is_terminal() {
            return Err(DeskError::invalid_state("task", task_id, task.status, "reassign"));
        }

        task.assignee = assignee.trim().to_string();
        self.tasks.update(&task)?;
        info!(task_id, assignee = %task.assignee, "task reassigned");

        Ok(task)
    }

    pub fn delete(&self, task_id: RecordId) -> Result<()> {
        if !self.tasks.delete(task_id)? {
            return Err(DeskError::not_found("staff_task", task_id));
        }
        info!(task_id, "task deleted");
        Ok(())
    }
}
