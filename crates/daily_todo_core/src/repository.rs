use crate::config::RangePolicy;
use crate::dates;
use crate::error::AppError;
use crate::model::{Account, Task, TaskDraft, TaskPatch, TaskStatus, new_task_id};
use time::Date;

/// Task operations over a single account. Tasks are addressed by id only;
/// an id that no longer resolves is `NotFound`, an id that resolves into the
/// archive is `TerminalState`.
#[derive(Debug, Clone, Copy)]
pub struct TaskRepository {
    policy: RangePolicy,
    today: Date,
}

impl TaskRepository {
    pub fn new(policy: RangePolicy, today: Date) -> Self {
        Self { policy, today }
    }

    pub fn today(&self) -> Date {
        self.today
    }

    /// New tasks go to the front: newest first is the display order.
    pub fn add(&self, account: &mut Account, draft: TaskDraft) -> Result<Task, AppError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::empty_title("task title required"));
        }
        self.check_range(draft.start, draft.end)?;

        let task = Task {
            id: new_task_id(),
            title: title.to_string(),
            description: draft.description,
            start: dates::format_date(draft.start)?,
            end: dates::format_date(draft.end)?,
            status: TaskStatus::Pending,
            priority: draft.priority,
            assigned_by: draft.assigned_by,
            created_at: Some(dates::now_timestamp()?),
            completed_at: None,
            extra: Default::default(),
        };

        account.tasks.insert(0, task.clone());
        tracing::info!(task = %task.id, "task added");
        Ok(task)
    }

    pub fn edit(&self, account: &mut Account, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
        let index = locate_active(account, id)?;
        let task = &mut account.tasks[index];

        let start = match patch.start {
            Some(date) => Some(date),
            None => task.start_date(),
        };
        let end = match patch.end {
            Some(date) => Some(date),
            None => task.end_date(),
        };
        if let (Some(start), Some(end)) = (start, end) {
            self.check_range(start, end)?;
        }

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(date) = patch.start {
            task.start = dates::format_date(date)?;
        }
        if let Some(date) = patch.end {
            task.end = dates::format_date(date)?;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(assigned_by) = patch.assigned_by {
            task.assigned_by = Some(assigned_by);
        }

        tracing::info!(task = %task.id, "task edited");
        Ok(task.clone())
    }

    pub fn delete(&self, account: &mut Account, id: &str) -> Result<Task, AppError> {
        let index = locate_active(account, id)?;
        let removed = account.tasks.remove(index);
        tracing::info!(task = %removed.id, "task deleted");
        Ok(removed)
    }

    /// Moves the task into the archive and returns the archived copy.
    pub fn complete(&self, account: &mut Account, id: &str) -> Result<Task, AppError> {
        let index = locate_active(account, id)?;
        let completed_at = dates::now_timestamp()?;

        let mut task = account.tasks.remove(index);
        task.status = TaskStatus::Completed;
        task.completed_at = Some(completed_at);
        account.completed.insert(0, task.clone());

        tracing::info!(task = %task.id, "task completed");
        Ok(task)
    }

    pub fn set_running(&self, account: &mut Account, id: &str) -> Result<Task, AppError> {
        let index = locate_active(account, id)?;
        let task = &mut account.tasks[index];

        match effective_status(task, self.today) {
            TaskStatus::Pending | TaskStatus::Overdue => {}
            other => {
                return Err(AppError::invalid_transition(format!(
                    "task is {other}, only pending or overdue tasks can start running"
                )));
            }
        }

        task.status = TaskStatus::Running;
        tracing::info!(task = %task.id, "task running");
        Ok(task.clone())
    }

    /// The active collection with overdue labels applied for `today`.
    pub fn active(&self, account: &Account) -> Vec<Task> {
        let mut tasks = account.tasks.clone();
        sweep_overdue(&mut tasks, self.today);
        tasks
    }

    fn check_range(&self, start: Date, end: Date) -> Result<(), AppError> {
        if self.policy == RangePolicy::RejectInverted && end < start {
            return Err(AppError::invalid_range(format!(
                "end date {end} precedes start date {start}"
            )));
        }
        Ok(())
    }
}

fn locate_active(account: &Account, id: &str) -> Result<usize, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    if let Some(index) = account.tasks.iter().position(|task| task.id == id) {
        if account.tasks[index].is_archived() {
            return Err(AppError::terminal_state("task already completed"));
        }
        return Ok(index);
    }

    if account.find_archived(id).is_some() {
        return Err(AppError::terminal_state("task already completed"));
    }
    Err(AppError::not_found(format!("task '{id}' not found")))
}

/// Overdue is derived, never stored: a task past its end date reads as
/// `Overdue`; otherwise it reads as its explicit status, where only `Running`
/// survives and anything else falls back to `Pending`.
pub fn effective_status(task: &Task, today: Date) -> TaskStatus {
    if task.status == TaskStatus::Completed {
        return TaskStatus::Completed;
    }
    if task.end_date().is_some_and(|end| end < today) {
        return TaskStatus::Overdue;
    }
    if task.status == TaskStatus::Running {
        TaskStatus::Running
    } else {
        TaskStatus::Pending
    }
}

pub fn sweep_overdue(tasks: &mut [Task], today: Date) {
    for task in tasks.iter_mut() {
        task.status = effective_status(task, today);
    }
}

/// Tasks whose start date lies in `[from, to]`, in input order. Tasks without
/// a readable start date never match. Clone the iterator to restart it.
pub fn filter_by_date_range<'a>(
    tasks: &'a [Task],
    from: Date,
    to: Date,
) -> impl Iterator<Item = &'a Task> + Clone + 'a {
    tasks
        .iter()
        .filter(move |task| task.start_date().is_some_and(|start| from <= start && start <= to))
}

/// Stable ascending sort by end date; unreadable end dates go last.
pub fn sort_by_end<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by_key(|task| {
        let end = task.end_date();
        (end.is_none(), end)
    });
    sorted
}
