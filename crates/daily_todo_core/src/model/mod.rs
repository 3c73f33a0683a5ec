mod account;
mod task;

pub(crate) use account::default_record;
pub use account::{Account, Users};
pub use task::{Priority, Task, TaskDraft, TaskPatch, TaskStatus};

pub(crate) fn new_task_id() -> String {
    format!("task-{}", uuid::Uuid::new_v4().simple())
}
