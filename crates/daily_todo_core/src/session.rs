use crate::config::RangePolicy;
use crate::dates;
use crate::error::AppError;
use crate::export;
use crate::model::{Account, Task, TaskDraft, TaskPatch, Users};
use crate::repository::{self, TaskRepository};
use crate::storage::UserStore;
use time::Date;

/// An authenticated user's view of the store. Every call reloads the account
/// under the store lock, so ids captured from an earlier listing are checked
/// against current data rather than trusted.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    store: &'a UserStore,
    username: String,
    policy: RangePolicy,
    today: Option<Date>,
}

impl<'a> Session<'a> {
    pub fn login(store: &'a UserStore, username: &str, password: &str) -> Result<Self, AppError> {
        store.authenticate(username, password)?;
        tracing::debug!(user = username, "session opened");
        Ok(Self {
            store,
            username: username.to_string(),
            policy: RangePolicy::default(),
            today: None,
        })
    }

    pub fn with_policy(mut self, policy: RangePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pins the date used for overdue checks instead of the local clock.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn today(&self) -> Date {
        self.today.unwrap_or_else(dates::today)
    }

    fn repository(&self) -> TaskRepository {
        TaskRepository::new(self.policy, self.today())
    }

    fn with_account<T, F>(&self, mutate: F) -> Result<T, AppError>
    where
        F: FnOnce(&TaskRepository, &mut Account) -> Result<T, AppError>,
    {
        let repository = self.repository();
        self.store.update(|users: &mut Users| {
            let account = users
                .get_mut(&self.username)
                .ok_or_else(|| AppError::not_found(format!("user '{}' not found", self.username)))?;
            mutate(&repository, account)
        })
    }

    pub fn account(&self) -> Result<Account, AppError> {
        self.store.account(&self.username)
    }

    pub fn add_task(&self, draft: TaskDraft) -> Result<Task, AppError> {
        self.with_account(|repository, account| repository.add(account, draft))
    }

    pub fn edit_task(&self, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
        self.with_account(|repository, account| repository.edit(account, id, patch))
    }

    pub fn delete_task(&self, id: &str) -> Result<Task, AppError> {
        self.with_account(|repository, account| repository.delete(account, id))
    }

    pub fn complete_task(&self, id: &str) -> Result<Task, AppError> {
        self.with_account(|repository, account| repository.complete(account, id))
    }

    pub fn start_task(&self, id: &str) -> Result<Task, AppError> {
        self.with_account(|repository, account| repository.set_running(account, id))
    }

    /// Active tasks, newest first, with overdue labels applied.
    pub fn active_tasks(&self) -> Result<Vec<Task>, AppError> {
        let account = self.account()?;
        Ok(self.repository().active(&account))
    }

    pub fn completed_tasks(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.account()?.completed)
    }

    /// Active then archived tasks starting within `[from, to]`.
    pub fn tasks_in_range(&self, from: Date, to: Date) -> Result<Vec<Task>, AppError> {
        let account = self.account()?;
        let active = self.repository().active(&account);
        let in_range = repository::filter_by_date_range(&active, from, to)
            .chain(repository::filter_by_date_range(&account.completed, from, to))
            .cloned()
            .collect();
        Ok(in_range)
    }

    pub fn export_csv(&self, from: Date, to: Date) -> Result<String, AppError> {
        let tasks = self.tasks_in_range(from, to)?;
        Ok(export::to_csv(&tasks))
    }

    pub fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> Result<(), AppError> {
        self.store
            .change_password(&self.username, old_password, new_password, confirmation)
    }
}
