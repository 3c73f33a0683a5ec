use crate::config::{self, Config, DEFAULT_LOCK_TIMEOUT_MS};
use crate::error::AppError;
use crate::model::{Account, Users, default_record, new_task_id};
use crate::storage::lock::{FileLock, lock_path_for, write_atomic};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ACCOUNT_FIELDS: [&str; 3] = ["password", "tasks", "completed"];
const TASK_COLLECTIONS: [&str; 2] = ["tasks", "completed"];

/// The JSON document holding every account. Each public operation is a
/// complete load-mutate-save cycle under the store lock.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl UserStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let path = config::store_path(config)?;
        Ok(Self::new(path).with_lock_timeout(config.lock_timeout()))
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Users, AppError> {
        let _lock = self.lock()?;
        self.load_unlocked()
    }

    pub fn save(&self, users: &Users) -> Result<(), AppError> {
        let _lock = self.lock()?;
        self.save_unlocked(users)
    }

    /// Runs `mutate` against freshly loaded accounts and persists the result
    /// only when it succeeds. The lock is held for the whole cycle.
    pub fn update<T, F>(&self, mutate: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Users) -> Result<T, AppError>,
    {
        let _lock = self.lock()?;
        let mut users = self.load_unlocked()?;
        let outcome = mutate(&mut users)?;
        self.save_unlocked(&users)?;
        Ok(outcome)
    }

    pub fn account(&self, username: &str) -> Result<Account, AppError> {
        self.load()?
            .remove(username)
            .ok_or_else(|| AppError::not_found(format!("user '{username}' not found")))
    }

    pub fn create_account(&self, username: &str, password: Option<&str>) -> Result<Account, AppError> {
        if username.trim().is_empty() {
            return Err(AppError::invalid_username("username cannot be empty"));
        }
        if username.trim() != username {
            return Err(AppError::invalid_username(
                "username cannot start or end with whitespace",
            ));
        }

        let account = Account::with_password(password.unwrap_or_default());
        self.update(|users| {
            if users.contains_key(username) {
                return Err(AppError::duplicate_user(format!(
                    "user '{username}' already exists"
                )));
            }
            users.insert(username.to_string(), account.clone());
            Ok(())
        })?;

        tracing::info!(user = username, "account created");
        Ok(account)
    }

    /// Exact comparison against the stored password, no trimming or case
    /// folding.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let users = self.load()?;
        match users.get(username) {
            Some(account) if account.password == password => Ok(account.clone()),
            _ => {
                tracing::debug!(user = username, "authentication rejected");
                Err(AppError::auth_failure("invalid username or password"))
            }
        }
    }

    pub fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> Result<(), AppError> {
        self.update(|users| {
            let account = users
                .get_mut(username)
                .ok_or_else(|| AppError::not_found(format!("user '{username}' not found")))?;
            if account.password != old_password {
                return Err(AppError::wrong_password("old password incorrect"));
            }
            if let Some(confirmation) = confirmation
                && confirmation != new_password
            {
                return Err(AppError::mismatch("passwords do not match"));
            }
            account.password = new_password.to_string();
            Ok(())
        })?;

        tracing::info!(user = username, "password changed");
        Ok(())
    }

    fn lock(&self) -> Result<FileLock, AppError> {
        FileLock::acquire(&lock_path_for(&self.path), self.lock_timeout)
    }

    fn load_unlocked(&self) -> Result<Users, AppError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "store missing, starting empty");
            return Ok(Users::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            AppError::storage_unavailable(format!("{}: {}", self.path.display(), err))
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|err| {
            AppError::storage_unavailable(format!("invalid JSON in {}: {}", self.path.display(), err))
        })?;
        let Value::Object(mut raw) = document else {
            return Err(AppError::storage_unavailable(format!(
                "{} must hold a JSON object",
                self.path.display()
            )));
        };

        let repaired = repair_users(&mut raw);
        let users: Users = serde_json::from_value(Value::Object(raw)).map_err(|err| {
            AppError::storage_unavailable(format!("corrupt record in {}: {}", self.path.display(), err))
        })?;

        if repaired {
            tracing::warn!(path = %self.path.display(), "persisting repaired account records");
            self.save_unlocked(&users)?;
        }
        tracing::debug!(path = %self.path.display(), accounts = users.len(), "store loaded");
        Ok(users)
    }

    fn save_unlocked(&self, users: &Users) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(users)
            .map_err(|err| AppError::storage_unavailable(err.to_string()))?;
        write_atomic(&self.path, content.as_bytes())?;
        tracing::debug!(path = %self.path.display(), accounts = users.len(), "store saved");
        Ok(())
    }
}

/// Back-fills missing account fields and task ids. Returns whether anything
/// changed; a valid document is left untouched.
fn repair_users(raw: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    for (username, record) in raw.iter_mut() {
        let Some(fields) = record.as_object_mut() else {
            tracing::warn!(user = %username, "replacing non-object account record");
            *record = default_record();
            changed = true;
            continue;
        };

        for key in ACCOUNT_FIELDS {
            if !fields.contains_key(key) {
                tracing::warn!(user = %username, field = key, "back-filling missing field");
                if let Some(default) = default_record().get(key) {
                    fields.insert(key.to_string(), default.clone());
                }
                changed = true;
            }
        }

        for key in TASK_COLLECTIONS {
            let Some(Value::Array(items)) = fields.get_mut(key) else {
                continue;
            };
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                let has_id = item
                    .get("Id")
                    .and_then(Value::as_str)
                    .is_some_and(|id| !id.trim().is_empty());
                if !has_id {
                    item.insert("Id".to_string(), Value::String(new_task_id()));
                    changed = true;
                }
            }
        }
    }

    changed
}
