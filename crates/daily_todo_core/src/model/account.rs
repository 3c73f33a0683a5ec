use crate::model::Task;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Username to account record, as persisted.
pub type Users = BTreeMap<String, Account>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub password: String,
    pub tasks: Vec<Task>,
    pub completed: Vec<Task>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn with_password<P: Into<String>>(password: P) -> Self {
        Self {
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn find_archived(&self, id: &str) -> Option<&Task> {
        self.completed.iter().find(|task| task.id == id)
    }
}

/// The record synthesized for a missing or unusable account entry.
pub(crate) fn default_record() -> Value {
    let mut record = Map::new();
    record.insert("password".to_string(), Value::String(String::new()));
    record.insert("tasks".to_string(), Value::Array(Vec::new()));
    record.insert("completed".to_string(), Value::Array(Vec::new()));
    Value::Object(record)
}
