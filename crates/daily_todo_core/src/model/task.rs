use crate::dates;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Task", default)]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Start", default)]
    pub start: String,
    #[serde(rename = "End", default)]
    pub end: String,
    #[serde(rename = "Status", default)]
    pub status: TaskStatus,
    #[serde(rename = "Priority", default)]
    pub priority: Priority,
    #[serde(rename = "AssignedBy", default, skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<String>,
    #[serde(rename = "Created", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "CompletedAt", default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Keys written by other clients, kept so a save never drops them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn start_date(&self) -> Option<Date> {
        dates::parse_stored_date(&self.start)
    }

    pub fn end_date(&self) -> Option<Date> {
        dates::parse_stored_date(&self.end)
    }

    pub fn is_archived(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Stored task status. A label written by another client that is not one of
/// the four known states is kept verbatim in `Other` and written back as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Overdue,
    Other(String),
}

impl TaskStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::Other(label) => label,
        }
    }

    fn from_label(label: String) -> Self {
        match label.as_str() {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Completed" => Self::Completed,
            "Overdue" => Self::Overdue,
            _ => Self::Other(label),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_label(deserializer, "Status")?
            .map(Self::from_label)
            .unwrap_or_default())
    }
}

/// Same tolerance as `TaskStatus`: null reads as `Low`, unknown labels are
/// kept in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
    Other(String),
}

impl Priority {
    pub fn label(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(label) => label,
        }
    }

    /// Parses user input; only the three known levels are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Self::High),
            "medium" | "med" | "m" => Some(Self::Medium),
            "low" | "l" => Some(Self::Low),
            _ => None,
        }
    }

    fn from_label(label: String) -> Self {
        match label.as_str() {
            "High" => Self::High,
            "Medium" => Self::Medium,
            "Low" => Self::Low,
            _ => Self::Other(label),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_label(deserializer, "Priority")?
            .map(Self::from_label)
            .unwrap_or_default())
    }
}

/// Reads a label field without failing the document: null and non-string
/// values yield `None`.
fn lenient_label<'de, D: Deserializer<'de>>(
    deserializer: D,
    field: &str,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(label) => Ok(Some(label)),
        Value::Null => Ok(None),
        other => {
            tracing::warn!(field, value = %other, "ignoring non-text label");
            Ok(None)
        }
    }
}

/// Input for a new task. Dates are already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub start: Date,
    pub end: Date,
    pub priority: Priority,
    pub assigned_by: Option<String>,
}

impl TaskDraft {
    /// A draft spanning a single day, the same defaults the entry form offers.
    pub fn new<T: Into<String>>(title: T, day: Date) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start: day,
            end: day,
            priority: Priority::default(),
            assigned_by: None,
        }
    }
}

/// Field updates accepted by edit. Status and creation time are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub priority: Option<Priority>,
    pub assigned_by: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
