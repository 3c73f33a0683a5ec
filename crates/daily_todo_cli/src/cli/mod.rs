use clap::{Args, Parser, Subcommand};
use daily_todo_core::config::ConfigOverrides;
use daily_todo_core::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily to-do list backed by a JSON account store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Account to act as
    #[arg(long, global = true, env = "DAILY_TODO_USER")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, global = true, env = "DAILY_TODO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new account
    ///
    /// Example: daily_todo register alice s3cret
    Register {
        username: String,
        #[arg(value_name = "PASSWORD")]
        initial_password: Option<String>,
    },
    /// Change the password of --user
    ///
    /// Example: daily_todo --user alice --password old passwd old new --confirm new
    Passwd {
        old: String,
        new: String,
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Add a new task
    ///
    /// Example: daily_todo add "Write report" --end 2024-01-31 --priority high
    Add {
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit a task's fields
    ///
    /// Example: daily_todo edit task-1a2b --title "Write final report"
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete an active task
    ///
    /// Example: daily_todo delete task-1a2b
    Delete { id: String },
    /// Move a task to the completed archive
    ///
    /// Example: daily_todo done task-1a2b
    Done { id: String },
    /// Mark a pending or overdue task as running
    ///
    /// Example: daily_todo run task-1a2b
    Run { id: String },
    /// List tasks
    ///
    /// Example: daily_todo list active --sort-end
    /// Example: daily_todo list completed --from 2024-01-01 --to 2024-01-31
    List {
        #[command(subcommand)]
        list: ListCommand,
    },
    /// Export tasks starting within a date range as CSV
    ///
    /// Example: daily_todo export --from 2024-01-01 --to 2024-01-31
    Export {
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// high, medium or low
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long = "assigned-by")]
    pub assigned_by: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct RangeArgs {
    /// First start date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Last start date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Pending, running and overdue tasks
    Active {
        #[command(flatten)]
        range: RangeArgs,
        /// Order by end date instead of newest first
        #[arg(long)]
        sort_end: bool,
    },
    /// The completed archive
    Completed {
        #[command(flatten)]
        range: RangeArgs,
        /// Order by end date instead of completion order
        #[arg(long)]
        sort_end: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StorePath,
    RejectInvertedRange,
    LockTimeoutMs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        "reject_inverted_range" => ConfigOverrideTarget::RejectInvertedRange,
        "lock_timeout_ms" | "lock_timeout" => ConfigOverrideTarget::LockTimeoutMs,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` into one set of typed overrides.
pub fn collect_config_overrides(raws: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for raw in raws {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::StorePath => {
                if parsed.value.is_empty() {
                    return Err(AppError::invalid_input("store_path cannot be empty"));
                }
                overrides.store_path = Some(PathBuf::from(parsed.value));
            }
            ConfigOverrideTarget::RejectInvertedRange => {
                let flag = parse_bool(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input("reject_inverted_range must be true or false")
                })?;
                overrides.reject_inverted_range = Some(flag);
            }
            ConfigOverrideTarget::LockTimeoutMs => {
                let timeout = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input("lock_timeout_ms must be a whole number")
                })?;
                overrides.lock_timeout_ms = Some(timeout);
            }
        }
    }

    Ok(overrides)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
