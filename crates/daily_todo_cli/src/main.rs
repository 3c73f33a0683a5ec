mod cli;

use clap::Parser;
use clap::error::ErrorKind;
use cli::{Cli, Command, ListCommand, RangeArgs, TaskFields};
use daily_todo_core::config::{self, Config};
use daily_todo_core::dates;
use daily_todo_core::error::AppError;
use daily_todo_core::model::{Priority, Task, TaskDraft, TaskPatch};
use daily_todo_core::repository;
use daily_todo_core::session::Session;
use daily_todo_core::storage::UserStore;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "AssignedBy")]
    assigned_by: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            start: task.start.clone(),
            end: task.end.clone(),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            assigned_by: task.assigned_by.clone().unwrap_or_default(),
        }
    }
}

fn print_tasks_plain(tasks: &[&Task], empty_message: &str) {
    if tasks.is_empty() {
        println!("{empty_message}");
        return;
    }
    let rows: Vec<TaskRow> = tasks.iter().map(|task| TaskRow::from(*task)).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_task(task: &Task, verb: &str, json: bool) -> Result<(), AppError> {
    if json {
        print_json(task)
    } else {
        println!("{verb} task: {} ({})", task.title, task.id);
        Ok(())
    }
}

fn normalize_parse_error(err: &clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<Date>, AppError> {
    raw.map(dates::parse_date).transpose()
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, AppError> {
    raw.map(|value| {
        Priority::parse(value).ok_or_else(|| {
            AppError::invalid_input(format!("priority must be high, medium or low: '{value}'"))
        })
    })
    .transpose()
}

fn build_draft(title: Option<String>, fields: TaskFields, today: Date) -> Result<TaskDraft, AppError> {
    let title = title.unwrap_or_default();
    let start = parse_optional_date(fields.start.as_deref())?.unwrap_or(today);
    let end = parse_optional_date(fields.end.as_deref())?.unwrap_or(today);

    let mut draft = TaskDraft::new(title, start);
    draft.end = end;
    draft.description = fields.description.unwrap_or_default();
    draft.assigned_by = fields.assigned_by;
    if let Some(priority) = parse_priority(fields.priority.as_deref())? {
        draft.priority = priority;
    }
    Ok(draft)
}

fn build_patch(title: Option<String>, fields: TaskFields) -> Result<TaskPatch, AppError> {
    Ok(TaskPatch {
        title,
        description: fields.description,
        start: parse_optional_date(fields.start.as_deref())?,
        end: parse_optional_date(fields.end.as_deref())?,
        priority: parse_priority(fields.priority.as_deref())?,
        assigned_by: fields.assigned_by,
    })
}

/// An absent bound leaves that side of the range open; export defaults both
/// sides to today instead.
fn resolve_range(range: &RangeArgs, fallback: Option<Date>) -> Result<Option<(Date, Date)>, AppError> {
    let from = parse_optional_date(range.from.as_deref())?;
    let to = parse_optional_date(range.to.as_deref())?;
    match (from, to, fallback) {
        (None, None, None) => Ok(None),
        (from, to, fallback) => Ok(Some((
            from.or(fallback).unwrap_or(Date::MIN),
            to.or(fallback).unwrap_or(Date::MAX),
        ))),
    }
}

fn select<'a>(tasks: &'a [Task], range: Option<(Date, Date)>, sort_end: bool) -> Vec<&'a Task> {
    let selected: Vec<&Task> = match range {
        Some((from, to)) => repository::filter_by_date_range(tasks, from, to).collect(),
        None => tasks.iter().collect(),
    };
    if sort_end {
        repository::sort_by_end(selected)
    } else {
        selected
    }
}

fn resolve_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: {err}");
    }
    let overrides = cli::collect_config_overrides(raw_overrides)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn open_session<'a>(
    user: Option<&str>,
    password: Option<&str>,
    store: &'a UserStore,
    config: &Config,
) -> Result<Session<'a>, AppError> {
    let user = user.ok_or_else(|| AppError::invalid_input("--user is required"))?;
    let session = Session::login(store, user, password.unwrap_or_default())?;
    Ok(session.with_policy(config.range_policy()))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli.config_override)?;
    let store = UserStore::from_config(&config)?;
    tracing::debug!(store = %store.path().display(), "using store");

    let Cli {
        command,
        json,
        user,
        password,
        ..
    } = cli;
    let login = || open_session(user.as_deref(), password.as_deref(), &store, &config);

    match command {
        Command::Register {
            username,
            initial_password,
        } => {
            store.create_account(&username, initial_password.as_deref())?;
            if json {
                print_json(&serde_json::json!({ "username": username }))?;
            } else {
                println!("Account created: {username}");
            }
        }
        Command::Passwd { old, new, confirm } => {
            let session = login()?;
            session.change_password(&old, &new, confirm.as_deref())?;
            if json {
                print_json(&serde_json::json!({ "username": session.username() }))?;
            } else {
                println!("Password updated");
            }
        }
        Command::Add { title, fields } => {
            let session = login()?;
            let draft = build_draft(title, fields, session.today())?;
            let task = session.add_task(draft)?;
            print_task(&task, "Added", json)?;
        }
        Command::Edit { id, title, fields } => {
            let patch = build_patch(title, fields)?;
            if patch.is_empty() {
                return Err(AppError::invalid_input("edit needs at least one field to change"));
            }
            let task = login()?.edit_task(&id, patch)?;
            print_task(&task, "Updated", json)?;
        }
        Command::Delete { id } => {
            let task = login()?.delete_task(&id)?;
            print_task(&task, "Deleted", json)?;
        }
        Command::Done { id } => {
            let task = login()?.complete_task(&id)?;
            print_task(&task, "Completed", json)?;
        }
        Command::Run { id } => {
            let task = login()?.start_task(&id)?;
            print_task(&task, "Running", json)?;
        }
        Command::List { list } => {
            let session = login()?;
            let (tasks, range, sort_end, empty_message) = match list {
                ListCommand::Active { range, sort_end } => {
                    (session.active_tasks()?, range, sort_end, "No active tasks.")
                }
                ListCommand::Completed { range, sort_end } => (
                    session.completed_tasks()?,
                    range,
                    sort_end,
                    "No completed tasks yet.",
                ),
            };
            let selected = select(&tasks, resolve_range(&range, None)?, sort_end);
            if json {
                print_json(&selected)?;
            } else {
                print_tasks_plain(&selected, empty_message);
            }
        }
        Command::Export { range } => {
            let session = login()?;
            let today = session.today();
            let (from, to) = resolve_range(&range, Some(today))?.unwrap_or((today, today));
            print!("{}", session.export_csv(from, to)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    // Off unless RUST_LOG asks for it; stdout stays reserved for command output.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(&err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
