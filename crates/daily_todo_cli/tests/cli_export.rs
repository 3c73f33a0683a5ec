use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("daily-todo-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_daily_todo"))
        .args(args)
        .env("DAILY_TODO_STORE_PATH", store_path)
        .env("DAILY_TODO_CONFIG_PATH", store_path.with_extension("config.json"))
        .env("DAILY_TODO_USER", "sabuj")
        .env("DAILY_TODO_PASSWORD", "pw")
        .output()
        .expect("failed to run daily_todo")
}

fn cleanup(store_path: &Path) {
    std::fs::remove_file(store_path).ok();
    let mut lock = store_path.as_os_str().to_os_string();
    lock.push(".lock");
    std::fs::remove_file(PathBuf::from(lock)).ok();
}

/// A store written by an older client: no task ids, one account
/// missing its archive.
fn write_legacy_store(path: &Path) {
    let content = serde_json::json!({
        "sabuj": {
            "password": "pw",
            "tasks": [
                {
                    "Task": "Plan sprint",
                    "Description": "backlog, estimates",
                    "Start": "2024-01-15",
                    "End": "2024-01-20",
                    "Status": "Running",
                    "Priority": "High",
                    "AssignedBy": "lead",
                    "Created": "2024-01-14 09:00:00",
                    "Color": "blue"
                },
                {
                    "Task": "February task",
                    "Description": "",
                    "Start": "2024-02-01",
                    "End": "2024-02-02",
                    "Status": "Pending",
                    "Priority": "Low",
                    "AssignedBy": "",
                    "Created": "2024-01-14 09:05"
                }
            ],
            "completed": [
                {
                    "Task": "Kickoff",
                    "Description": "say \"hello\"",
                    "Start": "2024-01-02",
                    "End": "2024-01-02",
                    "Status": "Completed",
                    "Priority": "Medium",
                    "AssignedBy": "boss",
                    "Created": "2024-01-01 10:00:00",
                    "CompletedAt": "2024-01-02 17:00:00"
                }
            ]
        },
        "guest": {
            "password": ""
        }
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

#[test]
fn export_emits_range_as_csv() {
    let store_path = temp_path("cli-export.json");
    write_legacy_store(&store_path);

    let output = run(
        &store_path,
        &["export", "--from", "2024-01-01", "--to", "2024-01-31"],
    );
    cleanup(&store_path);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Task,Description,Start,End,Status,Priority,AssignedBy",
            "Plan sprint,\"backlog, estimates\",2024-01-15,2024-01-20,Overdue,High,lead",
            "Kickoff,\"say \"\"hello\"\"\",2024-01-02,2024-01-02,Completed,Medium,boss",
        ]
    );
}

#[test]
fn loading_legacy_store_repairs_and_keeps_unknown_fields() {
    let store_path = temp_path("cli-legacy.json");
    write_legacy_store(&store_path);

    let output = run(&store_path, &["--json", "list", "active"]);
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    cleanup(&store_path);

    assert!(output.status.success());
    let sabuj = &stored["sabuj"];
    assert!(sabuj["tasks"][0]["Id"].as_str().unwrap().starts_with("task-"));
    assert!(sabuj["completed"][0]["Id"].is_string());
    assert_eq!(sabuj["tasks"][0]["Color"], "blue");
    assert_eq!(sabuj["tasks"][0]["Status"], "Running");
    assert_eq!(stored["guest"]["tasks"], serde_json::json!([]));
    assert_eq!(stored["guest"]["completed"], serde_json::json!([]));
}

#[test]
fn list_completed_filters_by_start_date() {
    let store_path = temp_path("cli-list-range.json");
    write_legacy_store(&store_path);

    let january = run(
        &store_path,
        &["--json", "list", "completed", "--from", "2024-01-01", "--to", "2024-01-31"],
    );
    let february = run(
        &store_path,
        &["--json", "list", "completed", "--from", "2024-02-01"],
    );
    cleanup(&store_path);

    let january: serde_json::Value = serde_json::from_slice(&january.stdout).unwrap();
    let february: serde_json::Value = serde_json::from_slice(&february.stdout).unwrap();
    assert_eq!(january.as_array().unwrap().len(), 1);
    assert_eq!(january[0]["Task"], "Kickoff");
    assert!(february.as_array().unwrap().is_empty());
}

#[test]
fn corrupt_store_is_reported_not_overwritten() {
    let store_path = temp_path("cli-corrupt.json");
    std::fs::write(&store_path, "{ \"sabuj\": ").unwrap();

    let output = run(&store_path, &["list", "active"]);
    let content = std::fs::read_to_string(&store_path).unwrap();
    cleanup(&store_path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: storage_unavailable"));
    assert_eq!(content, "{ \"sabuj\": ");
}
