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
        .env_remove("DAILY_TODO_USER")
        .env_remove("DAILY_TODO_PASSWORD")
        .output()
        .expect("failed to run daily_todo")
}

fn cleanup(store_path: &Path) {
    std::fs::remove_file(store_path).ok();
    let mut lock = store_path.as_os_str().to_os_string();
    lock.push(".lock");
    std::fs::remove_file(PathBuf::from(lock)).ok();
}

#[test]
fn register_creates_account_with_empty_collections() {
    let store_path = temp_path("cli-register.json");
    let output = run(&store_path, &["register", "alice", "pw"]);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    cleanup(&store_path);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Account created: alice"));
    assert_eq!(stored["alice"]["password"], "pw");
    assert_eq!(stored["alice"]["tasks"], serde_json::json!([]));
    assert_eq!(stored["alice"]["completed"], serde_json::json!([]));
}

#[test]
fn register_rejects_duplicate_user() {
    let store_path = temp_path("cli-register-dup.json");
    run(&store_path, &["register", "alice", "pw"]);
    let output = run(&store_path, &["register", "alice", "other"]);
    cleanup(&store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: duplicate_user"));
}

#[test]
fn commands_reject_wrong_password() {
    let store_path = temp_path("cli-bad-login.json");
    run(&store_path, &["register", "alice", "pw"]);
    let output = run(
        &store_path,
        &["--user", "alice", "--password", "nope", "list", "active"],
    );
    cleanup(&store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: auth_failure"));
}

#[test]
fn commands_require_user() {
    let store_path = temp_path("cli-no-user.json");
    let output = run(&store_path, &["list", "active"]);
    cleanup(&store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn passwd_swaps_credentials() {
    let store_path = temp_path("cli-passwd.json");
    run(&store_path, &["register", "alice", "old"]);

    let changed = run(
        &store_path,
        &[
            "--user", "alice", "--password", "old", "passwd", "old", "new", "--confirm", "new",
        ],
    );
    let with_new = run(
        &store_path,
        &["--user", "alice", "--password", "new", "list", "active"],
    );
    let with_old = run(
        &store_path,
        &["--user", "alice", "--password", "old", "list", "active"],
    );
    cleanup(&store_path);

    assert!(changed.status.success());
    assert!(with_new.status.success());
    assert!(!with_old.status.success());
}

#[test]
fn passwd_reports_mismatch() {
    let store_path = temp_path("cli-passwd-mismatch.json");
    run(&store_path, &["register", "alice", "old"]);

    let output = run(
        &store_path,
        &[
            "--user", "alice", "--password", "old", "passwd", "old", "new", "--confirm", "typo",
        ],
    );
    cleanup(&store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: mismatch"));
}

#[test]
fn register_rejects_padded_username() {
    let store_path = temp_path("cli-register-padded.json");
    let output = run(&store_path, &["register", " carol ", "pw"]);
    cleanup(&store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_username"));
}

#[test]
fn passwd_emits_json_when_asked() {
    let store_path = temp_path("cli-passwd-json.json");
    run(&store_path, &["register", "alice", "old"]);

    let output = run(
        &store_path,
        &[
            "--json", "--user", "alice", "--password", "old", "passwd", "old", "new",
        ],
    );
    cleanup(&store_path);

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["username"], "alice");
}

#[test]
fn store_path_override_beats_environment() {
    let env_store = temp_path("cli-env-store.json");
    let override_store = temp_path("cli-override-store.json");
    let override_arg = format!("store_path={}", override_store.display());

    let output = run(
        &env_store,
        &["--config-override", &override_arg, "register", "alice", "pw"],
    );
    let override_written = override_store.exists();
    let env_written = env_store.exists();
    cleanup(&env_store);
    cleanup(&override_store);

    assert!(output.status.success());
    assert!(override_written);
    assert!(!env_written);
}
