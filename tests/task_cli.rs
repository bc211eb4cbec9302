mod support;

use predicates::str::contains;
use support::{opsboard, TestBoard};

fn create_task(board: &TestBoard, title: &str) -> String {
    let output = opsboard(board)
        .args(["task", "new", "--title", title, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(envelope["schema_version"], "opsboard.v1");
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["command"], "task new");
    envelope["data"]["id"]
        .as_str()
        .expect("task id")
        .to_string()
}

#[test]
fn new_task_lands_in_todo_and_persists() {
    let board = TestBoard::new();
    let id = create_task(&board, "Write report");
    assert!(id.starts_with("task-"));

    let snapshot = board.read_snapshot();
    let tasks = snapshot["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], id.as_str());
    assert_eq!(tasks[0]["status"], "todo");
    assert_eq!(tasks[0]["priority"], "medium");
    assert!(tasks[0].get("completedAt").is_none());
    assert!(snapshot.get("lastUpdated").is_some());

    opsboard(&board)
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(contains("Write report"));
}

#[test]
fn new_task_rejects_blank_title_with_user_error() {
    let board = TestBoard::new();
    opsboard(&board)
        .args(["task", "new", "--title", "   "])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("title"));

    assert!(!board.snapshot_path().exists());
}

#[test]
fn new_task_rejects_past_due_date() {
    let board = TestBoard::new();
    opsboard(&board)
        .args([
            "task", "new", "--title", "Late", "--due", "2020-01-01",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("past"));
}

#[test]
fn move_sets_completed_at_and_back_clears_it() {
    let board = TestBoard::new();
    let id = create_task(&board, "Ship it");

    opsboard(&board)
        .args(["task", "move", &id, "done", "--json"])
        .assert()
        .success()
        .stdout(contains("\"changed\": true"));
    let snapshot = board.read_snapshot();
    assert_eq!(snapshot["tasks"][0]["status"], "done");
    assert!(snapshot["tasks"][0].get("completedAt").is_some());

    opsboard(&board)
        .args(["task", "move", &id, "todo"])
        .assert()
        .success();
    let snapshot = board.read_snapshot();
    assert_eq!(snapshot["tasks"][0]["status"], "todo");
    assert!(snapshot["tasks"][0].get("completedAt").is_none());
}

#[test]
fn move_to_same_column_reports_no_change() {
    let board = TestBoard::new();
    let id = create_task(&board, "Steady");

    opsboard(&board)
        .args(["task", "move", &id, "todo", "--json"])
        .assert()
        .success()
        .stdout(contains("\"changed\": false"));
}

#[test]
fn move_missing_task_succeeds_without_change() {
    let board = TestBoard::new();
    create_task(&board, "Keeper");

    opsboard(&board)
        .args(["task", "move", "task-ghost", "done", "--json"])
        .assert()
        .success()
        .stdout(contains("\"changed\": false"));
}

#[test]
fn move_rejects_unknown_status() {
    let board = TestBoard::new();
    let id = create_task(&board, "Target");

    opsboard(&board)
        .args(["task", "move", &id, "archived"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("archived"));
}

#[test]
fn rm_is_idempotent() {
    let board = TestBoard::new();
    let id = create_task(&board, "Doomed");

    opsboard(&board)
        .args(["task", "rm", &id, "--json"])
        .assert()
        .success()
        .stdout(contains("\"deleted\": true"));
    opsboard(&board)
        .args(["task", "rm", &id, "--json"])
        .assert()
        .success()
        .stdout(contains("\"deleted\": false"));
}

#[test]
fn list_filters_by_status() {
    let board = TestBoard::new();
    let first = create_task(&board, "First");
    create_task(&board, "Second");
    opsboard(&board)
        .args(["task", "move", &first, "progress"])
        .assert()
        .success();

    let output = opsboard(&board)
        .args(["task", "list", "--status", "progress", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    let tasks = envelope["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "First");
}

#[test]
fn stats_count_columns() {
    let board = TestBoard::new();
    let first = create_task(&board, "One");
    create_task(&board, "Two");
    create_task(&board, "Three");
    opsboard(&board)
        .args(["task", "move", &first, "done"])
        .assert()
        .success();

    let output = opsboard(&board)
        .args(["task", "stats", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(envelope["data"]["total"], 3);
    assert_eq!(envelope["data"]["todo"], 2);
    assert_eq!(envelope["data"]["done"], 1);
    assert_eq!(envelope["data"]["overdue"], 0);
}

#[test]
fn quiet_suppresses_human_output() {
    let board = TestBoard::new();
    let output = opsboard(&board)
        .args(["task", "new", "--title", "Silent", "--quiet"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(output.is_empty());
}
