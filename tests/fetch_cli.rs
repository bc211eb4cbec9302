mod support;

use predicates::str::contains;
use support::{opsboard, TestBoard};

#[test]
fn status_against_unreachable_endpoint_exits_4() {
    let board = TestBoard::new();
    opsboard(&board)
        .args(["status", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn unreachable_endpoint_error_hints_at_api_url() {
    let board = TestBoard::new();
    opsboard(&board)
        .args(["tokens", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(contains("--api-url"));
}

#[test]
fn json_error_envelope_carries_the_command() {
    let board = TestBoard::new();
    let output = opsboard(&board)
        .args(["activity", "--api-url", "http://127.0.0.1:9", "--json"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let envelope: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(envelope["schema_version"], "opsboard.v1");
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "activity");
    assert_eq!(envelope["error"]["code"], 4);
}
