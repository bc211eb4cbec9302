use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn opsboard_help_works() {
    Command::cargo_bin("opsboard")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("operational dashboard"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["board", "task", "status", "activity", "tokens"];

    for cmd in subcommands {
        Command::cargo_bin("opsboard")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn task_subcommand_help_works() {
    let subcommands = ["new", "list", "move", "rm", "stats"];

    for cmd in subcommands {
        Command::cargo_bin("opsboard")
            .expect("binary")
            .args(["task", cmd, "--help"])
            .assert()
            .success();
    }
}
