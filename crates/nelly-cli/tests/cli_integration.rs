use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn nelly() -> Command {
    let mut cmd = Command::cargo_bin("nelly").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_zero() {
    nelly()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nelly"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_dry_run_local_script() {
    let fixture = fixture_path("release.nly");

    let assert = nelly()
        .args(["run", "--dry-run", fixture.to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();

    assert_eq!(stdout, "tagged 2 releases\n");

    // Bootstrap stages come first and in order
    let calls: Vec<&str> = stderr.lines().collect();
    assert_eq!(calls[0], "init directory=widgets");
    assert_eq!(calls[1], "createBranch name=main");
    assert_eq!(calls[2], "track name=main");
    assert_eq!(calls[3], "push");

    // Then the script's own commands, options stringified
    assert_eq!(calls[4], "tag message=\"automated release\" name=v1.0.0");
    assert_eq!(calls[5], "tag message=\"automated release\" name=v1.1.0-rc.1");
    assert_eq!(calls[6], "commit all=true message=bump");
    assert_eq!(calls.len(), 7);
}

#[test]
fn test_dry_run_remote_script() {
    let fixture = fixture_path("remote.nly");

    nelly()
        .args(["run", "--dry-run", fixture.to_str().unwrap()])
        .assert()
        .success()
        .stdout("cloned\n")
        .stderr(predicate::str::contains(
            "clone url=https://example.com/acme/widgets.git\ncheckout name=develop\n",
        ))
        .stderr(predicate::str::contains("init").not());
}

#[test]
fn test_syntax_error_exits_two() {
    let fixture = fixture_path("syntax_error.nly");

    nelly()
        .args(["run", "--dry-run", fixture.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("parse error"))
        .stderr(predicate::str::contains("2:5"))
        .stderr(predicate::str::contains("init directory").not());
}

#[test]
fn test_runtime_error_exits_three() {
    let fixture = fixture_path("division.nly");

    nelly()
        .args(["run", "--dry-run", fixture.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("runtime error: line 3: division by zero"));
}

#[test]
fn test_unknown_command_exits_three() {
    let fixture = fixture_path("unknown_command.nly");

    nelly()
        .args(["run", "--dry-run", fixture.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown command: deploy"));
}

#[test]
fn test_missing_git_binary_exits_one() {
    let fixture = fixture_path("remote.nly");
    let workdir = std::env::temp_dir();

    nelly()
        .args(["run", fixture.to_str().unwrap()])
        .args(["--git", "/nonexistent/nelly-test-git"])
        .args(["--workdir", workdir.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("git clone failed"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_run_nonexistent_file() {
    nelly()
        .args(["run", "--dry-run", "/nonexistent/path/script.nly"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn test_check_valid_script() {
    let fixture = fixture_path("release.nly");

    nelly()
        .args(["check", fixture.to_str().unwrap()])
        .assert()
        .success()
        .stdout("ok\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_check_reports_parse_error() {
    let fixture = fixture_path("syntax_error.nly");

    nelly()
        .args(["check", fixture.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected variable name after 'let'"));
}

#[test]
fn test_check_does_not_run_commands() {
    let fixture = fixture_path("unknown_command.nly");

    nelly()
        .args(["check", fixture.to_str().unwrap()])
        .assert()
        .success()
        .stdout("ok\n");
}
