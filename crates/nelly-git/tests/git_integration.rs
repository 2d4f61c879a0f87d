//! Integration tests that run scripts against a real `git` binary.
//!
//! These tests require git on `PATH` and are ignored by default.
//! Run with `cargo test -p nelly-git -- --ignored`.

use std::path::Path;
use std::process::Command;

use nelly_core::{run_script, CommandRegistry, ExecutionState};
use nelly_git::git::Git;
use nelly_git::GitCommands;

fn registry_in(workdir: &Path) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    GitCommands::new(Git::new("git", workdir)).register(&mut registry);
    registry
}

fn git_output(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn set_identity() {
    std::env::set_var("GIT_AUTHOR_NAME", "nelly");
    std::env::set_var("GIT_AUTHOR_EMAIL", "nelly@example.com");
    std::env::set_var("GIT_COMMITTER_NAME", "nelly");
    std::env::set_var("GIT_COMMITTER_EMAIL", "nelly@example.com");
}

#[test]
#[ignore]
fn test_local_bootstrap_creates_tracked_branch() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = registry_in(tmp.path());
    let state = ExecutionState::new();

    run_script("#! widgets : trunk\n", &registry, &state).unwrap();

    let repo = tmp.path().join("widgets");
    assert!(repo.join(".git").exists());
    assert_eq!(git_output(&repo, &["symbolic-ref", "--short", "HEAD"]), "trunk");
    assert_eq!(git_output(&repo, &["config", "branch.trunk.remote"]), "origin");
    assert_eq!(git_output(&repo, &["config", "branch.trunk.merge"]), "refs/heads/trunk");
    assert_eq!(state.current_branch().as_deref(), Some("trunk"));
    assert_eq!(state.current_repo().map(std::path::PathBuf::from), Some(repo));
}

#[test]
#[ignore]
fn test_commit_tag_and_branch() {
    set_identity();
    let tmp = tempfile::tempdir().unwrap();
    let registry = registry_in(tmp.path());
    let state = ExecutionState::new();

    let script = r#"#! widgets2 : main
commit .message("initial")
for v in [v0.1.0, v0.2.0] {
    tag .name(v) .message("release")
}
createBranch .name("feature")
commit .message("on feature")
"#;
    run_script(script, &registry, &state).unwrap();

    let repo = tmp.path().join("widgets2");
    assert_eq!(git_output(&repo, &["tag", "--list"]), "v0.1.0\nv0.2.0");
    assert_eq!(git_output(&repo, &["rev-parse", "--abbrev-ref", "HEAD"]), "feature");
    assert_eq!(git_output(&repo, &["rev-list", "--count", "HEAD"]), "2");
}

#[test]
#[ignore]
fn test_clone_from_local_remote_and_push() {
    set_identity();
    let tmp = tempfile::tempdir().unwrap();
    let origin = tmp.path().join("origin.git");
    let status = Command::new("git")
        .args(["init", "--bare"])
        .arg(&origin)
        .status()
        .unwrap();
    assert!(status.success());

    // Seed the bare repository with a main branch.
    let registry = registry_in(tmp.path());
    let seed = "#! seed : main\ncommit .message(\"seed\")\n";
    run_script(seed, &registry, &ExecutionState::new()).unwrap();
    let seed_repo = tmp.path().join("seed");
    git_output(&seed_repo, &["remote", "add", "origin", origin.to_str().unwrap()]);
    git_output(&seed_repo, &["push", "origin", "main"]);

    let clones = tmp.path().join("clones");
    std::fs::create_dir(&clones).unwrap();
    let registry = registry_in(&clones);
    let state = ExecutionState::new();
    // A filesystem path is local by shape, so the clone is an explicit command.
    let script = format!(
        "#! scratch : main\nclone .url(\"{}\") .directory(\"work\")\ncheckout .name(\"main\")\ncommit .message(\"from nelly\")\npush .branch(\"main\")\n",
        origin.display()
    );
    run_script(&script, &registry, &state).unwrap();

    assert_eq!(git_output(&origin, &["rev-list", "--count", "main"]), "2");
}
