//! Integration tests for the gitctx binary.
//!
//! Every invocation gets its own HOME, XDG_CONFIG_HOME and GITCTX_CONFIG so
//! the user's real configuration never leaks in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated environment for one test.
struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.home.path().join("gitctx.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gitctx").unwrap();
        cmd.env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join("xdg"))
            .env("GITCTX_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// A one-commit repository on `main` with `docs/index.md`.
fn source_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init"]);
    run_git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "user.name", "Test User"]);
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/index.md"), "# Docs\n").unwrap();
    run_git(dir.path(), &["add", "."]);
    run_git(dir.path(), &["commit", "-m", "Initial commit"]);
    dir
}

// =============================================================================
// parse
// =============================================================================

#[test]
fn parse_prints_components() {
    Env::new()
        .cmd()
        .args(["parse", "github.com/org/repo#v1.0:tools/build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remote: https://github.com/org/repo"))
        .stdout(predicate::str::contains("ref:    v1.0"))
        .stdout(predicate::str::contains("subdir: tools/build"));
}

#[test]
fn parse_json() {
    let output = Env::new()
        .cmd()
        .args(["parse", "git@github.com:org/repo.git#main:docs", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["remote"], "git@github.com:org/repo.git");
    assert_eq!(value["ref"], "main");
    assert_eq!(value["subdir"], "docs");
}

#[test]
fn parse_default_ref_flag() {
    Env::new()
        .cmd()
        .args(["parse", "github.com/org/repo", "--default-ref", "trunk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ref:    trunk"));
}

#[test]
fn parse_uses_configured_default_ref() {
    let env = Env::new();
    fs::write(env.config_path(), "default_ref = \"develop\"\n").unwrap();

    env.cmd()
        .args(["parse", "github.com/org/repo#:docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ref:    develop"));
}

#[test]
fn parse_rejects_malformed_locator() {
    Env::new()
        .cmd()
        .args(["parse", "http://[::1/repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("invalid git locator"));
}

#[test]
fn invalid_default_ref_flag_is_rejected() {
    Env::new()
        .cmd()
        .args(["parse", "github.com/org/repo", "--default-ref", "bad..ref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--default-ref"));
}

// =============================================================================
// probe
// =============================================================================

#[test]
fn probe_non_http_is_shallow() {
    Env::new()
        .cmd()
        .args(["probe", "git@github.com:org/repo.git"])
        .assert()
        .success()
        .stdout("shallow\n");
}

// =============================================================================
// config
// =============================================================================

#[test]
fn config_set_then_get() {
    let env = Env::new();

    env.cmd()
        .args(["config", "set", "default_ref", "trunk"])
        .assert()
        .success();
    assert!(env.config_path().is_file());

    env.cmd()
        .args(["config", "get", "default_ref"])
        .assert()
        .success()
        .stdout("trunk\n");
}

#[test]
fn config_get_reports_defaults() {
    Env::new()
        .cmd()
        .args(["config", "get", "fetch.remote_name"])
        .assert()
        .success()
        .stdout("origin\n");
}

#[test]
fn config_list_shows_every_key() {
    Env::new()
        .cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_ref = master"))
        .stdout(predicate::str::contains("fetch.shallow = auto"))
        .stdout(predicate::str::contains("probe.timeout_secs = (not set)"));
}

#[test]
fn config_rejects_unknown_key() {
    Env::new()
        .cmd()
        .args(["config", "set", "no.such.key", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn config_rejects_invalid_value_without_writing() {
    let env = Env::new();
    env.cmd()
        .args(["config", "set", "fetch.shallow", "sometimes"])
        .assert()
        .failure();
    assert!(!env.config_path().exists());
}

#[test]
fn broken_config_file_is_reported() {
    let env = Env::new();
    fs::write(env.config_path(), "not_a_key = 1\n").unwrap();

    env.cmd()
        .args(["parse", "github.com/org/repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_prints_context_dir() {
    let repo = source_repo();
    let env = Env::new();
    let dest = env.home.path().join("ctx");
    let locator = format!("file://{}#main:docs", repo.path().display());

    env.cmd()
        .arg("resolve")
        .arg(&locator)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::ends_with("docs\n"));

    assert!(dest.join("docs/index.md").is_file());
}

#[test]
fn resolve_json_reports_head() {
    let repo = source_repo();
    let env = Env::new();
    let dest = env.home.path().join("ctx");
    let locator = format!("file://{}", repo.path().display());

    let output = env
        .cmd()
        .args(["resolve", &locator, "--default-ref", "main", "--no-shallow", "--json"])
        .arg("--dest")
        .arg(&dest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["repo"]["ref"], "main");
    assert_eq!(value["shallow"], false);
    assert_eq!(value["head"]["branch"], "main");
    assert_eq!(value["head"]["shallow"], false);
}

#[test]
fn resolve_failure_names_left_over_tree() {
    let repo = source_repo();
    let env = Env::new();
    let dest = env.home.path().join("ctx");
    let locator = format!("file://{}#missing", repo.path().display());

    env.cmd()
        .arg("resolve")
        .arg(&locator)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("working tree left at"))
        .stderr(predicate::str::contains("missing"));

    assert!(dest.join(".git").is_dir());
}

#[test]
fn resolve_refuses_non_empty_dest() {
    let repo = source_repo();
    let env = Env::new();
    let dest = env.home.path().join("ctx");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("keep.txt"), "mine").unwrap();

    env.cmd()
        .arg("resolve")
        .arg(format!("file://{}", repo.path().display()))
        .arg("--dest")
        .arg(&dest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not empty"));

    assert_eq!(fs::read_to_string(dest.join("keep.txt")).unwrap(), "mine");
}

// =============================================================================
// completion
// =============================================================================

#[test]
fn completion_bash() {
    Env::new()
        .cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gitctx"));
}
