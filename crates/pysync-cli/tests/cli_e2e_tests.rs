//! CLI end-to-end tests that invoke the compiled `pysync` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use pysync_test_utils::fixtures::{self, BASIC, LOCAL_SOURCES, NO_SETUP, NON_LITERAL};
use pysync_test_utils::{LockedPackage, TestProject};

fn pysync(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("pysync").expect("Failed to find pysync binary");
    cmd.current_dir(project.root())
        .env("NO_COLOR", "1")
        .env_remove("PYSYNC_PROJECT_DIR");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let project = TestProject::new();
    pysync(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_sync_then_check_is_clean() {
    let project = fixtures::load(BASIC);

    pysync(&project)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup.py successfully updated: 2 entries"));

    pysync(&project)
        .args(["check", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No version conflict or missing packages/dependencies found in setup.py",
        ));
}

#[test]
fn test_second_sync_reports_up_to_date() {
    let project = fixtures::load(BASIC);
    pysync(&project).arg("sync").assert().success();

    pysync(&project)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
}

#[test]
fn test_sync_dry_run_prints_diff() {
    let project = fixtures::load(BASIC);
    let before = project.setup_py();

    pysync(&project)
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ b/setup.py"))
        .stdout(predicate::str::contains("+        \"click==8.1.7\","));

    assert_eq!(project.setup_py(), before);
}

#[test]
fn test_check_reports_problems_and_fails() {
    let project = fixtures::load(BASIC);

    pysync(&project)
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"click\" in Pipfile.lock not found in setup.py install_requires"))
        .stdout(predicate::str::contains("declares \"requests==2.30.0\", Pipfile.lock locks 2.31.0"))
        .stderr(predicate::str::contains("error: found 2 problems"));
}

#[test]
fn test_check_range_is_loose_only() {
    let project = TestProject::new()
        .with_packages(&[LockedPackage::pinned("requests", "2.31.0")])
        .with_setup_py("setup(install_requires=['requests>=2.0,<3.0'])\n");

    pysync(&project).arg("check").assert().success();
    pysync(&project).args(["check", "--strict"]).assert().code(1);
}

#[test]
fn test_check_ignore_local() {
    let project = fixtures::load(LOCAL_SOURCES);

    pysync(&project).arg("check").assert().code(1);
    pysync(&project)
        .args(["check", "--ignore-local"])
        .assert()
        .success();
}

#[test]
fn test_missing_lock_fails_without_writing() {
    let project = TestProject::new().with_pipfile("[packages]\nrequests = \"*\"\n");

    for command in ["sync", "check"] {
        pysync(&project)
            .arg(command)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Pipfile.lock not found"));
    }
    project.assert_file_not_exists("setup.py");
}

#[test]
fn test_sync_creates_missing_setup_py() {
    let project = fixtures::load(NO_SETUP);

    pysync(&project)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("has been created"));

    project.assert_file_contains("setup.py", "\"click==8.1.7\"");
    pysync(&project).arg("check").assert().success();
}

#[test]
fn test_check_requires_setup_py() {
    let project = fixtures::load(NO_SETUP);

    pysync(&project)
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("setup.py not found"));
}

#[test]
fn test_non_literal_list_is_fatal() {
    let project = fixtures::load(NON_LITERAL);
    let before = project.setup_py();

    for command in ["sync", "check"] {
        pysync(&project)
            .arg(command)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("'install_requires' in setup.py is not a literal list"));
    }
    assert_eq!(project.setup_py(), before);
}

#[test]
fn test_project_dir_option_and_env() {
    let project = fixtures::load(BASIC);
    let elsewhere = TestProject::new();

    pysync(&elsewhere)
        .arg("-C")
        .arg(project.root())
        .arg("sync")
        .assert()
        .success();
    project.assert_file_contains("setup.py", "\"click==8.1.7\"");

    pysync(&elsewhere)
        .env("PYSYNC_PROJECT_DIR", project.root())
        .args(["check", "--strict"])
        .assert()
        .success();
}

#[test]
fn test_verbose_logs_to_stderr() {
    let project = fixtures::load(BASIC);

    pysync(&project)
        .args(["--verbose", "sync", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Verbose mode enabled"));
}
