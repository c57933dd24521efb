//! CLI end-to-end tests that invoke the compiled `extfile` binary.

use assert_cmd::Command;
use assert_fs::prelude::*;
use extfile_test_utils::{CaseXml, ProjectXml, SuiteXml};
use predicates::prelude::*;

const PROJECT: &str = "demo-soapui-project.xml";

fn extfile() -> Command {
    let mut cmd = Command::cargo_bin("extfile").unwrap();
    cmd.env_remove("EXTFILE_SETTINGS");
    cmd
}

fn demo() -> String {
    ProjectXml::new("P")
        .suite(
            SuiteXml::new("S").case(
                CaseXml::new("C")
                    .groovy_step("G", "log.info 1", &[("externalFilenameBuildMode", "AUTO")])
                    .request_step("T", "<body/>", &[], &[]),
            ),
        )
        .render()
}

fn setup() -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(PROJECT).write_str(&demo()).unwrap();
    temp
}

#[test]
fn help_lists_commands() {
    extfile()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync").and(predicate::str::contains("convert")));
}

#[test]
fn version_flag() {
    extfile()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("extfile"));
}

#[test]
fn status_json_reports_holders_without_writing() {
    let temp = setup();

    extfile()
        .current_dir(temp.path())
        .args(["status", PROJECT, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"P/S/C/G\""))
        .stdout(predicate::str::contains("\"state\": \"missing\""));

    temp.child("demo-soapui-project-resources")
        .assert(predicate::path::missing());
}

#[test]
fn sync_writes_external_files() {
    let temp = setup();

    extfile()
        .current_dir(temp.path())
        .args(["sync", PROJECT, "--yes"])
        .assert()
        .success();

    temp.child("demo-soapui-project-resources/P/S/C/G.groovy")
        .assert("log.info 1");
    temp.child(PROJECT)
        .assert(predicate::str::contains("log.info 1").not());
}

#[test]
fn convert_then_export_round_trip() {
    let temp = setup();

    extfile()
        .current_dir(temp.path())
        .args(["convert", PROJECT, "P/S/C/T", "--mode", "auto", "--yes"])
        .assert()
        .success();
    temp.child("demo-soapui-project-resources/P/S/C/T-request.xml")
        .assert("<body/>");

    extfile()
        .current_dir(temp.path())
        .args(["export", PROJECT, "--output", "shared.xml", "--yes"])
        .assert()
        .success();
    temp.child("shared.xml")
        .assert(predicate::str::contains("<body/>"));
}

#[test]
fn settings_file_beside_project_is_used() {
    let temp = setup();
    temp.child("extfile.toml")
        .write_str("content_in_external_file = false\n")
        .unwrap();

    extfile()
        .current_dir(temp.path())
        .args(["sync", PROJECT, "--yes"])
        .assert()
        .success();

    temp.child("demo-soapui-project-resources/P/S/C/G.groovy")
        .assert(predicate::path::missing());
    temp.child(PROJECT)
        .assert(predicate::str::contains("log.info 1"));
}

#[test]
fn rename_of_unknown_node_fails() {
    let temp = setup();

    extfile()
        .current_dir(temp.path())
        .args(["rename", PROJECT, "S/Missing", "X", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn missing_project_fails() {
    let temp = assert_fs::TempDir::new().unwrap();

    extfile()
        .current_dir(temp.path())
        .args(["status", "nope.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project file not found"));
}
