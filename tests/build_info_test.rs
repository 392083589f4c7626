//! Integration tests for `mcumake build-info`

mod common;

use common::{install_avr_packages, install_blink_project, TestProject};
use std::process::Command;

fn run_build_info(project: &TestProject, args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mcumake"));
    cmd.arg("--packages-dir")
        .arg(project.path().join("pkgs"))
        .arg("--project-dir")
        .arg(project.path().join("proj"));
    cmd.arg("build-info");
    for arg in args {
        cmd.arg(arg);
    }
    cmd.output().expect("Failed to execute mcumake build-info")
}

#[test]
fn test_build_info_uses_manifest_board() {
    let project = TestProject::new();
    install_avr_packages(&project, "pkgs");
    install_blink_project(&project, "proj");

    let output = run_build_info(&project, &[]);
    assert!(
        output.status.success(),
        "build-info failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("build.mcu=atmega328p"));
    assert!(stdout.contains("build.project_name=blink"));
    // toolchain paths are substituted into the effective tree
    assert!(stdout.contains("runtime.tools.avr-gcc.path="));
}

#[test]
fn test_build_info_explicit_board_overrides_manifest() {
    let project = TestProject::new();
    install_avr_packages(&project, "pkgs");
    install_blink_project(&project, "proj");

    let output = run_build_info(&project, &["--board", "mini"]);
    assert!(
        output.status.success(),
        "build-info failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // the mini board's cpu menu defaults to atmega328
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("build.mcu=atmega328p"));
}

#[test]
fn test_build_info_filter_limits_keys() {
    let project = TestProject::new();
    install_avr_packages(&project, "pkgs");
    install_blink_project(&project, "proj");

    let output = run_build_info(&project, &["--filter", "^recipe\\."]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recipe.c.o.pattern="));
    assert!(!stdout.contains("build.mcu="));
}

#[test]
fn test_build_info_invalid_filter_fails() {
    let project = TestProject::new();
    install_avr_packages(&project, "pkgs");
    install_blink_project(&project, "proj");

    let output = run_build_info(&project, &["--filter", "(unclosed"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid filter"));
}

#[test]
fn test_build_info_without_board_or_manifest_fails() {
    let project = TestProject::new();
    install_avr_packages(&project, "pkgs");
    project.create_dir("proj");

    let output = run_build_info(&project, &[]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No board configured"));
}

#[test]
fn test_build_info_json_output() {
    let project = TestProject::new();
    install_avr_packages(&project, "pkgs");
    install_blink_project(&project, "proj");

    let output = run_build_info(&project, &["--json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"board\": \"uno\""));
    assert!(stdout.contains("\"build.mcu\": \"atmega328p\""));
}
