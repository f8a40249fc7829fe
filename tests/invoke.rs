// SPDX-License-Identifier: Apache-2.0

//! Tests that invoke the `lutmap` binary.

use std::io::Write;
use std::process::Command;

fn write_temp_aiger(contents: &[u8]) -> tempfile::TempPath {
    let mut file = tempfile::Builder::new().suffix(".aag").tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.into_temp_path()
}

fn run_lutmap(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lutmap"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_single_and_report() {
    let path = write_temp_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n");
    let output = run_lutmap(&[path.to_str().unwrap(), "2"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        ">> Technology Mapping results\n\
         # LUT count: 1\n\
         # Levels: 1\n\
         >> Implementation details: \n\
         (6) => ( 2 4 ) : area = 0 : delay = 1 : power = 0\n"
    );
}

#[test]
fn test_defaults_apply_without_optional_arguments() {
    let path = write_temp_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n");
    let output = run_lutmap(&[path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# LUT count: 1\n"));
}

#[test]
fn test_mode_first_character_selects_delay_goal() {
    let path = write_temp_aiger(b"aag 6 3 0 1 3\n2\n4\n6\n12\n8 4 2\n10 8 6\n12 10 2\n");
    let output = run_lutmap(&[path.to_str().unwrap(), "2", "0", "delay"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# LUT count: 3\n"));
    assert!(stdout.contains("# Levels: 3\n"));
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let path = write_temp_aiger(b"aag 6 3 0 1 3\n2\n4\n6\n12\n8 4 2\n10 8 6\n12 10 2\n");
    let args = [path.to_str().unwrap(), "2", "4"];
    let first = run_lutmap(&args);
    let second = run_lutmap(&args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_dump_flags_emit_extra_sections() {
    let path = write_temp_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n");
    let output = run_lutmap(&[path.to_str().unwrap(), "2", "--dump-aig", "--dump-cuts"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("M I L O A = 3 2 0 1 1"));
    assert!(stdout.contains("Node 6:"));
}

#[test]
fn test_missing_file_fails_with_diagnostic() {
    let output = run_lutmap(&["/nonexistent/design.aag"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed input"));
}

#[test]
fn test_k_below_two_fails_with_diagnostic() {
    let path = write_temp_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n");
    let output = run_lutmap(&[path.to_str().unwrap(), "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("precondition violated"));
}

#[test]
fn test_malformed_body_fails_with_line_number() {
    let path = write_temp_aiger(b"aag 3 2 0 1 1\n2\n6\n6\n6 4 2\n");
    let output = run_lutmap(&[path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 3"));
}
