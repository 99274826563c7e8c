use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pagecap"))
        .args(args)
        .output()
        .expect("run pagecap")
}

#[test]
fn version_exits_zero() {
    let output = run(&["--version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("pagecap"));
}

#[test]
fn missing_target_is_a_usage_error() {
    let output = run(&["pdf", "-o", "out.pdf"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let output = run(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_config_file_fails_with_message() {
    let output = run(&[
        "pdf",
        "https://example.com",
        "-o",
        "out.pdf",
        "--config",
        "/no/such/pagecap.toml",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pagecap:"));
    assert!(stderr.contains("/no/such/pagecap.toml"));
}

#[test]
fn invalid_url_fails_before_reaching_the_engine() {
    let output = run(&["pdf", "not a url", "-o", "out.pdf"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid URL"));
}
