//! Integration tests for CLI functionality
//!
//! These tests verify that argument parsing and one-shot command execution
//! work together properly. Unit tests for individual functions are located
//! in the respective module files.

use clap::Parser;
use netplan_client::channel::testing::{DEFAULT_DOCUMENT, MockChannel};
use netplan_client::cli::commands::execute;
use netplan_client::cli::{Args, ExecutionMode, Operation};
use netplan_client::{SessionManager, SessionManagerConfig, Value};
use std::sync::Arc;

fn operation_from(argv: &[&str]) -> Operation {
    match Args::try_parse_from(argv).unwrap().mode() {
        ExecutionMode::OneShot(operation) => operation,
        other => panic!("expected a one-shot operation, got {other:?}"),
    }
}

async fn run(channel: &Arc<MockChannel>, argv: &[&str]) -> (anyhow::Result<()>, String) {
    let mut manager = SessionManager::new(channel.clone(), SessionManagerConfig::default());
    let operation = operation_from(argv);
    let mut out = Vec::new();
    let result = execute(&mut manager, &operation, 30, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_get_prints_document() {
    let channel = Arc::new(MockChannel::new());
    let (result, output) = run(&channel, &["netplan-client", "get"]).await;

    result.unwrap();
    assert_eq!(output, DEFAULT_DOCUMENT);
}

#[tokio::test]
async fn test_path_prints_session_path() {
    let channel = Arc::new(MockChannel::new());
    let (result, output) = run(&channel, &["netplan-client", "path"]).await;

    result.unwrap();
    assert!(output.trim().starts_with("/io/netplan/Netplan/config/"));
}

#[tokio::test]
async fn test_set_try_apply_chain() {
    let channel = Arc::new(MockChannel::new());
    let (result, output) = run(
        &channel,
        &[
            "netplan-client",
            "set",
            "network.ethernets.eth0.dhcp4",
            "true",
            "--try",
            "15",
            "--apply",
        ],
    )
    .await;

    result.unwrap();
    assert_eq!(channel.method_log(), vec!["Config", "Set", "Try", "Apply"]);
    assert!(output.contains("Set network.ethernets.eth0.dhcp4=true: succeeded"));
    assert!(output.contains("Try (15s): succeeded"));
    assert!(output.contains("Apply: succeeded"));
}

#[tokio::test]
async fn test_unconfirmed_try_stops_chain() {
    let channel = Arc::new(MockChannel::new());
    channel.always("Try", Ok(Value::Bool(false)));

    let (result, output) = run(
        &channel,
        &["netplan-client", "set", "network.version", "2", "--try", "5", "--apply"],
    )
    .await;

    assert!(result.is_err());
    assert!(output.contains("Try (5s): not confirmed"));
    assert_eq!(channel.count("Apply"), 0);
    // No automatic cancel either
    assert_eq!(channel.count("Cancel"), 0);
}

#[tokio::test]
async fn test_try_defaults_timeout() {
    let channel = Arc::new(MockChannel::new());
    let (result, output) = run(&channel, &["netplan-client", "try"]).await;

    result.unwrap();
    assert!(output.contains("Try (30s): succeeded"));
}

#[tokio::test]
async fn test_remote_failure_is_printed_and_returned() {
    let channel = Arc::new(MockChannel::new());
    channel.fail_next("Apply", "io.netplan.Netplan.Error", "generate failed");

    let (result, output) = run(&channel, &["netplan-client", "apply"]).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("generate failed"));
    assert!(output.contains("DBus Error: io.netplan.Netplan.Error"));
}

#[tokio::test]
async fn test_invalid_change_rejected_before_bus() {
    let channel = Arc::new(MockChannel::new());
    let (result, _) = run(&channel, &["netplan-client", "set", "a=b", "c"]).await;

    assert!(result.is_err());
    assert!(channel.calls().is_empty());
}
