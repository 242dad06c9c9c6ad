#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_epmx") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "epmx.exe" } else { "epmx" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve epmx binary path for integration test"),
    }
}

/// Run the epmx binary with a hermetic environment: HOME, selection file,
/// and snapshot cache all point into `state_dir`, so tests never touch the
/// user's real configuration and never hit the network.
pub fn run_cli_case(case_name: &str, state_dir: &Path, args: &[&str]) -> CmdResult {
    let root = std::env::temp_dir().join("epmx-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let output = Command::new(&bin_path)
        .args(args)
        .env("HOME", state_dir)
        .env("EPMX_SELECTION_FILE", state_dir.join("region-selection.json"))
        .env("EPMX_SNAPSHOT_CACHE", state_dir.join("endpoints.sqlite"))
        .env("EPMX_SNAPSHOT_URL", "http://127.0.0.1:1/unreachable")
        .env("RUST_BACKTRACE", "1")
        .output()
        .expect("execute epmx command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Write a small endpoint snapshot fixture into `state_dir`. A fixture that
/// already exists (e.g. across a simulated reload) is left untouched.
pub fn write_snapshot_fixture(state_dir: &Path) -> PathBuf {
    let path = state_dir.join("endpoints.sqlite");
    if path.exists() {
        return path;
    }
    let conn = rusqlite::Connection::open(&path).expect("open fixture db");
    conn.execute_batch(
        "CREATE TABLE region (
            region_name TEXT NOT NULL,
            partition_name TEXT NOT NULL,
            description TEXT NOT NULL
        );
        CREATE TABLE endpoint (
            service_name TEXT NOT NULL,
            partition_name TEXT NOT NULL,
            region_name TEXT NOT NULL,
            endpoint_default_hostname TEXT,
            endpoint_default_has_ipv4 INTEGER NOT NULL,
            endpoint_default_has_ipv6 INTEGER NOT NULL,
            endpoint_dualstack_hostname TEXT,
            endpoint_dualstack_has_ipv4 INTEGER NOT NULL,
            endpoint_dualstack_has_ipv6 INTEGER NOT NULL
        );
        INSERT INTO region VALUES
            ('us-east-1', 'aws', 'US East (N. Virginia)'),
            ('eu-central-1', 'aws', 'Europe (Frankfurt)'),
            ('ca-central-1', 'aws', 'Canada (Central)');
        INSERT INTO endpoint VALUES
            ('s3', 'aws', 'eu-central-1',
             's3.eu-central-1.amazonaws.com', 1, 0,
             's3.dualstack.eu-central-1.amazonaws.com', 1, 1),
            ('s3', 'aws', 'us-east-1',
             's3.us-east-1.amazonaws.com', 1, 0,
             NULL, 0, 0),
            ('lambda', 'aws', 'eu-central-1',
             'lambda.eu-central-1.amazonaws.com', 1, 1,
             NULL, 0, 0),
            ('lambda', 'aws', 'us-east-1',
             'lambda.us-east-1.amazonaws.com', 1, 0,
             'lambda.dualstack.us-east-1.amazonaws.com', 1, 1);",
    )
    .expect("populate fixture db");
    path
}
