//! Integration tests: CLI smoke tests and full-pipeline scenarios over a
//! snapshot fixture.

mod common;

use serde_json::Value;

#[test]
fn help_command_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("help_command_prints_usage", dir.path(), &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: epmx [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let dir = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("version_command_prints_version", dir.path(), &["--version"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("epmx"),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn subcommand_help_flags_work() {
    let dir = tempfile::tempdir().unwrap();
    for subcmd in ["show", "regions", "fetch", "dashboard", "completions"] {
        let case_name = format!("subcommand_{subcmd}_help");
        let result = common::run_cli_case(&case_name, dir.path(), &[subcmd, "--help"]);
        assert!(
            result.status.success(),
            "subcommand '{subcmd} --help' failed; log: {}",
            result.log_path.display()
        );
        assert!(
            result.stdout.contains("Usage") || result.stdout.contains("usage"),
            "missing usage text for '{subcmd}'; log: {}",
            result.log_path.display()
        );
    }
}

#[test]
fn regions_select_persists_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let result = common::run_cli_case(
        "regions_select_persists_deduplicated",
        dir.path(),
        &[
            "--json",
            "regions",
            "select",
            "us-east-1",
            "us-east-1",
            "eu-central-1",
        ],
    );
    assert!(
        result.status.success(),
        "select failed; log: {}",
        result.log_path.display()
    );

    let reported: Vec<String> = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(reported, ["eu-central-1", "us-east-1"]);

    let stored: Vec<String> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("region-selection.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stored, ["eu-central-1", "us-east-1"]);
}

#[test]
fn regions_reset_restores_fallback_seven() {
    let dir = tempfile::tempdir().unwrap();
    common::run_cli_case(
        "regions_reset_setup",
        dir.path(),
        &["regions", "select", "eu-central-1"],
    );

    let result = common::run_cli_case(
        "regions_reset_restores_fallback_seven",
        dir.path(),
        &["--json", "regions", "reset"],
    );
    assert!(
        result.status.success(),
        "reset failed; log: {}",
        result.log_path.display()
    );

    let reported: Vec<String> = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(reported.len(), 7);
    for name in [
        "us-east-1",
        "us-west-1",
        "ca-central-1",
        "eu-central-1",
        "cn-north-1",
        "us-gov-west-1",
        "eusc-de-east-1",
    ] {
        assert!(reported.iter().any(|r| r == name), "missing {name}");
    }
}

#[test]
fn show_json_renders_matrix_from_fixture() {
    let dir = tempfile::tempdir().unwrap();
    common::write_snapshot_fixture(dir.path());

    let result = common::run_cli_case(
        "show_json_renders_matrix_from_fixture",
        dir.path(),
        &[
            "--json",
            "show",
            "--regions",
            "eu-central-1,us-east-1",
        ],
    );
    assert!(
        result.status.success(),
        "show failed; log: {}",
        result.log_path.display()
    );

    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    let columns = payload["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0]["region_name"], "eu-central-1");
    assert_eq!(columns[0]["short_label"], "Frankfurt");
    assert_eq!(columns[1]["region_name"], "us-east-1");

    let rows = payload["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // lambda: IPv6 by default in eu-central-1, opt-in in us-east-1.
    assert_eq!(rows[0]["service"], "lambda");
    assert_eq!(rows[0]["cells"][0]["class"], "ipv6");
    assert_eq!(rows[0]["cells"][1]["class"], "ipv6-dualstack-optin");
    // s3: opt-in in eu-central-1, IPv4 only in us-east-1.
    assert_eq!(rows[1]["service"], "s3");
    assert_eq!(rows[1]["cells"][0]["class"], "ipv6-dualstack-optin");
    assert_eq!(rows[1]["cells"][1]["class"], "ipv4");

    let stats = &payload["stats"];
    assert_eq!(stats["total"], 4);
    assert_eq!(stats["ipv6_default"], 1);
}

#[test]
fn show_filter_service_hides_rows() {
    let dir = tempfile::tempdir().unwrap();
    common::write_snapshot_fixture(dir.path());

    let result = common::run_cli_case(
        "show_filter_service_hides_rows",
        dir.path(),
        &[
            "--json",
            "show",
            "--regions",
            "eu-central-1",
            "--filter-service",
            "lam",
        ],
    );
    assert!(result.status.success());

    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    let rows = payload["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["service"], "lambda");
    // The filter does not shrink the column set.
    assert_eq!(payload["columns"].as_array().unwrap().len(), 1);
}

#[test]
fn show_without_snapshot_prints_load_caption() {
    let dir = tempfile::tempdir().unwrap();
    // No fixture: the cache is absent and the URL unreachable.
    let result = common::run_cli_case(
        "show_without_snapshot_prints_load_caption",
        dir.path(),
        &["show"],
    );
    assert!(
        !result.status.success(),
        "expected failure; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stderr.contains("Could not load SQLite file."),
        "missing load caption; log: {}",
        result.log_path.display()
    );
}

#[test]
fn show_text_output_contains_matrix() {
    let dir = tempfile::tempdir().unwrap();
    common::write_snapshot_fixture(dir.path());

    let result = common::run_cli_case(
        "show_text_output_contains_matrix",
        dir.path(),
        &["--no-color", "show", "--regions", "eu-central-1"],
    );
    assert!(result.status.success());
    assert!(result.stdout.contains("Service"));
    assert!(result.stdout.contains("eu-central-1"));
    assert!(result.stdout.contains("Frankfurt"));
    assert!(result.stdout.contains("lambda"));
    assert!(result.stdout.contains("IPv6"));
    assert!(result.stdout.contains("opt-in"));
}

#[test]
fn completions_generate_for_bash() {
    let dir = tempfile::tempdir().unwrap();
    let result = common::run_cli_case(
        "completions_generate_for_bash",
        dir.path(),
        &["completions", "bash"],
    );
    assert!(result.status.success());
    assert!(result.stdout.contains("epmx"));
}
