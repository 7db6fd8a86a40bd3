use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn parley_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("parley"));
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("ALT_API_KEY")
        .env_remove("ALT_BASE_URL")
        .env_remove("ALT_MODEL")
        .env_remove("LOCAL_BASE_URL")
        .env_remove("LOCAL_MODEL")
        .env_remove("LLM_PROVIDER")
        .env_remove("PARLEY_CONFIG");
    cmd
}

fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("parley-test-{label}-{nanos}"))
}

fn parse_stdout_json(output: &[u8]) -> Value {
    let text = String::from_utf8(output.to_vec()).expect("stdout should be utf-8");
    serde_json::from_str(text.trim()).expect("stdout should contain valid JSON")
}

#[test]
fn scenarios_lists_every_builtin() {
    let assert = parley_cmd().arg("scenarios").assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8 stdout");
    for name in ["research", "travel", "panel", "codegen"] {
        assert!(stdout.contains(name), "missing scenario '{name}'");
    }
    assert!(stdout.contains("TravelCoordinator"));
}

#[test]
fn run_unknown_scenario_points_at_the_catalog() {
    parley_cmd()
        .args(["run", "nope", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains(
            "Unknown scenario 'nope'. Run `parley scenarios` to list the built-ins.",
        ));
}

#[test]
fn run_research_dry_run_writes_the_topics_fixture() {
    let workspace = unique_temp_path("research-ws");

    let assert = parley_cmd()
        .args([
            "run",
            "research",
            "--provider",
            "openai",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["scenario"], Value::String("research".to_string()));
    assert_eq!(body["provider"], Value::String("openai".to_string()));
    assert_eq!(body["rounds"], serde_json::json!(5));
    let opening = body["opening"].as_str().expect("opening should be a string");
    assert!(opening.contains("Quantum Computing"));

    let topics_raw = fs::read_to_string(workspace.join("research_topics.json"))
        .expect("topics fixture should be written");
    let topics: Value = serde_json::from_str(&topics_raw).expect("topics fixture should be JSON");
    assert_eq!(topics.as_array().map(Vec::len), Some(3));
}

#[test]
fn run_research_topic_flag_selects_the_record() {
    let workspace = unique_temp_path("research-topic");

    let assert = parley_cmd()
        .args([
            "run",
            "research",
            "--topic",
            "2",
            "--provider",
            "openai",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let opening = body["opening"].as_str().expect("opening should be a string");
    assert!(opening.contains("Artificial Intelligence Ethics"));
}

#[test]
fn run_research_topic_out_of_range_is_an_error() {
    let workspace = unique_temp_path("research-oob");

    parley_cmd()
        .args([
            "run",
            "research",
            "--topic",
            "9",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .failure()
        .stderr(contains("Topic index 9 is out of range (0..3)."));
}

#[test]
fn run_codegen_dry_run_writes_the_temperature_dataset() {
    let workspace = unique_temp_path("codegen-ws");

    let assert = parley_cmd()
        .args([
            "run",
            "codegen",
            "--provider",
            "local-inference",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["scenario"], Value::String("codegen".to_string()));
    let opening = body["opening"].as_str().expect("opening should be a string");
    assert!(opening.contains("temperature_data.csv"));

    let csv = fs::read_to_string(workspace.join("temperature_data.csv"))
        .expect("temperature fixture should be written");
    assert!(csv.starts_with("date,location,temperature"));
    assert!(csv.contains("San Francisco"));
}

#[test]
fn run_travel_dry_run_lists_all_four_agents() {
    let workspace = unique_temp_path("travel-ws");

    let assert = parley_cmd()
        .args([
            "run",
            "travel",
            "--provider",
            "openai",
            "--rounds",
            "3",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let agents = body["agents"].as_array().expect("agents should be an array");
    assert_eq!(agents.len(), 4);
    assert_eq!(body["rounds"], serde_json::json!(3));
}

#[test]
fn run_message_flag_overrides_the_opening() {
    let workspace = unique_temp_path("message-ws");

    let assert = parley_cmd()
        .args([
            "run",
            "panel",
            "--message",
            "Compare queues and topics.",
            "--provider",
            "openai",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["opening"],
        Value::String("Compare queues and topics.".to_string())
    );
}

#[test]
fn run_with_invalid_provider_fails_even_in_dry_run() {
    let workspace = unique_temp_path("bad-provider-ws");

    parley_cmd()
        .env("LLM_PROVIDER", "bad")
        .args([
            "run",
            "panel",
            "--dry-run",
            "--workspace",
            workspace.to_string_lossy().as_ref(),
        ])
        .assert()
        .failure()
        .stderr(contains("Unsupported provider 'bad'"));
}

#[test]
fn config_check_reports_missing_file() {
    let config_path = unique_temp_path("no-such-config");

    parley_cmd()
        .env("PARLEY_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(contains("Failed to read config file"));
}

#[test]
fn config_check_accepts_a_valid_file() {
    let config_path = unique_temp_path("valid-config");
    fs::write(
        &config_path,
        "[profiles.local]\nprovider = \"local-inference\"\ntemperature = 0.2\n",
    )
    .expect("config should be writable");

    parley_cmd()
        .env("PARLEY_CONFIG", &config_path)
        .args(["config", "check", "--profile", "local"])
        .assert()
        .success()
        .stdout(contains("config OK"));
}

#[test]
fn config_check_rejects_invalid_toml() {
    let config_path = unique_temp_path("broken-config");
    fs::write(&config_path, "[profiles.local\nprovider = ").expect("config should be writable");

    parley_cmd()
        .env("PARLEY_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file"));
}

#[test]
fn ask_subcommand_is_reachable_from_the_main_binary() {
    let assert = parley_cmd()
        .args(["ask", "--provider", "local-inference", "--dry-run", "2+2?"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["provider"],
        Value::String("local-inference".to_string())
    );
}

#[test]
fn completion_generates_a_script() {
    parley_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("parley"));
}
