use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, is_empty};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const GREETING_SYSTEM_PROMPT: &str =
    "You are a friendly assistant. Respond warmly to greetings.";
const REFUND_SYSTEM_PROMPT: &str = "You are a refund processing assistant.\nWhen a customer requests a refund, use the process_refund tool to handle it.";

fn ochat_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ochat"));
    cmd.env_remove("OLLIE_HOST")
        .env_remove("OLLIE_MODEL")
        .env_remove("OLLIE_CONFIG")
        .env_remove("XDG_CONFIG_HOME");
    cmd
}

fn ollie_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ollie"));
    cmd.env_remove("OLLIE_HOST")
        .env_remove("OLLIE_MODEL")
        .env_remove("OLLIE_CONFIG")
        .env_remove("XDG_CONFIG_HOME");
    cmd
}

fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("ochat-test-{label}-{nanos}"))
}

fn parse_stdout_json(output: &[u8]) -> Value {
    let text = String::from_utf8(output.to_vec()).expect("stdout should be utf-8");
    serde_json::from_str(text.trim()).expect("stdout should contain valid JSON")
}

#[test]
fn dry_run_succeeds_without_server() {
    let assert = ochat_cmd().args(["--dry-run", "2+2?"]).assert().success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["dry_run"], Value::Bool(true));
    assert_eq!(body["host"], Value::String("http://localhost:11434".to_string()));
    assert_eq!(body["model"], Value::String("qwen3:4b".to_string()));
}

#[test]
fn bare_prompt_yields_single_user_message_without_tools() {
    let assert = ochat_cmd()
        .args(["--dry-run", "Hello!"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["messages"], json!([{"role": "user", "content": "Hello!"}]));
    assert!(body["request"].get("tools").is_none());
    assert_eq!(body["request"]["stream"], Value::Bool(false));
}

#[test]
fn greeting_preset_prepends_documented_system_prompt() {
    let assert = ochat_cmd()
        .args(["--preset", "greeting", "--dry-run", "Hello!"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": GREETING_SYSTEM_PROMPT},
            {"role": "user", "content": "Hello!"},
        ])
    );
    assert!(body["request"].get("tools").is_none());
    assert_eq!(body["preset"], Value::String("greeting".to_string()));
}

#[test]
fn weather_preset_advertises_three_fixed_tools() {
    let assert = ochat_cmd()
        .args(["--preset", "weather", "--dry-run", "What's the weather in Tokyo?"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let tools = body["request"]["tools"]
        .as_array()
        .expect("tools should be an array");
    let names: Vec<&str> = tools
        .iter()
        .map(|tool| tool["function"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["get_weather", "process_refund", "create_purchase"]);
}

#[test]
fn tools_flag_attaches_fixed_list_without_preset() {
    let assert = ochat_cmd()
        .args(["--tools", "--dry-run", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let tools = body["request"]["tools"]
        .as_array()
        .expect("tools should be an array");
    assert_eq!(tools.len(), 3);
}

#[test]
fn refund_preset_matches_explicit_system_and_tools() {
    let via_preset = ochat_cmd()
        .args(["--preset", "refund", "--dry-run", "Return order #12345"])
        .assert()
        .success();
    let via_flags = ochat_cmd()
        .args([
            "--system",
            REFUND_SYSTEM_PROMPT,
            "--tools",
            "--dry-run",
            "Return order #12345",
        ])
        .assert()
        .success();

    let preset_body = parse_stdout_json(&via_preset.get_output().stdout);
    let flags_body = parse_stdout_json(&via_flags.get_output().stdout);
    assert_eq!(preset_body["messages"], flags_body["messages"]);
    assert_eq!(preset_body["request"], flags_body["request"]);
}

#[test]
fn argument_prompt_has_priority_over_stdin() {
    let assert = ochat_cmd()
        .args(["--dry-run", "argument prompt"])
        .write_stdin("stdin prompt")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let messages = body["messages"]
        .as_array()
        .expect("messages should be an array");
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0]["content"],
        Value::String("argument prompt".to_string())
    );
}

#[test]
fn stdin_prompt_is_used_when_argument_is_missing() {
    let assert = ochat_cmd()
        .arg("--dry-run")
        .write_stdin("from stdin\n")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["messages"][0]["content"],
        Value::String("from stdin".to_string())
    );
}

#[test]
fn empty_stdin_returns_explicit_error() {
    ochat_cmd()
        .arg("--dry-run")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains(
            "No prompt provided. Pass it as an argument or on stdin.",
        ));
}

#[test]
fn invalid_preset_returns_explicit_error() {
    ochat_cmd()
        .args(["--preset", "banker", "--dry-run", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid preset 'banker'"));
}

#[test]
fn json_flag_sets_json_output_mode() {
    let assert = ochat_cmd()
        .args(["--dry-run", "--json", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["output"], Value::String("json".to_string()));
}

#[test]
fn json_flag_overrides_output_text() {
    let assert = ochat_cmd()
        .args(["--dry-run", "--output", "text", "--json", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["output"], Value::String("json".to_string()));
}

#[test]
fn profile_loads_host_model_and_preset_for_dry_run() {
    let config_path = unique_temp_path("config");
    fs::write(
        &config_path,
        "[profiles.store]\nhost = \"http://ollama.lan:11434\"\nmodel = \"llama3.1\"\npreset = \"customer-service\"\n",
    )
    .expect("config should be writable");

    let assert = ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--profile", "store", "--dry-run", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body["host"],
        Value::String("http://ollama.lan:11434".to_string())
    );
    assert_eq!(body["model"], Value::String("llama3.1".to_string()));
    assert_eq!(body["preset"], Value::String("customer-service".to_string()));
    assert_eq!(
        body["request"]["tools"]
            .as_array()
            .expect("tools should be an array")
            .len(),
        3
    );
}

#[test]
fn profile_is_not_implicit_when_not_passed() {
    let config_path = unique_temp_path("config-no-implicit");
    fs::write(
        &config_path,
        "[profiles.default]\nmodel = \"profile-model\"\n",
    )
    .expect("config should be writable");

    let assert = ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--dry-run", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["model"], Value::String("qwen3:4b".to_string()));
}

#[test]
fn profile_env_and_cli_precedence_is_respected() {
    let config_path = unique_temp_path("precedence");
    fs::write(
        &config_path,
        "[profiles.store]\nmodel = \"profile-model\"\nhost = \"http://profile:11434\"\n",
    )
    .expect("config should be writable");

    let env_over_profile = ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .env("OLLIE_MODEL", "env-model")
        .args(["--profile", "store", "--dry-run", "hello"])
        .assert()
        .success();

    let env_body = parse_stdout_json(&env_over_profile.get_output().stdout);
    assert_eq!(env_body["model"], Value::String("env-model".to_string()));
    assert_eq!(
        env_body["host"],
        Value::String("http://profile:11434".to_string())
    );

    let cli_over_env = ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .env("OLLIE_MODEL", "env-model")
        .args([
            "--profile",
            "store",
            "--model",
            "cli-model",
            "--dry-run",
            "hello",
        ])
        .assert()
        .success();

    let cli_body = parse_stdout_json(&cli_over_env.get_output().stdout);
    assert_eq!(cli_body["model"], Value::String("cli-model".to_string()));
}

#[test]
fn profile_file_missing_returns_explicit_error() {
    let config_path = unique_temp_path("missing-config");

    ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--profile", "store", "hello"])
        .assert()
        .failure()
        .stderr(contains("Failed to read config file"));
}

#[test]
fn invalid_profile_toml_returns_parse_error() {
    let config_path = unique_temp_path("invalid-toml");
    fs::write(&config_path, "[profiles.bad\nmodel = \"m\"")
        .expect("config should be writable");

    ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--profile", "bad", "hello"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file"));
}

#[test]
fn profile_not_found_returns_error() {
    let config_path = unique_temp_path("profile-not-found");
    fs::write(&config_path, "[profiles.store]\nmodel = \"m\"\n")
        .expect("config should be writable");

    ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--profile", "missing", "hello"])
        .assert()
        .failure()
        .stderr(contains("Profile 'missing' not found"));
}

#[test]
fn invalid_profile_preset_returns_error() {
    let config_path = unique_temp_path("invalid-preset");
    fs::write(
        &config_path,
        "[profiles.bad]\npreset = \"banker\"\nmodel = \"m\"\n",
    )
    .expect("config should be writable");

    ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--profile", "bad", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid profile preset 'banker'"));
}

#[test]
fn invalid_profile_output_returns_error() {
    let config_path = unique_temp_path("invalid-output");
    fs::write(
        &config_path,
        "[profiles.bad]\nmodel = \"m\"\noutput = \"yaml\"\n",
    )
    .expect("config should be writable");

    ochat_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["--profile", "bad", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid profile output 'yaml'"));
}

#[test]
fn save_writes_and_overwrites_output_file() {
    let output_path = unique_temp_path("save-output");

    ochat_cmd()
        .args([
            "--dry-run",
            "--save",
            output_path.to_string_lossy().as_ref(),
            "first",
        ])
        .assert()
        .success();

    let first = fs::read_to_string(&output_path).expect("first output file should exist");
    assert!(first.contains("\"content\":\"first\""));

    ochat_cmd()
        .args([
            "--dry-run",
            "--save",
            output_path.to_string_lossy().as_ref(),
            "second",
        ])
        .assert()
        .success();

    let second = fs::read_to_string(&output_path).expect("second output file should exist");
    assert!(second.contains("\"content\":\"second\""));
    assert!(!second.contains("\"content\":\"first\""));
}

#[test]
fn save_with_invalid_parent_path_returns_explicit_error() {
    let parent_file = unique_temp_path("save-invalid-parent");
    fs::write(&parent_file, "not a directory").expect("parent marker file should be writable");
    let output_path = parent_file.join("out.json");

    ochat_cmd()
        .args([
            "--dry-run",
            "--save",
            output_path.to_string_lossy().as_ref(),
            "hello",
        ])
        .assert()
        .failure()
        .stderr(contains("Failed to create output directory"));
}

#[test]
fn dry_run_show_stats_prints_unavailable() {
    ochat_cmd()
        .args(["--dry-run", "--show-stats", "hello"])
        .assert()
        .success()
        .stderr(contains("stats: unavailable (dry-run)"));
}

#[test]
fn quiet_suppresses_show_stats_on_stderr() {
    ochat_cmd()
        .args(["--dry-run", "--show-stats", "--quiet", "hello"])
        .assert()
        .success()
        .stderr(is_empty());
}

#[test]
fn quiet_suppresses_verbose_logs_on_stderr() {
    ochat_cmd()
        .args(["--dry-run", "--verbose", "--quiet", "hello"])
        .assert()
        .success()
        .stderr(is_empty());
}

#[test]
fn quiet_keeps_fatal_errors_visible() {
    ochat_cmd()
        .args(["--preset", "banker", "--quiet", "hello"])
        .assert()
        .failure()
        .stderr(contains("Invalid preset 'banker'"));
}

#[test]
fn verbose_does_not_leak_prompt_content() {
    let secret = "confidential order details";

    ochat_cmd()
        .args(["--dry-run", "--verbose", secret])
        .assert()
        .success()
        .stderr(contains("prompt_chars=").and(contains(secret).not()));
}

#[test]
fn version_prints_build_metadata() {
    ochat_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("commit:").and(contains("built:")));
}

#[test]
fn ollie_ask_dry_run_matches_ochat_output_shape() {
    let assert = ollie_cmd()
        .args(["ask", "--dry-run", "hello"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["model"], Value::String("qwen3:4b".to_string()));
    assert_eq!(body["output"], Value::String("text".to_string()));
}

#[test]
fn ollie_ask_version_prints_metadata() {
    ollie_cmd()
        .args(["ask", "--version"])
        .assert()
        .success()
        .stdout(contains("commit:").and(contains("built:")));
}

#[test]
fn ollie_demo_dry_run_prints_scenario_requests() {
    ollie_cmd()
        .args(["demo", "--dry-run"])
        .assert()
        .success()
        .stdout(
            contains("Testing greeting assistant...")
                .and(contains("Testing weather assistant..."))
                .and(contains("qwen3:4b"))
                .and(contains("get_weather")),
        );
}

#[test]
fn ollie_demo_all_includes_tool_scenarios() {
    ollie_cmd()
        .args(["demo", "--all", "--dry-run"])
        .assert()
        .success()
        .stdout(
            contains("Testing customer service agent...")
                .and(contains("Testing refund handler..."))
                .and(contains("Testing purchase handler..."))
                .and(contains("Testing refund analysis...")),
        );
}

#[test]
fn config_check_reports_valid_file() {
    let config_path = unique_temp_path("config-check");
    fs::write(&config_path, "[profiles.store]\nmodel = \"m\"\n")
        .expect("config should be writable");

    ollie_cmd()
        .env("OLLIE_CONFIG", &config_path)
        .args(["config", "check", "--profile", "store"])
        .assert()
        .success()
        .stdout(contains("config OK:"));
}

#[test]
fn ollie_completion_bash_outputs_script() {
    ollie_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("_ollie").and(contains("complete")));
}

#[test]
fn ollie_completion_fish_outputs_script() {
    ollie_cmd()
        .args(["completion", "fish"])
        .assert()
        .success()
        .stdout(contains("complete -c ollie"));
}

#[test]
fn ollie_ask_help_includes_examples() {
    ollie_cmd()
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(contains("Examples:").and(contains("--dry-run --json")));
}

#[test]
fn ollie_help_mentions_demo_command() {
    ollie_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("demo").and(contains("Run the scripted preset walkthrough")));
}
