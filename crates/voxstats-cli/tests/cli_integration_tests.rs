//! CLI integration tests for voxstats
//!
//! Tests the voxstats CLI commands end-to-end using assert_cmd. Every test
//! gets its own config directory and database file.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PLAYER: &str = "069a79f444e94726a5befca90e38aaf5";
const PLAYER_DASHED: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";

/// Helper to create a command isolated in `dir` with no API key
#[allow(deprecated)]
fn voxstats_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voxstats").unwrap();
    cmd.current_dir(dir.path());
    cmd.env("VOXSTATS_CONFIG_DIR", dir.path().join("config"));
    cmd.env("VOXSTATS_DB_PATH", dir.path().join("voxstats.db"));
    cmd.env_remove("VOXSTATS_API_KEY");
    cmd.env_remove("API_KEY");
    cmd.env_remove("VOXSTATS_DISCORD_ID");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("link"));
}

#[test]
fn test_config_path_uses_config_dir() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_get_reset() {
    let dir = TempDir::new().unwrap();

    voxstats_cmd(&dir)
        .args(["config", "set", "api.max_retries", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set api.max_retries = 5"));

    voxstats_cmd(&dir)
        .args(["config", "get", "api.max_retries"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    voxstats_cmd(&dir)
        .args(["config", "reset"])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["config", "get", "api.max_retries"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn test_config_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();

    voxstats_cmd(&dir)
        .args(["config", "set", "api.max_retries", "50"])
        .assert()
        .failure();

    voxstats_cmd(&dir)
        .args(["config", "set", "api.api_key", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("environment variable"));
}

#[test]
fn test_config_file_with_api_key_rejected() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[api]\napi_key = \"secret\"\n").unwrap();

    voxstats_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("environment variables"));
}

#[test]
fn test_config_list_redacts_missing_key() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.base_url = https://api.voxyl.net"))
        .stdout(predicate::str::contains("api.api_key = (not set"));
}

#[test]
fn test_link_whoami_unlink() {
    let dir = TempDir::new().unwrap();

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "link", PLAYER])
        .assert()
        .success()
        .stdout(predicate::str::contains(PLAYER_DASHED));

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains(PLAYER_DASHED));

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "unlink"])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not linked"));
}

#[test]
fn test_link_refuses_to_replace_without_force() {
    let dir = TempDir::new().unwrap();
    let other = "00000000-0000-0000-0000-000000000001";

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "link", PLAYER])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "link", other])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Already linked"));

    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "link", other, "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains(other));
}

#[test]
fn test_link_rejects_invalid_uuid() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["--discord-id", "1234", "link", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid player UUID"));
}

#[test]
fn test_discord_id_from_environment() {
    let dir = TempDir::new().unwrap();

    voxstats_cmd(&dir)
        .env("VOXSTATS_DISCORD_ID", "77")
        .args(["link", PLAYER])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["--discord-id", "77", "--format", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"discord_id\": 77"));
}

#[test]
fn test_missing_discord_id() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["session", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--discord-id"));
}

#[test]
fn test_session_commands_require_link() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["--discord-id", "99", "session", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not linked"));
}

#[test]
fn test_session_active_empty() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "link", PLAYER])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "session", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active sessions"));

    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "--format", "json", "session", "active"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_session_end_without_session_fails() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "link", PLAYER])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "session", "end", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active session 2"));
}

#[test]
fn test_session_start_requires_api_key() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "link", PLAYER])
        .assert()
        .success();

    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "session", "start", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not set"));
}

#[test]
fn test_invalid_slot_rejected() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .args(["--discord-id", "5", "session", "start", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid session slot"));
}

#[test]
fn test_doctor_reports_missing_api_key() {
    let dir = TempDir::new().unwrap();
    voxstats_cmd(&dir)
        .arg("doctor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[OK] Configuration: Valid"))
        .stdout(predicate::str::contains("[!!] API Key: Not configured"))
        .stdout(predicate::str::contains("[OK] Database"));
}
