use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("trovectl");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("listings"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn create_help_mentions_photo_and_fields() {
    let mut cmd = cargo_bin_cmd!("trovectl");
    let output = cmd
        .arg("create")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    for flag in ["--owner", "--title", "--price", "--description", "--photo"] {
        assert!(text.contains(flag), "create help missing {flag}");
    }
}

#[test]
fn delete_help_documents_yes_flag() {
    let mut cmd = cargo_bin_cmd!("trovectl");
    cmd.args(["delete", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn update_requires_an_id() {
    let mut cmd = cargo_bin_cmd!("trovectl");
    cmd.args(["update", "--owner", "a@b.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ID>"));
}

#[test]
fn malformed_env_file_is_reported_with_explicit_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "TROVE_API_URL=\"unterminated\n").unwrap();
    let config = dir.path().join("trove.toml");
    std::fs::write(&config, "[api]\nbase_url = \"http://localhost:8080\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("trovectl");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("listings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}

#[test]
fn malformed_env_file_is_reported_without_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "TROVE_API_URL=\"unterminated\n").unwrap();

    let mut cmd = cargo_bin_cmd!("trovectl");
    cmd.current_dir(dir.path())
        .env_remove("TROVE_CONFIG_PATH")
        .arg("listings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}

#[test]
fn unreadable_config_file_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let mut cmd = cargo_bin_cmd!("trovectl");
    cmd.arg("--config")
        .arg(&missing)
        .arg("listings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}
