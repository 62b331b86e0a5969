#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::{PredicateBooleanExt, predicate};

#[test]
fn test_config_set_api_key_writes_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act
    let mut cmd = cargo_bin_cmd!("moviesearch");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args(["config", "set-api-key", "0123456789abcdef"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved API key"));

    // Assert
    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("api_key = \"0123456789abcdef\""));
}

#[test]
fn test_config_set_api_key_rejects_blank() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("moviesearch");
    cmd.args(["--dir", dir.path().to_str().unwrap()])
        .args(["config", "set-api-key", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key must not be empty"));
}

#[test]
fn test_config_show_masks_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[tmdb]\napi_key = \"0123456789abcdef\"\n",
    )
    .unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("moviesearch");
    cmd.env_remove("TMDB_API_KEY")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key: 0123************ (from config)"))
        .stdout(predicate::str::contains("0123456789abcdef").not())
        .stdout(predicate::str::contains("Base URL: (default)"));
}

#[test]
fn test_config_show_env_overrides_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[tmdb]\napi_key = \"file-key-1234\"\n",
    )
    .unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("moviesearch");
    cmd.env("TMDB_API_KEY", "envk-5678")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key: envk***** (from TMDB_API_KEY)"));
}

#[test]
fn test_config_show_without_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("moviesearch");
    cmd.env_remove("TMDB_API_KEY")
        .args(["--dir", dir.path().to_str().unwrap()])
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key: (not set)"));
}
