use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn config_shows_defaults_and_env_overrides() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("docsum")
        .current_dir(tmp.path())
        .env("DOCSUM_HOME", tmp.path())
        .env_remove("DOCSUM_CONFIG_PATH")
        .env_remove("HF_API_TOKEN")
        .env_remove("DOCSUM_API_TOKEN")
        .env("DOCSUM_MAX_SEGMENTS", "5")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[segmenter]"))
        .stdout(predicate::str::contains("max_length = 700"))
        .stdout(predicate::str::contains("max_segments = 5"))
        .stdout(predicate::str::contains("api_token_present=false"));
}

#[test]
fn config_file_sections_replace_defaults() {
    let tmp = tempdir().expect("tempdir");
    let cfg = tmp.path().join("custom.toml");
    fs::write(&cfg, "[orchestrator]\nmax_segments = 3\nmin_input_chars = 50\n")
        .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("docsum")
        .current_dir(tmp.path())
        .env("DOCSUM_HOME", tmp.path())
        .env("DOCSUM_CONFIG_PATH", &cfg)
        .env_remove("DOCSUM_MAX_SEGMENTS")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_segments = 3"))
        .stdout(predicate::str::contains("min_input_chars = 50"))
        .stdout(predicate::str::contains("config_file_loaded=true"));
}

#[test]
fn partial_config_section_keeps_other_defaults() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("docsum.toml"), "[capability]\ntimeout_secs = 20\n")
        .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("docsum")
        .current_dir(tmp.path())
        .env("DOCSUM_HOME", tmp.path())
        .env_remove("DOCSUM_CONFIG_PATH")
        .env_remove("DOCSUM_TIMEOUT_SECS")
        .env_remove("DOCSUM_API_URL")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 20"))
        .stdout(predicate::str::contains("min_length = 80"))
        .stdout(predicate::str::contains("bart-large-cnn"));
}

#[test]
fn invalid_config_is_reported_with_code() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("docsum.toml"), "[segmenter]\nmax_length = 0\n")
        .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("docsum")
        .current_dir(tmp.path())
        .env("DOCSUM_HOME", tmp.path())
        .env_remove("DOCSUM_CONFIG_PATH")
        .env_remove("DOCSUM_MAX_LENGTH")
        .arg("config")
        .assert()
        .failure()
        .stdout(predicate::str::contains("E003_CONFIG_INVALID"));
}
