//! Configuration loading tests

use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;
use toolgate::core::config::Config;
use toolgate::core::error::ToolgateError;

const ENV_VARS: [&str; 7] = [
    "API_BEARER_TOKEN",
    "SEARXNG_BASE_URL",
    "TOOLGATE_HOST",
    "TOOLGATE_PORT",
    "TOOLGATE_GOOGLE_BASE_URL",
    "TOOLGATE_FETCH_TIMEOUT_SECS",
    "TOOLGATE_CONFIG",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("toolgate.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
#[serial]
fn test_load_explicit_file() {
    clear_env();
    let (_dir, path) = write_config(
        r#"
[server]
port = 9100

[auth]
bearer_token = "from-file"

[search]
searxng_base_url = "http://searx.internal/"
default_results = 3
"#,
    );

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.auth.bearer_token.as_deref(), Some("from-file"));
    assert_eq!(
        config.search.searxng_base_url.as_deref(),
        Some("http://searx.internal")
    );
    assert_eq!(config.search.default_results, 3);
    assert_eq!(config.search.max_results, 20);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let (_dir, path) = write_config("[auth]\nbearer_token = \"from-file\"\n");
    env::set_var("API_BEARER_TOKEN", "from-env");

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.auth.bearer_token.as_deref(), Some("from-env"));

    clear_env();
}

#[test]
#[serial]
fn test_empty_env_token_disables_auth() {
    clear_env();
    let (_dir, path) = write_config("[auth]\nbearer_token = \"from-file\"\n");
    env::set_var("API_BEARER_TOKEN", "");

    let config = Config::load(Some(&path)).unwrap();
    assert!(!config.auth_enabled());

    clear_env();
}

#[test]
#[serial]
fn test_config_env_var_path() {
    clear_env();
    let (_dir, path) = write_config("[server]\nport = 9200\n");
    env::set_var("TOOLGATE_CONFIG", &path);

    let config = Config::load(None).unwrap();
    assert_eq!(config.server.port, 9200);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env();
    let (_dir, path) = write_config("[search]\ndefault_results = 50\n");

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ToolgateError::ConfigError(_)));
}

#[test]
#[serial]
fn test_malformed_toml_rejected() {
    clear_env();
    let (_dir, path) = write_config("[server\nport = ");

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ToolgateError::TomlError(_)));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env();
    let err = Config::load(Some(std::path::Path::new("/nonexistent/toolgate.toml"))).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
