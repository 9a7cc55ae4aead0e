use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use pokegpt::config::{BackendConfig, Config};
use pokegpt::HttpBackend;

/// Backend client pointed at a mock server
#[allow(dead_code)]
pub fn backend_for(uri: &str) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: uri.to_string(),
        timeout_seconds: 5,
    })
    .expect("valid backend config")
}

/// Default configuration talking to `uri`
#[allow(dead_code)]
pub fn config_for(uri: &str) -> Config {
    let mut config = Config::default();
    config.backend.base_url = uri.to_string();
    config.backend.timeout_seconds = 5;
    config
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
