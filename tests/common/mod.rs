use chatwidget::config::EndpointConfig;
use chatwidget::storage::SledStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (SledStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("state")).expect("failed to open sled store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("chatwidget.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Endpoint settings pointing at a mock server's chat path
#[allow(dead_code)]
pub fn endpoint_config(server_uri: &str) -> EndpointConfig {
    EndpointConfig {
        url: format!("{}/webhook/chat", server_uri),
        timeout_seconds: 5,
        ..Default::default()
    }
}
