use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    /// Path to the champion log snapshot file.
    pub snapshot_path: String,

    /// Interval (seconds) between automatic snapshot saves.
    pub snapshot_interval: u64,

    /// The one origin allowed to call /champion from a browser.
    pub allowed_origin: String,

    pub server_version: String,
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Self {
        let file = fs::read_to_string(Path::new(path))
            .expect("Failed to read config.json");

        serde_json::from_str::<AppConfig>(&file)
            .expect("Invalid config.json")
    }
}
