use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Network
    pub listen_address: String,

    // Catalogue
    pub catalogue_url: String,
    pub access_token: String,
    pub device_id: String,

    // Content
    pub db_path: String,
    pub cache_capacity: usize,

    // Playback
    pub player: String,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:6600".to_string(),
            catalogue_url: "http://localhost:9000".to_string(),
            access_token: "".to_string(),
            device_id: "cirrus".to_string(),
            db_path: dirs::data_dir()
                .unwrap_or_default()
                .join("cirrus/catalogue.db")
                .to_string_lossy()
                .to_string(),
            cache_capacity: 1000,
            player: "rodio".to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            match serde_json::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(&config_path, &backup_path);
                    Ok(Self::default())
                }
            }
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cirrus")
        .join("config.json")
}
