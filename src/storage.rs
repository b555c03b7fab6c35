use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub opener_command: String,
}

/// Get the app data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    // Check if custom data dir is set via environment variable
    if let Ok(custom_dir) = std::env::var("ROLODEX_DATA_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    // Default to system data directory
    dirs::data_dir()
        .map(|p| p.join("rolodex"))
        .ok_or_else(|| "Could not determine app data directory".to_string())
}

/// Initialize storage directories
pub fn init_storage() -> Result<(), String> {
    let app_dir = get_app_data_dir()?;
    fs::create_dir_all(&app_dir)
        .map_err(|e| format!("Failed to create app directory: {}", e))?;

    Ok(())
}

/// Save config to disk
pub fn save_config(config: &Config) -> Result<(), String> {
    let app_dir = get_app_data_dir()?;
    let config_path = app_dir.join("config.json");

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(config_path, json)
        .map_err(|e| format!("Failed to write config: {}", e))?;

    Ok(())
}

/// Load config from disk
pub fn load_config() -> Result<Config, String> {
    let app_dir = get_app_data_dir()?;
    let config_path = app_dir.join("config.json");

    if !config_path.exists() {
        return Err("Config not found".to_string());
    }

    let json = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&json)
        .map_err(|e| format!("Failed to parse config: {}", e))
}
