use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub host: Option<String>,
    pub model: Option<String>,
    pub system: Option<String>,
    pub preset: Option<String>,
    pub tools: Option<bool>,
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let path = config_path()?;
    let profiles = load_profiles(&path)?;

    profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })
}

/// Checks that the config file parses and, when a profile name is given,
/// that the profile exists. Returns the resolved config path.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let path = config_path()?;
    let profiles = load_profiles(&path)?;

    if let Some(name) = profile {
        if !profiles.contains_key(name) {
            return Err(format!(
                "Profile '{}' not found in config file '{}'.",
                name,
                path.display()
            ));
        }
    }

    Ok(path)
}

fn load_profiles(path: &Path) -> Result<HashMap<String, ProfileConfig>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;

    config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })
}

fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var("OLLIE_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("ollie").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| {
        "Cannot resolve config path: set OLLIE_CONFIG or HOME/XDG_CONFIG_HOME.".to_string()
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("ollie")
        .join("config.toml"))
}
