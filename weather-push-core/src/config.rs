use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::{error::ConfigError, model::Location};

pub const ENV_API_KEY: &str = "CAIYUN_API_KEY";
pub const ENV_PUSH_KEYS: &str = "PUSHDEER_KEY";
pub const ENV_LOCATIONS: &str = "WEATHER_LOCATIONS";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// caiyun_api_key = "..."
/// push_keys = ["PDU..."]
///
/// [[locations]]
/// name = "Shanghai"
/// coords = "121.4737,31.2304"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub caiyun_api_key: Option<String>,

    #[serde(default)]
    pub push_keys: Vec<String>,

    pub weather_base_url: Option<String>,
    pub push_base_url: Option<String>,
    pub quote_url: Option<String>,
    pub filler_url: Option<String>,

    #[serde(default)]
    pub locations: Vec<Location>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-push", "weather-push")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// A malformed location list leaves the config with no locations and is returned
    /// as an error so the caller can report it.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.caiyun_api_key = Some(key.trim().to_string());
        }

        if let Some(keys) = lookup(ENV_PUSH_KEYS) {
            self.push_keys = split_keys(&keys);
        }

        if let Some(json) = lookup(ENV_LOCATIONS) {
            match parse_locations(&json) {
                Ok(locations) => self.locations = locations,
                Err(e) => {
                    self.locations.clear();
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Replace or add a location with the same name.
    pub fn upsert_location(&mut self, location: Location) {
        match self.locations.iter_mut().find(|l| l.name == location.name) {
            Some(existing) => *existing = location,
            None => self.locations.push(location),
        }
    }

    /// Locations usable for a run; entries with an empty name or coords are skipped.
    pub fn valid_locations(&self) -> Vec<Location> {
        self.locations.iter().filter(|l| is_valid(l)).cloned().collect()
    }

    pub fn require_push_keys(&self) -> Result<&[String], ConfigError> {
        if self.push_keys.is_empty() {
            Err(ConfigError::MissingKey("push key"))
        } else {
            Ok(&self.push_keys)
        }
    }
}

/// Comma-separated recipient keys; blanks dropped.
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: Option<String>,
    coords: Option<String>,
}

/// Parse a JSON list of `{name, coords}` objects, discarding incomplete entries.
pub fn parse_locations(json: &str) -> Result<Vec<Location>, ConfigError> {
    let raw: Vec<RawLocation> = serde_json::from_str(json)?;

    Ok(raw
        .into_iter()
        .filter_map(|entry| match (entry.name, entry.coords) {
            (Some(name), Some(coords)) => Some(Location { name, coords }),
            _ => None,
        })
        .filter(is_valid)
        .collect())
}

fn is_valid(location: &Location) -> bool {
    !location.name.trim().is_empty() && !location.coords.trim().is_empty()
}
