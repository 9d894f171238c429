use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::host::Platform;
use crate::probes;

pub const CONFIG_PATH: &str = "vmcheck.yaml";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DEADLINE_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown probe '{0}' (known: {known})", known = probes::ALL_PROBES.join(", "))]
    UnknownProbe(String),

    #[error("Missing or invalid configuration keys: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub debug: Option<bool>, // Enable debug logging
    pub probes: Option<Vec<String>>, // Ordered battery; defaults to the reference eight
    pub command_timeout_secs: Option<u64>, // Per external command
    pub deadline_secs: Option<u64>, // Whole classification pass
    pub system_volume: Option<String>, // Overrides "/" or "C:\"
}

impl Config {
    pub fn debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    pub fn probe_names(&self) -> Vec<String> {
        match &self.probes {
            Some(names) => names.clone(),
            None => probes::DEFAULT_BATTERY.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS))
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs.unwrap_or(DEFAULT_DEADLINE_SECS))
    }

    pub fn platform(&self) -> Platform {
        let platform = Platform::detect();
        match &self.system_volume {
            Some(volume) => platform.with_system_volume(volume),
            None => platform,
        }
    }
}

/// Load an explicit config file and apply env overrides. A missing file is
/// an error. Call [`validate_config`] once all overrides are in place.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let data = fs::read_to_string(path)?;
    let config = parse_config(&data)?;
    Ok(apply_env_overrides(config))
}

/// Load `path` if given, otherwise [`CONFIG_PATH`] when it exists, otherwise defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(CONFIG_PATH).exists() => load_config(CONFIG_PATH),
        None => Ok(apply_env_overrides(Config::default())),
    }
}

pub fn parse_config(data: &str) -> Result<Config, ConfigError> {
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(data)?)
}

fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| env::var(key).ok())
}

/// Apply `VMCHECK_*` overrides. Blank values are ignored.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(debug) = var("VMCHECK_DEBUG") {
        config.debug = Some(matches!(debug.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"));
    }

    if let Some(probes) = var("VMCHECK_PROBES") {
        config.probes = Some(split_probe_list(&probes));
    }

    if let Some(volume) = var("VMCHECK_SYSTEM_VOLUME") {
        config.system_volume = Some(volume);
    }

    config
}

/// Split a comma-separated probe list, dropping empty entries.
pub fn split_probe_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check the config; returns warnings on success.
pub fn validate_config(config: &Config) -> Result<Vec<String>, ConfigError> {
    let mut invalid_keys = Vec::new();
    let mut warnings = Vec::new();

    if let Some(ref names) = config.probes {
        if names.is_empty() {
            invalid_keys.push("probes (must name at least one probe)".to_string());
        }
        for name in names {
            if !probes::is_known(name) {
                invalid_keys.push(format!("probes (unknown probe '{}')", name));
            }
        }
        let missing: Vec<&str> = probes::DEFAULT_BATTERY
            .iter()
            .copied()
            .filter(|default| !names.iter().any(|n| n == default))
            .collect();
        if !names.is_empty() && !missing.is_empty() {
            warnings.push(format!("Battery omits default probe(s): {}", missing.join(", ")));
        }
    }

    if config.command_timeout_secs == Some(0) {
        invalid_keys.push("command_timeout_secs (must be at least 1)".to_string());
    }
    if config.deadline_secs == Some(0) {
        invalid_keys.push("deadline_secs (must be at least 1)".to_string());
    }

    if let Some(ref volume) = config.system_volume {
        if volume.trim().is_empty() {
            invalid_keys.push("system_volume (must not be empty)".to_string());
        }
    }

    if config.debug() {
        warnings.push("Debug mode is enabled. Probe details will be logged.".to_string());
    }

    if !invalid_keys.is_empty() {
        return Err(ConfigError::Invalid(invalid_keys));
    }
    Ok(warnings)
}
