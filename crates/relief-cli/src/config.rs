//! Configuration file management for relief.
//!
//! Provides a TOML-based config file at `~/.config/relief/config.toml` and a
//! resolution chain per value: CLI flag > env var > config file > domain
//! defaults > built-in default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use relief_core::domain::{Domain, Parameters};
use relief_core::pop::{DEFAULT_MAX_NODES, SearchConfig};

pub const ENV_MAX_NODES: &str = "RELIEF_MAX_NODES";
pub const ENV_FLOOD_PROBABILITY: &str = "RELIEF_FLOOD_PROBABILITY";
pub const ENV_INFRASTRUCTURE_RISK: &str = "RELIEF_INFRASTRUCTURE_RISK";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_trace: Option<bool>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the relief config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/relief` or `~/.config/relief`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("relief");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("relief")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Load the config file if there is one. A missing file is not an error;
/// a malformed one is.
pub fn load_config_if_present() -> Result<Option<ConfigFile>> {
    if !config_path().exists() {
        return Ok(None);
    }
    load_config().map(Some)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // Owner read/write only on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, each optional.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub max_nodes: Option<usize>,
    pub flood_probability: Option<f64>,
    pub infrastructure_risk: Option<f64>,
    /// `--debug` only ever turns tracing on.
    pub debug: bool,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefConfig {
    pub search: SearchConfig,
    pub parameters: Parameters,
}

impl ReliefConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > domain defaults > built-in default.
    ///
    /// - max_nodes: `--max-nodes` > `RELIEF_MAX_NODES` > `[search].max_nodes` > 20000
    /// - debug_trace: `--debug` or `[search].debug_trace`
    /// - each parameter: flag > `RELIEF_FLOOD_PROBABILITY` / `RELIEF_INFRASTRUCTURE_RISK`
    ///   > `[parameters]` > the domain's `[parameters]` > unbound
    pub fn resolve(overrides: &Overrides, domain: &Domain) -> Result<Self> {
        let file_config = load_config_if_present()?.unwrap_or_default();

        let max_nodes = match overrides.max_nodes {
            Some(n) => n,
            None => match env_value::<usize>(ENV_MAX_NODES)? {
                Some(n) => n,
                None => file_config.search.max_nodes.unwrap_or(DEFAULT_MAX_NODES),
            },
        };
        let debug_trace = overrides.debug || file_config.search.debug_trace.unwrap_or(false);

        let from_env = Parameters {
            flood_probability: env_value(ENV_FLOOD_PROBABILITY)?,
            infrastructure_risk: env_value(ENV_INFRASTRUCTURE_RISK)?,
        };
        let from_cli = Parameters {
            flood_probability: overrides.flood_probability,
            infrastructure_risk: overrides.infrastructure_risk,
        };
        let parameters = from_cli
            .or(from_env)
            .or(file_config.parameters)
            .or(domain.default_parameters());

        Ok(Self {
            search: SearchConfig::default()
                .with_max_nodes(max_nodes)
                .with_debug_trace(debug_trace),
            parameters,
        })
    }
}

/// Read and parse an environment variable; unset or empty means `None`.
fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} env var is not valid: {raw:?}")),
        Err(_) => Ok(None),
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
