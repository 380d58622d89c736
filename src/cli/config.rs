//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./netplan-client.toml or ./.netplan-client/config.toml
//! 2. User config: ~/.netplan-client/config.toml
//! 3. System config: /etc/netplan-client/config.toml
//! 4. Built-in defaults
//!
//! Command line overrides are layered on top of whichever file wins.

use super::args::ConfigOverrides;
use crate::channel::BusKind;
use crate::env;
use crate::session::{ServiceNames, SessionManagerConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub bus: BusKind,
    pub artifact_id: String,
    pub default_try_timeout_secs: u32,
    pub service: ServiceNames,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            artifact_id: env::netplan::DEFAULT_ARTIFACT_ID.to_string(),
            default_try_timeout_secs: env::netplan::DEFAULT_TRY_TIMEOUT_SECS,
            service: ServiceNames::default(),
        }
    }
}

impl ClientConfig {
    /// Session manager settings derived from this config
    pub fn session_config(&self) -> SessionManagerConfig {
        SessionManagerConfig {
            service: self.service.clone(),
            artifact_id: self.artifact_id.clone(),
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(bus) = overrides.bus {
            self.bus = bus;
        }
        if let Some(artifact_id) = &overrides.artifact_id {
            self.artifact_id = artifact_id.clone();
        }
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(content).context("Failed to parse client configuration")?;
        if config.artifact_id.is_empty() {
            anyhow::bail!("artifact_id must not be empty");
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize client configuration")
    }

    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write configuration file {:?}", path))
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Resolve the effective configuration: explicit file, else discovery,
    /// then command line overrides
    pub fn resolve(overrides: &ConfigOverrides) -> Result<ClientConfig> {
        let base = match &overrides.config_file {
            Some(path) => {
                info!("Loading configuration override from: {:?}", path);
                ClientConfig::from_toml_file(path)?
            }
            None => Self::discover_config()?,
        };
        Ok(base.with_overrides(overrides))
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<ClientConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return ClientConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(ClientConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::first_existing(&Self::get_config_candidates())
    }

    /// First candidate that exists and is a regular file
    pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
        for candidate in candidates {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate.clone());
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let current_dir = std_env::current_dir().ok();
        let home_dir = Self::home_dir();
        Self::candidates_for(current_dir.as_deref(), home_dir.as_deref())
    }

    /// Candidates for explicit current and home directories
    pub fn candidates_for(current_dir: Option<&Path>, home_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(current_dir) = current_dir {
            candidates.push(env::local_standalone_config_path(current_dir));
            candidates.push(env::local_config_file_path(current_dir));
        }

        if let Some(home_dir) = home_dir {
            candidates.push(env::user_config_file_path(home_dir));
        }

        #[cfg(unix)]
        candidates.push(PathBuf::from(env::SYSTEM_CONFIG_FILE_PATH));

        candidates
    }

    /// Get home directory path
    pub fn home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Create the default config file in the current user's home directory
    pub fn init_user_config() -> Result<PathBuf> {
        let home_dir = Self::home_dir().context("Cannot determine the home directory")?;
        Self::create_default_user_config(&home_dir)
    }

    /// Create a default config file under `home_dir`
    pub fn create_default_user_config(home_dir: &Path) -> Result<PathBuf> {
        let config_dir = env::user_config_dir_path(home_dir);
        let config_path = env::user_config_file_path(home_dir);

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create {:?}", config_dir))?;
            info!("Created configuration directory: {:?}", config_dir);
        }

        if !config_path.exists() {
            ClientConfig::default().to_toml_file(&config_path)?;
            info!("Created default configuration file: {:?}", config_path);
        } else {
            warn!("Configuration file already exists: {:?}", config_path);
        }

        Ok(config_path)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info<W: Write>(out: &mut W, effective: &ClientConfig) -> Result<()> {
        writeln!(out, "Configuration Discovery Hierarchy:")?;
        writeln!(out)?;

        let candidates = Self::get_config_candidates();
        for (i, candidate) in candidates.iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            writeln!(out, "  {}. {:?} - {}", i + 1, candidate, status)?;
        }

        writeln!(out)?;
        match Self::first_existing(&candidates) {
            Some(found) => writeln!(out, "Active configuration: {:?}", found)?,
            None => writeln!(out, "Active configuration: Built-in defaults")?,
        }

        writeln!(out)?;
        writeln!(out, "Effective settings:")?;
        write!(out, "{}", effective.to_toml_string()?)?;
        Ok(())
    }
}
