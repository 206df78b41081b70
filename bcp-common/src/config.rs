//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `BCP_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/bcp/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (1 or 2) must load. The platform file is optional:
//! when absent the compiled defaults apply.

use crate::dependency::{CompositeRule, CompositeRules};
use crate::error::{Error, Result};
use crate::results::AggregationOptions;
use crate::taxonomy::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "BCP_CONFIG";

/// Configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Taxonomy used when the caller does not pick one
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Report "with dependency" totals
    #[serde(default = "default_include_dependencies")]
    pub include_dependencies: bool,

    /// Aggregate validated sources only
    #[serde(default)]
    pub validated_only: bool,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Composite rules replacing the builtin ones per SubPost
    #[serde(default)]
    pub composite: Vec<CompositeRule>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_environment() -> Environment {
    Environment::BilanCarbone
}

fn default_include_dependencies() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            include_dependencies: default_include_dependencies(),
            validated_only: false,
            logging: LoggingConfig::default(),
            composite: Vec::new(),
        }
    }
}

impl TomlConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Builtin composite rules with this config's overrides applied
    pub fn composite_rules(&self) -> CompositeRules {
        CompositeRules::builtin().merged_with(self.composite.iter().cloned())
    }

    /// Aggregation options carrying this config's defaults
    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions::new(self.environment)
            .include_dependencies(self.include_dependencies)
            .validated_only(self.validated_only)
            .composite_rules(self.composite_rules())
    }
}

/// Platform config file path (may not exist)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bcp").join("config.toml"))
}

/// Load configuration following the resolution priority
///
/// # Errors
/// An explicitly named file (CLI argument or `BCP_CONFIG`) that cannot be
/// read or parsed. A broken platform file is an error too; a missing one is not.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return TomlConfig::load(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return TomlConfig::load(Path::new(&path));
        }
    }

    // Priority 3: Platform config file
    if let Some(path) = default_config_path() {
        if path.exists() {
            return TomlConfig::load(&path);
        }
    }

    // Priority 4: Compiled defaults
    warn!("No configuration file found, using defaults");
    Ok(TomlConfig::default())
}
