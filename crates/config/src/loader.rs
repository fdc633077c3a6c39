//! Configuration loading from multiple sources

use crate::{ConfigError, ExecutorConfig, Result, ENV_PREFIX};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Configuration loader with support for multiple formats and sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    ///
    /// Supports TOML, YAML, and JSON formats based on file extension
    pub fn from_file(path: &Path) -> Result<ExecutorConfig> {
        let format = file_format(path)?;
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "Loading executor config");

        match format {
            FileFormat::Yaml => Self::from_yaml(&content),
            FileFormat::Json => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<ExecutorConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<ExecutorConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<ExecutorConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from environment variables using [`ENV_PREFIX`]
    pub fn from_env() -> Result<ExecutorConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with custom prefix
    ///
    /// Variables take the form `PREFIX_SECTION__KEY`, for example
    /// `FABRIC_TX_CHAINCODE__NAME=sacc`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<ExecutorConfig> {
        Self::builder().add_env(prefix).build()
    }

    /// Merge two configurations, with overlay taking precedence
    ///
    /// Peers and orderers are combined by name; every other section is
    /// taken from the overlay.
    pub fn merge(base: ExecutorConfig, overlay: ExecutorConfig) -> ExecutorConfig {
        let mut peers = base.peers;
        for peer in overlay.peers {
            peers.retain(|p| p.name != peer.name);
            peers.push(peer);
        }

        let mut orderers = base.orderers;
        for orderer in overlay.orderers {
            orderers.retain(|o| o.name != orderer.name);
            orderers.push(orderer);
        }

        ExecutorConfig {
            chaincode: overlay.chaincode,
            execution: overlay.execution,
            discovery: overlay.discovery,
            peers,
            orderers,
            logging: overlay.logging,
        }
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Individual keys set in the environment replace the file's values.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<ExecutorConfig> {
        Self::builder()
            .add_file(path, true)?
            .add_env(env_prefix)
            .build()
    }

    /// Build configuration using the config crate's builder pattern
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
        }
    }
}

fn file_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

    match extension {
        "toml" => Ok(FileFormat::Toml),
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "json" => Ok(FileFormat::Json),
        _ => Err(ConfigError::LoadError(format!(
            "Unsupported file extension: {}",
            extension
        ))),
    }
}

/// Builder for layered configuration sources
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl ConfigLoaderBuilder {
    /// Add a configuration file source
    ///
    /// Fails for extensions other than toml, yaml, yml and json.
    pub fn add_file(mut self, path: &Path, required: bool) -> Result<Self> {
        let format = file_format(path)?;

        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        Ok(self)
    }

    /// Add environment variable source with prefix
    ///
    /// Values stay strings until deserialized, so `1.0` remains `"1.0"` for
    /// string fields while numeric fields still parse.
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__"),
        );
        self
    }

    /// Set a default value for a key
    pub fn set_default(mut self, key: &str, value: &str) -> Result<Self> {
        self.builder = self.builder.set_default(key, value)?;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> Result<ExecutorConfig> {
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}
