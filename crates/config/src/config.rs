//! Executor configuration structures

use fabric_tx_types::{
    ChaincodeLanguage, ChaincodeReference, EndorsementSelection, NodeDescriptor, NodeRole,
    OrdererEndpoint, DEFAULT_WAIT_TIME_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for a transaction executor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Chaincode every request targets
    pub chaincode: ChaincodeConfig,

    /// Wait and confirmation settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Service discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Statically known peers
    #[serde(default)]
    pub peers: Vec<PeerConfig>,

    /// Ordering service endpoints
    #[serde(default)]
    pub orderers: Vec<OrdererEndpoint>,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExecutorConfig {
    pub fn chaincode_reference(&self) -> ChaincodeReference {
        ChaincodeReference::new(&self.chaincode.name, &self.chaincode.version)
            .with_language(self.chaincode.language)
    }

    pub fn nodes(&self) -> Vec<NodeDescriptor> {
        self.peers.iter().map(PeerConfig::to_descriptor).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaincodeConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub language: ChaincodeLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Bound on broadcast, commit and confirmation combined
    #[serde(default = "default_wait_time_ms")]
    pub wait_time_ms: u64,

    /// Distinct event sources that must report the commit
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: usize,

    /// Serialized identity mixed into transaction ids
    #[serde(default)]
    pub creator: String,
}

impl ExecutionConfig {
    pub fn wait_time(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Use discovery when a discovery-capable peer is present
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bypass cached layouts on every resolution
    #[serde(default)]
    pub force_refresh: bool,

    #[serde(default)]
    pub selection: EndorsementSelection,

    /// Age after which cached layouts are fetched again
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl DiscoveryConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// A statically configured peer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    pub name: String,
    pub url: String,

    #[serde(default)]
    pub msp_id: String,

    /// Roles served; all roles when omitted
    #[serde(default = "default_roles")]
    pub roles: Vec<NodeRole>,
}

impl PeerConfig {
    pub fn to_descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::new(&self.name, &self.url)
            .with_msp(&self.msp_id)
            .with_roles(self.roles.iter().copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// Default value functions
fn default_wait_time_ms() -> u64 {
    DEFAULT_WAIT_TIME_MS
}

fn default_required_confirmations() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    120 // 2 minutes
}

fn default_roles() -> Vec<NodeRole> {
    NodeRole::ALL.to_vec()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            wait_time_ms: default_wait_time_ms(),
            required_confirmations: default_required_confirmations(),
            creator: String::new(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            force_refresh: false,
            selection: EndorsementSelection::default(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
