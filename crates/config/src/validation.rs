//! Configuration validation

use crate::{ConfigError, ExecutorConfig, Result};
use fabric_tx_types::NodeRole;
use std::collections::HashSet;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire executor configuration, reporting every problem found
pub fn validate_config(config: &ExecutorConfig) -> Result<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// Every validation problem in `config`, in field order
pub fn collect_errors(config: &ExecutorConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Chaincode
    if config.chaincode.name.is_empty() {
        errors.push(ValidationError::new(
            "chaincode.name",
            "chaincode name is required",
        ));
    }

    if config.chaincode.version.is_empty() {
        errors.push(ValidationError::new(
            "chaincode.version",
            "chaincode version is required",
        ));
    }

    // Execution
    if config.execution.wait_time_ms == 0 {
        errors.push(ValidationError::new(
            "execution.wait_time_ms",
            "must be greater than 0",
        ));
    }

    if config.execution.required_confirmations == 0 {
        errors.push(ValidationError::new(
            "execution.required_confirmations",
            "must be at least 1",
        ));
    }

    // Discovery
    if config.discovery.enabled && config.discovery.refresh_interval_secs == 0 {
        errors.push(ValidationError::new(
            "discovery.refresh_interval_secs",
            "must be greater than 0",
        ));
    }

    // Peers
    let mut peer_names = HashSet::new();
    for (idx, peer) in config.peers.iter().enumerate() {
        if peer.name.is_empty() {
            errors.push(ValidationError::new(
                format!("peers[{idx}].name"),
                "peer name is required",
            ));
        } else if !peer_names.insert(peer.name.as_str()) {
            errors.push(ValidationError::new(
                format!("peers[{idx}].name"),
                format!("duplicate peer name '{}'", peer.name),
            ));
        }

        if let Err(e) = validate_url(&peer.url) {
            errors.push(ValidationError::new(format!("peers[{idx}].url"), e));
        }

        if peer.roles.is_empty() {
            errors.push(ValidationError::new(
                format!("peers[{idx}].roles"),
                "peer must serve at least one role",
            ));
        }
    }

    let has_discovery = config.discovery.enabled
        && config
            .peers
            .iter()
            .any(|p| p.roles.contains(&NodeRole::ServiceDiscovery));
    let has_endorser = config
        .peers
        .iter()
        .any(|p| p.roles.contains(&NodeRole::EndorsingPeer));

    if !has_discovery && !has_endorser {
        errors.push(ValidationError::new(
            "peers",
            "at least one endorsing peer is required when discovery is unavailable",
        ));
    }

    let event_sources = config
        .peers
        .iter()
        .filter(|p| p.roles.contains(&NodeRole::EventSource))
        .count();
    if event_sources < config.execution.required_confirmations {
        errors.push(ValidationError::new(
            "execution.required_confirmations",
            format!(
                "requires {} confirmations but only {} event source peers are configured",
                config.execution.required_confirmations, event_sources
            ),
        ));
    }

    // Orderers
    if config.orderers.is_empty() {
        errors.push(ValidationError::new(
            "orderers",
            "at least one orderer is required",
        ));
    }

    let mut orderer_names = HashSet::new();
    for (idx, orderer) in config.orderers.iter().enumerate() {
        if orderer.name.is_empty() {
            errors.push(ValidationError::new(
                format!("orderers[{idx}].name"),
                "orderer name is required",
            ));
        } else if !orderer_names.insert(orderer.name.as_str()) {
            errors.push(ValidationError::new(
                format!("orderers[{idx}].name"),
                format!("duplicate orderer name '{}'", orderer.name),
            ));
        }

        if let Err(e) = validate_url(&orderer.url) {
            errors.push(ValidationError::new(format!("orderers[{idx}].url"), e));
        }
    }

    // Logging
    if let Err(e) = validate_log_level(&config.logging.level) {
        errors.push(e);
    }

    errors
}

/// Validate a peer or orderer URL
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("grpc://") && !url.starts_with("grpcs://") {
        return Err("URL must start with grpc:// or grpcs://".to_string());
    }

    Ok(())
}

fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "logging.level",
            format!(
                "invalid log level '{level}', must be one of: trace, debug, info, warn, error"
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChaincodeConfig, PeerConfig};
    use fabric_tx_types::OrdererEndpoint;

    fn valid_config() -> ExecutorConfig {
        ExecutorConfig {
            chaincode: ChaincodeConfig {
                name: "sacc".to_string(),
                version: "1.0".to_string(),
                ..Default::default()
            },
            peers: vec![PeerConfig {
                name: "peer0".to_string(),
                url: "grpc://peer0:7051".to_string(),
                msp_id: "Org1MSP".to_string(),
                roles: NodeRole::ALL.to_vec(),
            }],
            orderers: vec![OrdererEndpoint::new("orderer0", "grpc://orderer0:7050")],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_chaincode_and_orderers() {
        let mut config = valid_config();
        config.chaincode.name.clear();
        config.orderers.clear();

        let fields: Vec<_> = collect_errors(&config)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert!(fields.contains(&"chaincode.name".to_string()));
        assert!(fields.contains(&"orderers".to_string()));
    }

    #[test]
    fn test_zero_wait_and_confirmations() {
        let mut config = valid_config();
        config.execution.wait_time_ms = 0;
        config.execution.required_confirmations = 0;

        let errors = collect_errors(&config);
        assert!(errors.iter().any(|e| e.field == "execution.wait_time_ms"));
        assert!(errors
            .iter()
            .any(|e| e.field == "execution.required_confirmations"));
    }

    #[test]
    fn test_duplicate_peer_names() {
        let mut config = valid_config();
        let dup = config.peers[0].clone();
        config.peers.push(dup);

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate peer name"));
    }

    #[test]
    fn test_bad_url_scheme() {
        let mut config = valid_config();
        config.orderers[0].url = "http://orderer0:7050".to_string();

        let errors = collect_errors(&config);
        assert!(errors.iter().any(|e| e.field == "orderers[0].url"));
    }

    #[test]
    fn test_too_few_event_sources() {
        let mut config = valid_config();
        config.execution.required_confirmations = 2;

        let errors = collect_errors(&config);
        assert!(errors
            .iter()
            .any(|e| e.message.contains("only 1 event source")));
    }

    #[test]
    fn test_endorser_required_without_discovery() {
        let mut config = valid_config();
        config.peers[0].roles = vec![NodeRole::EventSource];

        let errors = collect_errors(&config);
        assert!(errors.iter().any(|e| e.field == "peers"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_string();

        let errors = collect_errors(&config);
        assert!(errors.iter().any(|e| e.field == "logging.level"));
    }
}
