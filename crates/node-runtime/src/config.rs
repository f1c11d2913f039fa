//! # Node Configuration
//!
//! Runtime parameters, loaded from the environment over built-in defaults.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CHAINCODE_ID` | empty | Identity reported in logs |
//! | `CHAINCODE_SERVER_ADDRESS` | empty | Reported in logs; nothing is bound |
//! | `TXL_DATA_DIR` | `./data` | World state file and lock file |
//! | `TXL_SEED_ON_START` | `true` | Seed the ledger when it holds no records |
//! | `TXL_LOCATION_INDEX` | `write-through` | `write-through` or `primary-only` |

use std::path::PathBuf;

use record_store::domain::config::ParseIndexPolicyError;
use record_store::IndexPolicy;

pub const ENV_CHAINCODE_ID: &str = "CHAINCODE_ID";
pub const ENV_SERVER_ADDRESS: &str = "CHAINCODE_SERVER_ADDRESS";
pub const ENV_DATA_DIR: &str = "TXL_DATA_DIR";
pub const ENV_SEED_ON_START: &str = "TXL_SEED_ON_START";
pub const ENV_LOCATION_INDEX: &str = "TXL_LOCATION_INDEX";

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub chaincode_id: String,
    pub server_address: String,
    /// Directory holding the world state.
    pub data_dir: PathBuf,
    /// Run `InitLedger` at startup if the world state is empty.
    pub seed_on_start: bool,
    pub index_policy: IndexPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            chaincode_id: String::new(),
            server_address: String::new(),
            data_dir: PathBuf::from("./data"),
            seed_on_start: true,
            index_policy: IndexPolicy::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("data directory must not be empty (set TXL_DATA_DIR)")]
    EmptyDataDir,

    #[error("TXL_LOCATION_INDEX: {0}")]
    InvalidIndexPolicy(#[from] ParseIndexPolicyError),
}

impl NodeConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable source.
    ///
    /// Unset variables keep their defaults. A boolean that does not parse
    /// falls back to its default with a warning; an unknown index policy is
    /// an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(id) = lookup(ENV_CHAINCODE_ID) {
            config.chaincode_id = id;
        }
        if let Some(address) = lookup(ENV_SERVER_ADDRESS) {
            config.server_address = address;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_SEED_ON_START) {
            match parse_bool(&raw) {
                Some(seed) => config.seed_on_start = seed,
                None => tracing::warn!(
                    "{}={:?} is not a boolean, using {}",
                    ENV_SEED_ON_START,
                    raw,
                    config.seed_on_start
                ),
            }
        }
        if let Some(raw) = lookup(ENV_LOCATION_INDEX) {
            config.index_policy = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.seed_on_start);
        assert_eq!(config.index_policy, IndexPolicy::WriteThrough);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (ENV_CHAINCODE_ID, "basic_1.0:abc"),
            (ENV_SERVER_ADDRESS, "0.0.0.0:9999"),
            (ENV_DATA_DIR, "/var/lib/txl"),
            (ENV_SEED_ON_START, "false"),
            (ENV_LOCATION_INDEX, "primary-only"),
        ])
        .unwrap();

        assert_eq!(config.chaincode_id, "basic_1.0:abc");
        assert_eq!(config.server_address, "0.0.0.0:9999");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/txl"));
        assert!(!config.seed_on_start);
        assert_eq!(config.index_policy, IndexPolicy::PrimaryOnly);
    }

    #[test]
    fn test_bad_bool_falls_back_to_default() {
        let config = load(&[(ENV_SEED_ON_START, "maybe")]).unwrap();
        assert!(config.seed_on_start);
    }

    #[test]
    fn test_bad_index_policy_is_an_error() {
        let err = load(&[(ENV_LOCATION_INDEX, "lazy")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIndexPolicy(_)));
        assert!(err.to_string().starts_with(ENV_LOCATION_INDEX));
    }

    #[test]
    fn test_empty_data_dir_is_rejected() {
        let err = load(&[(ENV_DATA_DIR, "")]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDataDir));
    }
}
