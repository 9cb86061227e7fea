use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Solana clusters with a public RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Mainnet,
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    /// Default JSON-RPC endpoint
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }
}

/// How settled a block must be before the node answers from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Connection and submission settings for [`BubblegumClient`](crate::BubblegumClient)
/// and [`HttpGateway`](crate::HttpGateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub rpc_url: String,
    /// Digital Asset Standard API endpoint (`getAsset`, `getAssetProof`).
    /// Falls back to `rpc_url` when unset.
    pub das_url: Option<String>,
    /// Commitment used when fetching the blockhash.
    pub commitment: Commitment,
    pub preflight_commitment: Commitment,
    pub skip_preflight: bool,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_cluster(Cluster::Devnet)
    }
}

impl ClientConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            das_url: None,
            commitment: Commitment::Confirmed,
            preflight_commitment: Commitment::Confirmed,
            skip_preflight: false,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn for_cluster(cluster: Cluster) -> Self {
        Self::new(cluster.rpc_url())
    }

    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ClientError::Validation(format!("invalid client config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ClientError::Validation("rpc_url is empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::Validation(
                "request_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn das_url(&self) -> &str {
        self.das_url.as_deref().unwrap_or(&self.rpc_url)
    }

    pub fn with_das_url(mut self, das_url: impl Into<String>) -> Self {
        self.das_url = Some(das_url.into());
        self
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_preflight_commitment(mut self, commitment: Commitment) -> Self {
        self.preflight_commitment = commitment;
        self
    }

    pub fn with_skip_preflight(mut self, skip_preflight: bool) -> Self {
        self.skip_preflight = skip_preflight;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_devnet() {
        let config = ClientConfig::default();
        assert_eq!(config.rpc_url, Cluster::Devnet.rpc_url());
        assert_eq!(config.commitment, Commitment::Confirmed);
        assert_eq!(config.preflight_commitment, Commitment::Confirmed);
        assert!(!config.skip_preflight);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn das_url_falls_back_to_rpc() {
        let config = ClientConfig::new("http://rpc");
        assert_eq!(config.das_url(), "http://rpc");
        let config = config.with_das_url("http://das");
        assert_eq!(config.das_url(), "http://das");
    }

    #[test]
    fn from_json_fills_defaults() {
        let config =
            ClientConfig::from_json(r#"{"rpc_url": "http://localhost:8899", "commitment": "finalized"}"#)
                .unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.commitment, Commitment::Finalized);
        assert_eq!(config.preflight_commitment, Commitment::Confirmed);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert!(config.das_url.is_none());
    }

    #[test]
    fn from_json_rejects_bad_input() {
        assert!(ClientConfig::from_json("not json").unwrap_err().is_validation());
        assert!(ClientConfig::from_json(r#"{"rpc_url": ""}"#).is_err());
        assert!(ClientConfig::from_json(r#"{"request_timeout_ms": 0}"#).is_err());
        assert!(ClientConfig::from_json(r#"{"commitment": "eventually"}"#).is_err());
    }

    #[test]
    fn commitment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Commitment::Processed).unwrap(),
            "\"processed\""
        );
        assert_eq!(Commitment::Finalized.as_str(), "finalized");
    }

    #[test]
    fn builder_setters() {
        let config = ClientConfig::for_cluster(Cluster::Localnet)
            .with_skip_preflight(true)
            .with_preflight_commitment(Commitment::Processed)
            .with_request_timeout_ms(500);
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert!(config.skip_preflight);
        assert_eq!(config.preflight_commitment, Commitment::Processed);
        assert_eq!(config.request_timeout_ms, 500);
    }

    #[test]
    fn cluster_endpoints() {
        assert_eq!(Cluster::Devnet.rpc_url(), "https://api.devnet.solana.com");
        let config = ClientConfig::for_cluster(Cluster::Mainnet);
        assert_eq!(config.das_url(), "https://api.mainnet-beta.solana.com");
    }
}
