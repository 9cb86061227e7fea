//! The remote side of every operation: a Solana JSON-RPC node plus a
//! Digital Asset Standard (DAS) indexer.
//!
//! [`LedgerGateway`] is the only seam through which the client touches the
//! network. [`HttpGateway`](crate::HttpGateway) implements it over HTTP;
//! tests implement it in memory. Implementations are expected to be
//! stateless and safe to call concurrently. Retry and backoff, if any,
//! belong to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Commitment;
pub use crate::error::GatewayError;

/// `sendTransaction` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfig {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: Commitment::Confirmed,
        }
    }
}

/// An on-chain account as returned by `getAccountInfo`, data decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    /// Base58 address of the owning program.
    pub owner: String,
    pub data: Vec<u8>,
    pub executable: bool,
}

/// Leaf hashes of a compressed asset, from `getAsset`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetCompression {
    pub tree: String,
    pub data_hash: String,
    pub creator_hash: String,
    pub leaf_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetOwnership {
    pub owner: String,
    #[serde(default)]
    pub delegate: Option<String>,
}

/// The parts of a DAS `getAsset` response a transfer needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub id: String,
    pub compression: AssetCompression,
    pub ownership: AssetOwnership,
}

/// DAS `getAssetProof` response. Hashes stay Base58 text here; the
/// orchestrator decodes them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetProof {
    pub root: String,
    /// Sibling nodes from the leaf upward.
    pub proof: Vec<String>,
    #[serde(default)]
    pub tree_id: Option<String>,
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Base58 blockhash at `commitment`.
    async fn get_latest_blockhash(&self, commitment: Commitment) -> Result<String, GatewayError>;

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: u64,
    ) -> Result<u64, GatewayError>;

    /// Submit a base64 wire transaction and return its signature.
    async fn send_transaction(
        &self,
        transaction_base64: &str,
        config: &SendConfig,
    ) -> Result<String, GatewayError>;

    /// `Ok(None)` when the account does not exist.
    async fn get_account_info(&self, address: &str) -> Result<Option<AccountInfo>, GatewayError>;

    async fn get_asset(&self, asset_id: &str) -> Result<Asset, GatewayError>;

    async fn get_asset_proof(&self, asset_id: &str) -> Result<AssetProof, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn asset_parses_das_response() {
        let value = json!({
            "interface": "V1_NFT",
            "id": "Asset1111111111111111111111111111111111111",
            "compression": {
                "eligible": false,
                "compressed": true,
                "data_hash": "DataHash",
                "creator_hash": "CreatorHash",
                "asset_hash": "AssetHash",
                "tree": "Tree111111111111111111111111111111111111111",
                "seq": 3,
                "leaf_id": 2
            },
            "ownership": {
                "frozen": false,
                "delegated": false,
                "delegate": null,
                "ownership_model": "single",
                "owner": "Owner11111111111111111111111111111111111111"
            }
        });

        let asset: Asset = serde_json::from_value(value).unwrap();
        assert_eq!(asset.compression.leaf_id, 2);
        assert_eq!(asset.compression.data_hash, "DataHash");
        assert!(asset.ownership.delegate.is_none());
    }

    #[test]
    fn proof_parses_das_response() {
        let value = json!({
            "root": "Root",
            "proof": ["A", "B", "C"],
            "node_index": 16386,
            "leaf": "Leaf",
            "tree_id": "Tree"
        });

        let proof: AssetProof = serde_json::from_value(value).unwrap();
        assert_eq!(proof.proof, vec!["A", "B", "C"]);
        assert_eq!(proof.tree_id.as_deref(), Some("Tree"));
    }

    #[test]
    fn send_config_serializes_camel_case() {
        let config = SendConfig {
            skip_preflight: true,
            preflight_commitment: Commitment::Processed,
        };
        assert_eq!(
            serde_json::to_value(config).unwrap(),
            json!({ "skipPreflight": true, "preflightCommitment": "processed" })
        );
    }
}
