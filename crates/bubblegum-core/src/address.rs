//! Base58 address and hash handling.
//!
//! Everything that crosses the RPC boundary (addresses, blockhashes, Merkle
//! roots, proof nodes, leaf hashes) is Base58 text. Internally we only ever
//! work with the raw 32-byte form.

use crate::error::BubblegumError;

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Base58 address string to its 32-byte representation.
///
/// Returns an error if the address is not valid Base58 or does not decode
/// to exactly 32 bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], BubblegumError> {
    decode_32(address).map_err(BubblegumError::InvalidAddress)
}

/// Validate a Base58 address string.
pub fn validate_address(address: &str) -> Result<bool, BubblegumError> {
    address_to_bytes(address).map(|_| true)
}

/// Decode a Base58 32-byte hash (blockhash, Merkle root, data or creator
/// hash). Same layout as an address, but reported as a validation failure
/// so callers can tell a malformed indexer value from a bad user key.
pub fn decode_hash(label: &str, value: &str) -> Result<[u8; 32], BubblegumError> {
    decode_32(value).map_err(|e| BubblegumError::Validation(format!("{label}: {e}")))
}

/// Decode a list of Base58 proof nodes, preserving their order.
pub fn decode_proof(nodes: &[String]) -> Result<Vec<[u8; 32]>, BubblegumError> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| decode_hash(&format!("proof node {i}"), node))
        .collect()
}

fn decode_32(value: &str) -> Result<[u8; 32], String> {
    let bytes = bs58::decode(value)
        .into_vec()
        .map_err(|e| format!("base58 decode failed: {e}"))?;

    bytes
        .try_into()
        .map_err(|v: Vec<u8>| format!("expected 32 bytes, got {}", v.len()))
}
