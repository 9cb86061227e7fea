//! Program Derived Address (PDA) derivation.
//!
//! A PDA is `SHA-256(seeds || bump || program_id || "ProgramDerivedAddress")`
//! for the highest bump (255 down to 0) whose hash is NOT a valid Ed25519
//! point, so it can never have a private key.

use sha2::{Digest, Sha256};

use crate::error::BubblegumError;
use crate::programs::{BUBBLEGUM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID};

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Seed of the Bubblegum signer used for collection CPIs.
const COLLECTION_CPI_SEED: &[u8] = b"collection_cpi";

/// Token Metadata seed prefixes.
const METADATA_SEED: &[u8] = b"metadata";
const EDITION_SEED: &[u8] = b"edition";

/// Derive the tree authority ("tree config") for a Merkle tree account.
///
/// Seeds: `[merkle_tree]` under the Bubblegum program.
pub fn derive_tree_authority(merkle_tree: &[u8; 32]) -> Result<[u8; 32], BubblegumError> {
    find_program_address(&[merkle_tree.as_ref()], &BUBBLEGUM_PROGRAM_ID).map(|(pda, _)| pda)
}

/// Derive the Bubblegum signer PDA that signs Token Metadata CPIs when
/// minting into a collection.
pub fn derive_bubblegum_signer() -> Result<[u8; 32], BubblegumError> {
    find_program_address(&[COLLECTION_CPI_SEED], &BUBBLEGUM_PROGRAM_ID).map(|(pda, _)| pda)
}

/// Derive the Token Metadata account for a mint.
///
/// Seeds: `["metadata", token_metadata_program_id, mint]`.
pub fn derive_metadata_address(mint: &[u8; 32]) -> Result<[u8; 32], BubblegumError> {
    find_program_address(
        &[METADATA_SEED, &TOKEN_METADATA_PROGRAM_ID, mint.as_ref()],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .map(|(pda, _)| pda)
}

/// Derive the master edition account for a mint.
///
/// Seeds: `["metadata", token_metadata_program_id, mint, "edition"]`.
pub fn derive_master_edition_address(mint: &[u8; 32]) -> Result<[u8; 32], BubblegumError> {
    find_program_address(
        &[
            METADATA_SEED,
            &TOKEN_METADATA_PROGRAM_ID,
            mint.as_ref(),
            EDITION_SEED,
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .map(|(pda, _)| pda)
}

/// Find a valid Program Derived Address (PDA) for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0 and returns the first address that
/// is off the Ed25519 curve, together with its bump.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), BubblegumError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(BubblegumError::InvalidAddress(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Returns `Some(address)` if the derived point is OFF the Ed25519 curve,
/// `None` if it falls on the curve.
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(hash)
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
