//! Compressed NFT (Bubblegum) protocol layer.
//!
//! Everything a client needs to talk to the Bubblegum program without a
//! network connection: concurrent Merkle tree account sizing, program
//! derived addresses, the Bubblegum instruction encoders, and a legacy
//! transaction assembler that produces signed wire bytes.
//!
//! Like the wallet's Solana support this does not depend on `solana-sdk`.
//! The wire format is written by hand on top of `ed25519-dalek`, `bs58`,
//! `sha2` and `borsh`.

pub mod address;
pub mod error;
pub mod instruction;
pub mod keypair;
pub mod metadata;
pub mod pda;
pub mod programs;
pub mod transaction;
pub mod tree;

pub use address::{address_to_bytes, bytes_to_address, decode_hash, decode_proof, validate_address};
pub use error::BubblegumError;
pub use instruction::{
    create_account, create_tree, create_tree_config, mint_to_collection_v1, mint_v1, transfer,
    CollectionAccounts, LeafProof, TransferAccounts,
};
pub use keypair::{Keypair, TransactionSigner};
pub use metadata::{
    Collection, Creator, MetadataArgs, TokenProgramVersion, TokenStandard, UseMethod, Uses,
};
pub use pda::{
    derive_bubblegum_signer, derive_master_edition_address, derive_metadata_address,
    derive_tree_authority, find_program_address,
};
pub use programs::{
    ACCOUNT_COMPRESSION_PROGRAM_ID, BUBBLEGUM_PROGRAM_ID, NOOP_PROGRAM_ID, SYSTEM_PROGRAM_ID,
    TOKEN_METADATA_PROGRAM_ID,
};
pub use transaction::{
    assemble, decode_compact_u16, encode_compact_u16, AccountMeta, CompiledInstruction,
    Instruction, Message, SignedTransaction, PACKET_DATA_SIZE,
};
pub use tree::{merkle_tree_account_size, MerkleTreeParams};
