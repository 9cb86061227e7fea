//! Manual Solana transaction wire format and multi-signer assembly.
//!
//! We build legacy Solana transactions entirely by hand. The wire format:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use base64::{engine::general_purpose, Engine as _};

use crate::address::bytes_to_address;
use crate::error::BubblegumError;
use crate::keypair::TransactionSigner;

/// Largest serialized transaction a validator accepts (IPv6 MTU minus
/// headers).
pub const PACKET_DATA_SIZE: usize = 1232;

const SIGNATURE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), BubblegumError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            BubblegumError::Serialization(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    let value = u16::try_from(value)
        .map_err(|_| BubblegumError::Serialization("compact-u16 value overflow".into()))?;

    Ok((value, consumed))
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, BubblegumError> {
    let len = u16::try_from(len)
        .map_err(|_| BubblegumError::Assembly(format!("too many {what}: {len}")))?;
    Ok(encode_compact_u16(len))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// An instruction before it is compiled into a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<[u8; 32]>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: [u8; 32],

    pub compiled_instructions: Vec<CompiledInstruction>,
}

/// An instruction whose account references are u8 indices into the
/// message's `account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A fully signed transaction: message bytes plus one signature per
/// required signer, in the message's signer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub message: Vec<u8>,
    pub signatures: Vec<[u8; 64]>,
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

impl Message {
    /// Compile instructions into a message with `fee_payer` at index 0.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &[u8; 32],
        recent_blockhash: &[u8; 32],
    ) -> Result<Self, BubblegumError> {
        if instructions.is_empty() {
            return Err(BubblegumError::Assembly(
                "transaction needs at least one instruction".into(),
            ));
        }

        // Instruction account lists are tiny, a Vec beats a map here.
        struct AccountEntry {
            pubkey: [u8; 32],
            is_signer: bool,
            is_writable: bool,
        }

        let mut entries: Vec<AccountEntry> = Vec::new();

        let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        // Fee payer is always signer + writable.
        upsert(*fee_payer, true, true);

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        // Stable sort: within a category insertion order is kept, so the fee
        // payer stays at index 0.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if entries.len() > usize::from(u8::MAX) + 1 {
            return Err(BubblegumError::Assembly(format!(
                "transaction references {} accounts, max 256",
                entries.len()
            )));
        }

        let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
        let num_readonly_signed = entries
            .iter()
            .filter(|e| e.is_signer && !e.is_writable)
            .count() as u8;
        let num_readonly_unsigned = entries
            .iter()
            .filter(|e| !e.is_signer && !e.is_writable)
            .count() as u8;

        let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();

        let index_of = |key: &[u8; 32]| -> Result<u8, BubblegumError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| BubblegumError::Assembly("account not in account keys".into()))
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let account_indices = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<u8>, _>>()?;

            compiled.push(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                account_indices,
                data: ix.data.clone(),
            });
        }

        Ok(Message {
            account_keys,
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            recent_blockhash: *recent_blockhash,
            compiled_instructions: compiled,
        })
    }

    /// Public keys that must sign, in signature order.
    pub fn signer_keys(&self) -> &[[u8; 32]] {
        &self.account_keys[..usize::from(self.num_required_signatures)]
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Result<Vec<u8>, BubblegumError> {
        let mut buf = Vec::with_capacity(512);

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        buf.extend_from_slice(&compact_len(self.account_keys.len(), "accounts")?);
        for key in &self.account_keys {
            buf.extend_from_slice(key);
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&compact_len(
            self.compiled_instructions.len(),
            "instructions",
        )?);
        for ix in &self.compiled_instructions {
            buf.push(ix.program_id_index);

            buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction accounts")?);
            buf.extend_from_slice(&ix.account_indices);

            buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data bytes")?);
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Compile, sign and size-check a transaction.
///
/// The first signer pays fees. Every signer account the instructions
/// reference must have exactly one entry in `signers` (duplicates are
/// tolerated), and `signers` may not contain keys the message does not
/// require. Signatures come out in the message's signer order regardless of
/// the order of `signers`.
pub fn assemble(
    recent_blockhash: &[u8; 32],
    instructions: &[Instruction],
    signers: &[&dyn TransactionSigner],
) -> Result<SignedTransaction, BubblegumError> {
    let fee_payer = signers
        .first()
        .ok_or_else(|| BubblegumError::Assembly("at least one signer is required".into()))?
        .pubkey();

    let message = Message::compile(instructions, &fee_payer, recent_blockhash)?;
    let required = message.signer_keys();

    for signer in signers {
        let key = signer.pubkey();
        if !required.contains(&key) {
            return Err(BubblegumError::Assembly(format!(
                "signer {} is not required by the transaction",
                bytes_to_address(&key)
            )));
        }
    }

    let message_bytes = message.serialize()?;

    let mut signatures = Vec::with_capacity(required.len());
    for key in required {
        let signer = signers
            .iter()
            .find(|s| s.pubkey() == *key)
            .ok_or_else(|| {
                BubblegumError::Assembly(format!(
                    "missing signer for {}",
                    bytes_to_address(key)
                ))
            })?;
        signatures.push(signer.sign_message(&message_bytes)?);
    }

    let tx = SignedTransaction {
        message: message_bytes,
        signatures,
    };

    let size = tx.wire_len();
    if size > PACKET_DATA_SIZE {
        return Err(BubblegumError::Assembly(format!(
            "transaction is {size} bytes, max {PACKET_DATA_SIZE}"
        )));
    }

    Ok(tx)
}

impl SignedTransaction {
    /// Size of the serialized wire form.
    pub fn wire_len(&self) -> usize {
        encode_compact_u16(self.signatures.len() as u16).len()
            + self.signatures.len() * SIGNATURE_LEN
            + self.message.len()
    }

    /// Serialize into the wire format accepted by `sendTransaction`.
    pub fn to_wire(&self) -> Result<Vec<u8>, BubblegumError> {
        let mut wire = Vec::with_capacity(self.wire_len());
        wire.extend_from_slice(&compact_len(self.signatures.len(), "signatures")?);
        for sig in &self.signatures {
            wire.extend_from_slice(sig);
        }
        wire.extend_from_slice(&self.message);
        Ok(wire)
    }

    /// Base64 of the wire bytes, as `sendTransaction` expects with
    /// `encoding: "base64"`.
    pub fn to_base64(&self) -> Result<String, BubblegumError> {
        Ok(general_purpose::STANDARD.encode(self.to_wire()?))
    }

    /// The transaction id: Base58 of the fee payer's signature.
    pub fn signature(&self) -> Option<String> {
        self.signatures.first().map(|sig| bs58::encode(sig).into_string())
    }

    /// Parse wire bytes back into signatures and message.
    pub fn from_wire(raw_tx: &[u8]) -> Result<Self, BubblegumError> {
        let (num_sigs, compact_len) = decode_compact_u16(raw_tx)?;

        let sigs_end = compact_len + usize::from(num_sigs) * SIGNATURE_LEN;
        if sigs_end > raw_tx.len() {
            return Err(BubblegumError::Serialization(
                "transaction too short: signature slots exceed length".into(),
            ));
        }

        let signatures = raw_tx[compact_len..sigs_end]
            .chunks_exact(SIGNATURE_LEN)
            .map(|chunk| {
                let mut sig = [0u8; SIGNATURE_LEN];
                sig.copy_from_slice(chunk);
                sig
            })
            .collect();

        let message = raw_tx[sigs_end..].to_vec();
        if message.len() < 4 {
            return Err(BubblegumError::Serialization(
                "transaction message too short".into(),
            ));
        }

        Ok(Self {
            message,
            signatures,
        })
    }

    /// Account keys listed in the message, in order.
    pub fn account_keys(&self) -> Result<Vec<[u8; 32]>, BubblegumError> {
        let (num_accounts, len) = decode_compact_u16(self.message.get(3..).unwrap_or_default())?;
        let start = 3 + len;
        let end = start + usize::from(num_accounts) * 32;

        let keys = self.message.get(start..end).ok_or_else(|| {
            BubblegumError::Serialization("transaction message too short for account keys".into())
        })?;

        Ok(keys
            .chunks_exact(32)
            .map(|chunk| {
                let mut key = [0u8; 32];
                key.copy_from_slice(chunk);
                key
            })
            .collect())
    }

    /// Public keys of the signers, in signature order.
    pub fn signer_keys(&self) -> Result<Vec<[u8; 32]>, BubblegumError> {
        let num_required = self.message.first().copied().map(usize::from).ok_or_else(|| {
            BubblegumError::Serialization("transaction message is empty".into())
        })?;
        let mut keys = self.account_keys()?;
        keys.truncate(num_required);
        Ok(keys)
    }
}
