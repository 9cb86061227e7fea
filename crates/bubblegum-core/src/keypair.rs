//! Ed25519 keypairs and the signing seam used by the assembler.

use ed25519_dalek::Signer;
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::address::bytes_to_address;
use crate::error::BubblegumError;

/// Anything that can sign a transaction message for one public key.
///
/// Implemented by [`Keypair`]; callers holding keys elsewhere (hardware,
/// remote signers) implement it themselves.
pub trait TransactionSigner: Send + Sync {
    fn pubkey(&self) -> [u8; 32];
    fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], BubblegumError>;
}

/// An Ed25519 keypair. The secret half is zeroized on drop.
#[derive(Debug)]
pub struct Keypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from its 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Parse the 64-byte `secret || public` layout used by Solana keypair
    /// files. The public half must match the secret.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BubblegumError> {
        if bytes.len() != 64 {
            return Err(BubblegumError::InvalidKeypair(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let keypair = Self::from_seed(&seed);
        seed.zeroize();

        if keypair.pubkey() != bytes[32..] {
            return Err(BubblegumError::InvalidKeypair(
                "public key does not match secret key".into(),
            ));
        }

        Ok(keypair)
    }

    /// `secret || public`, 64 bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    pub fn pubkey(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.pubkey())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl TransactionSigner for Keypair {
    fn pubkey(&self) -> [u8; 32] {
        Keypair::pubkey(self)
    }

    fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], BubblegumError> {
        Ok(self.sign(message))
    }
}
