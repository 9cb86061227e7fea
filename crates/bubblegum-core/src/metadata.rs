//! Compressed NFT metadata as Bubblegum expects it on the wire.
//!
//! Field order is the Borsh layout of Bubblegum's `MetadataArgs`; do not
//! reorder fields.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::BubblegumError;

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
pub const MAX_CREATOR_LIMIT: usize = 5;
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Creator {
    pub address: [u8; 32],
    pub verified: bool,
    /// Percentage of royalties, 0-100.
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Collection {
    pub verified: bool,
    pub key: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

impl TryFrom<u8> for UseMethod {
    type Error = BubblegumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UseMethod::Burn),
            1 => Ok(UseMethod::Multiple),
            2 => Ok(UseMethod::Single),
            other => Err(BubblegumError::Validation(format!(
                "invalid use method {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum TokenProgramVersion {
    Original,
    Token2022,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MetadataArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<TokenStandard>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub token_program_version: TokenProgramVersion,
    pub creators: Vec<Creator>,
}

impl MetadataArgs {
    /// Metadata for a plain, mutable non-fungible leaf with no creators.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            uri: uri.into(),
            seller_fee_basis_points: 0,
            primary_sale_happened: false,
            is_mutable: true,
            edition_nonce: None,
            token_standard: Some(TokenStandard::NonFungible),
            collection: None,
            uses: None,
            token_program_version: TokenProgramVersion::Original,
            creators: Vec::new(),
        }
    }

    /// Check every bound Token Metadata enforces, before anything is encoded.
    pub fn validate(&self) -> Result<(), BubblegumError> {
        check_len("name", &self.name, MAX_NAME_LENGTH)?;
        check_len("symbol", &self.symbol, MAX_SYMBOL_LENGTH)?;
        check_len("uri", &self.uri, MAX_URI_LENGTH)?;

        if self.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
            return Err(BubblegumError::Validation(format!(
                "seller_fee_basis_points {} exceeds {MAX_SELLER_FEE_BASIS_POINTS}",
                self.seller_fee_basis_points
            )));
        }

        self.validate_creators()?;

        if let Some(uses) = &self.uses {
            if uses.remaining > uses.total {
                return Err(BubblegumError::Validation(format!(
                    "uses.remaining {} exceeds uses.total {}",
                    uses.remaining, uses.total
                )));
            }
        }

        Ok(())
    }

    fn validate_creators(&self) -> Result<(), BubblegumError> {
        if self.creators.is_empty() {
            return Ok(());
        }
        if self.creators.len() > MAX_CREATOR_LIMIT {
            return Err(BubblegumError::Validation(format!(
                "at most {MAX_CREATOR_LIMIT} creators allowed, got {}",
                self.creators.len()
            )));
        }

        for (i, creator) in self.creators.iter().enumerate() {
            if self.creators[..i].iter().any(|c| c.address == creator.address) {
                return Err(BubblegumError::Validation(format!(
                    "duplicate creator at position {i}"
                )));
            }
        }

        let total: u32 = self.creators.iter().map(|c| u32::from(c.share)).sum();
        if total != 100 {
            return Err(BubblegumError::Validation(format!(
                "creator shares must sum to 100, got {total}"
            )));
        }

        Ok(())
    }

    /// Borsh bytes of the metadata, validated first.
    pub fn encode(&self) -> Result<Vec<u8>, BubblegumError> {
        self.validate()?;
        borsh::to_vec(self).map_err(|e| BubblegumError::Encoding(e.to_string()))
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), BubblegumError> {
    if value.len() > max {
        return Err(BubblegumError::Validation(format!(
            "{field} is {} bytes, max {max}",
            value.len()
        )));
    }
    Ok(())
}
