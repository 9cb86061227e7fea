use thiserror::Error;

/// Errors raised while deriving addresses, encoding instructions or
/// assembling transactions. None of these ever reach the network.
#[derive(Debug, Error)]
pub enum BubblegumError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("assembly error: {0}")]
    Assembly(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl BubblegumError {
    /// True for failures caused by malformed caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BubblegumError::Validation(_) | BubblegumError::InvalidAddress(_)
        )
    }

    /// The message without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            BubblegumError::InvalidAddress(d)
            | BubblegumError::InvalidKeypair(d)
            | BubblegumError::Validation(d)
            | BubblegumError::Encoding(d)
            | BubblegumError::Assembly(d)
            | BubblegumError::Signing(d)
            | BubblegumError::Serialization(d) => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = BubblegumError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_validation() {
        let err = BubblegumError::Validation("creator shares sum to 99".into());
        assert_eq!(err.to_string(), "validation error: creator shares sum to 99");
    }

    #[test]
    fn display_assembly() {
        let err = BubblegumError::Assembly("missing signer".into());
        assert_eq!(err.to_string(), "assembly error: missing signer");
    }

    #[test]
    fn display_encoding() {
        let err = BubblegumError::Encoding("borsh write failed".into());
        assert_eq!(err.to_string(), "encoding error: borsh write failed");
    }

    #[test]
    fn validation_classification() {
        assert!(BubblegumError::Validation("x".into()).is_validation());
        assert!(BubblegumError::InvalidAddress("x".into()).is_validation());
        assert!(!BubblegumError::Assembly("x".into()).is_validation());
        assert!(!BubblegumError::Signing("x".into()).is_validation());
    }

    #[test]
    fn detail_strips_prefix() {
        let err = BubblegumError::Validation("root: invalid base58".into());
        assert_eq!(err.detail(), "root: invalid base58");
        assert_eq!(BubblegumError::Assembly("no signers".into()).detail(), "no signers");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(BubblegumError::Signing("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
