use std::fmt;

use bubblegum_core::BubblegumError;
use serde_json::Value;
use thiserror::Error;

/// The remote round-trip an operation was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    FetchFreshness,
    FetchRent,
    FetchAsset,
    FetchProof,
    FetchAccount,
    Submit,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchFreshness => "fetch blockhash",
            Stage::FetchRent => "fetch rent exemption",
            Stage::FetchAsset => "fetch asset",
            Stage::FetchProof => "fetch asset proof",
            Stage::FetchAccount => "fetch account",
            Stage::Submit => "submit transaction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by a [`LedgerGateway`](crate::gateway::LedgerGateway).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// A JSON-RPC error object, kept as the node returned it.
    #[error("rpc error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("rpc error during {stage}: {source}")]
    Rpc {
        stage: Stage,
        #[source]
        source: GatewayError,
    },

    #[error("transaction error: {0}")]
    Transaction(String),

    /// The ledger rejected instruction `index` of a submitted transaction.
    #[error("instruction {index} failed: {detail}")]
    Instruction { index: u8, detail: Value },

    #[error("validation error: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn rpc(stage: Stage, source: GatewayError) -> Self {
        ClientError::Rpc { stage, source }
    }

    /// Stage of a remote failure, `None` for local ones.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ClientError::Rpc { stage, .. } => Some(*stage),
            ClientError::Instruction { .. } => Some(Stage::Submit),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<BubblegumError> for ClientError {
    fn from(e: BubblegumError) -> Self {
        if e.is_validation() {
            ClientError::Validation(e.detail().to_string())
        } else {
            ClientError::Transaction(e.detail().to_string())
        }
    }
}

/// Pull `InstructionError: [index, detail]` out of a `sendTransaction`
/// error payload, if the node reported one.
///
/// Nodes nest it as `data.err.InstructionError`; some proxies return the
/// transaction error directly as `data`.
pub(crate) fn instruction_error(data: &Value) -> Option<(u8, Value)> {
    let err = data.get("err").unwrap_or(data);
    let pair = err.get("InstructionError")?.as_array()?;
    let index = pair.first()?.as_u64()?;
    let index = u8::try_from(index).ok()?;
    let detail = pair.get(1).cloned().unwrap_or(Value::Null);
    Some((index, detail))
}
