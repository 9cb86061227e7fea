//! Async client for compressed NFTs.
//!
//! Sequences the network round-trips (blockhash, rent, asset and proof
//! lookups, submission) around the pure encoders in `bubblegum-core`, and
//! reports failures through one typed error per operation.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod orchestrator;
pub mod types;

pub use config::{ClientConfig, Cluster, Commitment};
pub use error::{ClientError, GatewayError, Stage};
pub use gateway::{AccountInfo, Asset, AssetCompression, AssetOwnership, AssetProof, LedgerGateway, SendConfig};
pub use http::HttpGateway;
pub use orchestrator::BubblegumClient;
pub use types::{CollectionAccounts, CreateTreeOutcome, MintRequest, TransferRequest};
