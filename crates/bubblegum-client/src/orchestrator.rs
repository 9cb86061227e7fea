//! The four Bubblegum operations end to end.
//!
//! Every operation runs the same fail-fast sequence: gather remote inputs,
//! encode, assemble, submit. The first failure aborts the operation and is
//! returned as-is; nothing is retried and nothing is submitted unless the
//! transaction assembled completely. A fresh blockhash is fetched for each
//! operation and never shared between them.

use std::future::Future;
use std::time::Duration;

use bubblegum_core::{
    address_to_bytes, assemble, bytes_to_address, decode_hash, decode_proof,
    derive_tree_authority, instruction, BubblegumError, CollectionAccounts, Keypair, LeafProof,
    MerkleTreeParams, SignedTransaction, TransactionSigner, TransferAccounts,
};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{instruction_error, ClientError, GatewayError, Stage};
use crate::gateway::{AccountInfo, LedgerGateway, SendConfig};
use crate::types::{CreateTreeOutcome, MintRequest, TransferRequest};

/// Bubblegum client over any [`LedgerGateway`].
///
/// Holds no per-operation state, so one client can serve concurrent calls.
#[derive(Debug)]
pub struct BubblegumClient<G> {
    gateway: G,
    config: ClientConfig,
}

impl<G: LedgerGateway> BubblegumClient<G> {
    /// Fails if `config` could not drive a request (empty RPC URL, zero
    /// timeout).
    pub fn new(gateway: G, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self { gateway, config })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Tree authority (tree config PDA) of `tree`, Base58.
    pub fn tree_authority(&self, tree: &str) -> Result<String, ClientError> {
        let tree = address_to_bytes(tree)?;
        Ok(bytes_to_address(&derive_tree_authority(&tree)?))
    }

    /// Lamports needed to make a tree account with `params` rent exempt.
    pub async fn rent_for(&self, params: &MerkleTreeParams) -> Result<u64, ClientError> {
        let size = params.account_size();
        self.remote(
            "rent_for",
            Stage::FetchRent,
            self.gateway.get_minimum_balance_for_rent_exemption(size),
        )
        .await
    }

    /// The raw tree account, `None` if it was never created.
    pub async fn tree_account(&self, tree: &str) -> Result<Option<AccountInfo>, ClientError> {
        address_to_bytes(tree)?;
        self.remote(
            "tree_account",
            Stage::FetchAccount,
            self.gateway.get_account_info(tree),
        )
        .await
    }

    /// Allocate and initialize a new tree owned by `payer`.
    ///
    /// A fresh keypair is generated for the tree account; it signs the
    /// creation and is then dropped.
    pub async fn create_tree(
        &self,
        payer: &dyn TransactionSigner,
        params: MerkleTreeParams,
        public: bool,
    ) -> Result<CreateTreeOutcome, ClientError> {
        const OP: &str = "create_tree";

        params.validate()?;
        if !params.is_supported_pair() {
            warn!(
                max_depth = params.max_depth,
                max_buffer_size = params.max_buffer_size,
                "non-standard tree parameters, the compression program may reject them"
            );
        }

        let blockhash = self.fetch_blockhash(OP).await?;

        let account_size = params.account_size();
        debug!(operation = OP, account_size, "computed tree account size");
        let rent = self
            .remote(
                OP,
                Stage::FetchRent,
                self.gateway
                    .get_minimum_balance_for_rent_exemption(account_size),
            )
            .await?;

        let tree = Keypair::generate();
        let tree_key = tree.pubkey();
        let tree_authority = derive_tree_authority(&tree_key)?;
        let payer_key = payer.pubkey();

        debug!(operation = OP, tree = %tree.address(), rent, "encoding");
        let instructions = instruction::create_tree(
            &tree_authority,
            &tree_key,
            &payer_key,
            params.max_depth,
            params.max_buffer_size,
            public,
            rent,
            account_size,
        )?;

        let signers: [&dyn TransactionSigner; 2] = [payer, &tree];
        let tx = assemble(&blockhash, &instructions, &signers)?;
        let signature = self.submit(OP, &tx).await?;

        Ok(CreateTreeOutcome {
            signature,
            tree: bytes_to_address(&tree_key),
            tree_authority: bytes_to_address(&tree_authority),
        })
    }

    /// Mint a leaf into a tree `payer` created (or is delegate of).
    pub async fn mint_v1(
        &self,
        payer: &dyn TransactionSigner,
        request: &MintRequest,
    ) -> Result<String, ClientError> {
        const OP: &str = "mint_v1";

        let accounts = MintAccounts::resolve(request)?;
        request.metadata.validate()?;

        let blockhash = self.fetch_blockhash(OP).await?;

        let ix = instruction::mint_v1(
            &accounts.tree_authority,
            &accounts.leaf_owner,
            &accounts.leaf_delegate,
            &accounts.tree,
            &payer.pubkey(),
            &request.metadata,
        )?;

        let tx = assemble(&blockhash, &[ix], &[payer])?;
        self.submit(OP, &tx).await
    }

    /// Mint a leaf and verify it into `collection`.
    ///
    /// `collection_authority` is only needed when the collection's update
    /// authority is not the payer.
    pub async fn mint_to_collection_v1(
        &self,
        payer: &dyn TransactionSigner,
        request: &MintRequest,
        collection: &CollectionAccounts,
        collection_authority: Option<&dyn TransactionSigner>,
    ) -> Result<String, ClientError> {
        const OP: &str = "mint_to_collection_v1";

        let accounts = MintAccounts::resolve(request)?;
        request.metadata.validate()?;

        let blockhash = self.fetch_blockhash(OP).await?;

        let ix = instruction::mint_to_collection_v1(
            &accounts.tree_authority,
            &accounts.leaf_owner,
            &accounts.leaf_delegate,
            &accounts.tree,
            &payer.pubkey(),
            collection,
            &request.metadata,
        )?;

        let mut signers = vec![payer];
        if let Some(authority) = collection_authority {
            signers.push(authority);
        }

        let tx = assemble(&blockhash, &[ix], &signers)?;
        self.submit(OP, &tx).await
    }

    /// Transfer a compressed asset held by `owner`, who also pays the fee.
    pub async fn transfer(
        &self,
        owner: &dyn TransactionSigner,
        request: &TransferRequest,
    ) -> Result<String, ClientError> {
        const OP: &str = "transfer";

        address_to_bytes(&request.asset_id)?;
        let new_owner = address_to_bytes(&request.new_owner)?;

        let asset = self
            .remote(OP, Stage::FetchAsset, self.gateway.get_asset(&request.asset_id))
            .await?;
        let asset_proof = self
            .remote(
                OP,
                Stage::FetchProof,
                self.gateway.get_asset_proof(&request.asset_id),
            )
            .await?;

        // Everything below the caller's own inputs came from the indexer, so
        // undecodable fields are reported against the stage that fetched them.
        let from_asset = Stage::FetchAsset;
        let from_proof = Stage::FetchProof;

        let owner_key = owner.pubkey();
        let leaf_owner = remote_decode(OP, from_asset, address_to_bytes(&asset.ownership.owner))?;
        if leaf_owner != owner_key {
            return Err(ClientError::Validation(format!(
                "asset {} is owned by {}, not {}",
                asset.id,
                asset.ownership.owner,
                bytes_to_address(&owner_key)
            )));
        }
        let leaf_delegate = match &asset.ownership.delegate {
            Some(delegate) => remote_decode(OP, from_asset, address_to_bytes(delegate))?,
            None => leaf_owner,
        };

        let tree = remote_decode(OP, from_asset, address_to_bytes(&asset.compression.tree))?;
        if let Some(tree_id) = &asset_proof.tree_id {
            if remote_decode(OP, from_proof, address_to_bytes(tree_id))? != tree {
                error!(
                    operation = OP,
                    %tree_id,
                    tree = %asset.compression.tree,
                    "proof belongs to another tree"
                );
                return Err(ClientError::rpc(
                    from_proof,
                    GatewayError::Decode(format!(
                        "proof is for tree {tree_id}, asset is in tree {}",
                        asset.compression.tree
                    )),
                ));
            }
        }
        let index = u32::try_from(asset.compression.leaf_id).map_err(|_| {
            ClientError::Validation(format!(
                "leaf_id {} does not fit a leaf index",
                asset.compression.leaf_id
            ))
        })?;

        let mut proof = remote_decode(OP, from_proof, decode_proof(&asset_proof.proof))?;
        trim_canopy(&mut proof, request.canopy_depth)?;

        let compression = &asset.compression;
        let leaf = LeafProof {
            root: remote_decode(OP, from_proof, decode_hash("root", &asset_proof.root))?,
            data_hash: remote_decode(
                OP,
                from_asset,
                decode_hash("data_hash", &compression.data_hash),
            )?,
            creator_hash: remote_decode(
                OP,
                from_asset,
                decode_hash("creator_hash", &compression.creator_hash),
            )?,
            nonce: compression.leaf_id,
            index,
            proof,
        };

        let accounts = TransferAccounts {
            tree_authority: derive_tree_authority(&tree)?,
            leaf_owner,
            leaf_delegate,
            new_leaf_owner: new_owner,
            merkle_tree: tree,
        };

        // Rejects an empty proof before anything is fetched for submission.
        let ix = instruction::transfer(&accounts, &leaf)?;

        let blockhash = self.fetch_blockhash(OP).await?;
        let tx = assemble(&blockhash, &[ix], &[owner])?;
        self.submit(OP, &tx).await
    }

    async fn fetch_blockhash(&self, operation: &'static str) -> Result<[u8; 32], ClientError> {
        let blockhash = self
            .remote(
                operation,
                Stage::FetchFreshness,
                self.gateway.get_latest_blockhash(self.config.commitment),
            )
            .await?;

        remote_decode(operation, Stage::FetchFreshness, decode_hash("blockhash", &blockhash))
    }

    async fn submit(
        &self,
        operation: &'static str,
        tx: &SignedTransaction,
    ) -> Result<String, ClientError> {
        let encoded = tx.to_base64()?;
        let send_config = SendConfig {
            skip_preflight: self.config.skip_preflight,
            preflight_commitment: self.config.preflight_commitment,
        };

        debug!(
            operation,
            stage = %Stage::Submit,
            bytes = tx.wire_len(),
            signers = tx.signatures.len(),
            "submitting"
        );

        match self
            .with_timeout(self.gateway.send_transaction(&encoded, &send_config))
            .await
        {
            Ok(signature) => {
                info!(operation, %signature, "transaction submitted");
                Ok(signature)
            }
            Err(e) => {
                error!(operation, stage = %Stage::Submit, error = %e, "submission failed");
                Err(classify_send_error(e))
            }
        }
    }

    async fn remote<T>(
        &self,
        operation: &'static str,
        stage: Stage,
        request: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, ClientError> {
        debug!(operation, %stage, "remote call");
        self.with_timeout(request).await.map_err(|e| {
            error!(operation, %stage, error = %e, "remote call failed");
            ClientError::rpc(stage, e)
        })
    }

    async fn with_timeout<T>(
        &self,
        request: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        let limit = self.config.request_timeout_ms;
        tokio::time::timeout(Duration::from_millis(limit), request)
            .await
            .map_err(|_| GatewayError::Timeout(limit))?
    }
}

/// Report a field the network returned that does not decode as a failure
/// of the stage that fetched it.
fn remote_decode<T>(
    operation: &'static str,
    stage: Stage,
    decoded: Result<T, BubblegumError>,
) -> Result<T, ClientError> {
    decoded.map_err(|e| {
        error!(operation, %stage, error = %e, "undecodable response field");
        ClientError::rpc(stage, GatewayError::Decode(e.detail().to_string()))
    })
}

/// Binary accounts of a mint request.
struct MintAccounts {
    tree: [u8; 32],
    tree_authority: [u8; 32],
    leaf_owner: [u8; 32],
    leaf_delegate: [u8; 32],
}

impl MintAccounts {
    fn resolve(request: &MintRequest) -> Result<Self, ClientError> {
        let tree = address_to_bytes(&request.tree)?;
        Ok(Self {
            tree,
            tree_authority: derive_tree_authority(&tree)?,
            leaf_owner: address_to_bytes(&request.leaf_owner)?,
            leaf_delegate: address_to_bytes(request.delegate())?,
        })
    }
}

/// Drop the `canopy_depth` topmost proof nodes; the tree's canopy already
/// stores them.
fn trim_canopy(proof: &mut Vec<[u8; 32]>, canopy_depth: u32) -> Result<(), ClientError> {
    if canopy_depth == 0 {
        return Ok(());
    }

    let canopy = canopy_depth as usize;
    if canopy >= proof.len() {
        return Err(ClientError::Validation(format!(
            "canopy depth {canopy_depth} leaves no proof nodes out of {}",
            proof.len()
        )));
    }

    warn!(canopy_depth, nodes = proof.len(), "trimming canopy nodes from proof");
    proof.truncate(proof.len() - canopy);
    Ok(())
}

fn classify_send_error(err: GatewayError) -> ClientError {
    if let GatewayError::Rpc {
        data: Some(data), ..
    } = &err
    {
        if let Some((index, detail)) = instruction_error(data) {
            return ClientError::Instruction { index, detail };
        }
    }
    ClientError::rpc(Stage::Submit, err)
}
