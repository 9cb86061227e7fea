//! Bubblegum instruction builders.
//!
//! Each builder returns a plain [`Instruction`]: the program id, the ordered
//! account list the on-chain handler expects, and the Anchor-style payload
//! (8-byte discriminator followed by Borsh arguments).

use borsh::BorshSerialize;

use crate::error::BubblegumError;
use crate::metadata::MetadataArgs;
use crate::pda::{
    derive_bubblegum_signer, derive_master_edition_address, derive_metadata_address,
};
use crate::programs::{
    ACCOUNT_COMPRESSION_PROGRAM_ID, BUBBLEGUM_PROGRAM_ID, NOOP_PROGRAM_ID, SYSTEM_PROGRAM_ID,
    TOKEN_METADATA_PROGRAM_ID,
};
use crate::transaction::{AccountMeta, Instruction};

/// `sha256("global:create_tree")[..8]`
pub const CREATE_TREE_CONFIG_DISCRIMINATOR: [u8; 8] = [165, 83, 136, 142, 89, 202, 47, 220];
/// `sha256("global:mint_v1")[..8]`
pub const MINT_V1_DISCRIMINATOR: [u8; 8] = [145, 98, 192, 118, 184, 147, 118, 104];
/// `sha256("global:mint_to_collection_v1")[..8]`
pub const MINT_TO_COLLECTION_V1_DISCRIMINATOR: [u8; 8] = [153, 18, 178, 47, 197, 158, 86, 15];
/// `sha256("global:transfer")[..8]`
pub const TRANSFER_DISCRIMINATOR: [u8; 8] = [163, 52, 200, 231, 140, 3, 69, 186];

/// System Program `CreateAccount` instruction index (little-endian u32).
const SYSTEM_CREATE_ACCOUNT_IX_INDEX: u32 = 0;

#[derive(BorshSerialize)]
struct CreateTreeConfigArgs {
    max_depth: u32,
    max_buffer_size: u32,
    public: Option<bool>,
}

#[derive(BorshSerialize)]
struct TransferArgs {
    root: [u8; 32],
    data_hash: [u8; 32],
    creator_hash: [u8; 32],
    nonce: u64,
    index: u32,
}

/// Collection accounts for `mint_to_collection_v1`.
///
/// `metadata` and `master_edition` may be left `None`, in which case they
/// are derived from `mint` with the Token Metadata seeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionAccounts {
    pub authority: [u8; 32],
    pub mint: [u8; 32],
    pub metadata: Option<[u8; 32]>,
    pub master_edition: Option<[u8; 32]>,
}

impl CollectionAccounts {
    pub fn new(authority: [u8; 32], mint: [u8; 32]) -> Self {
        Self {
            authority,
            mint,
            metadata: None,
            master_edition: None,
        }
    }

    /// Metadata and master edition, deriving whichever was not supplied.
    pub fn resolve(&self) -> Result<([u8; 32], [u8; 32]), BubblegumError> {
        let metadata = match self.metadata {
            Some(metadata) => metadata,
            None => derive_metadata_address(&self.mint)?,
        };
        let master_edition = match self.master_edition {
            Some(edition) => edition,
            None => derive_master_edition_address(&self.mint)?,
        };
        Ok((metadata, master_edition))
    }
}

/// Accounts of a leaf being transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAccounts {
    pub tree_authority: [u8; 32],
    pub leaf_owner: [u8; 32],
    pub leaf_delegate: [u8; 32],
    pub new_leaf_owner: [u8; 32],
    pub merkle_tree: [u8; 32],
}

/// The leaf being transferred and the proof that it is in the tree.
///
/// `proof` holds the sibling nodes exactly as the indexer returned them
/// (minus any canopy-cached nodes); order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafProof {
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub nonce: u64,
    pub index: u32,
    pub proof: Vec<[u8; 32]>,
}

fn instruction_data<T: BorshSerialize>(
    discriminator: [u8; 8],
    args: &T,
) -> Result<Vec<u8>, BubblegumError> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)
        .map_err(|e| BubblegumError::Encoding(e.to_string()))?;
    Ok(data)
}

/// System Program `CreateAccount`: fund and allocate `space` bytes for
/// `new_account`, owned by `owner`.
///
/// Data: u32 LE index (0) + u64 LE lamports + u64 LE space + owner = 52 bytes.
pub fn create_account(
    payer: &[u8; 32],
    new_account: &[u8; 32],
    lamports: u64,
    space: u64,
    owner: &[u8; 32],
) -> Instruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&SYSTEM_CREATE_ACCOUNT_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner);

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(*new_account, true),
        ],
        data,
    }
}

/// Bubblegum `create_tree`: initialize the tree config for an allocated
/// Merkle tree account. The payer also acts as tree creator.
pub fn create_tree_config(
    tree_authority: &[u8; 32],
    merkle_tree: &[u8; 32],
    payer: &[u8; 32],
    max_depth: u32,
    max_buffer_size: u32,
    public: bool,
) -> Result<Instruction, BubblegumError> {
    let data = instruction_data(
        CREATE_TREE_CONFIG_DISCRIMINATOR,
        &CreateTreeConfigArgs {
            max_depth,
            max_buffer_size,
            public: Some(public),
        },
    )?;

    Ok(Instruction {
        program_id: BUBBLEGUM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*tree_authority, false),
            AccountMeta::writable(*merkle_tree, false),
            AccountMeta::writable(*payer, true),
            AccountMeta::readonly(*payer, true),
            AccountMeta::readonly(NOOP_PROGRAM_ID, false),
            AccountMeta::readonly(ACCOUNT_COMPRESSION_PROGRAM_ID, false),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    })
}

/// Both instructions of a tree creation, in order: allocate the tree
/// account (`account_size` bytes funded with `rent_lamports`, owned by the
/// compression program), then initialize its Bubblegum config.
#[allow(clippy::too_many_arguments)]
pub fn create_tree(
    tree_authority: &[u8; 32],
    merkle_tree: &[u8; 32],
    payer: &[u8; 32],
    max_depth: u32,
    max_buffer_size: u32,
    public: bool,
    rent_lamports: u64,
    account_size: u64,
) -> Result<Vec<Instruction>, BubblegumError> {
    Ok(vec![
        create_account(
            payer,
            merkle_tree,
            rent_lamports,
            account_size,
            &ACCOUNT_COMPRESSION_PROGRAM_ID,
        ),
        create_tree_config(
            tree_authority,
            merkle_tree,
            payer,
            max_depth,
            max_buffer_size,
            public,
        )?,
    ])
}

/// Bubblegum `mint_v1`: append a leaf owned by `leaf_owner` to the tree.
/// The payer signs as tree creator (or tree delegate).
pub fn mint_v1(
    tree_authority: &[u8; 32],
    leaf_owner: &[u8; 32],
    leaf_delegate: &[u8; 32],
    merkle_tree: &[u8; 32],
    payer: &[u8; 32],
    metadata: &MetadataArgs,
) -> Result<Instruction, BubblegumError> {
    let mut data = MINT_V1_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&metadata.encode()?);

    Ok(Instruction {
        program_id: BUBBLEGUM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*tree_authority, false),
            AccountMeta::readonly(*leaf_owner, false),
            AccountMeta::readonly(*leaf_delegate, false),
            AccountMeta::writable(*merkle_tree, false),
            AccountMeta::writable(*payer, true),
            AccountMeta::readonly(*payer, true),
            AccountMeta::readonly(NOOP_PROGRAM_ID, false),
            AccountMeta::readonly(ACCOUNT_COMPRESSION_PROGRAM_ID, false),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    })
}

/// Bubblegum `mint_to_collection_v1`: mint a leaf and verify it as a member
/// of `collection` in the same instruction.
///
/// No collection authority record is used; Bubblegum expects its own
/// program id in that slot.
pub fn mint_to_collection_v1(
    tree_authority: &[u8; 32],
    leaf_owner: &[u8; 32],
    leaf_delegate: &[u8; 32],
    merkle_tree: &[u8; 32],
    payer: &[u8; 32],
    collection: &CollectionAccounts,
    metadata: &MetadataArgs,
) -> Result<Instruction, BubblegumError> {
    let (collection_metadata, collection_edition) = collection.resolve()?;
    let bubblegum_signer = derive_bubblegum_signer()?;

    let mut data = MINT_TO_COLLECTION_V1_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&metadata.encode()?);

    Ok(Instruction {
        program_id: BUBBLEGUM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*tree_authority, false),
            AccountMeta::readonly(*leaf_owner, false),
            AccountMeta::readonly(*leaf_delegate, false),
            AccountMeta::writable(*merkle_tree, false),
            AccountMeta::writable(*payer, true),
            AccountMeta::readonly(*payer, true),
            AccountMeta::readonly(collection.authority, true),
            AccountMeta::readonly(BUBBLEGUM_PROGRAM_ID, false),
            AccountMeta::readonly(collection.mint, false),
            AccountMeta::writable(collection_metadata, false),
            AccountMeta::readonly(collection_edition, false),
            AccountMeta::readonly(bubblegum_signer, false),
            AccountMeta::readonly(NOOP_PROGRAM_ID, false),
            AccountMeta::readonly(ACCOUNT_COMPRESSION_PROGRAM_ID, false),
            AccountMeta::readonly(TOKEN_METADATA_PROGRAM_ID, false),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    })
}

/// Bubblegum `transfer`: move a leaf to `new_leaf_owner`.
///
/// The owner signs. The delegate only signs when it is the owner itself.
/// Proof nodes are appended as read-only remaining accounts in the given
/// order; they are not part of the payload.
pub fn transfer(
    accounts: &TransferAccounts,
    leaf: &LeafProof,
) -> Result<Instruction, BubblegumError> {
    if leaf.proof.is_empty() {
        return Err(BubblegumError::Validation(
            "transfer requires a non-empty proof".into(),
        ));
    }

    let data = instruction_data(
        TRANSFER_DISCRIMINATOR,
        &TransferArgs {
            root: leaf.root,
            data_hash: leaf.data_hash,
            creator_hash: leaf.creator_hash,
            nonce: leaf.nonce,
            index: leaf.index,
        },
    )?;

    let delegate_signs = accounts.leaf_delegate == accounts.leaf_owner;

    let mut metas = Vec::with_capacity(8 + leaf.proof.len());
    metas.extend([
        AccountMeta::readonly(accounts.tree_authority, false),
        AccountMeta::readonly(accounts.leaf_owner, true),
        AccountMeta::readonly(accounts.leaf_delegate, delegate_signs),
        AccountMeta::readonly(accounts.new_leaf_owner, false),
        AccountMeta::writable(accounts.merkle_tree, false),
        AccountMeta::readonly(NOOP_PROGRAM_ID, false),
        AccountMeta::readonly(ACCOUNT_COMPRESSION_PROGRAM_ID, false),
        AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
    ]);
    metas.extend(
        leaf.proof
            .iter()
            .map(|node| AccountMeta::readonly(*node, false)),
    );

    Ok(Instruction {
        program_id: BUBBLEGUM_PROGRAM_ID,
        accounts: metas,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Creator, MetadataArgs};
    use borsh::BorshDeserialize;
    use sha2::{Digest, Sha256};

    const TREE: [u8; 32] = [0x10; 32];
    const AUTHORITY: [u8; 32] = [0x20; 32];
    const PAYER: [u8; 32] = [0x30; 32];
    const OWNER: [u8; 32] = [0x40; 32];
    const DELEGATE: [u8; 32] = [0x50; 32];

    fn anchor_discriminator(name: &str) -> [u8; 8] {
        let hash = Sha256::digest(format!("global:{name}").as_bytes());
        let mut out = [0u8; 8];
        out.copy_from_slice(&hash[..8]);
        out
    }

    fn metadata() -> MetadataArgs {
        let mut args = MetadataArgs::new("Leaf", "LF", "https://example.com/leaf.json");
        args.creators = vec![Creator {
            address: PAYER,
            verified: false,
            share: 100,
        }];
        args
    }

    fn leaf(proof: Vec<[u8; 32]>) -> LeafProof {
        LeafProof {
            root: [1; 32],
            data_hash: [2; 32],
            creator_hash: [3; 32],
            nonce: 42,
            index: 42,
            proof,
        }
    }

    fn transfer_accounts() -> TransferAccounts {
        TransferAccounts {
            tree_authority: AUTHORITY,
            leaf_owner: OWNER,
            leaf_delegate: OWNER,
            new_leaf_owner: DELEGATE,
            merkle_tree: TREE,
        }
    }

    #[test]
    fn discriminators_follow_anchor_convention() {
        assert_eq!(CREATE_TREE_CONFIG_DISCRIMINATOR, anchor_discriminator("create_tree"));
        assert_eq!(MINT_V1_DISCRIMINATOR, anchor_discriminator("mint_v1"));
        assert_eq!(
            MINT_TO_COLLECTION_V1_DISCRIMINATOR,
            anchor_discriminator("mint_to_collection_v1")
        );
        assert_eq!(TRANSFER_DISCRIMINATOR, anchor_discriminator("transfer"));
    }

    #[test]
    fn create_account_layout() {
        let ix = create_account(&PAYER, &TREE, 1_000, 528_958, &ACCOUNT_COMPRESSION_PROGRAM_ID);
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.data.len(), 52);
        assert_eq!(&ix.data[..4], &[0, 0, 0, 0]);
        assert_eq!(&ix.data[4..12], &1_000u64.to_le_bytes());
        assert_eq!(&ix.data[12..20], &528_958u64.to_le_bytes());
        assert_eq!(&ix.data[20..], &ACCOUNT_COMPRESSION_PROGRAM_ID);
        assert!(ix.accounts.iter().all(|m| m.is_signer && m.is_writable));
    }

    #[test]
    fn create_tree_config_payload() {
        let ix = create_tree_config(&AUTHORITY, &TREE, &PAYER, 14, 64, true).unwrap();

        let mut expected = CREATE_TREE_CONFIG_DISCRIMINATOR.to_vec();
        expected.extend_from_slice(&14u32.to_le_bytes());
        expected.extend_from_slice(&64u32.to_le_bytes());
        expected.extend_from_slice(&[1, 1]);
        assert_eq!(ix.data, expected);

        let private = create_tree_config(&AUTHORITY, &TREE, &PAYER, 14, 64, false).unwrap();
        assert_eq!(&private.data[16..], &[1, 0]);
    }

    #[test]
    fn create_tree_config_hex_fixture() {
        let ix = create_tree_config(&AUTHORITY, &TREE, &PAYER, 14, 64, false).unwrap();
        assert_eq!(hex::encode(&ix.data), "a553888e59ca2fdc0e000000400000000100");
    }

    #[test]
    fn create_tree_config_accounts() {
        let ix = create_tree_config(&AUTHORITY, &TREE, &PAYER, 14, 64, false).unwrap();
        assert_eq!(ix.program_id, BUBBLEGUM_PROGRAM_ID);
        assert_eq!(ix.accounts.len(), 7);
        assert_eq!(ix.accounts[0], AccountMeta::writable(AUTHORITY, false));
        assert_eq!(ix.accounts[1], AccountMeta::writable(TREE, false));
        assert_eq!(ix.accounts[2], AccountMeta::writable(PAYER, true));
        assert_eq!(ix.accounts[3], AccountMeta::readonly(PAYER, true));
        assert_eq!(ix.accounts[4].pubkey, NOOP_PROGRAM_ID);
        assert_eq!(ix.accounts[5].pubkey, ACCOUNT_COMPRESSION_PROGRAM_ID);
        assert_eq!(ix.accounts[6].pubkey, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn create_tree_allocates_before_config() {
        let ixs = create_tree(&AUTHORITY, &TREE, &PAYER, 14, 64, false, 7_000, 528_958).unwrap();
        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ixs[1].program_id, BUBBLEGUM_PROGRAM_ID);
    }

    #[test]
    fn mint_v1_payload_decodes_to_metadata() {
        let args = metadata();
        let ix = mint_v1(&AUTHORITY, &OWNER, &DELEGATE, &TREE, &PAYER, &args).unwrap();

        assert_eq!(&ix.data[..8], &MINT_V1_DISCRIMINATOR);
        let decoded = MetadataArgs::try_from_slice(&ix.data[8..]).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn mint_v1_accounts() {
        let ix = mint_v1(&AUTHORITY, &OWNER, &DELEGATE, &TREE, &PAYER, &metadata()).unwrap();
        let keys: Vec<[u8; 32]> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(
            keys,
            vec![
                AUTHORITY,
                OWNER,
                DELEGATE,
                TREE,
                PAYER,
                PAYER,
                NOOP_PROGRAM_ID,
                ACCOUNT_COMPRESSION_PROGRAM_ID,
                SYSTEM_PROGRAM_ID
            ]
        );
        assert!(ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[3].is_writable);
        assert!(ix.accounts[4].is_signer);
    }

    #[test]
    fn mint_v1_rejects_invalid_metadata() {
        let mut args = metadata();
        args.creators[0].share = 99;
        let err = mint_v1(&AUTHORITY, &OWNER, &DELEGATE, &TREE, &PAYER, &args).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn mint_to_collection_derives_missing_accounts() {
        let mint = [0x60u8; 32];
        let collection = CollectionAccounts::new(PAYER, mint);
        let ix = mint_to_collection_v1(
            &AUTHORITY,
            &OWNER,
            &OWNER,
            &TREE,
            &PAYER,
            &collection,
            &metadata(),
        )
        .unwrap();

        assert_eq!(ix.accounts.len(), 16);
        assert_eq!(&ix.data[..8], &MINT_TO_COLLECTION_V1_DISCRIMINATOR);
        assert_eq!(ix.accounts[6], AccountMeta::readonly(PAYER, true));
        assert_eq!(ix.accounts[7], AccountMeta::readonly(BUBBLEGUM_PROGRAM_ID, false));
        assert_eq!(ix.accounts[8].pubkey, mint);
        assert_eq!(
            ix.accounts[9],
            AccountMeta::writable(derive_metadata_address(&mint).unwrap(), false)
        );
        assert_eq!(
            ix.accounts[10].pubkey,
            derive_master_edition_address(&mint).unwrap()
        );
        assert_eq!(ix.accounts[11].pubkey, derive_bubblegum_signer().unwrap());
        assert_eq!(ix.accounts[14].pubkey, TOKEN_METADATA_PROGRAM_ID);
    }

    #[test]
    fn mint_to_collection_keeps_supplied_accounts() {
        let mut collection = CollectionAccounts::new(PAYER, [0x60u8; 32]);
        collection.metadata = Some([0x61u8; 32]);
        collection.master_edition = Some([0x62u8; 32]);

        let ix = mint_to_collection_v1(
            &AUTHORITY,
            &OWNER,
            &OWNER,
            &TREE,
            &PAYER,
            &collection,
            &metadata(),
        )
        .unwrap();

        assert_eq!(ix.accounts[9].pubkey, [0x61u8; 32]);
        assert_eq!(ix.accounts[10].pubkey, [0x62u8; 32]);
    }

    #[test]
    fn transfer_payload_layout() {
        let ix = transfer(&transfer_accounts(), &leaf(vec![[9; 32]])).unwrap();

        assert_eq!(ix.data.len(), 8 + 32 * 3 + 8 + 4);
        assert_eq!(&ix.data[..8], &TRANSFER_DISCRIMINATOR);
        assert_eq!(&ix.data[8..40], &[1; 32]);
        assert_eq!(&ix.data[40..72], &[2; 32]);
        assert_eq!(&ix.data[72..104], &[3; 32]);
        assert_eq!(&ix.data[104..112], &42u64.to_le_bytes());
        assert_eq!(&ix.data[112..], &42u32.to_le_bytes());
    }

    #[test]
    fn transfer_appends_proof_in_order() {
        let proof = vec![[0xA1; 32], [0xA2; 32], [0xA3; 32]];
        let ix = transfer(&transfer_accounts(), &leaf(proof.clone())).unwrap();

        assert_eq!(ix.accounts.len(), 8 + 3);
        let tail: Vec<[u8; 32]> = ix.accounts[8..].iter().map(|m| m.pubkey).collect();
        assert_eq!(tail, proof);
        assert!(ix.accounts[8..].iter().all(|m| !m.is_signer && !m.is_writable));
    }

    #[test]
    fn transfer_signer_flags() {
        let ix = transfer(&transfer_accounts(), &leaf(vec![[9; 32]])).unwrap();
        assert!(ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer);
        assert!(!ix.accounts[0].is_writable);
        assert!(ix.accounts[4].is_writable);

        let mut accounts = transfer_accounts();
        accounts.leaf_delegate = DELEGATE;
        let ix = transfer(&accounts, &leaf(vec![[9; 32]])).unwrap();
        assert!(ix.accounts[1].is_signer);
        assert!(!ix.accounts[2].is_signer);
    }

    #[test]
    fn transfer_with_empty_proof_fails() {
        let err = transfer(&transfer_accounts(), &leaf(vec![])).unwrap_err();
        assert!(err.is_validation());
    }
}
