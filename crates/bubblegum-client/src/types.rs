use bubblegum_core::MetadataArgs;

pub use bubblegum_core::CollectionAccounts;

/// Result of a successful tree creation. Addresses are Base58.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTreeOutcome {
    pub signature: String,
    pub tree: String,
    pub tree_authority: String,
}

/// A leaf to mint into an existing tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub tree: String,
    pub leaf_owner: String,
    /// Defaults to the owner.
    pub leaf_delegate: Option<String>,
    pub metadata: MetadataArgs,
}

impl MintRequest {
    pub fn new(tree: impl Into<String>, leaf_owner: impl Into<String>, metadata: MetadataArgs) -> Self {
        Self {
            tree: tree.into(),
            leaf_owner: leaf_owner.into(),
            leaf_delegate: None,
            metadata,
        }
    }

    pub fn with_delegate(mut self, delegate: impl Into<String>) -> Self {
        self.leaf_delegate = Some(delegate.into());
        self
    }

    pub fn delegate(&self) -> &str {
        self.leaf_delegate.as_deref().unwrap_or(&self.leaf_owner)
    }
}

/// Transfer of a compressed asset to a new owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub asset_id: String,
    pub new_owner: String,
    /// Canopy depth of the asset's tree. The top `canopy_depth` proof nodes
    /// are cached on chain and are not sent.
    pub canopy_depth: u32,
}

impl TransferRequest {
    pub fn new(asset_id: impl Into<String>, new_owner: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            new_owner: new_owner.into(),
            canopy_depth: 0,
        }
    }

    pub fn with_canopy_depth(mut self, canopy_depth: u32) -> Self {
        self.canopy_depth = canopy_depth;
        self
    }
}
