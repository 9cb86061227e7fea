//! Concurrent Merkle tree parameters and account sizing.
//!
//! The tree account is allocated once, by the System Program, before
//! Bubblegum initializes its config. Its size is fixed by the tree's
//! parameters and can never grow afterwards, so it must be exact.
//!
//! ```text
//! size = 8                              discriminator
//!      + 54                             header
//!      + max_buffer_size * 72           changelog entries
//!      + 2^max_depth * 32               one hash per leaf slot
//!      + (2^(canopy_depth + 1) - 2) * 32  canopy nodes
//! ```

use crate::error::BubblegumError;

pub const DISCRIMINATOR_SIZE: u64 = 8;
pub const HEADER_SIZE: u64 = 54;
pub const CHANGELOG_ENTRY_SIZE: u64 = 72;
pub const NODE_SIZE: u64 = 32;

/// Smallest depth Bubblegum accepts.
pub const MIN_DEPTH: u32 = 3;

/// (max_depth, max_buffer_size) pairs the account compression program
/// ships with.
pub const SUPPORTED_DEPTH_BUFFER_PAIRS: &[(u32, u32)] = &[
    (3, 8),
    (5, 8),
    (6, 16),
    (7, 16),
    (8, 16),
    (9, 16),
    (10, 32),
    (11, 32),
    (12, 32),
    (13, 32),
    (14, 64),
    (14, 256),
    (14, 1024),
    (14, 2048),
    (15, 64),
    (16, 64),
    (17, 64),
    (18, 64),
    (19, 64),
    (20, 64),
    (20, 256),
    (20, 1024),
    (20, 2048),
    (24, 64),
    (24, 256),
    (24, 512),
    (24, 1024),
    (24, 2048),
    (26, 512),
    (26, 1024),
    (26, 2048),
    (30, 512),
    (30, 1024),
    (30, 2048),
];

/// Shape of a concurrent Merkle tree, fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleTreeParams {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
}

impl MerkleTreeParams {
    pub fn new(max_depth: u32, max_buffer_size: u32) -> Self {
        Self {
            max_depth,
            max_buffer_size,
            canopy_depth: 0,
        }
    }

    pub fn with_canopy(mut self, canopy_depth: u32) -> Self {
        self.canopy_depth = canopy_depth;
        self
    }

    /// Reject parameters Bubblegum can never initialize.
    pub fn validate(&self) -> Result<(), BubblegumError> {
        if self.max_depth < MIN_DEPTH {
            return Err(BubblegumError::Validation(format!(
                "max_depth must be >= {MIN_DEPTH}, got {}",
                self.max_depth
            )));
        }
        if self.max_buffer_size == 0 {
            return Err(BubblegumError::Validation(
                "max_buffer_size must be >= 1".into(),
            ));
        }
        if self.canopy_depth >= self.max_depth {
            return Err(BubblegumError::Validation(format!(
                "canopy_depth {} must be below max_depth {}",
                self.canopy_depth, self.max_depth
            )));
        }
        Ok(())
    }

    /// Whether the (depth, buffer) pair is one the compression program ships.
    pub fn is_supported_pair(&self) -> bool {
        SUPPORTED_DEPTH_BUFFER_PAIRS.contains(&(self.max_depth, self.max_buffer_size))
    }

    /// Number of leaves the tree can hold.
    pub fn capacity(&self) -> u64 {
        2u64.saturating_pow(self.max_depth)
    }

    pub fn account_size(&self) -> u64 {
        merkle_tree_account_size(self.max_depth, self.max_buffer_size, self.canopy_depth)
    }
}

/// Byte length of a concurrent Merkle tree account.
///
/// Total over every input: terms saturate at `u64::MAX` instead of
/// wrapping, which keeps the result monotone in each parameter.
pub fn merkle_tree_account_size(max_depth: u32, max_buffer_size: u32, canopy_depth: u32) -> u64 {
    DISCRIMINATOR_SIZE
        .saturating_add(HEADER_SIZE)
        .saturating_add(changelog_size(max_buffer_size))
        .saturating_add(leaf_layer_size(max_depth))
        .saturating_add(canopy_size(canopy_depth))
}

fn changelog_size(max_buffer_size: u32) -> u64 {
    u64::from(max_buffer_size).saturating_mul(CHANGELOG_ENTRY_SIZE)
}

fn leaf_layer_size(max_depth: u32) -> u64 {
    2u64.saturating_pow(max_depth).saturating_mul(NODE_SIZE)
}

/// Canopy stores every node of the top `canopy_depth` levels below the root.
fn canopy_size(canopy_depth: u32) -> u64 {
    2u64.saturating_pow(canopy_depth.saturating_add(1))
        .saturating_sub(2)
        .saturating_mul(NODE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_14_buffer_64_fixture() {
        // 8 + 54 + 64*72 + 2^14*32
        assert_eq!(merkle_tree_account_size(14, 64, 0), 8 + 54 + 4_608 + 524_288);
        assert_eq!(merkle_tree_account_size(14, 64, 0), 528_958);
    }

    #[test]
    fn zero_canopy_contributes_nothing() {
        assert_eq!(canopy_size(0), 0);
        for depth in 3..=20 {
            assert_eq!(
                merkle_tree_account_size(depth, 64, 0),
                DISCRIMINATOR_SIZE + HEADER_SIZE + changelog_size(64) + leaf_layer_size(depth)
            );
        }
    }

    #[test]
    fn canopy_counts_all_upper_nodes() {
        // depth 1: 2 nodes, depth 2: 2 + 4 nodes, depth 3: 2 + 4 + 8 nodes.
        assert_eq!(canopy_size(1), 2 * 32);
        assert_eq!(canopy_size(2), 6 * 32);
        assert_eq!(canopy_size(3), 14 * 32);
    }

    #[test]
    fn degenerate_inputs_follow_formula() {
        assert_eq!(merkle_tree_account_size(0, 0, 0), 8 + 54 + 32);
    }

    #[test]
    fn depth_30_does_not_overflow() {
        let size = merkle_tree_account_size(30, 2048, 17);
        let expected = 8 + 54 + 2048 * 72 + (1u64 << 30) * 32 + ((1u64 << 18) - 2) * 32;
        assert_eq!(size, expected);
    }

    #[test]
    fn absurd_inputs_saturate() {
        assert_eq!(merkle_tree_account_size(200, u32::MAX, 200), u64::MAX);
    }

    #[test]
    fn monotone_in_each_parameter() {
        for depth in 0..40 {
            for buffer in [0u32, 1, 8, 64, 2048] {
                for canopy in 0..12 {
                    let base = merkle_tree_account_size(depth, buffer, canopy);
                    assert!(merkle_tree_account_size(depth + 1, buffer, canopy) >= base);
                    assert!(merkle_tree_account_size(depth, buffer + 1, canopy) >= base);
                    assert!(merkle_tree_account_size(depth, buffer, canopy + 1) >= base);
                }
            }
        }
    }

    #[test]
    fn params_validation() {
        assert!(MerkleTreeParams::new(14, 64).validate().is_ok());
        assert!(MerkleTreeParams::new(2, 8).validate().is_err());
        assert!(MerkleTreeParams::new(14, 0).validate().is_err());
        assert!(MerkleTreeParams::new(14, 64).with_canopy(14).validate().is_err());
        assert!(MerkleTreeParams::new(14, 64).with_canopy(10).validate().is_ok());
    }

    #[test]
    fn supported_pairs() {
        assert!(MerkleTreeParams::new(14, 64).is_supported_pair());
        assert!(!MerkleTreeParams::new(14, 65).is_supported_pair());
    }

    #[test]
    fn params_size_and_capacity() {
        let params = MerkleTreeParams::new(14, 64).with_canopy(3);
        assert_eq!(params.capacity(), 16_384);
        assert_eq!(params.account_size(), 528_958 + 14 * 32);
    }
}
