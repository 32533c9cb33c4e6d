//! The Merkle authentication tree over an ordered list of one-time
//! public keys. The root digest is the externally visible public key of
//! the whole hierarchy.
use crate::common::{HashAlgorithm, HashDigest};
use crate::errors::Error;
use crate::lamport::OtsPublicKey;

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// A complete binary hash tree over a power-of-two number of leaves.
/// Every internal node is `hash(left ‖ right)`; the leaf at index `i`
/// is the hash of the `i`-th serialized one-time public key. Immutable
/// once built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct MerkleTree {
    root: HashDigest,
    height: u32,
    leaf_count: usize,
    algorithm: HashAlgorithm,
}

impl MerkleTree {
    /// Build the tree over `leaves`, in order.
    ///
    /// A single-leaf list yields height 0 and a root equal to that
    /// leaf's digest. Rebuilding from the same ordered list with the
    /// same algorithm always reproduces the same root.
    ///
    /// # Errors
    /// Returns `InvalidTopology` if `leaves.len()` is zero or not a
    /// power of two. Odd-sized levels are never paired implicitly.
    pub fn build(leaves: &[OtsPublicKey], algorithm: HashAlgorithm) -> Result<Self, Error> {
        let leaf_digests = leaves
            .iter()
            .map(|public| algorithm.hash(&public.to_bytes()))
            .collect();
        Self::build_from_digests(leaf_digests, algorithm)
    }

    /// Build the tree over precomputed leaf digests. Used internally by
    /// [`Self::build`] and by callers that only hold leaf digests.
    ///
    /// # Errors
    /// Returns `InvalidTopology` under the same conditions as
    /// [`Self::build`].
    pub fn build_from_digests(
        leaf_digests: Vec<HashDigest>,
        algorithm: HashAlgorithm,
    ) -> Result<Self, Error> {
        let leaf_count = leaf_digests.len();
        if leaf_count == 0 || !leaf_count.is_power_of_two() {
            return Err(Error::InvalidTopology(leaf_count));
        }

        let mut level = leaf_digests;
        let mut height = 0u32;
        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| algorithm.hash_pair(&pair[0], &pair[1]))
                .collect();
            height += 1;
        }

        let root = level.swap_remove(0);
        Ok(MerkleTree {
            root,
            height,
            leaf_count,
            algorithm,
        })
    }

    /// The root digest authenticating all leaves.
    pub fn root(&self) -> &HashDigest {
        &self.root
    }

    /// Number of levels between the leaves and the root, i.e.
    /// `log2(leaf_count)`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of leaves the tree was built over.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The hash algorithm the tree was built with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}
