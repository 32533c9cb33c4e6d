//! Orchestration of a full key hierarchy: batch generation of one-time
//! keypairs, construction of the authentication tree, and single-use
//! accounting of the leaf keys.
use crate::common::{HashAlgorithm, HashDigest};
use crate::errors::Error;
use crate::lamport::{self, OtsPrivateKey, OtsPublicKey};
use crate::merkle::MerkleTree;
use rand_core::{CryptoRng, RngCore};

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// Parameters of a key hierarchy. Validated as a whole before any key
/// material is generated, so an invalid configuration never creates
/// partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct HierarchyConfig {
    /// Number of one-time keys, i.e. the number of tree leaves. Must be
    /// a positive power of two.
    pub num_keys: usize,
    /// Bit length of the message digests the one-time keys will sign.
    /// Must be a positive multiple of 8.
    pub digest_size_bits: usize,
    /// Hash algorithm used for the one-time public keys and the tree.
    pub algorithm: HashAlgorithm,
}

impl HierarchyConfig {
    /// Check the parameters without generating anything.
    ///
    /// # Errors
    /// * `InvalidKeyCount` if `num_keys` is zero or not a power of two.
    /// * `InvalidDigestSize` if `digest_size_bits` is zero or not a
    ///   multiple of 8.
    pub fn validate(&self) -> Result<(), Error> {
        if self.num_keys == 0 || !self.num_keys.is_power_of_two() {
            return Err(Error::InvalidKeyCount(self.num_keys));
        }
        if self.digest_size_bits == 0 || self.digest_size_bits % 8 != 0 {
            return Err(Error::InvalidDigestSize(self.digest_size_bits));
        }
        Ok(())
    }
}

/// Use state of a single leaf key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub enum LeafState {
    /// The one-time key has not signed anything yet.
    Unused,
    /// The one-time key has been handed out and may never sign again.
    Used,
}

struct Leaf {
    secret: Option<OtsPrivateKey>,
    public: OtsPublicKey,
}

/// A generated key hierarchy: the ordered leaf keypairs and the Merkle
/// tree authenticating their public keys. The tree and the public keys
/// never change after generation; the only mutable state is the
/// one-way `Unused → Used` transition of each leaf.
pub struct KeyHierarchy {
    leaves: Vec<Leaf>,
    tree: MerkleTree,
    config: HierarchyConfig,
}

/// The externally reported result of a generation run, ready for
/// serialization to a structured text format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct HierarchyReport {
    /// Hex rendering of the tree root, the public key of the hierarchy.
    pub root_digest_hex: String,
    /// Height of the tree; the hierarchy can sign `2^height` messages.
    pub tree_height: u32,
    /// Identifier of the hash algorithm, as in [`HashAlgorithm::name`].
    pub hash_algorithm: String,
    /// Bit length of the message digests the leaves sign.
    pub digest_size_bits: usize,
}

impl KeyHierarchy {
    /// Generate a hierarchy: `config.num_keys` independent one-time
    /// keypairs in leaf-index order, then the tree over their public
    /// keys. Every leaf starts out `Unused`.
    ///
    /// Generation is strictly sequential and commits nothing outside
    /// the returned value, so an error (or a caller abort) leaves no
    /// partial state behind.
    ///
    /// # Errors
    /// Configuration errors from [`HierarchyConfig::validate`], or
    /// `RandomSource` if the random source fails mid-run.
    pub fn generate<R: RngCore + CryptoRng>(
        config: &HierarchyConfig,
        rng: &mut R,
    ) -> Result<Self, Error> {
        config.validate()?;

        let mut leaves = Vec::with_capacity(config.num_keys);
        for _ in 0..config.num_keys {
            let (secret, public) =
                lamport::generate(rng, config.algorithm, config.digest_size_bits)?;
            leaves.push(Leaf {
                secret: Some(secret),
                public,
            });
        }

        let public_keys: Vec<OtsPublicKey> =
            leaves.iter().map(|leaf| leaf.public.clone()).collect();
        let tree = MerkleTree::build(&public_keys, config.algorithm)?;

        Ok(KeyHierarchy {
            leaves,
            tree,
            config: *config,
        })
    }

    /// The root digest, i.e. the public key of the whole hierarchy.
    pub fn root(&self) -> &HashDigest {
        self.tree.root()
    }

    /// Height of the authentication tree.
    pub fn height(&self) -> u32 {
        self.tree.height()
    }

    /// Total number of one-time signatures the hierarchy supports,
    /// `2^height`.
    pub fn capacity(&self) -> usize {
        1 << self.tree.height()
    }

    /// Number of leaves still `Unused`.
    pub fn remaining(&self) -> usize {
        self.leaves
            .iter()
            .filter(|leaf| leaf.secret.is_some())
            .count()
    }

    /// The configuration the hierarchy was generated from.
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Use state of the leaf at `index`.
    ///
    /// # Errors
    /// Returns `LeafOutOfRange` for an index outside the hierarchy.
    pub fn leaf_state(&self, index: usize) -> Result<LeafState, Error> {
        let leaf = self.leaf(index)?;
        Ok(match leaf.secret {
            Some(_) => LeafState::Unused,
            None => LeafState::Used,
        })
    }

    /// The one-time public key at `index`.
    ///
    /// # Errors
    /// Returns `LeafOutOfRange` for an index outside the hierarchy.
    pub fn public_key(&self, index: usize) -> Result<&OtsPublicKey, Error> {
        Ok(&self.leaf(index)?.public)
    }

    /// Iterate over the one-time public keys in leaf-index order.
    pub fn public_keys(&self) -> impl Iterator<Item = &OtsPublicKey> {
        self.leaves.iter().map(|leaf| &leaf.public)
    }

    /// Consume the one-time private key at `index` for its single
    /// signing operation. The leaf transitions `Unused → Used` and the
    /// transition never reverts; ownership of the key moves to the
    /// caller, so no copy remains inside the hierarchy.
    ///
    /// # Errors
    /// * `LeafOutOfRange` for an index outside the hierarchy.
    /// * `KeyReuse` if the leaf was already consumed. Other leaves are
    ///   unaffected.
    pub fn take_signing_key(&mut self, index: usize) -> Result<OtsPrivateKey, Error> {
        let leaves = self.leaves.len();
        let leaf = self
            .leaves
            .get_mut(index)
            .ok_or(Error::LeafOutOfRange(index, leaves))?;
        leaf.secret.take().ok_or(Error::KeyReuse(index))
    }

    /// Produce the structured record describing this hierarchy.
    pub fn report(&self) -> HierarchyReport {
        HierarchyReport {
            root_digest_hex: self.tree.root().to_hex(),
            tree_height: self.tree.height(),
            hash_algorithm: self.config.algorithm.name().to_string(),
            digest_size_bits: self.config.digest_size_bits,
        }
    }

    fn leaf(&self, index: usize) -> Result<&Leaf, Error> {
        self.leaves
            .get(index)
            .ok_or_else(|| Error::LeafOutOfRange(index, self.leaves.len()))
    }
}


#[cfg(feature = "serde_enabled")]
#[cfg(test)]
mod test_serde {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn report_round_trip() {
        let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
        let config = HierarchyConfig {
            num_keys: 8,
            digest_size_bits: 256,
            algorithm: HashAlgorithm::Blake2b256,
        };
        let hierarchy = KeyHierarchy::generate(&config, &mut rng).unwrap();

        let report = hierarchy.report();
        let json = serde_json::to_string(&report).unwrap();
        let deser: HierarchyReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report, deser);
    }
}
