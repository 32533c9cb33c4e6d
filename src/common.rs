//! Structures common to all parts of the key hierarchy: fixed-size hash
//! digests and the pluggable hash algorithm that produces them.
use crate::errors::Error;
use blake2::digest::{Update, VariableOutput};
use blake2::VarBlake2b;
use sha3::Digest;

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// Digest size, in bytes, of the 256-bit algorithms.
pub const DIGEST_SIZE_256: usize = 32;
/// Digest size, in bytes, of the 512-bit algorithms.
pub const DIGEST_SIZE_512: usize = 64;

/// Output of a one-way hash function. The length is fixed by the
/// [`HashAlgorithm`] that produced it, and the bytes never change once
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct HashDigest(pub(crate) Vec<u8>);

impl HashDigest {
    /// Return `Self` as its byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the digest in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the digest is empty. Digests produced by a
    /// [`HashAlgorithm`] never are.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for HashDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hash algorithm backing a key hierarchy. Each variant has a fixed
/// digest size known at configuration time; hashing is pure and
/// deterministic with no failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub enum HashAlgorithm {
    /// SHA3-256, 32-byte digests.
    Sha3_256,
    /// SHA3-512, 64-byte digests. The default for quantum pre-image
    /// search headroom (Grover halves the effective security).
    Sha3_512,
    /// Blake2b with 32-byte digests.
    Blake2b256,
    /// Blake2b with 64-byte digests.
    Blake2b512,
}

impl HashAlgorithm {
    /// Digest size of this algorithm, in bytes.
    pub fn digest_size(self) -> usize {
        match self {
            HashAlgorithm::Sha3_256 | HashAlgorithm::Blake2b256 => DIGEST_SIZE_256,
            HashAlgorithm::Sha3_512 | HashAlgorithm::Blake2b512 => DIGEST_SIZE_512,
        }
    }

    /// Stable identifier of this algorithm, as reported to callers.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha3_256 => "sha3_256",
            HashAlgorithm::Sha3_512 => "sha3_512",
            HashAlgorithm::Blake2b256 => "blake2b_256",
            HashAlgorithm::Blake2b512 => "blake2b_512",
        }
    }

    /// Parse an algorithm identifier as produced by [`Self::name`].
    ///
    /// # Errors
    /// Returns an error for any identifier this crate does not provide.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            "sha3_512" => Ok(HashAlgorithm::Sha3_512),
            "blake2b_256" => Ok(HashAlgorithm::Blake2b256),
            "blake2b_512" => Ok(HashAlgorithm::Blake2b512),
            _ => Err(Error::UnknownHashAlgorithm(name.to_string())),
        }
    }

    /// Hash a byte string into a digest of [`Self::digest_size`] bytes.
    pub fn hash(self, data: &[u8]) -> HashDigest {
        self.hash_parts(&[data])
    }

    /// Hash the concatenation of two digests, in left-then-right order.
    /// This is the internal-node rule of the Merkle tree.
    pub fn hash_pair(self, left: &HashDigest, right: &HashDigest) -> HashDigest {
        self.hash_parts(&[&left.0, &right.0])
    }

    fn hash_parts(self, parts: &[&[u8]]) -> HashDigest {
        match self {
            HashAlgorithm::Sha3_256 => {
                let mut h = sha3::Sha3_256::new();
                for part in parts {
                    Digest::update(&mut h, part);
                }
                HashDigest(h.finalize().to_vec())
            }
            HashAlgorithm::Sha3_512 => {
                let mut h = sha3::Sha3_512::new();
                for part in parts {
                    Digest::update(&mut h, part);
                }
                HashDigest(h.finalize().to_vec())
            }
            HashAlgorithm::Blake2b256 => {
                let mut h = VarBlake2b::new(DIGEST_SIZE_256).expect("valid size");
                for part in parts {
                    h.update(part);
                }
                let mut out = vec![0u8; DIGEST_SIZE_256];
                h.finalize_variable(|res| out.copy_from_slice(res));
                HashDigest(out)
            }
            HashAlgorithm::Blake2b512 => {
                let mut h = VarBlake2b::new(DIGEST_SIZE_512).expect("valid size");
                for part in parts {
                    h.update(part);
                }
                let mut out = vec![0u8; DIGEST_SIZE_512];
                h.finalize_variable(|res| out.copy_from_slice(res));
                HashDigest(out)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn digest_sizes() {
        for algorithm in [
            HashAlgorithm::Sha3_256,
            HashAlgorithm::Sha3_512,
            HashAlgorithm::Blake2b256,
            HashAlgorithm::Blake2b512,
        ]
        .iter()
        {
            let digest = algorithm.hash(b"some input");
            assert_eq!(digest.len(), algorithm.digest_size());
        }
    }

    #[test]
    fn hashing_is_deterministic() {
        let d1 = HashAlgorithm::Sha3_512.hash(b"same input");
        let d2 = HashAlgorithm::Sha3_512.hash(b"same input");
        assert_eq!(d1, d2);

        let d3 = HashAlgorithm::Sha3_512.hash(b"other input");
        assert_ne!(d1, d3);
    }

    #[test]
    fn pair_hash_matches_concatenation() {
        let algorithm = HashAlgorithm::Blake2b256;
        let left = algorithm.hash(b"left");
        let right = algorithm.hash(b"right");

        let mut concatenated = left.as_bytes().to_vec();
        concatenated.extend_from_slice(right.as_bytes());

        assert_eq!(
            algorithm.hash_pair(&left, &right),
            algorithm.hash(&concatenated)
        );
    }

    #[test]
    fn pair_hash_is_order_sensitive() {
        let algorithm = HashAlgorithm::Sha3_256;
        let left = algorithm.hash(b"left");
        let right = algorithm.hash(b"right");

        assert_ne!(
            algorithm.hash_pair(&left, &right),
            algorithm.hash_pair(&right, &left)
        );
    }

    #[test]
    fn name_round_trip() {
        for algorithm in [
            HashAlgorithm::Sha3_256,
            HashAlgorithm::Sha3_512,
            HashAlgorithm::Blake2b256,
            HashAlgorithm::Blake2b512,
        ]
        .iter()
        {
            assert_eq!(HashAlgorithm::from_name(algorithm.name()), Ok(*algorithm));
        }

        assert!(matches!(
            HashAlgorithm::from_name("md5"),
            Err(Error::UnknownHashAlgorithm(_))
        ));
    }
}
