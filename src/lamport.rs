//! Implementation of the one-time keypairs at the leaves of the
//! hierarchy. This is the Lamport construction: one pair of secret
//! blocks per bit position of the message digest the key will later
//! sign, with the public key being the blockwise hash of the secret.
use crate::common::{HashAlgorithm, HashDigest};
use crate::errors::Error;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// A Lamport one-time private key: `2 × signature_bits` independent
/// secret blocks, each the size of one hash digest. Block `2i` answers
/// for bit value 0 at message-bit position `i`, block `2i + 1` for bit
/// value 1.
///
/// The key is safe for exactly one signing operation. It is not `Clone`
/// on purpose: the hierarchy hands it out by value exactly once, and the
/// blocks are wiped when the key is dropped.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub struct OtsPrivateKey {
    blocks: Vec<Vec<u8>>,
    signature_bits: usize,
}

/// A Lamport one-time public key: one digest pair per message-bit
/// position, preserving position and (0-secret, 1-secret) order.
/// Derived deterministically from its private key; immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct OtsPublicKey {
    pairs: Vec<(HashDigest, HashDigest)>,
}

/// Generate a one-time keypair.
///
/// `signature_bits` is the bit length of the message digests the key
/// will sign; every bit position gets two fresh secret blocks drawn
/// independently from `rng`, which must be a cryptographically secure
/// source (weak randomness here breaks unforgeability).
///
/// # Errors
/// * `InvalidDigestSize` if `signature_bits` is zero or not a multiple of 8.
/// * `RandomSource` if the random source fails; no partial key survives.
pub fn generate<R: RngCore + CryptoRng>(
    rng: &mut R,
    algorithm: HashAlgorithm,
    signature_bits: usize,
) -> Result<(OtsPrivateKey, OtsPublicKey), Error> {
    if signature_bits == 0 || signature_bits % 8 != 0 {
        return Err(Error::InvalidDigestSize(signature_bits));
    }

    let block_size = algorithm.digest_size();
    let mut blocks = Vec::with_capacity(2 * signature_bits);
    for _ in 0..2 * signature_bits {
        let mut block = vec![0u8; block_size];
        rng.try_fill_bytes(&mut block)?;
        blocks.push(block);
    }

    let secret = OtsPrivateKey {
        blocks,
        signature_bits,
    };
    let public = secret.derive_public(algorithm);
    Ok((secret, public))
}

impl OtsPrivateKey {
    /// Bit length of the message digests this key signs.
    pub fn signature_bits(&self) -> usize {
        self.signature_bits
    }

    /// Recompute the public key from the secret blocks. The result is a
    /// pure function of the key and the hash algorithm.
    pub fn derive_public(&self, algorithm: HashAlgorithm) -> OtsPublicKey {
        let pairs = self
            .blocks
            .chunks(2)
            .map(|pair| (algorithm.hash(&pair[0]), algorithm.hash(&pair[1])))
            .collect();
        OtsPublicKey { pairs }
    }
}

impl OtsPublicKey {
    /// The digest pairs, one per message-bit position.
    pub fn pairs(&self) -> &[(HashDigest, HashDigest)] {
        &self.pairs
    }

    /// Bit length of the message digests the matching private key signs.
    pub fn signature_bits(&self) -> usize {
        self.pairs.len()
    }

    /// Build a public key from digest pairs, e.g. recomputed by a
    /// verifier from revealed secret blocks.
    pub fn from_pairs(pairs: Vec<(HashDigest, HashDigest)>) -> Self {
        OtsPublicKey { pairs }
    }

    /// Serialize to the stable leaf byte layout: for each bit position
    /// in index order, the 0-digest followed by the 1-digest. This exact
    /// layout is what the Merkle tree hashes into a leaf, so it must not
    /// change across versions.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_size());
        for (zero, one) in &self.pairs {
            out.extend_from_slice(zero.as_bytes());
            out.extend_from_slice(one.as_bytes());
        }
        out
    }

    /// Parse the byte layout produced by [`Self::to_bytes`].
    ///
    /// # Errors
    /// Returns `InvalidPublicKeySize` if `bytes.len()` does not equal
    /// `signature_bits × 2 × digest_size` for the given parameters.
    pub fn from_bytes(
        bytes: &[u8],
        algorithm: HashAlgorithm,
        signature_bits: usize,
    ) -> Result<Self, Error> {
        let digest_size = algorithm.digest_size();
        if bytes.len() != signature_bits * 2 * digest_size {
            return Err(Error::InvalidPublicKeySize(bytes.len()));
        }

        let pairs = bytes
            .chunks(2 * digest_size)
            .map(|pair| {
                (
                    HashDigest(pair[..digest_size].to_vec()),
                    HashDigest(pair[digest_size..].to_vec()),
                )
            })
            .collect();
        Ok(OtsPublicKey { pairs })
    }

    /// Size of the serialized key in bytes.
    pub fn byte_size(&self) -> usize {
        self.pairs
            .iter()
            .map(|(zero, one)| zero.len() + one.len())
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn keypair_has_expected_shape() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let (secret, public) = generate(&mut rng, HashAlgorithm::Sha3_512, 512).unwrap();

        assert_eq!(secret.signature_bits(), 512);
        assert_eq!(secret.blocks.len(), 2 * 512);
        for block in &secret.blocks {
            assert_eq!(block.len(), 64);
        }
        assert_eq!(public.signature_bits(), 512);
        assert_eq!(public.byte_size(), 512 * 2 * 64);
    }

    #[test]
    fn blocks_are_independent() {
        // The secret must be 2L fresh draws, not a repeated pair.
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let (secret, _) = generate(&mut rng, HashAlgorithm::Sha3_256, 256).unwrap();

        for window in secret.blocks.windows(2) {
            assert_ne!(window[0], window[1]);
        }
        assert_ne!(secret.blocks[0], secret.blocks[2]);
    }

    #[test]
    fn public_key_is_deterministic_in_private_key() {
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
        let (secret, public) = generate(&mut rng, HashAlgorithm::Blake2b256, 256).unwrap();

        assert_eq!(secret.derive_public(HashAlgorithm::Blake2b256), public);
    }

    #[test]
    fn wire_format_is_pairwise_concatenation() {
        let algorithm = HashAlgorithm::Sha3_256;
        let pairs = vec![
            (algorithm.hash(b"zero-0"), algorithm.hash(b"one-0")),
            (algorithm.hash(b"zero-1"), algorithm.hash(b"one-1")),
        ];
        let public = OtsPublicKey::from_pairs(pairs.clone());

        let mut expected = Vec::new();
        for (zero, one) in &pairs {
            expected.extend_from_slice(zero.as_bytes());
            expected.extend_from_slice(one.as_bytes());
        }
        assert_eq!(public.to_bytes(), expected);
    }

    #[test]
    fn wire_format_round_trip() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let (_, public) = generate(&mut rng, HashAlgorithm::Sha3_256, 256).unwrap();

        let parsed =
            OtsPublicKey::from_bytes(&public.to_bytes(), HashAlgorithm::Sha3_256, 256).unwrap();
        assert_eq!(parsed, public);

        assert!(matches!(
            OtsPublicKey::from_bytes(&[0u8; 7], HashAlgorithm::Sha3_256, 256),
            Err(Error::InvalidPublicKeySize(7))
        ));
    }

    #[test]
    fn rejects_invalid_signature_bits() {
        let mut rng = ChaCha20Rng::from_seed([4u8; 32]);

        assert!(matches!(
            generate(&mut rng, HashAlgorithm::Sha3_512, 0),
            Err(Error::InvalidDigestSize(0))
        ));
        assert!(matches!(
            generate(&mut rng, HashAlgorithm::Sha3_512, 12),
            Err(Error::InvalidDigestSize(12))
        ));
    }

    #[test]
    fn surfaces_random_source_failure() {
        struct FailingRng;

        impl RngCore for FailingRng {
            fn next_u32(&mut self) -> u32 {
                0
            }
            fn next_u64(&mut self) -> u64 {
                0
            }
            fn fill_bytes(&mut self, _dest: &mut [u8]) {}
            fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
                Err(rand_core::Error::from(
                    core::num::NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
                ))
            }
        }

        impl CryptoRng for FailingRng {}

        assert!(matches!(
            generate(&mut FailingRng, HashAlgorithm::Sha3_256, 256),
            Err(Error::RandomSource(_))
        ));
    }
}
