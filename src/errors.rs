//! Errors specific to key hierarchy construction and consumption.
use std::error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enum of errors associated with building and consuming a key hierarchy.
pub enum Error {
    /// Error occurs when the configured signature bit length is zero or
    /// not a multiple of 8.
    InvalidDigestSize(usize),
    /// Error occurs when the configured number of one-time keys is zero
    /// or not a power of two.
    InvalidKeyCount(usize),
    /// Error occurs when a hash algorithm identifier is not recognised.
    UnknownHashAlgorithm(String),
    /// Error occurs when a Merkle tree is built over a leaf list whose
    /// size is zero or not a power of two. Such lists are rejected,
    /// never padded or truncated.
    InvalidTopology(usize),
    /// This error occurs when a one-time key that has already been
    /// consumed is requested a second time. The offending leaf stays
    /// unusable; the rest of the hierarchy is unaffected.
    KeyReuse(usize),
    /// Error occurs when a leaf index is outside the hierarchy. Carries
    /// the requested index and the number of leaves.
    LeafOutOfRange(usize, usize),
    /// This error occurs when the cryptographically secure random source
    /// fails during key generation. No partial keys survive; the run may
    /// be retried from scratch.
    RandomSource(String),
    /// Error occurs when the size of a serialized one-time public key is
    /// not the expected.
    InvalidPublicKeySize(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDigestSize(bits) => write!(
                f,
                "signature bit length must be a positive multiple of 8, got {}",
                bits
            ),
            Error::InvalidKeyCount(count) => write!(
                f,
                "number of one-time keys must be a positive power of two, got {}",
                count
            ),
            Error::UnknownHashAlgorithm(name) => {
                write!(f, "unknown hash algorithm identifier '{}'", name)
            }
            Error::InvalidTopology(count) => write!(
                f,
                "merkle tree requires a positive power-of-two leaf count, got {}",
                count
            ),
            Error::KeyReuse(index) => {
                write!(f, "one-time key at leaf {} has already been consumed", index)
            }
            Error::LeafOutOfRange(index, leaves) => write!(
                f,
                "leaf index {} out of range for a hierarchy of {} leaves",
                index, leaves
            ),
            Error::RandomSource(reason) => {
                write!(f, "random source failure: {}", reason)
            }
            Error::InvalidPublicKeySize(size) => {
                write!(f, "serialized one-time public key has invalid size {}", size)
            }
        }
    }
}

impl error::Error for Error {}

impl From<rand_core::Error> for Error {
    fn from(e: rand_core::Error) -> Error {
        Error::RandomSource(format!("{:?}", e))
    }
}
