//! A hash-based one-time-signature key hierarchy.
//!
//! Keys are generated in the style of the key-generation phase of
//! Merkle-tree signature schemes (the XMSS/SPHINCS+ family): a batch of
//! Lamport one-time keypairs is derived from a cryptographically secure
//! random source, and the ordered one-time public keys are authenticated
//! by a binary hash tree whose root is the public key of the whole
//! hierarchy.
//!
//! "A Certified Digital Signature"
//! By Ralph C. Merkle
//! <https://doi.org/10.1007/0-387-34805-0_21>
//!
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod errors;
pub mod hierarchy;
pub mod lamport;
pub mod merkle;
