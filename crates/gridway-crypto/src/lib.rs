//! Cryptographic primitives for gridway
//!
//! This crate provides the public key types consumed by the keyring, using
//! well-audited curve implementations from the RustCrypto and dalek projects.
//! Signing and verification are intentionally not provided here.

pub mod keys;
pub mod multisig;

pub use keys::{KeyError, PublicKey};
pub use multisig::LegacyAminoPubKey;
