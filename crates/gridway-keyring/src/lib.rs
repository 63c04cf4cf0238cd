//! Key metadata for gridway
//!
//! This crate describes the keys a signing identity store manages: who the
//! key belongs to, its public key, and where the private half lives (locally
//! encrypted, on a hardware device, offline, or spread across a threshold
//! multisig). Records are immutable once built and are persisted through the
//! [`InfoCodec`] discriminated binary codec.
//!
//! Private key material, signing, and persistence are left to the store.

use gridway_types::AddressError;
use thiserror::Error;

pub mod codec;
pub mod config;
pub mod hd;
pub mod info;
pub mod output;
pub mod types;

pub use codec::{DiscriminantTable, InfoCodec};
pub use config::{CodecConfig, ConfigError};
pub use hd::Bip44Params;
pub use info::{
    HardwareDeviceInfo, KeyInfo, LocalInfo, MultiSigInfo, MultisigPubKeyInfo, OfflineInfo,
};
pub use output::{KeyOutput, MemberOutput};
pub use types::{KeyType, SigningAlgo};

#[derive(Error, Debug)]
pub enum KeyringError {
    /// Only hardware-device keys carry a derivation path. Callers are expected
    /// to check [`KeyInfo::key_type`] first; this is not a fault.
    #[error("BIP44 paths are not available for this key type")]
    PathUnavailable,

    #[error("unknown key info variant:: 0x{0:02x}")]
    UnknownVariant(u8),

    #[error("truncated input:: expected {expected} bytes, {available} available")]
    TruncatedInput { expected: usize, available: usize },

    #[error("trailing bytes:: expected {expected} bytes, {available} available")]
    TrailingBytes { expected: usize, available: usize },

    #[error("malformed field {field}:: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("not a multisig key:: {0}")]
    NotAMultisigKey(String),

    #[error("invalid derivation path:: {0}")]
    InvalidPath(String),

    #[error("invalid signing algorithm:: {0}")]
    InvalidAlgo(String),

    #[error("address error:: {0}")]
    Address(#[from] AddressError),

    #[error("serialization error:: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KeyringError {
    /// Whether this is the expected "no path for this key type" outcome
    pub fn is_path_unavailable(&self) -> bool {
        matches!(self, KeyringError::PathUnavailable)
    }

    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        KeyringError::MalformedField {
            field,
            reason: reason.into(),
        }
    }
}
