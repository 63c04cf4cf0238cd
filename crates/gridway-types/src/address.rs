//! Address types for gridway

use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an account address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Human-readable prefix used when no other prefix is configured
pub const DEFAULT_BECH32_PREFIX: &str = "cosmos";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid bech32 prefix:: {0}")]
    InvalidPrefix(String),

    #[error("bech32 error:: {0}")]
    Bech32(String),

    #[error("invalid address length:: {0}")]
    InvalidLength(usize),
}

/// Account address - 20 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccAddress([u8; ADDRESS_LEN]);

impl AccAddress {
    /// Create an address from a single public key using the standard derivation
    /// ripemd160(sha256(pubkey_bytes))
    pub fn from_pubkey(pubkey_bytes: &[u8]) -> Self {
        let sha256_hash = Sha256::digest(pubkey_bytes);
        let ripemd160_hash = Ripemd160::digest(sha256_hash);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&ripemd160_hash);
        Self(bytes)
    }

    /// Create an address from a composite key encoding: sha256(bytes)[..20]
    pub fn from_truncated_hash(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
        Self(bytes)
    }

    /// Wrap raw address bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Convert to Bech32 string with the given prefix
    pub fn to_bech32(&self, hrp_str: &str) -> Result<String, AddressError> {
        let hrp =
            Hrp::parse(hrp_str).map_err(|_| AddressError::InvalidPrefix(hrp_str.to_string()))?;
        bech32::encode::<Bech32>(hrp, &self.0).map_err(|e| AddressError::Bech32(e.to_string()))
    }

    /// Parse from Bech32 string, returning the prefix alongside the address
    pub fn from_bech32(s: &str) -> Result<(String, Self), AddressError> {
        let (hrp, data) = bech32::decode(s).map_err(|e| AddressError::Bech32(e.to_string()))?;
        if data.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(data.len()));
        }
        let mut addr_bytes = [0u8; ADDRESS_LEN];
        addr_bytes.copy_from_slice(&data);
        Ok((hrp.to_string(), Self(addr_bytes)))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_bech32(DEFAULT_BECH32_PREFIX).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for AccAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, addr) = Self::from_bech32(s)?;
        Ok(addr)
    }
}
