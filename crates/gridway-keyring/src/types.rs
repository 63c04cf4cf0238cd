//! Key type and signing algorithm labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::KeyringError;

/// Provenance of a key, one per [`KeyInfo`](crate::KeyInfo) variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Private key stored locally, encrypted
    #[serde(rename = "local")]
    Local,
    /// Private key held by a hardware signing device
    #[serde(rename = "ledger")]
    HardwareDevice,
    /// Private key not held by the store at all
    #[serde(rename = "offline")]
    Offline,
    /// Threshold multisig composed of other keys
    #[serde(rename = "multi")]
    MultiSig,
}

impl KeyType {
    pub const ALL: [KeyType; 4] = [
        KeyType::Local,
        KeyType::HardwareDevice,
        KeyType::Offline,
        KeyType::MultiSig,
    ];

    /// Human-readable name used in key listings
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Local => "local",
            KeyType::HardwareDevice => "ledger",
            KeyType::Offline => "offline",
            KeyType::MultiSig => "multi",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signing algorithm label. Opaque to this crate beyond its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningAlgo {
    Secp256k1,
    Ed25519,
    Sr25519,
    /// Reported by every multisig record regardless of member algorithms
    Multi,
}

impl SigningAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgo::Secp256k1 => "secp256k1",
            SigningAlgo::Ed25519 => "ed25519",
            SigningAlgo::Sr25519 => "sr25519",
            SigningAlgo::Multi => "multi",
        }
    }
}

impl fmt::Display for SigningAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgo {
    type Err = KeyringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secp256k1" => Ok(SigningAlgo::Secp256k1),
            "ed25519" => Ok(SigningAlgo::Ed25519),
            "sr25519" => Ok(SigningAlgo::Sr25519),
            "multi" => Ok(SigningAlgo::Multi),
            _ => Err(KeyringError::InvalidAlgo(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algo_names_roundtrip() {
        for algo in [
            SigningAlgo::Secp256k1,
            SigningAlgo::Ed25519,
            SigningAlgo::Sr25519,
            SigningAlgo::Multi,
        ] {
            assert_eq!(algo.as_str().parse::<SigningAlgo>().unwrap(), algo);
            assert_eq!(algo.to_string(), algo.as_str());
        }
    }

    #[test]
    fn test_unknown_algo_rejected() {
        assert!(matches!(
            "bls12381".parse::<SigningAlgo>(),
            Err(KeyringError::InvalidAlgo(name)) if name == "bls12381"
        ));
    }

    #[test]
    fn test_key_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&KeyType::HardwareDevice).unwrap(),
            "\"ledger\""
        );
        for key_type in KeyType::ALL {
            let json = serde_json::to_string(&key_type).unwrap();
            assert_eq!(json, format!("\"{}\"", key_type.as_str()));
        }
    }
}
