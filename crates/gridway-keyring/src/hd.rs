//! BIP44 derivation paths for hardware-device keys
//!
//! A hardware device key is identified by its BIP44 path:
//! `m / purpose' / coin_type' / account' / change / address_index`.
//! Standard Cosmos derivation path: m/44'/118'/0'/0/0
//!
//! Reference: https://github.com/bitcoin/bips/blob/master/bip-0044.mediawiki

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::KeyringError;

/// BIP44 purpose constant
pub const BIP44_PURPOSE: u32 = 44;

/// Cosmos SDK coin type as defined in SLIP-0044
/// https://github.com/satoshilabs/slips/blob/master/slip-0044.md
pub const COSMOS_COIN_TYPE: u32 = 118;

/// Standard Cosmos HD derivation path: m/44'/118'/0'/0/0
pub const COSMOS_HD_PATH: &str = "m/44'/118'/0'/0/0";

const HARDENED_BIT: u32 = 1 << 31;

/// HD derivation path component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathComponent {
    index: u32,
    hardened: bool,
}

impl PathComponent {
    fn parse(component: &str) -> Result<Self, KeyringError> {
        let (index_str, hardened) = match component.strip_suffix(&['\'', 'h'][..]) {
            Some(stripped) => (stripped, true),
            None => (component, false),
        };

        let index = index_str.parse::<u32>().map_err(|_| {
            KeyringError::InvalidPath(format!("invalid path component:: {component}"))
        })?;

        if index >= HARDENED_BIT {
            return Err(KeyringError::InvalidPath(format!(
                "path component out of range:: {component}"
            )));
        }

        Ok(PathComponent { index, hardened })
    }
}

/// BIP44 parameters of a hardware-device key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip44Params {
    pub purpose: u32,
    pub coin_type: u32,
    pub account: u32,
    pub change: bool,
    pub address_index: u32,
}

impl Bip44Params {
    pub fn new(
        purpose: u32,
        coin_type: u32,
        account: u32,
        change: bool,
        address_index: u32,
    ) -> Self {
        Self {
            purpose,
            coin_type,
            account,
            change,
            address_index,
        }
    }

    /// External-chain path with the BIP44 purpose, as used by fundraiser keys
    pub fn new_fundraiser(account: u32, coin_type: u32, address_index: u32) -> Self {
        Self::new(BIP44_PURPOSE, coin_type, account, false, address_index)
    }

    /// The standard Cosmos path m/44'/118'/0'/0/0
    pub fn cosmos_default() -> Self {
        Self::new_fundraiser(0, COSMOS_COIN_TYPE, 0)
    }

    /// Parse a path such as `m/44'/118'/0'/0/0`. The leading `m/` is optional.
    pub fn parse(path: &str) -> Result<Self, KeyringError> {
        let path = path
            .strip_prefix("m/")
            .or_else(|| path.strip_prefix("M/"))
            .unwrap_or(path);

        let components = path
            .split('/')
            .map(PathComponent::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let [purpose, coin_type, account, change, address_index] = components[..] else {
            return Err(KeyringError::InvalidPath(format!(
                "expected 5 components, got {}",
                components.len()
            )));
        };

        if !purpose.hardened || !coin_type.hardened || !account.hardened {
            return Err(KeyringError::InvalidPath(
                "purpose, coin type and account must be hardened".to_string(),
            ));
        }
        if change.hardened || address_index.hardened {
            return Err(KeyringError::InvalidPath(
                "change and address index must not be hardened".to_string(),
            ));
        }
        if change.index > 1 {
            return Err(KeyringError::InvalidPath(format!(
                "change must be 0 or 1, got {}",
                change.index
            )));
        }

        let params = Self::new(
            purpose.index,
            coin_type.index,
            account.index,
            change.index == 1,
            address_index.index,
        );
        params.validate()?;
        Ok(params)
    }

    /// Check that the purpose is 44 and every index fits below the hardened bit
    pub fn validate(&self) -> Result<(), KeyringError> {
        if self.purpose != BIP44_PURPOSE {
            return Err(KeyringError::InvalidPath(format!(
                "first field must be {BIP44_PURPOSE}, got {}",
                self.purpose
            )));
        }

        let indices = [
            ("coin type", self.coin_type),
            ("account", self.account),
            ("address index", self.address_index),
        ];
        for (label, index) in indices {
            if index >= HARDENED_BIT {
                return Err(KeyringError::InvalidPath(format!("{label} out of range:: {index}")));
            }
        }

        Ok(())
    }

    /// Raw BIP32 child indices, hardened bit applied
    pub fn derivation_path(&self) -> [u32; 5] {
        [
            self.purpose | HARDENED_BIT,
            self.coin_type | HARDENED_BIT,
            self.account | HARDENED_BIT,
            u32::from(self.change),
            self.address_index,
        ]
    }
}

impl Default for Bip44Params {
    fn default() -> Self {
        Self::cosmos_default()
    }
}

impl fmt::Display for Bip44Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}/{}",
            self.purpose,
            self.coin_type,
            self.account,
            u8::from(self.change),
            self.address_index
        )
    }
}

impl FromStr for Bip44Params {
    type Err = KeyringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_path_parsing() {
        let params = Bip44Params::parse(COSMOS_HD_PATH).unwrap();
        assert_eq!(params, Bip44Params::cosmos_default());
        assert_eq!(params.purpose, 44);
        assert_eq!(params.coin_type, 118);
        assert_eq!(params.account, 0);
        assert!(!params.change);
        assert_eq!(params.address_index, 0);

        // Without prefix, with 'h' hardening marker
        let custom = Bip44Params::parse("44h/60h/3h/1/7").unwrap();
        assert_eq!(custom, Bip44Params::new(44, 60, 3, true, 7));
    }

    #[test]
    fn test_display_roundtrip() {
        let params = Bip44Params::new_fundraiser(2, COSMOS_COIN_TYPE, 9);
        let shown = params.to_string();
        assert_eq!(shown, "m/44'/118'/2'/0/9");
        assert_eq!(shown.parse::<Bip44Params>().unwrap(), params);
    }

    #[test]
    fn test_derivation_path_indices() {
        let indices = Bip44Params::cosmos_default().derivation_path();
        assert_eq!(indices[0], 44 + (1 << 31));
        assert_eq!(indices[1], 118 + (1 << 31));
        assert_eq!(indices[2], 1 << 31);
        assert_eq!(indices[3], 0);
        assert_eq!(indices[4], 0);
    }

    #[test]
    fn test_derivation_path_parsing_errors() {
        let invalid = [
            "m/44'/118'/0'/0",          // too short
            "m/44'/118'/0'/0/0/0",      // too long
            "m/43'/118'/0'/0/0",        // wrong purpose
            "m/44/118'/0'/0/0",         // purpose not hardened
            "m/44'/118/0'/0/0",         // coin type not hardened
            "m/44'/118'/0/0/0",         // account not hardened
            "m/44'/118'/0'/0'/0",       // change hardened
            "m/44'/118'/0'/0/0'",       // address index hardened
            "m/44'/118'/0'/2/0",        // change out of range
            "m/44'/abc'/0'/0/0",        // not a number
            "m/44'/2147483648'/0'/0/0", // index too large
            "",
        ];

        for path in invalid {
            assert!(
                matches!(Bip44Params::parse(path), Err(KeyringError::InvalidPath(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_ranges() {
        assert!(Bip44Params::cosmos_default().validate().is_ok());
        assert!(Bip44Params::new(44, (1 << 31) - 1, 0, true, (1 << 31) - 1)
            .validate()
            .is_ok());

        let invalid = [
            Bip44Params::new(0, 118, 0, false, 0),
            Bip44Params::new(44 | (1 << 31), 118, 0, false, 0),
            Bip44Params::new(44, 1 << 31, 0, false, 0),
            Bip44Params::new(44, 118, u32::MAX, false, 0),
            Bip44Params::new(44, 118, 0, false, 1 << 31),
        ];
        for params in invalid {
            assert!(
                matches!(params.validate(), Err(KeyringError::InvalidPath(_))),
                "{params} should be rejected"
            );
        }
    }
}
