//! Public key metadata records
//!
//! A [`KeyInfo`] is the publicly exposed information about a keypair held by
//! the store. It never contains cleartext private key material. Records are
//! built once through the `new_*` constructors and are read-only afterwards.
//!
//! The address is always derived from the public key on demand so the two can
//! never disagree.

use gridway_crypto::PublicKey;
use gridway_types::AccAddress;
use std::fmt;

use crate::hd::Bip44Params;
use crate::types::{KeyType, SigningAlgo};
use crate::KeyringError;

/// Weight assigned to every multisig member
pub const DEFAULT_MEMBER_WEIGHT: u32 = 1;

/// Metadata for a locally stored key
#[derive(Clone, PartialEq, Eq)]
pub struct LocalInfo {
    pub(crate) name: String,
    pub(crate) pub_key: PublicKey,
    pub(crate) priv_key_armor: String,
    pub(crate) algo: SigningAlgo,
}

impl LocalInfo {
    /// Encrypted, armored private key. Opaque to this crate.
    pub fn priv_key_armor(&self) -> &str {
        &self.priv_key_armor
    }
}

impl fmt::Debug for LocalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalInfo")
            .field("name", &self.name)
            .field("pub_key", &self.pub_key)
            .field("priv_key_armor", &"<redacted>")
            .field("algo", &self.algo)
            .finish()
    }
}

/// Metadata for a key held by a hardware signing device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardwareDeviceInfo {
    pub(crate) name: String,
    pub(crate) pub_key: PublicKey,
    pub(crate) path: Bip44Params,
    pub(crate) algo: SigningAlgo,
}

/// Metadata for a key whose private half is held elsewhere
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfflineInfo {
    pub(crate) name: String,
    pub(crate) pub_key: PublicKey,
    pub(crate) algo: SigningAlgo,
}

/// A multisig member and its signing weight
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultisigPubKeyInfo {
    pub pub_key: PublicKey,
    pub weight: u32,
}

/// Metadata for a threshold multisig key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiSigInfo {
    pub(crate) name: String,
    pub(crate) pub_key: PublicKey,
    pub(crate) threshold: u32,
    pub(crate) pub_keys: Vec<MultisigPubKeyInfo>,
}

impl MultiSigInfo {
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Members in the order of the aggregate key's member list
    pub fn pub_keys(&self) -> &[MultisigPubKeyInfo] {
        &self.pub_keys
    }
}

/// Public information about a managed keypair
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyInfo {
    Local(LocalInfo),
    HardwareDevice(HardwareDeviceInfo),
    Offline(OfflineInfo),
    MultiSig(MultiSigInfo),
}

impl KeyInfo {
    pub fn new_local(
        name: impl Into<String>,
        pub_key: PublicKey,
        priv_key_armor: impl Into<String>,
        algo: SigningAlgo,
    ) -> Self {
        KeyInfo::Local(LocalInfo {
            name: name.into(),
            pub_key,
            priv_key_armor: priv_key_armor.into(),
            algo,
        })
    }

    pub fn new_hardware_device(
        name: impl Into<String>,
        pub_key: PublicKey,
        path: Bip44Params,
        algo: SigningAlgo,
    ) -> Self {
        KeyInfo::HardwareDevice(HardwareDeviceInfo {
            name: name.into(),
            pub_key,
            path,
            algo,
        })
    }

    pub fn new_offline(name: impl Into<String>, pub_key: PublicKey, algo: SigningAlgo) -> Self {
        KeyInfo::Offline(OfflineInfo {
            name: name.into(),
            pub_key,
            algo,
        })
    }

    /// Build a multisig record from an aggregate threshold key.
    ///
    /// Every member gets weight 1, in the aggregate's member order. Members
    /// that are themselves multisig keys are not expanded, so a nested
    /// aggregate counts as a single weight-1 signer.
    pub fn new_multisig(name: impl Into<String>, pub_key: PublicKey) -> Result<Self, KeyringError> {
        let multi = pub_key
            .as_multisig()
            .ok_or_else(|| KeyringError::NotAMultisigKey(pub_key.type_url().to_string()))?;

        let pub_keys = multi
            .public_keys()
            .iter()
            .map(|member| MultisigPubKeyInfo {
                pub_key: member.clone(),
                weight: DEFAULT_MEMBER_WEIGHT,
            })
            .collect();
        let threshold = multi.threshold();

        Ok(KeyInfo::MultiSig(MultiSigInfo {
            name: name.into(),
            pub_key,
            threshold,
            pub_keys,
        }))
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            KeyInfo::Local(_) => KeyType::Local,
            KeyInfo::HardwareDevice(_) => KeyType::HardwareDevice,
            KeyInfo::Offline(_) => KeyType::Offline,
            KeyInfo::MultiSig(_) => KeyType::MultiSig,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            KeyInfo::Local(info) => &info.name,
            KeyInfo::HardwareDevice(info) => &info.name,
            KeyInfo::Offline(info) => &info.name,
            KeyInfo::MultiSig(info) => &info.name,
        }
    }

    /// Verification key; the aggregate key for multisig records
    pub fn pub_key(&self) -> &PublicKey {
        match self {
            KeyInfo::Local(info) => &info.pub_key,
            KeyInfo::HardwareDevice(info) => &info.pub_key,
            KeyInfo::Offline(info) => &info.pub_key,
            KeyInfo::MultiSig(info) => &info.pub_key,
        }
    }

    pub fn address(&self) -> AccAddress {
        self.pub_key().to_address()
    }

    /// BIP44 path of a hardware-device key.
    ///
    /// Every other key type returns [`KeyringError::PathUnavailable`].
    pub fn path(&self) -> Result<Bip44Params, KeyringError> {
        match self {
            KeyInfo::HardwareDevice(info) => Ok(info.path),
            KeyInfo::Local(_) | KeyInfo::Offline(_) | KeyInfo::MultiSig(_) => {
                Err(KeyringError::PathUnavailable)
            }
        }
    }

    pub fn algo(&self) -> SigningAlgo {
        match self {
            KeyInfo::Local(info) => info.algo,
            KeyInfo::HardwareDevice(info) => info.algo,
            KeyInfo::Offline(info) => info.algo,
            KeyInfo::MultiSig(_) => SigningAlgo::Multi,
        }
    }
}

impl From<LocalInfo> for KeyInfo {
    fn from(info: LocalInfo) -> Self {
        KeyInfo::Local(info)
    }
}

impl From<HardwareDeviceInfo> for KeyInfo {
    fn from(info: HardwareDeviceInfo) -> Self {
        KeyInfo::HardwareDevice(info)
    }
}

impl From<OfflineInfo> for KeyInfo {
    fn from(info: OfflineInfo) -> Self {
        KeyInfo::Offline(info)
    }
}

impl From<MultiSigInfo> for KeyInfo {
    fn from(info: MultiSigInfo) -> Self {
        KeyInfo::MultiSig(info)
    }
}
