//! Threshold multisignature public keys

use crate::keys::{KeyError, PublicKey};

/// Threshold public key: any `threshold` of the member keys can sign.
///
/// Member order is significant. It determines the canonical encoding and
/// therefore the derived address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyAminoPubKey {
    threshold: u32,
    public_keys: Vec<PublicKey>,
}

impl LegacyAminoPubKey {
    /// Build a threshold key, requiring `1 <= threshold <= public_keys.len()`
    pub fn new(threshold: u32, public_keys: Vec<PublicKey>) -> Result<Self, KeyError> {
        if threshold == 0 || threshold as usize > public_keys.len() {
            return Err(KeyError::InvalidThreshold {
                threshold,
                keys: public_keys.len(),
            });
        }

        Ok(Self {
            threshold,
            public_keys,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Member keys in insertion order
    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }
}
