//! Listing view of key metadata

use gridway_crypto::PublicKey;
use serde::Serialize;

use crate::info::KeyInfo;
use crate::types::KeyType;
use crate::KeyringError;

/// A multisig member as shown in key listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberOutput {
    pub address: String,
    pub pubkey: PublicKey,
    pub weight: u32,
}

/// Key record as shown to users, with a bech32 address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub address: String,
    pub pubkey: PublicKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pubkeys: Vec<MemberOutput>,
}

impl KeyOutput {
    /// Build the listing view, rendering addresses with the given bech32 prefix
    pub fn from_info(info: &KeyInfo, hrp: &str) -> Result<Self, KeyringError> {
        let (threshold, pubkeys) = match info {
            KeyInfo::MultiSig(multi) => {
                let members = multi
                    .pub_keys()
                    .iter()
                    .map(|member| -> Result<MemberOutput, KeyringError> {
                        Ok(MemberOutput {
                            address: member.pub_key.to_address().to_bech32(hrp)?,
                            pubkey: member.pub_key.clone(),
                            weight: member.weight,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (Some(multi.threshold()), members)
            }
            _ => (None, Vec::new()),
        };

        Ok(KeyOutput {
            name: info.name().to_string(),
            key_type: info.key_type(),
            address: info.address().to_bech32(hrp)?,
            pubkey: info.pub_key().clone(),
            threshold,
            pubkeys,
        })
    }

    pub fn to_json(&self) -> Result<String, KeyringError> {
        Ok(serde_json::to_string(self)?)
    }
}
