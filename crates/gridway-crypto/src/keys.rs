//! Key representations using static enum dispatch
//!
//! Every public key has a canonical byte form, `[tag][body]`:
//!
//! | tag    | key       | body                                           |
//! |--------|-----------|------------------------------------------------|
//! | `0x01` | secp256k1 | `[varint 33][compressed SEC1 point]`           |
//! | `0x02` | ed25519   | `[varint 32][point]`                           |
//! | `0x03` | multisig  | `[varint threshold][varint n][member key]*n`   |
//!
//! The canonical form is what the keyring persists and what multisig
//! addresses are hashed from, so it must stay stable.

use base64::{engine::general_purpose, Engine as _};
use bytes::Buf;
use ed25519_dalek::VerifyingKey as Ed25519PubKey;
use gridway_types::address::AccAddress;
use k256::ecdsa::VerifyingKey as Secp256k1PubKey;
use prost::encoding::{decode_varint, encode_varint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::multisig::LegacyAminoPubKey;

pub const SECP256K1_PUBKEY_LEN: usize = 33;
pub const ED25519_PUBKEY_LEN: usize = 32;

pub const SECP256K1_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
pub const ED25519_TYPE_URL: &str = "/cosmos.crypto.ed25519.PubKey";
pub const MULTISIG_TYPE_URL: &str = "/cosmos.crypto.multisig.LegacyAminoPubKey";

const TAG_SECP256K1: u8 = 0x01;
const TAG_ED25519: u8 = 0x02;
const TAG_MULTISIG: u8 = 0x03;

/// Multisig keys may nest; bound the recursion when decoding untrusted input
const MAX_NESTING_DEPTH: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown public key type:: {0}")]
    UnknownKeyType(String),

    #[error("invalid key length:: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid key bytes:: {0}")]
    InvalidKey(String),

    #[error("truncated key encoding")]
    Truncated,

    #[error("trailing bytes after key encoding:: {0}")]
    TrailingBytes(usize),

    #[error("invalid multisig threshold:: {threshold} of {keys}")]
    InvalidThreshold { threshold: u32, keys: usize },

    #[error("multisig nesting deeper than {0}")]
    TooDeep(usize),
}

/// All supported public key types
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(Secp256k1PubKey),
    Ed25519(Ed25519PubKey),
    Multisig(LegacyAminoPubKey),
}

impl PublicKey {
    /// Derive address from public key.
    ///
    /// Single keys hash as ripemd160(sha256(key)); multisig keys hash their
    /// canonical encoding with truncated sha256.
    pub fn to_address(&self) -> AccAddress {
        match self {
            PublicKey::Multisig(_) => AccAddress::from_truncated_hash(&self.to_bytes()),
            _ => AccAddress::from_pubkey(&self.key_bytes()),
        }
    }

    /// Get the Protobuf type URL for this key type
    pub fn type_url(&self) -> &'static str {
        match self {
            PublicKey::Secp256k1(_) => SECP256K1_TYPE_URL,
            PublicKey::Ed25519(_) => ED25519_TYPE_URL,
            PublicKey::Multisig(_) => MULTISIG_TYPE_URL,
        }
    }

    /// The threshold key, if this is one
    pub fn as_multisig(&self) -> Option<&LegacyAminoPubKey> {
        match self {
            PublicKey::Multisig(multi) => Some(multi),
            _ => None,
        }
    }

    /// Raw key material without the type tag.
    ///
    /// For multisig keys this is the canonical body (threshold and members).
    pub fn key_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
            PublicKey::Ed25519(key) => key.as_bytes().to_vec(),
            PublicKey::Multisig(multi) => {
                let mut buf = Vec::new();
                encode_multisig_body(multi, &mut buf);
                buf
            }
        }
    }

    /// Canonical tagged encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }

    /// Append the canonical tagged encoding to `buf`
    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        match self {
            PublicKey::Secp256k1(key) => {
                buf.push(TAG_SECP256K1);
                let point = key.to_encoded_point(true);
                encode_varint(point.as_bytes().len() as u64, buf);
                buf.extend_from_slice(point.as_bytes());
            }
            PublicKey::Ed25519(key) => {
                buf.push(TAG_ED25519);
                encode_varint(ED25519_PUBKEY_LEN as u64, buf);
                buf.extend_from_slice(key.as_bytes());
            }
            PublicKey::Multisig(multi) => {
                buf.push(TAG_MULTISIG);
                encode_multisig_body(multi, buf);
            }
        }
    }

    /// Decode one canonical key from the front of `buf`, advancing it past the key
    pub fn decode_from(buf: &mut &[u8]) -> Result<Self, KeyError> {
        decode_key(buf, 0)
    }

    /// Decode a canonical key that must occupy all of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let mut buf = bytes;
        let key = Self::decode_from(&mut buf)?;
        if !buf.is_empty() {
            return Err(KeyError::TrailingBytes(buf.len()));
        }
        Ok(key)
    }

    /// Create from Protobuf Any-style type URL and raw key bytes
    pub fn from_any(type_url: &str, value: &[u8]) -> Result<Self, KeyError> {
        match type_url {
            SECP256K1_TYPE_URL => secp256k1_from_slice(value),
            ED25519_TYPE_URL => ed25519_from_slice(value),
            MULTISIG_TYPE_URL => {
                let mut buf = value;
                let multi = decode_multisig_body(&mut buf, 0)?;
                if !buf.is_empty() {
                    return Err(KeyError::TrailingBytes(buf.len()));
                }
                Ok(PublicKey::Multisig(multi))
            }
            _ => Err(KeyError::UnknownKeyType(type_url.to_string())),
        }
    }

    /// Convert to Protobuf Any-style pair
    pub fn to_any(&self) -> (String, Vec<u8>) {
        (self.type_url().to_string(), self.key_bytes())
    }
}

fn encode_multisig_body(multi: &LegacyAminoPubKey, buf: &mut Vec<u8>) {
    encode_varint(u64::from(multi.threshold()), buf);
    encode_varint(multi.public_keys().len() as u64, buf);
    for member in multi.public_keys() {
        member.encode_to(buf);
    }
}

fn decode_key(buf: &mut &[u8], depth: usize) -> Result<PublicKey, KeyError> {
    if !buf.has_remaining() {
        return Err(KeyError::Truncated);
    }

    match buf.get_u8() {
        TAG_SECP256K1 => {
            let raw = take_sized(buf, SECP256K1_PUBKEY_LEN)?;
            secp256k1_from_slice(raw)
        }
        TAG_ED25519 => {
            let raw = take_sized(buf, ED25519_PUBKEY_LEN)?;
            ed25519_from_slice(raw)
        }
        TAG_MULTISIG => Ok(PublicKey::Multisig(decode_multisig_body(buf, depth)?)),
        other => Err(KeyError::UnknownKeyType(format!("tag 0x{other:02x}"))),
    }
}

fn decode_multisig_body(buf: &mut &[u8], depth: usize) -> Result<LegacyAminoPubKey, KeyError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(KeyError::TooDeep(MAX_NESTING_DEPTH));
    }

    let threshold = decode_varint(buf).map_err(|_| KeyError::Truncated)?;
    let threshold = u32::try_from(threshold)
        .map_err(|_| KeyError::InvalidKey(format!("threshold {threshold} out of range")))?;
    let count = decode_varint(buf).map_err(|_| KeyError::Truncated)?;

    let mut members = Vec::new();
    for _ in 0..count {
        members.push(decode_key(buf, depth + 1)?);
    }

    LegacyAminoPubKey::new(threshold, members)
}

/// Read `[varint len][bytes]`, requiring `len == expected`
fn take_sized<'a>(buf: &mut &'a [u8], expected: usize) -> Result<&'a [u8], KeyError> {
    let len = decode_varint(buf).map_err(|_| KeyError::Truncated)?;
    if len != expected as u64 {
        return Err(KeyError::InvalidLength {
            expected,
            actual: usize::try_from(len).unwrap_or(usize::MAX),
        });
    }
    if buf.len() < expected {
        return Err(KeyError::Truncated);
    }

    let remaining: &'a [u8] = *buf;
    let (raw, rest) = remaining.split_at(expected);
    *buf = rest;
    Ok(raw)
}

fn secp256k1_from_slice(value: &[u8]) -> Result<PublicKey, KeyError> {
    if value.len() != SECP256K1_PUBKEY_LEN {
        return Err(KeyError::InvalidLength {
            expected: SECP256K1_PUBKEY_LEN,
            actual: value.len(),
        });
    }
    let key = Secp256k1PubKey::from_sec1_bytes(value)
        .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
    Ok(PublicKey::Secp256k1(key))
}

fn ed25519_from_slice(value: &[u8]) -> Result<PublicKey, KeyError> {
    let bytes: &[u8; ED25519_PUBKEY_LEN] =
        value.try_into().map_err(|_| KeyError::InvalidLength {
            expected: ED25519_PUBKEY_LEN,
            actual: value.len(),
        })?;
    let key = Ed25519PubKey::from_bytes(bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))?;
    Ok(PublicKey::Ed25519(key))
}

// Custom serialization for PublicKey
impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct PublicKeyData {
            #[serde(rename = "type")]
            key_type: String,
            value: String,
        }

        let data = PublicKeyData {
            key_type: self.type_url().to_string(),
            value: general_purpose::STANDARD.encode(self.key_bytes()),
        };

        data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct PublicKeyData {
            #[serde(rename = "type")]
            key_type: String,
            value: String,
        }

        let data = PublicKeyData::deserialize(deserializer)?;
        let bytes = general_purpose::STANDARD
            .decode(&data.value)
            .map_err(serde::de::Error::custom)?;

        PublicKey::from_any(&data.key_type, &bytes).map_err(serde::de::Error::custom)
    }
}
