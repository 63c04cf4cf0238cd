//! Discriminated binary codec for key metadata records
//!
//! A persisted record is
//!
//! ```text
//! [varint length][1-byte discriminant][variant fields]
//! ```
//!
//! where `length` counts the discriminant and the fields. Field order per
//! variant is fixed:
//!
//! | variant         | fields                                                |
//! |-----------------|-------------------------------------------------------|
//! | Local           | name, pubkey, privkey armor, algo                     |
//! | HardwareDevice  | name, pubkey, path, algo                              |
//! | Offline         | name, pubkey, algo                                    |
//! | MultiSig        | name, pubkey, threshold, n, (member pubkey, weight)*n |
//!
//! The algorithm is always the last field of a variant. Older readers scan
//! these fields positionally, so new fields must never be placed after it.
//!
//! Strings are `[varint len][utf-8]`, integers are varints, public keys use
//! their canonical encoding and paths are `[purpose][coin][account][change
//! byte][index]`.

use bytes::Buf;
use gridway_crypto::PublicKey;
use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};
use tracing::{debug, trace};

use crate::config::{CodecConfig, ConfigError};
use crate::hd::Bip44Params;
use crate::info::{
    HardwareDeviceInfo, KeyInfo, LocalInfo, MultiSigInfo, MultisigPubKeyInfo, OfflineInfo,
    DEFAULT_MEMBER_WEIGHT,
};
use crate::types::{KeyType, SigningAlgo};
use crate::KeyringError;

/// Longest varint the length prefix may use
const MAX_VARINT_LEN: usize = 10;

/// Mapping between key types and their one-byte wire discriminants.
///
/// The persisted discriminants are Local `0x01`, HardwareDevice `0x02`,
/// Offline `0x03` and MultiSig `0x04`. Changing any of these breaks every
/// previously stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscriminantTable {
    _private: (),
}

impl DiscriminantTable {
    pub const fn standard() -> Self {
        Self { _private: () }
    }

    pub fn tag(&self, key_type: KeyType) -> u8 {
        match key_type {
            KeyType::Local => 0x01,
            KeyType::HardwareDevice => 0x02,
            KeyType::Offline => 0x03,
            KeyType::MultiSig => 0x04,
        }
    }

    /// Key type for a discriminant; `None` for anything unregistered
    pub fn key_type(&self, tag: u8) -> Option<KeyType> {
        KeyType::ALL
            .into_iter()
            .find(|&key_type| self.tag(key_type) == tag)
    }
}

impl Default for DiscriminantTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Encoder and decoder for [`KeyInfo`] records.
///
/// Holds no mutable state; a single codec can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct InfoCodec {
    discriminants: DiscriminantTable,
    config: CodecConfig,
}

impl InfoCodec {
    pub fn new(config: CodecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            discriminants: DiscriminantTable::standard(),
            config,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn discriminants(&self) -> &DiscriminantTable {
        &self.discriminants
    }

    /// Encode a record with its length prefix. Deterministic.
    pub fn encode(&self, info: &KeyInfo) -> Vec<u8> {
        let body = self.encode_unprefixed(info);

        let mut buf = Vec::with_capacity(encoded_len_varint(body.len() as u64) + body.len());
        encode_varint(body.len() as u64, &mut buf);
        buf.extend_from_slice(&body);

        trace!(key_type = %info.key_type(), len = buf.len(), "encoded key info");
        buf
    }

    /// Encode the discriminant and fields without the outer length prefix
    pub fn encode_unprefixed(&self, info: &KeyInfo) -> Vec<u8> {
        let mut buf = vec![self.discriminants.tag(info.key_type())];

        match info {
            KeyInfo::Local(local) => {
                put_string(&mut buf, &local.name);
                local.pub_key.encode_to(&mut buf);
                put_string(&mut buf, &local.priv_key_armor);
                put_algo(&mut buf, local.algo);
            }
            KeyInfo::HardwareDevice(device) => {
                put_string(&mut buf, &device.name);
                device.pub_key.encode_to(&mut buf);
                put_path(&mut buf, &device.path);
                put_algo(&mut buf, device.algo);
            }
            KeyInfo::Offline(offline) => {
                put_string(&mut buf, &offline.name);
                offline.pub_key.encode_to(&mut buf);
                put_algo(&mut buf, offline.algo);
            }
            KeyInfo::MultiSig(multi) => {
                put_string(&mut buf, &multi.name);
                multi.pub_key.encode_to(&mut buf);
                encode_varint(u64::from(multi.threshold), &mut buf);
                encode_varint(multi.pub_keys.len() as u64, &mut buf);
                for member in &multi.pub_keys {
                    member.pub_key.encode_to(&mut buf);
                    encode_varint(u64::from(member.weight), &mut buf);
                }
            }
        }

        buf
    }

    /// Decode a length-prefixed record. The buffer must hold exactly one record.
    pub fn decode(&self, bytes: &[u8]) -> Result<KeyInfo, KeyringError> {
        let result = self.decode_prefixed(bytes);
        match &result {
            Ok(info) => trace!(key_type = %info.key_type(), len = bytes.len(), "decoded key info"),
            Err(e) => debug!(error = %e, len = bytes.len(), "rejected key info record"),
        }
        result
    }

    /// Decode a record body produced by [`InfoCodec::encode_unprefixed`]
    pub fn decode_unprefixed(&self, body: &[u8]) -> Result<KeyInfo, KeyringError> {
        let mut reader = FieldReader::new(body);
        let tag = reader.discriminant()?;
        let key_type = self
            .discriminants
            .key_type(tag)
            .ok_or(KeyringError::UnknownVariant(tag))?;

        let info = match key_type {
            KeyType::Local => KeyInfo::Local(LocalInfo {
                name: reader.string("name")?,
                pub_key: reader.pub_key("pubkey")?,
                priv_key_armor: reader.string("privkey.armor")?,
                algo: reader.algo()?,
            }),
            KeyType::HardwareDevice => KeyInfo::HardwareDevice(HardwareDeviceInfo {
                name: reader.string("name")?,
                pub_key: reader.pub_key("pubkey")?,
                path: reader.path()?,
                algo: reader.algo()?,
            }),
            KeyType::Offline => KeyInfo::Offline(OfflineInfo {
                name: reader.string("name")?,
                pub_key: reader.pub_key("pubkey")?,
                algo: reader.algo()?,
            }),
            KeyType::MultiSig => KeyInfo::MultiSig(reader.multisig()?),
        };

        reader.finish()?;
        Ok(info)
    }

    fn decode_prefixed(&self, bytes: &[u8]) -> Result<KeyInfo, KeyringError> {
        let mut buf = bytes;
        let declared = decode_varint(&mut buf).map_err(|_| {
            if bytes.len() < MAX_VARINT_LEN {
                // Every byte had its continuation bit set
                KeyringError::TruncatedInput {
                    expected: bytes.len() + 1,
                    available: bytes.len(),
                }
            } else {
                KeyringError::malformed("length", "invalid varint")
            }
        })?;

        if declared > self.config.max_record_len as u64 {
            return Err(KeyringError::malformed(
                "length",
                format!(
                    "declared length {declared} exceeds limit {}",
                    self.config.max_record_len
                ),
            ));
        }
        // Bounded by max_record_len, which is a usize
        let declared = declared as usize;

        if buf.len() < declared {
            return Err(KeyringError::TruncatedInput {
                expected: declared,
                available: buf.len(),
            });
        }
        if buf.len() > declared {
            return Err(KeyringError::TrailingBytes {
                expected: declared,
                available: buf.len(),
            });
        }

        self.decode_unprefixed(buf)
    }
}

fn put_string(buf: &mut Vec<u8>, value: &str) {
    encode_varint(value.len() as u64, buf);
    buf.extend_from_slice(value.as_bytes());
}

fn put_algo(buf: &mut Vec<u8>, algo: SigningAlgo) {
    put_string(buf, algo.as_str());
}

fn put_path(buf: &mut Vec<u8>, path: &Bip44Params) {
    encode_varint(u64::from(path.purpose), buf);
    encode_varint(u64::from(path.coin_type), buf);
    encode_varint(u64::from(path.account), buf);
    buf.push(u8::from(path.change));
    encode_varint(u64::from(path.address_index), buf);
}

/// Sequential reader over one record body. Every failure past the
/// discriminant is reported against the field being read.
struct FieldReader<'a> {
    buf: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn discriminant(&mut self) -> Result<u8, KeyringError> {
        if !self.buf.has_remaining() {
            return Err(KeyringError::TruncatedInput {
                expected: 1,
                available: 0,
            });
        }
        Ok(self.buf.get_u8())
    }

    fn varint(&mut self, field: &'static str) -> Result<u64, KeyringError> {
        decode_varint(&mut self.buf).map_err(|e| KeyringError::malformed(field, e.to_string()))
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, KeyringError> {
        let value = self.varint(field)?;
        u32::try_from(value)
            .map_err(|_| KeyringError::malformed(field, format!("{value} does not fit in 32 bits")))
    }

    fn byte(&mut self, field: &'static str) -> Result<u8, KeyringError> {
        if !self.buf.has_remaining() {
            return Err(KeyringError::malformed(field, "unexpected end of record"));
        }
        Ok(self.buf.get_u8())
    }

    fn string(&mut self, field: &'static str) -> Result<String, KeyringError> {
        let len = self.varint(field)?;
        if len > self.buf.len() as u64 {
            return Err(KeyringError::malformed(
                field,
                format!("length {len} exceeds remaining {} bytes", self.buf.len()),
            ));
        }

        let (raw, rest) = self.buf.split_at(len as usize);
        self.buf = rest;
        String::from_utf8(raw.to_vec()).map_err(|e| KeyringError::malformed(field, e.to_string()))
    }

    fn pub_key(&mut self, field: &'static str) -> Result<PublicKey, KeyringError> {
        PublicKey::decode_from(&mut self.buf)
            .map_err(|e| KeyringError::malformed(field, e.to_string()))
    }

    fn algo(&mut self) -> Result<SigningAlgo, KeyringError> {
        let name = self.string("algo")?;
        name.parse()
            .map_err(|_| KeyringError::malformed("algo", format!("unknown algorithm {name:?}")))
    }

    fn path(&mut self) -> Result<Bip44Params, KeyringError> {
        let purpose = self.u32("path")?;
        let coin_type = self.u32("path")?;
        let account = self.u32("path")?;
        let change = match self.byte("path")? {
            0 => false,
            1 => true,
            other => {
                return Err(KeyringError::malformed(
                    "path",
                    format!("change flag must be 0 or 1, got {other}"),
                ))
            }
        };
        let address_index = self.u32("path")?;

        let path = Bip44Params::new(purpose, coin_type, account, change, address_index);
        path.validate().map_err(|e| KeyringError::malformed("path", e.to_string()))?;
        Ok(path)
    }

    /// Stored threshold and members must agree with the aggregate key, exactly
    /// as [`KeyInfo::new_multisig`] derives them.
    fn multisig(&mut self) -> Result<MultiSigInfo, KeyringError> {
        let name = self.string("name")?;
        let pub_key = self.pub_key("pubkey")?;
        let Some(aggregate) = pub_key.as_multisig() else {
            return Err(KeyringError::malformed(
                "pubkey",
                format!("expected a multisig key, got {}", pub_key.type_url()),
            ));
        };

        let threshold = self.u32("threshold")?;
        if threshold != aggregate.threshold() {
            return Err(KeyringError::malformed(
                "threshold",
                format!(
                    "threshold {threshold} does not match aggregate threshold {}",
                    aggregate.threshold()
                ),
            ));
        }

        let count = self.varint("pubkeys")?;
        if count != aggregate.public_keys().len() as u64 {
            return Err(KeyringError::malformed(
                "pubkeys",
                format!(
                    "{count} members recorded, aggregate has {}",
                    aggregate.public_keys().len()
                ),
            ));
        }

        let mut pub_keys = Vec::with_capacity(aggregate.public_keys().len());
        for (position, expected) in aggregate.public_keys().iter().enumerate() {
            let member = self.pub_key("pubkeys")?;
            if member != *expected {
                return Err(KeyringError::malformed(
                    "pubkeys",
                    format!("member {position} differs from the aggregate key"),
                ));
            }
            let weight = self.u32("pubkeys")?;
            if weight != DEFAULT_MEMBER_WEIGHT {
                return Err(KeyringError::malformed(
                    "pubkeys",
                    format!("member {position} has weight {weight}, expected 1"),
                ));
            }
            pub_keys.push(MultisigPubKeyInfo {
                pub_key: member,
                weight,
            });
        }

        Ok(MultiSigInfo {
            name,
            pub_key,
            threshold,
            pub_keys,
        })
    }

    /// Require that every byte of the record was consumed
    fn finish(self) -> Result<(), KeyringError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(KeyringError::malformed(
                "record",
                format!("{} unread bytes after last field", self.buf.len()),
            ))
        }
    }
}
