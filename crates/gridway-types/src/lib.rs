//! Core types for gridway
//!
//! This crate provides the account address type shared by the crypto and
//! keyring crates.

pub mod address;

pub use address::{AccAddress, AddressError, ADDRESS_LEN, DEFAULT_BECH32_PREFIX};
