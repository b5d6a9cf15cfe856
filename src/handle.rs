// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ciphertext Handles and Representation Normalization
//!
//! The relayer runtime hands back byte payloads either as hex strings or as raw
//! buffers, and clear values either as native integers or numeric strings. Every
//! such value passes through the conversions in this module exactly once, at the
//! gateway boundary. Nothing past the gateways sees `RawBytes` or `RawClearValue`.

use std::fmt;
use std::str::FromStr;

use ethers::types::{Bytes, H256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SdkError, SdkResult};

/// Length of an on-chain ciphertext handle in bytes
pub const HANDLE_LEN: usize = 32;

/// Canonical clear value produced by decryption
pub type ClearValue = U256;

/// Opaque 32-byte on-chain reference to an encrypted value.
///
/// The all-zero handle means "no value" and always decrypts to 0 locally.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CiphertextHandle([u8; HANDLE_LEN]);

impl CiphertextHandle {
    pub const ZERO: CiphertextHandle = CiphertextHandle([0u8; HANDLE_LEN]);

    pub const fn new(bytes: [u8; HANDLE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> SdkResult<Self> {
        let array: [u8; HANDLE_LEN] = bytes.try_into().map_err(|_| {
            SdkError::encoding(
                "ciphertext handle",
                format!("expected {} bytes, got {}", HANDLE_LEN, bytes.len()),
            )
        })?;
        Ok(Self(array))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HANDLE_LEN]
    }

    pub fn as_bytes(&self) -> &[u8; HANDLE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle({})", self.to_hex())
    }
}

impl FromStr for CiphertextHandle {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex("ciphertext handle", s)?;
        Self::from_slice(&bytes)
    }
}

impl From<H256> for CiphertextHandle {
    fn from(value: H256) -> Self {
        Self(value.0)
    }
}

impl From<[u8; HANDLE_LEN]> for CiphertextHandle {
    fn from(value: [u8; HANDLE_LEN]) -> Self {
        Self(value)
    }
}

impl From<CiphertextHandle> for H256 {
    fn from(value: CiphertextHandle) -> Self {
        H256(value.0)
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Handles plus validity proof for one (contract, account) pair.
///
/// Single use: submitting it to a different contract than it was built for will be
/// rejected on-chain. That is not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedInput {
    pub handles: Vec<CiphertextHandle>,
    pub input_proof: Bytes,
}

/// Byte payload as the runtime library may return it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBytes {
    Hex(String),
    Bytes(Vec<u8>),
}

impl RawBytes {
    /// Decode into raw bytes. Total over both representations; malformed hex is an error.
    pub fn into_vec(self, field: &'static str) -> SdkResult<Vec<u8>> {
        match self {
            RawBytes::Hex(s) => decode_hex(field, &s),
            RawBytes::Bytes(bytes) => Ok(bytes),
        }
    }

    pub fn into_bytes(self, field: &'static str) -> SdkResult<Bytes> {
        self.into_vec(field).map(Bytes::from)
    }

    pub fn into_handle(self) -> SdkResult<CiphertextHandle> {
        let bytes = self.into_vec("ciphertext handle")?;
        CiphertextHandle::from_slice(&bytes)
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(value: Vec<u8>) -> Self {
        RawBytes::Bytes(value)
    }
}

impl From<&str> for RawBytes {
    fn from(value: &str) -> Self {
        RawBytes::Hex(value.to_string())
    }
}

/// Clear value as the relayer may return it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawClearValue {
    Native(U256),
    Text(String),
    Bool(bool),
}

impl RawClearValue {
    /// Coerce into the canonical integer representation.
    ///
    /// Text accepts decimal or `0x`-prefixed hex. Booleans map to 0 and 1.
    pub fn into_clear_value(self) -> SdkResult<ClearValue> {
        match self {
            RawClearValue::Native(value) => Ok(value),
            RawClearValue::Bool(flag) => Ok(U256::from(flag as u8)),
            RawClearValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(SdkError::encoding("clear value", "empty string"));
                }
                let parsed = match strip_hex_prefix(trimmed) {
                    Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| format!("{:?}", e)),
                    None => U256::from_dec_str(trimmed).map_err(|e| format!("{:?}", e)),
                };
                parsed.map_err(|reason| {
                    SdkError::encoding("clear value", format!("{:?}: {}", trimmed, reason))
                })
            }
        }
    }
}

impl From<u64> for RawClearValue {
    fn from(value: u64) -> Self {
        RawClearValue::Native(U256::from(value))
    }
}

impl From<U256> for RawClearValue {
    fn from(value: U256) -> Self {
        RawClearValue::Native(value)
    }
}

impl From<&str> for RawClearValue {
    fn from(value: &str) -> Self {
        RawClearValue::Text(value.to_string())
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

fn decode_hex(field: &'static str, s: &str) -> SdkResult<Vec<u8>> {
    let digits = strip_hex_prefix(s.trim()).unwrap_or(s.trim());
    hex::decode(digits).map_err(|e| SdkError::encoding(field, e.to_string()))
}
