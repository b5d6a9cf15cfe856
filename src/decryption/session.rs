// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ephemeral Decryption Sessions
//!
//! A session is the keypair the relayer re-encrypts results under, plus the
//! validity window and contract set the account holder authorizes it for.
//!
//! **Security**: the private key lives in memory only and is zeroed when the last
//! reference to the session is dropped.

use ethers::types::{Address, Bytes};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::SdkResult;
use crate::relayer::RawKeypair;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// `[start_timestamp, start_timestamp + duration_days)` in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecryptionWindow {
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl DecryptionWindow {
    pub fn new(start_timestamp: u64, duration_days: u32) -> Self {
        Self {
            start_timestamp,
            duration_days,
        }
    }

    pub fn end_timestamp(&self) -> u64 {
        self.start_timestamp
            .saturating_add(u64::from(self.duration_days) * SECONDS_PER_DAY)
    }

    pub fn contains(&self, timestamp: u64) -> bool {
        timestamp >= self.start_timestamp && timestamp < self.end_timestamp()
    }
}

/// Sorted, deduplicated contract set
pub fn normalize_contracts(contracts: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut contracts: Vec<Address> = contracts.into_iter().collect();
    contracts.sort();
    contracts.dedup();
    contracts
}

pub struct DecryptionSession {
    public_key: Bytes,
    private_key: Zeroizing<Vec<u8>>,
    window: DecryptionWindow,
    contract_addresses: Vec<Address>,
}

impl DecryptionSession {
    pub fn from_keypair(
        keypair: RawKeypair,
        window: DecryptionWindow,
        contract_addresses: Vec<Address>,
    ) -> SdkResult<Self> {
        let public_key = keypair.public_key.into_bytes("session public key")?;
        let private_key = Zeroizing::new(keypair.private_key.into_vec("session private key")?);
        Ok(Self {
            public_key,
            private_key,
            window,
            contract_addresses: normalize_contracts(contract_addresses),
        })
    }

    pub fn public_key(&self) -> &Bytes {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn window(&self) -> DecryptionWindow {
        self.window
    }

    pub fn contract_addresses(&self) -> &[Address] {
        &self.contract_addresses
    }
}

impl fmt::Debug for DecryptionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionSession")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("window", &self.window)
            .field("contract_addresses", &self.contract_addresses)
            .finish()
    }
}
