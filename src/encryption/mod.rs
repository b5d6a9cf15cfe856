// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encryption Gateway
//!
//! Turns a clear 64-bit amount into ciphertext handles plus an input proof for one
//! (contract, account) pair. Construction is entirely off-chain; submitting the
//! result to the contract is the caller's job.

use ethers::types::Address;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{SdkError, SdkResult};
use crate::handle::EncryptedInput;
use crate::lifecycle::InstanceManager;

pub struct EncryptionGateway {
    instances: Arc<InstanceManager>,
    in_flight: AtomicUsize,
}

impl EncryptionGateway {
    pub fn new(instances: Arc<InstanceManager>) -> Self {
        Self {
            instances,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Encrypt `value` as a 64-bit integer for `contract_address`, on behalf of
    /// `account_address`.
    ///
    /// Readiness is checked before the range, so an idle session reports
    /// `NotReady` even for an invalid amount.
    pub async fn encrypt(
        &self,
        value: i128,
        contract_address: Address,
        account_address: Address,
    ) -> SdkResult<EncryptedInput> {
        let ready = self.instances.ready().await?;
        let value = u64::try_from(value).map_err(|_| SdkError::Range {
            value: value.to_string(),
        })?;

        let _guard = InFlight::enter(&self.in_flight);
        debug!(
            "Encrypting value for contract {:?} / account {:?}",
            contract_address, account_address
        );

        let mut builder = ready
            .instance
            .create_encrypted_input(contract_address, account_address);
        builder.add64(value);
        let raw = builder.encrypt().await.map_err(|e| {
            warn!("Encryption failed for contract {:?}: {}", contract_address, e);
            SdkError::encryption(e)
        })?;

        let input = raw.into_encrypted_input().map_err(SdkError::encryption)?;
        info!(
            "Built encrypted input with {} handle(s) for contract {:?}",
            input.handles.len(),
            contract_address
        );
        Ok(input)
    }

    /// Same as [`EncryptionGateway::encrypt`] for amounts already known to fit.
    pub async fn encrypt_u64(
        &self,
        value: u64,
        contract_address: Address,
        account_address: Address,
    ) -> SdkResult<EncryptedInput> {
        self.encrypt(i128::from(value), contract_address, account_address)
            .await
    }

    pub fn is_encrypting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Counts an operation as in flight until dropped, including on early return
pub(crate) struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    pub(crate) fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
