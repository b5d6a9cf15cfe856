// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Relayer Runtime Interfaces
//!
//! The relayer client library is loaded at runtime and owns the homomorphic
//! scheme, key management and the relayer wire protocol. This crate only drives it
//! through the traits below:
//!
//! - [`RelayerRuntime`]: availability probe, one-time bootstrap, instance creation
//! - [`FheInstance`]: a session bound to one network and account
//! - [`EncryptedInputBuilder`]: accumulates clear values for one (contract, account) pair
//!
//! Everything returned by the runtime uses the raw representations from
//! [`crate::handle`]; the gateways normalize them.

use async_trait::async_trait;
use ethers::types::{Address, Signature};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::NetworkConfig;
use crate::error::{RelayerError, SdkResult};
use crate::handle::{CiphertextHandle, EncryptedInput, RawBytes, RawClearValue};
use crate::lifecycle::AccountContext;

#[async_trait]
pub trait RelayerRuntime: Send + Sync {
    /// Whether the runtime library has finished loading
    async fn is_available(&self) -> bool;

    /// One-time global setup. Called at most once successfully per process.
    async fn bootstrap(&self) -> Result<(), RelayerError>;

    async fn create_instance(
        &self,
        network: &NetworkConfig,
        context: &AccountContext,
    ) -> Result<Arc<dyn FheInstance>, RelayerError>;
}

#[async_trait]
pub trait FheInstance: Send + Sync {
    fn create_encrypted_input(
        &self,
        contract_address: Address,
        account_address: Address,
    ) -> Box<dyn EncryptedInputBuilder>;

    fn generate_keypair(&self) -> Result<RawKeypair, RelayerError>;

    /// Signature-authorized decrypt. Keys of the returned map are handle hex strings.
    async fn user_decrypt(
        &self,
        request: &UserDecryptRequest<'_>,
    ) -> Result<HashMap<String, RawClearValue>, RelayerError>;

    /// Decrypt handles that were marked publicly decryptable; no signature needed
    async fn public_decrypt(
        &self,
        handles: &[CiphertextHandle],
    ) -> Result<HashMap<String, RawClearValue>, RelayerError>;
}

#[async_trait]
pub trait EncryptedInputBuilder: Send {
    fn add64(&mut self, value: u64);

    async fn encrypt(&mut self) -> Result<RawEncryptedInput, RelayerError>;
}

#[derive(Debug, Clone)]
pub struct RawKeypair {
    pub public_key: RawBytes,
    pub private_key: RawBytes,
}

#[derive(Debug, Clone)]
pub struct RawEncryptedInput {
    pub handles: Vec<RawBytes>,
    pub input_proof: RawBytes,
}

impl RawEncryptedInput {
    pub fn into_encrypted_input(self) -> SdkResult<EncryptedInput> {
        let handles = self
            .handles
            .into_iter()
            .map(RawBytes::into_handle)
            .collect::<SdkResult<Vec<_>>>()?;
        let input_proof = self.input_proof.into_bytes("input proof")?;
        Ok(EncryptedInput {
            handles,
            input_proof,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    pub handle: CiphertextHandle,
    pub contract_address: Address,
}

/// Everything the relayer needs to authorize and perform a user decryption
pub struct UserDecryptRequest<'a> {
    pub pairs: &'a [HandleContractPair],
    pub private_key: &'a [u8],
    pub public_key: &'a [u8],
    pub signature: &'a Signature,
    pub contract_addresses: &'a [Address],
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl std::fmt::Debug for UserDecryptRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDecryptRequest")
            .field("pairs", &self.pairs.len())
            .field("contract_addresses", &self.contract_addresses)
            .field("user_address", &self.user_address)
            .field("start_timestamp", &self.start_timestamp)
            .field("duration_days", &self.duration_days)
            .finish_non_exhaustive()
    }
}
