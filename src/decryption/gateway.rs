// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{Address, Signature, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::authorization::{build_user_decrypt_payload, AuthorizationDomain};
use super::cache::{SignatureCache, SignatureCacheKey};
use super::session::{normalize_contracts, DecryptionSession, DecryptionWindow};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::encryption::InFlight;
use crate::error::{RelayerError, SdkError, SdkResult, WalletError};
use crate::handle::{CiphertextHandle, ClearValue, RawClearValue};
use crate::lifecycle::{InstanceManager, ReadyInstance};
use crate::relayer::{HandleContractPair, UserDecryptRequest};
use crate::wallet::WalletSigner;

/// Recovers clear values for ciphertext handles through the relayer.
///
/// Concurrent calls for the same handle are not coalesced; each one runs the full
/// protocol. Callers that need at most one request in flight per handle must
/// serialize themselves.
pub struct DecryptionGateway {
    instances: Arc<InstanceManager>,
    wallet: Arc<dyn WalletSigner>,
    domain: AuthorizationDomain,
    clock: Arc<dyn Clock>,
    cache: Option<SignatureCache>,
    in_flight: AtomicUsize,
}

impl DecryptionGateway {
    pub fn new(
        instances: Arc<InstanceManager>,
        wallet: Arc<dyn WalletSigner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let domain = AuthorizationDomain::from(instances.network());
        Self {
            instances,
            wallet,
            domain,
            clock,
            cache: None,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Reuse signed authorizations for up to `ttl`
    pub fn with_signature_cache(mut self, ttl: chrono::Duration) -> Self {
        self.cache = Some(SignatureCache::new(ttl, self.clock.clone()));
        self
    }

    /// Enable the signature cache if the configuration asks for it
    pub fn with_cache_config(self, cache: &CacheConfig) -> Self {
        if cache.signatures_enabled {
            self.with_signature_cache(cache.signature_ttl())
        } else {
            self
        }
    }

    pub fn signature_cache(&self) -> Option<&SignatureCache> {
        self.cache.as_ref()
    }

    pub fn is_decrypting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Decrypt one handle under an authorization valid for `duration_days`.
    pub async fn decrypt_one(
        &self,
        handle: CiphertextHandle,
        contract_address: Address,
        duration_days: u32,
    ) -> SdkResult<ClearValue> {
        let ready = self.instances.ready().await?;
        if handle.is_zero() {
            return Ok(U256::zero());
        }

        let pair = HandleContractPair {
            handle,
            contract_address,
        };
        let values = self
            .user_decrypt(&ready, &[pair], duration_days)
            .await?;
        take_value(&values, &handle, "user decrypt")
    }

    /// Decrypt many handles with a single signature covering every contract involved.
    ///
    /// Zero handles resolve to 0 without touching the relayer; if nothing else is
    /// left, no signature is requested at all.
    pub async fn decrypt_batch(
        &self,
        pairs: &[HandleContractPair],
        duration_days: u32,
    ) -> SdkResult<HashMap<CiphertextHandle, ClearValue>> {
        let ready = self.instances.ready().await?;

        let mut results = HashMap::with_capacity(pairs.len());
        let mut pending: Vec<HandleContractPair> = Vec::new();
        for pair in pairs {
            if pair.handle.is_zero() {
                results.insert(pair.handle, U256::zero());
            } else if !pending.contains(pair) {
                pending.push(*pair);
            }
        }

        if pending.is_empty() {
            debug!("Batch of {} handle(s) resolved locally", pairs.len());
            return Ok(results);
        }

        let values = self.user_decrypt(&ready, &pending, duration_days).await?;
        for pair in &pending {
            let value = take_value(&values, &pair.handle, "user decrypt")?;
            results.insert(pair.handle, value);
        }
        Ok(results)
    }

    /// Decrypt handles that contracts marked publicly decryptable. No signature.
    pub async fn public_decrypt(
        &self,
        handles: &[CiphertextHandle],
    ) -> SdkResult<HashMap<CiphertextHandle, ClearValue>> {
        let ready = self.instances.ready().await?;

        let mut results = HashMap::with_capacity(handles.len());
        let mut pending: Vec<CiphertextHandle> = Vec::new();
        for handle in handles {
            if handle.is_zero() {
                results.insert(*handle, U256::zero());
            } else if !pending.contains(handle) {
                pending.push(*handle);
            }
        }
        if pending.is_empty() {
            return Ok(results);
        }

        let _guard = InFlight::enter(&self.in_flight);
        let raw = ready
            .instance
            .public_decrypt(&pending)
            .await
            .map_err(|e| {
                warn!("Public decrypt of {} handle(s) failed: {}", pending.len(), e);
                SdkError::transport("public decrypt", e)
            })?;
        let values = normalize_values(raw)?;
        for handle in &pending {
            results.insert(*handle, take_value(&values, handle, "public decrypt")?);
        }
        Ok(results)
    }

    async fn user_decrypt(
        &self,
        ready: &ReadyInstance,
        pairs: &[HandleContractPair],
        duration_days: u32,
    ) -> SdkResult<HashMap<CiphertextHandle, ClearValue>> {
        let _guard = InFlight::enter(&self.in_flight);
        let account = ready.context.account;
        let signer = self.wallet.address();
        if signer != account {
            return Err(SdkError::SignerMismatch { signer, account });
        }

        let contracts = normalize_contracts(pairs.iter().map(|p| p.contract_address));
        let (session, signature) = self
            .authorize(ready, account, &contracts, duration_days)
            .await?;

        let window = session.window();
        let request = UserDecryptRequest {
            pairs,
            private_key: session.private_key(),
            public_key: session.public_key(),
            signature: &signature,
            contract_addresses: session.contract_addresses(),
            user_address: account,
            start_timestamp: window.start_timestamp,
            duration_days: window.duration_days,
        };

        debug!(
            "Submitting user decrypt for {} handle(s) across {} contract(s)",
            pairs.len(),
            contracts.len()
        );
        let raw = ready.instance.user_decrypt(&request).await.map_err(|e| {
            warn!("User decrypt failed: {}", e);
            SdkError::transport("user decrypt", e)
        })?;

        normalize_values(raw)
    }

    /// Steps 1-4 of the protocol: keypair, window, payload, signature.
    /// A cache hit returns a previously signed session instead.
    async fn authorize(
        &self,
        ready: &ReadyInstance,
        account: Address,
        contracts: &[Address],
        duration_days: u32,
    ) -> SdkResult<(Arc<DecryptionSession>, Signature)> {
        let key = SignatureCacheKey::new(account, contracts, duration_days);
        if let Some(cache) = &self.cache {
            if let Some(entry) = cache.get(&key).await {
                debug!(
                    "Reusing decryption authorization signed at {}",
                    entry.cached_at
                );
                return Ok((entry.session, entry.signature));
            }
        }

        let keypair = ready
            .instance
            .generate_keypair()
            .map_err(|e| SdkError::transport("keypair generation", e))?;
        let window = DecryptionWindow::new(self.clock.unix_timestamp(), duration_days);
        let session = Arc::new(DecryptionSession::from_keypair(
            keypair,
            window,
            contracts.to_vec(),
        )?);

        let payload = build_user_decrypt_payload(
            &self.domain,
            session.public_key(),
            session.contract_addresses(),
            &window,
        )?;

        info!(
            "Requesting decryption authorization from {:?} for {} contract(s), {} day(s)",
            account,
            contracts.len(),
            duration_days
        );
        let signature = self
            .wallet
            .sign_typed_data(&payload)
            .await
            .map_err(|e| {
                match &e {
                    WalletError::Rejected(reason) => {
                        info!("Decryption authorization declined: {}", reason)
                    }
                    WalletError::Failed(reason) => {
                        warn!("Decryption authorization failed: {}", reason)
                    }
                }
                SdkError::from(e)
            })?;

        if let Some(cache) = &self.cache {
            cache.insert(key, signature, session.clone()).await;
        }
        Ok((session, signature))
    }
}

fn normalize_values(
    raw: HashMap<String, RawClearValue>,
) -> SdkResult<HashMap<CiphertextHandle, ClearValue>> {
    raw.into_iter()
        .map(|(handle, value)| -> SdkResult<(CiphertextHandle, ClearValue)> {
            Ok((handle.parse()?, value.into_clear_value()?))
        })
        .collect()
}

fn take_value(
    values: &HashMap<CiphertextHandle, ClearValue>,
    handle: &CiphertextHandle,
    operation: &'static str,
) -> SdkResult<ClearValue> {
    values.get(handle).copied().ok_or_else(|| {
        SdkError::transport(
            operation,
            RelayerError::InvalidResponse(format!("no value returned for handle {}", handle)),
        )
    })
}
