// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decryption Authorization Cache
//!
//! Keeps a signed authorization (with the session it was signed for) so repeated
//! reveals within the TTL do not prompt the wallet again. Entries are evicted
//! lazily, on the first read after they expire.

use chrono::{DateTime, Duration, Utc};
use ethers::types::{Address, Signature};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::session::{normalize_contracts, DecryptionSession};
use crate::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureCacheKey {
    pub account: Address,
    pub contracts: Vec<Address>,
    pub duration_days: u32,
}

impl SignatureCacheKey {
    pub fn new(account: Address, contracts: &[Address], duration_days: u32) -> Self {
        Self {
            account,
            contracts: normalize_contracts(contracts.iter().copied()),
            duration_days,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignatureCacheEntry {
    pub signature: Signature,
    pub session: Arc<DecryptionSession>,
    pub cached_at: DateTime<Utc>,
}

/// Reusable decryption authorizations, keyed by account, contract set and window.
///
/// Each entry holds the session's private key for as long as the entry lives (up to the
/// TTL), instead of the key being dropped when the decrypt call returns. Enable it only
/// where that exposure is acceptable. The key is zeroized when the last holder of the
/// session drops it, on expiry, [`invalidate_account`](Self::invalidate_account) or
/// [`clear`](Self::clear).
pub struct SignatureCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<SignatureCacheKey, SignatureCacheEntry>>,
}

impl SignatureCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &SignatureCacheKey) -> Option<SignatureCacheEntry> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if self.is_fresh(entry, now) => return Some(entry.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Re-check under the write lock; an insert may have raced in
        if let Some(entry) = entries.get(key) {
            if self.is_fresh(entry, now) {
                return Some(entry.clone());
            }
            entries.remove(key);
            debug!(
                "Evicted expired decryption authorization for {:?} (remaining: {})",
                key.account,
                entries.len()
            );
        }
        None
    }

    pub async fn insert(
        &self,
        key: SignatureCacheKey,
        signature: Signature,
        session: Arc<DecryptionSession>,
    ) {
        let entry = SignatureCacheEntry {
            signature,
            session,
            cached_at: self.clock.now(),
        };
        let mut entries = self.entries.write().await;
        entries.insert(key, entry);
    }

    /// Drop everything signed by `account`, e.g. after an account switch
    pub async fn invalidate_account(&self, account: Address) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| key.account != account);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_fresh(&self, entry: &SignatureCacheEntry, now: DateTime<Utc>) -> bool {
        let within_ttl = now - entry.cached_at < self.ttl;
        let within_window = entry
            .session
            .window()
            .contains(now.timestamp().max(0) as u64);
        within_ttl && within_window
    }
}
