// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SDK Configuration
//!
//! Every timing and sizing constant used by the lifecycle manager, the signature
//! cache and the event sync engine lives here as an overridable default. Values can
//! come from code, a TOML file, or `CPAY_*` environment variables (a `.env` file is
//! honoured).

pub mod chains;

pub use chains::{NetworkConfig, NetworkRegistry};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub network: NetworkConfig,
    pub library_poll: LibraryPollConfig,
    pub sync: SyncPolicy,
    pub cache: CacheConfig,
}

/// Poll-with-deadline budget for runtime library availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryPollConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for LibraryPollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            max_attempts: 50,
        }
    }
}

impl LibraryPollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Paging and retry policy for historical log queries.
///
/// Defaults match common public RPC limits; none of them react to explicit
/// rate-limit responses from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPolicy {
    /// Maximum blocks per `eth_getLogs` call
    pub page_span: u64,
    pub page_delay_ms: u64,
    pub retry_backoff_ms: u64,
    /// Consecutive failed pages after which the walk stops early
    pub max_consecutive_failures: u32,
    pub timestamp_batch_size: usize,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            page_span: 500,
            page_delay_ms: 100,
            retry_backoff_ms: 1000,
            max_consecutive_failures: 3,
            timestamp_batch_size: 10,
        }
    }
}

impl SyncPolicy {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse decryption authorizations across calls
    pub signatures_enabled: bool,
    pub signature_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            signatures_enabled: false,
            signature_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Longest a cached decryption authorization may be reused (one year)
pub const MAX_SIGNATURE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

impl CacheConfig {
    /// Configured TTL, clamped to `MAX_SIGNATURE_TTL_SECS` for unvalidated values
    pub fn signature_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.signature_ttl_secs.min(MAX_SIGNATURE_TTL_SECS) as i64)
    }
}

impl SdkConfig {
    pub fn sepolia() -> Result<Self> {
        Ok(Self {
            network: NetworkConfig::sepolia()?,
            ..Self::default()
        })
    }

    /// Sepolia preset with `CPAY_*` environment overrides applied
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::sepolia()?;

        if let Ok(url) = std::env::var("CPAY_RPC_URL") {
            config.network.rpc_url = url;
        }
        if let Ok(url) = std::env::var("CPAY_RELAYER_URL") {
            config.network.relayer_url = url;
        }
        if let Ok(addr) = std::env::var("CPAY_PAYMENT_GATEWAY") {
            config.network.payment_gateway = chains::parse_address(&addr)?;
        }
        if let Some(chain_id) = env_parse("CPAY_CHAIN_ID")? {
            config.network.chain_id = chain_id;
        }
        if let Some(block) = env_parse("CPAY_DEPLOYMENT_BLOCK")? {
            config.network.deployment_block = block;
        }
        if let Some(span) = env_parse("CPAY_SYNC_PAGE_SPAN")? {
            config.sync.page_span = span;
        }
        if let Some(delay) = env_parse("CPAY_SYNC_PAGE_DELAY_MS")? {
            config.sync.page_delay_ms = delay;
        }
        if let Some(backoff) = env_parse("CPAY_SYNC_RETRY_BACKOFF_MS")? {
            config.sync.retry_backoff_ms = backoff;
        }
        if let Some(failures) = env_parse("CPAY_SYNC_MAX_FAILURES")? {
            config.sync.max_consecutive_failures = failures;
        }
        if let Some(ttl) = env_parse("CPAY_SIGNATURE_TTL_SECS")? {
            config.cache.signature_ttl_secs = ttl;
        }
        if let Some(enabled) = env_parse("CPAY_SIGNATURE_CACHE")? {
            config.cache.signatures_enabled = enabled;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SdkConfig =
            toml::from_str(contents).context("Failed to parse SDK configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.page_span == 0 {
            return Err(anyhow!("sync.page_span must be greater than zero"));
        }
        if self.sync.timestamp_batch_size == 0 {
            return Err(anyhow!("sync.timestamp_batch_size must be greater than zero"));
        }
        if self.sync.max_consecutive_failures == 0 {
            return Err(anyhow!("sync.max_consecutive_failures must be greater than zero"));
        }
        if self.library_poll.max_attempts == 0 {
            return Err(anyhow!("library_poll.max_attempts must be greater than zero"));
        }
        if self.cache.signature_ttl_secs > MAX_SIGNATURE_TTL_SECS {
            return Err(anyhow!(
                "cache.signature_ttl_secs must be at most {} (got {})",
                MAX_SIGNATURE_TTL_SECS,
                self.cache.signature_ttl_secs
            ));
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(None),
    }
}
