// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::sync::Arc;
use std::time::Duration;

/// Read-only RPC surface the sync engine needs
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>>;

    /// Unix timestamp (seconds) of a block
    async fn block_timestamp(&self, block_number: u64) -> Result<u64>;

    async fn latest_block(&self) -> Result<u64>;
}

pub struct RpcChainReader<M> {
    provider: Arc<M>,
}

impl<M> RpcChainReader<M> {
    pub fn new(provider: Arc<M>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Arc<M> {
        self.provider.clone()
    }
}

impl RpcChainReader<Provider<Http>> {
    /// Connect over HTTP and make sure the endpoint serves the expected chain
    pub async fn connect(
        rpc_url: &str,
        expected_chain_id: u64,
        polling_interval: Duration,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| anyhow!("Failed to create provider: {}", e))?
            .interval(polling_interval);

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| anyhow!("Failed to connect to RPC: {}", e))?;

        if chain_id.as_u64() != expected_chain_id {
            return Err(anyhow!(
                "Chain ID mismatch: expected {}, got {}",
                expected_chain_id,
                chain_id
            ));
        }

        Ok(Self::new(Arc::new(provider)))
    }
}

#[async_trait]
impl<M> ChainReader for RpcChainReader<M>
where
    M: Middleware + 'static,
{
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        self.provider
            .get_logs(filter)
            .await
            .map_err(|e| anyhow!("eth_getLogs failed: {}", e))
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64> {
        let block = self
            .provider
            .get_block(block_number)
            .await
            .map_err(|e| anyhow!("eth_getBlockByNumber({}) failed: {}", block_number, e))?
            .ok_or_else(|| anyhow!("Block {} not found", block_number))?;
        Ok(block.timestamp.as_u64())
    }

    async fn latest_block(&self) -> Result<u64> {
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| anyhow!("eth_blockNumber failed: {}", e))?;
        Ok(block_number.as_u64())
    }
}
