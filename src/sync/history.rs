// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transaction history assembly
//!
//! Three paged queries (sent, received, refunds) run concurrently, their logs are
//! decoded into [`TransactionRecord`]s, block numbers are resolved to timestamps,
//! refunded payments are flagged and the result is sorted newest first.

use ethers::types::{Address, Log, H256, U256};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use super::chain::ChainReader;
use super::events::{self, TransactionKind};
use super::pager::{FetchReport, LogPager};
use super::timestamps::resolve_block_timestamps;
use crate::clock::Clock;
use crate::config::{NetworkConfig, SyncPolicy};
use crate::error::{SdkError, SdkResult};
use crate::handle::CiphertextHandle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub event_id: H256,
    pub correlation_id: H256,
    /// The other party. For a refund, the payee of the refunded payment when that
    /// payment is in the same history, otherwise the gateway that paid it out.
    pub counterparty: Address,
    pub amount_handle: CiphertextHandle,
    pub block_number: u64,
    pub transaction_hash: Option<H256>,
    pub log_index: Option<U256>,
    /// Unix seconds; the lookup time when the block could not be resolved
    pub timestamp: u64,
    /// Set on sent payments that have a matching refund
    pub refunded: bool,
    /// Clear amount, once revealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<U256>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionHistory {
    pub records: Vec<TransactionRecord>,
    pub from_block: u64,
    pub to_block: u64,
    /// False if any query skipped pages or stopped early
    pub complete: bool,
}

pub struct HistoryAssembler {
    chain: Arc<dyn ChainReader>,
    clock: Arc<dyn Clock>,
    pager: LogPager,
    gateway: Address,
    deployment_block: u64,
    timestamp_batch_size: usize,
}

impl HistoryAssembler {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        clock: Arc<dyn Clock>,
        network: &NetworkConfig,
        policy: SyncPolicy,
    ) -> Self {
        let timestamp_batch_size = policy.timestamp_batch_size;
        Self {
            pager: LogPager::new(chain.clone(), policy),
            chain,
            clock,
            gateway: network.payment_gateway,
            deployment_block: network.deployment_block,
            timestamp_batch_size,
        }
    }

    /// History from the gateway's deployment block up to the current head
    pub async fn assemble_to_latest(&self, account: Address) -> SdkResult<TransactionHistory> {
        let latest = self
            .chain
            .latest_block()
            .await
            .map_err(|e| SdkError::transport("latest block", e))?;
        Ok(self.assemble(account, self.deployment_block, latest).await)
    }

    pub async fn assemble(
        &self,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> TransactionHistory {
        let sent_filter = events::sent_by(self.gateway, account);
        let received_filter = events::received_by(self.gateway, account);
        let refund_filter = events::refunds_to(self.gateway, account);

        let (sent, received, refunds) = tokio::join!(
            self.pager.fetch_range(&sent_filter, from_block, to_block),
            self.pager.fetch_range(&received_filter, from_block, to_block),
            self.pager.fetch_range(&refund_filter, from_block, to_block),
        );
        let complete = sent.is_complete() && received.is_complete() && refunds.is_complete();

        let mut records = Vec::new();
        records.extend(decode_report(&sent, TransactionKind::Sent));
        records.extend(decode_report(&received, TransactionKind::Received));
        records.extend(decode_report(&refunds, TransactionKind::Refund));

        let timestamps = resolve_block_timestamps(
            self.chain.as_ref(),
            self.clock.as_ref(),
            records.iter().map(|r| r.block_number),
            self.timestamp_batch_size,
        )
        .await;
        for record in &mut records {
            record.timestamp = timestamps
                .get(&record.block_number)
                .copied()
                .unwrap_or_else(|| self.clock.unix_timestamp());
        }

        mark_refunded(&mut records);
        sort_newest_first(&mut records);

        info!(
            "Assembled {} record(s) for {:?} over blocks {}-{}{}",
            records.len(),
            account,
            from_block,
            to_block,
            if complete { "" } else { " (partial)" }
        );

        TransactionHistory {
            records,
            from_block,
            to_block,
            complete,
        }
    }
}

fn decode_report(report: &FetchReport, kind: TransactionKind) -> Vec<TransactionRecord> {
    report
        .logs
        .iter()
        .filter_map(|log| match to_record(log, kind) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable {:?} log: {}", kind, e);
                None
            }
        })
        .collect()
}

fn to_record(log: &Log, kind: TransactionKind) -> anyhow::Result<TransactionRecord> {
    let block_number = log
        .block_number
        .ok_or_else(|| anyhow::anyhow!("log has no block number (pending)"))?
        .as_u64();
    let event = events::decode(log, kind)?;
    Ok(TransactionRecord {
        kind: event.kind,
        event_id: event.event_id,
        correlation_id: event.correlation_id,
        counterparty: event.counterparty,
        amount_handle: event.amount_handle,
        block_number,
        transaction_hash: log.transaction_hash,
        log_index: log.log_index,
        timestamp: 0,
        refunded: false,
        amount: None,
    })
}

/// Flag sent records whose correlation id has a refund, and point each such refund
/// at the original payee. Nothing is removed.
pub fn mark_refunded(records: &mut [TransactionRecord]) {
    let refunded: HashSet<H256> = records
        .iter()
        .filter(|r| r.kind == TransactionKind::Refund)
        .map(|r| r.correlation_id)
        .collect();

    let mut payees: HashMap<H256, Address> = HashMap::new();
    for record in records.iter_mut() {
        if record.kind == TransactionKind::Sent && refunded.contains(&record.correlation_id) {
            record.refunded = true;
            payees.insert(record.correlation_id, record.counterparty);
        }
    }

    for record in records.iter_mut() {
        if record.kind == TransactionKind::Refund {
            if let Some(payee) = payees.get(&record.correlation_id) {
                record.counterparty = *payee;
            }
        }
    }
}

/// Descending by timestamp; block and log index break ties so output is stable
pub fn sort_newest_first(records: &mut [TransactionRecord]) {
    records.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.block_number.cmp(&a.block_number))
            .then_with(|| match (b.log_index, a.log_index) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => Ordering::Equal,
            })
    });
}
