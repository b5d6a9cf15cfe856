// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Paged `eth_getLogs` walk.
//!
//! Pages are requested one at a time in ascending block order. A failed page is
//! logged, followed by the retry backoff, and the walk moves on without its
//! records. Once `max_consecutive_failures` pages fail in a row the walk stops and
//! reports what it has so far. The failure counter resets on every successful page.

use ethers::types::{Filter, Log};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::chain::ChainReader;
use crate::config::SyncPolicy;

/// An inclusive `[from_block, to_block]` sub-range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPage {
    pub from_block: u64,
    pub to_block: u64,
}

impl SyncPage {
    /// Split `[from_block, to_block]` into pages of at most `span` blocks
    pub fn split(from_block: u64, to_block: u64, span: u64) -> Vec<SyncPage> {
        let span = span.max(1);
        let mut pages = Vec::new();
        if from_block > to_block {
            return pages;
        }

        let mut start = from_block;
        loop {
            let end = start.saturating_add(span - 1).min(to_block);
            pages.push(SyncPage {
                from_block: start,
                to_block: end,
            });
            if end >= to_block {
                break;
            }
            start = end + 1;
        }
        pages
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub logs: Vec<Log>,
    pub pages_total: usize,
    pub pages_attempted: usize,
    pub pages_failed: usize,
    /// Walk stopped early on consecutive failures
    pub aborted: bool,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.pages_failed == 0
    }
}

pub struct LogPager {
    chain: Arc<dyn ChainReader>,
    policy: SyncPolicy,
}

impl LogPager {
    pub fn new(chain: Arc<dyn ChainReader>, policy: SyncPolicy) -> Self {
        Self { chain, policy }
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Walk `[from_block, to_block]` with `filter`. Never fails; partial results are
    /// flagged on the report instead.
    pub async fn fetch_range(&self, filter: &Filter, from_block: u64, to_block: u64) -> FetchReport {
        let pages = SyncPage::split(from_block, to_block, self.policy.page_span);
        let mut report = FetchReport {
            pages_total: pages.len(),
            ..FetchReport::default()
        };
        let mut consecutive_failures = 0u32;

        for (index, page) in pages.iter().enumerate() {
            let page_filter = filter
                .clone()
                .from_block(page.from_block)
                .to_block(page.to_block);
            report.pages_attempted += 1;

            let succeeded = match self.chain.get_logs(&page_filter).await {
                Ok(logs) => {
                    debug!(
                        "Fetched {} log(s) from blocks {}-{}",
                        logs.len(),
                        page.from_block,
                        page.to_block
                    );
                    consecutive_failures = 0;
                    report.logs.extend(logs);
                    true
                }
                Err(e) => {
                    consecutive_failures += 1;
                    report.pages_failed += 1;
                    warn!(
                        "Log query for blocks {}-{} failed ({} in a row): {}",
                        page.from_block, page.to_block, consecutive_failures, e
                    );
                    if consecutive_failures >= self.policy.max_consecutive_failures {
                        warn!(
                            "Stopping log walk at block {} after {} consecutive failures; returning {} log(s)",
                            page.from_block,
                            consecutive_failures,
                            report.logs.len()
                        );
                        report.aborted = true;
                        break;
                    }
                    false
                }
            };

            if index + 1 < pages.len() {
                if succeeded {
                    sleep(self.policy.page_delay()).await;
                } else {
                    sleep(self.policy.retry_backoff()).await;
                }
            }
        }

        if report.pages_failed > 0 && !report.aborted {
            info!(
                "Log walk {}-{} finished with {} of {} page(s) missing",
                from_block, to_block, report.pages_failed, report.pages_total
            );
        }
        report
    }
}
