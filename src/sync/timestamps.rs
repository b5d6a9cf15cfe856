// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use super::chain::ChainReader;
use crate::clock::Clock;

/// Resolve block numbers to unix timestamps, `batch_size` lookups at a time.
///
/// Lookups inside a batch run concurrently; batches run one after another. A
/// lookup that fails falls back to the clock's current time.
pub async fn resolve_block_timestamps<I>(
    chain: &dyn ChainReader,
    clock: &dyn Clock,
    blocks: I,
    batch_size: usize,
) -> HashMap<u64, u64>
where
    I: IntoIterator<Item = u64>,
{
    let unique: Vec<u64> = blocks.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let mut timestamps = HashMap::with_capacity(unique.len());

    for batch in unique.chunks(batch_size.max(1)) {
        let lookups = batch.iter().map(|&block| async move {
            (block, chain.block_timestamp(block).await)
        });

        for (block, result) in join_all(lookups).await {
            let timestamp = match result {
                Ok(timestamp) => timestamp,
                Err(e) => {
                    let now = clock.unix_timestamp();
                    warn!("Timestamp lookup for block {} failed, using now ({}): {}", block, now, e);
                    now
                }
            };
            timestamps.insert(block, timestamp);
        }
    }

    debug!("Resolved {} block timestamp(s)", timestamps.len());
    timestamps
}
