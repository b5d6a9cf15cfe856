// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use ethers::types::Address;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::clock::SystemClock;
use crate::config::SdkConfig;
use crate::sync::{ChainReader, HistoryAssembler, RpcChainReader, TransactionHistory, TransactionKind};

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Account whose payments to list
    #[arg(long)]
    pub account: String,

    /// First block to scan (defaults to the gateway deployment block)
    #[arg(long)]
    pub from_block: Option<u64>,

    /// Last block to scan (defaults to the chain head)
    #[arg(long)]
    pub to_block: Option<u64>,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn show_history(args: HistoryArgs, config: &SdkConfig) -> Result<()> {
    let account = Address::from_str(&args.account)
        .map_err(|e| anyhow!("Invalid account address {}: {}", args.account, e))?;
    if config.network.payment_gateway.is_zero() {
        return Err(anyhow!(
            "No payment gateway configured. Set CPAY_PAYMENT_GATEWAY or network.payment_gateway"
        ));
    }

    let reader = RpcChainReader::connect(
        &config.network.rpc_url,
        config.network.chain_id,
        Duration::from_millis(config.sync.page_delay_ms.max(1)),
    )
    .await?;
    let chain: Arc<dyn ChainReader> = Arc::new(reader);

    let from_block = args.from_block.unwrap_or(config.network.deployment_block);
    let to_block = match args.to_block {
        Some(block) => block,
        None => chain.latest_block().await?,
    };
    if from_block > to_block {
        return Err(anyhow!(
            "--from-block {} is after --to-block {}",
            from_block,
            to_block
        ));
    }

    info!(
        "Scanning blocks {}-{} on {} for {:?}",
        from_block, to_block, config.network.name, account
    );
    let assembler = HistoryAssembler::new(
        chain,
        Arc::new(SystemClock),
        &config.network,
        config.sync.clone(),
    );
    let history = assembler.assemble(account, from_block, to_block).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history.records)?);
    } else {
        print_table(&history);
    }
    Ok(())
}

fn print_table(history: &TransactionHistory) {
    println!(
        "\n📜 {} transaction(s) in blocks {}-{}",
        history.records.len(),
        history.from_block,
        history.to_block
    );
    if !history.complete {
        println!("⚠️  Some log pages could not be fetched; history may be incomplete");
    }

    for record in &history.records {
        let when = DateTime::<Utc>::from_timestamp(record.timestamp as i64, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| record.timestamp.to_string());
        let direction = match record.kind {
            TransactionKind::Sent => "sent to",
            TransactionKind::Received => "received from",
            TransactionKind::Refund => "refund from",
        };
        println!(
            "  {}  {:<13} {:?}  block {}{}",
            when,
            direction,
            record.counterparty,
            record.block_number,
            if record.refunded { "  (refunded)" } else { "" }
        );
        println!("      amount handle {}", record.amount_handle);
    }
}
