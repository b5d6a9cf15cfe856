// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;

use confidential_pay_sdk::clock::ManualClock;
use confidential_pay_sdk::config::{NetworkConfig, SyncPolicy};
use confidential_pay_sdk::handle::CiphertextHandle;
use confidential_pay_sdk::sync::events::{
    PaymentReceivedFilter, PaymentSentFilter, RefundIssuedFilter,
};
use confidential_pay_sdk::sync::{HistoryAssembler, TransactionKind};
use ethers::contract::EthEvent;
use ethers::types::{Address, Log, H256};

use crate::common::{alice, bob, event_log, gateway_contract, FakeChain};

const NOW: i64 = 1_760_000_000;

fn carol() -> Address {
    Address::repeat_byte(0xc0)
}

fn payment_id(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}

fn sent(id: u64, from: Address, to: Address, block: u64) -> Log {
    event_log(
        gateway_contract(),
        vec![
            PaymentSentFilter::signature(),
            payment_id(id),
            H256::from(from),
            H256::from(to),
        ],
        [id as u8; 32],
        block,
        0,
    )
}

fn received(id: u64, to: Address, from: Address, block: u64) -> Log {
    event_log(
        gateway_contract(),
        vec![
            PaymentReceivedFilter::signature(),
            payment_id(id),
            H256::from(to),
            H256::from(from),
        ],
        [id as u8; 32],
        block,
        1,
    )
}

fn refund(refund_id: u64, original: u64, to: Address, block: u64) -> Log {
    event_log(
        gateway_contract(),
        vec![
            RefundIssuedFilter::signature(),
            payment_id(refund_id),
            payment_id(original),
            H256::from(to),
        ],
        [refund_id as u8; 32],
        block,
        2,
    )
}

fn network() -> NetworkConfig {
    NetworkConfig {
        payment_gateway: gateway_contract(),
        deployment_block: 50,
        ..NetworkConfig::local()
    }
}

fn assembler(chain: Arc<FakeChain>) -> HistoryAssembler {
    HistoryAssembler::new(
        chain,
        Arc::new(ManualClock::at_unix(NOW)),
        &network(),
        SyncPolicy::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_history_joins_refunds_and_sorts_newest_first() {
    let chain = Arc::new(FakeChain::new(2499).with_logs(vec![
        sent(1, alice(), bob(), 100),
        received(2, alice(), carol(), 600),
        refund(3, 1, alice(), 1100),
        sent(4, alice(), carol(), 1600),
        // Not alice's
        sent(5, bob(), carol(), 2000),
        received(6, bob(), alice(), 2100),
    ]));

    let history = assembler(chain).assemble(alice(), 0, 2499).await;

    assert!(history.complete);
    let kinds: Vec<TransactionKind> = history.records.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Sent,
            TransactionKind::Refund,
            TransactionKind::Received,
            TransactionKind::Sent,
        ]
    );

    let timestamps: Vec<u64> = history.records.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1600 * 12, 1100 * 12, 600 * 12, 100 * 12]);

    let original = &history.records[3];
    assert_eq!(original.correlation_id, payment_id(1));
    assert_eq!(original.counterparty, bob());
    assert!(original.refunded);
    assert!(!history.records[0].refunded);

    let refund_record = &history.records[1];
    assert_eq!(refund_record.event_id, payment_id(3));
    assert_eq!(refund_record.correlation_id, payment_id(1));
    assert_eq!(refund_record.counterparty, bob());

    let incoming = &history.records[2];
    assert_eq!(incoming.counterparty, carol());
    assert_eq!(incoming.amount_handle, CiphertextHandle::new([2; 32]));
}

#[tokio::test(start_paused = true)]
async fn test_unresolvable_block_uses_now() {
    let chain = Arc::new(
        FakeChain::new(999)
            .with_logs(vec![sent(1, alice(), bob(), 10), sent(2, alice(), bob(), 20)])
            .failing_timestamp(20),
    );

    let history = assembler(chain).assemble(alice(), 0, 999).await;

    assert_eq!(history.records.len(), 2);
    assert_eq!(history.records[0].timestamp, NOW as u64);
    assert_eq!(history.records[0].block_number, 20);
    assert_eq!(history.records[1].timestamp, 10 * 12);
}

#[tokio::test(start_paused = true)]
async fn test_partial_history_is_flagged() {
    let chain = Arc::new(
        FakeChain::new(999)
            .with_logs(vec![sent(1, alice(), bob(), 10), sent(2, alice(), bob(), 700)])
            .failing_page(500),
    );

    let history = assembler(chain).assemble(alice(), 0, 999).await;

    assert!(!history.complete);
    assert_eq!(history.records.len(), 1);
    assert_eq!(history.records[0].block_number, 10);
}

#[tokio::test(start_paused = true)]
async fn test_assemble_to_latest_starts_at_deployment_block() {
    let chain = Arc::new(FakeChain::new(1200).with_logs(vec![
        sent(1, alice(), bob(), 10),
        sent(2, alice(), bob(), 900),
    ]));

    let history = assembler(chain.clone())
        .assemble_to_latest(alice())
        .await
        .unwrap();

    assert_eq!(history.from_block, 50);
    assert_eq!(history.to_block, 1200);
    assert_eq!(history.records.len(), 1);
    assert!(chain.queried_pages().contains(&(50, 549)));
}
