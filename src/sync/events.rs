// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Payment gateway events and the log filters used to query them per account.
//!
//! Topic layout (topic0 is the event signature):
//!
//! | event           | topic1            | topic2    | topic3    |
//! |-----------------|-------------------|-----------|-----------|
//! | PaymentSent     | paymentId         | sender    | recipient |
//! | PaymentReceived | paymentId         | recipient | sender    |
//! | RefundIssued    | refundId          | paymentId | recipient |

use anyhow::{anyhow, Result};
use ethers::contract::{parse_log, EthEvent};
use ethers::prelude::*;

use crate::handle::CiphertextHandle;

abigen!(
    ConfidentialPaymentGateway,
    r#"[
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "bytes32", "name": "paymentId", "type": "bytes32"},
                {"indexed": true, "internalType": "address", "name": "sender", "type": "address"},
                {"indexed": true, "internalType": "address", "name": "recipient", "type": "address"},
                {"indexed": false, "internalType": "bytes32", "name": "amountHandle", "type": "bytes32"}
            ],
            "name": "PaymentSent",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "bytes32", "name": "paymentId", "type": "bytes32"},
                {"indexed": true, "internalType": "address", "name": "recipient", "type": "address"},
                {"indexed": true, "internalType": "address", "name": "sender", "type": "address"},
                {"indexed": false, "internalType": "bytes32", "name": "amountHandle", "type": "bytes32"}
            ],
            "name": "PaymentReceived",
            "type": "event"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "bytes32", "name": "refundId", "type": "bytes32"},
                {"indexed": true, "internalType": "bytes32", "name": "paymentId", "type": "bytes32"},
                {"indexed": true, "internalType": "address", "name": "recipient", "type": "address"},
                {"indexed": false, "internalType": "bytes32", "name": "amountHandle", "type": "bytes32"}
            ],
            "name": "RefundIssued",
            "type": "event"
        }
    ]"#
);

/// Which of the three account queries a log came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sent,
    Received,
    Refund,
}

/// Fields common to all three events once decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub kind: TransactionKind,
    /// Id of the event itself (payment id, or refund id for refunds)
    pub event_id: H256,
    /// Payment id shared between a payment and its refund
    pub correlation_id: H256,
    pub counterparty: Address,
    pub amount_handle: CiphertextHandle,
}

fn address_topic(account: Address) -> H256 {
    H256::from(account)
}

/// Payments sent by `account`
pub fn sent_by(gateway: Address, account: Address) -> Filter {
    Filter::new()
        .address(gateway)
        .topic0(PaymentSentFilter::signature())
        .topic2(address_topic(account))
}

/// Payments received by `account`
pub fn received_by(gateway: Address, account: Address) -> Filter {
    Filter::new()
        .address(gateway)
        .topic0(PaymentReceivedFilter::signature())
        .topic2(address_topic(account))
}

/// Refunds paid out to `account`
pub fn refunds_to(gateway: Address, account: Address) -> Filter {
    Filter::new()
        .address(gateway)
        .topic0(RefundIssuedFilter::signature())
        .topic3(address_topic(account))
}

pub fn decode(log: &Log, kind: TransactionKind) -> Result<DecodedEvent> {
    let decoded = match kind {
        TransactionKind::Sent => {
            let event: PaymentSentFilter = parse_log(log.clone())
                .map_err(|e| anyhow!("Failed to decode PaymentSent: {}", e))?;
            DecodedEvent {
                kind,
                event_id: H256::from(event.payment_id),
                correlation_id: H256::from(event.payment_id),
                counterparty: event.recipient,
                amount_handle: CiphertextHandle::new(event.amount_handle),
            }
        }
        TransactionKind::Received => {
            let event: PaymentReceivedFilter = parse_log(log.clone())
                .map_err(|e| anyhow!("Failed to decode PaymentReceived: {}", e))?;
            DecodedEvent {
                kind,
                event_id: H256::from(event.payment_id),
                correlation_id: H256::from(event.payment_id),
                counterparty: event.sender,
                amount_handle: CiphertextHandle::new(event.amount_handle),
            }
        }
        TransactionKind::Refund => {
            let event: RefundIssuedFilter = parse_log(log.clone())
                .map_err(|e| anyhow!("Failed to decode RefundIssued: {}", e))?;
            // The recipient is the queried account; the gateway is the payer
            DecodedEvent {
                kind,
                event_id: H256::from(event.refund_id),
                correlation_id: H256::from(event.payment_id),
                counterparty: log.address,
                amount_handle: CiphertextHandle::new(event.amount_handle),
            }
        }
    };
    Ok(decoded)
}
