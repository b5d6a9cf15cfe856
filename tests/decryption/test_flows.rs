// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;

use confidential_pay_sdk::clock::SystemClock;
use confidential_pay_sdk::decryption::DecryptionGateway;
use confidential_pay_sdk::error::{SdkError, WalletError};
use confidential_pay_sdk::flows::{
    reveal_balance, reveal_history_amounts, verify_payment, BALANCE_REVEAL_DAYS,
    PAYMENT_VERIFICATION_DAYS,
};
use confidential_pay_sdk::handle::CiphertextHandle;
use confidential_pay_sdk::sync::{TransactionKind, TransactionRecord};
use ethers::types::{H256, U256};

use crate::common::{
    alice, bob, gateway_contract, ready_manager, signing_wallet, token_contract, MockWallet,
};

#[tokio::test]
async fn test_reveal_balance_uses_ten_day_window() {
    let (manager, runtime) = ready_manager(alice()).await;
    let balance = runtime.ledger.mint(U256::from(250_000));
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 1)),
        Arc::new(SystemClock),
    );

    let value = reveal_balance(&gateway, balance, token_contract()).await.unwrap();

    assert_eq!(value, U256::from(250_000));
    assert_eq!(
        *runtime.stats.durations_seen.lock().unwrap(),
        vec![BALANCE_REVEAL_DAYS]
    );
}

#[tokio::test]
async fn test_verify_payment_reports_mismatch() {
    let (manager, runtime) = ready_manager(alice()).await;
    let amount = runtime.ledger.mint(U256::from(1500));
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 2)),
        Arc::new(SystemClock),
    );

    let ok = verify_payment(&gateway, amount, gateway_contract(), U256::from(1500))
        .await
        .unwrap();
    assert!(ok.matches());

    let bad = verify_payment(&gateway, amount, gateway_contract(), U256::from(1499))
        .await
        .unwrap();
    assert!(!bad.matches());
    assert_eq!(bad.actual, U256::from(1500));
    assert!(runtime
        .stats
        .durations_seen
        .lock()
        .unwrap()
        .iter()
        .all(|days| *days == PAYMENT_VERIFICATION_DAYS));
}

#[tokio::test]
async fn test_flows_propagate_rejection() {
    let (manager, runtime) = ready_manager(alice()).await;
    let balance = runtime.ledger.mint(U256::from(1));
    let mut wallet = MockWallet::new();
    wallet.expect_address().return_const(alice());
    wallet
        .expect_sign_typed_data()
        .returning(|_| Err(WalletError::Rejected("dismissed".into())));
    let gateway = DecryptionGateway::new(manager, Arc::new(wallet), Arc::new(SystemClock));

    let err = reveal_balance(&gateway, balance, token_contract())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::AuthorizationRejected { .. }));
}

#[tokio::test]
async fn test_reveal_history_amounts_signs_once() {
    let (manager, runtime) = ready_manager(alice()).await;
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 1)),
        Arc::new(SystemClock),
    );

    let amounts = [U256::from(10), U256::from(20)];
    let mut records: Vec<TransactionRecord> = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| TransactionRecord {
            kind: TransactionKind::Sent,
            event_id: H256::from_low_u64_be(i as u64),
            correlation_id: H256::from_low_u64_be(i as u64),
            counterparty: bob(),
            amount_handle: runtime.ledger.mint(*amount),
            block_number: 100 + i as u64,
            transaction_hash: None,
            log_index: None,
            timestamp: 0,
            refunded: false,
            amount: None,
        })
        .collect();
    let unfunded = TransactionRecord {
        amount_handle: CiphertextHandle::ZERO,
        ..records[0].clone()
    };
    records.push(unfunded);

    reveal_history_amounts(&gateway, gateway_contract(), &mut records, 1)
        .await
        .unwrap();

    assert_eq!(records[0].amount, Some(U256::from(10)));
    assert_eq!(records[1].amount, Some(U256::from(20)));
    assert_eq!(records[2].amount, Some(U256::zero()));
    assert_eq!(runtime.stats.user_decrypts(), 1);
}
