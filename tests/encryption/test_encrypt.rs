// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::atomic::Ordering;
use std::sync::Arc;

use confidential_pay_sdk::encryption::EncryptionGateway;
use confidential_pay_sdk::error::SdkError;
use confidential_pay_sdk::lifecycle::InstanceStatus;
use ethers::types::U256;

use crate::common::{alice, gateway_contract, manager_with, ready_manager, FakeRuntime};

#[tokio::test]
async fn test_range_boundaries() {
    let (manager, runtime) = ready_manager(alice()).await;
    let gateway = EncryptionGateway::new(manager);

    for value in [-1i128, u64::MAX as i128 + 1, i128::MIN] {
        let err = gateway
            .encrypt(value, gateway_contract(), alice())
            .await
            .unwrap_err();
        assert!(
            matches!(err, SdkError::Range { .. }),
            "{} should be out of range, got {:?}",
            value,
            err
        );
    }
    assert_eq!(runtime.stats.encrypt_calls.load(Ordering::SeqCst), 0);

    for value in [0i128, u64::MAX as i128] {
        let input = gateway
            .encrypt(value, gateway_contract(), alice())
            .await
            .unwrap();
        assert_eq!(input.handles.len(), 1);
        assert_eq!(
            runtime.ledger.get(&input.handles[0]),
            Some(U256::from(value as u64))
        );
    }
}

#[tokio::test]
async fn test_not_ready_is_checked_before_range() {
    let (manager, runtime) = manager_with(FakeRuntime::new());
    let gateway = EncryptionGateway::new(manager);

    let err = gateway
        .encrypt(-5, gateway_contract(), alice())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SdkError::NotReady {
            status: InstanceStatus::Idle
        }
    ));
    assert_eq!(runtime.stats.encrypt_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handles_normalized_from_both_representations() {
    let (manager, _runtime) = ready_manager(alice()).await;
    let gateway = Arc::new(EncryptionGateway::new(manager));

    // The fake alternates hex strings and byte buffers between calls
    let first = gateway
        .encrypt_u64(1500, gateway_contract(), alice())
        .await
        .unwrap();
    let second = gateway
        .encrypt_u64(1500, gateway_contract(), alice())
        .await
        .unwrap();

    for input in [&first, &second] {
        assert_eq!(input.handles.len(), 1);
        assert!(!input.handles[0].is_zero());
        assert_eq!(input.input_proof.len(), 64);
        assert!(input.handles[0].to_hex().starts_with("0x"));
    }
    assert_ne!(first.handles[0], second.handles[0]);
    assert!(!gateway.is_encrypting());
}
