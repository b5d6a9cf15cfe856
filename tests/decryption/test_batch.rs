// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;

use confidential_pay_sdk::clock::SystemClock;
use confidential_pay_sdk::decryption::DecryptionGateway;
use confidential_pay_sdk::handle::CiphertextHandle;
use confidential_pay_sdk::relayer::HandleContractPair;
use ethers::types::U256;

use crate::common::{alice, gateway_contract, ready_manager, signing_wallet, token_contract};

fn pair(handle: CiphertextHandle, contract: ethers::types::Address) -> HandleContractPair {
    HandleContractPair {
        handle,
        contract_address: contract,
    }
}

#[tokio::test]
async fn test_single_element_batch_matches_decrypt_one() {
    let (manager, runtime) = ready_manager(alice()).await;
    let handle = runtime.ledger.mint(U256::from(1234));
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 2)),
        Arc::new(SystemClock),
    );

    let one = gateway
        .decrypt_one(handle, gateway_contract(), 1)
        .await
        .unwrap();
    let batch = gateway
        .decrypt_batch(&[pair(handle, gateway_contract())], 1)
        .await
        .unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch[&handle], one);
}

#[tokio::test]
async fn test_all_zero_batch_requests_no_signature() {
    let (manager, runtime) = ready_manager(alice()).await;
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 0)),
        Arc::new(SystemClock),
    );

    let values = gateway
        .decrypt_batch(
            &[
                pair(CiphertextHandle::ZERO, gateway_contract()),
                pair(CiphertextHandle::ZERO, token_contract()),
            ],
            10,
        )
        .await
        .unwrap();

    assert_eq!(values.len(), 1);
    assert_eq!(values[&CiphertextHandle::ZERO], U256::zero());
    assert_eq!(runtime.stats.keypairs(), 0);
    assert_eq!(runtime.stats.user_decrypts(), 0);
}

#[tokio::test]
async fn test_mixed_batch_only_sends_nonzero_handles() {
    let (manager, runtime) = ready_manager(alice()).await;
    let h1 = runtime.ledger.mint(U256::from(50));
    let h2 = runtime.ledger.mint(U256::from(75));
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 1)),
        Arc::new(SystemClock),
    );

    let values = gateway
        .decrypt_batch(
            &[
                pair(CiphertextHandle::ZERO, gateway_contract()),
                pair(h1, gateway_contract()),
                pair(h2, token_contract()),
                pair(h1, gateway_contract()),
            ],
            1,
        )
        .await
        .unwrap();

    assert_eq!(values[&CiphertextHandle::ZERO], U256::zero());
    assert_eq!(values[&h1], U256::from(50));
    assert_eq!(values[&h2], U256::from(75));
    // One signature, one relayer call, duplicates and zeros left out
    assert_eq!(runtime.stats.user_decrypts(), 1);
    assert_eq!(*runtime.stats.decrypted_handles.lock().unwrap(), vec![h1, h2]);
}

#[tokio::test]
async fn test_unknown_handle_reports_missing_value() {
    let (manager, _runtime) = ready_manager(alice()).await;
    let gateway = DecryptionGateway::new(
        manager,
        Arc::new(signing_wallet(alice(), 1)),
        Arc::new(SystemClock),
    );

    let result = gateway
        .decrypt_batch(&[pair(CiphertextHandle::new([0x42; 32]), gateway_contract())], 1)
        .await;
    assert!(result.is_err());
}
