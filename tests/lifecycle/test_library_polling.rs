// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::atomic::Ordering;

use confidential_pay_sdk::error::SdkError;
use confidential_pay_sdk::lifecycle::{AccountContext, InitOutcome, InstanceStatus};
use tokio::time::Instant;

use crate::common::{alice, manager_with, FakeRuntime, CHAIN_ID};

#[tokio::test(start_paused = true)]
async fn test_unavailable_library_fails_after_deadline() {
    let (manager, runtime) = manager_with(FakeRuntime::new().unavailable());
    let started = Instant::now();

    let outcome = manager
        .initialize(AccountContext::new(alice(), CHAIN_ID))
        .await;

    match outcome {
        InitOutcome::Failed { error, .. } => {
            assert!(matches!(*error, SdkError::NotAvailable { attempts: 5 }));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
    // 5 probes, 4 waits of 100ms in between
    assert_eq!(runtime.stats.probes.load(Ordering::SeqCst), 5);
    let elapsed = started.elapsed().as_millis();
    assert!((400..410).contains(&elapsed), "elapsed {}ms", elapsed);
    assert_eq!(manager.status().await, InstanceStatus::Error);
    assert!(matches!(
        manager.ready().await,
        Err(SdkError::NotReady {
            status: InstanceStatus::Error
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_failed_context_waits_for_reinitialize() {
    let (manager, runtime) = manager_with(FakeRuntime::new().unavailable());
    let ctx = AccountContext::new(alice(), CHAIN_ID);

    assert!(matches!(
        manager.initialize(ctx).await,
        InitOutcome::Failed { .. }
    ));
    let probes = runtime.stats.probes.load(Ordering::SeqCst);

    // Same context again: reported as failed without another attempt
    assert!(matches!(
        manager.initialize(ctx).await,
        InitOutcome::Failed { .. }
    ));
    assert_eq!(runtime.stats.probes.load(Ordering::SeqCst), probes);

    runtime.available.store(true, Ordering::SeqCst);
    let outcome = manager.reinitialize().await.unwrap();
    assert!(outcome.is_ready());
    assert_eq!(manager.status().await, InstanceStatus::Ready);
}

#[tokio::test]
async fn test_reinitialize_without_context_is_not_ready() {
    let (manager, _runtime) = manager_with(FakeRuntime::new());
    assert!(matches!(
        manager.reinitialize().await,
        Err(SdkError::NotReady {
            status: InstanceStatus::Idle
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_status_updates_are_published() {
    let (manager, _runtime) = manager_with(FakeRuntime::new());
    let mut status_rx = manager.subscribe();
    assert_eq!(*status_rx.borrow(), InstanceStatus::Idle);

    manager
        .initialize(AccountContext::new(alice(), CHAIN_ID))
        .await;

    assert!(status_rx.has_changed().unwrap());
    assert_eq!(*status_rx.borrow_and_update(), InstanceStatus::Ready);

    manager.disconnect().await;
    assert_eq!(*status_rx.borrow_and_update(), InstanceStatus::Idle);
}
