// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation-token behaviour under overlapping initialization attempts

use std::sync::atomic::Ordering;
use std::time::Duration;

use confidential_pay_sdk::lifecycle::{AccountContext, InitOutcome, InstanceStatus};
use tokio::time::sleep;

use crate::common::{alice, bob, manager_with, FakeRuntime, CHAIN_ID};

#[tokio::test(start_paused = true)]
async fn test_account_switch_discards_late_result() {
    // A's instance takes much longer to create than B's
    let runtime = FakeRuntime::new()
        .with_create_delay(alice(), Duration::from_secs(5))
        .with_create_delay(bob(), Duration::from_millis(10));
    let (manager, _runtime) = manager_with(runtime);

    let first = manager.clone();
    let second = manager.clone();
    let (a, b) = tokio::join!(
        async move { first.initialize(AccountContext::new(alice(), CHAIN_ID)).await },
        async move {
            sleep(Duration::from_millis(50)).await;
            second.initialize(AccountContext::new(bob(), CHAIN_ID)).await
        }
    );

    assert!(
        matches!(a, InitOutcome::Superseded { generation: 1, current: 2 }),
        "A's late result must be discarded, got {:?}",
        a
    );
    assert!(matches!(b, InitOutcome::Ready { generation: 2 }));

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.status, InstanceStatus::Ready);
    assert_eq!(snapshot.context.map(|c| c.account), Some(bob()));
    assert_eq!(snapshot.generation, 2);

    let ready = manager.ready().await.unwrap();
    assert_eq!(ready.context.account, bob());
}

#[tokio::test(start_paused = true)]
async fn test_double_initialize_commits_later_call_once() {
    let runtime = FakeRuntime::new().with_create_delay(alice(), Duration::from_millis(200));
    let (manager, runtime) = manager_with(runtime);
    let ctx = AccountContext::new(alice(), CHAIN_ID);

    let first = manager.clone();
    let second = manager.clone();
    let (a, b) = tokio::join!(
        async move { first.initialize(ctx).await },
        async move {
            sleep(Duration::from_millis(1)).await;
            second.initialize(ctx).await
        }
    );

    assert!(matches!(a, InitOutcome::Superseded { .. }));
    assert!(matches!(b, InitOutcome::Ready { generation: 2 }));
    assert_eq!(manager.status().await, InstanceStatus::Ready);
    // Both attempts ran to completion; only the later one was committed
    assert_eq!(runtime.stats.instances_created.load(Ordering::SeqCst), 2);
    assert_eq!(runtime.stats.bootstraps.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_initialize_same_ready_context_is_noop() {
    let (manager, runtime) = manager_with(FakeRuntime::new());
    let ctx = AccountContext::new(alice(), CHAIN_ID);

    assert!(manager.initialize(ctx).await.is_ready());
    let again = manager.initialize(ctx).await;

    assert!(matches!(again, InitOutcome::Ready { generation: 1 }));
    assert_eq!(runtime.stats.instances_created.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_initialization() {
    let runtime = FakeRuntime::new().with_create_delay(alice(), Duration::from_secs(1));
    let (manager, _runtime) = manager_with(runtime);

    let pending = manager.clone();
    let (outcome, _) = tokio::join!(
        async move {
            pending
                .initialize(AccountContext::new(alice(), CHAIN_ID))
                .await
        },
        async {
            sleep(Duration::from_millis(100)).await;
            manager.disconnect().await;
        }
    );

    assert!(matches!(outcome, InitOutcome::Superseded { .. }));
    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.status, InstanceStatus::Idle);
    assert!(snapshot.instance.is_none());
    assert!(snapshot.context.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_runs_once_across_accounts() {
    let (manager, runtime) = manager_with(FakeRuntime::new());

    assert!(manager
        .initialize(AccountContext::new(alice(), CHAIN_ID))
        .await
        .is_ready());
    assert!(manager
        .initialize(AccountContext::new(bob(), CHAIN_ID))
        .await
        .is_ready());

    assert_eq!(runtime.stats.bootstraps.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.stats.instances_created.load(Ordering::SeqCst), 2);
    assert_eq!(manager.current_generation(), 2);
}
