// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Higher-level flows built on the gateways.
//!
//! These pass gateway errors straight up so the caller can retry or compensate.

use ethers::types::{Address, U256};
use serde::Serialize;
use tracing::{info, warn};

use crate::decryption::DecryptionGateway;
use crate::error::SdkResult;
use crate::handle::{CiphertextHandle, ClearValue};
use crate::relayer::HandleContractPair;
use crate::sync::TransactionRecord;

/// Authorization window used when revealing a balance
pub const BALANCE_REVEAL_DAYS: u32 = 10;

/// Authorization window used when checking a single payment amount
pub const PAYMENT_VERIFICATION_DAYS: u32 = 1;

pub async fn reveal_balance(
    gateway: &DecryptionGateway,
    balance_handle: CiphertextHandle,
    token_contract: Address,
) -> SdkResult<ClearValue> {
    let balance = gateway
        .decrypt_one(balance_handle, token_contract, BALANCE_REVEAL_DAYS)
        .await?;
    info!("Revealed balance for token {:?}", token_contract);
    Ok(balance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentVerification {
    pub expected: U256,
    pub actual: U256,
}

impl PaymentVerification {
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

pub async fn verify_payment(
    gateway: &DecryptionGateway,
    amount_handle: CiphertextHandle,
    payment_contract: Address,
    expected: U256,
) -> SdkResult<PaymentVerification> {
    let actual = gateway
        .decrypt_one(amount_handle, payment_contract, PAYMENT_VERIFICATION_DAYS)
        .await?;
    let verification = PaymentVerification { expected, actual };
    if !verification.matches() {
        warn!(
            "Payment amount mismatch for handle {}: expected {}, got {}",
            amount_handle, expected, actual
        );
    }
    Ok(verification)
}

/// Fill in `amount` on history records with one signature for the whole set.
pub async fn reveal_history_amounts(
    gateway: &DecryptionGateway,
    payment_contract: Address,
    records: &mut [TransactionRecord],
    duration_days: u32,
) -> SdkResult<()> {
    let pairs: Vec<HandleContractPair> = records
        .iter()
        .map(|record| HandleContractPair {
            handle: record.amount_handle,
            contract_address: payment_contract,
        })
        .collect();
    if pairs.is_empty() {
        return Ok(());
    }

    let values = gateway.decrypt_batch(&pairs, duration_days).await?;
    for record in records.iter_mut() {
        record.amount = values.get(&record.amount_handle).copied();
    }
    Ok(())
}
