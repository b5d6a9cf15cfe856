// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wallet Signing
//!
//! Structured (EIP-712) signature requests go to whatever holds the account key.
//! For a browser or hardware wallet this suspends on a user prompt for an unbounded
//! time; a declined prompt comes back as [`WalletError::Rejected`], never as a
//! transport failure.

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Signature};
use tracing::debug;

use crate::error::WalletError;

#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_typed_data(&self, payload: &TypedData) -> Result<Signature, WalletError>;
}

/// Signs with an in-process private key. Never prompts, so never rejects.
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    wallet: LocalWallet,
}

impl LocalWalletSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    pub fn from_private_key(private_key: &str, chain_id: u64) -> anyhow::Result<Self> {
        let wallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| anyhow::anyhow!("Invalid private key: {}", e))?
            .with_chain_id(chain_id);
        Ok(Self { wallet })
    }
}

#[async_trait]
impl WalletSigner for LocalWalletSigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign_typed_data(&self, payload: &TypedData) -> Result<Signature, WalletError> {
        debug!(
            "Signing {} payload with local wallet {:?}",
            payload.primary_type,
            self.wallet.address()
        );
        self.wallet
            .sign_typed_data(payload)
            .await
            .map_err(|e| WalletError::Failed(e.to_string()))
    }
}
