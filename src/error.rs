// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error Types
//!
//! One taxonomy shared by the lifecycle manager and both gateways:
//!
//! - **NotReady**: no session instance is committed yet (always checked first)
//! - **NotAvailable**: the relayer runtime never became loadable within the poll budget
//! - **Range**: a clear value does not fit the encrypted integer width
//! - **EncryptionFailed**: the runtime failed to build a ciphertext input
//! - **AuthorizationRejected**: the account holder declined the signature request
//! - **TransportFailure**: relayer/network call failed, carries the nested cause
//! - **StaleResult**: an attempt finished after a newer one superseded it
//!
//! Gateways return these as `Err` values at their public boundary and never panic,
//! so presentation code can branch on the variant.

use ethers::types::Address;
use thiserror::Error;

use crate::lifecycle::InstanceStatus;

/// Boxed cause carried by wrapping variants
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("FHE instance not ready (status: {status})")]
    NotReady { status: InstanceStatus },

    #[error("relayer runtime not available after {attempts} attempts")]
    NotAvailable { attempts: u32 },

    #[error("value {value} is out of range for a 64-bit encrypted integer")]
    Range { value: String },

    #[error("encryption failed: {source}")]
    EncryptionFailed {
        #[source]
        source: BoxError,
    },

    #[error("authorization rejected: {reason}")]
    AuthorizationRejected { reason: String },

    /// The connected wallet signs for a different account than the instance was built for
    #[error("wallet signer {signer:?} does not match session account {account:?}")]
    SignerMismatch { signer: Address, account: Address },

    #[error("transport failure during {operation}: {source}")]
    TransportFailure {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("result of generation {generation} superseded by generation {current}")]
    StaleResult { generation: u64, current: u64 },

    #[error("initialization failed while {stage}: {source}")]
    Initialization {
        stage: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("invalid {field} encoding: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SdkError {
    pub fn transport(operation: &'static str, source: impl Into<BoxError>) -> Self {
        SdkError::TransportFailure {
            operation,
            source: source.into(),
        }
    }

    pub fn encryption(source: impl Into<BoxError>) -> Self {
        SdkError::EncryptionFailed {
            source: source.into(),
        }
    }

    pub fn encoding(field: &'static str, reason: impl Into<String>) -> Self {
        SdkError::InvalidEncoding {
            field,
            reason: reason.into(),
        }
    }

    /// Whether offering the user a retry can change the outcome.
    ///
    /// A declined signature or an out-of-range amount will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::NotReady { .. }
            | SdkError::Range { .. }
            | SdkError::AuthorizationRejected { .. }
            | SdkError::SignerMismatch { .. }
            | SdkError::StaleResult { .. }
            | SdkError::InvalidEncoding { .. }
            | SdkError::Config(_) => false,
            SdkError::NotAvailable { .. }
            | SdkError::EncryptionFailed { .. }
            | SdkError::TransportFailure { .. }
            | SdkError::Initialization { .. } => true,
        }
    }

    pub fn is_rejection(&self) -> bool {
        match self {
            SdkError::AuthorizationRejected { .. } => true,
            _ => false,
        }
    }
}

/// Errors reported by the relayer runtime library
#[derive(Debug, Clone, Error)]
pub enum RelayerError {
    #[error("relayer request failed: {0}")]
    Transport(String),

    #[error("relayer returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("relayer response malformed: {0}")]
    InvalidResponse(String),

    #[error("runtime library error: {0}")]
    Library(String),
}

/// Outcome of a wallet signature request that did not produce a signature
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    /// The account holder declined or dismissed the prompt
    #[error("user rejected the signature request: {0}")]
    Rejected(String),

    #[error("wallet signing failed: {0}")]
    Failed(String),
}

impl From<WalletError> for SdkError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected(reason) => SdkError::AuthorizationRejected { reason },
            WalletError::Failed(_) => SdkError::transport("signature request", err),
        }
    }
}
