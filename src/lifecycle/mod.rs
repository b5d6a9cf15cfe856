// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Instance Lifecycle Manager
//!
//! Owns the single FHE session instance for the connected account:
//!
//! ```text
//! Idle -> LoadingLibrary -> InitializingLibrary -> CreatingInstance -> Ready
//!              |                   |                      |
//!              +-------------------+----------> Error <---+
//! ```
//!
//! Every initialization attempt captures a generation token. An attempt that
//! settles after a newer one started is discarded without touching state.

pub mod manager;

pub use manager::{InitOutcome, InstanceManager, InstanceSnapshot, ReadyInstance};

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceStatus {
    Idle,
    LoadingLibrary,
    InitializingLibrary,
    CreatingInstance,
    Ready,
    Error,
}

impl InstanceStatus {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            InstanceStatus::LoadingLibrary
                | InstanceStatus::InitializingLibrary
                | InstanceStatus::CreatingInstance
        )
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstanceStatus::Idle => "idle",
            InstanceStatus::LoadingLibrary => "loading library",
            InstanceStatus::InitializingLibrary => "initializing library",
            InstanceStatus::CreatingInstance => "creating instance",
            InstanceStatus::Ready => "ready",
            InstanceStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// The connected account and the chain it is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountContext {
    pub account: Address,
    pub chain_id: u64,
}

impl AccountContext {
    pub fn new(account: Address, chain_id: u64) -> Self {
        Self { account, chain_id }
    }
}
