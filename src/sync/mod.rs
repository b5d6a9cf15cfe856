// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Event Sync Engine
//!
//! Rebuilds an account's payment history from gateway event logs, within the
//! block-span and rate limits public RPC endpoints impose.

pub mod chain;
pub mod events;
pub mod history;
pub mod pager;
pub mod timestamps;

pub use chain::{ChainReader, RpcChainReader};
pub use events::{DecodedEvent, TransactionKind};
pub use history::{HistoryAssembler, TransactionHistory, TransactionRecord};
pub use pager::{FetchReport, LogPager, SyncPage};
pub use timestamps::resolve_block_timestamps;
