// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod clock;
pub mod config;
pub mod decryption;
pub mod encryption;
pub mod error;
pub mod flows;
pub mod handle;
pub mod lifecycle;
pub mod relayer;
pub mod sync;
pub mod version;
pub mod wallet;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{NetworkConfig, SdkConfig, SyncPolicy};
pub use decryption::{DecryptionGateway, SignatureCache};
pub use encryption::EncryptionGateway;
pub use error::{RelayerError, SdkError, SdkResult, WalletError};
pub use handle::{CiphertextHandle, ClearValue, EncryptedInput};
pub use lifecycle::{AccountContext, InitOutcome, InstanceManager, InstanceStatus};
pub use relayer::{FheInstance, HandleContractPair, RelayerRuntime};
pub use sync::{HistoryAssembler, LogPager, TransactionHistory, TransactionRecord};
pub use wallet::{LocalWalletSigner, WalletSigner};
