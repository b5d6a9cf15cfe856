// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decryption Gateway
//!
//! ## Protocol Flow
//!
//! 1. Generate a fresh session keypair through the FHE instance
//! 2. Open a validity window starting now, `duration_days` long
//! 3. Build the EIP-712 authorization over public key, contract set and window
//! 4. Ask the connected wallet to sign it (may suspend indefinitely, may be declined)
//! 5. Submit handles, keys, signature and window to the relayer
//! 6. Coerce the returned values to `U256`
//!
//! Steps run strictly in order; signing always precedes relayer submission.
//! The all-zero handle short-circuits to 0 before step 1.

pub mod authorization;
pub mod cache;
pub mod gateway;
pub mod session;

pub use authorization::{build_user_decrypt_payload, AuthorizationDomain};
pub use cache::{SignatureCache, SignatureCacheEntry, SignatureCacheKey};
pub use gateway::DecryptionGateway;
pub use session::{DecryptionSession, DecryptionWindow};
