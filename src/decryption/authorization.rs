// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decryption Authorization Payload
//!
//! Builds the EIP-712 message the account holder signs to let the relayer
//! re-encrypt values for a session public key. The payload binds:
//!
//! - the session public key
//! - the sorted, deduplicated set of contracts whose handles may be decrypted
//! - the validity window (start timestamp and duration in days)
//!
//! Domain separation comes from the `Decryption` domain and the verifying
//! contract of the host chain's decryption oracle.

use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Bytes};
use serde_json::json;

use super::session::{normalize_contracts, DecryptionWindow};
use crate::config::NetworkConfig;
use crate::error::{SdkError, SdkResult};

pub const DOMAIN_NAME: &str = "Decryption";
pub const DOMAIN_VERSION: &str = "1";
pub const PRIMARY_TYPE: &str = "UserDecryptRequestVerification";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl From<&NetworkConfig> for AuthorizationDomain {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id,
            verifying_contract: network.decryption_verifying_contract,
        }
    }
}

pub fn build_user_decrypt_payload(
    domain: &AuthorizationDomain,
    public_key: &Bytes,
    contract_addresses: &[Address],
    window: &DecryptionWindow,
) -> SdkResult<TypedData> {
    let contracts: Vec<String> = normalize_contracts(contract_addresses.iter().copied())
        .iter()
        .map(|address| format!("{:?}", address))
        .collect();

    let value = json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            PRIMARY_TYPE: [
                { "name": "publicKey", "type": "bytes" },
                { "name": "contractAddresses", "type": "address[]" },
                { "name": "startTimestamp", "type": "uint256" },
                { "name": "durationDays", "type": "uint256" },
                { "name": "extraData", "type": "bytes" }
            ]
        },
        "primaryType": PRIMARY_TYPE,
        "domain": {
            "name": DOMAIN_NAME,
            "version": DOMAIN_VERSION,
            "chainId": domain.chain_id,
            "verifyingContract": format!("{:?}", domain.verifying_contract)
        },
        "message": {
            "publicKey": public_key.to_string(),
            "contractAddresses": contracts,
            "startTimestamp": window.start_timestamp.to_string(),
            "durationDays": window.duration_days.to_string(),
            "extraData": "0x00"
        }
    });

    serde_json::from_value(value)
        .map_err(|e| SdkError::encoding("authorization payload", e.to_string()))
}
