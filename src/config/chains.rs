// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host chain plus the relayer and protocol contracts an FHE session binds to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub relayer_url: String,
    pub gateway_chain_id: u64,
    pub acl_contract: Address,
    pub kms_verifier_contract: Address,
    pub input_verifier_contract: Address,
    /// EIP-712 verifying contract for user decryption authorizations
    pub decryption_verifying_contract: Address,
    pub input_verification_contract: Address,
    /// Confidential payment gateway whose events make up transaction history
    pub payment_gateway: Address,
    /// First block worth scanning for gateway events
    pub deployment_block: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Local".to_string(),
            chain_id: 31337,
            rpc_url: "http://localhost:8545".to_string(),
            relayer_url: "http://localhost:3000".to_string(),
            gateway_chain_id: 55815,
            acl_contract: Address::zero(),
            kms_verifier_contract: Address::zero(),
            input_verifier_contract: Address::zero(),
            decryption_verifying_contract: Address::zero(),
            input_verification_contract: Address::zero(),
            payment_gateway: Address::zero(),
            deployment_block: 0,
        }
    }
}

impl NetworkConfig {
    pub fn sepolia() -> Result<Self> {
        Ok(Self {
            name: "Sepolia".to_string(),
            chain_id: 11155111,
            rpc_url: std::env::var("SEPOLIA_RPC_URL")
                .unwrap_or_else(|_| "https://ethereum-sepolia-rpc.publicnode.com".to_string()),
            relayer_url: "https://relayer.testnet.zama.cloud".to_string(),
            gateway_chain_id: 55815,
            acl_contract: parse_address("0x687820221192C5B662b25367F70076A37bc79b6c")?,
            kms_verifier_contract: parse_address("0x1364cBBf2cDF5032C47d8226a6f6FBD2AFCDacAC")?,
            input_verifier_contract: parse_address("0xbc91f3daD1A5F19F8390c400196e58073B6a0BC4")?,
            decryption_verifying_contract: parse_address(
                "0xb6E160B1ff80D67Bfe90A85eE06Ce0A2613607D1",
            )?,
            input_verification_contract: parse_address(
                "0x7048C39f048125eDa9d678AEbaDfB22F7900a29F",
            )?,
            // Deployment specific, supplied through CPAY_PAYMENT_GATEWAY
            payment_gateway: Address::zero(),
            deployment_block: 0,
        })
    }

    pub fn local() -> Self {
        Self::default()
    }
}

pub(crate) fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| anyhow!("Invalid address {}: {}", value, e))
}

/// Known network presets keyed by host chain id
pub struct NetworkRegistry {
    networks: HashMap<u64, NetworkConfig>,
    default_chain: u64,
}

impl NetworkRegistry {
    pub fn new() -> Result<Self> {
        let mut networks = HashMap::new();
        let sepolia = NetworkConfig::sepolia()?;
        let default_chain = sepolia.chain_id;
        networks.insert(sepolia.chain_id, sepolia);
        let local = NetworkConfig::local();
        networks.insert(local.chain_id, local);

        Ok(Self {
            networks,
            default_chain,
        })
    }

    pub fn get(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.get(&chain_id)
    }

    pub fn default_chain(&self) -> u64 {
        self.default_chain
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.networks.contains_key(&chain_id)
    }
}
