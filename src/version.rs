// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the confidential payments SDK

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-confidential-history-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "generation-guarded-lifecycle",
    "encrypted-inputs-u64",
    "user-decrypt-eip712",
    "public-decrypt",
    "signature-cache",
    "paged-log-sync",
    "refund-correlation",
];

/// Supported chain IDs
pub const SUPPORTED_CHAINS: &[u64] = &[
    11155111, // Sepolia
    31337,    // Local node
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Confidential Pay SDK {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Version info as JSON, for `cpay-cli config --json` and embedding apps
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
        "chains": SUPPORTED_CHAINS,
    })
}
