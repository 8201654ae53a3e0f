//! On-chain account snapshots.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// A point-in-time copy of an account fetched over RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account balance in lamports.
    pub lamports: u64,
    /// Program that owns the account.
    pub owner: Pubkey,
    /// Raw account data.
    pub data: Vec<u8>,
    /// Whether the account holds a program.
    pub executable: bool,
}

/// An SPL token account held by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccountSummary {
    /// Token account address.
    pub address: Pubkey,
    /// Mint of the held token.
    pub mint: Pubkey,
    /// Raw amount in atoms.
    pub amount: u64,
    /// Mint decimals.
    pub decimals: u8,
    /// Current delegate, if any.
    pub delegate: Option<Pubkey>,
}
