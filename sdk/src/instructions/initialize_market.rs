//! InitializeMarket instruction builder.
//!
//! Builds the dex instruction that initializes a market over accounts that
//! were allocated earlier in the same or a previous transaction.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};

use crate::error::SdkError;
use crate::types::market::{DEFAULT_FEE_RATE_BPS, DEFAULT_QUOTE_DUST_THRESHOLD};

/// Dex instruction layout version.
const INSTRUCTION_VERSION: u8 = 0;

/// Discriminant of `InitializeMarket` in the dex instruction enum.
const INITIALIZE_MARKET_TAG: u32 = 0;

/// Parameters for initializing a market.
#[derive(Debug, Clone, BorshSerialize)]
pub struct InitializeMarketParams {
    /// Base lot size in base atoms.
    pub base_lot_size: u64,
    /// Quote lot size in quote atoms.
    pub quote_lot_size: u64,
    /// Fee rate in basis points.
    pub fee_rate_bps: u16,
    /// Nonce used to derive the vault signer.
    pub vault_signer_nonce: u64,
    /// Quote dust threshold.
    pub quote_dust_threshold: u64,
}

/// Accounts required by `InitializeMarket`.
#[derive(Debug, Clone, Copy)]
pub struct MarketAccounts {
    /// Market state account.
    pub market: Pubkey,
    /// Request queue.
    pub request_queue: Pubkey,
    /// Event queue.
    pub event_queue: Pubkey,
    /// Bids order book.
    pub bids: Pubkey,
    /// Asks order book.
    pub asks: Pubkey,
    /// Base token vault.
    pub base_vault: Pubkey,
    /// Quote token vault.
    pub quote_vault: Pubkey,
    /// Base mint.
    pub base_mint: Pubkey,
    /// Quote mint.
    pub quote_mint: Pubkey,
}

/// Builder for the InitializeMarket instruction.
#[derive(Debug, Clone)]
pub struct InitializeMarketBuilder {
    program_id: Pubkey,
    accounts: Option<MarketAccounts>,
    base_lot_size: Option<u64>,
    quote_lot_size: Option<u64>,
    vault_signer_nonce: Option<u64>,
    fee_rate_bps: u16,
    quote_dust_threshold: u64,
}

impl InitializeMarketBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: None,
            base_lot_size: None,
            quote_lot_size: None,
            vault_signer_nonce: None,
            fee_rate_bps: DEFAULT_FEE_RATE_BPS,
            quote_dust_threshold: DEFAULT_QUOTE_DUST_THRESHOLD,
        }
    }

    /// Sets the market accounts.
    #[must_use]
    pub fn accounts(mut self, accounts: MarketAccounts) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Sets the base lot size.
    #[must_use]
    pub fn base_lot_size(mut self, base_lot_size: u64) -> Self {
        self.base_lot_size = Some(base_lot_size);
        self
    }

    /// Sets the quote lot size.
    #[must_use]
    pub fn quote_lot_size(mut self, quote_lot_size: u64) -> Self {
        self.quote_lot_size = Some(quote_lot_size);
        self
    }

    /// Sets the vault signer nonce.
    #[must_use]
    pub fn vault_signer_nonce(mut self, nonce: u64) -> Self {
        self.vault_signer_nonce = Some(nonce);
        self
    }

    /// Overrides the fee rate.
    #[must_use]
    pub fn fee_rate_bps(mut self, fee_rate_bps: u16) -> Self {
        self.fee_rate_bps = fee_rate_bps;
        self
    }

    /// Builds the instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is not set.
    pub fn build(self) -> Result<Instruction, SdkError> {
        let accounts = self
            .accounts
            .ok_or_else(|| SdkError::InvalidAddress("market accounts not set".to_string()))?;
        let base_lot_size = self
            .base_lot_size
            .ok_or(SdkError::ZeroLotSize("base"))?;
        let quote_lot_size = self
            .quote_lot_size
            .ok_or(SdkError::ZeroLotSize("quote"))?;
        let vault_signer_nonce = self
            .vault_signer_nonce
            .ok_or(SdkError::VaultNonceNotFound)?;

        let params = InitializeMarketParams {
            base_lot_size,
            quote_lot_size,
            fee_rate_bps: self.fee_rate_bps,
            vault_signer_nonce,
            quote_dust_threshold: self.quote_dust_threshold,
        };

        let metas = vec![
            AccountMeta::new(accounts.market, false),
            AccountMeta::new(accounts.request_queue, false),
            AccountMeta::new(accounts.event_queue, false),
            AccountMeta::new(accounts.bids, false),
            AccountMeta::new(accounts.asks, false),
            AccountMeta::new(accounts.base_vault, false),
            AccountMeta::new(accounts.quote_vault, false),
            AccountMeta::new_readonly(accounts.base_mint, false),
            AccountMeta::new_readonly(accounts.quote_mint, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ];

        // Version byte + u32 tag + packed params
        let mut data = Vec::with_capacity(39);
        data.push(INSTRUCTION_VERSION);
        data.extend_from_slice(&INITIALIZE_MARKET_TAG.to_le_bytes());
        data.extend(borsh::to_vec(&params).map_err(|e| SdkError::Serialization(e.to_string()))?);

        Ok(Instruction {
            program_id: self.program_id,
            accounts: metas,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_accounts() -> MarketAccounts {
        MarketAccounts {
            market: Pubkey::new_unique(),
            request_queue: Pubkey::new_unique(),
            event_queue: Pubkey::new_unique(),
            bids: Pubkey::new_unique(),
            asks: Pubkey::new_unique(),
            base_vault: Pubkey::new_unique(),
            quote_vault: Pubkey::new_unique(),
            base_mint: Pubkey::new_unique(),
            quote_mint: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_initialize_market_build() {
        let program_id = Pubkey::new_unique();
        let accounts = test_accounts();

        let ix = InitializeMarketBuilder::new(program_id)
            .accounts(accounts)
            .base_lot_size(1_000_000)
            .quote_lot_size(1)
            .vault_signer_nonce(3)
            .build()
            .expect("should build instruction");

        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.accounts.len(), 10);
        assert_eq!(ix.accounts[0].pubkey, accounts.market);
        assert!(ix.accounts[0].is_writable);
        assert!(!ix.accounts[7].is_writable);
        assert!(ix.accounts.iter().all(|meta| !meta.is_signer));

        assert_eq!(ix.data.len(), 39);
        assert_eq!(&ix.data[..5], &[0, 0, 0, 0, 0]);
        assert_eq!(&ix.data[5..13], &1_000_000u64.to_le_bytes());
        assert_eq!(&ix.data[13..21], &1u64.to_le_bytes());
        assert_eq!(&ix.data[21..23], &150u16.to_le_bytes());
        assert_eq!(&ix.data[23..31], &3u64.to_le_bytes());
        assert_eq!(&ix.data[31..39], &500u64.to_le_bytes());
    }

    #[test]
    fn test_initialize_market_missing_accounts() {
        let result = InitializeMarketBuilder::new(Pubkey::new_unique())
            .base_lot_size(1)
            .quote_lot_size(1)
            .vault_signer_nonce(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_initialize_market_missing_nonce() {
        let result = InitializeMarketBuilder::new(Pubkey::new_unique())
            .accounts(test_accounts())
            .base_lot_size(1)
            .quote_lot_size(1)
            .build();
        assert_eq!(result.err(), Some(SdkError::VaultNonceNotFound));
    }
}
