//! Instruction builders for token and market creation.
//!
//! Every encoder produces a plain [`solana_sdk::instruction::Instruction`]
//! whose data matches the on-chain program's layout byte for byte. Program
//! IDs live in [`crate::programs`].
//!
//! # Example
//!
//! ```rust,ignore
//! use mintforge_sdk::instructions::{pda, InitializeMarketBuilder, MarketAccounts};
//! use mintforge_sdk::programs::OPENBOOK_DEX_PROGRAM_ID;
//!
//! let (vault_signer, nonce) = pda::derive_vault_signer(&OPENBOOK_DEX_PROGRAM_ID, &market)?;
//!
//! let ix = InitializeMarketBuilder::new(OPENBOOK_DEX_PROGRAM_ID)
//!     .accounts(accounts)
//!     .base_lot_size(1_000_000)
//!     .quote_lot_size(1)
//!     .vault_signer_nonce(nonce)
//!     .build()?;
//! ```

pub mod create_metadata;
pub mod initialize_market;
pub mod pda;
pub mod system;
pub mod token;

pub use create_metadata::{create_metadata_account_v3, DataV2, MetadataAccounts};
pub use initialize_market::{InitializeMarketBuilder, InitializeMarketParams, MarketAccounts};
pub use pda::{derive_associated_token_address, derive_metadata_address, derive_vault_signer};
pub use system::{create_account, transfer};
pub use token::{
    create_associated_token_account, initialize_account, initialize_mint, mint_to, revoke,
    set_authority, AuthorityType,
};
