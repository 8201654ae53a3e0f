//! Mintforge SDK - building blocks for SPL token and OpenBook market creation.
//!
//! This crate holds everything that does not need orchestration: account
//! sizing, lot size math, instruction encoders, PDA derivations, and the
//! cluster and wallet capabilities the launcher is built on.
//!
//! # Core Types
//!
//! - [`QueueLengths`], [`MarketAccountSizes`] - Queue lengths and the account
//!   sizes they imply
//! - [`LotSizes`] - Lot sizes from decimals and size exponents
//! - [`MarketCreationRequest`], [`MintSource`] - Market creation input
//! - [`TokenCreationRequest`], [`AuthorityOptions`] - Token creation input
//! - [`MintInfo`] - Decoded SPL mint account
//!
//! # Capabilities
//!
//! - [`RpcConnection`] - Cluster reads and transaction submission
//! - [`WalletSigner`] - Fee payer signing
//!
//! # Example
//!
//! ```rust
//! use mintforge_sdk::{MarketAccountSizes, QueueLengths};
//!
//! let sizes = MarketAccountSizes::compute(&QueueLengths::minimum()).expect("valid lengths");
//! assert_eq!(sizes.event_queue, 11308);
//! assert_eq!(sizes.request_queue, 124);
//! assert_eq!(sizes.orderbook, 14524);
//! ```

pub mod client;
pub mod error;
pub mod instructions;
pub mod programs;
pub mod types;
pub mod wallet;

pub use client::{ClientError, RpcClientConfig, RpcConnection, SolanaRpcClient};
pub use error::SdkError;
pub use types::{
    lamports_to_sol, sol_to_lamports, AccountSnapshot, AuthorityOptions, LotSizes,
    MarketAccountSizes, MarketCreationRequest, MintInfo, MintSource, OffChainMetadata,
    QueueLengths, Socials, TokenAccountSummary, TokenCreationRequest,
};
pub use wallet::{KeypairWallet, WalletError, WalletSigner};
