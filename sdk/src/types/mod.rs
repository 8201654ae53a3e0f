//! Core types for the Mintforge SDK.

pub mod account;
pub mod amount;
pub mod market;
pub mod sizing;
pub mod token;

pub use account::{AccountSnapshot, TokenAccountSummary};
pub use amount::{lamports_to_sol, sol_to_lamports};
pub use market::{parse_pubkey, LotSizes, MarketCreationRequest, MintSource};
pub use sizing::{MarketAccountSizes, QueueLengths};
pub use token::{AuthorityOptions, MintInfo, OffChainMetadata, Socials, TokenCreationRequest};
