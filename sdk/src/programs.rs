//! Well-known program IDs and fixed account sizes.

use solana_sdk::pubkey::Pubkey;

/// System program ID.
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

/// SPL Token program ID.
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Associated Token Account program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Metaplex Token Metadata program ID.
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// OpenBook v1 dex program ID (Serum v3 layout).
pub const OPENBOOK_DEX_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX");

/// Devnet deployment of the OpenBook v1 dex program.
pub const OPENBOOK_DEX_DEVNET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("EoTcMgcDRTJVZDMZWBoU6rhYHZfkNTVEAfz3uUJRcYGj");

/// Size of an SPL mint account.
pub const MINT_SIZE: usize = 82;

/// Size of an SPL token account.
pub const TOKEN_ACCOUNT_SIZE: usize = 165;

/// Size of the dex market state account, including head and tail padding.
pub const MARKET_STATE_SIZE: usize = 388;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
