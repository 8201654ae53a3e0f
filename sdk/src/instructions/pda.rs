//! Program derived address utilities.
//!
//! Provides derivations for the dex vault signer, associated token accounts
//! and Metaplex metadata accounts.

use solana_sdk::pubkey::Pubkey;

use crate::error::SdkError;
use crate::programs::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID};

/// Seed prefix for metadata PDA derivation.
pub const METADATA_SEED: &[u8] = b"metadata";

/// Highest nonce tried when solving for the vault signer.
pub const MAX_VAULT_SIGNER_NONCE: u64 = 255;

/// Derives the vault signer (owner of both market vaults).
///
/// Seeds: `[market, nonce as u64 LE]`, no bump byte. Returns the first
/// nonce whose address falls off the ed25519 curve.
///
/// # Errors
///
/// Returns `SdkError::VaultNonceNotFound` if no nonce below 255 works.
pub fn derive_vault_signer(
    program_id: &Pubkey,
    market: &Pubkey,
) -> Result<(Pubkey, u64), SdkError> {
    (0..MAX_VAULT_SIGNER_NONCE)
        .find_map(|nonce| {
            Pubkey::create_program_address(&[market.as_ref(), &nonce.to_le_bytes()], program_id)
                .ok()
                .map(|signer| (signer, nonce))
        })
        .ok_or(SdkError::VaultNonceNotFound)
}

/// Derives the associated token account for a wallet and mint.
///
/// Seeds: `[wallet, token_program, mint]`
#[must_use]
pub fn derive_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Derives the Metaplex metadata account for a mint.
///
/// Seeds: `[b"metadata", metadata_program, mint]`
#[must_use]
pub fn derive_metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_SEED,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}
