//! Token types for the Mintforge SDK.
//!
//! Provides mint account decoding, token creation requests and the
//! off-chain metadata document.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::account::AccountSnapshot;
use crate::error::SdkError;
use crate::programs::{MINT_SIZE, TOKEN_PROGRAM_ID};

/// Maximum metadata name length in bytes.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum metadata symbol length in bytes.
pub const MAX_SYMBOL_LENGTH: usize = 10;

/// Maximum metadata URI length in bytes.
pub const MAX_URI_LENGTH: usize = 200;

/// Decoded SPL mint account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintInfo {
    /// Mint address.
    pub address: Pubkey,
    /// Current mint authority.
    pub mint_authority: Option<Pubkey>,
    /// Total supply in atoms.
    pub supply: u64,
    /// Number of decimals.
    pub decimals: u8,
    /// Current freeze authority.
    pub freeze_authority: Option<Pubkey>,
}

impl MintInfo {
    /// Decodes a mint from an account snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::InvalidMint` if the account is not an initialized
    /// SPL token mint.
    pub fn unpack(address: Pubkey, account: &AccountSnapshot) -> Result<Self, SdkError> {
        if account.owner != TOKEN_PROGRAM_ID {
            return Err(SdkError::InvalidMint(format!(
                "{} is owned by {}",
                address, account.owner
            )));
        }

        let data: &[u8; MINT_SIZE] = account
            .data
            .as_slice()
            .try_into()
            .map_err(|_| SdkError::InvalidMint(format!("{} has wrong data length", address)))?;

        let (authority, rest) = data.split_at(36);
        let (supply, rest) = rest.split_at(8);
        let (decimals, rest) = rest.split_at(1);
        let (initialized, freeze) = rest.split_at(1);

        if initialized.first() != Some(&1) {
            return Err(SdkError::InvalidMint(format!("{} is not initialized", address)));
        }

        Ok(Self {
            address,
            mint_authority: unpack_coption_pubkey(authority)?,
            supply: u64::from_le_bytes(
                supply
                    .try_into()
                    .map_err(|_| SdkError::InvalidMint("supply".to_string()))?,
            ),
            decimals: decimals.first().copied().unwrap_or_default(),
            freeze_authority: unpack_coption_pubkey(freeze)?,
        })
    }
}

/// Decodes a 36-byte `COption<Pubkey>` (4-byte tag + key).
fn unpack_coption_pubkey(bytes: &[u8]) -> Result<Option<Pubkey>, SdkError> {
    let (tag, key) = bytes.split_at(4);
    match tag {
        [0, 0, 0, 0] => Ok(None),
        [1, 0, 0, 0] => Pubkey::try_from(key)
            .map(Some)
            .map_err(|_| SdkError::InvalidMint("authority".to_string())),
        _ => Err(SdkError::InvalidMint("bad option tag".to_string())),
    }
}

/// Which authorities the creator keeps on a new token.
///
/// Each enabled option is charged an extra platform fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityOptions {
    /// Keep the wallet as freeze authority.
    pub freeze: bool,
    /// Keep the wallet as mint authority after the initial supply is minted.
    pub mint: bool,
    /// Keep the metadata mutable under the wallet's update authority.
    pub update: bool,
}

impl AuthorityOptions {
    /// Number of enabled options.
    #[must_use]
    pub fn enabled_count(&self) -> u32 {
        u32::from(self.freeze) + u32::from(self.mint) + u32::from(self.update)
    }
}

/// A request to create a new SPL token with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreationRequest {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// URI of the off-chain metadata document.
    pub uri: String,
    /// Mint decimals.
    pub decimals: u8,
    /// Initial supply in whole tokens, minted to the creator.
    pub supply: u64,
    /// Authority options.
    #[serde(default)]
    pub authorities: AuthorityOptions,
}

impl TokenCreationRequest {
    /// Validates metadata lengths.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::MetadataTooLong` for the first field over its limit.
    pub fn validate(&self) -> Result<(), SdkError> {
        for (field, value, max) in [
            ("name", &self.name, MAX_NAME_LENGTH),
            ("symbol", &self.symbol, MAX_SYMBOL_LENGTH),
            ("uri", &self.uri, MAX_URI_LENGTH),
        ] {
            if value.len() > max {
                return Err(SdkError::MetadataTooLong { field, max });
            }
        }
        Ok(())
    }

    /// Initial supply in atoms.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::Overflow` if `supply * 10^decimals` exceeds `u64`.
    pub fn supply_atoms(&self) -> Result<u64, SdkError> {
        10u64
            .checked_pow(u32::from(self.decimals))
            .and_then(|scale| self.supply.checked_mul(scale))
            .ok_or(SdkError::Overflow)
    }
}

/// Social links embedded in the metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socials {
    /// Project website.
    pub website: String,
    /// Twitter / X profile.
    pub twitter: String,
    /// Telegram group.
    pub telegram: String,
    /// Discord server.
    pub discord: String,
}

/// Off-chain JSON metadata document referenced by the on-chain URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffChainMetadata {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Free-form description.
    pub description: String,
    /// Image URL.
    pub image: String,
    /// Optional social links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Socials>,
}

impl OffChainMetadata {
    /// Creates a metadata document without social links.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            description: description.into(),
            image: image.into(),
            extensions: None,
        }
    }

    /// Attaches social links.
    #[must_use]
    pub fn with_socials(mut self, socials: Socials) -> Self {
        self.extensions = Some(socials);
        self
    }

    /// Renders the document as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, SdkError> {
        serde_json::to_string(self).map_err(|e| SdkError::Serialization(e.to_string()))
    }
}
