//! CreateMetadataAccountV3 instruction builder.
//!
//! Encodes the Metaplex Token Metadata instruction that attaches a name,
//! symbol and URI to a mint.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::pda::derive_metadata_address;
use crate::error::SdkError;
use crate::programs::{SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID};

/// Discriminant of `CreateMetadataAccountV3`.
const CREATE_METADATA_ACCOUNT_V3: u8 = 33;

/// A verified or unverified creator share.
#[derive(Debug, Clone, BorshSerialize)]
pub struct Creator {
    /// Creator address.
    pub address: [u8; 32],
    /// Whether the creator signed.
    pub verified: bool,
    /// Royalty share in percent.
    pub share: u8,
}

/// Collection membership.
#[derive(Debug, Clone, BorshSerialize)]
pub struct Collection {
    /// Whether the collection authority verified membership.
    pub verified: bool,
    /// Collection mint.
    pub key: [u8; 32],
}

/// How uses are consumed.
#[derive(Debug, Clone, Copy, BorshSerialize)]
pub enum UseMethod {
    /// Burn on use.
    Burn,
    /// Multiple uses.
    Multiple,
    /// Single use.
    Single,
}

/// Limited-use configuration.
#[derive(Debug, Clone, BorshSerialize)]
pub struct Uses {
    /// Use method.
    pub use_method: UseMethod,
    /// Remaining uses.
    pub remaining: u64,
    /// Total uses.
    pub total: u64,
}

/// On-chain metadata payload.
#[derive(Debug, Clone, BorshSerialize)]
pub struct DataV2 {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Off-chain metadata URI.
    pub uri: String,
    /// Royalty in basis points.
    pub seller_fee_basis_points: u16,
    /// Creator list.
    pub creators: Option<Vec<Creator>>,
    /// Collection membership.
    pub collection: Option<Collection>,
    /// Limited-use configuration.
    pub uses: Option<Uses>,
}

/// Sized-collection details.
#[derive(Debug, Clone, BorshSerialize)]
pub enum CollectionDetails {
    /// Collection with a tracked size.
    V1 {
        /// Collection size.
        size: u64,
    },
}

#[derive(Debug, Clone, BorshSerialize)]
struct CreateMetadataAccountArgsV3 {
    data: DataV2,
    is_mutable: bool,
    collection_details: Option<CollectionDetails>,
}

impl DataV2 {
    /// Payload for a fungible token: zero seller fee and no creators,
    /// collection or uses.
    #[must_use]
    pub fn fungible(name: &str, symbol: &str, uri: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        }
    }
}

/// Accounts required by `CreateMetadataAccountV3`.
#[derive(Debug, Clone, Copy)]
pub struct MetadataAccounts {
    /// Mint the metadata describes.
    pub mint: Pubkey,
    /// Current mint authority (signer).
    pub mint_authority: Pubkey,
    /// Rent payer (signer).
    pub payer: Pubkey,
    /// Update authority recorded in the metadata.
    pub update_authority: Pubkey,
}

/// Builds a `CreateMetadataAccountV3` instruction.
///
/// Returns the instruction and the metadata account address.
///
/// # Errors
///
/// Returns `SdkError::Serialization` if the payload cannot be encoded.
pub fn create_metadata_account_v3(
    accounts: &MetadataAccounts,
    data: DataV2,
    is_mutable: bool,
) -> Result<(Instruction, Pubkey), SdkError> {
    let metadata = derive_metadata_address(&accounts.mint);

    let args = CreateMetadataAccountArgsV3 {
        data,
        is_mutable,
        collection_details: None,
    };

    let mut payload = vec![CREATE_METADATA_ACCOUNT_V3];
    payload.extend(borsh::to_vec(&args).map_err(|e| SdkError::Serialization(e.to_string()))?);

    let ix = Instruction {
        program_id: TOKEN_METADATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(metadata, false),
            AccountMeta::new_readonly(accounts.mint, false),
            AccountMeta::new_readonly(accounts.mint_authority, true),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new_readonly(accounts.update_authority, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: payload,
    };

    Ok((ix, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_accounts(mint: Pubkey, wallet: Pubkey) -> MetadataAccounts {
        MetadataAccounts {
            mint,
            mint_authority: wallet,
            payer: wallet,
            update_authority: wallet,
        }
    }

    #[test]
    fn test_create_metadata_layout() {
        let mint = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();

        let (ix, metadata) = create_metadata_account_v3(
            &test_accounts(mint, wallet),
            DataV2::fungible("Kitty", "KIT", "u"),
            true,
        )
        .expect("should build instruction");

        assert_eq!(ix.program_id, TOKEN_METADATA_PROGRAM_ID);
        assert_eq!(ix.accounts[0].pubkey, metadata);
        assert_eq!(metadata, derive_metadata_address(&mint));

        let mut expected = vec![33u8];
        expected.extend_from_slice(&5u32.to_le_bytes());
        expected.extend_from_slice(b"Kitty");
        expected.extend_from_slice(&3u32.to_le_bytes());
        expected.extend_from_slice(b"KIT");
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(b"u");
        expected.extend_from_slice(&0u16.to_le_bytes());
        // creators, collection, uses = None; is_mutable; collection_details = None
        expected.extend_from_slice(&[0, 0, 0, 1, 0]);

        assert_eq!(ix.data, expected);
    }

    #[test]
    fn test_create_metadata_immutable() {
        let mint = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();

        let (ix, _) = create_metadata_account_v3(
            &test_accounts(mint, wallet),
            DataV2::fungible("", "", ""),
            false,
        )
        .expect("should build instruction");

        assert_eq!(ix.data.last(), Some(&0));
        assert_eq!(ix.data[ix.data.len() - 2], 0);
    }
}
