//! SPL Token and Associated Token Account instruction encoders.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};

use super::pda::derive_associated_token_address;
use crate::programs::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};

const INITIALIZE_MINT: u8 = 0;
const INITIALIZE_ACCOUNT: u8 = 1;
const REVOKE: u8 = 5;
const SET_AUTHORITY: u8 = 6;
const MINT_TO: u8 = 7;

/// Kinds of authority that `SetAuthority` can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthorityType {
    /// Authority to mint new tokens.
    MintTokens = 0,
    /// Authority to freeze token accounts.
    FreezeAccount = 1,
    /// Owner of a token account.
    AccountOwner = 2,
    /// Authority to close a token account.
    CloseAccount = 3,
}

/// Appends an SPL `COption<Pubkey>` (1-byte tag, key only when present).
fn push_optional_pubkey(data: &mut Vec<u8>, key: Option<&Pubkey>) {
    match key {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key.as_ref());
        }
        None => data.push(0),
    }
}

/// Initializes a freshly allocated mint.
#[must_use]
pub fn initialize_mint(
    mint: &Pubkey,
    decimals: u8,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
) -> Instruction {
    let mut data = Vec::with_capacity(67);
    data.push(INITIALIZE_MINT);
    data.push(decimals);
    data.extend_from_slice(mint_authority.as_ref());
    push_optional_pubkey(&mut data, freeze_authority);

    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data,
    }
}

/// Initializes a freshly allocated token account.
#[must_use]
pub fn initialize_account(account: &Pubkey, mint: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data: vec![INITIALIZE_ACCOUNT],
    }
}

/// Mints `amount` atoms into `destination`.
#[must_use]
pub fn mint_to(mint: &Pubkey, destination: &Pubkey, authority: &Pubkey, amount: u64) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(MINT_TO);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}

/// Revokes the delegate of a token account.
#[must_use]
pub fn revoke(source: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: vec![REVOKE],
    }
}

/// Changes or clears an authority on a mint or token account.
#[must_use]
pub fn set_authority(
    owned: &Pubkey,
    new_authority: Option<&Pubkey>,
    authority_type: AuthorityType,
    current_authority: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(35);
    data.push(SET_AUTHORITY);
    data.push(authority_type as u8);
    push_optional_pubkey(&mut data, new_authority);

    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*owned, false),
            AccountMeta::new_readonly(*current_authority, true),
        ],
        data,
    }
}

/// Creates the associated token account of `wallet` for `mint`.
///
/// Returns the instruction and the derived account address.
#[must_use]
pub fn create_associated_token_account(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> (Instruction, Pubkey) {
    let address = derive_associated_token_address(wallet, mint);

    let ix = Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(address, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: Vec::new(),
    };

    (ix, address)
}
