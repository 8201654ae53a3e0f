//! Wallet signing capability.
//!
//! The fee payer signs every transaction the launcher submits. Signing goes
//! through [`WalletSigner`] so an application can plug in any signer;
//! [`KeypairWallet`] covers the common case of a local keypair file.

use std::path::Path;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

/// Wallet errors.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// No wallet is connected.
    #[error("wallet not connected")]
    NotConnected,

    /// Keypair file could not be read or parsed.
    #[error("failed to load keypair from {path}: {reason}")]
    Load {
        /// Path that was read.
        path: String,
        /// Failure description.
        reason: String,
    },

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Signs transactions as the fee payer.
pub trait WalletSigner: Send + Sync {
    /// Returns the wallet address.
    fn pubkey(&self) -> Pubkey;

    /// Returns true if the wallet can sign.
    fn is_connected(&self) -> bool {
        true
    }

    /// Adds the wallet's signature to `transaction`.
    ///
    /// The transaction's blockhash must already be set. Signatures from
    /// other signers are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is not a required signer or signing
    /// fails.
    fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError>;
}

/// A wallet backed by an in-memory keypair.
#[derive(Debug)]
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    /// Wraps an existing keypair.
    #[must_use]
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Loads a keypair file in the Solana CLI format (a JSON array of 64
    /// bytes).
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Load` if the file cannot be read or does not
    /// hold a valid keypair.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let load_error = |reason: String| WalletError::Load {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        Self::from_json(&contents).map_err(|e| match e {
            WalletError::Signing(reason) => load_error(reason),
            other => other,
        })
    }

    /// Parses a keypair from its JSON byte-array form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the bytes are not a
    /// valid keypair.
    pub fn from_json(contents: &str) -> Result<Self, WalletError> {
        let bytes: Vec<u8> =
            serde_json::from_str(contents).map_err(|e| WalletError::Signing(e.to_string()))?;
        let keypair =
            Keypair::try_from(bytes.as_slice()).map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(Self::new(keypair))
    }

    /// Returns the underlying keypair.
    #[must_use]
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl WalletSigner for KeypairWallet {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, message::Message};

    use crate::instructions::transfer;

    #[test]
    fn test_keypair_wallet_signs() {
        let wallet = KeypairWallet::new(Keypair::new());
        let recipient = Pubkey::new_unique();

        let message = Message::new(
            &[transfer(&wallet.pubkey(), &recipient, 1)],
            Some(&wallet.pubkey()),
        );
        let mut tx = Transaction::new_unsigned(message);
        tx.message.recent_blockhash = Hash::new_unique();

        wallet.sign_transaction(&mut tx).expect("should sign");

        assert!(wallet.is_connected());
        assert!(tx.is_signed());
        assert!(tx.verify().is_ok());
    }

    #[test]
    fn test_keypair_wallet_not_a_signer() {
        let wallet = KeypairWallet::new(Keypair::new());
        let payer = Pubkey::new_unique();

        let message = Message::new(&[transfer(&payer, &Pubkey::new_unique(), 1)], Some(&payer));
        let mut tx = Transaction::new_unsigned(message);

        assert!(matches!(
            wallet.sign_transaction(&mut tx),
            Err(WalletError::Signing(_))
        ));
    }

    #[test]
    fn test_keypair_wallet_from_json() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).expect("encode");

        let wallet = KeypairWallet::from_json(&json).expect("should parse");
        assert_eq!(wallet.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_keypair_wallet_from_json_invalid() {
        assert!(KeypairWallet::from_json("[1, 2, 3]").is_err());
        assert!(KeypairWallet::from_json("not json").is_err());
    }

    #[test]
    fn test_keypair_wallet_missing_file() {
        let result = KeypairWallet::from_file("/nonexistent/id.json");
        assert!(matches!(result, Err(WalletError::Load { .. })));
    }
}
