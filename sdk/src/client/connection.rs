//! Cluster connection capability.
//!
//! The launcher only needs a handful of JSON-RPC calls. They are grouped in
//! [`RpcConnection`] so flows can run against [`super::SolanaRpcClient`] in
//! production and an in-memory double in tests.

use std::future::Future;

use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};

use super::error::ClientError;
use crate::types::{AccountSnapshot, TokenAccountSummary};

/// Read and submit access to a Solana cluster.
pub trait RpcConnection: Send + Sync {
    /// Returns the rent-exempt minimum for an account of `data_len` bytes.
    fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> impl Future<Output = Result<u64, ClientError>> + Send;

    /// Fetches an account, or `None` if it does not exist.
    fn get_account_info(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<AccountSnapshot>, ClientError>> + Send;

    /// Lists the SPL token accounts owned by `owner`.
    fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
    ) -> impl Future<Output = Result<Vec<TokenAccountSummary>, ClientError>> + Send;

    /// Returns a recent blockhash for signing.
    fn get_latest_blockhash(&self) -> impl Future<Output = Result<Hash, ClientError>> + Send;

    /// Submits a fully signed transaction and returns its signature.
    fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<Signature, ClientError>> + Send;

    /// Waits until `signature` reaches the configured commitment.
    ///
    /// Returns the slot the transaction landed in.
    fn confirm_transaction(
        &self,
        signature: &Signature,
    ) -> impl Future<Output = Result<u64, ClientError>> + Send;
}
