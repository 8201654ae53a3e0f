//! In-memory cluster and wallet doubles for launcher tests.

use std::collections::HashMap;
use std::sync::Mutex;

use mintforge_sdk::client::{ClientError, RpcConnection};
use mintforge_sdk::programs::{MINT_SIZE, TOKEN_PROGRAM_ID};
use mintforge_sdk::wallet::{WalletError, WalletSigner};
use mintforge_sdk::{AccountSnapshot, TokenAccountSummary};
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};

/// Rent charged by the mock for `len` bytes.
pub(crate) fn rent_for(len: usize) -> u64 {
    (len as u64 + 128) * 6_960
}

/// Raw data of an initialized mint without authorities.
pub(crate) fn mint_account(decimals: u8) -> AccountSnapshot {
    let mut data = vec![0u8; MINT_SIZE];
    data[44] = decimals;
    data[45] = 1;
    AccountSnapshot {
        lamports: rent_for(MINT_SIZE),
        owner: TOKEN_PROGRAM_ID,
        data,
        executable: false,
    }
}

/// A call received by [`MockConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MockCall {
    Rent(usize),
    AccountInfo(Pubkey),
    TokenAccounts(Pubkey),
    Blockhash,
    Send,
    Confirm,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    sent: Vec<Transaction>,
    blockhashes: Vec<Hash>,
}

/// Records every call and answers from fixed data.
#[derive(Debug, Default)]
pub(crate) struct MockConnection {
    accounts: HashMap<Pubkey, AccountSnapshot>,
    token_accounts: Vec<TokenAccountSummary>,
    fail_send_at: Option<usize>,
    fail_confirm_at: Option<usize>,
    account_errors: HashMap<Pubkey, (i64, String)>,
    state: Mutex<MockState>,
}

impl MockConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_account(mut self, address: Pubkey, account: AccountSnapshot) -> Self {
        self.accounts.insert(address, account);
        self
    }

    pub(crate) fn with_token_account(mut self, account: TokenAccountSummary) -> Self {
        self.token_accounts.push(account);
        self
    }

    /// Fails the `index`-th `send_transaction` call (zero-based).
    pub(crate) fn fail_send_at(mut self, index: usize) -> Self {
        self.fail_send_at = Some(index);
        self
    }

    /// Reports a runtime error for the `index`-th confirmation (zero-based).
    pub(crate) fn fail_confirm_at(mut self, index: usize) -> Self {
        self.fail_confirm_at = Some(index);
        self
    }

    /// Answers `get_account_info` for `address` with a JSON-RPC error.
    pub(crate) fn fail_account_info(mut self, address: Pubkey, code: i64, message: &str) -> Self {
        self.account_errors
            .insert(address, (code, message.to_string()));
        self
    }

    /// Blockhashes handed out so far, in order.
    pub(crate) fn blockhashes(&self) -> Vec<Hash> {
        self.state.lock().expect("mock state").blockhashes.clone()
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.state.lock().expect("mock state").calls.clone()
    }

    pub(crate) fn sent(&self) -> Vec<Transaction> {
        self.state.lock().expect("mock state").sent.clone()
    }

    fn record(&self, call: MockCall) -> usize {
        let mut state = self.state.lock().expect("mock state");
        let count = state.calls.iter().filter(|c| **c == call).count();
        state.calls.push(call);
        count
    }
}

impl RpcConnection for MockConnection {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ClientError> {
        self.record(MockCall::Rent(data_len));
        Ok(rent_for(data_len))
    }

    async fn get_account_info(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AccountSnapshot>, ClientError> {
        self.record(MockCall::AccountInfo(*address));
        if let Some((code, message)) = self.account_errors.get(address) {
            return Err(ClientError::Rpc {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<TokenAccountSummary>, ClientError> {
        self.record(MockCall::TokenAccounts(*owner));
        Ok(self.token_accounts.clone())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        self.record(MockCall::Blockhash);
        let blockhash = Hash::new_unique();
        self.state
            .lock()
            .expect("mock state")
            .blockhashes
            .push(blockhash);
        Ok(blockhash)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        let index = self.record(MockCall::Send);
        if self.fail_send_at == Some(index) {
            return Err(ClientError::Rpc {
                code: -32002,
                message: "Transaction simulation failed".to_string(),
            });
        }
        self.state
            .lock()
            .expect("mock state")
            .sent
            .push(transaction.clone());
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<u64, ClientError> {
        let index = self.record(MockCall::Confirm);
        if self.fail_confirm_at == Some(index) {
            return Err(ClientError::TransactionFailed {
                signature: signature.to_string(),
                reason: "InstructionError(0, Custom(1))".to_string(),
            });
        }
        Ok(100 + index as u64)
    }
}

/// A wallet that refuses to sign.
#[derive(Debug)]
pub(crate) struct DisconnectedWallet(pub(crate) Pubkey);

impl WalletSigner for DisconnectedWallet {
    fn pubkey(&self) -> Pubkey {
        self.0
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn sign_transaction(&self, _transaction: &mut Transaction) -> Result<(), WalletError> {
        Err(WalletError::NotConnected)
    }
}
