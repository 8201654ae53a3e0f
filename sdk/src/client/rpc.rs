//! JSON-RPC client implementation.
//!
//! Provides [`SolanaRpcClient`], the HTTP implementation of
//! [`RpcConnection`]. Account data is requested base64-encoded and token
//! accounts are requested `jsonParsed`.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};

use super::config::{Commitment, RpcClientConfig};
use super::connection::RpcConnection;
use super::error::ClientError;
use crate::programs::TOKEN_PROGRAM_ID;
use crate::types::{AccountSnapshot, TokenAccountSummary};

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Result wrapper carrying the slot context.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiAccount {
    lamports: u64,
    owner: String,
    data: (String, String),
    executable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiBlockhash {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
struct KeyedParsedAccount {
    pubkey: String,
    account: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedTokenAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAccount {
    info: ParsedTokenInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenInfo {
    mint: String,
    token_amount: UiTokenAmount,
    delegate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UiTokenAmount {
    amount: String,
    decimals: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    slot: u64,
    err: Option<Value>,
    confirmation_status: Option<String>,
}

/// Outcome of a single signature status poll.
#[derive(Debug, PartialEq, Eq)]
enum StatusCheck {
    Pending,
    Landed(u64),
    Failed(String),
}

/// JSON-RPC client for a Solana cluster.
#[derive(Debug)]
pub struct SolanaRpcClient {
    config: RpcClientConfig,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: RpcClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            config,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// Creates a new client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_url(url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(RpcClientConfig::new(url))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &RpcClientConfig {
        &self.config
    }

    fn commitment(&self) -> Commitment {
        self.config.commitment
    }

    /// Issues a JSON-RPC call and decodes its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: RpcResponse<T> = self
            .request_with_retry(|| self.http.post(&self.config.url).json(&body))
            .await?;

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| ClientError::Deserialization(format!("{} returned no result", method)))
    }

    /// Makes a request with retry logic.
    async fn request_with_retry<T, F>(&self, request_fn: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            let response = request_fn().send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        let body = resp
                            .text()
                            .await
                            .map_err(|e| ClientError::Deserialization(e.to_string()))?;

                        return serde_json::from_str(&body)
                            .map_err(|e| ClientError::Deserialization(e.to_string()));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse().ok());

                        if retry_count < self.config.max_retries {
                            let wait_time = retry_after.unwrap_or(1);
                            tokio::time::sleep(Duration::from_secs(wait_time)).await;
                            retry_count += 1;
                            continue;
                        }

                        return Err(ClientError::RateLimited { retry_after });
                    }

                    let body = resp.text().await.unwrap_or_default();
                    if let Ok(error_resp) = serde_json::from_str::<RpcResponse<Value>>(&body) {
                        if let Some(error) = error_resp.error {
                            return Err(ClientError::Rpc {
                                code: error.code,
                                message: error.message,
                            });
                        }
                    }

                    return Err(ClientError::Rpc {
                        code: i64::from(status.as_u16()),
                        message: body,
                    });
                }
                Err(e) => {
                    if e.is_timeout() && retry_count < self.config.max_retries {
                        retry_count += 1;
                        tokio::time::sleep(Duration::from_millis(100 * (1 << retry_count))).await;
                        last_error = Some(ClientError::from(e));
                        continue;
                    }
                    return Err(ClientError::from(e));
                }
            }
        }

        Err(last_error.unwrap_or(ClientError::Timeout))
    }

    async fn signature_status(&self, signature: &Signature) -> Result<StatusCheck, ClientError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;

        Ok(evaluate_status(
            statuses.value.into_iter().next().flatten(),
            self.commitment(),
        ))
    }
}

impl RpcConnection for SolanaRpcClient {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ClientError> {
        self.call(
            "getMinimumBalanceForRentExemption",
            json!([data_len, { "commitment": self.commitment().as_str() }]),
        )
        .await
    }

    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<AccountSnapshot>, ClientError> {
        let response: WithContext<Option<UiAccount>> = self
            .call(
                "getAccountInfo",
                json!([
                    address.to_string(),
                    { "encoding": "base64", "commitment": self.commitment().as_str() }
                ]),
            )
            .await?;

        response.value.map(decode_account).transpose()
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<TokenAccountSummary>, ClientError> {
        let response: WithContext<Vec<KeyedParsedAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([
                    owner.to_string(),
                    { "programId": TOKEN_PROGRAM_ID.to_string() },
                    { "encoding": "jsonParsed", "commitment": self.commitment().as_str() }
                ]),
            )
            .await?;

        response.value.into_iter().map(decode_token_account).collect()
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        let response: WithContext<UiBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment().as_str() }]),
            )
            .await?;

        Hash::from_str(&response.value.blockhash)
            .map_err(|e| ClientError::Deserialization(format!("blockhash: {}", e)))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        let wire = bincode::serialize(transaction).map_err(|e| ClientError::Encoding(e.to_string()))?;
        let encoded = bs58::encode(wire).into_string();

        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base58",
                        "preflightCommitment": self.commitment().as_str()
                    }
                ]),
            )
            .await?;

        Signature::from_str(&signature)
            .map_err(|e| ClientError::Deserialization(format!("signature: {}", e)))
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<u64, ClientError> {
        let deadline = tokio::time::Instant::now() + self.config.confirmation_timeout;

        loop {
            match self.signature_status(signature).await? {
                StatusCheck::Landed(slot) => return Ok(slot),
                StatusCheck::Failed(reason) => {
                    return Err(ClientError::TransactionFailed {
                        signature: signature.to_string(),
                        reason,
                    })
                }
                StatusCheck::Pending => {}
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ClientError::ConfirmationTimeout {
                    signature: signature.to_string(),
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

fn parse_address(value: &str) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(value).map_err(|e| ClientError::Deserialization(format!("{}: {}", value, e)))
}

fn decode_account(account: UiAccount) -> Result<AccountSnapshot, ClientError> {
    let (payload, encoding) = account.data;
    if encoding != "base64" {
        return Err(ClientError::Encoding(format!(
            "unexpected account encoding {}",
            encoding
        )));
    }

    let data = BASE64
        .decode(payload)
        .map_err(|e| ClientError::Encoding(e.to_string()))?;

    Ok(AccountSnapshot {
        lamports: account.lamports,
        owner: parse_address(&account.owner)?,
        data,
        executable: account.executable,
    })
}

fn decode_token_account(keyed: KeyedParsedAccount) -> Result<TokenAccountSummary, ClientError> {
    let info = keyed.account.data.parsed.info;
    let amount = info
        .token_amount
        .amount
        .parse()
        .map_err(|_| ClientError::Deserialization(format!("token amount {}", info.token_amount.amount)))?;

    Ok(TokenAccountSummary {
        address: parse_address(&keyed.pubkey)?,
        mint: parse_address(&info.mint)?,
        amount,
        decimals: info.token_amount.decimals,
        delegate: info.delegate.as_deref().map(parse_address).transpose()?,
    })
}

fn evaluate_status(status: Option<SignatureStatus>, commitment: Commitment) -> StatusCheck {
    let Some(status) = status else {
        return StatusCheck::Pending;
    };

    if let Some(err) = status.err {
        return StatusCheck::Failed(err.to_string());
    }

    match status.confirmation_status.as_deref() {
        Some(level) if commitment.is_reached_by(level) => StatusCheck::Landed(status.slot),
        _ => StatusCheck::Pending,
    }
}
