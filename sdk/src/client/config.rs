//! RPC client configuration.
//!
//! Provides configuration options for the JSON-RPC client.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ClientError;

/// Default RPC endpoint (devnet).
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum retries.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default time to wait for a transaction to confirm.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 60_000;

/// Default delay between signature status polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Commitment level requested from the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Processed by the connected node.
    Processed,
    /// Voted on by a supermajority.
    #[default]
    Confirmed,
    /// Rooted.
    Finalized,
}

impl Commitment {
    /// Returns the JSON-RPC name of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }

    /// Returns true if a status reported as `status` satisfies this level.
    #[must_use]
    pub fn is_reached_by(&self, status: &str) -> bool {
        match self {
            Self::Processed => matches!(status, "processed" | "confirmed" | "finalized"),
            Self::Confirmed => matches!(status, "confirmed" | "finalized"),
            Self::Finalized => status == "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RPC client configuration.
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// JSON-RPC endpoint.
    pub url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Maximum number of retries for rate-limited or timed out requests.
    pub max_retries: u32,

    /// Commitment used for reads and confirmation.
    pub commitment: Commitment,

    /// How long to wait for a sent transaction to confirm.
    pub confirmation_timeout: Duration,

    /// Delay between signature status polls.
    pub poll_interval: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            commitment: Commitment::default(),
            confirmation_timeout: Duration::from_millis(DEFAULT_CONFIRMATION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            user_agent: format!("mintforge-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RpcClientConfig {
    /// Creates a new configuration with the given endpoint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the commitment level.
    #[must_use]
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Sets the confirmation timeout.
    #[must_use]
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Sets the status poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.url.is_empty() {
            return Err(ClientError::InvalidConfig("url cannot be empty".to_string()));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(
                "url must start with http:// or https://".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(ClientError::InvalidConfig(
                "poll_interval must be positive".to_string(),
            ));
        }

        if self.confirmation_timeout < self.poll_interval {
            return Err(ClientError::InvalidConfig(
                "confirmation_timeout must be at least poll_interval".to_string(),
            ));
        }

        Ok(())
    }
}
