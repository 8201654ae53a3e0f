//! Launcher configuration.
//!
//! Provides the cluster selection, dex program, platform fee settings and
//! confirmation timing used by the launcher.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use mintforge_sdk::client::RpcClientConfig;
use mintforge_sdk::programs::{OPENBOOK_DEX_DEVNET_PROGRAM_ID, OPENBOOK_DEX_PROGRAM_ID};
use mintforge_sdk::types::{parse_pubkey, sol_to_lamports};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Explorer used for transaction links.
pub const EXPLORER_BASE_URL: &str = "https://solscan.io";

/// Default fee charged per authority option kept on a new token (0.1 SOL).
pub const DEFAULT_AUTHORITY_OPTION_FEE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Default confirmation timeout in milliseconds.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 60_000;

/// Default signature status poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Solana cluster the launcher talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    /// Mainnet beta.
    MainnetBeta,
    /// Testnet.
    Testnet,
    /// Devnet.
    #[default]
    Devnet,
    /// Any other endpoint, usually a local validator.
    Custom(String),
}

impl Cluster {
    /// Endpoint of a local test validator.
    pub const LOCALNET_URL: &'static str = "http://localhost:8899/";

    /// Returns the public JSON-RPC endpoint of the cluster.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Custom(url) => url,
        }
    }

    /// Returns the cluster name used in explorer links.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Custom(_) => "custom",
        }
    }

    /// Returns the dex deployment used on this cluster when none is configured.
    #[must_use]
    pub fn default_dex_program_id(&self) -> Pubkey {
        match self {
            Self::MainnetBeta => OPENBOOK_DEX_PROGRAM_ID,
            _ => OPENBOOK_DEX_DEVNET_PROGRAM_ID,
        }
    }

    /// Returns the explorer link for a transaction signature.
    #[must_use]
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        match self {
            Self::MainnetBeta => format!("{}/tx/{}", EXPLORER_BASE_URL, signature),
            Self::Custom(url) => format!(
                "{}/tx/{}?cluster=custom&customUrl={}",
                EXPLORER_BASE_URL, signature, url
            ),
            other => format!(
                "{}/tx/{}?cluster={}",
                EXPLORER_BASE_URL,
                signature,
                other.name()
            ),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(url) => write!(f, "custom ({})", url),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Cluster {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" | "localhost" | "custom" => Ok(Self::Custom(Self::LOCALNET_URL.to_string())),
            other if other.starts_with("http://") || other.starts_with("https://") => {
                Ok(Self::Custom(s.trim().to_string()))
            }
            _ => Err(ConfigError::UnknownCluster(s.to_string())),
        }
    }
}

/// Configuration for the launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Target cluster.
    pub cluster: Cluster,

    /// RPC endpoint override. `None` uses the cluster endpoint.
    pub rpc_url: Option<String>,

    /// Dex program (base58). `None` uses the cluster's deployment.
    pub dex_program_id: Option<String>,

    /// Platform fee destination (base58). `None` disables all fees.
    pub fees_address: Option<String>,

    /// Base fee for creating a token, in SOL.
    pub token_create_fee: Decimal,

    /// Fee for creating a market, in SOL.
    pub market_create_fee: Decimal,

    /// Fee per authority option kept on a new token, in SOL.
    pub authority_option_fee: Decimal,

    /// How long to wait for each transaction to confirm, in milliseconds.
    pub confirmation_timeout_ms: u64,

    /// Delay between signature status polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Path of the fee payer keypair file.
    pub keypair_path: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_url: None,
            dex_program_id: None,
            fees_address: None,
            token_create_fee: Decimal::ZERO,
            market_create_fee: Decimal::ZERO,
            authority_option_fee: DEFAULT_AUTHORITY_OPTION_FEE,
            confirmation_timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            keypair_path: None,
        }
    }
}

impl LauncherConfig {
    /// Creates a new configuration for the given cluster.
    #[must_use]
    pub fn with_cluster(cluster: Cluster) -> Self {
        Self {
            cluster,
            ..Default::default()
        }
    }

    /// Sets the RPC endpoint override.
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Sets the dex program.
    #[must_use]
    pub fn with_dex_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.dex_program_id = Some(program_id.into());
        self
    }

    /// Sets the fee destination and amounts (in SOL).
    #[must_use]
    pub fn with_fees(
        mut self,
        address: impl Into<String>,
        token_create_fee: Decimal,
        market_create_fee: Decimal,
    ) -> Self {
        self.fees_address = Some(address.into());
        self.token_create_fee = token_create_fee;
        self.market_create_fee = market_create_fee;
        self
    }

    /// Sets the per-option authority fee (in SOL).
    #[must_use]
    pub fn with_authority_option_fee(mut self, fee: Decimal) -> Self {
        self.authority_option_fee = fee;
        self
    }

    /// Sets the confirmation timeout.
    #[must_use]
    pub fn with_confirmation_timeout(mut self, ms: u64) -> Self {
        self.confirmation_timeout_ms = ms;
        self
    }

    /// Sets the keypair path.
    #[must_use]
    pub fn with_keypair_path(mut self, path: impl Into<String>) -> Self {
        self.keypair_path = Some(path.into());
        self
    }

    /// Returns the effective RPC endpoint.
    #[must_use]
    pub fn rpc_endpoint(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.cluster.endpoint())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.rpc_endpoint();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidRpcUrl(endpoint.to_string()));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        if self.confirmation_timeout_ms < self.poll_interval_ms {
            return Err(ConfigError::InvalidConfirmationTimeout);
        }

        self.dex_program()?;
        self.fee_destination()?;
        self.fee_schedule()?;

        Ok(())
    }

    /// Parses the dex program.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid.
    pub fn dex_program(&self) -> Result<Pubkey, ConfigError> {
        match &self.dex_program_id {
            Some(value) => parse_address("dex_program_id", value),
            None => Ok(self.cluster.default_dex_program_id()),
        }
    }

    /// Parses the fee destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid.
    pub fn fee_destination(&self) -> Result<Option<Pubkey>, ConfigError> {
        self.fees_address
            .as_deref()
            .map(|value| parse_address("fees_address", value))
            .transpose()
    }

    /// Converts the configured SOL fees to lamports.
    ///
    /// # Errors
    ///
    /// Returns an error if a fee is negative or not representable.
    pub fn fee_schedule(&self) -> Result<FeeSchedule, ConfigError> {
        Ok(FeeSchedule {
            token_create: fee_lamports("token_create_fee", self.token_create_fee)?,
            market_create: fee_lamports("market_create_fee", self.market_create_fee)?,
            authority_option: fee_lamports("authority_option_fee", self.authority_option_fee)?,
        })
    }

    /// Builds the RPC client configuration.
    #[must_use]
    pub fn rpc_client_config(&self) -> RpcClientConfig {
        RpcClientConfig::new(self.rpc_endpoint())
            .with_confirmation_timeout(Duration::from_millis(self.confirmation_timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from an arbitrary variable source.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(cluster) = lookup("SOLANA_CLUSTER") {
            config.cluster = cluster.parse()?;
        }
        config.rpc_url = lookup("SOLANA_RPC_URL");
        config.dex_program_id = lookup("DEX_PROGRAM_ID");
        config.fees_address = lookup("FEES_ADDRESS");
        config.keypair_path = lookup("SOLANA_KEYPAIR_PATH");

        if let Some(value) = lookup("TOKEN_CREATE_FEES_AMOUNT") {
            config.token_create_fee = parse_env("TOKEN_CREATE_FEES_AMOUNT", &value)?;
        }
        if let Some(value) = lookup("TOKEN_MARKET_CREATE_FEES_AMOUNT") {
            config.market_create_fee = parse_env("TOKEN_MARKET_CREATE_FEES_AMOUNT", &value)?;
        }
        if let Some(value) = lookup("AUTHORITY_OPTION_FEES_AMOUNT") {
            config.authority_option_fee = parse_env("AUTHORITY_OPTION_FEES_AMOUNT", &value)?;
        }
        if let Some(value) = lookup("CONFIRMATION_TIMEOUT_MS") {
            config.confirmation_timeout_ms = parse_env("CONFIRMATION_TIMEOUT_MS", &value)?;
        }

        Ok(config)
    }
}

/// Platform fees in lamports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Base fee for creating a token.
    pub token_create: u64,
    /// Fee for creating a market.
    pub market_create: u64,
    /// Fee per authority option kept on a new token.
    pub authority_option: u64,
}

fn parse_address(field: &'static str, value: &str) -> Result<Pubkey, ConfigError> {
    parse_pubkey(value).map_err(|_| ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

fn fee_lamports(field: &'static str, sol: Decimal) -> Result<u64, ConfigError> {
    sol_to_lamports(sol).map_err(|_| ConfigError::InvalidFee {
        field,
        value: sol.to_string(),
    })
}

fn parse_env<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Unknown cluster name.
    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    /// RPC endpoint is not an HTTP URL.
    #[error("invalid RPC url: {0}")]
    InvalidRpcUrl(String),

    /// Invalid poll interval.
    #[error("poll_interval_ms must be > 0")]
    InvalidPollInterval,

    /// Confirmation timeout shorter than one poll.
    #[error("confirmation_timeout_ms must be >= poll_interval_ms")]
    InvalidConfirmationTimeout,

    /// Invalid address.
    #[error("invalid {field}: {value}")]
    InvalidAddress {
        /// Config field.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Fee is negative or has sub-lamport precision.
    #[error("invalid {field}: {value} SOL")]
    InvalidFee {
        /// Config field.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Environment variable could not be parsed.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}
