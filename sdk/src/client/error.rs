//! Client error types.
//!
//! Provides error types for JSON-RPC transport and transaction confirmation.

use std::fmt;

/// Client errors.
#[derive(Debug)]
pub enum ClientError {
    /// HTTP request failed.
    Request(reqwest::Error),

    /// Failed to deserialize response.
    Deserialization(String),

    /// Node returned a JSON-RPC error object.
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// Rate limited (429).
    RateLimited {
        /// Retry after seconds.
        retry_after: Option<u64>,
    },

    /// Invalid configuration.
    InvalidConfig(String),

    /// Request timeout.
    Timeout,

    /// Failed to encode a transaction or decode account data.
    Encoding(String),

    /// Transaction landed but the runtime reported an error.
    TransactionFailed {
        /// Transaction signature.
        signature: String,
        /// Runtime error as reported by the node.
        reason: String,
    },

    /// Transaction did not reach the requested commitment in time.
    ConfirmationTimeout {
        /// Transaction signature.
        signature: String,
    },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "HTTP request failed: {}", e),
            Self::Deserialization(msg) => write!(f, "deserialization failed: {}", msg),
            Self::Rpc { code, message } => write!(f, "RPC error [{}]: {}", code, message),
            Self::RateLimited { retry_after } => {
                if let Some(secs) = retry_after {
                    write!(f, "rate limited, retry after {} seconds", secs)
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Timeout => write!(f, "request timeout"),
            Self::Encoding(msg) => write!(f, "encoding failed: {}", msg),
            Self::TransactionFailed { signature, reason } => {
                write!(f, "transaction {} failed: {}", signature, reason)
            }
            Self::ConfirmationTimeout { signature } => {
                write!(f, "transaction {} was not confirmed in time", signature)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}
