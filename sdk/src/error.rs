//! SDK error types.
//!
//! Provides validation and encoding errors for SDK operations. Every variant
//! is raised before anything touches the network.

/// SDK errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
    /// Invalid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A queue or order book length is outside the market program's bounds.
    #[error("{queue} length {value} out of range [{min}, {max}]")]
    QueueLengthOutOfRange {
        /// Which account the length belongs to.
        queue: &'static str,
        /// Requested length.
        value: u32,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// A lot size rounds down to zero.
    #[error("{0} lot size rounds to zero")]
    ZeroLotSize(&'static str),

    /// Token metadata field exceeds the on-chain limit.
    #[error("metadata {field} exceeds {max} bytes")]
    MetadataTooLong {
        /// Field name.
        field: &'static str,
        /// Maximum length in bytes.
        max: usize,
    },

    /// Account data does not describe a valid mint.
    #[error("invalid mint account: {0}")]
    InvalidMint(String),

    /// No bump nonce produced an off-curve vault signer address.
    #[error("unable to find vault signer nonce")]
    VaultNonceNotFound,

    /// Invalid SOL amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Rent was looked up for accounts of other sizes than the request.
    #[error("rent schedule does not match the requested account sizes")]
    RentSizeMismatch,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SdkError::InvalidAddress("not base58".to_string());
        assert_eq!(err.to_string(), "invalid address: not base58");
    }

    #[test]
    fn test_error_queue_length_display() {
        let err = SdkError::QueueLengthOutOfRange {
            queue: "event queue",
            value: 100,
            min: 128,
            max: 2978,
        };
        assert_eq!(
            err.to_string(),
            "event queue length 100 out of range [128, 2978]"
        );
    }

    #[test]
    fn test_error_overflow() {
        let err = SdkError::Overflow;
        assert_eq!(err.to_string(), "arithmetic overflow");
    }
}
