//! Market creation request types.
//!
//! Provides the user-facing request for a new market and the lot size
//! derivation from decimal exponents.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::sizing::{MarketAccountSizes, QueueLengths};
use crate::error::SdkError;

/// Fee rate passed to the dex on initialization. Ignored by v3 markets.
pub const DEFAULT_FEE_RATE_BPS: u16 = 150;

/// Quote dust threshold passed to the dex on initialization. Ignored by v3 markets.
pub const DEFAULT_QUOTE_DUST_THRESHOLD: u64 = 500;

/// Where the market's base and quote mints come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MintSource {
    /// Reuse mints that already exist on-chain.
    #[serde(rename_all = "camelCase")]
    Existing {
        /// Base mint address (base58 encoded).
        base_mint: String,
        /// Quote mint address (base58 encoded).
        quote_mint: String,
    },

    /// Create both mints as part of the market batch.
    #[serde(rename_all = "camelCase")]
    New {
        /// Decimals for the new base mint.
        base_decimals: u8,
        /// Decimals for the new quote mint.
        quote_decimals: u8,
        /// Mint authority for the base mint (base58 encoded).
        base_authority: String,
        /// Mint authority for the quote mint (base58 encoded).
        quote_authority: String,
    },
}

impl MintSource {
    /// Returns true if the batch must create the mints.
    #[must_use]
    pub const fn creates_mints(&self) -> bool {
        matches!(self, Self::New { .. })
    }
}

/// A request to create a new market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCreationRequest {
    /// Source of the base and quote mints.
    pub mints: MintSource,

    /// Minimum order size as a negative power of ten of one base token.
    pub lot_size: i32,

    /// Price increment as a negative power of ten, applied on top of the lot size.
    pub tick_size: i32,

    /// Advanced queue length overrides. `None` uses the defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lengths: Option<QueueLengths>,
}

impl MarketCreationRequest {
    /// Creates a request that reuses existing mints.
    #[must_use]
    pub fn with_existing_mints(
        base_mint: impl Into<String>,
        quote_mint: impl Into<String>,
        lot_size: i32,
        tick_size: i32,
    ) -> Self {
        Self {
            mints: MintSource::Existing {
                base_mint: base_mint.into(),
                quote_mint: quote_mint.into(),
            },
            lot_size,
            tick_size,
            lengths: None,
        }
    }

    /// Sets advanced queue lengths.
    #[must_use]
    pub fn lengths(mut self, lengths: QueueLengths) -> Self {
        self.lengths = Some(lengths);
        self
    }

    /// Returns the effective queue lengths.
    #[must_use]
    pub fn effective_lengths(&self) -> QueueLengths {
        self.lengths.unwrap_or_default()
    }

    /// Validates the request without any network access and returns the
    /// account sizes it implies.
    ///
    /// # Errors
    ///
    /// Returns an error if a length is out of range or an address is malformed.
    pub fn validate(&self) -> Result<MarketAccountSizes, SdkError> {
        let sizes = MarketAccountSizes::compute(&self.effective_lengths())?;

        match &self.mints {
            MintSource::Existing {
                base_mint,
                quote_mint,
            } => {
                parse_pubkey(base_mint)?;
                parse_pubkey(quote_mint)?;
            }
            MintSource::New {
                base_authority,
                quote_authority,
                ..
            } => {
                parse_pubkey(base_authority)?;
                parse_pubkey(quote_authority)?;
            }
        }

        Ok(sizes)
    }
}

/// Parses a base58 address.
///
/// # Errors
///
/// Returns `SdkError::InvalidAddress` if the string is not a valid pubkey.
pub fn parse_pubkey(value: &str) -> Result<Pubkey, SdkError> {
    Pubkey::from_str(value.trim()).map_err(|_| SdkError::InvalidAddress(value.to_string()))
}

/// Base and quote lot sizes in atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizes {
    /// Base lot size in base atoms.
    pub base_lot_size: u64,
    /// Quote lot size in quote atoms.
    pub quote_lot_size: u64,
}

impl LotSizes {
    /// Derives lot sizes from mint decimals and the request's exponents.
    ///
    /// `base = 10^(base_decimals - lot_size)` and
    /// `quote = 10^(quote_decimals - lot_size - tick_size)`.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::ZeroLotSize` when an exponent is negative (the value
    /// would round to zero) and `SdkError::Overflow` when it exceeds `u64`.
    pub fn compute(
        base_decimals: u8,
        quote_decimals: u8,
        lot_size: i32,
        tick_size: i32,
    ) -> Result<Self, SdkError> {
        let base_exponent = i64::from(base_decimals) - i64::from(lot_size);
        let quote_exponent =
            i64::from(quote_decimals) - i64::from(lot_size) - i64::from(tick_size);

        Ok(Self {
            base_lot_size: power_of_ten("base", base_exponent)?,
            quote_lot_size: power_of_ten("quote", quote_exponent)?,
        })
    }
}

fn power_of_ten(side: &'static str, exponent: i64) -> Result<u64, SdkError> {
    if exponent < 0 {
        return Err(SdkError::ZeroLotSize(side));
    }
    let exponent = u32::try_from(exponent).map_err(|_| SdkError::Overflow)?;
    10u64.checked_pow(exponent).ok_or(SdkError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_sizes_example() {
        let lots = LotSizes::compute(9, 6, 3, 3).expect("lot sizes");
        assert_eq!(lots.base_lot_size, 1_000_000);
        assert_eq!(lots.quote_lot_size, 1);
    }

    #[test]
    fn test_lot_sizes_deterministic() {
        let a = LotSizes::compute(9, 6, 3, 3).expect("lot sizes");
        let b = LotSizes::compute(9, 6, 3, 3).expect("lot sizes");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lot_sizes_negative_exponent_rounds_to_zero() {
        let err = LotSizes::compute(6, 6, 3, 4).expect_err("quote rounds to zero");
        assert_eq!(err, SdkError::ZeroLotSize("quote"));

        let err = LotSizes::compute(2, 9, 3, 0).expect_err("base rounds to zero");
        assert_eq!(err, SdkError::ZeroLotSize("base"));
    }

    #[test]
    fn test_lot_sizes_negative_input_grows() {
        let lots = LotSizes::compute(6, 6, -2, 0).expect("lot sizes");
        assert_eq!(lots.base_lot_size, 100_000_000);
    }

    #[test]
    fn test_lot_sizes_overflow() {
        assert_eq!(LotSizes::compute(9, 9, -11, 0), Err(SdkError::Overflow));
        assert!(LotSizes::compute(9, 9, -10, 0).is_ok());
    }

    #[test]
    fn test_request_validate_defaults() {
        let request = MarketCreationRequest::with_existing_mints(
            Pubkey::new_unique().to_string(),
            Pubkey::new_unique().to_string(),
            3,
            3,
        );
        let sizes = request.validate().expect("valid");
        assert_eq!(sizes.event_queue, 262_108);
    }

    #[test]
    fn test_request_validate_rejects_short_queue() {
        let request = MarketCreationRequest::with_existing_mints(
            Pubkey::new_unique().to_string(),
            Pubkey::new_unique().to_string(),
            3,
            3,
        )
        .lengths(QueueLengths::new(100, 63, 909));
        assert!(matches!(
            request.validate(),
            Err(SdkError::QueueLengthOutOfRange { .. })
        ));
    }

    #[test]
    fn test_request_validate_rejects_bad_address() {
        let request = MarketCreationRequest::with_existing_mints(
            "not-a-key",
            Pubkey::new_unique().to_string(),
            3,
            3,
        );
        assert_eq!(
            request.validate(),
            Err(SdkError::InvalidAddress("not-a-key".to_string()))
        );
    }

    #[test]
    fn test_mint_source_serde() {
        let source = MintSource::New {
            base_decimals: 9,
            quote_decimals: 6,
            base_authority: "a".to_string(),
            quote_authority: "b".to_string(),
        };
        let json = serde_json::to_value(&source).expect("serialize");
        assert_eq!(json["kind"], "new");
        assert_eq!(json["baseDecimals"], 9);
        assert!(source.creates_mints());
    }
}
