//! Lamport / SOL conversions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::SdkError;
use crate::programs::LAMPORTS_PER_SOL;

/// Converts lamports to SOL, without trailing zeros.
#[must_use]
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    (Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)).normalize()
}

/// Converts a SOL amount to lamports.
///
/// # Errors
///
/// Returns an error if the amount is negative, has more than nine decimal
/// places, or does not fit in `u64`.
pub fn sol_to_lamports(sol: Decimal) -> Result<u64, SdkError> {
    if sol.is_sign_negative() && !sol.is_zero() {
        return Err(SdkError::InvalidAmount(format!("{} is negative", sol)));
    }

    let lamports = sol
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .ok_or(SdkError::Overflow)?;

    if !lamports.fract().is_zero() {
        return Err(SdkError::InvalidAmount(format!(
            "{} has sub-lamport precision",
            sol
        )));
    }

    lamports.to_u64().ok_or(SdkError::Overflow)
}
