//! Constant-product pricing for the embedded MC/JBC pool.
//!
//! Pure math only; reserve bookkeeping lives on `SwapPool` and token
//! movement in the swap/liquidity instructions.

use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, MIN_LIQUIDITY, PRICE_SCALE};
use crate::errors::ProtocolError;

/// Output of a constant-product trade after the pool fee.
///
/// out = in * (1 - fee) * reserve_out / (reserve_in + in * (1 - fee))
pub fn get_amount_out(amount_in: u64, reserve_in: u64, reserve_out: u64, fee_bps: u16) -> Result<u64> {
    require!(amount_in > 0, ProtocolError::InvalidAmount);
    require!(
        reserve_in > 0 && reserve_out > 0,
        ProtocolError::InsufficientLiquidity
    );
    require!(
        (fee_bps as u64) < BPS_DENOMINATOR,
        ProtocolError::InvalidSwapTax
    );

    let amount_in_with_fee = (amount_in as u128)
        .checked_mul((BPS_DENOMINATOR - fee_bps as u64) as u128)
        .ok_or(ProtocolError::MathOverflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out as u128)
        .ok_or(ProtocolError::MathOverflow)?;
    let denominator = (reserve_in as u128)
        .checked_mul(BPS_DENOMINATOR as u128)
        .ok_or(ProtocolError::MathOverflow)?
        .checked_add(amount_in_with_fee)
        .ok_or(ProtocolError::MathOverflow)?;

    let amount_out = numerator
        .checked_div(denominator)
        .ok_or(ProtocolError::MathOverflow)?;

    u64::try_from(amount_out).map_err(|_| error!(ProtocolError::MathOverflow))
}

/// MC per JBC, scaled by `PRICE_SCALE`.
///
/// Thin or empty pools price at exactly 1:1 so reward conversion can't be
/// skewed by draining one side.
pub fn price_rate(reserve_mc: u64, reserve_jbc: u64) -> u128 {
    if reserve_jbc == 0 || reserve_mc < MIN_LIQUIDITY {
        return PRICE_SCALE;
    }
    (reserve_mc as u128) * PRICE_SCALE / (reserve_jbc as u128)
}

/// Convert an MC-denominated value into JBC at `rate`.
pub fn mc_value_to_jbc(mc_value: u64, rate: u128) -> Result<u64> {
    require!(rate > 0, ProtocolError::InsufficientLiquidity);

    let jbc = (mc_value as u128)
        .checked_mul(PRICE_SCALE)
        .ok_or(ProtocolError::MathOverflow)?
        / rate;

    u64::try_from(jbc).map_err(|_| error!(ProtocolError::MathOverflow))
}

/// `amount * bps / 10_000`, rounded down.
pub fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(ProtocolError::MathOverflow)?
        / BPS_DENOMINATOR as u128;
    Ok(value as u64)
}
