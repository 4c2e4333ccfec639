//! Pure-logic tests for the embedded MC/JBC pool.
//!
//! Covers the constant-product quote, the thin-pool 1:1 price floor, tax
//! handling on buys and sells, and reserve bookkeeping. No CPI involved.

use anchor_lang::prelude::*;
use jbc_protocol::amm::{bps_of, get_amount_out, mc_value_to_jbc, price_rate};
use jbc_protocol::{ProtocolError, SwapDirection, SwapPool, MIN_LIQUIDITY, PRICE_SCALE};

const ONE: u64 = 1_000_000_000; // 1 token, 9 decimals

// =========================================================================
// HELPERS
// =========================================================================

fn make_pool(reserve_mc: u64, reserve_jbc: u64) -> SwapPool {
    SwapPool {
        bump: 255,
        reserve_mc,
        reserve_jbc,
        total_jbc_burned: 0,
        total_mc_volume: 0,
        _reserved: [0u8; 32],
    }
}

fn assert_err<T: std::fmt::Debug>(result: Result<T>, expected: ProtocolError) {
    let err = result.expect_err("expected an error");
    assert_eq!(err, anchor_lang::error::Error::from(expected));
}

// =========================================================================
// QUOTE
// =========================================================================

#[test]
fn test_amount_out_without_fee() {
    // 1000 * 1e6 / (1e6 + 1000) = 999.000999...
    assert_eq!(get_amount_out(1_000, 1_000_000, 1_000_000, 0).unwrap(), 999);
}

#[test]
fn test_amount_out_with_fee() {
    // 0.3% fee: 1000 * 9970 * 1e6 / (1e6 * 1e4 + 1000 * 9970)
    assert_eq!(get_amount_out(1_000, 1_000_000, 1_000_000, 30).unwrap(), 996);
}

#[test]
fn test_quote_is_deterministic() {
    let a = get_amount_out(123_456 * ONE, 9_876_543 * ONE, 1_234_567 * ONE, 25).unwrap();
    let b = get_amount_out(123_456 * ONE, 9_876_543 * ONE, 1_234_567 * ONE, 25).unwrap();
    assert_eq!(a, b);

    let pool = make_pool(50_000 * ONE, 20_000 * ONE);
    assert_eq!(
        pool.quote_buy(77 * ONE, 30, 500).unwrap(),
        pool.quote_buy(77 * ONE, 30, 500).unwrap()
    );
}

#[test]
fn test_output_never_reaches_reserve() {
    let out = get_amount_out(u64::MAX / 2, 1_000, 1_000, 0).unwrap();
    assert!(out < 1_000);
}

#[test]
fn test_zero_reserves_rejected() {
    assert_err(get_amount_out(1_000, 0, 1_000, 0), ProtocolError::InsufficientLiquidity);
    assert_err(get_amount_out(1_000, 1_000, 0, 0), ProtocolError::InsufficientLiquidity);
}

#[test]
fn test_zero_input_rejected() {
    assert_err(get_amount_out(0, 1_000, 1_000, 0), ProtocolError::InvalidAmount);
}

// =========================================================================
// PRICE FLOOR
// =========================================================================

#[test]
fn test_price_is_one_to_one_when_jbc_reserve_empty() {
    assert_eq!(price_rate(1_000_000 * ONE, 0), PRICE_SCALE);
}

#[test]
fn test_price_is_one_to_one_below_min_liquidity() {
    assert_eq!(price_rate(MIN_LIQUIDITY - 1, 1), PRICE_SCALE);
    assert_eq!(price_rate(0, 1_000 * ONE), PRICE_SCALE);
}

#[test]
fn test_price_tracks_reserves_at_depth() {
    assert_eq!(price_rate(MIN_LIQUIDITY * 2, MIN_LIQUIDITY), 2 * PRICE_SCALE);
    assert_eq!(price_rate(MIN_LIQUIDITY, MIN_LIQUIDITY * 4), PRICE_SCALE / 4);
}

#[test]
fn test_mc_value_conversion() {
    // JBC at 2 MC: 100 MC of value buys 50 JBC
    assert_eq!(mc_value_to_jbc(100 * ONE, 2 * PRICE_SCALE).unwrap(), 50 * ONE);
    assert_eq!(mc_value_to_jbc(100 * ONE, PRICE_SCALE).unwrap(), 100 * ONE);
}

#[test]
fn test_bps_rounds_down() {
    assert_eq!(bps_of(9_999, 1).unwrap(), 0);
    assert_eq!(bps_of(10_000, 1).unwrap(), 1);
    assert_eq!(bps_of(1_000, 5_000).unwrap(), 500);
}

// =========================================================================
// POOL SWAPS
// =========================================================================

#[test]
fn test_buy_burns_tax_out_of_output() {
    let mut pool = make_pool(10_000 * ONE, 10_000 * ONE);
    let k_before = pool.invariant();

    let quote = pool.quote_buy(100 * ONE, 30, 500).unwrap();
    assert_eq!(quote.gross_out, 98_715_803_439);
    assert_eq!(quote.tax, 4_935_790_171);
    assert_eq!(quote.net_out + quote.tax, quote.gross_out);

    pool.apply_swap(SwapDirection::McToJbc, &quote).unwrap();
    assert_eq!(pool.reserve_mc, 10_100 * ONE);
    assert_eq!(pool.reserve_jbc, 10_000 * ONE - quote.gross_out);
    assert_eq!(pool.total_jbc_burned, quote.tax);
    assert!(pool.invariant() >= k_before);
}

#[test]
fn test_sell_burns_tax_before_pricing() {
    let mut pool = make_pool(10_000 * ONE, 10_000 * ONE);
    let k_before = pool.invariant();

    let quote = pool.quote_sell(100 * ONE, 30, 300).unwrap();
    assert_eq!(quote.tax, 3 * ONE);
    assert_eq!(quote.net_in, 97 * ONE);
    assert_eq!(quote.net_out, 95_782_695_133);

    pool.apply_swap(SwapDirection::JbcToMc, &quote).unwrap();
    assert_eq!(pool.reserve_jbc, 10_097 * ONE);
    assert_eq!(pool.reserve_mc, 10_000 * ONE - quote.net_out);
    assert!(pool.invariant() >= k_before);
}

#[test]
fn test_round_trip_never_grows_reserves_for_trader() {
    let mut pool = make_pool(10_000 * ONE, 10_000 * ONE);

    let buy = pool.quote_buy(500 * ONE, 30, 0).unwrap();
    pool.apply_swap(SwapDirection::McToJbc, &buy).unwrap();
    let sell = pool.quote_sell(buy.net_out, 30, 0).unwrap();
    pool.apply_swap(SwapDirection::JbcToMc, &sell).unwrap();

    assert!(sell.net_out < 500 * ONE);
    assert!(pool.reserve_mc > 10_000 * ONE);
}

#[test]
fn test_swap_against_empty_pool_fails() {
    let pool = make_pool(0, 0);
    assert_err(pool.quote_buy(ONE, 30, 0), ProtocolError::InsufficientLiquidity);
    assert_err(pool.quote_sell(ONE, 30, 0), ProtocolError::InsufficientLiquidity);
}

#[test]
fn test_dust_buy_with_zero_output_fails() {
    let pool = make_pool(1_000_000 * ONE, 10);
    assert_err(pool.quote_buy(1, 0, 0), ProtocolError::InsufficientLiquidity);
}

// =========================================================================
// LIQUIDITY
// =========================================================================

#[test]
fn test_add_liquidity_grows_k() {
    let mut pool = make_pool(1_000 * ONE, 1_000 * ONE);
    let k_before = pool.invariant();
    pool.add_liquidity(500 * ONE, 0).unwrap();
    assert!(pool.invariant() > k_before);
    assert_eq!(pool.reserve_mc, 1_500 * ONE);
}

#[test]
fn test_add_nothing_rejected() {
    let mut pool = make_pool(1_000, 1_000);
    assert_err(pool.add_liquidity(0, 0), ProtocolError::InvalidAmount);
}

#[test]
fn test_withdraw_bounded_by_reserves() {
    let mut pool = make_pool(1_000, 2_000);
    assert_err(pool.withdraw_reserves(1_001, 0), ProtocolError::InsufficientLiquidity);

    pool.withdraw_reserves(1_000, 500).unwrap();
    assert_eq!(pool.reserve_mc, 0);
    assert_eq!(pool.reserve_jbc, 1_500);
}
