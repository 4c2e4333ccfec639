//! Pure-logic tests for stake redemption.

use anchor_lang::prelude::*;
use jbc_protocol::settlement::{
    check_batch_settled, check_fee_funding, check_redeemable, redeem_position, redemption_fee,
    settle_redemption,
};
use jbc_protocol::{ProtocolError, StakePosition, UserAccount, PRICE_SCALE};

const ONE: u64 = 1_000_000_000;
const DAY: i64 = 86_400;

fn assert_err<T: std::fmt::Debug>(result: Result<T>, expected: ProtocolError) {
    let err = result.expect_err("expected an error");
    assert_eq!(err, anchor_lang::error::Error::from(expected));
}

fn user_with_ticket(ticket: u64) -> UserAccount {
    let mut u = UserAccount::new(Pubkey::new_unique(), 255, 0);
    u.issue_ticket(ticket, 0, 0, 3).unwrap();
    u
}

fn open(user: &mut UserAccount, amount: u64, cycle_days: u16, start: i64) -> StakePosition {
    let opening = user.open_stake(amount, cycle_days).unwrap();
    StakePosition::new(user.owner, 255, &opening, amount, cycle_days, start, DAY)
}

// =========================================================================
// FEE
// =========================================================================

#[test]
fn test_fee_based_on_max_ticket_not_credit() {
    let mut user = user_with_ticket(1_000 * ONE);
    user.refund_fee_credit = 77 * ONE;
    assert_eq!(redemption_fee(&user, 5).unwrap(), 50 * ONE);

    // a smaller rebuy does not shrink the base
    user.ticket_amount = 10 * ONE;
    assert_eq!(redemption_fee(&user, 5).unwrap(), 50 * ONE);
}

#[test]
fn test_zero_fee_percent_charges_nothing() {
    let user = user_with_ticket(1_000 * ONE);
    assert_eq!(redemption_fee(&user, 0).unwrap(), 0);
}

#[test]
fn test_fee_funding_checks_allowance_first() {
    assert_err(
        check_fee_funding(10, 0, 0),
        ProtocolError::InsufficientAllowanceForFee,
    );
    assert_err(
        check_fee_funding(10, 10, 9),
        ProtocolError::InsufficientBalanceForFee,
    );
    check_fee_funding(10, 10, 10).unwrap();
    check_fee_funding(0, 0, 0).unwrap();
}

// =========================================================================
// GUARDS
// =========================================================================

#[test]
fn test_redeem_before_maturity_rejected() {
    let mut user = user_with_ticket(100 * ONE);
    let stake = open(&mut user, 100 * ONE, 7, 1_000);

    assert_err(
        check_redeemable(&user, &stake, 1_000 + 7 * DAY - 1),
        ProtocolError::NotExpired,
    );
    check_redeemable(&user, &stake, 1_000 + 7 * DAY).unwrap();
}

#[test]
fn test_redeem_foreign_stake_rejected() {
    let mut owner = user_with_ticket(100 * ONE);
    let stranger = user_with_ticket(100 * ONE);
    let stake = open(&mut owner, 100 * ONE, 7, 0);

    assert_err(
        check_redeemable(&stranger, &stake, 7 * DAY),
        ProtocolError::Unauthorized,
    );
}

#[test]
fn test_redeem_unknown_index_rejected() {
    let mut user = user_with_ticket(100 * ONE);
    let mut stake = open(&mut user, 100 * ONE, 7, 0);
    stake.index = 5;

    assert_err(
        check_redeemable(&user, &stake, 7 * DAY),
        ProtocolError::InvalidStake,
    );
}

#[test]
fn test_batch_of_closed_stakes_is_not_active() {
    assert_err(check_batch_settled(0, false), ProtocolError::StakeNotActive);
    assert_err(check_batch_settled(0, true), ProtocolError::NotExpired);
    check_batch_settled(1, true).unwrap();
}

// =========================================================================
// SETTLEMENT
// =========================================================================

#[test]
fn test_settle_banks_fee_and_exits_ticket() {
    let mut user = user_with_ticket(200 * ONE);
    let mut stake = open(&mut user, 100 * ONE, 15, 0);

    let outcome = settle_redemption(&mut user, &mut stake, 2, 15 * DAY).unwrap();

    assert_eq!(outcome.stake_index, 0);
    assert_eq!(outcome.principal, 100 * ONE);
    assert_eq!(outcome.fee, 4 * ONE);
    assert!(outcome.ticket_exited);
    assert_eq!(user.refund_fee_credit, 4 * ONE);
    assert_eq!(user.total_staked, 0);
    assert!(!stake.active);
    assert_eq!(stake.closed_at, 15 * DAY);
}

#[test]
fn test_second_redeem_of_same_stake_rejected() {
    let mut user = user_with_ticket(200 * ONE);
    let mut stake = open(&mut user, 100 * ONE, 7, 0);

    settle_redemption(&mut user, &mut stake, 1, 7 * DAY).unwrap();
    assert_err(
        settle_redemption(&mut user, &mut stake, 1, 8 * DAY),
        ProtocolError::StakeNotActive,
    );
    assert_eq!(user.refund_fee_credit, 2 * ONE);
}

#[test]
fn test_redeem_realizes_outstanding_yield_first() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 30, 0);

    let r = redeem_position(&mut user, &mut stake, &mut [], 1, 30 * DAY, PRICE_SCALE).unwrap();

    let realized = r.realization.expect("yield outstanding at maturity");
    assert_eq!(realized.static_reward.payable, 600 * ONE);
    assert_eq!(stake.paid, 600 * ONE);
    assert_eq!(user.pending_mc, 300 * ONE);
    assert_eq!(r.outcome.fee, 10 * ONE);
}

#[test]
fn test_redeem_after_full_claim_has_no_realization() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 7, 0);
    jbc_protocol::rewards::realize_static(&mut user, &mut stake, 7 * DAY, PRICE_SCALE).unwrap();

    let r = redeem_position(&mut user, &mut stake, &mut [], 0, 7 * DAY, PRICE_SCALE).unwrap();
    assert!(r.realization.is_none());
    assert_eq!(r.outcome.fee, 0);
}

#[test]
fn test_exit_releases_parent_active_direct() {
    let mut parent = user_with_ticket(1_000 * ONE);
    parent.active_directs = 2;

    let mut user = user_with_ticket(100 * ONE);
    let mut first = open(&mut user, 50 * ONE, 7, 0);
    let mut second = open(&mut user, 50 * ONE, 30, 0);

    let r = redeem_position(&mut user, &mut first, &mut [&mut parent], 1, 7 * DAY, PRICE_SCALE)
        .unwrap();
    assert!(!r.outcome.ticket_exited);
    assert_eq!(parent.active_directs, 2);

    let r = redeem_position(&mut user, &mut second, &mut [&mut parent], 1, 30 * DAY, PRICE_SCALE)
        .unwrap();
    assert!(r.outcome.ticket_exited);
    assert_eq!(parent.active_directs, 1);
    assert!(!user.is_active());
}

#[test]
fn test_immature_redeem_leaves_ledger_untouched() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 15, 0);

    assert_err(
        redeem_position(&mut user, &mut stake, &mut [], 1, 14 * DAY, PRICE_SCALE),
        ProtocolError::NotExpired,
    );
    assert_eq!(stake.paid, 0);
    assert_eq!(user.total_revenue, 0);
    assert!(stake.active);
}
