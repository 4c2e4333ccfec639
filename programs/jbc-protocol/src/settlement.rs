//! Redemption math: fee derivation, fee funding checks, stake closing.

use anchor_lang::prelude::*;

use crate::errors::ProtocolError;
use crate::rewards::{percent_of, realize_stake, Realization};
use crate::state::{StakePosition, UserAccount};
use crate::upline::adjust_active_directs;

/// Ledger effect of one redemption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedemptionOutcome {
    pub stake_index: u64,
    /// MC principal returned
    pub principal: u64,
    /// MC fee pulled from the owner and credited to `refund_fee_credit`
    pub fee: u64,
    /// True if this closed the owner's live ticket
    pub ticket_exited: bool,
}

/// Fee charged on redeeming any stake of `user`.
///
/// Based on the largest ticket the user ever held, never on the
/// refund-fee credit.
pub fn redemption_fee(user: &UserAccount, fee_percent: u8) -> Result<u64> {
    percent_of(user.redemption_fee_base(), fee_percent)
}

/// Guard for a redemption attempt; nothing is mutated.
pub fn check_redeemable(user: &UserAccount, stake: &StakePosition, now: i64) -> Result<()> {
    require_keys_eq!(stake.owner, user.owner, ProtocolError::Unauthorized);
    require!(stake.index < user.stake_count, ProtocolError::InvalidStake);
    require!(stake.active, ProtocolError::StakeNotActive);
    require!(stake.is_mature(now)?, ProtocolError::NotExpired);
    Ok(())
}

/// Allowance is checked before balance so a missing approval is reported as such.
pub fn check_fee_funding(fee: u64, allowance: u64, balance: u64) -> Result<()> {
    if fee == 0 {
        return Ok(());
    }
    require!(allowance >= fee, ProtocolError::InsufficientAllowanceForFee);
    require!(balance >= fee, ProtocolError::InsufficientBalanceForFee);
    Ok(())
}

/// A batch redeem must settle at least one stake. A batch of closed stakes
/// is `StakeNotActive`; live but immature ones are `NotExpired`.
pub fn check_batch_settled(settled: usize, any_active: bool) -> Result<()> {
    require!(any_active, ProtocolError::StakeNotActive);
    require!(settled > 0, ProtocolError::NotExpired);
    Ok(())
}

/// Close a matured stake on the ledger and bank the fee as credit.
///
/// Static yield must already be realized by the caller.
pub fn settle_redemption(
    user: &mut UserAccount,
    stake: &mut StakePosition,
    fee_percent: u8,
    now: i64,
) -> Result<RedemptionOutcome> {
    check_redeemable(user, stake, now)?;
    let fee = redemption_fee(user, fee_percent)?;

    stake.active = false;
    stake.closed_at = now;
    let ticket_exited = user.close_stake(stake.amount)?;
    user.refund_fee_credit = user
        .refund_fee_credit
        .checked_add(fee)
        .ok_or(ProtocolError::MathOverflow)?;

    Ok(RedemptionOutcome {
        stake_index: stake.index,
        principal: stake.amount,
        fee,
        ticket_exited,
    })
}

/// Full redemption of one stake: realization, then settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redemption {
    pub realization: Option<Realization>,
    pub outcome: RedemptionOutcome,
}

/// Realize outstanding yield (paying differentials above the owner), close
/// the stake, and release the parent's active direct if the ticket exits.
pub fn redeem_position(
    user: &mut UserAccount,
    stake: &mut StakePosition,
    uplines: &mut [&mut UserAccount],
    fee_percent: u8,
    now: i64,
    rate: u128,
) -> Result<Redemption> {
    check_redeemable(user, stake, now)?;

    let realization = realize_stake(user, stake, uplines, now, rate)?;
    let outcome = settle_redemption(user, stake, fee_percent, now)?;

    if outcome.ticket_exited {
        if let Some(parent) = uplines.first_mut() {
            adjust_active_directs(parent, false)?;
        }
    }

    Ok(Redemption {
        realization,
        outcome,
    })
}
