//! Reward engine: static yield realization and referral distribution.
//!
//! Everything here is pure ledger math over borrowed accounts. Instruction
//! handlers load the accounts, call in here, persist, and only then move
//! tokens.

use anchor_lang::prelude::*;

use crate::amm::mc_value_to_jbc;
use crate::constants::{DIFFERENTIAL_DEPTH, LEVEL_REWARD_DEPTH, MAX_LEVEL_PERCENT, PERCENT_DENOMINATOR};
use crate::errors::ProtocolError;
use crate::levels::classify;
use crate::state::{DistributionConfig, StakePosition, UserAccount};

/// Reward stream tag carried by reward events.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardKind {
    Static,
    Direct,
    Level,
    Differential,
}

/// `amount * percent / 100`, rounded down.
pub fn percent_of(amount: u64, percent: u8) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(percent as u128)
        .ok_or(ProtocolError::MathOverflow)?
        / PERCENT_DENOMINATOR as u128;
    u64::try_from(value).map_err(|_| error!(ProtocolError::MathOverflow))
}

/// Split a payable value into (MC, JBC value). The odd unit stays on the MC side.
pub fn split_payout(payable: u64) -> (u64, u64) {
    let jbc_value = payable / 2;
    (payable - jbc_value, jbc_value)
}

/// MC leg plus the JBC amount owed for the other half at `rate`.
fn convert_payout(payable: u64, rate: u128) -> Result<(u64, u64)> {
    let (mc_amount, jbc_value) = split_payout(payable);
    let jbc_amount = if jbc_value == 0 {
        0
    } else {
        mc_value_to_jbc(jbc_value, rate)?
    };
    Ok((mc_amount, jbc_amount))
}

// =============================================================================
// STATIC YIELD
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticRealization {
    pub stake_index: u64,
    pub ticket_id: u64,
    /// Value booked against the cap
    pub payable: u64,
    pub mc_amount: u64,
    pub jbc_amount: u64,
}

/// Realize the static yield of one stake into the owner's claimable balances.
///
/// Returns `None` when nothing is payable (closed stake, nothing accrued, or
/// cap exhausted).
pub fn realize_static(
    user: &mut UserAccount,
    stake: &mut StakePosition,
    now: i64,
    rate: u128,
) -> Result<Option<StaticRealization>> {
    require_keys_eq!(stake.owner, user.owner, ProtocolError::Unauthorized);
    if !stake.active {
        return Ok(None);
    }

    let pending = stake.pending(now)?;
    let payable = pending.min(user.headroom());
    if payable == 0 {
        return Ok(None);
    }

    let (mc_amount, jbc_amount) = convert_payout(payable, rate)?;

    stake.paid = stake
        .paid
        .checked_add(payable)
        .ok_or(ProtocolError::MathOverflow)?;
    user.record_revenue(payable)?;
    user.credit_pending(mc_amount, jbc_amount)?;

    Ok(Some(StaticRealization {
        stake_index: stake.index,
        ticket_id: stake.ticket_id,
        payable,
        mc_amount,
        jbc_amount,
    }))
}

// =============================================================================
// TICKET DISTRIBUTION (direct + level)
// =============================================================================

/// One referral credit booked on an upline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferralCredit {
    pub upline: Pubkey,
    /// 1 = parent
    pub depth: u8,
    pub kind: RewardKind,
    pub mc_amount: u64,
    pub jbc_amount: u64,
}

/// Where every unit of a ticket purchase goes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketDistribution {
    pub credits: Vec<ReferralCredit>,
    /// Direct share not credited (inactive referrer or cap), sent to marketing
    pub direct_redirected: u64,
    /// Unconsumed level shares
    pub level_to_pool: u64,
    /// Marketing share including any redirected direct share
    pub marketing: u64,
    pub buyback: u64,
    pub lp_injection: u64,
    pub treasury: u64,
    /// Kept in the reward MC vault (credited referral value, level pool, unallocated)
    pub retained: u64,
}

impl TicketDistribution {
    pub fn credited(&self) -> u64 {
        self.credits.iter().map(|c| c.mc_amount).sum()
    }
}

/// Split a ticket purchase across the upline chain (parent first) and the wallets.
pub fn distribute_ticket(
    dist: &DistributionConfig,
    amount: u64,
    uplines: &mut [&mut UserAccount],
) -> Result<TicketDistribution> {
    let mut out = TicketDistribution::default();

    // direct
    let direct = percent_of(amount, dist.direct_percent)?;
    let mut direct_paid = 0u64;
    if let Some(parent) = uplines.first_mut() {
        if parent.is_active() && direct > 0 {
            direct_paid = parent.record_revenue(direct)?;
            if direct_paid > 0 {
                parent.credit_pending(direct_paid, 0)?;
                out.credits.push(ReferralCredit {
                    upline: parent.owner,
                    depth: 1,
                    kind: RewardKind::Direct,
                    mc_amount: direct_paid,
                    jbc_amount: 0,
                });
            }
        }
    }
    out.direct_redirected = direct - direct_paid;

    // level
    let level_total = percent_of(amount, dist.level_percent)?;
    let share = level_total / LEVEL_REWARD_DEPTH as u64;
    let mut level_paid = 0u64;
    if share > 0 {
        for (i, upline) in uplines.iter_mut().take(LEVEL_REWARD_DEPTH).enumerate() {
            if !upline.is_active() {
                continue;
            }
            let booked = upline.record_revenue(share)?;
            if booked == 0 {
                continue;
            }
            upline.credit_pending(booked, 0)?;
            level_paid += booked;
            out.credits.push(ReferralCredit {
                upline: upline.owner,
                depth: (i + 1) as u8,
                kind: RewardKind::Level,
                mc_amount: booked,
                jbc_amount: 0,
            });
        }
    }
    out.level_to_pool = level_total - level_paid;

    // wallets
    out.marketing = percent_of(amount, dist.marketing_percent)?
        .checked_add(out.direct_redirected)
        .ok_or(ProtocolError::MathOverflow)?;
    out.buyback = percent_of(amount, dist.buyback_percent)?;
    out.lp_injection = percent_of(amount, dist.lp_injection_percent)?;
    out.treasury = percent_of(amount, dist.treasury_percent)?;

    let sent = out
        .marketing
        .checked_add(out.buyback)
        .and_then(|v| v.checked_add(out.lp_injection))
        .and_then(|v| v.checked_add(out.treasury))
        .ok_or(ProtocolError::MathOverflow)?;
    out.retained = amount
        .checked_sub(sent)
        .ok_or(ProtocolError::InvalidDistribution)?;

    Ok(out)
}

// =============================================================================
// DIFFERENTIAL
// =============================================================================

/// One tier-gap payout along the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifferentialPayout {
    pub upline: Pubkey,
    pub depth: u8,
    /// Percent band paid (upline percent minus the previous paid percent)
    pub percent_gap: u8,
    /// min(trigger amount, upline ticket amount)
    pub base: u64,
    /// Full entitlement
    pub recorded: u64,
    /// Portion that fit under the upline's cap
    pub released: u64,
    pub mc_amount: u64,
    pub jbc_amount: u64,
}

/// Pay tier gaps up the chain for a realized static reward of `trigger_amount`.
///
/// Bands are disjoint: once an upline's percent is reached it is consumed,
/// even when the upline's cap absorbs part of the payout.
pub fn distribute_differential(
    trigger_team_count: u32,
    trigger_amount: u64,
    uplines: &mut [&mut UserAccount],
    rate: u128,
) -> Result<Vec<DifferentialPayout>> {
    let mut payouts = Vec::new();
    if trigger_amount == 0 {
        return Ok(payouts);
    }

    let mut previous = classify(trigger_team_count).percent;

    for (i, upline) in uplines.iter_mut().take(DIFFERENTIAL_DEPTH).enumerate() {
        if previous >= MAX_LEVEL_PERCENT {
            break;
        }
        if !upline.is_active() {
            continue;
        }

        let percent = classify(upline.team_count).percent;
        if percent <= previous {
            continue;
        }

        let gap = percent - previous;
        previous = percent;

        let base = trigger_amount.min(upline.ticket_amount);
        let recorded = percent_of(base, gap)?;
        if recorded == 0 {
            continue;
        }

        let released = upline.record_revenue(recorded)?;
        let (mc_amount, jbc_amount) = convert_payout(released, rate)?;
        upline.credit_pending(mc_amount, jbc_amount)?;

        payouts.push(DifferentialPayout {
            upline: upline.owner,
            depth: (i + 1) as u8,
            percent_gap: gap,
            base,
            recorded,
            released,
            mc_amount,
            jbc_amount,
        });
    }

    Ok(payouts)
}

// =============================================================================
// REALIZATION (static + differential)
// =============================================================================

/// Static yield realized on one stake plus the differential it triggered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Realization {
    pub static_reward: StaticRealization,
    pub differential: Vec<DifferentialPayout>,
}

/// Realize a stake's static yield and pay the tier gaps above its owner.
pub fn realize_stake(
    user: &mut UserAccount,
    stake: &mut StakePosition,
    uplines: &mut [&mut UserAccount],
    now: i64,
    rate: u128,
) -> Result<Option<Realization>> {
    let static_reward = match realize_static(user, stake, now, rate)? {
        Some(r) => r,
        None => return Ok(None),
    };
    let differential =
        distribute_differential(user.team_count, static_reward.payable, uplines, rate)?;

    Ok(Some(Realization {
        static_reward,
        differential,
    }))
}
