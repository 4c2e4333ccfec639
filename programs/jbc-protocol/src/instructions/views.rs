//! Read-only instructions. Values come back as return data; simulate to read.

use anchor_lang::prelude::*;

use crate::amm::get_amount_out as quote_amount_out;
use crate::constants::{REFERRAL_SEED, STAKE_SEED, SWAP_POOL_SEED, USER_SEED};
use crate::errors::ProtocolError;
use crate::levels::{classify, LevelInfo};
use crate::state::{ReferralEdge, StakePosition, SwapPool, UserAccount};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub owner: Pubkey,
    pub referrer: Pubkey,
    pub active_directs: u32,
    pub team_count: u32,
    pub total_revenue: u64,
    pub current_cap: u64,
    pub refund_fee_credit: u64,
    pub pending_mc: u64,
    pub pending_jbc: u64,
    pub stake_count: u64,
    pub active_stake_count: u32,
    pub total_staked: u64,
    pub is_active: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct TicketInfo {
    pub ticket_id: u64,
    pub amount: u64,
    pub max_amount: u64,
    pub purchase_time: i64,
    pub exited: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakeInfo {
    pub index: u64,
    pub ticket_id: u64,
    pub amount: u64,
    pub start_time: i64,
    pub cycle_days: u16,
    pub maturity_time: i64,
    pub active: bool,
    pub paid: u64,
    /// Earned but not yet realized, before the cap
    pub pending: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DirectReferralPage {
    /// Edges ever written under the account
    pub total: u32,
    /// Active referrals among the requested edges, in edge order
    pub referrals: Vec<Pubkey>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolReserves {
    pub reserve_mc: u64,
    pub reserve_jbc: u64,
    /// MC per JBC scaled by 1e18
    pub price_rate: u128,
    pub total_jbc_burned: u64,
}

#[derive(Accounts)]
pub struct UserView<'info> {
    #[account(
        seeds = [USER_SEED, user_account.owner.as_ref()],
        bump = user_account.bump,
    )]
    pub user_account: Account<'info, UserAccount>,
}

#[derive(Accounts)]
#[instruction(index: u64)]
pub struct StakeView<'info> {
    #[account(
        seeds = [STAKE_SEED, stake_position.owner.as_ref(), index.to_le_bytes().as_ref()],
        bump = stake_position.bump,
    )]
    pub stake_position: Account<'info, StakePosition>,
}

#[derive(Accounts)]
pub struct PoolView<'info> {
    #[account(
        seeds = [SWAP_POOL_SEED],
        bump = swap_pool.bump,
    )]
    pub swap_pool: Account<'info, SwapPool>,
}

#[derive(Accounts)]
pub struct Stateless {}

pub fn user_info(ctx: Context<UserView>) -> Result<UserInfo> {
    let u = &ctx.accounts.user_account;
    Ok(UserInfo {
        owner: u.owner,
        referrer: u.referrer,
        active_directs: u.active_directs,
        team_count: u.team_count,
        total_revenue: u.total_revenue,
        current_cap: u.current_cap,
        refund_fee_credit: u.refund_fee_credit,
        pending_mc: u.pending_mc,
        pending_jbc: u.pending_jbc,
        stake_count: u.stake_count,
        active_stake_count: u.active_stake_count,
        total_staked: u.total_staked,
        is_active: u.is_active(),
    })
}

pub fn user_ticket(ctx: Context<UserView>) -> Result<TicketInfo> {
    let u = &ctx.accounts.user_account;
    Ok(TicketInfo {
        ticket_id: u.ticket_id,
        amount: u.ticket_amount,
        max_amount: u.max_ticket_amount,
        purchase_time: u.ticket_purchase_time,
        exited: u.ticket_exited,
    })
}

pub fn user_stake(ctx: Context<StakeView>, _index: u64) -> Result<StakeInfo> {
    let now = Clock::get()?.unix_timestamp;
    let s = &ctx.accounts.stake_position;
    Ok(StakeInfo {
        index: s.index,
        ticket_id: s.ticket_id,
        amount: s.amount,
        start_time: s.start_time,
        cycle_days: s.cycle_days,
        maturity_time: s.maturity_time()?,
        active: s.active,
        paid: s.paid,
        pending: s.pending(now)?,
    })
}

/// One page of referral edges. `remaining_accounts`: the edge PDAs for
/// indices `offset..offset + limit` that exist, in order.
pub fn get_direct_referrals<'info>(
    ctx: Context<'_, '_, 'info, 'info, UserView<'info>>,
    offset: u32,
    limit: u8,
) -> Result<DirectReferralPage> {
    let owner = ctx.accounts.user_account.owner;
    let total = ctx.accounts.user_account.direct_count;
    let range = ReferralEdge::page(total, offset, limit)?;
    require!(
        ctx.remaining_accounts.len() == range.len(),
        ProtocolError::InvalidInputLength
    );

    let mut referrals = Vec::with_capacity(range.len());
    for (index, info) in range.zip(ctx.remaining_accounts.iter()) {
        let edge: Account<'info, ReferralEdge> = Account::try_from(info)?;
        let pda = Pubkey::create_program_address(
            &[REFERRAL_SEED, owner.as_ref(), &index.to_le_bytes(), &[edge.bump]],
            &crate::ID,
        )
        .map_err(|_| error!(ProtocolError::InvalidReferralEdge))?;
        require_keys_eq!(*info.key, pda, ProtocolError::InvalidReferralEdge);

        if edge.active {
            referrals.push(edge.referral);
        }
    }

    Ok(DirectReferralPage { total, referrals })
}

pub fn get_user_level(ctx: Context<UserView>) -> Result<LevelInfo> {
    Ok(classify(ctx.accounts.user_account.team_count))
}

pub fn calculate_level(_ctx: Context<Stateless>, team_count: u32) -> Result<LevelInfo> {
    Ok(classify(team_count))
}

pub fn swap_reserves(ctx: Context<PoolView>) -> Result<PoolReserves> {
    let pool = &ctx.accounts.swap_pool;
    Ok(PoolReserves {
        reserve_mc: pool.reserve_mc,
        reserve_jbc: pool.reserve_jbc,
        price_rate: pool.price_rate(),
        total_jbc_burned: pool.total_jbc_burned,
    })
}

/// Pool-fee quote for arbitrary reserves; taxes are not applied.
pub fn get_amount_out(
    _ctx: Context<Stateless>,
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u16,
) -> Result<u64> {
    quote_amount_out(amount_in, reserve_in, reserve_out, fee_bps)
}
