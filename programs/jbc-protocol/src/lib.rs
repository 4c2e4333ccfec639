#![allow(ambiguous_glob_reexports)]
#![allow(clippy::too_many_arguments)]

//! # JBC Protocol
//!
//! Ticket-gated staking with static yield and three referral streams
//! (direct, level, tier differential), paid half in MC and half in JBC.
//! JBC is priced by an embedded constant-product MC/JBC pool, and every
//! account's lifetime rewards are bounded by an earnings cap.

use anchor_lang::prelude::*;

pub mod amm;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod levels;
pub mod rewards;
pub mod settlement;
pub mod state;
pub mod token_transfer;
pub mod upline;

pub use constants::*;
pub use errors::*;
pub use events::*;
pub use instructions::*;
pub use levels::LevelInfo;
pub use state::*;

declare_id!("96mpGu41b47XYipnURM1jSPtSBNnNYsMxsN1BYY4gkkw");

#[program]
pub mod jbc_protocol {
    use super::*;

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Create config, pool and vaults.
    pub fn initialize_protocol(ctx: Context<InitializeProtocol>, params: InitializeParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    // -------------------------------------------------------------------------
    // User Actions
    // -------------------------------------------------------------------------

    /// Create the caller's ledger record.
    pub fn register_user(ctx: Context<RegisterUser>) -> Result<()> {
        instructions::referral::register_user(ctx)
    }

    /// Bind the caller to a referrer. Remaining accounts: parent's ancestors.
    pub fn bind_referrer<'info>(ctx: Context<'_, '_, 'info, 'info, BindReferrer<'info>>) -> Result<()> {
        instructions::referral::bind_referrer(ctx)
    }

    /// Buy or top up a ticket. Remaining accounts: upline chain.
    pub fn buy_ticket<'info>(ctx: Context<'_, '_, 'info, 'info, BuyTicket<'info>>, amount: u64) -> Result<()> {
        instructions::ticket::handler(ctx, amount)
    }

    /// Open a 7/15/30-unit stake.
    pub fn stake_liquidity(ctx: Context<StakeLiquidity>, amount: u64, cycle_days: u16) -> Result<()> {
        instructions::stake::handler(ctx, amount, cycle_days)
    }

    /// Realize static yield on the supplied stakes and withdraw all claimable balances.
    pub fn claim_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimRewards<'info>>,
        stake_count: u8,
    ) -> Result<()> {
        instructions::claim::handler(ctx, stake_count)
    }

    /// Redeem one matured stake.
    pub fn redeem_stake<'info>(
        ctx: Context<'_, '_, 'info, 'info, RedeemStake<'info>>,
        stake_index: u64,
    ) -> Result<()> {
        instructions::redeem::redeem_stake(ctx, stake_index)
    }

    /// Redeem every matured stake among those supplied.
    pub fn redeem<'info>(ctx: Context<'_, '_, 'info, 'info, Redeem<'info>>, stake_count: u8) -> Result<()> {
        instructions::redeem::redeem(ctx, stake_count)
    }

    // -------------------------------------------------------------------------
    // Pool
    // -------------------------------------------------------------------------

    /// min_out: slippage protection on JBC received
    pub fn swap_mc_to_jbc(ctx: Context<Swap>, amount_in: u64, min_out: u64) -> Result<()> {
        instructions::swap::swap_mc_to_jbc(ctx, amount_in, min_out)
    }

    /// min_out: slippage protection on MC received
    pub fn swap_jbc_to_mc(ctx: Context<Swap>, amount_in: u64, min_out: u64) -> Result<()> {
        instructions::swap::swap_jbc_to_mc(ctx, amount_in, min_out)
    }

    /// Scheduled burn: spend buyback-wallet MC on JBC and burn it.
    pub fn buyback_and_burn(ctx: Context<BuybackAndBurn>, amount_mc: u64, min_burned: u64) -> Result<()> {
        instructions::swap::buyback_and_burn(ctx, amount_mc, min_burned)
    }

    pub fn add_liquidity(ctx: Context<ManageLiquidity>, mc_amount: u64, jbc_amount: u64) -> Result<()> {
        instructions::liquidity::add_liquidity(ctx, mc_amount, jbc_amount)
    }

    pub fn withdraw_reserves(ctx: Context<ManageLiquidity>, mc_amount: u64, jbc_amount: u64) -> Result<()> {
        instructions::liquidity::withdraw_reserves(ctx, mc_amount, jbc_amount)
    }

    // -------------------------------------------------------------------------
    // Admin
    // -------------------------------------------------------------------------

    pub fn set_distribution_config(ctx: Context<AdminAction>, distribution: DistributionConfig) -> Result<()> {
        instructions::admin::set_distribution_config(ctx, distribution)
    }

    pub fn set_wallets(ctx: Context<SetWallets>) -> Result<()> {
        instructions::admin::set_wallets(ctx)
    }

    pub fn set_swap_taxes(ctx: Context<AdminAction>, swap: SwapTaxes) -> Result<()> {
        instructions::admin::set_swap_taxes(ctx, swap)
    }

    pub fn set_redemption_fee_percent(ctx: Context<AdminAction>, percent: u8) -> Result<()> {
        instructions::admin::set_redemption_fee_percent(ctx, percent)
    }

    pub fn set_operational_status(ctx: Context<AdminAction>, status: OperationalStatus) -> Result<()> {
        instructions::admin::set_operational_status(ctx, status)
    }

    pub fn set_ticket_flexibility_duration(ctx: Context<AdminAction>, seconds: i64) -> Result<()> {
        instructions::admin::set_ticket_flexibility_duration(ctx, seconds)
    }

    pub fn set_time_unit(ctx: Context<AdminAction>, seconds_in_unit: i64) -> Result<()> {
        instructions::admin::set_time_unit(ctx, seconds_in_unit)
    }

    pub fn set_cap_multiplier(ctx: Context<AdminAction>, multiplier: u8) -> Result<()> {
        instructions::admin::set_cap_multiplier(ctx, multiplier)
    }

    pub fn emergency_pause(ctx: Context<AdminAction>) -> Result<()> {
        instructions::admin::emergency_pause(ctx)
    }

    pub fn unpause(ctx: Context<AdminAction>) -> Result<()> {
        instructions::admin::unpause(ctx)
    }

    pub fn update_admin(ctx: Context<AdminAction>, new_admin: Pubkey) -> Result<()> {
        instructions::admin::update_admin(ctx, new_admin)
    }

    pub fn migrate_config(ctx: Context<AdminAction>) -> Result<()> {
        instructions::admin::migrate_config(ctx)
    }

    pub fn withdraw_level_reward_pool(ctx: Context<WithdrawLevelRewardPool>, amount: u64) -> Result<()> {
        instructions::admin::withdraw_level_reward_pool(ctx, amount)
    }

    // -------------------------------------------------------------------------
    // Corrections
    // -------------------------------------------------------------------------

    /// Remaining accounts: the new parent's ancestors.
    pub fn admin_set_referrer<'info>(ctx: Context<'_, '_, 'info, 'info, AdminSetReferrer<'info>>) -> Result<()> {
        instructions::corrections::admin_set_referrer(ctx)
    }

    /// Remaining accounts: one UserAccount per value.
    pub fn admin_set_team_count<'info>(
        ctx: Context<'_, '_, 'info, 'info, AdminCorrectionBatch<'info>>,
        team_counts: Vec<u32>,
    ) -> Result<()> {
        instructions::corrections::admin_set_team_count(ctx, team_counts)
    }

    /// Remaining accounts: one UserAccount per value.
    pub fn admin_set_active_directs<'info>(
        ctx: Context<'_, '_, 'info, 'info, AdminCorrectionBatch<'info>>,
        active_directs: Vec<u32>,
    ) -> Result<()> {
        instructions::corrections::admin_set_active_directs(ctx, active_directs)
    }

    /// Remaining accounts: one UserAccount per update.
    pub fn batch_update_user_stats<'info>(
        ctx: Context<'_, '_, 'info, 'info, AdminCorrectionBatch<'info>>,
        updates: Vec<UserStatsUpdate>,
    ) -> Result<()> {
        instructions::corrections::batch_update_user_stats(ctx, updates)
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    pub fn user_info(ctx: Context<UserView>) -> Result<UserInfo> {
        instructions::views::user_info(ctx)
    }

    pub fn user_ticket(ctx: Context<UserView>) -> Result<TicketInfo> {
        instructions::views::user_ticket(ctx)
    }

    pub fn user_stake(ctx: Context<StakeView>, index: u64) -> Result<StakeInfo> {
        instructions::views::user_stake(ctx, index)
    }

    pub fn get_direct_referrals<'info>(
        ctx: Context<'_, '_, 'info, 'info, UserView<'info>>,
        offset: u32,
        limit: u8,
    ) -> Result<DirectReferralPage> {
        instructions::views::get_direct_referrals(ctx, offset, limit)
    }

    pub fn get_user_level(ctx: Context<UserView>) -> Result<LevelInfo> {
        instructions::views::get_user_level(ctx)
    }

    pub fn calculate_level(ctx: Context<Stateless>, team_count: u32) -> Result<LevelInfo> {
        instructions::views::calculate_level(ctx, team_count)
    }

    pub fn swap_reserves(ctx: Context<PoolView>) -> Result<PoolReserves> {
        instructions::views::swap_reserves(ctx)
    }

    pub fn get_amount_out(
        ctx: Context<Stateless>,
        amount_in: u64,
        reserve_in: u64,
        reserve_out: u64,
        fee_bps: u16,
    ) -> Result<u64> {
        instructions::views::get_amount_out(ctx, amount_in, reserve_in, reserve_out, fee_bps)
    }
}
