//! Open a time-boxed stake against the live ticket.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, STAKE_SEED, USER_SEED};
use crate::errors::ProtocolError;
use crate::events::LiquidityStaked;
use crate::state::{Operation, ProtocolConfig, StakePosition, UserAccount};
use crate::token_transfer::transfer_tokens;

#[derive(Accounts)]
pub struct StakeLiquidity<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(
        mut,
        seeds = [USER_SEED, user.key().as_ref()],
        bump = user_account.bump,
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    #[account(
        init,
        payer = user,
        space = StakePosition::LEN,
        seeds = [STAKE_SEED, user.key().as_ref(), user_account.stake_count.to_le_bytes().as_ref()],
        bump
    )]
    pub stake_position: Box<Account<'info, StakePosition>>,

    #[account(address = config.mc_mint @ ProtocolError::InvalidMint)]
    pub mc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = user_mc.owner == user.key() @ ProtocolError::Unauthorized,
        constraint = user_mc.mint == config.mc_mint @ ProtocolError::InvalidMint,
    )]
    pub user_mc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.reward_mc_vault @ ProtocolError::InvalidVault)]
    pub reward_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<StakeLiquidity>, amount: u64, cycle_days: u16) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();

    let config = &mut ctx.accounts.config;
    config.require_enabled(Operation::Stake)?;

    let opening = ctx.accounts.user_account.open_stake(amount, cycle_days)?;

    let stake = &mut ctx.accounts.stake_position;
    stake.set_inner(StakePosition::new(
        user_key,
        ctx.bumps.stake_position,
        &opening,
        amount,
        cycle_days,
        now,
        config.seconds_in_unit,
    ));
    let maturity = stake.maturity_time()?;

    config.total_staked = config
        .total_staked
        .checked_add(amount)
        .ok_or(ProtocolError::MathOverflow)?;

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.user_mc.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.reward_mc_vault.to_account_info(),
        &ctx.accounts.user.to_account_info(),
        opening.amount_due,
        ctx.accounts.mc_mint.decimals,
        &[],
    )?;

    emit!(LiquidityStaked {
        user: user_key,
        stake_id: opening.index,
        ticket_id: opening.ticket_id,
        amount,
        cycle_days,
        credit_used: opening.credit_used,
        timestamp: now,
    });

    msg!(
        "Stake #{} opened: user={}, amount={}, cycle={}, credit used={}, matures at {}",
        opening.index,
        user_key,
        amount,
        cycle_days,
        opening.credit_used,
        maturity
    );
    Ok(())
}
