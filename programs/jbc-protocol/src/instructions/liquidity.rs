//! Admin pool seeding and withdrawal.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, SWAP_POOL_SEED};
use crate::errors::ProtocolError;
use crate::events::{LiquidityAdded, ReservesWithdrawn};
use crate::state::{ProtocolConfig, SwapPool};
use crate::token_transfer::transfer_tokens;

#[derive(Accounts)]
pub struct ManageLiquidity<'info> {
    #[account(
        constraint = admin.key() == config.admin @ ProtocolError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(
        mut,
        seeds = [SWAP_POOL_SEED],
        bump = swap_pool.bump,
    )]
    pub swap_pool: Box<Account<'info, SwapPool>>,

    #[account(address = config.mc_mint @ ProtocolError::InvalidMint)]
    pub mc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = config.jbc_mint @ ProtocolError::InvalidMint)]
    pub jbc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = admin_mc.mint == config.mc_mint @ ProtocolError::InvalidMint,
    )]
    pub admin_mc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = admin_jbc.mint == config.jbc_mint @ ProtocolError::InvalidMint,
    )]
    pub admin_jbc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.pool_mc_vault @ ProtocolError::InvalidVault)]
    pub pool_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.pool_jbc_vault @ ProtocolError::InvalidVault)]
    pub pool_jbc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn add_liquidity(ctx: Context<ManageLiquidity>, mc_amount: u64, jbc_amount: u64) -> Result<()> {
    let pool = &mut ctx.accounts.swap_pool;
    pool.add_liquidity(mc_amount, jbc_amount)?;
    let (reserve_mc, reserve_jbc) = (pool.reserve_mc, pool.reserve_jbc);

    let token_program = ctx.accounts.token_program.to_account_info();
    let admin = ctx.accounts.admin.to_account_info();
    transfer_tokens(
        &token_program,
        &ctx.accounts.admin_mc.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.pool_mc_vault.to_account_info(),
        &admin,
        mc_amount,
        ctx.accounts.mc_mint.decimals,
        &[],
    )?;
    transfer_tokens(
        &token_program,
        &ctx.accounts.admin_jbc.to_account_info(),
        &ctx.accounts.jbc_mint.to_account_info(),
        &ctx.accounts.pool_jbc_vault.to_account_info(),
        &admin,
        jbc_amount,
        ctx.accounts.jbc_mint.decimals,
        &[],
    )?;

    emit!(LiquidityAdded {
        admin: ctx.accounts.admin.key(),
        mc_amount,
        jbc_amount,
        reserve_mc,
        reserve_jbc,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Liquidity added: mc={}, jbc={}, reserves={}/{}", mc_amount, jbc_amount, reserve_mc, reserve_jbc);
    Ok(())
}

pub fn withdraw_reserves(ctx: Context<ManageLiquidity>, mc_amount: u64, jbc_amount: u64) -> Result<()> {
    let pool = &mut ctx.accounts.swap_pool;
    pool.withdraw_reserves(mc_amount, jbc_amount)?;
    let (reserve_mc, reserve_jbc) = (pool.reserve_mc, pool.reserve_jbc);

    let bump = [ctx.accounts.config.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let config_info = ctx.accounts.config.to_account_info();
    transfer_tokens(
        &token_program,
        &ctx.accounts.pool_mc_vault.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.admin_mc.to_account_info(),
        &config_info,
        mc_amount,
        ctx.accounts.mc_mint.decimals,
        signer_seeds,
    )?;
    transfer_tokens(
        &token_program,
        &ctx.accounts.pool_jbc_vault.to_account_info(),
        &ctx.accounts.jbc_mint.to_account_info(),
        &ctx.accounts.admin_jbc.to_account_info(),
        &config_info,
        jbc_amount,
        ctx.accounts.jbc_mint.decimals,
        signer_seeds,
    )?;

    emit!(ReservesWithdrawn {
        admin: ctx.accounts.admin.key(),
        mc_amount,
        jbc_amount,
        reserve_mc,
        reserve_jbc,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Reserves withdrawn: mc={}, jbc={}, reserves={}/{}", mc_amount, jbc_amount, reserve_mc, reserve_jbc);
    Ok(())
}
