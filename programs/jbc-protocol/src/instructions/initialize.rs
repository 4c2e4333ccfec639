//! One-time protocol setup: config, pool and the four program vaults.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{
    CONFIG_SEED, CONFIG_VERSION, POOL_JBC_VAULT_SEED, POOL_MC_VAULT_SEED, REWARD_JBC_VAULT_SEED,
    REWARD_MC_VAULT_SEED, SWAP_POOL_SEED,
};
use crate::errors::ProtocolError;
use crate::events::ProtocolInitialized;
use crate::state::{InitializeParams, OperationalStatus, ProtocolConfig, SwapPool};

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = ProtocolConfig::LEN,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(
        init,
        payer = admin,
        space = SwapPool::LEN,
        seeds = [SWAP_POOL_SEED],
        bump
    )]
    pub swap_pool: Box<Account<'info, SwapPool>>,

    /// Settlement token
    #[account(mint::token_program = token_program)]
    pub mc_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Reward token (config PDA must be able to burn pool-held JBC)
    #[account(
        mint::token_program = token_program,
        constraint = jbc_mint.key() != mc_mint.key() @ ProtocolError::InvalidMint,
    )]
    pub jbc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        seeds = [POOL_MC_VAULT_SEED],
        bump,
        token::mint = mc_mint,
        token::authority = config,
        token::token_program = token_program,
    )]
    pub pool_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [POOL_JBC_VAULT_SEED],
        bump,
        token::mint = jbc_mint,
        token::authority = config,
        token::token_program = token_program,
    )]
    pub pool_jbc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [REWARD_MC_VAULT_SEED],
        bump,
        token::mint = mc_mint,
        token::authority = config,
        token::token_program = token_program,
    )]
    pub reward_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = admin,
        seeds = [REWARD_JBC_VAULT_SEED],
        bump,
        token::mint = jbc_mint,
        token::authority = config,
        token::token_program = token_program,
    )]
    pub reward_jbc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// MC account receiving the marketing share
    #[account(token::mint = mc_mint)]
    pub marketing_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    /// MC account receiving the treasury share
    #[account(token::mint = mc_mint)]
    pub treasury_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    /// MC account receiving the LP-injection share
    #[account(token::mint = mc_mint)]
    pub lp_injection_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    /// MC account receiving the buyback share, spent by `buyback_and_burn`
    #[account(token::mint = mc_mint)]
    pub buyback_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeProtocol>, params: InitializeParams) -> Result<()> {
    params.validate()?;
    let clock = Clock::get()?;

    let config = &mut ctx.accounts.config;
    config.version = CONFIG_VERSION;
    config.bump = ctx.bumps.config;
    config.admin = ctx.accounts.admin.key();
    config.mc_mint = ctx.accounts.mc_mint.key();
    config.jbc_mint = ctx.accounts.jbc_mint.key();
    config.pool_mc_vault = ctx.accounts.pool_mc_vault.key();
    config.pool_jbc_vault = ctx.accounts.pool_jbc_vault.key();
    config.reward_mc_vault = ctx.accounts.reward_mc_vault.key();
    config.reward_jbc_vault = ctx.accounts.reward_jbc_vault.key();
    config.marketing_wallet = ctx.accounts.marketing_wallet.key();
    config.treasury_wallet = ctx.accounts.treasury_wallet.key();
    config.lp_injection_wallet = ctx.accounts.lp_injection_wallet.key();
    config.buyback_wallet = ctx.accounts.buyback_wallet.key();
    config.distribution = params.distribution;
    config.swap = params.swap;
    config.redemption_fee_percent = params.redemption_fee_percent;
    config.cap_multiplier = params.cap_multiplier;
    config.seconds_in_unit = params.seconds_in_unit;
    config.ticket_flexibility_duration = params.ticket_flexibility_duration;
    config.paused = false;
    config.status = OperationalStatus::all_enabled();
    config.level_reward_pool = 0;
    config.total_ticket_volume = 0;
    config.total_staked = 0;
    config.total_users = 0;
    config._reserved = [0u8; 64];

    let pool = &mut ctx.accounts.swap_pool;
    pool.bump = ctx.bumps.swap_pool;
    pool.reserve_mc = 0;
    pool.reserve_jbc = 0;
    pool.total_jbc_burned = 0;
    pool.total_mc_volume = 0;
    pool._reserved = [0u8; 32];

    emit!(ProtocolInitialized {
        admin: config.admin,
        mc_mint: config.mc_mint,
        jbc_mint: config.jbc_mint,
        version: config.version,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Protocol initialized: admin={}, mc={}, jbc={}",
        config.admin,
        config.mc_mint,
        config.jbc_mint
    );
    Ok(())
}
