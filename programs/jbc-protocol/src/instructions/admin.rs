//! Admin instructions: config setters, pause, migration, level-pool payout.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, CONFIG_VERSION};
use crate::errors::ProtocolError;
use crate::events::{
    AdminUpdated, ConfigMigrated, ConfigUpdated, LevelPoolWithdrawn, ProtocolPaused,
    ProtocolUnpaused,
};
use crate::state::{
    validate_cap_multiplier, validate_fee_percent, validate_time_unit, DistributionConfig,
    OperationalStatus, ProtocolConfig, SwapTaxes,
};
use crate::token_transfer::transfer_tokens;

#[derive(Accounts)]
pub struct AdminAction<'info> {
    #[account(
        constraint = admin.key() == config.admin @ ProtocolError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, ProtocolConfig>,
}

fn config_updated(admin: Pubkey, field: &str) -> Result<()> {
    emit!(ConfigUpdated {
        admin,
        field: field.to_string(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// Setters
// ---------------------------------------------------------------------------

pub fn set_distribution_config(ctx: Context<AdminAction>, distribution: DistributionConfig) -> Result<()> {
    distribution.validate()?;
    ctx.accounts.config.distribution = distribution;

    config_updated(ctx.accounts.admin.key(), "distribution")?;
    msg!(
        "Distribution set: direct={}% level={}% marketing={}% buyback={}% lp={}% treasury={}%",
        distribution.direct_percent,
        distribution.level_percent,
        distribution.marketing_percent,
        distribution.buyback_percent,
        distribution.lp_injection_percent,
        distribution.treasury_percent
    );
    Ok(())
}

pub fn set_swap_taxes(ctx: Context<AdminAction>, swap: SwapTaxes) -> Result<()> {
    swap.validate()?;
    ctx.accounts.config.swap = swap;

    config_updated(ctx.accounts.admin.key(), "swap_taxes")?;
    msg!(
        "Swap taxes set: buy={}bps sell={}bps fee={}bps",
        swap.buy_tax_bps,
        swap.sell_tax_bps,
        swap.swap_fee_bps
    );
    Ok(())
}

pub fn set_redemption_fee_percent(ctx: Context<AdminAction>, percent: u8) -> Result<()> {
    validate_fee_percent(percent)?;
    ctx.accounts.config.redemption_fee_percent = percent;

    config_updated(ctx.accounts.admin.key(), "redemption_fee_percent")?;
    msg!("Redemption fee set: {}%", percent);
    Ok(())
}

pub fn set_operational_status(ctx: Context<AdminAction>, status: OperationalStatus) -> Result<()> {
    ctx.accounts.config.status = status;

    config_updated(ctx.accounts.admin.key(), "operational_status")?;
    msg!("Operational status set: {:?}", status);
    Ok(())
}

pub fn set_ticket_flexibility_duration(ctx: Context<AdminAction>, seconds: i64) -> Result<()> {
    require!(seconds >= 0, ProtocolError::InvalidTimeUnit);
    ctx.accounts.config.ticket_flexibility_duration = seconds;

    config_updated(ctx.accounts.admin.key(), "ticket_flexibility_duration")?;
    msg!("Ticket flexibility duration set: {}s", seconds);
    Ok(())
}

/// Only affects stakes opened afterwards; open stakes keep their snapshot.
pub fn set_time_unit(ctx: Context<AdminAction>, seconds_in_unit: i64) -> Result<()> {
    validate_time_unit(seconds_in_unit)?;
    ctx.accounts.config.seconds_in_unit = seconds_in_unit;

    config_updated(ctx.accounts.admin.key(), "seconds_in_unit")?;
    msg!("Time unit set: {}s", seconds_in_unit);
    Ok(())
}

pub fn set_cap_multiplier(ctx: Context<AdminAction>, multiplier: u8) -> Result<()> {
    validate_cap_multiplier(multiplier)?;
    ctx.accounts.config.cap_multiplier = multiplier;

    config_updated(ctx.accounts.admin.key(), "cap_multiplier")?;
    msg!("Cap multiplier set: {}x", multiplier);
    Ok(())
}

// ---------------------------------------------------------------------------
// Wallet registry
// ---------------------------------------------------------------------------

#[derive(Accounts)]
pub struct SetWallets<'info> {
    #[account(
        constraint = admin.key() == config.admin @ ProtocolError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(constraint = marketing_wallet.mint == config.mc_mint @ ProtocolError::InvalidMint)]
    pub marketing_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(constraint = treasury_wallet.mint == config.mc_mint @ ProtocolError::InvalidMint)]
    pub treasury_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(constraint = lp_injection_wallet.mint == config.mc_mint @ ProtocolError::InvalidMint)]
    pub lp_injection_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(constraint = buyback_wallet.mint == config.mc_mint @ ProtocolError::InvalidMint)]
    pub buyback_wallet: Box<InterfaceAccount<'info, TokenAccount>>,
}

pub fn set_wallets(ctx: Context<SetWallets>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.marketing_wallet = ctx.accounts.marketing_wallet.key();
    config.treasury_wallet = ctx.accounts.treasury_wallet.key();
    config.lp_injection_wallet = ctx.accounts.lp_injection_wallet.key();
    config.buyback_wallet = ctx.accounts.buyback_wallet.key();

    config_updated(ctx.accounts.admin.key(), "wallets")?;
    msg!(
        "Wallets set: marketing={} treasury={} lp={} buyback={}",
        config.marketing_wallet,
        config.treasury_wallet,
        config.lp_injection_wallet,
        config.buyback_wallet
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Pause / authority
// ---------------------------------------------------------------------------

/// Block every value-moving entry point. Views stay open.
pub fn emergency_pause(ctx: Context<AdminAction>) -> Result<()> {
    ctx.accounts.config.paused = true;

    emit!(ProtocolPaused {
        admin: ctx.accounts.admin.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Protocol paused");
    Ok(())
}

pub fn unpause(ctx: Context<AdminAction>) -> Result<()> {
    ctx.accounts.config.paused = false;

    emit!(ProtocolUnpaused {
        admin: ctx.accounts.admin.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Protocol unpaused");
    Ok(())
}

pub fn update_admin(ctx: Context<AdminAction>, new_admin: Pubkey) -> Result<()> {
    require!(new_admin != Pubkey::default(), ProtocolError::InvalidAddress);

    let config = &mut ctx.accounts.config;
    let old_admin = config.admin;
    config.admin = new_admin;

    emit!(AdminUpdated {
        old_admin,
        new_admin,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Admin updated: {} -> {}", old_admin, new_admin);
    Ok(())
}

/// Bring the config layout up to the current schema version. Idempotent.
pub fn migrate_config(ctx: Context<AdminAction>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let from_version = config.version;

    if !config.migrate()? {
        msg!("Config already at version {}", CONFIG_VERSION);
        return Ok(());
    }

    emit!(ConfigMigrated {
        from_version,
        to_version: config.version,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Config migrated: v{} -> v{}", from_version, config.version);
    Ok(())
}

// ---------------------------------------------------------------------------
// Level reward pool
// ---------------------------------------------------------------------------

#[derive(Accounts)]
pub struct WithdrawLevelRewardPool<'info> {
    #[account(
        constraint = admin.key() == config.admin @ ProtocolError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(address = config.mc_mint @ ProtocolError::InvalidMint)]
    pub mc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        address = config.reward_mc_vault @ ProtocolError::InvalidVault,
    )]
    pub reward_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = destination.mint == config.mc_mint @ ProtocolError::InvalidMint,
    )]
    pub destination: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Pay out residue accumulated from unconsumed level shares.
pub fn withdraw_level_reward_pool(ctx: Context<WithdrawLevelRewardPool>, amount: u64) -> Result<()> {
    require!(amount > 0, ProtocolError::InvalidAmount);

    let config = &mut ctx.accounts.config;
    config.level_reward_pool = config
        .level_reward_pool
        .checked_sub(amount)
        .ok_or(ProtocolError::InsufficientLevelPool)?;
    let remaining = config.level_reward_pool;
    let bump = [config.bump];
    config.exit(&crate::ID)?;

    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.reward_mc_vault.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.destination.to_account_info(),
        &ctx.accounts.config.to_account_info(),
        amount,
        ctx.accounts.mc_mint.decimals,
        signer_seeds,
    )?;

    emit!(LevelPoolWithdrawn {
        admin: ctx.accounts.admin.key(),
        destination: ctx.accounts.destination.key(),
        amount,
        remaining,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Level pool withdrawn: {} (remaining {})", amount, remaining);
    Ok(())
}
