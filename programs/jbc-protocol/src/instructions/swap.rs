//! MC/JBC swaps through the embedded pool, plus the scheduled buyback burn.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, SWAP_POOL_SEED};
use crate::errors::ProtocolError;
use crate::events::{BuybackBurned, SwapExecuted};
use crate::state::{Operation, ProtocolConfig, SwapDirection, SwapPool};
use crate::token_transfer::{burn_tokens, transfer_tokens};

#[derive(Accounts)]
pub struct Swap<'info> {
    pub user: Signer<'info>,

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

    /// Mutable for tax burns
    #[account(mut, address = config.jbc_mint @ ProtocolError::InvalidMint)]
    pub jbc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = user_mc.owner == user.key() @ ProtocolError::Unauthorized,
        constraint = user_mc.mint == config.mc_mint @ ProtocolError::InvalidMint,
    )]
    pub user_mc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_jbc.owner == user.key() @ ProtocolError::Unauthorized,
        constraint = user_jbc.mint == config.jbc_mint @ ProtocolError::InvalidMint,
    )]
    pub user_jbc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.pool_mc_vault @ ProtocolError::InvalidVault)]
    pub pool_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.pool_jbc_vault @ ProtocolError::InvalidVault)]
    pub pool_jbc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Buy JBC with MC. The buy tax is burned out of the JBC leaving the pool.
pub fn swap_mc_to_jbc(ctx: Context<Swap>, amount_in: u64, min_out: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &ctx.accounts.config;
    config.require_enabled(Operation::Swap)?;

    let pool = &mut ctx.accounts.swap_pool;
    let quote = pool.quote_buy(amount_in, config.swap.swap_fee_bps, config.swap.buy_tax_bps)?;
    require!(quote.net_out >= min_out, ProtocolError::SlippageExceeded);
    pool.apply_swap(SwapDirection::McToJbc, &quote)?;
    let (reserve_mc, reserve_jbc) = (pool.reserve_mc, pool.reserve_jbc);

    let bump = [config.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let config_info = config.to_account_info();

    transfer_tokens(
        &token_program,
        &ctx.accounts.user_mc.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.pool_mc_vault.to_account_info(),
        &ctx.accounts.user.to_account_info(),
        quote.net_in,
        ctx.accounts.mc_mint.decimals,
        &[],
    )?;
    transfer_tokens(
        &token_program,
        &ctx.accounts.pool_jbc_vault.to_account_info(),
        &ctx.accounts.jbc_mint.to_account_info(),
        &ctx.accounts.user_jbc.to_account_info(),
        &config_info,
        quote.net_out,
        ctx.accounts.jbc_mint.decimals,
        signer_seeds,
    )?;
    burn_tokens(
        &token_program,
        &ctx.accounts.jbc_mint.to_account_info(),
        &ctx.accounts.pool_jbc_vault.to_account_info(),
        &config_info,
        quote.tax,
        signer_seeds,
    )?;

    emit!(SwapExecuted {
        user: ctx.accounts.user.key(),
        direction: SwapDirection::McToJbc,
        amount_in,
        amount_out: quote.net_out,
        tax_burned: quote.tax,
        reserve_mc,
        reserve_jbc,
        timestamp: now,
    });

    msg!(
        "Swap MC->JBC: in={}, out={}, burned={}, reserves={}/{}",
        amount_in,
        quote.net_out,
        quote.tax,
        reserve_mc,
        reserve_jbc
    );
    Ok(())
}

/// Sell JBC for MC. The sell tax is burned from the seller before pricing.
pub fn swap_jbc_to_mc(ctx: Context<Swap>, amount_in: u64, min_out: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &ctx.accounts.config;
    config.require_enabled(Operation::Swap)?;

    let pool = &mut ctx.accounts.swap_pool;
    let quote = pool.quote_sell(amount_in, config.swap.swap_fee_bps, config.swap.sell_tax_bps)?;
    require!(quote.net_out >= min_out, ProtocolError::SlippageExceeded);
    pool.apply_swap(SwapDirection::JbcToMc, &quote)?;
    let (reserve_mc, reserve_jbc) = (pool.reserve_mc, pool.reserve_jbc);

    let bump = [config.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let user = ctx.accounts.user.to_account_info();
    let user_jbc = ctx.accounts.user_jbc.to_account_info();
    let jbc_mint = ctx.accounts.jbc_mint.to_account_info();

    burn_tokens(&token_program, &jbc_mint, &user_jbc, &user, quote.tax, &[])?;
    transfer_tokens(
        &token_program,
        &user_jbc,
        &jbc_mint,
        &ctx.accounts.pool_jbc_vault.to_account_info(),
        &user,
        quote.net_in,
        ctx.accounts.jbc_mint.decimals,
        &[],
    )?;
    transfer_tokens(
        &token_program,
        &ctx.accounts.pool_mc_vault.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.user_mc.to_account_info(),
        &config.to_account_info(),
        quote.net_out,
        ctx.accounts.mc_mint.decimals,
        signer_seeds,
    )?;

    emit!(SwapExecuted {
        user: ctx.accounts.user.key(),
        direction: SwapDirection::JbcToMc,
        amount_in,
        amount_out: quote.net_out,
        tax_burned: quote.tax,
        reserve_mc,
        reserve_jbc,
        timestamp: now,
    });

    msg!(
        "Swap JBC->MC: in={}, out={}, burned={}, reserves={}/{}",
        amount_in,
        quote.net_out,
        quote.tax,
        reserve_mc,
        reserve_jbc
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Buyback
// ---------------------------------------------------------------------------

#[derive(Accounts)]
pub struct BuybackAndBurn<'info> {
    /// Authority of the buyback wallet (the off-chain scheduler's key)
    pub authority: Signer<'info>,

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

    #[account(mut, address = config.jbc_mint @ ProtocolError::InvalidMint)]
    pub jbc_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        address = config.buyback_wallet @ ProtocolError::InvalidAddress,
        constraint = buyback_wallet.owner == authority.key() @ ProtocolError::Unauthorized,
    )]
    pub buyback_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.pool_mc_vault @ ProtocolError::InvalidVault)]
    pub pool_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.pool_jbc_vault @ ProtocolError::InvalidVault)]
    pub pool_jbc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Spend buyback MC on pool JBC and burn all of it. Untaxed.
pub fn buyback_and_burn(ctx: Context<BuybackAndBurn>, amount_mc: u64, min_burned: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let config = &ctx.accounts.config;
    config.require_enabled(Operation::Swap)?;

    let pool = &mut ctx.accounts.swap_pool;
    let quote = pool.quote_buy(amount_mc, config.swap.swap_fee_bps, 0)?;
    require!(quote.gross_out >= min_burned, ProtocolError::SlippageExceeded);
    pool.apply_swap(SwapDirection::McToJbc, &quote)?;
    pool.total_jbc_burned = pool.total_jbc_burned.saturating_add(quote.gross_out);
    let total_jbc_burned = pool.total_jbc_burned;

    let bump = [config.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    let token_program = ctx.accounts.token_program.to_account_info();

    transfer_tokens(
        &token_program,
        &ctx.accounts.buyback_wallet.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.pool_mc_vault.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        quote.net_in,
        ctx.accounts.mc_mint.decimals,
        &[],
    )?;
    burn_tokens(
        &token_program,
        &ctx.accounts.jbc_mint.to_account_info(),
        &ctx.accounts.pool_jbc_vault.to_account_info(),
        &config.to_account_info(),
        quote.gross_out,
        signer_seeds,
    )?;

    emit!(BuybackBurned {
        caller: ctx.accounts.authority.key(),
        mc_spent: amount_mc,
        jbc_burned: quote.gross_out,
        total_jbc_burned,
        timestamp: now,
    });

    msg!("Buyback: spent {} MC, burned {} JBC", amount_mc, quote.gross_out);
    Ok(())
}
