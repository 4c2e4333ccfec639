//! Redeem matured stakes: principal back, fee pulled by delegation and banked
//! as refund credit for the next stake.
//!
//! Yield realized during redemption lands in the claimable balances and is
//! withdrawn with `claim_rewards`.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, DIFFERENTIAL_DEPTH, STAKE_SEED, SWAP_POOL_SEED, USER_SEED};
use crate::errors::ProtocolError;
use crate::events::{Redeemed, TicketExited};
use crate::instructions::claim::{emit_realization, load_owned_stake};
use crate::settlement::{check_batch_settled, check_fee_funding, redeem_position, Redemption};
use crate::state::{Operation, ProtocolConfig, StakePosition, SwapPool, UserAccount};
use crate::token_transfer::{delegated_allowance, transfer_tokens};
use crate::upline::{ledgers, load_upline_chain, persist_upline_chain};

#[derive(Accounts)]
pub struct Redeem<'info> {
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(
        seeds = [SWAP_POOL_SEED],
        bump = swap_pool.bump,
    )]
    pub swap_pool: Box<Account<'info, SwapPool>>,

    #[account(
        mut,
        seeds = [USER_SEED, user.key().as_ref()],
        bump = user_account.bump,
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    #[account(address = config.mc_mint @ ProtocolError::InvalidMint)]
    pub mc_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Fee source (config PDA must be approved as delegate) and principal destination
    #[account(
        mut,
        constraint = user_mc.owner == user.key() @ ProtocolError::Unauthorized,
        constraint = user_mc.mint == config.mc_mint @ ProtocolError::InvalidMint,
    )]
    pub user_mc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.reward_mc_vault @ ProtocolError::InvalidVault)]
    pub reward_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(Accounts)]
#[instruction(stake_index: u64)]
pub struct RedeemStake<'info> {
    pub redeem: Redeem<'info>,

    /// CHECK: PDA verified by seeds; deserialized in the handler once the
    /// index is known to be in range.
    #[account(
        mut,
        constraint = stake_index < redeem.user_account.stake_count @ ProtocolError::InvalidStake,
        seeds = [STAKE_SEED, redeem.user.key().as_ref(), stake_index.to_le_bytes().as_ref()],
        bump,
    )]
    pub stake_position: UncheckedAccount<'info>,
}

/// Fee funding, token movement and events for a set of settled redemptions.
fn finish_redemptions(accounts: &Redeem, redemptions: &[Redemption], now: i64) -> Result<()> {
    let user_key = accounts.user.key();
    let config_key = accounts.config.key();

    let mut total_fee = 0u64;
    let mut total_principal = 0u64;
    for r in redemptions.iter() {
        total_fee = total_fee
            .checked_add(r.outcome.fee)
            .ok_or(ProtocolError::MathOverflow)?;
        total_principal = total_principal
            .checked_add(r.outcome.principal)
            .ok_or(ProtocolError::MathOverflow)?;
    }

    check_fee_funding(
        total_fee,
        delegated_allowance(&accounts.user_mc, &config_key),
        accounts.user_mc.amount,
    )?;

    let bump = [accounts.config.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    let token_program = accounts.token_program.to_account_info();
    let mint = accounts.mc_mint.to_account_info();
    let user_mc = accounts.user_mc.to_account_info();
    let vault = accounts.reward_mc_vault.to_account_info();
    let config_info = accounts.config.to_account_info();
    let decimals = accounts.mc_mint.decimals;

    // Fee first, pulled as delegate, so the principal can't fund it.
    transfer_tokens(&token_program, &user_mc, &mint, &vault, &config_info, total_fee, decimals, signer_seeds)?;
    transfer_tokens(&token_program, &vault, &mint, &user_mc, &config_info, total_principal, decimals, signer_seeds)?;

    for r in redemptions.iter() {
        if let Some(realization) = r.realization.as_ref() {
            emit_realization(user_key, realization, now);
        }
        emit!(Redeemed {
            user: user_key,
            stake_id: r.outcome.stake_index,
            principal: r.outcome.principal,
            fee: r.outcome.fee,
            timestamp: now,
        });
    }

    msg!(
        "Redeemed {} stake(s): user={}, principal={}, fee={}",
        redemptions.len(),
        user_key,
        total_principal,
        total_fee
    );
    Ok(())
}

fn emit_exit(user: &UserAccount, now: i64) {
    emit!(TicketExited {
        user: user.owner,
        ticket_id: user.ticket_id,
        total_revenue: user.total_revenue,
        current_cap: user.current_cap,
        timestamp: now,
    });
    msg!("Ticket #{} exited: user={}", user.ticket_id, user.owner);
}

/// Redeem one stake by index. `remaining_accounts`: the upline chain.
pub fn redeem_stake<'info>(
    ctx: Context<'_, '_, 'info, 'info, RedeemStake<'info>>,
    stake_index: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut ctx.accounts.redeem;
    accounts.config.require_enabled(Operation::Redeem)?;

    let info = ctx.accounts.stake_position.to_account_info();
    require_keys_eq!(*info.owner, crate::ID, ProtocolError::InvalidStake);
    let mut stake = {
        let data = info.try_borrow_data()?;
        StakePosition::try_deserialize(&mut &data[..])?
    };
    require!(stake.index == stake_index, ProtocolError::InvalidStake);

    let rate = accounts.swap_pool.price_rate();
    let fee_percent = accounts.config.redemption_fee_percent;
    let user_account: &mut UserAccount = &mut accounts.user_account;
    let mut chain = load_upline_chain(user_account.referrer, ctx.remaining_accounts, DIFFERENTIAL_DEPTH)?;

    let redemption = {
        let mut uplines = ledgers(&mut chain);
        redeem_position(user_account, &mut stake, &mut uplines, fee_percent, now, rate)?
    };

    {
        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        stake.try_serialize(&mut writer)?;
    }
    persist_upline_chain(&chain)?;
    if redemption.outcome.ticket_exited {
        emit_exit(user_account, now);
    }

    accounts.config.total_staked = accounts
        .config
        .total_staked
        .saturating_sub(redemption.outcome.principal);

    finish_redemptions(accounts, std::slice::from_ref(&redemption), now)
}

/// Redeem every matured stake among the first `stake_count` remaining
/// accounts; the rest of `remaining_accounts` is the upline chain.
pub fn redeem<'info>(ctx: Context<'_, '_, 'info, 'info, Redeem<'info>>, stake_count: u8) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();
    ctx.accounts.config.require_enabled(Operation::Redeem)?;

    let split = stake_count as usize;
    require!(
        split > 0 && split <= ctx.remaining_accounts.len(),
        ProtocolError::InvalidInputLength
    );
    let (stake_infos, chain_infos) = ctx.remaining_accounts.split_at(split);

    let rate = ctx.accounts.swap_pool.price_rate();
    let fee_percent = ctx.accounts.config.redemption_fee_percent;
    let user_account: &mut UserAccount = &mut ctx.accounts.user_account;
    let mut chain = load_upline_chain(user_account.referrer, chain_infos, DIFFERENTIAL_DEPTH)?;

    let mut redemptions = Vec::with_capacity(split);
    let mut any_active = false;
    for info in stake_infos.iter() {
        let mut stake = load_owned_stake(info, &user_key)?;
        any_active |= stake.active;
        if !stake.active || !stake.is_mature(now)? {
            continue;
        }
        let mut uplines = ledgers(&mut chain);
        redemptions.push(redeem_position(
            user_account,
            &mut stake,
            &mut uplines,
            fee_percent,
            now,
            rate,
        )?);
        stake.exit(&crate::ID)?;
    }
    check_batch_settled(redemptions.len(), any_active)?;

    persist_upline_chain(&chain)?;
    if redemptions.iter().any(|r| r.outcome.ticket_exited) {
        emit_exit(user_account, now);
    }

    let principal: u64 = redemptions.iter().map(|r| r.outcome.principal).sum();
    ctx.accounts.config.total_staked = ctx.accounts.config.total_staked.saturating_sub(principal);

    finish_redemptions(ctx.accounts, &redemptions, now)
}
