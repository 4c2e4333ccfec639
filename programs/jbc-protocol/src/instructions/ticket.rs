//! Ticket purchase: activation, cap, direct/level referral and wallet shares.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, MAX_UPLINE_DEPTH, USER_SEED};
use crate::errors::ProtocolError;
use crate::events::{ReferralRewardPaid, TicketPurchased};
use crate::rewards::distribute_ticket;
use crate::state::{Operation, ProtocolConfig, UserAccount};
use crate::token_transfer::transfer_tokens;
use crate::upline::{
    add_team_members, adjust_active_directs, ledgers, load_upline_chain, persist_upline_chain,
};

#[derive(Accounts)]
pub struct BuyTicket<'info> {
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

    #[account(mut, address = config.marketing_wallet @ ProtocolError::InvalidAddress)]
    pub marketing_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.treasury_wallet @ ProtocolError::InvalidAddress)]
    pub treasury_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.lp_injection_wallet @ ProtocolError::InvalidAddress)]
    pub lp_injection_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.buyback_wallet @ ProtocolError::InvalidAddress)]
    pub buyback_wallet: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// `remaining_accounts`: the buyer's upline chain, parent first.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, BuyTicket<'info>>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();

    let config = &mut ctx.accounts.config;
    config.require_enabled(Operation::Ticket)?;

    let user_account: &mut UserAccount = &mut ctx.accounts.user_account;

    let issue = user_account.issue_ticket(
        amount,
        now,
        config.ticket_flexibility_duration,
        config.cap_multiplier,
    )?;

    let mut chain = load_upline_chain(user_account.referrer, ctx.remaining_accounts, MAX_UPLINE_DEPTH)?;
    let distribution = {
        let mut uplines = ledgers(&mut chain);
        if issue.first_ticket {
            add_team_members(&mut uplines, 1)?;
        }
        if issue.became_active {
            if let Some(parent) = uplines.first_mut() {
                adjust_active_directs(parent, true)?;
            }
        }
        distribute_ticket(&config.distribution, amount, &mut uplines)?
    };

    config.level_reward_pool = config
        .level_reward_pool
        .checked_add(distribution.level_to_pool)
        .ok_or(ProtocolError::MathOverflow)?;
    config.total_ticket_volume = config.total_ticket_volume.saturating_add(amount);
    if issue.first_ticket {
        config.total_users = config.total_users.saturating_add(1);
    }

    let current_cap = user_account.current_cap;
    persist_upline_chain(&chain)?;

    // Interactions: the buyer signs every leg.
    let token_program = ctx.accounts.token_program.to_account_info();
    let from = ctx.accounts.user_mc.to_account_info();
    let mint = ctx.accounts.mc_mint.to_account_info();
    let authority = ctx.accounts.user.to_account_info();
    let decimals = ctx.accounts.mc_mint.decimals;

    let legs = [
        (ctx.accounts.marketing_wallet.to_account_info(), distribution.marketing),
        (ctx.accounts.buyback_wallet.to_account_info(), distribution.buyback),
        (ctx.accounts.lp_injection_wallet.to_account_info(), distribution.lp_injection),
        (ctx.accounts.treasury_wallet.to_account_info(), distribution.treasury),
        (ctx.accounts.reward_mc_vault.to_account_info(), distribution.retained),
    ];
    for (to, leg_amount) in legs.iter() {
        transfer_tokens(&token_program, &from, &mint, to, &authority, *leg_amount, decimals, &[])?;
    }

    for credit in distribution.credits.iter() {
        emit!(ReferralRewardPaid {
            user: credit.upline,
            from: user_key,
            mc_amount: credit.mc_amount,
            jbc_amount: credit.jbc_amount,
            reward_type: credit.kind,
            ticket_id: issue.ticket_id,
            depth: credit.depth,
            timestamp: now,
        });
    }

    emit!(TicketPurchased {
        user: user_key,
        ticket_id: issue.ticket_id,
        amount,
        ticket_amount: issue.ticket_amount,
        current_cap,
        is_top_up: !issue.became_active,
        marketing: distribution.marketing,
        buyback: distribution.buyback,
        lp_injection: distribution.lp_injection,
        treasury: distribution.treasury,
        level_to_pool: distribution.level_to_pool,
        timestamp: now,
    });

    msg!(
        "Ticket #{} purchased: user={}, amount={}, cap={}, referral credited={}",
        issue.ticket_id,
        user_key,
        amount,
        current_cap,
        distribution.credited()
    );
    Ok(())
}
