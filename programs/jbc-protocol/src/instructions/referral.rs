//! User registration and referrer binding.

use anchor_lang::prelude::*;

use crate::constants::{MAX_UPLINE_DEPTH, REFERRAL_SEED, USER_SEED};
use crate::errors::ProtocolError;
use crate::events::{ReferrerBound, UserRegistered};
use crate::state::{ReferralEdge, UserAccount};
use crate::upline::{
    add_team_members, adjust_active_directs, ensure_not_ancestor, ledgers, load_upline_chain,
    persist_upline_chain,
};

#[derive(Accounts)]
pub struct RegisterUser<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        init,
        payer = user,
        space = UserAccount::LEN,
        seeds = [USER_SEED, user.key().as_ref()],
        bump
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    pub system_program: Program<'info, System>,
}

/// Create the caller's ledger record.
pub fn register_user(ctx: Context<RegisterUser>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();
    ctx.accounts
        .user_account
        .set_inner(UserAccount::new(user_key, ctx.bumps.user_account, now));

    emit!(UserRegistered {
        user: user_key,
        timestamp: now,
    });

    msg!("User registered: {}", user_key);
    Ok(())
}

#[derive(Accounts)]
pub struct BindReferrer<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [USER_SEED, user.key().as_ref()],
        bump = user_account.bump,
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    /// Referrer's record; must already exist
    #[account(
        mut,
        seeds = [USER_SEED, parent_account.owner.as_ref()],
        bump = parent_account.bump,
        constraint = parent_account.version != 0 @ ProtocolError::InvalidAddress,
    )]
    pub parent_account: Box<Account<'info, UserAccount>>,

    #[account(
        init,
        payer = user,
        space = ReferralEdge::LEN,
        seeds = [
            REFERRAL_SEED,
            parent_account.owner.as_ref(),
            parent_account.direct_count.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub referral_edge: Box<Account<'info, ReferralEdge>>,

    pub system_program: Program<'info, System>,
}

/// `remaining_accounts`: the parent's ancestors, grandparent first.
pub fn bind_referrer<'info>(ctx: Context<'_, '_, 'info, 'info, BindReferrer<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();

    let user_account: &mut UserAccount = &mut ctx.accounts.user_account;

    let parent: &mut UserAccount = &mut ctx.accounts.parent_account;
    user_account.bind_referrer(parent.owner)?;

    let mut chain = load_upline_chain(parent.referrer, ctx.remaining_accounts, MAX_UPLINE_DEPTH - 1)?;
    let team_added = user_account.team_contribution();
    {
        let ancestors = ledgers(&mut chain);
        ensure_not_ancestor(&user_key, parent, &ancestors)?;

        let mut uplines: Vec<&mut UserAccount> = Vec::with_capacity(ancestors.len() + 1);
        uplines.push(&mut *parent);
        uplines.extend(ancestors);
        add_team_members(&mut uplines, team_added)?;
    }

    let index = parent.next_referral_index()?;
    ctx.accounts.referral_edge.set_inner(ReferralEdge::new(
        parent.owner,
        user_key,
        index,
        ctx.bumps.referral_edge,
        now,
    ));
    if user_account.is_active() {
        adjust_active_directs(parent, true)?;
    }

    persist_upline_chain(&chain)?;

    emit!(ReferrerBound {
        user: user_key,
        referrer: parent.owner,
        edge_index: index,
        team_added,
        timestamp: now,
    });

    msg!("Referrer bound: {} -> {} (+{} team)", user_key, parent.owner, team_added);
    Ok(())
}
