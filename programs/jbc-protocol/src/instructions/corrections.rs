//! Admin ledger corrections for drift found by off-chain audits.
//!
//! Every write is an absolute setter, so replaying a batch is harmless.
//! Batches carry their target `UserAccount`s as remaining accounts, one per
//! record, and emit one `UserCorrected` per record.

use anchor_lang::prelude::*;

use crate::constants::{
    CONFIG_SEED, MAX_CORRECTION_BATCH, MAX_UPLINE_DEPTH, REFERRAL_SEED, USER_SEED,
};
use crate::errors::ProtocolError;
use crate::events::UserCorrected;
use crate::state::{Correction, ProtocolConfig, ReferralEdge, UserAccount, UserStatsUpdate};
use crate::upline::{ensure_not_ancestor, ledgers, load_upline_chain, load_user_account};

// ---------------------------------------------------------------------------
// Referrer
// ---------------------------------------------------------------------------

#[derive(Accounts)]
pub struct AdminSetReferrer<'info> {
    #[account(
        mut,
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
        seeds = [USER_SEED, user_account.owner.as_ref()],
        bump = user_account.bump,
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    #[account(
        mut,
        seeds = [USER_SEED, new_parent.owner.as_ref()],
        bump = new_parent.bump,
    )]
    pub new_parent: Box<Account<'info, UserAccount>>,

    /// Edge to the current referrer, required when the user is already bound
    #[account(
        mut,
        seeds = [REFERRAL_SEED, old_edge.referrer.as_ref(), old_edge.index.to_le_bytes().as_ref()],
        bump = old_edge.bump,
    )]
    pub old_edge: Option<Account<'info, ReferralEdge>>,

    /// Edge under the new referrer, required when the referrer changes
    #[account(
        init,
        payer = admin,
        space = ReferralEdge::LEN,
        seeds = [
            REFERRAL_SEED,
            new_parent.owner.as_ref(),
            new_parent.direct_count.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub new_edge: Option<Account<'info, ReferralEdge>>,

    pub system_program: Program<'info, System>,
}

/// Re-point a referral edge. `remaining_accounts`: the new parent's ancestors.
///
/// Team counts and active directs are left as-is; repair them with the
/// count correctors once the graph is right. Re-sending an applied
/// correction without `new_edge` is a no-op.
pub fn admin_set_referrer<'info>(ctx: Context<'_, '_, 'info, 'info, AdminSetReferrer<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let child = ctx.accounts.user_account.owner;
    let new_referrer = ctx.accounts.new_parent.owner;
    let old_referrer = ctx.accounts.user_account.referrer;

    if old_referrer == new_referrer {
        require!(ctx.accounts.new_edge.is_none(), ProtocolError::AlreadyBound);
        msg!("Referrer unchanged: {} -> {}", child, new_referrer);
        return Ok(());
    }

    let mut chain = load_upline_chain(
        ctx.accounts.new_parent.referrer,
        ctx.remaining_accounts,
        MAX_UPLINE_DEPTH - 1,
    )?;
    ensure_not_ancestor(&child, &ctx.accounts.new_parent, &ledgers(&mut chain))?;

    if old_referrer != Pubkey::default() {
        let old_edge = ctx
            .accounts
            .old_edge
            .as_mut()
            .ok_or(ProtocolError::InvalidReferralEdge)?;
        old_edge.retire(&old_referrer, &child)?;
    }

    let bump = ctx.bumps.new_edge.ok_or(ProtocolError::InvalidReferralEdge)?;
    let index = ctx.accounts.new_parent.next_referral_index()?;
    let new_edge = ctx
        .accounts
        .new_edge
        .as_mut()
        .ok_or(ProtocolError::InvalidReferralEdge)?;
    new_edge.set_inner(ReferralEdge::new(new_referrer, child, index, bump, now));

    let correction = Correction::Referrer { referrer: new_referrer };
    ctx.accounts.user_account.apply_correction(&correction)?;

    emit!(UserCorrected {
        admin: ctx.accounts.admin.key(),
        user: child,
        correction,
        timestamp: now,
    });

    msg!("Referrer corrected: {} {} -> {}", child, old_referrer, new_referrer);
    Ok(())
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[derive(Accounts)]
pub struct AdminCorrectionBatch<'info> {
    #[account(
        constraint = admin.key() == config.admin @ ProtocolError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, ProtocolConfig>,
}

fn apply_batch<'info>(
    admin: Pubkey,
    accounts: &'info [AccountInfo<'info>],
    corrections: &[Correction],
) -> Result<()> {
    require!(
        corrections.len() <= MAX_CORRECTION_BATCH,
        ProtocolError::BatchTooLarge
    );
    require!(
        !corrections.is_empty() && corrections.len() == accounts.len(),
        ProtocolError::InvalidInputLength
    );

    let timestamp = Clock::get()?.unix_timestamp;
    for (info, correction) in accounts.iter().zip(corrections.iter()) {
        let mut record = load_user_account(info)?;
        record.apply_correction(correction)?;
        record.exit(&crate::ID)?;

        emit!(UserCorrected {
            admin,
            user: record.owner,
            correction: *correction,
            timestamp,
        });
    }

    msg!("Corrections applied: {}", corrections.len());
    Ok(())
}

pub fn admin_set_team_count<'info>(
    ctx: Context<'_, '_, 'info, 'info, AdminCorrectionBatch<'info>>,
    team_counts: Vec<u32>,
) -> Result<()> {
    let corrections: Vec<Correction> = team_counts
        .into_iter()
        .map(|team_count| Correction::TeamCount { team_count })
        .collect();
    apply_batch(ctx.accounts.admin.key(), ctx.remaining_accounts, &corrections)
}

pub fn admin_set_active_directs<'info>(
    ctx: Context<'_, '_, 'info, 'info, AdminCorrectionBatch<'info>>,
    active_directs: Vec<u32>,
) -> Result<()> {
    let corrections: Vec<Correction> = active_directs
        .into_iter()
        .map(|active_directs| Correction::ActiveDirects { active_directs })
        .collect();
    apply_batch(ctx.accounts.admin.key(), ctx.remaining_accounts, &corrections)
}

pub fn batch_update_user_stats<'info>(
    ctx: Context<'_, '_, 'info, 'info, AdminCorrectionBatch<'info>>,
    updates: Vec<UserStatsUpdate>,
) -> Result<()> {
    let corrections: Vec<Correction> = updates.into_iter().map(Correction::from).collect();
    apply_batch(ctx.accounts.admin.key(), ctx.remaining_accounts, &corrections)
}
