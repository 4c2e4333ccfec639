//! Claim: realize static yield, pay differentials upward, withdraw balances.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{CONFIG_SEED, DIFFERENTIAL_DEPTH, STAKE_SEED, SWAP_POOL_SEED, USER_SEED};
use crate::errors::ProtocolError;
use crate::events::{
    DifferentialRewardRecorded, DifferentialRewardReleased, ReferralRewardPaid, RewardClaimed,
    RewardsWithdrawn,
};
use crate::rewards::{realize_stake, Realization, RewardKind};
use crate::state::{Operation, ProtocolConfig, StakePosition, SwapPool, UserAccount};
use crate::token_transfer::transfer_tokens;
use crate::upline::{ledgers, load_upline_chain, persist_upline_chain};

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    pub user: Signer<'info>,

    #[account(
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

    #[account(address = config.jbc_mint @ ProtocolError::InvalidMint)]
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

    #[account(mut, address = config.reward_mc_vault @ ProtocolError::InvalidVault)]
    pub reward_mc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = config.reward_jbc_vault @ ProtocolError::InvalidVault)]
    pub reward_jbc_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Deserialize a writable stake passed as a remaining account and check it
/// belongs to `owner`.
pub fn load_owned_stake<'info>(
    info: &'info AccountInfo<'info>,
    owner: &Pubkey,
) -> Result<Account<'info, StakePosition>> {
    require!(info.is_writable, ProtocolError::InvalidStake);

    let stake: Account<'info, StakePosition> = Account::try_from(info)?;
    require_keys_eq!(stake.owner, *owner, ProtocolError::Unauthorized);

    let pda = Pubkey::create_program_address(
        &[STAKE_SEED, owner.as_ref(), &stake.index.to_le_bytes(), &[stake.bump]],
        &crate::ID,
    )
    .map_err(|_| error!(ProtocolError::InvalidStake))?;
    require_keys_eq!(*info.key, pda, ProtocolError::InvalidStake);

    Ok(stake)
}

/// Events for one realization: the owner's static reward and every tier gap.
pub fn emit_realization(user: Pubkey, realization: &Realization, timestamp: i64) {
    let r = &realization.static_reward;
    emit!(RewardClaimed {
        user,
        mc_amount: r.mc_amount,
        jbc_amount: r.jbc_amount,
        reward_type: RewardKind::Static,
        ticket_id: r.ticket_id,
        stake_id: r.stake_index,
        timestamp,
    });

    for payout in realization.differential.iter() {
        emit!(DifferentialRewardRecorded {
            stake_id: r.stake_index,
            upline: payout.upline,
            amount: payout.recorded,
            timestamp,
        });
        emit!(DifferentialRewardReleased {
            stake_id: r.stake_index,
            upline: payout.upline,
            amount: payout.released,
            timestamp,
        });
        if payout.released > 0 {
            emit!(ReferralRewardPaid {
                user: payout.upline,
                from: user,
                mc_amount: payout.mc_amount,
                jbc_amount: payout.jbc_amount,
                reward_type: RewardKind::Differential,
                ticket_id: r.ticket_id,
                depth: payout.depth,
                timestamp,
            });
        }
    }
}

/// `remaining_accounts`: `stake_count` stake positions, then the upline chain.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, ClaimRewards<'info>>, stake_count: u8) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();
    ctx.accounts.config.require_enabled(Operation::Claim)?;

    let split = stake_count as usize;
    require!(
        split <= ctx.remaining_accounts.len(),
        ProtocolError::InvalidInputLength
    );
    let (stake_infos, chain_infos) = ctx.remaining_accounts.split_at(split);

    let rate = ctx.accounts.swap_pool.price_rate();
    let user_account: &mut UserAccount = &mut ctx.accounts.user_account;
    let mut chain = load_upline_chain(user_account.referrer, chain_infos, DIFFERENTIAL_DEPTH)?;

    let mut realizations = Vec::with_capacity(split);
    for info in stake_infos.iter() {
        let mut stake = load_owned_stake(info, &user_key)?;
        let mut uplines = ledgers(&mut chain);
        if let Some(r) = realize_stake(user_account, &mut stake, &mut uplines, now, rate)? {
            realizations.push(r);
        }
        stake.exit(&crate::ID)?;
    }

    persist_upline_chain(&chain)?;
    let (mc_amount, jbc_amount) = user_account.take_pending()?;

    for r in realizations.iter() {
        emit_realization(user_key, r, now);
    }

    if mc_amount == 0 && jbc_amount == 0 {
        msg!("Nothing to claim: user={}", user_key);
        return Ok(());
    }

    let bump = [ctx.accounts.config.bump];
    let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &bump]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let config_info = ctx.accounts.config.to_account_info();

    transfer_tokens(
        &token_program,
        &ctx.accounts.reward_mc_vault.to_account_info(),
        &ctx.accounts.mc_mint.to_account_info(),
        &ctx.accounts.user_mc.to_account_info(),
        &config_info,
        mc_amount,
        ctx.accounts.mc_mint.decimals,
        signer_seeds,
    )?;
    transfer_tokens(
        &token_program,
        &ctx.accounts.reward_jbc_vault.to_account_info(),
        &ctx.accounts.jbc_mint.to_account_info(),
        &ctx.accounts.user_jbc.to_account_info(),
        &config_info,
        jbc_amount,
        ctx.accounts.jbc_mint.decimals,
        signer_seeds,
    )?;

    emit!(RewardsWithdrawn {
        user: user_key,
        mc_amount,
        jbc_amount,
        timestamp: now,
    });

    msg!(
        "Rewards claimed: user={}, stakes realized={}, mc={}, jbc={}",
        user_key,
        realizations.len(),
        mc_amount,
        jbc_amount
    );
    Ok(())
}
