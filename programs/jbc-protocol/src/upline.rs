//! Referral chain loading and chain-wide ledger updates.
//!
//! Uplines arrive as `remaining_accounts`, parent first. Each link is checked
//! against the previous account's stored `referrer` and against its PDA
//! derivation, so a caller can neither skip nor substitute an ancestor.

use anchor_lang::prelude::*;

use crate::constants::USER_SEED;
use crate::errors::ProtocolError;
use crate::state::UserAccount;

/// Load and validate the upline chain starting at `first`.
///
/// The chain must be supplied until it reaches a root (no referrer) or
/// `max_depth` links, whichever comes first. Extra accounts are rejected.
pub fn load_upline_chain<'info>(
    first: Pubkey,
    accounts: &'info [AccountInfo<'info>],
    max_depth: usize,
) -> Result<Vec<Account<'info, UserAccount>>> {
    let mut chain: Vec<Account<'info, UserAccount>> =
        Vec::with_capacity(accounts.len().min(max_depth));
    let mut expected = first;

    for info in accounts.iter() {
        require!(
            expected != Pubkey::default() && chain.len() < max_depth,
            ProtocolError::InvalidInputLength
        );
        let upline = load_user_account(info)?;
        require_keys_eq!(upline.owner, expected, ProtocolError::InvalidUplineChain);

        expected = upline.referrer;
        chain.push(upline);
    }

    require!(
        expected == Pubkey::default() || chain.len() == max_depth,
        ProtocolError::IncompleteUplineChain
    );

    Ok(chain)
}

/// Deserialize a writable `UserAccount` passed outside the accounts struct
/// and check it sits at its own PDA.
pub fn load_user_account<'info>(info: &'info AccountInfo<'info>) -> Result<Account<'info, UserAccount>> {
    require!(info.is_writable, ProtocolError::InvalidUplineChain);

    let record: Account<'info, UserAccount> = Account::try_from(info)?;
    let pda = Pubkey::create_program_address(
        &[USER_SEED, record.owner.as_ref(), &[record.bump]],
        &crate::ID,
    )
    .map_err(|_| error!(ProtocolError::InvalidUplineChain))?;
    require_keys_eq!(*info.key, pda, ProtocolError::InvalidUplineChain);

    Ok(record)
}

/// Mutable ledger views over a loaded chain, parent first.
pub fn ledgers<'a, 'info>(chain: &'a mut [Account<'info, UserAccount>]) -> Vec<&'a mut UserAccount> {
    chain.iter_mut().map(|a| &mut **a).collect()
}

/// Serialize every upline back to its account.
pub fn persist_upline_chain(chain: &[Account<'_, UserAccount>]) -> Result<()> {
    for upline in chain.iter() {
        upline.exit(&crate::ID)?;
    }
    Ok(())
}

/// Add `members` to the team count of every listed upline.
pub fn add_team_members(uplines: &mut [&mut UserAccount], members: u32) -> Result<()> {
    if members == 0 {
        return Ok(());
    }
    for upline in uplines.iter_mut() {
        upline.team_count = upline
            .team_count
            .checked_add(members)
            .ok_or(ProtocolError::MathOverflow)?;
    }
    Ok(())
}

/// Adjust the parent's active-direct count after a ticket state change.
pub fn adjust_active_directs(parent: &mut UserAccount, became_active: bool) -> Result<()> {
    parent.active_directs = if became_active {
        parent
            .active_directs
            .checked_add(1)
            .ok_or(ProtocolError::MathOverflow)?
    } else {
        parent.active_directs.saturating_sub(1)
    };
    Ok(())
}

/// `CyclicReference` if `child` is `parent` or sits anywhere above it.
pub fn ensure_not_ancestor(
    child: &Pubkey,
    parent: &UserAccount,
    ancestors: &[&mut UserAccount],
) -> Result<()> {
    require_keys_neq!(*child, parent.owner, ProtocolError::CyclicReference);
    require!(
        ancestors.iter().all(|a| a.owner != *child),
        ProtocolError::CyclicReference
    );
    Ok(())
}
