//! SPL token CPI helpers shared by every instruction that moves funds.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token_interface::{self, Burn, TokenAccount, TransferChecked};

use crate::errors::ProtocolError;

/// `transfer_checked` through whichever token program owns the mint.
/// Zero amounts are skipped.
#[allow(clippy::too_many_arguments)]
pub fn transfer_tokens<'info>(
    token_program: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    amount: u64,
    decimals: u8,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let cpi_ctx = CpiContext::new_with_signer(
        token_program.clone(),
        TransferChecked {
            from: from.clone(),
            mint: mint.clone(),
            to: to.clone(),
            authority: authority.clone(),
        },
        signer_seeds,
    );

    token_interface::transfer_checked(cpi_ctx, amount, decimals).map_err(|e| {
        msg!("transfer of {} failed: {:?}", amount, e);
        error!(ProtocolError::TransferFailed)
    })
}

/// Burn `amount` from `from`. Zero amounts are skipped.
pub fn burn_tokens<'info>(
    token_program: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let cpi_ctx = CpiContext::new_with_signer(
        token_program.clone(),
        Burn {
            mint: mint.clone(),
            from: from.clone(),
            authority: authority.clone(),
        },
        signer_seeds,
    );

    token_interface::burn(cpi_ctx, amount).map_err(|e| {
        msg!("burn of {} failed: {:?}", amount, e);
        error!(ProtocolError::TransferFailed)
    })
}

/// Amount `spender` may pull from `account` as its SPL delegate.
pub fn delegated_allowance(account: &TokenAccount, spender: &Pubkey) -> u64 {
    match account.delegate {
        COption::Some(delegate) if delegate == *spender => account.delegated_amount,
        _ => 0,
    }
}
