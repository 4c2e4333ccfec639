//! Event definitions for the JBC protocol.

use anchor_lang::prelude::*;

use crate::rewards::RewardKind;
use crate::state::{Correction, SwapDirection};

// =============================================================================
// USER FLOW
// =============================================================================

/// Emitted when a ledger record is created.
#[event]
pub struct UserRegistered {
    pub user: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a referral edge is written.
#[event]
pub struct ReferrerBound {
    pub user: Pubkey,
    pub referrer: Pubkey,
    /// Referral edge index under the referrer
    pub edge_index: u32,
    /// Team members the user brought to each ancestor
    pub team_added: u32,
    pub timestamp: i64,
}

/// Emitted on every ticket purchase or top-up.
#[event]
pub struct TicketPurchased {
    pub user: Pubkey,
    pub ticket_id: u64,
    /// MC paid in this purchase
    pub amount: u64,
    /// Live ticket amount after the purchase
    pub ticket_amount: u64,
    pub current_cap: u64,
    pub is_top_up: bool,
    /// Shares routed to wallets
    pub marketing: u64,
    pub buyback: u64,
    pub lp_injection: u64,
    pub treasury: u64,
    /// Level shares routed to the level reward pool
    pub level_to_pool: u64,
    pub timestamp: i64,
}

/// Emitted when a stake is opened.
#[event]
pub struct LiquidityStaked {
    pub user: Pubkey,
    pub stake_id: u64,
    pub ticket_id: u64,
    pub amount: u64,
    pub cycle_days: u16,
    /// Refund-fee credit consumed as discount
    pub credit_used: u64,
    pub timestamp: i64,
}

/// Emitted when static yield is realized for the stake owner.
#[event]
pub struct RewardClaimed {
    pub user: Pubkey,
    pub mc_amount: u64,
    pub jbc_amount: u64,
    pub reward_type: RewardKind,
    pub ticket_id: u64,
    pub stake_id: u64,
    pub timestamp: i64,
}

/// Emitted for every direct, level or differential credit booked on an upline.
#[event]
pub struct ReferralRewardPaid {
    /// Upline receiving the credit
    pub user: Pubkey,
    /// Account whose action triggered it
    pub from: Pubkey,
    pub mc_amount: u64,
    pub jbc_amount: u64,
    pub reward_type: RewardKind,
    pub ticket_id: u64,
    /// 1 = parent
    pub depth: u8,
    pub timestamp: i64,
}

/// Full differential entitlement of an upline for one realization.
#[event]
pub struct DifferentialRewardRecorded {
    pub stake_id: u64,
    pub upline: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Differential value actually credited (after the upline's cap).
#[event]
pub struct DifferentialRewardReleased {
    pub stake_id: u64,
    pub upline: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when claimable balances leave the reward vaults.
#[event]
pub struct RewardsWithdrawn {
    pub user: Pubkey,
    pub mc_amount: u64,
    pub jbc_amount: u64,
    pub timestamp: i64,
}

/// Emitted when a matured stake is redeemed.
#[event]
pub struct Redeemed {
    pub user: Pubkey,
    pub stake_id: u64,
    pub principal: u64,
    pub fee: u64,
    pub timestamp: i64,
}

/// Emitted when the last active stake closes the live ticket.
#[event]
pub struct TicketExited {
    pub user: Pubkey,
    pub ticket_id: u64,
    pub total_revenue: u64,
    pub current_cap: u64,
    pub timestamp: i64,
}

// =============================================================================
// POOL
// =============================================================================

#[event]
pub struct SwapExecuted {
    pub user: Pubkey,
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub amount_out: u64,
    /// JBC burned as tax
    pub tax_burned: u64,
    pub reserve_mc: u64,
    pub reserve_jbc: u64,
    pub timestamp: i64,
}

#[event]
pub struct LiquidityAdded {
    pub admin: Pubkey,
    pub mc_amount: u64,
    pub jbc_amount: u64,
    pub reserve_mc: u64,
    pub reserve_jbc: u64,
    pub timestamp: i64,
}

#[event]
pub struct ReservesWithdrawn {
    pub admin: Pubkey,
    pub mc_amount: u64,
    pub jbc_amount: u64,
    pub reserve_mc: u64,
    pub reserve_jbc: u64,
    pub timestamp: i64,
}

/// Emitted by the scheduled buyback entry point.
#[event]
pub struct BuybackBurned {
    pub caller: Pubkey,
    pub mc_spent: u64,
    pub jbc_burned: u64,
    pub total_jbc_burned: u64,
    pub timestamp: i64,
}

// =============================================================================
// ADMIN
// =============================================================================

#[event]
pub struct ProtocolInitialized {
    pub admin: Pubkey,
    pub mc_mint: Pubkey,
    pub jbc_mint: Pubkey,
    pub version: u8,
    pub timestamp: i64,
}

/// Emitted by every config setter.
#[event]
pub struct ConfigUpdated {
    pub admin: Pubkey,
    /// Setter name, e.g. "distribution"
    pub field: String,
    pub timestamp: i64,
}

#[event]
pub struct ProtocolPaused {
    pub admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ProtocolUnpaused {
    pub admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct AdminUpdated {
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct LevelPoolWithdrawn {
    pub admin: Pubkey,
    pub destination: Pubkey,
    pub amount: u64,
    pub remaining: u64,
    pub timestamp: i64,
}

/// One per corrected record.
#[event]
pub struct UserCorrected {
    pub admin: Pubkey,
    pub user: Pubkey,
    pub correction: Correction,
    pub timestamp: i64,
}

#[event]
pub struct ConfigMigrated {
    pub from_version: u8,
    pub to_version: u8,
    pub timestamp: i64,
}
