//! On-chain state definitions and ledger operations.

use anchor_lang::prelude::*;

use crate::amm::{bps_of, get_amount_out, price_rate};
use crate::constants::{
    CONFIG_VERSION, DEFAULT_CAP_MULTIPLIER, MAX_CAP_MULTIPLIER, MAX_REDEMPTION_FEE_PERCENT,
    MAX_REFERRAL_PAGE, MAX_SWAP_FEE_BPS, MAX_SWAP_TAX_BPS, RATE_PER_UNIT_15, RATE_PER_UNIT_30, RATE_PER_UNIT_7,
    RATE_PRECISION, USER_ACCOUNT_VERSION, VALID_CYCLES,
};
use crate::errors::ProtocolError;

// =============================================================================
// CONFIG VALUE TYPES
// =============================================================================

/// Percent split of every ticket purchase.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DistributionConfig {
    pub direct_percent: u8,
    pub level_percent: u8,
    pub marketing_percent: u8,
    pub buyback_percent: u8,
    pub lp_injection_percent: u8,
    pub treasury_percent: u8,
}

impl DistributionConfig {
    pub const LEN: usize = 6;

    pub fn total(&self) -> u16 {
        self.direct_percent as u16
            + self.level_percent as u16
            + self.marketing_percent as u16
            + self.buyback_percent as u16
            + self.lp_injection_percent as u16
            + self.treasury_percent as u16
    }

    pub fn validate(&self) -> Result<()> {
        require!(self.total() <= 100, ProtocolError::InvalidDistribution);
        Ok(())
    }
}

/// Pool fee and the buy/sell taxes burned on swaps.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapTaxes {
    /// Share of JBC output burned on MC -> JBC
    pub buy_tax_bps: u16,
    /// Share of JBC input burned on JBC -> MC
    pub sell_tax_bps: u16,
    /// Constant-product fee retained by the pool
    pub swap_fee_bps: u16,
}

impl SwapTaxes {
    pub const LEN: usize = 6;

    pub fn validate(&self) -> Result<()> {
        require!(
            self.buy_tax_bps <= MAX_SWAP_TAX_BPS
                && self.sell_tax_bps <= MAX_SWAP_TAX_BPS
                && self.swap_fee_bps <= MAX_SWAP_FEE_BPS,
            ProtocolError::InvalidSwapTax
        );
        Ok(())
    }
}

/// Per-entry-point switches, independent of the global pause.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationalStatus {
    pub tickets_enabled: bool,
    pub staking_enabled: bool,
    pub claims_enabled: bool,
    pub redemptions_enabled: bool,
    pub swaps_enabled: bool,
}

impl OperationalStatus {
    pub const LEN: usize = 5;

    pub fn all_enabled() -> Self {
        Self {
            tickets_enabled: true,
            staking_enabled: true,
            claims_enabled: true,
            redemptions_enabled: true,
            swaps_enabled: true,
        }
    }
}

impl Default for OperationalStatus {
    fn default() -> Self {
        Self::all_enabled()
    }
}

/// Value-moving entry points gated by pause and status flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Ticket,
    Stake,
    Claim,
    Redeem,
    Swap,
}

/// Parameters for `initialize_protocol`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitializeParams {
    pub distribution: DistributionConfig,
    pub swap: SwapTaxes,
    pub redemption_fee_percent: u8,
    pub cap_multiplier: u8,
    pub seconds_in_unit: i64,
    pub ticket_flexibility_duration: i64,
}

impl InitializeParams {
    pub fn validate(&self) -> Result<()> {
        self.distribution.validate()?;
        self.swap.validate()?;
        validate_fee_percent(self.redemption_fee_percent)?;
        validate_cap_multiplier(self.cap_multiplier)?;
        validate_time_unit(self.seconds_in_unit)?;
        require!(self.ticket_flexibility_duration >= 0, ProtocolError::InvalidTimeUnit);
        Ok(())
    }
}

pub fn validate_fee_percent(percent: u8) -> Result<()> {
    require!(percent <= MAX_REDEMPTION_FEE_PERCENT, ProtocolError::InvalidFeePercent);
    Ok(())
}

pub fn validate_cap_multiplier(multiplier: u8) -> Result<()> {
    require!(
        multiplier >= 1 && multiplier <= MAX_CAP_MULTIPLIER,
        ProtocolError::InvalidCapMultiplier
    );
    Ok(())
}

pub fn validate_time_unit(seconds: i64) -> Result<()> {
    require!(seconds > 0, ProtocolError::InvalidTimeUnit);
    Ok(())
}

// =============================================================================
// PROTOCOL CONFIG
// =============================================================================

/// Global protocol configuration (singleton).
/// Seeds: ["config"]
///
/// Also the authority of all four token vaults.
#[account]
pub struct ProtocolConfig {
    /// Schema version for migrations
    pub version: u8,
    /// PDA bump
    pub bump: u8,
    /// Admin authority
    pub admin: Pubkey,
    /// Settlement token mint
    pub mc_mint: Pubkey,
    /// Reward token mint
    pub jbc_mint: Pubkey,
    /// AMM MC reserve vault
    pub pool_mc_vault: Pubkey,
    /// AMM JBC reserve vault
    pub pool_jbc_vault: Pubkey,
    /// Principal, fee and MC reward vault
    pub reward_mc_vault: Pubkey,
    /// JBC reward vault
    pub reward_jbc_vault: Pubkey,
    /// MC token account receiving the marketing share
    pub marketing_wallet: Pubkey,
    /// MC token account receiving the treasury share
    pub treasury_wallet: Pubkey,
    /// MC token account receiving the LP-injection share
    pub lp_injection_wallet: Pubkey,
    /// MC token account receiving the buyback share
    pub buyback_wallet: Pubkey,
    pub distribution: DistributionConfig,
    pub swap: SwapTaxes,
    pub redemption_fee_percent: u8,
    /// Earnings cap granted per unit of ticket amount
    pub cap_multiplier: u8,
    /// Length of one accrual unit
    pub seconds_in_unit: i64,
    /// Window after purchase during which a live ticket may be topped up
    pub ticket_flexibility_duration: i64,
    /// Emergency pause flag
    pub paused: bool,
    pub status: OperationalStatus,
    /// Unconsumed level-reward shares, held in the reward MC vault
    pub level_reward_pool: u64,
    /// Lifetime ticket volume (analytics)
    pub total_ticket_volume: u64,
    /// MC principal currently staked
    pub total_staked: u64,
    /// Accounts that ever bought a ticket
    pub total_users: u64,
    /// Reserved for future use
    pub _reserved: [u8; 64],
}

impl ProtocolConfig {
    pub const LEN: usize = 8  // discriminator
        + 1   // version
        + 1   // bump
        + 32  // admin
        + 32  // mc_mint
        + 32  // jbc_mint
        + 32 * 4 // vaults
        + 32 * 4 // wallets
        + DistributionConfig::LEN
        + SwapTaxes::LEN
        + 1   // redemption_fee_percent
        + 1   // cap_multiplier
        + 8   // seconds_in_unit
        + 8   // ticket_flexibility_duration
        + 1   // paused
        + OperationalStatus::LEN
        + 8   // level_reward_pool
        + 8   // total_ticket_volume
        + 8   // total_staked
        + 8   // total_users
        + 64; // _reserved

    /// Fail with `OperationDisabled` when paused or when `op` is switched off.
    pub fn require_enabled(&self, op: Operation) -> Result<()> {
        let enabled = match op {
            Operation::Ticket => self.status.tickets_enabled,
            Operation::Stake => self.status.staking_enabled,
            Operation::Claim => self.status.claims_enabled,
            Operation::Redeem => self.status.redemptions_enabled,
            Operation::Swap => self.status.swaps_enabled,
        };
        require!(!self.paused && enabled, ProtocolError::OperationDisabled);
        Ok(())
    }

    /// Upgrade the layout one version at a time. Returns true if anything changed.
    ///
    /// v1 predates the cap multiplier and the ticket top-up window; both sat
    /// zeroed inside what is now allocated space.
    pub fn migrate(&mut self) -> Result<bool> {
        require!(
            self.version >= 1 && self.version <= CONFIG_VERSION,
            ProtocolError::UnsupportedSchemaVersion
        );

        let mut changed = false;
        while self.version < CONFIG_VERSION {
            match self.version {
                1 => {
                    if self.cap_multiplier == 0 {
                        self.cap_multiplier = DEFAULT_CAP_MULTIPLIER;
                    }
                    self.ticket_flexibility_duration = self.ticket_flexibility_duration.max(0);
                    self.version = 2;
                }
                _ => return err!(ProtocolError::UnsupportedSchemaVersion),
            }
            changed = true;
        }
        Ok(changed)
    }
}

// =============================================================================
// SWAP POOL
// =============================================================================

/// Direction of a pool trade.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    McToJbc,
    JbcToMc,
}

/// Priced trade, before any token movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapQuote {
    /// Amount supplied by the trader
    pub amount_in: u64,
    /// Amount entering the pool's input reserve
    pub net_in: u64,
    /// Amount leaving the pool's output reserve
    pub gross_out: u64,
    /// JBC burned (taken from output on buys, from input on sells)
    pub tax: u64,
    /// Amount delivered to the trader
    pub net_out: u64,
}

/// Constant-product MC/JBC reserves.
/// Seeds: ["swap_pool"]
#[account]
pub struct SwapPool {
    /// PDA bump
    pub bump: u8,
    /// MC held by the pool
    pub reserve_mc: u64,
    /// JBC held by the pool
    pub reserve_jbc: u64,
    /// Lifetime JBC burned by taxes and buybacks
    pub total_jbc_burned: u64,
    /// Lifetime MC swapped in (analytics)
    pub total_mc_volume: u64,
    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl SwapPool {
    pub const LEN: usize = 8  // discriminator
        + 1   // bump
        + 8   // reserve_mc
        + 8   // reserve_jbc
        + 8   // total_jbc_burned
        + 8   // total_mc_volume
        + 32; // _reserved

    /// Constant-product invariant k.
    pub fn invariant(&self) -> u128 {
        (self.reserve_mc as u128) * (self.reserve_jbc as u128)
    }

    /// MC per JBC at current reserves (1:1 on thin pools).
    pub fn price_rate(&self) -> u128 {
        price_rate(self.reserve_mc, self.reserve_jbc)
    }

    /// Quote MC -> JBC. `tax_bps` of the JBC output is burned.
    pub fn quote_buy(&self, mc_in: u64, fee_bps: u16, tax_bps: u16) -> Result<SwapQuote> {
        let gross_out = get_amount_out(mc_in, self.reserve_mc, self.reserve_jbc, fee_bps)?;
        require!(
            gross_out > 0 && gross_out < self.reserve_jbc,
            ProtocolError::InsufficientLiquidity
        );
        let tax = bps_of(gross_out, tax_bps)?;

        Ok(SwapQuote {
            amount_in: mc_in,
            net_in: mc_in,
            gross_out,
            tax,
            net_out: gross_out - tax,
        })
    }

    /// Quote JBC -> MC. `tax_bps` of the JBC input is burned before pricing.
    pub fn quote_sell(&self, jbc_in: u64, fee_bps: u16, tax_bps: u16) -> Result<SwapQuote> {
        require!(jbc_in > 0, ProtocolError::InvalidAmount);
        let tax = bps_of(jbc_in, tax_bps)?;
        let net_in = jbc_in - tax;
        let gross_out = get_amount_out(net_in, self.reserve_jbc, self.reserve_mc, fee_bps)?;
        require!(
            gross_out > 0 && gross_out < self.reserve_mc,
            ProtocolError::InsufficientLiquidity
        );

        Ok(SwapQuote {
            amount_in: jbc_in,
            net_in,
            gross_out,
            tax,
            net_out: gross_out,
        })
    }

    /// Book a priced trade against the reserves.
    pub fn apply_swap(&mut self, direction: SwapDirection, quote: &SwapQuote) -> Result<()> {
        let k_before = self.invariant();

        match direction {
            SwapDirection::McToJbc => {
                self.reserve_mc = self
                    .reserve_mc
                    .checked_add(quote.net_in)
                    .ok_or(ProtocolError::MathOverflow)?;
                self.reserve_jbc = self
                    .reserve_jbc
                    .checked_sub(quote.gross_out)
                    .ok_or(ProtocolError::InsufficientLiquidity)?;
                self.total_mc_volume = self.total_mc_volume.saturating_add(quote.net_in);
            }
            SwapDirection::JbcToMc => {
                self.reserve_jbc = self
                    .reserve_jbc
                    .checked_add(quote.net_in)
                    .ok_or(ProtocolError::MathOverflow)?;
                self.reserve_mc = self
                    .reserve_mc
                    .checked_sub(quote.gross_out)
                    .ok_or(ProtocolError::InsufficientLiquidity)?;
            }
        }
        self.total_jbc_burned = self.total_jbc_burned.saturating_add(quote.tax);

        require!(self.invariant() >= k_before, ProtocolError::InsufficientLiquidity);
        Ok(())
    }

    /// Admin seeding; only ever grows k.
    pub fn add_liquidity(&mut self, mc_amount: u64, jbc_amount: u64) -> Result<()> {
        require!(mc_amount > 0 || jbc_amount > 0, ProtocolError::InvalidAmount);
        self.reserve_mc = self
            .reserve_mc
            .checked_add(mc_amount)
            .ok_or(ProtocolError::MathOverflow)?;
        self.reserve_jbc = self
            .reserve_jbc
            .checked_add(jbc_amount)
            .ok_or(ProtocolError::MathOverflow)?;
        Ok(())
    }

    /// Explicit admin withdrawal, the only path that may shrink k.
    pub fn withdraw_reserves(&mut self, mc_amount: u64, jbc_amount: u64) -> Result<()> {
        require!(mc_amount > 0 || jbc_amount > 0, ProtocolError::InvalidAmount);
        self.reserve_mc = self
            .reserve_mc
            .checked_sub(mc_amount)
            .ok_or(ProtocolError::InsufficientLiquidity)?;
        self.reserve_jbc = self
            .reserve_jbc
            .checked_sub(jbc_amount)
            .ok_or(ProtocolError::InsufficientLiquidity)?;
        Ok(())
    }
}

// =============================================================================
// USER ACCOUNT
// =============================================================================

/// Result of a ticket purchase on the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicketIssue {
    pub ticket_id: u64,
    /// Live ticket amount after this purchase
    pub ticket_amount: u64,
    /// True when a new ticket was opened (not a top-up)
    pub became_active: bool,
    /// True on the account's first-ever ticket (joins ancestors' teams)
    pub first_ticket: bool,
    /// Cap added by this purchase
    pub cap_added: u64,
}

/// Result of opening a stake on the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeOpening {
    pub index: u64,
    pub ticket_id: u64,
    /// Refund-fee credit consumed as a discount
    pub credit_used: u64,
    /// MC the owner must transfer
    pub amount_due: u64,
}

/// Per-owner ledger record: referral edge, ticket, cap and claimable balances.
/// Seeds: ["user", owner]
#[account]
pub struct UserAccount {
    /// Layout version (0 = not yet initialized)
    pub version: u8,
    /// PDA bump
    pub bump: u8,
    /// Wallet this record belongs to
    pub owner: Pubkey,
    /// Referrer wallet, Pubkey::default() when unbound
    pub referrer: Pubkey,
    pub registered_at: i64,
    /// Direct referrals holding a live ticket
    pub active_directs: u32,
    /// Referral edges ever written under this account (next edge index)
    pub direct_count: u32,
    /// Ticketed descendants
    pub team_count: u32,
    /// Has this account been added to its ancestors' team counts?
    pub counted_in_team: bool,
    /// Lifetime rewards booked against the cap
    pub total_revenue: u64,
    /// Lifetime earnings cap
    pub current_cap: u64,
    /// Redemption fees paid, redeemable as a discount on the next stake
    pub refund_fee_credit: u64,
    pub ticket_id: u64,
    pub ticket_amount: u64,
    /// Largest ticket amount ever held (redemption fee base)
    pub max_ticket_amount: u64,
    pub ticket_purchase_time: i64,
    pub ticket_exited: bool,
    /// Stakes ever opened (next stake index)
    pub stake_count: u64,
    pub active_stake_count: u32,
    /// MC principal currently staked
    pub total_staked: u64,
    /// Claimable MC
    pub pending_mc: u64,
    /// Claimable JBC
    pub pending_jbc: u64,
    pub total_withdrawn_mc: u64,
    pub total_withdrawn_jbc: u64,
    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl UserAccount {
    pub const LEN: usize = 8  // discriminator
        + 1   // version
        + 1   // bump
        + 32  // owner
        + 32  // referrer
        + 8   // registered_at
        + 4   // active_directs
        + 4   // direct_count
        + 4   // team_count
        + 1   // counted_in_team
        + 8   // total_revenue
        + 8   // current_cap
        + 8   // refund_fee_credit
        + 8   // ticket_id
        + 8   // ticket_amount
        + 8   // max_ticket_amount
        + 8   // ticket_purchase_time
        + 1   // ticket_exited
        + 8   // stake_count
        + 4   // active_stake_count
        + 8   // total_staked
        + 8   // pending_mc
        + 8   // pending_jbc
        + 8   // total_withdrawn_mc
        + 8   // total_withdrawn_jbc
        + 32; // _reserved

    pub fn new(owner: Pubkey, bump: u8, now: i64) -> Self {
        Self {
            version: USER_ACCOUNT_VERSION,
            bump,
            owner,
            referrer: Pubkey::default(),
            registered_at: now,
            active_directs: 0,
            direct_count: 0,
            team_count: 0,
            counted_in_team: false,
            total_revenue: 0,
            current_cap: 0,
            refund_fee_credit: 0,
            ticket_id: 0,
            ticket_amount: 0,
            max_ticket_amount: 0,
            ticket_purchase_time: 0,
            ticket_exited: false,
            stake_count: 0,
            active_stake_count: 0,
            total_staked: 0,
            pending_mc: 0,
            pending_jbc: 0,
            total_withdrawn_mc: 0,
            total_withdrawn_jbc: 0,
            _reserved: [0u8; 32],
        }
    }

    pub fn has_referrer(&self) -> bool {
        self.referrer != Pubkey::default()
    }

    /// Holds a live (non-exited) ticket.
    pub fn is_active(&self) -> bool {
        self.ticket_amount > 0 && !self.ticket_exited
    }

    /// Cap room left before `total_revenue` reaches `current_cap`.
    pub fn headroom(&self) -> u64 {
        self.current_cap.saturating_sub(self.total_revenue)
    }

    /// Members this account brings into an ancestor's team.
    pub fn team_contribution(&self) -> u32 {
        self.team_count.saturating_add(self.counted_in_team as u32)
    }

    /// Book up to `amount` against the cap; returns what fit.
    pub fn record_revenue(&mut self, amount: u64) -> Result<u64> {
        let booked = amount.min(self.headroom());
        self.total_revenue = self
            .total_revenue
            .checked_add(booked)
            .ok_or(ProtocolError::MathOverflow)?;
        Ok(booked)
    }

    /// Add to the claimable balances.
    pub fn credit_pending(&mut self, mc_amount: u64, jbc_amount: u64) -> Result<()> {
        self.pending_mc = self
            .pending_mc
            .checked_add(mc_amount)
            .ok_or(ProtocolError::MathOverflow)?;
        self.pending_jbc = self
            .pending_jbc
            .checked_add(jbc_amount)
            .ok_or(ProtocolError::MathOverflow)?;
        Ok(())
    }

    /// Drain the claimable balances for withdrawal.
    pub fn take_pending(&mut self) -> Result<(u64, u64)> {
        let mc = std::mem::take(&mut self.pending_mc);
        let jbc = std::mem::take(&mut self.pending_jbc);
        self.total_withdrawn_mc = self
            .total_withdrawn_mc
            .checked_add(mc)
            .ok_or(ProtocolError::MathOverflow)?;
        self.total_withdrawn_jbc = self
            .total_withdrawn_jbc
            .checked_add(jbc)
            .ok_or(ProtocolError::MathOverflow)?;
        Ok((mc, jbc))
    }

    /// Set the referral edge. Set-once; the ancestor walk is done by the caller.
    pub fn bind_referrer(&mut self, referrer: Pubkey) -> Result<()> {
        require!(referrer != Pubkey::default(), ProtocolError::InvalidAddress);
        require!(referrer != self.owner, ProtocolError::CyclicReference);
        require!(!self.has_referrer(), ProtocolError::AlreadyBound);
        self.referrer = referrer;
        Ok(())
    }

    /// Reserve the next referral edge index.
    pub fn next_referral_index(&mut self) -> Result<u32> {
        let index = self.direct_count;
        self.direct_count = self
            .direct_count
            .checked_add(1)
            .ok_or(ProtocolError::MathOverflow)?;
        Ok(index)
    }

    /// Buy a new ticket, or top up a live one inside the flexibility window.
    pub fn issue_ticket(
        &mut self,
        amount: u64,
        now: i64,
        flexibility_duration: i64,
        cap_multiplier: u8,
    ) -> Result<TicketIssue> {
        require!(amount > 0, ProtocolError::InvalidAmount);

        let became_active = if self.is_active() {
            let window_end = self
                .ticket_purchase_time
                .checked_add(flexibility_duration)
                .ok_or(ProtocolError::MathOverflow)?;
            require!(
                flexibility_duration > 0 && now <= window_end,
                ProtocolError::TicketStillActive
            );
            self.ticket_amount = self
                .ticket_amount
                .checked_add(amount)
                .ok_or(ProtocolError::MathOverflow)?;
            false
        } else {
            self.ticket_id = self
                .ticket_id
                .checked_add(1)
                .ok_or(ProtocolError::MathOverflow)?;
            self.ticket_amount = amount;
            self.ticket_purchase_time = now;
            self.ticket_exited = false;
            true
        };

        self.max_ticket_amount = self.max_ticket_amount.max(self.ticket_amount);

        let cap_added = amount
            .checked_mul(cap_multiplier as u64)
            .ok_or(ProtocolError::MathOverflow)?;
        self.current_cap = self
            .current_cap
            .checked_add(cap_added)
            .ok_or(ProtocolError::MathOverflow)?;

        let first_ticket = !self.counted_in_team;
        self.counted_in_team = true;

        Ok(TicketIssue {
            ticket_id: self.ticket_id,
            ticket_amount: self.ticket_amount,
            became_active,
            first_ticket,
            cap_added,
        })
    }

    /// Reserve the next stake index against the live ticket.
    pub fn open_stake(&mut self, amount: u64, cycle_days: u16) -> Result<StakeOpening> {
        require!(amount > 0, ProtocolError::InvalidAmount);
        require!(VALID_CYCLES.contains(&cycle_days), ProtocolError::InvalidCycle);
        require!(self.ticket_amount > 0, ProtocolError::NoActiveTicket);
        require!(!self.ticket_exited, ProtocolError::AlreadyExited);

        let index = self.stake_count;
        self.stake_count = self
            .stake_count
            .checked_add(1)
            .ok_or(ProtocolError::MathOverflow)?;
        self.active_stake_count = self
            .active_stake_count
            .checked_add(1)
            .ok_or(ProtocolError::MathOverflow)?;
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(ProtocolError::MathOverflow)?;

        let credit_used = self.refund_fee_credit.min(amount);
        self.refund_fee_credit -= credit_used;

        Ok(StakeOpening {
            index,
            ticket_id: self.ticket_id,
            credit_used,
            amount_due: amount - credit_used,
        })
    }

    /// Release one stake. Returns true when this exits the live ticket.
    pub fn close_stake(&mut self, principal: u64) -> Result<bool> {
        self.active_stake_count = self
            .active_stake_count
            .checked_sub(1)
            .ok_or(ProtocolError::StakeNotActive)?;
        self.total_staked = self
            .total_staked
            .checked_sub(principal)
            .ok_or(ProtocolError::MathOverflow)?;

        if self.active_stake_count == 0 && self.is_active() {
            self.ticket_exited = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// Redemption fee base: the largest ticket ever held, else the live one.
    pub fn redemption_fee_base(&self) -> u64 {
        if self.max_ticket_amount > 0 {
            self.max_ticket_amount
        } else {
            self.ticket_amount
        }
    }

    /// Apply an absolute admin correction. Re-applying the same correction is a no-op.
    pub fn apply_correction(&mut self, correction: &Correction) -> Result<()> {
        match *correction {
            Correction::Referrer { referrer } => {
                require!(referrer != self.owner, ProtocolError::CyclicReference);
                self.referrer = referrer;
            }
            Correction::TeamCount { team_count } => {
                self.team_count = team_count;
            }
            Correction::ActiveDirects { active_directs } => {
                self.active_directs = active_directs;
            }
            Correction::UserStats {
                team_count,
                active_directs,
                total_revenue,
                current_cap,
            } => {
                require!(total_revenue <= current_cap, ProtocolError::InvalidAmount);
                self.team_count = team_count;
                self.active_directs = active_directs;
                self.total_revenue = total_revenue;
                self.current_cap = current_cap;
            }
        }
        Ok(())
    }
}

/// Closed set of ledger repairs available to the admin.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    Referrer {
        referrer: Pubkey,
    },
    TeamCount {
        team_count: u32,
    },
    ActiveDirects {
        active_directs: u32,
    },
    UserStats {
        team_count: u32,
        active_directs: u32,
        total_revenue: u64,
        current_cap: u64,
    },
}

/// One row of `batch_update_user_stats`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserStatsUpdate {
    pub team_count: u32,
    pub active_directs: u32,
    pub total_revenue: u64,
    pub current_cap: u64,
}

impl From<UserStatsUpdate> for Correction {
    fn from(update: UserStatsUpdate) -> Self {
        Correction::UserStats {
            team_count: update.team_count,
            active_directs: update.active_directs,
            total_revenue: update.total_revenue,
            current_cap: update.current_cap,
        }
    }
}

// =============================================================================
// REFERRAL EDGE
// =============================================================================

/// One referrer -> referral link, fixed size so uplines never grow.
/// Seeds: ["referral", referrer, index]
#[account]
pub struct ReferralEdge {
    /// PDA bump
    pub bump: u8,
    pub referrer: Pubkey,
    pub referral: Pubkey,
    /// Position in the referrer's edge sequence
    pub index: u32,
    pub created_at: i64,
    /// Cleared when an admin re-points the referral elsewhere
    pub active: bool,
}

impl ReferralEdge {
    pub const LEN: usize = 8  // discriminator
        + 1   // bump
        + 32  // referrer
        + 32  // referral
        + 4   // index
        + 8   // created_at
        + 1;  // active

    pub fn new(referrer: Pubkey, referral: Pubkey, index: u32, bump: u8, now: i64) -> Self {
        Self {
            bump,
            referrer,
            referral,
            index,
            created_at: now,
            active: true,
        }
    }

    /// Edge indices covered by a page request over `total` edges.
    pub fn page(total: u32, offset: u32, limit: u8) -> Result<std::ops::Range<u32>> {
        require!(
            limit > 0 && limit <= MAX_REFERRAL_PAGE,
            ProtocolError::InvalidInputLength
        );
        let start = offset.min(total);
        let end = offset.saturating_add(limit as u32).min(total);
        Ok(start..end)
    }

    /// Deactivate the edge for `referral`, checking it is the one being replaced.
    pub fn retire(&mut self, referrer: &Pubkey, referral: &Pubkey) -> Result<()> {
        require_keys_eq!(self.referrer, *referrer, ProtocolError::InvalidReferralEdge);
        require_keys_eq!(self.referral, *referral, ProtocolError::InvalidReferralEdge);
        require!(self.active, ProtocolError::InvalidReferralEdge);
        self.active = false;
        Ok(())
    }
}

// =============================================================================
// STAKE POSITION
// =============================================================================

/// Per-unit static yield for a cycle length.
pub fn rate_per_unit(cycle_days: u16) -> Result<u64> {
    match cycle_days {
        7 => Ok(RATE_PER_UNIT_7),
        15 => Ok(RATE_PER_UNIT_15),
        30 => Ok(RATE_PER_UNIT_30),
        _ => err!(ProtocolError::InvalidCycle),
    }
}

/// Time-boxed liquidity lock accruing static yield.
/// Seeds: ["stake", owner, index]
#[account]
pub struct StakePosition {
    /// PDA bump
    pub bump: u8,
    pub owner: Pubkey,
    /// Index within the owner's stakes
    pub index: u64,
    /// Ticket live when the stake was opened
    pub ticket_id: u64,
    /// MC principal
    pub amount: u64,
    pub start_time: i64,
    /// 7, 15 or 30
    pub cycle_days: u16,
    /// Accrual unit snapshotted at open
    pub unit_seconds: i64,
    pub active: bool,
    /// Static yield realized so far
    pub paid: u64,
    pub closed_at: i64,
    /// Reserved for future use
    pub _reserved: [u8; 16],
}

impl StakePosition {
    pub const LEN: usize = 8  // discriminator
        + 1   // bump
        + 32  // owner
        + 8   // index
        + 8   // ticket_id
        + 8   // amount
        + 8   // start_time
        + 2   // cycle_days
        + 8   // unit_seconds
        + 1   // active
        + 8   // paid
        + 8   // closed_at
        + 16; // _reserved

    pub fn new(
        owner: Pubkey,
        bump: u8,
        opening: &StakeOpening,
        amount: u64,
        cycle_days: u16,
        now: i64,
        unit_seconds: i64,
    ) -> Self {
        Self {
            bump,
            owner,
            index: opening.index,
            ticket_id: opening.ticket_id,
            amount,
            start_time: now,
            cycle_days,
            unit_seconds,
            active: true,
            paid: 0,
            closed_at: 0,
            _reserved: [0u8; 16],
        }
    }

    pub fn maturity_time(&self) -> Result<i64> {
        (self.cycle_days as i64)
            .checked_mul(self.unit_seconds)
            .and_then(|d| self.start_time.checked_add(d))
            .ok_or_else(|| error!(ProtocolError::MathOverflow))
    }

    pub fn is_mature(&self, now: i64) -> Result<bool> {
        Ok(now >= self.maturity_time()?)
    }

    /// Whole units elapsed, capped at the cycle length.
    pub fn units_elapsed(&self, now: i64) -> u64 {
        if self.unit_seconds <= 0 || now <= self.start_time {
            return 0;
        }
        let units = ((now - self.start_time) / self.unit_seconds) as u64;
        units.min(self.cycle_days as u64)
    }

    fn yield_for_units(&self, units: u64) -> Result<u64> {
        let rate = rate_per_unit(self.cycle_days)?;
        let gross = (self.amount as u128)
            .checked_mul(rate as u128)
            .ok_or(ProtocolError::MathOverflow)?
            .checked_mul(units as u128)
            .ok_or(ProtocolError::MathOverflow)?
            / RATE_PRECISION as u128;
        u64::try_from(gross).map_err(|_| error!(ProtocolError::MathOverflow))
    }

    /// Static yield earned to `now`.
    pub fn gross_due(&self, now: i64) -> Result<u64> {
        self.yield_for_units(self.units_elapsed(now))
    }

    /// Yield of a fully elapsed cycle.
    pub fn max_yield(&self) -> Result<u64> {
        self.yield_for_units(self.cycle_days as u64)
    }

    /// Earned but not yet realized.
    pub fn pending(&self, now: i64) -> Result<u64> {
        if !self.active {
            return Ok(0);
        }
        Ok(self.gross_due(now)?.saturating_sub(self.paid))
    }
}
