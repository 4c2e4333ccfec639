//! Error definitions for the JBC protocol.

use anchor_lang::prelude::*;

#[error_code]
pub enum ProtocolError {
    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    #[msg("Cycle must be 7, 15 or 30 units")]
    InvalidCycle,

    #[msg("Invalid amount")]
    InvalidAmount,

    #[msg("Invalid address")]
    InvalidAddress,

    #[msg("Referrer is a descendant of this account")]
    CyclicReference,

    #[msg("Referrer already bound")]
    AlreadyBound,

    #[msg("Distribution percents exceed 100")]
    InvalidDistribution,

    #[msg("Swap tax or fee out of range")]
    InvalidSwapTax,

    #[msg("Redemption fee percent out of range")]
    InvalidFeePercent,

    #[msg("Time unit must be positive")]
    InvalidTimeUnit,

    #[msg("Cap multiplier out of range")]
    InvalidCapMultiplier,

    #[msg("Invalid input length")]
    InvalidInputLength,

    #[msg("Correction batch too large")]
    BatchTooLarge,

    #[msg("Upline account does not match referral chain")]
    InvalidUplineChain,

    #[msg("Upline chain is incomplete")]
    IncompleteUplineChain,

    #[msg("Referral edge does not match")]
    InvalidReferralEdge,

    #[msg("Invalid mint")]
    InvalidMint,

    #[msg("Invalid vault account")]
    InvalidVault,

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------
    #[msg("Ticket already exited")]
    AlreadyExited,

    #[msg("Stake not active")]
    StakeNotActive,

    #[msg("Stake has not reached maturity")]
    NotExpired,

    #[msg("Stake index out of range")]
    InvalidStake,

    #[msg("Operation disabled")]
    OperationDisabled,

    #[msg("No active ticket")]
    NoActiveTicket,

    #[msg("Ticket still active - top-up window closed")]
    TicketStillActive,

    #[msg("Unsupported schema version")]
    UnsupportedSchemaVersion,

    // -------------------------------------------------------------------------
    // Funds
    // -------------------------------------------------------------------------
    #[msg("Insufficient balance for redemption fee")]
    InsufficientBalanceForFee,

    #[msg("Insufficient allowance for redemption fee")]
    InsufficientAllowanceForFee,

    #[msg("Insufficient liquidity")]
    InsufficientLiquidity,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Slippage exceeded - received less than minimum")]
    SlippageExceeded,

    #[msg("Level reward pool too small")]
    InsufficientLevelPool,

    // -------------------------------------------------------------------------
    // Authorization / arithmetic
    // -------------------------------------------------------------------------
    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Math overflow")]
    MathOverflow,
}
