//! Protocol constants for the JBC reward engine.

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Seed for the singleton ProtocolConfig PDA: ["config"]
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed for the singleton SwapPool PDA: ["swap_pool"]
pub const SWAP_POOL_SEED: &[u8] = b"swap_pool";

/// Seed for per-owner ledger records: ["user", owner]
pub const USER_SEED: &[u8] = b"user";

/// Seed for referral edges: ["referral", referrer, index]
pub const REFERRAL_SEED: &[u8] = b"referral";

/// Seed for stake positions: ["stake", owner, index]
pub const STAKE_SEED: &[u8] = b"stake";

/// AMM reserve vaults (authority = config PDA)
pub const POOL_MC_VAULT_SEED: &[u8] = b"pool_mc";
pub const POOL_JBC_VAULT_SEED: &[u8] = b"pool_jbc";

/// Reward / principal vaults (authority = config PDA)
pub const REWARD_MC_VAULT_SEED: &[u8] = b"reward_mc";
pub const REWARD_JBC_VAULT_SEED: &[u8] = b"reward_jbc";

// =============================================================================
// SCHEMA VERSIONS
// =============================================================================

/// Current ProtocolConfig layout. `migrate_config` walks older layouts up to this.
pub const CONFIG_VERSION: u8 = 2;

/// Current UserAccount layout.
pub const USER_ACCOUNT_VERSION: u8 = 1;

// =============================================================================
// LEVELS (V0..V9)
// =============================================================================

/// Minimum team size for each level, indexed by level.
pub const LEVEL_THRESHOLDS: [u32; 10] = [0, 10, 30, 100, 300, 1_000, 3_000, 10_000, 30_000, 100_000];

/// Differential percent for each level, indexed by level.
pub const LEVEL_PERCENTS: [u8; 10] = [0, 5, 10, 15, 20, 25, 30, 35, 40, 45];

/// Highest differential percent (V9). The differential walk stops once reached.
pub const MAX_LEVEL_PERCENT: u8 = 45;

// =============================================================================
// REFERRAL WALKS
// =============================================================================

/// Depths that share the level reward.
pub const LEVEL_REWARD_DEPTH: usize = 15;

/// Maximum uplines visited by the differential walk.
pub const DIFFERENTIAL_DEPTH: usize = 20;

/// Maximum ancestors loaded for any chain walk (team counts, cycle check).
pub const MAX_UPLINE_DEPTH: usize = 20;

/// Referrals per `get_direct_referrals` page; keeps the reply under the
/// 1024-byte return data limit.
pub const MAX_REFERRAL_PAGE: u8 = 30;

// =============================================================================
// STATIC YIELD
// =============================================================================

/// Fixed-point precision of the per-unit yield rates (1e9 = 100%).
pub const RATE_PRECISION: u64 = 1_000_000_000;

/// ~1.33333% per unit for 7-unit stakes
pub const RATE_PER_UNIT_7: u64 = 13_333_333;

/// ~1.66667% per unit for 15-unit stakes
pub const RATE_PER_UNIT_15: u64 = 16_666_667;

/// 2.0% per unit for 30-unit stakes
pub const RATE_PER_UNIT_30: u64 = 20_000_000;

/// Cycle lengths accepted by `stake_liquidity`.
pub const VALID_CYCLES: [u16; 3] = [7, 15, 30];

/// Default accrual unit (one day).
pub const DEFAULT_SECONDS_IN_UNIT: i64 = 86_400;

// =============================================================================
// AMM
// =============================================================================

/// Fixed-point scale for MC-per-JBC rates (1e18 = 1:1).
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Below this MC reserve the pool is too thin to price rewards (1000 MC, 9 decimals).
pub const MIN_LIQUIDITY: u64 = 1_000_000_000_000;

/// Basis points denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for buy/sell tax (50%).
pub const MAX_SWAP_TAX_BPS: u16 = 5_000;

/// Upper bound for the pool fee (10%).
pub const MAX_SWAP_FEE_BPS: u16 = 1_000;

// =============================================================================
// ECONOMICS
// =============================================================================

/// Percent denominator for distribution and fee percents.
pub const PERCENT_DENOMINATOR: u64 = 100;

/// Upper bound for the redemption fee percent.
pub const MAX_REDEMPTION_FEE_PERCENT: u8 = 50;

/// Earnings cap granted per unit of ticket amount.
pub const DEFAULT_CAP_MULTIPLIER: u8 = 3;

/// Upper bound for the cap multiplier.
pub const MAX_CAP_MULTIPLIER: u8 = 10;

// =============================================================================
// ADMIN
// =============================================================================

/// Maximum records per corrective batch.
pub const MAX_CORRECTION_BATCH: usize = 20;
