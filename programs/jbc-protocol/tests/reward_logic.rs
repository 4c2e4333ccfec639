//! Pure-logic tests for the reward engine.
//!
//! Static yield, ticket distribution (direct + level) and the tier
//! differential walk, all driven on in-memory ledgers with an explicit clock.

use anchor_lang::prelude::*;
use jbc_protocol::levels::classify;
use jbc_protocol::rewards::{
    distribute_differential, distribute_ticket, realize_stake, realize_static, split_payout,
    RewardKind,
};
use jbc_protocol::{DistributionConfig, StakePosition, UserAccount, PRICE_SCALE};

const ONE: u64 = 1_000_000_000; // 1 MC, 9 decimals
const DAY: i64 = 86_400;

// =========================================================================
// HELPERS
// =========================================================================

fn user_with_ticket(ticket: u64) -> UserAccount {
    let mut u = UserAccount::new(Pubkey::new_unique(), 255, 0);
    u.issue_ticket(ticket, 0, 0, 3).unwrap();
    u
}

fn upline(ticket: u64, team_count: u32) -> UserAccount {
    let mut u = user_with_ticket(ticket);
    u.team_count = team_count;
    u
}

fn open(user: &mut UserAccount, amount: u64, cycle_days: u16) -> StakePosition {
    let opening = user.open_stake(amount, cycle_days).unwrap();
    StakePosition::new(user.owner, 255, &opening, amount, cycle_days, 0, DAY)
}

fn distribution() -> DistributionConfig {
    DistributionConfig {
        direct_percent: 10,
        level_percent: 15,
        marketing_percent: 5,
        buyback_percent: 5,
        lp_injection_percent: 5,
        treasury_percent: 5,
    }
}

fn refs(chain: &mut [UserAccount]) -> Vec<&mut UserAccount> {
    chain.iter_mut().collect()
}

// =========================================================================
// SPLIT
// =========================================================================

#[test]
fn test_split_reconciles_even_amounts() {
    for payable in [0u64, 2, 100, 600 * ONE, u64::MAX - 1] {
        let (mc, jbc_value) = split_payout(payable);
        assert_eq!(mc + jbc_value, payable);
        assert_eq!(mc, jbc_value);
    }
}

#[test]
fn test_split_reconciles_odd_amounts() {
    for payable in [1u64, 3, 101, 600 * ONE + 1, u64::MAX] {
        let (mc, jbc_value) = split_payout(payable);
        assert_eq!(mc as u128 + jbc_value as u128, payable as u128);
        assert_eq!(mc, jbc_value + 1, "odd unit goes to MC");
    }
}

// =========================================================================
// STATIC YIELD
// =========================================================================

#[test]
fn test_thirty_day_stake_yields_sixty_percent() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 30);

    let r = realize_static(&mut user, &mut stake, 30 * DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();
    assert_eq!(r.payable, 600 * ONE);
    assert_eq!(r.mc_amount, 300 * ONE);
    assert_eq!(r.jbc_amount, 300 * ONE);
    assert_eq!(stake.paid, 600 * ONE);
    assert_eq!(user.total_revenue, 600 * ONE);
    assert_eq!(user.pending_mc, 300 * ONE);
    assert_eq!(user.pending_jbc, 300 * ONE);
}

#[test]
fn test_units_stop_at_cycle_length() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 30);

    let r = realize_static(&mut user, &mut stake, 90 * DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();
    assert_eq!(r.payable, 600 * ONE);
}

#[test]
fn test_partial_units_are_not_paid() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 7);

    assert!(realize_static(&mut user, &mut stake, DAY - 1, PRICE_SCALE)
        .unwrap()
        .is_none());

    // one unit of a 7-unit stake: 1000 * 1.3333333%
    let r = realize_static(&mut user, &mut stake, DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();
    assert_eq!(r.payable, 13_333_333_000);
}

#[test]
fn test_repeat_claim_pays_only_the_delta() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 15);

    let first = realize_static(&mut user, &mut stake, 5 * DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();
    assert!(realize_static(&mut user, &mut stake, 5 * DAY, PRICE_SCALE)
        .unwrap()
        .is_none());
    let second = realize_static(&mut user, &mut stake, 15 * DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();

    assert_eq!(first.payable + second.payable, stake.max_yield().unwrap());
}

#[test]
fn test_static_payable_capped_by_headroom() {
    // cap = 100 * 3 = 300, stake would earn 600
    let mut user = user_with_ticket(100 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 30);

    let r = realize_static(&mut user, &mut stake, 30 * DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();
    assert_eq!(r.payable, 300 * ONE);
    assert_eq!(user.total_revenue, user.current_cap);

    // still owed on the stake, but the cap is exhausted
    assert_eq!(stake.pending(30 * DAY).unwrap(), 300 * ONE);
    assert!(realize_static(&mut user, &mut stake, 30 * DAY, PRICE_SCALE)
        .unwrap()
        .is_none());
}

#[test]
fn test_jbc_leg_uses_pool_price() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 30);

    // JBC at 2 MC: 300 MC of value -> 150 JBC
    let r = realize_static(&mut user, &mut stake, 30 * DAY, 2 * PRICE_SCALE)
        .unwrap()
        .unwrap();
    assert_eq!(r.mc_amount, 300 * ONE);
    assert_eq!(r.jbc_amount, 150 * ONE);
}

#[test]
fn test_closed_stake_pays_nothing() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 7);
    stake.active = false;

    assert!(realize_static(&mut user, &mut stake, 7 * DAY, PRICE_SCALE)
        .unwrap()
        .is_none());
}

#[test]
fn test_foreign_stake_rejected() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut other = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut other, 1_000 * ONE, 7);

    assert!(realize_static(&mut user, &mut stake, 7 * DAY, PRICE_SCALE).is_err());
}

// =========================================================================
// TICKET DISTRIBUTION
// =========================================================================

#[test]
fn test_inactive_referrer_direct_goes_to_marketing() {
    let mut parent = UserAccount::new(Pubkey::new_unique(), 255, 0);
    let mut chain = vec![&mut parent];

    let d = distribute_ticket(&distribution(), 1_000 * ONE, &mut chain).unwrap();

    assert!(d.credits.is_empty());
    assert_eq!(parent.pending_mc, 0);
    assert_eq!(d.direct_redirected, 100 * ONE);
    // direct 10% + base marketing 5%
    assert_eq!(d.marketing, 150 * ONE);
    assert_eq!(d.level_to_pool, 150 * ONE);
    assert_eq!(d.retained, 1_000 * ONE - 150 * ONE - 50 * ONE * 3);
}

#[test]
fn test_no_referrer_routes_direct_and_level_away() {
    let d = distribute_ticket(&distribution(), 1_000 * ONE, &mut []).unwrap();
    assert_eq!(d.marketing, 150 * ONE);
    assert_eq!(d.level_to_pool, 150 * ONE);
}

#[test]
fn test_active_referrer_receives_direct_and_level() {
    let mut chain = vec![upline(1_000 * ONE, 0)];
    let parent_key = chain[0].owner;

    let d = distribute_ticket(&distribution(), 1_000 * ONE, &mut refs(&mut chain)).unwrap();

    let direct: Vec<_> = d.credits.iter().filter(|c| c.kind == RewardKind::Direct).collect();
    let level: Vec<_> = d.credits.iter().filter(|c| c.kind == RewardKind::Level).collect();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].upline, parent_key);
    assert_eq!(direct[0].mc_amount, 100 * ONE);
    assert_eq!(level.len(), 1);
    assert_eq!(level[0].mc_amount, 10 * ONE);

    assert_eq!(chain[0].pending_mc, 110 * ONE);
    assert_eq!(chain[0].total_revenue, 110 * ONE);
    assert_eq!(d.direct_redirected, 0);
    assert_eq!(d.marketing, 50 * ONE);
    assert_eq!(d.level_to_pool, 140 * ONE);
}

#[test]
fn test_direct_excess_over_cap_goes_to_marketing() {
    // parent cap = 10 * 3 = 30
    let mut chain = vec![upline(10 * ONE, 0)];

    let dist = DistributionConfig {
        level_percent: 0,
        ..distribution()
    };
    let d = distribute_ticket(&dist, 1_000 * ONE, &mut refs(&mut chain)).unwrap();

    assert_eq!(d.credited(), 30 * ONE);
    assert_eq!(d.direct_redirected, 70 * ONE);
    assert_eq!(d.marketing, 120 * ONE);
    assert_eq!(chain[0].total_revenue, chain[0].current_cap);
}

#[test]
fn test_level_shares_skip_inactive_and_pool_the_rest() {
    // depths 1..=15: active on odd depths only, plus a 16th that must be ignored
    let mut chain: Vec<UserAccount> = (0..16)
        .map(|i| {
            if i % 2 == 0 {
                upline(1_000 * ONE, 0)
            } else {
                UserAccount::new(Pubkey::new_unique(), 255, 0)
            }
        })
        .collect();

    let dist = DistributionConfig {
        direct_percent: 0,
        ..distribution()
    };
    let d = distribute_ticket(&dist, 1_000 * ONE, &mut refs(&mut chain)).unwrap();

    // 150 MC over 15 depths = 10 each, 8 active depths among the first 15
    assert_eq!(d.credits.len(), 8);
    assert!(d.credits.iter().all(|c| c.mc_amount == 10 * ONE));
    assert_eq!(d.level_to_pool, 70 * ONE);
    assert_eq!(chain[15].pending_mc, 0);
}

#[test]
fn test_level_division_dust_goes_to_pool() {
    let mut chain: Vec<UserAccount> = (0..15).map(|_| upline(1_000, 0)).collect();
    let dist = DistributionConfig {
        direct_percent: 0,
        level_percent: 7,
        ..distribution()
    };

    // 7% of 1000 = 70, 70 / 15 = 4 per depth, 10 left over
    let d = distribute_ticket(&dist, 1_000, &mut refs(&mut chain)).unwrap();
    assert_eq!(d.credited(), 60);
    assert_eq!(d.level_to_pool, 10);
}

#[test]
fn test_distribution_conserves_amount() {
    let mut chain = vec![upline(1_000 * ONE, 0), upline(5 * ONE, 0)];
    let amount = 777 * ONE + 3;
    let d = distribute_ticket(&distribution(), amount, &mut refs(&mut chain)).unwrap();

    assert_eq!(d.marketing + d.buyback + d.lp_injection + d.treasury + d.retained, amount);
    assert!(d.credited() + d.level_to_pool <= d.retained);
}

// =========================================================================
// DIFFERENTIAL
// =========================================================================

#[test]
fn test_differential_chain_v0_v2_v0_v3() {
    // trigger V0; parent V2 (10%); grandparent V0 (skipped); great-grandparent V3 (15%)
    let mut chain = vec![
        upline(10_000 * ONE, 30),
        upline(10_000 * ONE, 5),
        upline(500 * ONE, 100),
    ];

    let payouts =
        distribute_differential(0, 1_000 * ONE, &mut refs(&mut chain), PRICE_SCALE).unwrap();

    assert_eq!(payouts.len(), 2);
    assert_eq!(payouts[0].upline, chain[0].owner);
    assert_eq!(payouts[0].percent_gap, 10);
    assert_eq!(payouts[0].recorded, 100 * ONE);

    // 15% - 10% of min(1000, 500)
    assert_eq!(payouts[1].upline, chain[2].owner);
    assert_eq!(payouts[1].depth, 3);
    assert_eq!(payouts[1].percent_gap, 5);
    assert_eq!(payouts[1].base, 500 * ONE);
    assert_eq!(payouts[1].recorded, 25 * ONE);

    assert_eq!(chain[1].total_revenue, 0);
    assert_eq!(chain[2].pending_mc + chain[2].pending_jbc, 25 * ONE);
}

#[test]
fn test_differential_bands_are_disjoint_and_sum_to_top_gap() {
    let teams = [10, 5, 30, 1_000, 100, 100_000, 300_000];
    let mut chain: Vec<UserAccount> = teams.iter().map(|&t| upline(1_000_000 * ONE, t)).collect();
    let trigger_team = 3;

    let payouts =
        distribute_differential(trigger_team, 1_000 * ONE, &mut refs(&mut chain), PRICE_SCALE)
            .unwrap();

    let mut previous = classify(trigger_team).percent;
    let mut gap_sum = 0u32;
    for p in payouts.iter() {
        let idx = (p.depth - 1) as usize;
        let percent = classify(chain[idx].team_count).percent;
        assert!(percent > previous, "paid percents strictly increase");
        assert_eq!(p.percent_gap, percent - previous);
        gap_sum += p.percent_gap as u32;
        previous = percent;
    }

    let final_percent = classify(chain[payouts.last().unwrap().depth as usize - 1].team_count).percent;
    assert_eq!(gap_sum, (final_percent - classify(trigger_team).percent) as u32);
    assert_eq!(final_percent, 45);

    // walk stops at 45%; the V9 above it is never visited
    assert_eq!(chain[6].total_revenue, 0);
    assert_eq!(payouts.len(), 4);
}

#[test]
fn test_differential_skips_inactive_uplines() {
    let mut inactive = UserAccount::new(Pubkey::new_unique(), 255, 0);
    inactive.team_count = 100_000;
    let mut active = upline(1_000 * ONE, 30);
    let mut chain = vec![&mut inactive, &mut active];

    let payouts = distribute_differential(0, 1_000 * ONE, &mut chain, PRICE_SCALE).unwrap();

    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].depth, 2);
    assert_eq!(payouts[0].percent_gap, 10);
}

#[test]
fn test_trigger_at_or_above_upline_tier_pays_nothing() {
    let mut chain = vec![upline(1_000 * ONE, 30), upline(1_000 * ONE, 100)];
    // trigger already V3
    let payouts =
        distribute_differential(150, 1_000 * ONE, &mut refs(&mut chain), PRICE_SCALE).unwrap();
    assert!(payouts.is_empty());
}

#[test]
fn test_capped_upline_still_consumes_its_band() {
    // parent V2 with an exhausted cap, grandparent V3
    let mut chain = vec![upline(10 * ONE, 30), upline(1_000 * ONE, 100)];
    chain[0].total_revenue = chain[0].current_cap;

    let payouts =
        distribute_differential(0, 1_000 * ONE, &mut refs(&mut chain), PRICE_SCALE).unwrap();

    assert_eq!(payouts.len(), 2);
    assert_eq!(payouts[0].recorded, ONE);
    assert_eq!(payouts[0].released, 0);
    assert_eq!(chain[0].pending_mc + chain[0].pending_jbc, 0);

    // grandparent only earns the 10% -> 15% band
    assert_eq!(payouts[1].upline, chain[1].owner);
    assert_eq!(payouts[1].percent_gap, 5);
    assert_eq!(payouts[1].recorded, 50 * ONE);
}

#[test]
fn test_dust_band_is_still_consumed() {
    // parent's 1-unit ticket makes its 10% band round to zero
    let mut chain = vec![upline(1, 30), upline(1_000 * ONE, 100)];

    let payouts =
        distribute_differential(0, 1_000 * ONE, &mut refs(&mut chain), PRICE_SCALE).unwrap();

    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].upline, chain[1].owner);
    assert_eq!(payouts[0].percent_gap, 5);
}

#[test]
fn test_released_is_limited_by_headroom() {
    let mut parent = upline(100 * ONE, 30);
    parent.total_revenue = parent.current_cap - 7 * ONE;
    let mut chain = vec![&mut parent];

    let payouts = distribute_differential(0, 1_000 * ONE, &mut chain, PRICE_SCALE).unwrap();

    assert_eq!(payouts[0].recorded, 10 * ONE);
    assert_eq!(payouts[0].released, 7 * ONE);
    assert_eq!(parent.total_revenue, parent.current_cap);
}

#[test]
fn test_differential_depth_bounded() {
    // 25 active uplines, only the 21st+ would raise the tier
    let mut chain: Vec<UserAccount> = (0..25)
        .map(|i| upline(1_000 * ONE, if i >= 20 { 100_000 } else { 0 }))
        .collect();

    let payouts =
        distribute_differential(0, 1_000 * ONE, &mut refs(&mut chain), PRICE_SCALE).unwrap();
    assert!(payouts.is_empty());
}

// =========================================================================
// CAP INVARIANT
// =========================================================================

#[test]
fn test_cap_holds_across_every_reward_path() {
    let mut user = user_with_ticket(50 * ONE);
    user.team_count = 0;
    let mut stake = open(&mut user, 1_000 * ONE, 30);

    let mut chain = vec![upline(20 * ONE, 30), upline(20 * ONE, 1_000), upline(20 * ONE, 0)];

    for _ in 0..5 {
        distribute_ticket(&distribution(), 1_000 * ONE, &mut refs(&mut chain)).unwrap();
    }
    for day in 1..=30 {
        realize_stake(&mut user, &mut stake, &mut refs(&mut chain), day * DAY, PRICE_SCALE).unwrap();
    }

    assert!(user.total_revenue <= user.current_cap);
    for u in chain.iter() {
        assert!(u.total_revenue <= u.current_cap);
    }
    assert_eq!(user.total_revenue, user.current_cap);
}

#[test]
fn test_realize_stake_triggers_differential_on_payable() {
    let mut user = user_with_ticket(1_000 * ONE);
    let mut stake = open(&mut user, 1_000 * ONE, 30);
    let mut chain = vec![upline(10_000 * ONE, 30)];

    let r = realize_stake(&mut user, &mut stake, &mut refs(&mut chain), 30 * DAY, PRICE_SCALE)
        .unwrap()
        .unwrap();

    assert_eq!(r.static_reward.payable, 600 * ONE);
    assert_eq!(r.differential.len(), 1);
    // 10% of the realized 600, not of the 1000 principal
    assert_eq!(r.differential[0].recorded, 60 * ONE);
}
