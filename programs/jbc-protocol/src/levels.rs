//! Team-size level classification (V0..V9).

use anchor_lang::prelude::*;

use crate::constants::{LEVEL_PERCENTS, LEVEL_THRESHOLDS};

/// Level and differential percent for a team size.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelInfo {
    /// Level index, 0 = V0 ... 9 = V9
    pub level: u8,
    /// Differential percent (0-45)
    pub percent: u8,
}

/// Map a team size to its level. The highest threshold not above `team_count` wins.
pub fn classify(team_count: u32) -> LevelInfo {
    let level = LEVEL_THRESHOLDS
        .iter()
        .rposition(|&threshold| team_count >= threshold)
        .unwrap_or(0);

    LevelInfo {
        level: level as u8,
        percent: LEVEL_PERCENTS[level],
    }
}
