//! Program constants for the Ember Staking program.
//!
//! This module defines all constant values used throughout the staking
//! program, including PDA seeds, fixed-point precision values, tier limits,
//! and the early-exit penalty.

use anchor_lang::prelude::*;

/// Seed for deriving the stake pool PDA
pub const STAKE_POOL_SEED: &[u8] = b"stake_pool";

/// Seed for deriving user position account PDAs
pub const USER_POSITIONS_SEED: &[u8] = b"user_positions";

/// Seed for deriving the pool vault PDA
pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";

/// Seed for deriving the treasury vault PDA
pub const TREASURY_VAULT_SEED: &[u8] = b"treasury_vault";

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Maximum number of lock tiers a pool can define
pub const MAX_TIERS: usize = 5;

/// Maximum number of position slots per user account.
///
/// Slots are append-only: closed positions are zeroed in place rather than
/// compacted, so indices handed to clients stay stable for the lifetime of
/// the account.
pub const MAX_POSITIONS: usize = 20;

/// Basis points denominator (100% = 10000 basis points)
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

/// Neutral tier multiplier (1x) applied when no tier matches a position's
/// lock duration
pub const DEFAULT_MULTIPLIER_BPS: u64 = 10_000;

/// Maximum allowed tier multiplier (10x = 100000 basis points)
pub const MAX_MULTIPLIER_BPS: u64 = 100_000;

/// Early-exit penalty taken from principal (10% = 1000 basis points)
pub const EARLY_EXIT_FEE_BPS: u64 = 1_000;

/// Precision multiplier for the reward-per-share accumulator, retaining
/// fractional precision under integer division
pub const PRECISION: u128 = 1_000_000_000_000; // 10^12
