//! Error types for the Ember Staking program.
//!
//! This module defines all custom error codes that can be returned by the
//! program. Each error has a unique code and descriptive message.
//!
//! ## Error Code Ranges
//! - 6000-6009: Input validation errors
//! - 6010-6019: Position/state errors
//! - 6020-6029: Capacity errors
//! - 6030-6039: Math/overflow errors
//! - 6040-6049: Authorization errors
//! - 6050-6059: Account validation errors

use anchor_lang::prelude::*;

/// Custom error codes for the Ember Staking program.
///
/// Error codes start at 6000 (Anchor's custom error offset).
#[error_code]
pub enum StakingError {
    // ========== Input Validation Errors (6000-6009) ==========

    /// [6000] Cannot deposit, fund, or recover a zero amount.
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    /// [6001] The specified tier index is not a defined tier.
    #[msg("Invalid tier index - no such tier is defined")]
    InvalidTier,

    /// [6002] The specified position index has never been assigned.
    #[msg("Invalid position index - no such position slot")]
    InvalidPositionIndex,

    /// [6003] Tier lock duration must be positive.
    #[msg("Tier lock duration must be greater than zero")]
    InvalidLockDuration,

    /// [6004] Tier multiplier must be positive.
    #[msg("Tier multiplier must be greater than zero")]
    InvalidMultiplier,

    /// [6005] Staking cap must be greater than zero.
    #[msg("Staking cap must be greater than zero")]
    ZeroStakingCap,

    // ========== Position/State Errors (6010-6019) ==========

    /// [6010] Staking operations are currently paused by admin.
    #[msg("Staking is currently paused")]
    StakingPaused,

    /// [6011] The position at this index was already closed.
    #[msg("Position is closed")]
    PositionClosed,

    /// [6012] The position's lock period has not ended yet.
    #[msg("Lock period has not ended - cannot withdraw yet")]
    LockNotExpired,

    /// [6013] The treasury does not have enough funds for the reward payout.
    #[msg("Insufficient treasury funds for reward payout")]
    InsufficientTreasuryFunds,

    // ========== Capacity Errors (6020-6029) ==========

    /// [6020] The tier table already holds the maximum number of tiers.
    #[msg("Tier table is full")]
    TierTableFull,

    /// [6021] The deposit would push total staked above the staking cap.
    #[msg("Deposit would exceed the staking cap")]
    StakingCapExceeded,

    /// [6022] Tier multiplier exceeds the maximum allowed value (10x).
    #[msg("Tier multiplier exceeds maximum of 100000 basis points (10x)")]
    MultiplierTooHigh,

    /// [6023] All position slots for this account have been used.
    #[msg("Position slot limit reached for this account")]
    PositionLimitReached,

    // ========== Math/Overflow Errors (6030-6039) ==========

    /// [6030] Arithmetic overflow occurred during calculation.
    #[msg("Arithmetic overflow occurred during calculation")]
    MathOverflow,

    // ========== Authorization Errors (6040-6049) ==========

    /// [6040] Unauthorized - caller is not the pool admin.
    #[msg("Unauthorized: caller is not the pool admin")]
    Unauthorized,

    // ========== Account Validation Errors (6050-6059) ==========

    /// [6050] The provided mint does not match the pool's staking token.
    #[msg("Token mint mismatch - wrong token for this pool")]
    MintMismatch,

    /// [6051] The provided vault does not match the pool's staking vault.
    #[msg("Staking vault address mismatch")]
    VaultMismatch,

    /// [6052] The provided treasury does not match the pool's treasury vault.
    #[msg("Treasury vault address mismatch")]
    TreasuryMismatch,

    /// [6053] Vault owner is not the stake pool PDA.
    #[msg("Vault owner must be the stake pool PDA")]
    InvalidVaultOwner,

    /// [6054] Treasury owner is not the stake pool PDA.
    #[msg("Treasury owner must be the stake pool PDA")]
    InvalidTreasuryOwner,

    /// [6055] Token account mint does not match expected mint.
    #[msg("Token account mint does not match pool staking mint")]
    InvalidTokenAccountMint,

    /// [6056] The staked asset itself can never be recovered.
    #[msg("Cannot recover the staking token - pool solvency is protected")]
    CannotRecoverStakingToken,
}
