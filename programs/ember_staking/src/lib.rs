//! # Ember Staking Program
//!
//! A tiered, time-locked staking program for the EMBER token. Depositors
//! choose a lock tier (duration + reward multiplier) per deposit; each
//! deposit is an independent position that accrues from a shared,
//! lazily-updated reward-per-share accumulator.
//!
//! ## Features
//! - Up to five admin-defined lock tiers with basis-point multipliers
//! - Lazy global accrual: one accumulator, per-position reward-debt
//!   checkpoints, no per-position timers
//! - Claim rewards without unstaking; rewards settle across all positions
//! - Early exit at any time for a 10% principal penalty (reward forfeited)
//! - Global staking cap enforced on deposits
//! - Admin controls for rate, cap, pausing, and stray-token recovery
//! - Safe math with overflow protection
//!
//! ## Devnet Only
//! This program is configured for Solana devnet deployment only.

use anchor_lang::prelude::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod ember_staking {
    use super::*;

    /// Initializes the staking pool with the given parameters.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for initialization
    /// * `staking_cap` - Ceiling on total staked principal
    /// * `reward_rate` - Reward units emitted per second, shared by the pool
    ///
    /// # Errors
    /// Returns an error if the staking cap is zero.
    pub fn initialize(ctx: Context<Initialize>, staking_cap: u64, reward_rate: u64) -> Result<()> {
        instructions::initialize::handler(ctx, staking_cap, reward_rate)
    }

    /// Appends a lock tier to the pool's tier table (admin only).
    ///
    /// # Arguments
    /// * `ctx` - The context containing admin accounts
    /// * `lock_duration` - Lock term in seconds
    /// * `multiplier_bps` - Reward multiplier in basis points (10000 = 1x)
    ///
    /// # Errors
    /// Returns an error if:
    /// - Caller is not the admin
    /// - The tier table already holds five tiers
    /// - Duration or multiplier is out of bounds
    pub fn add_tier(
        ctx: Context<AdminControl>,
        lock_duration: i64,
        multiplier_bps: u64,
    ) -> Result<()> {
        instructions::admin::add_tier_handler(ctx, lock_duration, multiplier_bps)
    }

    /// Deposits EMBER tokens into a lock tier, opening a new position.
    ///
    /// Any reward already accrued by the account's open positions is
    /// settled and paid out before the new position joins the pool.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for depositing
    /// * `amount` - Amount of EMBER tokens to stake
    /// * `tier_index` - Index into the pool's tier table
    ///
    /// # Errors
    /// Returns an error if:
    /// - Staking is paused
    /// - Amount is zero or the tier index is undefined
    /// - The deposit would exceed the staking cap
    /// - The account has used all of its position slots
    pub fn deposit(ctx: Context<Deposit>, amount: u64, tier_index: u8) -> Result<()> {
        instructions::deposit::handler(ctx, amount, tier_index)
    }

    /// Withdraws a position whose lock has expired.
    ///
    /// Pays out the full principal plus the position's final settled
    /// reward, then closes the position.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for withdrawing
    /// * `position_index` - Index of the position to close
    ///
    /// # Errors
    /// Returns an error if:
    /// - The index does not name an open position
    /// - The lock period has not ended
    pub fn withdraw(ctx: Context<Withdraw>, position_index: u8) -> Result<()> {
        instructions::withdraw::handler(ctx, position_index)
    }

    /// Exits a position before its lock expires.
    ///
    /// The accrued reward is forfeited and a 10% penalty is taken from the
    /// principal; the penalty accrues to the treasury.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for the exit
    /// * `position_index` - Index of the position to close
    ///
    /// # Errors
    /// Returns an error if the index does not name an open position.
    pub fn emergency_withdraw(
        ctx: Context<EmergencyWithdraw>,
        position_index: u8,
    ) -> Result<()> {
        instructions::emergency_withdraw::handler(ctx, position_index)
    }

    /// Claims accrued rewards across all open positions without unstaking.
    ///
    /// A zero pending total is a silent no-op.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for claiming
    ///
    /// # Errors
    /// Returns an error if the treasury cannot cover the payout.
    pub fn claim(ctx: Context<Claim>) -> Result<()> {
        instructions::claim::handler(ctx)
    }

    /// Admin function to change the global reward emission rate.
    ///
    /// The accumulator is refreshed first, so elapsed time is paid at the
    /// old rate and only the future accrues at the new one.
    ///
    /// # Arguments
    /// * `ctx` - The context containing admin accounts
    /// * `reward_rate` - New emission in reward units per second
    ///
    /// # Errors
    /// Returns an error if caller is not the admin.
    pub fn set_reward_rate(ctx: Context<AdminControl>, reward_rate: u64) -> Result<()> {
        instructions::admin::set_reward_rate_handler(ctx, reward_rate)
    }

    /// Admin function to update the staking cap.
    ///
    /// # Arguments
    /// * `ctx` - The context containing admin accounts
    /// * `staking_cap` - New ceiling on total staked principal
    ///
    /// # Errors
    /// Returns an error if:
    /// - Caller is not the admin
    /// - The new cap is zero
    pub fn set_staking_cap(ctx: Context<AdminControl>, staking_cap: u64) -> Result<()> {
        instructions::admin::set_staking_cap_handler(ctx, staking_cap)
    }

    /// Admin function to pause or unpause deposits.
    ///
    /// # Arguments
    /// * `ctx` - The context containing admin accounts
    /// * `paused` - True to pause, false to unpause
    ///
    /// # Errors
    /// Returns an error if caller is not the admin.
    pub fn set_paused(ctx: Context<AdminControl>, paused: bool) -> Result<()> {
        instructions::admin::set_paused_handler(ctx, paused)
    }

    /// Admin function to transfer authority to a new address.
    ///
    /// # Arguments
    /// * `ctx` - The context containing admin accounts
    /// * `new_authority` - New admin pubkey
    ///
    /// # Errors
    /// Returns an error if:
    /// - Caller is not the current admin
    /// - New authority is the default pubkey
    pub fn transfer_authority(ctx: Context<AdminControl>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::transfer_authority_handler(ctx, new_authority)
    }

    /// Funds the reward treasury with EMBER tokens (permissionless).
    ///
    /// # Arguments
    /// * `ctx` - The context containing funding accounts
    /// * `amount` - Amount of EMBER tokens to fund
    ///
    /// # Errors
    /// Returns an error if amount is zero or the funder balance is
    /// insufficient.
    pub fn fund_treasury(ctx: Context<FundTreasury>, amount: u64) -> Result<()> {
        instructions::fund_treasury::handler(ctx, amount)
    }

    /// Admin function to sweep out tokens of any mint except the staking
    /// token.
    ///
    /// # Arguments
    /// * `ctx` - The context containing recovery accounts
    /// * `amount` - Amount of tokens to sweep out
    ///
    /// # Errors
    /// Returns an error if:
    /// - Caller is not the admin
    /// - The mint is the staking token
    pub fn recover_token(ctx: Context<RecoverToken>, amount: u64) -> Result<()> {
        instructions::recover_token::handler(ctx, amount)
    }
}
