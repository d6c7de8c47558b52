/// Admin instruction handlers.
///
/// Handles admin-only operations for the staking pool.
///
/// ## Security Guarantees
/// - All admin functions require signer == pool.authority
/// - PDA validation ensures correct pool
/// - Parameter bounds checking

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::StakingError;
use crate::state::StakePool;

/// Accounts required for admin operations.
#[derive(Accounts)]
pub struct AdminControl<'info> {
    /// The admin authority.
    /// SECURITY: Must be signer AND match pool.authority.
    #[account(
        mut,
        constraint = authority.key() == stake_pool.authority @ StakingError::Unauthorized
    )]
    pub authority: Signer<'info>,

    /// The stake pool to modify.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub stake_pool: Account<'info, StakePool>,
}

/// Append a lock tier to the pool's tier table.
///
/// Tiers are additive-only: existing tiers are never modified or removed,
/// and positions opened under an earlier tier keep settling via the
/// exact-duration multiplier lookup (with a 1x fallback).
///
/// # Arguments
/// * `ctx` - AdminControl accounts context
/// * `lock_duration` - Lock term in seconds, must be positive
/// * `multiplier_bps` - Reward multiplier in basis points (10000 = 1x)
///
/// # Returns
/// Result indicating success or error
pub fn add_tier_handler(
    ctx: Context<AdminControl>,
    lock_duration: i64,
    multiplier_bps: u64,
) -> Result<()> {
    let stake_pool = &mut ctx.accounts.stake_pool;
    stake_pool.add_tier(lock_duration, multiplier_bps)?;

    msg!(
        "Tier {} added: {}s lock, {}bp multiplier",
        stake_pool.tier_count - 1,
        lock_duration,
        multiplier_bps
    );
    msg!("Admin: {}", ctx.accounts.authority.key());

    Ok(())
}

/// Change the global reward emission rate.
///
/// The accumulator is refreshed *before* the swap, so the old rate covers
/// every second up to now and the new rate applies only to the future.
///
/// # Arguments
/// * `ctx` - AdminControl accounts context
/// * `reward_rate` - New emission in reward units per second (0 halts emission)
///
/// # Returns
/// Result indicating success or error
pub fn set_reward_rate_handler(ctx: Context<AdminControl>, reward_rate: u64) -> Result<()> {
    let stake_pool = &mut ctx.accounts.stake_pool;
    let clock = Clock::get()?;

    stake_pool.refresh(clock.unix_timestamp)?;

    let old_rate = stake_pool.reward_rate;
    stake_pool.reward_rate = reward_rate;

    msg!("Reward rate updated: {}/s -> {}/s", old_rate, reward_rate);
    msg!("Admin: {}", ctx.accounts.authority.key());

    Ok(())
}

/// Update the staking cap.
///
/// Takes effect immediately but only constrains future deposits; a cap set
/// below the current total staked strands nothing, it just blocks new
/// deposits until stake drains below it.
///
/// # Arguments
/// * `ctx` - AdminControl accounts context
/// * `staking_cap` - New ceiling on total staked principal
///
/// # Returns
/// Result indicating success or error
pub fn set_staking_cap_handler(ctx: Context<AdminControl>, staking_cap: u64) -> Result<()> {
    require!(staking_cap > 0, StakingError::ZeroStakingCap);

    let stake_pool = &mut ctx.accounts.stake_pool;
    let old_cap = stake_pool.staking_cap;
    stake_pool.staking_cap = staking_cap;

    msg!("Staking cap updated: {} -> {}", old_cap, staking_cap);
    msg!("Currently staked: {}", stake_pool.total_staked);
    msg!("Admin: {}", ctx.accounts.authority.key());

    Ok(())
}

/// Set the paused state of the staking pool.
///
/// When paused, new deposits are blocked; withdrawing, early exit, and
/// claiming remain available so user funds are never locked in.
///
/// # Arguments
/// * `ctx` - AdminControl accounts context
/// * `paused` - True to pause, false to unpause
///
/// # Returns
/// Result indicating success or error
pub fn set_paused_handler(ctx: Context<AdminControl>, paused: bool) -> Result<()> {
    let stake_pool = &mut ctx.accounts.stake_pool;

    let previous_state = stake_pool.paused;
    stake_pool.paused = paused;

    msg!(
        "Staking {} (was {})",
        if paused { "PAUSED" } else { "RESUMED" },
        if previous_state { "paused" } else { "active" }
    );
    msg!("Admin: {}", ctx.accounts.authority.key());

    Ok(())
}

/// Transfer admin authority to a new address.
///
/// # Arguments
/// * `ctx` - AdminControl accounts context
/// * `new_authority` - New admin pubkey, must be non-default
///
/// # Returns
/// Result indicating success or error
pub fn transfer_authority_handler(
    ctx: Context<AdminControl>,
    new_authority: Pubkey,
) -> Result<()> {
    require!(
        new_authority != Pubkey::default(),
        StakingError::Unauthorized
    );

    let stake_pool = &mut ctx.accounts.stake_pool;
    let old_authority = stake_pool.authority;
    stake_pool.authority = new_authority;

    msg!("Authority transferred: {} -> {}", old_authority, new_authority);

    Ok(())
}
