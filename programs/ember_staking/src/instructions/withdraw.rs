//! Withdraw instruction handler.
//!
//! Closes an unlocked position, paying out principal and final reward.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::state::{StakePool, UserPositions};

/// Accounts required for withdrawing a position.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// The user withdrawing tokens.
    #[account(mut)]
    pub user: Signer<'info>,

    /// The stake pool.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref()],
        bump = stake_pool.bump,
        has_one = staking_vault,
        has_one = treasury_vault,
        has_one = staking_mint
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// User's position account.
    #[account(
        mut,
        seeds = [USER_POSITIONS_SEED, stake_pool.key().as_ref(), user.key().as_ref()],
        bump = user_positions.bump,
        constraint = user_positions.owner == user.key() @ StakingError::Unauthorized
    )]
    pub user_positions: Account<'info, UserPositions>,

    /// The staking token mint.
    pub staking_mint: Account<'info, Mint>,

    /// User's token account receiving principal and reward.
    #[account(
        mut,
        constraint = user_token_account.mint == staking_mint.key() @ StakingError::MintMismatch,
        constraint = user_token_account.owner == user.key()
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    /// Pool's staking vault.
    #[account(
        mut,
        constraint = staking_vault.key() == stake_pool.staking_vault @ StakingError::VaultMismatch
    )]
    pub staking_vault: Account<'info, TokenAccount>,

    /// Pool's treasury vault holding reward funds.
    #[account(
        mut,
        constraint = treasury_vault.key() == stake_pool.treasury_vault @ StakingError::TreasuryMismatch
    )]
    pub treasury_vault: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Withdraw a position after its lock has expired.
///
/// The position is settled one final time, closed (its slot stays behind as
/// a tombstone so other indices do not move), and the principal plus the
/// harvested reward are paid out.
///
/// # Arguments
/// * `ctx` - Withdraw accounts context
/// * `position_index` - Index of the position to close
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Withdraw>, position_index: u8) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let index = position_index as usize;

    let stake_pool = &mut ctx.accounts.stake_pool;
    let user_positions = &mut ctx.accounts.user_positions;

    {
        let position = user_positions.get_open(index)?;
        require!(position.is_unlocked(now), StakingError::LockNotExpired);
    }

    stake_pool.refresh(now)?;

    let position = user_positions.get_open_mut(index)?;
    let multiplier = stake_pool.resolve_multiplier_bps(position.lock_duration());
    let reward = position.settle(stake_pool.acc_reward_per_share, multiplier, now)?;

    let amount = UserPositions::close(user_positions, index)?;
    stake_pool.total_staked = stake_pool
        .total_staked
        .checked_sub(amount)
        .ok_or(StakingError::MathOverflow)?;

    if reward > 0 {
        require!(
            ctx.accounts.treasury_vault.amount >= reward,
            StakingError::InsufficientTreasuryFunds
        );
        stake_pool.total_rewards_paid = stake_pool
            .total_rewards_paid
            .checked_add(reward)
            .ok_or(StakingError::MathOverflow)?;
        user_positions.total_rewards_claimed = user_positions
            .total_rewards_claimed
            .checked_add(reward)
            .ok_or(StakingError::MathOverflow)?;
    }

    // Pay out with the pool PDA as signer.
    let staking_mint_key = ctx.accounts.stake_pool.staking_mint;
    let seeds = &[
        STAKE_POOL_SEED,
        staking_mint_key.as_ref(),
        &[ctx.accounts.stake_pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let cpi_accounts = Transfer {
        from: ctx.accounts.staking_vault.to_account_info(),
        to: ctx.accounts.user_token_account.to_account_info(),
        authority: ctx.accounts.stake_pool.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
    token::transfer(cpi_ctx, amount)?;

    if reward > 0 {
        let cpi_accounts = Transfer {
            from: ctx.accounts.treasury_vault.to_account_info(),
            to: ctx.accounts.user_token_account.to_account_info(),
            authority: ctx.accounts.stake_pool.to_account_info(),
        };
        let cpi_program = ctx.accounts.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
        token::transfer(cpi_ctx, reward)?;
    }

    msg!("Withdrew position {}: {} principal", position_index, amount);
    msg!("Final reward: {}", reward);
    msg!("Pool total staked: {}", ctx.accounts.stake_pool.total_staked);

    Ok(())
}
