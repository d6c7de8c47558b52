//! Claim instruction handler.
//!
//! Harvests accrued rewards across all open positions without unstaking.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::state::{StakePool, UserPositions};

/// Accounts required for claiming rewards.
#[derive(Accounts)]
pub struct Claim<'info> {
    /// The user claiming rewards.
    #[account(mut)]
    pub user: Signer<'info>,

    /// The stake pool.
    #[account(
        mut,
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref()],
        bump = stake_pool.bump,
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

    /// User's token account for receiving rewards.
    #[account(
        mut,
        constraint = user_token_account.mint == staking_mint.key() @ StakingError::MintMismatch,
        constraint = user_token_account.owner == user.key()
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    /// Pool's treasury vault holding reward funds.
    #[account(
        mut,
        constraint = treasury_vault.key() == stake_pool.treasury_vault @ StakingError::TreasuryMismatch
    )]
    pub treasury_vault: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Claim accrued rewards across every open position.
///
/// A zero total is a silent no-op, not an error: claiming twice in the same
/// second simply pays nothing the second time.
///
/// # Arguments
/// * `ctx` - Claim accounts context
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Claim>) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let stake_pool = &mut ctx.accounts.stake_pool;
    let user_positions = &mut ctx.accounts.user_positions;

    stake_pool.refresh(now)?;

    let total = user_positions.settle_all(stake_pool, now)?;
    if total == 0 {
        msg!("No rewards accrued - nothing to claim");
        return Ok(());
    }

    require!(
        ctx.accounts.treasury_vault.amount >= total,
        StakingError::InsufficientTreasuryFunds
    );

    stake_pool.total_rewards_paid = stake_pool
        .total_rewards_paid
        .checked_add(total)
        .ok_or(StakingError::MathOverflow)?;
    user_positions.total_rewards_claimed = user_positions
        .total_rewards_claimed
        .checked_add(total)
        .ok_or(StakingError::MathOverflow)?;

    let staking_mint_key = ctx.accounts.stake_pool.staking_mint;
    let seeds = &[
        STAKE_POOL_SEED,
        staking_mint_key.as_ref(),
        &[ctx.accounts.stake_pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let cpi_accounts = Transfer {
        from: ctx.accounts.treasury_vault.to_account_info(),
        to: ctx.accounts.user_token_account.to_account_info(),
        authority: ctx.accounts.stake_pool.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
    token::transfer(cpi_ctx, total)?;

    msg!("Claimed {} reward tokens", total);
    msg!(
        "Total rewards claimed by user: {}",
        ctx.accounts.user_positions.total_rewards_claimed
    );

    Ok(())
}
