//! Deposit instruction handler.
//!
//! Opens a new locked position for the chosen tier.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::state::{StakePool, UserPositions};

/// Accounts required for depositing.
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// The user staking tokens.
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

    /// User's position account (created on first deposit).
    #[account(
        init_if_needed,
        payer = user,
        space = UserPositions::LEN,
        seeds = [USER_POSITIONS_SEED, stake_pool.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_positions: Account<'info, UserPositions>,

    /// The staking token mint.
    pub staking_mint: Account<'info, Mint>,

    /// User's token account for the staking token. Receives any reward
    /// harvested from older positions during this deposit.
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

    /// System program.
    pub system_program: Program<'info, System>,

    /// Token program.
    pub token_program: Program<'info, Token>,

    /// Rent sysvar.
    pub rent: Sysvar<'info, Rent>,
}

/// Deposit tokens into a lock tier.
///
/// Before the new position joins, every open position the account already
/// holds is settled and its reward paid out. Flushing prior rewards before
/// `total_staked` grows keeps the later checkpoint of the new position from
/// diluting what the older positions had already earned.
///
/// # Arguments
/// * `ctx` - Deposit accounts context
/// * `amount` - Amount of tokens to stake
/// * `tier_index` - Index into the pool's tier table
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Deposit>, amount: u64, tier_index: u8) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let stake_pool = &ctx.accounts.stake_pool;
    require!(!stake_pool.paused, StakingError::StakingPaused);
    require!(amount > 0, StakingError::ZeroAmount);
    let tier = stake_pool.tier(tier_index)?;
    stake_pool.ensure_capacity(amount)?;

    // All bookkeeping is finalized before any token moves.
    let stake_pool = &mut ctx.accounts.stake_pool;
    let user_positions = &mut ctx.accounts.user_positions;

    if user_positions.owner == Pubkey::default() {
        user_positions.owner = ctx.accounts.user.key();
        user_positions.stake_pool = stake_pool.key();
        user_positions.bump = ctx.bumps.user_positions;
    }

    stake_pool.refresh(now)?;

    let harvested = user_positions.settle_all(stake_pool, now)?;

    let position_index = user_positions.open(amount, &tier, stake_pool.acc_reward_per_share, now)?;
    stake_pool.total_staked = stake_pool
        .total_staked
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;

    if harvested > 0 {
        require!(
            ctx.accounts.treasury_vault.amount >= harvested,
            StakingError::InsufficientTreasuryFunds
        );
        stake_pool.total_rewards_paid = stake_pool
            .total_rewards_paid
            .checked_add(harvested)
            .ok_or(StakingError::MathOverflow)?;
        user_positions.total_rewards_claimed = user_positions
            .total_rewards_claimed
            .checked_add(harvested)
            .ok_or(StakingError::MathOverflow)?;
    }

    // Transfer the principal from user to vault.
    let cpi_accounts = Transfer {
        from: ctx.accounts.user_token_account.to_account_info(),
        to: ctx.accounts.staking_vault.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);
    token::transfer(cpi_ctx, amount)?;

    // Pay out any reward harvested from the older positions.
    if harvested > 0 {
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
        token::transfer(cpi_ctx, harvested)?;
    }

    msg!(
        "Deposited {} tokens in tier {} as position {}",
        amount,
        tier_index,
        position_index
    );
    msg!("Unlocks at: {}", now + tier.lock_duration);
    msg!("Harvested {} from prior positions", harvested);
    msg!("Pool total staked: {}", ctx.accounts.stake_pool.total_staked);

    Ok(())
}
