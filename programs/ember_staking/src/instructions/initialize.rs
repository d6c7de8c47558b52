/// Initialize instruction handler.
///
/// Creates and configures a new staking pool.
///
/// ## Security Guarantees
/// - Vault and treasury are PDAs owned by the stake pool
/// - Mint address is locked to pool state permanently
/// - All parameters validated before storage

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::StakingError;
use crate::state::{StakePool, Tier};

/// Accounts required for pool initialization.
///
/// ## Security Notes
/// - `staking_vault` and `treasury_vault` are PDAs with `stake_pool` as authority
/// - Seeds ensure these accounts cannot be swapped or replaced
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The admin authority that will control the pool.
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The stake pool account to be created.
    /// SECURITY: PDA derived from STAKE_POOL_SEED + mint ensures uniqueness per token.
    #[account(
        init,
        payer = authority,
        space = StakePool::LEN,
        seeds = [STAKE_POOL_SEED, staking_mint.key().as_ref()],
        bump
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// The mint for the staking token (EMBER).
    pub staking_mint: Account<'info, Mint>,

    /// The vault that will hold staked principal.
    /// SECURITY: PDA with `stake_pool` as its immutable token authority.
    #[account(
        init,
        payer = authority,
        seeds = [POOL_VAULT_SEED, stake_pool.key().as_ref()],
        bump,
        token::mint = staking_mint,
        token::authority = stake_pool
    )]
    pub staking_vault: Account<'info, TokenAccount>,

    /// The treasury vault that funds reward payouts and collects
    /// early-exit penalties.
    #[account(
        init,
        payer = authority,
        seeds = [TREASURY_VAULT_SEED, stake_pool.key().as_ref()],
        bump,
        token::mint = staking_mint,
        token::authority = stake_pool
    )]
    pub treasury_vault: Account<'info, TokenAccount>,

    /// System program for account creation.
    pub system_program: Program<'info, System>,

    /// Token program for token account operations.
    pub token_program: Program<'info, Token>,

    /// Rent sysvar for rent-exempt calculations.
    pub rent: Sysvar<'info, Rent>,
}

/// Initialize a new staking pool.
///
/// The pool starts with an empty tier table and a zeroed accumulator;
/// tiers are added with `add_tier` before the first deposit can select one.
///
/// # Arguments
/// * `ctx` - Initialize accounts context
/// * `staking_cap` - Ceiling on total staked principal
/// * `reward_rate` - Reward units emitted per second
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Initialize>, staking_cap: u64, reward_rate: u64) -> Result<()> {
    require!(staking_cap > 0, StakingError::ZeroStakingCap);

    require!(
        ctx.accounts.staking_vault.owner == ctx.accounts.stake_pool.key(),
        StakingError::InvalidVaultOwner
    );
    require!(
        ctx.accounts.treasury_vault.owner == ctx.accounts.stake_pool.key(),
        StakingError::InvalidTreasuryOwner
    );
    require!(
        ctx.accounts.staking_vault.mint == ctx.accounts.staking_mint.key(),
        StakingError::InvalidTokenAccountMint
    );
    require!(
        ctx.accounts.treasury_vault.mint == ctx.accounts.staking_mint.key(),
        StakingError::InvalidTokenAccountMint
    );

    let stake_pool = &mut ctx.accounts.stake_pool;
    let clock = Clock::get()?;

    stake_pool.authority = ctx.accounts.authority.key();
    stake_pool.staking_mint = ctx.accounts.staking_mint.key();
    stake_pool.staking_vault = ctx.accounts.staking_vault.key();
    stake_pool.treasury_vault = ctx.accounts.treasury_vault.key();
    stake_pool.tiers = [Tier::default(); MAX_TIERS];
    stake_pool.tier_count = 0;
    stake_pool.reward_rate = reward_rate;
    stake_pool.acc_reward_per_share = 0;
    stake_pool.last_update_time = clock.unix_timestamp;
    stake_pool.total_staked = 0;
    stake_pool.staking_cap = staking_cap;
    stake_pool.total_rewards_paid = 0;
    stake_pool.total_fees_collected = 0;
    stake_pool.paused = false;
    stake_pool.created_at = clock.unix_timestamp;

    stake_pool.bump = ctx.bumps.stake_pool;
    stake_pool.vault_bump = ctx.bumps.staking_vault;
    stake_pool.treasury_bump = ctx.bumps.treasury_vault;

    msg!("Ember Staking Pool initialized");
    msg!("Admin: {}", ctx.accounts.authority.key());
    msg!("Mint: {}", ctx.accounts.staking_mint.key());
    msg!("Staking cap: {}", staking_cap);
    msg!("Reward rate: {}/s", reward_rate);

    Ok(())
}
