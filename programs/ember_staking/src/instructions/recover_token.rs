//! Recover token instruction handler.
//!
//! Lets the admin sweep out tokens of any mint other than the staking
//! token (cleanup of mistakenly sent assets). The staking token itself is
//! always excluded so the pool stays solvent against its ledger.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::state::StakePool;

/// Accounts required for recovering a foreign token balance.
#[derive(Accounts)]
pub struct RecoverToken<'info> {
    /// The admin authority.
    #[account(
        mut,
        constraint = authority.key() == stake_pool.authority @ StakingError::Unauthorized
    )]
    pub authority: Signer<'info>,

    /// The stake pool.
    #[account(
        seeds = [STAKE_POOL_SEED, stake_pool.staking_mint.as_ref()],
        bump = stake_pool.bump
    )]
    pub stake_pool: Account<'info, StakePool>,

    /// Mint of the token being recovered.
    /// SECURITY: The staking mint is rejected - staked principal and reward
    /// funds can never leave through this path.
    #[account(
        constraint = recovered_mint.key() != stake_pool.staking_mint @ StakingError::CannotRecoverStakingToken
    )]
    pub recovered_mint: Account<'info, Mint>,

    /// Pool-owned token account holding the stray balance.
    #[account(
        mut,
        constraint = recovery_source.owner == stake_pool.key() @ StakingError::InvalidVaultOwner,
        constraint = recovery_source.mint == recovered_mint.key() @ StakingError::InvalidTokenAccountMint
    )]
    pub recovery_source: Account<'info, TokenAccount>,

    /// Destination for the recovered tokens.
    #[account(
        mut,
        constraint = destination.mint == recovered_mint.key() @ StakingError::InvalidTokenAccountMint
    )]
    pub destination: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Recover mistakenly sent tokens.
///
/// # Arguments
/// * `ctx` - RecoverToken accounts context
/// * `amount` - Amount of tokens to sweep out
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<RecoverToken>, amount: u64) -> Result<()> {
    require!(amount > 0, StakingError::ZeroAmount);

    let staking_mint_key = ctx.accounts.stake_pool.staking_mint;
    let seeds = &[
        STAKE_POOL_SEED,
        staking_mint_key.as_ref(),
        &[ctx.accounts.stake_pool.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let cpi_accounts = Transfer {
        from: ctx.accounts.recovery_source.to_account_info(),
        to: ctx.accounts.destination.to_account_info(),
        authority: ctx.accounts.stake_pool.to_account_info(),
    };
    let cpi_program = ctx.accounts.token_program.to_account_info();
    let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
    token::transfer(cpi_ctx, amount)?;

    msg!(
        "Recovered {} tokens of mint {}",
        amount,
        ctx.accounts.recovered_mint.key()
    );
    msg!("Admin: {}", ctx.accounts.authority.key());

    Ok(())
}
