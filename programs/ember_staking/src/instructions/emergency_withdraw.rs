//! Emergency withdraw instruction handler.
//!
//! Closes a position before its lock expires: the accrued reward is
//! forfeited and a penalty is taken from the principal.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::state::{StakePool, UserPositions};

/// Accounts required for an early exit.
#[derive(Accounts)]
pub struct EmergencyWithdraw<'info> {
    /// The user exiting early.
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

    /// User's token account receiving the penalized principal.
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

    /// Pool's treasury vault, which collects the penalty.
    #[account(
        mut,
        constraint = treasury_vault.key() == stake_pool.treasury_vault @ StakingError::TreasuryMismatch
    )]
    pub treasury_vault: Account<'info, TokenAccount>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Splits an early-exited principal into (fee, payout).
///
/// The fee rounds down, in the user's favor.
pub fn early_exit_split(amount: u64) -> Result<(u64, u64)> {
    let fee = (amount as u128)
        .checked_mul(EARLY_EXIT_FEE_BPS as u128)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(BASIS_POINTS_DENOMINATOR as u128)
        .ok_or(StakingError::MathOverflow)?;
    let fee = u64::try_from(fee).map_err(|_| error!(StakingError::MathOverflow))?;
    let payout = amount
        .checked_sub(fee)
        .ok_or(StakingError::MathOverflow)?;
    Ok((fee, payout))
}

/// Exit a position before unlock.
///
/// No lock check is made. The position is closed without settling, which
/// discards its accrued reward entirely; the user receives the principal
/// minus the penalty, and the penalty goes to the treasury.
///
/// # Arguments
/// * `ctx` - EmergencyWithdraw accounts context
/// * `position_index` - Index of the position to close
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<EmergencyWithdraw>, position_index: u8) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let index = position_index as usize;

    let stake_pool = &mut ctx.accounts.stake_pool;
    let user_positions = &mut ctx.accounts.user_positions;

    // Total stake is about to shrink; accrual up to now must be banked at
    // the old total first.
    stake_pool.refresh(now)?;

    let amount = UserPositions::close(user_positions, index)?;
    stake_pool.total_staked = stake_pool
        .total_staked
        .checked_sub(amount)
        .ok_or(StakingError::MathOverflow)?;

    let (fee, payout) = early_exit_split(amount)?;
    stake_pool.total_fees_collected = stake_pool
        .total_fees_collected
        .checked_add(fee)
        .ok_or(StakingError::MathOverflow)?;

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
    token::transfer(cpi_ctx, payout)?;

    if fee > 0 {
        let cpi_accounts = Transfer {
            from: ctx.accounts.staking_vault.to_account_info(),
            to: ctx.accounts.treasury_vault.to_account_info(),
            authority: ctx.accounts.stake_pool.to_account_info(),
        };
        let cpi_program = ctx.accounts.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
        token::transfer(cpi_ctx, fee)?;
    }

    msg!(
        "Emergency withdrew position {}: {} paid out, {} penalty",
        position_index,
        payout,
        fee
    );
    msg!("Accrued reward forfeited");
    msg!("Pool total staked: {}", ctx.accounts.stake_pool.total_staked);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_is_ten_percent_of_principal() {
        assert_eq!(early_exit_split(1_000).unwrap(), (100, 900));
        assert_eq!(early_exit_split(50_000).unwrap(), (5_000, 45_000));
    }

    #[test]
    fn penalty_rounds_down_in_the_users_favor() {
        assert_eq!(early_exit_split(19).unwrap(), (1, 18));
        assert_eq!(early_exit_split(9).unwrap(), (0, 9));
    }

    #[test]
    fn split_conserves_principal() {
        for amount in [1u64, 7, 10, 99, 1_000, u64::MAX] {
            let (fee, payout) = early_exit_split(amount).unwrap();
            assert_eq!(fee + payout, amount);
        }
    }
}
