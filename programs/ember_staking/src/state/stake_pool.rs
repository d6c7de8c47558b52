use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::StakingError;

/// One lock tier: deposits locked for `lock_duration` seconds earn rewards
/// weighted by `multiplier_bps`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Tier {
    pub lock_duration: i64,
    pub multiplier_bps: u64,
}

impl Tier {
    pub const LEN: usize = 8 + 8;
}

#[account]
pub struct StakePool {
    pub authority: Pubkey,
    pub staking_mint: Pubkey,
    pub staking_vault: Pubkey,
    pub treasury_vault: Pubkey,

    pub tiers: [Tier; MAX_TIERS],
    pub tier_count: u8,

    /// Reward units emitted per second, shared by the whole pool.
    pub reward_rate: u64,
    /// Cumulative reward per staked unit since inception, scaled by
    /// PRECISION. Monotonically non-decreasing.
    pub acc_reward_per_share: u128,
    pub last_update_time: i64,

    pub total_staked: u64,
    pub staking_cap: u64,

    pub total_rewards_paid: u64,
    pub total_fees_collected: u64,

    pub paused: bool,

    pub created_at: i64,

    pub vault_bump: u8,
    pub treasury_bump: u8,
    pub bump: u8,
}

impl StakePool {
    pub const LEN: usize = 8
        + (32 * 4)
        + (Tier::LEN * MAX_TIERS) + 1
        + 8 + 16 + 8
        + (8 * 4)
        + 1
        + 8
        + 3;

    /// Rolls the reward-per-share accumulator forward to `now`.
    ///
    /// Must run before any operation that reads or mutates `total_staked` or
    /// a position's reward debt, and before `reward_rate` changes, so that
    /// rate and stake changes only ever affect future accrual.
    ///
    /// No-ops when the clock has not advanced. While nothing is staked the
    /// clock still advances but nothing accrues.
    pub fn refresh(&mut self, now: i64) -> Result<()> {
        if now <= self.last_update_time {
            return Ok(());
        }
        if self.total_staked == 0 {
            self.last_update_time = now;
            return Ok(());
        }

        self.acc_reward_per_share = self.projected_acc_per_share(now)?;
        self.last_update_time = now;
        Ok(())
    }

    /// The accumulator value `refresh(now)` would produce, without mutating
    /// anything. Used by read-only pending-reward queries.
    pub fn projected_acc_per_share(&self, now: i64) -> Result<u128> {
        if now <= self.last_update_time || self.total_staked == 0 {
            return Ok(self.acc_reward_per_share);
        }

        let elapsed = (now - self.last_update_time) as u128;
        let accrued = elapsed
            .checked_mul(self.reward_rate as u128)
            .ok_or(StakingError::MathOverflow)?
            .checked_mul(PRECISION)
            .ok_or(StakingError::MathOverflow)?
            .checked_div(self.total_staked as u128)
            .ok_or(StakingError::MathOverflow)?;

        self.acc_reward_per_share
            .checked_add(accrued)
            .ok_or_else(|| error!(StakingError::MathOverflow))
    }

    /// Appends a tier. Tiers are immutable once added and their insertion
    /// order is the lookup order.
    pub fn add_tier(&mut self, lock_duration: i64, multiplier_bps: u64) -> Result<()> {
        require!(
            (self.tier_count as usize) < MAX_TIERS,
            StakingError::TierTableFull
        );
        require!(lock_duration > 0, StakingError::InvalidLockDuration);
        require!(multiplier_bps > 0, StakingError::InvalidMultiplier);
        require!(
            multiplier_bps <= MAX_MULTIPLIER_BPS,
            StakingError::MultiplierTooHigh
        );

        self.tiers[self.tier_count as usize] = Tier {
            lock_duration,
            multiplier_bps,
        };
        self.tier_count += 1;
        Ok(())
    }

    pub fn tier(&self, index: u8) -> Result<Tier> {
        require!(index < self.tier_count, StakingError::InvalidTier);
        Ok(self.tiers[index as usize])
    }

    /// Resolves a lock duration to its tier multiplier by exact match.
    ///
    /// Falls back to the neutral 1x multiplier when no tier matches, so
    /// positions keep settling even if their originating tier definition was
    /// superseded.
    pub fn resolve_multiplier_bps(&self, lock_duration: i64) -> u64 {
        for tier in self.tiers.iter().take(self.tier_count as usize) {
            if tier.lock_duration == lock_duration {
                return tier.multiplier_bps;
            }
        }
        DEFAULT_MULTIPLIER_BPS
    }

    /// Checks that depositing `amount` would keep `total_staked` within the
    /// staking cap.
    pub fn ensure_capacity(&self, amount: u64) -> Result<()> {
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::MathOverflow)?;
        require!(new_total <= self.staking_cap, StakingError::StakingCapExceeded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(reward_rate: u64, staking_cap: u64) -> StakePool {
        StakePool {
            authority: Pubkey::default(),
            staking_mint: Pubkey::default(),
            staking_vault: Pubkey::default(),
            treasury_vault: Pubkey::default(),
            tiers: [Tier::default(); MAX_TIERS],
            tier_count: 0,
            reward_rate,
            acc_reward_per_share: 0,
            last_update_time: 0,
            total_staked: 0,
            staking_cap,
            total_rewards_paid: 0,
            total_fees_collected: 0,
            paused: false,
            created_at: 0,
            vault_bump: 0,
            treasury_bump: 0,
            bump: 0,
        }
    }

    #[test]
    fn refresh_noop_when_clock_has_not_advanced() {
        let mut p = pool(10, u64::MAX);
        p.total_staked = 1_000;
        p.last_update_time = 500;
        p.acc_reward_per_share = 42;

        p.refresh(500).unwrap();
        assert_eq!(p.acc_reward_per_share, 42);
        assert_eq!(p.last_update_time, 500);

        p.refresh(400).unwrap();
        assert_eq!(p.acc_reward_per_share, 42);
        assert_eq!(p.last_update_time, 500);
    }

    #[test]
    fn refresh_advances_clock_without_accrual_while_pool_empty() {
        let mut p = pool(10, u64::MAX);
        p.refresh(1_000).unwrap();
        assert_eq!(p.acc_reward_per_share, 0);
        assert_eq!(p.last_update_time, 1_000);
    }

    #[test]
    fn refresh_accrues_elapsed_times_rate_per_share() {
        let mut p = pool(10, u64::MAX);
        p.total_staked = 1_000;

        p.refresh(100).unwrap();
        // 100s * 10/s * PRECISION / 1000 staked = 1 full reward unit per share
        assert_eq!(p.acc_reward_per_share, PRECISION);
        assert_eq!(p.last_update_time, 100);
    }

    #[test]
    fn accumulator_is_monotonic() {
        let mut p = pool(7, u64::MAX);
        p.total_staked = 333;
        let mut previous = 0u128;
        for now in [10, 25, 25, 100, 101, 5_000] {
            p.refresh(now).unwrap();
            assert!(p.acc_reward_per_share >= previous);
            previous = p.acc_reward_per_share;
        }
    }

    #[test]
    fn projection_matches_refresh_without_mutating() {
        let mut p = pool(10, u64::MAX);
        p.total_staked = 400;
        p.refresh(50).unwrap();

        let projected = p.projected_acc_per_share(200).unwrap();
        assert_eq!(p.last_update_time, 50);

        p.refresh(200).unwrap();
        assert_eq!(p.acc_reward_per_share, projected);
    }

    #[test]
    fn rate_change_applies_only_to_future_accrual() {
        let mut p = pool(10, u64::MAX);
        p.total_staked = 1_000;

        // 100s at 10/s, then the admin path: refresh before swapping the rate
        p.refresh(100).unwrap();
        let acc_before_change = p.acc_reward_per_share;
        p.reward_rate = 20;
        p.refresh(150).unwrap();

        // old rate covers [0,100), new rate covers [100,150)
        let old_part = 100u128 * 10 * PRECISION / 1_000;
        let new_part = 50u128 * 20 * PRECISION / 1_000;
        assert_eq!(acc_before_change, old_part);
        assert_eq!(p.acc_reward_per_share, old_part + new_part);
    }

    #[test]
    fn overflow_in_accrual_is_reported_not_wrapped() {
        let mut p = pool(u64::MAX, u64::MAX);
        p.total_staked = 1;
        p.last_update_time = 0;
        assert!(p.refresh(i64::MAX).is_err());
        // failed refresh leaves the checkpoint untouched
        assert_eq!(p.last_update_time, 0);
        assert_eq!(p.acc_reward_per_share, 0);
    }

    #[test]
    fn add_tier_validates_and_fills_in_order() {
        let mut p = pool(0, u64::MAX);
        assert!(p.add_tier(0, 10_000).is_err());
        assert!(p.add_tier(-5, 10_000).is_err());
        assert!(p.add_tier(86_400, 0).is_err());
        assert!(p.add_tier(86_400, MAX_MULTIPLIER_BPS + 1).is_err());
        assert_eq!(p.tier_count, 0);

        p.add_tier(86_400, 10_000).unwrap();
        p.add_tier(7 * 86_400, 15_000).unwrap();
        assert_eq!(p.tier_count, 2);
        assert_eq!(p.tier(0).unwrap().lock_duration, 86_400);
        assert_eq!(p.tier(1).unwrap().multiplier_bps, 15_000);
        assert!(p.tier(2).is_err());
    }

    #[test]
    fn tier_table_is_capacity_bounded() {
        let mut p = pool(0, u64::MAX);
        for i in 0..MAX_TIERS {
            p.add_tier((i as i64 + 1) * 86_400, 10_000).unwrap();
        }
        assert!(p.add_tier(99 * 86_400, 10_000).is_err());
        assert_eq!(p.tier_count as usize, MAX_TIERS);
    }

    #[test]
    fn multiplier_resolution_matches_exact_duration_or_defaults() {
        let mut p = pool(0, u64::MAX);
        p.add_tier(30 * 86_400, 12_000).unwrap();
        p.add_tier(90 * 86_400, 20_000).unwrap();

        assert_eq!(p.resolve_multiplier_bps(30 * 86_400), 12_000);
        assert_eq!(p.resolve_multiplier_bps(90 * 86_400), 20_000);
        // unknown duration falls back to 1x rather than failing the lookup
        assert_eq!(p.resolve_multiplier_bps(45 * 86_400), DEFAULT_MULTIPLIER_BPS);
    }

    #[test]
    fn capacity_check_is_inclusive_of_the_cap() {
        let mut p = pool(0, 1_000);
        p.total_staked = 400;
        assert!(p.ensure_capacity(600).is_ok());
        assert!(p.ensure_capacity(601).is_err());
        // the failed check changes nothing
        assert_eq!(p.total_staked, 400);
    }
}
