use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::StakingError;
use crate::state::{StakePool, Tier};

/// One deposit event: principal locked until `unlocks_at`, with a
/// reward-debt checkpoint against the pool accumulator.
///
/// A zeroed slot (`amount == 0`) is a closed position left in place as a
/// tombstone; slots are never compacted, so indices stay stable.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug)]
pub struct Position {
    pub amount: u64,
    pub opened_at: i64,
    pub unlocks_at: i64,
    pub last_settled_at: i64,
    /// PRECISION-scaled accumulator value already settled against this
    /// position. A checkpoint, not a balance.
    pub reward_debt: u128,
}

impl Position {
    pub const LEN: usize = 8 + 8 + 8 + 8 + 16;

    pub fn is_open(&self) -> bool {
        self.amount > 0
    }

    pub fn is_unlocked(&self, now: i64) -> bool {
        now >= self.unlocks_at
    }

    /// The lock term this position was opened under.
    pub fn lock_duration(&self) -> i64 {
        self.unlocks_at - self.opened_at
    }

    /// PRECISION-scaled share of the accumulator owned by this position.
    fn accumulated(&self, acc_per_share: u128) -> Result<u128> {
        (self.amount as u128)
            .checked_mul(acc_per_share)
            .ok_or(StakingError::MathOverflow)?
            .checked_div(PRECISION)
            .ok_or_else(|| error!(StakingError::MathOverflow))
    }

    /// Reward accrued since the last settlement, with the tier multiplier
    /// applied to the net accumulator delta.
    pub fn pending_reward(&self, acc_per_share: u128, multiplier_bps: u64) -> Result<u64> {
        let gross = self.accumulated(acc_per_share)?;
        let net = gross.saturating_sub(self.reward_debt);
        let weighted = net
            .checked_mul(multiplier_bps as u128)
            .ok_or(StakingError::MathOverflow)?
            .checked_div(BASIS_POINTS_DENOMINATOR as u128)
            .ok_or(StakingError::MathOverflow)?;
        u64::try_from(weighted).map_err(|_| error!(StakingError::MathOverflow))
    }

    /// Harvests the pending reward and advances the checkpoint.
    ///
    /// The debt is re-derived from the current accumulator rather than
    /// incremented, so a subsequent `pending_reward` with an unchanged
    /// accumulator is exactly zero and repeated settlements cannot compound
    /// rounding drift.
    pub fn settle(&mut self, acc_per_share: u128, multiplier_bps: u64, now: i64) -> Result<u64> {
        let reward = self.pending_reward(acc_per_share, multiplier_bps)?;
        self.reward_debt = self.accumulated(acc_per_share)?;
        self.last_settled_at = now.min(self.unlocks_at);
        Ok(reward)
    }
}

#[account]
pub struct UserPositions {
    pub owner: Pubkey,
    pub stake_pool: Pubkey,

    pub positions: Vec<Position>,
    pub total_rewards_claimed: u64,

    pub bump: u8,
}

impl UserPositions {
    pub const LEN: usize = 8 + 32 + 32 + 4 + (Position::LEN * MAX_POSITIONS) + 8 + 1;

    /// Appends a new position checkpointed at the current accumulator, so it
    /// owes nothing for reward accrued before it joined.
    ///
    /// The caller must have refreshed the pool accumulator first.
    pub fn open(
        &mut self,
        amount: u64,
        tier: &Tier,
        acc_per_share: u128,
        now: i64,
    ) -> Result<usize> {
        require!(amount > 0, StakingError::ZeroAmount);
        require!(
            self.positions.len() < MAX_POSITIONS,
            StakingError::PositionLimitReached
        );

        let unlocks_at = now
            .checked_add(tier.lock_duration)
            .ok_or(StakingError::MathOverflow)?;
        let mut position = Position {
            amount,
            opened_at: now,
            unlocks_at,
            last_settled_at: now,
            reward_debt: 0,
        };
        position.reward_debt = position.accumulated(acc_per_share)?;

        self.positions.push(position);
        Ok(self.positions.len() - 1)
    }

    pub fn get_open(&self, index: usize) -> Result<&Position> {
        let position = self
            .positions
            .get(index)
            .ok_or(error!(StakingError::InvalidPositionIndex))?;
        require!(position.is_open(), StakingError::PositionClosed);
        Ok(position)
    }

    pub fn get_open_mut(&mut self, index: usize) -> Result<&mut Position> {
        let position = self
            .positions
            .get_mut(index)
            .ok_or(error!(StakingError::InvalidPositionIndex))?;
        require!(position.is_open(), StakingError::PositionClosed);
        Ok(position)
    }

    /// Projected reward for one position as of `now`. Pure read: neither the
    /// pool nor the position is mutated.
    pub fn pending_reward(&self, pool: &StakePool, index: usize, now: i64) -> Result<u64> {
        let position = self.get_open(index)?;
        let acc = pool.projected_acc_per_share(now)?;
        let multiplier = pool.resolve_multiplier_bps(position.lock_duration());
        position.pending_reward(acc, multiplier)
    }

    /// Settles every open position against the refreshed pool accumulator
    /// and returns the summed harvest.
    pub fn settle_all(&mut self, pool: &StakePool, now: i64) -> Result<u64> {
        let mut total: u64 = 0;
        for position in self.positions.iter_mut().filter(|p| p.is_open()) {
            let multiplier = pool.resolve_multiplier_bps(position.lock_duration());
            let reward = position.settle(pool.acc_reward_per_share, multiplier, now)?;
            total = total
                .checked_add(reward)
                .ok_or(StakingError::MathOverflow)?;
        }
        Ok(total)
    }

    /// Tombstones the slot and returns its principal. Called exactly once
    /// per position, at withdrawal or early-exit; the caller decrements the
    /// pool's total stake by the returned amount.
    pub fn close(&mut self, index: usize) -> Result<u64> {
        let position = self.get_open_mut(index)?;
        let amount = position.amount;
        *position = Position::default();
        Ok(amount)
    }

    /// Sum of open positions' principal for this account.
    pub fn staked_total(&self) -> u64 {
        self.positions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.amount)
            .sum()
    }

    pub fn open_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_open()).count()
    }

    /// Total slots ever assigned, tombstones included.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;

    fn pool(reward_rate: u64) -> StakePool {
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
            staking_cap: u64::MAX,
            total_rewards_paid: 0,
            total_fees_collected: 0,
            paused: false,
            created_at: 0,
            vault_bump: 0,
            treasury_bump: 0,
            bump: 0,
        }
    }

    fn ledger() -> UserPositions {
        UserPositions {
            owner: Pubkey::default(),
            stake_pool: Pubkey::default(),
            positions: Vec::new(),
            total_rewards_claimed: 0,
            bump: 0,
        }
    }

    fn tier(lock_duration: i64, multiplier_bps: u64) -> Tier {
        Tier {
            lock_duration,
            multiplier_bps,
        }
    }

    // Mirrors the deposit handler's bookkeeping: refresh, open, grow the
    // pool total.
    fn deposit(
        pool: &mut StakePool,
        ledger: &mut UserPositions,
        amount: u64,
        t: &Tier,
        now: i64,
    ) -> usize {
        pool.refresh(now).unwrap();
        let index = ledger.open(amount, t, pool.acc_reward_per_share, now).unwrap();
        pool.total_staked = pool.total_staked.checked_add(amount).unwrap();
        index
    }

    #[test]
    fn freshly_opened_position_has_zero_pending() {
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 10_000);

        // pre-existing stake so the accumulator is non-zero when we join
        p.total_staked = 500;
        p.refresh(1_000).unwrap();
        assert!(p.acc_reward_per_share > 0);

        let index = deposit(&mut p, &mut l, 1_000, &t, 1_000);
        assert_eq!(l.pending_reward(&p, index, 1_000).unwrap(), 0);
    }

    #[test]
    fn sole_staker_earns_rate_times_elapsed() {
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 10_000);

        let index = deposit(&mut p, &mut l, 1_000, &t, 0);
        // one position holds the entire pool: reward is rate * time,
        // independent of the staked amount
        assert_eq!(l.pending_reward(&p, index, 100).unwrap(), 1_000);
    }

    #[test]
    fn settle_is_idempotent_at_the_same_instant() {
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 10_000);

        deposit(&mut p, &mut l, 1_000, &t, 0);
        p.refresh(100).unwrap();

        let first = l.settle_all(&p, 100).unwrap();
        let second = l.settle_all(&p, 100).unwrap();
        assert_eq!(first, 1_000);
        assert_eq!(second, 0);
    }

    #[test]
    fn repeated_settlement_matches_single_settlement() {
        // ten 10-second harvests and one 100-second harvest must agree:
        // the debt reset is re-derived, not incremented
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 10_000);
        deposit(&mut p, &mut l, 1_000, &t, 0);

        let mut harvested: u64 = 0;
        for step in 1..=10 {
            p.refresh(step * 10).unwrap();
            harvested += l.settle_all(&p, step * 10).unwrap();
        }

        let mut p2 = pool(10);
        let mut l2 = ledger();
        deposit(&mut p2, &mut l2, 1_000, &t, 0);
        p2.refresh(100).unwrap();
        let single = l2.settle_all(&p2, 100).unwrap();

        assert_eq!(harvested, single);
        assert_eq!(harvested, 1_000);
    }

    #[test]
    fn equal_positions_earn_in_multiplier_ratio() {
        let mut p = pool(100);
        let mut l = ledger();
        let t1 = tier(DAY, 10_000);
        let t2 = tier(30 * DAY, 20_000);
        p.add_tier(t1.lock_duration, t1.multiplier_bps).unwrap();
        p.add_tier(t2.lock_duration, t2.multiplier_bps).unwrap();

        let a = deposit(&mut p, &mut l, 5_000, &t1, 0);
        let b = deposit(&mut p, &mut l, 5_000, &t2, 0);

        let pending_a = l.pending_reward(&p, a, 1_000).unwrap();
        let pending_b = l.pending_reward(&p, b, 1_000).unwrap();
        assert_eq!(pending_b, pending_a * 2);
    }

    #[test]
    fn multiplier_scales_unharvested_and_harvested_alike() {
        // the multiplier applies to the net accumulator delta, so a harvest
        // midway changes nothing about the total
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 15_000);
        p.add_tier(t.lock_duration, t.multiplier_bps).unwrap();

        deposit(&mut p, &mut l, 1_000, &t, 0);
        p.refresh(40).unwrap();
        let first = l.settle_all(&p, 40).unwrap();
        p.refresh(100).unwrap();
        let second = l.settle_all(&p, 100).unwrap();

        // 100s * 10/s * 1.5x = 1500, split across the two harvests
        assert_eq!(first + second, 1_500);
    }

    #[test]
    fn late_joiner_owes_nothing_for_earlier_accrual() {
        let mut p = pool(10);
        let mut l_early = ledger();
        let mut l_late = ledger();
        let t = tier(DAY, 10_000);

        deposit(&mut p, &mut l_early, 1_000, &t, 0);
        // 100s alone: early staker accrues 1000 before the late one joins
        let late_index = deposit(&mut p, &mut l_late, 1_000, &t, 100);
        assert_eq!(l_late.pending_reward(&p, late_index, 100).unwrap(), 0);

        // the next 100s are split evenly between the two equal positions
        assert_eq!(l_early.pending_reward(&p, 0, 200).unwrap(), 1_500);
        assert_eq!(l_late.pending_reward(&p, late_index, 200).unwrap(), 500);
    }

    #[test]
    fn total_staked_always_equals_sum_of_open_positions() {
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 10_000);

        let a = deposit(&mut p, &mut l, 1_000, &t, 0);
        let b = deposit(&mut p, &mut l, 2_500, &t, 10);
        deposit(&mut p, &mut l, 400, &t, 20);
        assert_eq!(p.total_staked, l.staked_total());
        assert_eq!(p.total_staked, 3_900);

        // withdrawal path: refresh, settle, close, shrink the pool total
        p.refresh(30).unwrap();
        l.settle_all(&p, 30).unwrap();
        let closed = l.close(b).unwrap();
        p.total_staked -= closed;
        assert_eq!(p.total_staked, l.staked_total());
        assert_eq!(p.total_staked, 1_400);

        // early-exit path: close without settling
        p.refresh(40).unwrap();
        let closed = l.close(a).unwrap();
        p.total_staked -= closed;
        assert_eq!(p.total_staked, l.staked_total());
        assert_eq!(p.total_staked, 400);
    }

    #[test]
    fn closing_leaves_a_stable_tombstone() {
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(DAY, 10_000);

        let a = deposit(&mut p, &mut l, 100, &t, 0);
        let b = deposit(&mut p, &mut l, 200, &t, 0);
        let c = deposit(&mut p, &mut l, 300, &t, 0);

        assert_eq!(l.close(b).unwrap(), 200);

        // deletion does not compact: index c still resolves to its position
        assert_eq!(l.get_open(c).unwrap().amount, 300);
        assert_eq!(l.get_open(a).unwrap().amount, 100);
        assert_eq!(l.position_count(), 3);
        assert_eq!(l.open_count(), 2);

        // the closed slot reads as closed, not out-of-range
        let err = l.get_open(b).unwrap_err();
        assert_eq!(err, error!(StakingError::PositionClosed));
        let err = l.close(b).unwrap_err();
        assert_eq!(err, error!(StakingError::PositionClosed));
        let err = l.get_open(99).unwrap_err();
        assert_eq!(err, error!(StakingError::InvalidPositionIndex));

        // a new deposit appends after the tombstone rather than filling it
        let d = deposit(&mut p, &mut l, 50, &t, 10);
        assert_eq!(d, 3);
        assert_eq!(l.position_count(), 4);
    }

    #[test]
    fn position_slots_are_bounded() {
        let mut p = pool(0);
        let mut l = ledger();
        let t = tier(DAY, 10_000);

        for i in 0..MAX_POSITIONS {
            deposit(&mut p, &mut l, 1 + i as u64, &t, 0);
        }
        let err = l.open(1, &t, 0, 0).unwrap_err();
        assert_eq!(err, error!(StakingError::PositionLimitReached));
    }

    #[test]
    fn zero_amount_position_is_rejected() {
        let mut l = ledger();
        let t = tier(DAY, 10_000);
        let err = l.open(0, &t, 0, 0).unwrap_err();
        assert_eq!(err, error!(StakingError::ZeroAmount));
    }

    #[test]
    fn settlement_clamps_last_settled_to_unlock_time() {
        let mut p = pool(10);
        let mut l = ledger();
        let t = tier(100, 10_000);

        let index = deposit(&mut p, &mut l, 1_000, &t, 0);

        p.refresh(60).unwrap();
        l.settle_all(&p, 60).unwrap();
        assert_eq!(l.positions[index].last_settled_at, 60);

        // past unlock the clamp holds, but accrual itself keeps running
        p.refresh(250).unwrap();
        let late = l.settle_all(&p, 250).unwrap();
        assert_eq!(l.positions[index].last_settled_at, 100);
        assert_eq!(late, 1_900);
    }
}
