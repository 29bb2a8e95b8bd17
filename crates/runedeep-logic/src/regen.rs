//! Fractional regeneration.
//!
//! Each resource keeps a remainder in `0..REGEN_UNIT`. Every turn a rate is
//! added and each full unit becomes one point of the resource; the rest
//! carries over, so nothing is lost to rounding.

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, RingKind, Species};
use crate::constants::regen::{
    DURATION_BONUS, MP_BASE_RATE, MUTATION_BONUS, REGEN_UNIT, RING_BONUS,
};
use crate::duration::DurationKind;
use crate::error::InvariantViolation;
use crate::hunger::HungerState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    remainder: u32,
}

impl Accumulator {
    pub fn with_remainder(remainder: u32) -> Result<Self, InvariantViolation> {
        if remainder >= REGEN_UNIT {
            return Err(InvariantViolation::RegenRemainder(remainder));
        }
        Ok(Self { remainder })
    }

    pub fn remainder(&self) -> u32 {
        self.remainder
    }

    /// Add `rate` points and return how many whole units were completed.
    pub fn accrue(&mut self, rate: u32) -> Result<u32, InvariantViolation> {
        if self.remainder >= REGEN_UNIT {
            return Err(InvariantViolation::RegenRemainder(self.remainder));
        }
        let total = self.remainder as u64 + rate as u64;
        let units = total / REGEN_UNIT as u64;
        self.remainder = (total % REGEN_UNIT as u64) as u32;
        Ok(units as u32)
    }
}

/// Hit point regeneration per turn, in hundredths of a point.
pub fn hp_regen_rate(actor: &Actor) -> u32 {
    let mut rate = (actor.hp_max / 3).max(0) as u32;
    if rate > 20 {
        rate = 20 + (rate - 20) / 2;
    }

    rate += RING_BONUS * actor.equipment.ring_count(RingKind::Regeneration);
    rate += MUTATION_BONUS * actor.mutations.regeneration as u32;
    if actor.species == Species::Troll {
        rate += RING_BONUS;
    }
    if actor.has(DurationKind::Regeneration) {
        rate += DURATION_BONUS;
    }

    if !actor.is_undead() && HungerState::of(actor.hunger) <= HungerState::Hungry {
        rate /= 2;
    }
    rate.max(1)
}

pub fn mp_regen_rate(actor: &Actor) -> u32 {
    MP_BASE_RATE + (actor.mp_max.max(0) as u32) / 2
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegenReport {
    pub hp_gained: u32,
    pub mp_gained: u32,
}

/// Advance both accumulators by one turn.
///
/// HP only accrues while below maximum and neither diseased nor at death's
/// door. MP only accrues while below maximum.
pub fn regenerate(actor: &mut Actor) -> Result<RegenReport, InvariantViolation> {
    let mut report = RegenReport::default();

    let hp_rate = if actor.hp < actor.hp_max
        && actor.status.disease == 0
        && actor.status.deaths_door == 0
    {
        hp_regen_rate(actor)
    } else {
        0
    };
    report.hp_gained = actor.hp_regen.accrue(hp_rate)?;
    actor.heal(report.hp_gained as i32);

    let mp_rate = if actor.mp < actor.mp_max {
        mp_regen_rate(actor)
    } else {
        0
    };
    report.mp_gained = actor.mp_regen.accrue(mp_rate)?;
    actor.restore_mp(report.mp_gained as i32);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::constants::hunger;
    use proptest::prelude::*;

    #[test]
    fn accumulator_carries_remainder() {
        let mut acc = Accumulator::default();
        assert_eq!(acc.accrue(60).unwrap(), 0);
        assert_eq!(acc.accrue(60).unwrap(), 1);
        assert_eq!(acc.remainder(), 20);
        assert_eq!(acc.accrue(250).unwrap(), 2);
        assert_eq!(acc.remainder(), 70);
    }

    #[test]
    fn out_of_range_remainder_is_rejected() {
        assert_eq!(
            Accumulator::with_remainder(100),
            Err(InvariantViolation::RegenRemainder(100))
        );
        assert!(Accumulator::with_remainder(99).is_ok());
    }

    #[test]
    fn hp_rate_scales_with_max_hp_and_bonuses() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hp_max = 90;
        assert_eq!(hp_regen_rate(&actor), 25);
        actor.equipment.rings.push(RingKind::Regeneration);
        assert_eq!(hp_regen_rate(&actor), 65);
        actor.durations.set(DurationKind::Regeneration, 5);
        assert_eq!(hp_regen_rate(&actor), 165);
    }

    #[test]
    fn hunger_halves_hp_rate() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hp_max = 60;
        assert_eq!(hp_regen_rate(&actor), 20);
        actor.hunger = hunger::HUNGRY - 1;
        assert_eq!(hp_regen_rate(&actor), 10);
    }

    #[test]
    fn disease_blocks_hp_but_not_mp() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hp = 1;
        actor.mp = 0;
        actor.status.disease = 50;
        for _ in 0..40 {
            regenerate(&mut actor).unwrap();
        }
        assert_eq!(actor.hp, 1);
        assert_eq!(actor.hp_regen.remainder(), 0);
        assert!(actor.mp > 0);
    }

    #[test]
    fn full_pools_do_not_accrue() {
        let mut actor = Actor::new("Tess", Species::Human);
        let report = regenerate(&mut actor).unwrap();
        assert_eq!(report, RegenReport::default());
        assert_eq!(actor.hp_regen.remainder(), 0);
        assert_eq!(actor.mp_regen.remainder(), 0);
    }

    #[test]
    fn mp_rate_from_max_mp() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.mp_max = 12;
        assert_eq!(mp_regen_rate(&actor), 13);
    }

    proptest! {
        #[test]
        fn accrual_matches_closed_form(r0 in 0u32..100, rate in 0u32..1000, turns in 0u32..300) {
            let mut acc = Accumulator::with_remainder(r0).unwrap();
            let mut granted = 0u64;
            for _ in 0..turns {
                granted += acc.accrue(rate).unwrap() as u64;
                prop_assert!(acc.remainder() < REGEN_UNIT);
            }
            let total = r0 as u64 + rate as u64 * turns as u64;
            prop_assert_eq!(granted, total / REGEN_UNIT as u64);
            prop_assert_eq!(acc.remainder() as u64, total % REGEN_UNIT as u64);
        }
    }
}
