//! Stealth rating and door noise.

use crate::actor::{Actor, BurdenState, RingKind, Species};
use crate::duration::DurationKind;

/// How quietly the actor moves. Recomputed every turn; monsters read it.
pub fn compute_stealth(actor: &Actor) -> u32 {
    if actor.is_berserk() {
        return 0;
    }

    let mut stealth = actor.stats.dexterity.max(0) as u32 * 3;
    if actor.skills.stealth > 0 {
        let per_level = if actor.species == Species::Elf { 20 } else { 15 };
        stealth += actor.skills.stealth as u32 * per_level;
    }

    match actor.burden {
        BurdenState::Unencumbered => {}
        BurdenState::Encumbered => stealth /= 2,
        BurdenState::Overloaded => stealth /= 5,
    }

    if actor.is_confused() {
        stealth /= 3;
    }

    stealth += 50 * actor.equipment.ring_count(RingKind::Stealth);
    if actor.has(DurationKind::Levitation) {
        stealth += 10;
    }
    stealth
}

/// Denominator of the "door creaks" roll. Clumsy, unskilled actors creak
/// every time.
pub fn door_noise_odds(actor: &Actor) -> u32 {
    let dex = actor.stats.dexterity.max(0) as u32;
    dex + (actor.skills.traps_doors as u32 + actor.skills.stealth as u32) / 2
}
