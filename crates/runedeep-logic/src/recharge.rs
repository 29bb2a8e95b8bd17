//! Passive rod recharging.

use crate::actor::Actor;
use crate::constants::rods::{CHARGE_MULT, OFF_HAND_ODDS};
use crate::constants::time::BASE_ACTION_COST;
use crate::dice::Dice;
use crate::items::ItemKind;

/// Recharge one rod per turn: the wielded rod if it is not full, otherwise
/// (one time in three) a random carried rod. Costs nothing if the actor has no
/// MP to spare. The charge gained scales with the turn's cost. Returns the
/// inventory slot that gained charge.
pub fn recharge_rods(actor: &mut Actor, time_taken: u32, dice: &mut dyn Dice) -> Option<usize> {
    if actor.mp < 1 {
        return None;
    }

    let wielded = actor.equipment.wielded_rod.filter(|slot| rod_needs_charge(actor, *slot));
    let slot = match wielded {
        Some(slot) => slot,
        None => {
            if !dice.one_chance_in(OFF_HAND_ODDS) {
                return None;
            }
            let candidates: Vec<usize> = (0..actor.inventory.len())
                .filter(|slot| Some(*slot) != actor.equipment.wielded_rod)
                .filter(|slot| rod_needs_charge(actor, *slot))
                .collect();
            if candidates.is_empty() {
                return None;
            }
            candidates[dice.below(candidates.len() as u32) as usize]
        }
    };

    let rate = recharge_rate(actor, Some(slot) == actor.equipment.wielded_rod, time_taken, dice);
    if let Some(ItemKind::Rod(rod)) = actor.inventory.get_mut(slot).map(|i| &mut i.kind) {
        let full = rod.max_charges * CHARGE_MULT;
        rod.charge = (rod.charge + rate).min(full);
        return Some(slot);
    }
    None
}

fn rod_needs_charge(actor: &Actor, slot: usize) -> bool {
    matches!(actor.inventory.get(slot).map(|i| &i.kind), Some(ItemKind::Rod(rod)) if !rod.is_full())
}

/// Charge gained this turn, in hundredths of a charge.
fn recharge_rate(actor: &Actor, wielded: bool, time_taken: u32, dice: &mut dyn Dice) -> u32 {
    let mut rate = 4 + actor.skills.evocations as u32;
    rate = dice.div_rand_round(rate * time_taken, BASE_ACTION_COST).max(1);
    if wielded && actor.equipment.shield {
        rate /= 2;
    }
    rate.max(1)
}
