//! Nutrition drain and starvation.

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, DeathCause, RingKind};
use crate::constants::hunger::{
    BASE_RATE, FAINTING, FAINT_CAP, FAINT_ODDS, FULL, HUNGRY, MIN_FOR_DRAIN, STARVED, STARVING,
};
use crate::constants::time::BASE_ACTION_COST;
use crate::dice::Dice;
use crate::duration::DurationKind;
use crate::messages::{Channel, MessageSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HungerState {
    Starving,
    Hungry,
    Satiated,
    Full,
}

impl HungerState {
    pub fn of(hunger: i32) -> Self {
        if hunger < STARVING {
            HungerState::Starving
        } else if hunger < HUNGRY {
            HungerState::Hungry
        } else if hunger < FULL {
            HungerState::Satiated
        } else {
            HungerState::Full
        }
    }
}

/// Nutrition used per normal-speed turn.
pub fn hunger_rate(actor: &Actor) -> u32 {
    if actor.is_undead() {
        return 0;
    }
    let mut rate = BASE_RATE;
    if actor.has(DurationKind::Regeneration) {
        rate += 4;
    }
    rate += 2 * actor.equipment.ring_count(RingKind::Regeneration);
    rate += actor.mutations.regeneration as u32;
    rate
}

/// Drain nutrition for one turn of `time_taken`. Returns the amount used.
pub fn apply_food_use(actor: &mut Actor, time_taken: u32) -> i32 {
    let food_use = (hunger_rate(actor) * time_taken / BASE_ACTION_COST) as i32;
    if food_use > 0 && actor.hunger >= MIN_FOR_DRAIN {
        actor.make_hungry(food_use);
        food_use
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarvationCheck {
    Fine,
    Fainted(u32),
    Starved,
}

/// End-of-turn starvation check for living actors.
pub fn check_starvation(
    actor: &mut Actor,
    dice: &mut dyn Dice,
    sink: &mut dyn MessageSink,
) -> StarvationCheck {
    if actor.is_undead() || actor.hunger > FAINTING {
        return StarvationCheck::Fine;
    }

    let mut outcome = StarvationCheck::Fine;
    if !actor.is_paralysed() && dice.one_chance_in(FAINT_ODDS) {
        sink.emit(Channel::Danger, "You lose consciousness!");
        let paralysis = (actor.status.paralysis + 5 + dice.below(8)).min(FAINT_CAP);
        actor.status.paralysis = paralysis;
        actor.redraw.status = true;
        outcome = StarvationCheck::Fainted(paralysis);
    }

    if actor.hunger <= STARVED {
        sink.emit(Channel::Danger, "You have starved to death.");
        actor.hurt(actor.hp.max(1), DeathCause::Starvation);
        outcome = StarvationCheck::Starved;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::dice::ScriptedDice;
    use crate::messages::Message;

    #[test]
    fn states_by_threshold() {
        assert_eq!(HungerState::of(0), HungerState::Starving);
        assert_eq!(HungerState::of(STARVING), HungerState::Hungry);
        assert_eq!(HungerState::of(HUNGRY), HungerState::Satiated);
        assert_eq!(HungerState::of(FULL + 1), HungerState::Full);
    }

    #[test]
    fn food_use_scales_with_time() {
        let mut actor = Actor::new("Tess", Species::Human);
        let start = actor.hunger;
        assert_eq!(apply_food_use(&mut actor, 20), 6);
        assert_eq!(actor.hunger, start - 6);
    }

    #[test]
    fn no_drain_below_floor() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hunger = MIN_FOR_DRAIN - 1;
        assert_eq!(apply_food_use(&mut actor, 10), 0);
        assert_eq!(actor.hunger, MIN_FOR_DRAIN - 1);
    }

    #[test]
    fn fainting_caps_paralysis() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hunger = FAINTING;
        let mut dice = ScriptedDice::sequence([0, 7], 0);
        let mut out: Vec<Message> = Vec::new();
        let result = check_starvation(&mut actor, &mut dice, &mut out);
        assert_eq!(result, StarvationCheck::Fainted(12));
        assert_eq!(out[0].text, "You lose consciousness!");
        assert!(actor.status.paralysis <= FAINT_CAP);

        // Already unconscious: no second faint.
        let mut dice = ScriptedDice::repeat(0);
        assert_eq!(check_starvation(&mut actor, &mut dice, &mut out), StarvationCheck::Fine);
        assert_eq!(actor.status.paralysis, 12);
    }

    #[test]
    fn starvation_kills() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hunger = STARVED;
        let mut dice = ScriptedDice::repeat(u32::MAX);
        let mut out: Vec<Message> = Vec::new();
        assert_eq!(check_starvation(&mut actor, &mut dice, &mut out), StarvationCheck::Starved);
        assert_eq!(actor.killed_by, Some(DeathCause::Starvation));
    }

    #[test]
    fn undead_never_starve() {
        let mut actor = Actor::new("Bones", Species::Ghoul);
        actor.hunger = 0;
        let mut dice = ScriptedDice::repeat(0);
        let mut out: Vec<Message> = Vec::new();
        assert_eq!(check_starvation(&mut actor, &mut dice, &mut out), StarvationCheck::Fine);
        assert!(out.is_empty());
    }
}
