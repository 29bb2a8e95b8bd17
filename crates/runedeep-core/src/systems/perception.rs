//! Searching, sight, noise and interrupts.

use runedeep_logic::constants::perception::{
    ACUTE_VISION_AUTOSEARCH, HP_WARNING_PERCENT, PASSIVE_SEARCH_ODDS, SEARCH_DIE,
};
use runedeep_logic::dice::Dice;
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::Offset;

use crate::grid::Terrain;
use crate::turn::TurnState;
use crate::world::GameWorld;

use super::Resolution;

const SHOUT_LOUDNESS: i32 = 12;

/// Look for secret doors and hidden traps next to the actor.
pub fn search_around(world: &mut GameWorld) {
    let skill = world.actor.skills.traps_doors as u32;
    let here = world.actor.pos;
    for offset in Offset::neighbourhood().filter(|o| !o.is_zero()) {
        let at = here.offset(offset);
        if world.grid.terrain(at) == Terrain::SecretDoor && world.rng.below(SEARCH_DIE) <= skill + 1 {
            world.grid.set_terrain(at, Terrain::ClosedDoor);
            world.say(Channel::Plain, "You found a secret door!");
            world.actor.stop_running();
        }
        let hidden = world.grid.trap_at(at).is_some_and(|t| !t.known);
        if hidden && world.rng.below(SEARCH_DIE) <= skill + 1 {
            if let Some(trap) = world.grid.cell_mut(at).and_then(|c| c.trap.as_mut()) {
                trap.known = true;
            }
            world.say(Channel::Plain, "You found a trap!");
            world.actor.stop_running();
        }
    }
}

/// Searching without being asked. Acute vision always searches.
pub fn passive_search(world: &mut GameWorld) {
    let actor = &world.actor;
    if actor.is_paralysed() || actor.mutations.blurry_vision > 0 {
        return;
    }
    let skill = actor.skills.traps_doors as u32;
    let acute = actor.mutations.acute_vision >= ACUTE_VISION_AUTOSEARCH;
    if acute || world.rng.below(PASSIVE_SEARCH_ODDS) < skill {
        search_around(world);
    }
}

pub fn search_command(world: &mut GameWorld) -> Resolution {
    search_around(world);
    Resolution::Consumed
}

pub fn refresh_view(world: &mut GameWorld) {
    world.grid.update_visibility(world.actor.pos);
}

/// Break off runs and rests that should not carry on, and warn about HP
/// dropping into the danger zone.
pub fn check_interrupts(world: &mut GameWorld, turn: &TurnState) {
    let actor = &world.actor;
    let threshold = actor.hp_max * HP_WARNING_PERCENT / 100;
    if actor.hp <= threshold && turn.hp_at_start > threshold && !actor.is_dead() {
        world.say(Channel::Danger, "* * * LOW HITPOINT WARNING * * *");
        world.actor.stop_running();
    }

    let Some(running) = world.actor.running else {
        return;
    };
    if world.hostile_in_view() {
        world.actor.stop_running();
        return;
    }
    let actor = &world.actor;
    if running.is_resting() && running.until_healed && actor.hp >= actor.hp_max && actor.mp >= actor.mp_max {
        world.say(Channel::Recovery, "HP and MP restored.");
        world.actor.stop_running();
    }
}

pub fn shout(world: &mut GameWorld) -> Resolution {
    if world.actor_silenced() {
        world.say(Channel::Plain, "You are unable to make a sound!");
        return Resolution::Free;
    }
    world.say(Channel::Sound, "You shout for attention!");
    world.make_noise(world.actor.pos, SHOUT_LOUDNESS);
    Resolution::Consumed
}
