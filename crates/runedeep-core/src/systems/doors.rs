//! Opening and closing doors, and disarming traps next to the actor.

use runedeep_logic::constants::doors::CREAK_LOUDNESS;
use runedeep_logic::constants::hunger::SWING_COST;
use runedeep_logic::dice::Dice;
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::{confused_offset, Coord, Offset};
use runedeep_logic::stealth::door_noise_odds;

use crate::error::Rejection;
use crate::grid::Terrain;
use crate::turn::TurnState;
use crate::world::GameWorld;

use super::{attack_monster, Resolution};

fn aim(world: &mut GameWorld, requested: Offset, reroll_confusion: bool) -> Offset {
    if reroll_confusion && world.actor.is_confused() {
        confused_offset(requested, &mut world.rng)
    } else {
        requested
    }
}

/// Whether working this door makes enough noise to wake the neighbours.
fn door_creaks(world: &mut GameWorld) -> bool {
    let odds = door_noise_odds(&world.actor);
    !world.actor_silenced() && world.rng.one_chance_in(odds)
}

/// Open the door at `requested` from the actor.
///
/// A creature there is attacked instead and a known trap is disarmed.
/// `reroll_confusion` is false when the step was already scrambled.
pub fn open_door(
    world: &mut GameWorld,
    turn: &mut TurnState,
    requested: Offset,
    reroll_confusion: bool,
) -> Resolution {
    let offset = aim(world, requested, reroll_confusion);
    let target = world.actor.pos.offset(offset);

    if !offset.is_zero() {
        if let Some(entity) = world.grid.monster_at(target) {
            if !world.is_submerged(entity) {
                attack_monster(world, turn, entity);
                return Resolution::Consumed;
            }
        }
    }

    if world.grid.trap_at(target).is_some_and(|t| t.known) {
        return disarm_trap(world, target);
    }

    match world.grid.terrain(target) {
        Terrain::ClosedDoor => {
            if door_creaks(world) {
                world.say(Channel::Sound, "As you open the door, it creaks loudly!");
                world.make_noise(target, CREAK_LOUDNESS);
            } else if world.actor.is_levitating() {
                world.say(Channel::Plain, "You reach down and open the door.");
            } else {
                world.say(Channel::Plain, "You open the door.");
            }
            world.grid.set_terrain(target, Terrain::OpenDoor);
            world.actor.stop_running();
            Resolution::Consumed
        }
        Terrain::OpenDoor => Resolution::Rejected(Rejection::AlreadyOpen),
        _ => {
            world.say(Channel::Plain, "You swing at nothing.");
            world.actor.make_hungry(SWING_COST);
            Resolution::Consumed
        }
    }
}

pub fn close_door(world: &mut GameWorld, _turn: &mut TurnState, requested: Offset) -> Resolution {
    let offset = aim(world, requested, true);
    if offset.is_zero() {
        return Resolution::Rejected(Rejection::CloseOnSelf);
    }
    let target = world.actor.pos.offset(offset);

    if world.grid.terrain(target) != Terrain::OpenDoor {
        return Resolution::Rejected(Rejection::NothingToClose);
    }
    if world.grid.monster_at(target).is_some() {
        return Resolution::Rejected(Rejection::CreatureInDoorway);
    }
    if world.grid.items_at(target).is_some() {
        return Resolution::Rejected(Rejection::DoorwayBlocked);
    }

    if door_creaks(world) {
        world.say(Channel::Sound, "As you close the door, it creaks loudly!");
        world.make_noise(target, CREAK_LOUDNESS);
    } else if world.actor.is_levitating() {
        world.say(Channel::Plain, "You reach down and close the door.");
    } else {
        world.say(Channel::Plain, "You close the door.");
    }
    world.grid.set_terrain(target, Terrain::ClosedDoor);
    Resolution::Consumed
}

/// Try to take apart the trap at `at`. Skill is rolled against depth.
pub fn disarm_trap(world: &mut GameWorld, at: Coord) -> Resolution {
    if world.grid.cloud_at(at).is_some() {
        return Resolution::Rejected(Rejection::TrapUnreachable);
    }

    let skill = world.rng.below(world.actor.skills.traps_doors as u32 + 2);
    let difficulty = world.rng.below(world.level.depth + 5);
    if skill <= difficulty {
        world.say(Channel::Plain, "You failed to disarm the trap.");
    } else {
        world.say(Channel::Plain, "You have disarmed the trap.");
        if let Some(cell) = world.grid.cell_mut(at) {
            cell.trap = None;
        }
    }
    world.actor.stop_running();
    Resolution::Consumed
}
