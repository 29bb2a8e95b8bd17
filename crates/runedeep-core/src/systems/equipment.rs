//! Per-turn effects of wielded items with a will of their own.

use runedeep_logic::actor::SpecialWield;
use runedeep_logic::dice::Dice;
use runedeep_logic::messages::Channel;

use crate::world::GameWorld;

const SHRIEK_ODDS: u32 = 20;
const SHRIEK_LOUDNESS: i32 = 25;
const HUNGERING_DRAIN: i32 = 4;

pub fn special_wield(world: &mut GameWorld) {
    let Some(special) = world.actor.equipment.weapon.as_ref().and_then(|w| w.special) else {
        return;
    };
    match special {
        SpecialWield::Shrieking => {
            if world.rng.one_chance_in(SHRIEK_ODDS) {
                world.say(Channel::Sound, "You hear a shriek!");
                world.make_noise(world.actor.pos, SHRIEK_LOUDNESS);
            }
        }
        SpecialWield::Hungering => world.actor.make_hungry(HUNGERING_DRAIN),
    }
}
