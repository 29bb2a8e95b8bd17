//! Ambient wandering-monster arrivals.

use log::info;
use runedeep_logic::bestiary::MonsterDef;
use runedeep_logic::constants::spawning::{CLOSE_RANGE_SQ, PLACEMENT_ATTEMPTS, STAIRS_RANGE};
use runedeep_logic::dice::Dice;
use runedeep_logic::level::{ambient_spawn, Proximity};
use runedeep_logic::movement::Coord;

use crate::components::{Attitude, Behaviour};
use crate::ports::ContentTables;
use crate::world::GameWorld;

/// Roll for a wanderer and, if one is due, place it out of sight.
pub fn ambient_spawn_pass(world: &mut GameWorld, content: &dyn ContentTables) {
    let Some(request) = ambient_spawn(&world.level, world.phase, &mut world.rng) else {
        return;
    };
    let Some(kind) = content.wandering_monster(&world.level, request.demonic, &mut world.rng) else {
        return;
    };
    let def = content.monster(kind);
    let Some(at) = find_spawn_square(world, request.proximity, def) else {
        return;
    };
    if world
        .spawn_monster(kind, at, Attitude::Hostile, Behaviour::Wandering)
        .is_some()
    {
        info!("a wandering {} arrives at {:?} ({:?})", def.name, at, request.proximity);
    }
}

/// A random square that suits `def` and `proximity`, never in view.
pub fn find_spawn_square(world: &mut GameWorld, proximity: Proximity, def: &MonsterDef) -> Option<Coord> {
    let stairs = world.stairs();
    let (width, height) = (world.grid.width() as u32, world.grid.height() as u32);
    let origin = world.actor.pos;

    for _ in 0..PLACEMENT_ATTEMPTS {
        let at = Coord::new(world.rng.below(width) as i32, world.rng.below(height) as i32);
        if !world.is_free(at) || !world.can_stand(at, def) || world.grid.is_visible(at) {
            continue;
        }
        let fits = match proximity {
            Proximity::Anywhere => true,
            Proximity::CloseToPlayer => at.distance_squared(origin) <= CLOSE_RANGE_SQ,
            Proximity::AwayFromPlayer => at.distance_squared(origin) > CLOSE_RANGE_SQ,
            Proximity::NearStairs => stairs.iter().any(|s| s.chebyshev(at) <= STAIRS_RANGE),
        };
        if fits {
            return Some(at);
        }
    }
    None
}
