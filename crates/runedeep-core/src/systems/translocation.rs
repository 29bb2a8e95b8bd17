//! Level changes, teleports, banishment and landing.

use log::info;
use runedeep_logic::actor::{Actor, DeathCause, RingKind};
use runedeep_logic::constants::spawning::PLACEMENT_ATTEMPTS;
use runedeep_logic::constants::teleport::{ABYSS_DRIFT_ODDS, CHECK_ODDS};
use runedeep_logic::dice::Dice;
use runedeep_logic::level::{Branch, LevelInfo, LevelKind};
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::{Coord, Offset};

use crate::error::EngineError;
use crate::grid::Terrain;
use crate::ports::{Arrival, DungeonBuilder, LevelRequest};
use crate::world::GameWorld;

/// Teleportitis strength: 8 per ring of teleportation, 3 per mutation level.
pub fn teleport_chance(actor: &Actor) -> u32 {
    8 * actor.equipment.ring_count(RingKind::Teleportation) + 3 * actor.mutations.teleportitis as u32
}

/// Build and enter a new level.
pub fn change_level(
    world: &mut GameWorld,
    builder: &mut dyn DungeonBuilder,
    request: LevelRequest,
) -> Result<(), EngineError> {
    let layout = builder.build(&request, &mut world.rng)?;
    world.install_layout(layout, request.level);
    world.actor.stop_running();
    world.actor.delay = None;
    world.actor.pending_autopickup = false;
    world.actor.redraw.status = true;
    Ok(())
}

/// Finish a stair climb.
pub fn take_stairs(world: &mut GameWorld, builder: &mut dyn DungeonBuilder, up: bool) -> Result<(), EngineError> {
    let current = world.level;
    let (depth, arrival) = if up {
        (current.depth.saturating_sub(1).max(1), Arrival::Ascended)
    } else {
        (current.depth + 1, Arrival::Descended)
    };
    let level = LevelInfo {
        kind: LevelKind::Dungeon,
        branch: current.branch,
        depth,
    };
    if up {
        world.say(Channel::Plain, "You climb upwards.");
    } else {
        world.say(Channel::Plain, "You climb downwards.");
    }
    change_level(world, builder, LevelRequest { level, arrival })
}

/// Send a banished actor to the Abyss. Already being there is enough.
pub fn check_banished(world: &mut GameWorld, builder: &mut dyn DungeonBuilder) -> Result<(), EngineError> {
    if !world.actor.banished {
        return Ok(());
    }
    world.actor.banished = false;
    if world.level.kind == LevelKind::Abyss {
        return Ok(());
    }
    world.say(Channel::Danger, "You are cast into the Abyss!");
    info!("banished from depth {}", world.level.depth);
    let level = LevelInfo {
        kind: LevelKind::Abyss,
        branch: Branch::Main,
        depth: world.level.depth,
    };
    change_level(
        world,
        builder,
        LevelRequest {
            level,
            arrival: Arrival::Anywhere,
        },
    )
}

/// Random teleportitis, and the Abyss shifting under the actor's feet.
pub fn teleport_roll(world: &mut GameWorld, builder: &mut dyn DungeonBuilder) -> Result<(), EngineError> {
    if !world.rng.one_chance_in(CHECK_ODDS) {
        return Ok(());
    }
    let chance = teleport_chance(&world.actor);
    if chance > 0 && world.rng.one_chance_in((100 / chance).max(1)) {
        teleport_player(world, false, builder)
    } else if world.level.kind == LevelKind::Abyss && world.rng.one_chance_in(ABYSS_DRIFT_ODDS) {
        world.say(Channel::Plain, "You are suddenly pulled into a different region of the Abyss!");
        new_abyss_area(world, builder)
    } else {
        Ok(())
    }
}

/// Teleport within the level, or (in the Abyss) to a fresh area of it.
pub fn teleport_player(
    world: &mut GameWorld,
    new_area: bool,
    builder: &mut dyn DungeonBuilder,
) -> Result<(), EngineError> {
    if new_area && world.level.kind == LevelKind::Abyss {
        world.say(Channel::Plain, "You are suddenly pulled into a different region of the Abyss!");
        return new_abyss_area(world, builder);
    }
    world.say(Channel::Plain, "Your surroundings suddenly seem different!");
    teleport_in_level(world);
    Ok(())
}

fn new_abyss_area(world: &mut GameWorld, builder: &mut dyn DungeonBuilder) -> Result<(), EngineError> {
    let request = LevelRequest {
        level: world.level,
        arrival: Arrival::Anywhere,
    };
    change_level(world, builder, request)
}

/// Move the actor to a random safe square. Stays put if none turns up.
pub fn teleport_in_level(world: &mut GameWorld) {
    let (width, height) = (world.grid.width() as u32, world.grid.height() as u32);
    for _ in 0..PLACEMENT_ATTEMPTS {
        let at = Coord::new(
            world.rng.below(width) as i32,
            world.rng.below(height) as i32,
        );
        let terrain = world.grid.terrain(at);
        if world.is_free(at) && !terrain.is_hazardous() && at != world.actor.pos {
            world.actor.pos = at;
            world.actor.stop_running();
            world.grid.update_visibility(at);
            return;
        }
    }
}

/// Levitation ran out: deal with whatever is underfoot.
pub fn land(world: &mut GameWorld) {
    if world.grid.terrain(world.actor.pos).is_hazardous() && !world.actor.is_levitating() {
        fall_into_hazard(world);
    }
}

/// The actor is standing in deep water or lava without support.
pub fn fall_into_hazard(world: &mut GameWorld) {
    match world.grid.terrain(world.actor.pos) {
        Terrain::Lava => {
            world.say(Channel::Danger, "You fall into the lava!");
            if world.actor.res_fire() < 3 {
                world.actor.hurt(world.actor.hp.max(1), DeathCause::Burning);
            }
        }
        Terrain::DeepWater => {
            world.say(Channel::Danger, "You fall into the water!");
            let here = world.actor.pos;
            let escape = Offset::neighbourhood()
                .map(|o| here.offset(o))
                .find(|c| *c != here && world.is_free(*c) && !world.grid.terrain(*c).is_hazardous());
            match escape {
                Some(at) => {
                    world.say(Channel::Plain, "You manage to scramble free!");
                    world.actor.pos = at;
                }
                None => {
                    world.say(Channel::Danger, "You drown...");
                    world.actor.hurt(world.actor.hp.max(1), DeathCause::Drowning);
                }
            }
        }
        _ => {}
    }
    world.actor.stop_running();
}
