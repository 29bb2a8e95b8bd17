//! Terrain features, clouds, the fire shield, and silence.

use hecs::Entity;
use runedeep_logic::actor::DeathCause;
use runedeep_logic::constants::clouds::{
    FIRE_SHIELD_DECAY, SPREAD_ODDS, SPREAD_THRESHOLD, WATER_DECAY_FACTOR,
};
use runedeep_logic::constants::perception::{LOS_RADIUS, SILENCE_FLAVOUR_ODDS};
use runedeep_logic::dice::Dice;
use runedeep_logic::duration::StatusKind;
use runedeep_logic::error::InvariantViolation;
use runedeep_logic::hazards::{cloud_exposure, CloudKind, HazardResists};
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::{Coord, Offset};

use crate::components::{Cloud, Position};
use crate::grid::Terrain;
use crate::world::GameWorld;

/// A terrain feature that now and then puffs out a cloud.
struct Vent {
    terrain: Terrain,
    odds: u32,
    cloud: CloudKind,
    density: i32,
}

const VENTS: [Vent; 2] = [
    Vent {
        terrain: Terrain::Lava,
        odds: 40,
        cloud: CloudKind::Steam,
        density: 8,
    },
    Vent {
        terrain: Terrain::DeepWater,
        odds: 200,
        cloud: CloudKind::Steam,
        density: 4,
    },
];

/// Run the feature table over every vent within sight range of the actor.
pub fn environment_effects(world: &mut GameWorld) {
    let origin = world.actor.pos;
    let reach = LOS_RADIUS * LOS_RADIUS;
    let vents: Vec<(Coord, &Vent)> = world
        .grid
        .coords()
        .filter(|at| at.distance_squared(origin) <= reach)
        .filter_map(|at| {
            let terrain = world.grid.terrain(at);
            VENTS.iter().find(|v| v.terrain == terrain).map(|v| (at, v))
        })
        .collect();

    for (at, vent) in vents {
        if world.rng.one_chance_in(vent.odds) {
            let density = vent.density + world.rng.below(vent.density as u32) as i32;
            world.place_cloud(vent.cloud, at, density);
        }
    }
}

/// Whatever cloud the actor stands in acts on them for `time_taken`.
pub fn cloud_contact(world: &mut GameWorld, time_taken: u32) -> Result<(), InvariantViolation> {
    let Some(cloud) = world.grid.cloud_at(world.actor.pos).and_then(|e| world.cloud(e)) else {
        return Ok(());
    };
    if !cloud.kind.is_harmful() {
        return Ok(());
    }

    let actor = &world.actor;
    let resists = HazardResists {
        fire: actor.res_fire(),
        cold: actor.res_cold(),
        poison: actor.res_poison(),
        undead: actor.is_undead(),
    };
    let exposure = cloud_exposure(cloud.kind, resists, time_taken, &mut world.rng);

    world.say(
        Channel::Danger,
        &format!("You are engulfed in {}!", cloud.kind.name()),
    );
    if exposure.resisted {
        world.say(Channel::Plain, "You resist.");
    }
    world
        .actor
        .hurt(exposure.damage as i32, DeathCause::Cloud(cloud.kind.name().to_string()));
    if exposure.poison > 0 {
        world.say(Channel::Danger, "You feel sick.");
        world.actor.status.extend(StatusKind::Poison, exposure.poison)?;
        world.actor.redraw.status = true;
    }
    if exposure.rot > 0 {
        world.actor.status.extend(StatusKind::Rot, exposure.rot)?;
        world.actor.redraw.status = true;
    }
    Ok(())
}

/// Age every cloud by `time_taken`. Fire dies fast over water; strong fire
/// and gas creep outwards.
pub fn manage_clouds(world: &mut GameWorld, time_taken: u32) {
    let clouds: Vec<(Entity, Coord, Cloud)> = world
        .entities
        .query::<(&Position, &Cloud)>()
        .iter()
        .map(|(e, (pos, cloud))| (e, pos.0, *cloud))
        .collect();

    for (entity, at, cloud) in clouds {
        let mut decay = time_taken as i32;
        if cloud.kind.quenched_by_water() && world.grid.terrain(at).is_water() {
            decay *= WATER_DECAY_FACTOR;
        }
        let mut density = cloud.density - decay;
        if density <= 0 {
            world.remove_cloud(entity);
            continue;
        }

        if cloud.kind.spreads() && density > SPREAD_THRESHOLD && world.rng.one_chance_in(SPREAD_ODDS) {
            let open: Vec<Coord> = Offset::neighbourhood()
                .filter(|o| !o.is_zero())
                .map(|o| at.offset(o))
                .filter(|c| !world.grid.is_solid(*c) && world.grid.cloud_at(*c).is_none())
                .collect();
            if !open.is_empty() {
                let to = open[world.rng.below(open.len() as u32) as usize];
                let share = density / 2;
                world.place_cloud(cloud.kind, to, share);
                density -= share;
            }
        }

        if let Ok(mut live) = world.entities.get::<&mut Cloud>(entity) {
            live.density = density;
        }
    }
}

/// Count the fire shield down, keeping a ring of flame around the actor.
pub fn fire_shield(world: &mut GameWorld) {
    if world.actor.fire_shield == 0 {
        return;
    }
    world.actor.fire_shield -= 1;
    if world.actor.fire_shield == 0 {
        world.say(Channel::Duration, "Your ring of flames gutters out.");
        return;
    }
    let here = world.actor.pos;
    for offset in Offset::neighbourhood().filter(|o| !o.is_zero()) {
        let at = here.offset(offset);
        if !world.grid.is_solid(at) && world.grid.cloud_at(at).is_none() {
            world.place_cloud(CloudKind::Fire, at, FIRE_SHIELD_DECAY);
        }
    }
}

/// Announce stepping into or out of silence.
pub fn silence_transition(world: &mut GameWorld) {
    let silenced = world.actor_silenced();
    if silenced == world.actor.was_silenced {
        return;
    }
    world.actor.was_silenced = silenced;
    if !silenced {
        world.say(Channel::Recovery, "Your hearing returns.");
    } else if world.rng.one_chance_in(SILENCE_FLAVOUR_ODDS) {
        world.say(Channel::Plain, "The dungeon seems quiet ... too quiet!");
    } else {
        world.say(Channel::Warning, "You are enveloped in profound silence.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::rng::GameRng;
    use proptest::prelude::*;
    use runedeep_logic::actor::{Actor, Species};
    use runedeep_logic::config::GameOptions;
    use runedeep_logic::duration::DurationKind;
    use runedeep_logic::level::LevelInfo;

    fn world(rows: &[&str]) -> GameWorld {
        let (grid, start) = Grid::from_rows(rows).unwrap();
        let mut actor = Actor::new("Tess", Species::Human);
        actor.pos = start;
        GameWorld::new(actor, grid, LevelInfo::dungeon(1), GameOptions::default(), GameRng::seeded(21))
    }

    // ── Clouds ──

    #[test]
    fn fire_cloud_burns_an_unresisting_actor() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.actor.hp = 200;
        w.actor.hp_max = 200;
        let here = w.actor.pos;
        w.place_cloud(CloudKind::Fire, here, 50);
        cloud_contact(&mut w, 10).unwrap();
        assert!(w.actor.hp < 200);
        assert!(w.log.contains("You are engulfed in roaring flames!"));
    }

    #[test]
    fn smoke_does_nothing() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        let here = w.actor.pos;
        w.place_cloud(CloudKind::Smoke, here, 50);
        cloud_contact(&mut w, 10).unwrap();
        assert_eq!(w.actor.hp, w.actor.hp_max);
        assert!(w.log.pending().is_empty());
    }

    #[test]
    fn poison_gas_poisons() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.actor.hp = 100;
        let here = w.actor.pos;
        w.place_cloud(CloudKind::PoisonGas, here, 50);
        cloud_contact(&mut w, 10).unwrap();
        assert!(w.actor.status.poison > 0);
    }

    #[test]
    fn clouds_thin_out_and_vanish() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        let at = Coord::new(3, 1);
        let smoke = w.place_cloud(CloudKind::Smoke, at, 15).unwrap();
        manage_clouds(&mut w, 10);
        assert_eq!(w.cloud(smoke).unwrap().density, 5);
        manage_clouds(&mut w, 10);
        assert!(w.cloud(smoke).is_none());
        assert!(w.grid.cloud_at(at).is_none());
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn fire_over_water_burns_off_fast() {
        let mut w = world(&["#####", "#@~.#", "#####"]);
        let fire = w.place_cloud(CloudKind::Fire, Coord::new(2, 1), 30).unwrap();
        manage_clouds(&mut w, 10);
        assert!(w.cloud(fire).is_none());
    }

    proptest! {
        #[test]
        fn resistance_zero_always_hurts(seed in any::<u64>(), time in 5u32..30) {
            let mut w = world(&["#####", "#@..#", "#####"]);
            w.rng = GameRng::seeded(seed);
            w.actor.hp = 1000;
            w.actor.hp_max = 1000;
            let here = w.actor.pos;
            w.place_cloud(CloudKind::Fire, here, 100);
            cloud_contact(&mut w, time).unwrap();
            prop_assert!(w.actor.hp < 1000);
        }
    }

    // ── Fire shield and silence ──

    #[test]
    fn fire_shield_rings_the_actor() {
        let mut w = world(&["#####", "#...#", "#.@.#", "#...#", "#####"]);
        w.actor.fire_shield = 3;
        fire_shield(&mut w);
        assert_eq!(w.actor.fire_shield, 2);
        assert!(w.grid.cloud_at(Coord::new(1, 1)).is_some());
        assert!(w.grid.cloud_at(w.actor.pos).is_none());

        w.actor.fire_shield = 1;
        fire_shield(&mut w);
        assert!(w.log.contains("Your ring of flames gutters out."));
    }

    #[test]
    fn silence_announces_both_edges() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.actor.durations.set(DurationKind::Silence, 5);
        silence_transition(&mut w);
        assert!(w.actor.was_silenced);
        assert_eq!(w.log.pending().len(), 1);

        silence_transition(&mut w);
        assert_eq!(w.log.pending().len(), 1);

        w.actor.durations.set(DurationKind::Silence, 0);
        silence_transition(&mut w);
        assert!(w.log.contains("Your hearing returns."));
    }

    #[test]
    fn vents_only_fire_near_the_actor() {
        let mut w = world(&["#####", "#@L.#", "#####"]);
        for _ in 0..2000 {
            environment_effects(&mut w);
        }
        assert!(w.grid.cloud_at(Coord::new(2, 1)).is_some());
    }
}
