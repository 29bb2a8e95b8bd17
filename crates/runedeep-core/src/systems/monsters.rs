//! The monster pass: energy, waking, moving and attacking the actor.

use hecs::Entity;
use log::info;
use runedeep_logic::actor::DeathCause;
use runedeep_logic::bestiary::{AttackEffect, MonsterDef};
use runedeep_logic::constants::perception::MONSTER_ALERTNESS;
use runedeep_logic::constants::time::BASE_ACTION_COST;
use runedeep_logic::dice::Dice;
use runedeep_logic::duration::StatusKind;
use runedeep_logic::error::InvariantViolation;
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::{Coord, Offset};

use crate::components::{Behaviour, Monster};
use crate::ports::ContentTables;
use crate::world::GameWorld;

const SUBMERGE_ODDS: u32 = 5;
/// Allies further than this (Chebyshev) close the gap.
const FOLLOW_DISTANCE: i32 = 2;

/// Give every monster its share of `time_taken` and let it act.
pub fn monster_pass(
    world: &mut GameWorld,
    content: &dyn ContentTables,
    time_taken: u32,
) -> Result<(), InvariantViolation> {
    let roster: Vec<Entity> = world.entities.query::<&Monster>().iter().map(|(e, _)| e).collect();

    for entity in roster {
        let Some(monster) = world.monster(entity) else {
            continue;
        };
        let def = content.monster(monster.kind);
        let mut energy = monster.energy + def.speed * time_taken / BASE_ACTION_COST;
        while energy >= BASE_ACTION_COST {
            energy -= BASE_ACTION_COST;
            monster_act(world, entity, def)?;
            if world.actor.is_dead() {
                return Ok(());
            }
        }
        if let Ok(mut live) = world.entities.get::<&mut Monster>(entity) {
            live.energy = energy;
        }
    }
    Ok(())
}

fn set_behaviour(world: &mut GameWorld, entity: Entity, behaviour: Behaviour) {
    if let Ok(mut monster) = world.entities.get::<&mut Monster>(entity) {
        monster.behaviour = behaviour;
    }
}

fn monster_act(world: &mut GameWorld, entity: Entity, def: &MonsterDef) -> Result<(), InvariantViolation> {
    let (Some(monster), Some(at)) = (world.monster(entity), world.position_of(entity)) else {
        return Ok(());
    };
    let target = world.actor.pos;
    let sees_actor = world.grid.is_visible(at);

    if monster.is_asleep() {
        let stealth = world.actor.stealth;
        if sees_actor && world.rng.below(stealth + 1) < MONSTER_ALERTNESS {
            let woken = if monster.is_hostile() {
                Behaviour::Hunting
            } else {
                Behaviour::Wandering
            };
            set_behaviour(world, entity, woken);
        }
        return Ok(());
    }

    if monster.is_friendly() {
        if at.chebyshev(target) > FOLLOW_DISTANCE {
            step_toward(world, entity, at, target, def);
        }
        return Ok(());
    }

    if def.aquatic {
        let submerged = world.is_submerged(entity);
        if submerged && !at.is_adjacent(target) {
            return Ok(());
        }
        if submerged {
            world.set_submerged(entity, false);
        } else if !at.is_adjacent(target) && world.rng.one_chance_in(SUBMERGE_ODDS) {
            world.set_submerged(entity, true);
            return Ok(());
        }
    }

    if at.is_adjacent(target) {
        return attack_actor(world, def);
    }
    if def.stationary {
        return Ok(());
    }

    match monster.behaviour {
        Behaviour::Hunting if sees_actor => step_toward(world, entity, at, target, def),
        Behaviour::Wandering if sees_actor => {
            set_behaviour(world, entity, Behaviour::Hunting);
            step_toward(world, entity, at, target, def);
        }
        _ => wander(world, entity, at, def),
    }
    Ok(())
}

fn step_toward(world: &mut GameWorld, entity: Entity, from: Coord, to: Coord, def: &MonsterDef) {
    let direct = from.step_toward(to);
    let candidates = [
        direct,
        Offset::new(direct.dx, 0),
        Offset::new(0, direct.dy),
    ];
    for offset in candidates.into_iter().filter(|o| !o.is_zero()) {
        let next = from.offset(offset);
        if world.can_stand(next, def) && world.move_monster(entity, next) {
            return;
        }
    }
}

fn wander(world: &mut GameWorld, entity: Entity, from: Coord, def: &MonsterDef) {
    let offsets: Vec<Offset> = Offset::neighbourhood().filter(|o| !o.is_zero()).collect();
    let offset = offsets[world.rng.below(offsets.len() as u32) as usize];
    let next = from.offset(offset);
    if world.can_stand(next, def) {
        world.move_monster(entity, next);
    }
}

fn attack_actor(world: &mut GameWorld, def: &MonsterDef) -> Result<(), InvariantViolation> {
    let (count, sides) = def.attack;
    let damage = world.rng.roll_dice(count, sides) as i32;
    world.say(Channel::Monster, &format!("The {} hits you.", def.name));
    world.actor.hurt(damage, DeathCause::Monster(def.name.to_string()));
    world.actor.stop_running();
    if world.actor.is_dead() {
        info!("killed by {}", def.name);
        return Ok(());
    }

    match def.effect {
        Some(AttackEffect::Banish { odds }) if world.rng.one_chance_in(odds) => {
            world.actor.banished = true;
        }
        Some(AttackEffect::Poison { strength }) if !world.actor.res_poison() => {
            world.say(Channel::Danger, "You are poisoned.");
            world.actor.status.extend(StatusKind::Poison, strength)?;
            world.actor.redraw.status = true;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Attitude;
    use crate::grid::Grid;
    use crate::ports::Bestiary;
    use crate::rng::GameRng;
    use runedeep_logic::actor::{Actor, Species};
    use runedeep_logic::bestiary::MonsterKind;
    use runedeep_logic::config::GameOptions;
    use runedeep_logic::level::LevelInfo;

    fn world(rows: &[&str]) -> GameWorld {
        let (grid, start) = Grid::from_rows(rows).unwrap();
        let mut actor = Actor::new("Tess", Species::Human);
        actor.pos = start;
        actor.hp = 500;
        actor.hp_max = 500;
        GameWorld::new(actor, grid, LevelInfo::dungeon(1), GameOptions::default(), GameRng::seeded(4))
    }

    #[test]
    fn adjacent_hostile_attacks() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.spawn_monster(MonsterKind::Goblin, Coord::new(2, 1), Attitude::Hostile, Behaviour::Hunting)
            .unwrap();
        monster_pass(&mut w, &Bestiary, 10).unwrap();
        assert!(w.actor.hp < 500);
        assert!(w.log.contains("The goblin hits you."));
    }

    #[test]
    fn hunter_closes_in() {
        let mut w = world(&["#######", "#@....#", "#######"]);
        let orc = w
            .spawn_monster(MonsterKind::Orc, Coord::new(5, 1), Attitude::Hostile, Behaviour::Hunting)
            .unwrap();
        monster_pass(&mut w, &Bestiary, 10).unwrap();
        assert_eq!(w.position_of(orc), Some(Coord::new(4, 1)));
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn energy_carries_over_between_turns() {
        let mut w = world(&["#########", "#@......#", "#########"]);
        let hound = w
            .spawn_monster(MonsterKind::Hound, Coord::new(7, 1), Attitude::Hostile, Behaviour::Hunting)
            .unwrap();
        monster_pass(&mut w, &Bestiary, 10).unwrap();
        assert_eq!(w.monster(hound).unwrap().energy, 5);
        monster_pass(&mut w, &Bestiary, 10).unwrap();
        assert_eq!(w.monster(hound).unwrap().energy, 0);
        assert_eq!(w.position_of(hound), Some(Coord::new(4, 1)));
    }

    #[test]
    fn warden_can_banish() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.spawn_monster(MonsterKind::AbyssalWarden, Coord::new(2, 1), Attitude::Hostile, Behaviour::Hunting)
            .unwrap();
        for _ in 0..40 {
            monster_pass(&mut w, &Bestiary, 10).unwrap();
            w.actor.hp = 500;
        }
        assert!(w.actor.banished);
    }

    #[test]
    fn allies_follow_and_never_attack() {
        let mut w = world(&["#########", "#@......#", "#########"]);
        let hound = w
            .spawn_monster(MonsterKind::Hound, Coord::new(6, 1), Attitude::Friendly, Behaviour::Wandering)
            .unwrap();
        for _ in 0..6 {
            monster_pass(&mut w, &Bestiary, 10).unwrap();
        }
        assert!(w.position_of(hound).unwrap().chebyshev(w.actor.pos) <= FOLLOW_DISTANCE);
        assert_eq!(w.actor.hp, 500);
    }
}
