//! Player steps, swaps, melee and traps.

use hecs::Entity;
use log::info;
use runedeep_logic::actor::DeathCause;
use runedeep_logic::dice::Dice;
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::{confused_offset, step_cost, Coord, Offset};

use crate::components::{Attitude, Behaviour, Monster};
use crate::error::Rejection;
use crate::grid::{Terrain, TrapKind};
use crate::turn::TurnState;
use crate::world::GameWorld;

use super::{fall_into_hazard, open_door, teleport_in_level, Resolution};

/// Walk one square, or do whatever walking there turns into.
pub fn move_player(world: &mut GameWorld, turn: &mut TurnState, requested: Offset) -> Resolution {
    let confused = world.actor.is_confused();
    let offset = if confused {
        confused_offset(requested, &mut world.rng)
    } else {
        requested
    };

    // A confused actor can lurch in place; the turn is lost.
    if offset.is_zero() {
        return Resolution::Consumed;
    }

    let target = world.actor.pos.offset(offset);

    if let Some(entity) = world.grid.monster_at(target) {
        if world.is_submerged(entity) {
            surface(world, entity);
            world.actor.stop_running();
            return Resolution::Consumed;
        }
        let friendly = world.monster(entity).is_some_and(|m| m.is_friendly());
        if friendly && world.grid.is_visible(target) && !confused {
            return swap_places(world, turn, entity);
        }
        attack_monster(world, turn, entity);
        return Resolution::Consumed;
    }

    let terrain = world.grid.terrain(target);
    if terrain == Terrain::ClosedDoor && world.options.easy_open && !confused {
        return open_door(world, turn, offset, false);
    }

    if terrain.is_solid() || !world.grid.in_bounds(target) {
        world.actor.stop_running();
        return if confused {
            Resolution::Rejected(Rejection::Bump)
        } else {
            Resolution::Free
        };
    }

    if terrain.is_hazardous() && !world.actor.is_levitating() && !confused {
        return Resolution::Rejected(Rejection::Impassable);
    }

    turn.time_taken = step_cost(turn.time_taken, world.actor.movement_speed());
    world.actor.pos = target;
    arrive(world, target);
    if terrain.is_hazardous() && !world.actor.is_levitating() {
        fall_into_hazard(world);
    }
    Resolution::Consumed
}

/// Bookkeeping after the actor lands on a new square by walking.
fn arrive(world: &mut GameWorld, at: Coord) {
    if let Some(running) = world.actor.running.as_mut() {
        running.continuing = true;
    }
    if world.grid.items_at(at).is_some() {
        world.actor.pending_autopickup = true;
    }
    trigger_trap(world, at);
}

fn surface(world: &mut GameWorld, entity: Entity) {
    if !world.set_submerged(entity, false) {
        return;
    }
    if let Some(monster) = world.monster(entity) {
        world.say(Channel::Monster, &format!("The {} surfaces!", monster.name()));
    }
}

fn swap_places(world: &mut GameWorld, turn: &mut TurnState, entity: Entity) -> Resolution {
    let Some(monster) = world.monster(entity) else {
        return Resolution::Free;
    };
    let def = monster.def();
    if def.stationary || !world.can_stand(world.actor.pos, def) {
        return Resolution::Free;
    }

    turn.time_taken = step_cost(turn.time_taken, world.actor.movement_speed());
    world.swap_with_actor(entity);
    world.say(
        Channel::Plain,
        &format!("You swap places with your {}.", monster.name()),
    );
    let at = world.actor.pos;
    arrive(world, at);
    Resolution::Consumed
}

/// One melee swing at `entity`. Any creature struck turns hostile.
pub fn attack_monster(world: &mut GameWorld, turn: &mut TurnState, entity: Entity) {
    let sides = world
        .actor
        .equipment
        .weapon
        .as_ref()
        .map_or(3, |w| w.damage.max(1));
    let bonus = (world.actor.stats.strength - 10).max(0) / 3;
    let damage = world.rng.roll_dice(1, sides) as i32 + bonus;

    let outcome = match world.entities.get::<&mut Monster>(entity) {
        Ok(mut monster) => {
            monster.hp -= damage;
            monster.attitude = Attitude::Hostile;
            monster.behaviour = Behaviour::Hunting;
            Some((monster.name(), monster.hp <= 0))
        }
        Err(_) => None,
    };

    match outcome {
        Some((name, true)) => {
            world.say(Channel::Plain, &format!("You kill the {}!", name));
            info!("killed {}", name);
            world.remove_monster(entity);
        }
        Some((name, false)) => world.say(Channel::Plain, &format!("You hit the {}.", name)),
        None => {}
    }

    world.actor.stop_running();
    world.actor.reset_berserk_penalty();
    turn.apply_berserk_penalty = false;
}

/// Spring whatever trap lies at `at`.
pub fn trigger_trap(world: &mut GameWorld, at: Coord) {
    let Some(trap) = world.grid.trap_at(at) else {
        return;
    };
    let mechanical = matches!(trap.kind, TrapKind::Dart | TrapKind::Blade);
    if mechanical && world.actor.is_levitating() {
        return;
    }
    if let Some(cell) = world.grid.cell_mut(at) {
        if let Some(trap) = cell.trap.as_mut() {
            trap.known = true;
        }
    }
    world.actor.stop_running();

    match trap.kind {
        TrapKind::Dart => {
            world.say(Channel::Danger, "A dart shoots out and hits you!");
            let damage = world.rng.roll_dice(1, 4) as i32;
            world.actor.hurt(damage, DeathCause::Trap("dart trap".to_string()));
        }
        TrapKind::Blade => {
            world.say(Channel::Danger, "A huge blade swings out and slices into you!");
            let damage = world.rng.roll_dice(2, 6) as i32;
            world.actor.hurt(damage, DeathCause::Trap("blade trap".to_string()));
        }
        TrapKind::Teleport => {
            world.say(Channel::Plain, "You feel a wrenching sensation.");
            teleport_in_level(world);
        }
        TrapKind::Alarm => {
            world.say(Channel::Sound, "An alarm trap emits a blaring wail!");
            world.make_noise(at, 12);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Attitude;
    use crate::grid::{Grid, Trap};
    use crate::rng::GameRng;
    use runedeep_logic::actor::{Actor, Species};
    use runedeep_logic::bestiary::MonsterKind;
    use runedeep_logic::config::GameOptions;
    use runedeep_logic::level::LevelInfo;
    use runedeep_logic::movement::Direction;

    fn world(rows: &[&str]) -> GameWorld {
        let (grid, start) = Grid::from_rows(rows).unwrap();
        let mut actor = Actor::new("Tess", Species::Human);
        actor.pos = start;
        GameWorld::new(actor, grid, LevelInfo::dungeon(1), GameOptions::default(), GameRng::seeded(3))
    }

    #[test]
    fn plain_step_costs_scaled_time() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::East.offset());
        assert_eq!(result, Resolution::Consumed);
        assert_eq!(w.actor.pos, Coord::new(2, 1));
        assert_eq!(turn.time_taken, 10);
    }

    #[test]
    fn wall_stops_running_without_time() {
        let mut w = world(&["###", "#@#", "###"]);
        w.actor.running = Some(runedeep_logic::actor::Running::run(Direction::North));
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::North.offset());
        assert_eq!(result, Resolution::Free);
        assert!(w.actor.running.is_none());
        assert_eq!(w.actor.pos, Coord::new(1, 1));
    }

    #[test]
    fn friendly_visible_monster_swaps() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        let ally = w
            .spawn_monster(MonsterKind::Hound, Coord::new(2, 1), Attitude::Friendly, Behaviour::Wandering)
            .unwrap();
        w.grid.update_visibility(w.actor.pos);
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::East.offset());
        assert_eq!(result, Resolution::Consumed);
        assert_eq!(w.actor.pos, Coord::new(2, 1));
        assert_eq!(w.position_of(ally), Some(Coord::new(1, 1)));
        assert!(w.occupancy_consistent());
    }

    #[test]
    fn stationary_ally_refuses_to_swap() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.spawn_monster(MonsterKind::Oklob, Coord::new(2, 1), Attitude::Friendly, Behaviour::Wandering)
            .unwrap();
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::East.offset());
        assert_eq!(result, Resolution::Free);
        assert_eq!(w.actor.pos, Coord::new(1, 1));
    }

    #[test]
    fn submerged_monster_surfaces() {
        let mut w = world(&["#####", "#@W.#", "#####"]);
        let eel = w
            .spawn_monster(MonsterKind::GiantEel, Coord::new(2, 1), Attitude::Hostile, Behaviour::Wandering)
            .unwrap();
        assert!(w.set_submerged(eel, true));
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::East.offset());
        assert_eq!(result, Resolution::Consumed);
        assert!(!w.is_submerged(eel));
        assert_eq!(w.monster(eel).unwrap().hp, w.monster(eel).unwrap().hp_max);
        assert!(w.log.contains("The giant eel surfaces!"));
    }

    #[test]
    fn lava_is_refused_unless_levitating() {
        let mut w = world(&["#####", "#@L.#", "#####"]);
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::East.offset());
        assert_eq!(result, Resolution::Rejected(Rejection::Impassable));

        w.actor.durations.set(runedeep_logic::duration::DurationKind::Levitation, 20);
        let mut turn = TurnState::new(&w.actor);
        let result = move_player(&mut w, &mut turn, Direction::East.offset());
        assert_eq!(result, Resolution::Consumed);
        assert!(!w.actor.is_dead());
    }

    #[test]
    fn dart_trap_hurts_and_is_revealed() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.grid.cell_mut(Coord::new(2, 1)).unwrap().trap = Some(Trap {
            kind: TrapKind::Dart,
            known: false,
        });
        let hp = w.actor.hp;
        let mut turn = TurnState::new(&w.actor);
        move_player(&mut w, &mut turn, Direction::East.offset());
        assert!(w.actor.hp < hp);
        assert!(w.grid.trap_at(Coord::new(2, 1)).unwrap().known);
    }

    #[test]
    fn stepping_onto_items_marks_autopickup() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        w.drop_item(
            Coord::new(2, 1),
            runedeep_logic::items::Item::new(runedeep_logic::items::ItemKind::Gold, 5),
        );
        let mut turn = TurnState::new(&w.actor);
        move_player(&mut w, &mut turn, Direction::East.offset());
        assert!(w.actor.pending_autopickup);
    }
}
