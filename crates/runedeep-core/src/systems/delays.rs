//! Multi-turn actions: stair delays, running, resting, and picking things up.

use log::info;
use runedeep_logic::actor::{BurdenState, Delay, DelayKind, RunMode, Running};
use runedeep_logic::items::Item;
use runedeep_logic::level::GamePhase;
use runedeep_logic::messages::Channel;
use runedeep_logic::movement::Direction;

use crate::error::{EngineError, Rejection};
use crate::grid::Terrain;
use crate::ports::DungeonBuilder;
use crate::world::GameWorld;

use super::{take_stairs, Command, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayProgress {
    /// Nothing pending.
    Idle,
    /// Still under way; this turn is spent waiting.
    Waiting,
    /// Finished this turn.
    Finished,
}

pub fn start_stairs(world: &mut GameWorld, up: bool) -> Resolution {
    let terrain = world.grid.terrain(world.actor.pos);
    if up && terrain != Terrain::StairsUp {
        return Resolution::Rejected(Rejection::NoUpStairs);
    }
    if !up && terrain != Terrain::StairsDown {
        return Resolution::Rejected(Rejection::NoDownStairs);
    }
    if !up && world.actor.is_levitating() && !world.actor.controlled_flight {
        return Resolution::Rejected(Rejection::FloatingAboveStairs);
    }
    if world.actor.is_berserk() {
        return Resolution::Rejected(Rejection::TooBerserk);
    }

    let burdened = world.actor.burden != BurdenState::Unencumbered;
    world.actor.delay = Some(Delay {
        kind: if up { DelayKind::Ascend } else { DelayKind::Descend },
        remaining: 1 + burdened as u32,
    });
    Resolution::Free
}

/// Tick the pending delay; a finished stair climb changes level.
pub fn advance_delay(
    world: &mut GameWorld,
    builder: &mut dyn DungeonBuilder,
) -> Result<DelayProgress, EngineError> {
    let Some(mut delay) = world.actor.delay else {
        return Ok(DelayProgress::Idle);
    };
    if delay.remaining > 0 {
        delay.remaining -= 1;
        world.actor.delay = Some(delay);
        return Ok(DelayProgress::Waiting);
    }
    world.actor.delay = None;
    take_stairs(world, builder, delay.kind == DelayKind::Ascend)?;
    Ok(DelayProgress::Finished)
}

pub fn start_running(world: &mut GameWorld, direction: Direction) -> Resolution {
    world.actor.running = Some(Running::run(direction));
    world.actor.redraw.status = true;
    Resolution::Free
}

pub fn start_rest(world: &mut GameWorld) -> Resolution {
    if world.hostile_in_view() {
        return Resolution::Rejected(Rejection::MonstersNearby);
    }
    let healthy = world.actor.hp >= world.actor.hp_max && world.actor.mp >= world.actor.mp_max;
    if healthy {
        world.say(Channel::Plain, "You start searching.");
    } else {
        world.say(Channel::Plain, "You start resting.");
    }
    world.actor.running = Some(Running::rest(!healthy));
    world.actor.redraw.status = true;
    Resolution::Free
}

/// The command an active run or rest issues this turn, if any.
pub fn next_running_command(world: &mut GameWorld) -> Option<Command> {
    let running = world.actor.running.as_mut()?;
    match running.mode {
        RunMode::Run(direction) => Some(Command::Move(direction)),
        RunMode::Rest => {
            if running.turns_left == 0 {
                world.actor.stop_running();
                return None;
            }
            running.turns_left -= 1;
            running.continuing = true;
            Some(Command::Search)
        }
    }
}

/// Pick up what was stepped on last turn. True if anything was taken.
pub fn autopickup(world: &mut GameWorld) -> bool {
    if !std::mem::take(&mut world.actor.pending_autopickup) || !world.options.autopickup {
        return false;
    }
    let items = world.take_items(world.actor.pos);
    if items.is_empty() {
        return false;
    }
    collect(world, items);
    true
}

pub fn pick_up(world: &mut GameWorld) -> Resolution {
    let items = world.take_items(world.actor.pos);
    if items.is_empty() {
        return Resolution::Rejected(Rejection::NothingToPickUp);
    }
    collect(world, items);
    Resolution::Consumed
}

fn collect(world: &mut GameWorld, items: Vec<Item>) {
    for item in items {
        world.say(Channel::Plain, &format!("You pick up {}.", item.name()));
        match world.actor.inventory.iter_mut().find(|held| held.stacks_with(&item)) {
            Some(held) => held.quantity += item.quantity,
            None => world.actor.inventory.push(item),
        }
    }
    world.actor.recompute_burden();
    let phase = world.phase;
    world.update_phase();
    if phase == GamePhase::Descent && world.phase == GamePhase::OrbRun {
        info!("the Orb has been taken");
        world.say(Channel::Warning, "The lords of Pandemonium are not amused. Beware!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Attitude, Behaviour};
    use crate::grid::Grid;
    use crate::rng::GameRng;
    use runedeep_logic::actor::{Actor, Species};
    use runedeep_logic::bestiary::MonsterKind;
    use runedeep_logic::config::GameOptions;
    use runedeep_logic::duration::DurationKind;
    use runedeep_logic::items::ItemKind;
    use runedeep_logic::level::LevelInfo;
    use runedeep_logic::movement::Coord;

    fn world(rows: &[&str]) -> GameWorld {
        let (grid, start) = Grid::from_rows(rows).unwrap();
        let mut actor = Actor::new("Tess", Species::Human);
        actor.pos = start;
        GameWorld::new(actor, grid, LevelInfo::dungeon(1), GameOptions::default(), GameRng::seeded(2))
    }

    #[test]
    fn stairs_need_the_right_staircase() {
        let mut w = world(&["#####", "#@.>#", "#####"]);
        assert_eq!(start_stairs(&mut w, false), Resolution::Rejected(Rejection::NoDownStairs));
        assert_eq!(start_stairs(&mut w, true), Resolution::Rejected(Rejection::NoUpStairs));
        w.actor.pos = Coord::new(3, 1);
        assert_eq!(start_stairs(&mut w, false), Resolution::Free);
        assert_eq!(
            w.actor.delay,
            Some(Delay {
                kind: DelayKind::Descend,
                remaining: 1
            })
        );
    }

    #[test]
    fn berserk_and_floating_block_stairs() {
        let mut w = world(&["#####", "#..>#", "#####"]);
        w.actor.pos = Coord::new(3, 1);
        w.actor.durations.set(DurationKind::Levitation, 5);
        assert_eq!(
            start_stairs(&mut w, false),
            Resolution::Rejected(Rejection::FloatingAboveStairs)
        );
        w.actor.durations.set(DurationKind::Levitation, 0);
        w.actor.durations.set(DurationKind::Berserk, 5);
        assert_eq!(start_stairs(&mut w, false), Resolution::Rejected(Rejection::TooBerserk));
    }

    #[test]
    fn rest_refused_with_hostiles_in_view() {
        let mut w = world(&["######", "#@...#", "######"]);
        w.spawn_monster(MonsterKind::Goblin, Coord::new(4, 1), Attitude::Hostile, Behaviour::Wandering)
            .unwrap();
        w.grid.update_visibility(w.actor.pos);
        assert_eq!(start_rest(&mut w), Resolution::Rejected(Rejection::MonstersNearby));
        assert!(w.actor.running.is_none());
    }

    #[test]
    fn rest_at_full_health_is_searching() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        assert_eq!(start_rest(&mut w), Resolution::Free);
        assert!(w.log.contains("You start searching."));
        assert!(!w.actor.running.unwrap().until_healed);

        w.actor.hp -= 3;
        start_rest(&mut w);
        assert!(w.log.contains("You start resting."));
        assert!(w.actor.running.unwrap().until_healed);
    }

    #[test]
    fn rest_gives_up_after_its_turns() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        start_rest(&mut w);
        if let Some(running) = w.actor.running.as_mut() {
            running.turns_left = 1;
        }
        assert_eq!(next_running_command(&mut w), Some(Command::Search));
        assert_eq!(next_running_command(&mut w), None);
        assert!(w.actor.running.is_none());
    }

    #[test]
    fn pickup_and_autopickup() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        assert_eq!(pick_up(&mut w), Resolution::Rejected(Rejection::NothingToPickUp));

        let here = w.actor.pos;
        w.drop_item(here, Item::new(ItemKind::Gold, 10));
        w.actor.pending_autopickup = true;
        w.options.autopickup = false;
        assert!(!autopickup(&mut w));
        assert!(!w.actor.pending_autopickup);

        w.options.autopickup = true;
        w.actor.pending_autopickup = true;
        assert!(autopickup(&mut w));
        assert_eq!(w.actor.inventory[0].quantity, 10);
        assert!(w.grid.items_at(here).is_none());
    }

    #[test]
    fn taking_the_orb_starts_the_escape() {
        let mut w = world(&["#####", "#@..#", "#####"]);
        let here = w.actor.pos;
        w.drop_item(here, Item::new(ItemKind::Orb, 1));
        assert_eq!(pick_up(&mut w), Resolution::Consumed);
        assert_eq!(w.phase, GamePhase::OrbRun);
    }
}
