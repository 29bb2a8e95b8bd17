//! Game clock bookkeeping.

use log::debug;
use runedeep_logic::constants::time::SYNCH_INTERVAL;
use runedeep_logic::error::InvariantViolation;

use crate::world::GameWorld;

/// Add the turn's cost to the elapsed-time counter.
pub fn advance_elapsed(world: &mut GameWorld, time_taken: u32) -> Result<(), InvariantViolation> {
    let elapsed = world.clock.elapsed;
    world.clock.elapsed = elapsed
        .checked_add(u64::from(time_taken))
        .ok_or(InvariantViolation::ElapsedOverflow {
            elapsed,
            cost: time_taken,
        })?;
    Ok(())
}

/// Count down to the next slow world update and run it when due. Overshoot
/// carries into the next interval, so updates stay on multiples of
/// [`SYNCH_INTERVAL`] whatever the turn costs.
pub fn synch_world_clock(world: &mut GameWorld, time_taken: u32) {
    while world.clock.synch_time <= time_taken {
        handle_time(world);
        world.clock.synch_time += SYNCH_INTERVAL;
    }
    world.clock.synch_time -= time_taken;
}

/// Effects that happen every [`SYNCH_INTERVAL`] units rather than every turn.
pub fn handle_time(world: &mut GameWorld) {
    world.clock.world_ticks += 1;
    if world.actor.contamination > 0 {
        world.actor.contamination -= 1;
        world.actor.redraw.status = true;
    }
    debug!("world tick {}", world.clock.world_ticks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::rng::GameRng;
    use runedeep_logic::actor::{Actor, Species};
    use runedeep_logic::config::GameOptions;
    use runedeep_logic::level::LevelInfo;

    fn world() -> GameWorld {
        let (grid, start) = Grid::from_rows(&["###", "#@#", "###"]).unwrap();
        let mut actor = Actor::new("Tess", Species::Human);
        actor.pos = start;
        GameWorld::new(actor, grid, LevelInfo::dungeon(1), GameOptions::default(), GameRng::seeded(1))
    }

    #[test]
    fn elapsed_overflow_is_an_error() {
        let mut w = world();
        w.clock.elapsed = u64::MAX - 5;
        let err = advance_elapsed(&mut w, 10).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::ElapsedOverflow {
                elapsed: u64::MAX - 5,
                cost: 10
            }
        );
        assert_eq!(w.clock.elapsed, u64::MAX - 5);
    }

    #[test]
    fn world_ticks_every_synch_interval() {
        let mut w = world();
        w.actor.contamination = 2;
        for _ in 0..19 {
            synch_world_clock(&mut w, 10);
        }
        assert_eq!(w.clock.world_ticks, 0);
        assert_eq!(w.clock.synch_time, 10);
        synch_world_clock(&mut w, 10);
        assert_eq!(w.clock.world_ticks, 1);
        assert_eq!(w.clock.synch_time, SYNCH_INTERVAL);
        assert_eq!(w.actor.contamination, 1);
    }

    #[test]
    fn odd_turn_costs_carry_into_the_next_interval() {
        let mut w = world();
        for _ in 0..280 {
            synch_world_clock(&mut w, 15);
        }
        // 4200 units is exactly 21 intervals.
        assert_eq!(w.clock.world_ticks, 21);
        assert_eq!(w.clock.synch_time, SYNCH_INTERVAL);

        synch_world_clock(&mut w, 190);
        assert_eq!(w.clock.world_ticks, 21);
        synch_world_clock(&mut w, 15);
        assert_eq!(w.clock.world_ticks, 22);
        assert_eq!(w.clock.synch_time, SYNCH_INTERVAL - 5);
    }

    #[test]
    fn a_very_slow_turn_runs_every_missed_update() {
        let mut w = world();
        synch_world_clock(&mut w, 3 * SYNCH_INTERVAL + 20);
        assert_eq!(w.clock.world_ticks, 3);
        assert_eq!(w.clock.synch_time, SYNCH_INTERVAL - 20);
    }
}
