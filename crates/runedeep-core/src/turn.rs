//! Per-turn state and the reaction cascade.
//!
//! Once a command consumes time, the world reacts through [`CASCADE`]: a
//! fixed, ordered list of named stages. The order is part of the engine's
//! contract, so it lives here as data rather than as a sequence of calls.

use log::{debug, warn};
use runedeep_logic::actor::Actor;
use runedeep_logic::error::InvariantViolation;
use runedeep_logic::hunger::{apply_food_use, check_starvation};
use runedeep_logic::ledger::{decrement_all, LedgerRequest};
use runedeep_logic::recharge::recharge_rods;
use runedeep_logic::regen::regenerate;
use runedeep_logic::stealth::compute_stealth;

use crate::error::EngineError;
use crate::ports::{ContentTables, DungeonBuilder, Renderer};
use crate::systems::{self, SessionRequest};
use crate::world::GameWorld;

/// Scratch state for one input call. Dropped when the call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    pub turn_over: bool,
    /// Time the turn costs, in tenths of a normal turn.
    pub time_taken: u32,
    /// Charge a berserk actor for not fighting this turn.
    pub apply_berserk_penalty: bool,
    /// A sub-prompt asked for more input.
    pub prompted: bool,
    pub hp_at_start: i32,
    pub session: Option<SessionRequest>,
    pub full_redraw: bool,
}

impl TurnState {
    pub fn new(actor: &Actor) -> Self {
        Self {
            turn_over: false,
            time_taken: actor.action_speed(),
            apply_berserk_penalty: true,
            prompted: false,
            hp_at_start: actor.hp,
            session: None,
            full_redraw: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingInput,
    Resolving,
    Reacting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    AdvanceTurnCounter,
    CheckBanished,
    EnvironmentEffects,
    PassiveSearch,
    RecomputeStealth,
    SpecialWield,
    TeleportRoll,
    CloudContact,
    DecrementDurations,
    Hunger,
    Regenerate,
    RechargeRods,
    RefreshView,
    MonsterPass,
    RecheckBanished,
    AdvanceElapsed,
    SynchWorldClock,
    ManageClouds,
    FireShield,
    Starvation,
    SilenceTransition,
    RefreshViewAgain,
    AcknowledgeWhileHelpless,
    AmbientSpawn,
}

pub const CASCADE: [Stage; 24] = [
    Stage::AdvanceTurnCounter,
    Stage::CheckBanished,
    Stage::EnvironmentEffects,
    Stage::PassiveSearch,
    Stage::RecomputeStealth,
    Stage::SpecialWield,
    Stage::TeleportRoll,
    Stage::CloudContact,
    Stage::DecrementDurations,
    Stage::Hunger,
    Stage::Regenerate,
    Stage::RechargeRods,
    Stage::RefreshView,
    Stage::MonsterPass,
    Stage::RecheckBanished,
    Stage::AdvanceElapsed,
    Stage::SynchWorldClock,
    Stage::ManageClouds,
    Stage::FireShield,
    Stage::Starvation,
    Stage::SilenceTransition,
    Stage::RefreshViewAgain,
    Stage::AcknowledgeWhileHelpless,
    Stage::AmbientSpawn,
];

/// The collaborators a cascade may call out to.
pub struct Ports<'a> {
    pub content: &'a dyn ContentTables,
    pub builder: &'a mut dyn DungeonBuilder,
    pub renderer: &'a mut dyn Renderer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    Completed,
    /// The actor died during the named stage; later stages did not run.
    PlayerDied(Stage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub ran: Vec<Stage>,
    pub outcome: CascadeOutcome,
}

/// Run every stage of [`CASCADE`] in order.
///
/// Stops early when the actor dies. An invariant violation abandons the
/// cascade where it stands and is returned as an error.
pub fn run_cascade(
    world: &mut GameWorld,
    turn: &mut TurnState,
    ports: &mut Ports<'_>,
) -> Result<CascadeReport, EngineError> {
    let mut ran = Vec::with_capacity(CASCADE.len());
    for stage in CASCADE {
        debug!("stage {:?}", stage);
        if let Err(err) = run_stage(stage, world, turn, ports) {
            warn!("cascade aborted in {:?}: {}", stage, err);
            return Err(err);
        }
        ran.push(stage);
        if world.actor.is_dead() {
            return Ok(CascadeReport {
                ran,
                outcome: CascadeOutcome::PlayerDied(stage),
            });
        }
    }
    Ok(CascadeReport {
        ran,
        outcome: CascadeOutcome::Completed,
    })
}

fn run_stage(
    stage: Stage,
    world: &mut GameWorld,
    turn: &mut TurnState,
    ports: &mut Ports<'_>,
) -> Result<(), EngineError> {
    let time = turn.time_taken;
    match stage {
        Stage::AdvanceTurnCounter => {
            world.clock.turns = world
                .clock
                .turns
                .checked_add(1)
                .ok_or(InvariantViolation::TurnCounterOverflow)?;
            world.actor.redraw.turn_count = true;
        }
        Stage::CheckBanished | Stage::RecheckBanished => {
            systems::check_banished(world, ports.builder)?;
        }
        Stage::EnvironmentEffects => systems::environment_effects(world),
        Stage::PassiveSearch => systems::passive_search(world),
        Stage::RecomputeStealth => world.actor.stealth = compute_stealth(&world.actor),
        Stage::SpecialWield => systems::special_wield(world),
        Stage::TeleportRoll => systems::teleport_roll(world, ports.builder)?,
        Stage::CloudContact => systems::cloud_contact(world, time)?,
        Stage::DecrementDurations => {
            let report = decrement_all(&mut world.actor, time, &mut world.rng, &mut world.log)?;
            for request in report.requests {
                match request {
                    LedgerRequest::Teleport { new_abyss_area } => {
                        systems::teleport_player(world, new_abyss_area, ports.builder)?;
                    }
                    LedgerRequest::Land => systems::land(world),
                    LedgerRequest::Acknowledge => {
                        ports.renderer.more();
                        world.log.mark_read();
                    }
                }
            }
            world.actor.recompute_burden();
        }
        Stage::Hunger => {
            apply_food_use(&mut world.actor, time);
        }
        Stage::Regenerate => {
            regenerate(&mut world.actor)?;
        }
        Stage::RechargeRods => {
            if recharge_rods(&mut world.actor, time, &mut world.rng).is_some() {
                world.actor.redraw.wield = true;
            }
        }
        Stage::RefreshView => systems::refresh_view(world),
        Stage::MonsterPass => systems::monster_pass(world, ports.content, time)?,
        Stage::AdvanceElapsed => systems::advance_elapsed(world, time)?,
        Stage::SynchWorldClock => systems::synch_world_clock(world, time),
        Stage::ManageClouds => systems::manage_clouds(world, time),
        Stage::FireShield => systems::fire_shield(world),
        Stage::Starvation => {
            check_starvation(&mut world.actor, &mut world.rng, &mut world.log);
        }
        Stage::SilenceTransition => systems::silence_transition(world),
        Stage::RefreshViewAgain => {
            systems::refresh_view(world);
            systems::check_interrupts(world, turn);
        }
        Stage::AcknowledgeWhileHelpless => {
            if world.actor.is_paralysed() && world.log.has_unread() {
                ports.renderer.more();
                world.log.mark_read();
            }
        }
        Stage::AmbientSpawn => systems::ambient_spawn_pass(world, ports.content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cascade_has_every_stage_once() {
        let unique: HashSet<Stage> = CASCADE.iter().copied().collect();
        assert_eq!(unique.len(), CASCADE.len());
        assert_eq!(CASCADE[0], Stage::AdvanceTurnCounter);
        assert_eq!(CASCADE[8], Stage::DecrementDurations);
        assert_eq!(CASCADE[23], Stage::AmbientSpawn);
    }

    #[test]
    fn banishment_is_checked_before_and_after_monsters() {
        let at = |s: Stage| CASCADE.iter().position(|x| *x == s);
        assert!(at(Stage::CheckBanished) < at(Stage::MonsterPass));
        assert!(at(Stage::MonsterPass) < at(Stage::RecheckBanished));
    }
}
