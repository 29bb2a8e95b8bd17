//! Game engine - main entry point for playing turns.

use std::io::{Read, Write};

use log::{debug, info};
use runedeep_logic::actor::{Actor, RedrawFlags};
use runedeep_logic::config::GameOptions;
use runedeep_logic::ledger::berserk_no_combat_penalty;
use runedeep_logic::level::LevelInfo;
use runedeep_logic::messages::{Channel, MessageSink};

use crate::error::EngineError;
use crate::persistence::{self, SaveError};
use crate::ports::{Arrival, ContentTables, DungeonBuilder, InputProvider, LevelRequest, Region, Renderer};
use crate::rng::GameRng;
use crate::systems::{self, DelayProgress, SessionRequest};
use crate::turn::{run_cascade, CascadeOutcome, Ports, TurnPhase, TurnState};
use crate::world::GameWorld;

/// What one call to [`GameEngine::step`] amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Time passed and the world reacted.
    TurnTaken,
    /// The command was free or rejected.
    NoTime,
    PlayerDied,
    SaveRequested,
    QuitRequested,
}

/// Owns the world and the collaborators the turn loop calls out to.
pub struct GameEngine {
    pub world: GameWorld,
    content: Box<dyn ContentTables>,
    builder: Box<dyn DungeonBuilder>,
    phase: TurnPhase,
}

impl GameEngine {
    /// Start a new game on level 1.
    pub fn new(
        options: GameOptions,
        mut builder: Box<dyn DungeonBuilder>,
        content: Box<dyn ContentTables>,
    ) -> Result<Self, EngineError> {
        let mut rng = match options.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::from_entropy(),
        };
        let level = LevelInfo::dungeon(1);
        let request = LevelRequest {
            level,
            arrival: Arrival::Anywhere,
        };
        let layout = builder.build(&request, &mut rng)?;

        let mut actor = Actor::new(options.player_name.clone(), options.species);
        actor.pos = layout.start;
        let mut world = GameWorld::new(actor, layout.grid.clone(), level, options, rng);
        world.install_layout(layout, level);
        info!("new game for {} the {}", world.actor.name, world.actor.species.name());

        let mut engine = Self::from_world(world, builder, content);
        engine.greet(false);
        Ok(engine)
    }

    /// Wrap an existing world, such as one restored from a save.
    pub fn from_world(world: GameWorld, builder: Box<dyn DungeonBuilder>, content: Box<dyn ContentTables>) -> Self {
        Self {
            world,
            content,
            builder,
            phase: TurnPhase::AwaitingInput,
        }
    }

    /// The welcome banner. Restored games only get it with `always_greet`.
    pub fn greet(&mut self, restored: bool) {
        if restored && !self.world.options.always_greet {
            return;
        }
        let text = format!(
            "Welcome, {} the {}.",
            self.world.actor.name,
            self.world.actor.species.name()
        );
        self.world.say(Channel::Plain, &text);
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Play one input call: at most one command, then the world's reaction if
    /// time passed.
    pub fn step(
        &mut self,
        input: &mut dyn InputProvider,
        renderer: &mut dyn Renderer,
        sink: &mut dyn MessageSink,
    ) -> Result<StepOutcome, EngineError> {
        if self.world.actor.is_dead() {
            return Err(EngineError::GameOver);
        }
        self.phase = TurnPhase::AwaitingInput;
        let mut turn = TurnState::new(&self.world.actor);

        if self.world.actor.is_paralysed() {
            turn.turn_over = true;
        }
        if !turn.turn_over && systems::autopickup(&mut self.world) {
            turn.turn_over = true;
        }
        if !turn.turn_over {
            match systems::advance_delay(&mut self.world, self.builder.as_mut())? {
                DelayProgress::Waiting | DelayProgress::Finished => turn.turn_over = true,
                DelayProgress::Idle => {}
            }
        }

        if !turn.turn_over {
            let command = match systems::next_running_command(&mut self.world) {
                Some(command) => command,
                None => {
                    let key = input.next_key().ok_or(EngineError::InputExhausted)?;
                    systems::keymap(key)
                }
            };
            self.phase = TurnPhase::Resolving;
            systems::resolve(&mut self.world, &mut turn, command, input);
            if turn.turn_over && turn.apply_berserk_penalty {
                berserk_no_combat_penalty(&mut self.world.actor, &mut self.world.log);
            }
        }

        let mut outcome = if turn.turn_over {
            self.phase = TurnPhase::Reacting;
            let mut ports = Ports {
                content: self.content.as_ref(),
                builder: self.builder.as_mut(),
                renderer: &mut *renderer,
            };
            let report = run_cascade(&mut self.world, &mut turn, &mut ports)?;
            debug!("cascade ran {} stages", report.ran.len());
            match report.outcome {
                CascadeOutcome::Completed => StepOutcome::TurnTaken,
                CascadeOutcome::PlayerDied(stage) => {
                    info!(
                        "{} died in {:?}: {:?}",
                        self.world.actor.name, stage, self.world.actor.killed_by
                    );
                    StepOutcome::PlayerDied
                }
            }
        } else {
            StepOutcome::NoTime
        };
        if outcome != StepOutcome::PlayerDied && self.world.actor.is_dead() {
            info!("{} died: {:?}", self.world.actor.name, self.world.actor.killed_by);
            outcome = StepOutcome::PlayerDied;
        }
        if outcome == StepOutcome::NoTime {
            outcome = match turn.session {
                Some(SessionRequest::Save) => StepOutcome::SaveRequested,
                Some(SessionRequest::Quit) => StepOutcome::QuitRequested,
                None => StepOutcome::NoTime,
            };
        }

        self.hand_off(&turn, renderer, sink);
        self.phase = TurnPhase::Done;
        Ok(outcome)
    }

    /// Tell the renderer what changed and pass the turn's messages on.
    fn hand_off(&mut self, turn: &TurnState, renderer: &mut dyn Renderer, sink: &mut dyn MessageSink) {
        let mut regions = dirty_regions(&self.world.actor.redraw);
        if turn.turn_over {
            regions.push(Region::Map);
        }
        if !regions.is_empty() {
            renderer.mark_dirty(&regions);
        }
        self.world.actor.redraw.clear();
        if turn.full_redraw {
            renderer.full_redraw();
        }
        self.world.log.flush_into(sink);
    }

    /// Save the session. The RNG is reseeded so the saved and the live game
    /// continue with the same rolls.
    pub fn save<W: Write>(&mut self, writer: W) -> Result<(), SaveError> {
        persistence::save_game(writer, &mut self.world)
    }

    /// Restore a saved session.
    pub fn load<R: Read>(
        reader: R,
        builder: Box<dyn DungeonBuilder>,
        content: Box<dyn ContentTables>,
    ) -> Result<Self, SaveError> {
        let world = persistence::load_game(reader)?;
        let mut engine = Self::from_world(world, builder, content);
        engine.greet(true);
        Ok(engine)
    }
}

fn dirty_regions(flags: &RedrawFlags) -> Vec<Region> {
    [
        (flags.hit_points, Region::HitPoints),
        (flags.magic_points, Region::MagicPoints),
        (flags.strength, Region::Strength),
        (flags.armour_class, Region::ArmourClass),
        (flags.evasion, Region::Evasion),
        (flags.burden, Region::Burden),
        (flags.hunger, Region::Hunger),
        (flags.status, Region::Status),
        (flags.wield, Region::Wield),
        (flags.turn_count, Region::TurnCount),
    ]
    .into_iter()
    .filter_map(|(dirty, region)| dirty.then_some(region))
    .collect()
}
