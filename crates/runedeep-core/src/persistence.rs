//! Save/Load of a game session
//!
//! Uses bincode for a compact binary snapshot taken between turns. Entities
//! are flattened to optional components and respawned on load; the grid's
//! entity references are rebuilt from positions.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use hecs::World;
use log::info;
use runedeep_logic::actor::Actor;
use runedeep_logic::config::GameOptions;
use runedeep_logic::level::{GamePhase, LevelInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Cloud, ItemPile, Monster, Position, Submerged};
use crate::grid::Grid;
use crate::rng::GameRng;
use crate::world::{Clock, GameWorld};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a session
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub actor: Actor,
    pub grid: Grid,
    pub level: LevelInfo,
    pub phase: GamePhase,
    pub clock: Clock,
    pub options: GameOptions,
    /// Seed that continues the live RNG stream.
    pub rng_seed: u64,
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableEntity {
    pub position: Option<Position>,
    pub monster: Option<Monster>,
    pub submerged: bool,
    pub cloud: Option<Cloud>,
    pub pile: Option<ItemPile>,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    world
        .iter()
        .map(|entity_ref| SerializableEntity {
            position: entity_ref.get::<&Position>().map(|c| *c),
            monster: entity_ref.get::<&Monster>().map(|c| (*c).clone()),
            submerged: entity_ref.has::<Submerged>(),
            cloud: entity_ref.get::<&Cloud>().map(|c| *c),
            pile: entity_ref.get::<&ItemPile>().map(|c| (*c).clone()),
        })
        .collect()
}

/// Respawn saved entities and point the grid back at them.
fn restore_entities(world: &mut GameWorld, entities: Vec<SerializableEntity>) {
    world.grid.clear_occupants();
    for se in entities {
        let Some(position) = se.position else {
            continue;
        };
        let entity = world.entities.spawn((position,));
        let cell = world.grid.cell_mut(position.0);
        let mut refs = (false, false, false);
        if let Some(c) = se.monster {
            let _ = world.entities.insert_one(entity, c);
            refs.0 = true;
        }
        if se.submerged {
            let _ = world.entities.insert_one(entity, Submerged);
        }
        if let Some(c) = se.cloud {
            let _ = world.entities.insert_one(entity, c);
            refs.1 = true;
        }
        if let Some(c) = se.pile {
            let _ = world.entities.insert_one(entity, c);
            refs.2 = true;
        }
        if let Some(cell) = cell {
            if refs.0 {
                cell.monster = Some(entity);
            }
            if refs.1 {
                cell.cloud = Some(entity);
            }
            if refs.2 {
                cell.items = Some(entity);
            }
        }
    }
}

/// Write the session to `writer`. The live RNG is reseeded from the saved
/// seed so both copies roll the same from here on.
pub fn save_game<W: Write>(writer: W, world: &mut GameWorld) -> Result<(), SaveError> {
    let rng_seed = world.rng.next_seed();
    world.rng = GameRng::seeded(rng_seed);

    let save_data = SaveData {
        version: SAVE_VERSION,
        actor: world.actor.clone(),
        grid: world.grid.clone(),
        level: world.level,
        phase: world.phase,
        clock: world.clock,
        options: world.options.clone(),
        rng_seed,
        entities: serialize_entities(&world.entities),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

pub fn load_game<R: Read>(reader: R) -> Result<GameWorld, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = GameWorld::new(
        save_data.actor,
        save_data.grid,
        save_data.level,
        save_data.options,
        GameRng::seeded(save_data.rng_seed),
    );
    world.phase = save_data.phase;
    world.clock = save_data.clock;
    restore_entities(&mut world, save_data.entities);
    info!("restored {} at turn {}", world.actor.name, world.clock.turns);
    Ok(world)
}

pub fn save_to_path(path: &Path, world: &mut GameWorld) -> Result<(), SaveError> {
    let mut writer = BufWriter::new(File::create(path)?);
    save_game(&mut writer, world)?;
    writer.flush()?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<GameWorld, SaveError> {
    load_game(BufReader::new(File::open(path)?))
}
