//! Level kinds, the game phase, and the ambient spawn policy.

use serde::{Deserialize, Serialize};

use crate::constants::spawning::{
    ABYSS_ODDS, DESCENT_ODDS, ORB_RUN_ODDS, PANDEMONIUM_ODDS, PROXIMITY_ODDS,
};
use crate::dice::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    Dungeon,
    Labyrinth,
    Abyss,
    Pandemonium,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[default]
    Main,
    Temple,
    Mines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub kind: LevelKind,
    pub branch: Branch,
    pub depth: u32,
}

impl LevelInfo {
    pub fn dungeon(depth: u32) -> Self {
        Self {
            kind: LevelKind::Dungeon,
            branch: Branch::Main,
            depth,
        }
    }
}

/// Whether the actor is still heading down or carrying the Orb back up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Descent,
    OrbRun,
}

/// Where an ambient spawn may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proximity {
    Anywhere,
    CloseToPlayer,
    AwayFromPlayer,
    NearStairs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest {
    pub proximity: Proximity,
    /// Draw from the demon table instead of the level's wandering table.
    pub demonic: bool,
}

/// Roll for an ambient wandering monster this turn.
pub fn ambient_spawn(level: &LevelInfo, phase: GamePhase, dice: &mut dyn Dice) -> Option<SpawnRequest> {
    match level.kind {
        LevelKind::Dungeon if level.branch != Branch::Temple => {
            let odds = match phase {
                GamePhase::Descent => DESCENT_ODDS,
                GamePhase::OrbRun => ORB_RUN_ODDS,
            };
            if !dice.one_chance_in(odds) {
                return None;
            }
            let proximity = match phase {
                GamePhase::Descent if dice.one_chance_in(PROXIMITY_ODDS) => Proximity::NearStairs,
                GamePhase::Descent => Proximity::AwayFromPlayer,
                GamePhase::OrbRun if dice.one_chance_in(PROXIMITY_ODDS) => Proximity::CloseToPlayer,
                GamePhase::OrbRun => Proximity::Anywhere,
            };
            Some(SpawnRequest {
                proximity,
                demonic: false,
            })
        }
        LevelKind::Abyss if dice.one_chance_in(ABYSS_ODDS) => Some(SpawnRequest {
            proximity: Proximity::Anywhere,
            demonic: false,
        }),
        LevelKind::Pandemonium if dice.one_chance_in(PANDEMONIUM_ODDS) => Some(SpawnRequest {
            proximity: Proximity::Anywhere,
            demonic: true,
        }),
        _ => None,
    }
}
