//! Monster components.

use runedeep_logic::bestiary::{monster_def, MonsterDef, MonsterKind};
use runedeep_logic::movement::Coord;
use serde::{Deserialize, Serialize};

/// Where an entity stands. Must agree with the grid's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub Coord);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attitude {
    Hostile,
    Friendly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behaviour {
    Sleeping,
    Wandering,
    Hunting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub kind: MonsterKind,
    pub hp: i32,
    pub hp_max: i32,
    pub attitude: Attitude,
    pub behaviour: Behaviour,
    /// Banked action energy; one action costs 10.
    pub energy: u32,
}

impl Monster {
    pub fn new(kind: MonsterKind, attitude: Attitude, behaviour: Behaviour) -> Self {
        let hp = monster_def(kind).hit_points;
        Self {
            kind,
            hp,
            hp_max: hp,
            attitude,
            behaviour,
            energy: 0,
        }
    }

    pub fn def(&self) -> &'static MonsterDef {
        monster_def(self.kind)
    }

    pub fn name(&self) -> &'static str {
        self.def().name
    }

    pub fn is_friendly(&self) -> bool {
        self.attitude == Attitude::Friendly
    }

    pub fn is_hostile(&self) -> bool {
        self.attitude == Attitude::Hostile
    }

    pub fn is_asleep(&self) -> bool {
        self.behaviour == Behaviour::Sleeping
    }
}

/// Hidden under water. Submerged monsters do not block movement or attack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submerged;
