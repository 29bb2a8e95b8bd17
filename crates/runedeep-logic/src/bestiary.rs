//! A small built-in monster table.
//!
//! Enough creatures to exercise every turn-loop path (sleepers, swimmers,
//! allies, banishers, demons). Real content comes from the host through the
//! engine's content port.

use serde::{Deserialize, Serialize};

use crate::level::LevelKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Rat,
    Jackal,
    Goblin,
    Orc,
    Ogre,
    GiantEel,
    Hound,
    AbyssalWarden,
    Imp,
    Fiend,
    Oklob,
}

/// Special effect of a monster's melee hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackEffect {
    /// One time in `odds`, the target is cast into the Abyss.
    Banish { odds: u32 },
    Poison { strength: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterDef {
    pub kind: MonsterKind,
    pub name: &'static str,
    pub hit_points: i32,
    /// Attack as `count` dice of `sides`.
    pub attack: (u32, u32),
    /// Energy gained per normal turn; 10 acts once.
    pub speed: u32,
    pub effect: Option<AttackEffect>,
    pub stationary: bool,
    pub aquatic: bool,
    pub res_fire: i32,
    pub min_depth: u32,
}

const fn def(kind: MonsterKind, name: &'static str, hit_points: i32, attack: (u32, u32), speed: u32, min_depth: u32) -> MonsterDef {
    MonsterDef {
        kind,
        name,
        hit_points,
        attack,
        speed,
        effect: None,
        stationary: false,
        aquatic: false,
        res_fire: 0,
        min_depth,
    }
}

pub static MONSTERS: [MonsterDef; 11] = [
    def(MonsterKind::Rat, "rat", 3, (1, 3), 10, 1),
    def(MonsterKind::Jackal, "jackal", 5, (1, 3), 14, 1),
    def(MonsterKind::Goblin, "goblin", 6, (1, 4), 10, 1),
    def(MonsterKind::Orc, "orc", 10, (1, 6), 10, 3),
    def(MonsterKind::Ogre, "ogre", 30, (2, 8), 10, 7),
    MonsterDef {
        aquatic: true,
        ..def(MonsterKind::GiantEel, "giant eel", 14, (1, 8), 14, 4)
    },
    def(MonsterKind::Hound, "hound", 12, (1, 6), 15, 2),
    MonsterDef {
        effect: Some(AttackEffect::Banish { odds: 4 }),
        ..def(MonsterKind::AbyssalWarden, "abyssal warden", 25, (1, 6), 10, 10)
    },
    MonsterDef {
        res_fire: 2,
        ..def(MonsterKind::Imp, "imp", 10, (1, 5), 13, 1)
    },
    MonsterDef {
        res_fire: 3,
        effect: Some(AttackEffect::Poison { strength: 3 }),
        ..def(MonsterKind::Fiend, "fiend", 60, (3, 8), 12, 1)
    },
    MonsterDef {
        stationary: true,
        ..def(MonsterKind::Oklob, "oklob plant", 20, (1, 8), 10, 5)
    },
];

pub fn monster_def(kind: MonsterKind) -> &'static MonsterDef {
    MONSTERS
        .iter()
        .find(|d| d.kind == kind)
        .unwrap_or(&MONSTERS[0])
}

/// Candidates for a wandering spawn on this level.
pub fn wandering_candidates(level: LevelKind, depth: u32, demonic: bool) -> Vec<MonsterKind> {
    if demonic || level == LevelKind::Pandemonium {
        return vec![MonsterKind::Imp, MonsterKind::Fiend];
    }
    if level == LevelKind::Abyss {
        return vec![MonsterKind::AbyssalWarden, MonsterKind::Imp, MonsterKind::Hound];
    }
    MONSTERS
        .iter()
        .filter(|d| d.min_depth <= depth)
        .filter(|d| !d.aquatic && !d.stationary)
        .filter(|d| !matches!(d.kind, MonsterKind::Imp | MonsterKind::Fiend | MonsterKind::AbyssalWarden))
        .map(|d| d.kind)
        .collect()
}
