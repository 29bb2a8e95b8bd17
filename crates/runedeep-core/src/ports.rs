//! Narrow interfaces to everything outside the turn loop: input, rendering,
//! content tables and level generation. Messages go out through
//! [`MessageSink`], defined in the logic crate.

use std::collections::VecDeque;

use runedeep_logic::bestiary::{self, MonsterDef, MonsterKind};
use runedeep_logic::dice::Dice;
use runedeep_logic::items::Item;
use runedeep_logic::level::LevelInfo;
pub use runedeep_logic::messages::MessageSink;
use runedeep_logic::movement::Coord;
use serde::{Deserialize, Serialize};

use crate::components::{Attitude, Behaviour};
use crate::error::LayoutError;
use crate::grid::Grid;

/// An opaque input symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keycode {
    Char(char),
    /// Control plus a letter, stored lower-case.
    Ctrl(char),
    Escape,
}

pub trait InputProvider {
    /// Next key, or `None` when input has run out.
    fn next_key(&mut self) -> Option<Keycode>;
}

/// Keys from a fixed script, for harnesses and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    keys: VecDeque<Keycode>,
}

impl ScriptedInput {
    pub fn new(keys: impl IntoIterator<Item = Keycode>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// One key per character. `^x` is Ctrl-x.
    pub fn from_keys(script: &str) -> Self {
        let mut keys = VecDeque::new();
        let mut chars = script.chars();
        while let Some(c) = chars.next() {
            match c {
                '^' => {
                    if let Some(letter) = chars.next() {
                        keys.push_back(Keycode::Ctrl(letter.to_ascii_lowercase()));
                    }
                }
                other => keys.push_back(Keycode::Char(other)),
            }
        }
        Self { keys }
    }

    pub fn push(&mut self, key: Keycode) {
        self.keys.push_back(key);
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl InputProvider for ScriptedInput {
    fn next_key(&mut self) -> Option<Keycode> {
        self.keys.pop_front()
    }
}

/// Screen areas a front end may need to repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    HitPoints,
    MagicPoints,
    Strength,
    ArmourClass,
    Evasion,
    Burden,
    Hunger,
    Status,
    Wield,
    TurnCount,
    Map,
}

pub trait Renderer {
    fn mark_dirty(&mut self, regions: &[Region]);
    fn full_redraw(&mut self);
    /// Block until the player acknowledges the messages shown so far.
    fn more(&mut self);
}

/// Renderer that only counts what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub dirty: Vec<Region>,
    pub full_redraws: u32,
    pub mores: u32,
}

impl Renderer for RecordingRenderer {
    fn mark_dirty(&mut self, regions: &[Region]) {
        for region in regions {
            if !self.dirty.contains(region) {
                self.dirty.push(*region);
            }
        }
    }

    fn full_redraw(&mut self) {
        self.full_redraws += 1;
    }

    fn more(&mut self) {
        self.mores += 1;
    }
}

/// Monster definitions and wandering-monster selection.
pub trait ContentTables {
    fn monster(&self, kind: MonsterKind) -> &MonsterDef;
    fn wandering_monster(&self, level: &LevelInfo, demonic: bool, dice: &mut dyn Dice) -> Option<MonsterKind>;
}

/// The built-in bestiary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bestiary;

impl ContentTables for Bestiary {
    fn monster(&self, kind: MonsterKind) -> &MonsterDef {
        bestiary::monster_def(kind)
    }

    fn wandering_monster(&self, level: &LevelInfo, demonic: bool, dice: &mut dyn Dice) -> Option<MonsterKind> {
        let candidates = bestiary::wandering_candidates(level.kind, level.depth, demonic);
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[dice.below(candidates.len() as u32) as usize])
    }
}

/// How the actor arrives on a new level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arrival {
    /// Came down; start on up stairs.
    Descended,
    /// Came up; start on down stairs.
    Ascended,
    /// Banished, teleported or freshly started.
    Anywhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequest {
    pub level: LevelInfo,
    pub arrival: Arrival,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterPlacement {
    pub kind: MonsterKind,
    pub at: Coord,
    pub attitude: Attitude,
    pub behaviour: Behaviour,
}

/// A finished level ready to install in the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLayout {
    pub grid: Grid,
    pub start: Coord,
    pub monsters: Vec<MonsterPlacement>,
    pub items: Vec<(Coord, Item)>,
}

pub trait DungeonBuilder {
    fn build(&mut self, request: &LevelRequest, dice: &mut dyn Dice) -> Result<LevelLayout, LayoutError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use runedeep_logic::dice::ScriptedDice;
    use runedeep_logic::level::LevelKind;

    #[test]
    fn scripted_input_reads_ctrl_keys() {
        let mut input = ScriptedInput::from_keys("h^Lo.");
        assert_eq!(input.next_key(), Some(Keycode::Char('h')));
        assert_eq!(input.next_key(), Some(Keycode::Ctrl('l')));
        assert_eq!(input.next_key(), Some(Keycode::Char('o')));
        assert_eq!(input.next_key(), Some(Keycode::Char('.')));
        assert_eq!(input.next_key(), None);
    }

    #[test]
    fn recording_renderer_dedups_regions() {
        let mut renderer = RecordingRenderer::default();
        renderer.mark_dirty(&[Region::HitPoints, Region::Map]);
        renderer.mark_dirty(&[Region::HitPoints]);
        assert_eq!(renderer.dirty, vec![Region::HitPoints, Region::Map]);
    }

    #[test]
    fn pandemonium_wanderers_are_demons() {
        let level = LevelInfo {
            kind: LevelKind::Pandemonium,
            branch: Default::default(),
            depth: 20,
        };
        let kind = Bestiary.wandering_monster(&level, true, &mut ScriptedDice::repeat(1));
        assert_eq!(kind, Some(MonsterKind::Fiend));
    }
}
