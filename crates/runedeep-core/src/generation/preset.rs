//! Preset levels - a fixed ASCII map handed back on every request.

use runedeep_logic::bestiary::MonsterKind;
use runedeep_logic::dice::Dice;
use runedeep_logic::items::Item;
use runedeep_logic::movement::Coord;

use crate::components::{Attitude, Behaviour};
use crate::error::LayoutError;
use crate::grid::{Grid, Terrain};
use crate::ports::{Arrival, DungeonBuilder, LevelLayout, LevelRequest, MonsterPlacement};

/// Builds the same map for every level. Arrivals by stairs start on the
/// matching staircase when the map has one.
#[derive(Debug, Clone)]
pub struct PresetBuilder {
    grid: Grid,
    start: Coord,
    monsters: Vec<MonsterPlacement>,
    items: Vec<(Coord, Item)>,
    /// How many levels have been handed out.
    pub builds: u32,
}

impl PresetBuilder {
    pub fn from_rows(rows: &[&str]) -> Result<Self, LayoutError> {
        let (grid, start) = Grid::from_rows(rows)?;
        Ok(Self {
            grid,
            start,
            monsters: Vec::new(),
            items: Vec::new(),
            builds: 0,
        })
    }

    pub fn with_monster(mut self, kind: MonsterKind, at: Coord, attitude: Attitude, behaviour: Behaviour) -> Self {
        self.monsters.push(MonsterPlacement {
            kind,
            at,
            attitude,
            behaviour,
        });
        self
    }

    pub fn with_item(mut self, at: Coord, item: Item) -> Self {
        self.items.push((at, item));
        self
    }
}

impl DungeonBuilder for PresetBuilder {
    fn build(&mut self, request: &LevelRequest, _dice: &mut dyn Dice) -> Result<LevelLayout, LayoutError> {
        self.builds += 1;
        let stairs = match request.arrival {
            Arrival::Descended => self.grid.find_terrain(Terrain::StairsUp).first().copied(),
            Arrival::Ascended => self.grid.find_terrain(Terrain::StairsDown).first().copied(),
            Arrival::Anywhere => None,
        };
        Ok(LevelLayout {
            grid: self.grid.clone(),
            start: stairs.unwrap_or(self.start),
            monsters: self.monsters.clone(),
            items: self.items.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;
    use runedeep_logic::level::LevelInfo;

    #[test]
    fn descending_starts_on_the_up_stairs() {
        let mut builder = PresetBuilder::from_rows(&["#######", "#<.@.>#", "#######"]).unwrap();
        let request = LevelRequest {
            level: LevelInfo::dungeon(2),
            arrival: Arrival::Descended,
        };
        let layout = builder.build(&request, &mut GameRng::seeded(1)).unwrap();
        assert_eq!(layout.start, Coord::new(1, 1));
        assert_eq!(builder.builds, 1);
    }

    #[test]
    fn no_matching_stairs_falls_back_to_the_marked_start() {
        let mut builder = PresetBuilder::from_rows(&["#####", "#.@.#", "#####"]).unwrap();
        let request = LevelRequest {
            level: LevelInfo::dungeon(2),
            arrival: Arrival::Ascended,
        };
        let layout = builder.build(&request, &mut GameRng::seeded(1)).unwrap();
        assert_eq!(layout.start, Coord::new(2, 1));
    }
}
