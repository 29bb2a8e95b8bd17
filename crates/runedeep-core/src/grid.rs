//! The level map: terrain, traps, occupancy, and what the actor can see.
//!
//! The grid is authoritative for occupancy. Each cell holds at most one
//! monster, one item pile and one cloud, referenced by `hecs::Entity`; the
//! entities carry a matching `Position`. Entity references are not saved and
//! are rebuilt from positions on load.

use hecs::Entity;
use runedeep_logic::constants::perception::LOS_RADIUS;
use runedeep_logic::movement::Coord;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Wall,
    Floor,
    ClosedDoor,
    OpenDoor,
    SecretDoor,
    StairsUp,
    StairsDown,
    ShallowWater,
    DeepWater,
    Lava,
}

impl Terrain {
    /// Blocks movement.
    pub fn is_solid(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::ClosedDoor | Terrain::SecretDoor)
    }

    /// Blocks sight.
    pub fn is_opaque(self) -> bool {
        self.is_solid()
    }

    pub fn is_water(self) -> bool {
        matches!(self, Terrain::ShallowWater | Terrain::DeepWater)
    }

    /// Walkable only while levitating.
    pub fn is_hazardous(self) -> bool {
        matches!(self, Terrain::DeepWater | Terrain::Lava)
    }

    pub fn glyph(self) -> char {
        match self {
            Terrain::Wall => '#',
            Terrain::Floor => '.',
            Terrain::ClosedDoor => '+',
            Terrain::OpenDoor => '\'',
            Terrain::SecretDoor => '%',
            Terrain::StairsUp => '<',
            Terrain::StairsDown => '>',
            Terrain::ShallowWater => '~',
            Terrain::DeepWater => 'W',
            Terrain::Lava => 'L',
        }
    }

    fn from_glyph(glyph: char) -> Option<Terrain> {
        let terrain = match glyph {
            '#' => Terrain::Wall,
            '.' | '@' | '^' => Terrain::Floor,
            '+' => Terrain::ClosedDoor,
            '\'' => Terrain::OpenDoor,
            '%' => Terrain::SecretDoor,
            '<' => Terrain::StairsUp,
            '>' => Terrain::StairsDown,
            '~' => Terrain::ShallowWater,
            'W' => Terrain::DeepWater,
            'L' => Terrain::Lava,
            _ => return None,
        };
        Some(terrain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    Dart,
    Blade,
    Teleport,
    Alarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub kind: TrapKind,
    /// Hidden traps must be found by searching before they can be disarmed.
    pub known: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub trap: Option<Trap>,
    #[serde(skip)]
    pub monster: Option<Entity>,
    #[serde(skip)]
    pub items: Option<Entity>,
    #[serde(skip)]
    pub cloud: Option<Entity>,
    pub visible: bool,
    pub seen: bool,
}

impl Cell {
    fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            trap: None,
            monster: None,
            items: None,
            cloud: None,
            visible: false,
            seen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32, fill: Terrain) -> Self {
        let count = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            cells: vec![Cell::new(fill); count],
        }
    }

    /// Parse an ASCII map. `@` marks the start square; `^` is floor with a
    /// known dart trap.
    pub fn from_rows(rows: &[&str]) -> Result<(Grid, Coord), LayoutError> {
        let expected = rows.first().ok_or(LayoutError::Empty)?.chars().count();
        let mut grid = Grid::new(expected as i32, rows.len() as i32, Terrain::Wall);
        let mut start = None;

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != expected {
                return Err(LayoutError::Ragged { row: y, found, expected });
            }
            for (x, glyph) in row.chars().enumerate() {
                let at = Coord::new(x as i32, y as i32);
                let terrain = Terrain::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph(glyph))?;
                grid.set_terrain(at, terrain);
                match glyph {
                    '@' => start = Some(at),
                    '^' => {
                        if let Some(cell) = grid.cell_mut(at) {
                            cell.trap = Some(Trap {
                                kind: TrapKind::Dart,
                                known: true,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        let start = start.ok_or(LayoutError::NoStart)?;
        Ok((grid, start))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }

    fn index(&self, at: Coord) -> Option<usize> {
        if self.in_bounds(at) {
            Some((at.y * self.width + at.x) as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, at: Coord) -> Option<&Cell> {
        self.index(at).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, at: Coord) -> Option<&mut Cell> {
        self.index(at).map(move |i| &mut self.cells[i])
    }

    /// Terrain at `at`; everything outside the map is wall.
    pub fn terrain(&self, at: Coord) -> Terrain {
        self.cell(at).map_or(Terrain::Wall, |c| c.terrain)
    }

    pub fn set_terrain(&mut self, at: Coord, terrain: Terrain) {
        if let Some(cell) = self.cell_mut(at) {
            cell.terrain = terrain;
        }
    }

    pub fn is_solid(&self, at: Coord) -> bool {
        self.terrain(at).is_solid()
    }

    pub fn monster_at(&self, at: Coord) -> Option<Entity> {
        self.cell(at).and_then(|c| c.monster)
    }

    pub fn items_at(&self, at: Coord) -> Option<Entity> {
        self.cell(at).and_then(|c| c.items)
    }

    pub fn cloud_at(&self, at: Coord) -> Option<Entity> {
        self.cell(at).and_then(|c| c.cloud)
    }

    pub fn trap_at(&self, at: Coord) -> Option<Trap> {
        self.cell(at).and_then(|c| c.trap)
    }

    pub fn is_visible(&self, at: Coord) -> bool {
        self.cell(at).is_some_and(|c| c.visible)
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coord::new(x, y)))
    }

    /// Drop every entity reference, keeping terrain and map memory.
    pub fn clear_occupants(&mut self) {
        for cell in &mut self.cells {
            cell.monster = None;
            cell.items = None;
            cell.cloud = None;
        }
    }

    pub fn find_terrain(&self, terrain: Terrain) -> Vec<Coord> {
        self.coords().filter(|c| self.terrain(*c) == terrain).collect()
    }

    /// Clear line within sight radius: no opaque cell strictly between.
    pub fn line_of_sight(&self, from: Coord, to: Coord) -> bool {
        if from.distance_squared(to) > LOS_RADIUS * LOS_RADIUS {
            return false;
        }
        let path = line(from, to);
        path.iter()
            .skip(1)
            .take(path.len().saturating_sub(2))
            .all(|c| !self.terrain(*c).is_opaque())
    }

    /// Recompute the visible set from `origin`; visible cells become seen.
    pub fn update_visibility(&mut self, origin: Coord) {
        let visible: Vec<bool> = self.coords().map(|c| self.line_of_sight(origin, c)).collect();
        for (cell, now) in self.cells.iter_mut().zip(visible) {
            cell.visible = now;
            cell.seen |= now;
        }
    }

    /// The map as glyphs, one string per row. Monsters and items are not shown.
    pub fn render(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.terrain(Coord::new(x, y)).glyph())
                    .collect()
            })
            .collect()
    }
}

/// Bresenham line from `from` to `to`, both ends included.
fn line(from: Coord, to: Coord) -> Vec<Coord> {
    let (mut x, mut y) = (from.x, from.y);
    let dx = (to.x - x).abs();
    let dy = -(to.y - y).abs();
    let sx = if x < to.x { 1 } else { -1 };
    let sy = if y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut out = Vec::new();
    loop {
        out.push(Coord::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: [&str; 5] = [
        "#######",
        "#@..+.#",
        "#.#...#",
        "#..^.>#",
        "#######",
    ];

    #[test]
    fn parses_start_and_features() {
        let (grid, start) = Grid::from_rows(&ROOM).unwrap();
        assert_eq!(start, Coord::new(1, 1));
        assert_eq!(grid.terrain(start), Terrain::Floor);
        assert_eq!(grid.terrain(Coord::new(4, 1)), Terrain::ClosedDoor);
        assert_eq!(grid.terrain(Coord::new(5, 3)), Terrain::StairsDown);
        assert_eq!(grid.trap_at(Coord::new(3, 3)).map(|t| t.kind), Some(TrapKind::Dart));
    }

    #[test]
    fn outside_the_map_is_wall() {
        let (grid, _) = Grid::from_rows(&ROOM).unwrap();
        assert_eq!(grid.terrain(Coord::new(-1, 0)), Terrain::Wall);
        assert_eq!(grid.terrain(Coord::new(7, 2)), Terrain::Wall);
        assert!(grid.is_solid(Coord::new(100, 100)));
    }

    #[test]
    fn rejects_bad_maps() {
        assert_eq!(Grid::from_rows(&[]).unwrap_err(), LayoutError::Empty);
        assert!(matches!(
            Grid::from_rows(&["###", "#@"]).unwrap_err(),
            LayoutError::Ragged { row: 1, .. }
        ));
        assert_eq!(Grid::from_rows(&["#?#"]).unwrap_err(), LayoutError::UnknownGlyph('?'));
        assert_eq!(Grid::from_rows(&["#.#"]).unwrap_err(), LayoutError::NoStart);
    }

    #[test]
    fn walls_and_doors_block_sight() {
        let (mut grid, start) = Grid::from_rows(&ROOM).unwrap();
        assert!(grid.line_of_sight(start, Coord::new(3, 1)));
        assert!(!grid.line_of_sight(start, Coord::new(5, 1)));
        assert!(grid.line_of_sight(start, Coord::new(4, 1)));

        grid.update_visibility(start);
        assert!(grid.is_visible(Coord::new(2, 1)));
        assert!(!grid.is_visible(Coord::new(5, 1)));
        assert!(grid.cell(Coord::new(2, 1)).unwrap().seen);
    }

    #[test]
    fn render_round_trips_terrain() {
        let (grid, _) = Grid::from_rows(&ROOM).unwrap();
        let rows = grid.render();
        assert_eq!(rows[1], "#...+.#");
        assert_eq!(rows[3], "#....>#");
    }
}
