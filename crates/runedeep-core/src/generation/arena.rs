//! Arena generation - one walled room per level with stairs, pillars and a pool.

use runedeep_logic::bestiary::wandering_candidates;
use runedeep_logic::dice::Dice;
use runedeep_logic::items::{Item, ItemKind};
use runedeep_logic::level::LevelKind;
use runedeep_logic::movement::Coord;

use crate::components::{Attitude, Behaviour};
use crate::error::LayoutError;
use crate::grid::{Grid, Terrain};
use crate::ports::{Arrival, DungeonBuilder, LevelLayout, LevelRequest, MonsterPlacement};

const PLACEMENT_ATTEMPTS: u32 = 200;
/// Monsters start at least this far (squared) from the actor.
const MONSTER_CLEARANCE_SQ: i32 = 16;

/// Configuration for arena generation
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub width: i32,
    pub height: i32,
    /// Lone wall squares scattered through the room.
    pub pillars: u32,
    pub monsters: u32,
    pub gold_piles: u32,
    /// The Orb lies on this level, which has no way further down.
    pub orb_depth: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 16,
            pillars: 8,
            monsters: 3,
            gold_piles: 2,
            orb_depth: 6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArenaBuilder {
    pub config: ArenaConfig,
}

impl ArenaBuilder {
    pub fn new(config: ArenaConfig) -> Self {
        Self { config }
    }
}

impl DungeonBuilder for ArenaBuilder {
    fn build(&mut self, request: &LevelRequest, dice: &mut dyn Dice) -> Result<LevelLayout, LayoutError> {
        let cfg = &self.config;
        if cfg.width < 12 || cfg.height < 8 {
            return Err(LayoutError::TooSmall {
                width: cfg.width,
                height: cfg.height,
            });
        }
        let level = request.level;
        let mut grid = Grid::new(cfg.width, cfg.height, Terrain::Wall);
        for y in 1..cfg.height - 1 {
            for x in 1..cfg.width - 1 {
                grid.set_terrain(Coord::new(x, y), Terrain::Floor);
            }
        }

        let has_stairs = level.kind == LevelKind::Dungeon;
        let up = (has_stairs && level.depth > 1).then_some(Coord::new(2, 2));
        let down = (has_stairs && level.depth < cfg.orb_depth).then_some(Coord::new(cfg.width - 3, cfg.height - 3));
        if let Some(at) = up {
            grid.set_terrain(at, Terrain::StairsUp);
        }
        if let Some(at) = down {
            grid.set_terrain(at, Terrain::StairsDown);
        }
        let stairs: Vec<Coord> = up.into_iter().chain(down).collect();
        let clear_of_stairs = |at: Coord| stairs.iter().all(|s| s.chebyshev(at) > 1);

        place_pillars(&mut grid, cfg.pillars, dice, &clear_of_stairs);
        place_pool(&mut grid, level.depth, dice, &clear_of_stairs);

        let start = match request.arrival {
            Arrival::Descended => up,
            Arrival::Ascended => down,
            Arrival::Anywhere => None,
        };
        let start = match start {
            Some(at) => at,
            None => random_floor(&grid, dice, |_| true).ok_or(LayoutError::NoStart)?,
        };

        let mut taken = vec![start];
        let mut monsters = Vec::new();
        let candidates = wandering_candidates(level.kind, level.depth, false);
        if !candidates.is_empty() {
            for _ in 0..cfg.monsters {
                let kind = candidates[dice.below(candidates.len() as u32) as usize];
                let spot = random_floor(&grid, dice, |at| {
                    at.distance_squared(start) > MONSTER_CLEARANCE_SQ && !taken.contains(&at)
                });
                if let Some(at) = spot {
                    taken.push(at);
                    monsters.push(MonsterPlacement {
                        kind,
                        at,
                        attitude: Attitude::Hostile,
                        behaviour: Behaviour::Sleeping,
                    });
                }
            }
        }

        let mut items = Vec::new();
        for _ in 0..cfg.gold_piles {
            if let Some(at) = random_floor(&grid, dice, |at| at != start) {
                let amount = (10 + dice.below(20)) * level.depth.max(1);
                items.push((at, Item::new(ItemKind::Gold, amount)));
            }
        }
        if level.kind == LevelKind::Dungeon && level.depth == cfg.orb_depth {
            if let Some(at) = random_floor(&grid, dice, |at| at != start) {
                items.push((at, Item::new(ItemKind::Orb, 1)));
            }
        }

        Ok(LevelLayout {
            grid,
            start,
            monsters,
            items,
        })
    }
}

/// A random plain floor square that passes `accept`.
fn random_floor(grid: &Grid, dice: &mut dyn Dice, accept: impl Fn(Coord) -> bool) -> Option<Coord> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let at = Coord::new(
            dice.below(grid.width() as u32) as i32,
            dice.below(grid.height() as u32) as i32,
        );
        if grid.terrain(at) == Terrain::Floor && accept(at) {
            return Some(at);
        }
    }
    None
}

/// Pillars keep off the outer ring and never touch each other, so they cannot
/// wall off a pocket of floor.
fn place_pillars(grid: &mut Grid, count: u32, dice: &mut dyn Dice, clear_of_stairs: &impl Fn(Coord) -> bool) {
    let (w, h) = (grid.width(), grid.height());
    for _ in 0..count {
        let at = Coord::new(2 + dice.below((w - 4) as u32) as i32, 2 + dice.below((h - 4) as u32) as i32);
        let crowded = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| Coord::new(at.x + dx, at.y + dy)))
            .any(|c| grid.terrain(c) != Terrain::Floor);
        if !crowded && clear_of_stairs(at) {
            grid.set_terrain(at, Terrain::Wall);
        }
    }
}

/// A shallow pool, deep in the middle from depth 3, and a lava square from
/// depth 4.
fn place_pool(grid: &mut Grid, depth: u32, dice: &mut dyn Dice, clear_of_stairs: &impl Fn(Coord) -> bool) {
    let (w, h) = (grid.width(), grid.height());
    let centre = Coord::new(3 + dice.below((w - 6) as u32) as i32, 3 + dice.below((h - 6) as u32) as i32);
    let ring: Vec<Coord> = (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| Coord::new(centre.x + dx, centre.y + dy)))
        .collect();
    if ring.iter().all(|c| clear_of_stairs(*c)) {
        for at in ring {
            if grid.terrain(at) == Terrain::Floor {
                grid.set_terrain(at, Terrain::ShallowWater);
            }
        }
        if depth >= 3 {
            grid.set_terrain(centre, Terrain::DeepWater);
        }
    }

    if depth >= 4 {
        let lava = Coord::new(2 + dice.below((w - 4) as u32) as i32, 2 + dice.below((h - 4) as u32) as i32);
        if grid.terrain(lava) == Terrain::Floor && clear_of_stairs(lava) {
            grid.set_terrain(lava, Terrain::Lava);
        }
    }
}
