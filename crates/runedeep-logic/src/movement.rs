//! Grid coordinates, compass directions, and movement timing.
//!
//! All functions here are pure: the engine owns the grid and decides what is
//! passable, this module only does the arithmetic.

use serde::{Deserialize, Serialize};

use crate::constants::time::BASE_ACTION_COST;
use crate::dice::Dice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta: Offset) -> Self {
        Self::new(self.x + delta.dx, self.y + delta.dy)
    }

    pub fn distance_squared(self, other: Coord) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// King-move distance.
    pub fn chebyshev(self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self != other && self.chebyshev(other) == 1
    }

    /// Offset of one step from `self` toward `target`.
    pub fn step_toward(self, target: Coord) -> Offset {
        Offset::new((target.x - self.x).signum(), (target.y - self.y).signum())
    }
}

/// A step within the 3x3 neighbourhood, `(0, 0)` included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const HERE: Offset = Offset { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// All nine offsets of the neighbourhood in row-major order.
    pub fn neighbourhood() -> impl Iterator<Item = Offset> {
        (-1..=1).flat_map(|dy| (-1..=1).map(move |dx| Offset::new(dx, dy)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn offset(self) -> Offset {
        match self {
            Direction::North => Offset::new(0, -1),
            Direction::NorthEast => Offset::new(1, -1),
            Direction::East => Offset::new(1, 0),
            Direction::SouthEast => Offset::new(1, 1),
            Direction::South => Offset::new(0, 1),
            Direction::SouthWest => Offset::new(-1, 1),
            Direction::West => Offset::new(-1, 0),
            Direction::NorthWest => Offset::new(-1, -1),
        }
    }

    /// vi-keys: `hjklyubn`, case-insensitive.
    pub fn from_vi_key(c: char) -> Option<Direction> {
        match c.to_ascii_lowercase() {
            'k' => Some(Direction::North),
            'u' => Some(Direction::NorthEast),
            'l' => Some(Direction::East),
            'n' => Some(Direction::SouthEast),
            'j' => Some(Direction::South),
            'b' => Some(Direction::SouthWest),
            'h' => Some(Direction::West),
            'y' => Some(Direction::NorthWest),
            _ => None,
        }
    }
}

/// A confused actor keeps its intended step one time in this many.
pub const CONFUSION_STEADY_ODDS: u32 = 3;

/// Apply confusion to an intended step.
///
/// With probability `1 - 1/CONFUSION_STEADY_ODDS` the step is replaced by a
/// uniformly chosen *different* offset of the 3x3 neighbourhood (standing
/// still included).
pub fn confused_offset(intended: Offset, dice: &mut dyn Dice) -> Offset {
    if dice.one_chance_in(CONFUSION_STEADY_ODDS) {
        return intended;
    }
    let others: Vec<Offset> = Offset::neighbourhood().filter(|o| *o != intended).collect();
    others[dice.below(others.len() as u32) as usize]
}

/// Time cost of one action before movement scaling.
pub fn action_speed(hasted: bool, slowed: bool, statue: bool) -> u32 {
    let mut speed = BASE_ACTION_COST;
    if hasted {
        speed /= 2;
    }
    if slowed {
        speed *= 2;
    }
    if statue {
        speed = speed * 15 / 10;
    }
    speed
}

/// Movement speed in tenths; 10 is normal.
pub fn movement_speed(swift: bool, burden: crate::actor::BurdenState) -> u32 {
    use crate::actor::BurdenState;
    let mut mv = BASE_ACTION_COST;
    if swift {
        mv -= 2;
    }
    match burden {
        BurdenState::Unencumbered => {}
        BurdenState::Encumbered => mv += 1,
        BurdenState::Overloaded => mv += 3,
    }
    mv.max(6)
}

/// Scale an action cost by movement speed, as a step does.
pub fn step_cost(action_cost: u32, movement_speed: u32) -> u32 {
    action_cost * movement_speed / BASE_ACTION_COST
}
