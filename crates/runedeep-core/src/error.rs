//! Engine errors and player-facing rejections.

use runedeep_logic::error::InvariantViolation;
use thiserror::Error;

/// Why a step could not complete.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A counter or clock broke its invariant. The cascade was abandoned.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// The input port had nothing left when a command was needed.
    #[error("no more input")]
    InputExhausted,

    #[error("level generation failed: {0}")]
    Layout(#[from] LayoutError),

    /// The actor is dead; no further turns can be taken.
    #[error("the game is over")]
    GameOver,
}

/// A command that made sense but cannot be carried out. The text is shown to
/// the player as is, and no time passes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Unknown command.")]
    UnknownCommand,
    #[error("Ouch!")]
    Bump,
    #[error("You can't go up here!")]
    NoUpStairs,
    #[error("You can't go down here!")]
    NoDownStairs,
    #[error("You're floating high up above the floor!")]
    FloatingAboveStairs,
    #[error("You are too berserk!")]
    TooBerserk,
    #[error("There are monsters nearby!")]
    MonstersNearby,
    #[error("It's already open!")]
    AlreadyOpen,
    #[error("There's a creature in the doorway!")]
    CreatureInDoorway,
    #[error("There's something blocking the doorway.")]
    DoorwayBlocked,
    #[error("There isn't anything that you can close there!")]
    NothingToClose,
    #[error("You can't close doors on yourself!")]
    CloseOnSelf,
    #[error("You can't get to that trap right now.")]
    TrapUnreachable,
    #[error("There are no items here.")]
    NothingToPickUp,
    #[error("You can't walk into that!")]
    Impassable,
}

/// A level map that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("map has no rows")]
    Empty,
    #[error("row {row} is {found} wide, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown map glyph {0:?}")]
    UnknownGlyph(char),
    #[error("map has no starting position")]
    NoStart,
    #[error("a {width}x{height} arena is too small")]
    TooSmall { width: i32, height: i32 },
}
