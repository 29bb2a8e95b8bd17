//! Fatal invariant violations.
//!
//! These indicate a bug, not a game event. The engine aborts the turn cascade
//! and surfaces them to the host.

use thiserror::Error;

use crate::duration::Timer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{timer:?} counter is {value}, outside 0..={limit}")]
    TimerOutOfRange { timer: Timer, value: u32, limit: u32 },

    #[error("adding {added} ticks to {timer:?} (at {current}) overflows its range")]
    TimerOverflow { timer: Timer, current: u32, added: u32 },

    #[error("{timer:?} hastening would take it below zero")]
    TimerUnderflow { timer: Timer },

    #[error("regeneration remainder {0} is outside 0..100")]
    RegenRemainder(u32),

    #[error("elapsed time {elapsed} cannot absorb a turn costing {cost}")]
    ElapsedOverflow { elapsed: u64, cost: u32 },

    #[error("turn counter overflowed")]
    TurnCounterOverflow,
}
