//! Generation - simple level builders for the harness and tests.
//!
//! Real map generation is a host concern behind [`crate::ports::DungeonBuilder`].
//! These builders only produce enough variety to drive every turn-loop path.

mod arena;
mod preset;

pub use arena::*;
pub use preset::*;
