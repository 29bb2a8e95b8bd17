//! Systems that run over the world.
//!
//! Each system is a free function over [`crate::world::GameWorld`]. Command
//! handlers return a [`Resolution`]; cascade stages return `()` or a
//! `Result` when they can break an invariant.

mod commands;
mod delays;
mod doors;
mod environment;
mod equipment;
mod monsters;
mod movement;
mod perception;
mod spawning;
mod time;
mod translocation;

pub use commands::*;
pub use delays::*;
pub use doors::*;
pub use environment::*;
pub use equipment::*;
pub use monsters::*;
pub use movement::*;
pub use perception::*;
pub use spawning::*;
pub use time::*;
pub use translocation::*;
