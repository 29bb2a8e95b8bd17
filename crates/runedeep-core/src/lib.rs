//! Runedeep Core - turn engine for a single-player roguelike
//!
//! One player command per turn is resolved against a shared world, and every
//! time-driven subsystem then advances by what that command cost.
//!
//! # Architecture
//!
//! The world is an explicit context ([`world::GameWorld`]) handed to every
//! system. Monsters, item piles and clouds live in a `hecs` ECS; the
//! [`grid::Grid`] holds terrain and the authoritative occupancy references.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`components`] | Monster, cloud and item-pile components |
//! | [`engine`] | `GameEngine::step`: input flow and render handoff |
//! | [`error`] | Engine errors and player-facing rejections |
//! | [`generation`] | Arena and preset level builders |
//! | [`grid`] | Terrain, traps, occupancy, visibility |
//! | [`persistence`] | bincode save/load |
//! | [`ports`] | Input, renderer, content and builder interfaces |
//! | [`rng`] | Seeded `Dice` implementation |
//! | [`systems`] | Command handlers and cascade stages |
//! | [`turn`] | Turn state and the ordered reaction cascade |
//! | [`world`] | The world context and clock |
//!
//! # Example
//!
//! ```rust,no_run
//! use runedeep_core::prelude::*;
//! use runedeep_core::generation::ArenaBuilder;
//! use runedeep_logic::config::GameOptions;
//! use runedeep_logic::messages::MessageLog;
//!
//! let mut engine = GameEngine::new(
//!     GameOptions::default(),
//!     Box::new(ArenaBuilder::default()),
//!     Box::new(Bestiary),
//! )
//! .unwrap();
//! let mut input = ScriptedInput::from_keys("lllj");
//! let mut renderer = RecordingRenderer::default();
//! let mut messages = MessageLog::new();
//! while let Ok(outcome) = engine.step(&mut input, &mut renderer, &mut messages) {
//!     if outcome == StepOutcome::PlayerDied {
//!         break;
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod generation;
pub mod grid;
pub mod persistence;
pub mod ports;
pub mod rng;
pub mod systems;
pub mod turn;
pub mod world;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{GameEngine, StepOutcome};
    pub use crate::error::{EngineError, Rejection};
    pub use crate::ports::{Bestiary, InputProvider, Keycode, RecordingRenderer, Renderer, ScriptedInput};
    pub use crate::world::GameWorld;
}
