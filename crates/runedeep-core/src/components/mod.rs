//! Component definitions for the ECS world.
//!
//! Components are plain data attached to monsters, item piles and clouds.
//! Behaviour lives in systems.

mod creature;
mod feature;

pub use creature::*;
pub use feature::*;
