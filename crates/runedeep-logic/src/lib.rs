//! Pure turn-resolution logic for Runedeep.
//!
//! Everything here works on plain data: an [`actor::Actor`], a few counters,
//! an injected [`dice::Dice`] and a [`messages::MessageSink`]. Nothing owns an
//! RNG, a map, or other creatures, so every rule is unit-testable with
//! scripted dice. The ECS-backed engine lives in `runedeep-core`.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actor`] | The player actor: pools, stats, equipment, timers, redraw flags |
//! | [`bestiary`] | Built-in monster table and wandering-monster candidates |
//! | [`config`] | Startup options (`GameOptions`) loaded from JSON |
//! | [`constants`] | Tunable numbers grouped by concern |
//! | [`dice`] | Injected randomness and scripted dice for tests |
//! | [`duration`] | Duration ledger and status counters (tick counts only) |
//! | [`error`] | Fatal invariant violations |
//! | [`hazards`] | Cloud kinds, resisted damage, cloud exposure |
//! | [`hunger`] | Food use per turn, hunger states, fainting and starvation |
//! | [`items`] | Item kinds, stacking, rods |
//! | [`ledger`] | Per-kind duration rules and the once-per-turn decrement pass |
//! | [`level`] | Level kinds, game phase, ambient spawn policy |
//! | [`messages`] | Channel-tagged messages and the sink port |
//! | [`movement`] | Coordinates, directions, confusion, action and move speed |
//! | [`recharge`] | Passive rod recharging |
//! | [`regen`] | HP/MP regeneration accumulators and rates |
//! | [`stealth`] | Stealth rating and door-noise odds |

pub mod actor;
pub mod bestiary;
pub mod config;
pub mod constants;
pub mod dice;
pub mod duration;
pub mod error;
pub mod hazards;
pub mod hunger;
pub mod items;
pub mod ledger;
pub mod level;
pub mod messages;
pub mod movement;
pub mod recharge;
pub mod regen;
pub mod stealth;
