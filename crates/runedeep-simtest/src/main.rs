//! Runedeep Headless Simulation Harness
//!
//! Plays seeded sessions against the arena builder and sweeps the pure turn
//! rules, checking the engine's invariants after every step. Runs entirely
//! in-process with a recording renderer.
//!
//! Usage:
//!   cargo run -p runedeep-simtest
//!   cargo run -p runedeep-simtest -- --seed 7 --turns 2000 --verbose
//!   RUST_LOG=runedeep_core=debug cargo run -p runedeep-simtest

use std::path::PathBuf;

use clap::Parser;
use log::{debug, warn};
use runedeep_core::engine::{GameEngine, StepOutcome};
use runedeep_core::error::EngineError;
use runedeep_core::generation::{ArenaBuilder, ArenaConfig};
use runedeep_core::ports::{Bestiary, InputProvider, Keycode, RecordingRenderer};
use runedeep_core::rng::GameRng;
use runedeep_core::turn::{run_cascade, CascadeOutcome, Ports, TurnState, CASCADE};
use runedeep_logic::actor::{Actor, Species};
use runedeep_logic::config::GameOptions;
use runedeep_logic::dice::Dice;
use runedeep_logic::duration::{DurationKind, Timer};
use runedeep_logic::hunger::apply_food_use;
use runedeep_logic::ledger::decrement_all;
use runedeep_logic::level::{Branch, GamePhase, LevelInfo, LevelKind};
use runedeep_logic::messages::{Message, MessageLog};
use runedeep_logic::regen::{mp_regen_rate, regenerate, Accumulator};

#[derive(Parser, Debug)]
#[command(name = "runedeep-simtest", about = "Headless simulation harness for Runedeep")]
struct Args {
    /// First seed of the session sweep
    #[arg(long, short = 's', default_value_t = 1)]
    seed: u64,

    /// Number of seeded sessions to play
    #[arg(long, default_value_t = 8)]
    sessions: u64,

    /// Engine steps per session
    #[arg(long, short = 't', default_value_t = 500)]
    turns: u32,

    /// Game options as JSON (player name, species, autopickup...)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print passing checks as well as failures
    #[arg(long, short = 'v')]
    verbose: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args = Args::parse();
    let default_filter = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();

    println!("=== Runedeep Simulation Harness ===\n");

    let options = match &args.options {
        Some(path) => match GameOptions::load(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("cannot use {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => GameOptions::default(),
    };

    let mut results = Vec::new();

    // 1. Duration ledger sweep
    results.extend(validate_duration_ledger(args.seed));

    // 2. Regeneration accumulator
    results.extend(validate_regeneration());

    // 3. Ambient spawn policy
    results.extend(validate_spawn_policy(args.seed));

    // 4. Cascade order
    results.extend(validate_cascade_order(&options));

    // 5. Seeded sessions
    results.extend(validate_sessions(&options, &args));

    // 6. Save/load replay
    results.extend(validate_save_replay(&options, &args));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Random input ────────────────────────────────────────────────────────

/// Keys a wandering player might press. Save and quit are left out so a
/// session runs to its step limit or the actor's death.
const WANDER_KEYS: &[char] = &[
    'h', 'j', 'k', 'l', 'y', 'u', 'b', 'n', 'h', 'j', 'k', 'l', 'H', 'J', 'K', 'L', 's', '5', 'o', 'c', '<',
    '>', 'g', 'C', '!', 'z',
];

/// Endless seeded key stream.
#[derive(Clone)]
struct Wanderer {
    rng: GameRng,
}

impl Wanderer {
    fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::seeded(seed ^ 0x5eed),
        }
    }
}

impl InputProvider for Wanderer {
    fn next_key(&mut self) -> Option<Keycode> {
        let index = self.rng.below(WANDER_KEYS.len() as u32) as usize;
        Some(Keycode::Char(WANDER_KEYS[index]))
    }
}

fn seeded_options(options: &GameOptions, seed: u64) -> GameOptions {
    GameOptions {
        seed: Some(seed),
        ..options.clone()
    }
}

fn arena_engine(options: &GameOptions, seed: u64) -> Result<GameEngine, EngineError> {
    GameEngine::new(
        seeded_options(options, seed),
        Box::new(ArenaBuilder::new(ArenaConfig::default())),
        Box::new(Bestiary),
    )
}

/// Summary of one played session.
#[derive(Default)]
struct SessionStats {
    steps: u32,
    turns: u64,
    free_actions: u32,
    deepest: u32,
    died: bool,
    violations: Vec<String>,
}

/// Step `engine` up to `limit` times, checking invariants after each step.
fn play_session(engine: &mut GameEngine, input: &mut Wanderer, limit: u32) -> SessionStats {
    let mut stats = SessionStats {
        deepest: engine.world.level.depth,
        ..SessionStats::default()
    };
    let mut renderer = RecordingRenderer::default();
    let mut sink = MessageLog::new();

    for _ in 0..limit {
        let before = engine.world.clock;
        let outcome = engine.step(input, &mut renderer, &mut sink);
        stats.steps += 1;
        let after = engine.world.clock;

        match outcome {
            Ok(StepOutcome::TurnTaken) => {
                if after.turns != before.turns + 1 || after.elapsed <= before.elapsed {
                    stats.violations.push(format!("turn taken but clock went {:?} -> {:?}", before, after));
                }
            }
            Ok(StepOutcome::NoTime) => {
                stats.free_actions += 1;
                if after != before {
                    stats.violations.push(format!("free action moved the clock at turn {}", before.turns));
                }
            }
            Ok(StepOutcome::PlayerDied) | Err(EngineError::GameOver) => {
                stats.died = true;
            }
            Ok(other) => {
                stats.violations.push(format!("unexpected outcome {:?}", other));
            }
            Err(e) => {
                stats.violations.push(format!("step failed at turn {}: {}", before.turns, e));
                break;
            }
        }

        let world = &engine.world;
        if !world.occupancy_consistent() {
            stats.violations.push(format!("occupancy out of step at turn {}", after.turns));
        }
        if let Err(e) = world.actor.timers().check_bounds() {
            stats.violations.push(format!("timer out of range at turn {}: {}", after.turns, e));
        }
        if world.actor.hp > world.actor.hp_max || world.actor.mp > world.actor.mp_max {
            stats.violations.push(format!("pools above maximum at turn {}", after.turns));
        }
        if !world.grid.in_bounds(world.actor.pos) {
            stats.violations.push(format!("actor left the map at turn {}", after.turns));
        }
        stats.deepest = stats.deepest.max(world.level.depth);

        if stats.died || !stats.violations.is_empty() {
            break;
        }
    }
    stats.turns = engine.world.clock.turns;
    stats
}

// ── 1. Duration Ledger ──────────────────────────────────────────────────

fn validate_duration_ledger(seed: u64) -> Vec<TestResult> {
    println!("--- Duration Ledger ---");
    let mut results = Vec::new();

    // Every effect at 1 expires in one pass, exactly once.
    let mut misfires = Vec::new();
    for kind in DurationKind::ALL {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.durations.set(kind, 1);
        let mut out: Vec<Message> = Vec::new();
        let mut dice = GameRng::seeded(seed);
        match decrement_all(&mut actor, 10, &mut dice, &mut out) {
            Ok(report) => {
                let count = report.expired.iter().filter(|t| **t == Timer::Duration(kind)).count();
                if actor.durations.get(kind) != 0 || count != 1 {
                    misfires.push(format!("{:?}", kind));
                }
            }
            Err(e) => misfires.push(format!("{:?}: {}", kind, e)),
        }
    }
    results.push(TestResult {
        name: "ledger_single_expiry".into(),
        passed: misfires.is_empty(),
        detail: if misfires.is_empty() {
            format!("all {} effects expire once from 1", DurationKind::COUNT)
        } else {
            format!("misfired: {}", misfires.join(", "))
        },
    });

    // Random loads of effects drain without leaving bounds.
    let mut rng = GameRng::seeded(seed);
    let mut failure = None;
    let mut passes = 0u32;
    'sweep: for trial in 0..50 {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hp_max = 60;
        actor.hp = 60;
        for kind in DurationKind::ALL {
            if rng.one_chance_in(3) {
                actor.durations.set(kind, rng.below(120) + 1);
            }
        }
        let mut out: Vec<Message> = Vec::new();
        for _ in 0..400 {
            if let Err(e) = decrement_all(&mut actor, 10, &mut rng, &mut out) {
                failure = Some(format!("trial {}: {}", trial, e));
                break 'sweep;
            }
            passes += 1;
            if let Err(e) = actor.timers().check_bounds() {
                failure = Some(format!("trial {}: {}", trial, e));
                break 'sweep;
            }
        }
    }
    results.push(TestResult {
        name: "ledger_bounds_sweep".into(),
        passed: failure.is_none(),
        detail: failure.unwrap_or_else(|| format!("{} passes within bounds", passes)),
    });

    results
}

// ── 2. Regeneration ─────────────────────────────────────────────────────

fn validate_regeneration() -> Vec<TestResult> {
    println!("--- Regeneration ---");
    let mut results = Vec::new();

    let mut mismatches = 0;
    let mut cases = 0;
    for start in [0u32, 1, 50, 99] {
        for rate in [0u32, 1, 7, 20, 100, 250] {
            cases += 1;
            let Ok(mut acc) = Accumulator::with_remainder(start) else {
                mismatches += 1;
                continue;
            };
            let mut units = 0;
            for _ in 0..137 {
                units += acc.accrue(rate).unwrap_or(0);
            }
            let total = start + rate * 137;
            if units != total / 100 || acc.remainder() != total % 100 {
                mismatches += 1;
            }
        }
    }
    results.push(TestResult {
        name: "regen_closed_form".into(),
        passed: mismatches == 0,
        detail: format!("{}/{} accumulator cases match carry arithmetic", cases - mismatches, cases),
    });

    results.push(TestResult {
        name: "regen_out_of_range_refused".into(),
        passed: Accumulator::with_remainder(100).is_err(),
        detail: "a remainder of 100 is refused".into(),
    });

    // Food use and regeneration in cascade order restore magic at the rate.
    let mut actor = Actor::new("Tess", Species::Human);
    actor.mp_max = 10;
    actor.mp = 0;
    let rate = mp_regen_rate(&actor);
    let mut ok = true;
    for _ in 0..30 {
        apply_food_use(&mut actor, 10);
        ok &= regenerate(&mut actor).is_ok();
    }
    let expected = ((rate * 30) / 100).min(10) as i32;
    results.push(TestResult {
        name: "regen_magic_rate".into(),
        passed: ok && actor.mp == expected,
        detail: format!("rate {} gave {} mp over 30 turns (expected {})", rate, actor.mp, expected),
    });

    results
}

// ── 3. Spawn Policy ─────────────────────────────────────────────────────

fn spawn_frequency(level: LevelInfo, phase: GamePhase, rolls: u32, rng: &mut GameRng) -> f64 {
    let hits = (0..rolls)
        .filter(|_| runedeep_logic::level::ambient_spawn(&level, phase, rng).is_some())
        .count();
    hits as f64 / rolls as f64
}

fn validate_spawn_policy(seed: u64) -> Vec<TestResult> {
    println!("--- Spawn Policy ---");
    let mut results = Vec::new();
    let mut rng = GameRng::seeded(seed);
    let rolls = 60_000;

    let abyss = LevelInfo {
        kind: LevelKind::Abyss,
        branch: Branch::Main,
        depth: 1,
    };
    let freq = spawn_frequency(abyss, GamePhase::Descent, rolls, &mut rng);
    results.push(TestResult {
        name: "spawn_abyss_rate".into(),
        passed: (0.18..0.22).contains(&freq),
        detail: format!("{:.4} of turns spawn (expected 1/5)", freq),
    });

    let freq = spawn_frequency(LevelInfo::dungeon(5), GamePhase::OrbRun, rolls, &mut rng);
    results.push(TestResult {
        name: "spawn_orb_run_rate".into(),
        passed: (0.09..0.11).contains(&freq),
        detail: format!("{:.4} of turns spawn (expected 1/10)", freq),
    });

    let freq = spawn_frequency(LevelInfo::dungeon(5), GamePhase::Descent, rolls, &mut rng);
    results.push(TestResult {
        name: "spawn_descent_rate".into(),
        passed: freq > 0.0 && freq < 0.01,
        detail: format!("{:.4} of turns spawn (expected 1/240)", freq),
    });

    let temple = LevelInfo {
        kind: LevelKind::Dungeon,
        branch: Branch::Temple,
        depth: 1,
    };
    let freq = spawn_frequency(temple, GamePhase::OrbRun, rolls, &mut rng);
    results.push(TestResult {
        name: "spawn_temple_quiet".into(),
        passed: freq == 0.0,
        detail: format!("{:.4} of turns spawn in the temple", freq),
    });

    results
}

// ── 4. Cascade Order ────────────────────────────────────────────────────

fn validate_cascade_order(options: &GameOptions) -> Vec<TestResult> {
    println!("--- Cascade Order ---");
    let mut results = Vec::new();

    let mut engine = match arena_engine(options, 11) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "cascade_engine".into(),
                passed: false,
                detail: format!("engine failed to start: {}", e),
            });
            return results;
        }
    };

    let mut builder = ArenaBuilder::default();
    let mut renderer = RecordingRenderer::default();
    let mut ports = Ports {
        content: &Bestiary,
        builder: &mut builder,
        renderer: &mut renderer,
    };
    let mut turn = TurnState::new(&engine.world.actor);
    turn.turn_over = true;
    match run_cascade(&mut engine.world, &mut turn, &mut ports) {
        Ok(report) => {
            results.push(TestResult {
                name: "cascade_full_order".into(),
                passed: report.ran == CASCADE.to_vec() && report.outcome == CascadeOutcome::Completed,
                detail: format!("{} of {} stages ran in order", report.ran.len(), CASCADE.len()),
            });
        }
        Err(e) => results.push(TestResult {
            name: "cascade_full_order".into(),
            passed: false,
            detail: format!("cascade failed: {}", e),
        }),
    }

    results
}

// ── 5. Seeded Sessions ──────────────────────────────────────────────────

fn validate_sessions(options: &GameOptions, args: &Args) -> Vec<TestResult> {
    println!("--- Seeded Sessions ---");
    let mut results = Vec::new();
    let mut total_turns = 0;
    let mut deaths = 0;
    let mut deepest = 0;

    for seed in args.seed..args.seed + args.sessions {
        let mut engine = match arena_engine(options, seed) {
            Ok(engine) => engine,
            Err(e) => {
                results.push(TestResult {
                    name: format!("session_{}", seed),
                    passed: false,
                    detail: format!("engine failed to start: {}", e),
                });
                continue;
            }
        };
        let mut input = Wanderer::new(seed);
        let stats = play_session(&mut engine, &mut input, args.turns);
        debug!(
            "seed {}: {} steps, {} turns, {} free, depth {}",
            seed, stats.steps, stats.turns, stats.free_actions, stats.deepest
        );
        if stats.died {
            deaths += 1;
        }
        total_turns += stats.turns;
        deepest = deepest.max(stats.deepest);
        if !stats.violations.is_empty() {
            warn!("seed {}: {}", seed, stats.violations[0]);
        }
        results.push(TestResult {
            name: format!("session_{}", seed),
            passed: stats.violations.is_empty(),
            detail: if stats.violations.is_empty() {
                format!(
                    "{} steps, {} turns, depth {}{}",
                    stats.steps,
                    stats.turns,
                    stats.deepest,
                    if stats.died { ", died" } else { "" }
                )
            } else {
                stats.violations.join("; ")
            },
        });
    }

    results.push(TestResult {
        name: "sessions_progress".into(),
        passed: total_turns > 0,
        detail: format!("{} turns played, {} deaths, deepest level {}", total_turns, deaths, deepest),
    });

    // The same seed and keys play out the same game.
    let replay = |seed: u64| -> Option<(u64, Actor)> {
        let mut engine = arena_engine(options, seed).ok()?;
        play_session(&mut engine, &mut Wanderer::new(seed), args.turns.min(200));
        Some((engine.world.clock.turns, engine.world.actor.clone()))
    };
    let first = replay(args.seed);
    let second = replay(args.seed);
    results.push(TestResult {
        name: "sessions_deterministic".into(),
        passed: first.is_some() && first == second,
        detail: format!("seed {} replays identically", args.seed),
    });

    results
}

// ── 6. Save/Load Replay ─────────────────────────────────────────────────

fn validate_save_replay(options: &GameOptions, args: &Args) -> Vec<TestResult> {
    println!("--- Save/Load Replay ---");
    let mut results = Vec::new();
    let seed = args.seed + 1000;

    let mut live = match arena_engine(options, seed) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "replay_start".into(),
                passed: false,
                detail: format!("engine failed to start: {}", e),
            });
            return results;
        }
    };
    let mut input = Wanderer::new(seed);
    let warmup = play_session(&mut live, &mut input, 40);
    if warmup.died {
        results.push(TestResult {
            name: "replay_roundtrip".into(),
            passed: true,
            detail: "actor died before the save point; nothing to replay".into(),
        });
        return results;
    }

    let mut buffer = Vec::new();
    if let Err(e) = live.save(&mut buffer) {
        results.push(TestResult {
            name: "replay_save".into(),
            passed: false,
            detail: format!("save failed: {}", e),
        });
        return results;
    }
    results.push(TestResult {
        name: "replay_save".into(),
        passed: !buffer.is_empty(),
        detail: format!("{} bytes at turn {}", buffer.len(), live.world.clock.turns),
    });

    let mut restored = match GameEngine::load(
        &buffer[..],
        Box::new(ArenaBuilder::new(ArenaConfig::default())),
        Box::new(Bestiary),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "replay_load".into(),
                passed: false,
                detail: format!("load failed: {}", e),
            });
            return results;
        }
    };

    let mut restored_input = input.clone();
    let live_stats = play_session(&mut live, &mut input, 150);
    let restored_stats = play_session(&mut restored, &mut restored_input, 150);
    let same = live.world.clock == restored.world.clock
        && live.world.actor == restored.world.actor
        && live.world.level == restored.world.level;
    results.push(TestResult {
        name: "replay_roundtrip".into(),
        passed: same && live_stats.violations.is_empty() && restored_stats.violations.is_empty(),
        detail: format!(
            "live and restored games agree after {} more steps (turn {})",
            live_stats.steps, live.world.clock.turns
        ),
    });

    results
}
