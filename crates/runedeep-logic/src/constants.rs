//! Tuning constants for the turn loop.
//!
//! Grouped by the subsystem that reads them. Time values are in "aut"
//! (tenths of a normal-speed turn), so a normal action costs `10`.

pub mod time {
    /// Time cost of one action at normal speed.
    pub const BASE_ACTION_COST: u32 = 10;
    /// Granularity of the slow world clock, in aut.
    pub const SYNCH_INTERVAL: u32 = 200;
}

pub mod durations {
    /// Upper bound for every duration or status counter.
    pub const TIMER_LIMIT: u32 = 30_000;
    /// Threshold at which most effects print their "running out" warning.
    pub const NEAR_EXPIRY_AT: u32 = 6;
    /// The near-expiry warning skips an extra tick one time in this many.
    pub const NEAR_EXPIRY_SKIP_ODDS: u32 = 2;
    /// Threshold for long effects (transformation, levitation, death's door).
    pub const LONG_EXPIRY_AT: u32 = 10;
    /// Threshold for the undead-repelling aura.
    pub const REPEL_UNDEAD_WARN_AT: u32 = 4;
    pub const GOURMAND_MAX: u32 = 200;
    pub const GOURMAND_GAIN_ODDS: u32 = 4;
    /// Kenku of at least this level keep flying indefinitely.
    pub const KENKU_PERMANENT_FLIGHT_LEVEL: u8 = 15;
    /// Levitation boots pin the levitation counter at this value.
    pub const BOOTS_LEVITATION_PIN: u32 = 2;
    pub const MIGHT_STRENGTH_BONUS: i32 = 5;
}

pub mod berserk {
    /// Base weight of "you pass out" when rage ends.
    pub const BASE_COLLAPSE_WEIGHT: u32 = 10;
    /// Weight per level of the berserk mutation.
    pub const MUTATION_WEIGHT: u32 = 25;
    pub const AMULET_WEIGHT: u32 = 10;
    pub const SPELL_WEIGHT: u32 = 5;
    pub const EXHAUSTION_BASE: u32 = 12;
    pub const COLLAPSE_HUNGER: i32 = 700;
    pub const COLLAPSE_HUNGER_FLOOR: i32 = 50;
    /// Trog grants vigour when piety beats a roll of this size.
    pub const TROG_PIETY_ROLL: u32 = 150;
}

pub mod regen {
    /// Points of accumulated regeneration per granted unit.
    pub const REGEN_UNIT: u32 = 100;
    pub const MP_BASE_RATE: u32 = 7;
    pub const RING_BONUS: u32 = 40;
    pub const MUTATION_BONUS: u32 = 30;
    pub const DURATION_BONUS: u32 = 100;
}

pub mod hunger {
    pub const STARTING: i32 = 6000;
    pub const MAX: i32 = 12_000;
    /// Below this the passive drain stops.
    pub const MIN_FOR_DRAIN: i32 = 40;
    pub const STARVING: i32 = 1000;
    pub const HUNGRY: i32 = 2600;
    pub const FULL: i32 = 7000;
    /// At or below this, the actor may faint each turn.
    pub const FAINTING: i32 = 500;
    /// At or below this, the actor starves to death.
    pub const STARVED: i32 = 100;
    pub const FAINT_ODDS: u32 = 40;
    pub const FAINT_CAP: u32 = 13;
    pub const BASE_RATE: u32 = 3;
    /// Swinging a door-opening arm at empty air.
    pub const SWING_COST: i32 = 3;
}

pub mod doors {
    /// Loudness of a creaking door.
    pub const CREAK_LOUDNESS: i32 = 10;
}

pub mod perception {
    pub const LOS_RADIUS: i32 = 8;
    /// Squared radius of a silence aura.
    pub const SILENCE_RADIUS_SQ: i32 = 36;
    pub const PASSIVE_SEARCH_ODDS: u32 = 30;
    /// Acute vision at this level always searches.
    pub const ACUTE_VISION_AUTOSEARCH: u8 = 2;
    pub const SEARCH_DIE: u32 = 17;
    /// Sleeping monsters in view wake when `below(stealth + 1)` is under this.
    pub const MONSTER_ALERTNESS: u32 = 15;
    pub const SILENCE_FLAVOUR_ODDS: u32 = 30;
    /// Resting and running stop when HP drops below this percentage.
    pub const HP_WARNING_PERCENT: i32 = 30;
}

pub mod teleport {
    /// The teleportitis roll happens one turn in this many.
    pub const CHECK_ODDS: u32 = 10;
    pub const ABYSS_DRIFT_ODDS: u32 = 30;
    pub const NEW_ABYSS_AREA_ODDS: u32 = 5;
}

pub mod spawning {
    pub const DESCENT_ODDS: u32 = 240;
    pub const ORB_RUN_ODDS: u32 = 10;
    pub const PROXIMITY_ODDS: u32 = 10;
    pub const ABYSS_ODDS: u32 = 5;
    pub const PANDEMONIUM_ODDS: u32 = 50;
    pub const PLACEMENT_ATTEMPTS: u32 = 200;
    /// Squared distance that counts as "close to the player".
    pub const CLOSE_RANGE_SQ: i32 = 64;
    /// Chebyshev distance that counts as "near the stairs".
    pub const STAIRS_RANGE: i32 = 3;
}

pub mod clouds {
    /// Clouds above this decay may seep into a neighbouring cell.
    pub const SPREAD_THRESHOLD: i32 = 20;
    pub const SPREAD_ODDS: u32 = 4;
    pub const WATER_DECAY_FACTOR: i32 = 4;
    /// Decay given to clouds thrown off by a fire shield.
    pub const FIRE_SHIELD_DECAY: i32 = 15;
}

pub mod rods {
    /// Rod charges are stored multiplied by this.
    pub const CHARGE_MULT: u32 = 100;
    pub const OFF_HAND_ODDS: u32 = 3;
}
