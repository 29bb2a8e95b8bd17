//! Timed-effect counters: the duration ledger and the scalar status counters.
//!
//! Both hold plain tick counts (`0` = inactive). What a count *does* lives in
//! [`crate::ledger`], which maps every [`Timer`] to a rule.

use serde::{Deserialize, Serialize};

use crate::constants::durations::TIMER_LIMIT;
use crate::error::InvariantViolation;

/// Closed set of ledger-tracked effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DurationKind {
    Gourmand,
    RepelUndead,
    LiquidFlames,
    IcyArmour,
    RepelMissiles,
    DeflectMissiles,
    Regeneration,
    Prayer,
    WeaponBrand,
    BreathWeapon,
    Transformation,
    Swiftness,
    Insulation,
    Stonemail,
    Forescry,
    SeeInvisible,
    Silence,
    CondensationShield,
    Stoneskin,
    Glamour,
    Teleport,
    ControlTeleport,
    ResistPoison,
    DeathChannel,
    Exhausted,
    Slow,
    Haste,
    Might,
    Berserk,
    ConfusingTouch,
    SureBlade,
    Levitation,
}

impl DurationKind {
    pub const COUNT: usize = 32;

    pub const ALL: [DurationKind; DurationKind::COUNT] = [
        DurationKind::Gourmand,
        DurationKind::RepelUndead,
        DurationKind::LiquidFlames,
        DurationKind::IcyArmour,
        DurationKind::RepelMissiles,
        DurationKind::DeflectMissiles,
        DurationKind::Regeneration,
        DurationKind::Prayer,
        DurationKind::WeaponBrand,
        DurationKind::BreathWeapon,
        DurationKind::Transformation,
        DurationKind::Swiftness,
        DurationKind::Insulation,
        DurationKind::Stonemail,
        DurationKind::Forescry,
        DurationKind::SeeInvisible,
        DurationKind::Silence,
        DurationKind::CondensationShield,
        DurationKind::Stoneskin,
        DurationKind::Glamour,
        DurationKind::Teleport,
        DurationKind::ControlTeleport,
        DurationKind::ResistPoison,
        DurationKind::DeathChannel,
        DurationKind::Exhausted,
        DurationKind::Slow,
        DurationKind::Haste,
        DurationKind::Might,
        DurationKind::Berserk,
        DurationKind::ConfusingTouch,
        DurationKind::SureBlade,
        DurationKind::Levitation,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Scalar status counters kept outside the ledger array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Invisibility,
    Confusion,
    Paralysis,
    Rot,
    Disease,
    Poison,
    DeathsDoor,
}

impl StatusKind {
    pub const ALL: [StatusKind; 7] = [
        StatusKind::Invisibility,
        StatusKind::Confusion,
        StatusKind::Paralysis,
        StatusKind::Rot,
        StatusKind::Disease,
        StatusKind::Poison,
        StatusKind::DeathsDoor,
    ];
}

/// Any decrementing counter on an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timer {
    Duration(DurationKind),
    Status(StatusKind),
}

impl From<DurationKind> for Timer {
    fn from(kind: DurationKind) -> Self {
        Timer::Duration(kind)
    }
}

impl From<StatusKind> for Timer {
    fn from(kind: StatusKind) -> Self {
        Timer::Status(kind)
    }
}

/// Fixed-size mapping of [`DurationKind`] to remaining ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationLedger {
    values: [u32; DurationKind::COUNT],
}

impl DurationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DurationKind) -> u32 {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: DurationKind, value: u32) {
        self.values[kind.index()] = value;
    }

    pub fn is_active(&self, kind: DurationKind) -> bool {
        self.get(kind) > 0
    }

    /// Add ticks, failing instead of exceeding [`TIMER_LIMIT`].
    pub fn extend(&mut self, kind: DurationKind, ticks: u32) -> Result<(), InvariantViolation> {
        let value = checked_total(kind.into(), self.get(kind), ticks)?;
        self.set(kind, value);
        Ok(())
    }

    pub fn active(&self) -> impl Iterator<Item = (DurationKind, u32)> + '_ {
        DurationKind::ALL
            .iter()
            .map(|k| (*k, self.get(*k)))
            .filter(|(_, v)| *v > 0)
    }
}

/// Status counters that predate the ledger. They decay through the same rule
/// registry as ledger entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounters {
    pub invisibility: u32,
    pub confusion: u32,
    pub paralysis: u32,
    pub rot: u32,
    pub disease: u32,
    pub poison: u32,
    pub deaths_door: u32,
}

impl StatusCounters {
    pub fn get(&self, kind: StatusKind) -> u32 {
        match kind {
            StatusKind::Invisibility => self.invisibility,
            StatusKind::Confusion => self.confusion,
            StatusKind::Paralysis => self.paralysis,
            StatusKind::Rot => self.rot,
            StatusKind::Disease => self.disease,
            StatusKind::Poison => self.poison,
            StatusKind::DeathsDoor => self.deaths_door,
        }
    }

    pub fn set(&mut self, kind: StatusKind, value: u32) {
        let slot = match kind {
            StatusKind::Invisibility => &mut self.invisibility,
            StatusKind::Confusion => &mut self.confusion,
            StatusKind::Paralysis => &mut self.paralysis,
            StatusKind::Rot => &mut self.rot,
            StatusKind::Disease => &mut self.disease,
            StatusKind::Poison => &mut self.poison,
            StatusKind::DeathsDoor => &mut self.deaths_door,
        };
        *slot = value;
    }

    pub fn extend(&mut self, kind: StatusKind, ticks: u32) -> Result<(), InvariantViolation> {
        let value = checked_total(kind.into(), self.get(kind), ticks)?;
        self.set(kind, value);
        Ok(())
    }
}

/// Both counter sets, read or written through a [`Timer`] key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    pub durations: DurationLedger,
    pub status: StatusCounters,
}

impl Timers {
    pub fn get(&self, timer: Timer) -> u32 {
        match timer {
            Timer::Duration(kind) => self.durations.get(kind),
            Timer::Status(kind) => self.status.get(kind),
        }
    }

    pub fn set(&mut self, timer: Timer, value: u32) {
        match timer {
            Timer::Duration(kind) => self.durations.set(kind, value),
            Timer::Status(kind) => self.status.set(kind, value),
        }
    }

    /// Fail if any counter sits outside `0..=TIMER_LIMIT`.
    pub fn check_bounds(&self) -> Result<(), InvariantViolation> {
        let durations = DurationKind::ALL.iter().map(|k| Timer::Duration(*k));
        let status = StatusKind::ALL.iter().map(|k| Timer::Status(*k));
        for timer in durations.chain(status) {
            let value = self.get(timer);
            if value > TIMER_LIMIT {
                return Err(InvariantViolation::TimerOutOfRange {
                    timer,
                    value,
                    limit: TIMER_LIMIT,
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn checked_total(timer: Timer, current: u32, ticks: u32) -> Result<u32, InvariantViolation> {
    current
        .checked_add(ticks)
        .filter(|total| *total <= TIMER_LIMIT)
        .ok_or(InvariantViolation::TimerOverflow {
            timer,
            current,
            added: ticks,
        })
}
