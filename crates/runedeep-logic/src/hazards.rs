//! Environmental hazard damage: clouds and lingering flames.

use serde::{Deserialize, Serialize};

use crate::constants::time::BASE_ACTION_COST;
use crate::dice::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudKind {
    Fire,
    Cold,
    PoisonGas,
    Steam,
    Miasma,
    Smoke,
}

impl CloudKind {
    pub fn name(self) -> &'static str {
        match self {
            CloudKind::Fire => "roaring flames",
            CloudKind::Cold => "freezing vapours",
            CloudKind::PoisonGas => "noxious gas",
            CloudKind::Steam => "scalding steam",
            CloudKind::Miasma => "dark miasma",
            CloudKind::Smoke => "smoke",
        }
    }

    pub fn is_harmful(self) -> bool {
        !matches!(self, CloudKind::Smoke)
    }

    /// Whether a strong cloud of this kind seeps into neighbouring cells.
    pub fn spreads(self) -> bool {
        matches!(self, CloudKind::Fire | CloudKind::PoisonGas)
    }

    /// Fire burns off four times faster over water.
    pub fn quenched_by_water(self) -> bool {
        matches!(self, CloudKind::Fire)
    }
}

/// Resistances of whatever stands in a hazard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazardResists {
    pub fire: i32,
    pub cold: i32,
    pub poison: bool,
    pub undead: bool,
}

/// Scale a damage roll by time spent and resistance.
///
/// Positive resistance divides by `1 + res^2` and may reduce the hit to
/// nothing. Zero or negative resistance always deals at least 1, and negative
/// resistance doubles the hit.
pub fn resisted_damage(roll: u32, res: i32, time_taken: u32) -> u32 {
    let base = roll * time_taken / BASE_ACTION_COST;
    if res > 0 {
        let divisor = 1 + (res * res) as u32;
        base / divisor
    } else {
        let hit = base.max(1);
        if res < 0 {
            hit * 2
        } else {
            hit
        }
    }
}

/// What one turn inside a cloud does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloudExposure {
    pub damage: u32,
    pub poison: u32,
    pub rot: u32,
    pub resisted: bool,
}

pub fn cloud_exposure(
    kind: CloudKind,
    resists: HazardResists,
    time_taken: u32,
    dice: &mut dyn Dice,
) -> CloudExposure {
    let mut exposure = CloudExposure::default();
    match kind {
        CloudKind::Fire => {
            let roll = dice.below_avg(23, 3) + 10;
            exposure.damage = resisted_damage(roll, resists.fire, time_taken);
            exposure.resisted = resists.fire > 0;
        }
        CloudKind::Cold => {
            let roll = dice.below_avg(23, 3) + 10;
            exposure.damage = resisted_damage(roll, resists.cold, time_taken);
            exposure.resisted = resists.cold > 0;
        }
        CloudKind::Steam => {
            let base = resisted_damage(dice.below(6), 0, time_taken);
            if resists.fire > 0 {
                exposure.damage = base / 2;
                exposure.resisted = true;
            } else {
                exposure.damage = base;
            }
        }
        CloudKind::PoisonGas => {
            if resists.poison {
                exposure.resisted = true;
            } else {
                exposure.damage = resisted_damage(dice.below(3) + 1, 0, time_taken);
                exposure.poison = 1 + dice.below(3);
            }
        }
        CloudKind::Miasma => {
            if resists.undead {
                exposure.resisted = true;
            } else {
                exposure.damage = resisted_damage(dice.roll_dice(1, 3), 0, time_taken);
                exposure.rot = 1 + dice.below(2);
            }
        }
        CloudKind::Smoke => {}
    }
    exposure
}
