//! The player actor: pools, stats, timers, equipment, and pending actions.
//!
//! Plain data plus small accessors. Anything that needs the grid or other
//! creatures lives in the engine crate.

use serde::{Deserialize, Serialize};

use crate::constants::hunger;
use crate::duration::{DurationKind, DurationLedger, StatusCounters, Timers};
use crate::items::{Item, ItemKind};
use crate::movement::{self, Coord, Direction};
use crate::regen::Accumulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    Human,
    Elf,
    Kenku,
    Troll,
    Mummy,
    Ghoul,
}

impl Species {
    pub fn name(self) -> &'static str {
        match self {
            Species::Human => "Human",
            Species::Elf => "Elf",
            Species::Kenku => "Kenku",
            Species::Troll => "Troll",
            Species::Mummy => "Mummy",
            Species::Ghoul => "Ghoul",
        }
    }

    pub fn is_undead(self) -> bool {
        matches!(self, Species::Mummy | Species::Ghoul)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurdenState {
    #[default]
    Unencumbered,
    Encumbered,
    Overloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub intelligence: i32,
    pub dexterity: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 10,
            intelligence: 10,
            dexterity: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub fighting: u8,
    pub stealth: u8,
    pub traps_doors: u8,
    pub evocations: u8,
    pub necromancy: u8,
}

/// Mutation levels; 0 means absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutations {
    pub berserk: u8,
    pub acute_vision: u8,
    pub blurry_vision: u8,
    pub teleportitis: u8,
    pub regeneration: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum God {
    #[default]
    None,
    Trog,
    Makhleb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Religion {
    pub god: God,
    pub piety: u32,
    pub penance: bool,
}

/// Turns spent berserk without attacking, or exemption from the penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BerserkPenalty {
    Exempt,
    Count(u32),
}

impl Default for BerserkPenalty {
    fn default() -> Self {
        BerserkPenalty::Count(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transformation {
    Statue,
    Blade,
    Dragon,
    Spider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Brand {
    Flaming,
    Freezing,
    Venom,
    Draining,
    Distortion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialWield {
    /// Shrieks now and then, waking nearby monsters.
    Shrieking,
    /// Feeds on its wielder's nutrition.
    Hungering,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: u32,
    pub temp_brand: Option<Brand>,
    pub special: Option<SpecialWield>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmuletKind {
    Gourmand,
    Rage,
    Clarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingKind {
    Regeneration,
    Teleportation,
    FireResistance,
    ColdResistance,
    PoisonResistance,
    Stealth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Weapon>,
    pub amulet: Option<AmuletKind>,
    pub rings: Vec<RingKind>,
    pub levitation_boots: bool,
    pub shield: bool,
    /// Inventory slot of the wielded rod, if any.
    pub wielded_rod: Option<usize>,
}

impl Equipment {
    pub fn ring_count(&self, kind: RingKind) -> u32 {
        self.rings.iter().filter(|r| **r == kind).count() as u32
    }

    pub fn wearing_amulet(&self, kind: AmuletKind) -> bool {
        self.amulet == Some(kind)
    }
}

/// Intrinsic resistance levels before equipment and effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resistances {
    pub fire: i32,
    pub cold: i32,
    pub poison: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayKind {
    Ascend,
    Descend,
}

/// A multi-turn action in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay {
    pub kind: DelayKind,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Rest,
    Run(Direction),
}

/// Auto-repeat state: resting until healed, or running in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Running {
    pub mode: RunMode,
    /// False until the first step has been taken.
    pub continuing: bool,
    /// Turns left before a rest gives up on its own.
    pub turns_left: u32,
    /// Stop once HP and MP are full. Off when the rest began at full health.
    pub until_healed: bool,
}

/// Longest uninterrupted rest.
pub const REST_TURNS: u32 = 100;

impl Running {
    pub fn rest(until_healed: bool) -> Self {
        Self {
            mode: RunMode::Rest,
            continuing: false,
            turns_left: REST_TURNS,
            until_healed,
        }
    }

    pub fn run(direction: Direction) -> Self {
        Self {
            mode: RunMode::Run(direction),
            continuing: false,
            turns_left: u32::MAX,
            until_healed: false,
        }
    }

    pub fn is_resting(&self) -> bool {
        self.mode == RunMode::Rest
    }
}

/// Screen regions that need redrawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedrawFlags {
    pub hit_points: bool,
    pub magic_points: bool,
    pub strength: bool,
    pub armour_class: bool,
    pub evasion: bool,
    pub burden: bool,
    pub hunger: bool,
    pub status: bool,
    pub wield: bool,
    pub turn_count: bool,
}

impl RedrawFlags {
    pub fn any(&self) -> bool {
        self.hit_points
            || self.magic_points
            || self.strength
            || self.armour_class
            || self.evasion
            || self.burden
            || self.hunger
            || self.status
            || self.wield
            || self.turn_count
    }

    pub fn clear(&mut self) {
        *self = RedrawFlags::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Monster(String),
    Poison,
    Rotting,
    Burning,
    Freezing,
    Cloud(String),
    Trap(String),
    Starvation,
    Drowning,
}

/// Extra mass carried while stonemail is active.
pub const STONEMAIL_MASS: u32 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub species: Species,
    pub level: u8,
    pub pos: Coord,
    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub mp_max: i32,
    pub stats: Stats,
    pub skills: Skills,
    /// Nutrition; lower is hungrier.
    pub hunger: i32,
    pub durations: DurationLedger,
    pub status: StatusCounters,
    pub hp_regen: Accumulator,
    pub mp_regen: Accumulator,
    pub burden: BurdenState,
    pub equipment: Equipment,
    pub inventory: Vec<Item>,
    pub mutations: Mutations,
    pub religion: Religion,
    pub resist: Resistances,
    pub berserk_penalty: BerserkPenalty,
    pub transformation: Option<Transformation>,
    pub fire_shield: u32,
    pub controlled_flight: bool,
    pub contamination: u32,
    pub knows_berserker_rage: bool,
    pub sees_invisible: bool,
    pub delay: Option<Delay>,
    pub running: Option<Running>,
    pub banished: bool,
    pub was_silenced: bool,
    pub pending_autopickup: bool,
    pub stealth: u32,
    pub redraw: RedrawFlags,
    pub killed_by: Option<DeathCause>,
}

impl Actor {
    pub fn new(name: impl Into<String>, species: Species) -> Self {
        Self {
            name: name.into(),
            species,
            level: 1,
            pos: Coord::default(),
            hp: 15,
            hp_max: 15,
            mp: 3,
            mp_max: 3,
            stats: Stats::default(),
            skills: Skills::default(),
            hunger: hunger::STARTING,
            durations: DurationLedger::new(),
            status: StatusCounters::default(),
            hp_regen: Accumulator::default(),
            mp_regen: Accumulator::default(),
            burden: BurdenState::Unencumbered,
            equipment: Equipment::default(),
            inventory: Vec::new(),
            mutations: Mutations::default(),
            religion: Religion::default(),
            resist: Resistances::default(),
            berserk_penalty: BerserkPenalty::default(),
            transformation: None,
            fire_shield: 0,
            controlled_flight: false,
            contamination: 0,
            knows_berserker_rage: false,
            sees_invisible: false,
            delay: None,
            running: None,
            banished: false,
            was_silenced: false,
            pending_autopickup: false,
            stealth: 0,
            redraw: RedrawFlags::default(),
            killed_by: None,
        }
    }

    /// Copy of every duration and status counter.
    pub fn timers(&self) -> Timers {
        Timers {
            durations: self.durations.clone(),
            status: self.status.clone(),
        }
    }

    pub fn has(&self, kind: DurationKind) -> bool {
        self.durations.is_active(kind)
    }

    pub fn is_paralysed(&self) -> bool {
        self.status.paralysis > 0
    }

    pub fn is_confused(&self) -> bool {
        self.status.confusion > 0
    }

    pub fn is_berserk(&self) -> bool {
        self.has(DurationKind::Berserk)
    }

    pub fn is_levitating(&self) -> bool {
        self.has(DurationKind::Levitation)
    }

    pub fn is_undead(&self) -> bool {
        self.species.is_undead()
    }

    pub fn is_dead(&self) -> bool {
        self.killed_by.is_some()
    }

    pub fn res_fire(&self) -> i32 {
        let mut res = self.resist.fire + self.equipment.ring_count(RingKind::FireResistance) as i32;
        if self.has(DurationKind::Insulation) {
            res += 1;
        }
        if self.transformation == Some(Transformation::Dragon) {
            res += 2;
        }
        res
    }

    pub fn res_cold(&self) -> i32 {
        let mut res = self.resist.cold + self.equipment.ring_count(RingKind::ColdResistance) as i32;
        if self.has(DurationKind::IcyArmour) {
            res += 1;
        }
        if self.transformation == Some(Transformation::Dragon) {
            res -= 1;
        }
        res
    }

    pub fn res_poison(&self) -> bool {
        self.resist.poison
            || self.is_undead()
            || self.has(DurationKind::ResistPoison)
            || self.equipment.ring_count(RingKind::PoisonResistance) > 0
    }

    /// Lose hit points; records the cause when they run out.
    pub fn hurt(&mut self, amount: i32, cause: DeathCause) {
        if amount <= 0 {
            return;
        }
        self.hp -= amount;
        self.redraw.hit_points = true;
        if self.hp <= 0 && self.killed_by.is_none() {
            self.killed_by = Some(cause);
        }
    }

    pub fn heal(&mut self, amount: i32) {
        if amount <= 0 || self.hp >= self.hp_max {
            return;
        }
        self.hp = (self.hp + amount).min(self.hp_max);
        self.redraw.hit_points = true;
    }

    pub fn restore_mp(&mut self, amount: i32) {
        if amount <= 0 || self.mp >= self.mp_max {
            return;
        }
        self.mp = (self.mp + amount).min(self.mp_max);
        self.redraw.magic_points = true;
    }

    /// Permanently lower maximum HP.
    pub fn rot_hp(&mut self, amount: i32) {
        self.hp_max = (self.hp_max - amount).max(1);
        self.hp = self.hp.min(self.hp_max);
        self.redraw.hit_points = true;
    }

    pub fn make_hungry(&mut self, amount: i32) {
        if amount <= 0 || self.is_undead() {
            return;
        }
        let before = crate::hunger::HungerState::of(self.hunger);
        self.hunger = (self.hunger - amount).max(0);
        if crate::hunger::HungerState::of(self.hunger) != before {
            self.redraw.hunger = true;
        }
    }

    pub fn modify_strength(&mut self, delta: i32) {
        self.stats.strength = (self.stats.strength + delta).max(1);
        self.redraw.strength = true;
    }

    pub fn action_speed(&self) -> u32 {
        movement::action_speed(
            self.has(DurationKind::Haste),
            self.has(DurationKind::Slow),
            self.transformation == Some(Transformation::Statue),
        )
    }

    pub fn movement_speed(&self) -> u32 {
        movement::movement_speed(self.has(DurationKind::Swiftness), self.burden)
    }

    pub fn carried_mass(&self) -> u32 {
        let items: u32 = self.inventory.iter().map(Item::mass).sum();
        if self.has(DurationKind::Stonemail) {
            items + STONEMAIL_MASS
        } else {
            items
        }
    }

    pub fn carrying_capacity(&self) -> u32 {
        (1000 + 150 * self.stats.strength.max(0)) as u32
    }

    /// Re-derive the burden state from carried mass.
    pub fn recompute_burden(&mut self) {
        let mass = self.carried_mass();
        let capacity = self.carrying_capacity();
        let state = if mass > capacity {
            BurdenState::Overloaded
        } else if mass > capacity * 5 / 6 {
            BurdenState::Encumbered
        } else {
            BurdenState::Unencumbered
        };
        if state != self.burden {
            self.burden = state;
            self.redraw.burden = true;
        }
    }

    pub fn stop_running(&mut self) {
        if self.running.take().is_some() {
            self.redraw.status = true;
        }
    }

    pub fn weapon_name(&self) -> String {
        match &self.equipment.weapon {
            Some(w) => format!("Your {}", w.name),
            None => "Your hands".to_string(),
        }
    }

    pub fn carrying_orb(&self) -> bool {
        self.inventory.iter().any(|i| i.kind == ItemKind::Orb)
    }

    /// Reset the count of turns spent berserk without attacking.
    pub fn reset_berserk_penalty(&mut self) {
        if let BerserkPenalty::Count(_) = self.berserk_penalty {
            self.berserk_penalty = BerserkPenalty::Count(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hurt_records_first_cause_only() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.hurt(10, DeathCause::Poison);
        assert!(!actor.is_dead());
        actor.hurt(10, DeathCause::Burning);
        actor.hurt(10, DeathCause::Starvation);
        assert_eq!(actor.killed_by, Some(DeathCause::Burning));
    }

    #[test]
    fn rot_hp_floors_at_one() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.rot_hp(100);
        assert_eq!(actor.hp_max, 1);
        assert_eq!(actor.hp, 1);
    }

    #[test]
    fn undead_do_not_hunger() {
        let mut mummy = Actor::new("Imhotep", Species::Mummy);
        mummy.make_hungry(500);
        assert_eq!(mummy.hunger, hunger::STARTING);
    }

    #[test]
    fn stonemail_can_encumber() {
        let mut actor = Actor::new("Tess", Species::Human);
        actor.stats.strength = 1;
        actor.recompute_burden();
        assert_eq!(actor.burden, BurdenState::Unencumbered);
        actor.durations.set(DurationKind::Stonemail, 10);
        actor.inventory.push(Item::new(ItemKind::Ration, 3));
        actor.recompute_burden();
        assert_eq!(actor.burden, BurdenState::Encumbered);
        assert!(actor.redraw.burden);
    }

    #[test]
    fn resistances_combine_sources() {
        let mut actor = Actor::new("Tess", Species::Human);
        assert_eq!(actor.res_fire(), 0);
        actor.equipment.rings.push(RingKind::FireResistance);
        actor.durations.set(DurationKind::Insulation, 4);
        assert_eq!(actor.res_fire(), 2);
        actor.resist.cold = -1;
        assert_eq!(actor.res_cold(), -1);
        assert!(!actor.res_poison());
        actor.durations.set(DurationKind::ResistPoison, 1);
        assert!(actor.res_poison());
    }
}
