//! Per-kind rules for timed effects, and the once-per-turn decrement pass.
//!
//! Every [`Timer`] maps to a [`DurationRule`]: how it decays, whether it warns
//! before running out, what it does each tick, and what happens when it
//! expires. [`decrement_all`] visits each timer exactly once in
//! [`DECREMENT_ORDER`].
//!
//! During a pass the actor's own counters keep their pre-pass values. A rule
//! returns the new value of *its* timer; changes to *other* timers are queued
//! as [`Adjustment`]s and applied after every rule has run, so no rule ever
//! observes another kind's freshly updated value. A timer cleared by an
//! earlier rule is skipped for the rest of the pass.

use crate::actor::{Actor, BerserkPenalty, Brand, DeathCause, God, Species};
use crate::constants::berserk as rage;
use crate::constants::durations::{
    BOOTS_LEVITATION_PIN, GOURMAND_GAIN_ODDS, GOURMAND_MAX, KENKU_PERMANENT_FLIGHT_LEVEL,
    LONG_EXPIRY_AT, MIGHT_STRENGTH_BONUS, NEAR_EXPIRY_AT, NEAR_EXPIRY_SKIP_ODDS,
    REPEL_UNDEAD_WARN_AT, TIMER_LIMIT,
};
use crate::dice::Dice;
use crate::duration::{checked_total, DurationKind as D, StatusKind as S, Timer, Timers};
use crate::error::InvariantViolation;
use crate::hazards::resisted_damage;
use crate::messages::{Channel, MessageSink};

/// Slowness from rage collapse never stacks past this.
pub const SLOW_CAP: u32 = 90;

/// Order of the decrement pass. Every timer appears exactly once.
pub const DECREMENT_ORDER: [Timer; 39] = [
    Timer::Duration(D::Gourmand),
    Timer::Duration(D::RepelUndead),
    Timer::Duration(D::LiquidFlames),
    Timer::Duration(D::IcyArmour),
    Timer::Duration(D::RepelMissiles),
    Timer::Duration(D::DeflectMissiles),
    Timer::Duration(D::Regeneration),
    Timer::Duration(D::Prayer),
    Timer::Duration(D::WeaponBrand),
    Timer::Duration(D::BreathWeapon),
    Timer::Duration(D::Transformation),
    Timer::Duration(D::Swiftness),
    Timer::Duration(D::Insulation),
    Timer::Duration(D::Stonemail),
    Timer::Duration(D::Forescry),
    Timer::Duration(D::SeeInvisible),
    Timer::Duration(D::Silence),
    Timer::Duration(D::CondensationShield),
    Timer::Duration(D::Stoneskin),
    Timer::Duration(D::Glamour),
    Timer::Duration(D::Teleport),
    Timer::Duration(D::ControlTeleport),
    Timer::Duration(D::ResistPoison),
    Timer::Duration(D::DeathChannel),
    Timer::Status(S::Invisibility),
    Timer::Status(S::Confusion),
    Timer::Status(S::Paralysis),
    Timer::Duration(D::Exhausted),
    Timer::Duration(D::Slow),
    Timer::Duration(D::Haste),
    Timer::Duration(D::Might),
    Timer::Duration(D::Berserk),
    Timer::Duration(D::ConfusingTouch),
    Timer::Duration(D::SureBlade),
    Timer::Duration(D::Levitation),
    Timer::Status(S::Rot),
    Timer::Status(S::Disease),
    Timer::Status(S::Poison),
    Timer::Status(S::DeathsDoor),
];

pub type RuleFn = fn(&mut RuleContext<'_>);
pub type DecayFn = fn(&mut RuleContext<'_>, Timer, u32) -> Result<u32, InvariantViolation>;

/// How a counter moves each turn.
#[derive(Clone, Copy)]
pub enum Decay {
    /// Nothing at 0; expire at 1; otherwise decrement, tick, maybe warn.
    Step,
    /// Bespoke handling. Called even at 0; responsible for recording expiry.
    Custom(DecayFn),
}

/// How much extra a warning knocks off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hasten {
    /// One extra tick, one time in [`NEAR_EXPIRY_SKIP_ODDS`].
    CoinFlip,
    /// `below(n)` extra ticks.
    Upto(u32),
}

#[derive(Clone, Copy)]
pub struct Warning {
    pub at: u32,
    pub text: &'static str,
    pub hasten: Hasten,
    pub also: Option<RuleFn>,
}

#[derive(Clone, Copy)]
pub enum Expiry {
    Silent,
    Say(Channel, &'static str),
    Custom(RuleFn),
}

#[derive(Clone, Copy)]
pub struct DurationRule {
    pub decay: Decay,
    pub warning: Option<Warning>,
    pub on_tick: Option<RuleFn>,
    pub expiry: Expiry,
}

impl DurationRule {
    const fn step(expiry: Expiry) -> Self {
        Self {
            decay: Decay::Step,
            warning: None,
            on_tick: None,
            expiry,
        }
    }

    const fn say(text: &'static str) -> Self {
        Self::step(Expiry::Say(Channel::Duration, text))
    }

    const fn custom(decay: DecayFn) -> Self {
        Self {
            decay: Decay::Custom(decay),
            warning: None,
            on_tick: None,
            expiry: Expiry::Silent,
        }
    }

    const fn warn(mut self, at: u32, text: &'static str, hasten: Hasten) -> Self {
        self.warning = Some(Warning {
            at,
            text,
            hasten,
            also: None,
        });
        self
    }

    /// The usual "starting to run out" warning at [`NEAR_EXPIRY_AT`].
    const fn flicker(self, text: &'static str) -> Self {
        self.warn(NEAR_EXPIRY_AT, text, Hasten::CoinFlip)
    }

    const fn ticking(mut self, tick: RuleFn) -> Self {
        self.on_tick = Some(tick);
        self
    }

    /// Decrements by exactly one per pass with no warning.
    pub fn is_plain(&self) -> bool {
        matches!(self.decay, Decay::Step) && self.warning.is_none()
    }
}

/// Registry lookup.
pub fn rule_for(timer: Timer) -> DurationRule {
    match timer {
        Timer::Duration(kind) => duration_rule(kind),
        Timer::Status(kind) => status_rule(kind),
    }
}

fn duration_rule(kind: D) -> DurationRule {
    match kind {
        D::Gourmand => DurationRule::custom(gourmand),
        D::RepelUndead => DurationRule::say("Your holy aura fades away.").warn(
            REPEL_UNDEAD_WARN_AT,
            "Your holy aura is starting to fade.",
            Hasten::Upto(3),
        ),
        D::LiquidFlames => DurationRule::step(Expiry::Silent).ticking(burn),
        D::IcyArmour => DurationRule::step(Expiry::Custom(icy_armour_melts)),
        D::RepelMissiles => DurationRule::say("You feel less protected from missiles.")
            .flicker("Your repel missiles spell is about to expire..."),
        D::DeflectMissiles => DurationRule::say("You feel less protected from missiles.")
            .flicker("Your deflect missiles spell is about to expire..."),
        D::Regeneration => DurationRule::say("Your skin stops crawling.")
            .flicker("Your skin is crawling a little less now."),
        D::Prayer => DurationRule::step(Expiry::Say(Channel::Pray, "Your prayer is over.")),
        D::WeaponBrand => DurationRule::step(Expiry::Custom(brand_fades)),
        D::BreathWeapon => {
            DurationRule::step(Expiry::Say(Channel::Recovery, "You have got your breath back."))
        }
        D::Transformation => DurationRule::step(Expiry::Custom(untransform)).warn(
            LONG_EXPIRY_AT,
            "Your transformation is almost over.",
            Hasten::Upto(3),
        ),
        D::Swiftness => {
            DurationRule::say("You feel sluggish.").flicker("You start to feel a little slower.")
        }
        D::Insulation => DurationRule::say("You feel conductive.")
            .flicker("You start to feel a little less insulated."),
        D::Stonemail => {
            let mut rule = DurationRule::step(Expiry::Custom(stonemail_crumbles))
                .flicker("Your scaly stone armour is starting to flake away.");
            if let Some(warning) = rule.warning.as_mut() {
                warning.also = Some(redraw_armour);
            }
            rule
        }
        D::Forescry => DurationRule::step(Expiry::Custom(forescry_ends)),
        D::SeeInvisible => DurationRule::step(Expiry::Custom(sight_blurs)),
        D::Silence => DurationRule::step(Expiry::Silent),
        D::CondensationShield => {
            DurationRule::step(Expiry::Custom(icy_shield_evaporates)).ticking(chill)
        }
        D::Stoneskin => DurationRule::step(Expiry::Custom(stoneskin_ends)),
        D::Glamour => DurationRule::step(Expiry::Silent),
        D::Teleport => DurationRule::step(Expiry::Custom(teleport_now)),
        D::ControlTeleport => DurationRule::say("You feel uncertain.")
            .flicker("You start to feel a little uncertain."),
        D::ResistPoison => DurationRule::say("Your poison resistance expires.")
            .flicker("Your poison resistance is about to expire."),
        D::DeathChannel => DurationRule::say("Your unholy channel expires.")
            .flicker("Your unholy channel is weakening."),
        D::Exhausted => DurationRule::say("You feel less fatigued."),
        D::Slow => DurationRule::say("You feel yourself speed up."),
        D::Haste => DurationRule::say("You feel yourself slow down.")
            .flicker("Your extra speed is starting to run out."),
        D::Might => DurationRule::step(Expiry::Custom(might_fades)),
        D::Berserk => DurationRule::step(Expiry::Custom(rage_ends)),
        D::ConfusingTouch => DurationRule::say("Your hands stop glowing."),
        D::SureBlade => DurationRule::say("The bond with your blade fades away."),
        D::Levitation => DurationRule::custom(levitation),
    }
}

fn status_rule(kind: S) -> DurationRule {
    match kind {
        S::Invisibility => DurationRule::say("You flicker back into view.")
            .flicker("You flicker for a moment."),
        S::Confusion => DurationRule::say("You feel less confused now."),
        S::Paralysis => DurationRule::say("You can move again."),
        S::Rot => DurationRule::custom(rot),
        S::Disease => DurationRule::custom(disease),
        S::Poison => DurationRule::custom(poison),
        S::DeathsDoor => DurationRule::custom(deaths_door),
    }
}

/// Changes to another timer, applied when the pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Clear(Timer),
    Extend(Timer, u32),
    Set(Timer, u32),
}

/// Things the ledger cannot do itself because they touch the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerRequest {
    Teleport { new_abyss_area: bool },
    /// Levitation ended; re-enter whatever terrain is underfoot.
    Land,
    /// Force the player to acknowledge pending messages.
    Acknowledge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerReport {
    pub expired: Vec<Timer>,
    pub warned: Vec<Timer>,
    pub requests: Vec<LedgerRequest>,
}

pub struct RuleContext<'a> {
    pub actor: &'a mut Actor,
    /// Every counter as it stood before the pass.
    pub before: Timers,
    pub dice: &'a mut dyn Dice,
    pub sink: &'a mut dyn MessageSink,
    pub time_taken: u32,
    adjustments: Vec<Adjustment>,
    report: LedgerReport,
}

impl RuleContext<'_> {
    pub fn say(&mut self, channel: Channel, text: &str) {
        self.sink.emit(channel, text);
    }

    pub fn was(&self, timer: impl Into<Timer>) -> u32 {
        self.before.get(timer.into())
    }

    pub fn adjust(&mut self, adjustment: Adjustment) {
        self.adjustments.push(adjustment);
    }

    pub fn request(&mut self, request: LedgerRequest) {
        self.report.requests.push(request);
    }

    pub fn expired(&mut self, timer: Timer) {
        self.report.expired.push(timer);
    }

    fn warned(&mut self, timer: Timer) {
        self.report.warned.push(timer);
    }
}

/// Advance every timed effect on `actor` by one turn.
///
/// Fails without touching the actor if a counter is already out of range.
pub fn decrement_all(
    actor: &mut Actor,
    time_taken: u32,
    dice: &mut dyn Dice,
    sink: &mut dyn MessageSink,
) -> Result<LedgerReport, InvariantViolation> {
    let before = actor.timers();
    before.check_bounds()?;

    let mut after = before.clone();
    let mut cancelled: Vec<Timer> = Vec::new();
    let mut ctx = RuleContext {
        actor,
        before,
        dice,
        sink,
        time_taken,
        adjustments: Vec::new(),
        report: LedgerReport::default(),
    };

    for timer in DECREMENT_ORDER {
        if cancelled.contains(&timer) {
            continue;
        }
        let value = ctx.before.get(timer);
        let queued = ctx.adjustments.len();
        let next = apply_rule(&rule_for(timer), &mut ctx, timer, value)?;
        after.set(timer, next);

        for adjustment in &ctx.adjustments[queued..] {
            if let Adjustment::Clear(target) = adjustment {
                cancelled.push(*target);
            }
        }
    }

    for adjustment in &ctx.adjustments {
        match *adjustment {
            Adjustment::Clear(timer) => after.set(timer, 0),
            Adjustment::Extend(timer, ticks) => {
                let total = checked_total(timer, after.get(timer), ticks)?;
                after.set(timer, total);
            }
            Adjustment::Set(timer, value) => {
                if value > TIMER_LIMIT {
                    return Err(InvariantViolation::TimerOutOfRange {
                        timer,
                        value,
                        limit: TIMER_LIMIT,
                    });
                }
                after.set(timer, value);
            }
        }
    }

    let report = ctx.report;
    actor_timers_from(ctx.actor, after);
    Ok(report)
}

fn actor_timers_from(actor: &mut Actor, timers: Timers) {
    actor.durations = timers.durations;
    actor.status = timers.status;
}

fn apply_rule(
    rule: &DurationRule,
    ctx: &mut RuleContext<'_>,
    timer: Timer,
    value: u32,
) -> Result<u32, InvariantViolation> {
    if let Decay::Custom(decay) = rule.decay {
        return decay(ctx, timer, value);
    }

    match value {
        0 => Ok(0),
        1 => {
            ctx.expired(timer);
            match rule.expiry {
                Expiry::Silent => {}
                Expiry::Say(channel, text) => ctx.say(channel, text),
                Expiry::Custom(effect) => effect(ctx),
            }
            Ok(0)
        }
        _ => {
            let mut next = value - 1;
            if let Some(tick) = rule.on_tick {
                tick(ctx);
            }
            if let Some(warning) = rule.warning {
                if next == warning.at {
                    next = warn(ctx, timer, &warning, next)?;
                }
            }
            Ok(next)
        }
    }
}

fn warn(
    ctx: &mut RuleContext<'_>,
    timer: Timer,
    warning: &Warning,
    value: u32,
) -> Result<u32, InvariantViolation> {
    ctx.say(Channel::Duration, warning.text);
    if let Some(also) = warning.also {
        also(ctx);
    }
    ctx.warned(timer);
    let extra = match warning.hasten {
        Hasten::CoinFlip => u32::from(ctx.dice.one_chance_in(NEAR_EXPIRY_SKIP_ODDS)),
        Hasten::Upto(n) => ctx.dice.below(n),
    };
    value
        .checked_sub(extra)
        .filter(|v| *v > 0)
        .ok_or(InvariantViolation::TimerUnderflow { timer })
}

// ── Per-tick effects ────────────────────────────────────────────────────

fn burn(ctx: &mut RuleContext<'_>) {
    let res_fire = ctx.actor.res_fire();
    ctx.say(Channel::Warning, "You are covered in liquid flames!");
    let roll = ctx.dice.below_avg(9, 2) + 1;
    let damage = resisted_damage(roll, res_fire, ctx.time_taken);
    ctx.actor.hurt(damage as i32, DeathCause::Burning);

    if ctx.was(D::CondensationShield) > 0 {
        ctx.say(Channel::Duration, "Your icy shield dissipates!");
        ctx.adjust(Adjustment::Clear(D::CondensationShield.into()));
        ctx.actor.redraw.armour_class = true;
    }
}

fn chill(ctx: &mut RuleContext<'_>) {
    if ctx.actor.res_cold() < 0 {
        ctx.say(Channel::Plain, "You feel very cold.");
        let damage = 2 + ctx.dice.below_avg(13, 2);
        ctx.actor.hurt(damage as i32, DeathCause::Freezing);
    }
}

fn redraw_armour(ctx: &mut RuleContext<'_>) {
    ctx.actor.redraw.armour_class = true;
}

// ── Expiry effects ──────────────────────────────────────────────────────

fn icy_armour_melts(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "Your icy armour evaporates.");
    ctx.actor.redraw.armour_class = true;
}

fn icy_shield_evaporates(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "Your icy shield evaporates.");
    ctx.actor.redraw.armour_class = true;
}

fn stonemail_crumbles(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "Your scaly stone armour disappears.");
    ctx.actor.redraw.armour_class = true;
    ctx.actor.redraw.burden = true;
}

fn stoneskin_ends(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "Your skin feels tender.");
    ctx.actor.redraw.armour_class = true;
}

fn forescry_ends(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "You feel firmly rooted in the present.");
    ctx.actor.redraw.evasion = true;
}

fn sight_blurs(ctx: &mut RuleContext<'_>) {
    if !ctx.actor.sees_invisible {
        ctx.say(Channel::Duration, "Your eyesight blurs momentarily.");
    }
}

fn teleport_now(ctx: &mut RuleContext<'_>) {
    let new_abyss_area = ctx
        .dice
        .one_chance_in(crate::constants::teleport::NEW_ABYSS_AREA_ODDS);
    ctx.request(LedgerRequest::Teleport { new_abyss_area });
}

fn brand_fades(ctx: &mut RuleContext<'_>) {
    let name = ctx.actor.weapon_name();
    let Some(weapon) = ctx.actor.equipment.weapon.as_mut() else {
        return;
    };
    let suffix = match weapon.temp_brand.take() {
        Some(Brand::Flaming) => "goes out.",
        Some(Brand::Freezing) => "stops glowing.",
        Some(Brand::Venom) => "stops dripping with poison.",
        Some(Brand::Draining) => "stops crackling.",
        Some(Brand::Distortion) => "seems straighter.",
        None => "seems inexplicably less special.",
    };
    ctx.actor.redraw.wield = true;
    ctx.say(Channel::Duration, &format!("{} {}", name, suffix));
}

fn untransform(ctx: &mut RuleContext<'_>) {
    use crate::actor::Transformation;
    let text = match ctx.actor.transformation.take() {
        Some(Transformation::Statue) => "You revert to your normal fleshy form.",
        Some(Transformation::Blade) => "Your hands revert to their normal proportions.",
        Some(Transformation::Dragon) => "Your transformation has ended.",
        Some(Transformation::Spider) => "Your transformation has ended.",
        None => return,
    };
    ctx.say(Channel::Duration, text);
    ctx.actor.redraw.armour_class = true;
    ctx.actor.redraw.evasion = true;
    ctx.actor.redraw.strength = true;
}

fn might_fades(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "You feel a little less mighty now.");
    ctx.actor.modify_strength(-MIGHT_STRENGTH_BONUS);
}

/// Rage ends. The actor may pass out; either way they end up exhausted, slow
/// and hungry.
fn rage_ends(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Duration, "You are no longer berserk.");

    let weights = [
        rage::BASE_COLLAPSE_WEIGHT,
        ctx.actor.mutations.berserk as u32 * rage::MUTATION_WEIGHT,
        if ctx.actor.equipment.wearing_amulet(crate::actor::AmuletKind::Rage) {
            rage::AMULET_WEIGHT
        } else {
            0
        },
        if ctx.actor.knows_berserker_rage {
            rage::SPELL_WEIGHT
        } else {
            0
        },
    ];
    const REASONS: [&str; 4] = [
        "You struggle, and manage to stay standing.",
        "Your mutated body refuses to collapse.",
        "You feel your neck pulse as blood rushes through your body.",
        "Your mind masters your body.",
    ];
    let total: u32 = weights.iter().sum();

    let religion = ctx.actor.religion;
    let mut passed_out = 0;
    if ctx.actor.berserk_penalty == BerserkPenalty::Exempt {
        ctx.say(Channel::Plain, "The very source of your rage keeps you on your feet.");
    } else if religion.god == God::Trog
        && !religion.penance
        && religion.piety > ctx.dice.below(rage::TROG_PIETY_ROLL)
    {
        ctx.say(Channel::Plain, "Trog's vigour flows through your veins.");
    } else if !ctx.dice.one_chance_in(total) {
        let mut cause = ctx.dice.below(total);
        for (weight, reason) in weights.iter().zip(REASONS) {
            if cause < *weight {
                ctx.say(Channel::Plain, reason);
                break;
            }
            cause -= weight;
        }
    } else {
        ctx.say(Channel::Warning, "You pass out from exhaustion.");
        passed_out = ctx.dice.roll_dice(1, 4);
        ctx.adjust(Adjustment::Extend(S::Paralysis.into(), passed_out));
    }

    if passed_out == 0 && ctx.was(S::Paralysis) == 0 {
        ctx.say(Channel::Warning, "You are exhausted.");
    }

    ctx.actor.berserk_penalty = BerserkPenalty::Count(0);

    let exhaustion = rage::EXHAUSTION_BASE + ctx.dice.roll_dice(2, 12);
    ctx.adjust(Adjustment::Extend(D::Exhausted.into(), exhaustion));
    let slow_before = ctx.was(D::Slow);
    if slow_before == 0 {
        ctx.say(Channel::Warning, "You feel yourself slow down.");
    }
    ctx.adjust(Adjustment::Set(
        D::Slow.into(),
        (slow_before + exhaustion).min(SLOW_CAP),
    ));

    ctx.actor.make_hungry(rage::COLLAPSE_HUNGER);
    if ctx.actor.hunger < rage::COLLAPSE_HUNGER_FLOOR {
        ctx.actor.hunger = rage::COLLAPSE_HUNGER_FLOOR;
    }
    ctx.actor.redraw.hit_points = true;
    ctx.actor.redraw.status = true;
}

// ── Custom decay ────────────────────────────────────────────────────────

/// Builds up slowly while the amulet is worn; vanishes when it is not.
fn gourmand(ctx: &mut RuleContext<'_>, timer: Timer, value: u32) -> Result<u32, InvariantViolation> {
    if ctx
        .actor
        .equipment
        .wearing_amulet(crate::actor::AmuletKind::Gourmand)
    {
        if value < GOURMAND_MAX && ctx.dice.one_chance_in(GOURMAND_GAIN_ODDS) {
            return Ok(value + 1);
        }
        return Ok(value);
    }
    if value > 0 {
        ctx.expired(timer);
    }
    Ok(0)
}

fn levitation(ctx: &mut RuleContext<'_>, timer: Timer, value: u32) -> Result<u32, InvariantViolation> {
    match value {
        0 => Ok(0),
        1 => {
            ctx.expired(timer);
            ctx.say(Channel::Duration, "You float gracefully downwards.");
            ctx.actor.controlled_flight = false;
            ctx.actor.redraw.burden = true;
            ctx.request(LedgerRequest::Land);
            Ok(0)
        }
        _ => {
            let mut next = value;
            let permanent = ctx.actor.species == Species::Kenku
                && ctx.actor.level >= KENKU_PERMANENT_FLIGHT_LEVEL;
            if !permanent {
                next -= 1;
            }
            if ctx.actor.equipment.levitation_boots {
                next = BOOTS_LEVITATION_PIN;
            }
            if next == LONG_EXPIRY_AT {
                let warning = Warning {
                    at: LONG_EXPIRY_AT,
                    text: "You are starting to lose your buoyancy!",
                    hasten: Hasten::Upto(6),
                    also: None,
                };
                next = warn(ctx, timer, &warning, next)?;
            }
            Ok(next)
        }
    }
}

fn rot(ctx: &mut RuleContext<'_>, timer: Timer, value: u32) -> Result<u32, InvariantViolation> {
    let mut next = value;
    if next > 0 {
        if ctx.actor.species == Species::Mummy {
            next = 0;
        } else if ctx.dice.below(20) < next {
            rot_flesh(ctx);
            next -= 1;
        }
    }

    // Ghouls rot on their own, on top of any rotting attack.
    if ctx.actor.species == Species::Ghoul && ctx.dice.one_chance_in(400) {
        rot_flesh(ctx);
        next = next.saturating_sub(1);
    }

    if value > 0 && next == 0 {
        ctx.expired(timer);
    }
    Ok(next)
}

fn rot_flesh(ctx: &mut RuleContext<'_>) {
    ctx.say(Channel::Warning, "You feel your flesh rotting away.");
    ctx.actor.hurt(1, DeathCause::Rotting);
    ctx.actor.rot_hp(1);
}

fn disease(ctx: &mut RuleContext<'_>, timer: Timer, value: u32) -> Result<u32, InvariantViolation> {
    if value == 0 {
        return Ok(0);
    }
    let mut next = value - 1;
    let fast_healer = ctx.actor.species == Species::Troll || ctx.actor.mutations.regeneration > 0;
    if next > 5 && fast_healer {
        next -= 2;
    }
    if next == 0 {
        ctx.expired(timer);
        ctx.say(Channel::Recovery, "You feel your health improve.");
    }
    Ok(next)
}

fn poison(ctx: &mut RuleContext<'_>, timer: Timer, value: u32) -> Result<u32, InvariantViolation> {
    if value == 0 || ctx.dice.below(5) >= value {
        return Ok(value);
    }

    if value > 10 && ctx.dice.below(value) >= 8 {
        let damage = ctx.dice.below(10) + 5;
        ctx.actor.hurt(damage as i32, DeathCause::Poison);
        ctx.say(Channel::Danger, "You feel extremely sick.");
    } else if value > 5 && ctx.dice.coinflip() {
        let damage = if ctx.dice.coinflip() { 3 } else { 2 };
        ctx.actor.hurt(damage, DeathCause::Poison);
        ctx.say(Channel::Warning, "You feel very sick.");
    } else {
        ctx.actor.hurt(1, DeathCause::Poison);
        ctx.say(Channel::Plain, "You feel sick.");
    }

    let recovers = (ctx.actor.hp == 1 && ctx.dice.one_chance_in(3)) || ctx.dice.one_chance_in(8);
    if !recovers {
        return Ok(value);
    }
    let next = value - 1;
    if next == 0 {
        ctx.expired(timer);
        ctx.say(Channel::Recovery, "You feel better.");
    }
    Ok(next)
}

/// Hit points allowed while at death's door before the spell breaks.
pub fn deaths_door_hp_limit(actor: &Actor) -> i32 {
    (actor.skills.necromancy as i32 / 2).max(1)
}

fn deaths_door(ctx: &mut RuleContext<'_>, timer: Timer, value: u32) -> Result<u32, InvariantViolation> {
    if value == 0 {
        return Ok(0);
    }

    if ctx.actor.hp > deaths_door_hp_limit(ctx.actor) {
        ctx.say(Channel::Duration, "Your life is in your own hands once again.");
        let paralysis = 5 + ctx.dice.below(5);
        let confusion = 10 + ctx.dice.below(10);
        ctx.adjust(Adjustment::Extend(S::Paralysis.into(), paralysis));
        ctx.adjust(Adjustment::Extend(S::Confusion.into(), confusion));
        ctx.actor.hp_max = (ctx.actor.hp_max - 1).max(1);
        ctx.actor.hp = ctx.actor.hp.min(ctx.actor.hp_max);
        ctx.actor.redraw.hit_points = true;
        ctx.expired(timer);
        return Ok(0);
    }

    let mut next = value - 1;
    if next == LONG_EXPIRY_AT {
        let warning = Warning {
            at: LONG_EXPIRY_AT,
            text: "Your time is quickly running out!",
            hasten: Hasten::Upto(6),
            also: None,
        };
        next = warn(ctx, timer, &warning, next)?;
    }
    if next == 1 {
        ctx.say(Channel::Duration, "Your life is in your own hands again!");
        ctx.request(LedgerRequest::Acknowledge);
    }
    if next == 0 {
        ctx.expired(timer);
    }
    Ok(next)
}

/// A berserk turn spent without attacking. Each such turn in a row eats
/// further into rage, might, and haste (never ending them outright).
pub fn berserk_no_combat_penalty(actor: &mut Actor, sink: &mut dyn MessageSink) {
    let BerserkPenalty::Count(count) = actor.berserk_penalty else {
        return;
    };
    if !actor.is_berserk() {
        return;
    }

    let count = count + 1;
    actor.berserk_penalty = BerserkPenalty::Count(count);
    match count {
        2 => sink.emit(Channel::Duration, "You feel a strong urge to attack something."),
        4 => sink.emit(Channel::Duration, "You feel your anger subside."),
        6 => sink.emit(Channel::Duration, "Your blood rage is quickly leaving you."),
        _ => {}
    }

    for kind in [D::Berserk, D::Might, D::Haste] {
        let value = actor.durations.get(kind);
        if value > 0 {
            actor.durations.set(kind, value.saturating_sub(count).max(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{AmuletKind, Weapon};
    use crate::dice::ScriptedDice;
    use crate::duration::StatusKind;
    use crate::messages::Message;

    fn actor() -> Actor {
        Actor::new("Tess", Species::Human)
    }

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.text.as_str()).collect()
    }

    /// Dice that never trigger an optional extra: every one-in-n fails.
    fn calm() -> ScriptedDice {
        ScriptedDice::repeat(u32::MAX)
    }

    // ── Registry shape ──

    #[test]
    fn decrement_order_covers_every_timer_once() {
        let mut seen = std::collections::HashSet::new();
        for timer in DECREMENT_ORDER {
            assert!(seen.insert(timer), "{:?} listed twice", timer);
        }
        for kind in D::ALL {
            assert!(seen.contains(&Timer::Duration(kind)));
        }
        for kind in StatusKind::ALL {
            assert!(seen.contains(&Timer::Status(kind)));
        }
    }

    #[test]
    fn warnings_never_reach_zero() {
        for timer in DECREMENT_ORDER {
            if let Some(warning) = rule_for(timer).warning {
                let max_hasten = match warning.hasten {
                    Hasten::CoinFlip => 1,
                    Hasten::Upto(n) => n - 1,
                };
                assert!(warning.at > max_hasten, "{:?} can underflow", timer);
            }
        }
    }

    // ── Default rule ──

    #[test]
    fn every_duration_kind_expires_from_one_exactly_once() {
        for kind in D::ALL {
            let mut a = actor();
            a.durations.set(kind, 1);
            let mut out: Vec<Message> = Vec::new();
            let report = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
            assert_eq!(a.durations.get(kind), 0, "{:?} did not expire", kind);
            let count = report
                .expired
                .iter()
                .filter(|t| **t == Timer::Duration(kind))
                .count();
            assert_eq!(count, 1, "{:?} expired {} times", kind, count);
        }
    }

    #[test]
    fn plain_kinds_take_exactly_n_passes() {
        for timer in DECREMENT_ORDER {
            let Timer::Duration(kind) = timer else { continue };
            if !rule_for(timer).is_plain() {
                continue;
            }
            for start in [1u32, 2, 7, 25] {
                let mut a = actor();
                a.durations.set(kind, start);
                let mut passes = 0;
                while a.durations.get(kind) > 0 {
                    let mut out: Vec<Message> = Vec::new();
                    decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
                    passes += 1;
                    assert!(passes <= start, "{:?} overran", kind);
                }
                assert_eq!(passes, start, "{:?} from {}", kind, start);
            }
        }
    }

    #[test]
    fn haste_warns_at_six_and_may_skip() {
        let mut a = actor();
        a.durations.set(D::Haste, 7);
        let mut out: Vec<Message> = Vec::new();
        let mut skip = ScriptedDice::repeat(0);
        let report = decrement_all(&mut a, 10, &mut skip, &mut out).unwrap();
        assert_eq!(a.durations.get(D::Haste), 5);
        assert_eq!(report.warned, vec![Timer::Duration(D::Haste)]);
        assert!(texts(&out).contains(&"Your extra speed is starting to run out."));

        let mut b = actor();
        b.durations.set(D::Haste, 7);
        decrement_all(&mut b, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(b.durations.get(D::Haste), 6);
    }

    #[test]
    fn inactive_timers_stay_silent() {
        let mut a = actor();
        let mut out: Vec<Message> = Vec::new();
        let report = decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(report, LedgerReport::default());
        assert_eq!(a.timers(), Timers::default());
    }

    #[test]
    fn out_of_range_counter_is_fatal_and_untouched() {
        let mut a = actor();
        a.durations.set(D::Haste, TIMER_LIMIT + 5);
        a.durations.set(D::Might, 3);
        let mut out: Vec<Message> = Vec::new();
        let err = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap_err();
        assert!(matches!(err, InvariantViolation::TimerOutOfRange { .. }));
        assert_eq!(a.durations.get(D::Might), 3);
    }

    // ── Expiry effects ──

    #[test]
    fn might_expiry_costs_strength() {
        let mut a = actor();
        a.stats.strength = 15;
        a.durations.set(D::Might, 1);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(a.stats.strength, 10);
        assert!(a.redraw.strength);
    }

    #[test]
    fn weapon_brand_message_names_the_brand() {
        let mut a = actor();
        a.equipment.weapon = Some(Weapon {
            name: "long sword".into(),
            damage: 8,
            temp_brand: Some(Brand::Venom),
            special: None,
        });
        a.durations.set(D::WeaponBrand, 1);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(texts(&out), vec!["Your long sword stops dripping with poison."]);
        assert_eq!(a.equipment.weapon.as_ref().and_then(|w| w.temp_brand), None);
    }

    #[test]
    fn teleport_expiry_requests_a_teleport() {
        let mut a = actor();
        a.durations.set(D::Teleport, 1);
        let mut out: Vec<Message> = Vec::new();
        let report = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(
            report.requests,
            vec![LedgerRequest::Teleport {
                new_abyss_area: false
            }]
        );
    }

    #[test]
    fn silence_ends_without_a_message() {
        let mut a = actor();
        a.durations.set(D::Silence, 1);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    // ── Cross-kind interactions ──

    #[test]
    fn liquid_flames_burn_and_dissipate_icy_shield() {
        let mut a = actor();
        a.durations.set(D::LiquidFlames, 3);
        a.durations.set(D::CondensationShield, 1);
        let mut out: Vec<Message> = Vec::new();
        let report = decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.durations.get(D::LiquidFlames), 2);
        assert_eq!(a.durations.get(D::CondensationShield), 0);
        assert!(a.hp < a.hp_max);
        // The shield was dispelled, so its own expiry never ran.
        assert!(!texts(&out).contains(&"Your icy shield evaporates."));
        assert!(texts(&out).contains(&"Your icy shield dissipates!"));
        assert!(!report.expired.contains(&Timer::Duration(D::CondensationShield)));
    }

    #[test]
    fn icy_shield_chills_cold_vulnerable_actor() {
        let mut a = actor();
        a.resist.cold = -1;
        a.durations.set(D::CondensationShield, 4);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.hp, a.hp_max - 2);
        assert!(texts(&out).contains(&"You feel very cold."));
    }

    #[test]
    fn rage_collapse_paralyses_and_exhausts() {
        let mut a = actor();
        a.durations.set(D::Berserk, 1);
        a.durations.set(D::Exhausted, 0);
        // one_chance_in(10) succeeds -> pass out; 1d4 -> 1; 2d12 -> 2.
        let mut dice = ScriptedDice::repeat(0);
        let hunger = a.hunger;
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut dice, &mut out).unwrap();

        assert!(texts(&out).contains(&"You pass out from exhaustion."));
        assert!(!texts(&out).contains(&"You are exhausted."));
        assert_eq!(a.status.paralysis, 1);
        // Exhausted comes earlier in the pass, so its new ticks are untouched.
        assert_eq!(a.durations.get(D::Exhausted), 14);
        assert_eq!(a.durations.get(D::Slow), 14);
        assert_eq!(a.hunger, hunger - 700);
    }

    #[test]
    fn rage_survival_names_the_reason() {
        let mut a = actor();
        a.durations.set(D::Berserk, 1);
        a.mutations.berserk = 1;
        // total weight 35; survive (below(35)=20), cause 20 -> mutation.
        let mut dice = ScriptedDice::sequence([20, 20], u32::MAX);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut dice, &mut out).unwrap();
        let t = texts(&out);
        assert!(t.contains(&"Your mutated body refuses to collapse."));
        assert!(t.contains(&"You are exhausted."));
        assert_eq!(a.status.paralysis, 0);
    }

    #[test]
    fn exempt_rage_keeps_you_standing() {
        let mut a = actor();
        a.durations.set(D::Berserk, 1);
        a.berserk_penalty = BerserkPenalty::Exempt;
        a.hunger = 300;
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert!(texts(&out).contains(&"The very source of your rage keeps you on your feet."));
        assert_eq!(a.berserk_penalty, BerserkPenalty::Count(0));
        assert_eq!(a.hunger, rage::COLLAPSE_HUNGER_FLOOR);
    }

    #[test]
    fn trog_grants_vigour() {
        let mut a = actor();
        a.durations.set(D::Berserk, 1);
        a.religion = crate::actor::Religion {
            god: God::Trog,
            piety: 100,
            penance: false,
        };
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert!(texts(&out).contains(&"Trog's vigour flows through your veins."));
        assert_eq!(a.status.paralysis, 0);
    }

    // ── Custom rules ──

    #[test]
    fn gourmand_grows_only_with_amulet() {
        let mut a = actor();
        a.equipment.amulet = Some(AmuletKind::Gourmand);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.durations.get(D::Gourmand), 1);

        a.equipment.amulet = None;
        let report = decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.durations.get(D::Gourmand), 0);
        assert_eq!(report.expired, vec![Timer::Duration(D::Gourmand)]);
    }

    #[test]
    fn levitation_boots_pin_the_counter() {
        let mut a = actor();
        a.equipment.levitation_boots = true;
        a.durations.set(D::Levitation, 40);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(a.durations.get(D::Levitation), BOOTS_LEVITATION_PIN);
        decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(a.durations.get(D::Levitation), BOOTS_LEVITATION_PIN);
    }

    #[test]
    fn high_level_kenku_keep_flying() {
        let mut a = Actor::new("Kree", Species::Kenku);
        a.level = 15;
        a.durations.set(D::Levitation, 30);
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(a.durations.get(D::Levitation), 30);
    }

    #[test]
    fn landing_requests_terrain_reentry() {
        let mut a = actor();
        a.durations.set(D::Levitation, 1);
        a.controlled_flight = true;
        let mut out: Vec<Message> = Vec::new();
        let report = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(report.requests, vec![LedgerRequest::Land]);
        assert!(!a.controlled_flight);
    }

    #[test]
    fn flight_control_lasts_exactly_as_long_as_levitation() {
        let mut a = actor();
        a.durations.set(D::Levitation, 11);
        a.controlled_flight = true;
        let mut out: Vec<Message> = Vec::new();
        let report = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(report.warned, vec![Timer::Duration(D::Levitation)]);
        assert_eq!(a.durations.get(D::Levitation), 5);
        assert!(a.controlled_flight);

        let mut passes = 0;
        while a.durations.get(D::Levitation) > 0 {
            assert!(a.controlled_flight);
            decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
            passes += 1;
        }
        assert_eq!(passes, 5);
        assert!(!a.controlled_flight);
    }

    #[test]
    fn zero_poison_stays_zero_and_silent() {
        let mut a = actor();
        let mut out: Vec<Message> = Vec::new();
        for _ in 0..50 {
            decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        }
        assert_eq!(a.status.poison, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn poison_hurts_and_sometimes_wears_off() {
        let mut a = actor();
        a.status.poison = 3;
        let mut out: Vec<Message> = Vec::new();
        // below(5)=0 triggers, mild tier, recovery roll succeeds.
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.hp, a.hp_max - 1);
        assert_eq!(a.status.poison, 2);
        assert_eq!(texts(&out), vec!["You feel sick."]);
    }

    #[test]
    fn mummies_shrug_off_rot() {
        let mut a = Actor::new("Imhotep", Species::Mummy);
        a.status.rot = 5;
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.status.rot, 0);
        assert_eq!(a.hp_max, 15);
    }

    #[test]
    fn rot_eats_max_hp() {
        let mut a = actor();
        a.status.rot = 2;
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.status.rot, 1);
        assert_eq!(a.hp_max, 14);
    }

    #[test]
    fn deaths_door_breaks_when_healed() {
        let mut a = actor();
        a.status.deaths_door = 8;
        a.hp = 10;
        let mut out: Vec<Message> = Vec::new();
        decrement_all(&mut a, 10, &mut ScriptedDice::repeat(0), &mut out).unwrap();
        assert_eq!(a.status.deaths_door, 0);
        assert_eq!(a.status.paralysis, 5);
        assert_eq!(a.status.confusion, 10);
        assert_eq!(a.hp_max, 14);
    }

    #[test]
    fn deaths_door_asks_for_acknowledgement_near_the_end() {
        let mut a = actor();
        a.status.deaths_door = 2;
        a.hp = 1;
        let mut out: Vec<Message> = Vec::new();
        let report = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(a.status.deaths_door, 1);
        assert_eq!(report.requests, vec![LedgerRequest::Acknowledge]);
        let report = decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
        assert_eq!(a.status.deaths_door, 0);
        assert_eq!(report.expired, vec![Timer::Status(StatusKind::DeathsDoor)]);
    }

    // ── Berserk without combat ──

    #[test]
    fn idle_rage_burns_down_but_never_out() {
        let mut a = actor();
        a.durations.set(D::Berserk, 4);
        a.durations.set(D::Haste, 20);
        let mut out: Vec<Message> = Vec::new();
        berserk_no_combat_penalty(&mut a, &mut out);
        berserk_no_combat_penalty(&mut a, &mut out);
        assert_eq!(a.berserk_penalty, BerserkPenalty::Count(2));
        assert_eq!(a.durations.get(D::Berserk), 1);
        assert_eq!(a.durations.get(D::Haste), 17);
        assert_eq!(a.durations.get(D::Might), 0);
        assert_eq!(texts(&out), vec!["You feel a strong urge to attack something."]);
    }

    #[test]
    fn exempt_rage_takes_no_penalty() {
        let mut a = actor();
        a.berserk_penalty = BerserkPenalty::Exempt;
        a.durations.set(D::Berserk, 4);
        let mut out: Vec<Message> = Vec::new();
        berserk_no_combat_penalty(&mut a, &mut out);
        assert_eq!(a.durations.get(D::Berserk), 4);
    }

    // ── Properties ──

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn counters_never_grow_without_help(
                start in 0u32..2_000,
                kind_index in 0usize..D::COUNT,
            ) {
                let kind = D::ALL[kind_index];
                prop_assume!(kind != D::Gourmand);
                let mut a = actor();
                a.durations.set(kind, start);
                let mut out: Vec<Message> = Vec::new();
                decrement_all(&mut a, 10, &mut calm(), &mut out).unwrap();
                prop_assert!(a.durations.get(kind) <= start);
                prop_assert!(a.timers().check_bounds().is_ok());
            }
        }
    }
}
