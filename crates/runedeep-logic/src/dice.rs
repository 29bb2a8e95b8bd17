//! Injected randomness.
//!
//! Logic functions never own an RNG. They take `&mut dyn Dice` (or
//! `&mut impl Dice`) so the engine can back it with a seeded generator and
//! tests can script exact outcomes.

use std::collections::VecDeque;

/// Source of uniform random integers plus the derived rolls the turn loop uses.
pub trait Dice {
    /// Uniform integer in `0..n`. Returns 0 when `n` is 0.
    fn below(&mut self, n: u32) -> u32;

    /// True with probability `1/n`. Denominators of 0 or 1 always succeed.
    fn one_chance_in(&mut self, n: u32) -> bool {
        n <= 1 || self.below(n) == 0
    }

    fn coinflip(&mut self) -> bool {
        self.below(2) == 0
    }

    /// Sum of `count` dice with `sides` faces each, each face `1..=sides`.
    fn roll_dice(&mut self, count: u32, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (0..count).map(|_| self.below(sides) + 1).sum()
    }

    /// Average of `rolls` draws of `below(n)`; biased toward the middle.
    fn below_avg(&mut self, n: u32, rolls: u32) -> u32 {
        if rolls == 0 {
            return 0;
        }
        let total: u32 = (0..rolls).map(|_| self.below(n)).sum();
        total / rolls
    }

    /// `num / den` with the fractional part rounded up at random.
    fn div_rand_round(&mut self, num: u32, den: u32) -> u32 {
        if den == 0 {
            return 0;
        }
        let whole = num / den;
        if self.below(den) < num % den {
            whole + 1
        } else {
            whole
        }
    }
}

/// Deterministic dice for harnesses and tests.
///
/// Values are consumed from a queue; once empty, `fallback` is used. Every
/// value is clamped into range, so `ScriptedDice::repeat(0)` makes every
/// `one_chance_in` succeed and `ScriptedDice::repeat(u32::MAX)` makes every
/// one fail (for denominators above 1).
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    queue: VecDeque<u32>,
    fallback: u32,
    draws: usize,
}

impl ScriptedDice {
    pub fn sequence(values: impl IntoIterator<Item = u32>, fallback: u32) -> Self {
        Self {
            queue: values.into_iter().collect(),
            fallback,
            draws: 0,
        }
    }

    pub fn repeat(value: u32) -> Self {
        Self::sequence([], value)
    }

    /// Number of `below` calls made so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Dice for ScriptedDice {
    fn below(&mut self, n: u32) -> u32 {
        self.draws += 1;
        let raw = self.queue.pop_front().unwrap_or(self.fallback);
        if n == 0 {
            0
        } else {
            raw.min(n - 1)
        }
    }
}
