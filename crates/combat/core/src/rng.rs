//! RNG oracle for reproducible combat rolls.
//!
//! Every random draw in the engine (hit, dodge, crit, damage variance, recoil
//! magnitude) is a single call into one [`RngOracle`] owned by the session.
//! Swapping the oracle is how tests pin exact sequences.

/// Source of random numbers for combat resolution.
///
/// Implementations must be deterministic for a given seed so sessions can be
/// replayed.
pub trait RngOracle: Send {
    /// Generate the next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Generate a float uniformly distributed in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        // 53 high bits fill the f64 mantissa exactly.
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll against a percentage chance on a 0-100 scale.
    ///
    /// Chances at or below 0 never succeed; chances at or above 100 always do.
    fn roll_percent(&mut self, chance: f64) -> bool {
        self.next_f64() * 100.0 < chance
    }

    /// Generate an integer in `[min, max]` inclusive.
    fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let span = (max - min) as f64 + 1.0;
        let offset = (self.next_f64() * span).floor() as i64;
        min + offset.min(max - min)
    }

    /// Generate a float in `[min, max)`.
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        min + self.next_f64() * (max - min)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Small, fast, and fully deterministic. This is the session default.
#[derive(Clone, Copy, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a generator whose sequence is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: mix_seed(seed),
        }
    }

    /// Advance the PCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

impl Default for PcgRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RngOracle for PcgRng {
    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }
}

/// Final avalanche step so nearby seeds produce unrelated sequences.
fn mix_seed(seed: u64) -> u64 {
    let mut hash = seed ^ 0x9e3779b97f4a7c15;
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}

/// Adapter that drives the engine from any `rand` generator.
///
/// ```ignore
/// use rand::SeedableRng;
/// let rng = RandRng::new(rand::rngs::StdRng::seed_from_u64(7));
/// ```
#[derive(Clone, Debug)]
pub struct RandRng<R> {
    inner: R,
}

impl<R: rand::RngCore + Send> RandRng<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: rand::RngCore + Send> RngOracle for RandRng<R> {
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

/// Replays a fixed sequence of unit floats, cycling when exhausted.
///
/// Each value is what `next_f64` returns, so a test can force a hit with
/// `0.0` or a miss with `0.99` against a percentage roll. An empty script
/// always yields `0.0`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RngOracle for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        ((self.next_f64() * (1u64 << 53) as f64) as u64) << 11
    }

    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
