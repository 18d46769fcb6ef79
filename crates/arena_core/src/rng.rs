//! Injected randomness.
//!
//! The engine never touches an ambient generator. Every roll goes through a
//! [`RandomSource`] handed in by the caller, so an encounter is replayable
//! from its seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::Fixed;

/// Source of uniform rolls in `[0, 1)`.
///
/// Only [`RandomSource::next_float`] must be implemented. The provided
/// helpers each consume exactly one roll, which keeps scripted sources easy
/// to reason about.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_float(&mut self) -> f64;

    /// Next roll as a fixed-point fraction in `[0, 1)`.
    fn roll(&mut self) -> Fixed {
        Fixed::saturating_from_num(self.next_float().clamp(0.0, 1.0))
    }

    /// `true` with probability `probability` (a fraction in `0..=1`).
    fn chance(&mut self, probability: Fixed) -> bool {
        self.roll() < probability
    }

    /// Uniform index into a collection of `len` items; `0` when `len` is 0.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            // still consume the roll so stream positions stay aligned
            let _ = self.next_float();
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let idx = (self.next_float().clamp(0.0, 1.0) * len as f64) as usize;
        idx.min(len - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_float(&mut self) -> f64 {
        (**self).next_float()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_float(&mut self) -> f64 {
        (**self).next_float()
    }
}

/// ChaCha8-backed source; identical seeds give identical streams everywhere.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Create a source from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this source was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_float(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
