use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random-range generator with the firmware's semantics.
///
/// The firmware asks for `random(lowest, highest)` and tolerates inverted
/// or zero-width ranges, so degenerate spans are clamped to 1 instead of
/// rejected. Statistical uniformity over the half-open range is all that is
/// required; the stream does not match any particular platform's `rand()`.
pub struct EyeRng {
    rng: SmallRng,
}

impl EyeRng {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Reinitialize the generator state deterministically.
    pub fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// An integer in `[low, low + span)` where `span = max(1, high - low)`.
    /// When `high <= low` the result is always exactly `low`.
    pub fn random_range(&mut self, low: i32, high: i32) -> i32 {
        let span = high.saturating_sub(low).max(1);
        low + self.rng.gen_range(0..span)
    }
}

impl Default for EyeRng {
    fn default() -> Self {
        Self::new()
    }
}
