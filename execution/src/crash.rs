//! Crash point draws.
//!
//! With probability 1/3 a round crashes early, uniformly in `[1.00, 2.00)`;
//! otherwise the crash point is uniform in `[2.00, 10.00)`.

use liftoff_types::game::constants::{
    EARLY_CRASH_CEILING, EARLY_CRASH_PROBABILITY, LATE_CRASH_CEILING, MIN_CRASH_POINT,
};
use liftoff_types::CrashPoint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Supplies one crash point per round.
pub trait CrashPointSource: Send + 'static {
    fn next_crash_point(&mut self) -> CrashPoint;
}

/// Draw a crash point from the two-branch distribution.
pub fn draw_crash_point<R: Rng + ?Sized>(rng: &mut R) -> CrashPoint {
    let value = if rng.gen_bool(EARLY_CRASH_PROBABILITY) {
        rng.gen_range(MIN_CRASH_POINT..EARLY_CRASH_CEILING)
    } else {
        rng.gen_range(EARLY_CRASH_CEILING..LATE_CRASH_CEILING)
    };
    CrashPoint::new(value).unwrap_or(CrashPoint::MIN)
}

/// Crash points drawn from a ChaCha20 stream.
pub struct RandomCrashPoints {
    rng: ChaCha20Rng,
}

impl RandomCrashPoints {
    /// Reproducible draws for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Draws seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }
}

impl CrashPointSource for RandomCrashPoints {
    fn next_crash_point(&mut self) -> CrashPoint {
        draw_crash_point(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_in_range() {
        let mut source = RandomCrashPoints::seeded(7);
        for _ in 0..10_000 {
            let point = source.next_crash_point().value();
            assert!((MIN_CRASH_POINT..LATE_CRASH_CEILING).contains(&point));
        }
    }

    #[test]
    fn test_early_branch_frequency() {
        let mut source = RandomCrashPoints::seeded(11);
        let draws = 30_000;
        let early = (0..draws)
            .filter(|_| source.next_crash_point().value() < EARLY_CRASH_CEILING)
            .count();
        let ratio = early as f64 / draws as f64;
        assert!((0.30..0.37).contains(&ratio), "early ratio {ratio}");
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let mut a = RandomCrashPoints::seeded(3);
        let mut b = RandomCrashPoints::seeded(3);
        for _ in 0..100 {
            assert_eq!(a.next_crash_point(), b.next_crash_point());
        }
    }
}
