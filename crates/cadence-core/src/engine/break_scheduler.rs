use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::IntervalRange;

/// Picks the delay before the next short break of a study segment.
pub struct BreakScheduler {
    rng: StdRng,
}

impl Default for BreakScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakScheduler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws `d` uniformly from the inclusive interval and returns it only if
    /// the break would end before the segment does. `None` means the rest of
    /// the segment runs break-free.
    pub fn arm_next(
        &mut self,
        remaining: Duration,
        interval: IntervalRange,
        short_break: Duration,
    ) -> Option<Duration> {
        let delay = Duration::from_secs(self.rng.gen_range(interval.min()..=interval.max()));
        fits_before_end(remaining, delay, short_break).then_some(delay)
    }
}

pub fn fits_before_end(remaining: Duration, delay: Duration, short_break: Duration) -> bool {
    remaining > delay.saturating_add(short_break)
}
