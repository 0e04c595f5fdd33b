use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use super::Event;

/// Bursts with exponentially distributed gaps. The iterator owns its PRNG,
/// so two iterators built from the same seed replay the same arrivals.
#[derive(Debug, Clone)]
pub struct PoissonEvents {
    /// Events per second.
    lambda: f64,
    size: u64,
    cursor: Option<Duration>,
    end: Option<Duration>,
    rng: Pcg64,
}

impl PoissonEvents {
    #[must_use]
    pub fn new(
        rate: f64,
        size: u64,
        start: Duration,
        end: Option<Duration>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Self {
            lambda: rate / size.max(1) as f64,
            size,
            cursor: Some(start),
            end,
            rng,
        }
    }

    fn next_gap(&mut self) -> Option<Duration> {
        // gen() is in [0, 1); flip it so ln never sees zero.
        let uniform = 1.0 - self.rng.r#gen::<f64>();
        let gap = (-uniform.ln() / self.lambda).abs();
        Duration::try_from_secs_f64(gap).ok()
    }
}

impl Iterator for PoissonEvents {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        if self.end.is_some_and(|end| cursor >= end) {
            self.cursor = None;
            return None;
        }
        self.cursor = self
            .next_gap()
            .and_then(|gap| cursor.checked_add(gap));
        Some(Event::new(cursor, self.size))
    }
}
