use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;

/// Seeded random stream shared by every ant of a colony.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    rng: StdRng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, upper)`. `upper` must be positive.
    pub fn gen_below(&mut self, upper: f64) -> f64 {
        self.rng.gen_range(0.0..upper)
    }
}

/// Roulette wheel selection.
///
/// Draws `r` uniformly in `[0, total)` and returns the first candidate, in
/// map order, whose cumulative weight exceeds `r`. Returns `None` when there
/// is nothing to draw from: no candidates, a negative or non-finite weight,
/// or a zero total.
pub fn select<K: Copy>(rng: &mut RandomSource, weights: &BTreeMap<K, f64>) -> Option<K> {
    if weights.values().any(|w| !w.is_finite() || *w < 0.0) {
        return None;
    }
    let total: f64 = weights.values().sum();
    if !(total > 0.0) || !total.is_finite() {
        return None;
    }

    let r = rng.gen_below(total);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (&candidate, &weight) in weights {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if r < cumulative {
            return Some(candidate);
        }
        last_positive = Some(candidate);
    }
    // cumulative rounding can leave r just above the final sum
    last_positive
}
