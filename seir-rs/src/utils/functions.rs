use crate::prelude::{Date, Real};
use chrono::Duration;
use rand::{rngs::SmallRng, SeedableRng};

/// Seed used by default_rng(). Keeps projections reproducible across runs.
pub const DEFAULT_SEED: u64 = 0;

/// Inverse logistic curve shifted to `shift`, with steepness `a`, amplitude
/// `b` and offset `c`.
///
/// Evaluates to c + b/2 at x = shift, tends to c + b as x -> -inf and to c as
/// x -> inf.
#[inline]
pub fn inv_sigmoid(x: Real, shift: Real, a: Real, b: Real, c: Real) -> Real {
    let e = (-a * (x - shift)).exp();
    if e.is_infinite() {
        return b + c;
    }
    b * e / (1.0 + e) + c
}

/// Dates from start to end (inclusive). Empty if end < start.
pub fn date_range(start: Date, end: Date) -> Vec<Date> {
    let n = (end - start).num_days();
    (0..=n).map(|i| start + Duration::days(i)).collect()
}

/// Random number generator seeded with DEFAULT_SEED.
pub fn default_rng() -> SmallRng {
    SmallRng::seed_from_u64(DEFAULT_SEED)
}

/// Random number generator with an explicit seed.
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}
