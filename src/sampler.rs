use once_cell::sync::Lazy;
use rand::Rng;

use crate::error::GameError;

/// Number of difficulty levels; valid levels are `0..DIFFICULTY_LEVELS`.
pub const DIFFICULTY_LEVELS: u8 = 5;

/// Exponent denominators per difficulty level, precomputed once.
///
/// A base weight is scaled to `ceil(weight^(1/d))` before a draw. Level 0
/// keeps `d = 1` (selection stays proportional to raw weight); higher levels
/// flatten the distribution so small countries and cities come up more often.
static EXPONENT_DENOMINATORS: Lazy<[f64; DIFFICULTY_LEVELS as usize]> = Lazy::new(|| {
    let mut denominators = [0.0; DIFFICULTY_LEVELS as usize];
    for (level, slot) in denominators.iter_mut().enumerate() {
        *slot = (level as f64 / (DIFFICULTY_LEVELS - 1) as f64).exp();
    }
    denominators
});

/// Returns the skew exponent denominator for a difficulty level.
pub fn exponent_denominator(level: u8) -> Result<f64, GameError> {
    EXPONENT_DENOMINATORS
        .get(level as usize)
        .copied()
        .ok_or(GameError::InvalidDifficulty(level))
}

/// Draws one value from `weights`, with probability proportional to
/// `ceil(weight^(1/denominator))`.
///
/// The draw walks the entries in input order and returns the first whose
/// running cumulative sum reaches a uniform point in `[0, total)`, so the
/// result is deterministic for a fixed rng draw. Zero-weight entries can
/// never win.
pub fn weighted_sample<'a, T, R: Rng>(
    rng: &mut R,
    weights: &'a [(T, u64)],
    denominator: f64,
) -> Result<&'a T, GameError> {
    let adjusted: Vec<u64> = weights
        .iter()
        .map(|(_, weight)| (*weight as f64).powf(1.0 / denominator).ceil() as u64)
        .collect();
    let total: u64 = adjusted.iter().sum();
    if total == 0 {
        return Err(GameError::EmptyCandidateSet);
    }

    let point = rng.gen_range(0.0..total as f64);
    let mut running = 0u64;
    for ((value, _), &weight) in weights.iter().zip(&adjusted) {
        if weight == 0 {
            continue;
        }
        running += weight;
        if running as f64 >= point {
            return Ok(value);
        }
    }
    // Unreachable: the final running sum equals `total`, which exceeds `point`.
    Err(GameError::EmptyCandidateSet)
}
