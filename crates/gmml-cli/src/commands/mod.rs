//! CLI command implementations

pub mod drop;
pub mod views;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded generator, or one drawn from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
