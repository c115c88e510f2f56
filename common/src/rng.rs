use rand::prelude::{SeedableRng, StdRng};

/// Creates the rng used by a search. A fixed seed makes the search reproducible.
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
