use ahash::RandomState;
pub fn seeded_hasher(seed: u64) -> RandomState {
    let seed1 = seed;
    let seed2 = seed.rotate_left(16);
    let seed3 = seed.rotate_left(32);
    let seed4 = seed.rotate_left(48);
    RandomState::with_seeds(seed1, seed2, seed3, seed4)
}
pub(crate) type HashSet<T> = std::collections::HashSet<T, RandomState>;

#[cfg(feature = "c001")]
pub mod longest_path;
#[cfg(feature = "c001")]
pub use longest_path as c001;
