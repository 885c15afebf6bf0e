use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Large odd multiplier spreading replicate indices across the seed space.
const REPLICATE_SEED_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Derive the seed of an independent replicate run.
pub fn derive_replicate_seed(base_seed: u64, replicate: usize) -> u64 {
    base_seed.wrapping_add((replicate as u64).wrapping_mul(REPLICATE_SEED_PRIME))
}
