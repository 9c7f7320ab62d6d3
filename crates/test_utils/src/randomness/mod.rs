// Path: crates/test_utils/src/randomness/mod.rs
//! Deterministic randomness for reproducible tests

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Deterministic random number generator for entropy, out points and key material
pub struct TestRng {
    rng: StdRng,
}

impl TestRng {
    /// Create a new test RNG with the specified seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a test RNG with the default seed 12345
    pub fn with_default_seed() -> Self {
        Self::new(12345)
    }

    /// Fill a buffer with random bytes
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    /// 32 bytes of entropy for contract and document id derivation
    pub fn entropy(&mut self) -> [u8; 32] {
        let mut entropy = [0u8; 32];
        self.rng.fill_bytes(&mut entropy);
        entropy
    }

    /// A 36-byte transaction out point
    pub fn out_point(&mut self) -> Vec<u8> {
        self.bytes(36)
    }

    /// `len` random bytes
    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }
}

impl Default for TestRng {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        assert_eq!(TestRng::new(7).entropy(), TestRng::new(7).entropy());
        assert_ne!(TestRng::new(7).entropy(), TestRng::new(8).entropy());
        assert_eq!(TestRng::default().out_point().len(), 36);
    }
}
