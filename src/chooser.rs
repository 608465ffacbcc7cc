//! Seedable source of random choices.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Random choices driven by a [`ChaCha8Rng`].
///
/// Two choosers built with the same seed make the same sequence of choices.
#[derive(Debug, Clone)]
pub struct Chooser {
    seed: u64,
    rng: ChaCha8Rng,
}

impl Chooser {
    /// A chooser with a fresh random seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Uniform choice in `0..n`.
    pub fn choose(&mut self, n: usize) -> usize {
        assert!(n > 0, "Cannot choose among zero options");
        self.rng.random_range(0..n)
    }

    pub fn choose_bool(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

impl Default for Chooser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = Chooser::with_seed(42);
        let mut b = Chooser::with_seed(42);
        let xs: Vec<usize> = (0..32).map(|_| a.choose(1000)).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.choose(1000)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_reseed() {
        let mut a = Chooser::with_seed(7);
        let first: Vec<bool> = (0..16).map(|_| a.choose_bool()).collect();
        a.reseed(7);
        let again: Vec<bool> = (0..16).map(|_| a.choose_bool()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_choose_in_range() {
        let mut a = Chooser::with_seed(1);
        for _ in 0..100 {
            assert!(a.choose(3) < 3);
        }
        assert_eq!(a.choose(1), 0);
    }
}
