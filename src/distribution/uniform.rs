//! Seeded uniform sampling
//!
//! Varying iteration intervals are drawn uniformly from `[min, max)` and file
//! pools are shuffled once at initialisation. Both use xoshiro256++, seeded
//! from entropy in production and from a fixed seed in tests.

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform sampler over a half-open range
pub struct UniformSampler {
    rng: Xoshiro256PlusPlus,
}

impl UniformSampler {
    /// Create a sampler with a random seed
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Create a sampler with a specific seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Sample a value in `[min, max)`; returns `min` when the range is empty
    #[inline]
    pub fn sample(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_in_range() {
        let mut sampler = UniformSampler::new();
        for _ in 0..100 {
            let v = sampler.sample(200, 500);
            assert!((200..500).contains(&v));
        }
    }

    #[test]
    fn test_sample_empty_range() {
        let mut sampler = UniformSampler::new();
        assert_eq!(sampler.sample(7, 7), 7);
        assert_eq!(sampler.sample(9, 3), 9);
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut a = UniformSampler::with_seed(12345);
        let mut b = UniformSampler::with_seed(12345);
        for _ in 0..10 {
            assert_eq!(a.sample(0, 1000), b.sample(0, 1000));
        }
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut sampler = UniformSampler::with_seed(42);
        let mut items: Vec<u32> = (0..50).collect();
        sampler.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_coverage() {
        let mut sampler = UniformSampler::with_seed(42);
        let mut buckets = vec![0u32; 10];
        for _ in 0..10000 {
            buckets[(sampler.sample(0, 100) / 10) as usize] += 1;
        }
        // Allow 20% deviation
        for count in buckets {
            assert!(count > 800 && count < 1200, "Bucket count {} outside expected range", count);
        }
    }
}
