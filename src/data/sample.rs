//! Fixed-seed subsampling so every run sees the same rows.

/// Minimal deterministic PRNG (xoshiro256**).
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: [u64; 4],
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SeededRng { state: s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `[0, bound)`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        ((self.next_u64() as u128 * bound as u128) >> 64) as usize
    }

    /// Box-Muller transform for normal distribution
    pub fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Draw `min(n, items.len())` distinct items without replacement, in draw order.
///
/// A partial Fisher–Yates shuffle over row positions; the same `seed` and input
/// length always select the same rows.
pub fn sample<T>(items: Vec<T>, n: usize, seed: u64) -> Vec<T> {
    let total = items.len();
    let n = n.min(total);

    let mut order: Vec<usize> = (0..total).collect();
    let mut rng = SeededRng::new(seed);
    for i in 0..n {
        let j = i + rng.below(total - i);
        order.swap(i, j);
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order[..n]
        .iter()
        .filter_map(|&idx| slots[idx].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let rows: Vec<u32> = (0..10_000).collect();
        let a = sample(rows.clone(), 3000, 42);
        let b = sample(rows, 3000, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3000);
    }

    #[test]
    fn different_seed_different_sample() {
        let rows: Vec<u32> = (0..1000).collect();
        assert_ne!(sample(rows.clone(), 100, 1), sample(rows, 100, 2));
    }

    #[test]
    fn sample_has_no_duplicates() {
        let rows: Vec<u32> = (0..500).collect();
        let drawn = sample(rows, 400, 7);
        let unique: BTreeSet<_> = drawn.iter().collect();
        assert_eq!(unique.len(), drawn.len());
        assert!(drawn.iter().all(|&r| r < 500));
    }

    #[test]
    fn sample_larger_than_input_keeps_every_row() {
        let rows: Vec<u32> = (0..25).collect();
        let mut drawn = sample(rows.clone(), 3000, 42);
        drawn.sort_unstable();
        assert_eq!(drawn, rows);
    }

    #[test]
    fn below_stays_in_range() {
        let mut rng = SeededRng::new(3);
        for bound in 1..200 {
            assert!(rng.below(bound) < bound);
        }
    }
}
