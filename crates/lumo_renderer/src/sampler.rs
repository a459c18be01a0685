//! Stratified sub-pixel sample offsets.
//!
//! Samples are generated once, up front, from a seeded RNG so that every
//! tracer variant (and every tile) sees exactly the same offsets.

use lumo_math::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{RenderError, RenderResult};

/// Samples per pixel used when nothing else is configured.
pub const DEFAULT_SAMPLE_COUNT: usize = 25;

/// Largest f32 below 1.0.
const ONE_MINUS_EPSILON: f32 = 0.999_999_94;

/// A fixed set of 2D offsets in the unit square.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    samples: Vec<Vec2>,
    seed: u64,
}

impl Sampler {
    /// Build `count` jittered samples from `seed`.
    pub fn jittered(count: usize, seed: u64) -> RenderResult<Self> {
        if count == 0 {
            return Err(RenderError::EmptySampler);
        }

        Ok(Self {
            samples: generate_samples(count, seed),
            seed,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a sampler holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample by index, wrapping around past the end.
    pub fn sample(&self, index: usize) -> Vec2 {
        self.samples[index % self.samples.len()]
    }

    /// All samples in generation order.
    pub fn samples(&self) -> &[Vec2] {
        &self.samples
    }

    /// Pick a sample from an arbitrary key without any shared state.
    pub fn draw(&self, key: u64) -> Vec2 {
        let index = splitmix64(key ^ self.seed) % self.samples.len() as u64;
        self.samples[index as usize]
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Generate `count` offsets on a `k x k` grid with `k = ceil(sqrt(count))`.
///
/// Each used cell receives one uniformly jittered sample. When the grid has
/// more cells than requested samples, the cells are picked by a seeded shuffle.
pub fn generate_samples(count: usize, seed: u64) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let mut k = (count as f64).sqrt().ceil() as usize;
    while k * k < count {
        k += 1;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut cells: Vec<usize> = (0..k * k).collect();
    if cells.len() > count {
        cells.shuffle(&mut rng);
        cells.truncate(count);
        cells.sort_unstable();
    }

    let scale = 1.0 / k as f32;
    cells
        .into_iter()
        .map(|cell| {
            let cx = (cell % k) as f32;
            let cy = (cell / k) as f32;
            let x = (cx + rng.gen::<f32>()) * scale;
            let y = (cy + rng.gen::<f32>()) * scale;
            Vec2::new(x.min(ONE_MINUS_EPSILON), y.min(ONE_MINUS_EPSILON))
        })
        .collect()
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_count_in_unit_square() {
        for count in 1..=100 {
            let sampler = Sampler::jittered(count, 42).unwrap();
            assert_eq!(sampler.len(), count);

            for s in sampler.samples() {
                assert!((0.0..1.0).contains(&s.x), "x out of range: {}", s.x);
                assert!((0.0..1.0).contains(&s.y), "y out of range: {}", s.y);
            }
        }
    }

    #[test]
    fn test_zero_samples_rejected() {
        assert_eq!(Sampler::jittered(0, 1), Err(RenderError::EmptySampler));
        assert!(generate_samples(0, 1).is_empty());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let a = Sampler::jittered(25, 9).unwrap();
        let b = Sampler::jittered(25, 9).unwrap();
        let c = Sampler::jittered(25, 10).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.samples(), c.samples());
    }

    #[test]
    fn test_perfect_square_is_stratified() {
        // 16 samples -> one per cell of a 4x4 grid
        let sampler = Sampler::jittered(16, 3).unwrap();
        let mut seen = [false; 16];
        for s in sampler.samples() {
            let cell = (s.y * 4.0) as usize * 4 + (s.x * 4.0) as usize;
            assert!(!seen[cell], "two samples in cell {}", cell);
            seen[cell] = true;
        }
        assert!(seen.iter().all(|&used| used));
    }

    #[test]
    fn test_partial_grid_uses_distinct_cells() {
        // 5 samples on a 3x3 grid
        let sampler = Sampler::jittered(5, 77).unwrap();
        let mut cells: Vec<usize> = sampler
            .samples()
            .iter()
            .map(|s| (s.y * 3.0) as usize * 3 + (s.x * 3.0) as usize)
            .collect();
        cells.dedup();
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_sample_wraps_and_draw_is_stable() {
        let sampler = Sampler::jittered(4, 5).unwrap();
        assert_eq!(sampler.sample(1), sampler.sample(5));

        for key in 0..64 {
            let drawn = sampler.draw(key);
            assert_eq!(drawn, sampler.draw(key));
            assert!(sampler.samples().contains(&drawn));
        }
    }
}
