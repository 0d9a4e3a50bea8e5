//! Spatial Layout Engine
//!
//! Places modules on a golden-angle spiral over a sphere. Larger modules are
//! pulled toward the centre. Jitter is off unless a seed is configured.

use crate::LayoutOptions;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

const MIN_RADIUS: f64 = 5.0;
const RADIUS_PER_MODULE: f64 = 0.8;
const GOLDEN_FRACTION: f64 = 0.618_034;
const SIZE_PULL: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Sphere radius for `count` modules
pub fn radius(count: usize) -> f64 {
    (count as f64 * RADIUS_PER_MODULE).max(MIN_RADIUS)
}

/// One position per entry of `sizes`, in the same order
pub fn layout(sizes: &[usize], options: &LayoutOptions) -> Vec<Position> {
    let count = sizes.len();
    if count == 0 {
        return Vec::new();
    }
    let radius = radius(count);
    let max_size = sizes.iter().copied().max().unwrap_or(0);
    let mut rng = options.jitter_seed.map(ChaCha8Rng::seed_from_u64);

    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let phi = (1.0 - 2.0 * (i as f64 + 0.5) / count as f64).acos();
            let theta = 2.0 * PI * i as f64 * GOLDEN_FRACTION;
            let pull = if max_size == 0 {
                1.0
            } else {
                1.0 - SIZE_PULL * (size as f64 / max_size as f64)
            };
            let r = radius * pull;
            let mut position = Position {
                x: r * phi.sin() * theta.cos(),
                y: r * phi.sin() * theta.sin(),
                z: r * phi.cos(),
            };
            if let Some(rng) = rng.as_mut() {
                let amplitude = options.jitter_amplitude;
                if amplitude > 0.0 {
                    position.x += rng.gen_range(-amplitude..=amplitude);
                    position.y += rng.gen_range(-amplitude..=amplitude);
                    position.z += rng.gen_range(-amplitude..=amplitude);
                }
            }
            position
        })
        .collect()
}
