use std::f64::consts::TAU;

use rand::Rng;

/// Draws from a normal distribution (Box–Muller transform).
pub fn gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
	// 1 - u keeps the logarithm argument in (0, 1]
	let u1: f64 = 1.0 - rng.random::<f64>();
	let u2: f64 = rng.random();
	let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
	mean + std_dev * z
}

/// `|N(mean, std_dev)|`
pub fn abs_gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
	gauss(rng, mean, std_dev).abs()
}

/// Word count for a size that is compared with `count < size`: the smallest
/// integer not below `size`.
pub fn ceil_size(size: f64) -> usize {
	size.max(0.0).ceil() as usize
}

/// Word count for a size that is truncated before use.
pub fn floor_size(size: f64) -> usize {
	size.max(0.0).floor() as usize
}
