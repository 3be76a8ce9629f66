//! Random variates driving the compartment transitions.
//!
//! Every sampler takes the generator explicitly so each run can own an
//! independent, seedable stream.

use rand::{Rng, distr::Distribution};
use rand_distr::{Binomial, Poisson};

/// Above this rate `exp(-lambda)` gets close enough to underflow that the
/// product-of-uniforms method stops being exact.
pub const KNUTH_LAMBDA_LIMIT: f64 = 500.0;

/// Above this many trials the Bernoulli sum is replaced by an inversion sampler.
pub const BERNOULLI_TRIAL_LIMIT: u64 = 100_000;

/// Poisson draw using Knuth's product-of-uniforms method. Non-positive rates
/// return zero without consuming randomness.
pub fn poisson<R: Rng>(rng: &mut R, lambda: f64) -> u64 {
    if lambda.is_nan() || lambda <= 0.0 {
        return 0;
    }
    if lambda > KNUTH_LAMBDA_LIMIT {
        return match Poisson::new(lambda) {
            Ok(dist) => dist.sample(rng) as u64,
            Err(_) => 0,
        };
    }

    let limit = (-lambda).exp();
    let mut draws = 0;
    let mut product = 1.0;
    loop {
        draws += 1;
        product *= rng.random::<f64>();
        if product <= limit {
            break;
        }
    }
    draws - 1
}

/// Number of successes in `n` Bernoulli(`p`) trials.
pub fn binomial<R: Rng>(rng: &mut R, n: u64, p: f64) -> u64 {
    if p.is_nan() || p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }
    if n > BERNOULLI_TRIAL_LIMIT {
        return match Binomial::new(n, p) {
            Ok(dist) => dist.sample(rng).min(n),
            Err(_) => 0,
        };
    }

    (0..n).filter(|_| rng.random::<f64>() < p).count() as u64
}

/// Box-Muller normal draw, floored at zero since it models a contact rate.
pub fn normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero so the log stays finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();

    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    f64::max(0.0, mean + z0 * std_dev)
}
