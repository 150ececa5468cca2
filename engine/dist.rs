//! Standard-normal helpers shared across the engine.
//!
//! Every density, tail probability, and quantile in the crate goes through
//! these four functions so the accuracy characteristics are uniform.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

fn unit_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("unit normal parameters are always valid")
}

/// Standard normal CDF Φ(z).
pub fn phi(z: f64) -> f64 {
    unit_normal().cdf(z)
}

/// Standard normal quantile Φ⁻¹(p) for p in (0, 1).
pub fn phi_inv(p: f64) -> f64 {
    unit_normal().inverse_cdf(p)
}

/// Normal CDF with arbitrary location and scale. `sd` must be positive.
pub fn normal_cdf(x: f64, mean: f64, sd: f64) -> f64 {
    Normal::new(mean, sd)
        .expect("normal scale is positive by construction")
        .cdf(x)
}

/// Normal density with arbitrary location and scale. `sd` must be positive.
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    Normal::new(mean, sd)
        .expect("normal scale is positive by construction")
        .pdf(x)
}
