//! Bidirectional conversions between effect-size representations.
//!
//! Cohen's d is the canonical internal representation; every other effect
//! size is a view converted to or from d with a fixed formula. The
//! `convert_effect_size` dispatcher routes any supported pair through d.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::discrimination::roc_auc_parametric;
use crate::dist::{phi, phi_inv};
use crate::error::{DomainError, check_base_rate};

/// Odds ratio from Cohen's d: `exp(d * pi / sqrt(3))`.
pub fn d_to_odds_ratio(d: f64) -> f64 {
    (d * PI / 3.0_f64.sqrt()).exp()
}

/// Cohen's d from an odds ratio: `ln(OR) * sqrt(3) / pi`.
pub fn odds_ratio_to_d(odds_ratio: f64) -> Result<f64, DomainError> {
    if odds_ratio <= 0.0 || !odds_ratio.is_finite() {
        return Err(DomainError::OddsRatio(odds_ratio));
    }
    Ok(odds_ratio.ln() * 3.0_f64.sqrt() / PI)
}

/// Log odds ratio from Cohen's d: `d * pi / sqrt(3)`.
pub fn d_to_log_odds_ratio(d: f64) -> f64 {
    d * PI / 3.0_f64.sqrt()
}

pub fn log_odds_ratio_to_d(log_odds_ratio: f64) -> f64 {
    log_odds_ratio * 3.0_f64.sqrt() / PI
}

/// Cohen's U3 from d: the proportion of cases above the control median, Φ(d).
pub fn d_to_cohens_u3(d: f64) -> f64 {
    phi(d)
}

/// Cohen's d from U3: Φ⁻¹(U3) for U3 strictly inside (0, 1).
pub fn cohens_u3_to_d(u3: f64) -> Result<f64, DomainError> {
    if !(u3 > 0.0 && u3 < 1.0) {
        return Err(DomainError::CohensU3(u3));
    }
    Ok(phi_inv(u3))
}

/// Point-biserial correlation from d at a given prevalence:
/// `d / sqrt(d^2 + 1/(p * (1 - p)))`.
pub fn d_to_point_biserial_r(d: f64, base_rate: f64) -> Result<f64, DomainError> {
    check_base_rate(base_rate)?;
    Ok(d / (d * d + 1.0 / (base_rate * (1.0 - base_rate))).sqrt())
}

/// Cohen's d from Pearson's r: `2r / sqrt(1 - r^2)`.
///
/// Saturates to signed infinity at |r| >= 1 rather than erroring, so the
/// caller can propagate the boundary case.
pub fn r_to_d(r: f64) -> f64 {
    if r.abs() >= 1.0 {
        return r.signum() * f64::INFINITY;
    }
    2.0 * r / (1.0 - r * r).sqrt()
}

/// Cohen's d from ROC-AUC: `Φ⁻¹(AUC) * sqrt(2)`.
///
/// AUC at or below 0.5 maps to d = 0; AUC at or above 1 maps to +infinity.
pub fn auc_to_d(auc: f64) -> f64 {
    if auc <= 0.5 {
        return 0.0;
    }
    if auc >= 1.0 {
        return f64::INFINITY;
    }
    phi_inv(auc) * 2.0_f64.sqrt()
}

/// The effect-size representations the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSizeKind {
    D,
    Auc,
    OddsRatio,
    LogOddsRatio,
    U3,
    R,
}

/// Result of a d-mediated effect-size conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSizeConversion {
    pub input_value: f64,
    pub input_kind: EffectSizeKind,
    pub output_value: f64,
    pub output_kind: EffectSizeKind,
    pub cohens_d: f64,
}

/// Convert between any two effect-size representations by routing through
/// Cohen's d. `base_rate` is only consulted for the point-biserial target.
pub fn convert_effect_size(
    value: f64,
    from: EffectSizeKind,
    to: EffectSizeKind,
    base_rate: f64,
) -> Result<EffectSizeConversion, DomainError> {
    let d = match from {
        EffectSizeKind::D => value,
        EffectSizeKind::Auc => auc_to_d(value),
        EffectSizeKind::OddsRatio => odds_ratio_to_d(value)?,
        EffectSizeKind::LogOddsRatio => log_odds_ratio_to_d(value),
        EffectSizeKind::U3 => cohens_u3_to_d(value)?,
        EffectSizeKind::R => r_to_d(value),
    };

    let output_value = match to {
        EffectSizeKind::D => d,
        EffectSizeKind::Auc => roc_auc_parametric(d, 1.0, 1.0),
        EffectSizeKind::OddsRatio => d_to_odds_ratio(d),
        EffectSizeKind::LogOddsRatio => d_to_log_odds_ratio(d),
        EffectSizeKind::U3 => d_to_cohens_u3(d),
        EffectSizeKind::R => d_to_point_biserial_r(d, base_rate)?,
    };

    Ok(EffectSizeConversion {
        input_value: value,
        input_kind: from,
        output_value,
        output_kind: to,
        cohens_d: d,
    })
}
