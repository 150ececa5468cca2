use thiserror::Error;

/// A parameter outside its mathematically valid range.
///
/// These are raised at the API boundary before any computation runs; values
/// are never silently clamped into range. Internal numeric degeneracies
/// (zero denominators, vanishing densities) are *not* errors — they resolve
/// to the sentinel values documented on the metric engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("base_rate must be strictly between 0 and 1, got {0}")]
    BaseRate(f64),

    #[error("threshold_prob must be strictly between 0 and 1, got {0}")]
    ThresholdProb(f64),

    #[error("ICC must be in (0, 1], got {0}")]
    Icc(f64),

    #[error("reliability must be in (0, 1], got {0}")]
    Reliability(f64),

    #[error("kappa must be in (0, 1], got {0}")]
    Kappa(f64),

    #[error("sin(pi/2 * kappa_current) must be > 0, got kappa_current = {0}")]
    DegenerateKappa(f64),

    #[error("ci_level must be strictly between 0 and 1, got {0}")]
    CiLevel(f64),

    #[error("odds ratio must be > 0, got {0}")]
    OddsRatio(f64),

    #[error("Cohen's U3 must be strictly between 0 and 1, got {0}")]
    CohensU3(f64),

    #[error("Pearson's r must be strictly between -1 and 1, got {0}")]
    PearsonR(f64),
}

/// A structural problem with caller-supplied data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{0} must contain at least one observation")]
    EmptyGroup(&'static str),

    #[error("x and y must have the same length, got {x_len} and {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("{0} must contain only finite values")]
    NonFinite(&'static str),

    #[error("dichotomizing the outcome produced an empty {0} group")]
    DegenerateSplit(&'static str),
}

/// Top-level error type for the public entry points.
///
/// The two tiers are kept distinct on purpose: `Domain` means a parameter is
/// outside its mathematical range, `Input` means the data itself is unusable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Input(#[from] InputError),
}

pub(crate) fn check_base_rate(base_rate: f64) -> Result<(), DomainError> {
    if !(base_rate > 0.0 && base_rate < 1.0) {
        return Err(DomainError::BaseRate(base_rate));
    }
    Ok(())
}

pub(crate) fn check_threshold_prob(threshold_prob: f64) -> Result<(), DomainError> {
    if !(threshold_prob > 0.0 && threshold_prob < 1.0) {
        return Err(DomainError::ThresholdProb(threshold_prob));
    }
    Ok(())
}

pub(crate) fn check_unit_half_open(value: f64, make: fn(f64) -> DomainError) -> Result<(), DomainError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(make(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_rate_bounds_are_exclusive() {
        assert!(check_base_rate(0.0).is_err());
        assert!(check_base_rate(1.0).is_err());
        assert!(check_base_rate(f64::NAN).is_err());
        assert!(check_base_rate(0.5).is_ok());
    }

    #[test]
    fn unit_half_open_accepts_one() {
        assert!(check_unit_half_open(1.0, DomainError::Icc).is_ok());
        assert!(check_unit_half_open(0.0, DomainError::Icc).is_err());
        assert!(check_unit_half_open(1.1, DomainError::Kappa).is_err());
    }
}
