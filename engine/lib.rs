//! prognos: translate effect sizes into expected real-world classification
//! performance.
//!
//! The engine maps an effect size (Cohen's d or a correlation) plus
//! reliability parameters to a full battery of discrimination and
//! threshold-dependent classification metrics, either analytically from
//! idealized Gaussian populations or empirically from raw samples with
//! bootstrap confidence intervals. A deterministic reliability transform
//! simulates de-attenuated (or further attenuated) data.

#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

pub mod continuous;
pub mod convert;
pub mod discrimination;
pub mod dist;
pub mod empirical;
pub mod error;
pub mod kde;
pub mod metrics;
pub mod parametric;
pub mod reliability;
pub mod stats;
pub mod threshold;
pub mod types;
