//! # Stats
//!
//! $$
//! r_t=\frac{P_t}{P_{t-1}}-1,\qquad \hat\Sigma=\frac{1}{T-1}\sum_t (r_t-\bar r)(r_t-\bar r)^\top
//! $$
//!
//! Slice statistics and asset return moments.

pub mod descriptive;
pub mod returns;

pub use descriptive::mean;
pub use descriptive::percentile;
pub use descriptive::population_std;
pub use descriptive::sample_covariance;
pub use returns::ReturnSeries;
pub use returns::ReturnStatistics;
