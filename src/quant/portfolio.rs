//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Maximum Sharpe-ratio optimization and efficient-frontier sweeps under
//! sum and box constraints.

mod constraints;
pub mod data;
pub mod engine;
pub mod frontier;
pub mod optimizers;
pub mod types;

pub use data::correlation_matrix;
pub use data::covariance_matrix;
pub use data::portfolio_variance;
pub use engine::OptimizerConfig;
pub use engine::PortfolioOptimizer;
pub use frontier::linspace;
pub use frontier::FrontierSweep;
pub use optimizers::maximize_sharpe;
pub use optimizers::minimize_variance_at;
pub use types::EfficientFrontier;
pub use types::FrontierPoint;
pub use types::PortfolioResult;
pub use types::WeightBounds;
