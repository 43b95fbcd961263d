//! # Simulation
//!
//! $$
//! \mathbf{r} = \mu T + \sqrt{T}\,L\mathbf{z},\qquad \mathbf{z}\sim\mathcal N(0, I)
//! $$
//!
//! Monte-Carlo simulation of correlated asset log-returns and the resulting
//! portfolio return distribution.

pub mod config;
pub mod correlated;
pub mod source;

pub use config::SimulationConfig;
pub use correlated::CorrelatedReturnSimulator;
pub use source::fetch_asset_values;
pub use source::FixedValue;
pub use source::MarketValueSource;
