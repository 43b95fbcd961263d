//! # Quant
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}}
//! \frac{\mathbf{w}^\top\mu}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}},\qquad
//! \mathrm{VaR}_\alpha,\ \mathrm{ES}_\alpha \text{ of simulated } R_p
//! $$
//!
//! Two independent pipelines: return statistics feed the portfolio optimizer,
//! and the correlated return simulator feeds the risk estimator.

pub mod portfolio;
pub mod risk;
pub mod simulation;
