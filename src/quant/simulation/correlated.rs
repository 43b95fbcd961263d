//! # Correlated Return Simulator
//!
//! $$
//! \mathbf{r} = \big(\ln V_0 - \tfrac12\operatorname{diag}(\Sigma_V)^2\big)T
//! + \sqrt{T}\,L\mathbf{z},
//! \quad LL^\top = C\,\Sigma_V\,C,\quad \mathbf{z}\sim\mathcal N(0, I)
//! $$
//!
//! $$
//! R_p = P \sum_i \big(e^{r_i} - 1\big)
//! $$
//!
//! Standard normals are drawn sequentially from one generator so a seeded run
//! is reproducible; the per-path transform and aggregation run on rayon.

use nalgebra::DMatrix;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use tracing::info;

use super::config::SimulationConfig;
use crate::error::Result;
use crate::error::RiskError;

fn to_dmatrix(m: &[Vec<f64>]) -> DMatrix<f64> {
  let n = m.len();
  DMatrix::from_fn(n, n, |i, j| m[i][j])
}

/// Monte-Carlo generator of correlated log-returns and portfolio P&L.
#[derive(Clone, Debug)]
pub struct CorrelatedReturnSimulator {
  config: SimulationConfig,
  drift: DVector<f64>,
  factor: DMatrix<f64>,
}

impl CorrelatedReturnSimulator {
  /// Validate `config` and factor its joint matrix `C Σ_V C`.
  pub fn new(config: SimulationConfig) -> Result<Self> {
    config.validate()?;

    let corr = to_dmatrix(&config.correlation);
    let vol = to_dmatrix(&config.volatility);
    let joint = &corr * &vol * &corr;
    let chol = joint.cholesky().ok_or(RiskError::NonPositiveDefinite)?;

    let t = config.time_horizon;
    let sigmas = config.volatilities();
    let drift = DVector::from_iterator(
      config.n_assets(),
      config
        .asset_values
        .iter()
        .zip(sigmas.iter())
        .map(|(v, s)| (v.ln() - 0.5 * s * s) * t),
    );
    let factor = chol.l() * t.sqrt();

    Ok(Self {
      config,
      drift,
      factor,
    })
  }

  pub fn config(&self) -> &SimulationConfig {
    &self.config
  }

  /// Lower-triangular factor applied to the standard normal draws.
  pub fn factor(&self) -> &DMatrix<f64> {
    &self.factor
  }

  fn rng(&self) -> StdRng {
    match self.config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_os_rng(),
    }
  }

  /// Per-path, per-asset log-returns using the configured seed.
  pub fn simulate_log_returns(&self) -> Vec<Vec<f64>> {
    let mut rng = self.rng();
    self.simulate_log_returns_with(&mut rng)
  }

  /// Per-path, per-asset log-returns drawn from `rng`.
  pub fn simulate_log_returns_with<R: Rng>(&self, rng: &mut R) -> Vec<Vec<f64>> {
    let n = self.config.n_assets();
    let paths = self.config.num_simulations;

    let shocks: Vec<DVector<f64>> = (0..paths)
      .map(|_| DVector::from_fn(n, |_, _| rng.sample::<f64, _>(StandardNormal)))
      .collect();

    shocks
      .into_par_iter()
      .map(|z| {
        let r = &self.drift + &self.factor * z;
        r.iter().copied().collect()
      })
      .collect()
  }

  /// Portfolio return per path using the configured seed.
  pub fn simulate(&self) -> Vec<f64> {
    let mut rng = self.rng();
    self.simulate_with(&mut rng)
  }

  /// Portfolio return per path drawn from `rng`.
  pub fn simulate_with<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
    info!(
      paths = self.config.num_simulations,
      assets = self.config.n_assets(),
      seeded = self.config.seed.is_some(),
      "simulating correlated returns"
    );

    let value = self.config.portfolio_value();
    self
      .simulate_log_returns_with(rng)
      .into_par_iter()
      .map(|path| value * path.iter().map(|r| r.exp() - 1.0).sum::<f64>())
      .collect()
  }
}
