//! Command-line front end: optimal weights, frontier and risk of a price table.

use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Parser;
use commodity_risk::quant::portfolio::linspace;
use commodity_risk::quant::portfolio::WeightBounds;
use commodity_risk::quant::simulation::fetch_asset_values;
use commodity_risk::quant::simulation::FixedValue;
use commodity_risk::quant::simulation::MarketValueSource;
use commodity_risk::stats::ReturnSeries;
use commodity_risk::CorrelatedReturnSimulator;
use commodity_risk::OptimizerConfig;
use commodity_risk::PortfolioOptimizer;
use commodity_risk::ReturnStatistics;
use commodity_risk::RiskEstimator;
use commodity_risk::SimulationConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "commodity-risk")]
#[command(
  about = "Max-Sharpe weights, efficient frontier and VaR/ES from a price history",
  long_about = None
)]
#[command(version)]
struct Cli {
  /// CSV file: timestamp column followed by one price column per asset
  #[arg(long)]
  prices: PathBuf,

  /// Confidence level of the risk measures
  #[arg(long, default_value_t = 0.95)]
  confidence: f64,

  /// Per-period risk-free rate used in the Sharpe ratio
  #[arg(long, default_value_t = 0.0)]
  risk_free: f64,

  /// Number of target returns on the efficient frontier
  #[arg(long, default_value_t = 20)]
  frontier_points: usize,

  #[arg(long, default_value_t = 0.0)]
  min_weight: f64,

  #[arg(long, default_value_t = 1.0)]
  max_weight: f64,

  /// Iteration cap of every optimizer solve
  #[arg(long, default_value_t = 5000)]
  max_iters: u64,

  /// Also run a Monte-Carlo simulation with this many paths
  #[arg(long)]
  simulations: Option<usize>,

  /// Seed of the Monte-Carlo run; fresh entropy when omitted
  #[arg(long)]
  seed: Option<u64>,

  /// Confidence level of the simulated ES and CVaR
  #[arg(long, default_value_t = 0.975)]
  tail_confidence: f64,
}

/// Asset names and one price column per asset.
#[derive(Debug, PartialEq)]
struct PriceTable {
  assets: Vec<String>,
  prices: Vec<Vec<f64>>,
}

fn read_price_table(path: &Path) -> anyhow::Result<PriceTable> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .trim(csv::Trim::All)
    .from_path(path)
    .with_context(|| format!("opening {}", path.display()))?;

  let headers = reader.headers().context("reading CSV header")?.clone();
  if headers.len() < 2 {
    bail!("expected a timestamp column and at least one price column");
  }
  let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
  let mut prices = vec![Vec::new(); assets.len()];

  for (row, record) in reader.records().enumerate() {
    let record = record.with_context(|| format!("reading row {}", row + 1))?;
    for (asset, column) in prices.iter_mut().enumerate() {
      let field = record.get(asset + 1).unwrap_or("");
      let price: f64 = field.parse().with_context(|| {
        format!("row {}, column {}: bad price {field:?}", row + 1, assets[asset])
      })?;
      column.push(price);
    }
  }

  Ok(PriceTable { assets, prices })
}

fn run(cli: &Cli) -> anyhow::Result<()> {
  let table = read_price_table(&cli.prices)?;
  tracing::info!(
    assets = table.assets.len(),
    rows = table.prices.first().map_or(0, Vec::len),
    "loaded price history"
  );

  let stats =
    ReturnStatistics::from_prices(&table.prices).context("computing return statistics")?;
  let vols = stats.volatilities();
  println!("asset statistics (per period)");
  for (i, name) in table.assets.iter().enumerate() {
    println!("  {name:<16} mean {:>10.6}  vol {:>10.6}", stats.mean[i], vols[i]);
  }

  let optimizer = PortfolioOptimizer::new(OptimizerConfig {
    bounds: WeightBounds::Uniform(cli.min_weight, cli.max_weight),
    risk_free: cli.risk_free,
    max_iters: cli.max_iters,
    ..OptimizerConfig::default()
  });
  let best = optimizer.max_sharpe(&stats).context("maximizing Sharpe ratio")?;

  println!("\nmax-Sharpe portfolio ({} iterations)", best.iterations);
  for (name, w) in table.assets.iter().zip(best.weights.iter()) {
    println!("  {name:<16} {w:>8.4}");
  }
  println!(
    "  return {:.6}  volatility {:.6}  sharpe {:.4}",
    best.expected_return, best.volatility, best.sharpe
  );

  let lo = stats.mean.iter().copied().fold(f64::INFINITY, f64::min);
  let hi = stats.mean.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  let targets = linspace(lo, hi, cli.frontier_points);
  let frontier = optimizer.frontier_par(&stats.mean, &stats.covariance, &targets);

  println!(
    "\nefficient frontier ({} solved, {} skipped)",
    frontier.points.len(),
    frontier.failures.len()
  );
  for point in &frontier.points {
    println!(
      "  target {:>10.6}  volatility {:>10.6}",
      point.target_return, point.volatility
    );
  }

  let series = table
    .prices
    .iter()
    .enumerate()
    .map(|(asset, prices)| ReturnSeries::from_asset_prices(asset, prices))
    .collect::<Result<Vec<_>, _>>()
    .context("computing asset returns")?;
  let periods = series.first().map_or(0, ReturnSeries::len);
  let portfolio: Vec<f64> = (0..periods)
    .map(|t| {
      series
        .iter()
        .zip(best.weights.iter())
        .map(|(s, w)| w * s.as_slice()[t])
        .sum()
    })
    .collect();

  let report = RiskEstimator::new(cli.confidence)
    .and_then(|estimator| estimator.report(&portfolio))
    .context("estimating portfolio risk")?;
  println!("\nrisk of the max-Sharpe portfolio");
  for estimate in report.estimates() {
    println!("  {estimate}");
  }

  if let Some(paths) = cli.simulations {
    simulate_book(cli, &table, &stats, paths)?;
  }

  Ok(())
}

/// Monte-Carlo VaR/ES of one unit of each asset at its last observed price.
fn simulate_book(
  cli: &Cli,
  table: &PriceTable,
  stats: &ReturnStatistics,
  paths: usize,
) -> anyhow::Result<()> {
  let quotes: Vec<FixedValue> = table
    .prices
    .iter()
    .map(|column| FixedValue(column.last().copied().unwrap_or(f64::NAN)))
    .collect();
  let sources: Vec<&dyn MarketValueSource> = quotes
    .iter()
    .map(|quote| quote as &dyn MarketValueSource)
    .collect();
  let asset_values = fetch_asset_values(&sources).context("reading current asset values")?;

  let mut config = SimulationConfig::new(
    asset_values,
    stats.volatilities(),
    stats.correlation.clone(),
    paths,
  );
  if let Some(seed) = cli.seed {
    config = config.with_seed(seed);
  }

  let samples = CorrelatedReturnSimulator::new(config)
    .context("building return simulator")?
    .simulate();
  let report = RiskEstimator::new(cli.confidence)
    .and_then(|estimator| estimator.report_with_tail(&samples, cli.tail_confidence))
    .context("estimating simulated risk")?;

  println!("\nsimulated portfolio P&L ({paths} paths)");
  for estimate in report.estimates() {
    println!("  {estimate}");
  }
  Ok(())
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  run(&cli)
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::*;

  fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn reads_timestamp_and_price_columns() {
    let file = csv_file("date,brent,ttf\n2024-01-01, 80.0, 30.0\n2024-01-02,81.5,29.4\n");
    let table = read_price_table(file.path()).unwrap();
    assert_eq!(table.assets, vec!["brent", "ttf"]);
    assert_eq!(table.prices, vec![vec![80.0, 81.5], vec![30.0, 29.4]]);
  }

  #[test]
  fn rejects_non_numeric_price() {
    let file = csv_file("date,brent\n2024-01-01,n/a\n");
    let err = read_price_table(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("bad price"));
  }

  #[test]
  fn rejects_table_without_prices() {
    let file = csv_file("date\n2024-01-01\n");
    assert!(read_price_table(file.path()).is_err());
  }

  #[test]
  fn full_run_succeeds_on_small_history() {
    let file = csv_file(
      "date,brent,ttf,coal\n\
       d1,100.0,50.0,20.0\n\
       d2,101.0,50.2,19.5\n\
       d3,103.0,50.1,20.4\n\
       d4,102.0,50.6,20.1\n\
       d5,105.0,50.9,21.0\n\
       d6,107.0,50.7,20.6\n\
       d7,106.0,51.2,21.3\n\
       d8,109.0,51.4,21.1\n",
    );
    let cli = Cli::parse_from([
      "commodity-risk",
      "--prices",
      file.path().to_str().unwrap(),
      "--frontier-points",
      "5",
    ]);
    run(&cli).unwrap();
  }

  #[test]
  fn seeded_simulation_mode_runs() {
    let file = csv_file(
      "date,brent,ttf\n\
       d1,100.0,50.0\n\
       d2,101.0,50.8\n\
       d3,103.0,50.1\n\
       d4,102.0,51.6\n\
       d5,105.0,50.9\n\
       d6,104.0,52.0\n",
    );
    let cli = Cli::parse_from([
      "commodity-risk",
      "--prices",
      file.path().to_str().unwrap(),
      "--frontier-points",
      "3",
      "--simulations",
      "1000",
      "--seed",
      "7",
    ]);
    assert_eq!(cli.simulations, Some(1000));
    assert_eq!(cli.tail_confidence, 0.975);
    run(&cli).unwrap();
  }

  #[test]
  fn simulation_rejects_bad_tail_confidence() {
    let file = csv_file(
      "date,brent,ttf\n\
       d1,100.0,50.0\n\
       d2,101.0,50.8\n\
       d3,103.0,50.1\n\
       d4,102.0,51.6\n\
       d5,105.0,50.9\n\
       d6,104.0,52.0\n",
    );
    let cli = Cli::parse_from([
      "commodity-risk",
      "--prices",
      file.path().to_str().unwrap(),
      "--frontier-points",
      "3",
      "--simulations",
      "100",
      "--tail-confidence",
      "1.5",
    ]);
    let err = run(&cli).unwrap_err();
    assert!(format!("{err:#}").contains("estimating simulated risk"));
  }

  #[test]
  fn single_asset_history_fails() {
    let file = csv_file("date,brent\nd1,100.0\nd2,101.0\nd3,99.0\n");
    let cli = Cli::parse_from(["commodity-risk", "--prices", file.path().to_str().unwrap()]);
    assert!(run(&cli).is_err());
  }
}
