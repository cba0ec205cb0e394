//! CLI definition and dispatch.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_strategy_adapter::JsonStrategyAdapter;
use crate::adapters::progress_adapter::ChannelProgress;
use crate::domain::backtest::{run_backtest, BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use crate::domain::candle::Candle;
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_optimizer_config, validate_overlay_config,
};
use crate::domain::error::RulesimError;
use crate::domain::metrics::Metrics;
use crate::domain::optimizer::{
    spawn_optimizer, OptimizerConfig, DEFAULT_CHUNK_SIZE, DEFAULT_DURATION, DEFAULT_REPORT_EVERY,
};
use crate::domain::overlay::{
    chart_overlays, BollingerSettings, OverlaySettings, DEFAULT_BOLLINGER, DEFAULT_EMA_PERIOD,
    DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIOD,
};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::strategy_port::StrategyPort;

#[derive(Parser, Debug)]
#[command(name = "rulesim", about = "Rule-based strategy backtester and optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        strategy: PathBuf,
        /// Candle CSV; overrides [backtest] data_path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Directory for trades.csv, equity.csv and overlays.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Search for a more profitable strategy
    Optimize {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Baseline strategy
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        duration_ms: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
        /// Where to save the best strategy as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a strategy file
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn dispatch(command: Command) -> Result<(), RulesimError> {
    match command {
        Command::Backtest {
            config,
            strategy,
            data,
            output,
        } => run_backtest_command(
            config.as_deref(),
            &strategy,
            data.as_deref(),
            output.as_deref(),
        ),
        Command::Optimize {
            config,
            strategy,
            data,
            duration_ms,
            seed,
            output,
        } => run_optimize_command(
            config.as_deref(),
            &strategy,
            data.as_deref(),
            duration_ms,
            seed,
            output.as_deref(),
        ),
        Command::Validate { strategy } => run_validate(&strategy),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, RulesimError> {
    match path {
        Some(p) => FileConfigAdapter::from_file(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn optional_date(adapter: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, RulesimError> {
    adapter
        .get_string("backtest", key)
        .map(|s| parse_date(&s, "backtest", key))
        .transpose()
}

fn optional_usize(adapter: &dyn ConfigPort, section: &str, key: &str) -> Option<usize> {
    let value = adapter.get_int(section, key, 0);
    (value > 0).then_some(value as usize)
}

/// Build a [`BacktestConfig`] from the `[backtest]` section. Expects
/// validated input.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        max_trades: optional_usize(adapter, "backtest", "max_trades"),
    }
}

/// Build an [`OptimizerConfig`] from `[optimizer]`, falling back to
/// `[backtest] initial_capital`. `duration_override` wins over the file.
pub fn build_optimizer_config(
    adapter: &dyn ConfigPort,
    duration_override: Option<u64>,
) -> OptimizerConfig {
    let backtest_capital =
        adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    let duration = match duration_override {
        Some(ms) => Duration::from_millis(ms),
        None => optional_usize(adapter, "optimizer", "duration_ms")
            .map_or(DEFAULT_DURATION, |ms| Duration::from_millis(ms as u64)),
    };

    OptimizerConfig {
        duration,
        initial_capital: adapter.get_double("optimizer", "initial_capital", backtest_capital),
        chunk_size: optional_usize(adapter, "optimizer", "chunk_size").unwrap_or(DEFAULT_CHUNK_SIZE),
        report_every: optional_usize(adapter, "optimizer", "report_every")
            .unwrap_or(DEFAULT_REPORT_EVERY),
        parallel: adapter.get_bool("optimizer", "parallel", true),
    }
}

/// Build [`OverlaySettings`] from `[overlays]`: `show` lists the visible
/// indicators; periods fall back to the chart defaults.
pub fn build_overlay_settings(adapter: &dyn ConfigPort) -> OverlaySettings {
    let show: Vec<String> = adapter
        .get_string("overlays", "show")
        .map(|s| {
            s.split(',')
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let visible = |name: &str| show.iter().any(|n| n == name);
    let period = |key: &str, default: usize| optional_usize(adapter, "overlays", key).unwrap_or(default);

    OverlaySettings {
        sma: visible("sma").then(|| period("sma_period", DEFAULT_SMA_PERIOD)),
        ema: visible("ema").then(|| period("ema_period", DEFAULT_EMA_PERIOD)),
        rsi: visible("rsi").then(|| period("rsi_period", DEFAULT_RSI_PERIOD)),
        bollinger: visible("bollinger").then(|| BollingerSettings {
            period: period("bollinger_period", DEFAULT_BOLLINGER.period),
            multiplier: adapter.get_double(
                "overlays",
                "bollinger_multiplier",
                DEFAULT_BOLLINGER.multiplier,
            ),
        }),
    }
}

/// Seed from the CLI, then `[optimizer] seed`, else from OS entropy.
pub fn build_rng(adapter: &dyn ConfigPort, seed_override: Option<u64>) -> StdRng {
    let seed = seed_override.or_else(|| {
        adapter
            .get_string("optimizer", "seed")
            .and_then(|s| s.trim().parse().ok())
    });
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Load candles from `--data` or `[backtest] data_path`, restricted to the
/// configured date range.
pub fn load_candles(
    adapter: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<Vec<Candle>, RulesimError> {
    let path = match data_override {
        Some(p) => p.to_path_buf(),
        None => adapter
            .get_string("backtest", "data_path")
            .map(PathBuf::from)
            .ok_or_else(|| RulesimError::ConfigMissing {
                section: "backtest".into(),
                key: "data_path".into(),
            })?,
    };
    let start = optional_date(adapter, "start_date")?;
    let end = optional_date(adapter, "end_date")?;

    CsvAdapter::new(path).fetch_candles(start, end)
}

fn print_metrics(metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return);
    eprintln!("Net Profit:       ${:.2}", metrics.net_profit);
    eprintln!("Final Equity:     ${:.2}", metrics.final_equity);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Closed Trades:    {}", metrics.closed_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate);
}

fn print_rules(strategy: &Strategy) {
    for rule in &strategy.rules {
        eprintln!("  [{}] {}", rule.id, rule);
    }
}

fn run_backtest_command(
    config_path: Option<&Path>,
    strategy_path: &Path,
    data_path: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<(), RulesimError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    validate_overlay_config(&adapter)?;

    let bt_config = build_backtest_config(&adapter);
    let strategy = JsonStrategyAdapter.load_strategy(strategy_path)?;
    let candles = load_candles(&adapter, data_path)?;

    if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
        eprintln!(
            "Running backtest: {} ({} rules), {} bars, {} to {}",
            strategy.name,
            strategy.rules.len(),
            candles.len(),
            first.date,
            last.date
        );
    }

    let result = run_backtest(&strategy, &candles, &bt_config)?;
    print_metrics(&result.metrics);

    if let Some(dir) = output_dir {
        let overlays = chart_overlays(&build_overlay_settings(&adapter), &candles);
        CsvReportAdapter.write(&result, &overlays, dir)?;
        eprintln!("\nReport written to: {}", dir.display());
    }

    Ok(())
}

fn run_optimize_command(
    config_path: Option<&Path>,
    strategy_path: &Path,
    data_path: Option<&Path>,
    duration_ms: Option<u64>,
    seed: Option<u64>,
    output_path: Option<&Path>,
) -> Result<(), RulesimError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    validate_optimizer_config(&adapter)?;
    if duration_ms == Some(0) {
        return Err(RulesimError::ConfigInvalid {
            section: "optimizer".into(),
            key: "duration_ms".into(),
            reason: "duration_ms must be a positive integer".into(),
        });
    }

    let opt_config = build_optimizer_config(&adapter, duration_ms);
    let rng = build_rng(&adapter, seed);
    let baseline = JsonStrategyAdapter.load_strategy(strategy_path)?;
    let candles = load_candles(&adapter, data_path)?;
    if candles.is_empty() {
        return Err(RulesimError::NoData {
            context: "no candles in the configured date range".into(),
        });
    }

    eprintln!(
        "Optimizing against '{}' for {} ms over {} bars",
        baseline.name,
        opt_config.duration.as_millis(),
        candles.len()
    );

    let (progress, messages) = ChannelProgress::new();
    let handle = spawn_optimizer(baseline, candles, opt_config, rng, progress);
    for message in messages {
        eprintln!("  {}", message);
    }
    let outcome = handle
        .join()
        .map_err(|_| RulesimError::Io(std::io::Error::other("optimizer thread panicked")))?;

    eprintln!("\nBaseline Net Profit: ${:.2}", outcome.baseline_net_profit);
    eprintln!("Best Net Profit:     ${:.2}", outcome.net_profit);
    if outcome.improved() {
        eprintln!("Best strategy ({}):", outcome.strategy.id);
    } else {
        eprintln!("No candidate beat the baseline; keeping it:");
    }
    print_rules(&outcome.strategy);

    if let Some(path) = output_path {
        JsonStrategyAdapter.save_strategy(&outcome.strategy, path)?;
        eprintln!("\nStrategy written to: {}", path.display());
    }

    Ok(())
}

fn run_validate(strategy_path: &Path) -> Result<(), RulesimError> {
    eprintln!("Validating strategy: {}", strategy_path.display());
    let strategy = JsonStrategyAdapter.load_strategy(strategy_path)?;
    if strategy.rules.is_empty() {
        return Err(RulesimError::EmptyStrategy {
            strategy: strategy.name,
        });
    }

    eprintln!("\n{} ({} rules):", strategy.name, strategy.rules.len());
    print_rules(&strategy);
    let indicators: Vec<String> = strategy.indicators().iter().map(|i| i.to_string()).collect();
    eprintln!("Indicators: {}", indicators.join(", "));
    eprintln!("\nStrategy is valid.");
    Ok(())
}
