//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_result_adapter::CsvResultAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, run_all};
use crate::domain::config_validation::{validate_backtest_config, validate_threshold_config};
use crate::domain::description::{RowDescriptions, describe_row};
use crate::domain::error::SigtraderError;
use crate::domain::indicator_row::{IndicatorRow, compute_indicators};
use crate::domain::metrics::BacktestResult;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pipeline::{analyse_bars, load_instrument_rows};
use crate::domain::summary::{BacktestSummary, SignalSummary};
use crate::domain::thresholds::ThresholdTable;
use crate::ports::data_port::DataPort;
use crate::ports::result_port::ResultPort;

/// Environment variable holding a tracing filter; overrides `--log-level`.
pub const LOG_ENV: &str = "SIGTRADER_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "sigtrader",
    about = "Technical indicators, graded strategy signals and signal backtests"
)]
pub struct Cli {
    /// Tracing filter used when SIGTRADER_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicator rows and their descriptions for one ticker
    Indicators {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Classify every strategy's signal for one ticker
    Signals {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        ticker: String,
        /// INI file with [thresholds.*] overrides
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Replay the configured strategies over the configured tickers
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Indicators { data, ticker, out } => run_indicators(&data, &ticker, &out),
        Command::Signals {
            data,
            ticker,
            config,
            out,
        } => run_signals(&data, &ticker, config.as_deref(), &out),
        Command::Backtest { config, data, out } => run_backtest(&config, &data, &out),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Install the fmt subscriber on stderr. A second call is a no-op.
pub fn init_tracing(log_level: &str) {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report(err: SigtraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(report)
}

fn open_output(out: &Path) -> Result<CsvResultAdapter, ExitCode> {
    CsvResultAdapter::new(out.to_path_buf()).map_err(report)
}

/// Bars for one ticker; an empty file counts as no data.
fn load_bars(data: &Path, ticker: &str) -> Result<Vec<OhlcvBar>, ExitCode> {
    let ticker = ticker.trim().to_uppercase();
    let bars = CsvAdapter::new(data.to_path_buf())
        .get_bars(&ticker)
        .map_err(report)?;
    if bars.is_empty() {
        return Err(report(SigtraderError::NoData { instrument: ticker }));
    }
    Ok(bars)
}

fn run_indicators(data: &Path, ticker: &str, out: &Path) -> ExitCode {
    let bars = match load_bars(data, ticker) {
        Ok(b) => b,
        Err(code) => return code,
    };
    let sink = match open_output(out) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let rows: Vec<IndicatorRow> = compute_indicators(&bars);
    let descriptions: Vec<RowDescriptions> = rows.iter().map(describe_row).collect();
    let ticker = ticker.trim().to_uppercase();

    if let Err(e) = sink
        .write_indicators(&ticker, &rows)
        .and_then(|()| sink.write_descriptions(&ticker, &rows, &descriptions))
    {
        return report(e);
    }

    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        eprintln!(
            "{}: {} rows, {} to {}",
            ticker,
            rows.len(),
            first.date,
            last.date
        );
    }
    if let Some(latest) = descriptions.last() {
        eprintln!("Latest: {}", latest.summary());
    }
    eprintln!("Results written to: {}", sink.out_dir().display());
    ExitCode::SUCCESS
}

fn run_signals(data: &Path, ticker: &str, config: Option<&Path>, out: &Path) -> ExitCode {
    let thresholds = match config {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            if let Err(e) = validate_threshold_config(&adapter) {
                return report(e);
            }
            match ThresholdTable::from_config(&adapter) {
                Ok(t) => t,
                Err(e) => return report(e),
            }
        }
        None => ThresholdTable::default(),
    };

    let bars = match load_bars(data, ticker) {
        Ok(b) => b,
        Err(code) => return code,
    };
    let sink = match open_output(out) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let rows = analyse_bars(&bars, &thresholds);
    let summary = SignalSummary::from_rows(&rows);
    let ticker = ticker.trim().to_uppercase();

    if let Err(e) = sink
        .write_signals(&ticker, &rows)
        .and_then(|()| sink.write_signal_summary(&ticker, &summary))
    {
        return report(e);
    }

    if let Some(latest) = rows.last() {
        eprintln!("\n=== Latest Signals ({}) ===", latest.indicators.date);
        for (id, signal) in latest.signals.iter() {
            eprintln!("  {:<24} {}", id.name(), signal);
        }
    }
    eprintln!("\nResults written to: {}", sink.out_dir().display());
    ExitCode::SUCCESS
}

fn run_backtest(config_path: &Path, data: &Path, out: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match BacktestConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    if let Err(e) = validate_threshold_config(&adapter) {
        return report(e);
    }
    let thresholds = match ThresholdTable::from_config(&adapter) {
        Ok(t) => t,
        Err(e) => return report(e),
    };

    let data_port = CsvAdapter::new(data.to_path_buf());
    let instruments = match load_instrument_rows(&data_port, &bt_config.instruments, &thresholds)
    {
        Ok(rows) => rows,
        Err(e) => return report(e),
    };
    let sink = match open_output(out) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!(
        "Running backtest: {} strategies, {} tickers, {} to {}",
        bt_config.strategies.len(),
        instruments.len(),
        bt_config.start_date,
        bt_config.end_date,
    );

    let runs = run_all(&instruments, &bt_config);
    for run in &runs {
        if let Err(e) = sink.write_run(run) {
            return report(e);
        }
    }

    let results: Vec<BacktestResult> = runs.into_iter().map(|r| r.result).collect();
    let summary = BacktestSummary::from_results(&results);
    if let Err(e) = sink
        .write_results(&results)
        .and_then(|()| sink.write_backtest_summary(&summary))
    {
        return report(e);
    }

    print_results(&results, &summary);
    eprintln!("\nResults written to: {}", sink.out_dir().display());
    ExitCode::SUCCESS
}

fn print_results(results: &[BacktestResult], summary: &BacktestSummary) {
    eprintln!("\n=== Strategy Results ===");
    for r in results {
        eprintln!(
            "  {:<24} {:>8.2}%  {:>4} trades  {:>6.1}% win  max dd {:.2}%",
            r.strategy.name(),
            r.total_return,
            r.total_trades,
            r.win_rate,
            r.max_drawdown,
        );
    }

    eprintln!("\n=== Summary ===");
    if let (Some((best, best_return)), Some((worst, worst_return))) = (summary.best, summary.worst)
    {
        eprintln!("Best:         {} ({:.2}%)", best, best_return);
        eprintln!("Worst:        {} ({:.2}%)", worst, worst_return);
    }
    eprintln!("Avg Return:   {:.2}%", summary.avg_return);
    eprintln!("Avg Win Rate: {:.1}%", summary.avg_win_rate);
    eprintln!("Total Trades: {}", summary.total_trades);
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return report(e);
    }
    if let Err(e) = validate_threshold_config(&adapter) {
        return report(e);
    }

    let bt_config = match BacktestConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    eprintln!("\nBacktest:");
    eprintln!("  period:     {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  cash:       {}", bt_config.initial_cash);
    eprintln!("  tickers:    {}", bt_config.instruments.join(", "));
    let names: Vec<&str> = bt_config.strategies.iter().map(|s| s.name()).collect();
    eprintln!("  strategies: {}", names.join(", "));

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
