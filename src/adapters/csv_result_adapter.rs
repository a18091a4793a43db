//! CSV result sink.
//!
//! Every record sequence lands in its own file under the output directory:
//!
//! | File | Rows |
//! |---|---|
//! | `<T>_indicators.csv` | one [`IndicatorRow`] per bar |
//! | `<T>_descriptions.csv` | date and one-line reading per bar |
//! | `<T>_signals.csv` | bar plus one signal column per strategy |
//! | `<T>_signal_summary.csv` | per-strategy level counts |
//! | `backtest_trades_<Strategy>.csv` | closed trades |
//! | `backtest_portfolio_<Strategy>.csv` | one snapshot per replayed bar |
//! | `backtest_results.csv` | one metrics row per strategy |
//! | `backtest_summary.csv` | cross-strategy overview |

use crate::domain::backtest::BacktestRun;
use crate::domain::description::RowDescriptions;
use crate::domain::error::SigtraderError;
use crate::domain::indicator_row::IndicatorRow;
use crate::domain::metrics::BacktestResult;
use crate::domain::signal::Signal;
use crate::domain::strategy::{StrategyId, StrategyRow};
use crate::domain::summary::{BacktestSummary, SignalSummary};
use crate::ports::result_port::ResultPort;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvResultAdapter {
    out_dir: PathBuf,
}

impl CsvResultAdapter {
    /// Creates `out_dir` if it does not exist yet.
    pub fn new(out_dir: PathBuf) -> Result<Self, SigtraderError> {
        fs::create_dir_all(&out_dir).map_err(|e| {
            write_error(format!("failed to create {}: {}", out_dir.display(), e))
        })?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn writer(&self, file_name: &str) -> Result<csv::Writer<fs::File>, SigtraderError> {
        let path = self.out_dir.join(file_name);
        tracing::debug!(path = %path.display(), "writing results");
        csv::Writer::from_path(&path)
            .map_err(|e| write_error(format!("failed to open {}: {}", path.display(), e)))
    }

    fn write_serialized<T: Serialize>(
        &self,
        file_name: &str,
        records: &[T],
    ) -> Result<(), SigtraderError> {
        let mut wtr = self.writer(file_name)?;
        for record in records {
            wtr.serialize(record).map_err(csv_error)?;
        }
        finish(wtr)
    }
}

fn write_error(reason: String) -> SigtraderError {
    SigtraderError::ResultWrite { reason }
}

fn csv_error(e: csv::Error) -> SigtraderError {
    write_error(e.to_string())
}

fn finish(mut wtr: csv::Writer<fs::File>) -> Result<(), SigtraderError> {
    wtr.flush().map_err(|e| write_error(e.to_string()))
}

fn named_return(entry: Option<(StrategyId, Decimal)>) -> (String, String) {
    entry.map_or_else(Default::default, |(id, r)| (id.name().to_string(), r.to_string()))
}

/// "RSI14_OBV_RoC Strategy" -> "RSI14_OBV_RoC_Strategy"
fn file_stem(strategy: StrategyId) -> String {
    strategy.name().replace(' ', "_")
}

impl ResultPort for CsvResultAdapter {
    fn write_indicators(
        &self,
        instrument: &str,
        rows: &[IndicatorRow],
    ) -> Result<(), SigtraderError> {
        self.write_serialized(&format!("{instrument}_indicators.csv"), rows)
    }

    fn write_descriptions(
        &self,
        instrument: &str,
        rows: &[IndicatorRow],
        descriptions: &[RowDescriptions],
    ) -> Result<(), SigtraderError> {
        let mut wtr = self.writer(&format!("{instrument}_descriptions.csv"))?;
        wtr.write_record(["Date", "Description"]).map_err(csv_error)?;
        for (row, description) in rows.iter().zip(descriptions) {
            wtr.write_record([row.date.to_string(), description.summary()])
                .map_err(csv_error)?;
        }
        finish(wtr)
    }

    fn write_signals(&self, instrument: &str, rows: &[StrategyRow]) -> Result<(), SigtraderError> {
        let mut wtr = self.writer(&format!("{instrument}_signals.csv"))?;

        let mut header = vec!["Date", "Open", "High", "Low", "Close", "Volume"];
        header.extend(StrategyId::ALL.iter().map(|id| id.name()));
        wtr.write_record(&header).map_err(csv_error)?;

        for row in rows {
            let bar = &row.indicators;
            let mut record = vec![
                bar.date.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            record.extend(row.signals.iter().map(|(_, s)| s.label().to_string()));
            wtr.write_record(&record).map_err(csv_error)?;
        }
        finish(wtr)
    }

    fn write_signal_summary(
        &self,
        instrument: &str,
        summary: &SignalSummary,
    ) -> Result<(), SigtraderError> {
        let mut wtr = self.writer(&format!("{instrument}_signal_summary.csv"))?;

        let mut header = vec!["Strategy"];
        header.extend(Signal::ALL.iter().map(|s| s.label()));
        wtr.write_record(&header).map_err(csv_error)?;

        for id in StrategyId::ALL {
            let mut record = vec![id.name().to_string()];
            record.extend(summary.counts_for(id).map(|(_, n)| n.to_string()));
            wtr.write_record(&record).map_err(csv_error)?;
        }
        finish(wtr)
    }

    fn write_run(&self, run: &BacktestRun) -> Result<(), SigtraderError> {
        let stem = file_stem(run.strategy);
        self.write_serialized(&format!("backtest_trades_{stem}.csv"), &run.trades)?;
        self.write_serialized(&format!("backtest_portfolio_{stem}.csv"), &run.snapshots)
    }

    fn write_results(&self, results: &[BacktestResult]) -> Result<(), SigtraderError> {
        self.write_serialized("backtest_results.csv", results)
    }

    fn write_backtest_summary(&self, summary: &BacktestSummary) -> Result<(), SigtraderError> {
        let mut wtr = self.writer("backtest_summary.csv")?;
        let (best, best_return) = named_return(summary.best);
        let (worst, worst_return) = named_return(summary.worst);

        wtr.write_record([
            "Total_Strategies",
            "Best_Strategy",
            "Best_Return",
            "Worst_Strategy",
            "Worst_Return",
            "Avg_Return",
            "Avg_Win_Rate",
            "Total_Trades",
        ])
        .map_err(csv_error)?;
        wtr.write_record([
            summary.total_strategies.to_string(),
            best,
            best_return,
            worst,
            worst_return,
            summary.avg_return.to_string(),
            summary.avg_win_rate.to_string(),
            summary.total_trades.to_string(),
        ])
        .map_err(csv_error)?;
        finish(wtr)
    }
}
