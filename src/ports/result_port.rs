//! Result persistence port trait.

use crate::domain::backtest::BacktestRun;
use crate::domain::description::RowDescriptions;
use crate::domain::error::SigtraderError;
use crate::domain::indicator_row::IndicatorRow;
use crate::domain::metrics::BacktestResult;
use crate::domain::strategy::StrategyRow;
use crate::domain::summary::{BacktestSummary, SignalSummary};

/// Sink for every record sequence the pipeline produces.
pub trait ResultPort {
    fn write_indicators(&self, instrument: &str, rows: &[IndicatorRow])
    -> Result<(), SigtraderError>;

    fn write_descriptions(
        &self,
        instrument: &str,
        rows: &[IndicatorRow],
        descriptions: &[RowDescriptions],
    ) -> Result<(), SigtraderError>;

    fn write_signals(&self, instrument: &str, rows: &[StrategyRow]) -> Result<(), SigtraderError>;

    fn write_signal_summary(
        &self,
        instrument: &str,
        summary: &SignalSummary,
    ) -> Result<(), SigtraderError>;

    /// Trade ledger and equity curve of one strategy's replay.
    fn write_run(&self, run: &BacktestRun) -> Result<(), SigtraderError>;

    fn write_results(&self, results: &[BacktestResult]) -> Result<(), SigtraderError>;

    fn write_backtest_summary(&self, summary: &BacktestSummary) -> Result<(), SigtraderError>;
}
