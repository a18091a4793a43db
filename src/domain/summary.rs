//! Roll-ups over signal rows and backtest results.

use super::metrics::BacktestResult;
use super::signal::Signal;
use super::strategy::{StrategyId, StrategyRow};
use rust_decimal::Decimal;

/// Count of each signal level, per strategy, over one instrument's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSummary {
    pub rows: usize,
    counts: [[usize; 7]; StrategyId::COUNT],
}

impl SignalSummary {
    pub fn from_rows(rows: &[StrategyRow]) -> Self {
        let mut summary = SignalSummary {
            rows: rows.len(),
            ..Default::default()
        };
        for row in rows {
            for (id, signal) in row.signals.iter() {
                summary.counts[id.index()][level_index(signal)] += 1;
            }
        }
        summary
    }

    pub fn count(&self, strategy: StrategyId, signal: Signal) -> usize {
        self.counts[strategy.index()][level_index(signal)]
    }

    /// `(signal, count)` in level order, strongest buy first.
    pub fn counts_for(&self, strategy: StrategyId) -> impl Iterator<Item = (Signal, usize)> + '_ {
        Signal::ALL
            .into_iter()
            .map(move |signal| (signal, self.count(strategy, signal)))
    }
}

fn level_index(signal: Signal) -> usize {
    signal as usize
}

/// Cross-strategy overview of one backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub total_strategies: usize,
    pub best: Option<(StrategyId, Decimal)>,
    pub worst: Option<(StrategyId, Decimal)>,
    pub avg_return: Decimal,
    pub avg_win_rate: Decimal,
    pub total_trades: usize,
}

impl BacktestSummary {
    /// Best and worst are picked by total return; the first one wins a tie.
    pub fn from_results(results: &[BacktestResult]) -> Self {
        let mut best: Option<(StrategyId, Decimal)> = None;
        let mut worst: Option<(StrategyId, Decimal)> = None;
        let mut return_sum = Decimal::ZERO;
        let mut win_rate_sum = Decimal::ZERO;
        let mut total_trades = 0;

        for result in results {
            let candidate = (result.strategy, result.total_return);
            if best.is_none_or(|(_, r)| result.total_return > r) {
                best = Some(candidate);
            }
            if worst.is_none_or(|(_, r)| result.total_return < r) {
                worst = Some(candidate);
            }
            return_sum += result.total_return;
            win_rate_sum += result.win_rate;
            total_trades += result.total_trades;
        }

        let (avg_return, avg_win_rate) = if results.is_empty() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            let n = Decimal::from(results.len());
            (return_sum / n, win_rate_sum / n)
        };

        BacktestSummary {
            total_strategies: results.len(),
            best,
            worst,
            avg_return,
            avg_win_rate,
            total_trades,
        }
    }
}
