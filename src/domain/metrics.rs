//! Performance metrics for one strategy's replay.

use super::portfolio::{Portfolio, PortfolioSnapshot};
use super::position::Trade;
use super::strategy::StrategyId;
use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::Serialize;

const TRADING_DAYS_PER_YEAR: Decimal = dec!(252);

/// Aggregate outcome of one strategy. Field names are the persisted column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    #[serde(rename = "Strategy")]
    pub strategy: StrategyId,
    #[serde(rename = "Total_Return")]
    pub total_return: Decimal,
    #[serde(rename = "Win_Rate")]
    pub win_rate: Decimal,
    #[serde(rename = "Max_Drawdown")]
    pub max_drawdown: Decimal,
    #[serde(rename = "Sharpe_Ratio")]
    pub sharpe_ratio: Decimal,
    #[serde(rename = "Profit_Factor")]
    pub profit_factor: Decimal,
    #[serde(rename = "Total_Trades")]
    pub total_trades: usize,
    #[serde(rename = "Winning_Trades")]
    pub winning_trades: usize,
    #[serde(rename = "Losing_Trades")]
    pub losing_trades: usize,
    #[serde(rename = "Avg_Trade_Days")]
    pub avg_trade_days: Decimal,
    #[serde(rename = "Avg_Win")]
    pub avg_win: Decimal,
    /// Mean magnitude of losing trades (non-negative).
    #[serde(rename = "Avg_Loss")]
    pub avg_loss: Decimal,
    #[serde(rename = "Max_Win")]
    pub max_win: Decimal,
    /// Most negative losing PnL (zero or below).
    #[serde(rename = "Max_Loss")]
    pub max_loss: Decimal,
    #[serde(rename = "Start_Date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "End_Date")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "Initial_Cash")]
    pub initial_cash: Decimal,
    #[serde(rename = "Final_Value")]
    pub final_value: Decimal,
}

impl BacktestResult {
    pub fn compute(strategy: StrategyId, portfolio: &Portfolio) -> Self {
        let snapshots = &portfolio.snapshots;
        let trades = &portfolio.trades;

        let final_value = snapshots
            .last()
            .map(|s| s.total_value)
            .unwrap_or(portfolio.initial_cash);

        let mut result = BacktestResult {
            strategy,
            total_return: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            avg_trade_days: Decimal::ZERO,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            max_win: Decimal::ZERO,
            max_loss: Decimal::ZERO,
            start_date: snapshots.first().map(|s| s.date),
            end_date: snapshots.last().map(|s| s.date),
            initial_cash: portfolio.initial_cash,
            final_value,
        };

        if trades.is_empty() {
            return result;
        }

        let stats = TradeStats::from_trades(trades);
        let total = Decimal::from(trades.len());

        result.total_return = snapshots
            .last()
            .map(|s| s.total_return)
            .unwrap_or(Decimal::ZERO);
        result.total_trades = trades.len();
        result.winning_trades = stats.winning;
        result.losing_trades = trades.len() - stats.winning;
        result.win_rate = Decimal::from(stats.winning) / total * dec!(100);
        result.avg_trade_days = Decimal::from(stats.holding_days) / total;
        if stats.winning > 0 {
            result.avg_win = stats.gross_profit / Decimal::from(stats.winning);
        }
        if result.losing_trades > 0 {
            result.avg_loss = stats.gross_loss / Decimal::from(result.losing_trades);
        }
        if !stats.gross_loss.is_zero() {
            result.profit_factor = stats.gross_profit / stats.gross_loss;
        }
        result.max_win = stats.max_win;
        result.max_loss = stats.max_loss;
        result.max_drawdown = compute_max_drawdown(snapshots);
        result.sharpe_ratio = compute_sharpe_ratio(snapshots);
        result
    }
}

#[derive(Debug, Default)]
struct TradeStats {
    winning: usize,
    gross_profit: Decimal,
    gross_loss: Decimal,
    max_win: Decimal,
    max_loss: Decimal,
    holding_days: i64,
}

impl TradeStats {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = TradeStats::default();
        for trade in trades {
            stats.holding_days += trade.holding_days;
            if trade.is_win() {
                stats.winning += 1;
                stats.gross_profit += trade.pnl;
                stats.max_win = stats.max_win.max(trade.pnl);
            } else {
                stats.gross_loss += trade.pnl.abs();
                stats.max_loss = stats.max_loss.min(trade.pnl);
            }
        }
        stats
    }
}

/// Largest peak-to-trough drop in percent, with the peak seeded from the first snapshot.
pub fn compute_max_drawdown(snapshots: &[PortfolioSnapshot]) -> Decimal {
    let Some(first) = snapshots.first() else {
        return Decimal::ZERO;
    };

    let mut peak = first.total_value;
    let mut max_dd = Decimal::ZERO;
    for snapshot in snapshots {
        peak = peak.max(snapshot.total_value);
        if peak > Decimal::ZERO {
            let dd = (peak - snapshot.total_value) / peak * dec!(100);
            max_dd = max_dd.max(dd);
        }
    }
    max_dd
}

/// Annualised Sharpe ratio over snapshot-to-snapshot returns, sample standard deviation.
pub fn compute_sharpe_ratio(snapshots: &[PortfolioSnapshot]) -> Decimal {
    if snapshots.len() < 2 {
        return Decimal::ZERO;
    }

    let returns: Vec<Decimal> = snapshots
        .windows(2)
        .filter(|w| !w[0].total_value.is_zero())
        .map(|w| (w[1].total_value - w[0].total_value) / w[0].total_value)
        .collect();
    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(returns.len());
    let mean = returns.iter().copied().sum::<Decimal>() / n;
    let variance = returns
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / (n - Decimal::ONE);
    if variance <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);
    let annual_factor = TRADING_DAYS_PER_YEAR.sqrt().unwrap_or(Decimal::ZERO);
    let annualised_vol = std_dev * annual_factor;
    if annualised_vol.is_zero() {
        return Decimal::ZERO;
    }
    mean * TRADING_DAYS_PER_YEAR / annualised_vol
}
