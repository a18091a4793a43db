//! Portfolio state and the equity curve.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;

use super::position::{Position, Trade};

/// Portfolio state after one replayed bar. Field names are the persisted column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Cash")]
    pub cash: Decimal,
    #[serde(rename = "Equity_Value")]
    pub equity_value: Decimal,
    #[serde(rename = "Total_Value")]
    pub total_value: Decimal,
    #[serde(rename = "Daily_Return")]
    pub daily_return: Decimal,
    #[serde(rename = "Total_Return")]
    pub total_return: Decimal,
    #[serde(rename = "Drawdown")]
    pub drawdown: Decimal,
    #[serde(rename = "Active_Positions")]
    pub active_positions: usize,
    #[serde(rename = "Days_Since_Start")]
    pub days_since_start: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: Decimal,
    pub initial_cash: Decimal,
    pub positions: HashMap<String, Position>,
    pub trades: Vec<Trade>,
    pub snapshots: Vec<PortfolioSnapshot>,
    peak_value: Decimal,
    next_trade_id: u32,
}

impl Portfolio {
    pub fn new(initial_cash: Decimal) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
            positions: HashMap::new(),
            trades: Vec::new(),
            snapshots: Vec::new(),
            peak_value: initial_cash,
            next_trade_id: 1,
        }
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.insert(position.instrument.clone(), position);
    }

    pub fn get_position(&self, instrument: &str) -> Option<&Position> {
        self.positions.get(instrument)
    }

    pub fn has_position(&self, instrument: &str) -> bool {
        self.positions.contains_key(instrument)
    }

    pub fn remove_position(&mut self, instrument: &str) -> Option<Position> {
        self.positions.remove(instrument)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Refresh the open position for `instrument`, if any, at `price`.
    pub fn mark_to_market(&mut self, instrument: &str, price: Decimal) {
        if let Some(position) = self.positions.get_mut(instrument) {
            position.mark_to_market(price);
        }
    }

    /// Next sequential trade id, starting at 1.
    pub fn next_trade_id(&mut self) -> u32 {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Sum of the last marked value of every open position.
    pub fn equity_value(&self) -> Decimal {
        self.positions.values().map(|p| p.current_value).sum()
    }

    pub fn total_value(&self) -> Decimal {
        self.cash + self.equity_value()
    }

    /// Append a snapshot of the current state.
    ///
    /// Returns are in percent. The first snapshot's daily return is zero. Drawdown
    /// is measured from the running peak, which starts at the initial cash and
    /// includes the value just computed, so it is never positive.
    pub fn record_snapshot(&mut self, date: NaiveDate, days_since_start: usize) -> &PortfolioSnapshot {
        let equity_value = self.equity_value();
        let total_value = self.cash + equity_value;

        let daily_return = match self.snapshots.last() {
            Some(prev) if !prev.total_value.is_zero() => {
                (total_value - prev.total_value) / prev.total_value * dec!(100)
            }
            _ => Decimal::ZERO,
        };

        let total_return = if self.initial_cash.is_zero() {
            Decimal::ZERO
        } else {
            (total_value - self.initial_cash) / self.initial_cash * dec!(100)
        };

        self.peak_value = self.peak_value.max(total_value);
        let drawdown = if self.peak_value.is_zero() {
            Decimal::ZERO
        } else {
            (total_value - self.peak_value) / self.peak_value * dec!(100)
        };

        self.snapshots.push(PortfolioSnapshot {
            date,
            cash: self.cash,
            equity_value,
            total_value,
            daily_return,
            total_return,
            drawdown,
            active_positions: self.positions.len(),
            days_since_start,
        });
        &self.snapshots[self.snapshots.len() - 1]
    }
}
