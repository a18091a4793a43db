//! Open positions and the trades they realise into.

use crate::domain::strategy::StrategyId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// A long holding in one instrument, opened by one strategy's replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub instrument: String,
    pub strategy: StrategyId,
    pub entry_date: NaiveDate,
    pub entry_price: Decimal,
    pub quantity: i64,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

impl Position {
    pub fn cost_basis(&self) -> Decimal {
        self.entry_price * Decimal::from(self.quantity)
    }

    pub fn mark_to_market(&mut self, price: Decimal) {
        self.current_price = price;
        self.current_value = price * Decimal::from(self.quantity);
        self.unrealized_pnl = self.current_value - self.cost_basis();
    }

    /// Calendar days from entry to `date`.
    pub fn holding_days(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }

    pub fn should_stop_loss(&self, low: Decimal) -> bool {
        low <= self.stop_loss
    }

    pub fn should_take_profit(&self, high: Decimal) -> bool {
        high >= self.take_profit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    TimeLimit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Signal => "SIGNAL",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::TimeLimit => "TIME_LIMIT",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExitReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub const TRADE_TYPE_LONG: &str = "LONG";

/// A closed position. Field names are the persisted column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    #[serde(rename = "Trade_ID")]
    pub trade_id: u32,
    #[serde(rename = "Ticker")]
    pub instrument: String,
    #[serde(rename = "Strategy")]
    pub strategy: StrategyId,
    #[serde(rename = "Entry_Date")]
    pub entry_date: NaiveDate,
    #[serde(rename = "Exit_Date")]
    pub exit_date: NaiveDate,
    #[serde(rename = "Entry_Price")]
    pub entry_price: Decimal,
    #[serde(rename = "Exit_Price")]
    pub exit_price: Decimal,
    /// Signal label on the exit bar, or the trigger name for stop-loss and take-profit exits.
    #[serde(rename = "Exit_Signal")]
    pub exit_signal: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "PnL")]
    pub pnl: Decimal,
    #[serde(rename = "PnL_Percent")]
    pub pnl_percent: Decimal,
    #[serde(rename = "Holding_Days")]
    pub holding_days: i64,
    #[serde(rename = "Trade_Type")]
    pub trade_type: &'static str,
    #[serde(rename = "Commission")]
    pub commission: Decimal,
    #[serde(rename = "Exit_Reason")]
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}
