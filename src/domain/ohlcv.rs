//! OHLCV bar representation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: Decimal) -> Decimal {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// ((close - low) - (high - close)) / (high - low), or `None` when the bar has no range.
    pub fn money_flow_multiplier(&self) -> Option<Decimal> {
        let range = self.high - self.low;
        if range.is_zero() {
            return None;
        }
        Some(((self.close - self.low) - (self.high - self.close)) / range)
    }
}
