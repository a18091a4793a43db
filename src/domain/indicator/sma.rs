//! Simple moving average of closing prices.
//!
//! SMA(n)[i] = mean(close[i-n+1..=i]), rounded to two places.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, PRICE_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let divisor = Decimal::from(period as u64);
    let mut window_sum = Decimal::ZERO;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        if period > 0 && i + 1 >= period {
            values.push(IndicatorPoint::simple(
                bar.date,
                round_to(window_sum / divisor, PRICE_SCALE),
            ));
        } else {
            values.push(IndicatorPoint::invalid(bar.date));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
