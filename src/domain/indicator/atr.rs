//! Average True Range as a simple mean of true range.
//!
//! TR[0] is undefined (no previous close). ATR(n)[i] = mean(TR[i-n+1..=i]) for
//! i >= n, rounded to four places.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, RATIO_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;

pub const ATR_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let true_ranges: Vec<Decimal> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                Decimal::ZERO
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i < period {
                return IndicatorPoint::invalid(bar.date);
            }
            let sum: Decimal = true_ranges[(i + 1 - period)..=i].iter().copied().sum();
            IndicatorPoint::simple(
                bar.date,
                round_to(sum / Decimal::from(period as u64), RATIO_SCALE),
            )
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
