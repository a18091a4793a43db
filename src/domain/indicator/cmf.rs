//! Chaikin Money Flow.
//!
//! CMF(n)[i] = sum(MFM * volume) / sum(volume) over the last n bars, where
//! MFM = ((close - low) - (high - close)) / (high - low). Bars with no range
//! contribute no money flow but their volume still counts. Rounded to four places;
//! unset when the window's volume is zero.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, RATIO_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;

pub const CMF_PERIOD: usize = 20;

pub fn calculate_cmf(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if period == 0 || i + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let mut money_flow = Decimal::ZERO;
        let mut volume = Decimal::ZERO;
        for b in &bars[(i + 1 - period)..=i] {
            let bar_volume = Decimal::from(b.volume);
            if let Some(mfm) = b.money_flow_multiplier() {
                money_flow += mfm * bar_volume;
            }
            volume += bar_volume;
        }

        if volume.is_zero() {
            values.push(IndicatorPoint::invalid(bar.date));
        } else {
            values.push(IndicatorPoint::simple(
                bar.date,
                round_to(money_flow / volume, RATIO_SCALE),
            ));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Cmf(period),
        values,
    }
}
