//! RSI (Relative Strength Index) over a trailing window.
//!
//! Each bar recomputes the average gain/loss over the last n price changes
//! (no Wilder smoothing):
//! - avg_gain = sum(gains) / n, avg_loss = sum(losses) / n
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - avg_loss == 0 and avg_gain > 0: RSI = 100
//! - avg_loss == 0 and avg_gain == 0 (flat window): RSI = 50
//!
//! Warmup: first n bars are invalid (need n price changes). Rounded to two places.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, PRICE_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let divisor = Decimal::from(period as u64);

    for (i, bar) in bars.iter().enumerate() {
        if period == 0 || i < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let mut gains = Decimal::ZERO;
        let mut losses = Decimal::ZERO;
        for j in (i + 1 - period)..=i {
            let change = bars[j].close - bars[j - 1].close;
            if change > Decimal::ZERO {
                gains += change;
            } else {
                losses += change.abs();
            }
        }

        let avg_gain = gains / divisor;
        let avg_loss = losses / divisor;
        let rsi = rsi_from_averages(avg_gain, avg_loss);

        values.push(IndicatorPoint::simple(bar.date, round_to(rsi, PRICE_SCALE)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        if avg_gain.is_zero() {
            return dec!(50);
        }
        return dec!(100);
    }
    let rs = avg_gain / avg_loss;
    dec!(100) - dec!(100) / (Decimal::ONE + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{ints, make_bars};
    use proptest::prelude::*;

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert_eq!(series.values.len(), 0);
    }

    #[test]
    fn rsi_warmup_needs_period_plus_one_bars() {
        let bars = make_bars(&ints(&[1, 2, 3, 4, 5]));
        let series = calculate_rsi(&bars, 4);
        assert!(series.values[..4].iter().all(|p| !p.valid));
        assert!(series.values[4].valid);

        let short = calculate_rsi(&bars[..4], 4);
        assert!(short.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let bars = make_bars(&ints(&[1, 2, 3, 4, 5, 6]));
        let series = calculate_rsi(&bars, 5);
        assert_eq!(series.simple_at(5), dec!(100));
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let bars = make_bars(&ints(&[6, 5, 4, 3, 2, 1]));
        let series = calculate_rsi(&bars, 5);
        assert_eq!(series.simple_at(5), Decimal::ZERO);
    }

    #[test]
    fn rsi_flat_window_is_neutral() {
        let bars = make_bars(&ints(&[100; 20]));
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.simple_at(14), dec!(50));
        assert_eq!(series.simple_at(19), dec!(50));
    }

    #[test]
    fn rsi_mixed_window() {
        // changes over the last 4: +2, -1, +2, -1 → gain 4/4 = 1, loss 2/4 = 0.5
        // rs = 2, RSI = 100 - 100/3 = 66.666.. → 66.67
        let bars = make_bars(&ints(&[10, 12, 11, 13, 12]));
        let series = calculate_rsi(&bars, 4);
        assert_eq!(series.simple_at(4), dec!(66.67));
    }

    #[test]
    fn rsi_window_is_not_smoothed() {
        // A large early drop leaves the window entirely; only the last 2 changes count.
        let bars = make_bars(&ints(&[100, 50, 51, 52]));
        let series = calculate_rsi(&bars, 2);
        assert_eq!(series.simple_at(3), dec!(100));
    }

    proptest! {
        #[test]
        fn rsi_always_within_bounds(closes in prop::collection::vec(1i64..10_000, 0..60)) {
            let bars = make_bars(&ints(&closes));
            let series = calculate_rsi(&bars, 14);
            for point in series.values.iter().filter(|p| p.valid) {
                if let crate::domain::indicator::IndicatorValue::Simple(v) = point.value {
                    prop_assert!(v >= Decimal::ZERO && v <= dec!(100));
                }
            }
        }
    }
}
