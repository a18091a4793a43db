//! MACD (Moving Average Convergence Divergence).
//!
//! - Fast/slow EMAs (12/26) are seeded with the first close and kept unrounded.
//! - MACD line = EMA12 - EMA26, defined from index 25 once at least 26 bars exist.
//! - Signal line = EMA9 of the MACD line, seeded with the line value at index 25 and
//!   published from index 26 once at least 34 bars exist.
//! - Histogram = line - signal.
//!
//! All published values are rounded to four places. A bar whose line rounds to zero
//! publishes no signal and restarts the signal recursion from zero.

use crate::domain::indicator::ema::{ema_multiplier, ema_values};
use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, RATIO_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;

/// Bars required before the signal line and histogram are published.
pub const MIN_SIGNAL_BARS: usize = SLOW_PERIOD + SIGNAL_PERIOD - 1;

pub fn calculate_macd(bars: &[OhlcvBar]) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast: FAST_PERIOD,
        slow: SLOW_PERIOD,
        signal: SIGNAL_PERIOD,
    };

    if bars.len() < SLOW_PERIOD {
        return IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
    let fast = ema_values(&closes, FAST_PERIOD);
    let slow = ema_values(&closes, SLOW_PERIOD);
    let first_line = SLOW_PERIOD - 1;

    let lines: Vec<Decimal> = (0..bars.len())
        .map(|i| {
            if i >= first_line {
                round_to(fast[i] - slow[i], RATIO_SCALE)
            } else {
                Decimal::ZERO
            }
        })
        .collect();

    let mut signals = vec![Decimal::ZERO; bars.len()];
    let mut histograms = vec![Decimal::ZERO; bars.len()];

    if bars.len() >= MIN_SIGNAL_BARS {
        let k = ema_multiplier(SIGNAL_PERIOD);
        let mut running = vec![Decimal::ZERO; bars.len()];
        running[first_line] = lines[first_line];

        for i in (first_line + 1)..bars.len() {
            if lines[i].is_zero() {
                continue;
            }
            running[i] = lines[i] * k + running[i - 1] * (Decimal::ONE - k);
            signals[i] = round_to(running[i], RATIO_SCALE);
            histograms[i] = round_to(lines[i] - signals[i], RATIO_SCALE);
        }
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i < first_line {
                return IndicatorPoint::invalid(bar.date);
            }
            IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Macd {
                    line: lines[i],
                    signal: signals[i],
                    histogram: histograms[i],
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{ints, make_bars};
    use rust_decimal_macros::dec;

    fn rising(n: usize) -> Vec<OhlcvBar> {
        let closes: Vec<i64> = (0..n as i64).map(|i| 100 + i).collect();
        make_bars(&ints(&closes))
    }

    #[test]
    fn macd_needs_26_bars_for_line() {
        let series = calculate_macd(&rising(25));
        assert!(series.values.iter().all(|p| !p.valid));

        let series = calculate_macd(&rising(26));
        assert!(!series.values[24].valid);
        assert!(series.values[25].valid);
        let (line, signal, hist) = series.macd_at(25);
        assert!(line > Decimal::ZERO);
        assert_eq!(signal, Decimal::ZERO);
        assert_eq!(hist, Decimal::ZERO);
    }

    #[test]
    fn macd_signal_needs_34_bars() {
        let series = calculate_macd(&rising(33));
        assert!(series.values.iter().all(|p| series_signal(p).is_zero()));

        let series = calculate_macd(&rising(34));
        let (_, signal, _) = series.macd_at(25);
        assert_eq!(signal, Decimal::ZERO);
        let (line, signal, hist) = series.macd_at(26);
        assert!(signal > Decimal::ZERO);
        assert_eq!(hist, round_to(line - signal, RATIO_SCALE));
    }

    #[test]
    fn macd_constant_prices_is_zero() {
        let bars = make_bars(&ints(&[100; 40]));
        let series = calculate_macd(&bars);
        for i in 25..40 {
            assert_eq!(series.macd_at(i), (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        }
    }

    #[test]
    fn macd_line_rounded_to_four_places() {
        let series = calculate_macd(&rising(40));
        let (line, signal, hist) = series.macd_at(39);
        assert_eq!(line, round_to(line, 4));
        assert_eq!(signal, round_to(signal, 4));
        assert_eq!(hist, round_to(hist, 4));
        assert!(line.scale() <= 4);
        assert!(line > dec!(0));
    }

    fn series_signal(point: &IndicatorPoint) -> Decimal {
        match point.value {
            IndicatorValue::Macd { signal, .. } => signal,
            _ => Decimal::ZERO,
        }
    }
}
