//! Rolling standard deviation of closing prices.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - mean)^2 for j in 0..n) / n)
//! Warmup: first (n-1) bars are invalid. Rounded to four places.
//!
//! The square root is taken with [`newton_sqrt`] rather than a float round-trip so
//! the result stays in decimal arithmetic end to end.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, RATIO_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const NEWTON_MAX_ITERATIONS: usize = 10;
pub const NEWTON_TOLERANCE: Decimal = dec!(0.0001);

/// Square root by Newton's method.
///
/// Starts from x / 2 and runs at most [`NEWTON_MAX_ITERATIONS`] steps. Stops as soon
/// as a step would move the estimate by less than [`NEWTON_TOLERANCE`], returning the
/// estimate from before that step. Non-positive input returns zero.
///
/// The fixed iteration budget converges for variances up to roughly 1e4; beyond that
/// the result is the tenth estimate.
pub fn newton_sqrt(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut guess = x / dec!(2);
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let next = (guess + x / guess) / dec!(2);
        if (next - guess).abs() < NEWTON_TOLERANCE {
            break;
        }
        guess = next;
    }
    guess
}

pub fn calculate_stddev(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let divisor = Decimal::from(period as u64);

    for (i, bar) in bars.iter().enumerate() {
        if period == 0 || i + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let window = &bars[(i + 1 - period)..=i];
        let mean = window.iter().map(|b| b.close).sum::<Decimal>() / divisor;
        let variance = window
            .iter()
            .map(|b| {
                let diff = b.close - mean;
                diff * diff
            })
            .sum::<Decimal>()
            / divisor;

        values.push(IndicatorPoint::simple(
            bar.date,
            round_to(newton_sqrt(variance), RATIO_SCALE),
        ));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{ints, make_bars};

    #[test]
    fn newton_sqrt_non_positive_is_zero() {
        assert_eq!(newton_sqrt(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(newton_sqrt(dec!(-4)), Decimal::ZERO);
    }

    #[test]
    fn newton_sqrt_exact_seed() {
        // guess = 2, next = (2 + 2) / 2 = 2 → converged immediately
        assert_eq!(newton_sqrt(dec!(4)), dec!(2));
    }

    #[test]
    fn newton_sqrt_converges_within_tolerance() {
        let root = newton_sqrt(dec!(2));
        assert!((root - dec!(1.41421356)).abs() < dec!(0.001));

        let root = newton_sqrt(dec!(10000));
        assert!((root - dec!(100)).abs() < dec!(0.001));
    }

    #[test]
    fn newton_sqrt_small_values() {
        let root = newton_sqrt(dec!(0.01));
        assert!((root - dec!(0.1)).abs() < dec!(0.001));
    }

    #[test]
    fn stddev_warmup() {
        let bars = make_bars(&ints(&[1, 2, 3, 4, 5]));
        let series = calculate_stddev(&bars, 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
    }

    #[test]
    fn stddev_population_known_value() {
        // mean 5, population variance 4 → 2
        let bars = make_bars(&ints(&[2, 4, 4, 4, 5, 5, 7, 9]));
        let series = calculate_stddev(&bars, 8);
        assert_eq!(series.simple_at(7), dec!(2));
    }

    #[test]
    fn stddev_constant_prices_is_zero() {
        let bars = make_bars(&ints(&[100; 12]));
        let series = calculate_stddev(&bars, 10);
        assert_eq!(series.simple_at(11), Decimal::ZERO);
        assert!(series.values[11].valid);
    }

    #[test]
    fn stddev_rounded_to_four_places() {
        // 1, 2, 3 → variance 2/3 → sqrt ≈ 0.8165
        let bars = make_bars(&ints(&[1, 2, 3]));
        let series = calculate_stddev(&bars, 3);
        assert_eq!(series.simple_at(2), dec!(0.8165));
    }
}
