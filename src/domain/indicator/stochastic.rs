//! Stochastic oscillator.
//!
//! %K = (close - lowest_low) / (highest_high - lowest_low) * 100 over the last
//! `k_period` bars. When the window's high equals its low, %K = 50.
//! %D = mean of the latest `d_period` %K values.
//! Both are rounded to two places.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, PRICE_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const K_PERIOD: usize = 9;
pub const D_PERIOD: usize = 3;

pub fn calculate_stochastic(bars: &[OhlcvBar], k_period: usize, d_period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut ks: Vec<Decimal> = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if k_period == 0 || i + 1 < k_period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let window = &bars[(i + 1 - k_period)..=i];
        let highest = window.iter().map(|b| b.high).max().unwrap_or(bar.high);
        let lowest = window.iter().map(|b| b.low).min().unwrap_or(bar.low);

        let k = if highest == lowest {
            dec!(50)
        } else {
            round_to(
                (bar.close - lowest) / (highest - lowest) * dec!(100),
                PRICE_SCALE,
            )
        };
        ks.push(k);

        let d = if d_period > 0 && ks.len() >= d_period {
            let recent = &ks[ks.len() - d_period..];
            let sum: Decimal = recent.iter().copied().sum();
            round_to(sum / Decimal::from(d_period as u64), PRICE_SCALE)
        } else {
            Decimal::ZERO
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Stochastic { k, d },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stochastic { k_period, d_period },
        values,
    }
}
