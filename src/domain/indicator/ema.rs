//! Exponential moving average.
//!
//! Seeded with the first close, so EMA(n) is defined from the first bar onward.
//! Subsequent values: EMA[i] = close[i] * k + EMA[i-1] * (1 - k), k = 2 / (n + 1).
//! The running value is carried unrounded; each stored point is rounded to two places.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, PRICE_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Smoothing multiplier 2 / (n + 1).
pub fn ema_multiplier(period: usize) -> Decimal {
    dec!(2) / Decimal::from(period as u64 + 1)
}

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
    let running = ema_values(&closes, period);

    let values = bars
        .iter()
        .zip(running)
        .enumerate()
        .map(|(i, (bar, ema))| {
            let stored = if i == 0 { ema } else { round_to(ema, PRICE_SCALE) };
            IndicatorPoint::simple(bar.date, stored)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// Unrounded EMA over `inputs`, seeded with the first input.
pub(crate) fn ema_values(inputs: &[Decimal], period: usize) -> Vec<Decimal> {
    let k = ema_multiplier(period);
    let mut out: Vec<Decimal> = Vec::with_capacity(inputs.len());

    for (i, &value) in inputs.iter().enumerate() {
        let ema = if i == 0 {
            value
        } else {
            value * k + out[i - 1] * (Decimal::ONE - k)
        };
        out.push(ema);
    }

    out
}
