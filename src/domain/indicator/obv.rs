//! OBV (On-Balance Volume) and its rate of change.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, PRICE_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const OBV_ROC_PERIOD: usize = 10;

/// Calculate OBV (On-Balance Volume) indicator.
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; all bars are valid.
pub fn calculate_obv(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut obv: i64 = 0;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            obv = bar.volume;
        } else if bar.close > bars[i - 1].close {
            obv += bar.volume;
        } else if bar.close < bars[i - 1].close {
            obv -= bar.volume;
        }

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Volume(obv),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Obv,
        values,
    }
}

/// Percent change of OBV versus `period` bars earlier, rounded to two places.
///
/// Unset for the first `period` bars and wherever the reference OBV is zero.
pub fn calculate_obv_roc(obv: &IndicatorSeries, period: usize) -> IndicatorSeries {
    let values = obv
        .values
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if period == 0 || i < period {
                return IndicatorPoint::invalid(point.date);
            }
            let reference = obv.volume_at(i - period);
            if reference == 0 {
                return IndicatorPoint::invalid(point.date);
            }
            let current = Decimal::from(obv.volume_at(i));
            let reference = Decimal::from(reference);
            let roc = (current - reference) / reference.abs() * dec!(100);
            IndicatorPoint::simple(point.date, round_to(roc, PRICE_SCALE))
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::ObvRoc(period),
        values,
    }
}
