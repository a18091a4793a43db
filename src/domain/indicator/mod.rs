//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every calculator rounds its output to a fixed scale per field (see
//! [`PRICE_SCALE`] and [`RATIO_SCALE`]). Strategy thresholds compare against the
//! rounded values, so the rounding is part of each indicator's contract.

pub mod atr;
pub mod cmf;
pub mod crossover;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod psar;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Fractional digits kept for averages, RSI, stochastic, OBV rate of change and distances.
pub const PRICE_SCALE: u32 = 2;

/// Fractional digits kept for MACD, CMF, PSAR, ATR and rolling standard deviation.
pub const RATIO_SCALE: u32 = 4;

/// Round half away from zero to `scale` fractional digits.
pub fn round_to(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        IndicatorPoint {
            date,
            valid: false,
            value: IndicatorValue::Simple(Decimal::ZERO),
        }
    }

    pub fn simple(date: NaiveDate, value: Decimal) -> Self {
        IndicatorPoint {
            date,
            valid: true,
            value: IndicatorValue::Simple(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(Decimal),
    Volume(i64),
    Macd {
        line: Decimal,
        signal: Decimal,
        histogram: Decimal,
    },
    Stochastic {
        k: Decimal,
        d: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Stddev(usize),
    Cmf(usize),
    Obv,
    ObvRoc(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    Psar {
        step_x100: u32,
        max_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `idx`, or zero when the point is missing, invalid or not a simple value.
    pub fn simple_at(&self, idx: usize) -> Decimal {
        match self.values.get(idx) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => *v,
            _ => Decimal::ZERO,
        }
    }

    pub fn volume_at(&self, idx: usize) -> i64 {
        match self.values.get(idx) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Volume(v),
                ..
            }) => *v,
            _ => 0,
        }
    }

    /// (line, signal, histogram) at `idx`; zeros where unset.
    pub fn macd_at(&self, idx: usize) -> (Decimal, Decimal, Decimal) {
        match self.values.get(idx) {
            Some(IndicatorPoint {
                valid: true,
                value:
                    IndicatorValue::Macd {
                        line,
                        signal,
                        histogram,
                    },
                ..
            }) => (*line, *signal, *histogram),
            _ => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        }
    }

    /// (%K, %D) at `idx`; zeros where unset.
    pub fn stochastic_at(&self, idx: usize) -> (Decimal, Decimal) {
        match self.values.get(idx) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Stochastic { k, d },
                ..
            }) => (*k, *d),
            _ => (Decimal::ZERO, Decimal::ZERO),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Cmf(period) => write!(f, "CMF({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::ObvRoc(period) => write!(f, "OBVROC({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::Psar {
                step_x100,
                max_x100,
            } => {
                let step = Decimal::new(i64::from(*step_x100), 2).normalize();
                let max = Decimal::new(i64::from(*max_x100), 2).normalize();
                write!(f, "PSAR({},{})", step, max)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_psar() {
        let psar = IndicatorType::Psar {
            step_x100: 2,
            max_x100: 20,
        };
        assert_eq!(psar.to_string(), "PSAR(0.02,0.2)");
    }

    #[test]
    fn round_to_is_half_away_from_zero() {
        assert_eq!(round_to(dec!(1.005), 2), dec!(1.01));
        assert_eq!(round_to(dec!(-1.005), 2), dec!(-1.01));
        assert_eq!(round_to(dec!(1.00049), 3), dec!(1.000));
        assert_eq!(round_to(dec!(0.12345), 4), dec!(0.1235));
    }

    #[test]
    fn simple_at_returns_zero_for_invalid_points() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![
                IndicatorPoint::invalid(date),
                IndicatorPoint::simple(date, dec!(5)),
            ],
        };
        assert_eq!(series.simple_at(0), Decimal::ZERO);
        assert_eq!(series.simple_at(1), dec!(5));
        assert_eq!(series.simple_at(7), Decimal::ZERO);
    }
}
