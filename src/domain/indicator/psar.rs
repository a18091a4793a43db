//! Parabolic SAR.
//!
//! Starts in an uptrend with SAR = first low, EP = first high and AF = step.
//! Each bar projects SAR[i] = SAR[i-1] + AF * (EP - SAR[i-1]) from the previous
//! published (rounded) SAR. On an uptrend a low below the projection reverses the
//! trend (SAR = EP, EP = low, AF = step); otherwise a new high moves EP and bumps AF
//! by `step`, capped at `max`. The downtrend mirrors this with highs.
//! Published values are rounded to four places.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, RATIO_SCALE, round_to,
};
use crate::domain::ohlcv::OhlcvBar;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Acceleration parameters for one PSAR instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarParams {
    pub step: Decimal,
    pub max: Decimal,
}

impl PsarParams {
    pub const PRIMARY: PsarParams = PsarParams {
        step: dec!(0.02),
        max: dec!(0.2),
    };

    pub const SECONDARY: PsarParams = PsarParams {
        step: dec!(0.01),
        max: dec!(0.1),
    };

    fn indicator_type(&self) -> IndicatorType {
        let hundredths = |v: Decimal| (v * dec!(100)).to_u32().unwrap_or(0);
        IndicatorType::Psar {
            step_x100: hundredths(self.step),
            max_x100: hundredths(self.max),
        }
    }
}

/// PSAR state after processing one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarState {
    pub sar: Decimal,
    pub uptrend: bool,
    pub acceleration: Decimal,
    pub extreme_point: Decimal,
}

pub fn psar_states(bars: &[OhlcvBar], params: PsarParams) -> Vec<PsarState> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };

    let mut states = Vec::with_capacity(bars.len());
    let mut state = PsarState {
        sar: first.low,
        uptrend: true,
        acceleration: params.step,
        extreme_point: first.high,
    };
    states.push(state);

    for bar in &bars[1..] {
        let mut sar = state.sar + state.acceleration * (state.extreme_point - state.sar);

        if state.uptrend {
            if bar.low < sar {
                state.uptrend = false;
                sar = state.extreme_point;
                state.extreme_point = bar.low;
                state.acceleration = params.step;
            } else if bar.high > state.extreme_point {
                state.extreme_point = bar.high;
                state.acceleration = (state.acceleration + params.step).min(params.max);
            }
        } else if bar.high > sar {
            state.uptrend = true;
            sar = state.extreme_point;
            state.extreme_point = bar.high;
            state.acceleration = params.step;
        } else if bar.low < state.extreme_point {
            state.extreme_point = bar.low;
            state.acceleration = (state.acceleration + params.step).min(params.max);
        }

        state.sar = round_to(sar, RATIO_SCALE);
        states.push(state);
    }

    states
}

pub fn calculate_psar(bars: &[OhlcvBar], params: PsarParams) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(psar_states(bars, params))
        .map(|(bar, state)| IndicatorPoint::simple(bar.date, state.sar))
        .collect();

    IndicatorSeries {
        indicator_type: params.indicator_type(),
        values,
    }
}
