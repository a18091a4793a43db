//! Crossover, slope and distance flags derived from closes and moving averages.
//!
//! Every flag compares the current bar with the previous one, so bar 0 never fires.
//! A zero moving average means "not yet defined" and suppresses the flag.

use crate::domain::indicator::{PRICE_SCALE, round_to};
use rust_decimal::Decimal;

/// Inputs for one bar: close plus the SMA10/50/200 values (zero when unset).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AveragePoint {
    pub close: Decimal,
    pub sma10: Decimal,
    pub sma50: Decimal,
    pub sma200: Decimal,
}

/// Up/down crossing of price through one moving average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceCross {
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossoverFlags {
    pub golden_cross: bool,
    pub death_cross: bool,
    pub price_cross_sma10: PriceCross,
    pub price_cross_sma50: PriceCross,
    pub price_cross_sma200: PriceCross,
    pub sma10_up: bool,
    pub sma50_up: bool,
    pub sma200_up: bool,
    pub sma50_above_sma200: bool,
    pub price_distance_sma10: Decimal,
    pub price_distance_sma50: Decimal,
    pub price_distance_sma200: Decimal,
}

fn defined(values: &[Decimal]) -> bool {
    values.iter().all(|v| !v.is_zero())
}

fn price_cross(prev_close: Decimal, prev_avg: Decimal, close: Decimal, avg: Decimal) -> PriceCross {
    if !defined(&[prev_avg, avg]) {
        return PriceCross::default();
    }
    PriceCross {
        up: close > avg && prev_close <= prev_avg,
        down: close < avg && prev_close >= prev_avg,
    }
}

fn slope_up(prev: Decimal, cur: Decimal) -> bool {
    defined(&[prev, cur]) && cur > prev
}

fn distance(close: Decimal, avg: Decimal) -> Decimal {
    if avg.is_zero() {
        Decimal::ZERO
    } else {
        round_to(close - avg, PRICE_SCALE)
    }
}

pub fn calculate_crossovers(points: &[AveragePoint]) -> Vec<CrossoverFlags> {
    let mut flags = vec![CrossoverFlags::default(); points.len()];

    for i in 1..points.len() {
        let prev = points[i - 1];
        let cur = points[i];
        let both_long = defined(&[prev.sma50, prev.sma200, cur.sma50, cur.sma200]);

        flags[i] = CrossoverFlags {
            golden_cross: both_long && cur.sma50 > cur.sma200 && prev.sma50 <= prev.sma200,
            death_cross: both_long && cur.sma50 < cur.sma200 && prev.sma50 >= prev.sma200,
            price_cross_sma10: price_cross(prev.close, prev.sma10, cur.close, cur.sma10),
            price_cross_sma50: price_cross(prev.close, prev.sma50, cur.close, cur.sma50),
            price_cross_sma200: price_cross(prev.close, prev.sma200, cur.close, cur.sma200),
            sma10_up: slope_up(prev.sma10, cur.sma10),
            sma50_up: slope_up(prev.sma50, cur.sma50),
            sma200_up: slope_up(prev.sma200, cur.sma200),
            sma50_above_sma200: defined(&[cur.sma50, cur.sma200]) && cur.sma50 > cur.sma200,
            price_distance_sma10: distance(cur.close, cur.sma10),
            price_distance_sma50: distance(cur.close, cur.sma50),
            price_distance_sma200: distance(cur.close, cur.sma200),
        };
    }

    flags
}
