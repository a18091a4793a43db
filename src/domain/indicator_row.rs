//! Per-bar indicator rows.
//!
//! [`compute_indicators`] runs every calculator over one instrument's full bar
//! sequence and flattens the results into one [`IndicatorRow`] per bar. Fields that
//! cannot be computed yet hold zero; consumers treat zero as "unset" (OBV excepted).

use crate::domain::indicator::atr::{ATR_PERIOD, calculate_atr};
use crate::domain::indicator::cmf::{CMF_PERIOD, calculate_cmf};
use crate::domain::indicator::crossover::{AveragePoint, calculate_crossovers};
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::obv::{OBV_ROC_PERIOD, calculate_obv, calculate_obv_roc};
use crate::domain::indicator::psar::{PsarParams, calculate_psar};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::stochastic::{D_PERIOD, K_PERIOD, calculate_stochastic};
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Decimal,
    #[serde(rename = "High")]
    pub high: Decimal,
    #[serde(rename = "Low")]
    pub low: Decimal,
    #[serde(rename = "Close")]
    pub close: Decimal,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "SMA10")]
    pub sma10: Decimal,
    #[serde(rename = "SMA50")]
    pub sma50: Decimal,
    #[serde(rename = "SMA200")]
    pub sma200: Decimal,
    #[serde(rename = "EMA5")]
    pub ema5: Decimal,
    #[serde(rename = "EMA10")]
    pub ema10: Decimal,
    #[serde(rename = "EMA20")]
    pub ema20: Decimal,
    #[serde(rename = "EMA50")]
    pub ema50: Decimal,
    #[serde(rename = "EMA200")]
    pub ema200: Decimal,
    #[serde(rename = "RSI9")]
    pub rsi9: Decimal,
    #[serde(rename = "RSI14")]
    pub rsi14: Decimal,
    #[serde(rename = "RSI25")]
    pub rsi25: Decimal,
    #[serde(rename = "StochK")]
    pub stoch_k: Decimal,
    #[serde(rename = "StochD")]
    pub stoch_d: Decimal,
    #[serde(rename = "MACD")]
    pub macd: Decimal,
    #[serde(rename = "MACDSignal")]
    pub macd_signal: Decimal,
    #[serde(rename = "MACDHist")]
    pub macd_hist: Decimal,
    #[serde(rename = "CMF20")]
    pub cmf20: Decimal,
    #[serde(rename = "OBV")]
    pub obv: i64,
    #[serde(rename = "OBVRoC")]
    pub obv_roc: Decimal,
    #[serde(rename = "PSAR1")]
    pub psar1: Decimal,
    #[serde(rename = "PSAR2")]
    pub psar2: Decimal,
    #[serde(rename = "ATR")]
    pub atr: Decimal,
    #[serde(rename = "RollingStd10")]
    pub rolling_std10: Decimal,
    #[serde(rename = "RollingStd50")]
    pub rolling_std50: Decimal,
    #[serde(rename = "GoldenCross")]
    pub golden_cross: bool,
    #[serde(rename = "DeathCross")]
    pub death_cross: bool,
    #[serde(rename = "PriceCrossSMA10Up")]
    pub price_cross_sma10_up: bool,
    #[serde(rename = "PriceCrossSMA10Down")]
    pub price_cross_sma10_down: bool,
    #[serde(rename = "PriceCrossSMA50Up")]
    pub price_cross_sma50_up: bool,
    #[serde(rename = "PriceCrossSMA50Down")]
    pub price_cross_sma50_down: bool,
    #[serde(rename = "PriceCrossSMA200Up")]
    pub price_cross_sma200_up: bool,
    #[serde(rename = "PriceCrossSMA200Down")]
    pub price_cross_sma200_down: bool,
    #[serde(rename = "SMA10Up")]
    pub sma10_up: bool,
    #[serde(rename = "SMA50Up")]
    pub sma50_up: bool,
    #[serde(rename = "SMA200Up")]
    pub sma200_up: bool,
    #[serde(rename = "SMA50AboveSMA200")]
    pub sma50_above_sma200: bool,
    #[serde(rename = "PriceDistanceSMA10")]
    pub price_distance_sma10: Decimal,
    #[serde(rename = "PriceDistanceSMA50")]
    pub price_distance_sma50: Decimal,
    #[serde(rename = "PriceDistanceSMA200")]
    pub price_distance_sma200: Decimal,
}

impl IndicatorRow {
    pub fn from_bar(bar: &OhlcvBar) -> Self {
        IndicatorRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ..Default::default()
        }
    }

    pub fn bar(&self) -> OhlcvBar {
        OhlcvBar {
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

pub fn compute_indicators(bars: &[OhlcvBar]) -> Vec<IndicatorRow> {
    let sma10 = calculate_sma(bars, 10);
    let sma50 = calculate_sma(bars, 50);
    let sma200 = calculate_sma(bars, 200);
    let ema5 = calculate_ema(bars, 5);
    let ema10 = calculate_ema(bars, 10);
    let ema20 = calculate_ema(bars, 20);
    let ema50 = calculate_ema(bars, 50);
    let ema200 = calculate_ema(bars, 200);
    let rsi9 = calculate_rsi(bars, 9);
    let rsi14 = calculate_rsi(bars, 14);
    let rsi25 = calculate_rsi(bars, 25);
    let stochastic = calculate_stochastic(bars, K_PERIOD, D_PERIOD);
    let macd = calculate_macd(bars);
    let cmf = calculate_cmf(bars, CMF_PERIOD);
    let obv = calculate_obv(bars);
    let obv_roc = calculate_obv_roc(&obv, OBV_ROC_PERIOD);
    let psar1 = calculate_psar(bars, PsarParams::PRIMARY);
    let psar2 = calculate_psar(bars, PsarParams::SECONDARY);
    let atr = calculate_atr(bars, ATR_PERIOD);
    let std10 = calculate_stddev(bars, 10);
    let std50 = calculate_stddev(bars, 50);

    let averages: Vec<AveragePoint> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| AveragePoint {
            close: bar.close,
            sma10: sma10.simple_at(i),
            sma50: sma50.simple_at(i),
            sma200: sma200.simple_at(i),
        })
        .collect();
    let crossovers = calculate_crossovers(&averages);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let (stoch_k, stoch_d) = stochastic.stochastic_at(i);
            let (macd_line, macd_signal, macd_hist) = macd.macd_at(i);
            let flags = crossovers[i];

            IndicatorRow {
                sma10: averages[i].sma10,
                sma50: averages[i].sma50,
                sma200: averages[i].sma200,
                ema5: ema5.simple_at(i),
                ema10: ema10.simple_at(i),
                ema20: ema20.simple_at(i),
                ema50: ema50.simple_at(i),
                ema200: ema200.simple_at(i),
                rsi9: rsi9.simple_at(i),
                rsi14: rsi14.simple_at(i),
                rsi25: rsi25.simple_at(i),
                stoch_k,
                stoch_d,
                macd: macd_line,
                macd_signal,
                macd_hist,
                cmf20: cmf.simple_at(i),
                obv: obv.volume_at(i),
                obv_roc: obv_roc.simple_at(i),
                psar1: psar1.simple_at(i),
                psar2: psar2.simple_at(i),
                atr: atr.simple_at(i),
                rolling_std10: std10.simple_at(i),
                rolling_std50: std50.simple_at(i),
                golden_cross: flags.golden_cross,
                death_cross: flags.death_cross,
                price_cross_sma10_up: flags.price_cross_sma10.up,
                price_cross_sma10_down: flags.price_cross_sma10.down,
                price_cross_sma50_up: flags.price_cross_sma50.up,
                price_cross_sma50_down: flags.price_cross_sma50.down,
                price_cross_sma200_up: flags.price_cross_sma200.up,
                price_cross_sma200_down: flags.price_cross_sma200.down,
                sma10_up: flags.sma10_up,
                sma50_up: flags.sma50_up,
                sma200_up: flags.sma200_up,
                sma50_above_sma200: flags.sma50_above_sma200,
                price_distance_sma10: flags.price_distance_sma10,
                price_distance_sma50: flags.price_distance_sma50,
                price_distance_sma200: flags.price_distance_sma200,
                ..IndicatorRow::from_bar(bar)
            }
        })
        .collect()
}
