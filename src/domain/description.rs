//! Human-readable interpretation of an indicator row.
//!
//! Each category yields a bias and a short headline, or nothing when the
//! category's inputs are still unset.

use crate::domain::indicator_row::IndicatorRow;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Buy,
    Sell,
    NeutralBullish,
    NeutralBearish,
    Neutral,
    HighVolatility,
    ModerateVolatility,
    LowVolatility,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Bias::Buy => "Buy",
            Bias::Sell => "Sell",
            Bias::NeutralBullish => "Neutral-Bullish",
            Bias::NeutralBearish => "Neutral-Bearish",
            Bias::Neutral => "Neutral",
            Bias::HighVolatility => "High Volatility",
            Bias::ModerateVolatility => "Moderate Volatility",
            Bias::LowVolatility => "Low Volatility",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Description {
    pub bias: Bias,
    pub headline: &'static str,
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.bias, self.headline)
    }
}

const fn describe(bias: Bias, headline: &'static str) -> Option<Description> {
    Some(Description { bias, headline })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowDescriptions {
    pub moving_average_cross: Option<Description>,
    pub price_sma10: Option<Description>,
    pub price_major_sma: Option<Description>,
    pub rsi: Option<Description>,
    pub stochastic: Option<Description>,
    pub cmf: Option<Description>,
    pub macd: Option<Description>,
    pub obv: Option<Description>,
    pub psar: Option<Description>,
    pub atr: Option<Description>,
}

impl RowDescriptions {
    /// All present descriptions joined with "; ".
    pub fn summary(&self) -> String {
        [
            self.moving_average_cross,
            self.price_sma10,
            self.price_major_sma,
            self.rsi,
            self.stochastic,
            self.cmf,
            self.macd,
            self.obv,
            self.psar,
            self.atr,
        ]
        .iter()
        .flatten()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
    }
}

pub fn describe_row(row: &IndicatorRow) -> RowDescriptions {
    RowDescriptions {
        moving_average_cross: moving_average_cross(row),
        price_sma10: price_sma10(row),
        price_major_sma: price_major_sma(row),
        rsi: rsi(row.rsi14),
        stochastic: stochastic(row.stoch_k, row.stoch_d),
        cmf: cmf(row.cmf20),
        macd: macd(row),
        obv: obv(row),
        psar: psar(row),
        atr: atr(row),
    }
}

fn moving_average_cross(row: &IndicatorRow) -> Option<Description> {
    if row.golden_cross {
        describe(Bias::Buy, "Golden Cross: SMA50 crossed above SMA200")
    } else if row.death_cross {
        describe(Bias::Sell, "Death Cross: SMA50 crossed below SMA200")
    } else {
        describe(Bias::Neutral, "No significant SMA50/SMA200 cross")
    }
}

fn price_sma10(row: &IndicatorRow) -> Option<Description> {
    if row.price_cross_sma10_up {
        describe(Bias::Buy, "Price crossed above SMA10")
    } else if row.price_cross_sma10_down {
        describe(Bias::Sell, "Price crossed below SMA10")
    } else {
        describe(Bias::Neutral, "Price oscillating around SMA10")
    }
}

fn price_major_sma(row: &IndicatorRow) -> Option<Description> {
    if row.price_cross_sma50_up || row.price_cross_sma200_up {
        describe(Bias::Buy, "Price crossed above a major SMA")
    } else if row.price_cross_sma50_down || row.price_cross_sma200_down {
        describe(Bias::Sell, "Price crossed below a major SMA")
    } else {
        describe(Bias::Neutral, "Price respecting major SMA levels")
    }
}

fn rsi(value: Decimal) -> Option<Description> {
    if value.is_zero() {
        None
    } else if value > dec!(70) {
        describe(Bias::Sell, "RSI overbought above 70")
    } else if value < dec!(30) {
        describe(Bias::Buy, "RSI oversold below 30")
    } else if value > dec!(50) {
        describe(Bias::NeutralBullish, "RSI above midline")
    } else {
        describe(Bias::NeutralBearish, "RSI below midline")
    }
}

fn stochastic(k: Decimal, d: Decimal) -> Option<Description> {
    if k.is_zero() || d.is_zero() {
        None
    } else if k > dec!(80) && d > dec!(80) {
        describe(Bias::Sell, "Stochastic overbought")
    } else if k < dec!(20) && d < dec!(20) {
        describe(Bias::Buy, "Stochastic oversold")
    } else if k > d {
        describe(Bias::NeutralBullish, "%K above %D")
    } else {
        describe(Bias::NeutralBearish, "%K below %D")
    }
}

fn cmf(value: Decimal) -> Option<Description> {
    if value.is_zero() {
        None
    } else if value > dec!(0.1) {
        describe(Bias::Buy, "Strong money flow")
    } else if value < dec!(-0.1) {
        describe(Bias::Sell, "Weak money flow")
    } else if value > Decimal::ZERO {
        describe(Bias::NeutralBullish, "Mild accumulation")
    } else {
        describe(Bias::NeutralBearish, "Mild distribution")
    }
}

fn macd(row: &IndicatorRow) -> Option<Description> {
    if row.macd.is_zero() || row.macd_signal.is_zero() {
        None
    } else if row.macd > row.macd_signal && row.macd_hist > Decimal::ZERO {
        describe(Bias::Buy, "MACD bullish with positive histogram")
    } else if row.macd < row.macd_signal && row.macd_hist < Decimal::ZERO {
        describe(Bias::Sell, "MACD bearish with negative histogram")
    } else if row.macd > row.macd_signal {
        describe(Bias::NeutralBullish, "MACD above signal, momentum weakening")
    } else {
        describe(Bias::NeutralBearish, "MACD below signal, momentum weakening")
    }
}

fn obv(row: &IndicatorRow) -> Option<Description> {
    if row.obv == 0 {
        None
    } else if row.obv_roc > dec!(10) {
        describe(Bias::Buy, "Strong volume accumulation")
    } else if row.obv_roc < dec!(-10) {
        describe(Bias::Sell, "Strong volume distribution")
    } else if row.obv_roc > Decimal::ZERO {
        describe(Bias::NeutralBullish, "Mild volume accumulation")
    } else {
        describe(Bias::NeutralBearish, "Mild volume distribution")
    }
}

fn psar(row: &IndicatorRow) -> Option<Description> {
    if row.psar1.is_zero() {
        None
    } else if row.close > row.psar1 {
        describe(Bias::Buy, "Price above parabolic SAR")
    } else {
        describe(Bias::Sell, "Price below parabolic SAR")
    }
}

fn atr(row: &IndicatorRow) -> Option<Description> {
    if row.atr.is_zero() || row.close.is_zero() {
        return None;
    }
    let percent = row.atr / row.close * dec!(100);
    if percent > dec!(5) {
        describe(Bias::HighVolatility, "ATR above 5% of price")
    } else if percent > dec!(2) {
        describe(Bias::ModerateVolatility, "ATR between 2% and 5% of price")
    } else {
        describe(Bias::LowVolatility, "ATR below 2% of price")
    }
}
