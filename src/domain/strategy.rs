//! Named strategies and per-bar signal classification.
//!
//! Every strategy is a threshold ladder over the current bar's indicator values
//! only. A zero indicator value means "unset" and leaves the strategy at Hold.

use crate::domain::config_validation::BACKTEST_SECTION;
use crate::domain::consensus::apply_consensus;
use crate::domain::error::SigtraderError;
use crate::domain::indicator_row::IndicatorRow;
use crate::domain::signal::Signal;
use crate::domain::thresholds::{Levels, MacdHistLevels, ThresholdTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyId {
    Rsi,
    Rsi2,
    Rsi14ObvRoc,
    RsiMacd,
    RsiCmf,
    RsiObv,
    Obv,
    Macd,
    Cmf,
    Ema5Psar,
    Ema5Psar2,
    RollingStd10,
    RollingStd50,
}

impl StrategyId {
    pub const COUNT: usize = 13;

    pub const ALL: [StrategyId; StrategyId::COUNT] = [
        StrategyId::Rsi,
        StrategyId::Rsi2,
        StrategyId::Rsi14ObvRoc,
        StrategyId::RsiMacd,
        StrategyId::RsiCmf,
        StrategyId::RsiObv,
        StrategyId::Obv,
        StrategyId::Macd,
        StrategyId::Cmf,
        StrategyId::Ema5Psar,
        StrategyId::Ema5Psar2,
        StrategyId::RollingStd10,
        StrategyId::RollingStd50,
    ];

    /// Stable display name; also the column header in signal output.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyId::Rsi => "RSI Strategy",
            StrategyId::Rsi2 => "RSI Strategy2",
            StrategyId::Rsi14ObvRoc => "RSI14_OBV_RoC Strategy",
            StrategyId::RsiMacd => "RSIMACD Strategy",
            StrategyId::RsiCmf => "RSICMF Strategy",
            StrategyId::RsiObv => "RSI OBV Strategy",
            StrategyId::Obv => "OBV Strategy",
            StrategyId::Macd => "MACD Strategy",
            StrategyId::Cmf => "CMF Strategy",
            StrategyId::Ema5Psar => "EMA5 PSAR Strategy",
            StrategyId::Ema5Psar2 => "EMA5 PSAR Strategy2",
            StrategyId::RollingStd10 => "Rolling Std10 Strategy",
            StrategyId::RollingStd50 => "Rolling Std50 Strategy",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Grade one bar under this strategy.
    pub fn classify(&self, row: &IndicatorRow, thresholds: &ThresholdTable) -> Signal {
        match self {
            StrategyId::Rsi => rsi_ladder(row.rsi14, &thresholds.rsi),
            StrategyId::Rsi2 => rsi_ladder(row.rsi14, &thresholds.rsi2),
            StrategyId::Rsi14ObvRoc | StrategyId::RsiObv => {
                rsi_confirmed(row.rsi14, row.obv_roc, &thresholds.obv_roc)
            }
            StrategyId::RsiMacd => rsi_macd(row, &thresholds.macd_hist),
            StrategyId::RsiCmf => rsi_confirmed(row.rsi14, row.cmf20, &thresholds.cmf),
            StrategyId::Obv => flow_ladder(row.obv_roc, &thresholds.obv_roc),
            StrategyId::Macd => macd_ladder(row, &thresholds.macd_hist),
            StrategyId::Cmf => flow_ladder(row.cmf20, &thresholds.cmf),
            StrategyId::Ema5Psar => trend_following(row.close, row.ema5, row.psar1),
            StrategyId::Ema5Psar2 => trend_following(row.close, row.ema5, row.psar2),
            StrategyId::RollingStd10 => band_distance(row.close, row.sma10, row.rolling_std10),
            StrategyId::RollingStd50 => band_distance(row.close, row.sma50, row.rolling_std50),
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for StrategyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl FromStr for StrategyId {
    type Err = SigtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        StrategyId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SigtraderError::UnknownStrategy {
                name: trimmed.to_string(),
            })
    }
}

/// Parse a comma-separated strategy list; `all` selects every strategy.
///
/// Empty entries and repeated strategies are rejected.
pub fn parse_strategies(input: &str) -> Result<Vec<StrategyId>, SigtraderError> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(StrategyId::ALL.to_vec());
    }

    let mut ids = Vec::new();
    for token in input.split(',') {
        if token.trim().is_empty() {
            return Err(SigtraderError::invalid(
                BACKTEST_SECTION,
                "strategies",
                "empty entry in strategy list",
            ));
        }
        let id: StrategyId = token.parse()?;
        if ids.contains(&id) {
            return Err(SigtraderError::invalid(
                BACKTEST_SECTION,
                "strategies",
                format!("duplicate strategy: {id}"),
            ));
        }
        ids.push(id);
    }
    Ok(ids)
}

/// One signal per strategy for a single bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategySignals([Signal; StrategyId::COUNT]);

impl StrategySignals {
    pub fn get(&self, id: StrategyId) -> Signal {
        self.0[id.index()]
    }

    pub fn set(&mut self, id: StrategyId, signal: Signal) {
        self.0[id.index()] = signal;
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyId, Signal)> + '_ {
        StrategyId::ALL.into_iter().map(|id| (id, self.get(id)))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Signal> {
        self.0.iter_mut()
    }
}

/// An indicator row together with its per-strategy signals.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRow {
    pub indicators: IndicatorRow,
    pub signals: StrategySignals,
}

pub fn classify_row(row: &IndicatorRow, thresholds: &ThresholdTable) -> StrategySignals {
    let mut signals = StrategySignals::default();
    for id in StrategyId::ALL {
        signals.set(id, id.classify(row, thresholds));
    }
    signals
}

/// Classify every row, then apply consensus smoothing.
pub fn generate_signals(rows: Vec<IndicatorRow>, thresholds: &ThresholdTable) -> Vec<StrategyRow> {
    let mut out: Vec<StrategyRow> = rows
        .into_iter()
        .map(|indicators| {
            let signals = classify_row(&indicators, thresholds);
            StrategyRow {
                indicators,
                signals,
            }
        })
        .collect();
    apply_consensus(&mut out);
    out
}

/// Low values buy: below strong_buy / buy / weak_buy, above strong_sell / sell / weak_sell.
fn rsi_ladder(rsi: Decimal, levels: &Levels) -> Signal {
    if rsi.is_zero() {
        Signal::Hold
    } else if rsi < levels.strong_buy {
        Signal::StrongBuy
    } else if rsi < levels.buy {
        Signal::Buy
    } else if rsi < levels.weak_buy {
        Signal::WeakBuy
    } else if rsi > levels.strong_sell {
        Signal::StrongSell
    } else if rsi > levels.sell {
        Signal::Sell
    } else if rsi > levels.weak_sell {
        Signal::WeakSell
    } else {
        Signal::Hold
    }
}

/// High values buy: above strong_buy / buy / weak_buy, below strong_sell / sell / weak_sell.
fn flow_ladder(value: Decimal, levels: &Levels) -> Signal {
    if value.is_zero() {
        Signal::Hold
    } else if value > levels.strong_buy {
        Signal::StrongBuy
    } else if value > levels.buy {
        Signal::Buy
    } else if value > levels.weak_buy {
        Signal::WeakBuy
    } else if value < levels.strong_sell {
        Signal::StrongSell
    } else if value < levels.sell {
        Signal::Sell
    } else if value < levels.weak_sell {
        Signal::WeakSell
    } else {
        Signal::Hold
    }
}

fn macd_ladder(row: &IndicatorRow, levels: &MacdHistLevels) -> Signal {
    if row.macd.is_zero() || row.macd_signal.is_zero() {
        return Signal::Hold;
    }
    let magnitude = row.macd_hist.abs();
    if row.macd > row.macd_signal {
        if magnitude > levels.strong {
            Signal::StrongBuy
        } else if magnitude > levels.buy {
            Signal::Buy
        } else {
            Signal::WeakBuy
        }
    } else if row.macd < row.macd_signal {
        if magnitude > levels.strong {
            Signal::StrongSell
        } else if magnitude > levels.buy {
            Signal::Sell
        } else {
            Signal::WeakSell
        }
    } else {
        Signal::Hold
    }
}

/// RSI depth refines a direction already agreed by a second indicator.
fn rsi_refined(rsi: Decimal, bullish: bool, strong_confirmed: bool) -> Signal {
    if bullish {
        if rsi < dec!(30) && strong_confirmed {
            Signal::StrongBuy
        } else if rsi < dec!(50) {
            Signal::Buy
        } else {
            Signal::WeakBuy
        }
    } else if rsi > dec!(70) && strong_confirmed {
        Signal::StrongSell
    } else if rsi > dec!(50) {
        Signal::Sell
    } else {
        Signal::WeakSell
    }
}

fn rsi_macd(row: &IndicatorRow, levels: &MacdHistLevels) -> Signal {
    let rsi = row.rsi14;
    if row.macd.is_zero() || row.macd_signal.is_zero() || rsi.is_zero() {
        return Signal::Hold;
    }
    let strong = row.macd_hist.abs() > levels.strong;
    if row.macd > row.macd_signal && rsi < dec!(70) {
        rsi_refined(rsi, true, strong)
    } else if row.macd < row.macd_signal && rsi > dec!(30) {
        rsi_refined(rsi, false, strong)
    } else {
        Signal::Hold
    }
}

/// RSI combined with a flow indicator (CMF or OBV rate of change) crossing its buy/sell level.
fn rsi_confirmed(rsi: Decimal, flow: Decimal, levels: &Levels) -> Signal {
    if rsi.is_zero() || flow.is_zero() {
        return Signal::Hold;
    }
    if flow > levels.buy && rsi < dec!(70) {
        rsi_refined(rsi, true, true)
    } else if flow < levels.sell && rsi > dec!(30) {
        rsi_refined(rsi, false, true)
    } else {
        Signal::Hold
    }
}

/// Price must sit on the same side of both EMA5 and the SAR; distance from EMA5 sets strength.
fn trend_following(price: Decimal, ema5: Decimal, psar: Decimal) -> Signal {
    if price.is_zero() || ema5.is_zero() || psar.is_zero() {
        return Signal::Hold;
    }
    let distance = (price - ema5) / ema5 * dec!(100);
    if price > ema5 && price > psar {
        if distance > dec!(5) {
            Signal::StrongBuy
        } else if distance > dec!(2) {
            Signal::Buy
        } else {
            Signal::WeakBuy
        }
    } else if price < ema5 && price < psar {
        if distance < dec!(-5) {
            Signal::StrongSell
        } else if distance < dec!(-2) {
            Signal::Sell
        } else {
            Signal::WeakSell
        }
    } else {
        Signal::Hold
    }
}

fn band_distance(price: Decimal, sma: Decimal, std: Decimal) -> Signal {
    if price.is_zero() || sma.is_zero() || std.is_zero() {
        return Signal::Hold;
    }
    if price < sma - std * dec!(2.5) {
        Signal::StrongBuy
    } else if price < sma - std * dec!(2) {
        Signal::Buy
    } else if price < sma - std * dec!(0.5) {
        Signal::WeakBuy
    } else if price > sma + std * dec!(2.5) {
        Signal::StrongSell
    } else if price > sma + std * dec!(2) {
        Signal::Sell
    } else if price > sma + std * dec!(0.5) {
        Signal::WeakSell
    } else {
        Signal::Hold
    }
}
