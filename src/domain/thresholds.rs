//! Per-strategy numeric thresholds.
//!
//! A [`ThresholdTable`] is built once (defaults or from config) and passed by
//! reference into classification.

use crate::domain::error::SigtraderError;
use crate::ports::config_port::ConfigPort;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const RSI_SECTION: &str = "thresholds.rsi";
pub const RSI2_SECTION: &str = "thresholds.rsi2";
pub const CMF_SECTION: &str = "thresholds.cmf";
pub const OBV_ROC_SECTION: &str = "thresholds.obv_roc";
pub const MACD_HIST_SECTION: &str = "thresholds.macd_hist";

pub const LEVEL_KEYS: [&str; 6] = [
    "strong_buy",
    "buy",
    "weak_buy",
    "weak_sell",
    "sell",
    "strong_sell",
];

/// Six ordered boundaries for a single-indicator ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub strong_buy: Decimal,
    pub buy: Decimal,
    pub weak_buy: Decimal,
    pub weak_sell: Decimal,
    pub sell: Decimal,
    pub strong_sell: Decimal,
}

impl Levels {
    pub fn as_array(&self) -> [Decimal; 6] {
        [
            self.strong_buy,
            self.buy,
            self.weak_buy,
            self.weak_sell,
            self.sell,
            self.strong_sell,
        ]
    }

    fn from_config(
        config: &dyn ConfigPort,
        section: &str,
        defaults: Levels,
    ) -> Result<Levels, SigtraderError> {
        let get = |key: &str, default: Decimal| config.get_decimal(section, key, default);
        Ok(Levels {
            strong_buy: get("strong_buy", defaults.strong_buy)?,
            buy: get("buy", defaults.buy)?,
            weak_buy: get("weak_buy", defaults.weak_buy)?,
            weak_sell: get("weak_sell", defaults.weak_sell)?,
            sell: get("sell", defaults.sell)?,
            strong_sell: get("strong_sell", defaults.strong_sell)?,
        })
    }
}

/// Histogram magnitude boundaries for the MACD ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdHistLevels {
    pub strong: Decimal,
    pub buy: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    pub rsi: Levels,
    pub rsi2: Levels,
    pub cmf: Levels,
    pub obv_roc: Levels,
    pub macd_hist: MacdHistLevels,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        ThresholdTable {
            rsi: Levels {
                strong_buy: dec!(20),
                buy: dec!(30),
                weak_buy: dec!(40),
                weak_sell: dec!(60),
                sell: dec!(70),
                strong_sell: dec!(80),
            },
            rsi2: Levels {
                strong_buy: dec!(15),
                buy: dec!(25),
                weak_buy: dec!(35),
                weak_sell: dec!(65),
                sell: dec!(75),
                strong_sell: dec!(85),
            },
            cmf: Levels {
                strong_buy: dec!(0.2),
                buy: dec!(0.1),
                weak_buy: dec!(0.05),
                weak_sell: dec!(-0.05),
                sell: dec!(-0.1),
                strong_sell: dec!(-0.2),
            },
            obv_roc: Levels {
                strong_buy: dec!(10),
                buy: dec!(5),
                weak_buy: dec!(2),
                weak_sell: dec!(-2),
                sell: dec!(-5),
                strong_sell: dec!(-10),
            },
            macd_hist: MacdHistLevels {
                strong: dec!(0.1),
                buy: dec!(0.05),
            },
        }
    }
}

impl ThresholdTable {
    /// Read every threshold section, falling back to the default for absent keys.
    ///
    /// Malformed numbers are rejected; ordering between levels is checked by
    /// [`validate_threshold_config`](crate::domain::config_validation::validate_threshold_config).
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SigtraderError> {
        let defaults = ThresholdTable::default();
        let macd =
            |key: &str, default: Decimal| config.get_decimal(MACD_HIST_SECTION, key, default);
        Ok(ThresholdTable {
            rsi: Levels::from_config(config, RSI_SECTION, defaults.rsi)?,
            rsi2: Levels::from_config(config, RSI2_SECTION, defaults.rsi2)?,
            cmf: Levels::from_config(config, CMF_SECTION, defaults.cmf)?,
            obv_roc: Levels::from_config(config, OBV_ROC_SECTION, defaults.obv_roc)?,
            macd_hist: MacdHistLevels {
                strong: macd("strong", defaults.macd_hist.strong)?,
                buy: macd("buy", defaults.macd_hist.buy)?,
            },
        })
    }
}
