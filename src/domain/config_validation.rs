//! Configuration validation.
//!
//! Validates the `[backtest]` and `[thresholds.*]` sections before any run
//! starts. A config that fails here never reaches the engine.

use crate::domain::error::SigtraderError;
use crate::domain::strategy::parse_strategies;
use crate::domain::thresholds::{
    CMF_SECTION, LEVEL_KEYS, Levels, MACD_HIST_SECTION, OBV_ROC_SECTION, RSI_SECTION,
    RSI2_SECTION, ThresholdTable,
};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

pub const BACKTEST_SECTION: &str = "backtest";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_initial_cash(config)?;
    validate_commission(config)?;
    validate_max_positions(config)?;
    validate_position_size(config)?;
    validate_stop_loss(config)?;
    validate_take_profit(config)?;
    validate_max_holding_days(config)?;
    config.get_bool(BACKTEST_SECTION, "use_signal_strength", true)?;
    validate_dates(config)?;
    validate_tickers(config)?;
    validate_strategies(config)?;
    Ok(())
}

/// Check every threshold profile, falling back to defaults for absent keys.
pub fn validate_threshold_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let table = ThresholdTable::from_config(config)?;
    validate_ascending(RSI_SECTION, &table.rsi)?;
    validate_ascending(RSI2_SECTION, &table.rsi2)?;
    validate_descending(CMF_SECTION, &table.cmf)?;
    validate_descending(OBV_ROC_SECTION, &table.obv_roc)?;

    if table.macd_hist.buy < Decimal::ZERO {
        return Err(SigtraderError::invalid(
            MACD_HIST_SECTION,
            "buy",
            "buy must be non-negative",
        ));
    }
    if table.macd_hist.strong < table.macd_hist.buy {
        return Err(SigtraderError::invalid(
            MACD_HIST_SECTION,
            "strong",
            "strong must be at least buy",
        ));
    }
    Ok(())
}

pub fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, SigtraderError> {
    match config.get_string(BACKTEST_SECTION, key) {
        None => Err(SigtraderError::missing(BACKTEST_SECTION, key)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SigtraderError::invalid(
                BACKTEST_SECTION,
                key,
                format!("invalid {key} format, expected YYYY-MM-DD"),
            )
        }),
    }
}

/// Split a comma list of instrument symbols, upper-cased.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, SigtraderError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SigtraderError::invalid(
                BACKTEST_SECTION,
                "tickers",
                "empty entry in ticker list",
            ));
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(SigtraderError::invalid(
                BACKTEST_SECTION,
                "tickers",
                format!("duplicate ticker: {ticker}"),
            ));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

fn validate_ascending(section: &str, levels: &Levels) -> Result<(), SigtraderError> {
    let values = levels.as_array();
    for (i, pair) in values.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(SigtraderError::invalid(
                section,
                LEVEL_KEYS[i + 1],
                format!("{} must be greater than {}", LEVEL_KEYS[i + 1], LEVEL_KEYS[i]),
            ));
        }
    }
    Ok(())
}

fn validate_descending(section: &str, levels: &Levels) -> Result<(), SigtraderError> {
    let values = levels.as_array();
    for (i, pair) in values.windows(2).enumerate() {
        if pair[0] <= pair[1] {
            return Err(SigtraderError::invalid(
                section,
                LEVEL_KEYS[i + 1],
                format!("{} must be less than {}", LEVEL_KEYS[i + 1], LEVEL_KEYS[i]),
            ));
        }
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_decimal(BACKTEST_SECTION, "initial_cash", dec!(100000))?;
    if value <= Decimal::ZERO {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_decimal(BACKTEST_SECTION, "commission_per_trade", Decimal::ZERO)?;
    if value < Decimal::ZERO {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "commission_per_trade",
            "commission_per_trade must be non-negative",
        ));
    }
    Ok(())
}

fn validate_max_positions(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if config.get_int(BACKTEST_SECTION, "max_positions", 10)? < 1 {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "max_positions",
            "max_positions must be at least 1",
        ));
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_decimal(BACKTEST_SECTION, "position_size_percent", dec!(10))?;
    if value <= Decimal::ZERO || value > dec!(100) {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "position_size_percent",
            "position_size_percent must be in (0, 100]",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_decimal(BACKTEST_SECTION, "stop_loss_percent", dec!(5))?;
    if value <= Decimal::ZERO || value >= dec!(100) {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "stop_loss_percent",
            "stop_loss_percent must be in (0, 100)",
        ));
    }
    Ok(())
}

fn validate_take_profit(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_decimal(BACKTEST_SECTION, "take_profit_percent", dec!(15))?;
    if value <= Decimal::ZERO {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "take_profit_percent",
            "take_profit_percent must be positive",
        ));
    }
    Ok(())
}

fn validate_max_holding_days(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if config.get_int(BACKTEST_SECTION, "max_holding_days", 30)? < 1 {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "max_holding_days",
            "max_holding_days must be at least 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date > end_date {
        return Err(SigtraderError::invalid(
            BACKTEST_SECTION,
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    match config.get_string(BACKTEST_SECTION, "tickers") {
        Some(s) if !s.trim().is_empty() => parse_tickers(&s).map(|_| ()),
        _ => Err(SigtraderError::missing(BACKTEST_SECTION, "tickers")),
    }
}

fn validate_strategies(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if let Some(raw) = config.get_string(BACKTEST_SECTION, "strategies") {
        parse_strategies(&raw)?;
    }
    Ok(())
}
