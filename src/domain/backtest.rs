//! Backtest engine and event loop.
//!
//! One replay owns one [`Portfolio`] and walks a date-ordered [`MarketEvent`]
//! stream strictly in order. Strategies are independent of each other, so
//! [`run_all`] replays them in parallel.

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::config_validation::{
    BACKTEST_SECTION, parse_date, parse_tickers, validate_backtest_config,
};
use super::error::SigtraderError;
use super::execution::{ExecutionConfig, check_exit_conditions, enter_long, exit_position};
use super::market_stream::{InstrumentRows, MarketEvent, merge_stream};
use super::metrics::BacktestResult;
use super::portfolio::{Portfolio, PortfolioSnapshot};
use super::position::{ExitReason, Trade};
use super::signal::Action;
use super::strategy::{StrategyId, parse_strategies};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub strategies: Vec<StrategyId>,
    pub instruments: Vec<String>,
    pub execution: ExecutionConfig,
}

impl BacktestConfig {
    /// Validate then read the `[backtest]` section.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SigtraderError> {
        validate_backtest_config(config)?;

        let defaults = ExecutionConfig::default();
        let read = |key: &str, default: Decimal| config.get_decimal(BACKTEST_SECTION, key, default);

        let execution = ExecutionConfig {
            commission_per_trade: read("commission_per_trade", defaults.commission_per_trade)?,
            max_positions: config.get_int(
                BACKTEST_SECTION,
                "max_positions",
                defaults.max_positions as i64,
            )? as usize,
            position_size_percent: read("position_size_percent", defaults.position_size_percent)?,
            stop_loss_percent: read("stop_loss_percent", defaults.stop_loss_percent)?,
            take_profit_percent: read("take_profit_percent", defaults.take_profit_percent)?,
            max_holding_days: config.get_int(
                BACKTEST_SECTION,
                "max_holding_days",
                defaults.max_holding_days,
            )?,
            use_signal_strength: config.get_bool(
                BACKTEST_SECTION,
                "use_signal_strength",
                defaults.use_signal_strength,
            )?,
        };

        let strategies = match config.get_string(BACKTEST_SECTION, "strategies") {
            Some(list) => parse_strategies(&list)?,
            None => StrategyId::ALL.to_vec(),
        };
        let tickers = config
            .get_string(BACKTEST_SECTION, "tickers")
            .ok_or_else(|| SigtraderError::missing(BACKTEST_SECTION, "tickers"))?;

        Ok(BacktestConfig {
            initial_cash: read("initial_cash", dec!(100000))?,
            start_date: parse_date(config, "start_date")?,
            end_date: parse_date(config, "end_date")?,
            strategies,
            instruments: parse_tickers(&tickers)?,
            execution,
        })
    }
}

/// Everything one strategy's replay produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    pub strategy: StrategyId,
    pub trades: Vec<Trade>,
    pub snapshots: Vec<PortfolioSnapshot>,
    pub result: BacktestResult,
}

/// Replay `events` for one strategy.
///
/// Per event: mark the instrument's open position to the close, act on the
/// signal (a Hold runs the exit checks), then snapshot the portfolio. Positions
/// still open at the end are left open.
pub fn run_backtest(
    events: &[MarketEvent],
    strategy: StrategyId,
    initial_cash: Decimal,
    config: &ExecutionConfig,
) -> BacktestRun {
    let mut portfolio = Portfolio::new(initial_cash);

    for (step, event) in events.iter().enumerate() {
        portfolio.mark_to_market(&event.instrument, event.bar.close);

        match event.signal.action() {
            Action::Buy { confidence } => {
                enter_long(
                    &mut portfolio,
                    &event.instrument,
                    strategy,
                    &event.bar,
                    confidence,
                    config,
                );
            }
            Action::Sell { .. } => {
                exit_position(
                    &mut portfolio,
                    &event.instrument,
                    event.bar.date,
                    event.bar.close,
                    event.signal.label(),
                    ExitReason::Signal,
                    config,
                );
            }
            Action::Hold => {
                check_exit_conditions(
                    &mut portfolio,
                    &event.instrument,
                    &event.bar,
                    event.signal,
                    config,
                );
            }
        }

        portfolio.record_snapshot(event.bar.date, step);
    }

    let result = BacktestResult::compute(strategy, &portfolio);
    tracing::info!(
        strategy = strategy.name(),
        events = events.len(),
        trades = result.total_trades,
        total_return = %result.total_return,
        final_value = %result.final_value,
        "backtest complete"
    );

    BacktestRun {
        strategy,
        trades: portfolio.trades,
        snapshots: portfolio.snapshots,
        result,
    }
}

/// Replay every configured strategy over the same instruments, in parallel.
///
/// Output order follows `config.strategies`.
pub fn run_all(instruments: &[InstrumentRows], config: &BacktestConfig) -> Vec<BacktestRun> {
    config
        .strategies
        .par_iter()
        .map(|&strategy| {
            let events = merge_stream(instruments, strategy, config.start_date, config.end_date);
            tracing::debug!(
                strategy = strategy.name(),
                events = events.len(),
                "merged event stream"
            );
            run_backtest(&events, strategy, config.initial_cash, &config.execution)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::signal::Signal;
    use proptest::prelude::*;

    fn date(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i)
    }

    fn event(i: i64, instrument: &str, close: Decimal, signal: Signal) -> MarketEvent {
        MarketEvent {
            instrument: instrument.to_string(),
            bar: OhlcvBar {
                date: date(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            },
            signal,
        }
    }

    fn half_size() -> ExecutionConfig {
        ExecutionConfig {
            position_size_percent: dec!(50),
            use_signal_strength: false,
            ..Default::default()
        }
    }

    #[test]
    fn from_config_reads_every_key() {
        let config = FileConfigAdapter::from_string(
            "[backtest]\ninitial_cash = 25000\ncommission_per_trade = 4.5\nmax_positions = 3\n\
             position_size_percent = 25\nstop_loss_percent = 3\ntake_profit_percent = 9\n\
             max_holding_days = 12\nstart_date = 2023-01-01\nend_date = 2023-12-31\n\
             strategies = MACD Strategy, CMF Strategy\ntickers = bhp,rio\nuse_signal_strength = false\n",
        )
        .unwrap();
        let cfg = BacktestConfig::from_config(&config).unwrap();

        assert_eq!(cfg.initial_cash, dec!(25000));
        assert_eq!(cfg.start_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(cfg.strategies, vec![StrategyId::Macd, StrategyId::Cmf]);
        assert_eq!(cfg.instruments, vec!["BHP", "RIO"]);
        assert_eq!(cfg.execution.commission_per_trade, dec!(4.5));
        assert_eq!(cfg.execution.max_positions, 3);
        assert_eq!(cfg.execution.position_size_percent, dec!(25));
        assert_eq!(cfg.execution.stop_loss_percent, dec!(3));
        assert_eq!(cfg.execution.take_profit_percent, dec!(9));
        assert_eq!(cfg.execution.max_holding_days, 12);
        assert!(!cfg.execution.use_signal_strength);
    }

    #[test]
    fn from_config_defaults() {
        let config = FileConfigAdapter::from_string(
            "[backtest]\nstart_date = 2023-01-01\nend_date = 2023-12-31\ntickers = BHP\n",
        )
        .unwrap();
        let cfg = BacktestConfig::from_config(&config).unwrap();
        assert_eq!(cfg.initial_cash, dec!(100000));
        assert_eq!(cfg.strategies.len(), StrategyId::COUNT);
        assert_eq!(cfg.execution, ExecutionConfig::default());
    }

    #[test]
    fn from_config_rejects_invalid() {
        let config = FileConfigAdapter::from_string(
            "[backtest]\ninitial_cash = -1\nstart_date = 2023-01-01\nend_date = 2023-12-31\ntickers = BHP\n",
        )
        .unwrap();
        assert!(BacktestConfig::from_config(&config).is_err());
    }

    #[test]
    fn from_config_rejects_malformed_int_and_bool() {
        for line in [
            "max_positions = abc",
            "max_positions = 3.5",
            "max_holding_days = ten",
            "use_signal_strength = maybe",
        ] {
            let config = FileConfigAdapter::from_string(&format!(
                "[backtest]\nstart_date = 2023-01-01\nend_date = 2023-12-31\ntickers = BHP\n{line}\n"
            ))
            .unwrap();
            let err = BacktestConfig::from_config(&config).unwrap_err();
            assert!(
                matches!(err, SigtraderError::ConfigInvalid { .. }),
                "{line}: {err:?}"
            );
        }
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let events = vec![
            event(0, "BHP", dec!(100), Signal::StrongBuy),
            event(1, "BHP", dec!(110), Signal::Sell),
        ];
        let run = run_backtest(&events, StrategyId::Rsi, dec!(10000), &half_size());

        assert_eq!(run.trades.len(), 1);
        let trade = &run.trades[0];
        assert_eq!(trade.quantity, 50);
        assert_eq!(trade.pnl, dec!(500));
        assert_eq!(trade.exit_reason, ExitReason::Signal);
        assert_eq!(trade.exit_signal, "Sell");

        assert_eq!(run.snapshots.len(), 2);
        assert_eq!(run.snapshots[0].cash, dec!(5000));
        assert_eq!(run.snapshots[0].total_value, dec!(10000));
        assert_eq!(run.snapshots[0].active_positions, 1);
        assert_eq!(run.snapshots[1].cash, dec!(10500));
        assert_eq!(run.snapshots[1].total_return, dec!(5));
        assert_eq!(run.result.total_trades, 1);
        assert_eq!(run.result.win_rate, dec!(100));
        assert_eq!(run.result.final_value, dec!(10500));
    }

    #[test]
    fn sell_without_position_is_noop() {
        let events = vec![event(0, "BHP", dec!(100), Signal::StrongSell)];
        let run = run_backtest(&events, StrategyId::Rsi, dec!(10000), &half_size());
        assert!(run.trades.is_empty());
        assert_eq!(run.snapshots[0].cash, dec!(10000));
    }

    #[test]
    fn open_positions_are_not_force_closed() {
        let events = vec![
            event(0, "BHP", dec!(100), Signal::Buy),
            event(1, "BHP", dec!(104), Signal::Hold),
        ];
        let run = run_backtest(&events, StrategyId::Rsi, dec!(10000), &half_size());
        assert!(run.trades.is_empty());
        let last = run.snapshots.last().unwrap();
        assert_eq!(last.equity_value, dec!(5200));
        assert_eq!(last.total_value, dec!(10200));
        assert_eq!(run.result.total_trades, 0);
        assert_eq!(run.result.final_value, dec!(10200));
    }

    #[test]
    fn hold_triggers_stop_loss() {
        let mut drop = event(1, "BHP", dec!(96), Signal::Hold);
        drop.bar.low = dec!(90);
        let events = vec![event(0, "BHP", dec!(100), Signal::Buy), drop];
        let run = run_backtest(&events, StrategyId::Rsi, dec!(10000), &half_size());
        assert_eq!(run.trades.len(), 1);
        assert_eq!(run.trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(run.trades[0].exit_price, dec!(95));
    }

    #[test]
    fn other_instrument_does_not_mark_position() {
        let events = vec![
            event(0, "BHP", dec!(100), Signal::Buy),
            event(0, "RIO", dec!(10), Signal::Hold),
            event(1, "RIO", dec!(11), Signal::Hold),
        ];
        let run = run_backtest(&events, StrategyId::Rsi, dec!(10000), &half_size());
        assert!(run.snapshots.iter().all(|s| s.equity_value == dec!(5000)));
        assert_eq!(run.snapshots[2].days_since_start, 2);
    }

    #[test]
    fn run_all_keeps_strategy_order() {
        let config = BacktestConfig {
            initial_cash: dec!(10000),
            start_date: date(0),
            end_date: date(30),
            strategies: vec![StrategyId::RollingStd50, StrategyId::Rsi, StrategyId::Macd],
            instruments: vec!["BHP".into()],
            execution: half_size(),
        };
        let runs = run_all(&[], &config);
        let order: Vec<StrategyId> = runs.iter().map(|r| r.strategy).collect();
        assert_eq!(order, config.strategies);
        assert!(runs.iter().all(|r| r.snapshots.is_empty()));
    }

    fn signal_strategy() -> impl Strategy<Value = Signal> {
        prop::sample::select(Signal::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn cash_never_negative(
            steps in prop::collection::vec((50i64..500, signal_strategy(), 0usize..3), 1..80),
            commission in 0i64..20,
        ) {
            let names = ["BHP", "RIO", "CBA"];
            let events: Vec<MarketEvent> = steps
                .iter()
                .enumerate()
                .map(|(i, (close, signal, which))| {
                    event(i as i64, names[*which], Decimal::from(*close), *signal)
                })
                .collect();
            let config = ExecutionConfig {
                commission_per_trade: Decimal::from(commission),
                position_size_percent: dec!(80),
                max_positions: 2,
                ..Default::default()
            };
            let run = run_backtest(&events, StrategyId::Rsi, dec!(10000), &config);
            for snapshot in &run.snapshots {
                prop_assert!(snapshot.cash >= Decimal::ZERO);
                prop_assert!(snapshot.active_positions <= 2);
                prop_assert!(snapshot.drawdown <= Decimal::ZERO);
            }
            prop_assert!(run.result.max_drawdown >= Decimal::ZERO);
        }
    }
}
