//! Trade execution at bar prices.
//!
//! Entries and signal exits fill at the bar's close. Stop-loss and take-profit
//! exits fill at the trigger price. A fixed commission is charged on each side.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use super::ohlcv::OhlcvBar;
use super::portfolio::Portfolio;
use super::position::{ExitReason, Position, TRADE_TYPE_LONG, Trade};
use super::signal::Signal;
use super::strategy::StrategyId;

/// Sizing and exit rules applied to every trade of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub commission_per_trade: Decimal,
    pub max_positions: usize,
    pub position_size_percent: Decimal,
    pub stop_loss_percent: Decimal,
    pub take_profit_percent: Decimal,
    pub max_holding_days: i64,
    pub use_signal_strength: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_per_trade: Decimal::ZERO,
            max_positions: 10,
            position_size_percent: dec!(10),
            stop_loss_percent: dec!(5),
            take_profit_percent: dec!(15),
            max_holding_days: 30,
            use_signal_strength: true,
        }
    }
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { quantity: i64, total_cost: Decimal },
    AlreadyOpen,
    PositionLimit,
    InsufficientCapital,
}

fn whole_shares(amount: Decimal, price: Decimal) -> i64 {
    (amount / price).floor().to_i64().unwrap_or(0)
}

/// Open a long position at the bar's close.
///
/// The position value is `cash × size%`, scaled by `confidence` when signal
/// strength weighting is on, then floored to whole shares. If that plus the
/// commission exceeds cash, the quantity shrinks to the most that is affordable.
pub fn enter_long(
    portfolio: &mut Portfolio,
    instrument: &str,
    strategy: StrategyId,
    bar: &OhlcvBar,
    confidence: Decimal,
    config: &ExecutionConfig,
) -> EntryResult {
    if portfolio.has_position(instrument) {
        return EntryResult::AlreadyOpen;
    }
    if portfolio.position_count() >= config.max_positions {
        return EntryResult::PositionLimit;
    }
    let price = bar.close;
    if price <= Decimal::ZERO {
        return EntryResult::InsufficientCapital;
    }

    let mut position_value = portfolio.cash * config.position_size_percent / dec!(100);
    if config.use_signal_strength {
        position_value *= confidence;
    }

    let mut quantity = whole_shares(position_value, price);
    if quantity <= 0 {
        return EntryResult::InsufficientCapital;
    }

    let mut total_cost = price * Decimal::from(quantity) + config.commission_per_trade;
    if total_cost > portfolio.cash {
        quantity = whole_shares(portfolio.cash - config.commission_per_trade, price);
        if quantity <= 0 {
            return EntryResult::InsufficientCapital;
        }
        total_cost = price * Decimal::from(quantity) + config.commission_per_trade;
    }

    let stop_loss = price * (Decimal::ONE - config.stop_loss_percent / dec!(100));
    let take_profit = price * (Decimal::ONE + config.take_profit_percent / dec!(100));

    portfolio.cash -= total_cost;
    portfolio.add_position(Position {
        instrument: instrument.to_string(),
        strategy,
        entry_date: bar.date,
        entry_price: price,
        quantity,
        current_price: price,
        current_value: price * Decimal::from(quantity),
        unrealized_pnl: Decimal::ZERO,
        stop_loss,
        take_profit,
    });

    tracing::debug!(
        instrument,
        %price,
        quantity,
        %total_cost,
        "entered position"
    );

    EntryResult::Entered {
        quantity,
        total_cost,
    }
}

/// Close the open position for `instrument` at `exit_price`.
///
/// proceeds = exit × qty − commission, cost = entry × qty + commission,
/// PnL = proceeds − cost. Returns `None` when nothing is open.
pub fn exit_position(
    portfolio: &mut Portfolio,
    instrument: &str,
    exit_date: NaiveDate,
    exit_price: Decimal,
    exit_signal: &str,
    reason: ExitReason,
    config: &ExecutionConfig,
) -> Option<Trade> {
    let position = portfolio.remove_position(instrument)?;
    let quantity = Decimal::from(position.quantity);

    let proceeds = exit_price * quantity - config.commission_per_trade;
    let cost = position.cost_basis() + config.commission_per_trade;
    let pnl = proceeds - cost;
    let pnl_percent = if cost.is_zero() {
        Decimal::ZERO
    } else {
        pnl / cost * dec!(100)
    };

    let trade = Trade {
        trade_id: portfolio.next_trade_id(),
        instrument: position.instrument.clone(),
        strategy: position.strategy,
        entry_date: position.entry_date,
        exit_date,
        entry_price: position.entry_price,
        exit_price,
        exit_signal: exit_signal.to_string(),
        quantity: position.quantity,
        pnl,
        pnl_percent,
        holding_days: position.holding_days(exit_date),
        trade_type: TRADE_TYPE_LONG,
        commission: config.commission_per_trade * dec!(2),
        exit_reason: reason,
    };

    portfolio.cash += proceeds;
    portfolio.record_trade(trade.clone());

    tracing::debug!(
        instrument,
        %exit_price,
        %pnl,
        %reason,
        "exited position"
    );

    Some(trade)
}

/// Exit on stop-loss, take-profit, or holding period, checked in that order.
///
/// At most one exit fires per bar. `signal` is the bar's signal, recorded as the
/// exit signal of a time-limit exit.
pub fn check_exit_conditions(
    portfolio: &mut Portfolio,
    instrument: &str,
    bar: &OhlcvBar,
    signal: Signal,
    config: &ExecutionConfig,
) -> Option<Trade> {
    let position = portfolio.get_position(instrument)?;

    let (exit_price, exit_signal, reason) = if position.should_stop_loss(bar.low) {
        (position.stop_loss, ExitReason::StopLoss.as_str(), ExitReason::StopLoss)
    } else if position.should_take_profit(bar.high) {
        (
            position.take_profit,
            ExitReason::TakeProfit.as_str(),
            ExitReason::TakeProfit,
        )
    } else if position.holding_days(bar.date) >= config.max_holding_days {
        (bar.close, signal.label(), ExitReason::TimeLimit)
    } else {
        return None;
    };

    exit_position(
        portfolio,
        instrument,
        bar.date,
        exit_price,
        exit_signal,
        reason,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(d: u32, high: Decimal, low: Decimal, close: Decimal) -> OhlcvBar {
        OhlcvBar {
            date: date(d),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    fn flat_bar(d: u32, close: Decimal) -> OhlcvBar {
        bar(d, close, close, close)
    }

    fn make_config() -> ExecutionConfig {
        ExecutionConfig {
            position_size_percent: dec!(50),
            use_signal_strength: false,
            ..Default::default()
        }
    }

    #[test]
    fn enter_long_sizes_from_cash_percent() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let result = enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            dec!(0.6),
            &make_config(),
        );

        assert_eq!(
            result,
            EntryResult::Entered {
                quantity: 50,
                total_cost: dec!(5000)
            }
        );
        assert_eq!(portfolio.cash, dec!(5000));
        let pos = portfolio.get_position("BHP").unwrap();
        assert_eq!(pos.stop_loss, dec!(95));
        assert_eq!(pos.take_profit, dec!(115));
        assert_eq!(pos.current_value, dec!(5000));
    }

    #[test]
    fn enter_long_scales_by_confidence() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let config = ExecutionConfig {
            use_signal_strength: true,
            ..make_config()
        };
        let result = enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            dec!(0.6),
            &config,
        );
        assert!(matches!(result, EntryResult::Entered { quantity: 30, .. }));
    }

    #[test]
    fn enter_long_floors_quantity() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let result = enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(30)),
            Decimal::ONE,
            &make_config(),
        );
        assert!(matches!(result, EntryResult::Entered { quantity: 16, .. }));
        assert_eq!(portfolio.cash, dec!(520));
    }

    #[test]
    fn enter_long_resizes_when_commission_exceeds_cash() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let config = ExecutionConfig {
            position_size_percent: dec!(100),
            commission_per_trade: dec!(10),
            use_signal_strength: false,
            ..Default::default()
        };
        let result = enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &config,
        );
        assert_eq!(
            result,
            EntryResult::Entered {
                quantity: 9,
                total_cost: dec!(910)
            }
        );
        assert_eq!(portfolio.cash, dec!(90));
    }

    #[test]
    fn enter_long_insufficient_capital() {
        let mut portfolio = Portfolio::new(dec!(10));
        let result = enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &make_config(),
        );
        assert_eq!(result, EntryResult::InsufficientCapital);
        assert!(!portfolio.has_position("BHP"));
        assert_eq!(portfolio.cash, dec!(10));
    }

    #[test]
    fn enter_long_skips_open_instrument_and_position_limit() {
        let mut portfolio = Portfolio::new(dec!(100000));
        let config = ExecutionConfig {
            max_positions: 1,
            ..make_config()
        };
        let b = flat_bar(2, dec!(10));
        enter_long(&mut portfolio, "BHP", StrategyId::Rsi, &b, Decimal::ONE, &config);
        assert_eq!(
            enter_long(&mut portfolio, "BHP", StrategyId::Rsi, &b, Decimal::ONE, &config),
            EntryResult::AlreadyOpen
        );
        assert_eq!(
            enter_long(&mut portfolio, "RIO", StrategyId::Rsi, &b, Decimal::ONE, &config),
            EntryResult::PositionLimit
        );
        assert_eq!(portfolio.position_count(), 1);
    }

    #[test]
    fn exit_position_round_trip() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let config = make_config();
        enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &config,
        );
        let trade = exit_position(
            &mut portfolio,
            "BHP",
            date(5),
            dec!(110),
            "Sell",
            ExitReason::Signal,
            &config,
        )
        .unwrap();

        assert_eq!(trade.trade_id, 1);
        assert_eq!(trade.quantity, 50);
        assert_eq!(trade.pnl, dec!(500));
        assert_eq!(trade.pnl_percent, dec!(10));
        assert_eq!(trade.holding_days, 3);
        assert_eq!(trade.exit_signal, "Sell");
        assert_eq!(trade.trade_type, "LONG");
        assert_eq!(portfolio.cash, dec!(10500));
        assert_eq!(portfolio.trades.len(), 1);
        assert!(!portfolio.has_position("BHP"));
    }

    #[test]
    fn exit_position_charges_commission_both_sides() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let config = ExecutionConfig {
            commission_per_trade: dec!(5),
            ..make_config()
        };
        enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &config,
        );
        assert_eq!(portfolio.cash, dec!(4995));

        let trade = exit_position(
            &mut portfolio,
            "BHP",
            date(3),
            dec!(100),
            "Sell",
            ExitReason::Signal,
            &config,
        )
        .unwrap();
        assert_eq!(trade.pnl, dec!(-10));
        assert_eq!(trade.commission, dec!(10));
        assert!(!trade.is_win());
        assert_eq!(portfolio.cash, dec!(9990));
    }

    #[test]
    fn exit_without_position_is_none() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let trade = exit_position(
            &mut portfolio,
            "BHP",
            date(3),
            dec!(100),
            "Sell",
            ExitReason::Signal,
            &make_config(),
        );
        assert!(trade.is_none());
        assert_eq!(portfolio.cash, dec!(10000));
    }

    #[test]
    fn stop_loss_exits_at_stop_price() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let config = make_config();
        enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &config,
        );
        let trade = check_exit_conditions(
            &mut portfolio,
            "BHP",
            &bar(3, dec!(120), dec!(94), dec!(96)),
            Signal::Hold,
            &config,
        )
        .unwrap();
        // both triggers touched: stop-loss wins
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.exit_price, dec!(95));
        assert_eq!(trade.exit_signal, "STOP_LOSS");
        assert_eq!(trade.pnl, dec!(-250));
    }

    #[test]
    fn take_profit_exits_at_target_price() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let config = make_config();
        enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &config,
        );
        let trade = check_exit_conditions(
            &mut portfolio,
            "BHP",
            &bar(3, dec!(116), dec!(101), dec!(112)),
            Signal::Hold,
            &config,
        )
        .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert_eq!(trade.exit_price, dec!(115));
        assert_eq!(trade.pnl, dec!(750));
    }

    #[test]
    fn time_limit_exits_at_close() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let config = ExecutionConfig {
            max_holding_days: 5,
            ..make_config()
        };
        enter_long(
            &mut portfolio,
            "BHP",
            StrategyId::Rsi,
            &flat_bar(2, dec!(100)),
            Decimal::ONE,
            &config,
        );
        assert!(
            check_exit_conditions(&mut portfolio, "BHP", &flat_bar(6, dec!(101)), Signal::Hold, &config)
                .is_none()
        );
        let trade =
            check_exit_conditions(&mut portfolio, "BHP", &flat_bar(7, dec!(102)), Signal::Hold, &config)
                .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::TimeLimit);
        assert_eq!(trade.exit_price, dec!(102));
        assert_eq!(trade.exit_signal, "Hold");
        assert_eq!(trade.holding_days, 5);
    }

    #[test]
    fn no_exit_without_position() {
        let mut portfolio = Portfolio::new(dec!(10000));
        assert!(
            check_exit_conditions(
                &mut portfolio,
                "BHP",
                &bar(3, dec!(1000), dec!(1), dec!(5)),
                Signal::Hold,
                &make_config()
            )
            .is_none()
        );
    }
}
