//! Chronological multi-instrument event stream for one strategy's replay.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::Signal;
use crate::domain::strategy::{StrategyId, StrategyRow};
use chrono::NaiveDate;

/// One instrument's signal-annotated rows.
#[derive(Debug, Clone)]
pub struct InstrumentRows {
    pub instrument: String,
    pub rows: Vec<StrategyRow>,
}

/// A bar paired with the replayed strategy's signal on that bar.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    pub instrument: String,
    pub bar: OhlcvBar,
    pub signal: Signal,
}

/// Merge every instrument's rows into a single stream ordered by date.
///
/// Only rows with `start <= date <= end` are kept. The sort is stable, so
/// same-day events keep the order of `instruments`.
pub fn merge_stream(
    instruments: &[InstrumentRows],
    strategy: StrategyId,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<MarketEvent> {
    let mut events: Vec<MarketEvent> = instruments
        .iter()
        .flat_map(|data| {
            data.rows
                .iter()
                .filter(|row| row.indicators.date >= start && row.indicators.date <= end)
                .map(|row| MarketEvent {
                    instrument: data.instrument.clone(),
                    bar: row.indicators.bar(),
                    signal: row.signals.get(strategy),
                })
        })
        .collect();
    events.sort_by_key(|event| event.bar.date);
    events
}
