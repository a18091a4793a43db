//! Bars in, signal-annotated rows out, for every configured instrument.

use super::error::SigtraderError;
use super::indicator_row::compute_indicators;
use super::market_stream::InstrumentRows;
use super::ohlcv::OhlcvBar;
use super::strategy::{StrategyRow, generate_signals};
use super::thresholds::ThresholdTable;
use crate::ports::data_port::DataPort;
use rayon::prelude::*;

/// Indicators, classification and consensus for one instrument.
pub fn analyse_bars(bars: &[OhlcvBar], thresholds: &ThresholdTable) -> Vec<StrategyRow> {
    generate_signals(compute_indicators(bars), thresholds)
}

/// Load and analyse each instrument in parallel, keeping the given order.
///
/// An instrument with no bars (or no data file) is skipped with a warning.
/// Any other read failure aborts the load. Fails with `NoData` when nothing
/// is left to replay.
pub fn load_instrument_rows(
    data_port: &dyn DataPort,
    instruments: &[String],
    thresholds: &ThresholdTable,
) -> Result<Vec<InstrumentRows>, SigtraderError> {
    let loaded: Vec<Option<InstrumentRows>> = instruments
        .par_iter()
        .map(|instrument| {
            let bars = match data_port.get_bars(instrument) {
                Ok(bars) => bars,
                Err(SigtraderError::NoData { .. }) => Vec::new(),
                Err(e) => return Err(e),
            };
            if bars.is_empty() {
                tracing::warn!(instrument = instrument.as_str(), "no bars, skipping");
                return Ok(None);
            }
            let rows = analyse_bars(&bars, thresholds);
            tracing::debug!(
                instrument = instrument.as_str(),
                rows = rows.len(),
                "signals generated"
            );
            Ok(Some(InstrumentRows {
                instrument: instrument.clone(),
                rows,
            }))
        })
        .collect::<Result<_, SigtraderError>>()?;

    let rows: Vec<InstrumentRows> = loaded.into_iter().flatten().collect();
    if rows.is_empty() {
        return Err(SigtraderError::NoData {
            instrument: instruments.join(","),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{ints, make_bars};
    use std::collections::HashMap;

    struct StubData(HashMap<String, Result<Vec<OhlcvBar>, String>>);

    impl DataPort for StubData {
        fn get_bars(&self, instrument: &str) -> Result<Vec<OhlcvBar>, SigtraderError> {
            match self.0.get(instrument) {
                Some(Ok(bars)) => Ok(bars.clone()),
                Some(Err(reason)) => Err(SigtraderError::DataRead {
                    reason: reason.clone(),
                }),
                None => Err(SigtraderError::NoData {
                    instrument: instrument.to_string(),
                }),
            }
        }
    }

    fn stub(entries: Vec<(&str, Result<Vec<OhlcvBar>, String>)>) -> StubData {
        StubData(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_instrument_order() {
        let bars = make_bars(&ints(&[10, 11, 12, 13]));
        let data = stub(vec![("BHP", Ok(bars.clone())), ("RIO", Ok(bars))]);
        let rows =
            load_instrument_rows(&data, &names(&["RIO", "BHP"]), &ThresholdTable::default())
                .unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.instrument.as_str()).collect();
        assert_eq!(order, vec!["RIO", "BHP"]);
        assert_eq!(rows[0].rows.len(), 4);
    }

    #[test]
    fn skips_missing_and_empty_instruments() {
        let data = stub(vec![
            ("BHP", Ok(make_bars(&ints(&[10, 11])))),
            ("CBA", Ok(Vec::new())),
        ]);
        let rows = load_instrument_rows(
            &data,
            &names(&["CBA", "XYZ", "BHP"]),
            &ThresholdTable::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].instrument, "BHP");
    }

    #[test]
    fn read_failure_aborts() {
        let data = stub(vec![
            ("BHP", Ok(make_bars(&ints(&[10, 11])))),
            ("BAD", Err("corrupt".into())),
        ]);
        let err = load_instrument_rows(&data, &names(&["BHP", "BAD"]), &ThresholdTable::default())
            .unwrap_err();
        assert!(matches!(err, SigtraderError::DataRead { .. }));
    }

    #[test]
    fn nothing_to_replay_is_no_data() {
        let data = stub(vec![]);
        let err = load_instrument_rows(&data, &names(&["XYZ"]), &ThresholdTable::default())
            .unwrap_err();
        assert!(matches!(err, SigtraderError::NoData { .. }));
    }

    #[test]
    fn analyse_bars_gives_one_row_per_bar() {
        let bars = make_bars(&ints(&[5, 6, 7, 8, 9]));
        let rows = analyse_bars(&bars, &ThresholdTable::default());
        assert_eq!(rows.len(), bars.len());
        assert_eq!(rows[4].indicators.close, bars[4].close);
    }
}
