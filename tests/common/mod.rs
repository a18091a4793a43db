#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
pub use sigtrader::domain::ohlcv::OhlcvBar;
use sigtrader::domain::error::SigtraderError;
use sigtrader::ports::data_port::DataPort;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn get_bars(&self, instrument: &str) -> Result<Vec<OhlcvBar>, SigtraderError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(SigtraderError::DataRead {
                reason: reason.clone(),
            });
        }
        self.data
            .get(instrument)
            .cloned()
            .ok_or_else(|| SigtraderError::NoData {
                instrument: instrument.to_string(),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day from `start`, open = high = low = close, volume 1000.
pub fn bars_from_closes(start: NaiveDate, closes: &[Decimal]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn constant_bars(count: usize, close: i64) -> Vec<OhlcvBar> {
    bars_from_closes(date(2023, 1, 1), &vec![Decimal::from(close); count])
}

/// 100, 101, 102, ...
pub fn rising_bars(count: usize) -> Vec<OhlcvBar> {
    let closes: Vec<Decimal> = (0..count).map(|i| Decimal::from(100 + i as i64)).collect();
    bars_from_closes(date(2023, 1, 1), &closes)
}

/// Closes oscillating around 100 with a range, so every indicator is exercised.
pub fn wave_bars(count: usize) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| {
            let swing = Decimal::from(((i * 7) % 23) as i64) - Decimal::from(11);
            let close = Decimal::from(100) + swing;
            OhlcvBar {
                date: date(2023, 1, 1) + chrono::Duration::days(i as i64),
                open: close,
                high: close + Decimal::ONE,
                low: close - Decimal::ONE,
                close,
                volume: 1000 + (i as i64 % 5) * 100,
            }
        })
        .collect()
}

/// Write bars as `<dir>/<instrument>.csv` in the layout `CsvAdapter` reads.
pub fn write_bars_csv(dir: &Path, instrument: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for bar in bars {
        writeln!(
            content,
            "{},{},{},{},{},{}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        )
        .unwrap();
    }
    std::fs::write(dir.join(format!("{instrument}.csv")), content).unwrap();
}
