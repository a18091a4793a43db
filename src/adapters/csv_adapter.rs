//! CSV file bar source.
//!
//! One file per instrument, `<dir>/<INSTRUMENT>.csv`, with the header
//! `date,open,high,low,close,volume`.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{instrument}.csv"))
    }
}

fn read_error(reason: String) -> SigtraderError {
    SigtraderError::DataRead { reason }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, SigtraderError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| read_error(format!("missing {name} column")))
}

fn price(record: &csv::StringRecord, index: usize, name: &str) -> Result<Decimal, SigtraderError> {
    let raw = field(record, index, name)?;
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| read_error(format!("invalid {name} value {raw:?}: {e}")))
}

/// Volumes are whole shares; a fractional value is truncated.
fn volume(record: &csv::StringRecord) -> Result<i64, SigtraderError> {
    let raw = field(record, 5, "volume")?;
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    price(record, 5, "volume")?
        .trunc()
        .to_i64()
        .ok_or_else(|| read_error(format!("volume out of range: {raw}")))
}

impl DataPort for CsvAdapter {
    fn get_bars(&self, instrument: &str) -> Result<Vec<OhlcvBar>, SigtraderError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SigtraderError::NoData {
                instrument: instrument.to_string(),
            },
            _ => read_error(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| read_error(format!("CSV parse error: {e}")))?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| read_error(format!("invalid date {date_str:?}: {e}")))?;

            bars.push(OhlcvBar {
                date,
                open: price(&record, 1, "open")?,
                high: price(&record, 2, "high")?,
                low: price(&record, 3, "low")?,
                close: price(&record, 4, "close")?,
                volume: volume(&record)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        tracing::debug!(instrument, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000.0\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("CBA.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn get_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.get_bars("BHP").unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, dec!(100.0));
        assert_eq!(bars[0].high, dec!(110.0));
        assert_eq!(bars[0].low, dec!(90.0));
        assert_eq!(bars[0].close, dec!(105.0));
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].volume, 55000);
    }

    #[test]
    fn header_only_file_gives_no_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.get_bars("CBA").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.get_bars("XYZ").unwrap_err();
        assert!(matches!(err, SigtraderError::NoData { instrument } if instrument == "XYZ"));
    }

    #[test]
    fn malformed_price_is_a_read_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.get_bars("BAD").unwrap_err();
        assert!(matches!(err, SigtraderError::DataRead { .. }));
        assert!(err.to_string().contains("open"));
    }
}
