//! Price data access port trait.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::OhlcvBar;

/// Source of daily bars, one instrument at a time.
///
/// Implementations return bars sorted by date with duplicates already removed.
/// `Sync` so instruments can be loaded in parallel.
pub trait DataPort: Sync {
    fn get_bars(&self, instrument: &str) -> Result<Vec<OhlcvBar>, SigtraderError>;
}
