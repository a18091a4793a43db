//! Cross-strategy consensus smoothing.
//!
//! When at least [`CONSENSUS_THRESHOLD`] strategies agree on a direction for a
//! bar, strategies still at Hold on that bar are nudged to the weak level of
//! that direction. Bars where both directions reach the threshold are left as is.

use crate::domain::signal::Signal;
use crate::domain::strategy::{StrategyRow, StrategySignals};

pub const CONSENSUS_THRESHOLD: usize = 3;

pub fn smooth_consensus(signals: &mut StrategySignals) {
    let buys = signals.iter().filter(|(_, s)| s.is_buy()).count();
    let sells = signals.iter().filter(|(_, s)| s.is_sell()).count();

    let promoted = match (buys >= CONSENSUS_THRESHOLD, sells >= CONSENSUS_THRESHOLD) {
        (true, false) => Signal::WeakBuy,
        (false, true) => Signal::WeakSell,
        _ => return,
    };

    for signal in signals.values_mut() {
        if *signal == Signal::Hold {
            *signal = promoted;
        }
    }
}

pub fn apply_consensus(rows: &mut [StrategyRow]) {
    for row in rows.iter_mut() {
        smooth_consensus(&mut row.signals);
    }
}
