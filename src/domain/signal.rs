//! Graded strategy signals and the trade actions they translate to.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Seven ordered recommendation levels, strongest buy first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    StrongBuy,
    Buy,
    WeakBuy,
    #[default]
    Hold,
    WeakSell,
    Sell,
    StrongSell,
}

impl Signal {
    pub const ALL: [Signal; 7] = [
        Signal::StrongBuy,
        Signal::Buy,
        Signal::WeakBuy,
        Signal::Hold,
        Signal::WeakSell,
        Signal::Sell,
        Signal::StrongSell,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "Strong Buy",
            Signal::Buy => "Buy",
            Signal::WeakBuy => "Weak Buy",
            Signal::Hold => "Hold",
            Signal::WeakSell => "Weak Sell",
            Signal::Sell => "Sell",
            Signal::StrongSell => "Strong Sell",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::Buy | Signal::WeakBuy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::StrongSell | Signal::Sell | Signal::WeakSell)
    }

    /// Translate into a portfolio action. Strength maps to confidence 1.0 / 0.8 / 0.6.
    pub fn action(&self) -> Action {
        match self {
            Signal::StrongBuy => Action::Buy {
                confidence: dec!(1.0),
            },
            Signal::Buy => Action::Buy {
                confidence: dec!(0.8),
            },
            Signal::WeakBuy => Action::Buy {
                confidence: dec!(0.6),
            },
            Signal::Hold => Action::Hold,
            Signal::WeakSell => Action::Sell {
                confidence: dec!(0.6),
            },
            Signal::Sell => Action::Sell {
                confidence: dec!(0.8),
            },
            Signal::StrongSell => Action::Sell {
                confidence: dec!(1.0),
            },
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal: {0}")]
pub struct ParseSignalError(pub String);

impl FromStr for Signal {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Signal::ALL
            .into_iter()
            .find(|signal| signal.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseSignalError(trimmed.to_string()))
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// What the backtest does with a bar's signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy { confidence: Decimal },
    Sell { confidence: Decimal },
    Hold,
}
