//! sigtrader — indicator, signal and backtest engine for daily equity bars.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. The [`cli`] module is the
//! reference driver wiring them together.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
