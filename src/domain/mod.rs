//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod consensus;
pub mod description;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod indicator_row;
pub mod market_stream;
pub mod metrics;
pub mod ohlcv;
pub mod pipeline;
pub mod portfolio;
pub mod position;
pub mod signal;
pub mod strategy;
pub mod summary;
pub mod thresholds;
