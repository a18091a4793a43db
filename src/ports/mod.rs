//! Port traits for the adapters the domain depends on.

pub mod config_port;
pub mod data_port;
pub mod result_port;
