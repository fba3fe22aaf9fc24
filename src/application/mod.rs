//! Application layer - use cases and services

pub mod commands;
pub mod refresh;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use commands::{AlertCommand, Cli, CommandExecutor, Commands};
pub use refresh::{RefreshReport, RefreshService};
pub use services::{ArbitrageService, DataFreshness, MarketService};
