//! Domain layer - core business logic and entities

pub mod alerts;
pub mod arbitrage;
pub mod labels;
pub mod market;
pub mod news;
pub mod ticker;
