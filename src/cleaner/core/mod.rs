//! Core cleaner types: identifiers, strategy capability, errors, config.

pub mod config;
pub mod connections;
pub mod errors;
pub mod ids;
pub mod strategy;
mod token;

pub use config::{CleanerConfig, ENV_BACKEND, ENV_STRATEGY};
pub use connections::{BASE_CONNECTION, ConnectionTargets};
pub use errors::{CleanerError, CleanerResult, StrategyFailure};
pub use ids::{BackendId, StrategyName};
pub use strategy::{Strategy, StrategyOptions, StrategySpec};
