//! Test-database cleaner dispatch.
//!
//! This module lets a test suite say "clean the database between tests"
//! without knowing which persistence backend is linked in or which cleaning
//! technique applies:
//! - `core`: identifiers, the `Strategy` capability, options, errors, config
//! - `registry`: (backend, strategy name) to constructor bindings
//! - `detect`: ordered presence probes and the process-wide marker table
//! - `dispatcher`: backend resolution, strategy assignment, and delegation
//! - `global`: a mutex-guarded, process-wide dispatcher
//! - `logging`: tracing subscriber setup

pub mod core;
pub mod detect;
pub mod dispatcher;
pub mod global;
pub mod logging;
pub mod registry;

pub use self::core::{
    BASE_CONNECTION, BackendId, CleanerConfig, CleanerError, CleanerResult, ConnectionTargets,
    ENV_BACKEND, ENV_STRATEGY, Strategy, StrategyFailure, StrategyName, StrategyOptions,
    StrategySpec,
};
pub use detect::{
    BackendDetector, BackendProbe, FnProbe, MarkerProbe, announce_backend, is_backend_announced,
    withdraw_backend,
};
pub use dispatcher::Dispatcher;
pub use global::{install_global, with_global};
pub use logging::init_tracing;
pub use registry::{StrategyConstructor, StrategyContext, StrategyRegistry};
