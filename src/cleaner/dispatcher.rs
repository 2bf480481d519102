//! Dispatcher: resolves the backend, builds strategies, and forwards
//! lifecycle calls to the current one.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::cleaner::core::config::CleanerConfig;
use crate::cleaner::core::connections::ConnectionTargets;
use crate::cleaner::core::errors::{CleanerError, CleanerResult, StrategyFailure};
use crate::cleaner::core::ids::{BackendId, StrategyName};
use crate::cleaner::core::strategy::{Strategy, StrategyOptions, StrategySpec};
use crate::cleaner::detect::BackendDetector;
use crate::cleaner::registry::{StrategyContext, StrategyRegistry};

/// Stateful cleaner holding the active backend and the current strategy.
///
/// Both pieces of state are resolved lazily and can be cleared
/// independently. All methods assume a single caller at a time; wrap the
/// dispatcher in a mutex (see [`crate::cleaner::global`]) to share it.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: StrategyRegistry,
    detector: BackendDetector,
    active_backend: Option<BackendId>,
    current_strategy: Option<Box<dyn Strategy>>,
    connections: HashMap<BackendId, ConnectionTargets>,
}

impl Dispatcher {
    /// Create a dispatcher from a registry and a detector.
    #[must_use]
    pub fn new(registry: StrategyRegistry, detector: BackendDetector) -> Self {
        Self {
            registry,
            detector,
            active_backend: None,
            current_strategy: None,
            connections: HashMap::new(),
        }
    }

    /// Create a dispatcher that detects through the default marker probes.
    #[must_use]
    pub fn with_registry(registry: StrategyRegistry) -> Self {
        Self::new(registry, BackendDetector::default())
    }

    /// Mutably borrow the strategy registry to add bindings.
    pub const fn registry_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.registry
    }

    /// Set or clear the active backend.
    ///
    /// Clearing makes the next resolution run detection again.
    pub fn set_backend(&mut self, backend: Option<BackendId>) {
        match &backend {
            Some(id) => info!(backend = %id, "Backend set explicitly"),
            None => debug!("Backend cleared"),
        }
        self.active_backend = backend;
    }

    /// Active backend without triggering detection.
    #[must_use]
    pub const fn active_backend(&self) -> Option<&BackendId> {
        self.active_backend.as_ref()
    }

    /// Active backend, detecting and caching it if unset.
    ///
    /// # Errors
    /// Returns `NoBackendDetected` if the backend is unset and detection fails.
    pub fn resolved_backend(&mut self) -> CleanerResult<BackendId> {
        if let Some(backend) = &self.active_backend {
            return Ok(backend.clone());
        }

        let backend = self.detector.detect()?;
        info!(%backend, "Resolved backend by detection");
        self.active_backend = Some(backend.clone());
        Ok(backend)
    }

    /// Alias of [`Self::resolved_backend`].
    ///
    /// # Errors
    /// Returns `NoBackendDetected` if the backend is unset and detection fails.
    pub fn orm(&mut self) -> CleanerResult<BackendId> {
        self.resolved_backend()
    }

    /// Build a strategy without storing it.
    ///
    /// An instance is returned unchanged and needs neither a backend nor the
    /// registry. A name is resolved against the active backend; its
    /// constructor receives that backend's connection targets and `options`
    /// exactly as given: `None` stays `None`.
    ///
    /// # Errors
    /// - `InvalidArgument` if options accompany an instance.
    /// - `NoBackendDetected` if a name needs a backend and none is found.
    /// - `UnknownStrategySpecified` if the name is not registered.
    /// - `StrategyFailed` if the constructor fails.
    pub fn create_strategy(
        &mut self,
        spec: impl Into<StrategySpec>,
        options: Option<StrategyOptions>,
    ) -> CleanerResult<Box<dyn Strategy>> {
        let name = match spec.into() {
            StrategySpec::Instance(strategy) => {
                if options.is_some() {
                    return Err(CleanerError::InvalidArgument(format!(
                        "options can only be given with a strategy name, not with instance `{}`",
                        strategy.name()
                    )));
                }
                return Ok(strategy);
            }
            StrategySpec::Named(name) => name,
        };

        let backend = self.resolved_backend()?;
        let targets = self.connections(&backend);
        self.construct(backend, &name, targets, options)
    }

    fn construct(
        &self,
        backend: BackendId,
        name: &StrategyName,
        targets: ConnectionTargets,
        options: Option<StrategyOptions>,
    ) -> CleanerResult<Box<dyn Strategy>> {
        let constructor = self.registry.resolve_constructor(&backend, name)?;
        debug!(
            %backend,
            strategy = %name,
            connections = targets.names().len(),
            has_options = options.is_some(),
            "Constructing strategy"
        );
        let context = StrategyContext::new(backend, targets);
        constructor(&context, options).map_err(|source| CleanerError::StrategyFailed {
            strategy: name.to_string(),
            operation: "construct",
            source,
        })
    }

    /// Build a strategy and make it the current one.
    ///
    /// The previous strategy is dropped only once the new one is built.
    ///
    /// # Errors
    /// Same as [`Self::create_strategy`].
    pub fn assign_strategy(
        &mut self,
        spec: impl Into<StrategySpec>,
        options: Option<StrategyOptions>,
    ) -> CleanerResult<()> {
        let strategy = self.create_strategy(spec, options)?;
        info!(strategy = strategy.name(), "Strategy assigned");
        self.current_strategy = Some(strategy);
        Ok(())
    }

    /// Assign a strategy and clean with it immediately.
    ///
    /// The strategy stays current afterwards, so a later bare [`Self::clean`]
    /// reuses it. Use [`Self::clean_once_with`] to leave the current strategy
    /// untouched.
    ///
    /// # Errors
    /// Same as [`Self::assign_strategy`], plus `StrategyFailed` from `clean`.
    pub fn clean_with(
        &mut self,
        spec: impl Into<StrategySpec>,
        options: Option<StrategyOptions>,
    ) -> CleanerResult<()> {
        self.assign_strategy(spec, options)?;
        self.clean()
    }

    /// Build a strategy, clean with it, and discard it.
    ///
    /// # Errors
    /// Same as [`Self::create_strategy`], plus `StrategyFailed` from `clean`.
    pub fn clean_once_with(
        &mut self,
        spec: impl Into<StrategySpec>,
        options: Option<StrategyOptions>,
    ) -> CleanerResult<()> {
        let mut strategy = self.create_strategy(spec, options)?;
        debug!(strategy = strategy.name(), "One-shot clean");
        drive(strategy.as_mut(), "clean", |s| s.clean())
    }

    /// Forward `start` to the current strategy.
    ///
    /// # Errors
    /// Returns `NoStrategySet` if none is assigned, or `StrategyFailed`.
    pub fn start(&mut self) -> CleanerResult<()> {
        let strategy = self
            .current_strategy
            .as_deref_mut()
            .ok_or(CleanerError::NoStrategySet)?;
        drive(strategy, "start", |s| s.start())
    }

    /// Forward `clean` to the current strategy.
    ///
    /// # Errors
    /// Returns `NoStrategySet` if none is assigned, or `StrategyFailed`.
    pub fn clean(&mut self) -> CleanerResult<()> {
        let strategy = self
            .current_strategy
            .as_deref_mut()
            .ok_or(CleanerError::NoStrategySet)?;
        drive(strategy, "clean", |s| s.clean())
    }

    /// Whether a strategy is assigned.
    #[must_use]
    pub const fn has_strategy(&self) -> bool {
        self.current_strategy.is_some()
    }

    /// Name of the current strategy, if any.
    #[must_use]
    pub fn current_strategy_name(&self) -> Option<&str> {
        self.current_strategy.as_deref().map(|s| s.name())
    }

    /// Drop the current strategy, keeping the backend.
    pub fn clear_strategy(&mut self) {
        self.current_strategy = None;
    }

    /// Clear both the backend and the strategy.
    pub fn reset(&mut self) {
        debug!("Dispatcher reset");
        self.active_backend = None;
        self.current_strategy = None;
    }

    /// Connection targets for `backend` (base connection when none were set).
    #[must_use]
    pub fn connections(&self, backend: &BackendId) -> ConnectionTargets {
        self.connections.get(backend).cloned().unwrap_or_default()
    }

    /// Merge extra connection names into `backend`'s targets.
    pub fn set_connections<I, S>(&mut self, backend: BackendId, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connections.entry(backend).or_default().merge(names);
    }

    /// Apply a configuration: backend, connections, then default strategy.
    ///
    /// Everything is resolved and the strategy built before any state
    /// changes, so a failing configuration leaves the dispatcher as it was.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the strategy
    /// cannot be built.
    pub fn configure(&mut self, config: &CleanerConfig) -> CleanerResult<()> {
        config.validate()?;

        let mut backend = config.backend_id()?;

        let mut targets = HashMap::with_capacity(config.connections.len());
        for (name, names) in &config.connections {
            let id = BackendId::new(name)?;
            let mut merged = self.connections(&id);
            merged.merge(names.iter().cloned());
            targets.insert(id, merged);
        }

        let strategy = match config.strategy_spec()? {
            None => None,
            Some((StrategySpec::Named(name), options)) => {
                let resolved = match backend.take().or_else(|| self.active_backend.clone()) {
                    Some(id) => id,
                    None => self.detector.detect()?,
                };
                let connections = targets
                    .get(&resolved)
                    .cloned()
                    .unwrap_or_else(|| self.connections(&resolved));
                let strategy = self.construct(resolved.clone(), &name, connections, options)?;
                backend = Some(resolved);
                Some(strategy)
            }
            Some((StrategySpec::Instance(strategy), _)) => {
                return Err(CleanerError::InvalidArgument(format!(
                    "configuration can only name a strategy, got instance `{}`",
                    strategy.name()
                )));
            }
        };

        if let Some(backend) = backend {
            if self.active_backend.as_ref() != Some(&backend) {
                info!(%backend, "Backend set from configuration");
            }
            self.active_backend = Some(backend);
        }
        self.connections.extend(targets);
        if let Some(strategy) = strategy {
            info!(strategy = strategy.name(), "Strategy assigned from configuration");
            self.current_strategy = Some(strategy);
        }

        Ok(())
    }
}

fn drive(
    strategy: &mut dyn Strategy,
    operation: &'static str,
    step: impl FnOnce(&mut dyn Strategy) -> Result<(), StrategyFailure>,
) -> CleanerResult<()> {
    debug!(strategy = strategy.name(), operation, "Delegating to strategy");
    step(&mut *strategy).map_err(|source| CleanerError::StrategyFailed {
        strategy: strategy.name().to_string(),
        operation,
        source,
    })
}
