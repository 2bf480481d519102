//! Lookup table from (backend, strategy name) to a strategy constructor.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cleaner::core::connections::ConnectionTargets;
use crate::cleaner::core::errors::{CleanerError, CleanerResult, StrategyFailure};
use crate::cleaner::core::ids::{BackendId, StrategyName};
use crate::cleaner::core::strategy::{Strategy, StrategyOptions};

/// What the dispatcher knows when it builds a strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyContext {
    backend: BackendId,
    connections: ConnectionTargets,
}

impl StrategyContext {
    /// Context for building a strategy on `backend`.
    #[must_use]
    pub const fn new(backend: BackendId, connections: ConnectionTargets) -> Self {
        Self {
            backend,
            connections,
        }
    }

    /// Backend the strategy is built for.
    #[must_use]
    pub const fn backend(&self) -> &BackendId {
        &self.backend
    }

    /// Connections the strategy should clean, base connection first.
    #[must_use]
    pub const fn connections(&self) -> &ConnectionTargets {
        &self.connections
    }
}

/// Builds a strategy; `None` options means the caller passed no options.
pub type StrategyConstructor = Arc<
    dyn Fn(&StrategyContext, Option<StrategyOptions>) -> Result<Box<dyn Strategy>, StrategyFailure>
        + Send
        + Sync,
>;

/// Registry of strategy constructors keyed by backend and strategy name.
///
/// Integrations register their strategies here; the dispatcher only reads it.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    constructors: HashMap<(BackendId, StrategyName), StrategyConstructor>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a constructor to (backend, name), replacing any earlier binding.
    pub fn register<F, S>(&mut self, backend: BackendId, name: StrategyName, constructor: F)
    where
        F: Fn(&StrategyContext, Option<StrategyOptions>) -> Result<S, StrategyFailure>
            + Send
            + Sync
            + 'static,
        S: Strategy + 'static,
    {
        let constructor: StrategyConstructor =
            Arc::new(move |context: &StrategyContext, options: Option<StrategyOptions>| {
                constructor(context, options).map(|strategy| Box::new(strategy) as Box<dyn Strategy>)
            });
        if self
            .constructors
            .insert((backend.clone(), name.clone()), constructor)
            .is_some()
        {
            debug!(%backend, strategy = %name, "Replaced strategy constructor");
        } else {
            debug!(%backend, strategy = %name, "Registered strategy constructor");
        }
    }

    /// Builder-style [`Self::register`].
    #[must_use]
    pub fn with<F, S>(mut self, backend: BackendId, name: StrategyName, constructor: F) -> Self
    where
        F: Fn(&StrategyContext, Option<StrategyOptions>) -> Result<S, StrategyFailure>
            + Send
            + Sync
            + 'static,
        S: Strategy + 'static,
    {
        self.register(backend, name, constructor);
        self
    }

    /// Find the constructor for (backend, name).
    ///
    /// # Errors
    /// Returns `UnknownStrategySpecified` if nothing is registered for the pair.
    pub fn resolve_constructor(
        &self,
        backend: &BackendId,
        name: &StrategyName,
    ) -> CleanerResult<StrategyConstructor> {
        self.constructors
            .get(&(backend.clone(), name.clone()))
            .cloned()
            .ok_or_else(|| CleanerError::UnknownStrategySpecified {
                backend: backend.to_string(),
                strategy: name.to_string(),
            })
    }

    /// Whether a constructor is registered for (backend, name).
    #[must_use]
    pub fn contains(&self, backend: &BackendId, name: &StrategyName) -> bool {
        self.constructors
            .contains_key(&(backend.clone(), name.clone()))
    }

    /// Strategy names registered for `backend`, sorted.
    #[must_use]
    pub fn strategies_for(&self, backend: &BackendId) -> Vec<StrategyName> {
        let mut names: Vec<StrategyName> = self
            .constructors
            .keys()
            .filter(|(b, _)| b == backend)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether the registry has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .constructors
            .keys()
            .map(|(backend, name)| format!("{backend}:{name}"))
            .collect();
        keys.sort();
        f.debug_struct("StrategyRegistry")
            .field("bindings", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Tagged(&'static str);

    impl Strategy for Tagged {
        fn start(&mut self) -> Result<(), StrategyFailure> {
            Ok(())
        }

        fn clean(&mut self) -> Result<(), StrategyFailure> {
            Ok(())
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    fn diesel_context() -> StrategyContext {
        StrategyContext::new(BackendId::DIESEL, ConnectionTargets::new())
    }

    #[test]
    fn test_resolve_registered_pair() {
        let registry = StrategyRegistry::new().with(
            BackendId::DIESEL,
            StrategyName::TRANSACTION,
            |_, _| Ok(Tagged("diesel-transaction")),
        );

        let ctor = registry
            .resolve_constructor(&BackendId::DIESEL, &StrategyName::TRANSACTION)
            .unwrap();
        let strategy = ctor(&diesel_context(), None).unwrap();
        assert_eq!(strategy.name(), "diesel-transaction");
    }

    #[test]
    fn test_unknown_pair() {
        let registry = StrategyRegistry::new().with(
            BackendId::DIESEL,
            StrategyName::TRANSACTION,
            |_, _| Ok(Tagged("t")),
        );

        let err = registry
            .resolve_constructor(&BackendId::SQLX, &StrategyName::TRANSACTION)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            CleanerError::UnknownStrategySpecified { ref backend, ref strategy }
                if backend == "sqlx" && strategy == "transaction"
        ));

        let foo = StrategyName::new("foo").unwrap();
        assert!(registry.resolve_constructor(&BackendId::DIESEL, &foo).is_err());
    }

    #[test]
    fn test_constructor_receives_options_verbatim() {
        let seen: Arc<Mutex<Vec<(BackendId, Option<StrategyOptions>)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let registry = StrategyRegistry::new().with(
            BackendId::SEA_ORM,
            StrategyName::DELETION,
            move |context: &StrategyContext, options| {
                sink.lock().unwrap().push((context.backend().clone(), options));
                Ok(Tagged("d"))
            },
        );

        let ctor = registry
            .resolve_constructor(&BackendId::SEA_ORM, &StrategyName::DELETION)
            .unwrap();
        let context = StrategyContext::new(BackendId::SEA_ORM, ConnectionTargets::new());
        ctor(&context, None).unwrap();
        ctor(&context, Some(StrategyOptions::new())).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (BackendId::SEA_ORM, None),
                (BackendId::SEA_ORM, Some(StrategyOptions::new()))
            ]
        );
    }

    #[test]
    fn test_later_binding_replaces() {
        let registry = StrategyRegistry::new()
            .with(BackendId::SQLX, StrategyName::TRUNCATION, |_, _| Ok(Tagged("old")))
            .with(BackendId::SQLX, StrategyName::TRUNCATION, |_, _| Ok(Tagged("new")));

        assert_eq!(registry.len(), 1);
        let ctor = registry
            .resolve_constructor(&BackendId::SQLX, &StrategyName::TRUNCATION)
            .unwrap();
        assert_eq!(ctor(&diesel_context(), None).unwrap().name(), "new");
    }

    #[test]
    fn test_strategies_for_backend() {
        let registry = StrategyRegistry::new()
            .with(BackendId::SQLX, StrategyName::TRUNCATION, |_, _| Ok(Tagged("t")))
            .with(BackendId::SQLX, StrategyName::DELETION, |_, _| Ok(Tagged("d")))
            .with(BackendId::MONGODB, StrategyName::TRUNCATION, |_, _| Ok(Tagged("m")));

        assert_eq!(
            registry.strategies_for(&BackendId::SQLX),
            vec![StrategyName::DELETION, StrategyName::TRUNCATION]
        );
        assert!(registry.contains(&BackendId::MONGODB, &StrategyName::TRUNCATION));
        assert!(!registry.contains(&BackendId::MONGODB, &StrategyName::DELETION));
        assert!(registry.strategies_for(&BackendId::DIESEL).is_empty());
        assert!(!registry.is_empty());
        assert!(StrategyRegistry::new().is_empty());
    }

    #[test]
    fn test_context_exposes_connections() {
        let context = StrategyContext::new(
            BackendId::SQLX,
            ConnectionTargets::with_extra(["replica"]),
        );
        assert_eq!(context.backend(), &BackendId::SQLX);
        assert_eq!(context.connections().names(), ["primary", "replica"]);
    }
}
