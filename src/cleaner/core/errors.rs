//! Error types for the cleaner subsystem.

use thiserror::Error;

/// Boxed error returned by strategy implementations and constructors.
pub type StrategyFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Cleaner subsystem error type.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// Backend resolution was required but no known backend is present.
    #[error("no known persistence backend detected; announce one or set it explicitly")]
    NoBackendDetected,
    /// No constructor is registered for the (backend, strategy) pair.
    #[error("unknown strategy `{strategy}` for backend `{backend}`")]
    UnknownStrategySpecified {
        /// Backend the lookup ran against.
        backend: String,
        /// Strategy name that was requested.
        strategy: String,
    },
    /// Invalid call shape, e.g. options supplied alongside a strategy instance.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// `start`/`clean` was called before any strategy was assigned.
    #[error("no strategy has been set; assign one before calling start or clean")]
    NoStrategySet,
    /// A strategy failed while being constructed or driven.
    #[error("strategy `{strategy}` failed during {operation}: {source}")]
    StrategyFailed {
        /// Name of the failing strategy.
        strategy: String,
        /// Lifecycle step that failed (`construct`, `start`, `clean`).
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: StrategyFailure,
    },
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CleanerError {
    /// Stable short code for reporting in test harness output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoBackendDetected => "E-CLN-001",
            Self::UnknownStrategySpecified { .. } => "E-CLN-002",
            Self::InvalidArgument(_) => "E-CLN-003",
            Self::NoStrategySet => "E-CLN-004",
            Self::StrategyFailed { .. } => "E-CLN-005",
            Self::InvalidConfig(_) => "E-CLN-006",
            Self::Serialization(_) => "E-CLN-007",
        }
    }

    /// Whether the error comes from caller configuration rather than a strategy.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::StrategyFailed { .. })
    }
}

/// Convenience result alias for cleaner operations.
pub type CleanerResult<T> = Result<T, CleanerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CleanerError::NoBackendDetected,
            CleanerError::UnknownStrategySpecified {
                backend: "diesel".to_string(),
                strategy: "foo".to_string(),
            },
            CleanerError::InvalidArgument("x".to_string()),
            CleanerError::NoStrategySet,
            CleanerError::InvalidConfig("y".to_string()),
        ];
        let mut codes: Vec<_> = errors.iter().map(CleanerError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_unknown_strategy_message() {
        let err = CleanerError::UnknownStrategySpecified {
            backend: "sqlx".to_string(),
            strategy: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "unknown strategy `foo` for backend `sqlx`");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_strategy_failure_is_not_configuration() {
        let err = CleanerError::StrategyFailed {
            strategy: "transaction".to_string(),
            operation: "clean",
            source: "rollback refused".into(),
        };
        assert!(!err.is_configuration_error());
        assert!(err.to_string().contains("rollback refused"));
    }
}
