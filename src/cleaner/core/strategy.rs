//! Strategy capability, options, and the assignment argument.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cleaner::core::errors::{CleanerError, CleanerResult, StrategyFailure};
use crate::cleaner::core::ids::StrategyName;

/// A database cleaning technique bound to one backend.
///
/// The dispatcher only ever calls these two lifecycle hooks; everything else
/// (connections, transactions, table lists) is the implementation's business.
pub trait Strategy: Send {
    /// Called before a test runs.
    ///
    /// # Errors
    /// Returns an error if the strategy cannot prepare the database.
    fn start(&mut self) -> Result<(), StrategyFailure>;

    /// Called after a test to restore the database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be cleaned.
    fn clean(&mut self) -> Result<(), StrategyFailure>;

    /// Label used in logs and error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Strategy").field(&self.name()).finish()
    }
}

/// Opaque key/value options forwarded verbatim to a strategy constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyOptions(Map<String, Value>);

impl StrategyOptions {
    /// Create an explicitly empty options object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up one option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Build from a JSON value, which must be an object.
    ///
    /// # Errors
    /// Returns an error if `value` is not a JSON object.
    pub fn from_value(value: Value) -> CleanerResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CleanerError::InvalidArgument(format!(
                "strategy options must be an object, got {other}"
            ))),
        }
    }
}

/// Single-argument form of a strategy assignment.
///
/// A name is resolved through the registry for the active backend; an
/// instance bypasses resolution entirely and is used as-is.
#[derive(Debug)]
pub enum StrategySpec {
    /// Resolve by name against the active backend.
    Named(StrategyName),
    /// Use an already-built strategy.
    Instance(Box<dyn Strategy>),
}

impl StrategySpec {
    /// Parse a strategy name.
    ///
    /// # Errors
    /// Returns an error if the name is empty.
    pub fn named(raw: &str) -> CleanerResult<Self> {
        StrategyName::new(raw).map(Self::Named)
    }

    /// Wrap a concrete strategy.
    #[must_use]
    pub fn instance(strategy: impl Strategy + 'static) -> Self {
        Self::Instance(Box::new(strategy))
    }

    /// Whether this is a name to resolve.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// Decode a dynamically-typed request: `"name"` or `["name", {options}]`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the value does not have one of those
    /// shapes, in particular when options are paired with a non-name value.
    pub fn from_json(value: Value) -> CleanerResult<(Self, Option<StrategyOptions>)> {
        match value {
            Value::String(name) => Ok((Self::named(&name)?, None)),
            Value::Array(items) => {
                let mut items = items.into_iter();
                let Some(first) = items.next() else {
                    return Err(CleanerError::InvalidArgument(
                        "empty strategy list".to_string(),
                    ));
                };
                let Value::String(name) = first else {
                    return Err(CleanerError::InvalidArgument(format!(
                        "first element must be a strategy name when options are given, got {first}"
                    )));
                };
                let options = match items.next() {
                    None | Some(Value::Null) => None,
                    Some(raw) => Some(StrategyOptions::from_value(raw)?),
                };
                if items.next().is_some() {
                    return Err(CleanerError::InvalidArgument(
                        "expected at most a strategy name and one options object".to_string(),
                    ));
                }
                Ok((Self::named(&name)?, options))
            }
            other => Err(CleanerError::InvalidArgument(format!(
                "expected a strategy name or [name, options], got {other}"
            ))),
        }
    }
}

impl From<StrategyName> for StrategySpec {
    fn from(name: StrategyName) -> Self {
        Self::Named(name)
    }
}
