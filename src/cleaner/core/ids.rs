//! Token identifiers for backends and strategies.
//!
//! Both identifiers are open sets: the crate ships well-known constants, but
//! integrations may introduce any other non-empty token. Values are always
//! held in canonical `snake_case` (see [`super::token`]).

use core::fmt;
use core::str::FromStr;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::cleaner::core::errors::{CleanerError, CleanerResult};
use crate::cleaner::core::token::canonicalize;

/// Declare a canonical token newtype with a consistent API.
macro_rules! define_token_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        what = $what:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Build from a raw token, canonicalizing its spelling.
            ///
            /// # Errors
            /// Returns an error if the token is empty or contains anything
            /// other than ASCII alphanumerics and separators.
            pub fn new(raw: &str) -> CleanerResult<Self> {
                canonicalize(raw).map(|s| Self(Cow::Owned(s))).map_err(|err| {
                    CleanerError::InvalidConfig(format!(
                        concat!("invalid ", $what, " {:?}: {}"),
                        raw, err
                    ))
                })
            }

            /// Borrow the canonical form.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = CleanerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CleanerError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CleanerError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.into_owned()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_token_id!(
    /// Identifier of a persistence backend (ORM or data mapper).
    BackendId,
    what = "backend identifier"
);

define_token_id!(
    /// Backend-independent name of a cleaning technique.
    StrategyName,
    what = "strategy name"
);

impl BackendId {
    /// Diesel.
    pub const DIESEL: Self = Self(Cow::Borrowed("diesel"));
    /// SeaORM.
    pub const SEA_ORM: Self = Self(Cow::Borrowed("sea_orm"));
    /// SQLx.
    pub const SQLX: Self = Self(Cow::Borrowed("sqlx"));
    /// MongoDB driver.
    pub const MONGODB: Self = Self(Cow::Borrowed("mongodb"));

    /// Well-known backends in detection priority order.
    pub const KNOWN: &'static [Self] = &[Self::DIESEL, Self::SEA_ORM, Self::SQLX, Self::MONGODB];

    /// Whether this backend ships with the crate's default detection set.
    #[must_use]
    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(self)
    }
}

impl StrategyName {
    /// Wrap each test in a transaction and roll it back.
    pub const TRANSACTION: Self = Self(Cow::Borrowed("transaction"));
    /// Truncate every table.
    pub const TRUNCATION: Self = Self(Cow::Borrowed("truncation"));
    /// Delete rows from every table.
    pub const DELETION: Self = Self(Cow::Borrowed("deletion"));
}
