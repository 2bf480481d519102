//! Connection targets a strategy should clean for a backend.

use serde::{Deserialize, Serialize};

/// Name of the connection every backend always carries.
pub const BASE_CONNECTION: &str = "primary";

/// Ordered, duplicate-free list of connection names, always led by
/// [`BASE_CONNECTION`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTargets {
    names: Vec<String>,
}

impl Default for ConnectionTargets {
    fn default() -> Self {
        Self {
            names: vec![BASE_CONNECTION.to_string()],
        }
    }
}

impl ConnectionTargets {
    /// Base connection only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge extra names in, keeping the base entry and first-seen order.
    pub fn merge<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in extra {
            let name = name.into();
            let name = name.trim();
            if name.is_empty() || self.names.iter().any(|n| n == name) {
                continue;
            }
            self.names.push(name.to_string());
        }
    }

    /// Base connection plus `extra`.
    #[must_use]
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut targets = Self::new();
        targets.merge(extra);
        targets
    }

    /// Connection names, base first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether `name` is targeted.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_base() {
        let targets = ConnectionTargets::default();
        assert_eq!(targets.names(), [BASE_CONNECTION]);
    }

    #[test]
    fn test_merge_keeps_base_and_order() {
        let targets = ConnectionTargets::with_extra(["reporting", "primary", "audit", "reporting"]);
        assert_eq!(targets.names(), ["primary", "reporting", "audit"]);
        assert!(targets.contains("audit"));
        assert!(!targets.contains("replica"));
    }

    #[test]
    fn test_merge_skips_blank() {
        let mut targets = ConnectionTargets::new();
        targets.merge(vec![" ".to_string(), " replica ".to_string()]);
        assert_eq!(targets.names(), ["primary", "replica"]);
    }
}
