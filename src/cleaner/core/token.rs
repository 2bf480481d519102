//! Canonical form for symbolic tokens (backend identifiers, strategy names).
//!
//! Callers spell the same token many ways: `MongoDB`, `mongodb`, `sea-orm`,
//! ` sea orm `. Letters are folded to lowercase and separator runs become a
//! single `_`, so registry lookups never depend on case or separator choice.
//! Case changes are not word boundaries: `MongoDB` is `mongodb`.

use std::fmt;

/// Why a raw token has no canonical form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenError {
    /// Nothing but separators (or nothing at all).
    Empty,
    /// A character that is neither ASCII alphanumeric nor a separator.
    InvalidChar(char),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("token is empty"),
            Self::InvalidChar(c) => write!(f, "token contains unsupported character {c:?}"),
        }
    }
}

/// Separators collapsed into a single `_`.
const fn is_separator(c: char) -> bool {
    matches!(c, '_' | '-' | ' ' | '.' | '/' | '\\' | ':')
}

/// Canonicalize a raw token.
///
/// Leading and trailing separators are dropped. Any character outside ASCII
/// alphanumerics and separators is rejected rather than stripped, so two
/// distinct tokens never collapse onto one key.
pub(crate) fn canonicalize(raw: &str) -> Result<String, TokenError> {
    let mut canonical = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for c in raw.chars() {
        if is_separator(c) {
            pending_sep = true;
            continue;
        }
        if !c.is_ascii_alphanumeric() {
            return Err(TokenError::InvalidChar(c));
        }
        if pending_sep && !canonical.is_empty() {
            canonical.push('_');
        }
        pending_sep = false;
        canonical.push(c.to_ascii_lowercase());
    }

    if canonical.is_empty() {
        Err(TokenError::Empty)
    } else {
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(raw: &str) -> Option<String> {
        canonicalize(raw).ok()
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(canon("transaction").as_deref(), Some("transaction"));
        assert_eq!(canon("sea-orm").as_deref(), Some("sea_orm"));
        assert_eq!(canon("  sea  orm ").as_deref(), Some("sea_orm"));
        assert_eq!(canon("Sea_ORM").as_deref(), Some("sea_orm"));
        assert_eq!(canon("TRUNCATION").as_deref(), Some("truncation"));
        assert_eq!(canon("relational-orm-a").as_deref(), Some("relational_orm_a"));
    }

    #[test]
    fn test_case_changes_are_not_boundaries() {
        assert_eq!(canon("MongoDB").as_deref(), Some("mongodb"));
        assert_eq!(canon("SQLx").as_deref(), Some("sqlx"));
        assert_eq!(canon("SeaOrm").as_deref(), Some("seaorm"));
    }

    #[test]
    fn test_empty_tokens() {
        assert_eq!(canonicalize(""), Err(TokenError::Empty));
        assert_eq!(canonicalize(" -_ "), Err(TokenError::Empty));
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert_eq!(canonicalize("orm_ä"), Err(TokenError::InvalidChar('ä')));
        assert_eq!(canonicalize("orm+1"), Err(TokenError::InvalidChar('+')));
        assert!(canonicalize("orm").is_ok());
    }
}
