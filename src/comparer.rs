//! Token comparison capability.
//!
//! Every suffix comparison in [`crate::pen::Pen`] goes through a
//! [`TokenComparer`]: a paired equality + total order over tokens. The
//! crate ships four well-known, zero-sized comparers whose identity survives
//! serialization without a code reference, plus a `Custom` escape hatch for
//! anything else.
//!
//! Comparisons take [`TokenRef`] (`Option<&str>`) rather than an owned
//! [`crate::token::Token`] so the same comparer works whether a token lives
//! in a caller-supplied `Vec<Token>` or in the corpus's interned storage.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::token::TokenRef;

/// A paired equality + total order over tokens.
///
/// `token_cmp` must be consistent with `token_eq`
/// (`token_cmp(a, b) == Ordering::Equal` iff `token_eq(a, b)`), and must be a
/// genuine total order: reflexive, antisymmetric, and transitive. `None`
/// compares less than every `Some(_)` under every comparer shipped here; two
/// `None` tokens are always equal.
pub trait TokenComparer: std::fmt::Debug + Send + Sync {
    /// Declares two tokens equal under this comparer.
    fn token_eq(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> bool {
        self.token_cmp(a, b) == Ordering::Equal
    }

    /// Orders two tokens under this comparer.
    fn token_cmp(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering;
}

/// Case-sensitive ordinal (byte-wise) comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordinal;

impl TokenComparer for Ordinal {
    fn token_cmp(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(y),
        }
    }
}

/// Case-insensitive ordinal comparison (Unicode-aware lowercasing).
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalIgnoreCase;

impl TokenComparer for OrdinalIgnoreCase {
    fn token_cmp(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        }
    }
}

/// Locale-invariant comparison.
///
/// Rust has no "invariant culture" concept the way .NET does; this is kept
/// as a distinct, separately-serializable identity rather than folded into
/// [`Ordinal`], even though today it behaves identically. A future revision
/// could route this through Unicode collation without changing the
/// serialized tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invariant;

impl TokenComparer for Invariant {
    fn token_cmp(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering {
        Ordinal.token_cmp(a, b)
    }
}

/// Case-insensitive counterpart of [`Invariant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InvariantIgnoreCase;

impl TokenComparer for InvariantIgnoreCase {
    fn token_cmp(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering {
        OrdinalIgnoreCase.token_cmp(a, b)
    }
}

/// A comparer bound to a `Pen`: one of the four well-known variants, or a
/// user-supplied [`TokenComparer`] that requires an explicit converter to
/// round-trip through serialization.
#[derive(Clone)]
pub enum Comparer {
    Ordinal,
    OrdinalIgnoreCase,
    Invariant,
    InvariantIgnoreCase,
    Custom(Arc<dyn TokenComparer>),
}

impl std::fmt::Debug for Comparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparer::Ordinal => write!(f, "Comparer::Ordinal"),
            Comparer::OrdinalIgnoreCase => write!(f, "Comparer::OrdinalIgnoreCase"),
            Comparer::Invariant => write!(f, "Comparer::Invariant"),
            Comparer::InvariantIgnoreCase => write!(f, "Comparer::InvariantIgnoreCase"),
            Comparer::Custom(inner) => write!(f, "Comparer::Custom({inner:?})"),
        }
    }
}

impl Comparer {
    /// True if two tokens are equal under this comparer.
    pub fn token_eq(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> bool {
        self.dispatch(|c| c.token_eq(a, b))
    }

    /// Orders two tokens under this comparer.
    pub fn token_cmp(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering {
        self.dispatch(|c| c.token_cmp(a, b))
    }

    fn dispatch<T>(&self, f: impl FnOnce(&dyn TokenComparer) -> T) -> T {
        match self {
            Comparer::Ordinal => f(&Ordinal),
            Comparer::OrdinalIgnoreCase => f(&OrdinalIgnoreCase),
            Comparer::Invariant => f(&Invariant),
            Comparer::InvariantIgnoreCase => f(&InvariantIgnoreCase),
            Comparer::Custom(inner) => f(inner.as_ref()),
        }
    }

    /// A stable identity tag for well-known comparers, used by serde
    /// support to avoid storing code references. `None` for `Custom`.
    pub fn well_known_id(&self) -> Option<&'static str> {
        match self {
            Comparer::Ordinal => Some("ordinal"),
            Comparer::OrdinalIgnoreCase => Some("ordinal-ignore-case"),
            Comparer::Invariant => Some("invariant"),
            Comparer::InvariantIgnoreCase => Some("invariant-ignore-case"),
            Comparer::Custom(_) => None,
        }
    }

    /// Reconstructs a well-known comparer from its identity tag.
    pub fn from_well_known_id(id: &str) -> Option<Self> {
        match id {
            "ordinal" => Some(Comparer::Ordinal),
            "ordinal-ignore-case" => Some(Comparer::OrdinalIgnoreCase),
            "invariant" => Some(Comparer::Invariant),
            "invariant-ignore-case" => Some(Comparer::InvariantIgnoreCase),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Comparer;
    use serde::de::Error as DeError;
    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Comparer {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self.well_known_id() {
                Some(id) => id.serialize(serializer),
                None => Err(S::Error::custom(
                    "custom TokenComparer has no default serialization; \
                     provide an explicit converter plug-in",
                )),
            }
        }
    }

    impl<'de> Deserialize<'de> for Comparer {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let id = String::deserialize(deserializer)?;
            Comparer::from_well_known_id(&id)
                .ok_or_else(|| D::Error::custom(format!("unknown comparer identity: {id}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_orders_none_before_some() {
        assert_eq!(Ordinal.token_cmp(None, Some("")), Ordering::Less);
        assert_eq!(Ordinal.token_cmp(Some(""), None), Ordering::Greater);
        assert_eq!(Ordinal.token_cmp(None, None), Ordering::Equal);
    }

    #[test]
    fn ordinal_ignore_case_folds_case() {
        assert!(OrdinalIgnoreCase.token_eq(Some("Hello"), Some("hello")));
        assert!(!Ordinal.token_eq(Some("Hello"), Some("hello")));
    }

    #[test]
    fn comparer_dispatch_matches_underlying_types() {
        assert_eq!(
            Comparer::OrdinalIgnoreCase.token_cmp(Some("a"), Some("B")),
            OrdinalIgnoreCase.token_cmp(Some("a"), Some("B"))
        );
    }
}
