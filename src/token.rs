//! The corpus's element type.
//!
//! A [`Token`] is a nullable string: `None` is a legal, distinct value (it
//! marks sparse input and doubles as the crate's "past the end" sentinel
//! position marker in [`crate::pen::Pen`]). Tokens are never compared by
//! reference identity; comparison always goes through a
//! [`crate::comparer::TokenComparer`].

/// A single element of a corpus.
///
/// `None` and `Some(String::new())` are distinct tokens: the former
/// represents a genuinely absent value, the latter an empty string.
pub type Token = Option<String>;

/// Borrowed view of a [`Token`], used throughout the query surface so
/// callers don't need to clone corpus contents just to look them up.
pub type TokenRef<'a> = Option<&'a str>;

/// Borrow a [`Token`] as a [`TokenRef`].
pub fn as_ref(token: &Token) -> TokenRef<'_> {
    token.as_deref()
}
