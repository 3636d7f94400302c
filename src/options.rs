//! Options controlling how a [`crate::tokenizer::Tokenizer`] shatters lines
//! into tokens.

use crate::token::Token;

/// Knobs controlling a tokenizer's line-end, empty-line, and empty-token
/// policy. Carries no behavior of its own; [`crate::tokenizer::Tokenizer`]
/// interprets these uniformly across concrete [`crate::tokenizer::ShatterStrategy`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShatteringOptions {
    /// Drop tokens for which the tokenizer's empty-token predicate returns
    /// `true`.
    pub ignore_empty_tokens: bool,
    /// Suppress the synthetic token yielded between non-first lines.
    pub ignore_line_ends: bool,
    /// Suppress the synthetic token yielded in place of a line that produced
    /// zero tokens.
    pub ignore_empty_lines: bool,
    /// The token yielded between non-first lines when `ignore_line_ends` is
    /// `false`.
    pub line_end_token: Token,
    /// The token yielded in place of an empty line when `ignore_empty_lines`
    /// is `false`.
    pub empty_line_token: Token,
}

impl Default for ShatteringOptions {
    /// All booleans `false`; `line_end_token` is the platform newline;
    /// `empty_line_token` is the empty string.
    fn default() -> Self {
        Self {
            ignore_empty_tokens: false,
            ignore_line_ends: false,
            ignore_empty_lines: false,
            line_end_token: Some(platform_newline().to_string()),
            empty_line_token: Some(String::new()),
        }
    }
}

#[cfg(target_os = "windows")]
fn platform_newline() -> &'static str {
    "\r\n"
}

#[cfg(not(target_os = "windows"))]
fn platform_newline() -> &'static str {
    "\n"
}
