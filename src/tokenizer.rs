//! Streaming, line-oriented tokenization.
//!
//! A [`Tokenizer`] drives line-at-a-time reads through a pluggable
//! [`ShatterStrategy`], filtering and interleaving line-end / empty-line
//! markers per [`ShatteringOptions`] uniformly regardless of which strategy
//! is in use. Both a synchronous [`Iterator`] surface and an asynchronous
//! [`futures_core::Stream`] surface (with cooperative cancellation) are
//! provided over the same policy.

use std::collections::VecDeque;
use std::io::BufRead;

use async_stream::try_stream;
use futures_core::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::error::PenError;
use crate::options::ShatteringOptions;
use crate::token::Token;

/// A pluggable per-line splitting strategy.
///
/// `shatter_line` is called only with a line that has already had its
/// line-end character(s) stripped. It must not emit line-end or empty-line
/// markers (the driver owns those) and must not filter empty tokens (the
/// driver applies `ignore_empty_tokens`); an empty input line must produce
/// an empty output.
pub trait ShatterStrategy: Send + Sync {
    fn shatter_line(&self, line: &str) -> Vec<Token>;
}

/// Treats an entire line as a single token. The only concrete strategy
/// shipped by this crate — sufficient to exercise and test the driver;
/// anything fancier (regex split, whitespace split, randomized split) is
/// the embedder's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeLineStrategy;

impl ShatterStrategy for WholeLineStrategy {
    fn shatter_line(&self, line: &str) -> Vec<Token> {
        if line.is_empty() {
            Vec::new()
        } else {
            vec![Some(line.to_string())]
        }
    }
}

fn default_is_empty_token(token: &Token) -> bool {
    token.as_deref().map_or(true, |s| s.is_empty())
}

/// Drives a [`ShatterStrategy`] over a line-oriented input source.
pub struct Tokenizer<S: ShatterStrategy> {
    strategy: S,
    is_empty_token: Box<dyn Fn(&Token) -> bool + Send + Sync>,
}

impl<S: ShatterStrategy> Tokenizer<S> {
    /// Builds a tokenizer with the default empty-token predicate: a token
    /// is empty if it's `None` or has zero length.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            is_empty_token: Box::new(default_is_empty_token),
        }
    }

    /// Overrides the empty-token predicate (e.g. whitespace-only tokens).
    pub fn with_empty_token_predicate(
        mut self,
        predicate: impl Fn(&Token) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_empty_token = Box::new(predicate);
        self
    }

    /// A lazy, synchronous token sequence over `reader`. `options` of
    /// `None` uses [`ShatteringOptions::default`]. I/O errors from `reader`
    /// surface unchanged, wrapped in [`PenError::Io`].
    pub fn shatter<R: BufRead>(&self, reader: R, options: Option<ShatteringOptions>) -> Shatter<'_, S, R> {
        Shatter {
            tokenizer: self,
            lines: reader.lines(),
            options: options.unwrap_or_default(),
            pending: VecDeque::new(),
            emitted_any_line: false,
            done: false,
        }
    }

    /// A lazy, asynchronous token stream over `reader`, cooperatively
    /// cancellable via `cancel`. Cancellation is polled immediately before
    /// each line read and before each yielded token; already-yielded
    /// tokens are never rescinded.
    pub fn shatter_async<'a, R>(
        &'a self,
        mut reader: R,
        options: Option<ShatteringOptions>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<Token, PenError>> + 'a
    where
        R: AsyncBufRead + Unpin + Send + 'a,
        S: 'a,
    {
        let options = options.unwrap_or_default();
        try_stream! {
            let mut emitted_any_line = false;
            let mut raw_line = String::new();
            loop {
                if cancel.is_cancelled() {
                    Err(PenError::Cancelled)?;
                }
                raw_line.clear();
                let n = reader.read_line(&mut raw_line).await.map_err(PenError::Io)?;
                if n == 0 {
                    break;
                }
                let line = strip_newline(&raw_line);
                let mut tokens = self.strategy.shatter_line(line);
                if options.ignore_empty_tokens {
                    tokens.retain(|t| !(self.is_empty_token)(t));
                }
                if tokens.is_empty() && options.ignore_empty_lines {
                    continue;
                }

                if emitted_any_line && !options.ignore_line_ends {
                    if cancel.is_cancelled() {
                        Err(PenError::Cancelled)?;
                    }
                    yield options.line_end_token.clone();
                }
                if tokens.is_empty() {
                    if cancel.is_cancelled() {
                        Err(PenError::Cancelled)?;
                    }
                    yield options.empty_line_token.clone();
                } else {
                    for token in tokens {
                        if cancel.is_cancelled() {
                            Err(PenError::Cancelled)?;
                        }
                        yield token;
                    }
                }
                emitted_any_line = true;
            }
        }
    }
}

fn strip_newline(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

/// The lazy iterator returned by [`Tokenizer::shatter`].
pub struct Shatter<'a, S: ShatterStrategy, R: BufRead> {
    tokenizer: &'a Tokenizer<S>,
    lines: std::io::Lines<R>,
    options: ShatteringOptions,
    pending: VecDeque<Token>,
    emitted_any_line: bool,
    done: bool,
}

impl<'a, S: ShatterStrategy, R: BufRead> Iterator for Shatter<'a, S, R> {
    type Item = Result<Token, PenError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(PenError::Io(e)));
                }
                Some(Ok(line)) => {
                    let mut tokens = self.tokenizer.strategy.shatter_line(&line);
                    if self.options.ignore_empty_tokens {
                        tokens.retain(|t| !(self.tokenizer.is_empty_token)(t));
                    }
                    if tokens.is_empty() && self.options.ignore_empty_lines {
                        continue;
                    }

                    if self.emitted_any_line && !self.options.ignore_line_ends {
                        self.pending.push_back(self.options.line_end_token.clone());
                    }
                    if tokens.is_empty() {
                        self.pending.push_back(self.options.empty_line_token.clone());
                    } else {
                        self.pending.extend(tokens);
                    }
                    self.emitted_any_line = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::io::Cursor;

    #[test]
    fn default_empty_token_predicate_treats_none_and_empty_string_as_empty() {
        assert!(default_is_empty_token(&None));
        assert!(default_is_empty_token(&Some(String::new())));
        assert!(!default_is_empty_token(&Some("x".to_string())));
    }

    #[test]
    fn whole_line_strategy_skips_empty_input_lines() {
        assert_eq!(WholeLineStrategy.shatter_line(""), Vec::<Token>::new());
        assert_eq!(WholeLineStrategy.shatter_line("abc"), vec![Some("abc".to_string())]);
    }

    fn collect_sync<S: ShatterStrategy>(
        tokenizer: &Tokenizer<S>,
        input: &str,
        options: Option<ShatteringOptions>,
    ) -> Vec<Token> {
        tokenizer
            .shatter(Cursor::new(input.as_bytes()), options)
            .map(|r| r.expect("no io error from an in-memory cursor"))
            .collect()
    }

    /// Tokenizer closure (invariant 9): with no suppression and the
    /// whole-line strategy, re-joining emitted tokens with the line-end
    /// token reconstructs the input (up to the resolved no-trailing-line-end
    /// behavior — see DESIGN.md).
    #[test]
    fn closure_reconstructs_input_with_whole_line_strategy() {
        let tokenizer = Tokenizer::new(WholeLineStrategy);
        let input = "line1\nline2\nline3";
        let tokens = collect_sync(&tokenizer, input, None);
        let rejoined = tokens
            .into_iter()
            .map(|t| t.unwrap_or_default())
            .collect::<Vec<_>>()
            .concat();
        assert_eq!(rejoined, input);
    }

    struct SplitWhitespace;
    impl ShatterStrategy for SplitWhitespace {
        fn shatter_line(&self, line: &str) -> Vec<Token> {
            line.split_whitespace().map(|w| Some(w.to_string())).collect()
        }
    }

    #[test]
    fn line_end_and_empty_line_policy_matrix() {
        let tokenizer = Tokenizer::new(SplitWhitespace);
        let options = ShatteringOptions {
            ignore_empty_tokens: true,
            ignore_line_ends: false,
            ignore_empty_lines: false,
            line_end_token: Some("<LE>".to_string()),
            empty_line_token: Some("<EL>".to_string()),
        };
        let tokens = collect_sync(&tokenizer, "a\n\nb\n", Some(options));
        let expected: Vec<Token> = vec!["a", "<LE>", "<EL>", "<LE>", "b"]
            .into_iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn ignore_empty_lines_suppresses_surrounding_line_ends() {
        let tokenizer = Tokenizer::new(SplitWhitespace);
        let options = ShatteringOptions {
            ignore_empty_tokens: true,
            ignore_line_ends: false,
            ignore_empty_lines: true,
            line_end_token: Some("<LE>".to_string()),
            empty_line_token: Some("<EL>".to_string()),
        };
        let tokens = collect_sync(&tokenizer, "a\n\nb\n", Some(options));
        let expected: Vec<Token> = vec!["a", "<LE>", "b"]
            .into_iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(tokens, expected);
    }

    #[tokio::test]
    async fn async_stream_matches_sync_policy() {
        let tokenizer = Tokenizer::new(SplitWhitespace);
        let options = ShatteringOptions {
            ignore_empty_tokens: true,
            ignore_line_ends: false,
            ignore_empty_lines: false,
            line_end_token: Some("<LE>".to_string()),
            empty_line_token: Some("<EL>".to_string()),
        };
        let reader = tokio::io::BufReader::new(Cursor::new(b"a\n\nb\n".to_vec()));
        let stream = tokenizer.shatter_async(reader, Some(options), CancellationToken::new());
        tokio::pin!(stream);
        let mut collected = Vec::new();
        while let Some(item) = stream.next().await {
            collected.push(item.unwrap());
        }
        let expected: Vec<Token> = vec!["a", "<LE>", "<EL>", "<LE>", "b"]
            .into_iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(collected, expected);
    }

    #[tokio::test]
    async fn cancellation_surfaces_before_any_read() {
        let tokenizer = Tokenizer::new(WholeLineStrategy);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let reader = tokio::io::BufReader::new(Cursor::new(b"a\nb\n".to_vec()));
        let stream = tokenizer.shatter_async(reader, None, cancel);
        tokio::pin!(stream);
        match stream.next().await {
            Some(Err(PenError::Cancelled)) => {}
            other => panic!("expected Cancelled, got {other:?}"),
        }
    }
}
