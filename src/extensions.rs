//! Thin convenience adapters: materializing a lazy token sequence, and
//! feeding an in-memory string through the tokenizer base.

use std::io::Cursor;

use futures_core::Stream;
use futures_util::StreamExt;

use crate::error::PenError;
use crate::token::Token;

/// Materializes a fallible token iterator into a `Vec`, short-circuiting on
/// the first error. Specified only by behavior: `std::iter::Iterator::
/// collect` already does this; this trait exists so the operation has a
/// name on the public surface, matching the adapters the tokenizer's
/// sibling components expose.
pub trait IteratorExt: Iterator<Item = Result<Token, PenError>> {
    fn collect_tokens(self) -> Result<Vec<Token>, PenError>;
}

impl<I> IteratorExt for I
where
    I: Iterator<Item = Result<Token, PenError>>,
{
    fn collect_tokens(self) -> Result<Vec<Token>, PenError> {
        self.collect()
    }
}

/// Async counterpart of [`IteratorExt::collect_tokens`], for the stream
/// returned by [`crate::tokenizer::Tokenizer::shatter_async`].
pub trait StreamTokenExt: Stream<Item = Result<Token, PenError>> {
    fn collect_tokens_async<'s>(self) -> futures_util::future::BoxFuture<'s, Result<Vec<Token>, PenError>>
    where
        Self: Sized + Send + 's;
}

impl<S> StreamTokenExt for S
where
    S: Stream<Item = Result<Token, PenError>>,
{
    fn collect_tokens_async<'s>(self) -> futures_util::future::BoxFuture<'s, Result<Vec<Token>, PenError>>
    where
        Self: Sized + Send + 's,
    {
        Box::pin(async move {
            let mut out = Vec::new();
            let mut stream = self;
            tokio::pin!(stream);
            while let Some(item) = stream.next().await {
                out.push(item?);
            }
            Ok(out)
        })
    }
}

/// Wraps a string slice in an in-memory reader suitable for
/// [`crate::tokenizer::Tokenizer::shatter`].
pub trait StrExt {
    fn into_token_reader(&self) -> Cursor<&[u8]>;
}

impl StrExt for str {
    fn into_token_reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{Tokenizer, WholeLineStrategy};
    use std::io::BufReader;

    #[test]
    fn collect_tokens_materializes_a_shatter_iterator() {
        let tokenizer = Tokenizer::new(WholeLineStrategy);
        let reader = BufReader::new("a\nb".into_token_reader());
        let tokens = tokenizer.shatter(reader, None).collect_tokens().unwrap();
        assert_eq!(
            tokens,
            vec![Some("a".to_string()), Some("\n".to_string()), Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn collect_tokens_async_materializes_a_shatter_stream() {
        let tokenizer = Tokenizer::new(WholeLineStrategy);
        let reader = tokio::io::BufReader::new(std::io::Cursor::new(b"a\nb".to_vec()));
        let stream = tokenizer.shatter_async(reader, None, tokio_util::sync::CancellationToken::new());
        let tokens = stream.collect_tokens_async().await.unwrap();
        assert_eq!(
            tokens,
            vec![Some("a".to_string()), Some("\n".to_string()), Some("b".to_string())]
        );
    }
}
