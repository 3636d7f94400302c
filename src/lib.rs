//! Lazy corpus-resampling text generation over a suffix-sorted token index.
//!
//! The core is [`pen::Pen`]: an immutable index over a token corpus that
//! answers suffix-range queries in `O(log C)` and drives [`pen::Pen::render`],
//! a lazy stream whose only randomness comes from a caller-supplied picker.
//! [`tokenizer::Tokenizer`] turns line-oriented text into the token
//! sequences a `Pen` consumes.

pub mod comparer;
pub mod error;
pub mod extensions;
pub mod options;
pub mod pen;
pub mod token;
pub mod tokenizer;

pub use comparer::{Comparer, TokenComparer};
pub use error::{PenError, PenResult};
pub use options::ShatteringOptions;
pub use pen::{Pen, PenBuilder, Render};
pub use token::{Token, TokenRef};
pub use tokenizer::{ShatterStrategy, Tokenizer, WholeLineStrategy};
