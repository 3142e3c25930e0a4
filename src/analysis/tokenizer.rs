//! Tokenizer implementations for text analysis.
//!
//! Tokenizers break a text into the terms that key the inverted index. The
//! same tokenizer must be applied to documents at commit time and to query
//! words at lookup time, otherwise lookups miss.
//!
//! # Available Tokenizers
//!
//! - [`bigram::BigramTokenizer`] - Overlapping two-scalar terms, suited to
//!   scripts without whitespace word boundaries
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::tokenizer::Tokenizer;
//! use tessera::analysis::tokenizer::bigram::BigramTokenizer;
//!
//! let tokenizer = BigramTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("全文检索").unwrap().collect();
//! assert_eq!(tokens.len(), 3);
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so one tokenizer can be shared by every
/// collection of a store and used from the commit thread pool.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Tokenize and keep only the term texts, in stream order.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(text)?.map(Token::into_text).collect())
    }
}

pub mod bigram;

pub use bigram::BigramTokenizer;
