//! Overlapping bigram tokenizer implementation.

use crate::analysis::token::{IntoTokenStream, Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that emits every pair of adjacent scalar values.
///
/// Ideographic text has no whitespace between words, so instead of a
/// dictionary segmenter every adjacent pair of `char`s becomes a term. A
/// text of exactly one scalar yields that scalar as its only term, and the
/// empty string yields nothing.
///
/// Whitespace and punctuation are not stripped or folded: they take part in
/// bigrams like any other scalar, so a term always reproduces a contiguous
/// slice of the input exactly.
///
/// # Examples
///
/// ```
/// use tessera::analysis::tokenizer::bigram::BigramTokenizer;
/// use tessera::analysis::tokenizer::Tokenizer;
///
/// let tokenizer = BigramTokenizer::new();
/// let terms = tokenizer.terms("开源工具").unwrap();
/// assert_eq!(terms, vec!["开源", "源工", "工具"]);
///
/// let terms = tokenizer.terms("包").unwrap();
/// assert_eq!(terms, vec!["包"]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BigramTokenizer;

impl BigramTokenizer {
    /// Create a new bigram tokenizer.
    pub fn new() -> Self {
        BigramTokenizer
    }
}

impl Tokenizer for BigramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        // Byte offset of every scalar, plus the end of the text.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let scalar_count = boundaries.len() - 1;

        let tokens: Vec<Token> = match scalar_count {
            0 => Vec::new(),
            1 => vec![Token::with_offsets(text, 0, 0, text.len())],
            _ => boundaries
                .windows(3)
                .enumerate()
                .map(|(position, window)| {
                    let (start, end) = (window[0], window[2]);
                    Token::with_offsets(&text[start..end], position, start, end)
                })
                .collect(),
        };

        Ok(tokens.into_token_stream())
    }

    fn name(&self) -> &'static str {
        "bigram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bigram() {
        let tokenizer = BigramTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("hello").unwrap().collect();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].text, "he");
        assert_eq!(tokens[1].text, "el");
        assert_eq!(tokens[2].text, "ll");
        assert_eq!(tokens[3].text, "lo");
        assert_eq!(tokens[3].position, 3);
    }

    #[test]
    fn test_unicode_offsets() {
        let tokenizer = BigramTokenizer::new();
        let text = "日本語";
        let tokens: Vec<Token> = tokenizer.tokenize(text).unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "日本");
        assert_eq!(tokens[1].text, "本語");

        // Each of these scalars is 3 bytes in UTF-8.
        assert_eq!((tokens[0].start_offset, tokens[0].end_offset), (0, 6));
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (3, 9));
        for token in &tokens {
            assert_eq!(&text[token.start_offset..token.end_offset], token.text);
        }
    }

    #[test]
    fn test_mixed_width_scalars() {
        let tokenizer = BigramTokenizer::new();
        let terms = tokenizer.terms("a全b").unwrap();
        assert_eq!(terms, vec!["a全", "全b"]);
    }

    #[test]
    fn test_whitespace_and_punctuation_participate() {
        let tokenizer = BigramTokenizer::new();
        let terms = tokenizer.terms("a b,").unwrap();
        assert_eq!(terms, vec!["a ", " b", "b,"]);
    }

    #[test]
    fn test_single_scalar() {
        let tokenizer = BigramTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("全").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "全");
        assert_eq!(tokens[0].end_offset, 3);
    }

    #[test]
    fn test_empty() {
        let tokenizer = BigramTokenizer::new();
        assert_eq!(tokenizer.tokenize("").unwrap().count(), 0);
    }

    #[test]
    fn test_repeated_bigrams_are_kept_in_stream() {
        let tokenizer = BigramTokenizer::new();
        let terms = tokenizer.terms("abab").unwrap();
        assert_eq!(terms, vec!["ab", "ba", "ab"]);
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(BigramTokenizer::new().name(), "bigram");
    }
}
