//! Text analysis module for Tessera.
//!
//! Turns raw text into the terms that key each collection's inverted index.

pub mod token;
pub mod tokenizer;

pub use token::{Token, TokenStream};
pub use tokenizer::{BigramTokenizer, Tokenizer};
