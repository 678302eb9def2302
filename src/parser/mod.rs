//! Parser module for tickle scripts
//!
//! This module contains the tokenizer. There is no syntax tree: the
//! evaluator consumes tokens directly and interleaves parsing with
//! command dispatch.

pub mod lexer;

pub use lexer::{ParseError, Parser, Token, TokenType};
