//! Token system for action lexical analysis
//!
//! The lexer turns an action string into a flat vector of spanned tokens,
//! whitespace included. [`TokenStream`] then gives the grammar a view over the
//! significant tokens only, with lookahead and save/restore for the ordered
//! alternatives of the right-hand side.
//!
//! ## Token Types
//!
//! - **Identifiers**: `[A-Za-z][A-Za-z0-9_]*`, always a maximal run
//! - **Literals**: `True`/`False`, decimal and based numbers (`16#0304#`),
//!   single- or double-quoted strings without escapes
//! - **Punctuation**: `:=`, `(`, `)`, `,`, `.`, and the attribute tick `'`
//! - **Operators**: `+`, `-`, `*`, `/`
//! - **Whitespace** and the end-of-input marker

pub mod token;
pub mod token_stream;

pub use token::{QuoteStyle, StringLiteral, Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamBuilder};

pub use crate::utils::{Position, Span, Spanned};
