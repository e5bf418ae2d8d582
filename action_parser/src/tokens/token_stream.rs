//! Token stream over the significant tokens of one action
//!
//! The lexer keeps whitespace in its output so the tick rule and span
//! reconstruction can see it. The stream indexes the non-whitespace tokens
//! once and navigates that index, so every position the grammar saves or
//! restores is a plain `usize`.

use super::{Span, Spanned, Token};
use crate::utils::Position;

pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens including whitespace
    tokens: Vec<SpannedToken>,
    /// Indices into `tokens` of the significant tokens
    significant: Vec<usize>,
    /// Current index into `significant`
    position: usize,
    /// Span of the end-of-input marker
    eof_span: Span,
}

impl TokenStream {
    /// Build a stream; an `Eof` token is appended when the input lacks one
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if !tokens.last().is_some_and(|t| t.value.is_eof()) {
            let end = tokens
                .last()
                .map(|t| t.span.end())
                .unwrap_or_else(Position::start);
            tokens.push(Spanned::new(Token::Eof, Span::point(end)));
        }

        let significant: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.value.is_significant())
            .map(|(i, _)| i)
            .collect();

        let eof_span = tokens
            .last()
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(Position::start()));

        Self {
            tokens,
            significant,
            position: 0,
            eof_span,
        }
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&SpannedToken> {
        self.peek_ahead(0)
    }

    /// Current token, `Eof` once the stream is exhausted
    pub fn current_token(&self) -> &Token {
        self.current().map(|t| &t.value).unwrap_or(&Token::Eof)
    }

    pub fn current_span(&self) -> Span {
        self.current().map(|t| t.span).unwrap_or(self.eof_span)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.significant
            .get(self.position + n)
            .and_then(|&i| self.tokens.get(i))
    }

    pub fn peek_token(&self, n: usize) -> &Token {
        self.peek_ahead(n).map(|t| &t.value).unwrap_or(&Token::Eof)
    }

    /// Consume the current token; `Eof` is never consumed
    pub fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.current()?.clone();
        if !token.value.is_eof() {
            self.position += 1;
        }
        Some(token)
    }

    pub fn is_at_end(&self) -> bool {
        self.current_token().is_eof()
    }

    /// Number of significant tokens, `Eof` included
    pub fn len(&self) -> usize {
        self.significant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant.len() <= 1
    }

    // === MATCHING ===

    pub fn consume_if<F>(&mut self, predicate: F) -> Option<SpannedToken>
    where
        F: FnOnce(&Token) -> bool,
    {
        if predicate(self.current_token()) && !self.is_at_end() {
            self.advance()
        } else {
            None
        }
    }

    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        self.consume_if(|t| t == expected).is_some()
    }

    // === SPANS ===

    /// Span of the most recently consumed token
    pub fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|p| self.significant.get(p))
            .and_then(|&i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(self.current_span().start()))
    }

    /// Span from the token at `start_position` to the last consumed token
    pub fn span_from(&self, start_position: usize) -> Span {
        let start = self
            .significant
            .get(start_position)
            .and_then(|&i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or(self.eof_span);
        if self.position > start_position {
            start.merge(self.previous_span())
        } else {
            Span::point(start.start())
        }
    }

    pub fn eof_span(&self) -> Span {
        self.eof_span
    }

    // === CHECKPOINTS ===

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant.len().saturating_sub(1));
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.significant
            .len()
            .saturating_sub(self.position)
            .saturating_sub(1)
    }

    pub fn lookahead_tokens(&self, count: usize) -> Vec<&SpannedToken> {
        (0..count).filter_map(|n| self.peek_ahead(n)).collect()
    }

    pub fn diagnostic(&self) -> String {
        let upcoming: Vec<String> = self
            .lookahead_tokens(3)
            .iter()
            .map(|t| t.value.describe())
            .collect();
        format!(
            "position {}/{} at offset {}, next: [{}]",
            self.position,
            self.significant.len(),
            self.current_span().start().offset,
            upcoming.join(", ")
        )
    }
}

/// Builds streams from `(token, text)` pairs, computing spans as it goes
#[derive(Debug, Default)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    current_position: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current_position: Position::start(),
        }
    }

    pub fn push_token(mut self, token: Token, text: &str) -> Self {
        let start = self.current_position;
        let end = start.advance_str(text);
        self.tokens.push(Spanned::new(token, Span::new(start, end)));
        self.current_position = end;
        self
    }

    pub fn build(self) -> TokenStream {
        TokenStream::new(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_string())
    }

    fn sample() -> TokenStream {
        TokenStreamBuilder::new()
            .push_token(ident("x"), "x")
            .push_token(Token::Space, " ")
            .push_token(Token::Assign, ":=")
            .push_token(Token::Space, " ")
            .push_token(ident("y"), "y")
            .build()
    }

    #[test]
    fn test_whitespace_is_skipped() {
        let mut stream = sample();
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.current_token(), &ident("x"));
        stream.advance();
        assert_eq!(stream.current_token(), &Token::Assign);
        assert_eq!(stream.current_span().start().offset, 2);
        assert_eq!(stream.peek_token(1), &ident("y"));
        assert_eq!(stream.peek_token(2), &Token::Eof);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut stream = sample();
        for _ in 0..10 {
            stream.advance();
        }
        assert!(stream.is_at_end());
        assert_eq!(stream.remaining_count(), 0);
        assert_eq!(stream.current_span().start().offset, 6);
    }

    #[test]
    fn test_save_and_restore() {
        let mut stream = sample();
        let saved = stream.save_position();
        stream.advance();
        stream.advance();
        assert_eq!(stream.current_token(), &ident("y"));
        stream.restore_position(saved);
        assert_eq!(stream.current_token(), &ident("x"));
    }

    #[test]
    fn test_span_from() {
        let mut stream = sample();
        let start = stream.save_position();
        stream.advance();
        stream.advance();
        stream.advance();
        let span = stream.span_from(start);
        assert_eq!(span.start().offset, 0);
        assert_eq!(span.end().offset, 6);
    }

    #[test]
    fn test_consume_if_never_takes_eof() {
        let mut stream = TokenStream::new(Vec::new());
        assert!(stream.is_empty());
        assert!(stream.consume_if(|_| true).is_none());
        assert!(!stream.advance_if_matches(&Token::Eof));
    }
}
