//! Token cursor that drives the grammar builders
//!
//! One `ActionParser` exists per parse call. It owns the token stream, the
//! nesting depth counter and a bounded context stack used for diagnostics.

use crate::config::compile_time::syntax::*;
use crate::grammar::ast::nodes::Action;
use crate::grammar::builders::{parse_action, ArithmeticGrammar, Parser};
use crate::syntax::error::{LimitKind, ParseError, ParseResult};
use crate::tokens::{Token, TokenStream};
use crate::utils::Span;
use crate::log_debug;

/// Parser checkpoint for backtracking
#[derive(Debug, Clone)]
pub struct ParserCheckpoint {
    /// Position in token stream
    pub position: usize,
    /// Nesting depth at the time of the checkpoint
    pub depth: usize,
    /// Context stack snapshot
    pub context_stack: Vec<&'static str>,
}

pub struct ActionParser {
    tokens: TokenStream,
    max_depth: usize,
    depth: usize,
    context_stack: Vec<&'static str>,
    /// Contexts entered beyond the stack capacity
    suppressed_contexts: usize,
}

impl ActionParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_max_depth(tokens, MAX_PARSE_DEPTH)
    }

    /// Limit nesting to `max_depth`, never above the compile-time ceiling
    pub fn with_max_depth(tokens: TokenStream, max_depth: usize) -> Self {
        Self {
            tokens,
            max_depth: max_depth.clamp(1, MAX_PARSE_DEPTH),
            depth: 0,
            context_stack: Vec::new(),
            suppressed_contexts: 0,
        }
    }

    /// Parse one action and require that it spans the whole input
    pub fn parse_complete_action(
        &mut self,
        arithmetic: &dyn ArithmeticGrammar,
    ) -> ParseResult<Action> {
        let action = parse_action(self, arithmetic)?;

        if !self.tokens.is_at_end() {
            return Err(ParseError::trailing_input(
                self.tokens.current_token(),
                self.tokens.current_span(),
            ));
        }

        Ok(action)
    }

    // === BACKTRACKING SUPPORT ===

    pub fn save_checkpoint(&self) -> ParserCheckpoint {
        ParserCheckpoint {
            position: self.tokens.save_position(),
            depth: self.depth,
            context_stack: self.context_stack.clone(),
        }
    }

    pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
        self.tokens.restore_position(checkpoint.position);
        self.depth = checkpoint.depth;
        self.context_stack = checkpoint.context_stack;
    }

    // === CONTEXT TRACKING ===

    pub fn current_context(&self) -> String {
        let mut context = self.context_stack.join(" -> ");
        if self.suppressed_contexts > 0 {
            context.push_str(&format!(" -> ... ({} more)", self.suppressed_contexts));
        }
        context
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // === LOOKAHEAD ===

    /// Upcoming tokens, bounded by the configured lookahead window
    pub fn lookahead(&self, count: usize) -> Vec<&Token> {
        self.tokens
            .lookahead_tokens(count.min(MAX_LOOKAHEAD_TOKENS))
            .into_iter()
            .map(|spanned| &spanned.value)
            .collect()
    }

    pub fn diagnostic_info(&self) -> String {
        format!(
            "{}, depth {}/{}, context [{}]",
            self.tokens.diagnostic(),
            self.depth,
            self.max_depth,
            self.current_context()
        )
    }
}

impl Parser for ActionParser {
    fn current_token(&self) -> &Token {
        self.tokens.current_token()
    }

    fn peek_token(&self, n: usize) -> &Token {
        self.tokens.peek_token(n)
    }

    fn advance(&mut self) {
        self.tokens.advance();
    }

    fn save_position(&self) -> usize {
        self.tokens.save_position()
    }

    fn restore_position(&mut self, position: usize) {
        self.tokens.restore_position(position);
    }

    fn enter_nesting(&mut self, context: &'static str) -> ParseResult<()> {
        if self.depth >= self.max_depth {
            return Err(ParseError::limit_exceeded(
                LimitKind::NestingDepth,
                self.depth + 1,
                self.max_depth,
                self.tokens.current_span(),
            ));
        }
        self.depth += 1;

        if self.context_stack.len() < MAX_CONTEXT_STACK_DEPTH {
            self.context_stack.push(context);
        } else {
            self.suppressed_contexts += 1;
        }

        log_debug!("Entering parsing context",
            "context" => context,
            "depth" => self.depth
        );
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.suppressed_contexts > 0 {
            self.suppressed_contexts -= 1;
        } else {
            self.context_stack.pop();
        }
    }

    fn current_span(&self) -> Span {
        self.tokens.current_span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::builders::PrecedenceClimbing;
    use crate::lexical::tokenize_to_stream;
    use assert_matches::assert_matches;

    fn parser_for(source: &str) -> ActionParser {
        ActionParser::new(tokenize_to_stream(source).expect("tokenize"))
    }

    #[test]
    fn test_context_management() {
        let mut parser = parser_for("x := 1");
        assert_eq!(parser.current_context(), "");

        parser.enter_nesting("call").expect("enter");
        parser.enter_nesting("negation").expect("enter");
        assert_eq!(parser.current_context(), "call -> negation");
        assert_eq!(parser.depth(), 2);

        parser.exit_nesting();
        assert_eq!(parser.current_context(), "call");
        parser.exit_nesting();
        assert_eq!(parser.current_context(), "");
        assert_eq!(parser.depth(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let tokens = tokenize_to_stream("x").expect("tokenize");
        let mut parser = ActionParser::with_max_depth(tokens, 2);
        assert!(parser.enter_nesting("a").is_ok());
        assert!(parser.enter_nesting("b").is_ok());
        assert_matches!(
            parser.enter_nesting("c"),
            Err(ParseError::LimitExceeded { limit: LimitKind::NestingDepth, actual: 3, maximum: 2, .. })
        );
    }

    #[test]
    fn test_context_stack_overflow_stays_balanced() {
        let mut parser = parser_for("x");
        let levels = MAX_CONTEXT_STACK_DEPTH + 3;
        for _ in 0..levels {
            parser.enter_nesting("call").expect("enter");
        }
        assert!(parser.current_context().contains("(3 more)"));
        for _ in 0..levels {
            parser.exit_nesting();
        }
        assert_eq!(parser.current_context(), "");
    }

    #[test]
    fn test_checkpoint_system() {
        let mut parser = parser_for("a + 1");
        let checkpoint = parser.save_checkpoint();
        parser.advance();
        parser.enter_nesting("call").expect("enter");
        assert_eq!(parser.current_token(), &Token::Plus);

        parser.restore_checkpoint(checkpoint);
        assert_eq!(parser.current_token(), &Token::Identifier("a".into()));
        assert_eq!(parser.depth(), 0);
        assert_eq!(parser.current_context(), "");
    }

    #[test]
    fn test_lookahead_limiting() {
        let parser = parser_for("f (a, b, c, d, e, g, h, i, j, k, l)");
        assert_eq!(parser.lookahead(1000).len(), MAX_LOOKAHEAD_TOKENS);
    }

    #[test]
    fn test_complete_action_rejects_trailing_tokens() {
        let mut parser = parser_for("x := 1 2");
        assert_matches!(
            parser.parse_complete_action(&PrecedenceClimbing),
            Err(ParseError::UnexpectedTrailingInput { span, .. }) if span.start.offset == 7
        );
    }

    #[test]
    fn test_diagnostic_info() {
        let parser = parser_for("x := 1");
        let info = parser.diagnostic_info();
        assert!(info.contains("depth 0/"));
        assert!(info.contains("identifier 'x'"));
    }
}
