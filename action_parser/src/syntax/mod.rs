//! Syntax analysis: action text to AST
//!
//! [`ActionGrammar`] is the immutable, reusable grammar. It holds the
//! arithmetic sub-grammar and the runtime preferences, and every call to
//! [`ActionGrammar::parse`] builds its own lexer output and cursor, so one
//! grammar can serve any number of threads at once.

pub mod error;
pub mod parser;

pub use error::{LimitKind, ParseError, ParseResult};
pub use parser::{ActionParser, ParserCheckpoint};

use crate::config::runtime::{LexicalPreferences, ParserPreferences};
use crate::grammar::ast::nodes::Action;
use crate::grammar::builders::{ArithmeticGrammar, PrecedenceClimbing};
use crate::lexical::LexicalAnalyzer;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::sync::OnceLock;

/// Immutable action grammar, built once and shared
pub struct ActionGrammar {
    arithmetic: Box<dyn ArithmeticGrammar>,
    parser_preferences: ParserPreferences,
    lexical_preferences: LexicalPreferences,
}

impl ActionGrammar {
    /// Grammar with the default precedence-climbing arithmetic
    pub fn new() -> Self {
        Self::with_arithmetic(Box::new(PrecedenceClimbing))
    }

    /// Grammar delegating arithmetic to a different implementation
    pub fn with_arithmetic(arithmetic: Box<dyn ArithmeticGrammar>) -> Self {
        Self {
            arithmetic,
            parser_preferences: ParserPreferences::default(),
            lexical_preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(
        mut self,
        parser_preferences: ParserPreferences,
        lexical_preferences: LexicalPreferences,
    ) -> Self {
        self.parser_preferences = parser_preferences;
        self.lexical_preferences = lexical_preferences;
        self
    }

    pub fn arithmetic_name(&self) -> &'static str {
        self.arithmetic.name()
    }

    pub fn parser_preferences(&self) -> &ParserPreferences {
        &self.parser_preferences
    }

    /// Parse one action; the whole input must be consumed
    pub fn parse(&self, text: &str) -> ParseResult<Action> {
        let tokens = LexicalAnalyzer::with_preferences(self.lexical_preferences.clone())
            .tokenize_to_stream(text)?;

        let mut parser =
            ActionParser::with_max_depth(tokens, self.parser_preferences.effective_max_depth());

        match parser.parse_complete_action(self.arithmetic.as_ref()) {
            Ok(action) => {
                if self.parser_preferences.log_parse_events {
                    log_debug!("Action parsed",
                        "kind" => action.kind(),
                        "length" => text.len()
                    );
                }
                Ok(action)
            }
            Err(error) => {
                let source = if self.parser_preferences.include_source_snippet {
                    text
                } else {
                    ""
                };
                log_error!(error.error_code(), &error.to_string(),
                    span = error.span(),
                    "context" => parser.current_context(),
                    "source" => source
                );
                Err(error)
            }
        }
    }

    /// Parse every action, stopping at the first failure and reporting its index
    pub fn parse_all<I, S>(&self, texts: I) -> Result<Vec<Action>, (usize, ParseError)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut actions = Vec::new();
        for (index, text) in texts.into_iter().enumerate() {
            match self.parse(text.as_ref()) {
                Ok(action) => actions.push(action),
                Err(error) => return Err((index, error)),
            }
        }

        log_success!(codes::success::ACTION_PARSED,
            "All actions parsed",
            "count" => actions.len()
        );
        Ok(actions)
    }
}

impl Default for ActionGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionGrammar")
            .field("arithmetic", &self.arithmetic.name())
            .field("parser_preferences", &self.parser_preferences)
            .finish()
    }
}

static DEFAULT_GRAMMAR: OnceLock<ActionGrammar> = OnceLock::new();

/// Process-wide grammar behind [`parse`]
pub fn default_grammar() -> &'static ActionGrammar {
    DEFAULT_GRAMMAR.get_or_init(ActionGrammar::new)
}

/// Parse one action string into an [`Action`]
pub fn parse(text: &str) -> ParseResult<Action> {
    default_grammar().parse(text)
}

/// Parse a list of action strings; the error carries the index of the first failure
pub fn parse_all<I, S>(texts: I) -> Result<Vec<Action>, (usize, ParseError)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    default_grammar().parse_all(texts)
}

/// Initialize syntax module logging validation
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::LEXICAL_MISMATCH,
        codes::syntax::UNEXPECTED_TRAILING_INPUT,
        codes::syntax::STRUCTURAL_MISMATCH,
        codes::syntax::MAX_RECURSION_DEPTH,
    ];

    for code in &syntax_codes {
        if !code.is_registered() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}
