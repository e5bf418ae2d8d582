//! Lexical analysis for action strings
//!
//! Turns one action into spanned tokens under the compile-time lexical limits
//! and logs failures through the global logging system.

pub mod analyzer;

use crate::config::compile_time::lexical::*;
use crate::tokens::{SpannedToken, TokenStream};

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize an action with default preferences
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Tokenize an action straight into a token stream
pub fn tokenize_to_stream(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_to_stream(source)
}

/// Validate that every lexical error code is registered (for system startup)
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::INVALID_NUMBER,
        crate::logging::codes::lexical::INVALID_BASED_LITERAL,
        crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::NUMBER_TOO_LONG,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
        crate::logging::codes::lexical::ACTION_TOO_LONG,
    ];

    for code in &lexical_codes {
        if !code.is_registered() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_action_length" => MAX_ACTION_LENGTH,
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_number_digits" => MAX_NUMBER_DIGITS,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LexicalPreferences;
    use crate::tokens::{QuoteStyle, StringLiteral, Token};
    use assert_matches::assert_matches;
    use num_bigint::BigUint;

    fn significant(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.value)
            .filter(|t| t.is_significant())
            .collect()
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_string())
    }

    fn number(value: u64) -> Token {
        Token::Number(BigUint::from(value))
    }

    #[test]
    fn test_assignment_tokens() {
        assert_eq!(
            significant("x := True"),
            vec![ident("x"), Token::Assign, Token::Boolean(true), Token::Eof]
        );
    }

    #[test]
    fn test_booleans_are_whole_words() {
        assert_eq!(significant("Falsey")[0], ident("Falsey"));
        assert_eq!(significant("TrueValue")[0], ident("TrueValue"));
        assert_eq!(significant("true")[0], ident("true"));
        assert_eq!(significant("False")[0], Token::Boolean(false));
    }

    #[test]
    fn test_identifier_with_digits_is_one_token() {
        assert_eq!(significant("X509"), vec![ident("X509"), Token::Eof]);
        assert_eq!(significant("a_b_1"), vec![ident("a_b_1"), Token::Eof]);
    }

    #[test]
    fn test_based_literals_normalize() {
        assert_eq!(significant("16#0304#")[0], number(772));
        assert_eq!(significant("2#1100000100#")[0], number(772));
        assert_eq!(significant("772")[0], number(772));
        assert_eq!(significant("16#ff#")[0], number(255));
        assert_eq!(significant("8#17#")[0], number(15));
    }

    #[test]
    fn test_large_numbers_do_not_overflow() {
        let text = "123456789012345678901234567890123456789";
        let expected = BigUint::parse_bytes(text.as_bytes(), 10).expect("valid");
        assert_eq!(significant(text)[0], Token::Number(expected));
    }

    #[test]
    fn test_tick_versus_single_quoted_string() {
        assert_eq!(
            significant("T'Read (c)"),
            vec![
                ident("T"),
                Token::Tick,
                ident("Read"),
                Token::LeftParen,
                ident("c"),
                Token::RightParen,
                Token::Eof
            ]
        );
        assert_eq!(
            significant("x := 'c e traffic'")[2],
            Token::StringLiteral(StringLiteral::new("c e traffic", QuoteStyle::Single))
        );
    }

    #[test]
    fn test_string_stops_at_first_matching_quote() {
        assert_eq!(
            significant("\"it's\"")[0],
            Token::StringLiteral(StringLiteral::new("it's", QuoteStyle::Double))
        );
        assert_eq!(
            significant("'say \"hi\"'")[0],
            Token::StringLiteral(StringLiteral::new("say \"hi\"", QuoteStyle::Single))
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("ab := 16#0304#").expect("tokenize");
        let number = tokens
            .iter()
            .find(|t| matches!(t.value, Token::Number(_)))
            .expect("number token");
        assert_eq!(number.span.start().offset, 6);
        assert_eq!(number.span.end().offset, 14);
        assert_eq!(tokens.last().map(|t| t.span.start().offset), Some(14));
    }

    #[test]
    fn test_invalid_character() {
        assert_matches!(
            tokenize("x := @"),
            Err(LexerError::InvalidCharacter { character: '@', span, .. }) if span.start.offset == 5
        );
        assert_matches!(
            tokenize("x : y"),
            Err(LexerError::InvalidCharacter { character: ':', expected: "':='", .. })
        );
    }

    #[test]
    fn test_unterminated_string_points_at_end() {
        assert_matches!(
            tokenize("x := \"abc"),
            Err(LexerError::UnterminatedString { quote: '"', opened_at: 5, span }) if span.start.offset == 9
        );
    }

    #[test]
    fn test_digit_run_glued_to_letters_is_rejected() {
        assert_matches!(
            tokenize("12ab"),
            Err(LexerError::InvalidNumber { text, .. }) if text == "12ab"
        );
        assert_matches!(tokenize("16#ff#g"), Err(LexerError::InvalidNumber { .. }));
    }

    #[test]
    fn test_malformed_based_literals() {
        assert_matches!(
            tokenize("2#102#"),
            Err(LexerError::InvalidBasedLiteral { found, span, .. }) if found == "'2'" && span.start.offset == 4
        );
        assert_matches!(
            tokenize("17#1#"),
            Err(LexerError::InvalidBasedLiteral { expected, .. }) if expected.contains("base between")
        );
        assert_matches!(
            tokenize("16#ff"),
            Err(LexerError::InvalidBasedLiteral { expected, found, .. })
                if expected == "closing '#'" && found == "end of input"
        );
        assert_matches!(tokenize("16##"), Err(LexerError::InvalidBasedLiteral { .. }));
    }

    #[test]
    fn test_identifier_limit() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_matches!(tokenize(&long), Err(LexerError::IdentifierTooLong { .. }));
    }

    #[test]
    fn test_action_length_limit() {
        let long = " ".repeat(MAX_ACTION_LENGTH + 1);
        assert_matches!(tokenize(&long), Err(LexerError::ActionTooLong { .. }));
    }

    #[test]
    fn test_metrics_collection() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: true,
            log_token_statistics: false,
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        analyzer
            .tokenize("x := f (16#10#, \"ab\") + 1")
            .expect("tokenize");
        let metrics = analyzer.metrics();
        assert_eq!(metrics.identifier_tokens, 2);
        assert_eq!(metrics.literal_tokens, 3);
        assert_eq!(metrics.operator_tokens, 1);
        assert_eq!(metrics.based_literals, 1);
        assert_eq!(metrics.max_string_length, 2);
    }

    #[test]
    fn test_error_codes() {
        let error = tokenize("x := #").expect_err("invalid");
        assert_eq!(error.error_code().as_str(), "E020");
    }

    #[test]
    fn test_init_logging() {
        assert!(init_lexical_analysis_logging().is_ok());
    }
}
