// Internal modules
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use grammar::ast::{
    Action, ArithmeticExpression, ArithmeticOperator, Expression, Identifier, Variable,
};
pub use grammar::builders::{ArithmeticGrammar, PrecedenceClimbing};
pub use syntax::{parse, parse_all, ActionGrammar, ParseError, ParseResult};

// Re-export action-file validation
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use file_processor::{ActionFile, FileProcessorError};
