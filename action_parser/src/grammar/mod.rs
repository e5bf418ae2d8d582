//! Grammar for actions: AST types and the builders that produce them

pub mod ast;
pub mod builders;

// Re-export AST types
pub use ast::nodes::*;

// Re-export builders
pub use builders::*;
