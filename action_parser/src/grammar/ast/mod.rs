//! Abstract syntax tree for actions

pub mod display;
pub mod nodes;

pub use nodes::{Action, ArithmeticExpression, ArithmeticOperator, Expression, Identifier, Variable};
