//! Recursive-descent builders for action productions
//!
//! Dependency order: atomic → variable → call → attribute, arithmetic → action.

pub mod action;
pub mod arithmetic;
pub mod atomic;
pub mod attribute;
pub mod call;
pub mod variable;

pub use action::{parse_action, parse_right_hand_side};
pub use arithmetic::{ArithmeticGrammar, PrecedenceClimbing};
pub use atomic::{parse_boolean, parse_literal, parse_number, parse_string, Parser};
pub use attribute::{parse_read_attribute, parse_write_attribute};
pub use call::{parse_call, parse_call_argument};
pub use variable::{at_attribute_start, at_call_start, parse_variable};
