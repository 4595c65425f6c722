//! rill_parser: Recursive descent parser for rill.
//!
//! Parses token streams from the scanner into an owned syntax tree.

mod parser;
mod precedence;

pub use parser::{parse, parse_file, Parser};
pub use precedence::{get_binary_operator_precedence, get_unary_operator_precedence, OperatorPrecedence};
