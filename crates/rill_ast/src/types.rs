//! Token-level flags and literal values.

use std::fmt;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        const NONE                  = 0;
        const PRECEDING_LINE_BREAK  = 1 << 0;
        const UNTERMINATED          = 1 << 1;
        /// Synthesized by the parser to recover from a missing token.
        const MISSING               = 1 << 2;
    }
}

/// The value carried by a literal token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Int(i32),
    Bool(bool),
    String(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(value) => write!(f, "{}", value),
            LiteralValue::Bool(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "{}", value),
        }
    }
}
