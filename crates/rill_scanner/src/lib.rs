//! rill_scanner: Lexer for rill source code.
//!
//! Produces tokens with byte-offset spans, literal values and line-break
//! flags. Malformed input is reported as diagnostics and scanning continues.

mod char_codes;
mod scanner;

pub use scanner::{scan_tokens, Scanner};
