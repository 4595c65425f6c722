//! Operator precedence for binary and unary operators.

use rill_ast::SyntaxKind;

/// Operator precedence levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    /// Binds looser than every operator; the starting level of an expression.
    Lowest = 0,
    /// `|`, `||`, `^`
    LogicalOr = 1,
    /// `&`, `&&`
    LogicalAnd = 2,
    /// `==`, `!=`, `<`, `<=`, `>`, `>=`
    Comparison = 3,
    Additive = 4,
    Multiplicative = 5,
    Unary = 6,
}

/// Get the binary operator precedence for a given token kind.
pub fn get_binary_operator_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    Some(match kind {
        SyntaxKind::StarToken | SyntaxKind::SlashToken => OperatorPrecedence::Multiplicative,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::BangEqualsToken
        | SyntaxKind::LessToken
        | SyntaxKind::LessOrEqualsToken
        | SyntaxKind::GreaterToken
        | SyntaxKind::GreaterOrEqualsToken => OperatorPrecedence::Comparison,
        SyntaxKind::AmpersandToken | SyntaxKind::AmpersandAmpersandToken => {
            OperatorPrecedence::LogicalAnd
        }
        SyntaxKind::PipeToken | SyntaxKind::PipePipeToken | SyntaxKind::HatToken => {
            OperatorPrecedence::LogicalOr
        }
        _ => return None,
    })
}

/// Get the precedence of a prefix operator, if `kind` is one.
pub fn get_unary_operator_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    match kind {
        SyntaxKind::PlusToken
        | SyntaxKind::MinusToken
        | SyntaxKind::BangToken
        | SyntaxKind::TildeToken => Some(OperatorPrecedence::Unary),
        _ => None,
    }
}
