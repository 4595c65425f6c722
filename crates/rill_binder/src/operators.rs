//! Fixed unary and binary operator tables.
//!
//! Binding an operator is a table lookup keyed on the operator token and the
//! operand types. A miss means the operator is undefined for those types.

use crate::symbol::TypeSymbol;
use rill_ast::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundUnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundUnaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundUnaryOperatorKind,
    pub operand_type: TypeSymbol,
    pub ty: TypeSymbol,
}

impl BoundUnaryOperator {
    const fn new(syntax_kind: SyntaxKind, kind: BoundUnaryOperatorKind, operand_type: TypeSymbol) -> Self {
        Self {
            syntax_kind,
            kind,
            operand_type,
            ty: operand_type,
        }
    }

    pub fn bind(syntax_kind: SyntaxKind, operand_type: TypeSymbol) -> Option<&'static BoundUnaryOperator> {
        UNARY_OPERATORS
            .iter()
            .find(|op| op.syntax_kind == syntax_kind && op.operand_type == operand_type)
    }
}

/// `!bool`, used to label the fall-through edge of a conditional branch.
pub static BOOL_LOGICAL_NEGATION: BoundUnaryOperator =
    BoundUnaryOperator::new(SyntaxKind::BangToken, BoundUnaryOperatorKind::LogicalNegation, TypeSymbol::Bool);

static UNARY_OPERATORS: [BoundUnaryOperator; 4] = [
    BoundUnaryOperator::new(SyntaxKind::BangToken, BoundUnaryOperatorKind::LogicalNegation, TypeSymbol::Bool),
    BoundUnaryOperator::new(SyntaxKind::PlusToken, BoundUnaryOperatorKind::Identity, TypeSymbol::Int),
    BoundUnaryOperator::new(SyntaxKind::MinusToken, BoundUnaryOperatorKind::Negation, TypeSymbol::Int),
    BoundUnaryOperator::new(SyntaxKind::TildeToken, BoundUnaryOperatorKind::OnesComplement, TypeSymbol::Int),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundBinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundBinaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundBinaryOperatorKind,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    /// Result type.
    pub ty: TypeSymbol,
}

impl BoundBinaryOperator {
    const fn new(syntax_kind: SyntaxKind, kind: BoundBinaryOperatorKind, operand_type: TypeSymbol, ty: TypeSymbol) -> Self {
        Self {
            syntax_kind,
            kind,
            left_type: operand_type,
            right_type: operand_type,
            ty,
        }
    }

    pub fn bind(
        syntax_kind: SyntaxKind,
        left_type: TypeSymbol,
        right_type: TypeSymbol,
    ) -> Option<&'static BoundBinaryOperator> {
        BINARY_OPERATORS.iter().find(|op| {
            op.syntax_kind == syntax_kind && op.left_type == left_type && op.right_type == right_type
        })
    }
}

use BoundBinaryOperatorKind as B;

/// `int < int`, used when lowering exclusive `for` ranges.
pub static INT_LESS: BoundBinaryOperator =
    BoundBinaryOperator::new(SyntaxKind::LessToken, B::Less, TypeSymbol::Int, TypeSymbol::Bool);
/// `int <= int`, used when lowering inclusive `for` ranges.
pub static INT_LESS_OR_EQUALS: BoundBinaryOperator =
    BoundBinaryOperator::new(SyntaxKind::LessOrEqualsToken, B::LessOrEquals, TypeSymbol::Int, TypeSymbol::Bool);
/// `int + int`, used for the `for` loop increment.
pub static INT_ADDITION: BoundBinaryOperator =
    BoundBinaryOperator::new(SyntaxKind::PlusToken, B::Addition, TypeSymbol::Int, TypeSymbol::Int);

static BINARY_OPERATORS: [BoundBinaryOperator; 23] = [
    BoundBinaryOperator::new(SyntaxKind::PlusToken, B::Addition, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::MinusToken, B::Subtraction, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::StarToken, B::Multiplication, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::SlashToken, B::Division, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::AmpersandToken, B::BitwiseAnd, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::PipeToken, B::BitwiseOr, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::HatToken, B::BitwiseXor, TypeSymbol::Int, TypeSymbol::Int),
    BoundBinaryOperator::new(SyntaxKind::EqualsEqualsToken, B::Equals, TypeSymbol::Int, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::BangEqualsToken, B::NotEquals, TypeSymbol::Int, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::LessToken, B::Less, TypeSymbol::Int, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::LessOrEqualsToken, B::LessOrEquals, TypeSymbol::Int, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::GreaterToken, B::Greater, TypeSymbol::Int, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::GreaterOrEqualsToken, B::GreaterOrEquals, TypeSymbol::Int, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::AmpersandAmpersandToken, B::LogicalAnd, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::PipePipeToken, B::LogicalOr, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::AmpersandToken, B::BitwiseAnd, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::PipeToken, B::BitwiseOr, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::HatToken, B::BitwiseXor, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::EqualsEqualsToken, B::Equals, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::BangEqualsToken, B::NotEquals, TypeSymbol::Bool, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::PlusToken, B::Addition, TypeSymbol::String, TypeSymbol::String),
    BoundBinaryOperator::new(SyntaxKind::EqualsEqualsToken, B::Equals, TypeSymbol::String, TypeSymbol::Bool),
    BoundBinaryOperator::new(SyntaxKind::BangEqualsToken, B::NotEquals, TypeSymbol::String, TypeSymbol::Bool),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ampersand_depends_on_operand_type() {
        let on_bool = BoundBinaryOperator::bind(SyntaxKind::AmpersandToken, TypeSymbol::Bool, TypeSymbol::Bool).unwrap();
        let on_int = BoundBinaryOperator::bind(SyntaxKind::AmpersandToken, TypeSymbol::Int, TypeSymbol::Int).unwrap();
        assert_eq!(on_bool.ty, TypeSymbol::Bool);
        assert_eq!(on_int.ty, TypeSymbol::Int);
    }

    #[test]
    fn test_mixed_operands_are_undefined() {
        assert!(BoundBinaryOperator::bind(SyntaxKind::PlusToken, TypeSymbol::Int, TypeSymbol::Bool).is_none());
        assert!(BoundBinaryOperator::bind(SyntaxKind::StarToken, TypeSymbol::String, TypeSymbol::String).is_none());
        assert!(BoundUnaryOperator::bind(SyntaxKind::MinusToken, TypeSymbol::Bool).is_none());
    }

    #[test]
    fn test_lowering_operators_match_table() {
        let less = BoundBinaryOperator::bind(SyntaxKind::LessToken, TypeSymbol::Int, TypeSymbol::Int).unwrap();
        assert_eq!(less, &INT_LESS);
        let add = BoundBinaryOperator::bind(SyntaxKind::PlusToken, TypeSymbol::Int, TypeSymbol::Int).unwrap();
        assert_eq!(add, &INT_ADDITION);
        assert_eq!(INT_LESS_OR_EQUALS.kind, B::LessOrEquals);
    }
}
