//! Syntax tree node definitions.
//!
//! The tree is fully owned. Function declarations are reference counted so
//! that function symbols can keep their declaration alive across REPL
//! submissions after the tree that produced them is gone.

use crate::syntax_kind::SyntaxKind;
use crate::types::{LiteralValue, TokenFlags};
use rill_core::text::TextSpan;
use std::rc::Rc;

/// A scanned token, or a zero-width token synthesized during error recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxToken {
    pub kind: SyntaxKind,
    pub span: TextSpan,
    pub text: String,
    pub value: Option<LiteralValue>,
    pub flags: TokenFlags,
}

impl SyntaxToken {
    pub fn new(kind: SyntaxKind, span: TextSpan, text: String, value: Option<LiteralValue>) -> Self {
        Self {
            kind,
            span,
            text,
            value,
            flags: TokenFlags::NONE,
        }
    }

    /// A zero-width placeholder for a token the parser expected but did not find.
    pub fn missing(kind: SyntaxKind, pos: u32) -> Self {
        Self {
            kind,
            span: TextSpan::empty(pos),
            text: String::new(),
            value: None,
            flags: TokenFlags::MISSING,
        }
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags.contains(TokenFlags::MISSING)
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }
}

/// A list of nodes separated by tokens, e.g. call arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparatedSyntaxList<T> {
    nodes: Vec<T>,
    separators: Vec<SyntaxToken>,
}

impl<T> SeparatedSyntaxList<T> {
    pub fn new(nodes: Vec<T>, separators: Vec<SyntaxToken>) -> Self {
        debug_assert!(separators.len() + 1 >= nodes.len());
        Self { nodes, separators }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.nodes.get(index)
    }

    /// The separator following the node at `index`.
    pub fn separator(&self, index: usize) -> Option<&SyntaxToken> {
        self.separators.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.nodes.iter()
    }
}

impl<'a, T> IntoIterator for &'a SeparatedSyntaxList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

// ============================================================================
// Members
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnitSyntax {
    pub members: Vec<MemberSyntax>,
    pub end_of_file_token: SyntaxToken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberSyntax {
    FunctionDeclaration(Rc<FunctionDeclarationSyntax>),
    GlobalStatement(StatementSyntax),
}

impl MemberSyntax {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            MemberSyntax::FunctionDeclaration(_) => SyntaxKind::FunctionDeclaration,
            MemberSyntax::GlobalStatement(_) => SyntaxKind::GlobalStatement,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            MemberSyntax::FunctionDeclaration(n) => n.span(),
            MemberSyntax::GlobalStatement(n) => n.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclarationSyntax {
    pub function_keyword: SyntaxToken,
    pub identifier: SyntaxToken,
    pub open_paren_token: SyntaxToken,
    pub parameters: SeparatedSyntaxList<ParameterSyntax>,
    pub close_paren_token: SyntaxToken,
    pub type_clause: Option<TypeClauseSyntax>,
    pub body: BlockStatementSyntax,
}

impl FunctionDeclarationSyntax {
    pub fn span(&self) -> TextSpan {
        self.function_keyword.span.union(&self.body.span())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSyntax {
    pub identifier: SyntaxToken,
    pub type_clause: TypeClauseSyntax,
}

impl ParameterSyntax {
    pub fn span(&self) -> TextSpan {
        self.identifier.span.union(&self.type_clause.span())
    }
}

/// `: type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeClauseSyntax {
    pub colon_token: SyntaxToken,
    pub identifier: SyntaxToken,
}

impl TypeClauseSyntax {
    pub fn span(&self) -> TextSpan {
        self.colon_token.span.union(&self.identifier.span)
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StatementSyntax {
    Block(BlockStatementSyntax),
    VariableDeclaration(VariableDeclarationSyntax),
    If(IfStatementSyntax),
    While(WhileStatementSyntax),
    DoWhile(DoWhileStatementSyntax),
    For(ForStatementSyntax),
    Break(SyntaxToken),
    Continue(SyntaxToken),
    Return(ReturnStatementSyntax),
    Expression(ExpressionSyntax),
}

impl StatementSyntax {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            StatementSyntax::Block(_) => SyntaxKind::BlockStatement,
            StatementSyntax::VariableDeclaration(_) => SyntaxKind::VariableDeclaration,
            StatementSyntax::If(_) => SyntaxKind::IfStatement,
            StatementSyntax::While(_) => SyntaxKind::WhileStatement,
            StatementSyntax::DoWhile(_) => SyntaxKind::DoWhileStatement,
            StatementSyntax::For(_) => SyntaxKind::ForStatement,
            StatementSyntax::Break(_) => SyntaxKind::BreakStatement,
            StatementSyntax::Continue(_) => SyntaxKind::ContinueStatement,
            StatementSyntax::Return(_) => SyntaxKind::ReturnStatement,
            StatementSyntax::Expression(_) => SyntaxKind::ExpressionStatement,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            StatementSyntax::Block(n) => n.span(),
            StatementSyntax::VariableDeclaration(n) => n.keyword.span.union(&n.initializer.span()),
            StatementSyntax::If(n) => {
                let end = match &n.else_clause {
                    Some(else_clause) => else_clause.else_statement.span(),
                    None => n.then_statement.span(),
                };
                n.if_keyword.span.union(&end)
            }
            StatementSyntax::While(n) => n.while_keyword.span.union(&n.body.span()),
            StatementSyntax::DoWhile(n) => n.do_keyword.span.union(&n.condition.span()),
            StatementSyntax::For(n) => n.for_keyword.span.union(&n.body.span()),
            StatementSyntax::Break(token) | StatementSyntax::Continue(token) => token.span,
            StatementSyntax::Return(n) => match &n.expression {
                Some(expression) => n.return_keyword.span.union(&expression.span()),
                None => n.return_keyword.span,
            },
            StatementSyntax::Expression(n) => n.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatementSyntax {
    pub open_brace_token: SyntaxToken,
    pub statements: Vec<StatementSyntax>,
    pub close_brace_token: SyntaxToken,
}

impl BlockStatementSyntax {
    pub fn span(&self) -> TextSpan {
        self.open_brace_token.span.union(&self.close_brace_token.span)
    }
}

/// `var name [: type] = initializer` or `let ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationSyntax {
    pub keyword: SyntaxToken,
    pub identifier: SyntaxToken,
    pub type_clause: Option<TypeClauseSyntax>,
    pub equals_token: SyntaxToken,
    pub initializer: ExpressionSyntax,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatementSyntax {
    pub if_keyword: SyntaxToken,
    pub condition: ExpressionSyntax,
    pub then_statement: Box<StatementSyntax>,
    pub else_clause: Option<ElseClauseSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseClauseSyntax {
    pub else_keyword: SyntaxToken,
    pub else_statement: Box<StatementSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatementSyntax {
    pub while_keyword: SyntaxToken,
    pub condition: ExpressionSyntax,
    pub body: Box<StatementSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatementSyntax {
    pub do_keyword: SyntaxToken,
    pub body: Box<StatementSyntax>,
    pub while_keyword: SyntaxToken,
    pub condition: ExpressionSyntax,
}

/// `for name in lower..upper body`, or `..=` for an inclusive upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatementSyntax {
    pub for_keyword: SyntaxToken,
    pub identifier: SyntaxToken,
    pub in_keyword: SyntaxToken,
    pub lower_bound: ExpressionSyntax,
    pub range_token: SyntaxToken,
    pub upper_bound: ExpressionSyntax,
    pub body: Box<StatementSyntax>,
}

impl ForStatementSyntax {
    pub fn is_inclusive(&self) -> bool {
        self.range_token.kind == SyntaxKind::DotDotEqualsToken
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatementSyntax {
    pub return_keyword: SyntaxToken,
    pub expression: Option<ExpressionSyntax>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionSyntax {
    Literal(LiteralExpressionSyntax),
    Name(NameExpressionSyntax),
    Assignment(AssignmentExpressionSyntax),
    Unary(UnaryExpressionSyntax),
    Binary(BinaryExpressionSyntax),
    Parenthesized(ParenthesizedExpressionSyntax),
    Call(CallExpressionSyntax),
}

impl ExpressionSyntax {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            ExpressionSyntax::Literal(_) => SyntaxKind::LiteralExpression,
            ExpressionSyntax::Name(_) => SyntaxKind::NameExpression,
            ExpressionSyntax::Assignment(_) => SyntaxKind::AssignmentExpression,
            ExpressionSyntax::Unary(_) => SyntaxKind::UnaryExpression,
            ExpressionSyntax::Binary(_) => SyntaxKind::BinaryExpression,
            ExpressionSyntax::Parenthesized(_) => SyntaxKind::ParenthesizedExpression,
            ExpressionSyntax::Call(_) => SyntaxKind::CallExpression,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            ExpressionSyntax::Literal(n) => n.token.span,
            ExpressionSyntax::Name(n) => n.identifier.span,
            ExpressionSyntax::Assignment(n) => n.identifier.span.union(&n.expression.span()),
            ExpressionSyntax::Unary(n) => n.operator_token.span.union(&n.operand.span()),
            ExpressionSyntax::Binary(n) => n.left.span().union(&n.right.span()),
            ExpressionSyntax::Parenthesized(n) => {
                n.open_paren_token.span.union(&n.close_paren_token.span)
            }
            ExpressionSyntax::Call(n) => n.identifier.span.union(&n.close_paren_token.span),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpressionSyntax {
    pub token: SyntaxToken,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameExpressionSyntax {
    pub identifier: SyntaxToken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpressionSyntax {
    pub identifier: SyntaxToken,
    pub equals_token: SyntaxToken,
    pub expression: Box<ExpressionSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpressionSyntax {
    pub operator_token: SyntaxToken,
    pub operand: Box<ExpressionSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpressionSyntax {
    pub left: Box<ExpressionSyntax>,
    pub operator_token: SyntaxToken,
    pub right: Box<ExpressionSyntax>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenthesizedExpressionSyntax {
    pub open_paren_token: SyntaxToken,
    pub expression: Box<ExpressionSyntax>,
    pub close_paren_token: SyntaxToken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpressionSyntax {
    pub identifier: SyntaxToken,
    pub open_paren_token: SyntaxToken,
    pub arguments: SeparatedSyntaxList<ExpressionSyntax>,
    pub close_paren_token: SyntaxToken,
}
