//! The bound tree: the typed, symbol-resolved form of a program.
//!
//! Nodes are plain owned values. Rewrites consume a tree and build a new one;
//! nothing is mutated after the binder produces it.

use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbol::{BoundLabel, FunctionSymbol, TypeSymbol, VariableSymbol};
use rill_ast::LiteralValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundNodeKind {
    // Statements
    BlockStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    LabelStatement,
    GotoStatement,
    ConditionalGotoStatement,
    ReturnStatement,
    ExpressionStatement,

    // Expressions
    ErrorExpression,
    LiteralExpression,
    VariableExpression,
    AssignmentExpression,
    UnaryExpression,
    BinaryExpression,
    CallExpression,
    ConversionExpression,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Block(BoundBlockStatement),
    VariableDeclaration(BoundVariableDeclaration),
    If(BoundIfStatement),
    While(BoundWhileStatement),
    DoWhile(BoundDoWhileStatement),
    For(BoundForStatement),
    Label(BoundLabel),
    Goto(BoundLabel),
    ConditionalGoto(BoundConditionalGotoStatement),
    Return(Option<BoundExpression>),
    Expression(BoundExpression),
}

impl BoundStatement {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundStatement::Block(_) => BoundNodeKind::BlockStatement,
            BoundStatement::VariableDeclaration(_) => BoundNodeKind::VariableDeclaration,
            BoundStatement::If(_) => BoundNodeKind::IfStatement,
            BoundStatement::While(_) => BoundNodeKind::WhileStatement,
            BoundStatement::DoWhile(_) => BoundNodeKind::DoWhileStatement,
            BoundStatement::For(_) => BoundNodeKind::ForStatement,
            BoundStatement::Label(_) => BoundNodeKind::LabelStatement,
            BoundStatement::Goto(_) => BoundNodeKind::GotoStatement,
            BoundStatement::ConditionalGoto(_) => BoundNodeKind::ConditionalGotoStatement,
            BoundStatement::Return(_) => BoundNodeKind::ReturnStatement,
            BoundStatement::Expression(_) => BoundNodeKind::ExpressionStatement,
        }
    }

    pub fn block(statements: Vec<BoundStatement>) -> Self {
        BoundStatement::Block(BoundBlockStatement { statements })
    }

    pub fn conditional_goto(label: BoundLabel, condition: BoundExpression, jump_if_true: bool) -> Self {
        BoundStatement::ConditionalGoto(BoundConditionalGotoStatement {
            label,
            condition,
            jump_if_true,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundBlockStatement {
    pub statements: Vec<BoundStatement>,
}

#[derive(Debug, Clone)]
pub struct BoundVariableDeclaration {
    pub variable: VariableSymbol,
    pub initializer: BoundExpression,
}

#[derive(Debug, Clone)]
pub struct BoundIfStatement {
    pub condition: BoundExpression,
    pub then_statement: Box<BoundStatement>,
    pub else_statement: Option<Box<BoundStatement>>,
}

#[derive(Debug, Clone)]
pub struct BoundWhileStatement {
    pub condition: BoundExpression,
    pub body: Box<BoundStatement>,
    pub break_label: BoundLabel,
    pub continue_label: BoundLabel,
}

#[derive(Debug, Clone)]
pub struct BoundDoWhileStatement {
    pub body: Box<BoundStatement>,
    pub condition: BoundExpression,
    pub break_label: BoundLabel,
    pub continue_label: BoundLabel,
}

#[derive(Debug, Clone)]
pub struct BoundForStatement {
    pub variable: VariableSymbol,
    pub lower_bound: BoundExpression,
    pub upper_bound: BoundExpression,
    /// `..=` rather than `..`.
    pub is_inclusive: bool,
    pub body: Box<BoundStatement>,
    pub break_label: BoundLabel,
    pub continue_label: BoundLabel,
}

#[derive(Debug, Clone)]
pub struct BoundConditionalGotoStatement {
    pub label: BoundLabel,
    pub condition: BoundExpression,
    pub jump_if_true: bool,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum BoundExpression {
    /// Stand-in for an expression that failed to bind. Typed `Error`.
    Error,
    Literal(LiteralValue),
    Variable(VariableSymbol),
    Assignment(BoundAssignmentExpression),
    Unary(BoundUnaryExpression),
    Binary(BoundBinaryExpression),
    Call(BoundCallExpression),
    Conversion(BoundConversionExpression),
}

impl BoundExpression {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundExpression::Error => BoundNodeKind::ErrorExpression,
            BoundExpression::Literal(_) => BoundNodeKind::LiteralExpression,
            BoundExpression::Variable(_) => BoundNodeKind::VariableExpression,
            BoundExpression::Assignment(_) => BoundNodeKind::AssignmentExpression,
            BoundExpression::Unary(_) => BoundNodeKind::UnaryExpression,
            BoundExpression::Binary(_) => BoundNodeKind::BinaryExpression,
            BoundExpression::Call(_) => BoundNodeKind::CallExpression,
            BoundExpression::Conversion(_) => BoundNodeKind::ConversionExpression,
        }
    }

    /// The resolved type of this expression.
    pub fn ty(&self) -> TypeSymbol {
        match self {
            BoundExpression::Error => TypeSymbol::Error,
            BoundExpression::Literal(LiteralValue::Int(_)) => TypeSymbol::Int,
            BoundExpression::Literal(LiteralValue::Bool(_)) => TypeSymbol::Bool,
            BoundExpression::Literal(LiteralValue::String(_)) => TypeSymbol::String,
            BoundExpression::Variable(variable) => variable.ty(),
            BoundExpression::Assignment(n) => n.variable.ty(),
            BoundExpression::Unary(n) => n.op.ty,
            BoundExpression::Binary(n) => n.op.ty,
            BoundExpression::Call(n) => n.function.return_type(),
            BoundExpression::Conversion(n) => n.ty,
        }
    }

    pub fn binary(left: BoundExpression, op: &'static BoundBinaryOperator, right: BoundExpression) -> Self {
        BoundExpression::Binary(BoundBinaryExpression {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn assignment(variable: VariableSymbol, expression: BoundExpression) -> Self {
        BoundExpression::Assignment(BoundAssignmentExpression {
            variable,
            expression: Box::new(expression),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BoundAssignmentExpression {
    pub variable: VariableSymbol,
    pub expression: Box<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundUnaryExpression {
    pub op: &'static BoundUnaryOperator,
    pub operand: Box<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundBinaryExpression {
    pub left: Box<BoundExpression>,
    pub op: &'static BoundBinaryOperator,
    pub right: Box<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundCallExpression {
    pub function: FunctionSymbol,
    pub arguments: Vec<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundConversionExpression {
    pub ty: TypeSymbol,
    pub expression: Box<BoundExpression>,
}

// ============================================================================
// Generic traversal
// ============================================================================

/// A borrowed view of any bound node, for kind-agnostic traversal.
#[derive(Debug, Clone, Copy)]
pub enum BoundNode<'a> {
    Statement(&'a BoundStatement),
    Expression(&'a BoundExpression),
}

impl<'a> BoundNode<'a> {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundNode::Statement(statement) => statement.kind(),
            BoundNode::Expression(expression) => expression.kind(),
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<BoundNode<'a>> {
        use BoundNode::{Expression as E, Statement as S};
        match *self {
            BoundNode::Statement(statement) => match statement {
                BoundStatement::Block(n) => n.statements.iter().map(S).collect(),
                BoundStatement::VariableDeclaration(n) => vec![E(&n.initializer)],
                BoundStatement::If(n) => {
                    let mut children = vec![E(&n.condition), S(&n.then_statement)];
                    if let Some(else_statement) = &n.else_statement {
                        children.push(S(else_statement));
                    }
                    children
                }
                BoundStatement::While(n) => vec![E(&n.condition), S(&n.body)],
                BoundStatement::DoWhile(n) => vec![S(&n.body), E(&n.condition)],
                BoundStatement::For(n) => vec![E(&n.lower_bound), E(&n.upper_bound), S(&n.body)],
                BoundStatement::Label(_) | BoundStatement::Goto(_) => Vec::new(),
                BoundStatement::ConditionalGoto(n) => vec![E(&n.condition)],
                BoundStatement::Return(expression) => expression.iter().map(E).collect(),
                BoundStatement::Expression(expression) => vec![E(expression)],
            },
            BoundNode::Expression(expression) => match expression {
                BoundExpression::Error
                | BoundExpression::Literal(_)
                | BoundExpression::Variable(_) => Vec::new(),
                BoundExpression::Assignment(n) => vec![E(&n.expression)],
                BoundExpression::Unary(n) => vec![E(&n.operand)],
                BoundExpression::Binary(n) => vec![E(&n.left), E(&n.right)],
                BoundExpression::Call(n) => n.arguments.iter().map(E).collect(),
                BoundExpression::Conversion(n) => vec![E(&n.expression)],
            },
        }
    }

    /// This node and all of its descendants, pre-order.
    pub fn descendants(&self) -> Vec<BoundNode<'a>> {
        let mut result = Vec::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            result.push(node);
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }
        result
    }
}

/// Output of binding one submission's declarations and global statements.
#[derive(Debug)]
pub struct BoundGlobalScope {
    pub previous: Option<std::rc::Rc<BoundGlobalScope>>,
    /// Diagnostics of earlier submissions, then this submission's syntax and
    /// binding diagnostics.
    pub diagnostics: Vec<rill_diagnostics::Diagnostic>,
    pub functions: Vec<FunctionSymbol>,
    pub variables: Vec<VariableSymbol>,
    pub statements: Vec<BoundStatement>,
}

/// A fully bound and lowered program, ready for evaluation.
#[derive(Debug, Default)]
pub struct BoundProgram {
    pub diagnostics: Vec<rill_diagnostics::Diagnostic>,
    /// Lowered body of every function visible to this submission.
    pub functions: rill_core::collections::FxIndexMap<FunctionSymbol, BoundBlockStatement>,
    /// Lowered global statements.
    pub statement: BoundBlockStatement,
}
