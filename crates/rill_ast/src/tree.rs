//! A borrowed, uniform view over syntax nodes and a tree printer built on it.
//!
//! Every node kind exposes its direct children in source order, tokens
//! included, so generic walks need not match on each node type.

use crate::node::*;
use crate::syntax_kind::SyntaxKind;
use rill_core::text::TextSpan;
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy)]
pub enum SyntaxNode<'a> {
    Token(&'a SyntaxToken),
    CompilationUnit(&'a CompilationUnitSyntax),
    Member(&'a MemberSyntax),
    Parameter(&'a ParameterSyntax),
    TypeClause(&'a TypeClauseSyntax),
    ElseClause(&'a ElseClauseSyntax),
    Statement(&'a StatementSyntax),
    Expression(&'a ExpressionSyntax),
}

impl<'a> SyntaxNode<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxNode::Token(token) => token.kind,
            SyntaxNode::CompilationUnit(_) => SyntaxKind::CompilationUnit,
            SyntaxNode::Member(member) => member.kind(),
            SyntaxNode::Parameter(_) => SyntaxKind::Parameter,
            SyntaxNode::TypeClause(_) => SyntaxKind::TypeClause,
            SyntaxNode::ElseClause(_) => SyntaxKind::ElseClause,
            SyntaxNode::Statement(statement) => statement.kind(),
            SyntaxNode::Expression(expression) => expression.kind(),
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            SyntaxNode::Token(token) => token.span,
            SyntaxNode::CompilationUnit(unit) => {
                let end = unit.end_of_file_token.span;
                match unit.members.first() {
                    Some(first) => first.span().union(&end),
                    None => end,
                }
            }
            SyntaxNode::Member(member) => member.span(),
            SyntaxNode::Parameter(parameter) => parameter.span(),
            SyntaxNode::TypeClause(clause) => clause.span(),
            SyntaxNode::ElseClause(clause) => clause.else_keyword.span.union(&clause.else_statement.span()),
            SyntaxNode::Statement(statement) => statement.span(),
            SyntaxNode::Expression(expression) => expression.span(),
        }
    }

    /// Direct children in source order. Tokens have none.
    pub fn children(&self) -> Vec<SyntaxNode<'a>> {
        use SyntaxNode as N;

        let mut children = Vec::new();
        match *self {
            N::Token(_) => {}
            N::CompilationUnit(unit) => {
                children.extend(unit.members.iter().map(N::Member));
                children.push(N::Token(&unit.end_of_file_token));
            }
            N::Member(MemberSyntax::FunctionDeclaration(function)) => {
                children.push(N::Token(&function.function_keyword));
                children.push(N::Token(&function.identifier));
                children.push(N::Token(&function.open_paren_token));
                push_separated(&mut children, &function.parameters, N::Parameter);
                children.push(N::Token(&function.close_paren_token));
                if let Some(clause) = &function.type_clause {
                    children.push(N::TypeClause(clause));
                }
                push_block(&mut children, &function.body);
            }
            N::Member(MemberSyntax::GlobalStatement(statement)) => children.push(N::Statement(statement)),
            N::Parameter(parameter) => {
                children.push(N::Token(&parameter.identifier));
                children.push(N::TypeClause(&parameter.type_clause));
            }
            N::TypeClause(clause) => {
                children.push(N::Token(&clause.colon_token));
                children.push(N::Token(&clause.identifier));
            }
            N::ElseClause(clause) => {
                children.push(N::Token(&clause.else_keyword));
                children.push(N::Statement(&clause.else_statement));
            }
            N::Statement(statement) => statement_children(&mut children, statement),
            N::Expression(expression) => expression_children(&mut children, expression),
        }
        children
    }

    /// Write this node and its descendants as an indented tree.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }
}

fn push_block<'a>(children: &mut Vec<SyntaxNode<'a>>, block: &'a BlockStatementSyntax) {
    children.push(SyntaxNode::Token(&block.open_brace_token));
    children.extend(block.statements.iter().map(SyntaxNode::Statement));
    children.push(SyntaxNode::Token(&block.close_brace_token));
}

fn push_separated<'a, T>(
    children: &mut Vec<SyntaxNode<'a>>,
    list: &'a SeparatedSyntaxList<T>,
    node: fn(&'a T) -> SyntaxNode<'a>,
) {
    for (index, item) in list.iter().enumerate() {
        children.push(node(item));
        if let Some(separator) = list.separator(index) {
            children.push(SyntaxNode::Token(separator));
        }
    }
}

fn statement_children<'a>(children: &mut Vec<SyntaxNode<'a>>, statement: &'a StatementSyntax) {
    use SyntaxNode as N;

    match statement {
        StatementSyntax::Block(block) => push_block(children, block),
        StatementSyntax::VariableDeclaration(declaration) => {
            children.push(N::Token(&declaration.keyword));
            children.push(N::Token(&declaration.identifier));
            if let Some(clause) = &declaration.type_clause {
                children.push(N::TypeClause(clause));
            }
            children.push(N::Token(&declaration.equals_token));
            children.push(N::Expression(&declaration.initializer));
        }
        StatementSyntax::If(statement) => {
            children.push(N::Token(&statement.if_keyword));
            children.push(N::Expression(&statement.condition));
            children.push(N::Statement(&statement.then_statement));
            if let Some(clause) = &statement.else_clause {
                children.push(N::ElseClause(clause));
            }
        }
        StatementSyntax::While(statement) => {
            children.push(N::Token(&statement.while_keyword));
            children.push(N::Expression(&statement.condition));
            children.push(N::Statement(&statement.body));
        }
        StatementSyntax::DoWhile(statement) => {
            children.push(N::Token(&statement.do_keyword));
            children.push(N::Statement(&statement.body));
            children.push(N::Token(&statement.while_keyword));
            children.push(N::Expression(&statement.condition));
        }
        StatementSyntax::For(statement) => {
            children.push(N::Token(&statement.for_keyword));
            children.push(N::Token(&statement.identifier));
            children.push(N::Token(&statement.in_keyword));
            children.push(N::Expression(&statement.lower_bound));
            children.push(N::Token(&statement.range_token));
            children.push(N::Expression(&statement.upper_bound));
            children.push(N::Statement(&statement.body));
        }
        StatementSyntax::Break(token) | StatementSyntax::Continue(token) => children.push(N::Token(token)),
        StatementSyntax::Return(statement) => {
            children.push(N::Token(&statement.return_keyword));
            if let Some(expression) = &statement.expression {
                children.push(N::Expression(expression));
            }
        }
        StatementSyntax::Expression(expression) => children.push(N::Expression(expression)),
    }
}

fn expression_children<'a>(children: &mut Vec<SyntaxNode<'a>>, expression: &'a ExpressionSyntax) {
    use SyntaxNode as N;

    match expression {
        ExpressionSyntax::Literal(literal) => children.push(N::Token(&literal.token)),
        ExpressionSyntax::Name(name) => children.push(N::Token(&name.identifier)),
        ExpressionSyntax::Assignment(assignment) => {
            children.push(N::Token(&assignment.identifier));
            children.push(N::Token(&assignment.equals_token));
            children.push(N::Expression(&assignment.expression));
        }
        ExpressionSyntax::Unary(unary) => {
            children.push(N::Token(&unary.operator_token));
            children.push(N::Expression(&unary.operand));
        }
        ExpressionSyntax::Binary(binary) => {
            children.push(N::Expression(&binary.left));
            children.push(N::Token(&binary.operator_token));
            children.push(N::Expression(&binary.right));
        }
        ExpressionSyntax::Parenthesized(parenthesized) => {
            children.push(N::Token(&parenthesized.open_paren_token));
            children.push(N::Expression(&parenthesized.expression));
            children.push(N::Token(&parenthesized.close_paren_token));
        }
        ExpressionSyntax::Call(call) => {
            children.push(N::Token(&call.identifier));
            children.push(N::Token(&call.open_paren_token));
            push_separated(children, &call.arguments, N::Expression);
            children.push(N::Token(&call.close_paren_token));
        }
    }
}

fn pretty_print(f: &mut fmt::Formatter<'_>, node: SyntaxNode<'_>, indent: &str, is_last: bool) -> fmt::Result {
    let marker = if is_last { "└──" } else { "├──" };
    write!(f, "{}{}{}", indent, marker, node.kind())?;
    if let SyntaxNode::Token(token) = node {
        if let Some(value) = &token.value {
            write!(f, " {}", value)?;
        } else if token.kind == SyntaxKind::IdentifierToken {
            write!(f, " {}", token.text)?;
        }
    }
    writeln!(f)?;

    let indent = format!("{}{}", indent, if is_last { "    " } else { "│   " });
    let children = node.children();
    let count = children.len();
    for (index, child) in children.into_iter().enumerate() {
        pretty_print(f, child, &indent, index + 1 == count)?;
    }
    Ok(())
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pretty_print(f, *self, "", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LiteralValue;

    fn token(kind: SyntaxKind, start: u32, text: &str, value: Option<LiteralValue>) -> SyntaxToken {
        SyntaxToken::new(kind, TextSpan::new(start, text.len() as u32), text.to_string(), value)
    }

    /// `1 + x`
    fn binary() -> ExpressionSyntax {
        ExpressionSyntax::Binary(BinaryExpressionSyntax {
            left: Box::new(ExpressionSyntax::Literal(LiteralExpressionSyntax {
                token: token(SyntaxKind::NumberToken, 0, "1", Some(LiteralValue::Int(1))),
                value: LiteralValue::Int(1),
            })),
            operator_token: token(SyntaxKind::PlusToken, 2, "+", None),
            right: Box::new(ExpressionSyntax::Name(NameExpressionSyntax {
                identifier: token(SyntaxKind::IdentifierToken, 4, "x", None),
            })),
        })
    }

    #[test]
    fn test_binary_children_in_source_order() {
        let expression = binary();
        let kinds: Vec<SyntaxKind> = SyntaxNode::Expression(&expression)
            .children()
            .iter()
            .map(|child| child.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::LiteralExpression, SyntaxKind::PlusToken, SyntaxKind::NameExpression]
        );
    }

    #[test]
    fn test_tokens_have_no_children() {
        let plus = token(SyntaxKind::PlusToken, 0, "+", None);
        assert!(SyntaxNode::Token(&plus).children().is_empty());
    }

    #[test]
    fn test_pretty_print() {
        let expression = binary();
        let expected = "\
└──BinaryExpression
    ├──LiteralExpression
    │   └──NumberToken 1
    ├──PlusToken
    └──NameExpression
        └──IdentifierToken x
";
        assert_eq!(SyntaxNode::Expression(&expression).to_string(), expected);
    }
}
