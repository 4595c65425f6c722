//! Source-like rendering of bound trees.
//!
//! Used by `#showProgram` in the REPL, by the control-flow graph's dot output
//! and by tests that compare lowered output textually.

use crate::bound_tree::*;
use rill_ast::LiteralValue;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

impl fmt::Display for BoundStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statement(f, self, 0)
    }
}

impl fmt::Display for BoundBlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, self, 0)
    }
}

impl fmt::Display for BoundExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expression(f, self)
    }
}

fn write_indent(f: &mut impl Write, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_block(f: &mut impl Write, block: &BoundBlockStatement, indent: usize) -> fmt::Result {
    f.write_str("{\n")?;
    for statement in &block.statements {
        write_indent(f, indent + 1)?;
        write_statement(f, statement, indent + 1)?;
        f.write_char('\n')?;
    }
    write_indent(f, indent)?;
    f.write_char('}')
}

/// Write a nested statement on its own line(s), indented one level unless it
/// is a block.
fn write_nested(f: &mut impl Write, statement: &BoundStatement, indent: usize) -> fmt::Result {
    match statement {
        BoundStatement::Block(block) => {
            f.write_char(' ')?;
            write_block(f, block, indent)
        }
        other => {
            f.write_char('\n')?;
            write_indent(f, indent + 1)?;
            write_statement(f, other, indent + 1)
        }
    }
}

fn write_statement(f: &mut impl Write, statement: &BoundStatement, indent: usize) -> fmt::Result {
    match statement {
        BoundStatement::Block(block) => write_block(f, block, indent),
        BoundStatement::VariableDeclaration(n) => {
            let keyword = if n.variable.is_read_only() { "let" } else { "var" };
            write!(f, "{} {} = ", keyword, n.variable.name())?;
            write_expression(f, &n.initializer)
        }
        BoundStatement::If(n) => {
            f.write_str("if ")?;
            write_expression(f, &n.condition)?;
            write_nested(f, &n.then_statement, indent)?;
            if let Some(else_statement) = &n.else_statement {
                f.write_char('\n')?;
                write_indent(f, indent)?;
                f.write_str("else")?;
                write_nested(f, else_statement, indent)?;
            }
            Ok(())
        }
        BoundStatement::While(n) => {
            f.write_str("while ")?;
            write_expression(f, &n.condition)?;
            write_nested(f, &n.body, indent)
        }
        BoundStatement::DoWhile(n) => {
            f.write_str("do")?;
            write_nested(f, &n.body, indent)?;
            f.write_char('\n')?;
            write_indent(f, indent)?;
            f.write_str("while ")?;
            write_expression(f, &n.condition)
        }
        BoundStatement::For(n) => {
            write!(f, "for {} in ", n.variable.name())?;
            write_expression(f, &n.lower_bound)?;
            f.write_str(if n.is_inclusive { "..=" } else { ".." })?;
            write_expression(f, &n.upper_bound)?;
            write_nested(f, &n.body, indent)
        }
        BoundStatement::Label(label) => write!(f, "{}:", label),
        BoundStatement::Goto(label) => write!(f, "goto {}", label),
        BoundStatement::ConditionalGoto(n) => {
            let keyword = if n.jump_if_true { "if" } else { "unless" };
            write!(f, "goto {} {} ", n.label, keyword)?;
            write_expression(f, &n.condition)
        }
        BoundStatement::Return(expression) => {
            f.write_str("return")?;
            if let Some(expression) = expression {
                f.write_char(' ')?;
                write_expression(f, expression)?;
            }
            Ok(())
        }
        BoundStatement::Expression(expression) => write_expression(f, expression),
    }
}

fn write_expression(f: &mut impl Write, expression: &BoundExpression) -> fmt::Result {
    match expression {
        BoundExpression::Error => f.write_char('?'),
        BoundExpression::Literal(LiteralValue::String(value)) => {
            write!(f, "\"{}\"", value.replace('"', "\"\""))
        }
        BoundExpression::Literal(value) => write!(f, "{}", value),
        BoundExpression::Variable(variable) => f.write_str(variable.name()),
        BoundExpression::Assignment(n) => {
            write!(f, "{} = ", n.variable.name())?;
            write_expression(f, &n.expression)
        }
        BoundExpression::Unary(n) => {
            f.write_str(n.op.syntax_kind.text().unwrap_or("?"))?;
            write_operand(f, &n.operand)
        }
        BoundExpression::Binary(n) => {
            write_operand(f, &n.left)?;
            write!(f, " {} ", n.op.syntax_kind.text().unwrap_or("?"))?;
            write_operand(f, &n.right)
        }
        BoundExpression::Call(n) => {
            write!(f, "{}(", n.function.name())?;
            for (i, argument) in n.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expression(f, argument)?;
            }
            f.write_char(')')
        }
        BoundExpression::Conversion(n) => {
            write!(f, "{}(", n.ty)?;
            write_expression(f, &n.expression)?;
            f.write_char(')')
        }
    }
}

/// Operands that are themselves operator expressions are parenthesized.
fn write_operand(f: &mut impl Write, operand: &BoundExpression) -> fmt::Result {
    match operand {
        BoundExpression::Binary(_) | BoundExpression::Assignment(_) => {
            f.write_char('(')?;
            write_expression(f, operand)?;
            f.write_char(')')
        }
        _ => write_expression(f, operand),
    }
}
