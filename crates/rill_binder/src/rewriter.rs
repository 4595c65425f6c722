//! Structural rewriting of bound trees.

use crate::bound_tree::*;
use crate::symbol::BoundLabel;

/// A by-value bound tree rewriter.
///
/// Every method has a default that rebuilds the node from its rewritten
/// children, so an implementation only overrides the node kinds it changes.
pub trait BoundTreeRewriter {
    fn rewrite_statement(&mut self, node: BoundStatement) -> BoundStatement {
        match node {
            BoundStatement::Block(n) => self.rewrite_block_statement(n),
            BoundStatement::VariableDeclaration(n) => self.rewrite_variable_declaration(n),
            BoundStatement::If(n) => self.rewrite_if_statement(n),
            BoundStatement::While(n) => self.rewrite_while_statement(n),
            BoundStatement::DoWhile(n) => self.rewrite_do_while_statement(n),
            BoundStatement::For(n) => self.rewrite_for_statement(n),
            BoundStatement::Label(label) => self.rewrite_label_statement(label),
            BoundStatement::Goto(label) => self.rewrite_goto_statement(label),
            BoundStatement::ConditionalGoto(n) => self.rewrite_conditional_goto_statement(n),
            BoundStatement::Return(expression) => self.rewrite_return_statement(expression),
            BoundStatement::Expression(expression) => self.rewrite_expression_statement(expression),
        }
    }

    fn rewrite_block_statement(&mut self, node: BoundBlockStatement) -> BoundStatement {
        let statements = node
            .statements
            .into_iter()
            .map(|statement| self.rewrite_statement(statement))
            .collect();
        BoundStatement::block(statements)
    }

    fn rewrite_variable_declaration(&mut self, node: BoundVariableDeclaration) -> BoundStatement {
        BoundStatement::VariableDeclaration(BoundVariableDeclaration {
            variable: node.variable,
            initializer: self.rewrite_expression(node.initializer),
        })
    }

    fn rewrite_if_statement(&mut self, node: BoundIfStatement) -> BoundStatement {
        BoundStatement::If(BoundIfStatement {
            condition: self.rewrite_expression(node.condition),
            then_statement: Box::new(self.rewrite_statement(*node.then_statement)),
            else_statement: node
                .else_statement
                .map(|statement| Box::new(self.rewrite_statement(*statement))),
        })
    }

    fn rewrite_while_statement(&mut self, node: BoundWhileStatement) -> BoundStatement {
        BoundStatement::While(BoundWhileStatement {
            condition: self.rewrite_expression(node.condition),
            body: Box::new(self.rewrite_statement(*node.body)),
            break_label: node.break_label,
            continue_label: node.continue_label,
        })
    }

    fn rewrite_do_while_statement(&mut self, node: BoundDoWhileStatement) -> BoundStatement {
        BoundStatement::DoWhile(BoundDoWhileStatement {
            body: Box::new(self.rewrite_statement(*node.body)),
            condition: self.rewrite_expression(node.condition),
            break_label: node.break_label,
            continue_label: node.continue_label,
        })
    }

    fn rewrite_for_statement(&mut self, node: BoundForStatement) -> BoundStatement {
        BoundStatement::For(BoundForStatement {
            variable: node.variable,
            lower_bound: self.rewrite_expression(node.lower_bound),
            upper_bound: self.rewrite_expression(node.upper_bound),
            is_inclusive: node.is_inclusive,
            body: Box::new(self.rewrite_statement(*node.body)),
            break_label: node.break_label,
            continue_label: node.continue_label,
        })
    }

    fn rewrite_label_statement(&mut self, label: BoundLabel) -> BoundStatement {
        BoundStatement::Label(label)
    }

    fn rewrite_goto_statement(&mut self, label: BoundLabel) -> BoundStatement {
        BoundStatement::Goto(label)
    }

    fn rewrite_conditional_goto_statement(&mut self, node: BoundConditionalGotoStatement) -> BoundStatement {
        let condition = self.rewrite_expression(node.condition);
        BoundStatement::conditional_goto(node.label, condition, node.jump_if_true)
    }

    fn rewrite_return_statement(&mut self, expression: Option<BoundExpression>) -> BoundStatement {
        BoundStatement::Return(expression.map(|expression| self.rewrite_expression(expression)))
    }

    fn rewrite_expression_statement(&mut self, expression: BoundExpression) -> BoundStatement {
        BoundStatement::Expression(self.rewrite_expression(expression))
    }

    fn rewrite_expression(&mut self, node: BoundExpression) -> BoundExpression {
        match node {
            BoundExpression::Error | BoundExpression::Literal(_) | BoundExpression::Variable(_) => node,
            BoundExpression::Assignment(n) => {
                let expression = self.rewrite_expression(*n.expression);
                BoundExpression::assignment(n.variable, expression)
            }
            BoundExpression::Unary(n) => BoundExpression::Unary(BoundUnaryExpression {
                op: n.op,
                operand: Box::new(self.rewrite_expression(*n.operand)),
            }),
            BoundExpression::Binary(n) => {
                let left = self.rewrite_expression(*n.left);
                let right = self.rewrite_expression(*n.right);
                BoundExpression::binary(left, n.op, right)
            }
            BoundExpression::Call(n) => BoundExpression::Call(BoundCallExpression {
                function: n.function,
                arguments: n
                    .arguments
                    .into_iter()
                    .map(|argument| self.rewrite_expression(argument))
                    .collect(),
            }),
            BoundExpression::Conversion(n) => BoundExpression::Conversion(BoundConversionExpression {
                ty: n.ty,
                expression: Box::new(self.rewrite_expression(*n.expression)),
            }),
        }
    }
}
