//! Lowering: structured control flow to labels and gotos.
//!
//! The output of [`Lowerer::lower`] is a single flat block whose statements
//! are only variable declarations, labels, gotos, conditional gotos, returns
//! and expression statements.

use crate::bound_tree::*;
use crate::operators::{INT_ADDITION, INT_LESS, INT_LESS_OR_EQUALS};
use crate::rewriter::BoundTreeRewriter;
use crate::symbol::{BoundLabel, TypeSymbol, VariableSymbol};
use rill_ast::LiteralValue;

pub struct Lowerer {
    label_count: u32,
}

impl Lowerer {
    fn new() -> Self {
        Self { label_count: 0 }
    }

    /// Lower `statement` and flatten the result into one block.
    pub fn lower(statement: BoundStatement) -> BoundBlockStatement {
        let mut lowerer = Lowerer::new();
        let result = lowerer.rewrite_statement(statement);
        flatten(result)
    }

    fn generate_label(&mut self) -> BoundLabel {
        self.label_count += 1;
        BoundLabel::new(format!("Label{}", self.label_count))
    }
}

/// Splice nested blocks into a single statement list, preserving order.
fn flatten(statement: BoundStatement) -> BoundBlockStatement {
    let mut statements = Vec::new();
    let mut stack = vec![statement];

    while let Some(current) = stack.pop() {
        match current {
            BoundStatement::Block(block) => {
                stack.extend(block.statements.into_iter().rev());
            }
            other => statements.push(other),
        }
    }

    BoundBlockStatement { statements }
}

impl BoundTreeRewriter for Lowerer {
    fn rewrite_if_statement(&mut self, node: BoundIfStatement) -> BoundStatement {
        let lowered = match node.else_statement {
            // gotoFalse <condition> end
            // <then>
            // end:
            None => {
                let end_label = self.generate_label();
                BoundStatement::block(vec![
                    BoundStatement::conditional_goto(end_label.clone(), node.condition, false),
                    *node.then_statement,
                    BoundStatement::Label(end_label),
                ])
            }
            // gotoFalse <condition> else
            // <then>
            // goto end
            // else:
            // <else>
            // end:
            Some(else_statement) => {
                let else_label = self.generate_label();
                let end_label = self.generate_label();
                BoundStatement::block(vec![
                    BoundStatement::conditional_goto(else_label.clone(), node.condition, false),
                    *node.then_statement,
                    BoundStatement::Goto(end_label.clone()),
                    BoundStatement::Label(else_label),
                    *else_statement,
                    BoundStatement::Label(end_label),
                ])
            }
        };
        self.rewrite_statement(lowered)
    }

    // goto check
    // continue:
    // <body>
    // check:
    // gotoTrue <condition> continue
    // break:
    fn rewrite_while_statement(&mut self, node: BoundWhileStatement) -> BoundStatement {
        let check_label = self.generate_label();
        let lowered = BoundStatement::block(vec![
            BoundStatement::Goto(check_label.clone()),
            BoundStatement::Label(node.continue_label.clone()),
            *node.body,
            BoundStatement::Label(check_label),
            BoundStatement::conditional_goto(node.continue_label, node.condition, true),
            BoundStatement::Label(node.break_label),
        ]);
        self.rewrite_statement(lowered)
    }

    // continue:
    // <body>
    // gotoTrue <condition> continue
    // break:
    fn rewrite_do_while_statement(&mut self, node: BoundDoWhileStatement) -> BoundStatement {
        let lowered = BoundStatement::block(vec![
            BoundStatement::Label(node.continue_label.clone()),
            *node.body,
            BoundStatement::conditional_goto(node.continue_label, node.condition, true),
            BoundStatement::Label(node.break_label),
        ]);
        self.rewrite_statement(lowered)
    }

    // {
    //     var <variable> = <lower>
    //     let upperBound = <upper>
    //     while (<variable> < upperBound)      // <= for ..=
    //     {
    //         <body>
    //         continue:
    //         <variable> = <variable> + 1
    //     }
    // }
    fn rewrite_for_statement(&mut self, node: BoundForStatement) -> BoundStatement {
        let variable = node.variable;
        let upper_bound = VariableSymbol::local("upperBound", true, TypeSymbol::Int);
        let comparison = if node.is_inclusive { &INT_LESS_OR_EQUALS } else { &INT_LESS };

        let condition = BoundExpression::binary(
            BoundExpression::Variable(variable.clone()),
            comparison,
            BoundExpression::Variable(upper_bound.clone()),
        );
        let increment = BoundStatement::Expression(BoundExpression::assignment(
            variable.clone(),
            BoundExpression::binary(
                BoundExpression::Variable(variable.clone()),
                &INT_ADDITION,
                BoundExpression::Literal(LiteralValue::Int(1)),
            ),
        ));

        let while_body = BoundStatement::block(vec![
            *node.body,
            BoundStatement::Label(node.continue_label),
            increment,
        ]);
        let while_statement = BoundStatement::While(BoundWhileStatement {
            condition,
            body: Box::new(while_body),
            break_label: node.break_label,
            continue_label: self.generate_label(),
        });

        let lowered = BoundStatement::block(vec![
            BoundStatement::VariableDeclaration(BoundVariableDeclaration {
                variable,
                initializer: node.lower_bound,
            }),
            BoundStatement::VariableDeclaration(BoundVariableDeclaration {
                variable: upper_bound,
                initializer: node.upper_bound,
            }),
            while_statement,
        ]);
        self.rewrite_statement(lowered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print_text(text: &str) -> BoundStatement {
        BoundStatement::Expression(BoundExpression::Literal(LiteralValue::String(text.to_string())))
    }

    #[test]
    fn test_flatten_preserves_order() {
        let nested = BoundStatement::block(vec![
            print_text("a"),
            BoundStatement::block(vec![print_text("b"), BoundStatement::block(vec![print_text("c")])]),
            print_text("d"),
        ]);
        let flat = flatten(nested);
        let texts: Vec<_> = flat
            .statements
            .iter()
            .map(|statement| match statement {
                BoundStatement::Expression(BoundExpression::Literal(value)) => value.to_string(),
                other => panic!("unexpected {:?}", other.kind()),
            })
            .collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_if_without_else_jumps_past_then() {
        let statement = BoundStatement::If(BoundIfStatement {
            condition: BoundExpression::Literal(LiteralValue::Bool(true)),
            then_statement: Box::new(print_text("then")),
            else_statement: None,
        });
        let lowered = Lowerer::lower(statement);
        let kinds: Vec<_> = lowered.statements.iter().map(BoundStatement::kind).collect();
        assert_eq!(
            kinds,
            vec![
                BoundNodeKind::ConditionalGotoStatement,
                BoundNodeKind::ExpressionStatement,
                BoundNodeKind::LabelStatement,
            ]
        );
        match (&lowered.statements[0], &lowered.statements[2]) {
            (BoundStatement::ConditionalGoto(goto), BoundStatement::Label(label)) => {
                assert!(!goto.jump_if_true);
                assert_eq!(&goto.label, label);
                assert_eq!(label.name(), "Label1");
            }
            _ => unreachable!(),
        }
    }
}
