//! The rill parser implementation.
//!
//! A recursive descent parser pulling tokens from the scanner on demand. It
//! never fails: a token that does not match is reported once and replaced by
//! a zero-width missing token, so later stages always see a complete tree.

use rill_ast::*;
use rill_diagnostics::{messages, DiagnosticBag};
use rill_scanner::Scanner;
use std::rc::Rc;

use crate::precedence::{
    get_binary_operator_precedence, get_unary_operator_precedence, OperatorPrecedence,
};

/// The parser produces a [`SyntaxTree`] from rill source text.
pub struct Parser {
    scanner: Scanner,
    diagnostics: DiagnosticBag,
}

impl Parser {
    pub fn new(source_text: &str) -> Self {
        Self {
            scanner: Scanner::new(source_text),
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn parse_syntax_tree(mut self) -> SyntaxTree {
        self.scanner.scan();
        let root = self.parse_compilation_unit();

        let mut diagnostics = self.scanner.take_diagnostics();
        diagnostics.extend(self.diagnostics);
        diagnostics.sort();

        let text = self.scanner.text().to_string();
        SyntaxTree::new(text, root, diagnostics.into_diagnostics())
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    /// Kind of the token after the current one.
    fn peek_token(&mut self) -> SyntaxKind {
        self.scanner.look_ahead(|s| s.scan())
    }

    /// Consume the current token and return it.
    fn next_token(&mut self) -> SyntaxToken {
        let token = self.scanner.token_info();
        self.scanner.scan();
        token
    }

    fn expect_token(&mut self, kind: SyntaxKind) -> SyntaxToken {
        if self.current_token() == kind {
            return self.next_token();
        }
        // The scanner already reported the character behind a bad token.
        if self.current_token() != SyntaxKind::BadToken {
            let actual = self.current_token().to_string();
            let expected = kind.to_string();
            self.diagnostics.report(
                self.scanner.token_span(),
                &messages::UNEXPECTED_TOKEN,
                &[&actual, &expected],
            );
        }
        SyntaxToken::missing(kind, self.scanner.token_start() as u32)
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> Option<SyntaxToken> {
        (self.current_token() == kind).then(|| self.next_token())
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn parse_compilation_unit(&mut self) -> CompilationUnitSyntax {
        let mut members = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken {
            let saved_pos = self.scanner.token_start();
            members.push(self.parse_member());

            // Error recovery: a member that consumed nothing would loop forever.
            if self.scanner.token_start() == saved_pos {
                self.next_token();
            }
        }
        let end_of_file_token = self.expect_token(SyntaxKind::EndOfFileToken);
        CompilationUnitSyntax {
            members,
            end_of_file_token,
        }
    }

    fn parse_member(&mut self) -> MemberSyntax {
        if self.current_token() == SyntaxKind::FunctionKeyword {
            MemberSyntax::FunctionDeclaration(Rc::new(self.parse_function_declaration()))
        } else {
            MemberSyntax::GlobalStatement(self.parse_statement())
        }
    }

    fn parse_function_declaration(&mut self) -> FunctionDeclarationSyntax {
        let function_keyword = self.expect_token(SyntaxKind::FunctionKeyword);
        let identifier = self.expect_token(SyntaxKind::IdentifierToken);
        let open_paren_token = self.expect_token(SyntaxKind::OpenParenToken);
        let parameters = self.parse_parameter_list();
        let close_paren_token = self.expect_token(SyntaxKind::CloseParenToken);
        let type_clause = self.parse_optional_type_clause();
        let body = self.parse_block_statement();
        FunctionDeclarationSyntax {
            function_keyword,
            identifier,
            open_paren_token,
            parameters,
            close_paren_token,
            type_clause,
            body,
        }
    }

    fn parse_parameter_list(&mut self) -> SeparatedSyntaxList<ParameterSyntax> {
        let mut nodes = Vec::new();
        let mut separators = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            let identifier = self.expect_token(SyntaxKind::IdentifierToken);
            let type_clause = self.parse_type_clause();
            nodes.push(ParameterSyntax {
                identifier,
                type_clause,
            });
            match self.optional_token(SyntaxKind::CommaToken) {
                Some(comma) => separators.push(comma),
                None => break,
            }
        }
        SeparatedSyntaxList::new(nodes, separators)
    }

    fn parse_optional_type_clause(&mut self) -> Option<TypeClauseSyntax> {
        (self.current_token() == SyntaxKind::ColonToken).then(|| self.parse_type_clause())
    }

    fn parse_type_clause(&mut self) -> TypeClauseSyntax {
        let colon_token = self.expect_token(SyntaxKind::ColonToken);
        let identifier = self.expect_token(SyntaxKind::IdentifierToken);
        TypeClauseSyntax {
            colon_token,
            identifier,
        }
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statement(&mut self) -> StatementSyntax {
        match self.current_token() {
            SyntaxKind::OpenBraceToken => StatementSyntax::Block(self.parse_block_statement()),
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword => self.parse_variable_declaration(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::DoKeyword => self.parse_do_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::BreakKeyword => StatementSyntax::Break(self.next_token()),
            SyntaxKind::ContinueKeyword => StatementSyntax::Continue(self.next_token()),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            _ => StatementSyntax::Expression(self.parse_expression()),
        }
    }

    fn parse_block_statement(&mut self) -> BlockStatementSyntax {
        let open_brace_token = self.expect_token(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken
            && self.current_token() != SyntaxKind::CloseBraceToken
        {
            let saved_pos = self.scanner.token_start();
            statements.push(self.parse_statement());
            if self.scanner.token_start() == saved_pos {
                self.next_token();
            }
        }
        let close_brace_token = self.expect_token(SyntaxKind::CloseBraceToken);
        BlockStatementSyntax {
            open_brace_token,
            statements,
            close_brace_token,
        }
    }

    fn parse_variable_declaration(&mut self) -> StatementSyntax {
        let expected = if self.current_token() == SyntaxKind::LetKeyword {
            SyntaxKind::LetKeyword
        } else {
            SyntaxKind::VarKeyword
        };
        let keyword = self.expect_token(expected);
        let identifier = self.expect_token(SyntaxKind::IdentifierToken);
        let type_clause = self.parse_optional_type_clause();
        let equals_token = self.expect_token(SyntaxKind::EqualsToken);
        let initializer = self.parse_expression();
        StatementSyntax::VariableDeclaration(VariableDeclarationSyntax {
            keyword,
            identifier,
            type_clause,
            equals_token,
            initializer,
        })
    }

    fn parse_if_statement(&mut self) -> StatementSyntax {
        let if_keyword = self.expect_token(SyntaxKind::IfKeyword);
        let condition = self.parse_expression();
        let then_statement = Box::new(self.parse_statement());
        let else_clause = self.optional_token(SyntaxKind::ElseKeyword).map(|else_keyword| {
            ElseClauseSyntax {
                else_keyword,
                else_statement: Box::new(self.parse_statement()),
            }
        });
        StatementSyntax::If(IfStatementSyntax {
            if_keyword,
            condition,
            then_statement,
            else_clause,
        })
    }

    fn parse_while_statement(&mut self) -> StatementSyntax {
        let while_keyword = self.expect_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_expression();
        let body = Box::new(self.parse_statement());
        StatementSyntax::While(WhileStatementSyntax {
            while_keyword,
            condition,
            body,
        })
    }

    fn parse_do_while_statement(&mut self) -> StatementSyntax {
        let do_keyword = self.expect_token(SyntaxKind::DoKeyword);
        let body = Box::new(self.parse_statement());
        let while_keyword = self.expect_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_expression();
        StatementSyntax::DoWhile(DoWhileStatementSyntax {
            do_keyword,
            body,
            while_keyword,
            condition,
        })
    }

    fn parse_for_statement(&mut self) -> StatementSyntax {
        let for_keyword = self.expect_token(SyntaxKind::ForKeyword);
        let identifier = self.expect_token(SyntaxKind::IdentifierToken);
        let in_keyword = self.expect_token(SyntaxKind::InKeyword);
        let lower_bound = self.parse_expression();
        let range_token = match self.optional_token(SyntaxKind::DotDotEqualsToken) {
            Some(token) => token,
            None => self.expect_token(SyntaxKind::DotDotToken),
        };
        let upper_bound = self.parse_expression();
        let body = Box::new(self.parse_statement());
        StatementSyntax::For(ForStatementSyntax {
            for_keyword,
            identifier,
            in_keyword,
            lower_bound,
            range_token,
            upper_bound,
            body,
        })
    }

    /// `return` takes an expression only when one follows on the same line.
    fn parse_return_statement(&mut self) -> StatementSyntax {
        let return_keyword = self.expect_token(SyntaxKind::ReturnKeyword);
        let expression = if self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
            && !self.scanner.has_preceding_line_break()
        {
            Some(self.parse_expression())
        } else {
            None
        };
        StatementSyntax::Return(ReturnStatementSyntax {
            return_keyword,
            expression,
        })
    }

    // ========================================================================
    // Expression parsing
    // ========================================================================

    fn parse_expression(&mut self) -> ExpressionSyntax {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> ExpressionSyntax {
        if self.current_token() == SyntaxKind::IdentifierToken
            && self.peek_token() == SyntaxKind::EqualsToken
        {
            let identifier = self.next_token();
            let equals_token = self.next_token();
            let expression = Box::new(self.parse_assignment_expression());
            return ExpressionSyntax::Assignment(AssignmentExpressionSyntax {
                identifier,
                equals_token,
                expression,
            });
        }
        self.parse_binary_expression(OperatorPrecedence::Lowest)
    }

    fn parse_binary_expression(&mut self, parent_precedence: OperatorPrecedence) -> ExpressionSyntax {
        let mut left = match get_unary_operator_precedence(self.current_token()) {
            Some(precedence) if precedence >= parent_precedence => {
                let operator_token = self.next_token();
                let operand = Box::new(self.parse_binary_expression(precedence));
                ExpressionSyntax::Unary(UnaryExpressionSyntax {
                    operator_token,
                    operand,
                })
            }
            _ => self.parse_primary_expression(),
        };

        loop {
            let precedence = match get_binary_operator_precedence(self.current_token()) {
                Some(precedence) if precedence > parent_precedence => precedence,
                _ => break,
            };
            let operator_token = self.next_token();
            let right = Box::new(self.parse_binary_expression(precedence));
            left = ExpressionSyntax::Binary(BinaryExpressionSyntax {
                left: Box::new(left),
                operator_token,
                right,
            });
        }

        left
    }

    fn parse_primary_expression(&mut self) -> ExpressionSyntax {
        match self.current_token() {
            SyntaxKind::OpenParenToken => self.parse_parenthesized_expression(),
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let token = self.next_token();
                let value = LiteralValue::Bool(token.kind == SyntaxKind::TrueKeyword);
                ExpressionSyntax::Literal(LiteralExpressionSyntax { token, value })
            }
            SyntaxKind::NumberToken => self.parse_literal(SyntaxKind::NumberToken, LiteralValue::Int(0)),
            SyntaxKind::StringToken => {
                self.parse_literal(SyntaxKind::StringToken, LiteralValue::String(String::new()))
            }
            SyntaxKind::IdentifierToken if self.peek_token() == SyntaxKind::OpenParenToken => {
                self.parse_call_expression()
            }
            _ => {
                let identifier = self.expect_token(SyntaxKind::IdentifierToken);
                ExpressionSyntax::Name(NameExpressionSyntax { identifier })
            }
        }
    }

    fn parse_literal(&mut self, kind: SyntaxKind, default: LiteralValue) -> ExpressionSyntax {
        let token = self.expect_token(kind);
        let value = token.value.clone().unwrap_or(default);
        ExpressionSyntax::Literal(LiteralExpressionSyntax { token, value })
    }

    fn parse_parenthesized_expression(&mut self) -> ExpressionSyntax {
        let open_paren_token = self.expect_token(SyntaxKind::OpenParenToken);
        let expression = Box::new(self.parse_expression());
        let close_paren_token = self.expect_token(SyntaxKind::CloseParenToken);
        ExpressionSyntax::Parenthesized(ParenthesizedExpressionSyntax {
            open_paren_token,
            expression,
            close_paren_token,
        })
    }

    fn parse_call_expression(&mut self) -> ExpressionSyntax {
        let identifier = self.expect_token(SyntaxKind::IdentifierToken);
        let open_paren_token = self.expect_token(SyntaxKind::OpenParenToken);
        let mut nodes = Vec::new();
        let mut separators = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            nodes.push(self.parse_expression());
            match self.optional_token(SyntaxKind::CommaToken) {
                Some(comma) => separators.push(comma),
                None => break,
            }
        }
        let close_paren_token = self.expect_token(SyntaxKind::CloseParenToken);
        ExpressionSyntax::Call(CallExpressionSyntax {
            identifier,
            open_paren_token,
            arguments: SeparatedSyntaxList::new(nodes, separators),
            close_paren_token,
        })
    }
}

/// Parse `text` into a syntax tree.
pub fn parse(text: &str) -> SyntaxTree {
    Parser::new(text).parse_syntax_tree()
}

/// Parse the contents of `file`; its diagnostics are attributed to it.
pub fn parse_file(file: &str, text: &str) -> SyntaxTree {
    parse(text).with_file(file)
}
